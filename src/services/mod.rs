//! Service layer
//!
//! Request handlers stay thin and delegate here:
//!
//! - **ProfileService**: cache-first profile lookups through the account pool
//! - **ImageProxyService**: server-side fetches of remote images

pub mod image_proxy;
pub mod profile;

pub use image_proxy::{ImageProxyService, ProxiedImage};
pub use profile::ProfileService;
