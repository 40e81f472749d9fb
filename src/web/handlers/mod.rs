//! HTTP request handlers
//!
//! Handlers extract request data, call into the service layer and convert
//! the outcome with the helpers in [`crate::web::responses`].

pub mod health;
pub mod image_proxy;
pub mod index;
pub mod profile;
