//! Scraping sessions
//!
//! - **Store**: one JSON token file per account, loaded at startup or
//!   created by logging in
//! - **Pool**: the sessions that made it through startup, picked at random
//!   per request

pub mod pool;
pub mod store;

pub use pool::AccountPool;
pub use store::SessionStore;
