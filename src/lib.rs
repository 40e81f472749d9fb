//! Instagram profile proxy
//!
//! Looks up public Instagram profiles through a pool of logged-in accounts,
//! caches the summaries in memory and relays profile pictures server-side.

pub mod assets;
pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod sessions;
pub mod upstream;
pub mod web;
