//! Namespace document server
//!
//! Serves JSON-LD context documents and pre-rendered HTML vocabulary pages
//! over HTTP from two static document sets.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod store;
