//! HTTP front end and process wiring for credcache.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod console;
pub mod state;
