// Mockup Forge Library
// Logo mockup compositing service: fetch, rasterize, composite, publish

pub mod config;
pub mod constants;
pub mod error;
pub mod handler;
pub mod logging;
pub mod mockup;
pub mod server;
pub mod storage;
