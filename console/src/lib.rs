//! Publishing Console Library
//!
//! Deploys zipped static-site bundles to a publishing service and manages the
//! deployed applications.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod listing;
pub mod logs;
pub mod models;
pub mod storage;
pub mod utils;
