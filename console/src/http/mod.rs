//! Publishing API client

pub mod api;
pub mod apps;
pub mod client;
pub mod progress;
pub mod response;
pub mod upload;
