//! Wire models for the static publishing admin API

pub mod models;
