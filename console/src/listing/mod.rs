//! Deployed app list, row actions and delete confirmation

pub mod confirm;
pub mod controller;
pub mod view;
