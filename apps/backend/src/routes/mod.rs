//! HTTP route handlers

pub mod export;
pub mod generate;
pub mod options;
