//! Business logic services

pub mod completion;
pub mod export;
pub mod extraction;
pub mod generation;
pub mod staging;
