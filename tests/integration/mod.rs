//! Integration test modules for tutti-host

pub mod binding;
pub mod discovery;
pub mod lifecycle;
pub mod render;
pub mod scenario;
