//! Data models.

pub mod config;
pub mod hook;
pub mod media;
pub mod trailer;
