//! Trailarr Library
//!
//! Keeps exactly one best trailer next to every movie managed by Radarr,
//! backed by a download history and registered with Kodi.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
