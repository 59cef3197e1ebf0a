//! Core reconciliation logic.

pub mod acquisition;
pub mod history;
pub mod inspector;
pub mod path_map;
pub mod quality;
pub mod selector;
pub mod sync;
