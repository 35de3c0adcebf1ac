//! Core traits module
//!
//! Contains all core abstract interface definitions

pub mod source;

pub use source::*;
