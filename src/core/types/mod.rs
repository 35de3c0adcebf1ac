//! Core type definition module
//!
//! Contains all core data structures and type definitions

pub mod cache;
pub mod principal;
pub mod records;

// Re-export all public types
pub use cache::*;
pub use principal::*;
pub use records::*;
