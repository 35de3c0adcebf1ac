//! Common test utilities for permiscan
//!
//! This module provides shared test infrastructure for all tests:
//! - In-memory implementations of the membership source traits
//! - Factories for role assignments and members
//!
//! # Usage
//!
//! ```rust
//! use crate::common::fixtures::{AssignmentFactory, FakeDirectory, FakeSiteGroups};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let site = FakeSiteGroups::new().with_group(SITE, "Editors", vec![...]);
//!     // ...
//! }
//! ```


pub use fixtures::{AssignmentFactory, FakeDirectory, FakeSiteGroups};
