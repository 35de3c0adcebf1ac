//! # Permiscan
//!
//! Resolve effective SharePoint site permissions down to concrete users.
//! Walks every role assignment of a site, expanding site-local SharePoint
//! groups and arbitrarily nested directory security groups into flattened,
//! breadcrumb-annotated permission records.
//!
//! ## Features
//!
//! - **Full graph resolution**: SharePoint groups and nested security
//!   groups are expanded down to end users, with the membership chain
//!   recorded on every row
//! - **Memoized groups**: each group is expanded at most once per cache,
//!   cycle-safe, with single-flight locking across concurrent scans
//! - **Partial-failure tolerant**: a group that cannot be expanded becomes
//!   one error row and the scan continues
//! - **Pluggable sources**: the resolver talks to two small traits;
//!   Microsoft Graph and SharePoint REST clients are provided
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tokio_util::sync::CancellationToken;
//!
//! use permiscan::config::ScanConfig;
//! use permiscan::core::{KnownGroupCache, PermissionResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::from_file("scan.yaml").await?;
//!
//!     let resolver = PermissionResolver::new(
//!         Arc::new(config.sharepoint_source("<sharepoint token>")?),
//!         Arc::new(config.graph_source("<graph token>")?),
//!     );
//!
//!     let cache = KnownGroupCache::new();
//!     let cancel = CancellationToken::new();
//!
//!     for site in &config.sites {
//!         let assignments = Vec::new(); // role assignments fetched by the caller
//!         let records = resolver
//!             .resolve_site(site, &assignments, &cache, &cancel)
//!             .await?;
//!         for record in records {
//!             println!("{} | {} | {}", record.access_type, record.account_type, record.users);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod sources;
pub mod utils;

pub use config::ScanConfig;
pub use core::resolver::PermissionResolver;
pub use core::types::{PermissionRecord, PrincipalKind, PrincipalRef, RoleAssignment};
pub use utils::error::{Result, ScanError};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
