//! Remote membership source trait definitions
//!
//! The resolver never talks to the network itself; it is handed these two
//! seams. Production wiring uses the HTTP clients in
//! [`sources`](crate::sources), tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::core::types::{DirectoryMember, SiteGroupMember};
use crate::utils::error::Result;

/// Membership of site-local SharePoint groups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteGroupSource: Send + Sync {
    /// All members of the named group on the given site. Members are
    /// either users or directory-backed security groups; SharePoint groups
    /// do not nest.
    async fn fetch_group_members(
        &self,
        site_url: &str,
        group_name: &str,
    ) -> Result<Vec<SiteGroupMember>>;
}

/// Membership of directory security groups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryGroupSource: Send + Sync {
    /// Owners plus members of the group, the default membership scope.
    async fn fetch_owners_and_members(&self, group_id: &str) -> Result<Vec<DirectoryMember>>;

    /// Owners only, selected by the `_o` identifier marker.
    async fn fetch_owners(&self, group_id: &str) -> Result<Vec<DirectoryMember>>;
}
