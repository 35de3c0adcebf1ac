//! Principal and assignment types
//!
//! Defines the data structures describing who holds a grant: users,
//! site-local SharePoint groups, and directory-backed security groups.

use serde::{Deserialize, Serialize};

/// Kind of principal a role assignment can point at.
///
/// The source system reports principal types as free-form strings; any
/// value outside this closed set is rejected at the ingestion boundary
/// rather than carried through the resolution graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrincipalKind {
    /// A concrete end user
    User,
    /// A site-local SharePoint group
    SharePointGroup,
    /// A directory-backed security group (possibly nested)
    SecurityGroup,
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PrincipalKind::User => "User",
            PrincipalKind::SharePointGroup => "SharePointGroup",
            PrincipalKind::SecurityGroup => "SecurityGroup",
        };
        f.write_str(name)
    }
}

/// A reference to a principal as encountered during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRef {
    /// Principal kind
    pub kind: PrincipalKind,

    /// Human-readable display name
    pub display_name: String,

    /// Login name for users, raw (possibly claims-encoded) identifier for
    /// security groups, group name for SharePoint groups
    pub login_or_id: String,

    /// Resource scope the principal was encountered in
    pub site_url: String,
}

impl PrincipalRef {
    pub fn user(
        display_name: impl Into<String>,
        login: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            kind: PrincipalKind::User,
            display_name: display_name.into(),
            login_or_id: login.into(),
            site_url: site_url.into(),
        }
    }

    pub fn sharepoint_group(name: impl Into<String>, site_url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: PrincipalKind::SharePointGroup,
            display_name: name.clone(),
            login_or_id: name,
            site_url: site_url.into(),
        }
    }

    pub fn security_group(
        display_name: impl Into<String>,
        id: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            kind: PrincipalKind::SecurityGroup,
            display_name: display_name.into(),
            login_or_id: id.into(),
            site_url: site_url.into(),
        }
    }
}

/// One grant on the scoped resource: a principal bound to a set of role
/// definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Site the assignment was read from
    pub site_url: String,

    /// The grantee
    pub principal: PrincipalRef,

    /// Role definition names bound to the grantee
    pub role_definitions: Vec<String>,
}

impl RoleAssignment {
    pub fn new(
        site_url: impl Into<String>,
        principal: PrincipalRef,
        role_definitions: Vec<String>,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            principal,
            role_definitions,
        }
    }
}

/// A member of a site-local SharePoint group, as returned by a
/// [`SiteGroupSource`](crate::core::traits::SiteGroupSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteGroupMember {
    /// Display name
    pub display_name: String,

    /// Login name (users) or raw identifier (security groups)
    pub login_or_id: String,

    /// Member kind; SharePoint groups never contain SharePoint groups
    pub kind: PrincipalKind,

    /// Directory object id when the member is backed by the directory
    pub directory_id: Option<String>,
}

/// Kind of directory group member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryMemberKind {
    User,
    SecurityGroup,
}

/// A member (or owner) of a directory security group, as returned by a
/// [`DirectoryGroupSource`](crate::core::traits::DirectoryGroupSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMember {
    /// Display name
    pub display_name: String,

    /// Directory object id
    pub id: String,

    /// Member kind
    pub kind: DirectoryMemberKind,

    /// User principal name; `None` for groups
    pub user_principal_name: Option<String>,
}

/// Successful expansion of one group principal: its direct users plus the
/// nested groups still to be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Login names of direct user members, in source order
    pub direct_users: Vec<String>,

    /// Nested group principals requiring further expansion
    pub nested_groups: Vec<PrincipalRef>,
}
