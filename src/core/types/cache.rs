//! Cache entry types for memoized group expansions

use serde::{Deserialize, Serialize};

use super::principal::PrincipalKind;

/// Identity of a resolved group in the known-group cache.
///
/// SharePoint groups are scoped to the exact site they belong to; security
/// groups are tenant-wide, so their key carries no site scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    /// Group kind (`SharePointGroup` or `SecurityGroup`)
    pub kind: PrincipalKind,

    /// Decoded directory id for security groups (display name when no id
    /// is available), group name for SharePoint groups
    pub id_or_name: String,

    /// `Some` for site-scoped SharePoint groups, `None` for security groups
    pub site_url: Option<String>,
}

impl GroupKey {
    pub fn sharepoint(site_url: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            kind: PrincipalKind::SharePointGroup,
            id_or_name: group_name.into(),
            site_url: Some(site_url.into()),
        }
    }

    pub fn security(id_or_name: impl Into<String>) -> Self {
        Self {
            kind: PrincipalKind::SecurityGroup,
            id_or_name: id_or_name.into(),
            site_url: None,
        }
    }
}

/// Outcome half of a cached expansion row.
///
/// Resolved users and a failure message are mutually exclusive by
/// construction. `Sentinel` marks a built-in everyone-principal row; it
/// renders a fixed user set and is exempt from breadcrumb prefixing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachedOutcome {
    /// Space-joined login names of the users reached through this row
    Resolved(String),
    /// Built-in everyone principal; renders as "All Users"
    Sentinel,
    /// The expansion behind this row failed with the given message
    Failed(String),
}

impl CachedOutcome {
    /// User column value for a record rendered from this outcome.
    pub fn users(&self) -> &str {
        match self {
            CachedOutcome::Resolved(users) => users,
            CachedOutcome::Sentinel => "All Users",
            CachedOutcome::Failed(_) => "",
        }
    }

    /// Remarks column value for a record rendered from this outcome.
    pub fn remarks(&self) -> &str {
        match self {
            CachedOutcome::Failed(message) => message,
            _ => "",
        }
    }
}

/// One row of a memoized group expansion, stored relative to the group it
/// belongs to: `account_type` starts at that group's own breadcrumb
/// segment, so an ancestor replaying the entry prefixes its own segment
/// without rewriting the tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownGroupEntry {
    /// Breadcrumb rendered relative to the owning group
    pub account_type: String,

    /// Permission levels the group was first resolved under; replay always
    /// substitutes the caller's current levels, this is kept for
    /// diagnostics
    pub permission_levels: String,

    /// Resolved users, sentinel marker, or failure message
    pub outcome: CachedOutcome,
}

impl KnownGroupEntry {
    pub fn resolved(
        account_type: impl Into<String>,
        permission_levels: impl Into<String>,
        users: impl Into<String>,
    ) -> Self {
        Self {
            account_type: account_type.into(),
            permission_levels: permission_levels.into(),
            outcome: CachedOutcome::Resolved(users.into()),
        }
    }

    pub fn sentinel(display_name: impl Into<String>, permission_levels: impl Into<String>) -> Self {
        Self {
            account_type: display_name.into(),
            permission_levels: permission_levels.into(),
            outcome: CachedOutcome::Sentinel,
        }
    }

    pub fn failed(
        account_type: impl Into<String>,
        permission_levels: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            account_type: account_type.into(),
            permission_levels: permission_levels.into(),
            outcome: CachedOutcome::Failed(message.into()),
        }
    }

    /// Copy of this entry as seen one level up the membership chain.
    /// Sentinel rows keep their display name untouched.
    pub fn prefixed(&self, segment: &str) -> Self {
        match self.outcome {
            CachedOutcome::Sentinel => self.clone(),
            _ => Self {
                account_type: format!("{}{}", segment, self.account_type),
                permission_levels: self.permission_levels.clone(),
                outcome: self.outcome.clone(),
            },
        }
    }
}
