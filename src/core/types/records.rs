//! Output records and breadcrumb paths

use serde::{Deserialize, Serialize};

use super::cache::GroupKey;

/// One flattened permission row: who can do what on the scoped resource,
/// and through which membership chain. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// How the grant reaches the resource: `"Direct Permissions"` or
    /// `"SharePoint Group '<name>'"`
    pub access_type: String,

    /// Membership breadcrumb ending at the account kind, e.g.
    /// `"Security Group 'grp1' holds User"`
    pub account_type: String,

    /// Space-joined user login names, `"All Users"` for sentinel rows,
    /// empty for error rows
    pub users: String,

    /// Effective permission levels joined with `" | "`
    pub permission_levels: String,

    /// Failure or traversal remark; empty on clean rows
    pub remarks: String,
}

impl PermissionRecord {
    pub fn new(
        access_type: impl Into<String>,
        account_type: impl Into<String>,
        users: impl Into<String>,
        permission_levels: impl Into<String>,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            access_type: access_type.into(),
            account_type: account_type.into(),
            users: users.into(),
            permission_levels: permission_levels.into(),
            remarks: remarks.into(),
        }
    }
}

/// One frame of the active membership chain.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathFrame {
    key: GroupKey,
    segment: String,
}

/// The chain of groups currently being descended through.
///
/// Paths are copied on descend: each branch of the traversal owns its own
/// path, so sibling branches can never observe each other's breadcrumbs.
/// The frames double as the cycle-detection set for the active chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPath {
    frames: Vec<PathFrame>,
}

impl AccessPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Breadcrumb segment contributed by a security group, with the
    /// trailing space the rendered chain format requires.
    pub fn segment(group_name: &str) -> String {
        format!("Security Group '{}' holds ", group_name)
    }

    /// True before the first descent; the resolver treats these frames as
    /// top-of-chain for in-flight deduplication.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True when the group is already on the active chain, i.e. descending
    /// into it would cycle.
    pub fn contains(&self, key: &GroupKey) -> bool {
        self.frames.iter().any(|frame| &frame.key == key)
    }

    /// New path with the group appended; `self` is left untouched.
    pub fn descend(&self, key: GroupKey, segment: impl Into<String>) -> Self {
        let mut frames = self.frames.clone();
        frames.push(PathFrame {
            key,
            segment: segment.into(),
        });
        Self { frames }
    }

    /// Concatenated breadcrumb of the whole chain.
    pub fn render(&self) -> String {
        self.frames
            .iter()
            .map(|frame| frame.segment.as_str())
            .collect()
    }
}
