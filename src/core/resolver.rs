//! Permission graph resolution
//!
//! Walks the role assignments of one site depth-first, expanding
//! SharePoint groups and arbitrarily nested security groups down to
//! concrete users. Every resolved group receives a cache entry for each
//! row of its subtree, so replaying an ancestor reproduces the whole
//! subtree without further remote calls.
//!
//! Failures during a group expansion are isolated: the group gets one
//! error row and the walk continues with the remaining assignments.
//! Cancellation is the one exception and aborts the whole resolution.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::cache::KnownGroupCache;
use crate::core::claims::decode_group_identifier;
use crate::core::expander::GroupExpander;
use crate::core::levels::resolve_permission_levels;
use crate::core::system::is_system_principal;
use crate::core::traits::{DirectoryGroupSource, SiteGroupSource};
use crate::core::types::{
    AccessPath, GroupKey, KnownGroupEntry, PermissionRecord, PrincipalKind, PrincipalRef,
    RoleAssignment,
};
use crate::utils::error::{Result, ScanError};

const ACCESS_DIRECT: &str = "Direct Permissions";

const CYCLE_REMARK: &str = "Circular group nesting detected";

/// Rows produced by resolving one group, split by cacheability.
///
/// `cached` rows are relative to the resolved group and have been stored
/// under its key; ancestors incorporate them by prefixing their own
/// breadcrumb segment. `transient` rows describe the traversal itself
/// (cycle terminations) and are rendered but never cached.
struct Subtree {
    cached: Vec<KnownGroupEntry>,
    transient: Vec<KnownGroupEntry>,
}

impl Subtree {
    fn rows(&self) -> impl Iterator<Item = &KnownGroupEntry> {
        self.cached.iter().chain(self.transient.iter())
    }
}

/// Resolves the effective permissions of a site down to concrete users.
///
/// The sole entry point is [`resolve_site`](Self::resolve_site). The
/// resolver owns no per-run state; the caller provides the cache and the
/// cancellation token, so one resolver can serve concurrent scans.
pub struct PermissionResolver {
    expander: GroupExpander,
}

impl PermissionResolver {
    pub fn new(
        site_groups: Arc<dyn SiteGroupSource>,
        directory: Arc<dyn DirectoryGroupSource>,
    ) -> Self {
        Self {
            expander: GroupExpander::new(site_groups, directory),
        }
    }

    /// Resolve every role assignment of the site into flattened permission
    /// records.
    ///
    /// Assignments are processed in order. Assignments carrying nothing
    /// but placeholder permission levels are skipped. A failed group
    /// expansion becomes an error record; cancellation aborts the whole
    /// call without emitting partial results.
    pub async fn resolve_site(
        &self,
        site_url: &str,
        assignments: &[RoleAssignment],
        cache: &KnownGroupCache,
        cancel: &CancellationToken,
    ) -> Result<Vec<PermissionRecord>> {
        info!(site = %site_url, assignments = assignments.len(), "resolving site permissions");

        let run = SiteRun {
            expander: &self.expander,
            cache,
            cancel,
        };

        let mut records = Vec::new();
        for assignment in assignments {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            run.resolve_assignment(assignment, &mut records).await?;
        }

        let stats = cache.stats();
        info!(
            site = %site_url,
            records = records.len(),
            cache_hit_rate = stats.hit_rate(),
            "resolved site permissions"
        );
        Ok(records)
    }
}

/// Borrowed state of one `resolve_site` call.
struct SiteRun<'a> {
    expander: &'a GroupExpander,
    cache: &'a KnownGroupCache,
    cancel: &'a CancellationToken,
}

impl SiteRun<'_> {
    async fn resolve_assignment(
        &self,
        assignment: &RoleAssignment,
        records: &mut Vec<PermissionRecord>,
    ) -> Result<()> {
        let principal = &assignment.principal;
        debug!(
            kind = %principal.kind,
            principal = %principal.display_name,
            "resolving role assignment"
        );

        let levels = resolve_permission_levels(&assignment.role_definitions);
        if levels.is_empty() {
            debug!(principal = %principal.display_name, "no effective permission levels, skipping");
            return Ok(());
        }

        if is_system_principal(&principal.display_name) {
            records.push(PermissionRecord::new(
                ACCESS_DIRECT,
                &principal.display_name,
                "All Users",
                &levels,
                "",
            ));
            return Ok(());
        }

        match principal.kind {
            PrincipalKind::User => {
                records.push(PermissionRecord::new(
                    ACCESS_DIRECT,
                    "User",
                    &principal.login_or_id,
                    &levels,
                    "",
                ));
            }
            PrincipalKind::SharePointGroup => {
                self.resolve_sharepoint_group(principal, &levels, records)
                    .await?;
            }
            PrincipalKind::SecurityGroup => {
                let subtree = self
                    .resolve_security_group(principal.clone(), AccessPath::new(), levels.clone())
                    .await?;
                for row in subtree.rows() {
                    records.push(PermissionRecord::new(
                        ACCESS_DIRECT,
                        &row.account_type,
                        row.outcome.users(),
                        &levels,
                        row.outcome.remarks(),
                    ));
                }
            }
        }
        Ok(())
    }

    async fn resolve_sharepoint_group(
        &self,
        principal: &PrincipalRef,
        levels: &str,
        records: &mut Vec<PermissionRecord>,
    ) -> Result<()> {
        let access_type = format!("SharePoint Group '{}'", principal.display_name);
        let key = GroupKey::sharepoint(&principal.site_url, &principal.display_name);

        let _guard = self.cache.flight_guard(&key).await;

        if let Some(cached) = self.cache.lookup(&key) {
            for row in cached.iter() {
                records.push(PermissionRecord::new(
                    &access_type,
                    &row.account_type,
                    row.outcome.users(),
                    levels,
                    row.outcome.remarks(),
                ));
            }
            return Ok(());
        }

        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let expansion = match self.expander.expand(principal).await {
            Ok(expansion) => expansion,
            Err(err) if err.is_cancelled() => return Err(err),
            Err(err) => {
                warn!(group = %principal.display_name, error = %err, "SharePoint group expansion failed");
                let message = err.to_string();
                records.push(PermissionRecord::new(
                    &access_type,
                    "",
                    "",
                    levels,
                    &message,
                ));
                self.cache
                    .store(key, vec![KnownGroupEntry::failed("", levels, message)]);
                return Ok(());
            }
        };

        let mut entries = Vec::new();
        let mut transient = Vec::new();

        if !expansion.direct_users.is_empty() {
            entries.push(KnownGroupEntry::resolved(
                "User",
                levels,
                expansion.direct_users.join(" "),
            ));
        }

        // Nested security groups are resolved relative to this group; the
        // chain is seeded with the group's key so descendants know they
        // are not at the top of a flight.
        let path = AccessPath::new().descend(key.clone(), "");
        for nested in expansion.nested_groups {
            if is_system_principal(&nested.display_name) {
                entries.push(KnownGroupEntry::sentinel(&nested.display_name, levels));
                continue;
            }
            let subtree = self
                .resolve_security_group(nested, path.clone(), levels.to_string())
                .await?;
            entries.extend(subtree.cached);
            transient.extend(subtree.transient);
        }

        for row in entries.iter().chain(transient.iter()) {
            records.push(PermissionRecord::new(
                &access_type,
                &row.account_type,
                row.outcome.users(),
                levels,
                row.outcome.remarks(),
            ));
        }

        self.cache.store(key, entries);
        Ok(())
    }

    /// Resolve a security group and its nested subtree.
    ///
    /// Returned rows are relative to this group: each starts with the
    /// group's own breadcrumb segment. The group's cacheable rows are
    /// stored under its key before returning, post-order, so every group
    /// of the subtree ends up with its own complete entry list.
    fn resolve_security_group(
        &self,
        group: PrincipalRef,
        path: AccessPath,
        levels: String,
    ) -> BoxFuture<'_, Result<Subtree>> {
        Box::pin(async move {
            let decoded = decode_group_identifier(&group.login_or_id);
            let id_or_name = if decoded.id.is_empty() {
                group.display_name.clone()
            } else {
                decoded.id
            };
            let key = GroupKey::security(id_or_name);
            let segment = AccessPath::segment(&group.display_name);

            if path.contains(&key) {
                warn!(group = %group.display_name, chain = %path.render(), "circular group nesting");
                return Ok(Subtree {
                    cached: Vec::new(),
                    transient: vec![KnownGroupEntry::failed(&segment, &levels, CYCLE_REMARK)],
                });
            }

            // Flight locks are only taken at the top of a chain. Nested
            // expansions already run under their root's lock; taking a
            // second one here could deadlock two runs descending through
            // the same groups in opposite orders.
            let _guard = if path.is_empty() {
                Some(self.cache.flight_guard(&key).await)
            } else {
                None
            };

            if let Some(cached) = self.cache.lookup(&key) {
                debug!(group = %group.display_name, rows = cached.len(), "replaying cached group");
                return Ok(Subtree {
                    cached: (*cached).clone(),
                    transient: Vec::new(),
                });
            }

            if self.cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let expansion = match self.expander.expand(&group).await {
                Ok(expansion) => expansion,
                Err(err) if err.is_cancelled() => return Err(err),
                Err(err) => {
                    warn!(group = %group.display_name, error = %err, "security group expansion failed");
                    let entries =
                        vec![KnownGroupEntry::failed(&segment, &levels, err.to_string())];
                    self.cache.store(key, entries.clone());
                    return Ok(Subtree {
                        cached: entries,
                        transient: Vec::new(),
                    });
                }
            };

            let mut entries = Vec::new();
            let mut transient = Vec::new();

            if !expansion.direct_users.is_empty() {
                entries.push(KnownGroupEntry::resolved(
                    format!("{}User", segment),
                    &levels,
                    expansion.direct_users.join(" "),
                ));
            }

            let child_path = path.descend(key.clone(), segment.clone());
            for nested in expansion.nested_groups {
                if is_system_principal(&nested.display_name) {
                    entries.push(KnownGroupEntry::sentinel(&nested.display_name, &levels));
                    continue;
                }
                let subtree = self
                    .resolve_security_group(nested, child_path.clone(), levels.clone())
                    .await?;
                entries.extend(subtree.cached.iter().map(|row| row.prefixed(&segment)));
                transient.extend(subtree.transient.iter().map(|row| row.prefixed(&segment)));
            }

            self.cache.store(key, entries.clone());
            Ok(Subtree {
                cached: entries,
                transient,
            })
        })
    }
}
