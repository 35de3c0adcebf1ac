//! Group expansion
//!
//! One level of the membership graph: given a group principal, fetch its
//! members from the right remote source and partition them into direct
//! users and nested groups still to be resolved.

use std::sync::Arc;

use tracing::debug;

use crate::core::claims::{MembershipScope, decode_group_identifier};
use crate::core::traits::{DirectoryGroupSource, SiteGroupSource};
use crate::core::types::{
    DirectoryMemberKind, Expansion, PrincipalKind, PrincipalRef,
};
use crate::utils::error::Result;

/// Facade over the two remote membership sources, dispatching on
/// principal kind.
pub struct GroupExpander {
    site_groups: Arc<dyn SiteGroupSource>,
    directory: Arc<dyn DirectoryGroupSource>,
}

impl GroupExpander {
    pub fn new(
        site_groups: Arc<dyn SiteGroupSource>,
        directory: Arc<dyn DirectoryGroupSource>,
    ) -> Self {
        Self {
            site_groups,
            directory,
        }
    }

    /// Expand one group principal by one level.
    ///
    /// A `User` principal has nothing to expand and comes back as its own
    /// single direct user.
    pub async fn expand(&self, principal: &PrincipalRef) -> Result<Expansion> {
        match principal.kind {
            PrincipalKind::User => Ok(Expansion {
                direct_users: vec![principal.login_or_id.clone()],
                nested_groups: Vec::new(),
            }),
            PrincipalKind::SharePointGroup => self.expand_site_group(principal).await,
            PrincipalKind::SecurityGroup => self.expand_security_group(principal).await,
        }
    }

    async fn expand_site_group(&self, principal: &PrincipalRef) -> Result<Expansion> {
        debug!(
            group = %principal.display_name,
            site = %principal.site_url,
            "expanding SharePoint group"
        );

        let members = self
            .site_groups
            .fetch_group_members(&principal.site_url, &principal.display_name)
            .await?;

        let mut expansion = Expansion::default();
        for member in members {
            match member.kind {
                PrincipalKind::User => expansion.direct_users.push(member.login_or_id),
                PrincipalKind::SecurityGroup => {
                    let id = member
                        .directory_id
                        .unwrap_or_else(|| member.login_or_id.clone());
                    expansion.nested_groups.push(PrincipalRef::security_group(
                        member.display_name,
                        id,
                        principal.site_url.clone(),
                    ));
                }
                // SharePoint groups do not nest
                PrincipalKind::SharePointGroup => {}
            }
        }

        debug!(
            group = %principal.display_name,
            users = expansion.direct_users.len(),
            nested = expansion.nested_groups.len(),
            "expanded SharePoint group"
        );
        Ok(expansion)
    }

    async fn expand_security_group(&self, principal: &PrincipalRef) -> Result<Expansion> {
        let decoded = decode_group_identifier(&principal.login_or_id);
        debug!(
            group = %principal.display_name,
            id = %decoded.id,
            scope = ?decoded.scope,
            "expanding security group"
        );

        let members = match decoded.scope {
            MembershipScope::OwnersOnly => self.directory.fetch_owners(&decoded.id).await?,
            MembershipScope::OwnersAndMembers => {
                self.directory.fetch_owners_and_members(&decoded.id).await?
            }
        };

        let mut expansion = Expansion::default();
        for member in members {
            match member.kind {
                DirectoryMemberKind::User => {
                    let login = member.user_principal_name.unwrap_or(member.id);
                    expansion.direct_users.push(login);
                }
                DirectoryMemberKind::SecurityGroup => {
                    expansion.nested_groups.push(PrincipalRef::security_group(
                        member.display_name,
                        member.id,
                        principal.site_url.clone(),
                    ));
                }
            }
        }

        debug!(
            group = %principal.display_name,
            users = expansion.direct_users.len(),
            nested = expansion.nested_groups.len(),
            "expanded security group"
        );
        Ok(expansion)
    }
}
