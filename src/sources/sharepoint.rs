//! SharePoint REST site group source
//!
//! Fetches the user collection of a site-local group via
//! `/_api/web/sitegroups/getbyname('...')/users`. Single quotes in the
//! group name are doubled per OData literal escaping. Principals other
//! than users and security groups (domain groups, application
//! principals) are skipped.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::traits::SiteGroupSource;
use crate::core::types::{PrincipalKind, SiteGroupMember};
use crate::sources::client::{DEFAULT_TIMEOUT_SECS, build_http_client, validate_url};
use crate::utils::error::{Result, ScanError};

const ACCEPT_JSON: &str = "application/json;odata=nometadata";

const PRINCIPAL_TYPE_USER: i32 = 1;
const PRINCIPAL_TYPE_SECURITY_GROUP: i32 = 4;

/// [`SiteGroupSource`] backed by the SharePoint REST API.
pub struct SharePointRestSource {
    client: Client,
    access_token: String,
}

impl SharePointRestSource {
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(access_token, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(access_token: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            access_token: access_token.into(),
        })
    }

    fn members_url(site_url: &str, group_name: &str) -> String {
        let escaped = group_name.replace('\'', "''");
        format!(
            "{}/_api/web/sitegroups/getbyname('{}')/users",
            site_url.trim_end_matches('/'),
            escaped
        )
    }
}

#[async_trait]
impl SiteGroupSource for SharePointRestSource {
    async fn fetch_group_members(
        &self,
        site_url: &str,
        group_name: &str,
    ) -> Result<Vec<SiteGroupMember>> {
        validate_url(site_url)?;
        let url = Self::members_url(site_url, group_name);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScanError::not_found(format!(
                "Site group '{}' not found on {}",
                group_name, site_url
            )));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), group = %group_name, "SharePoint request failed");
            return Err(ScanError::api(status.as_u16(), message));
        }

        let collection: SiteUserCollection = response.json().await?;
        let members: Vec<SiteGroupMember> = collection
            .value
            .into_iter()
            .filter_map(SiteUser::into_member)
            .collect();

        debug!(
            site = %site_url,
            group = %group_name,
            members = members.len(),
            "fetched site group members"
        );
        Ok(members)
    }
}

#[derive(Debug, Deserialize)]
struct SiteUserCollection {
    #[serde(default)]
    value: Vec<SiteUser>,
}

#[derive(Debug, Deserialize)]
struct SiteUser {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "LoginName", default)]
    login_name: String,
    #[serde(rename = "UserPrincipalName")]
    user_principal_name: Option<String>,
    #[serde(rename = "PrincipalType", default)]
    principal_type: i32,
    #[serde(rename = "AadObjectId")]
    aad_object_id: Option<AadObjectId>,
}

#[derive(Debug, Deserialize)]
struct AadObjectId {
    #[serde(rename = "NameId")]
    name_id: Option<String>,
}

impl SiteUser {
    fn into_member(self) -> Option<SiteGroupMember> {
        match self.principal_type {
            PRINCIPAL_TYPE_USER => Some(SiteGroupMember {
                display_name: self.title,
                login_or_id: self.user_principal_name.unwrap_or(self.login_name),
                kind: PrincipalKind::User,
                directory_id: None,
            }),
            PRINCIPAL_TYPE_SECURITY_GROUP => Some(SiteGroupMember {
                display_name: self.title,
                login_or_id: self.login_name,
                kind: PrincipalKind::SecurityGroup,
                directory_id: self.aad_object_id.and_then(|id| id.name_id),
            }),
            _ => None,
        }
    }
}
