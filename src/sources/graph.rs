//! Microsoft Graph directory source
//!
//! Fetches security group membership from the Graph `/groups` endpoints,
//! following `@odata.nextLink` until the collection is exhausted. Objects
//! that are neither users nor groups (devices, service principals) are
//! skipped.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::traits::DirectoryGroupSource;
use crate::core::types::{DirectoryMember, DirectoryMemberKind};
use crate::sources::client::{DEFAULT_TIMEOUT_SECS, build_http_client, validate_url};
use crate::utils::error::{Result, ScanError};

const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

const MEMBER_QUERY: &str = "$select=id,displayName,userPrincipalName&$top=999";

const ODATA_TYPE_USER: &str = "#microsoft.graph.user";
const ODATA_TYPE_GROUP: &str = "#microsoft.graph.group";

/// [`DirectoryGroupSource`] backed by the Microsoft Graph REST API.
pub struct GraphDirectorySource {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GraphDirectorySource {
    /// Create a source against the public Graph endpoint.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(access_token, DEFAULT_BASE_URL)
    }

    /// Create a source against a custom endpoint, e.g. a sovereign cloud.
    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Self::with_options(access_token, base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_options(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let base_url = base_url.into();
        validate_url(&base_url)?;
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    /// Fetch one `/groups/{id}/{segment}` collection across all pages.
    async fn fetch_collection(&self, group_id: &str, segment: &str) -> Result<Vec<DirectoryMember>> {
        let mut url = format!(
            "{}/groups/{}/{}?{}",
            self.base_url, group_id, segment, MEMBER_QUERY
        );
        let mut members = Vec::new();
        let mut pages = 0u32;

        loop {
            let page = self.fetch_page(&url, group_id).await?;
            pages += 1;
            members.extend(page.value.into_iter().filter_map(DirectoryObject::into_member));
            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        debug!(
            group_id = %group_id,
            segment = %segment,
            members = members.len(),
            pages,
            "fetched directory collection"
        );
        Ok(members)
    }

    async fn fetch_page(&self, url: &str, group_id: &str) -> Result<DirectoryPage> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScanError::not_found(format!(
                "Directory group '{}' not found",
                group_id
            )));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), group_id = %group_id, "Graph request failed");
            return Err(ScanError::api(status.as_u16(), message));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DirectoryGroupSource for GraphDirectorySource {
    async fn fetch_owners_and_members(&self, group_id: &str) -> Result<Vec<DirectoryMember>> {
        let mut all = self.fetch_collection(group_id, "owners").await?;
        all.extend(self.fetch_collection(group_id, "members").await?);
        Ok(all)
    }

    async fn fetch_owners(&self, group_id: &str) -> Result<Vec<DirectoryMember>> {
        self.fetch_collection(group_id, "owners").await
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryPage {
    #[serde(default)]
    value: Vec<DirectoryObject>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectoryObject {
    #[serde(rename = "@odata.type", default)]
    odata_type: String,
    #[serde(default)]
    id: String,
    #[serde(rename = "displayName", default)]
    display_name: String,
    #[serde(rename = "userPrincipalName")]
    user_principal_name: Option<String>,
}

impl DirectoryObject {
    fn into_member(self) -> Option<DirectoryMember> {
        let kind = match self.odata_type.as_str() {
            ODATA_TYPE_USER => DirectoryMemberKind::User,
            ODATA_TYPE_GROUP => DirectoryMemberKind::SecurityGroup,
            _ => return None,
        };
        Some(DirectoryMember {
            display_name: self.display_name,
            id: self.id,
            kind,
            user_principal_name: self.user_principal_name,
        })
    }
}
