use super::envelope::PlatformEnvelope;
use crate::client::RequestExecutor;
use crate::transport::{Headers, HttpRequest, HttpResponse};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_ROOT: &str = "https://www.bungie.net/Platform";

/// Profile/character component codes requested by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Profiles,
    Characters,
    CharacterEquipment,
    ItemPerks,
    ItemStats,
    Vendors,
    VendorCategories,
    VendorSales,
}

impl ComponentType {
    pub fn code(&self) -> u16 {
        match self {
            ComponentType::Profiles => 100,
            ComponentType::Characters => 200,
            ComponentType::CharacterEquipment => 205,
            ComponentType::ItemPerks => 302,
            ComponentType::ItemStats => 304,
            ComponentType::Vendors => 400,
            ComponentType::VendorCategories => 401,
            ComponentType::VendorSales => 402,
        }
    }

    /// Comma-separated `components` query value.
    pub fn query(components: &[ComponentType]) -> String {
        components
            .iter()
            .map(|c| c.code().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Account match returned by a player search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoCard {
    pub membership_type: i32,
    pub membership_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bungie_global_display_name: Option<String>,
    #[serde(default)]
    pub bungie_global_display_name_code: Option<u16>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerSearch<'a> {
    display_name: &'a str,
    display_name_code: u16,
}

/// Platform API helpers on top of a [`RequestExecutor`].
///
/// Definition lookups go through the cache; anything reflecting live player
/// state does not. The bearer credential, if any, is obtained elsewhere and
/// handed in as-is.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    executor: Arc<RequestExecutor>,
    root: String,
    headers: Headers,
}

impl PlatformClient {
    pub fn new(executor: Arc<RequestExecutor>, api_key: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.insert("x-api-key".into(), api_key.into());
        headers.insert("content-type".into(), "application/json".into());
        Self {
            executor,
            root: DEFAULT_ROOT.to_string(),
            headers,
        }
    }

    /// Override the API root (primarily for testing against a local server).
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_bearer(mut self, token: impl AsRef<str>) -> Self {
        self.headers
            .insert("authorization".into(), format!("Bearer {}", token.as_ref()));
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, use_cache: bool) -> Result<T> {
        let request = HttpRequest::get(self.url(path)).with_headers(&self.headers);
        let response = self.executor.execute(use_cache, &request).await?;
        Self::unwrap_envelope(&response, path)
    }

    /// POST a JSON payload. Never cached.
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, payload: &B) -> Result<T> {
        let body = serde_json::to_value(payload)?;
        let request = HttpRequest::post_json(self.url(path), body).with_headers(&self.headers);
        let response = self.executor.execute(false, &request).await?;
        Self::unwrap_envelope(&response, path)
    }

    fn unwrap_envelope<T: DeserializeOwned>(response: &HttpResponse, path: &str) -> Result<T> {
        let envelope: PlatformEnvelope<T> = match response.json() {
            Ok(env) => env,
            Err(e) => {
                if response.is_success() {
                    return Err(e);
                }
                // Gateways in front of the API answer with HTML on outages.
                let snippet: String = response.text().chars().take(200).collect();
                return Err(Error::Remote {
                    status: response.status(),
                    error_code: 0,
                    error_status: "NonJsonResponse".to_string(),
                    message: snippet,
                });
            }
        };
        if !envelope.is_success() {
            warn!(
                path,
                status = response.status(),
                error_code = envelope.error_code,
                error_status = %envelope.error_status,
                "platform call returned no payload"
            );
        }
        envelope.into_result(response.status())
    }

    /// Current milestones. Cached: contents change on the weekly reset.
    pub async fn milestones(&self) -> Result<Value> {
        self.get("/Destiny2/Milestones/", true).await
    }

    /// Manifest definition of `entity_type` (e.g. `DestinyActivityDefinition`) by hash.
    pub async fn entity_definition(&self, entity_type: &str, hash: u32) -> Result<Value> {
        self.get(
            &format!("/Destiny2/Manifest/{}/{}/", entity_type, hash),
            true,
        )
        .await
    }

    pub async fn search_player(&self, display_name: &str, code: u16) -> Result<Vec<UserInfoCard>> {
        self.post(
            "/Destiny2/SearchDestinyPlayerByBungieName/-1/",
            &PlayerSearch {
                display_name,
                display_name_code: code,
            },
        )
        .await
    }

    pub async fn profile(
        &self,
        membership_type: i32,
        membership_id: &str,
        components: &[ComponentType],
    ) -> Result<Value> {
        self.get(
            &format!(
                "/Destiny2/{}/Profile/{}/?components={}",
                membership_type,
                membership_id,
                ComponentType::query(components)
            ),
            false,
        )
        .await
    }

    pub async fn character_vendors(
        &self,
        membership_type: i32,
        membership_id: &str,
        character_id: &str,
        components: &[ComponentType],
    ) -> Result<Value> {
        self.get(
            &format!(
                "/Destiny2/{}/Profile/{}/Character/{}/Vendors/?components={}",
                membership_type,
                membership_id,
                character_id,
                ComponentType::query(components)
            ),
            false,
        )
        .await
    }
}
