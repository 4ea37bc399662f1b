//! YouTube Data API v3 transport for `subscriptions.insert`.

use crate::auth::TokenRefresher;
use crate::config::secrets::{ExposeSecret, SecretString};
use crate::error::{Error, Result};
use crate::model::ChannelId;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::SubscriptionApi;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId<'a> {
    kind: &'static str,
    channel_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snippet<'a> {
    resource_id: ResourceId<'a>,
}

#[derive(Serialize)]
struct Subscription<'a> {
    snippet: Snippet<'a>,
}

/// Authorized client for the subscription endpoint.
///
/// Built once by [`crate::auth::authorize`] and reused for every call. With a
/// [`TokenRefresher`] attached, a 401 triggers one token refresh and a retry.
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    access_token: RwLock<SecretString>,
    refresher: Option<TokenRefresher>,
    application_name: String,
}

impl YouTubeClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        access_token: SecretString,
        application_name: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: RwLock::new(access_token),
            refresher: None,
            application_name: application_name.into(),
        }
    }

    pub fn with_refresher(mut self, refresher: TokenRefresher) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    fn subscriptions_url(&self) -> String {
        format!("{}/youtube/v3/subscriptions", self.base_url)
    }

    async fn post(&self, body: &Subscription<'_>) -> Result<reqwest::Response> {
        let request = {
            let token = self.access_token.read().await;
            self.http
                .post(self.subscriptions_url())
                .query(&[("part", "snippet")])
                .bearer_auth(token.expose_secret())
                .header(reqwest::header::USER_AGENT, self.application_name.as_str())
                .timeout(Duration::from_secs(30))
                .json(body)
        };
        Ok(request.send().await?)
    }
}

impl SubscriptionApi for YouTubeClient {
    async fn insert_subscription(&self, channel: &ChannelId) -> Result<()> {
        let body = Subscription {
            snippet: Snippet {
                resource_id: ResourceId {
                    kind: "youtube#channel",
                    channel_id: channel.as_str(),
                },
            },
        };

        let mut response = self.post(&body).await?;
        let refresher = (response.status() == StatusCode::UNAUTHORIZED)
            .then_some(self.refresher.as_ref())
            .flatten();
        if let Some(refresher) = refresher {
            warn!(channel = %channel, "access token rejected, refreshing");
            let token = refresher.refresh().await?;
            *self.access_token.write().await = token.access_token;
            response = self.post(&body).await?;
        }

        let status = response.status();
        if status.is_success() {
            debug!(channel = %channel, status = status.as_u16(), "subscription created");
            return Ok(());
        }

        // The body holds the API's error reasons, which drive classification.
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            body,
        })
    }
}
