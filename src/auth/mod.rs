//! OAuth authorization for the YouTube Data API.
//!
//! Loads installed-app client secrets, reuses or refreshes a cached token, and
//! falls back to the interactive loopback consent flow when neither works.
//! The result is a single [`YouTubeClient`] that the engine uses for the
//! whole run.

pub mod flow;

use crate::config::secrets::{ExposeSecret, SecretString};
use crate::error::{Error, Result};
use crate::gateway::YouTubeClient;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Full read/write access to the account's YouTube data.
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

const TOKEN_FILE: &str = "token.json";

/// Tokens expiring within this window are refreshed up front. Long enough to
/// cover a typical run; a token that still expires mid-run is refreshed by
/// the client on its first 401.
const EXPIRY_SLACK_SECS: i64 = 600;

/// Top-level wrapper of a Google client secrets file.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

/// OAuth client registration, as downloaded from the Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: SecretString,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ClientSecrets {
    /// Load client secrets from a JSON file with an `installed` or `web` section.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Auth(format!("cannot read credentials {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(content)
            .map_err(|e| Error::Auth(format!("bad client secrets: {e}")))?;
        file.installed.or(file.web).ok_or_else(|| {
            Error::Auth("client secrets have no `installed` or `web` section".into())
        })
    }
}

/// Cached OAuth token.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredToken {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_at: DateTime<Utc>,
}

/// Serializable view of [`StoredToken`]; secrets are exposed only here.
#[derive(Serialize)]
struct StoredTokenRef<'a> {
    access_token: &'a str,
    refresh_token: Option<&'a str>,
    expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// Is the access token still usable at `now`?
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_SLACK_SECS) > now
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: SecretString,
    #[serde(default)]
    refresh_token: Option<SecretString>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

impl TokenResponse {
    /// Turn into a stored token. Refresh responses usually omit the refresh
    /// token, so the previous one is carried over.
    fn into_stored(self, previous_refresh: Option<SecretString>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
        }
    }
}

/// On-disk token cache under a directory.
#[derive(Debug, Clone)]
pub struct TokenCache {
    dir: PathBuf,
}

impl TokenCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    /// Read the cached token. A missing or unreadable cache yields `None`.
    pub fn load(&self) -> Option<StoredToken> {
        let content = std::fs::read_to_string(self.path()).ok()?;
        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(path = %self.path().display(), "ignoring corrupt token cache: {e}");
                None
            }
        }
    }

    /// Write the token, readable by the owner only.
    pub fn save(&self, token: &StoredToken) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let view = StoredTokenRef {
            access_token: token.access_token.expose_secret(),
            refresh_token: token.refresh_token.as_ref().map(|t| t.expose_secret()),
            expires_at: token.expires_at,
        };
        let json = serde_json::to_string_pretty(&view)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(self.path())?;
        // `mode` only applies on creation; tighten caches written earlier.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(json.as_bytes())?;
        file.sync_data()?;
        Ok(())
    }
}

/// Renews the access token mid-run and keeps the cache current.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    http: reqwest::Client,
    secrets: ClientSecrets,
    refresh: SecretString,
    cache: TokenCache,
}

impl TokenRefresher {
    pub fn new(
        http: reqwest::Client,
        secrets: ClientSecrets,
        refresh: SecretString,
        cache: TokenCache,
    ) -> Self {
        Self {
            http,
            secrets,
            refresh,
            cache,
        }
    }

    /// Fetch a new access token and persist it.
    pub async fn refresh(&self) -> Result<StoredToken> {
        let token = refresh_token(&self.http, &self.secrets, self.refresh.clone()).await?;
        self.cache.save(&token)?;
        info!("refreshed access token after rejection");
        Ok(token)
    }
}

/// Settings for [`authorize`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub credentials_path: PathBuf,
    pub application_name: String,
    pub token_dir: PathBuf,
    pub api_base_url: String,
}

/// Produce an authorized client, running the consent flow if needed.
pub async fn authorize(config: &AuthConfig) -> Result<YouTubeClient> {
    let secrets = ClientSecrets::load(&config.credentials_path)?;
    let cache = TokenCache::new(&config.token_dir);
    let http = reqwest::Client::new();

    let token = obtain_token(&http, &secrets, &cache).await?;
    cache.save(&token)?;

    let client = YouTubeClient::new(
        http.clone(),
        config.api_base_url.clone(),
        token.access_token,
        config.application_name.clone(),
    );
    Ok(match token.refresh_token {
        Some(refresh) => client.with_refresher(TokenRefresher::new(http, secrets, refresh, cache)),
        None => client,
    })
}

async fn obtain_token(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    cache: &TokenCache,
) -> Result<StoredToken> {
    let Some(cached) = cache.load() else {
        info!("no cached token, starting consent flow");
        return flow::run_loopback_flow(http, secrets).await;
    };

    if cached.is_fresh(Utc::now()) {
        info!("using cached token");
        return Ok(cached);
    }

    if let Some(refresh) = cached.refresh_token {
        match refresh_token(http, secrets, refresh).await {
            Ok(token) => {
                info!("refreshed access token");
                return Ok(token);
            }
            Err(e) => warn!("token refresh failed, starting consent flow: {e}"),
        }
    }

    flow::run_loopback_flow(http, secrets).await
}

/// Exchange a refresh token for a new access token.
pub async fn refresh_token(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    refresh: SecretString,
) -> Result<StoredToken> {
    let params = [
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.expose_secret()),
        ("refresh_token", refresh.expose_secret()),
        ("grant_type", "refresh_token"),
    ];
    let response = request_token(http, &secrets.token_uri, &params).await?;
    Ok(response.into_stored(Some(refresh)))
}

pub(crate) async fn request_token(
    http: &reqwest::Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = http.post(token_uri).form(params).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Auth(format!(
            "token endpoint returned {}: {body}",
            status.as_u16()
        )));
    }
    Ok(response.json().await?)
}
