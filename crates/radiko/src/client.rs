use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::{Client as HttpClient, Method, RequestBuilder};
use rustls::{ClientConfig as TlsConfig, crypto::ring};
use rustls_platform_verifier::BuilderVerifierExt;
use url::Url;

use crate::error::{Error, snippet};
use crate::key::KeyMaterial;
use crate::m3u8;
use crate::{DEFAULT_AREA_ID, DEFAULT_BASE_URL, DEFAULT_TIMESHIFT_ENDPOINT, USER_AGENT, app, headers};

/// Token/area pair produced by one handshake run.
///
/// The two values are only valid together; [`Client::authorize`] replaces
/// them as a unit and nothing else writes them.
#[derive(Debug, Clone)]
pub struct Session {
    pub auth_token: String,
    pub area_id: String,
}

/// Stateful API client.
///
/// Holds the HTTP client, the key material used by the handshake, and the
/// session produced by the last [`Client::authorize`] run. Mutating the
/// session requires `&mut self`, so concurrent handshakes against one client
/// are ruled out at compile time.
pub struct Client {
    pub(crate) http: HttpClient,
    pub(crate) base_url: Url,
    pub(crate) timeshift_endpoint: String,
    pub(crate) expected_area: String,
    pub(crate) key: KeyMaterial,
    pub(crate) session: Option<Session>,
}

impl Client {
    /// Client with the production endpoints and the embedded key material.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Session from the last successful handshake, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.auth_token.as_str())
    }

    pub fn area_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.area_id.as_str())
    }

    /// Replace the key material with a freshly fetched copy of a player
    /// asset. Only needed when the provider bumps the asset version.
    pub async fn refresh_key_material(&mut self, asset_url: &str) -> Result<(), Error> {
        self.key = KeyMaterial::fetch(&self.http, asset_url).await?;
        Ok(())
    }

    /// Resolve a playable manifest URI: live when `at` is `None`, timeshift
    /// for the program containing `at` otherwise. Run [`Client::authorize`]
    /// first.
    pub async fn resolve(
        &self,
        station_id: &str,
        at: Option<DateTime<Tz>>,
    ) -> Result<String, Error> {
        match at {
            Some(at) => self.timeshift_playlist(station_id, at).await,
            None => self.live_playlist(station_id).await,
        }
    }

    /// Fetch a chunklist playlist and return its segment URIs in playback
    /// order.
    pub async fn chunklist(&self, playlist_url: &str) -> Result<Vec<String>, Error> {
        let resp = self
            .request(Method::GET, Url::parse(playlist_url)?)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Status {
                context: "chunklist",
                method: Method::GET,
                status,
                snippet: snippet(&body),
            });
        }
        m3u8::get_chunklist(body.as_bytes())
    }

    /// Area used for geo-scoped requests: the verified session area once a
    /// handshake has run, the configured expectation before that.
    pub(crate) fn schedule_area(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.area_id.as_str())
            .unwrap_or(&self.expected_area)
    }

    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Request carrying only the fixed client-identity headers. The
    /// handshake itself uses this so a stale session never leaks into auth
    /// requests.
    pub(crate) fn app_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(headers::APP, app::NAME)
            .header(headers::APP_VERSION, app::VERSION)
            .header(headers::USER, app::USER)
            .header(headers::DEVICE, app::DEVICE)
    }

    /// Authenticated request: identity headers plus the session token and
    /// area id once a handshake has run.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut req = self.app_request(method, url);
        if let Some(session) = &self.session {
            req = req
                .header(headers::AUTH_TOKEN, &session.auth_token)
                .header(headers::AREA_ID, &session.area_id);
        }
        req
    }
}

/// Fluent configuration for [`Client`].
///
/// The endpoint and area defaults match the production service; overriding
/// them is for tests and provider API revisions.
pub struct ClientBuilder {
    http: Option<HttpClient>,
    base_url: String,
    timeshift_endpoint: String,
    expected_area: String,
    key: KeyMaterial,
}

impl ClientBuilder {
    fn new() -> Self {
        Self {
            http: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeshift_endpoint: DEFAULT_TIMESHIFT_ENDPOINT.to_owned(),
            expected_area: DEFAULT_AREA_ID.to_owned(),
            key: KeyMaterial::embedded(),
        }
    }

    /// Service root for API endpoints.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Fallback timeshift playlist-creation endpoint.
    pub fn timeshift_endpoint(mut self, url: impl Into<String>) -> Self {
        self.timeshift_endpoint = url.into();
        self
    }

    /// Area code auth2 must verify into.
    pub fn expected_area(mut self, area: impl Into<String>) -> Self {
        self.expected_area = area.into();
        self
    }

    /// Key material for the handshake, when the embedded blob is not the
    /// right version.
    pub fn key_material(mut self, key: KeyMaterial) -> Self {
        self.key = key;
        self
    }

    /// Bring your own HTTP client (proxy, custom timeouts).
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let base_url = Url::parse(&self.base_url)?;
        Ok(Client {
            http: self.http.unwrap_or_else(default_http_client),
            base_url,
            timeshift_endpoint: self.timeshift_endpoint,
            expected_area: self.expected_area,
            key: self.key,
            session: None,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn default_http_client() -> HttpClient {
    let provider = Arc::new(ring::default_provider());
    let tls_config = TlsConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("default TLS protocol versions")
        .with_platform_verifier()
        .expect("platform certificate verifier")
        .with_no_client_auth();

    HttpClient::builder()
        .use_preconfigured_tls(tls_config)
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to create HTTP client")
}
