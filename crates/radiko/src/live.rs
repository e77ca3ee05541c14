//! Live stream resolution.
//!
//! The station's multi-URL descriptor lists several stream variants; only
//! the `playlist_create` endpoints return a playable manifest URI. The
//! area-locked variant is preferred so a verified session keeps working on
//! the non-premium flow; area-free is a fallback only.

use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::client::Client;
use crate::error::{Error, snippet};
use crate::stream::StreamUrl;

/// Path marker identifying playlist-creation endpoints among a station's
/// advertised stream URLs.
pub(crate) const PLAYLIST_CREATE_MARKER: &str = "/v2/api/playlist_create/";

/// Deterministic candidate selection: the first area-locked match wins
/// regardless of list order; the first match of any kind is the fallback.
pub(crate) fn select_live_url(urls: &[StreamUrl]) -> Option<&StreamUrl> {
    urls.iter()
        .find(|u| u.playlist_create_url.contains(PLAYLIST_CREATE_MARKER) && !u.areafree)
        .or_else(|| {
            urls.iter()
                .find(|u| u.playlist_create_url.contains(PLAYLIST_CREATE_MARKER))
        })
}

impl Client {
    /// Resolve the live manifest URI for a station.
    ///
    /// The playlist_create response body, trimmed, IS the manifest URI; an
    /// empty 2xx body is escalated rather than returned.
    pub async fn live_playlist(&self, station_id: &str) -> Result<String, Error> {
        let urls = self.multi_stream_urls(station_id).await?;
        let candidate =
            select_live_url(&urls).ok_or_else(|| Error::NoCandidate(station_id.to_owned()))?;
        debug!(
            url = %candidate.playlist_create_url,
            areafree = candidate.areafree,
            "live playlist_create candidate selected"
        );

        let url = Url::parse(&candidate.playlist_create_url)?;
        let resp = self.request(Method::GET, url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Status {
                context: "playlist_create",
                method: Method::GET,
                status,
                snippet: snippet(&body),
            });
        }

        let manifest = body.trim();
        if manifest.is_empty() {
            return Err(Error::EmptyManifest);
        }
        Ok(manifest.to_owned())
    }
}
