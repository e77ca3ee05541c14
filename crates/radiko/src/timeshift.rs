//! Timeshift (timefree) resolution.
//!
//! A past program is played back by asking a playlist-creation endpoint for
//! a manifest covering the program's exact broadcast window. The endpoint is
//! discovered from the station's pc_html5 descriptor; endpoint variants
//! disagree on the accepted HTTP verb, so the request is attempted as POST
//! and retried once as GET.

use chrono::DateTime;
use chrono_tz::Asia::Tokyo;
use chrono_tz::Tz;
use rand::TryRngCore;
use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::client::Client;
use crate::error::{Error, snippet};
use crate::m3u8;
use crate::program::find_program;
use crate::stream::StreamUrl;
use crate::DEFAULT_BASE_URL;
use crate::time::datetime_string;

/// lsid sent when the entropy source fails; the request still goes out.
const ZERO_LSID: &str = "00000000000000000000000000000000";

impl Client {
    /// Resolve the timeshift manifest URI for the program containing `at`.
    pub async fn timeshift_playlist(
        &self,
        station_id: &str,
        at: DateTime<Tz>,
    ) -> Result<String, Error> {
        let stations = self
            .date_programs(at.with_timezone(&Tokyo).date_naive())
            .await?;
        let program = find_program(&stations, station_id, at)?;
        let window = program.window()?;
        let ft = datetime_string(window.ft);
        let to = datetime_string(window.to);

        let endpoint = match select_timeshift_endpoint(&self.stream_urls(station_id).await?) {
            Some(url) => url.to_owned(),
            None => self.timeshift_endpoint.clone(),
        };
        debug!(endpoint = %endpoint, %ft, %to, "timeshift endpoint selected");

        let url = build_timeshift_url(&endpoint, station_id, &ft, &to, &random_lsid())?;

        match self.request_timeshift_playlist(Method::POST, url.clone()).await {
            Ok(uri) => Ok(uri),
            Err(err) if err.is_cancelled() => Err(err),
            Err(post_err) => {
                debug!(error = %post_err, "POST attempt failed, retrying as GET");
                self.request_timeshift_playlist(Method::GET, url).await
            }
        }
    }

    /// One attempt against the playlist-creation endpoint. Succeeds only on
    /// a 2xx status whose body is a valid M3U8 payload.
    async fn request_timeshift_playlist(&self, method: Method, url: Url) -> Result<String, Error> {
        let origin = self.base_url.as_str().trim_end_matches('/').to_owned();
        let resp = self
            .request(method.clone(), url)
            .header(reqwest::header::ACCEPT, "*/*")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .header(reqwest::header::PRAGMA, "no-cache")
            .header(reqwest::header::ORIGIN, &origin)
            .header(reqwest::header::REFERER, format!("{origin}/"))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Status {
                context: "timeshift playlist_create",
                method,
                status,
                snippet: snippet(&body),
            });
        }
        m3u8::get_uri(body.as_bytes())
    }
}

/// Prefer the area-locked timefree endpoint; area-free is a fallback.
/// Returns `None` when the descriptor advertises no timefree URL at all.
pub(crate) fn select_timeshift_endpoint(urls: &[StreamUrl]) -> Option<&str> {
    let mut fallback = None;
    for u in urls {
        if !u.timefree || u.playlist_create_url.is_empty() {
            continue;
        }
        if !u.areafree {
            return Some(u.playlist_create_url.as_str());
        }
        if fallback.is_none() {
            fallback = Some(u.playlist_create_url.as_str());
        }
    }
    fallback
}

fn build_timeshift_url(
    endpoint: &str,
    station_id: &str,
    ft: &str,
    to: &str,
    lsid: &str,
) -> Result<Url, Error> {
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut()
        .append_pair("station_id", station_id)
        .append_pair("start_at", ft)
        .append_pair("ft", ft)
        .append_pair("end_at", to)
        .append_pair("to", to)
        .append_pair("preroll", "2")
        .append_pair("l", "15")
        .append_pair("lsid", lsid)
        .append_pair("type", "b")
        .finish();
    Ok(url)
}

fn lsid_with<R: TryRngCore>(rng: &mut R) -> String {
    let mut buf = [0u8; 16];
    match rng.try_fill_bytes(&mut buf) {
        Ok(()) => hex::encode(buf),
        Err(_) => ZERO_LSID.to_owned(),
    }
}

/// Fresh per-request session identifier: 16 random bytes, hex-encoded.
/// Falls back to a fixed all-zero id when entropy is unavailable rather
/// than failing the request.
pub(crate) fn random_lsid() -> String {
    lsid_with(&mut rand::rngs::OsRng)
}

/// Browser-facing timeshift page for a program start time.
pub fn timeshift_web_url(station_id: &str, start: DateTime<Tz>) -> String {
    format!(
        "{DEFAULT_BASE_URL}/#!/ts/{station_id}/{}",
        datetime_string(start)
    )
}
