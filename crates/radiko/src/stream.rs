//! Station stream descriptors.
//!
//! Stations advertise their playlist-creation endpoints as repeated `<url>`
//! elements with `areafree`/`timefree` attributes. The live path reads the
//! v2 multi-URL descriptor; timeshift endpoint discovery reads the v3
//! pc_html5 descriptor. Both share the same element shape.

use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, snippet};

/// One candidate playlist-creation endpoint from a station descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamUrl {
    #[serde(default, rename = "@areafree")]
    pub areafree: bool,
    #[serde(default, rename = "@timefree")]
    pub timefree: bool,
    #[serde(default)]
    pub playlist_create_url: String,
}

#[derive(Debug, Deserialize)]
struct StreamUrlList {
    #[serde(default, rename = "url")]
    urls: Vec<StreamUrl>,
}

impl Client {
    /// Multi-URL live stream descriptor for a station.
    pub async fn multi_stream_urls(&self, station_id: &str) -> Result<Vec<StreamUrl>, Error> {
        self.fetch_stream_urls(
            &format!("v2/station/stream_smh_multi/{station_id}.xml"),
            "stream_smh_multi descriptor",
        )
        .await
    }

    /// pc_html5 stream descriptor, the source of timefree endpoints.
    pub async fn stream_urls(&self, station_id: &str) -> Result<Vec<StreamUrl>, Error> {
        self.fetch_stream_urls(
            &format!("v3/station/stream/pc_html5/{station_id}.xml"),
            "station stream descriptor",
        )
        .await
    }

    async fn fetch_stream_urls(
        &self,
        path: &str,
        context: &'static str,
    ) -> Result<Vec<StreamUrl>, Error> {
        let url = self.api_url(path)?;
        let resp = self.request(Method::GET, url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Status {
                context,
                method: Method::GET,
                status,
                snippet: snippet(&body),
            });
        }

        let list: StreamUrlList = quick_xml::de::from_str(&body)?;
        debug!(count = list.urls.len(), context, "stream descriptor fetched");
        Ok(list.urls)
    }
}
