//! Key material backing the auth handshake.
//!
//! auth1 answers with an offset/length pair; the client proves possession of
//! the current player key material by echoing back that byte range,
//! base64-encoded, in auth2. The blob must be byte-identical to what the
//! service verifies against, so the pc_html5 key is embedded verbatim and a
//! fetch path exists for provider-side version bumps.

use std::borrow::Cow;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Method;
use tracing::debug;

use crate::error::{Error, snippet};

/// Key material of the pc_html5 player, embedded verbatim.
pub const EMBEDDED_KEY: &[u8] = b"bcd151073c03b352e1ef2fd66c32209da9ca0afa";

/// Versioned player asset the key material originates from.
pub const PLAYER_ASSET_URL: &str = "https://radiko.jp/apps/js/flash/myplayer-release.swf";

#[derive(Debug, Clone)]
pub struct KeyMaterial {
    bytes: Cow<'static, [u8]>,
}

impl KeyMaterial {
    /// The embedded pc_html5 blob, matching the live verification path.
    pub fn embedded() -> Self {
        Self {
            bytes: Cow::Borrowed(EMBEDDED_KEY),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Cow::Owned(bytes),
        }
    }

    /// Download a key-material blob from a player asset URL.
    ///
    /// Fetch once and keep the result for the process lifetime; the blob
    /// only changes when the provider ships a new player version.
    pub async fn fetch(http: &reqwest::Client, asset_url: &str) -> Result<Self, Error> {
        let resp = http.get(asset_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                context: "key material asset",
                method: Method::GET,
                status,
                snippet: snippet(&body),
            });
        }
        let bytes = resp.bytes().await?.to_vec();
        debug!(size = bytes.len(), asset_url, "key material fetched");
        Ok(Self::from_bytes(bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte range `[offset, offset+length)` of the blob.
    pub fn slice(&self, offset: usize, length: usize) -> Result<&[u8], Error> {
        offset
            .checked_add(length)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(Error::KeyOutOfRange {
                offset,
                length,
                size: self.bytes.len(),
            })
    }

    /// Base64 of the byte range, in the form auth2 expects.
    pub fn partial_key(&self, offset: usize, length: usize) -> Result<String, Error> {
        Ok(BASE64.encode(self.slice(offset, length)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_key_shape() {
        let key = KeyMaterial::embedded();
        assert_eq!(key.len(), 40);
        assert!(!key.is_empty());
    }

    #[test]
    fn partial_key_encodes_requested_range() {
        let key = KeyMaterial::embedded();
        assert_eq!(
            key.partial_key(8, 16).unwrap(),
            "M2MwM2IzNTJlMWVmMmZkNg=="
        );
        assert_eq!(
            key.partial_key(0, 16).unwrap(),
            "YmNkMTUxMDczYzAzYjM1Mg=="
        );
    }

    #[test]
    fn full_range_is_valid() {
        let key = KeyMaterial::embedded();
        assert_eq!(key.slice(0, 40).unwrap(), EMBEDDED_KEY);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let key = KeyMaterial::embedded();
        match key.slice(32, 16) {
            Err(Error::KeyOutOfRange {
                offset,
                length,
                size,
            }) => {
                assert_eq!((offset, length, size), (32, 16, 40));
            }
            other => panic!("expected KeyOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_range_is_rejected() {
        let key = KeyMaterial::embedded();
        assert!(key.slice(usize::MAX, 2).is_err());
    }

    #[test]
    fn custom_blob_is_sliced_as_is() {
        let key = KeyMaterial::from_bytes(vec![1, 2, 3, 4]);
        assert_eq!(key.slice(1, 2).unwrap(), &[2, 3]);
        assert!(key.slice(3, 2).is_err());
    }
}
