//! Two-step token handshake.
//!
//! auth1 commits the server to an offset/length pair into the key material;
//! auth2 checks the base64 slice and answers with the area the session is
//! pinned to. The step-1 token is single-use input to step 2 and becomes the
//! session token only after verification passes.

use reqwest::Method;
use tracing::debug;

use crate::client::{Client, Session};
use crate::error::{Error, snippet};
use crate::headers;

/// Server-issued challenge from auth1: an opaque token plus the byte range
/// of the key material the client must prove possession of.
#[derive(Debug, Clone)]
pub struct AuthChallenge {
    pub token: String,
    pub key_offset: usize,
    pub key_length: usize,
}

impl Client {
    /// Run both handshake steps and store the verified session on the
    /// client. This is the only session mutator.
    pub async fn authorize(&mut self) -> Result<&Session, Error> {
        let challenge = self.auth1().await?;
        let partial_key = self
            .key
            .partial_key(challenge.key_offset, challenge.key_length)?;
        let tokens = self.auth2(&challenge.token, &partial_key).await?;
        let area_id = verify_area_response(&tokens, &self.expected_area)?;
        debug!(area_id, "handshake verified");

        Ok(&*self.session.insert(Session {
            auth_token: challenge.token,
            area_id,
        }))
    }

    /// Handshake step 1: request a challenge.
    pub async fn auth1(&self) -> Result<AuthChallenge, Error> {
        let url = self.api_url("v2/api/auth1")?;
        let resp = self.app_request(Method::GET, url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                context: "auth1",
                method: Method::GET,
                status,
                snippet: snippet(&body),
            });
        }

        let token = header_value(&resp, headers::AUTH_TOKEN)?;
        let key_length = header_usize(&resp, headers::KEY_LENGTH)?;
        let key_offset = header_usize(&resp, headers::KEY_OFFSET)?;
        debug!(key_offset, key_length, "auth1 challenge received");

        // The body carries nothing, but must be consumed so the pooled
        // connection is released.
        let _ = resp.bytes().await;

        Ok(AuthChallenge {
            token,
            key_offset,
            key_length,
        })
    }

    /// Handshake step 2: present the partial key, receive the area token
    /// list.
    pub async fn auth2(&self, auth_token: &str, partial_key: &str) -> Result<Vec<String>, Error> {
        let url = self.api_url("v2/api/auth2")?;
        let resp = self
            .app_request(Method::GET, url)
            .header(headers::AUTH_TOKEN, auth_token)
            .header(headers::PARTIAL_KEY, partial_key)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Status {
                context: "auth2",
                method: Method::GET,
                status,
                snippet: snippet(&body),
            });
        }

        Ok(body.split(',').map(str::to_owned).collect())
    }
}

/// Check the auth2 token list against the expected area code.
///
/// The first token is the area id; the rest (region name, slug, country) are
/// informational. An empty list or blank first token means the response is
/// malformed; a present-but-different first token means the handshake landed
/// in the wrong region.
pub(crate) fn verify_area_response(tokens: &[String], expected: &str) -> Result<String, Error> {
    let first = tokens.first().map(|t| t.trim()).unwrap_or("");
    if first.is_empty() {
        return Err(Error::EmptyAuthResponse);
    }
    if first != expected {
        return Err(Error::AreaMismatch {
            expected: expected.to_owned(),
            got: first.to_owned(),
        });
    }
    Ok(first.to_owned())
}

fn header_value(resp: &reqwest::Response, name: &'static str) -> Result<String, Error> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .ok_or(Error::MissingAuthHeader(name))
}

fn header_usize(resp: &reqwest::Response, name: &'static str) -> Result<usize, Error> {
    let value = header_value(resp, name)?;
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidAuthHeader {
            header: name,
            value,
        })
}
