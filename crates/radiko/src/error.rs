use reqwest::{Method, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("http transport error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("request cancelled or timed out before completion")]
    Cancelled,

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("xml decode error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("{context} failed with {method}: status={status} body={snippet:?}")]
    Status {
        context: &'static str,
        method: Method,
        status: StatusCode,
        snippet: String,
    },

    #[error("auth1 response is missing the {0} header")]
    MissingAuthHeader(&'static str),

    #[error("auth1 header {header} has a non-numeric value {value:?}")]
    InvalidAuthHeader {
        header: &'static str,
        value: String,
    },

    #[error("auth2 returned no area tokens; response is empty or malformed")]
    EmptyAuthResponse,

    #[error("auth2 verified into area {got:?}, expected {expected}")]
    AreaMismatch { expected: String, got: String },

    #[error("key range offset={offset} length={length} exceeds {size}-byte key material")]
    KeyOutOfRange {
        offset: usize,
        length: usize,
        size: usize,
    },

    #[error("playlist has no uri line")]
    NoPlaylistUri,

    #[error("chunklist has no segment lines")]
    EmptyChunklist,

    #[error("station {0} advertises no usable playlist_create url")]
    NoCandidate(String),

    #[error("station {0} not present in the program schedule")]
    StationNotFound(String),

    #[error("no program on {station} covers {at}")]
    ProgramNotFound { station: String, at: String },

    #[error("playlist_create returned an empty manifest body")]
    EmptyManifest,

    #[error("invalid datetime {0:?}, expected YYYYMMDDhhmmss")]
    InvalidDatetime(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // An exceeded deadline surfaces as a reqwest timeout; the timeshift
        // retry ladder must treat it as terminal rather than re-issuing.
        if err.is_timeout() {
            Error::Cancelled
        } else {
            Error::Http(err)
        }
    }
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Trimmed, bounded body excerpt for error context.
pub(crate) fn snippet(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_CHARS) {
        None => trimmed.to_owned(),
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
    }
}

#[cfg(test)]
mod tests {
    use super::snippet;

    #[test]
    fn snippet_trims_and_bounds() {
        assert_eq!(snippet("  hello \n"), "hello");

        let long = "x".repeat(300);
        let s = snippet(&long);
        assert_eq!(s.len(), 203);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let long = "あ".repeat(250);
        let s = snippet(&long);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), 203);
    }
}
