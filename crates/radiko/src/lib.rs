//! Client for radiko.jp's streaming API.
//!
//! Playback requires two things from the service: a session token from the
//! two-step handshake (auth1 hands out a byte range of the player key
//! material, auth2 verifies the base64-encoded slice and pins the session to
//! an area), and a playlist URI from one of the station's playlist-creation
//! endpoints. Both live and timeshift resolution are supported; everything
//! downstream of the resolved `.m3u8` URI (decoding, playback) is a caller
//! concern.
//!
//! ```no_run
//! use radiko::Client;
//!
//! # async fn run() -> Result<(), radiko::Error> {
//! let mut client = Client::new()?;
//! client.authorize().await?;
//! let manifest = client.resolve("LFR", None).await?;
//! println!("{manifest}");
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod live;
mod timeshift;

pub mod error;
pub mod key;
pub mod m3u8;
pub mod program;
pub mod stream;
pub mod time;

pub use auth::AuthChallenge;
pub use client::{Client, ClientBuilder, Session};
pub use error::Error;
pub use key::KeyMaterial;
pub use program::{Program, ProgramWindow, Station, find_program};
pub use stream::StreamUrl;
pub use timeshift::timeshift_web_url;

/// Service root for API and web endpoints.
pub const DEFAULT_BASE_URL: &str = "https://radiko.jp";

/// Playlist-creation endpoint used for timeshift when the station descriptor
/// advertises no timefree URL of its own.
pub const DEFAULT_TIMESHIFT_ENDPOINT: &str =
    "https://tf-f-rpaa-radiko.smartstream.ne.jp/tf/playlist.m3u8";

/// Area code the handshake is expected to verify into.
pub const DEFAULT_AREA_ID: &str = "JP13";

pub(crate) const USER_AGENT: &str = concat!("radiko-rs/", env!("CARGO_PKG_VERSION"));

/// Header names are a fixed contract with the service and must be sent
/// verbatim.
pub(crate) mod headers {
    pub const APP: &str = "X-Radiko-App";
    pub const APP_VERSION: &str = "X-Radiko-App-Version";
    pub const USER: &str = "X-Radiko-User";
    pub const DEVICE: &str = "X-Radiko-Device";
    pub const AUTH_TOKEN: &str = "X-Radiko-AuthToken";
    pub const PARTIAL_KEY: &str = "X-Radiko-Partialkey";
    pub const AREA_ID: &str = "X-Radiko-AreaId";
    pub const KEY_LENGTH: &str = "X-Radiko-KeyLength";
    pub const KEY_OFFSET: &str = "X-Radiko-KeyOffset";
}

/// Client identity presented on every request, matching the pc_html5 web
/// player.
pub(crate) mod app {
    pub const NAME: &str = "pc_html5";
    pub const VERSION: &str = "0.0.1";
    pub const USER: &str = "dummy_user";
    pub const DEVICE: &str = "pc";
}
