//! Color-naming oracle: the external per-hue lookup collaborator.
//!
//! The segmentation core depends only on the [`ColorOracle`] trait; the
//! production adapter here talks HTTP to a remote naming service, and test
//! doubles implement the same trait.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::OracleError;
use crate::types::{ColorDescriptor, Hsl, Rgb};

const USER_AGENT: &str = concat!("huemap/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Point-sampling oracle contract.
///
/// For a fixed (saturation, lightness) binding, `sample` must be a pure
/// function of its hue. Implementations may fail with a transient
/// [`OracleError`]; the core treats any failure as fatal for the run.
#[async_trait]
pub trait ColorOracle: Send + Sync {
    /// Name the color at one HSL point. `hue` is already normalized to
    /// `[0, 360)` by the caller.
    async fn sample(
        &self,
        hue: f64,
        saturation: f64,
        lightness: f64,
    ) -> Result<ColorDescriptor, OracleError>;
}

/// Response model for the remote naming endpoint.
#[derive(Debug, Deserialize)]
struct NamingResponse {
    name: NameField,
    rgb: RgbField,
    hsl: HslField,
}

#[derive(Debug, Deserialize)]
struct NameField {
    value: String,
}

#[derive(Debug, Deserialize)]
struct RgbField {
    value: String,
    r: u8,
    g: u8,
    b: u8,
}

#[derive(Debug, Deserialize)]
struct HslField {
    value: String,
    h: f64,
    s: f64,
    l: f64,
}

impl From<NamingResponse> for ColorDescriptor {
    fn from(response: NamingResponse) -> Self {
        ColorDescriptor {
            name: response.name.value,
            rgb: Rgb {
                value: response.rgb.value,
                r: response.rgb.r,
                g: response.rgb.g,
                b: response.rgb.b,
            },
            hsl: Hsl {
                value: response.hsl.value,
                h: response.hsl.h,
                s: response.hsl.s,
                l: response.hsl.l,
            },
        }
    }
}

/// HTTP adapter for a remote color-naming API.
pub struct HttpColorOracle {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpColorOracle {
    pub fn new(base_url: impl Into<String>, timeout_secs: Option<u64>) -> Result<Self, OracleError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(
                timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .map_err(|e| OracleError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ColorOracle for HttpColorOracle {
    async fn sample(
        &self,
        hue: f64,
        saturation: f64,
        lightness: f64,
    ) -> Result<ColorDescriptor, OracleError> {
        let url = format!("{}/id", self.base_url.trim_end_matches('/'));
        let hsl = format!("{hue},{saturation}%,{lightness}%");
        debug!("Oracle lookup: hsl({hsl})");

        let response = self
            .http_client
            .get(&url)
            .query(&[("hsl", hsl.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status(status.as_u16(), body));
        }

        let parsed: NamingResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Decode(e.to_string()))?;

        Ok(parsed.into())
    }
}
