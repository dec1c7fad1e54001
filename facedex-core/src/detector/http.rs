//! HTTP client for a remote face-detection service.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{DetectorSource, FaceDetector};
use crate::error::{FacedexError, Result};
use crate::types::BoundingBox;

/// Configuration for the HTTP detector client.
#[derive(Debug, Clone)]
pub struct HttpDetectorConfig {
    /// Detection service base URL.
    pub api_url: String,
    /// Per-request timeout. Detection is fail-fast: on timeout the batch
    /// item fails and the queue substrate retries.
    pub timeout: Duration,
}

impl HttpDetectorConfig {
    /// Load from environment.
    ///
    /// Required: `FACEDEX_DETECTOR_URL`
    /// Optional: `FACEDEX_DETECTOR_TIMEOUT_SECS` (default 5)
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("FACEDEX_DETECTOR_URL").map_err(|_| {
            FacedexError::Unavailable("FACEDEX_DETECTOR_URL environment variable not set".into())
        })?;

        let timeout_secs = std::env::var("FACEDEX_DETECTOR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Detection request body: the photo as base64.
#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    image: &'a str,
}

/// Detection response: ordered list of face boxes.
#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    faces: Vec<DetectedFace>,
}

#[derive(Debug, Deserialize)]
struct DetectedFace {
    #[serde(rename = "box")]
    coordinates: [i64; 4],
}

/// Remote detection service client.
pub struct HttpDetector {
    client: Client,
    config: HttpDetectorConfig,
}

impl HttpDetector {
    #[instrument(level = "debug", skip_all, fields(api_url = %config.api_url))]
    pub fn new(config: HttpDetectorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| {
                FacedexError::Unavailable(format!("failed to create detector client: {e}"))
            })?;

        debug!("HTTP detector client created");
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(HttpDetectorConfig::from_env()?)
    }
}

#[async_trait]
impl FaceDetector for HttpDetector {
    #[instrument(level = "debug", skip_all, fields(image_len = image.len()))]
    async fn detect(&self, image: &[u8]) -> Result<Vec<BoundingBox>> {
        let url = format!("{}/detect", self.config.api_url);
        let encoded = BASE64.encode(image);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&DetectRequest { image: &encoded })
            .send()
            .await
            .map_err(|e| {
                let latency_ms = start.elapsed().as_millis() as u64;
                warn!(error = %e, latency_ms, "detection request failed");
                FacedexError::Unavailable(format!("detector request failed: {e}"))
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                return Err(FacedexError::InvalidInput(format!(
                    "detector rejected image: {}",
                    response.status()
                )));
            }
            status => {
                return Err(FacedexError::Unavailable(format!(
                    "detector returned status {status}"
                )));
            }
        }

        let parsed: DetectResponse = response.json().await.map_err(|e| {
            FacedexError::Unavailable(format!("failed to parse detector response: {e}"))
        })?;

        let boxes: Vec<BoundingBox> = parsed
            .faces
            .into_iter()
            .map(|f| {
                let [x1, y1, x2, y2] = f.coordinates;
                BoundingBox::new(x1, y1, x2, y2)
            })
            .collect();

        debug!(
            faces = boxes.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "detection completed"
        );
        Ok(boxes)
    }

    fn source_id(&self) -> DetectorSource {
        DetectorSource::Http
    }
}
