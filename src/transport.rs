//! Device transport — discovery and pairing calls per device class
//!
//! The real protocol work (Bluetooth, mDNS, ADB, cast) happens in an
//! external backend; this module only speaks its HTTP API:
//!
//! - `POST /api/device/scan/{device_type}` — blocking discovery call
//! - `POST /api/device/pair` — connect/request call
//!
//! [`DeviceTransport`] is the capability the registry binds per device
//! type, so orchestrators dispatch through one point instead of
//! string-keyed branches.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::registry::DeviceTypeDescriptor;
use crate::store::DeviceRecord;
use crate::{Error, Result};

/// Scan and pair operations for one class of pairable device
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Discover devices of the given class
    ///
    /// The backend performs the real scan and blocks for its duration;
    /// the caller enforces the class's time budget around this call.
    ///
    /// # Errors
    ///
    /// Returns error on network failure or a backend-reported scan error.
    /// An empty device list is a valid result, not an error.
    async fn scan(&self, descriptor: &DeviceTypeDescriptor) -> Result<Vec<DeviceRecord>>;

    /// Issue the class-specific connect/request call
    ///
    /// For device classes with a real approval handshake the backend
    /// blocks until the user approved or declined on the target device.
    ///
    /// # Errors
    ///
    /// Returns error on network failure or timeout. A backend-reported
    /// rejection is an `Ok` outcome with `success == false`.
    async fn pair(&self, request: &PairRequest) -> Result<PairOutcome>;
}

/// Body of the pair call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRequest {
    pub device_id: String,
    pub device_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
}

impl PairRequest {
    /// Build a pair request for a discovered device
    #[must_use]
    pub fn for_device(device: &DeviceRecord) -> Self {
        Self {
            device_id: device.id.clone(),
            device_type: device.device_type_id.clone(),
            device_name: Some(device.name.clone()),
        }
    }
}

/// Backend verdict on a pair call
#[derive(Debug, Clone)]
pub struct PairOutcome {
    pub success: bool,
    pub message: Option<String>,
}

/// Wire shape of the scan response
#[derive(Debug, Deserialize)]
struct ScanResponse {
    success: bool,
    #[serde(default)]
    devices: Vec<WireDevice>,
    message: Option<String>,
}

/// Wire shape of a discovered device (untagged by device type)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDevice {
    id: String,
    name: String,
    ip: Option<String>,
    model: Option<String>,
    manufacturer: Option<String>,
    #[serde(default)]
    connected: bool,
    #[serde(default)]
    paired: bool,
}

impl WireDevice {
    fn into_record(self, device_type_id: &str) -> DeviceRecord {
        DeviceRecord {
            id: self.id,
            name: self.name,
            device_type_id: device_type_id.to_string(),
            paired: self.paired,
            connected: self.connected,
            ip: self.ip,
            model: self.model,
            manufacturer: self.manufacturer,
        }
    }
}

/// Wire shape of the pair response
#[derive(Debug, Deserialize)]
struct PairResponse {
    success: bool,
    message: Option<String>,
}

/// HTTP transport against the device backend
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DeviceTransport for HttpBackend {
    async fn scan(&self, descriptor: &DeviceTypeDescriptor) -> Result<Vec<DeviceRecord>> {
        let url = format!("{}/api/device/scan/{}", self.base_url, descriptor.id);
        tracing::debug!(device_type = %descriptor.id, url, "scan request");

        let response: ScanResponse = self
            .client
            .post(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "backend reported scan failure".to_string());
            return Err(Error::Scan(message));
        }

        let devices: Vec<DeviceRecord> = response
            .devices
            .into_iter()
            .map(|d| d.into_record(&descriptor.id))
            .collect();
        tracing::debug!(device_type = %descriptor.id, count = devices.len(), "scan response");
        Ok(devices)
    }

    async fn pair(&self, request: &PairRequest) -> Result<PairOutcome> {
        let url = format!("{}/api/device/pair", self.base_url);
        tracing::debug!(device_id = %request.device_id, device_type = %request.device_type, "pair request");

        let response: PairResponse = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(PairOutcome {
            success: response.success,
            message: response.message,
        })
    }
}
