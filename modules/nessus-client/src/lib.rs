//! HTTP client for the scanner REST API.

mod endpoints;
mod token;

pub use endpoints::*;
pub use token::extract_api_token;

use reqwest::{header::HeaderMap, header::HeaderValue, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use vault_core::ratelimiter::RateLimiter;
use vault_core::*;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub hostname: String,
    pub port: u16,
    pub access_key: String,
    pub secret_key: String,
    /// Scanners usually present self-signed certificates.
    pub verify_tls: bool,
    pub timeout_ms: u64,
    /// Requests per second; 0 disables pacing.
    pub qps: u32,
    /// Fetch the compliance API token at connect time.
    pub compliance: bool,
}

pub struct NessusClient {
    client: Client,
    base: Url,
    api_token: Option<String>,
    limiter: Option<RateLimiter>,
}

impl NessusClient {
    /// Build the client and, when compliance tracking is enabled, look up the
    /// API token the scanner web UI embeds in `/nessus6.js`.
    pub async fn connect(opts: &ClientOptions) -> Result<Self, SyncError> {
        let base = Url::parse(&format!("https://{}:{}", opts.hostname, opts.port))
            .map_err(|e| SyncError::config("nessus.hostname", e.to_string()))?;
        let keys = api_keys_header(&opts.access_key, &opts.secret_key);
        let mut headers = HeaderMap::new();
        let mut keys_value = HeaderValue::from_str(&keys)
            .map_err(|e| SyncError::config("nessus.access_key", e.to_string()))?;
        keys_value.set_sensitive(true);
        headers.insert("X-ApiKeys", keys_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(opts.timeout_ms.max(1)))
            .danger_accept_invalid_certs(!opts.verify_tls)
            .user_agent(format!("scan-vault/{}", vault_core::version()))
            .gzip(true)
            .build()
            .map_err(|e| SyncError::config("nessus", e.to_string()))?;

        let limiter = if opts.qps == 0 { None } else { Some(RateLimiter::new(opts.qps)) };
        let mut this = NessusClient { client, base, api_token: None, limiter };
        if opts.compliance {
            this.api_token = this.fetch_api_token().await;
        }
        Ok(this)
    }

    async fn fetch_api_token(&self) -> Option<String> {
        let body = match self.get_text(SCRIPT_PATH).await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "could not fetch scanner script; compliance requests go without API token");
                return None;
            }
        };
        let token = extract_api_token(&body);
        match &token {
            Some(_) => debug!("found compliance API token"),
            None => warn!("no API token found in scanner script; compliance requests go without it"),
        }
        token
    }

    fn url(&self, path: &str) -> Result<Url, SyncError> {
        self.base
            .join(path)
            .map_err(|e| SyncError::SourceUnavailable(format!("{path}: {e}")))
    }

    async fn send(&self, path: &str, with_token: bool) -> Result<reqwest::Response, SyncError> {
        if let Some(l) = &self.limiter {
            l.acquire().await;
        }
        let mut req = self.client.get(self.url(path)?);
        if with_token {
            if let Some(token) = &self.api_token {
                req = req.header("X-API-Token", token);
            }
        }
        let resp = req
            .send()
            .await
            .map_err(|e| SyncError::SourceUnavailable(format!("{path}: {e}")))?;
        let status = resp.status();
        debug!(%path, status = status.as_u16(), "scan source response");
        if !status.is_success() {
            return Err(SyncError::SourceUnavailable(format!("{path}: HTTP {}", status_label(status))));
        }
        Ok(resp)
    }

    async fn get_text(&self, path: &str) -> Result<String, SyncError> {
        self.send(path, false)
            .await?
            .text()
            .await
            .map_err(|e| SyncError::SourceUnavailable(format!("{path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, with_token: bool) -> Result<T, SyncError> {
        let bytes = self
            .send(path, with_token)
            .await?
            .bytes()
            .await
            .map_err(|e| SyncError::SourceUnavailable(format!("{path}: {e}")))?;
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(%path, body = %String::from_utf8_lossy(&bytes), "payload");
        }
        serde_json::from_slice(&bytes).map_err(|e| SyncError::malformed(path, e))
    }
}

fn status_label(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Value of the `X-ApiKeys` header.
pub fn api_keys_header(access_key: &str, secret_key: &str) -> String {
    format!("accessKey={access_key};secretKey={secret_key};")
}

impl ScanSource for NessusClient {
    async fn list_folders(&self) -> Result<Vec<Folder>, SyncError> {
        let list: FolderList = self.get_json(FOLDERS, false).await?;
        Ok(list.folders)
    }

    async fn list_scans(&self) -> Result<Vec<Scan>, SyncError> {
        let list: ScanList = self.get_json(SCANS, false).await?;
        Ok(list.scans)
    }

    async fn get_scan(&self, scan_id: ScanId) -> Result<ScanDetail, SyncError> {
        self.get_json(&scan_path(scan_id), false).await
    }

    async fn get_scan_run(&self, scan_id: ScanId, run_id: RunId) -> Result<RunDetail, SyncError> {
        self.get_json(&scan_run_path(scan_id, run_id), false).await
    }

    async fn get_host(&self, scan_id: ScanId, host_id: HostId, run_id: RunId) -> Result<HostDetail, SyncError> {
        self.get_json(&host_path(scan_id, host_id, run_id), false).await
    }

    async fn get_finding_output(
        &self,
        scan_id: ScanId,
        host_id: HostId,
        plugin_id: PluginId,
        run_id: RunId,
    ) -> Result<FindingOutput, SyncError> {
        self.get_json(&plugin_output_path(scan_id, host_id, plugin_id, run_id), false).await
    }

    async fn get_compliance_output(
        &self,
        scan_id: ScanId,
        host_id: HostId,
        compliance_id: PluginId,
        run_id: RunId,
    ) -> Result<ComplianceOutput, SyncError> {
        self.get_json(&compliance_output_path(scan_id, host_id, compliance_id, run_id), true).await
    }
}
