//! The monitoring API client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::MonitorError;
use crate::types::{
    default_auth_candidates, value_str, AddDeviceResult, AuthCandidate, AuthScheme, BulkAddResult,
    ConnectionTest, DeviceGroup, DeviceMetadata, MonitorDevice, ScanResult, ScanResults,
    TokenResponse,
};

/// Default API port of the monitoring system.
pub const DEFAULT_PORT: u16 = 9644;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Safety margin subtracted from the token lifetime so a token is
/// refreshed before the server actually expires it.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Token lifetime assumed when the server omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Configuration for one [`MonitorClient`].
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub use_ssl: bool,
    pub verify_ssl: bool,
    pub timeout_secs: u64,
    /// Prefix for default device names (`<prefix>-<ip>`).
    pub device_name_prefix: String,
    /// Default group for single-device imports.
    pub import_group: String,
    /// Default group for bulk imports.
    pub bulk_import_group: String,
    /// Ordered token endpoints to try during authentication.
    pub auth_candidates: Vec<AuthCandidate>,
}

impl MonitorConfig {
    /// Configuration with the standard defaults for the given endpoint.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            use_ssl: true,
            verify_ssl: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            device_name_prefix: "inv".to_string(),
            import_group: "Inventory Imports".to_string(),
            bulk_import_group: "Inventory Bulk Import".to_string(),
            auth_candidates: default_auth_candidates(),
        }
    }
}

/// A bearer token and the instant it should be considered stale.
#[derive(Debug, Clone)]
struct AuthToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Strip a scheme from a configured host. The URL's port wins only
/// when the configured port was left at the default.
fn sanitize_host(host: &str, port: u16) -> (String, u16) {
    if host.starts_with("http://") || host.starts_with("https://") {
        if let Ok(parsed) = Url::parse(host) {
            if let Some(hostname) = parsed.host_str() {
                let effective_port = match parsed.port() {
                    Some(url_port) if port == DEFAULT_PORT => url_port,
                    _ => port,
                };
                return (hostname.to_string(), effective_port);
            }
        }
    }
    (host.to_string(), port)
}

/// Token expiry instant for a reported lifetime.
fn compute_expiry(expires_in: Option<i64>) -> DateTime<Utc> {
    let lifetime = expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Utc::now() + chrono::Duration::seconds(lifetime - TOKEN_EXPIRY_MARGIN_SECS)
}

/// A list body, or the array under `key` in an object envelope.
fn flatten_list(value: Value, key: &str) -> Vec<Value> {
    match value {
        Value::Array(entries) => entries,
        Value::Object(_) => value
            .get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Group list extraction: either a `{data:{groups:[...]}}` envelope, a
/// bare `{groups:[...]}` object, or a plain list.
fn flatten_groups(value: Value) -> Vec<Value> {
    if let Some(groups) = value.pointer("/data/groups").and_then(Value::as_array) {
        return groups.clone();
    }
    flatten_list(value, "groups")
}

/// Merge `overlay`'s keys into `base`, overwriting duplicates. Both
/// must be objects; anything else is a no-op.
fn merge_objects(base: &mut Value, overlay: Value) {
    if let (Some(base_map), Value::Object(overlay_map)) = (base.as_object_mut(), overlay) {
        base_map.extend(overlay_map);
    }
}

/// Authenticated HTTP client for the monitoring system's REST API.
///
/// One instance per unit of work: token refresh is not designed for
/// concurrent reuse across tasks.
pub struct MonitorClient {
    http: reqwest::Client,
    config: MonitorConfig,
    /// `{scheme}://{host}:{port}`; token endpoints hang off this.
    server_root: String,
    /// `{server_root}/api`; all regular endpoints hang off this.
    base_url: String,
    token: Option<AuthToken>,
}

impl MonitorClient {
    pub fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        let (host, port) = sanitize_host(&config.host, config.port);
        let scheme = if config.use_ssl { "https" } else { "http" };
        let server_root = format!("{scheme}://{host}:{port}");
        let base_url = format!("{server_root}/api");

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| MonitorError::api(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            server_root,
            base_url,
            token: None,
        })
    }

    fn token_expired(&self) -> bool {
        match &self.token {
            Some(token) => Utc::now() >= token.expires_at,
            None => true,
        }
    }

    /// Authenticate if there is no token or the current one is stale.
    async fn ensure_authenticated(&mut self) -> Result<(), MonitorError> {
        if self.token_expired() {
            self.authenticate().await?;
        }
        Ok(())
    }

    /// Walk the ordered candidate list until one endpoint yields a
    /// token. Fails only after every candidate has been tried.
    async fn authenticate(&mut self) -> Result<(), MonitorError> {
        let candidates = self.config.auth_candidates.clone();
        let mut last_error: Option<MonitorError> = None;

        for candidate in &candidates {
            debug!(
                path = %candidate.path,
                scheme = %candidate.scheme,
                "trying token endpoint"
            );

            let url = format!("{}{}", self.server_root, candidate.path);
            let request = match candidate.scheme {
                AuthScheme::Json => self.http.post(&url).json(&json!({
                    "username": self.config.username,
                    "password": self.config.password,
                })),
                AuthScheme::Basic => self
                    .http
                    .post(&url)
                    .basic_auth(&self.config.username, Some(&self.config.password)),
            };

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(path = %candidate.path, error = %e, "token endpoint unreachable");
                    last_error = Some(self.wrap_transport_error(e));
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                warn!(path = %candidate.path, status = status.as_u16(), "token endpoint rejected request");
                last_error = Some(MonitorError::api_status(
                    status.as_u16(),
                    format!("token endpoint {} returned HTTP {}", candidate.path, status.as_u16()),
                ));
                continue;
            }

            let parsed: TokenResponse = match response.json().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(path = %candidate.path, error = %e, "unparseable token response");
                    last_error = Some(MonitorError::api(format!(
                        "unparseable token response from {}: {e}",
                        candidate.path
                    )));
                    continue;
                }
            };

            match parsed.token_value() {
                Some(token) => {
                    self.token = Some(AuthToken {
                        value: token.to_string(),
                        expires_at: compute_expiry(parsed.expires_in),
                    });
                    info!(
                        path = %candidate.path,
                        scheme = %candidate.scheme,
                        "authenticated with monitoring system"
                    );
                    return Ok(());
                }
                None => {
                    warn!(path = %candidate.path, "token endpoint returned no token field");
                }
            }
        }

        Err(match last_error {
            Some(e) => MonitorError::Authentication(format!(
                "all token endpoints failed, last error: {e}"
            )),
            None => MonitorError::Authentication(
                "no token returned from any authentication endpoint".to_string(),
            ),
        })
    }

    fn wrap_transport_error(&self, e: reqwest::Error) -> MonitorError {
        if e.is_timeout() {
            MonitorError::api(format!(
                "request timeout after {} seconds",
                self.config.timeout_secs
            ))
        } else if e.is_connect() {
            MonitorError::api(format!("connection error: {e}"))
        } else {
            MonitorError::api(format!("request error: {e}"))
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        params: Option<&[(&str, String)]>,
        authenticated: bool,
    ) -> Result<reqwest::Response, MonitorError> {
        let mut request = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(params) = params {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if authenticated {
            if let Some(token) = &self.token {
                request = request.bearer_auth(&token.value);
            }
        }

        request.send().await.map_err(|e| self.wrap_transport_error(e))
    }

    /// Issue one API call. A 401 on an authenticated request clears
    /// the token, re-authenticates and retries exactly once; a second
    /// 401 is an authentication failure.
    async fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: Option<&[(&str, String)]>,
        authenticated: bool,
    ) -> Result<Value, MonitorError> {
        if authenticated {
            self.ensure_authenticated().await?;
        }

        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "monitoring API request");

        let mut response = self
            .send(method.clone(), &url, body, params, authenticated)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && authenticated {
            debug!(url = %url, "token rejected, re-authenticating once");
            self.token = None;
            self.ensure_authenticated().await?;
            response = self.send(method, &url, body, params, true).await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(MonitorError::Authentication(
                    "authentication rejected after token refresh".to_string(),
                ));
            }
        }

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MonitorError::api(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(MonitorError::api_status(
                status.as_u16(),
                format!("HTTP {}: {}", status.as_u16(), text),
            ));
        }

        // Some endpoints reply with an empty body; treat that as {}.
        Ok(serde_json::from_str(&text).unwrap_or_else(|_| Value::Object(Map::new())))
    }

    /// Test connectivity and authentication. Never fails; the outcome
    /// is reported in the returned result. On success the device count
    /// is included when the device list can be fetched.
    pub async fn test_connection(&mut self) -> ConnectionTest {
        match self
            .request(Method::GET, "/system/info", None, None, true)
            .await
        {
            Ok(_) => {
                let device_count = match self.get_devices(false).await {
                    Ok(devices) => Some(devices.len()),
                    Err(e) => {
                        warn!(error = %e, "device count unavailable during connection test");
                        None
                    }
                };
                ConnectionTest {
                    success: true,
                    message: "connection successful".to_string(),
                    device_count,
                }
            }
            Err(MonitorError::Authentication(_)) => ConnectionTest {
                success: false,
                message: "authentication failed - check username and password".to_string(),
                device_count: None,
            },
            Err(e) => ConnectionTest {
                success: false,
                message: e.to_string(),
                device_count: None,
            },
        }
    }

    /// List devices. With `include_details`, per-device detail is
    /// fetched and merged best-effort: a detail failure keeps the
    /// device with its summary fields only.
    pub async fn get_devices(
        &mut self,
        include_details: bool,
    ) -> Result<Vec<MonitorDevice>, MonitorError> {
        let response = self.request(Method::GET, "/devices", None, None, true).await?;
        let entries = flatten_list(response, "devices");

        let mut devices = Vec::with_capacity(entries.len());
        for mut entry in entries {
            if include_details {
                if let Some(id) = value_str(&entry, &["id", "deviceId"]) {
                    match self.get_device_details(&id).await {
                        Ok(detail) => merge_objects(&mut entry, detail),
                        Err(e) => warn!(
                            device_id = %id,
                            error = %e,
                            "failed to fetch device details, keeping summary fields"
                        ),
                    }
                }
            }
            devices.push(MonitorDevice::from_raw(entry));
        }
        Ok(devices)
    }

    pub async fn get_device_details(&mut self, device_id: &str) -> Result<Value, MonitorError> {
        self.request(Method::GET, &format!("/devices/{device_id}"), None, None, true)
            .await
    }

    /// Devices changed since the given instant.
    pub async fn get_updated_devices(
        &mut self,
        since: DateTime<Utc>,
    ) -> Result<Vec<MonitorDevice>, MonitorError> {
        let params = [("since", since.to_rfc3339())];
        let response = self
            .request(Method::GET, "/devices/updated", None, Some(&params), true)
            .await?;
        Ok(flatten_list(response, "devices")
            .into_iter()
            .map(MonitorDevice::from_raw)
            .collect())
    }

    pub async fn get_device_groups(&mut self) -> Result<Vec<DeviceGroup>, MonitorError> {
        let response = self
            .request(Method::GET, "/device-groups/-", None, None, true)
            .await?;
        Ok(flatten_groups(response)
            .into_iter()
            .map(DeviceGroup::from_raw)
            .collect())
    }

    pub async fn get_device_group_devices(
        &mut self,
        group_id: &str,
    ) -> Result<Vec<MonitorDevice>, MonitorError> {
        let response = self
            .request(
                Method::GET,
                &format!("/device-groups/{group_id}/devices"),
                None,
                None,
                true,
            )
            .await?;
        Ok(flatten_list(response, "devices")
            .into_iter()
            .map(MonitorDevice::from_raw)
            .collect())
    }

    /// Add a device by IP. Caller overrides are merged over the
    /// defaults (`device_name = "<prefix>-<ip>"`, the import group).
    pub async fn add_device_by_ip(
        &mut self,
        ip: &str,
        overrides: Option<Value>,
    ) -> Result<AddDeviceResult, MonitorError> {
        let mut data = json!({
            "ip_address": ip,
            "discovery_method": "ip",
        });
        if let Some(overrides) = overrides {
            merge_objects(&mut data, overrides);
        }
        if let Some(obj) = data.as_object_mut() {
            obj.entry("device_name").or_insert_with(|| {
                Value::String(format!("{}-{ip}", self.config.device_name_prefix))
            });
            obj.entry("group")
                .or_insert_with(|| Value::String(self.config.import_group.clone()));
        }

        let response = self
            .request(Method::POST, "/devices/add-by-ip", Some(&data), None, true)
            .await?;

        let success = response
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let device_id = value_str(&response, &["device_id", "deviceId", "id"]);
        let message = value_str(&response, &["message"])
            .unwrap_or_else(|| format!("device added for IP {ip}"));

        Ok(AddDeviceResult {
            success,
            device_id,
            message,
            details: response,
        })
    }

    pub async fn update_device(
        &mut self,
        device_id: &str,
        data: &Value,
    ) -> Result<Value, MonitorError> {
        self.request(
            Method::PUT,
            &format!("/devices/{device_id}"),
            Some(data),
            None,
            true,
        )
        .await
    }

    /// Push source-inventory metadata into the monitor's custom fields.
    pub async fn update_device_metadata(
        &mut self,
        device_id: &str,
        metadata: &DeviceMetadata,
    ) -> Result<Value, MonitorError> {
        let mut custom_fields = Map::new();
        let mapping = [
            ("source_device_name", &metadata.name),
            ("source_site", &metadata.site),
            ("source_device_role", &metadata.role),
            ("source_device_type", &metadata.device_type),
            ("source_platform", &metadata.platform),
            ("source_serial", &metadata.serial),
            ("source_asset_tag", &metadata.asset_tag),
        ];
        for (field, value) in mapping {
            if let Some(value) = value {
                custom_fields.insert(field.to_string(), Value::String(value.clone()));
            }
        }

        let mut data = json!({
            "metadata_source": "inventory",
            "custom_fields": custom_fields,
        });
        if let Some(description) = &metadata.description {
            merge_objects(
                &mut data,
                json!({ "description": format!("Inventory: {description}") }),
            );
        }

        self.request(
            Method::PUT,
            &format!("/devices/{device_id}/metadata"),
            Some(&data),
            None,
            true,
        )
        .await
    }

    pub async fn delete_device(&mut self, device_id: &str) -> Result<Value, MonitorError> {
        self.request(
            Method::DELETE,
            &format!("/devices/{device_id}"),
            None,
            None,
            true,
        )
        .await
    }

    /// Trigger a discovery scan for one IP. Fails if the remote side
    /// does not return a scan identifier.
    pub async fn scan_ip_address(
        &mut self,
        ip: &str,
        options: Option<Value>,
    ) -> Result<ScanResult, MonitorError> {
        let mut data = json!({
            "ip_address": ip,
            "scan_type": "discovery",
        });
        if let Some(options) = options {
            merge_objects(&mut data, options);
        }

        let response = self
            .request(Method::POST, "/scan/ip", Some(&data), None, true)
            .await?;

        let scan_id = value_str(&response, &["scan_id", "id"])
            .ok_or_else(|| MonitorError::api("no scan ID returned from IP scan request"))?;
        let success = response
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        Ok(ScanResult {
            success,
            scan_id,
            message: format!("scan initiated for IP {ip}"),
            details: response,
        })
    }

    /// Trigger a discovery scan over a network range.
    pub async fn scan_network(&mut self, network: &str) -> Result<Value, MonitorError> {
        let data = json!({ "network": network });
        self.request(Method::POST, "/scan/network", Some(&data), None, true)
            .await
    }

    pub async fn get_scan_status(&mut self, scan_id: &str) -> Result<Value, MonitorError> {
        self.request(
            Method::GET,
            &format!("/scan/{scan_id}/status"),
            None,
            None,
            true,
        )
        .await
    }

    pub async fn get_scan_results(&mut self, scan_id: &str) -> Result<ScanResults, MonitorError> {
        let response = self
            .request(
                Method::GET,
                &format!("/scan/{scan_id}/results"),
                None,
                None,
                true,
            )
            .await?;

        Ok(ScanResults {
            scan_id: scan_id.to_string(),
            status: value_str(&response, &["status"]),
            devices_found: response
                .get("devices_found")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            summary: response.get("summary").cloned().unwrap_or(Value::Null),
            errors: response
                .get("errors")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Batch-import IPs. Scan-after-add defaults to true.
    pub async fn bulk_add_ips(
        &mut self,
        ips: &[String],
        overrides: Option<Value>,
    ) -> Result<BulkAddResult, MonitorError> {
        let mut data = json!({
            "ip_addresses": ips,
            "operation": "bulk_add",
            "source": "inventory",
        });
        if let Some(overrides) = overrides {
            merge_objects(&mut data, overrides);
        }
        if let Some(obj) = data.as_object_mut() {
            obj.entry("group")
                .or_insert_with(|| Value::String(self.config.bulk_import_group.clone()));
            obj.entry("scan_after_add").or_insert(Value::Bool(true));
        }

        let response = self
            .request(Method::POST, "/devices/bulk-add", Some(&data), None, true)
            .await?;

        let scan_ids = response
            .get("scan_ids")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| match id {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(BulkAddResult {
            success: response
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            batch_id: value_str(&response, &["batch_id", "id"]),
            added_count: response
                .get("added_count")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            failed_count: response
                .get("failed_count")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            scan_ids,
            message: format!("bulk operation initiated for {} IP addresses", ips.len()),
            details: response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_host_plain() {
        assert_eq!(
            sanitize_host("monitor.example.com", 9644),
            ("monitor.example.com".to_string(), 9644)
        );
    }

    #[test]
    fn test_sanitize_host_strips_scheme() {
        assert_eq!(
            sanitize_host("https://monitor.example.com", 9644),
            ("monitor.example.com".to_string(), 9644)
        );
    }

    #[test]
    fn test_sanitize_host_url_port_wins_over_default() {
        assert_eq!(
            sanitize_host("https://monitor.example.com:8443", DEFAULT_PORT),
            ("monitor.example.com".to_string(), 8443)
        );
    }

    #[test]
    fn test_sanitize_host_explicit_port_wins_over_url() {
        assert_eq!(
            sanitize_host("https://monitor.example.com:8443", 9999),
            ("monitor.example.com".to_string(), 9999)
        );
    }

    #[test]
    fn test_compute_expiry_applies_margin() {
        let before = Utc::now();
        let expiry = compute_expiry(Some(600));
        let delta = (expiry - before).num_seconds();
        assert!((538..=540).contains(&delta), "unexpected delta {delta}");
    }

    #[test]
    fn test_compute_expiry_default_lifetime() {
        let before = Utc::now();
        let expiry = compute_expiry(None);
        let delta = (expiry - before).num_seconds();
        assert!((3538..=3540).contains(&delta), "unexpected delta {delta}");
    }

    #[test]
    fn test_flatten_list_bare_array() {
        let entries = flatten_list(json!([{"id": 1}, {"id": 2}]), "devices");
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_flatten_list_enveloped() {
        let entries = flatten_list(json!({"devices": [{"id": 1}]}), "devices");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_flatten_list_unexpected_shape() {
        assert!(flatten_list(json!("nope"), "devices").is_empty());
        assert!(flatten_list(json!({"other": 1}), "devices").is_empty());
    }

    #[test]
    fn test_flatten_groups_nested_envelope() {
        let groups = flatten_groups(json!({"data": {"groups": [{"id": 1}, {"id": 2}]}}));
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_flatten_groups_bare_list() {
        let groups = flatten_groups(json!([{"id": 1}]));
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_merge_objects_overwrites() {
        let mut base = json!({"a": 1, "b": 2});
        merge_objects(&mut base, json!({"b": 3, "c": 4}));
        assert_eq!(base, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_merge_objects_non_object_overlay_is_noop() {
        let mut base = json!({"a": 1});
        merge_objects(&mut base, json!([1, 2]));
        assert_eq!(base, json!({"a": 1}));
    }

    #[test]
    fn test_client_base_urls() {
        let client = MonitorClient::new(MonitorConfig::new(
            "https://monitor.example.com:8443",
            "user",
            "pass",
        ))
        .unwrap();
        assert_eq!(client.server_root, "https://monitor.example.com:8443");
        assert_eq!(client.base_url, "https://monitor.example.com:8443/api");
        assert!(client.token_expired());
    }

    #[test]
    fn test_client_http_scheme() {
        let mut config = MonitorConfig::new("monitor.example.com", "user", "pass");
        config.use_ssl = false;
        config.port = 8080;
        let client = MonitorClient::new(config).unwrap();
        assert_eq!(client.base_url, "http://monitor.example.com:8080/api");
    }
}
