//! Portal API client for the engine's side-effect boundaries.
//!
//! This crate provides the lightweight REST client behind the
//! [`EventSink`](cohort_engine::EventSink) and
//! [`CompletionSink`](cohort_engine::CompletionSink) traits. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Discovering credentials from `COHORT_API_TOKEN`
//! - Validating `COHORT_API_BASE` for safety
//! - Dispatching calls fire-and-forget, so a failed tracking or completion
//!   call never blocks workflow navigation
//!
//! The primary entry point is [`PortalClient`]. Create an instance via
//! [`PortalClient::new_from_env`] and hand it to the engine as a sink; every
//! sink call spawns onto the ambient Tokio runtime, and rejections are
//! caught and logged rather than propagated or retried.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use cohort_engine::{CompletionSink, EventSink};
use cohort_types::FlowKey;
use reqwest::{Client, Url, header};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Environment variable holding the bearer token, when the portal API
/// requires one.
pub const API_TOKEN_ENV: &str = "COHORT_API_TOKEN";

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "COHORT_API_BASE";

/// Default public base URL for the portal API.
pub const DEFAULT_API_BASE: &str = "https://api.cohort.example.com";

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Thin wrapper around a configured `reqwest::Client` for portal API access.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL. Authentication is read from the environment.
#[derive(Debug, Clone)]
pub struct PortalClient {
    base_url: String,
    http: Client,
}

impl PortalClient {
    /// Constructs a [`PortalClient`] from environment variables.
    ///
    /// The base URL is taken from `COHORT_API_BASE` (if set) or falls back
    /// to the default public API. Non-localhost hosts must use HTTPS.
    pub fn new_from_env() -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        if let Ok(api_token) = env::var(API_TOKEN_ENV) {
            let bearer = format!("Bearer {api_token}");
            let value = header::HeaderValue::from_str(&bearer).context("invalid characters in API token")?;
            default_headers.insert(header::AUTHORIZATION, value);
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        let base_url = env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.into());
        validate_base_url(&base_url)?;

        Ok(Self { base_url, http })
    }

    /// The validated base URL requests are built against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Persists a completed flow: `POST /admin/flows/complete`.
    pub async fn post_completion(&self, subject_id: &str, flow_key: &FlowKey) -> Result<()> {
        let url = format!("{}/admin/flows/complete", self.base_url);
        let body = json!({
            "subjectId": subject_id,
            "flowKey": flow_key.as_str(),
        });
        let response = self.http.post(&url).json(&body).send().await.context("send completion request")?;
        response.error_for_status().context("completion request rejected")?;
        debug!(flow = %flow_key, "flow completion persisted");
        Ok(())
    }

    /// Records a tracking event: `POST /admin/events`.
    pub async fn post_event(&self, subject_id: &str, event_name: &str, metadata: Option<Value>) -> Result<()> {
        let url = format!("{}/admin/events", self.base_url);
        let body = json!({
            "subjectId": subject_id,
            "eventName": event_name,
            "metadata": metadata,
            "occurredAt": Utc::now().to_rfc3339(),
        });
        let response = self.http.post(&url).json(&body).send().await.context("send event request")?;
        response.error_for_status().context("event request rejected")?;
        Ok(())
    }
}

impl EventSink for PortalClient {
    fn track(&self, subject_id: &str, event_name: &str, metadata: Option<Value>) {
        let client = self.clone();
        let subject_id = subject_id.to_string();
        let event_name = event_name.to_string();
        tokio::spawn(async move {
            if let Err(error) = client.post_event(&subject_id, &event_name, metadata).await {
                warn!(%error, event = %event_name, "event tracking failed");
            }
        });
    }
}

impl CompletionSink for PortalClient {
    fn mark_complete(&self, subject_id: &str, flow_key: &FlowKey) {
        let client = self.clone();
        let subject_id = subject_id.to_string();
        let flow_key = flow_key.clone();
        tokio::spawn(async move {
            if let Err(error) = client.post_completion(&subject_id, &flow_key).await {
                warn!(%error, flow = %flow_key, "flow completion persistence failed");
            }
        });
    }
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let parsed = Url::parse(base_url).with_context(|| format!("invalid {API_BASE_ENV}: {base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| anyhow!("{API_BASE_ENV} has no host: {base_url}"))?;

    if LOCALHOST_DOMAINS.contains(&host) {
        return Ok(());
    }
    if parsed.scheme() != "https" {
        anyhow::bail!("{API_BASE_ENV} must use https for non-local hosts: {base_url}");
    }
    Ok(())
}
