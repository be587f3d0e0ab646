//! JSON-over-HTTP implementation of the remote ports.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use super::{AccountingStartDateUpdate, OnboardingApi, OnboardingRecord, ProfileApi, UserProfile};
use crate::config::ClientConfig;
use crate::error::{Operation, PersistenceError};
use crate::onboarding::state::{DeviceType, OnboardingStatus};

/// Talks to the finance backend with a bearer token.
pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.config.id_token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// Send a request and decode a JSON body, mapping every failure to a
    /// `PersistenceError` for `operation`.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: Operation,
    ) -> Result<T, PersistenceError> {
        let resp = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| PersistenceError::new(operation, transport_message(&e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = read_error(resp).await;
            tracing::warn!(%operation, %status, %message, "Backend rejected request");
            return Err(PersistenceError::new(operation, message));
        }

        resp.json::<T>()
            .await
            .map_err(|e| PersistenceError::new(operation, format!("Invalid response: {e}")))
    }
}

fn transport_message(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timed out".to_string()
    } else if e.is_connect() {
        "Could not reach the server".to_string()
    } else {
        e.to_string()
    }
}

async fn read_error(resp: Response) -> String {
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp.text().await.unwrap_or_default();
    error_message(status, content_type.as_deref(), &body)
}

/// Pick the most human-readable message out of an error response.
///
/// Looks for `detail` (string, or the first `detail[].msg`), then `message`,
/// then `error` in a JSON object; falls back to the raw body, and for an
/// empty body to the status reason.
pub fn error_message(status: StatusCode, content_type: Option<&str>, body: &str) -> String {
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
    let trimmed = body.trim();
    let looks_json = trimmed.starts_with('{') || trimmed.starts_with('[');
    let data = if is_json || looks_json {
        serde_json::from_str::<serde_json::Value>(body).ok()
    } else {
        None
    };

    match data {
        Some(serde_json::Value::Object(obj)) => {
            let detail = obj.get("detail");
            if let Some(detail) = detail.and_then(|d| d.as_str()) {
                return detail.to_string();
            }
            if let Some(msg) = detail
                .and_then(|d| d.as_array())
                .and_then(|items| items.first())
                .and_then(|first| first.get("msg"))
                .and_then(|m| m.as_str())
            {
                return msg.to_string();
            }
            for key in ["message", "error"] {
                if let Some(s) = obj.get(key).and_then(|v| v.as_str()) {
                    return s.to_string();
                }
            }
            body.to_string()
        }
        Some(serde_json::Value::String(s)) => s,
        _ => body.to_string(),
    }
}

#[async_trait]
impl OnboardingApi for HttpBackend {
    async fn fetch_status(
        &self,
        device_type: DeviceType,
    ) -> Result<OnboardingRecord, PersistenceError> {
        let request = self
            .client
            .get(self.config.url("onboarding/status"))
            .query(&[("device_type", device_type.as_str())]);
        self.execute(request, Operation::LoadOnboardingStatus).await
    }

    async fn update_status(
        &self,
        device_type: DeviceType,
        status: OnboardingStatus,
    ) -> Result<OnboardingRecord, PersistenceError> {
        let body = OnboardingRecord {
            device_type,
            status,
        };
        let request = self.client.post(self.config.url("onboarding/status")).json(&body);
        self.execute(request, Operation::SaveOnboardingStatus).await
    }
}

#[async_trait]
impl ProfileApi for HttpBackend {
    async fn fetch_profile(&self) -> Result<UserProfile, PersistenceError> {
        let request = self.client.get(self.config.url("users/me"));
        self.execute(request, Operation::LoadProfile).await
    }

    async fn set_accounting_start_date(
        &self,
        date: NaiveDate,
    ) -> Result<UserProfile, PersistenceError> {
        let body = AccountingStartDateUpdate {
            accounting_start_date: date,
        };
        let request = self
            .client
            .put(self.config.url("users/me/accounting-start-date"))
            .json(&body);
        self.execute(request, Operation::SaveAccountingStartDate).await
    }
}
