//! Webhook submission.
//!
//! The spreadsheet endpoint is called fire-and-forget: a request that was
//! dispatched counts as delivered and the response body is never read, so
//! acceptance by the remote side cannot be confirmed. Only failures to
//! dispatch are reported, unless `verify_status` opts into checking the HTTP
//! status code.

pub mod http;

use crate::report::Report;
use chrono::Local;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

pub use http::HttpTransport;

pub const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("webhook URL is not configured")]
    Config,
    #[error("missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<&'static str> },
    #[error("submission could not be dispatched: {0}")]
    Network(String),
    #[error("webhook answered with HTTP {status}")]
    Rejected { status: u16 },
    #[error("a submission is already in flight")]
    InFlight,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// What the transport observed once the request left the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub status: Option<u16>,
}

pub trait Transport {
    fn post_json(&self, url: &Url, body: &Value) -> Result<Delivery, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub timestamp: String,
    pub status: Option<u16>,
}

pub struct Submitter<T> {
    endpoint: Option<String>,
    transport: T,
    verify_status: bool,
}

impl<T: Transport> Submitter<T> {
    pub fn new(endpoint: Option<String>, transport: T) -> Self {
        Self {
            endpoint,
            transport,
            verify_status: false,
        }
    }

    pub fn verify_status(mut self, verify: bool) -> Self {
        self.verify_status = verify;
        self
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Checks configuration and identity fields before anything touches the
    /// network, then posts the report with a fresh `timestamp`.
    pub fn submit(&self, report: &Report) -> Result<SubmitReceipt, SubmitError> {
        let url = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
            .and_then(|endpoint| Url::parse(endpoint).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or(SubmitError::Config)?;

        let missing = report.missing_identity();
        if !missing.is_empty() {
            return Err(SubmitError::Validation { missing });
        }

        if report.incident_details_missing() {
            warn!("incident reported without details");
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let body = build_payload(report, &timestamp);

        debug!(host = url.host_str().unwrap_or_default(), "dispatching report");
        let delivery = self
            .transport
            .post_json(&url, &body)
            .map_err(|error| SubmitError::Network(error.0))?;

        if let Some(status) = delivery.status {
            debug!(status, "webhook responded");
            if self.verify_status && !(200..400).contains(&status) {
                return Err(SubmitError::Rejected { status });
            }
        }

        info!(
            teacher = %report.teacher_name,
            class = %report.class_grade,
            date = %report.date,
            "report submitted"
        );

        Ok(SubmitReceipt {
            timestamp,
            status: delivery.status,
        })
    }
}

/// All report fields plus the submission `timestamp`.
pub fn build_payload(report: &Report, timestamp: &str) -> Value {
    let mut body = serde_json::to_value(report).unwrap_or_else(|_| json!({}));
    if let Some(object) = body.as_object_mut() {
        object.insert("timestamp".to_string(), Value::String(timestamp.to_string()));
    }
    body
}
