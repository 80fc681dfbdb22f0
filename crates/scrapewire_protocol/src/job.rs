//! Job request, job, and acknowledgement payload types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Nested scrape-job configuration, as supplied by the embedding component.
///
/// serde_json's default `Map` is BTreeMap-backed, so key order is always
/// lexicographic. Rendering depends on that for byte-stable output.
pub type JobData = serde_json::Map<String, Value>;

/// A job registration as it travels through the relation databag.
///
/// Certificate material is optional; absent certs serialize as `null` to
/// match the historical entry shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Desired name for the job. The subscriber appends its request id to
    /// the final rendered name to ensure uniqueness.
    pub job_name: String,
    /// Config data for the job.
    pub job_data: JobData,
    /// Cert data for the CA used to validate connections.
    #[serde(default)]
    pub ca_cert: Option<String>,
    /// Cert data for the client used to make connections.
    #[serde(default)]
    pub client_cert: Option<String>,
    /// Key data for the client used to make connections.
    #[serde(default)]
    pub client_key: Option<String>,
}

impl JobRequest {
    pub fn new(job_name: impl Into<String>, job_data: JobData) -> Self {
        Self {
            job_name: job_name.into(),
            job_data,
            ca_cert: None,
            client_cert: None,
            client_key: None,
        }
    }

    pub fn with_tls(
        mut self,
        ca_cert: Option<String>,
        client_cert: Option<String>,
        client_key: Option<String>,
    ) -> Self {
        self.ca_cert = ca_cert;
        self.client_cert = client_cert;
        self.client_key = client_key;
        self
    }
}

/// A job as seen by the subscriber: the received request plus the request id
/// the subscriber assigned on read.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub request_id: String,
    pub request: JobRequest,
}

impl Job {
    pub fn new(request: JobRequest, request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            request,
        }
    }

    /// Build a job from a raw databag entry, assigning a fresh request id.
    ///
    /// Entries that are not mappings of the expected shape yield `None`; the
    /// subscriber skips them rather than failing the whole read.
    pub fn from_entry(value: &Value) -> Option<Self> {
        let request: JobRequest = serde_json::from_value(value.clone()).ok()?;
        Some(Self::new(request, Uuid::new_v4().to_string()))
    }

    /// The unique job name that ends up in the rendered config:
    /// `"{job_name}-{request_id}"`.
    pub fn rendered_name(&self) -> String {
        format!("{}-{}", self.request.job_name, self.request_id)
    }
}

/// Acknowledgement written back by the subscriber once a job has been
/// processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResponse {
    /// Whether or not the registration succeeded.
    pub success: bool,
    /// If failed, a description of why.
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
        }
    }
}
