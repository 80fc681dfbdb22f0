//! Deterministic rendering of a job to a scrape-config JSON fragment.
//!
//! The output is spliced verbatim into the consumer's configuration file, so
//! it must be byte-stable for identical input: keys are emitted in
//! lexicographic order (serde_json's default map ordering) and the only
//! mutation points are the `job_name` injection and the certificate path
//! substitutions below.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;
use crate::job::{Job, JobData};

/// Local filesystem paths substituted into the job during rendering.
///
/// The caller must have written the job's `ca_cert` / `client_cert` /
/// `client_key` material to these paths before including the rendered output
/// in a config file; placeholder values in the incoming job data are simply
/// overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPaths {
    pub ca_file: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

impl RenderPaths {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Render a job to a canonical JSON string.
///
/// The job data is deep-copied, `job_name` is set to
/// `"{job_name}-{request_id}"`, and certificate file paths are rewritten:
///
/// - if `ca_file` is given, `ca_file` is set inside every top-level
///   `tls_config` mapping and inside each non-empty `tls_config` of every
///   `*_sd_configs` element;
/// - if both `cert_file` and `key_file` are given, the same traversal sets
///   `cert_file` and `key_file`.
///
/// Missing optional paths skip the corresponding branch. A `cert_file`
/// without a `key_file` (or vice versa) is ignored, the pair only makes
/// sense together.
pub fn render(job: &Job, paths: &RenderPaths) -> Result<String> {
    let mut data = job.request.job_data.clone();
    data.insert("job_name".to_string(), Value::String(job.rendered_name()));

    if let Some(ca_file) = &paths.ca_file {
        substitute(&mut data, &[("ca_file", path_value(ca_file))]);
    }

    if let (Some(cert_file), Some(key_file)) = (&paths.cert_file, &paths.key_file) {
        substitute(
            &mut data,
            &[
                ("cert_file", path_value(cert_file)),
                ("key_file", path_value(key_file)),
            ],
        );
    }

    Ok(serde_json::to_string(&Value::Object(data))?)
}

fn path_value(path: &Path) -> Value {
    Value::String(path.display().to_string())
}

/// Apply `fields` to the job-level `tls_config` and to the `tls_config` of
/// every service-discovery entry under `*_sd_configs` keys.
fn substitute(data: &mut JobData, fields: &[(&str, Value)]) {
    for (key, value) in data.iter_mut() {
        if key == "tls_config" {
            if let Value::Object(tls_config) = value {
                apply(tls_config, fields);
            }
        } else if key.ends_with("_sd_configs") {
            let Value::Array(sd_configs) = value else {
                continue;
            };
            for sd_config in sd_configs {
                let Some(sd_tls_config) = sd_config
                    .as_object_mut()
                    .and_then(|sd| sd.get_mut("tls_config"))
                    .and_then(Value::as_object_mut)
                else {
                    continue;
                };
                // An empty tls_config means the entry opted out of TLS.
                if sd_tls_config.is_empty() {
                    continue;
                }
                apply(sd_tls_config, fields);
            }
        }
    }
}

fn apply(tls_config: &mut JobData, fields: &[(&str, Value)]) {
    for (field, value) in fields {
        tls_config.insert((*field).to_string(), value.clone());
    }
}
