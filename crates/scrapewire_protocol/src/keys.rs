//! Databag key conventions.
//!
//! Job entries and their acknowledgements share one flat key/value bucket
//! per relation, so the key prefix is what tells them apart.

/// Prefix for job entries published by the provider side.
pub const JOB_KEY_PREFIX: &str = "job_";

/// Prefix for acknowledgements published by the consumer side.
pub const RESPONSE_KEY_PREFIX: &str = "response_";

/// Databag key for a job entry.
pub fn databag_key(job_name: &str) -> String {
    format!("{JOB_KEY_PREFIX}{job_name}")
}

/// Databag key for the acknowledgement of a job.
pub fn response_key(job_name: &str) -> String {
    format!("{RESPONSE_KEY_PREFIX}{job_name}")
}

pub fn is_job_key(key: &str) -> bool {
    key.starts_with(JOB_KEY_PREFIX)
}

pub fn is_response_key(key: &str) -> bool {
    key.starts_with(RESPONSE_KEY_PREFIX)
}

/// Recover the job name from a job or response key, if the prefix matches.
pub fn job_name_of(key: &str) -> Option<&str> {
    key.strip_prefix(JOB_KEY_PREFIX)
        .or_else(|| key.strip_prefix(RESPONSE_KEY_PREFIX))
}
