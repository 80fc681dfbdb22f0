//! Command implementations for the scrapewire binary.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use uuid::Uuid;

use scrapewire_protocol::{
    databag_key, is_job_key, render, render_fingerprint, Job, JobRequest, RenderPaths,
};
use scrapewire_relation::{MemoryBus, RelationStore, SubscriberEndpoint};

/// Render a job request file the way a consumer would.
pub fn render_request(
    request_path: &Path,
    request_id: Option<String>,
    paths: RenderPaths,
    fingerprint: bool,
) -> Result<()> {
    let raw = fs::read_to_string(request_path)
        .with_context(|| format!("Failed to read {}", request_path.display()))?;
    let request: JobRequest = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a job request", request_path.display()))?;

    let request_id = request_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let job = Job::new(request, request_id);
    let rendered = render(&job, &paths)?;

    if fingerprint {
        println!("{}", render_fingerprint(&rendered));
    } else {
        println!("{rendered}");
    }
    Ok(())
}

/// Report which entries of a databag snapshot a consumer would accept.
///
/// The snapshot is replayed through the in-memory bus so the answer comes
/// from the same subscriber code path a consumer runs.
pub fn inspect_databag(databag_path: &Path) -> Result<()> {
    let raw = fs::read_to_string(databag_path)
        .with_context(|| format!("Failed to read {}", databag_path.display()))?;
    let snapshot: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", databag_path.display()))?;
    let entries = snapshot
        .as_object()
        .with_context(|| format!("{} is not a JSON object", databag_path.display()))?;

    let mut bus = MemoryBus::new();
    let relation = bus.connect();
    let mut view = bus.publisher();
    for (key, value) in entries {
        view.publish(relation, key.clone(), value.clone());
    }
    view.flush(relation);

    let mut subscriber = SubscriberEndpoint::new("scrape-jobs");
    subscriber.manage_flags(&bus.subscriber());
    let jobs = subscriber.jobs(&bus.subscriber());
    let accepted: BTreeSet<String> = jobs
        .iter()
        .map(|job| databag_key(&job.request.job_name))
        .collect();

    for key in entries.keys() {
        if accepted.contains(key) {
            println!("job       {key}");
        } else if is_job_key(key) {
            println!("malformed {key}  (not a job entry)");
        } else {
            println!("skip      {key}  (no job_ prefix)");
        }
    }
    println!("{} job(s) of {} entries", jobs.len(), entries.len());
    for flag in subscriber.flags().iter() {
        println!("flag      {flag}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_json(dir: &Path, name: &str, value: &Value) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn render_request_accepts_entry_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "request.json",
            &json!({"job_name": "node", "job_data": {"metrics_path": "/metrics"}}),
        );
        render_request(&path, Some("rid".into()), RenderPaths::none(), false).unwrap();
    }

    #[test]
    fn render_request_rejects_non_requests() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(dir.path(), "request.json", &json!(["not", "a", "request"]));
        let err = render_request(&path, None, RenderPaths::none(), false).unwrap_err();
        assert!(err.to_string().contains("not a job request"));
    }

    #[test]
    fn inspect_rejects_non_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(dir.path(), "databag.json", &json!([1, 2, 3]));
        let err = inspect_databag(&path).unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn inspect_counts_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "databag.json",
            &json!({
                "job_node": {"job_name": "node", "job_data": {}},
                "response_node": {"success": true},
                "job_broken": "oops",
            }),
        );
        inspect_databag(&path).unwrap();
    }
}
