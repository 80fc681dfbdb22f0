//! Spooling of in-band certificate material.
//!
//! Jobs can carry CA / client cert / client key data inline. Before the
//! rendered config can reference them, that material has to exist on disk;
//! this helper writes it under a caller-chosen directory and hands back the
//! paths for [`scrapewire_protocol::render`]. File layout:
//!
//! ```text
//! <dir>/<request_id>.ca.crt
//! <dir>/<request_id>.client.crt
//! <dir>/<request_id>.client.key
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use scrapewire_protocol::{Job, RenderPaths, Result};

/// Write a job's certificate material below `dir` and return the paths to
/// substitute during rendering.
///
/// Absent material leaves the corresponding path unset, which in turn skips
/// that substitution branch in the renderer. The directory is created if
/// needed.
pub fn spool_certs(job: &Job, dir: &Path) -> Result<RenderPaths> {
    let mut paths = RenderPaths::none();
    let request = &job.request;
    if request.ca_cert.is_none() && request.client_cert.is_none() && request.client_key.is_none() {
        return Ok(paths);
    }

    fs::create_dir_all(dir)?;

    if let Some(ca_cert) = &request.ca_cert {
        let path = dir.join(format!("{}.ca.crt", job.request_id));
        fs::write(&path, ca_cert)?;
        debug!(path = %path.display(), "spooled CA cert");
        paths.ca_file = Some(path);
    }
    if let Some(client_cert) = &request.client_cert {
        let path = dir.join(format!("{}.client.crt", job.request_id));
        fs::write(&path, client_cert)?;
        debug!(path = %path.display(), "spooled client cert");
        paths.cert_file = Some(path);
    }
    if let Some(client_key) = &request.client_key {
        let path = dir.join(format!("{}.client.key", job.request_id));
        fs::write(&path, client_key)?;
        debug!(path = %path.display(), "spooled client key");
        paths.key_file = Some(path);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapewire_protocol::{JobData, JobRequest};

    fn job(ca: Option<&str>, cert: Option<&str>, key: Option<&str>) -> Job {
        let request = JobRequest::new("node", JobData::new()).with_tls(
            ca.map(Into::into),
            cert.map(Into::into),
            key.map(Into::into),
        );
        Job::new(request, "rid")
    }

    #[test]
    fn writes_all_material() {
        let dir = tempfile::tempdir().unwrap();
        let paths = spool_certs(&job(Some("CA"), Some("CERT"), Some("KEY")), dir.path()).unwrap();

        let ca_file = paths.ca_file.unwrap();
        assert_eq!(ca_file, dir.path().join("rid.ca.crt"));
        assert_eq!(fs::read_to_string(ca_file).unwrap(), "CA");
        assert_eq!(
            fs::read_to_string(paths.cert_file.unwrap()).unwrap(),
            "CERT"
        );
        assert_eq!(fs::read_to_string(paths.key_file.unwrap()).unwrap(), "KEY");
    }

    #[test]
    fn partial_material_yields_partial_paths() {
        let dir = tempfile::tempdir().unwrap();
        let paths = spool_certs(&job(Some("CA"), None, None), dir.path()).unwrap();
        assert!(paths.ca_file.is_some());
        assert!(paths.cert_file.is_none());
        assert!(paths.key_file.is_none());
    }

    #[test]
    fn no_material_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("never-created");
        let paths = spool_certs(&job(None, None, None), &target).unwrap();
        assert_eq!(paths, RenderPaths::none());
        assert!(!target.exists());
    }
}
