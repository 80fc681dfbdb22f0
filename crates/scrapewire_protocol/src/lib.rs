//! Wire types for the scrape-job relation interface.
//!
//! A publisher deposits job requests into the app-level databag of a
//! relation, one entry per job, keyed `job_<name>`. A subscriber reads the
//! entries back out, tags each with a request id, and renders it to a
//! canonical JSON fragment for direct inclusion in a scrape configuration
//! file.
//!
//! # Databag entry format
//!
//! ```text
//! "job_<name>": {
//!     "job_name":    "<name>",
//!     "job_data":    { ...scrape job config... },
//!     "ca_cert":     "<PEM>" | null,
//!     "client_cert": "<PEM>" | null,
//!     "client_key":  "<PEM>" | null
//! }
//! ```
//!
//! Acknowledgements travel the other way under `response_<name>`.
//!
//! Rendering is byte-stable: keys are emitted in lexicographic order so the
//! consumer can detect changes by comparing strings (or fingerprints, see
//! [`render_fingerprint`]).

pub mod error;
pub mod fingerprint;
pub mod job;
pub mod keys;
pub mod render;

pub use error::{ProtocolError, Result};
pub use fingerprint::{render_fingerprint, set_fingerprint};
pub use job::{Job, JobData, JobRequest, JobResponse};
pub use keys::{databag_key, is_job_key, is_response_key, job_name_of, response_key};
pub use render::{render, RenderPaths};
