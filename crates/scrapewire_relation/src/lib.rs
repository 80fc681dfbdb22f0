//! Relation endpoints for the scrape-job interface.
//!
//! The hosting platform hands each endpoint a set of relations, each with an
//! app-level databag we publish into and a peer databag we read from. This
//! crate models that surface behind the [`RelationStore`] trait, ships an
//! in-memory [`MemoryBus`] pairing both roles for embedders and tests, and
//! builds the two endpoint roles on top:
//!
//! - [`PublisherEndpoint`] registers jobs with one or every related
//!   consumer and reads acknowledgements back.
//! - [`SubscriberEndpoint`] collects published jobs, maintains the
//!   `has_jobs` / `new_jobs` flags, and acknowledges processed jobs.
//!
//! Certificate material travelling inside a job is spooled to disk with
//! [`certs::spool_certs`] so the resulting paths can be substituted during
//! rendering.

pub mod bus;
pub mod certs;
pub mod flags;
pub mod publisher;
pub mod subscriber;

pub use bus::{Databag, MemoryBus, RelationId, RelationStore, RoleView};
pub use certs::spool_certs;
pub use flags::{expand_flag, FlagSet, FLAG_AVAILABLE, FLAG_HAS_JOBS, FLAG_NEW_JOBS};
pub use publisher::PublisherEndpoint;
pub use subscriber::SubscriberEndpoint;

pub use scrapewire_protocol::{ProtocolError, Result};
