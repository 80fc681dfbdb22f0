//! Endpoint state flags.
//!
//! Flags are how the endpoints signal "there is something to do" to the
//! embedding component's dispatch loop. Names follow the historical
//! `endpoint.<endpoint_name>.<state>` convention.

use std::collections::BTreeSet;

/// Set while at least one consumer has joined the relation.
pub const FLAG_AVAILABLE: &str = "endpoint.{endpoint_name}.available";

/// Set while at least one job is waiting in a received databag.
pub const FLAG_HAS_JOBS: &str = "endpoint.{endpoint_name}.has_jobs";

/// Set on job arrival, cleared explicitly once the consumer has processed
/// the batch. See [`crate::SubscriberEndpoint::clear_new_jobs`].
pub const FLAG_NEW_JOBS: &str = "endpoint.{endpoint_name}.new_jobs";

/// Substitute the endpoint name into a flag template.
pub fn expand_flag(template: &str, endpoint_name: &str) -> String {
    template.replace("{endpoint_name}", endpoint_name)
}

/// The set of currently raised flags for one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    raised: BTreeSet<String>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise or clear a flag according to `on`.
    pub fn toggle(&mut self, name: impl Into<String>, on: bool) {
        let name = name.into();
        if on {
            self.raised.insert(name);
        } else {
            self.raised.remove(&name);
        }
    }

    pub fn is_raised(&self, name: &str) -> bool {
        self.raised.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.raised.iter().map(String::as_str)
    }
}
