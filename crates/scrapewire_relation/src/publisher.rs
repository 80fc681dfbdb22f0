//! Publishing side of the scrape-job interface.

use tracing::{debug, info};

use scrapewire_protocol::{
    databag_key, is_response_key, job_name_of, JobRequest, JobResponse, Result,
};

use crate::bus::{RelationId, RelationStore};
use crate::flags::{expand_flag, FlagSet, FLAG_AVAILABLE};

/// Endpoint that registers scrape jobs with related consumers.
#[derive(Debug)]
pub struct PublisherEndpoint {
    endpoint_name: String,
    flags: FlagSet,
}

impl PublisherEndpoint {
    pub fn new(endpoint_name: impl Into<String>) -> Self {
        Self {
            endpoint_name: endpoint_name.into(),
            flags: FlagSet::new(),
        }
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Recompute state flags from relation state. Call on every relation
    /// event: `endpoint.<name>.available` tracks whether any consumer has
    /// joined.
    pub fn manage_flags(&mut self, store: &impl RelationStore) {
        let joined = store.relation_ids().iter().any(|id| store.is_joined(*id));
        self.flags
            .toggle(expand_flag(FLAG_AVAILABLE, &self.endpoint_name), joined);
    }

    /// Register a job with related consumers.
    ///
    /// With `target` set, only that relation receives the job; otherwise it
    /// goes to every relation. We may be related to several consumers at
    /// once, each of them gets its own copy.
    pub fn register_job(
        &self,
        store: &mut impl RelationStore,
        request: &JobRequest,
        target: Option<RelationId>,
    ) -> Result<()> {
        let entry = serde_json::to_value(request)?;
        let key = databag_key(&request.job_name);

        let relations = match target {
            Some(id) => vec![id],
            None => store.relation_ids(),
        };
        for id in relations {
            store.publish(id, key.clone(), entry.clone());
            store.flush(id);
            info!(
                job = %request.job_name,
                relation = %id,
                "registered scrape job"
            );
        }
        Ok(())
    }

    /// Collect acknowledgements published by consumers, one per job name.
    pub fn responses(&self, store: &impl RelationStore) -> Vec<(String, JobResponse)> {
        let mut responses = Vec::new();
        for id in store.relation_ids() {
            let Some(received) = store.received(id) else {
                continue;
            };
            for (key, value) in received {
                if !is_response_key(key) {
                    continue;
                }
                let Some(job_name) = job_name_of(key) else {
                    continue;
                };
                match serde_json::from_value::<JobResponse>(value.clone()) {
                    Ok(response) => responses.push((job_name.to_string(), response)),
                    Err(err) => {
                        debug!(%key, relation = %id, %err, "skipping malformed response entry");
                    }
                }
            }
        }
        responses
    }
}
