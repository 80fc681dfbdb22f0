//! Subscribing side of the scrape-job interface.

use tracing::{debug, info};

use scrapewire_protocol::{is_job_key, response_key, Job, JobResponse, Result};

use crate::bus::RelationStore;
use crate::flags::{expand_flag, FlagSet, FLAG_HAS_JOBS, FLAG_NEW_JOBS};

/// Endpoint that collects registered scrape jobs from related publishers.
#[derive(Debug)]
pub struct SubscriberEndpoint {
    endpoint_name: String,
    flags: FlagSet,
}

impl SubscriberEndpoint {
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

    /// All jobs currently registered across every relation.
    ///
    /// Each read assigns fresh request ids. Entries that are not job
    /// mappings (acknowledgements, stray values) are skipped; there is no
    /// validation beyond "does it parse as a job entry".
    pub fn jobs(&self, store: &impl RelationStore) -> Vec<Job> {
        let mut jobs = Vec::new();
        for id in store.relation_ids() {
            let Some(received) = store.received(id) else {
                continue;
            };
            for (key, value) in received {
                if !is_job_key(key) {
                    continue;
                }
                match Job::from_entry(value) {
                    Some(job) => jobs.push(job),
                    None => debug!(%key, relation = %id, "skipping malformed job entry"),
                }
            }
        }
        jobs
    }

    /// Recompute state flags from relation state. `has_jobs` and `new_jobs`
    /// are both raised while a joined relation carries at least one job;
    /// `new_jobs` is dropped separately via [`Self::clear_new_jobs`].
    pub fn manage_flags(&mut self, store: &impl RelationStore) {
        let joined = store.relation_ids().iter().any(|id| store.is_joined(*id));
        let has_jobs = joined && !self.jobs(store).is_empty();
        self.flags
            .toggle(expand_flag(FLAG_HAS_JOBS, &self.endpoint_name), has_jobs);
        self.flags
            .toggle(expand_flag(FLAG_NEW_JOBS, &self.endpoint_name), has_jobs);
    }

    /// Drop the `new_jobs` flag once the current batch has been processed.
    pub fn clear_new_jobs(&mut self) {
        self.flags
            .toggle(expand_flag(FLAG_NEW_JOBS, &self.endpoint_name), false);
    }

    /// Acknowledge a job, indicating success or failure with an optional
    /// explanation. The acknowledgement is published to every relation; the
    /// publisher that registered the job correlates it by job name.
    pub fn respond(
        &self,
        store: &mut impl RelationStore,
        job: &Job,
        success: bool,
        reason: Option<String>,
    ) -> Result<()> {
        let response = JobResponse { success, reason };
        let entry = serde_json::to_value(&response)?;
        let key = response_key(&job.request.job_name);
        for id in store.relation_ids() {
            store.publish(id, key.clone(), entry.clone());
            store.flush(id);
        }
        info!(job = %job.request.job_name, success, "acknowledged scrape job");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MemoryBus;
    use serde_json::json;

    fn seed_job(bus: &mut MemoryBus, id: crate::RelationId, name: &str) {
        let mut view = bus.publisher();
        view.publish(
            id,
            format!("job_{name}"),
            json!({"job_name": name, "job_data": {"metrics_path": "/metrics"}}),
        );
        view.flush(id);
    }

    #[test]
    fn jobs_collects_across_relations() {
        let mut bus = MemoryBus::new();
        let first = bus.connect();
        let second = bus.connect();
        seed_job(&mut bus, first, "node");
        seed_job(&mut bus, second, "blackbox");

        let endpoint = SubscriberEndpoint::new("scrape-jobs");
        let mut names: Vec<String> = endpoint
            .jobs(&bus.subscriber())
            .into_iter()
            .map(|job| job.request.job_name)
            .collect();
        names.sort();
        assert_eq!(names, ["blackbox", "node"]);
    }

    #[test]
    fn jobs_skips_non_job_entries() {
        let mut bus = MemoryBus::new();
        let id = bus.connect();
        let mut view = bus.publisher();
        view.publish(id, "job_broken".into(), json!("not a mapping"));
        view.publish(id, "response_node".into(), json!({"success": true}));
        view.flush(id);
        seed_job(&mut bus, id, "node");

        let endpoint = SubscriberEndpoint::new("scrape-jobs");
        let jobs = endpoint.jobs(&bus.subscriber());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].request.job_name, "node");
    }

    #[test]
    fn flags_follow_job_presence() {
        let mut bus = MemoryBus::new();
        let mut endpoint = SubscriberEndpoint::new("scrape-jobs");

        let id = bus.connect();
        endpoint.manage_flags(&bus.subscriber());
        assert!(!endpoint.flags().is_raised("endpoint.scrape-jobs.has_jobs"));

        seed_job(&mut bus, id, "node");
        endpoint.manage_flags(&bus.subscriber());
        assert!(endpoint.flags().is_raised("endpoint.scrape-jobs.has_jobs"));
        assert!(endpoint.flags().is_raised("endpoint.scrape-jobs.new_jobs"));

        endpoint.clear_new_jobs();
        assert!(endpoint.flags().is_raised("endpoint.scrape-jobs.has_jobs"));
        assert!(!endpoint.flags().is_raised("endpoint.scrape-jobs.new_jobs"));
    }

    #[test]
    fn flags_drop_when_relation_departs() {
        let mut bus = MemoryBus::new();
        let mut endpoint = SubscriberEndpoint::new("scrape-jobs");
        let id = bus.connect();
        seed_job(&mut bus, id, "node");

        endpoint.manage_flags(&bus.subscriber());
        assert!(endpoint.flags().is_raised("endpoint.scrape-jobs.has_jobs"));

        bus.depart(id);
        endpoint.manage_flags(&bus.subscriber());
        assert!(!endpoint.flags().is_raised("endpoint.scrape-jobs.has_jobs"));
        assert!(!endpoint.flags().is_raised("endpoint.scrape-jobs.new_jobs"));
    }

    #[test]
    fn respond_reaches_the_publisher() {
        let mut bus = MemoryBus::new();
        let id = bus.connect();
        seed_job(&mut bus, id, "node");

        let endpoint = SubscriberEndpoint::new("scrape-jobs");
        let jobs = endpoint.jobs(&bus.subscriber());
        endpoint
            .respond(&mut bus.subscriber(), &jobs[0], false, Some("no capacity".into()))
            .unwrap();

        let bag = bus.publisher();
        let received = bag.received(id).unwrap();
        assert_eq!(
            received["response_node"],
            json!({"success": false, "reason": "no capacity"})
        );
    }
}
