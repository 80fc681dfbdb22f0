//! Relation databag surface and the in-memory bus.
//!
//! A relation is a pair of app-level key/value buckets: one this side
//! publishes into, one filled by the peer. The platform owns delivery; all
//! we see is "publish", "what was delivered to me", and "flush". That
//! surface is the [`RelationStore`] trait. [`MemoryBus`] implements both
//! sides of it in memory, which is enough for embedders that drive the
//! endpoints directly and for end-to-end tests.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// App-level relation databag. BTreeMap-backed, so iteration order is
/// deterministic.
pub type Databag = serde_json::Map<String, Value>;

/// Identifier of one relation as handed out by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(u32);

impl RelationId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an endpoint can do with its relations.
///
/// Implemented by [`RoleView`] for the in-memory bus; platform adapters
/// implement it against the real relation data API.
pub trait RelationStore {
    /// Ids of all relations on this endpoint, joined or not.
    fn relation_ids(&self) -> Vec<RelationId>;

    /// Whether the peer has joined the relation.
    fn is_joined(&self, id: RelationId) -> bool;

    /// Stage a key/value pair into our publish databag.
    fn publish(&mut self, id: RelationId, key: String, value: Value);

    /// The databag the peer published to us, if the relation exists.
    fn received(&self, id: RelationId) -> Option<&Databag>;

    /// Push staged publishes out to the peer.
    fn flush(&mut self, id: RelationId);
}

/// Which side of a relation a view operates as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Publisher,
    Subscriber,
}

impl Role {
    fn index(self) -> usize {
        match self {
            Role::Publisher => 0,
            Role::Subscriber => 1,
        }
    }

    fn peer(self) -> Role {
        match self {
            Role::Publisher => Role::Subscriber,
            Role::Subscriber => Role::Publisher,
        }
    }
}

#[derive(Debug, Default)]
struct Link {
    joined: bool,
    // Indexed by Role: what each side has staged, and what has been
    // delivered to each side.
    staged: [Databag; 2],
    delivered: [Databag; 2],
}

/// In-memory pairing of the two endpoint roles.
#[derive(Debug, Default)]
pub struct MemoryBus {
    links: BTreeMap<RelationId, Link>,
    next_id: u32,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new, joined relation and return its id.
    pub fn connect(&mut self) -> RelationId {
        let id = RelationId::new(self.next_id);
        self.next_id += 1;
        self.links.insert(
            id,
            Link {
                joined: true,
                ..Link::default()
            },
        );
        id
    }

    /// Mark a relation as departed. Its databags stay readable, matching
    /// platform behaviour during teardown hooks.
    pub fn depart(&mut self, id: RelationId) {
        if let Some(link) = self.links.get_mut(&id) {
            link.joined = false;
        }
    }

    /// Operate on the bus as the publishing side.
    pub fn publisher(&mut self) -> RoleView<'_> {
        RoleView {
            bus: self,
            role: Role::Publisher,
        }
    }

    /// Operate on the bus as the subscribing side.
    pub fn subscriber(&mut self) -> RoleView<'_> {
        RoleView {
            bus: self,
            role: Role::Subscriber,
        }
    }
}

/// One role's view of a [`MemoryBus`].
pub struct RoleView<'a> {
    bus: &'a mut MemoryBus,
    role: Role,
}

impl RelationStore for RoleView<'_> {
    fn relation_ids(&self) -> Vec<RelationId> {
        self.bus.links.keys().copied().collect()
    }

    fn is_joined(&self, id: RelationId) -> bool {
        self.bus.links.get(&id).is_some_and(|link| link.joined)
    }

    fn publish(&mut self, id: RelationId, key: String, value: Value) {
        if let Some(link) = self.bus.links.get_mut(&id) {
            link.staged[self.role.index()].insert(key, value);
        }
    }

    fn received(&self, id: RelationId) -> Option<&Databag> {
        self.bus
            .links
            .get(&id)
            .map(|link| &link.delivered[self.role.index()])
    }

    fn flush(&mut self, id: RelationId) {
        let Some(link) = self.bus.links.get_mut(&id) else {
            return;
        };
        let staged = std::mem::take(&mut link.staged[self.role.index()]);
        let peer = &mut link.delivered[self.role.peer().index()];
        for (key, value) in staged {
            peer.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publish_is_invisible_until_flush() {
        let mut bus = MemoryBus::new();
        let id = bus.connect();

        bus.publisher().publish(id, "k".into(), json!(1));
        assert!(bus.subscriber().received(id).unwrap().is_empty());

        bus.publisher().flush(id);
        assert_eq!(bus.subscriber().received(id).unwrap()["k"], json!(1));
    }

    #[test]
    fn roles_do_not_see_their_own_publishes() {
        let mut bus = MemoryBus::new();
        let id = bus.connect();

        bus.publisher().publish(id, "k".into(), json!(1));
        bus.publisher().flush(id);
        assert!(bus.publisher().received(id).unwrap().is_empty());
    }

    #[test]
    fn flush_overwrites_existing_keys() {
        let mut bus = MemoryBus::new();
        let id = bus.connect();

        bus.publisher().publish(id, "k".into(), json!("old"));
        bus.publisher().flush(id);
        bus.publisher().publish(id, "k".into(), json!("new"));
        bus.publisher().flush(id);

        assert_eq!(bus.subscriber().received(id).unwrap()["k"], json!("new"));
    }

    #[test]
    fn departed_relation_keeps_databags() {
        let mut bus = MemoryBus::new();
        let id = bus.connect();
        bus.publisher().publish(id, "k".into(), json!(1));
        bus.publisher().flush(id);

        bus.depart(id);
        assert!(!bus.subscriber().is_joined(id));
        assert_eq!(bus.subscriber().received(id).unwrap()["k"], json!(1));
    }

    #[test]
    fn unknown_relation_id_is_harmless() {
        let mut bus = MemoryBus::new();
        let stray = RelationId::new(99);
        bus.publisher().publish(stray, "k".into(), json!(1));
        bus.publisher().flush(stray);
        assert!(bus.subscriber().received(stray).is_none());
        assert!(!bus.subscriber().is_joined(stray));
    }
}
