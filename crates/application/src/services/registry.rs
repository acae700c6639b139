use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ferrous_proxy_domain::objects::{
    KeyValueStore, LoadBalancingPolicy, LookupKey, PacketCache, RemoteLogger, XskMap,
};
use ferrous_proxy_domain::{Action, DomainError, NetmaskGroup, ResponseAction, SelectorId};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Everything that can be referenced by name during a load.
#[derive(Debug, Clone)]
pub enum RegisteredEntity {
    PacketCache(Arc<PacketCache>),
    Selector(SelectorId),
    Action(Arc<Action>),
    ResponseAction(Arc<ResponseAction>),
    NetmaskGroup(Arc<NetmaskGroup>),
    KeyValueStore(Arc<KeyValueStore>),
    LookupKey(Arc<LookupKey>),
    RemoteLogger(Arc<RemoteLogger>),
    LoadBalancingPolicy(Arc<LoadBalancingPolicy>),
    XskMap(Arc<XskMap>),
}

impl RegisteredEntity {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PacketCache(_) => <Arc<PacketCache> as Registrable>::KIND,
            Self::Selector(_) => <SelectorId as Registrable>::KIND,
            Self::Action(_) => <Arc<Action> as Registrable>::KIND,
            Self::ResponseAction(_) => <Arc<ResponseAction> as Registrable>::KIND,
            Self::NetmaskGroup(_) => <Arc<NetmaskGroup> as Registrable>::KIND,
            Self::KeyValueStore(_) => <Arc<KeyValueStore> as Registrable>::KIND,
            Self::LookupKey(_) => <Arc<LookupKey> as Registrable>::KIND,
            Self::RemoteLogger(_) => <Arc<RemoteLogger> as Registrable>::KIND,
            Self::LoadBalancingPolicy(_) => <Arc<LoadBalancingPolicy> as Registrable>::KIND,
            Self::XskMap(_) => <Arc<XskMap> as Registrable>::KIND,
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Implemented by every type the registry can hand back.
pub trait Registrable: Sized + sealed::Sealed {
    const KIND: &'static str;

    fn into_entity(self) -> RegisteredEntity;

    fn from_entity(entity: &RegisteredEntity) -> Option<Self>;
}

macro_rules! registrable {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl sealed::Sealed for $ty {}

        impl Registrable for $ty {
            const KIND: &'static str = $kind;

            fn into_entity(self) -> RegisteredEntity {
                RegisteredEntity::$variant(self)
            }

            fn from_entity(entity: &RegisteredEntity) -> Option<Self> {
                match entity {
                    RegisteredEntity::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

registrable!(Arc<PacketCache>, PacketCache, "packet cache");
registrable!(SelectorId, Selector, "selector");
registrable!(Arc<Action>, Action, "action");
registrable!(Arc<ResponseAction>, ResponseAction, "response action");
registrable!(Arc<NetmaskGroup>, NetmaskGroup, "netmask group");
registrable!(Arc<KeyValueStore>, KeyValueStore, "key-value store");
registrable!(Arc<LookupKey>, LookupKey, "key-value lookup key");
registrable!(Arc<RemoteLogger>, RemoteLogger, "remote logger");
registrable!(Arc<LoadBalancingPolicy>, LoadBalancingPolicy, "load-balancing policy");
registrable!(Arc<XskMap>, XskMap, "XSK map");

/// Name table shared by every section of one load. Names are unique across
/// all entity kinds.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entries: DashMap<String, RegisteredEntity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entity` and returns the name it was stored under. An empty
    /// name is replaced by a random UUID.
    pub fn register<T: Registrable>(&self, name: &str, entity: T) -> Result<String, DomainError> {
        let name = if name.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            name.to_string()
        };
        match self.entries.entry(name.clone()) {
            Entry::Occupied(_) => Err(DomainError::DuplicateName(name)),
            Entry::Vacant(slot) => {
                debug!(name = %name, kind = T::KIND, "Registered entity");
                slot.insert(entity.into_entity());
                Ok(name)
            }
        }
    }

    /// Returns the entity only when it exists with the requested kind.
    pub fn lookup<T: Registrable>(&self, name: &str) -> Option<T> {
        self.entries
            .get(name)
            .and_then(|entry| T::from_entity(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<&'static str> {
        self.entries.get(name).map(|entry| entry.value().kind())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrous_proxy_domain::objects::{BuiltinPolicy, PacketCacheSettings};

    fn cache(name: &str) -> Arc<PacketCache> {
        Arc::new(PacketCache {
            name: name.to_string(),
            settings: PacketCacheSettings::default(),
        })
    }

    #[test]
    fn test_duplicate_across_kinds_is_rejected() {
        let registry = EntityRegistry::new();
        registry.register("shared", cache("shared")).unwrap();
        let err = registry
            .register("shared", Arc::new(Action::Drop))
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateName("shared".to_string()));
    }

    #[test]
    fn test_empty_name_gets_unique_identifier() {
        let registry = EntityRegistry::new();
        let first = registry.register("", Arc::new(Action::Allow)).unwrap();
        let second = registry.register("", Arc::new(Action::Allow)).unwrap();
        assert!(!first.is_empty());
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_with_wrong_kind_is_not_found() {
        let registry = EntityRegistry::new();
        registry
            .register(
                "lb",
                Arc::new(LoadBalancingPolicy::Builtin(BuiltinPolicy::RoundRobin)),
            )
            .unwrap();
        assert!(registry.lookup::<Arc<PacketCache>>("lb").is_none());
        assert!(registry.lookup::<Arc<LoadBalancingPolicy>>("lb").is_some());
        assert_eq!(registry.kind_of("lb"), Some("load-balancing policy"));
    }

    #[test]
    fn test_clear_empties_table() {
        let registry = EntityRegistry::new();
        registry.register("a", cache("a")).unwrap();
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.register("a", cache("a")).is_ok());
    }
}
