use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::StoreError;
use crate::path::Path;
use crate::reducer::Accessor;
use crate::value::{type_name, SubscriptionId};

/// Which bus a [`Subscription`] lives on, and the keys it was registered
/// under there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Channel {
    Actions(Vec<&'static str>),
    Changes(Vec<Path>),
}

/// Handle for one live subscription, usable with `Rx::unsubscribe`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub(crate) channel: Channel,
    pub(crate) id: SubscriptionId,
}

impl Subscription {
    pub(crate) fn actions(tags: Vec<&'static str>, id: SubscriptionId) -> Self {
        Self {
            channel: Channel::Actions(tags),
            id,
        }
    }

    pub(crate) fn changes(paths: Vec<Path>, id: SubscriptionId) -> Self {
        Self {
            channel: Channel::Changes(paths),
            id,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// Book-keeping for bound reducers.
///
/// - `accessors`: path -> accessor, type-erased.
/// - `subscriptions`: path -> every bus subscription its rules installed.
/// - `bound`: every path ever bound. Survives [`teardown`](Self::teardown)
///   so re-binding after a reload keeps the committed value.
#[derive(Default)]
pub(crate) struct Registry {
    accessors: HashMap<Path, Rc<dyn Any>>,
    subscriptions: HashMap<Path, Vec<Subscription>>,
    bound: HashSet<Path>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the live accessor for `path`.
    ///
    /// Fails with `BindingType` when the path is bound with a different
    /// value type.
    pub fn accessor<T: 'static>(&self, path: &Path) -> Result<Option<Accessor<T>>, StoreError> {
        let Some(any) = self.accessors.get(path) else {
            return Ok(None);
        };
        Accessor::from_any(Rc::clone(any))
            .map(Some)
            .ok_or_else(|| StoreError::BindingType {
                path: path.clone(),
                expected: type_name::<T>(),
            })
    }

    pub fn insert<T: 'static>(&mut self, accessor: &Accessor<T>) {
        let path = accessor.path().clone();
        self.bound.insert(path.clone());
        self.accessors.insert(path, accessor.clone().into_any());
    }

    pub fn add_subscriptions(&mut self, path: &Path, subscriptions: Vec<Subscription>) {
        self.subscriptions
            .entry(path.clone())
            .or_default()
            .extend(subscriptions);
    }

    /// True while a reducer is bound at `path`.
    pub fn is_bound(&self, path: &Path) -> bool {
        self.accessors.contains_key(path)
    }

    /// True if `path` has been bound at any point, including before a reload.
    pub fn was_bound(&self, path: &Path) -> bool {
        self.bound.contains(path)
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    /// Forget every live binding and hand back the subscriptions to cancel.
    pub fn teardown(&mut self) -> Vec<Subscription> {
        self.accessors.clear();
        self.subscriptions
            .drain()
            .flat_map(|(_, subscriptions)| subscriptions)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Path {
        Path::parse(s)
    }

    #[test]
    fn insert_and_lookup() {
        let mut registry = Registry::new();
        let accessor = Accessor::new(p("count"), 3u32);
        registry.insert(&accessor);

        let found = registry.accessor::<u32>(&p("count")).unwrap().unwrap();
        assert!(found.ptr_eq(&accessor));
        assert!(registry.is_bound(&p("count")));
        assert!(registry.accessor::<u32>(&p("other")).unwrap().is_none());
    }

    #[test]
    fn lookup_with_wrong_type_fails() {
        let mut registry = Registry::new();
        registry.insert(&Accessor::new(p("count"), 3u32));

        match registry.accessor::<String>(&p("count")) {
            Err(StoreError::BindingType { path, .. }) => assert_eq!(path, p("count")),
            other => panic!("expected BindingType, got {:?}", other.map(|a| a.is_some())),
        }
    }

    #[test]
    fn teardown_keeps_bound_history() {
        let mut registry = Registry::new();
        registry.insert(&Accessor::new(p("a"), 1u8));
        registry.add_subscriptions(
            &p("a"),
            vec![
                Subscription::actions(vec!["inc"], SubscriptionId(1)),
                Subscription::changes(vec![p("b")], SubscriptionId(2)),
            ],
        );

        let cancelled = registry.teardown();
        assert_eq!(cancelled.len(), 2);
        assert_eq!(registry.len(), 0);
        assert!(!registry.is_bound(&p("a")));
        assert!(registry.was_bound(&p("a")));
        assert!(registry.teardown().is_empty());
    }
}
