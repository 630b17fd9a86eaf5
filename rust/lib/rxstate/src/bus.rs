use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StoreError;
use crate::path::Path;
use crate::trie::Trie;
use crate::value::SubscriptionId;

/// Handler stored on a bus. Returning an error aborts the rest of the fan-out.
pub(crate) type Handler<E> = Rc<dyn Fn(&E) -> Result<(), StoreError>>;

pub(crate) struct Entry<E> {
    id: SubscriptionId,
    handler: Handler<E>,
}

impl<E> Clone for Entry<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Rc::clone(&self.handler),
        }
    }
}

/// How a published key selects subscribers.
pub(crate) trait Routes<E>: Default {
    type Key;

    fn insert(&mut self, key: &Self::Key, entry: Entry<E>);

    /// Remove the entry with `id` from `key`. Returns `true` if it was there.
    fn remove(&mut self, key: &Self::Key, id: SubscriptionId) -> bool;

    fn matching(&self, key: &Self::Key) -> Vec<Entry<E>>;
}

/// Action tags, matched as whole strings: `"a.b"`, `"a..b"` and `""` are
/// three different tags.
pub(crate) struct TagRoutes<E> {
    tags: HashMap<&'static str, Vec<Entry<E>>>,
}

impl<E> Default for TagRoutes<E> {
    fn default() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }
}

impl<E> Routes<E> for TagRoutes<E> {
    type Key = &'static str;

    fn insert(&mut self, key: &&'static str, entry: Entry<E>) {
        self.tags.entry(*key).or_default().push(entry);
    }

    fn remove(&mut self, key: &&'static str, id: SubscriptionId) -> bool {
        let Some(entries) = self.tags.get_mut(key) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() < before;
        if entries.is_empty() {
            self.tags.remove(key);
        }
        removed
    }

    fn matching(&self, key: &&'static str) -> Vec<Entry<E>> {
        self.tags.get(key).cloned().unwrap_or_default()
    }
}

/// State paths, matched when the subscribed path is an ancestor, descendant
/// or equal to the published one.
pub(crate) struct PathRoutes<E> {
    trie: Trie<Entry<E>>,
}

impl<E> Default for PathRoutes<E> {
    fn default() -> Self {
        Self { trie: Trie::new() }
    }
}

impl<E> Routes<E> for PathRoutes<E> {
    type Key = Path;

    fn insert(&mut self, key: &Path, entry: Entry<E>) {
        self.trie.insert(key, entry);
    }

    fn remove(&mut self, key: &Path, id: SubscriptionId) -> bool {
        self.trie.remove(key, |entry| entry.id == id)
    }

    fn matching(&self, key: &Path) -> Vec<Entry<E>> {
        self.trie.match_related(key)
    }
}

/// Synchronous broadcast channel.
///
/// - `subscribe(keys, handler)` registers one handler under one or more keys.
/// - `tap(handler)` registers a handler that sees every event.
/// - `publish(key, event)` calls every matching handler in subscription order.
///
/// A handler registered under several keys that all match one publish is
/// still called once. The matching set is snapshotted before any handler
/// runs, so handlers may subscribe, unsubscribe or publish re-entrantly.
pub(crate) struct Bus<E, R> {
    routes: RefCell<R>,
    taps: RefCell<Vec<Entry<E>>>,
    next_id: Cell<u64>,
}

impl<E, R: Routes<E>> Bus<E, R> {
    pub fn new() -> Self {
        Self {
            routes: RefCell::new(R::default()),
            taps: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        SubscriptionId(id)
    }

    /// Register `handler` under every key in `keys`.
    pub fn subscribe(&self, keys: &[R::Key], handler: Handler<E>) -> SubscriptionId {
        let id = self.next_id();
        let mut routes = self.routes.borrow_mut();
        for key in keys {
            routes.insert(
                key,
                Entry {
                    id,
                    handler: Rc::clone(&handler),
                },
            );
        }
        id
    }

    /// Register a handler that receives every published event.
    pub fn tap(&self, handler: Handler<E>) -> SubscriptionId {
        let id = self.next_id();
        self.taps.borrow_mut().push(Entry { id, handler });
        id
    }

    /// Remove a subscription. `keys` must be the keys it was registered with
    /// (empty for taps). Returns `true` if anything was removed.
    pub fn unsubscribe(&self, keys: &[R::Key], id: SubscriptionId) -> bool {
        let mut removed = false;
        {
            let mut routes = self.routes.borrow_mut();
            for key in keys {
                removed |= routes.remove(key, id);
            }
        }
        let mut taps = self.taps.borrow_mut();
        let before = taps.len();
        taps.retain(|entry| entry.id != id);
        removed || taps.len() < before
    }

    /// Deliver `event` to every subscriber matching `key`, in subscription
    /// order. Returns the number of handlers called.
    pub fn publish(&self, key: &R::Key, event: &E) -> Result<usize, StoreError> {
        let mut matched = self.routes.borrow().matching(key);
        matched.extend(self.taps.borrow().iter().cloned());
        matched.sort_by_key(|entry| entry.id);
        matched.dedup_by_key(|entry| entry.id);

        for entry in &matched {
            (entry.handler)(event)?;
        }
        Ok(matched.len())
    }
}

impl<E> Bus<E, TagRoutes<E>> {
    /// Check if any keyed subscriber is registered under `tag`.
    pub fn has_subscriber(&self, tag: &str) -> bool {
        self.routes.borrow().tags.contains_key(tag)
    }
}
