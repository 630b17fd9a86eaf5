use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, trace};

use crate::action::{ActionEvent, Envelope, Payload};
use crate::bus::{Bus, TagRoutes};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::path::{Key, Path};
use crate::registry::{Channel, Registry, Subscription};
use crate::store::StateStore;
use crate::value::Change;

/// Rx: the application's reactive state context.
///
/// One `Rx` owns the state tree, the dispatch bus and the registry of
/// reducer bindings. Clones share the same context.
///
/// - `dispatch(envelope)` sends an action to every rule bound to its tag
/// - `reducer(path, initial, setup)` binds update rules to a path
/// - `get`/`read` read settled state
/// - `subscribe(path)` observes state changes
///
/// # Examples
///
/// ```ignore
/// const INCREMENT: Action<i64> = Action::define("counter.increment");
///
/// let rx = Rx::new();
/// let counter = rx.reducer("counter", 0, |on| {
///     on.on(INCREMENT, |count, amount| count + amount);
/// })?;
///
/// rx.dispatch(INCREMENT.create(3))?;
/// rx.dispatch(INCREMENT.create(4))?;
/// assert_eq!(counter.get(), 7);
/// ```
#[derive(Clone)]
pub struct Rx {
    pub(crate) inner: Rc<RxInner>,
}

pub(crate) struct RxInner {
    pub(crate) config: StoreConfig,
    pub(crate) store: StateStore,
    pub(crate) actions: Bus<ActionEvent, TagRoutes<ActionEvent>>,
    pub(crate) registry: RefCell<Registry>,
    seq: Cell<u64>,
    /// Nesting level of in-flight dispatches.
    depth: Cell<usize>,
    /// Dispatches whose settled-state log has not been emitted yet.
    pending: RefCell<Vec<PendingLog>>,
}

struct PendingLog {
    seq: u64,
    tag: &'static str,
}

impl Rx {
    /// Create a context with an empty state tree and the default config.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let store = StateStore::with_config(&config);
        Self {
            inner: Rc::new(RxInner {
                config,
                store,
                actions: Bus::new(),
                registry: RefCell::new(Registry::new()),
                seq: Cell::new(0),
                depth: Cell::new(0),
                pending: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    // ====================================================================
    // Dispatch
    // ====================================================================

    /// Broadcast an action to every rule bound to its tag.
    ///
    /// Rules run synchronously in the order they were registered, and so do
    /// the dependency rules their writes trigger. When this returns, every
    /// accessor reads settled values. The first failing rule aborts the rest
    /// of the fan-out and its error is returned.
    ///
    /// An action no rule is bound to is dropped.
    pub fn dispatch<P: Payload>(&self, envelope: Envelope<P>) -> Result<(), StoreError> {
        let inner = &self.inner;
        let depth = inner.depth.get();
        if depth == 0 {
            self.tick();
        }

        let seq = inner.seq.get() + 1;
        inner.seq.set(seq);

        let Envelope { type_tag, payload } = envelope;
        if inner.config.log_dispatch {
            debug!(seq, action = type_tag, payload = ?payload, "dispatch");
        }
        let event = ActionEvent::new(seq, type_tag, Rc::new(payload));

        inner.depth.set(depth + 1);
        let result = inner.actions.publish(&type_tag, &event);
        inner.depth.set(depth);

        inner.pending.borrow_mut().push(PendingLog { seq, tag: type_tag });

        if result? == 0 {
            trace!(seq, action = type_tag, "no rule bound, action dropped");
        }
        Ok(())
    }

    /// Emit the deferred state logs of settled dispatches.
    ///
    /// Hosts with an event loop call this once per turn. Otherwise it runs at
    /// the start of the next top-level dispatch. Returns the number of
    /// dispatches flushed.
    pub fn tick(&self) -> usize {
        let pending = std::mem::take(&mut *self.inner.pending.borrow_mut());
        if pending.is_empty() {
            return 0;
        }
        if self.inner.config.log_snapshots {
            let snapshot = self.inner.store.snapshot();
            for log in &pending {
                debug!(seq = log.seq, action = log.tag, store = %snapshot, "dispatch settled");
            }
        }
        pending.len()
    }

    /// Observe every dispatched action, whether or not a rule handles it.
    pub fn tap_actions<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ActionEvent) + 'static,
    {
        let id = self
            .inner
            .actions
            .tap(Rc::new(move |event: &ActionEvent| -> Result<(), StoreError> {
                handler(event);
                Ok(())
            }));
        Subscription::actions(Vec::new(), id)
    }

    /// Check if any rule is bound to `tag`.
    pub fn has_rule(&self, tag: &str) -> bool {
        self.inner.actions.has_subscriber(tag)
    }

    // ====================================================================
    // State read
    // ====================================================================

    /// Read the raw value at `path`.
    pub fn read(&self, path: impl Into<Path>) -> Result<Value, StoreError> {
        self.inner.store.read(&path.into())
    }

    /// Read and decode the value at `key`.
    pub fn get<T: DeserializeOwned>(&self, key: impl Into<Key<T>>) -> Result<T, StoreError> {
        self.inner.store.get(&key.into())
    }

    pub fn contains(&self, path: impl Into<Path>) -> bool {
        self.inner.store.contains(&path.into())
    }

    /// Copy of the whole state tree.
    pub fn snapshot(&self) -> Value {
        self.inner.store.snapshot()
    }

    // ====================================================================
    // Subscriptions
    // ====================================================================

    /// Observe writes at, above or below `path`.
    ///
    /// The handler runs synchronously inside the write.
    pub fn subscribe<F>(&self, path: impl Into<Path>, handler: F) -> Subscription
    where
        F: Fn(&Change) + 'static,
    {
        let path = path.into();
        let id = self.inner.store.subscribe(&path, handler);
        Subscription::changes(vec![path], id)
    }

    /// Cancel a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        match &subscription.channel {
            Channel::Actions(tags) => self.inner.actions.unsubscribe(tags, subscription.id),
            Channel::Changes(paths) => self.inner.store.unsubscribe(paths, subscription.id),
        }
    }

    // ====================================================================
    // Bindings
    // ====================================================================

    /// Check if a reducer is currently bound at `path`.
    pub fn is_bound(&self, path: impl Into<Path>) -> bool {
        self.inner.registry.borrow().is_bound(&path.into())
    }

    /// Tear down every reducer binding, e.g. before reloading the modules
    /// that declared them.
    ///
    /// All rule subscriptions are cancelled and the accessor cache is
    /// cleared; state values stay in the store. The next `reducer` call for a
    /// path runs its setup again. Subscriptions made through
    /// [`subscribe`](Self::subscribe) and [`tap_actions`](Self::tap_actions)
    /// are not affected. Returns the number of subscriptions cancelled.
    pub fn reload(&self) -> usize {
        let (bindings, subscriptions) = {
            let mut registry = self.inner.registry.borrow_mut();
            (registry.len(), registry.teardown())
        };
        for subscription in &subscriptions {
            self.unsubscribe(subscription);
        }
        info!(
            bindings,
            subscriptions = subscriptions.len(),
            "reload: reducer bindings torn down"
        );
        subscriptions.len()
    }

    // ====================================================================
    // Advanced
    // ====================================================================

    /// The underlying state store, for direct reads and change observers.
    pub fn store(&self) -> &StateStore {
        &self.inner.store
    }
}

impl Default for Rx {
    fn default() -> Self {
        Self::new()
    }
}
