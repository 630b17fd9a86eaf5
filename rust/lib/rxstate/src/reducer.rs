use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::action::ActionEvent;
use crate::app::Rx;
use crate::error::StoreError;
use crate::path::{Key, Path};
use crate::registry::Subscription;
use crate::rules::{combined, Dependencies, Rule, Rules};
use crate::value::{self, Change};

// ============================================================================
// Accessor
// ============================================================================

/// Shared read handle for a bound path.
///
/// Every `reducer` call for the same path returns a handle onto the same
/// slot; [`ptr_eq`](Self::ptr_eq) tells them apart from handles of other
/// bindings.
pub struct Accessor<T> {
    slot: Rc<Slot<T>>,
}

struct Slot<T> {
    path: Path,
    value: RefCell<T>,
    version: Cell<u64>,
}

impl<T> Accessor<T> {
    pub(crate) fn new(path: Path, value: T) -> Self {
        Self {
            slot: Rc::new(Slot {
                path,
                value: RefCell::new(value),
                version: Cell::new(0),
            }),
        }
    }

    /// Borrow the latest committed value.
    ///
    /// Dispatching from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.value.borrow())
    }

    pub fn path(&self) -> &Path {
        &self.slot.path
    }

    /// Number of values committed since the binding was created.
    pub fn version(&self) -> u64 {
        self.slot.version.get()
    }

    /// True if both handles belong to the same binding.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }

    pub(crate) fn set(&self, value: T) {
        *self.slot.value.borrow_mut() = value;
        self.slot.version.set(self.slot.version.get() + 1);
    }
}

impl<T: Clone> Accessor<T> {
    /// The latest committed value.
    pub fn get(&self) -> T {
        self.slot.value.borrow().clone()
    }
}

impl<T: 'static> Accessor<T> {
    pub(crate) fn into_any(self) -> Rc<dyn Any> {
        self.slot
    }

    pub(crate) fn from_any(any: Rc<dyn Any>) -> Option<Self> {
        any.downcast::<Slot<T>>().ok().map(|slot| Self { slot })
    }
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("path", &self.slot.path)
            .field("value", &self.slot.value.borrow())
            .field("version", &self.slot.version.get())
            .finish()
    }
}

// ============================================================================
// Reducer binding
// ============================================================================

impl Rx {
    /// Bind update rules to `key` and return its accessor.
    ///
    /// The first call for a path runs `setup` once to collect rules, writes
    /// the starting value and installs the rules. The starting value is:
    ///
    /// 1. the value of the last dependency rule, computed from current state;
    /// 2. otherwise, when re-binding after [`reload`](Rx::reload), the value
    ///    already in the store, if it still decodes as `T`;
    /// 3. otherwise `initial`.
    ///
    /// Later calls for the same path return the existing accessor without
    /// running `setup`. Asking for a different value type than the bound one
    /// fails with `BindingType`.
    pub fn reducer<T, F>(
        &self,
        key: impl Into<Key<T>>,
        initial: T,
        setup: F,
    ) -> Result<Accessor<T>, StoreError>
    where
        T: Serialize + DeserializeOwned + Clone + 'static,
        F: FnOnce(&mut Rules<T>),
    {
        let path = key.into().path().clone();
        if let Some(accessor) = self.bound_accessor::<T>(&path)? {
            return Ok(accessor);
        }

        let mut rules = Rules::new();
        setup(&mut rules);
        let rules = rules.into_vec();

        let mut value = initial;
        let was_bound = self.inner.registry.borrow().was_bound(&path);
        if was_bound {
            if let Some(committed) = self.inner.store.try_read(&path) {
                match value::decode(&path, committed) {
                    Ok(kept) => value = kept,
                    Err(err) => {
                        debug!(
                            path = %path,
                            error = %err,
                            "committed value no longer decodes, using initial"
                        );
                    }
                }
            }
        }
        for rule in &rules {
            if let Rule::Dependency { deps, compute, .. } = rule {
                value = compute(self.read_dependencies(deps)?)?;
            }
        }

        self.bind(path, value, rules)
    }

    /// Bind `key` to a value computed from `dependencies` and return its
    /// accessor.
    ///
    /// The value is computed right away and again whenever a dependency
    /// changes. A recomputed value equal to the stored one is dropped: no
    /// write, no notification. Later calls for the same path return the
    /// existing accessor.
    ///
    /// ```ignore
    /// let count = rx.computed("editor.nodeCount", (nodes_key,), |(nodes,)| nodes.len())?;
    /// ```
    pub fn computed<T, D, F>(
        &self,
        key: impl Into<Key<T>>,
        dependencies: D,
        compute: F,
    ) -> Result<Accessor<T>, StoreError>
    where
        T: Serialize + DeserializeOwned + Clone + 'static,
        D: Dependencies + 'static,
        F: Fn(D::Values) -> T + 'static,
    {
        let path = key.into().path().clone();
        if let Some(accessor) = self.bound_accessor::<T>(&path)? {
            return Ok(accessor);
        }

        let deps = dependencies.paths();
        let compute = combined::<T, D, F>(deps.clone(), compute);
        let value = compute(self.read_dependencies(&deps)?)?;
        let rule = Rule::Dependency {
            deps,
            compute,
            distinct: true,
        };
        self.bind(path, value, vec![rule])
    }

    /// The live accessor at `path`, if a binding of type `T` exists.
    fn bound_accessor<T: 'static>(&self, path: &Path) -> Result<Option<Accessor<T>>, StoreError> {
        let existing = self.inner.registry.borrow().accessor::<T>(path)?;
        if existing.is_some() {
            debug!(path = %path, "reducer already bound, keeping the first registration");
        }
        Ok(existing)
    }

    /// Commit the starting value, register the accessor, install `rules`.
    fn bind<T>(&self, path: Path, value: T, rules: Vec<Rule<T>>) -> Result<Accessor<T>, StoreError>
    where
        T: Serialize + DeserializeOwned + Clone + 'static,
    {
        self.inner
            .store
            .write(&path, value::encode(&path, &value)?)?;

        let accessor = Accessor::new(path.clone(), value);
        self.inner.registry.borrow_mut().insert(&accessor);

        let count = rules.len();
        let subscriptions: Vec<Subscription> = rules
            .into_iter()
            .map(|rule| self.install(&accessor, rule))
            .collect();
        self.inner
            .registry
            .borrow_mut()
            .add_subscriptions(&path, subscriptions);

        debug!(path = %path, rules = count, "reducer bound");
        Ok(accessor)
    }

    /// Subscribe one rule to its trigger.
    fn install<T>(&self, accessor: &Accessor<T>, rule: Rule<T>) -> Subscription
    where
        T: Serialize + DeserializeOwned + Clone + 'static,
    {
        let weak = Rc::downgrade(&self.inner);
        let accessor = accessor.clone();

        match rule {
            Rule::Action {
                tags,
                apply,
                distinct,
            } => {
                let handler = Rc::new(move |event: &ActionEvent| -> Result<(), StoreError> {
                    let Some(inner) = weak.upgrade() else {
                        return Ok(());
                    };
                    let rx = Rx { inner };
                    let current = rx.current(&accessor)?;
                    match apply(current, event)? {
                        Some(next) => rx.commit(&accessor, next, distinct),
                        None => Ok(()),
                    }
                });
                let id = self.inner.actions.subscribe(&tags, handler);
                Subscription::actions(tags, id)
            }
            Rule::Dependency {
                deps,
                compute,
                distinct,
            } => {
                let watched = deps.clone();
                let handler = Rc::new(move |_: &Change| -> Result<(), StoreError> {
                    let Some(inner) = weak.upgrade() else {
                        return Ok(());
                    };
                    let rx = Rx { inner };
                    let next = compute(rx.read_dependencies(&deps)?)?;
                    rx.commit(&accessor, next, distinct)
                });
                let id = self.inner.store.watch(&watched, handler);
                Subscription::changes(watched, id)
            }
        }
    }

    /// Current value of a bound path, as stored.
    ///
    /// Falls back to the accessor when the store lost the path (an ancestor
    /// was overwritten) and reads are not strict.
    fn current<T>(&self, accessor: &Accessor<T>) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Clone,
    {
        let path = accessor.path();
        match self.inner.store.try_read(path) {
            Some(stored) => value::decode(path, stored),
            None if self.inner.config.strict_reads => Err(StoreError::NotFound(path.clone())),
            None => Ok(accessor.get()),
        }
    }

    /// Current values of `deps`, in order.
    fn read_dependencies(&self, deps: &[Path]) -> Result<Vec<Value>, StoreError> {
        deps.iter()
            .map(|dep| match self.inner.store.try_read(dep) {
                Some(value) => Ok(value),
                None if self.inner.config.strict_reads => Err(StoreError::NotFound(dep.clone())),
                None => Ok(Value::Null),
            })
            .collect()
    }

    /// Commit a produced value to the store, push it into the accessor, then
    /// notify. A failed commit leaves the accessor untouched. With `distinct`,
    /// a value equal to the stored one is dropped.
    fn commit<T: Serialize>(
        &self,
        accessor: &Accessor<T>,
        next: T,
        distinct: bool,
    ) -> Result<(), StoreError> {
        let path = accessor.path();
        let encoded = value::encode(path, &next)?;
        if distinct && self.inner.store.try_read(path).as_ref() == Some(&encoded) {
            trace!(path = %path, "unchanged value dropped");
            return Ok(());
        }
        self.inner.store.commit(path, encoded.clone())?;
        accessor.set(next);
        self.inner.store.notify(path, encoded)
    }
}
