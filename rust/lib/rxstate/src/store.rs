use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::bus::{Bus, PathRoutes};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::path::{Key, Path};
use crate::value::{self, Change, SubscriptionId};

/// Path-addressed state tree with change notifications.
///
/// - `read(path)` returns the value at a path (a subtree for inner nodes).
/// - `write(path, value)` stores a value and notifies related subscribers.
///   Only the reducer engine writes; it is not part of the public API.
/// - `subscribe(path, handler)` observes writes to the path, its ancestors
///   and its descendants.
///
/// The tree is a single JSON object. Intermediate objects are created on
/// first write along a path.
pub struct StateStore {
    tree: RefCell<Value>,
    changes: Bus<Change, PathRoutes<Change>>,
    /// Nesting level of in-flight change notifications.
    depth: Cell<usize>,
    log_writes: bool,
    max_depth: usize,
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            tree: RefCell::new(Value::Object(Map::new())),
            changes: Bus::new(),
            depth: Cell::new(0),
            log_writes: config.log_writes,
            max_depth: config.max_depth,
        }
    }

    // ====================================================================
    // Read
    // ====================================================================

    /// Read the value at `path`.
    ///
    /// Fails with `NotFound` if a segment is missing or a non-object value
    /// sits where an object is needed. The root path returns the whole tree.
    pub fn read(&self, path: &Path) -> Result<Value, StoreError> {
        self.try_read(path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    /// Read the value at `path`, or `None` if nothing is stored there.
    pub fn try_read(&self, path: &Path) -> Option<Value> {
        let tree = self.tree.borrow();
        let mut node = &*tree;
        for seg in path.segments() {
            node = node.as_object()?.get(seg)?;
        }
        Some(node.clone())
    }

    /// Read and deserialize the value at `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &Key<T>) -> Result<T, StoreError> {
        let value = self.read(key.path())?;
        value::decode(key.path(), value)
    }

    /// Check if a value exists at `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.try_read(path).is_some()
    }

    /// Clone of the whole state tree.
    pub fn snapshot(&self) -> Value {
        self.tree.borrow().clone()
    }

    // ====================================================================
    // Write
    // ====================================================================

    /// Store `value` at `path`, then notify subscribers related to `path`.
    ///
    /// The write is committed before any subscriber runs. Subscribers may
    /// write again; nesting beyond `max_depth` fails with `DepthExceeded`.
    pub(crate) fn write(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        self.commit(path, value.clone())?;
        self.notify(path, value)
    }

    /// Set the value in the tree without notifying anyone.
    ///
    /// Fails with `LeafConflict` when an intermediate segment holds a
    /// non-object value. Nothing is changed before that segment is reached.
    pub(crate) fn commit(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        let next = self.log_writes.then(|| value.clone());
        let prev = self.insert(path, value)?.unwrap_or(Value::Null);
        if let Some(next) = next {
            debug!(path = %path, prev = %prev, next = %next, "state write");
        }
        Ok(())
    }

    /// Returns the previous value at `path`.
    fn insert(&self, path: &Path, value: Value) -> Result<Option<Value>, StoreError> {
        let mut tree = self.tree.borrow_mut();
        let Some((leaf, parents)) = path.segments().split_last() else {
            return Ok(Some(std::mem::replace(&mut *tree, value)));
        };

        let mut node = &mut *tree;
        for (depth, seg) in parents.iter().enumerate() {
            let map = as_object_mut(node, path, depth)?;
            let child = map.entry(seg.clone()).or_insert(Value::Null);
            if child.is_null() {
                *child = Value::Object(Map::new());
            }
            node = child;
        }
        let map = as_object_mut(node, path, parents.len())?;
        Ok(map.insert(leaf.clone(), value))
    }

    /// Publish a committed write to every related subscriber.
    pub(crate) fn notify(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        let change = Change {
            path: path.clone(),
            value,
        };
        let depth = self.depth.get();
        if depth >= self.max_depth {
            return Err(StoreError::DepthExceeded {
                path: change.path,
                limit: self.max_depth,
            });
        }
        self.depth.set(depth + 1);
        let result = self.changes.publish(&change.path, &change);
        self.depth.set(depth);
        result.map(|_| ())
    }

    // ====================================================================
    // Subscriptions
    // ====================================================================

    /// Subscribe to writes at, above or below `path`.
    ///
    /// Subscribing to the root path observes every write. The handler runs
    /// synchronously inside the write that triggered it.
    pub fn subscribe<F>(&self, path: &Path, handler: F) -> SubscriptionId
    where
        F: Fn(&Change) + 'static,
    {
        self.changes.subscribe(
            std::slice::from_ref(path),
            Rc::new(move |change: &Change| -> Result<(), StoreError> {
                handler(change);
                Ok(())
            }),
        )
    }

    /// Subscribe a fallible handler under several dependency paths at once.
    /// It runs at most once per change.
    pub(crate) fn watch(
        &self,
        paths: &[Path],
        handler: Rc<dyn Fn(&Change) -> Result<(), StoreError>>,
    ) -> SubscriptionId {
        self.changes.subscribe(paths, handler)
    }

    /// Remove a subscription registered under `paths`.
    pub fn unsubscribe(&self, paths: &[Path], id: SubscriptionId) -> bool {
        self.changes.unsubscribe(paths, id)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// View `node` as an object for writing the segment at `depth` of `path`.
fn as_object_mut<'a>(
    node: &'a mut Value,
    path: &Path,
    depth: usize,
) -> Result<&'a mut Map<String, Value>, StoreError> {
    node.as_object_mut().ok_or_else(|| StoreError::LeafConflict {
        path: path.clone(),
        at: Path::from_segments(path.segments()[..depth].iter().cloned()),
    })
}
