use std::fmt;
use std::marker::PhantomData;

/// Segment separator in the string form of a path.
pub const SEPARATOR: char = '.';

/// Address of a slice of the state tree.
///
/// Stored as an ordered segment list; the string form is the dot-join
/// (`selection.selectedId`). The empty string is the root path, which is an
/// ancestor of every other path.
///
/// Equality, hashing and prefix checks all work on segments, so two paths
/// built independently for the same field compare equal, and `ab` is never
/// treated as an ancestor of `abc.def`.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dot-separated string. Empty segments are dropped, so
    /// `""` is the root and `"a..b"` equals `"a.b"`.
    pub fn parse(s: &str) -> Self {
        Self {
            segments: s
                .split(SEPARATOR)
                .filter(|seg| !seg.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build a path from pre-split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|seg: &String| !seg.is_empty())
                .collect(),
        }
    }

    /// Extend this path by one segment.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(
            segment
                .split(SEPARATOR)
                .filter(|seg| !seg.is_empty())
                .map(str::to_string),
        );
        Self { segments }
    }

    /// The enclosing path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// True if either path is a (segment-wise) prefix of the other.
    ///
    /// This is the relation used to route change notifications to
    /// dependency rules: a write to `editor.document.nodes` concerns a rule
    /// watching `editor.document`, and the other way round.
    pub fn is_related(&self, other: &Path) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(seg)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

impl<T> From<Key<T>> for Path {
    fn from(key: Key<T>) -> Self {
        key.path
    }
}

impl<T> From<&Key<T>> for Path {
    fn from(key: &Key<T>) -> Self {
        key.path.clone()
    }
}

// ============================================================================
// Key<T>
// ============================================================================

/// A path tagged with the type of the value stored there.
///
/// Keys come from generated schema accessors or from plain strings:
///
/// ```ignore
/// let mode: Key<EditorMode> = paths::<StoreSchema>().editor().mode();
/// let same: Key<EditorMode> = "editor.mode".into();
/// assert_eq!(mode, same);
/// ```
pub struct Key<T> {
    path: Path,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub fn new(path: impl Into<Path>) -> Self {
        Self {
            path: path.into(),
            _ty: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reinterpret the value type stored at this path.
    pub fn cast<U>(self) -> Key<U> {
        Key::new(self.path)
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone())
    }
}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<T> Eq for Key<T> {}

impl<T> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.path)
    }
}

impl<T> From<&str> for Key<T> {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<T> From<String> for Key<T> {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl<T> From<Path> for Key<T> {
    fn from(path: Path) -> Self {
        Self::new(path)
    }
}

impl<T> From<&Key<T>> for Key<T> {
    fn from(key: &Key<T>) -> Self {
        key.clone()
    }
}

// ============================================================================
// Schema
// ============================================================================

/// A state schema whose fields can be addressed by generated accessors.
///
/// Implemented by `#[derive(StatePaths)]`; `Paths` is the generated node type
/// with one method per field.
pub trait PathSchema {
    type Paths;

    /// Accessor node for this schema mounted at `path`.
    fn paths_at(path: Path) -> Self::Paths;
}

/// Root sentinel: accessor node for a schema mounted at the root path.
///
/// ```ignore
/// let schema = rxstate::paths::<StoreSchema>();
/// assert_eq!(schema.selection().selected_id().to_string(), "selection.selectedId");
/// ```
pub fn paths<S: PathSchema>() -> S::Paths {
    S::paths_at(Path::root())
}
