use std::collections::HashMap;

use crate::path::Path;

/// A segment Trie mapping paths to the values registered under them.
///
/// [`match_related`](Trie::match_related) returns values registered at the
/// path, at any of its ancestors, or anywhere beneath it. That lookup routes
/// a change notification to every dependency whose path is a segment-prefix
/// of the changed path or has the changed path as a prefix.
///
/// # Examples
///
/// ```ignore
/// let mut trie = Trie::new();
/// trie.insert(&Path::parse("editor.document"), 1);
/// trie.insert(&Path::parse("editor.document.nodes"), 2);
/// trie.insert(&Path::parse("editor.mode"), 3);
///
/// trie.match_related(&Path::parse("editor.document")); // [1, 2]
/// trie.match_related(&Path::parse("editor"));          // [1, 2, 3]
/// ```
pub(crate) struct Trie<T> {
    root: TrieNode<T>,
}

struct TrieNode<T> {
    children: HashMap<String, TrieNode<T>>,
    /// Values whose path terminates at this node.
    values: Vec<T>,
}

impl<T> Default for TrieNode<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            values: Vec::new(),
        }
    }
}

impl<T: Clone> Trie<T> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
        }
    }

    pub fn insert(&mut self, path: &Path, value: T) {
        let mut node = &mut self.root;
        for seg in path.segments() {
            node = node.children.entry(seg.clone()).or_default();
        }
        node.values.push(value);
    }

    /// Values registered at `path`, at its ancestors, or below it.
    pub fn match_related(&self, path: &Path) -> Vec<T> {
        let mut results = Vec::new();
        let mut node = &self.root;
        for seg in path.segments() {
            // Ancestor registrations.
            results.extend(node.values.iter().cloned());
            match node.children.get(seg) {
                Some(child) => node = child,
                None => return results,
            }
        }
        // The node for `path` itself plus its whole subtree.
        node.collect_subtree(&mut results);
        results
    }

    /// Remove values matching the predicate from `path`, pruning emptied
    /// branches. Returns `true` if anything was removed.
    pub fn remove<F>(&mut self, path: &Path, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.root.remove(path.segments(), &predicate)
    }
}

impl<T: Clone> TrieNode<T> {
    fn collect_subtree(&self, results: &mut Vec<T>) {
        results.extend(self.values.iter().cloned());
        for child in self.children.values() {
            child.collect_subtree(results);
        }
    }

    fn remove<F>(&mut self, segments: &[String], predicate: &F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let Some((first, rest)) = segments.split_first() else {
            let before = self.values.len();
            self.values.retain(|v| !predicate(v));
            return self.values.len() < before;
        };

        let Some(child) = self.children.get_mut(first) else {
            return false;
        };
        let removed = child.remove(rest, predicate);
        if child.values.is_empty() && child.children.is_empty() {
            self.children.remove(first);
        }
        removed
    }
}
