//! Parent-linked path representation
//!
//! Every explored article is recorded as a [`PathNode`] pointing back at the
//! article it was discovered from. The nodes form a tree rooted at the start
//! article; a node is only ever constructed after its title has been claimed
//! in the visited set, so the parent chain can never cycle.

use std::sync::Arc;

/// One article on a discovered path, linked to the article it was reached
/// from.
///
/// Immutable once constructed. Children and the final path reconstruction
/// hold `Arc` references to their parents, so a node stays alive as long as
/// any path through it does.
#[derive(Debug)]
pub struct PathNode {
    parent: Option<Arc<PathNode>>,
    title: String,
}

impl PathNode {
    /// Create the root node of a search.
    #[must_use]
    pub fn root<S: Into<String>>(title: S) -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            title: title.into(),
        })
    }

    /// Create a node discovered from `parent`.
    #[must_use]
    pub fn child<S: Into<String>>(parent: &Arc<Self>, title: S) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(Arc::clone(parent)),
            title: title.into(),
        })
    }

    /// The article title this node records.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of articles on the chain from the root to this node,
    /// inclusive.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut len = 1;
        let mut current = self.parent.as_deref();
        while let Some(node) = current {
            len += 1;
            current = node.parent.as_deref();
        }
        len
    }

    /// Walk the parent links back to the root and return the titles in
    /// traversal order, root first.
    #[must_use]
    pub fn trace(&self) -> Vec<String> {
        let mut titles = vec![self.title.clone()];
        let mut current = self.parent.as_deref();
        while let Some(node) = current {
            titles.push(node.title.clone());
            current = node.parent.as_deref();
        }
        titles.reverse();
        titles
    }
}
