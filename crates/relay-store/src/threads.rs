//! Thread index - parent/replies grouping derived from the flat log
//!
//! Threading is one level deep: a reply's replies are flattened into the
//! root's thread. The index is recomputed from the ordered log, never stored,
//! so message deletion cannot leave dangling thread pointers.

use std::collections::{HashMap, HashSet};

use relay_core::{Message, MessageId};

/// Derived parent-to-replies grouping
#[derive(Debug, Default)]
pub struct ThreadIndex {
    roots: Vec<MessageId>,
    replies: HashMap<MessageId, Vec<Message>>,
}

impl ThreadIndex {
    /// Build the index in a single pass over the ordered message sequence
    ///
    /// Roots keep log order; each root's reply list is chronological because
    /// the input already is.
    pub fn build(messages: &[Message]) -> Self {
        let mut roots = Vec::new();
        let mut replies: HashMap<MessageId, Vec<Message>> = HashMap::new();

        for message in messages {
            match &message.reply_to_id {
                Some(parent) => replies.entry(parent.clone()).or_default().push(message.clone()),
                None => roots.push(message.id.clone()),
            }
        }

        Self { roots, replies }
    }

    /// Root message ids in display order
    pub fn roots(&self) -> &[MessageId] {
        &self.roots
    }

    /// Chronological replies under a root (empty for unknown ids)
    pub fn replies_of(&self, root: &MessageId) -> &[Message] {
        self.replies.get(root).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of replies under a root
    pub fn reply_count(&self, root: &MessageId) -> usize {
        self.replies_of(root).len()
    }

    /// Check whether a root has any replies
    pub fn has_replies(&self, root: &MessageId) -> bool {
        !self.replies_of(root).is_empty()
    }
}

/// Expand/collapse view-state, kept apart from the derived index
#[derive(Debug, Default)]
pub struct ThreadViewState {
    expanded: HashSet<MessageId>,
}

impl ThreadViewState {
    /// Create with everything collapsed
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a root; returns the new expanded state
    pub fn toggle(&mut self, root: &MessageId) -> bool {
        if self.expanded.remove(root) {
            false
        } else {
            self.expanded.insert(root.clone());
            true
        }
    }

    /// Check whether a root is expanded
    pub fn is_expanded(&self, root: &MessageId) -> bool {
        self.expanded.contains(root)
    }

    /// Collapse everything
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}
