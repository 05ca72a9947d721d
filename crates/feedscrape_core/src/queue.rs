use std::collections::{HashSet, VecDeque};

use crate::PostRef;

/// Read capability over ids that already left the queue.
pub trait SeenIds {
    fn contains_id(&self, id: &str) -> bool;
}

impl SeenIds for HashSet<String> {
    fn contains_id(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// FIFO of discovered posts; an id is accepted at most once while it is pending
/// and never when the controller has already seen it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupQueue {
    entries: VecDeque<PostRef>,
    ids: HashSet<String>,
}

impl DedupQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `post` unless its id is pending or reported by `seen`.
    /// Returns whether the post was queued.
    pub fn enqueue_if_absent(&mut self, post: PostRef, seen: &impl SeenIds) -> bool {
        if self.ids.contains(&post.id) || seen.contains_id(&post.id) {
            return false;
        }
        self.ids.insert(post.id.clone());
        self.entries.push_back(post);
        true
    }

    pub fn dequeue(&mut self) -> Option<PostRef> {
        let post = self.entries.pop_front()?;
        self.ids.remove(&post.id);
        Some(post)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|post| post.id.as_str())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }
}
