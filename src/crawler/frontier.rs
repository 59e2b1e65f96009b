//! Breadth-first frontier with visited-set deduplication
//!
//! URLs are stored as given but keyed by their normalized form, so
//! `https://ex.com` and `https://ex.com/#top` are the same page.

use crate::url::visit_key;
use std::collections::{HashSet, VecDeque};

/// FIFO work queue plus the set of URLs already dequeued
///
/// A URL is never queued twice at once: [`Frontier::push`] checks both the
/// queued set and the visited set. The visited set only grows.
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs waiting to be visited, in discovery order
    queue: VecDeque<String>,

    /// Keys of the URLs currently in `queue`
    queued: HashSet<String>,

    /// Keys of URLs that have been dequeued
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only `seed`
    pub fn with_seed(seed: &str) -> Self {
        let mut frontier = Self::new();
        frontier.push(seed);
        frontier
    }

    /// Appends `url` unless it is already queued or visited
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: &str) -> bool {
        let key = visit_key(url);
        if self.visited.contains(&key) || self.queued.contains(&key) {
            return false;
        }
        self.queued.insert(key);
        self.queue.push_back(url.to_string());
        true
    }

    /// Removes the URL at the front of the queue
    pub fn pop(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&visit_key(&url));
        Some(url)
    }

    /// Records `url` as visited. Returns false if it already was.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(visit_key(url))
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(&visit_key(url))
    }

    /// Returns true if `url` is waiting in the queue
    pub fn is_queued(&self, url: &str) -> bool {
        self.queued.contains(&visit_key(url))
    }

    /// Number of URLs waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs dequeued so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
