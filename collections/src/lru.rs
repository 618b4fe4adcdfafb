//! Least-recently-used cache.
//!
//! Entries live in a `Vec` arena and are threaded onto an index-linked
//! doubly linked list ordered from most to least recently used. A `HashMap`
//! maps each key to its arena slot, so lookup, promotion and eviction are
//! all O(1). Removal uses `swap_remove` and patches the links of the entry
//! that moved into the freed slot.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Fixed-capacity cache with least-recently-used eviction.
pub struct LruCache<K, V> {
    map: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    /// Most recently used.
    head: Option<usize>,
    /// Least recently used.
    tail: Option<usize>,
    cap: NonZeroUsize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Create an empty cache holding at most `cap` entries.
    pub fn new(cap: NonZeroUsize) -> Self {
        Self {
            map: HashMap::with_capacity(cap.get()),
            nodes: Vec::with_capacity(cap.get()),
            head: None,
            tail: None,
            cap,
        }
    }

    /// Maximum number of entries.
    pub fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up `key`, marking it most recently used on a hit.
    ///
    /// A miss leaves the cache untouched.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.promote(idx);
        Some(&self.nodes[idx].value)
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.promote(idx);
        Some(&mut self.nodes[idx].value)
    }

    /// Look up `key` without touching its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|&idx| &self.nodes[idx].value)
    }

    /// Whether `key` is cached. Does not touch recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Insert or update `key`, marking it most recently used.
    ///
    /// Inserting a new key into a full cache first evicts the least
    /// recently used entry, which is returned.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            self.nodes[idx].value = value;
            self.promote(idx);
            return None;
        }

        let evicted = if self.nodes.len() >= self.cap.get() {
            self.pop_lru()
        } else {
            None
        };

        let idx = self.nodes.len();
        self.nodes.push(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.map.insert(key, idx);
        self.attach_front(idx);

        evicted
    }

    /// Remove `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        Some(self.remove_at(idx).1)
    }

    /// Remove and return the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;
        Some(self.remove_at(idx))
    }

    /// Key of the least recently used entry.
    pub fn peek_lru(&self) -> Option<&K> {
        self.tail.map(|idx| &self.nodes[idx].key)
    }

    /// Drop every entry. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterate from most to least recently used without touching recency.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.nodes.len(),
        }
    }

    fn promote(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    fn attach_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(h) => self.nodes[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn remove_at(&mut self, idx: usize) -> (K, V) {
        self.detach(idx);
        let node = self.nodes.swap_remove(idx);
        self.map.remove(&node.key);

        // The former last node now sits in `idx`; repoint its neighbours.
        if idx < self.nodes.len() {
            let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
            match prev {
                Some(p) => self.nodes[p].next = Some(idx),
                None => self.head = Some(idx),
            }
            match next {
                Some(n) => self.nodes[n].prev = Some(idx),
                None => self.tail = Some(idx),
            }
            if let Some(slot) = self.map.get_mut(&self.nodes[idx].key) {
                *slot = idx;
            }
        }

        (node.key, node.value)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            list.entry(&(&node.key, &node.value));
            cursor = node.next;
        }
        list.finish()
    }
}

/// Iterator over cache entries, most recently used first.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = &self.nodes[idx];
        self.cursor = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
