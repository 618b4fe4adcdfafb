//! Prefix tree for autocomplete.
//!
//! Each terminal node carries the list of payloads inserted under its word
//! (for product search: the ids of every product with that name). Case
//! folding is the caller's job.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct TrieNode<P> {
    children: BTreeMap<char, TrieNode<P>>,
    is_terminal: bool,
    payloads: Vec<P>,
}

impl<P> TrieNode<P> {
    fn new() -> Self {
        Self {
            children: BTreeMap::new(),
            is_terminal: false,
            payloads: Vec::new(),
        }
    }
}

/// A completed word and everything stored under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion<P> {
    pub word: String,
    pub payloads: Vec<P>,
}

/// Prefix tree keyed by `char`.
#[derive(Debug, Clone)]
pub struct Trie<P> {
    root: TrieNode<P>,
    words: usize,
}

impl<P> Trie<P> {
    /// Create an empty trie.
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(),
            words: 0,
        }
    }

    /// Insert `word`, appending `payload` to its payload list.
    ///
    /// Inserting the same word twice accumulates payloads.
    pub fn insert(&mut self, word: &str, payload: P) {
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_insert_with(TrieNode::new);
        }
        if !node.is_terminal {
            node.is_terminal = true;
            self.words += 1;
        }
        node.payloads.push(payload);
    }

    /// Whether `word` was inserted (exact match).
    pub fn contains(&self, word: &str) -> bool {
        self.find(word).map_or(false, |node| node.is_terminal)
    }

    /// Payloads stored under `word`, if it was inserted.
    pub fn payloads(&self, word: &str) -> Option<&[P]> {
        self.find(word)
            .filter(|node| node.is_terminal)
            .map(|node| node.payloads.as_slice())
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    fn find(&self, prefix: &str) -> Option<&TrieNode<P>> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }
}

impl<P: Clone> Trie<P> {
    /// Up to `limit` words starting with `prefix`.
    ///
    /// Depth-first from the prefix node, visiting children in `char`
    /// order, so shorter words come before their extensions and siblings
    /// come out sorted. Traversal stops as soon as `limit` results exist.
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<Suggestion<P>> {
        let mut out = Vec::new();
        if limit == 0 {
            return out;
        }
        let Some(start) = self.find(prefix) else {
            return out;
        };

        let mut stack = vec![(start, prefix.to_string())];
        while let Some((node, word)) = stack.pop() {
            if node.is_terminal {
                out.push(Suggestion {
                    word: word.clone(),
                    payloads: node.payloads.clone(),
                });
                if out.len() >= limit {
                    break;
                }
            }
            for (ch, child) in node.children.iter().rev() {
                let mut next = word.clone();
                next.push(*ch);
                stack.push((child, next));
            }
        }
        out
    }
}

impl<P> Default for Trie<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsRef<str>, P> Extend<(S, P)> for Trie<P> {
    fn extend<I: IntoIterator<Item = (S, P)>>(&mut self, iter: I) {
        for (word, payload) in iter {
            self.insert(word.as_ref(), payload);
        }
    }
}

impl<S: AsRef<str>, P> FromIterator<(S, P)> for Trie<P> {
    fn from_iter<I: IntoIterator<Item = (S, P)>>(iter: I) -> Self {
        let mut trie = Trie::new();
        trie.extend(iter);
        trie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(suggestions: &[Suggestion<u32>]) -> Vec<&str> {
        suggestions.iter().map(|s| s.word.as_str()).collect()
    }

    fn catalog() -> Trie<u32> {
        [
            ("smart watch", 2),
            ("smart speaker", 7),
            ("smart", 9),
            ("usb-c hub", 4),
            ("portable ssd 1tb", 6),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_suggest_prefix() {
        let trie = catalog();
        let out = trie.suggest("sma", 10);

        assert_eq!(words(&out), vec!["smart", "smart speaker", "smart watch"]);
        assert_eq!(out[2].payloads, vec![2]);
    }

    #[test]
    fn test_suggest_unknown_prefix_is_empty() {
        let trie = catalog();
        assert!(trie.suggest("laptop", 10).is_empty());
        assert!(trie.suggest("smartx", 10).is_empty());
    }

    #[test]
    fn test_suggest_respects_limit() {
        let trie = catalog();
        assert_eq!(trie.suggest("s", 2).len(), 2);
        assert!(trie.suggest("s", 0).is_empty());
    }

    #[test]
    fn test_exact_word_is_its_own_suggestion() {
        let trie = catalog();
        let out = trie.suggest("usb-c hub", 5);
        assert_eq!(words(&out), vec!["usb-c hub"]);
        assert_eq!(out[0].payloads, vec![4]);
    }

    #[test]
    fn test_duplicate_insert_accumulates_payloads() {
        let mut trie = Trie::new();
        trie.insert("webcam", 1u32);
        trie.insert("webcam", 5);

        assert_eq!(trie.len(), 1);
        assert_eq!(trie.payloads("webcam"), Some(&[1, 5][..]));
        assert_eq!(trie.suggest("web", 3)[0].payloads, vec![1, 5]);
    }

    #[test]
    fn test_prefix_node_is_not_a_word() {
        let trie = catalog();
        assert!(!trie.contains("sma"));
        assert!(trie.payloads("sma").is_none());
        assert!(trie.contains("smart"));
    }

    #[test]
    fn test_unicode_words() {
        let mut trie = Trie::new();
        trie.insert("café crème", 1u32);
        trie.insert("caffè", 2);

        let out = trie.suggest("caf", 5);
        assert_eq!(out.len(), 2);
        assert_eq!(trie.suggest("café", 5)[0].word, "café crème");
    }

    #[test]
    fn test_empty_trie() {
        let trie: Trie<u32> = Trie::default();
        assert!(trie.is_empty());
        assert!(trie.suggest("", 5).is_empty());
    }

    proptest! {
        #[test]
        fn prop_every_prefix_finds_word(words in prop::collection::vec("[a-d]{1,6}", 1..20)) {
            let trie: Trie<usize> = words.iter().enumerate().map(|(i, w)| (w.as_str(), i)).collect();
            let limit = words.len() + 1;

            for word in &words {
                for end in 1..=word.len() {
                    let prefix = &word[..end];
                    let found = trie.suggest(prefix, limit);
                    prop_assert!(found.iter().any(|s| &s.word == word));
                    prop_assert!(found.iter().all(|s| s.word.starts_with(prefix)));
                }
            }
        }
    }
}
