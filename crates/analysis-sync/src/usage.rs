//! Focus keyword usage across posts
//!
//! Whether other posts already target the same focus keyword is looked up by
//! the host, once per keyword. Answers are cached for the session and handed
//! to the engine with every request for that keyword.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::debug;

use crate::host::KeywordUsageLookup;

pub struct KeywordUsage {
    lookup: Rc<dyn KeywordUsageLookup>,
    known: HashMap<String, Vec<u64>>,
    requested: HashSet<String>,
}

impl KeywordUsage {
    pub fn new(lookup: Rc<dyn KeywordUsageLookup>) -> Self {
        Self {
            lookup,
            known: HashMap::new(),
            requested: HashSet::new(),
        }
    }

    /// Posts known to use `keyword`, `None` until the lookup answered
    pub fn posts(&self, keyword: &str) -> Option<&[u64]> {
        self.known.get(keyword).map(Vec::as_slice)
    }

    /// Ask the host about `keyword` unless it was asked before
    ///
    /// Returns whether a lookup was started.
    pub fn check(&mut self, keyword: &str) -> bool {
        if keyword.is_empty() || self.known.contains_key(keyword) {
            return false;
        }
        if !self.requested.insert(keyword.to_string()) {
            return false;
        }
        debug!(keyword, "Looking up focus keyword usage");
        self.lookup.request(keyword);
        true
    }

    /// Store the answer for `keyword`, without `own_post`
    pub fn record(&mut self, keyword: &str, mut posts: Vec<u64>, own_post: Option<u64>) {
        posts.retain(|id| Some(*id) != own_post);
        posts.sort_unstable();
        posts.dedup();
        debug!(keyword, posts = posts.len(), "Recorded focus keyword usage");
        self.requested.remove(keyword);
        self.known.insert(keyword.to_string(), posts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Lookups(RefCell<Vec<String>>);

    impl KeywordUsageLookup for Lookups {
        fn request(&self, keyword: &str) {
            self.0.borrow_mut().push(keyword.to_string());
        }
    }

    #[test]
    fn test_each_keyword_is_looked_up_once() {
        let lookups = Rc::new(Lookups::default());
        let mut usage = KeywordUsage::new(lookups.clone());

        assert!(usage.check("rust"));
        assert!(!usage.check("rust"));
        assert!(usage.check("wasm"));
        assert!(!usage.check(""));
        assert_eq!(*lookups.0.borrow(), vec!["rust", "wasm"]);

        usage.record("rust", vec![3], None);
        assert!(!usage.check("rust"));
        assert_eq!(lookups.0.borrow().len(), 2);
    }

    #[test]
    fn test_record_excludes_own_post() {
        let mut usage = KeywordUsage::new(Rc::new(Lookups::default()));
        assert_eq!(usage.posts("rust"), None);

        usage.record("rust", vec![9, 7, 3, 7], Some(7));
        assert_eq!(usage.posts("rust"), Some(&[3, 9][..]));
    }
}
