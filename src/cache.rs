use crate::data::loader::Fingerprint;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// Memoizes computed values for one dataset at a time. Presenting a different
/// fingerprint drops every entry; `invalidate` does the same on demand.
#[derive(Debug)]
pub struct MemoCache<K, V> {
    fingerprint: Option<Fingerprint>,
    entries: HashMap<K, Rc<V>>,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash + Clone, V> MemoCache<K, V> {
    pub fn new() -> Self {
        MemoCache {
            fingerprint: None,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get_or_compute<E, F>(&mut self, fingerprint: &Fingerprint, key: &K, compute: F) -> Result<Rc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if self.fingerprint.as_ref() != Some(fingerprint) {
            if self.fingerprint.is_some() {
                log::debug!("Dataset changed to {}, dropping {} cached reports", fingerprint.short(), self.entries.len());
            }
            self.entries.clear();
            self.fingerprint = Some(fingerprint.clone());
        }

        if let Some(value) = self.entries.get(key) {
            self.hits += 1;
            return Ok(Rc::clone(value));
        }

        self.misses += 1;
        // Errors are not cached.
        let value = Rc::new(compute()?);
        self.entries.insert(key.clone(), Rc::clone(&value));
        Ok(value)
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.fingerprint = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

impl<K: Eq + Hash + Clone, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fp(text: &str) -> Fingerprint {
        Fingerprint::of(text.as_bytes())
    }

    #[test]
    fn identical_requests_compute_once() {
        let mut cache: MemoCache<String, usize> = MemoCache::new();
        let calls = Cell::new(0);
        let compute = || -> Result<usize, ()> {
            calls.set(calls.get() + 1);
            Ok(42)
        };

        let a = cache.get_or_compute(&fp("one"), &"Ahri".to_string(), compute).unwrap();
        let b = cache.get_or_compute(&fp("one"), &"Ahri".to_string(), compute).unwrap();
        assert_eq!((*a, *b), (42, 42));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn new_dataset_drops_entries() {
        let mut cache: MemoCache<&str, u32> = MemoCache::new();
        cache.get_or_compute(&fp("one"), &"Ahri", || Ok::<_, ()>(1)).unwrap();
        cache.get_or_compute(&fp("one"), &"Lux", || Ok::<_, ()>(2)).unwrap();
        assert_eq!(cache.len(), 2);

        let v = cache.get_or_compute(&fp("two"), &"Ahri", || Ok::<_, ()>(10)).unwrap();
        assert_eq!(*v, 10);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_and_errors() {
        let mut cache: MemoCache<&str, u32> = MemoCache::new();
        cache.get_or_compute(&fp("one"), &"Ahri", || Ok::<_, ()>(1)).unwrap();
        cache.invalidate();
        assert!(cache.is_empty());

        let err = cache.get_or_compute(&fp("one"), &"Zed", || Err::<u32, _>("missing"));
        assert_eq!(err.unwrap_err(), "missing");
        assert!(cache.is_empty());
    }
}
