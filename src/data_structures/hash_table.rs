use crate::error::{Result, SocialError};

/// Jenkins one-at-a-time hash of a string's bytes.
///
/// Used for directory bucket selection as well as for user and post ids.
pub fn jenkins_hash(key: &str) -> u32 {
    let mut hash: u32 = 0;
    for &byte in key.as_bytes() {
        hash = hash.wrapping_add(byte as u32);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }

    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash.wrapping_add(hash << 15)
}

#[derive(Debug)]
struct HashNode<V> {
    key: String,
    value: V,
    next: Option<Box<HashNode<V>>>,
}

/// A string-keyed hash table with a fixed number of chained buckets.
///
/// New nodes are prepended to their chain. Each key appears at most once: inserting an existing
/// key is rejected with [`SocialError::DuplicateKey`].
#[derive(Debug)]
pub struct HashTable<V> {
    buckets: Vec<Option<Box<HashNode<V>>>>,
    len: usize,
}

impl<V> HashTable<V> {
    pub fn new(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, || None);
        HashTable { buckets, len: 0 }
    }

    fn bucket_of(&self, key: &str) -> usize {
        jenkins_hash(key) as usize % self.buckets.len()
    }

    pub fn insert(&mut self, key: &str, value: V) -> Result<()> {
        if self.contains_key(key) {
            return Err(SocialError::DuplicateKey(key.to_string()));
        }

        let index = self.bucket_of(key);
        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(HashNode {
            key: key.to_string(),
            value,
            next,
        }));
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let mut current = self.buckets[self.bucket_of(key)].as_deref();
        while let Some(node) = current {
            if node.key == key {
                return Some(&node.value);
            }
            current = node.next.as_deref();
        }
        None
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let index = self.bucket_of(key);
        let mut current = self.buckets[index].as_deref_mut();
        while let Some(node) = current {
            if node.key == key {
                return Some(&mut node.value);
            }
            current = node.next.as_deref_mut();
        }
        None
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Unlinks the node for `key` and returns its value. Absent keys are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = self.bucket_of(key);
        let mut link = &mut self.buckets[index];
        while link.as_ref().map_or(false, |node| node.key != key) {
            link = &mut link.as_mut()?.next;
        }

        let node = link.take()?;
        *link = node.next;
        self.len -= 1;
        Some(node.value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Length of the longest chain.
    pub fn longest_chain(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| {
                let mut length = 0;
                let mut current = bucket.as_deref();
                while let Some(node) = current {
                    length += 1;
                    current = node.next.as_deref();
                }
                length
            })
            .max()
            .unwrap_or(0)
    }

    /// Entries in bucket order, and most recently inserted first within a bucket.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            current: None,
        }
    }
}

impl<V> Drop for HashTable<V> {
    fn drop(&mut self) {
        // Unlink iteratively so long chains do not recurse through `Box` drops.
        for bucket in self.buckets.iter_mut() {
            let mut current = bucket.take();
            while let Some(mut node) = current {
                current = node.next.take();
            }
        }
    }
}

pub struct Iter<'a, V> {
    buckets: std::slice::Iter<'a, Option<Box<HashNode<V>>>>,
    current: Option<&'a HashNode<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.current {
                self.current = node.next.as_deref();
                return Some((node.key.as_str(), &node.value));
            }
            self.current = self.buckets.next()?.as_deref();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jenkins_hash_known_values() {
        assert_eq!(jenkins_hash(""), 0);
        assert_eq!(jenkins_hash("a"), 0xca2e9442);
        assert_eq!(
            jenkins_hash("The quick brown fox jumps over the lazy dog"),
            0x519e91f5
        );
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = HashTable::new(8);
        table.insert("alice", 1).unwrap();
        table.insert("bob", 2).unwrap();

        assert_eq!(table.get("alice"), Some(&1));
        assert_eq!(table.get("bob"), Some(&2));
        assert_eq!(table.get("carol"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut table = HashTable::new(8);
        table.insert("alice", 1).unwrap();

        let result = table.insert("alice", 2);
        assert!(matches!(result, Err(SocialError::DuplicateKey(ref k)) if k == "alice"));
        assert_eq!(table.get("alice"), Some(&1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_from_shared_chain() {
        // A single bucket forces every key into the same chain.
        let mut table = HashTable::new(1);
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            table.insert(key, i).unwrap();
        }
        assert_eq!(table.longest_chain(), 4);

        assert_eq!(table.remove("c"), Some(2));
        assert_eq!(table.remove("c"), None);
        assert_eq!(table.remove("d"), Some(3));
        assert_eq!(table.remove("a"), Some(0));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("b"), Some(&1));
        assert_eq!(table.remove("zzz"), None);
    }

    #[test]
    fn test_iter_visits_every_entry_once() {
        let mut table = HashTable::new(3);
        for i in 0..20 {
            table.insert(&format!("user{}", i), i).unwrap();
        }

        let mut values: Vec<i32> = table.iter().map(|(_, &v)| v).collect();
        values.sort();
        assert_eq!(values, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_iter_is_most_recent_first_within_chain() {
        let mut table = HashTable::new(1);
        table.insert("first", 1).unwrap();
        table.insert("second", 2).unwrap();

        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["second", "first"]);
    }

    #[test]
    fn test_get_mut() {
        let mut table = HashTable::new(4);
        table.insert("alice", 1).unwrap();
        *table.get_mut("alice").unwrap() += 10;
        assert_eq!(table.get("alice"), Some(&11));
    }
}
