use std::marker::PhantomData;

use ordered_float::OrderedFloat;

use crate::error::{Result, SocialError};

/// An entry of a ranking pass: who it belongs to, its score and what is being ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItem<P> {
    pub owner: String,
    pub priority: f64,
    pub payload: P,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::MaxFirst {}
    impl Sealed for super::MinFirst {}
}

/// The extraction direction of a [`RankingHeap`], fixed for the lifetime of the heap.
pub trait ExtractionOrder: sealed::Sealed + Sized {
    fn extract<P>(heap: &mut RankingHeap<P, Self>) -> Result<RankedItem<P>>;
}

/// Highest priority first. Extraction restores the max-heap order.
#[derive(Debug)]
pub struct MaxFirst;

/// Lowest priority first. Extraction scans linearly and leaves the heap order broken, which is
/// why a heap of this kind never offers `extract_max`.
#[derive(Debug)]
pub struct MinFirst;

impl ExtractionOrder for MaxFirst {
    fn extract<P>(heap: &mut RankingHeap<P, Self>) -> Result<RankedItem<P>> {
        heap.extract_max()
    }
}

impl ExtractionOrder for MinFirst {
    fn extract<P>(heap: &mut RankingHeap<P, Self>) -> Result<RankedItem<P>> {
        heap.extract_min()
    }
}

/// A bounded, array-backed binary heap of scored items.
///
/// Inserts keep the max-heap order (`items[i] >= items[2i+1]` and `items[i] >= items[2i+2]`).
/// Once `capacity` items are held further inserts are dropped with
/// [`SocialError::HeapFull`]; the heap stays usable.
#[derive(Debug)]
pub struct RankingHeap<P, O: ExtractionOrder = MaxFirst> {
    items: Vec<RankedItem<P>>,
    capacity: usize,
    dropped: usize,
    _order: PhantomData<O>,
}

pub type MaxRankingHeap<P> = RankingHeap<P, MaxFirst>;
pub type MinRankingHeap<P> = RankingHeap<P, MinFirst>;

impl<P, O: ExtractionOrder> RankingHeap<P, O> {
    /// Reserves room for `capacity` items up front.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut items = Vec::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|_| SocialError::OutOfMemory {
                requested: capacity,
            })?;

        Ok(RankingHeap {
            items,
            capacity,
            dropped: 0,
            _order: PhantomData,
        })
    }

    pub fn insert(&mut self, owner: impl Into<String>, priority: f64, payload: P) -> Result<()> {
        if self.items.len() >= self.capacity {
            self.dropped += 1;
            return Err(SocialError::HeapFull {
                capacity: self.capacity,
            });
        }

        self.items.push(RankedItem {
            owner: owner.into(),
            priority,
            payload,
        });
        self.sift_up(self.items.len() - 1);
        Ok(())
    }

    /// Removes the next item in this heap's extraction order.
    pub fn extract(&mut self) -> Result<RankedItem<P>> {
        O::extract(self)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of inserts rejected because the heap was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn items(&self) -> &[RankedItem<P>] {
        &self.items
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if key(&self.items[index]) <= key(&self.items[parent]) {
                break;
            }
            self.items.swap(index, parent);
            index = parent;
        }
    }
}

impl<P> RankingHeap<P, MaxFirst> {
    pub fn extract_max(&mut self) -> Result<RankedItem<P>> {
        if self.items.is_empty() {
            return Err(SocialError::HeapEmpty);
        }

        let top = self.items.swap_remove(0);
        self.sift_down(0);
        Ok(top)
    }

    pub fn peek_max(&self) -> Option<&RankedItem<P>> {
        self.items.first()
    }

    /// Whether every parent's priority is at least each of its children's.
    pub fn is_heap_ordered(&self) -> bool {
        (1..self.items.len()).all(|child| {
            let parent = (child - 1) / 2;
            key(&self.items[parent]) >= key(&self.items[child])
        })
    }

    fn sift_down(&mut self, mut index: usize) {
        let size = self.items.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut largest = index;

            if left < size && key(&self.items[left]) > key(&self.items[largest]) {
                largest = left;
            }
            if right < size && key(&self.items[right]) > key(&self.items[largest]) {
                largest = right;
            }
            if largest == index {
                break;
            }

            self.items.swap(index, largest);
            index = largest;
        }
    }
}

impl<P> RankingHeap<P, MinFirst> {
    /// Removes the lowest-priority item by a linear scan, filling its slot with the last item.
    pub fn extract_min(&mut self) -> Result<RankedItem<P>> {
        let position = self
            .items
            .iter()
            .enumerate()
            .min_by_key(|(_, item)| key(item))
            .map(|(i, _)| i)
            .ok_or(SocialError::HeapEmpty)?;

        Ok(self.items.swap_remove(position))
    }
}

fn key<P>(item: &RankedItem<P>) -> OrderedFloat<f64> {
    OrderedFloat(item.priority)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_capacity_reports_out_of_memory() {
        let result = MaxRankingHeap::<()>::with_capacity(usize::MAX);
        assert!(matches!(
            result,
            Err(SocialError::OutOfMemory {
                requested: usize::MAX
            })
        ));
        assert!(MinRankingHeap::<u64>::with_capacity(usize::MAX).is_err());
    }

    #[test]
    fn test_insert_and_len() {
        let mut heap: MaxRankingHeap<()> = RankingHeap::with_capacity(4).unwrap();
        assert_eq!(heap.len(), 0);

        heap.insert("a", 1.0, ()).unwrap();
        assert_eq!(heap.len(), 1);

        heap.insert("b", 2.0, ()).unwrap();
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.capacity(), 4);
    }

    #[test]
    fn test_extract_max_order() {
        let mut heap = MaxRankingHeap::with_capacity(10).unwrap();
        for (owner, priority) in [("a", 3.0), ("b", 7.5), ("c", 1.0), ("d", 5.0), ("e", 7.0)] {
            heap.insert(owner, priority, owner.to_uppercase()).unwrap();
        }

        let owners: Vec<String> = std::iter::from_fn(|| heap.extract_max().ok())
            .map(|item| item.owner)
            .collect();
        assert_eq!(owners, vec!["b", "e", "d", "a", "c"]);
    }

    #[test]
    fn test_heap_order_holds_after_every_operation() {
        let mut heap = MaxRankingHeap::with_capacity(64).unwrap();
        for i in 0..40u32 {
            let priority = ((i * 37) % 23) as f64;
            heap.insert(format!("u{}", i), priority, i).unwrap();
            assert!(heap.is_heap_ordered());
            if i % 3 == 0 {
                heap.extract_max().unwrap();
                assert!(heap.is_heap_ordered());
            }
        }
    }

    #[test]
    fn test_extract_on_empty() {
        let mut max: MaxRankingHeap<()> = RankingHeap::with_capacity(2).unwrap();
        assert!(matches!(max.extract_max(), Err(SocialError::HeapEmpty)));

        let mut min: MinRankingHeap<()> = RankingHeap::with_capacity(2).unwrap();
        assert!(matches!(min.extract_min(), Err(SocialError::HeapEmpty)));
    }

    #[test]
    fn test_full_heap_drops_items() {
        let mut heap = MaxRankingHeap::with_capacity(2).unwrap();
        heap.insert("a", 1.0, ()).unwrap();
        heap.insert("b", 2.0, ()).unwrap();

        let result = heap.insert("c", 3.0, ());
        assert!(matches!(result, Err(SocialError::HeapFull { capacity: 2 })));
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.dropped(), 1);
        assert_eq!(heap.extract_max().unwrap().owner, "b");
    }

    #[test]
    fn test_extract_min_order() {
        let mut heap = MinRankingHeap::with_capacity(10).unwrap();
        for (owner, priority) in [("a", 0.4), ("b", 0.1), ("c", 0.9), ("d", 0.0), ("e", 0.5)] {
            heap.insert(owner, priority, ()).unwrap();
        }

        let mut owners = Vec::new();
        while let Ok(item) = heap.extract_min() {
            owners.push(item.owner);
        }
        assert_eq!(owners, vec!["d", "b", "a", "e", "c"]);
    }

    #[test]
    fn test_generic_extract_follows_order() {
        let mut max = MaxRankingHeap::with_capacity(3).unwrap();
        let mut min = MinRankingHeap::with_capacity(3).unwrap();
        for priority in [2.0, 1.0, 3.0] {
            max.insert("x", priority, ()).unwrap();
            min.insert("x", priority, ()).unwrap();
        }

        assert_eq!(max.extract().unwrap().priority, 3.0);
        assert_eq!(min.extract().unwrap().priority, 1.0);
    }

    #[test]
    fn test_peek_max() {
        let mut heap = MaxRankingHeap::with_capacity(3).unwrap();
        assert!(heap.peek_max().is_none());

        heap.insert("a", 1.0, ()).unwrap();
        heap.insert("b", 4.0, ()).unwrap();
        assert_eq!(heap.peek_max().map(|item| item.owner.as_str()), Some("b"));
    }
}
