use tracing::warn;

use crate::{
    data_structures::ranking_heap::{ExtractionOrder, MaxFirst, MinFirst, RankedItem, RankingHeap},
    error::{Result, SocialError},
};

pub mod feed;
pub mod suggestions;

pub use feed::{FeedBuilder, FeedCursors, FeedPost};
pub use suggestions::{Candidate, SuggestionBuilder};

/// The output of one ranking pass, handed out one item at a time in the heap's order.
///
/// Built fresh per request and dropped afterwards; nothing is shared between passes.
#[derive(Debug)]
pub struct RankedSequence<P, O: ExtractionOrder> {
    heap: RankingHeap<P, O>,
}

pub type Feed = RankedSequence<FeedPost, MaxFirst>;
pub type Suggestions = RankedSequence<Candidate, MinFirst>;

impl<P, O: ExtractionOrder> RankedSequence<P, O> {
    pub(crate) fn new(heap: RankingHeap<P, O>) -> Self {
        RankedSequence { heap }
    }

    /// The next item, or [`SocialError::HeapEmpty`] once everything has been handed out.
    pub fn next_item(&mut self) -> Result<RankedItem<P>> {
        self.heap.extract()
    }

    pub fn remaining(&self) -> usize {
        self.heap.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.heap.is_empty()
    }

    /// Items that did not fit into the ranking heap.
    pub fn dropped(&self) -> usize {
        self.heap.dropped()
    }
}

impl<P, O: ExtractionOrder> Iterator for RankedSequence<P, O> {
    type Item = RankedItem<P>;

    fn next(&mut self) -> Option<Self::Item> {
        self.heap.extract().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), Some(self.heap.len()))
    }
}

/// Inserts into `heap`, logging and skipping the item when the heap is full.
pub(crate) fn insert_or_drop<P, O: ExtractionOrder>(
    heap: &mut RankingHeap<P, O>,
    owner: &str,
    priority: f64,
    payload: P,
) -> Result<()> {
    match heap.insert(owner, priority, payload) {
        Err(SocialError::HeapFull { capacity }) => {
            warn!(owner, priority, capacity, "ranking heap full, item dropped");
            Ok(())
        }
        other => other,
    }
}
