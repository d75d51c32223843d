use crate::data::InterestVector;

/// Distance reported when neither user has any interest set, i.e. there is nothing to compare.
pub const UNDEFINED_AFFINITY_DISTANCE: f64 = 1.0;

/// Counts of interests held by both users (`same`) and by exactly one of them (`diff`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub same: usize,
    pub diff: usize,
}

pub fn overlap(a: &InterestVector, b: &InterestVector) -> Overlap {
    let mut same = 0;
    let mut diff = 0;

    for (&x, &y) in a.flags().iter().zip(b.flags().iter()) {
        match (x, y) {
            (true, true) => same += 1,
            (true, false) | (false, true) => diff += 1,
            (false, false) => {}
        }
    }

    Overlap { same, diff }
}

/// Jaccard similarity `same / (same + diff)`, or `None` when the union is empty.
pub fn jaccard_similarity(a: &InterestVector, b: &InterestVector) -> Option<f64> {
    let Overlap { same, diff } = overlap(a, b);
    let union = same + diff;
    if union == 0 {
        return None;
    }
    Some(same as f64 / union as f64)
}

/// Jaccard distance between two interest vectors: 0 for identical interests, 1 for disjoint ones.
///
/// Two empty interest sets have no measurable affinity and are reported at
/// [`UNDEFINED_AFFINITY_DISTANCE`].
pub fn distance(a: &InterestVector, b: &InterestVector) -> f64 {
    jaccard_similarity(a, b)
        .map(|similarity| 1.0 - similarity)
        .unwrap_or(UNDEFINED_AFFINITY_DISTANCE)
}
