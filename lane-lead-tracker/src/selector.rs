//! Lead selection
//!
//! The lead of an adjacent lane is the nearest track in its bucket. Ties on
//! distance go to the smaller id so the result never depends on input order.

use crate::types::Track;
use std::cmp::Ordering;

/// The track chosen as a lane's lead for the current cycle
pub type LeadCandidate = Track;

/// Pick the nearest track in a bucket
pub fn select(bucket: &[Track]) -> Option<LeadCandidate> {
    bucket.iter().copied().min_by(compare_candidates)
}

/// Order by `d_rel`, then by id
fn compare_candidates(a: &Track, b: &Track) -> Ordering {
    a.d_rel.total_cmp(&b.d_rel).then_with(|| a.id.cmp(&b.id))
}
