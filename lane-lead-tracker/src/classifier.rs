//! Lateral lane classification
//!
//! Buckets a cycle's tracks into CENTER/LEFT/RIGHT using the fixed
//! lateral-offset threshold model:
//! - `|y_rel| <= lane_boundary` is the ego lane
//! - `lane_boundary < |y_rel| <= max_lateral` is an adjacent lane, side by sign
//! - anything further out is ignored (barriers, signs, shoulders)

use crate::config::TrackerConfig;
use crate::types::{LaneBucket, Track};

/// Per-cycle lane buckets
///
/// Holds copies of the input tracks; the input slice is never touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneBuckets {
    pub center: Vec<Track>,
    pub left: Vec<Track>,
    pub right: Vec<Track>,
    /// Number of tracks offered to the classifier
    pub total: usize,
    /// Tracks dropped (invalid, malformed, out of range or gated)
    pub ignored: usize,
}

impl LaneBuckets {
    /// Tracks in a given bucket
    pub fn get(&self, bucket: LaneBucket) -> &[Track] {
        match bucket {
            LaneBucket::Center => &self.center,
            LaneBucket::Left => &self.left,
            LaneBucket::Right => &self.right,
        }
    }

    /// Number of tracks in a given bucket
    pub fn count(&self, bucket: LaneBucket) -> usize {
        self.get(bucket).len()
    }

    fn push(&mut self, bucket: LaneBucket, track: Track) {
        match bucket {
            LaneBucket::Center => self.center.push(track),
            LaneBucket::Left => self.left.push(track),
            LaneBucket::Right => self.right.push(track),
        }
    }
}

/// Lane of a single track, or `None` if it does not participate
pub fn bucket_of(track: &Track, lane_boundary: f64, max_lateral: f64) -> Option<LaneBucket> {
    if !track.valid || !track.is_well_formed() {
        return None;
    }

    let lateral = track.y_rel.abs();
    if lateral > max_lateral {
        None
    } else if lateral <= lane_boundary {
        Some(LaneBucket::Center)
    } else if track.y_rel < 0.0 {
        Some(LaneBucket::Left)
    } else {
        Some(LaneBucket::Right)
    }
}

/// Lane of a single track under a config, including the plausibility gate
pub fn lane_of(track: &Track, config: &TrackerConfig) -> Option<LaneBucket> {
    if !config.is_plausible(track) {
        return None;
    }
    bucket_of(track, config.lane_boundary, config.max_lateral)
}

/// Classify tracks by lateral offset
pub fn classify(tracks: &[Track], lane_boundary: f64, max_lateral: f64) -> LaneBuckets {
    classify_by(tracks, |track| bucket_of(track, lane_boundary, max_lateral))
}

/// Classify tracks using the thresholds and plausibility gate of a config
pub fn classify_with_config(tracks: &[Track], config: &TrackerConfig) -> LaneBuckets {
    classify_by(tracks, |track| lane_of(track, config))
}

fn classify_by<F>(tracks: &[Track], lane: F) -> LaneBuckets
where
    F: Fn(&Track) -> Option<LaneBucket>,
{
    let mut buckets = LaneBuckets {
        total: tracks.len(),
        ..LaneBuckets::default()
    };

    for track in tracks {
        match lane(track) {
            Some(bucket) => buckets.push(bucket, *track),
            None => {
                log::trace!(
                    "Dropping track {} (d_rel={}, y_rel={}, valid={})",
                    track.id,
                    track.d_rel,
                    track.y_rel,
                    track.valid
                );
                buckets.ignored += 1;
            }
        }
    }

    buckets
}
