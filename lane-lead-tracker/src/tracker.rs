//! Main tracker API
//!
//! [`LeadTracker`] is the entry point for the per-cycle pipeline:
//! classify → select → update → encode. It owns both lane states and is the
//! only code that mutates them. Everything it hands out (outputs, snapshots)
//! is an owned copy taken after the cycle's update has completed.

use crate::classifier::{classify_with_config, lane_of, LaneBuckets};
use crate::config::TrackerConfig;
use crate::encoder::SignalEncoder;
use crate::lane_state::LaneLeadState;
use crate::selector::{select, LeadCandidate};
use crate::types::{
    AdjacentLane, CycleInput, CycleOutput, LaneBucket, Result, Track, TrackerError,
};

/// A track as seen by diagnostics, with its lane assignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackEntry {
    pub track: Track,
    /// `None` if the track was ignored
    pub lane: Option<LaneBucket>,
}

/// Immutable view of the tracker after a cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSnapshot {
    /// Sequence of the last processed cycle (None before the first cycle)
    pub sequence: Option<u64>,
    /// True if the radar input of the last cycle was stale
    pub stale: bool,
    /// True if the last cycle was set aside by the ego speed gate
    pub speed_gated: bool,
    /// Tracks of the last cycle with their lanes (empty when stale)
    pub tracks: Vec<TrackEntry>,
    pub total: usize,
    pub center_count: usize,
    pub left_count: usize,
    pub right_count: usize,
    pub ignored: usize,
    /// Candidate selected this cycle for the left lane
    pub left_candidate: Option<u32>,
    /// Candidate selected this cycle for the right lane
    pub right_candidate: Option<u32>,
    pub left: LaneLeadState,
    pub right: LaneLeadState,
}

impl Default for CycleSnapshot {
    fn default() -> Self {
        Self {
            sequence: None,
            stale: false,
            speed_gated: false,
            tracks: Vec::new(),
            total: 0,
            center_count: 0,
            left_count: 0,
            right_count: 0,
            ignored: 0,
            left_candidate: None,
            right_candidate: None,
            left: LaneLeadState::no_lead(),
            right: LaneLeadState::no_lead(),
        }
    }
}

impl CycleSnapshot {
    /// Lead state of one lane
    pub fn lane(&self, lane: AdjacentLane) -> &LaneLeadState {
        match lane {
            AdjacentLane::Left => &self.left,
            AdjacentLane::Right => &self.right,
        }
    }
}

/// The adjacent-lane lead tracker
pub struct LeadTracker {
    config: TrackerConfig,
    left: LaneLeadState,
    right: LaneLeadState,
    left_encoder: SignalEncoder,
    right_encoder: SignalEncoder,
    last_sequence: Option<u64>,
    snapshot: CycleSnapshot,
}

impl LeadTracker {
    /// Create a tracker, rejecting invalid configuration
    ///
    /// # Example
    /// ```
    /// use lane_lead_tracker::{CycleInput, LeadTracker, Track, TrackerConfig};
    ///
    /// let config = TrackerConfig::new().with_hold_cycles(3);
    /// let mut tracker = LeadTracker::new(config).unwrap();
    ///
    /// let input = CycleInput::new(1, vec![Track::new(1, 4.5, -2.25, 0.0)]);
    /// let output = tracker.process_cycle(&input).unwrap();
    /// assert!(output.left.present);
    /// assert_eq!(output.left.distance, 45);
    /// ```
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;

        log::info!(
            "Lead tracker configured: lane_boundary={}m, max_lateral={}m, hold_cycles={}",
            config.lane_boundary,
            config.max_lateral,
            config.hold_cycles
        );

        Ok(Self {
            left_encoder: SignalEncoder::new(AdjacentLane::Left, &config),
            right_encoder: SignalEncoder::new(AdjacentLane::Right, &config),
            config,
            left: LaneLeadState::no_lead(),
            right: LaneLeadState::no_lead(),
            last_sequence: None,
            snapshot: CycleSnapshot::default(),
        })
    }

    /// Configuration the tracker was built with
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Encoder for one lane (signal names and field definitions)
    pub fn encoder(&self, lane: AdjacentLane) -> &SignalEncoder {
        match lane {
            AdjacentLane::Left => &self.left_encoder,
            AdjacentLane::Right => &self.right_encoder,
        }
    }

    /// Run one cycle
    ///
    /// Cycles must arrive in increasing sequence order. A cycle that is not
    /// newer than the last one is rejected and leaves the state untouched.
    /// Skipped sequence numbers count as cycles without candidates.
    pub fn process_cycle(&mut self, input: &CycleInput) -> Result<CycleOutput> {
        if let Some(last) = self.last_sequence {
            if input.sequence <= last {
                log::warn!(
                    "Rejecting cycle {}: already processed up to {}",
                    input.sequence,
                    last
                );
                return Err(TrackerError::OutOfOrderCycle {
                    received: input.sequence,
                    last,
                });
            }

            let missed = input.sequence - last - 1;
            if missed > 0 {
                self.catch_up(missed);
            }
        }

        let stale = !input.input_valid;
        let speed_gated = !stale && self.config.is_speed_gated(input.ego_speed);
        let buckets = if stale {
            log::debug!("Cycle {} has no usable radar input", input.sequence);
            LaneBuckets::default()
        } else if speed_gated {
            log::debug!("Cycle {} below the ego speed gate", input.sequence);
            LaneBuckets {
                total: input.tracks.len(),
                ignored: input.tracks.len(),
                ..LaneBuckets::default()
            }
        } else {
            classify_with_config(&input.tracks, &self.config)
        };

        let left_candidate = select(&buckets.left);
        let right_candidate = select(&buckets.right);
        self.update_lanes(left_candidate.as_ref(), right_candidate.as_ref());
        self.last_sequence = Some(input.sequence);

        let output = self.encode(input.sequence);
        self.snapshot = self.build_snapshot(
            input,
            stale,
            speed_gated,
            &buckets,
            left_candidate,
            right_candidate,
        );
        Ok(output)
    }

    /// Clear both lanes to `NoLead`
    ///
    /// Used when upstream signals loss of radar validity for the session.
    /// Sequence ordering is kept, so older cycles still cannot be replayed.
    pub fn reset(&mut self) {
        log::info!("Resetting lane leads");
        self.left.reset();
        self.right.reset();
        self.snapshot.left = self.left;
        self.snapshot.right = self.right;
        self.snapshot.left_candidate = None;
        self.snapshot.right_candidate = None;
    }

    /// Current lead state of one lane
    pub fn lane_state(&self, lane: AdjacentLane) -> &LaneLeadState {
        match lane {
            AdjacentLane::Left => &self.left,
            AdjacentLane::Right => &self.right,
        }
    }

    /// Snapshot taken after the last cycle
    pub fn snapshot(&self) -> &CycleSnapshot {
        &self.snapshot
    }

    /// Output signals for the current state
    pub fn current_output(&self) -> CycleOutput {
        CycleOutput {
            sequence: self.last_sequence.unwrap_or(0),
            left: self.left_encoder.encode(&self.left),
            right: self.right_encoder.encode(&self.right),
        }
    }

    /// Sequence of the last processed cycle
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    /// Apply missed cycles as empty updates
    ///
    /// After `hold_cycles + 1` empty updates both lanes are `NoLead`, so
    /// longer gaps are clamped.
    fn catch_up(&mut self, missed: u64) {
        let bound = u64::from(self.config.hold_cycles) + 1;
        let steps = missed.min(bound);
        log::debug!("Catching up {} missed cycle(s) ({} applied)", missed, steps);

        for _ in 0..steps {
            self.update_lanes(None, None);
        }
    }

    fn update_lanes(&mut self, left: Option<&LeadCandidate>, right: Option<&LeadCandidate>) {
        let hold_cycles = self.config.hold_cycles;
        self.left.update(left, hold_cycles);
        self.right.update(right, hold_cycles);
    }

    fn encode(&self, sequence: u64) -> CycleOutput {
        let (left, left_clipped) = self.left_encoder.encode_checked(&self.left);
        let (right, right_clipped) = self.right_encoder.encode_checked(&self.right);

        if left_clipped {
            log::debug!("Left lead distance {}m clipped to {}", self.left.d_rel, left.distance);
        }
        if right_clipped {
            log::debug!("Right lead distance {}m clipped to {}", self.right.d_rel, right.distance);
        }

        CycleOutput {
            sequence,
            left,
            right,
        }
    }

    fn build_snapshot(
        &self,
        input: &CycleInput,
        stale: bool,
        speed_gated: bool,
        buckets: &LaneBuckets,
        left_candidate: Option<LeadCandidate>,
        right_candidate: Option<LeadCandidate>,
    ) -> CycleSnapshot {
        let tracks = if stale {
            Vec::new()
        } else {
            input
                .tracks
                .iter()
                .map(|track| TrackEntry {
                    track: *track,
                    lane: if speed_gated {
                        None
                    } else {
                        lane_of(track, &self.config)
                    },
                })
                .collect()
        };

        CycleSnapshot {
            sequence: Some(input.sequence),
            stale,
            speed_gated,
            tracks,
            total: buckets.total,
            center_count: buckets.center.len(),
            left_count: buckets.left.len(),
            right_count: buckets.right.len(),
            ignored: buckets.ignored,
            left_candidate: left_candidate.map(|t| t.id),
            right_candidate: right_candidate.map(|t| t.id),
            left: self.left,
            right: self.right,
        }
    }
}
