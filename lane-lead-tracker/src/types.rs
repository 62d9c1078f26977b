//! Core types for the lane lead tracker
//!
//! This module defines the per-cycle input records, the lane classification,
//! and the output signal set handed to the transport layer. Tracks are
//! ephemeral (one cycle); everything that persists across cycles lives in
//! [`crate::lane_state`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// A single radar-reported object for one cycle
///
/// Ids are unique within a cycle. Upstream may reuse ids across cycles; the
/// tracker never relies on id continuity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track identifier assigned upstream
    pub id: u32,
    /// Longitudinal distance in meters
    pub d_rel: f64,
    /// Signed lateral offset in meters (negative = left)
    pub y_rel: f64,
    /// Relative velocity in m/s
    pub v_rel: f64,
    /// True if the radar marked this track as measured this cycle
    #[serde(default = "default_true")]
    pub valid: bool,
}

fn default_true() -> bool {
    true
}

impl Track {
    /// Create a valid track
    pub fn new(id: u32, d_rel: f64, y_rel: f64, v_rel: f64) -> Self {
        Self {
            id,
            d_rel,
            y_rel,
            v_rel,
            valid: true,
        }
    }

    /// Builder method: mark the track as not measured
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    /// True if every numeric field is finite
    pub fn is_well_formed(&self) -> bool {
        self.d_rel.is_finite() && self.y_rel.is_finite() && self.v_rel.is_finite()
    }
}

/// Lateral lane classification of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneBucket {
    /// Ego lane (|y_rel| within the lane boundary)
    Center,
    /// Adjacent lane to the left
    Left,
    /// Adjacent lane to the right
    Right,
}

impl fmt::Display for LaneBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneBucket::Center => f.pad("CENTER"),
            LaneBucket::Left => f.pad("LEFT"),
            LaneBucket::Right => f.pad("RIGHT"),
        }
    }
}

/// The two lanes that carry a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjacentLane {
    Left,
    Right,
}

impl AdjacentLane {
    /// Bucket that feeds lead selection for this lane
    pub fn bucket(self) -> LaneBucket {
        match self {
            AdjacentLane::Left => LaneBucket::Left,
            AdjacentLane::Right => LaneBucket::Right,
        }
    }
}

impl fmt::Display for AdjacentLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.bucket(), f)
    }
}

/// One cycle of upstream input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleInput {
    /// Monotonically increasing cycle counter
    pub sequence: u64,
    /// Tracks reported this cycle (order irrelevant)
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// False when the radar source is stale this cycle
    #[serde(default = "default_true")]
    pub input_valid: bool,
    /// Ego vehicle speed in m/s (only consulted when a speed gate is configured)
    #[serde(default)]
    pub ego_speed: Option<f64>,
}

impl CycleInput {
    /// Create a fresh cycle input
    pub fn new(sequence: u64, tracks: Vec<Track>) -> Self {
        Self {
            sequence,
            tracks,
            input_valid: true,
            ego_speed: None,
        }
    }

    /// Create a stale cycle (radar source not fresh)
    pub fn stale(sequence: u64) -> Self {
        Self {
            sequence,
            tracks: Vec::new(),
            input_valid: false,
            ego_speed: None,
        }
    }

    /// Builder method: attach ego speed
    pub fn with_ego_speed(mut self, speed: f64) -> Self {
        self.ego_speed = Some(speed);
        self
    }
}

/// Wire-ready fields for one adjacent lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputSignal {
    /// True if a lead is being reported
    pub present: bool,
    /// Scaled distance (raw bus value)
    pub distance: u16,
    /// Fixed lateral protocol constant
    pub lateral: u8,
    /// Relative velocity in the agreed unit/scale
    pub velocity: f64,
}

impl OutputSignal {
    /// Signal set for a lane without a lead
    pub fn absent(lateral: u8) -> Self {
        Self {
            present: false,
            distance: 0,
            lateral,
            velocity: 0.0,
        }
    }
}

/// Output pair for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleOutput {
    /// Sequence of the cycle that produced these signals
    pub sequence: u64,
    pub left: OutputSignal,
    pub right: OutputSignal,
}

/// Errors that can occur while configuring or driving the tracker
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Out-of-order cycle: sequence {received} is not after {last}")]
    OutOfOrderCycle { received: u64, last: u64 },
}
