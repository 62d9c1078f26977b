//! Tracker configuration types
//!
//! Static configuration fixed at initialization. Nothing here is mutated
//! once a [`crate::LeadTracker`] has been built from it; `validate()` is the
//! single gate that keeps a malformed configuration from ever starting.

use crate::types::{Result, Track, TrackerError};
use serde::{Deserialize, Serialize};

/// Configuration for the lane lead tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Distance from ego centerline to the ego lane edge (meters)
    #[serde(default = "default_lane_boundary")]
    pub lane_boundary: f64,

    /// Tracks further out than this are ignored (barriers, signs)
    #[serde(default = "default_max_lateral")]
    pub max_lateral: f64,

    /// Cycles a lead is retained after its supporting track disappears.
    /// Platform specific, so a config file must always state it.
    pub hold_cycles: u32,

    /// Physical-to-raw factor for the distance field (raw = d_rel * scale)
    #[serde(default = "default_distance_scale")]
    pub distance_scale: f64,

    /// Largest raw distance value the output field can carry
    #[serde(default = "default_distance_max_raw")]
    pub distance_max_raw: u16,

    /// Physical-to-output factor for the velocity field
    #[serde(default = "default_velocity_scale")]
    pub velocity_scale: f64,

    /// Lateral value emitted for every lane, regardless of y_rel
    #[serde(default = "default_lateral_constant")]
    pub lateral_constant: u8,

    /// Optional range/velocity gate applied before lane classification
    #[serde(default)]
    pub plausibility: Option<PlausibilityConfig>,

    /// Optional: below this ego speed (m/s) every cycle counts as stale
    #[serde(default)]
    pub min_ego_speed: Option<f64>,
}

fn default_lane_boundary() -> f64 {
    1.8
}

fn default_max_lateral() -> f64 {
    5.5
}

fn default_hold_cycles() -> u32 {
    10
}

fn default_distance_scale() -> f64 {
    10.0
}

fn default_distance_max_raw() -> u16 {
    4095
}

fn default_velocity_scale() -> f64 {
    1.0
}

fn default_lateral_constant() -> u8 {
    80
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            lane_boundary: default_lane_boundary(),
            max_lateral: default_max_lateral(),
            hold_cycles: default_hold_cycles(),
            distance_scale: default_distance_scale(),
            distance_max_raw: default_distance_max_raw(),
            velocity_scale: default_velocity_scale(),
            lateral_constant: default_lateral_constant(),
            plausibility: None,
            min_ego_speed: None,
        }
    }
}

/// Range and motion gate for raw tracks
///
/// Tracks rejected here are treated exactly like tracks beyond `max_lateral`:
/// they never enter a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlausibilityConfig {
    /// Closer than this is a glitch (meters)
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,

    /// Further than this is beyond useful radar range (meters)
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,

    /// Optional: drop near-stationary returns with |v_rel| below this (m/s)
    #[serde(default)]
    pub min_abs_velocity: Option<f64>,
}

fn default_min_distance() -> f64 {
    0.75
}

fn default_max_distance() -> f64 {
    200.0
}

impl Default for PlausibilityConfig {
    fn default() -> Self {
        Self {
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            min_abs_velocity: None,
        }
    }
}

impl PlausibilityConfig {
    /// Check if a track passes the gate
    pub fn accepts(&self, track: &Track) -> bool {
        if track.d_rel < self.min_distance || track.d_rel > self.max_distance {
            return false;
        }
        match self.min_abs_velocity {
            Some(min) => track.v_rel.abs() >= min,
            None => true,
        }
    }
}

impl TrackerConfig {
    /// Create a configuration with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set lane boundary and maximum lateral offset
    pub fn with_lateral_thresholds(mut self, lane_boundary: f64, max_lateral: f64) -> Self {
        self.lane_boundary = lane_boundary;
        self.max_lateral = max_lateral;
        self
    }

    /// Builder method: set hold cycles
    pub fn with_hold_cycles(mut self, hold_cycles: u32) -> Self {
        self.hold_cycles = hold_cycles;
        self
    }

    /// Builder method: set distance scale factor
    pub fn with_distance_scale(mut self, scale: f64) -> Self {
        self.distance_scale = scale;
        self
    }

    /// Builder method: set largest representable raw distance
    pub fn with_distance_max_raw(mut self, max_raw: u16) -> Self {
        self.distance_max_raw = max_raw;
        self
    }

    /// Builder method: enable the plausibility gate
    pub fn with_plausibility(mut self, plausibility: PlausibilityConfig) -> Self {
        self.plausibility = Some(plausibility);
        self
    }

    /// Builder method: enable the ego speed gate
    pub fn with_min_ego_speed(mut self, speed: f64) -> Self {
        self.min_ego_speed = Some(speed);
        self
    }

    /// Check if a track passes the optional plausibility gate
    pub fn is_plausible(&self, track: &Track) -> bool {
        match &self.plausibility {
            Some(gate) => gate.accepts(track),
            None => true,
        }
    }

    /// Check if the ego speed gate suppresses a cycle
    ///
    /// A missing speed reading never suppresses.
    pub fn is_speed_gated(&self, ego_speed: Option<f64>) -> bool {
        match (self.min_ego_speed, ego_speed) {
            (Some(min), Some(speed)) => speed < min,
            _ => false,
        }
    }

    /// Reject configurations the tracker must not start with
    pub fn validate(&self) -> Result<()> {
        if !self.lane_boundary.is_finite() || self.lane_boundary < 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "lane_boundary must be a non-negative number, got {}",
                self.lane_boundary
            )));
        }
        if !self.max_lateral.is_finite() {
            return Err(TrackerError::InvalidConfig(format!(
                "max_lateral must be finite, got {}",
                self.max_lateral
            )));
        }
        if self.lane_boundary >= self.max_lateral {
            return Err(TrackerError::InvalidConfig(format!(
                "lane_boundary ({}) must be smaller than max_lateral ({})",
                self.lane_boundary, self.max_lateral
            )));
        }
        if !self.distance_scale.is_finite() || self.distance_scale <= 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "distance_scale must be positive, got {}",
                self.distance_scale
            )));
        }
        if !self.velocity_scale.is_finite() || self.velocity_scale <= 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "velocity_scale must be positive, got {}",
                self.velocity_scale
            )));
        }
        if let Some(gate) = &self.plausibility {
            if !(gate.min_distance.is_finite() && gate.max_distance.is_finite())
                || gate.min_distance > gate.max_distance
            {
                return Err(TrackerError::InvalidConfig(format!(
                    "plausibility range [{}, {}] is empty",
                    gate.min_distance, gate.max_distance
                )));
            }
            if let Some(min) = gate.min_abs_velocity {
                if !min.is_finite() || min < 0.0 {
                    return Err(TrackerError::InvalidConfig(format!(
                        "plausibility min_abs_velocity must be a non-negative number, got {}",
                        min
                    )));
                }
            }
        }
        if let Some(speed) = self.min_ego_speed {
            if !speed.is_finite() || speed < 0.0 {
                return Err(TrackerError::InvalidConfig(format!(
                    "min_ego_speed must be a non-negative number, got {}",
                    speed
                )));
            }
        }
        Ok(())
    }
}
