//! Output signal encoding
//!
//! Maps a lane's lead state onto the fields the display message carries.
//! The distance field is described by a [`SignalSpec`] in the same terms a
//! bus database uses (`physical = offset + factor * raw`), and encoding is
//! the inverse conversion with clipping to the field's raw range. Velocity
//! is carried as a scaled float and has no raw range to clip against.
//!
//! The lateral field is a fixed protocol constant. The target message set
//! has no finer-grained lateral encoding, so `y_rel` is never transmitted.

use crate::config::TrackerConfig;
use crate::lane_state::LaneLeadState;
use crate::types::{AdjacentLane, OutputSignal};

/// Definition of one output field
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSpec {
    /// Signal name on the bus
    pub name: String,
    /// Scale factor to convert raw value to physical value
    pub factor: f64,
    /// Offset to add after scaling
    pub offset: f64,
    /// Smallest raw value the field can carry
    pub raw_min: i64,
    /// Largest raw value the field can carry
    pub raw_max: i64,
    /// Engineering unit
    pub unit: Option<String>,
}

/// Result of a physical-to-raw conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawValue {
    pub raw: i64,
    /// True if the value had to be clipped into the raw range
    pub clipped: bool,
}

impl SignalSpec {
    /// Convert a physical value to the raw field value
    ///
    /// Rounds to the nearest raw step and clips into `[raw_min, raw_max]`.
    /// A non-finite input encodes as `raw_min` and counts as clipped.
    pub fn to_raw(&self, physical: f64) -> RawValue {
        let scaled = ((physical - self.offset) / self.factor).round();
        if !scaled.is_finite() {
            return RawValue {
                raw: self.raw_min,
                clipped: true,
            };
        }

        if scaled > self.raw_max as f64 {
            RawValue {
                raw: self.raw_max,
                clipped: true,
            }
        } else if scaled < self.raw_min as f64 {
            RawValue {
                raw: self.raw_min,
                clipped: true,
            }
        } else {
            RawValue {
                raw: scaled as i64,
                clipped: false,
            }
        }
    }
}

/// Encoder for one adjacent lane's signal set
#[derive(Debug, Clone)]
pub struct SignalEncoder {
    lane: AdjacentLane,
    distance: SignalSpec,
    lateral_name: String,
    lateral_constant: u8,
    velocity_name: String,
    velocity_scale: f64,
}

impl SignalEncoder {
    /// Build the encoder for a lane from a validated configuration
    pub fn new(lane: AdjacentLane, config: &TrackerConfig) -> Self {
        let prefix = format!("LEAD_{}", lane);
        Self {
            lane,
            distance: SignalSpec {
                name: format!("{}_DISTANCE", prefix),
                factor: 1.0 / config.distance_scale,
                offset: 0.0,
                raw_min: 0,
                raw_max: i64::from(config.distance_max_raw),
                unit: Some("m".to_string()),
            },
            lateral_name: format!("{}_LATERAL", prefix),
            lateral_constant: config.lateral_constant,
            velocity_name: format!("{}_VELOCITY", prefix),
            velocity_scale: config.velocity_scale,
        }
    }

    /// Lane this encoder serves
    pub fn lane(&self) -> AdjacentLane {
        self.lane
    }

    /// Distance field definition
    pub fn distance_spec(&self) -> &SignalSpec {
        &self.distance
    }

    /// Names of the emitted signals (distance, lateral, velocity)
    pub fn signal_names(&self) -> [&str; 3] {
        [&self.distance.name, &self.lateral_name, &self.velocity_name]
    }

    /// Encode a lane state into its output fields
    pub fn encode(&self, state: &LaneLeadState) -> OutputSignal {
        self.encode_checked(state).0
    }

    /// Encode and report whether the distance field overflowed
    pub fn encode_checked(&self, state: &LaneLeadState) -> (OutputSignal, bool) {
        if !state.valid {
            return (OutputSignal::absent(self.lateral_constant), false);
        }

        let distance = self.distance.to_raw(state.d_rel);
        let signal = OutputSignal {
            present: true,
            distance: u16::try_from(distance.raw).unwrap_or(u16::MAX),
            lateral: self.lateral_constant,
            velocity: state.v_rel * self.velocity_scale,
        };
        (signal, distance.clipped)
    }
}
