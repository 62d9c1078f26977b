//! Lane Lead Tracker Library
//!
//! Classifies forward radar tracks into ego/left/right lanes, selects the
//! nearest vehicle in each adjacent lane as that lane's lead, keeps the
//! selection stable across short radar dropouts, and encodes the result into
//! the signal set a cluster display message carries.
//!
//! # Architecture
//!
//! Each cycle runs synchronously through:
//! - [`classifier`]: lateral-offset bucketing (CENTER/LEFT/RIGHT)
//! - [`selector`]: nearest track per adjacent lane
//! - [`lane_state`]: per-lane hold/hysteresis state machine
//! - [`encoder`]: scaled, clipped output fields
//!
//! [`LeadTracker`] owns the lane states and drives the pipeline.
//! [`DiagnosticsReporter`] reads snapshots on its own cadence.
//!
//! The library does NOT:
//! - Talk to radar hardware or parse radar frames
//! - Place signals on a bus
//! - Schedule cycles
//!
//! # Example Usage
//!
//! ```
//! use lane_lead_tracker::{CycleInput, LeadTracker, Track, TrackerConfig};
//!
//! let config = TrackerConfig::new()
//!     .with_lateral_thresholds(1.8, 5.5)
//!     .with_hold_cycles(3);
//! let mut tracker = LeadTracker::new(config).unwrap();
//!
//! let tracks = vec![
//!     Track::new(1, 4.5, -2.25, -1.0),
//!     Track::new(2, 18.7, 3.2, 0.5),
//! ];
//! let output = tracker.process_cycle(&CycleInput::new(1, tracks)).unwrap();
//!
//! assert_eq!(output.left.distance, 45);
//! assert_eq!(output.right.distance, 187);
//! ```

// Public modules
pub mod classifier;
pub mod config;
pub mod diagnostics;
pub mod encoder;
pub mod lane_state;
pub mod selector;
pub mod tracker;
pub mod types;

// Re-export main types for convenience
pub use classifier::{classify, LaneBuckets};
pub use config::{PlausibilityConfig, TrackerConfig};
pub use diagnostics::{DiagnosticsConfig, DiagnosticsReporter};
pub use encoder::{SignalEncoder, SignalSpec};
pub use lane_state::{LaneLeadState, LeadPhase};
pub use selector::{select, LeadCandidate};
pub use tracker::{CycleSnapshot, LeadTracker, TrackEntry};
pub use types::{
    AdjacentLane, CycleInput, CycleOutput, LaneBucket, OutputSignal, Result, Track,
    TrackerError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
