//! Per-lane lead state with dropout hysteresis
//!
//! One [`LaneLeadState`] exists per adjacent lane for the lifetime of the
//! tracker. It is updated exactly once per cycle with that cycle's candidate
//! (or `None`), and keeps reporting the last lead for up to `hold_cycles`
//! candidate-less cycles so a momentary radar dropout does not flicker the
//! display.
//!
//! Phases:
//! - `NoLead`: nothing reported, fields zeroed
//! - `Active`: a candidate was seen this cycle
//! - `Holding { remaining }`: no candidate this cycle, last lead still
//!   reported; `remaining` more empty cycles are tolerated before clearing

use crate::selector::LeadCandidate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lead state of one adjacent lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneLeadState {
    /// Distance of the reported lead (meters)
    pub d_rel: f64,
    /// Lateral offset of the reported lead (meters)
    pub y_rel: f64,
    /// Relative velocity of the reported lead (m/s)
    pub v_rel: f64,
    /// True while a lead is reported (active or holding)
    pub valid: bool,
    /// Empty cycles still tolerated before the lead clears
    pub hold_counter: u32,
    /// Id of the track that last supported the lead
    pub track_id: Option<u32>,
    /// True if the lead was refreshed by a candidate this cycle
    pub fresh: bool,
}

/// Observable phase of a lane state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadPhase {
    NoLead,
    Active,
    Holding { remaining: u32 },
}

impl fmt::Display for LeadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadPhase::NoLead => write!(f, "NoLead"),
            LeadPhase::Active => write!(f, "Active"),
            LeadPhase::Holding { remaining } => write!(f, "Holding({})", remaining),
        }
    }
}

impl Default for LaneLeadState {
    fn default() -> Self {
        Self::no_lead()
    }
}

impl LaneLeadState {
    /// Initial state: nothing reported
    pub fn no_lead() -> Self {
        Self {
            d_rel: 0.0,
            y_rel: 0.0,
            v_rel: 0.0,
            valid: false,
            hold_counter: 0,
            track_id: None,
            fresh: false,
        }
    }

    /// Current phase
    pub fn phase(&self) -> LeadPhase {
        if !self.valid {
            LeadPhase::NoLead
        } else if self.fresh {
            LeadPhase::Active
        } else {
            LeadPhase::Holding {
                remaining: self.hold_counter,
            }
        }
    }

    /// Advance one cycle
    ///
    /// Returns the phase entered. Must be called exactly once per cycle.
    pub fn update(&mut self, candidate: Option<&LeadCandidate>, hold_cycles: u32) -> LeadPhase {
        let previous = self.phase();

        match candidate {
            Some(lead) => {
                self.d_rel = lead.d_rel;
                self.y_rel = lead.y_rel;
                self.v_rel = lead.v_rel;
                self.track_id = Some(lead.id);
                self.valid = true;
                self.fresh = true;
                self.hold_counter = hold_cycles;
            }
            None if self.valid && self.hold_counter > 0 => {
                self.hold_counter -= 1;
                self.fresh = false;
            }
            None => self.reset(),
        }

        let current = self.phase();
        if std::mem::discriminant(&previous) != std::mem::discriminant(&current) {
            log::debug!("Lane lead {} -> {}", previous, current);
        }
        current
    }

    /// Force the lane back to `NoLead`
    pub fn reset(&mut self) {
        *self = Self::no_lead();
    }
}
