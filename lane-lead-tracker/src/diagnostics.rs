//! Periodic diagnostics summary
//!
//! Reads [`CycleSnapshot`]s and, at most once per configured interval,
//! renders a text summary of the classification and the reported leads.
//! The reporter never touches tracker state; formatting failures are
//! dropped without affecting the caller.

use crate::lane_state::LaneLeadState;
use crate::tracker::CycleSnapshot;
use crate::types::{AdjacentLane, LaneBucket};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::time::{Duration, Instant};

/// Diagnostics reporter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Minimum wall-clock time between reports (milliseconds)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Append a per-track listing sorted by distance
    #[serde(default = "default_true")]
    pub list_tracks: bool,
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            list_tracks: true,
        }
    }
}

/// Interval-gated text reporter
pub struct DiagnosticsReporter {
    interval: Duration,
    list_tracks: bool,
    last_report: Option<Instant>,
}

impl DiagnosticsReporter {
    /// Create a reporter
    pub fn new(config: &DiagnosticsConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            list_tracks: config.list_tracks,
            last_report: None,
        }
    }

    /// Report if the interval has elapsed since the last report
    ///
    /// The first call always reports. The summary is logged at info level
    /// and returned.
    pub fn maybe_report(&mut self, now: Instant, snapshot: &CycleSnapshot) -> Option<String> {
        if let Some(last) = self.last_report {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_report = Some(now);

        let report = self.render(snapshot).ok()?;
        log::info!("{}", report);
        Some(report)
    }

    /// Render a summary regardless of the interval
    pub fn render(&self, snapshot: &CycleSnapshot) -> Result<String, fmt::Error> {
        let mut out = String::new();

        match snapshot.sequence {
            Some(sequence) => {
                let flag = if snapshot.stale {
                    " [stale]"
                } else if snapshot.speed_gated {
                    " [speed-gated]"
                } else {
                    ""
                };
                writeln!(
                    out,
                    "=== Radar Tracks (Total: {}) cycle {}{} ===",
                    snapshot.total, sequence, flag
                )?
            }
            None => writeln!(out, "=== Radar Tracks (Total: 0) no cycle yet ===")?,
        }
        writeln!(
            out,
            "Center lane: {} | Left lane: {} | Right lane: {} | Ignored: {}",
            snapshot.center_count, snapshot.left_count, snapshot.right_count, snapshot.ignored
        )?;

        for lane in [AdjacentLane::Left, AdjacentLane::Right] {
            write_lead(&mut out, lane, snapshot.lane(lane))?;
        }

        if self.list_tracks && !snapshot.tracks.is_empty() {
            let mut entries = snapshot.tracks.clone();
            entries.sort_by(|a, b| a.track.d_rel.total_cmp(&b.track.d_rel));

            for entry in &entries {
                let tag = match entry.lane {
                    Some(LaneBucket::Center) => "CENTER",
                    Some(LaneBucket::Left) => "LEFT  ",
                    Some(LaneBucket::Right) => "RIGHT ",
                    None => "IGNORE",
                };
                let marker = if snapshot.left_candidate == Some(entry.track.id) {
                    " <- LEFT LEAD"
                } else if snapshot.right_candidate == Some(entry.track.id) {
                    " <- RIGHT LEAD"
                } else {
                    ""
                };
                writeln!(
                    out,
                    "  [{}] Track {}: {:5.1}m ahead, {:+5.2}m lateral, {:+5.1}m/s{}",
                    tag,
                    entry.track.id,
                    entry.track.d_rel,
                    entry.track.y_rel,
                    entry.track.v_rel,
                    marker
                )?;
            }
        }

        Ok(out.trim_end().to_string())
    }
}

fn write_lead(out: &mut String, lane: AdjacentLane, state: &LaneLeadState) -> fmt::Result {
    let label = format!("{} lead:", lane);
    if state.valid {
        writeln!(
            out,
            "{:<11} {:5.1}m, {:+5.2}m lateral, {:+5.1}m/s ({})",
            label,
            state.d_rel,
            state.y_rel,
            state.v_rel,
            state.phase()
        )
    } else {
        writeln!(out, "{:<11} none", label)
    }
}
