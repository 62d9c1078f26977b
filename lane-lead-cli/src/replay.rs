//! Cycle replay
//!
//! Plays recorded cycles (one JSON object per line) through the tracker the
//! way the host loop would: one cycle per period, output written as soon as
//! the cycle completes, diagnostics sampled on their own interval.
//!
//! Input lines are either a cycle:
//! `{"sequence": 1, "tracks": [{"id": 1, "d_rel": 4.5, "y_rel": -2.25, "v_rel": 0.0}]}`
//! or a session reset: `{"reset": true}`.

use chrono::{DateTime, Utc};
use lane_lead_tracker::{CycleInput, DiagnosticsReporter, LeadTracker, TrackerError};
use serde::Deserialize;
use std::io::{BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

/// A single replay line
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReplayRecord {
    Cycle(CycleInput),
    Reset { reset: bool },
}

/// Errors raised while reading replay input
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("line {line}: malformed record: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {source}")]
    Rejected {
        line: usize,
        #[source]
        source: TrackerError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Replay pacing options
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Cycle period; `None` replays as fast as possible
    pub period: Option<Duration>,
    /// Stop after this many processed cycles
    pub max_cycles: Option<usize>,
}

/// Counters collected during a replay
#[derive(Debug, Clone)]
pub struct ReplayStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cycles: usize,
    pub malformed_lines: usize,
    pub rejected_cycles: usize,
    pub overrun_cycles: usize,
    pub resets: usize,
    pub left_present: usize,
    pub right_present: usize,
    pub reports: usize,
}

impl ReplayStats {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            cycles: 0,
            malformed_lines: 0,
            rejected_cycles: 0,
            overrun_cycles: 0,
            resets: 0,
            left_present: 0,
            right_present: 0,
            reports: 0,
        }
    }
}

/// Parse one replay line; blank lines and `#` comments yield `None`
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<ReplayRecord>, ReplayError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| ReplayError::Malformed {
            line: line_no,
            source,
        })
}

/// Replay every record from `reader`, writing one JSON output line per cycle
///
/// Malformed lines are logged and skipped. A rejected cycle leaves the
/// tracker untouched and repeats the current output. With a period set, a
/// cycle whose slot has already passed is dropped and shows up to the
/// tracker as a missed sequence. Only IO failures stop the replay.
pub fn run_replay<R, W>(
    reader: R,
    mut writer: W,
    tracker: &mut LeadTracker,
    reporter: &mut DiagnosticsReporter,
    options: &ReplayOptions,
) -> Result<ReplayStats, ReplayError>
where
    R: BufRead,
    W: Write,
{
    let mut stats = ReplayStats::new();
    let mut next_tick: Option<Instant> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;

        let record = match parse_line(&line, line_no) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("{}", e);
                stats.malformed_lines += 1;
                continue;
            }
        };

        let input = match record {
            ReplayRecord::Reset { reset } => {
                if reset {
                    tracker.reset();
                    stats.resets += 1;
                }
                continue;
            }
            ReplayRecord::Cycle(input) => input,
        };

        if let Some(max) = options.max_cycles {
            if stats.cycles >= max {
                log::info!("Reached cycle limit ({})", max);
                break;
            }
        }

        if let Some(period) = options.period {
            let now = Instant::now();
            let tick = next_tick.unwrap_or(now);
            next_tick = Some(tick + period);

            if now < tick {
                thread::sleep(tick - now);
            } else if now >= tick + period {
                log::debug!("Dropping cycle {}: its slot has already passed", input.sequence);
                stats.overrun_cycles += 1;
                continue;
            }
        }

        let output = match tracker.process_cycle(&input) {
            Ok(output) => {
                stats.cycles += 1;
                if output.left.present {
                    stats.left_present += 1;
                }
                if output.right.present {
                    stats.right_present += 1;
                }
                output
            }
            Err(source) => {
                log::warn!("{}", ReplayError::Rejected { line: line_no, source });
                stats.rejected_cycles += 1;
                tracker.current_output()
            }
        };

        serde_json::to_writer(&mut writer, &output)?;
        writeln!(writer)?;

        if reporter.maybe_report(Instant::now(), tracker.snapshot()).is_some() {
            stats.reports += 1;
        }
    }

    writer.flush()?;
    stats.finished_at = Utc::now();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_lead_tracker::{CycleOutput, DiagnosticsConfig, TrackerConfig};
    use std::io;

    /// Writer that stalls on every completed line
    struct SlowWriter {
        buf: Vec<u8>,
        delay: Duration,
    }

    impl Write for SlowWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            if data.contains(&b'\n') {
                thread::sleep(self.delay);
            }
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn parse_outputs(out: &[u8]) -> Vec<CycleOutput> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    const INPUT: &str = r#"
# Scenario B: left lead drops out for three cycles
{"sequence": 1, "tracks": [{"id": 1, "d_rel": 4.5, "y_rel": -2.25, "v_rel": -1.0}, {"id": 2, "d_rel": 18.7, "y_rel": 3.2, "v_rel": 0.5}]}
{"sequence": 2, "tracks": [{"id": 2, "d_rel": 18.7, "y_rel": 3.2, "v_rel": 0.5}]}
{"sequence": 3, "tracks": [{"id": 2, "d_rel": 18.7, "y_rel": 3.2, "v_rel": 0.5}]}
not json at all
{"sequence": 4, "tracks": [{"id": 2, "d_rel": 18.7, "y_rel": 3.2, "v_rel": 0.5}]}
{"sequence": 4, "tracks": []}
{"sequence": 5, "tracks": [{"id": 2, "d_rel": 18.7, "y_rel": 3.2, "v_rel": 0.5}]}
"#;

    fn run(input: &str, options: &ReplayOptions) -> (ReplayStats, Vec<CycleOutput>) {
        let mut tracker = LeadTracker::new(TrackerConfig::new().with_hold_cycles(3)).unwrap();
        let mut reporter = DiagnosticsReporter::new(&DiagnosticsConfig::default());
        let mut out = Vec::new();

        let stats =
            run_replay(input.as_bytes(), &mut out, &mut tracker, &mut reporter, options).unwrap();
        (stats, parse_outputs(&out))
    }

    #[test]
    fn test_replay_scenario() {
        let (stats, outputs) = run(INPUT, &ReplayOptions::default());

        assert_eq!(stats.cycles, 5);
        assert_eq!(stats.malformed_lines, 1);
        assert_eq!(stats.rejected_cycles, 1);
        assert_eq!(stats.reports, 1); // First cycle only; replay is faster than the interval

        // The repeated sequence 4 still gets an output line
        assert_eq!(outputs.len(), 6);
        let left: Vec<bool> = outputs.iter().map(|o| o.left.present).collect();
        assert_eq!(left, vec![true, true, true, true, true, false]);
        assert!(outputs.iter().all(|o| o.right.present));
        assert_eq!(outputs[3].left.distance, 45);
        assert_eq!(stats.left_present, 4);
    }

    #[test]
    fn test_rejected_cycle_repeats_current_output() {
        let input = r#"
{"sequence": 1, "tracks": [{"id": 1, "d_rel": 4.5, "y_rel": -2.25, "v_rel": 0.0}]}
{"sequence": 1, "tracks": []}
{"sequence": 2, "tracks": [{"id": 1, "d_rel": 5.0, "y_rel": -2.25, "v_rel": 0.0}]}
"#;
        let (stats, outputs) = run(input, &ReplayOptions::default());

        assert_eq!(stats.cycles, 2);
        assert_eq!(stats.rejected_cycles, 1);
        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[1], outputs[0]);
        assert_eq!(outputs[2].sequence, 2);
        assert_eq!(outputs[2].left.distance, 50);
    }

    #[test]
    fn test_overrun_drops_late_cycles() {
        let input: String = (1..=6)
            .map(|seq| {
                format!(
                    "{{\"sequence\": {}, \"tracks\": [{{\"id\": 1, \"d_rel\": 4.5, \"y_rel\": -2.25, \"v_rel\": 0.0}}]}}\n",
                    seq
                )
            })
            .collect();
        let options = ReplayOptions {
            period: Some(Duration::from_millis(10)),
            max_cycles: None,
        };

        let mut tracker = LeadTracker::new(TrackerConfig::new().with_hold_cycles(3)).unwrap();
        let mut reporter = DiagnosticsReporter::new(&DiagnosticsConfig::default());
        let mut writer = SlowWriter {
            buf: Vec::new(),
            delay: Duration::from_millis(50),
        };

        let stats = run_replay(
            input.as_bytes(),
            &mut writer,
            &mut tracker,
            &mut reporter,
            &options,
        )
        .unwrap();
        let outputs = parse_outputs(&writer.buf);

        // Cycles 2-5 fall inside the first cycle's stalled write
        assert!(stats.overrun_cycles >= 4);
        assert_eq!(stats.cycles + stats.overrun_cycles, 6);
        assert_eq!(outputs.len(), stats.cycles);
        assert_eq!(outputs[0].sequence, 1);
        assert!(outputs.iter().all(|o| o.sequence == 1 || o.sequence == 6));
    }

    #[test]
    fn test_reset_record() {
        let input = r#"
{"sequence": 1, "tracks": [{"id": 1, "d_rel": 4.5, "y_rel": -2.25, "v_rel": 0.0}]}
{"reset": true}
{"sequence": 2, "tracks": []}
"#;
        let (stats, outputs) = run(input, &ReplayOptions::default());
        assert_eq!(stats.resets, 1);
        assert!(outputs[0].left.present);
        assert!(!outputs[1].left.present);
    }

    #[test]
    fn test_max_cycles() {
        let options = ReplayOptions {
            max_cycles: Some(2),
            ..ReplayOptions::default()
        };
        let (stats, outputs) = run(INPUT, &options);
        assert_eq!(stats.cycles, 2);
        assert_eq!(outputs.len(), 2);
    }

    #[test]
    fn test_parse_line() {
        assert!(parse_line("", 1).unwrap().is_none());
        assert!(parse_line("  # comment", 2).unwrap().is_none());
        assert!(matches!(
            parse_line(r#"{"reset": true}"#, 3).unwrap(),
            Some(ReplayRecord::Reset { reset: true })
        ));
        assert!(matches!(
            parse_line(r#"{"sequence": 9, "input_valid": false}"#, 4).unwrap(),
            Some(ReplayRecord::Cycle(CycleInput { sequence: 9, input_valid: false, .. }))
        ));
        assert!(matches!(
            parse_line("{", 5),
            Err(ReplayError::Malformed { line: 5, .. })
        ));
    }
}
