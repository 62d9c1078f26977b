// End-to-end cycle scenarios through the public API
use lane_lead_tracker::{
    classify, select, AdjacentLane, CycleInput, LeadTracker, Track, TrackerConfig,
};

const LANE_BOUNDARY: f64 = 1.8;
const MAX_LATERAL: f64 = 5.5;

fn tracker(hold_cycles: u32) -> LeadTracker {
    let config = TrackerConfig::new()
        .with_lateral_thresholds(LANE_BOUNDARY, MAX_LATERAL)
        .with_hold_cycles(hold_cycles)
        .with_distance_scale(10.0);
    LeadTracker::new(config).unwrap()
}

fn scenario_tracks() -> Vec<Track> {
    vec![
        Track::new(1, 4.5, -2.25, -1.0),
        Track::new(2, 18.7, 3.2, 0.5),
    ]
}

#[test]
fn scenario_a_leads_per_lane() {
    let mut tracker = tracker(3);
    let output = tracker
        .process_cycle(&CycleInput::new(1, scenario_tracks()))
        .unwrap();

    let left = tracker.lane_state(AdjacentLane::Left);
    assert_eq!(left.track_id, Some(1));
    assert_eq!(left.d_rel, 4.5);
    let right = tracker.lane_state(AdjacentLane::Right);
    assert_eq!(right.track_id, Some(2));
    assert_eq!(right.d_rel, 18.7);

    assert!(output.left.present);
    assert_eq!(output.left.distance, 45);
    assert!(output.right.present);
    assert_eq!(output.right.distance, 187);
}

#[test]
fn scenario_b_left_lead_held_through_dropout() {
    let mut tracker = tracker(3);
    let first = tracker
        .process_cycle(&CycleInput::new(1, scenario_tracks()))
        .unwrap();

    // Track 1 absent for cycles 2-4
    let right_only = vec![Track::new(2, 18.7, 3.2, 0.5)];
    for sequence in 2..=4 {
        let output = tracker
            .process_cycle(&CycleInput::new(sequence, right_only.clone()))
            .unwrap();
        assert_eq!(output.left, first.left, "cycle {}", sequence);

        let left = tracker.lane_state(AdjacentLane::Left);
        assert!(left.valid);
        assert_eq!(left.d_rel, 4.5);
        assert_eq!(left.y_rel, -2.25);
        assert_eq!(left.v_rel, -1.0);
    }

    let output = tracker
        .process_cycle(&CycleInput::new(5, right_only))
        .unwrap();
    assert!(!output.left.present);
    assert!(!tracker.lane_state(AdjacentLane::Left).valid);
    assert!(output.right.present);
}

#[test]
fn scenario_c_far_lateral_track_never_bucketed() {
    let mut tracker = tracker(3);
    for (sequence, d_rel) in [1.0, 4.5, 20.0, 80.0, 150.0].into_iter().enumerate() {
        let tracks = vec![Track::new(7, d_rel, 6.0, 0.0)];

        let buckets = classify(&tracks, LANE_BOUNDARY, MAX_LATERAL);
        assert!(buckets.center.is_empty());
        assert!(buckets.left.is_empty());
        assert!(buckets.right.is_empty());

        let output = tracker
            .process_cycle(&CycleInput::new(sequence as u64 + 1, tracks))
            .unwrap();
        assert!(!output.right.present);
    }
}

#[test]
fn classify_and_select_are_idempotent() {
    let tracks = vec![
        Track::new(5, 20.0, -2.5, 0.0),
        Track::new(3, 20.0, -3.0, 0.0),
        Track::new(8, 35.0, 4.2, -2.0),
        Track::new(2, 10.0, 0.3, -1.5),
    ];
    let before = tracks.clone();

    let first = classify(&tracks, LANE_BOUNDARY, MAX_LATERAL);
    let second = classify(&tracks, LANE_BOUNDARY, MAX_LATERAL);
    assert_eq!(first, second);
    assert_eq!(select(&first.left), select(&second.left));
    assert_eq!(select(&first.left).map(|t| t.id), Some(3));
    assert_eq!(select(&first.right).map(|t| t.id), Some(8));
    assert_eq!(tracks, before);
}

#[test]
fn lead_switches_to_nearer_vehicle() {
    let mut tracker = tracker(3);
    tracker
        .process_cycle(&CycleInput::new(1, vec![Track::new(4, 30.0, -3.2, -2.5)]))
        .unwrap();

    let tracks = vec![
        Track::new(4, 29.0, -3.2, -2.5),
        Track::new(3, 15.0, -2.5, -3.0),
    ];
    let output = tracker.process_cycle(&CycleInput::new(2, tracks)).unwrap();
    assert_eq!(output.left.distance, 150);
    assert_eq!(tracker.lane_state(AdjacentLane::Left).track_id, Some(3));
}

#[test]
fn every_cycle_yields_output_pair() {
    let mut tracker = tracker(1);
    let cycles = vec![
        CycleInput::new(1, vec![Track::new(1, f64::NAN, -2.0, 0.0)]),
        CycleInput::stale(2),
        CycleInput::new(3, vec![Track::new(1, 10.0, -2.0, 0.0).invalid()]),
        CycleInput::new(4, vec![Track::new(1, 9999.0, -2.0, 0.0)]),
    ];

    for input in &cycles {
        let output = tracker.process_cycle(input).unwrap();
        assert_eq!(output.sequence, input.sequence);
        assert_eq!(output.left.lateral, 80);
        assert_eq!(output.right.lateral, 80);
    }

    // Last cycle overflowed the distance field and was clipped
    assert_eq!(tracker.current_output().left.distance, 4095);
}
