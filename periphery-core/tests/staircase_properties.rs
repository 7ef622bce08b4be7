use periphery_core::staircase::RESPONSE_LIMIT;
use periphery_core::{Direction, StaircaseState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAX_ANGLES: [f64; 4] = [61.0, 42.0, 61.0, 42.0];

/// Runs a staircase to completion with answers from `answer` and returns
/// every state it passed through.
fn drive(max_angle: f64, mut answer: impl FnMut(&StaircaseState) -> bool) -> Vec<StaircaseState> {
    let mut state = StaircaseState::new();
    let mut trace = Vec::new();
    while !state.completed {
        state = state.advance(answer(&state), max_angle);
        trace.push(state);
        assert!(trace.len() <= 100, "staircase failed to terminate");
    }
    trace
}

#[test]
fn random_answers_terminate_within_response_limit() {
    let mut rng = StdRng::seed_from_u64(2019);
    for max_angle in MAX_ANGLES {
        for _ in 0..2_000 {
            let p_correct: f64 = rng.random_range(0.0..=1.0);
            let trace = drive(max_angle, |_| rng.random_bool(p_correct));
            assert!(trace.len() <= RESPONSE_LIMIT as usize);
            assert!(trace.iter().all(|s| s.angle >= 0.0));
        }
    }
}

#[test]
fn every_short_answer_pattern_terminates() {
    // All 2^12 patterns, cycled until completion.
    for pattern in 0u32..(1 << 12) {
        let mut i = 0;
        let trace = drive(42.0, |_| {
            let bit = (pattern >> (i % 12)) & 1 == 1;
            i += 1;
            bit
        });
        assert!(trace.len() <= RESPONSE_LIMIT as usize);
        assert!(trace.iter().all(|s| s.angle >= 0.0));
        let last = trace.last().unwrap();
        assert!(last.num_reversals >= 3 || last.responses >= RESPONSE_LIMIT || last.angle > 42.0);
    }
}

#[test]
fn perfect_observer_runs_off_the_screen_edge() {
    for direction in Direction::ALL {
        let max_angle = MAX_ANGLES[direction.index()];
        let trace = drive(max_angle, |_| true);
        let last = trace.last().unwrap();
        assert!(last.angle > max_angle);
        assert!(last.angle <= max_angle + 5.0);
        assert_eq!(last.num_reversals, 0);
    }
}

#[test]
fn threshold_observer_settles_near_threshold() {
    // Sees everything inside 20 degrees and nothing beyond it.
    let trace = drive(61.0, |s| s.angle < 20.0);
    let last = trace.last().unwrap();
    assert!(last.completed);
    assert!(last.responses < RESPONSE_LIMIT);
    assert!((18.0..=22.0).contains(&last.angle), "settled at {}", last.angle);
}
