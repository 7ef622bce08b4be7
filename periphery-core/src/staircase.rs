/// Outward step while no reversal is pending.
pub const COARSE_STEP_DEG: f64 = 5.0;
/// Outward step once at least one reversal is pending.
pub const FINE_STEP_DEG: f64 = 1.0;
/// Inward step after a miss.
pub const INWARD_STEP_DEG: f64 = 1.0;
pub const REVERSAL_LIMIT: u32 = 3;
pub const RESPONSE_LIMIT: u32 = 25;

/// State of one adaptive run, i.e. one size × direction condition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StaircaseState {
    /// Current eccentricity in degrees.
    pub angle: f64,
    pub num_reversals: u32,
    pub responses: u32,
    pub last_response: bool,
    pub completed: bool,
}

impl StaircaseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one trial outcome into the staircase and returns the next state.
    ///
    /// A correct answer moves the target outward, by the coarse step until a
    /// reversal has been counted and by the fine step afterwards. A miss moves
    /// it inward and counts a reversal, except at fixation where nothing moves.
    /// The pending reversal count is dropped whenever an answer repeats the
    /// previous one; that check runs before the step is applied.
    ///
    /// The run completes after `REVERSAL_LIMIT` reversals, `RESPONSE_LIMIT`
    /// responses, or once the angle passes `max_angle`.
    pub fn advance(self, correct: bool, max_angle: f64) -> Self {
        let mut next = self;
        next.responses += 1;

        if next.num_reversals > 0 && next.last_response == correct {
            next.num_reversals = 0;
        }

        if correct {
            next.angle += if next.num_reversals == 0 {
                COARSE_STEP_DEG
            } else {
                FINE_STEP_DEG
            };
        } else if next.angle > 0.0 {
            next.angle = (next.angle - INWARD_STEP_DEG).max(0.0);
            next.num_reversals += 1;
        }

        next.last_response = correct;

        if next.num_reversals >= REVERSAL_LIMIT
            || next.responses >= RESPONSE_LIMIT
            || next.angle > max_angle
        {
            next.completed = true;
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(outcomes: &[bool], max_angle: f64) -> Vec<StaircaseState> {
        let mut state = StaircaseState::new();
        let mut trace = Vec::new();
        for &correct in outcomes {
            state = state.advance(correct, max_angle);
            trace.push(state);
        }
        trace
    }

    #[test]
    fn all_correct_walks_out_in_coarse_steps() {
        let trace = run(&[true, true, true], 10.0);
        let angles: Vec<f64> = trace.iter().map(|s| s.angle).collect();
        assert_eq!(angles, vec![5.0, 10.0, 15.0]);
        assert!(!trace[1].completed, "10 is not past the limit of 10");
        assert!(trace[2].completed);
        assert_eq!(trace[2].responses, 3);
    }

    #[test]
    fn fine_step_after_pending_reversal() {
        let state = StaircaseState {
            angle: 5.0,
            num_reversals: 1,
            responses: 10,
            last_response: false,
            completed: false,
        };
        let next = state.advance(true, 60.0);
        assert_eq!(next.angle, 6.0);
        assert_eq!(next.responses, 11);
        assert_eq!(next.num_reversals, 1);
        assert!(next.last_response);
        assert!(!next.completed);
    }

    #[test]
    fn miss_at_fixation_holds_angle_and_reversals() {
        let next = StaircaseState::new().advance(false, 61.0);
        assert_eq!(next.angle, 0.0);
        assert_eq!(next.num_reversals, 0);
        assert_eq!(next.responses, 1);
        assert!(!next.last_response);
    }

    #[test]
    fn repeated_answer_drops_pending_reversals_before_stepping() {
        let state = StaircaseState {
            angle: 10.0,
            num_reversals: 2,
            responses: 4,
            last_response: true,
            completed: false,
        };
        // Same answer as last time: reversals reset, so the coarse step applies.
        let next = state.advance(true, 61.0);
        assert_eq!(next.num_reversals, 0);
        assert_eq!(next.angle, 15.0);
    }

    #[test]
    fn consecutive_misses_hold_reversals_at_one() {
        let state = StaircaseState {
            angle: 5.0,
            num_reversals: 0,
            responses: 1,
            last_response: true,
            completed: false,
        };
        let a = state.advance(false, 61.0);
        let b = a.advance(false, 61.0);
        let c = b.advance(false, 61.0);
        assert_eq!((a.angle, a.num_reversals), (4.0, 1));
        assert_eq!((b.angle, b.num_reversals), (3.0, 1));
        assert_eq!((c.angle, c.num_reversals), (2.0, 1));
        assert!(!c.completed);
    }

    #[test]
    fn alternating_answers_reach_the_reversal_limit() {
        let trace = run(&[true, false, true, false, true, false], 61.0);
        let reversals: Vec<u32> = trace.iter().map(|s| s.num_reversals).collect();
        assert_eq!(reversals, vec![0, 1, 1, 2, 2, 3]);
        assert!(trace[..5].iter().all(|s| !s.completed));
        assert!(trace[5].completed);
        assert_eq!(trace[5].angle, 4.0);
    }

    #[test]
    fn response_limit_completes_a_stalled_run() {
        let trace = run(&[false; 25], 61.0);
        assert!(trace[..24].iter().all(|s| !s.completed));
        assert!(trace[24].completed);
        assert_eq!(trace[24].angle, 0.0);
    }
}
