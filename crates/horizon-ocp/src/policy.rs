//! Solution-side policy types: mode schedule, feedforward controller and
//! the primal solution returned by a solver run.

use serde::{Deserialize, Serialize};

use crate::interpolation::interpolate;
use crate::Vector;

/// Sequence of system modes separated by event times.
///
/// `mode_sequence` has one entry more than `event_times`: the mode active
/// before the first event, between consecutive events, and after the last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeSchedule {
    pub event_times: Vec<f64>,
    pub mode_sequence: Vec<usize>,
}

impl ModeSchedule {
    pub fn new(event_times: Vec<f64>, mode_sequence: Vec<usize>) -> Self {
        Self { event_times, mode_sequence }
    }

    /// Mode active at query time `t`.
    pub fn mode_at_time(&self, t: f64) -> usize {
        if self.mode_sequence.is_empty() {
            return 0;
        }
        let idx = self.event_times.partition_point(|&e| e <= t);
        self.mode_sequence[idx.min(self.mode_sequence.len() - 1)]
    }
}

/// Time-indexed open-loop input policy.
#[derive(Debug, Clone, Default)]
pub struct FeedforwardController {
    pub time_stamp: Vec<f64>,
    pub input_trajectory: Vec<Vector>,
}

impl FeedforwardController {
    pub fn new(time_stamp: Vec<f64>, input_trajectory: Vec<Vector>) -> Self {
        Self { time_stamp, input_trajectory }
    }

    pub fn is_empty(&self) -> bool {
        self.time_stamp.is_empty()
    }

    /// Interpolated input at query time `t`, or `None` for an empty policy.
    pub fn compute_input(&self, t: f64) -> Option<Vector> {
        if self.is_empty() {
            return None;
        }
        Some(interpolate(t, &self.time_stamp, &self.input_trajectory))
    }

    /// Append another partial controller. Empty partials are skipped so
    /// that concatenating over unused partitions is a no-op.
    pub fn concatenate(&mut self, other: &FeedforwardController) {
        if other.is_empty() {
            return;
        }
        self.time_stamp.extend_from_slice(&other.time_stamp);
        self.input_trajectory.extend_from_slice(&other.input_trajectory);
    }
}

/// Primal solution of one solver run.
#[derive(Debug, Clone, Default)]
pub struct PrimalSolution {
    pub time_trajectory: Vec<f64>,
    pub state_trajectory: Vec<Vector>,
    pub input_trajectory: Vec<Vector>,
    pub mode_schedule: ModeSchedule,
    pub controller: FeedforwardController,
}

impl PrimalSolution {
    pub fn is_empty(&self) -> bool {
        self.time_trajectory.is_empty()
    }

    /// Final time covered by this solution, if any.
    pub fn final_time(&self) -> Option<f64> {
        self.time_trajectory.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn v(x: f64) -> Vector {
        Vector::from_vec(vec![x])
    }

    #[test]
    fn concatenate_skips_empty_partials() {
        let mut full = FeedforwardController::new(vec![0.0, 1.0], vec![v(1.0), v(2.0)]);
        let empty = FeedforwardController::default();
        let tail = FeedforwardController::new(vec![2.0], vec![v(3.0)]);

        full.concatenate(&empty);
        full.concatenate(&tail);

        assert_eq!(full.time_stamp, vec![0.0, 1.0, 2.0]);
        assert_eq!(full.input_trajectory.len(), 3);
    }

    #[test]
    fn concatenated_controller_matches_sources_on_their_intervals() {
        let mut full = FeedforwardController::new(vec![0.0, 1.0], vec![v(0.0), v(2.0)]);
        let tail = FeedforwardController::new(vec![1.5, 2.0], vec![v(3.0), v(4.0)]);
        let tail_copy = tail.clone();
        full.concatenate(&tail);

        let got = full.compute_input(1.75).expect("non-empty");
        let want = tail_copy.compute_input(1.75).expect("non-empty");
        assert_relative_eq!(got[0], want[0]);

        assert_relative_eq!(full.compute_input(0.5).expect("non-empty")[0], 1.0);
    }

    #[test]
    fn empty_controller_yields_no_input() {
        let ctrl = FeedforwardController::default();
        assert!(ctrl.compute_input(0.0).is_none());
    }

    #[test]
    fn mode_lookup_respects_event_times() {
        let schedule = ModeSchedule::new(vec![1.0, 2.0], vec![0, 3, 7]);
        assert_eq!(schedule.mode_at_time(0.5), 0);
        assert_eq!(schedule.mode_at_time(1.5), 3);
        assert_eq!(schedule.mode_at_time(2.5), 7);
    }
}
