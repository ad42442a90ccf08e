//! Warm-starting of the state and input trajectories.

use horizon_ocp::interpolation::interpolate;
use horizon_ocp::{OperatingTrajectoryProvider, PrimalSolution, Vector};

/// Seed the state trajectory for the given time grid.
///
/// Index 0 is always the measured state. The remaining samples interpolate
/// the previous solution where the grids overlap; past its final time the
/// last stored state is carried forward. Without a previous solution the
/// measured state fills the whole trajectory.
pub fn initialize_state_trajectory(
    init_state: &Vector,
    time: &[f64],
    previous: &PrimalSolution,
) -> Vec<Vector> {
    let mut states: Vec<Vector> = if previous.is_empty() {
        vec![init_state.clone(); time.len()]
    } else {
        time.iter()
            .map(|&t| {
                interpolate(t, &previous.time_trajectory, &previous.state_trajectory)
            })
            .collect()
    };
    if let Some(first) = states.first_mut() {
        *first = init_state.clone();
    }
    states
}

/// Seed the input trajectory for the given time grid (one input per
/// interval, so one fewer than the number of time samples).
///
/// Samples inside the span of the previous solution interpolate its
/// inputs. Samples beyond it fall back to the operating-trajectory
/// provider, or to a zero input when no provider is configured.
pub fn initialize_input_trajectory(
    time: &[f64],
    states: &[Vector],
    previous: &PrimalSolution,
    operating_trajectory: Option<&dyn OperatingTrajectoryProvider>,
    n_input: usize,
) -> Vec<Vector> {
    let interpolate_till = if previous.is_empty() {
        time.first().copied().unwrap_or(0.0)
    } else {
        previous.final_time().unwrap_or(0.0)
    };

    let num_intervals = time.len().saturating_sub(1);
    (0..num_intervals)
        .map(|i| {
            let t = time[i];
            if t < interpolate_till {
                interpolate(t, &previous.time_trajectory, &previous.input_trajectory)
            } else if let Some(provider) = operating_trajectory {
                provider.operating_input(t, &states[i])
            } else {
                Vector::zeros(n_input)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use horizon_ocp::FixedOperatingPoint;

    fn v(x: f64) -> Vector {
        Vector::from_vec(vec![x])
    }

    fn previous_solution() -> PrimalSolution {
        PrimalSolution {
            time_trajectory: vec![0.0, 1.0, 2.0],
            state_trajectory: vec![v(0.0), v(10.0), v(20.0)],
            input_trajectory: vec![v(1.0), v(2.0), v(3.0)],
            ..Default::default()
        }
    }

    #[test]
    fn first_state_is_always_the_measured_one() {
        let time = [0.5, 1.0, 1.5];
        let states =
            initialize_state_trajectory(&v(-7.0), &time, &previous_solution());
        assert_relative_eq!(states[0][0], -7.0);
        assert_relative_eq!(states[1][0], 10.0);
        assert_relative_eq!(states[2][0], 15.0);
    }

    #[test]
    fn cold_start_repeats_measured_state() {
        let time = [0.0, 0.1, 0.2];
        let states =
            initialize_state_trajectory(&v(4.0), &time, &PrimalSolution::default());
        assert_eq!(states.len(), 3);
        for x in &states {
            assert_relative_eq!(x[0], 4.0);
        }
    }

    #[test]
    fn states_past_previous_horizon_hold_last_value() {
        let time = [1.5, 2.0, 2.5, 3.0];
        let states =
            initialize_state_trajectory(&v(0.0), &time, &previous_solution());
        assert_relative_eq!(states[2][0], 20.0);
        assert_relative_eq!(states[3][0], 20.0);
    }

    #[test]
    fn inputs_interpolate_then_fall_back_to_provider() {
        let time = [1.5, 2.0, 2.5, 3.0];
        let states = vec![v(0.0); 4];
        let provider = FixedOperatingPoint::new(v(9.0));
        let inputs = initialize_input_trajectory(
            &time,
            &states,
            &previous_solution(),
            Some(&provider),
            1,
        );
        assert_eq!(inputs.len(), 3);
        assert_relative_eq!(inputs[0][0], 2.5); // inside previous span
        assert_relative_eq!(inputs[1][0], 9.0); // at the boundary, provider
        assert_relative_eq!(inputs[2][0], 9.0);
    }

    #[test]
    fn inputs_default_to_zero_without_provider() {
        let time = [0.0, 0.1, 0.2];
        let states = vec![v(0.0); 3];
        let inputs = initialize_input_trajectory(
            &time,
            &states,
            &PrimalSolution::default(),
            None,
            2,
        );
        assert_eq!(inputs.len(), 2);
        for u in &inputs {
            assert_eq!(u.len(), 2);
            assert_relative_eq!(u.norm(), 0.0);
        }
    }
}
