//! Horizon time grid with mode-switch events.

use crate::error::SolverError;

/// Build the discretization of `[init_time, final_time]` with nominal step
/// `dt`, inserting a sample just after every interior event time.
///
/// Advancing by `dt` from the last sample, a candidate that would step on
/// or over the next event is replaced by `event + event_delta`, so the
/// interval left of the event ends at the switch and integration restarts
/// on the far side. A candidate beyond `final_time` is clamped to it, with
/// no delta applied. Events outside the open window are ignored.
///
/// `event_times` must be sorted ascending.
pub fn time_discretization_with_events(
    init_time: f64,
    final_time: f64,
    dt: f64,
    event_times: &[f64],
    event_delta: f64,
) -> Result<Vec<f64>, SolverError> {
    if dt <= 0.0 {
        return Err(SolverError::InvalidTimeStep(dt));
    }
    if final_time <= init_time {
        return Err(SolverError::InvalidTimeWindow { init_time, final_time });
    }

    let mut events = event_times
        .iter()
        .copied()
        .filter(|&e| e > init_time && e + event_delta < final_time)
        .peekable();

    let mut grid = vec![init_time];
    loop {
        let candidate = grid.last().copied().unwrap_or(init_time) + dt;
        match events.peek().copied() {
            Some(event) if candidate >= event => {
                grid.push(event + event_delta);
                events.next();
            }
            _ => {
                if candidate >= final_time {
                    grid.push(final_time);
                    break;
                }
                grid.push(candidate);
            }
        }
    }
    Ok(grid)
}
