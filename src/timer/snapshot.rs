//! Point-in-time view of a timer
//!
//! Snapshots are recomputed from the persisted record and the wall clock
//! on every read. Nothing here is cached, so any number of readers see
//! the same answer for the same instant and a restarted server picks up
//! exactly where the clock should be.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TimerState, TimerStatus};
use crate::schedule::{Level, SchemaError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: TimerStatus,
    pub current_level_index: usize,
    pub current: Level,
    pub next: Option<Level>,
    pub remaining_seconds: i64,
    pub elapsed_seconds: i64,
    pub level_count: usize,
}

/// Derive the snapshot of `state` at `now`
pub fn snapshot(state: &TimerState, now: DateTime<Utc>) -> Result<Snapshot, SchemaError> {
    state.schedule.validate()?;

    let elapsed_seconds = state.elapsed_seconds(now);
    let offsets = state.schedule.cumulative_offsets();
    let last = offsets.len() - 1;

    let (index, remaining_seconds) = offsets
        .iter()
        .map(|(start, level)| start.saturating_add(level.duration_seconds()))
        .enumerate()
        .find(|(_, end)| elapsed_seconds < *end)
        .map(|(index, end)| (index, end - elapsed_seconds))
        // Past the end of the schedule: hold on the last level
        .unwrap_or((last, 0));

    let current = offsets[index].1.clone();
    let next = offsets.get(index + 1).map(|(_, level)| (*level).clone());

    Ok(Snapshot {
        status: state.status,
        current_level_index: index,
        current,
        next,
        remaining_seconds: remaining_seconds.max(0),
        elapsed_seconds,
        level_count: offsets.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::{schedule::Schedule, timer::Transition};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap()
    }

    fn schedule() -> Schedule {
        Schedule::new(vec![
            Level::blind("1", 25, 50, 0, 600),
            Level::blind("2", 50, 100, 0, 600),
            Level::break_time("Break", 300),
            Level::blind("3", 100, 200, 25, 600),
        ])
    }

    fn running_since_t0() -> TimerState {
        TimerState::new(schedule())
            .apply(Transition::Start, t0(), &Schedule::default_schedule(600))
            .unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(seconds)
    }

    #[test]
    fn idle_reports_first_level_with_nothing_elapsed() {
        let snap = snapshot(&TimerState::new(schedule()), at(5000)).unwrap();

        assert_eq!(snap.status, TimerStatus::Idle);
        assert_eq!(snap.current_level_index, 0);
        assert_eq!(snap.current, Level::blind("1", 25, 50, 0, 600));
        assert_eq!(snap.elapsed_seconds, 0);
        assert_eq!(snap.remaining_seconds, 600);
    }

    #[test]
    fn one_second_before_boundary_stays_on_first_level() {
        let snap = snapshot(&running_since_t0(), at(599)).unwrap();

        assert_eq!(snap.current_level_index, 0);
        assert_eq!(snap.remaining_seconds, 1);
        assert_eq!(snap.next, Some(Level::blind("2", 50, 100, 0, 600)));
    }

    #[test]
    fn boundary_moves_to_next_level() {
        let snap = snapshot(&running_since_t0(), at(600)).unwrap();

        assert_eq!(snap.current_level_index, 1);
        assert_eq!(snap.remaining_seconds, 600);
        assert!(snap.next.as_ref().is_some_and(Level::is_break));
    }

    #[test]
    fn break_is_a_regular_level_in_the_walk() {
        let snap = snapshot(&running_since_t0(), at(1250)).unwrap();

        assert_eq!(snap.current_level_index, 2);
        assert!(snap.current.is_break());
        assert_eq!(snap.remaining_seconds, 250);
    }

    #[test]
    fn level_after_break() {
        let snap = snapshot(&running_since_t0(), at(1701)).unwrap();

        assert_eq!(snap.current_level_index, 3);
        assert_eq!(snap.remaining_seconds, 399);
        assert_eq!(snap.next, None);
    }

    #[test]
    fn past_the_schedule_clamps_to_last_level() {
        for seconds in [2100, 2101, 86_400 * 3] {
            let snap = snapshot(&running_since_t0(), at(seconds)).unwrap();

            assert_eq!(snap.current_level_index, 3);
            assert_eq!(snap.remaining_seconds, 0);
            assert_eq!(snap.elapsed_seconds, seconds);
        }
    }

    #[test]
    fn paused_snapshot_is_frozen() {
        let fallback = Schedule::default_schedule(600);
        let paused = running_since_t0().apply(Transition::Pause, at(700), &fallback).unwrap();

        let early = snapshot(&paused, at(701)).unwrap();
        let late = snapshot(&paused, at(10_000)).unwrap();

        assert_eq!(early, late);
        assert_eq!(early.status, TimerStatus::Paused);
        assert_eq!(early.current_level_index, 1);
        assert_eq!(early.remaining_seconds, 500);
    }

    #[test]
    fn replaced_schedule_reclassifies_elapsed_time() {
        let state = running_since_t0();
        let shorter = state
            .replace_schedule(Schedule::new(vec![
                Level::blind("1", 25, 50, 0, 300),
                Level::blind("2", 50, 100, 0, 300),
                Level::blind("3", 75, 150, 0, 300),
            ]))
            .unwrap();

        let snap = snapshot(&shorter, at(650)).unwrap();
        assert_eq!(snap.elapsed_seconds, 650);
        assert_eq!(snap.current_level_index, 2);
        assert_eq!(snap.remaining_seconds, 250);

        let snap = snapshot(&shorter, at(2000)).unwrap();
        assert_eq!(snap.current_level_index, 2);
        assert_eq!(snap.remaining_seconds, 0);
    }

    #[test]
    fn huge_level_duration_does_not_overflow_the_walk() {
        let state = TimerState::new(Schedule::new(vec![
            Level::blind("1", 25, 50, 0, 5),
            Level::blind("2", 50, 100, 0, i64::MAX),
        ]))
        .apply(Transition::Start, t0(), &Schedule::default_schedule(600))
        .unwrap();

        let snap = snapshot(&state, at(10)).unwrap();

        assert_eq!(snap.current_level_index, 1);
        assert_eq!(snap.elapsed_seconds, 10);
        assert_eq!(snap.remaining_seconds, i64::MAX - 10);
    }

    #[test]
    fn malformed_schedule_fails_derivation() {
        let mut state = running_since_t0();
        state.schedule = Schedule::new(vec![Level::blind("1", 25, 50, 0, 0)]);

        assert_eq!(snapshot(&state, at(10)), Err(SchemaError::NonPositiveDuration { index: 0 }));
    }
}
