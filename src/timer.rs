//! Pomodoro countdown state machine.
//!
//! The timer alternates between a work phase and a break phase, counting down
//! once per second while an [`Interval`] is active. It is bound to at most one
//! task; phase completions are reported as [`TimerEvent`]s so the owner can
//! update the task store.

use std::time::{Duration, Instant};

use crate::task::TaskId;

/// Default work phase length in seconds (25 minutes).
pub const WORK_SECS: u32 = 25 * 60;
/// Default break phase length in seconds (5 minutes).
pub const BREAK_SECS: u32 = 5 * 60;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::Break => "Break",
        }
    }
}

/// Canonical phase lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDurations {
    pub work_secs: u32,
    pub break_secs: u32,
}

impl Default for SessionDurations {
    fn default() -> Self {
        Self { work_secs: WORK_SECS, break_secs: BREAK_SECS }
    }
}

impl SessionDurations {
    pub fn for_phase(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_secs,
            Phase::Break => self.break_secs,
        }
    }
}

/// What happened when a phase ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// A work session bound to `task` finished; a break has started.
    WorkCompleted { task: TaskId },
    /// A break finished; a new work session has started.
    BreakCompleted { task: TaskId },
}

impl TimerEvent {
    pub fn message(&self) -> &'static str {
        match self {
            TimerEvent::WorkCompleted { .. } => "Work session completed! Take a break.",
            TimerEvent::BreakCompleted { .. } => "Break is over! Time to work.",
        }
    }
}

/// A cancellable repeating schedule with a fixed period.
///
/// Dropping or replacing the interval is cancellation: no further ticks are
/// reported for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    period: Duration,
    next_due: Instant,
}

impl Interval {
    /// Schedule the first tick one period after `now`.
    pub fn start(now: Instant, period: Duration) -> Self {
        Self { period, next_due: now + period }
    }

    /// Fire at most one tick due at or before `now`, returning its instant.
    ///
    /// If the caller has fallen more than a period behind, missed ticks are
    /// skipped and the schedule restarts from `now`.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        if now < self.next_due {
            return None;
        }
        let fired = self.next_due;
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
            return Some(now);
        }
        Some(fired)
    }
}

/// Countdown bound to a single task.
#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    durations: SessionDurations,
    task: Option<TaskId>,
    phase: Phase,
    remaining: u32,
    interval: Option<Interval>,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(SessionDurations::default())
    }
}

impl PomodoroTimer {
    pub fn new(durations: SessionDurations) -> Self {
        Self {
            durations,
            task: None,
            phase: Phase::Work,
            remaining: durations.work_secs,
            interval: None,
        }
    }

    pub fn task(&self) -> Option<TaskId> {
        self.task
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn durations(&self) -> SessionDurations {
        self.durations
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Start counting down for `task`.
    ///
    /// Binding a different task (or the first one) resets to a fresh work
    /// phase. Any active interval is replaced, so only one countdown ever runs.
    pub fn start(&mut self, task: TaskId, now: Instant) {
        if self.task != Some(task) {
            self.task = Some(task);
            self.phase = Phase::Work;
            self.remaining = self.durations.work_secs;
            tracing::debug!(task, "timer bound to task");
        }
        self.interval = Some(Interval::start(now, TICK));
    }

    /// Stop ticking and restore the full length of the current phase.
    pub fn reset(&mut self) {
        self.interval = None;
        self.remaining = self.durations.for_phase(self.phase);
    }

    /// Stop ticking and forget the bound task.
    pub fn unbind(&mut self) {
        self.task = None;
        self.phase = Phase::Work;
        self.interval = None;
        self.remaining = self.durations.work_secs;
    }

    /// Instant of the next tick if one is due by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        self.interval.as_mut().and_then(|i| i.poll(now))
    }

    /// Count down one second, switching phase when the countdown runs out.
    ///
    /// The new phase starts ticking from `at` without an idle gap. Returns
    /// `None` when idle or when the phase is still running.
    pub fn tick(&mut self, at: Instant) -> Option<TimerEvent> {
        let task = self.task?;
        if self.interval.is_none() {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }

        self.interval = None;
        let event = match self.phase {
            Phase::Work => {
                self.phase = Phase::Break;
                TimerEvent::WorkCompleted { task }
            }
            Phase::Break => {
                self.phase = Phase::Work;
                TimerEvent::BreakCompleted { task }
            }
        };
        self.remaining = self.durations.for_phase(self.phase);
        self.interval = Some(Interval::start(at, TICK));
        Some(event)
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format_clock(self.remaining)
    }
}

/// Format seconds as zero-padded `MM:SS`.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn run(timer: &mut PomodoroTimer, start: Instant, ticks: u32) -> Vec<TimerEvent> {
        (1..=ticks)
            .filter_map(|n| timer.tick(start + TICK * n))
            .collect()
    }

    #[rstest]
    #[case(65, "01:05")]
    #[case(0, "00:00")]
    #[case(3599, "59:59")]
    #[case(1500, "25:00")]
    fn formats_clock(#[case] secs: u32, #[case] expected: &str) {
        assert_eq!(format_clock(secs), expected);
    }

    #[test]
    fn new_timer_is_idle_on_full_work_phase() {
        let timer = PomodoroTimer::default();
        assert!(!timer.is_running());
        assert_eq!(timer.task(), None);
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.display(), "25:00");
    }

    #[test]
    fn idle_timer_does_not_tick() {
        let mut timer = PomodoroTimer::default();
        let now = Instant::now();
        assert_eq!(timer.tick(now), None);
        assert_eq!(timer.remaining(), WORK_SECS);
        assert_eq!(timer.poll(now + TICK * 10), None);
    }

    #[test]
    fn work_phase_completes_after_full_countdown() {
        let mut timer = PomodoroTimer::default();
        let t0 = Instant::now();
        timer.start(7, t0);

        assert!(run(&mut timer, t0, WORK_SECS - 1).is_empty());
        assert_eq!(timer.remaining(), 1);
        assert_eq!(timer.tick(t0 + TICK * WORK_SECS), Some(TimerEvent::WorkCompleted { task: 7 }));
        assert_eq!(timer.phase(), Phase::Break);
        assert_eq!(timer.remaining(), BREAK_SECS);
        assert!(timer.is_running());
    }

    #[test]
    fn break_phase_returns_to_work() {
        let mut timer = PomodoroTimer::default();
        let t0 = Instant::now();
        timer.start(1, t0);
        run(&mut timer, t0, WORK_SECS);

        let events = run(&mut timer, t0, BREAK_SECS);
        assert_eq!(events, [TimerEvent::BreakCompleted { task: 1 }]);
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.remaining(), WORK_SECS);
        assert!(timer.is_running());
    }

    #[test]
    fn starting_same_task_keeps_remaining_time() {
        let mut timer = PomodoroTimer::default();
        let t0 = Instant::now();
        timer.start(1, t0);
        run(&mut timer, t0, 100);
        timer.start(1, t0);
        assert_eq!(timer.remaining(), WORK_SECS - 100);
    }

    #[test]
    fn starting_other_task_rebinds_and_resets() {
        let mut timer = PomodoroTimer::default();
        let t0 = Instant::now();
        timer.start(1, t0);
        run(&mut timer, t0, 100);
        timer.start(2, t0);
        assert_eq!(timer.task(), Some(2));
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.remaining(), WORK_SECS);
    }

    #[test]
    fn restart_replaces_interval() {
        let mut timer = PomodoroTimer::default();
        let t0 = Instant::now();
        timer.start(1, t0);
        timer.start(2, t0 + Duration::from_millis(500));
        // Only the second schedule is live: nothing fires at the first one's due time.
        assert_eq!(timer.poll(t0 + TICK), None);
        assert!(timer.poll(t0 + Duration::from_millis(1500)).is_some());
    }

    #[test]
    fn reset_restores_current_phase_length_and_stops() {
        let mut timer = PomodoroTimer::default();
        let t0 = Instant::now();
        timer.start(1, t0);
        run(&mut timer, t0, 600);
        assert_eq!(timer.remaining(), 900);

        timer.reset();
        assert_eq!(timer.remaining(), WORK_SECS);
        assert!(!timer.is_running());
        assert_eq!(timer.task(), Some(1));
        assert_eq!(timer.tick(t0 + TICK * 601), None);
        assert_eq!(timer.remaining(), WORK_SECS);
    }

    #[test]
    fn reset_during_break_keeps_break_phase() {
        let mut timer = PomodoroTimer::default();
        let t0 = Instant::now();
        timer.start(1, t0);
        run(&mut timer, t0, WORK_SECS + 10);
        timer.reset();
        assert_eq!(timer.phase(), Phase::Break);
        assert_eq!(timer.remaining(), BREAK_SECS);
    }

    #[test]
    fn custom_durations_apply() {
        let mut timer = PomodoroTimer::new(SessionDurations { work_secs: 3, break_secs: 2 });
        let t0 = Instant::now();
        timer.start(4, t0);
        let events = run(&mut timer, t0, 5);
        assert_eq!(
            events,
            [TimerEvent::WorkCompleted { task: 4 }, TimerEvent::BreakCompleted { task: 4 }]
        );
    }

    #[test]
    fn interval_fires_once_per_period() {
        let t0 = Instant::now();
        let mut interval = Interval::start(t0, TICK);
        assert_eq!(interval.poll(t0 + Duration::from_millis(999)), None);
        assert_eq!(interval.poll(t0 + TICK), Some(t0 + TICK));
        assert_eq!(interval.poll(t0 + TICK), None);
        assert_eq!(interval.poll(t0 + TICK * 2 - Duration::from_millis(1)), None);
        assert_eq!(interval.poll(t0 + TICK * 2), Some(t0 + TICK * 2));
    }

    #[test]
    fn interval_skips_missed_ticks() {
        let t0 = Instant::now();
        let mut interval = Interval::start(t0, TICK);
        let late = t0 + TICK * 60;
        assert_eq!(interval.poll(late), Some(late));
        assert_eq!(interval.poll(late), None);
        assert_eq!(interval.poll(late + TICK), Some(late + TICK));
    }
}
