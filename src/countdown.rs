use std::time::Duration;

use log::debug;

use crate::duration_format::format_countdown;
use crate::ticker::{TaskGuard, TaskId, TickScheduler};

pub const DEFAULT_TIMER_SECS: u64 = 5 * 60;
pub const TIMER_TICK: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Expired,
}

#[derive(Debug)]
pub struct Countdown {
    duration_secs: u64,
    remaining_secs: u64,
    state: TimerState,
    task: Option<TaskGuard>,
}

impl Countdown {
    pub fn new(duration_secs: u64) -> Self {
        let duration_secs = duration_secs.max(1);
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            state: TimerState::Idle,
            task: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn display(&self) -> String {
        format_countdown(self.remaining_secs)
    }

    pub fn owns(&self, id: TaskId) -> bool {
        self.task.as_ref().is_some_and(|task| task.id() == id)
    }

    pub fn start_pause(&mut self, scheduler: &TickScheduler) -> TimerState {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                self.task = None;
            }
            TimerState::Expired => {
                self.remaining_secs = self.duration_secs;
                self.run(scheduler);
            }
            TimerState::Idle | TimerState::Paused => self.run(scheduler),
        }
        debug!("timer {:?} at {}", self.state, self.display());
        self.state
    }

    pub fn reset(&mut self) {
        self.task = None;
        self.remaining_secs = self.duration_secs;
        self.state = TimerState::Idle;
    }

    pub fn tick(&mut self, count: u32) -> TimerState {
        if self.state != TimerState::Running {
            return self.state;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(u64::from(count));
        if self.remaining_secs == 0 {
            self.state = TimerState::Expired;
            self.task = None;
            debug!("timer expired");
        }
        self.state
    }

    fn run(&mut self, scheduler: &TickScheduler) {
        self.state = TimerState::Running;
        self.task = Some(scheduler.register("timer", TIMER_TICK));
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_TIMER_SECS)
    }
}
