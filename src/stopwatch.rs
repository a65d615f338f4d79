use std::time::Duration;

use log::debug;

use crate::duration_format::format_stopwatch;
use crate::ticker::{TaskGuard, TaskId, TickScheduler};

pub const STOPWATCH_TICK: Duration = Duration::from_millis(10);
const STOPWATCH_TICK_MS: u64 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StopwatchState {
    Stopped,
    Running,
}

#[derive(Debug)]
pub struct Stopwatch {
    elapsed_ms: u64,
    task: Option<TaskGuard>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            elapsed_ms: 0,
            task: None,
        }
    }

    pub fn state(&self) -> StopwatchState {
        if self.task.is_some() {
            StopwatchState::Running
        } else {
            StopwatchState::Stopped
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn display(&self) -> String {
        format_stopwatch(self.elapsed_ms)
    }

    pub fn owns(&self, id: TaskId) -> bool {
        self.task.as_ref().is_some_and(|task| task.id() == id)
    }

    pub fn start_pause(&mut self, scheduler: &TickScheduler) -> StopwatchState {
        self.task = match self.task.take() {
            Some(_running) => None,
            None => Some(scheduler.register("stopwatch", STOPWATCH_TICK)),
        };
        debug!("stopwatch {:?} at {}", self.state(), self.display());
        self.state()
    }

    pub fn reset(&mut self) {
        self.task = None;
        self.elapsed_ms = 0;
    }

    pub fn tick(&mut self, count: u32) {
        if self.task.is_some() {
            self.elapsed_ms = self
                .elapsed_ms
                .saturating_add(u64::from(count) * STOPWATCH_TICK_MS);
        }
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}
