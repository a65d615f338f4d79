use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use log::{debug, warn};

pub const MAX_CATCH_UP_TICKS: u32 = 1024;
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Fired {
    pub id: TaskId,
    pub count: u32,
}

#[derive(Debug)]
struct TaskEntry {
    name: &'static str,
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    now: Duration,
    tasks: BTreeMap<TaskId, TaskEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    registry: Rc<RefCell<Registry>>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &'static str, interval: Duration) -> TaskGuard {
        let mut registry = self.registry.borrow_mut();
        let id = TaskId(registry.next_id);
        registry.next_id += 1;
        let interval = interval.max(MIN_INTERVAL);
        let next_due = registry.now + interval;
        registry.tasks.insert(
            id,
            TaskEntry {
                name,
                interval,
                next_due,
            },
        );
        debug!("registered task {name} every {interval:?}");
        TaskGuard {
            id,
            name,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn poll(&self, now: Duration) -> Vec<Fired> {
        let mut registry = self.registry.borrow_mut();
        if now > registry.now {
            registry.now = now;
        }
        let now = registry.now;

        let mut fired = Vec::new();
        for (id, task) in registry.tasks.iter_mut() {
            if now < task.next_due {
                continue;
            }
            let behind = now - task.next_due;
            let due = 1 + behind.as_nanos() / task.interval.as_nanos();
            let count = if due > u128::from(MAX_CATCH_UP_TICKS) {
                warn!(
                    "task {} fell {} ticks behind; dropping backlog",
                    task.name,
                    due - u128::from(MAX_CATCH_UP_TICKS)
                );
                task.next_due = now + task.interval;
                MAX_CATCH_UP_TICKS
            } else {
                let count = due as u32;
                task.next_due += task.interval * count;
                count
            };
            fired.push(Fired { id: *id, count });
        }
        fired
    }

    #[cfg(test)]
    pub fn is_registered(&self, id: TaskId) -> bool {
        self.registry.borrow().tasks.contains_key(&id)
    }

    #[cfg(test)]
    pub fn active_tasks(&self) -> usize {
        self.registry.borrow().tasks.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.registry
            .borrow()
            .tasks
            .values()
            .map(|task| task.next_due)
            .min()
    }
}

#[derive(Debug)]
pub struct TaskGuard {
    id: TaskId,
    name: &'static str,
    registry: Weak<RefCell<Registry>>,
}

impl TaskGuard {
    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade()
            && registry.borrow_mut().tasks.remove(&self.id).is_some()
        {
            debug!("cancelled task {}", self.name);
        }
    }
}

pub fn sleep_until(deadline: Instant) {
    let now = Instant::now();
    if now >= deadline {
        return;
    }

    let mut remaining = deadline.saturating_duration_since(now);
    if remaining > Duration::from_millis(1) {
        std::thread::sleep(remaining - Duration::from_micros(250));
    }

    loop {
        let current = Instant::now();
        if current >= deadline {
            break;
        }
        remaining = deadline.saturating_duration_since(current);
        if remaining > Duration::from_micros(50) {
            std::thread::yield_now();
        } else {
            std::hint::spin_loop();
        }
    }
}
