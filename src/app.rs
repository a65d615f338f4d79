use std::fmt;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local};
use log::{debug, info};

use crate::alarm::collection::AlarmCollection;
use crate::alarm::editor::EditorSession;
use crate::alarm::model::Alarm;
use crate::config::{ClockConfig, ClockSettings};
use crate::countdown::{Countdown, TimerState};
use crate::stopwatch::{Stopwatch, StopwatchState};
use crate::ticker::{Fired, TaskGuard, TickScheduler};
use crate::time_format::{ClockReading, TimeDisplayMode};
use crate::time_provider::TimeSource;

pub const CLOCK_TICK: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Screen {
    Alarm,
    Clock,
    Timer,
    Stopwatch,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Alarm => "Alarm",
            Screen::Clock => "Clock",
            Screen::Timer => "Timer",
            Screen::Stopwatch => "Stopwatch",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// Timer and stopwatch state lives only while their screen is shown.
#[derive(Debug)]
enum ScreenState {
    Alarm,
    Clock,
    Timer(Countdown),
    Stopwatch(Stopwatch),
}

impl ScreenState {
    fn screen(&self) -> Screen {
        match self {
            ScreenState::Alarm => Screen::Alarm,
            ScreenState::Clock => Screen::Clock,
            ScreenState::Timer(_) => Screen::Timer,
            ScreenState::Stopwatch(_) => Screen::Stopwatch,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct AdvanceOutcome {
    pub clock_refreshed: bool,
    pub timer_expired: bool,
}

pub struct ClockApp {
    time_source: Box<dyn TimeSource>,
    scheduler: TickScheduler,
    settings: ClockSettings,
    alarms: AlarmCollection,
    editor: Option<EditorSession>,
    screen: ScreenState,
    clock_task: Option<TaskGuard>,
    now: DateTime<Local>,
    reading: ClockReading,
}

impl ClockApp {
    pub fn new(time_source: Box<dyn TimeSource>, config: ClockConfig) -> Result<Self> {
        let now = time_source.now()?;
        let settings = config.settings;
        let reading = ClockReading::at(&now, settings.locale, display_mode(&settings));
        Ok(Self {
            time_source,
            scheduler: TickScheduler::new(),
            settings,
            alarms: AlarmCollection::new(config.alarms),
            editor: None,
            screen: ScreenState::Clock,
            clock_task: None,
            now,
            reading,
        })
    }

    pub fn start(&mut self) -> Result<()> {
        if self.clock_task.is_none() {
            self.clock_task = Some(self.scheduler.register("clock", CLOCK_TICK));
            info!("clock started on {} screen", self.screen.screen());
        }
        self.refresh()
    }

    pub fn stop(&mut self) {
        self.clock_task = None;
        self.screen = self.fresh_state(self.screen.screen());
        info!("clock stopped");
    }

    pub fn is_started(&self) -> bool {
        self.clock_task.is_some()
    }

    pub fn screen(&self) -> Screen {
        self.screen.screen()
    }

    pub fn select_screen(&mut self, screen: Screen) {
        if self.screen.screen() == screen {
            return;
        }
        debug!("switching screen {} -> {screen}", self.screen.screen());
        self.screen = self.fresh_state(screen);
    }

    pub fn advance(&mut self, monotonic: Duration) -> Result<AdvanceOutcome> {
        let mut outcome = AdvanceOutcome::default();
        for Fired { id, count } in self.scheduler.poll(monotonic) {
            if self.clock_task.as_ref().is_some_and(|task| task.id() == id) {
                self.refresh()?;
                outcome.clock_refreshed = true;
                continue;
            }
            match &mut self.screen {
                ScreenState::Timer(timer) if timer.owns(id) => {
                    outcome.timer_expired |= timer.tick(count) == TimerState::Expired;
                }
                ScreenState::Stopwatch(stopwatch) if stopwatch.owns(id) => stopwatch.tick(count),
                _ => debug!("tick for {id:?} has no owner"),
            }
        }
        Ok(outcome)
    }

    pub fn reading(&self) -> &ClockReading {
        &self.reading
    }

    pub fn now(&self) -> DateTime<Local> {
        self.now
    }

    pub fn settings(&self) -> &ClockSettings {
        &self.settings
    }

    #[cfg(test)]
    pub fn active_tasks(&self) -> usize {
        self.scheduler.active_tasks()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn timer(&self) -> Option<&Countdown> {
        match &self.screen {
            ScreenState::Timer(timer) => Some(timer),
            _ => None,
        }
    }

    pub fn timer_start_pause(&mut self) -> Option<TimerState> {
        match &mut self.screen {
            ScreenState::Timer(timer) => Some(timer.start_pause(&self.scheduler)),
            _ => None,
        }
    }

    pub fn timer_reset(&mut self) -> bool {
        match &mut self.screen {
            ScreenState::Timer(timer) => {
                timer.reset();
                true
            }
            _ => false,
        }
    }

    pub fn stopwatch(&self) -> Option<&Stopwatch> {
        match &self.screen {
            ScreenState::Stopwatch(stopwatch) => Some(stopwatch),
            _ => None,
        }
    }

    pub fn stopwatch_start_pause(&mut self) -> Option<StopwatchState> {
        match &mut self.screen {
            ScreenState::Stopwatch(stopwatch) => Some(stopwatch.start_pause(&self.scheduler)),
            _ => None,
        }
    }

    pub fn stopwatch_reset(&mut self) -> bool {
        match &mut self.screen {
            ScreenState::Stopwatch(stopwatch) => {
                stopwatch.reset();
                true
            }
            _ => false,
        }
    }

    pub fn alarms(&self) -> &[Alarm] {
        self.alarms.alarms()
    }

    pub fn toggle_alarm(&mut self, id: &str) -> Option<bool> {
        self.alarms.toggle_active(id)
    }

    pub fn open_new_alarm(&mut self) -> &mut EditorSession {
        self.editor.insert(self.alarms.open_new(&self.now))
    }

    pub fn open_edit_alarm(&mut self, id: &str) -> Option<&mut EditorSession> {
        let session = self.alarms.open_edit(id)?;
        Some(self.editor.insert(session))
    }

    pub fn editor(&self) -> Option<&EditorSession> {
        self.editor.as_ref()
    }

    pub fn save_editor(&mut self) -> Option<Alarm> {
        let session = self.editor.take()?;
        Some(self.alarms.save(session, &self.now))
    }

    pub fn cancel_editor(&mut self) {
        if self.editor.take().is_some() {
            debug!("editor dismissed");
        }
    }

    fn refresh(&mut self) -> Result<()> {
        self.now = self.time_source.now()?;
        let mode = display_mode(&self.settings);
        self.reading = ClockReading::at(&self.now, self.settings.locale, mode);
        Ok(())
    }

    fn fresh_state(&self, screen: Screen) -> ScreenState {
        match screen {
            Screen::Alarm => ScreenState::Alarm,
            Screen::Clock => ScreenState::Clock,
            Screen::Timer => ScreenState::Timer(Countdown::new(self.settings.timer_duration_secs)),
            Screen::Stopwatch => ScreenState::Stopwatch(Stopwatch::new()),
        }
    }
}

fn display_mode(settings: &ClockSettings) -> TimeDisplayMode {
    if settings.use_24h {
        TimeDisplayMode::Hour24
    } else {
        TimeDisplayMode::Hour12
    }
}
