use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Locale, Weekday};
use serde::Deserialize;

use crate::alarm::model::{Alarm, Period, seed_alarms};
use crate::countdown::DEFAULT_TIMER_SECS;

pub const DEFAULT_LOCALE: &str = "en_US";

#[derive(Debug, Clone)]
pub struct ClockConfig {
    pub version: u32,
    pub settings: ClockSettings,
    pub alarms: Vec<Alarm>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            version: 1,
            settings: ClockSettings::default(),
            alarms: seed_alarms(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClockSettings {
    pub timer_duration_secs: u64,
    pub locale: Locale,
    pub use_24h: bool,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            timer_duration_secs: DEFAULT_TIMER_SECS,
            locale: Locale::en_US,
            use_24h: false,
        }
    }
}

pub fn load_clock_config(path: &Path) -> Result<ClockConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("unable to read config file {}", path.display()))?;
    parse_clock_config_text(&content)
}

pub fn parse_clock_config_text(content: &str) -> Result<ClockConfig> {
    let raw = serde_json::from_str::<ClockConfigFile>(content).map_err(|err| {
        let line = err.line();
        let column = err.column();
        anyhow!("invalid JSON at line {line}, column {column}: {err}")
    })?;

    if raw.version != 1 {
        bail!(
            "unsupported config version {}; expected version 1",
            raw.version
        );
    }
    if raw.settings.timer_duration_secs == 0 {
        bail!("timer_duration_secs must be > 0");
    }
    let locale = parse_locale(&raw.settings.locale)?;

    let alarms = match raw.alarms {
        None => seed_alarms(),
        Some(entries) => {
            let mut ids = HashSet::new();
            let mut alarms = Vec::with_capacity(entries.len());
            for alarm in entries {
                if !ids.insert(alarm.id.clone()) {
                    bail!("duplicate alarm id found: {}", alarm.id);
                }
                if !(1..=12).contains(&alarm.hour) {
                    bail!("alarm '{}' must have hour in 1..=12", alarm.id);
                }
                if alarm.minute > 59 {
                    bail!("alarm '{}' must have minute in 0..=59", alarm.id);
                }
                alarms.push(Alarm {
                    id: alarm.id,
                    label: alarm.label,
                    repeat_days: alarm
                        .repeat_days
                        .into_iter()
                        .map(WeekdayToken::to_chrono)
                        .collect(),
                    hour: alarm.hour,
                    minute: alarm.minute,
                    period: alarm.period.to_period(),
                    active: alarm.active,
                });
            }
            alarms
        }
    };

    Ok(ClockConfig {
        version: raw.version,
        settings: ClockSettings {
            timer_duration_secs: raw.settings.timer_duration_secs,
            locale,
            use_24h: raw.settings.use_24h,
        },
        alarms,
    })
}

pub fn parse_locale(name: &str) -> Result<Locale> {
    Locale::try_from(name).map_err(|_| anyhow!("unknown locale '{name}'"))
}

#[derive(Debug, Deserialize)]
struct ClockConfigFile {
    version: u32,
    #[serde(default)]
    settings: ClockSettingsFile,
    alarms: Option<Vec<AlarmFile>>,
}

#[derive(Debug, Deserialize)]
struct ClockSettingsFile {
    #[serde(default = "default_timer_duration_secs")]
    timer_duration_secs: u64,
    #[serde(default = "default_locale")]
    locale: String,
    #[serde(default)]
    use_24h: bool,
}

impl Default for ClockSettingsFile {
    fn default() -> Self {
        Self {
            timer_duration_secs: default_timer_duration_secs(),
            locale: default_locale(),
            use_24h: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlarmFile {
    id: String,
    #[serde(default = "default_label")]
    label: String,
    hour: u32,
    #[serde(default)]
    minute: u32,
    period: PeriodToken,
    #[serde(default)]
    repeat_days: Vec<WeekdayToken>,
    #[serde(default = "default_active")]
    active: bool,
}

#[derive(Debug, Deserialize)]
enum PeriodToken {
    #[serde(alias = "am")]
    AM,
    #[serde(alias = "pm")]
    PM,
}

impl PeriodToken {
    fn to_period(self) -> Period {
        match self {
            PeriodToken::AM => Period::Am,
            PeriodToken::PM => Period::Pm,
        }
    }
}

#[derive(Debug, Deserialize)]
enum WeekdayToken {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WeekdayToken {
    fn to_chrono(self) -> Weekday {
        match self {
            WeekdayToken::Mon => Weekday::Mon,
            WeekdayToken::Tue => Weekday::Tue,
            WeekdayToken::Wed => Weekday::Wed,
            WeekdayToken::Thu => Weekday::Thu,
            WeekdayToken::Fri => Weekday::Fri,
            WeekdayToken::Sat => Weekday::Sat,
            WeekdayToken::Sun => Weekday::Sun,
        }
    }
}

fn default_timer_duration_secs() -> u64 {
    DEFAULT_TIMER_SECS
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_label() -> String {
    "Alarm".to_string()
}

fn default_active() -> bool {
    true
}
