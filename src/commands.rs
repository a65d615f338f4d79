use std::time::Instant;

use anyhow::{Result, anyhow, bail};
use chrono::{TimeDelta, Weekday};
use log::info;
use serde::Serialize;

use pocketclock::alarm::editor::AlarmDraft;
use pocketclock::alarm::model::{
    Alarm, Period, format_alarm_time, parse_weekday_token, repeat_label, weekday_to_token,
};
use pocketclock::app::{ClockApp, Screen};
use pocketclock::countdown::TimerState;
use pocketclock::ticker::sleep_until;

#[derive(Debug, Serialize)]
struct AlarmView {
    id: Option<String>,
    time: String,
    label: String,
    repeat: String,
    repeat_days: Vec<&'static str>,
    hour: u32,
    minute: u32,
    period: Period,
    active: bool,
}

impl AlarmView {
    fn from_alarm(alarm: &Alarm) -> Self {
        Self::from_draft(&AlarmDraft::from_alarm(alarm))
    }

    fn from_draft(draft: &AlarmDraft) -> Self {
        Self {
            id: draft.id.clone(),
            time: format_alarm_time(draft.hour, draft.minute, draft.period),
            label: draft.label.clone(),
            repeat: repeat_label(&draft.repeat_days),
            repeat_days: draft
                .repeat_days
                .iter()
                .map(|day| weekday_to_token(*day))
                .collect(),
            hour: draft.hour,
            minute: draft.minute,
            period: draft.period,
            active: draft.active,
        }
    }
}

pub struct NewAlarm {
    pub time: String,
    pub period: String,
    pub label: Option<String>,
    pub days: Vec<String>,
    pub active: bool,
}

pub struct AlarmEdit {
    pub hour_step: i32,
    pub minute_step: i32,
    pub period: Option<String>,
    pub label: Option<String>,
    pub toggle_days: Vec<String>,
    pub active: Option<bool>,
}

pub fn run_clock(app: &mut ClockApp, ticks: u32, json: bool) -> Result<()> {
    app.select_screen(Screen::Clock);
    app.start()?;
    print_reading(app, json)?;

    let origin = Instant::now();
    let mut printed = 1;
    while printed < ticks {
        let Some(deadline) = app.next_deadline() else {
            break;
        };
        sleep_until(origin + deadline);
        if app.advance(origin.elapsed())?.clock_refreshed {
            print_reading(app, json)?;
            printed += 1;
        }
    }
    app.stop();
    Ok(())
}

fn print_reading(app: &ClockApp, json: bool) -> Result<()> {
    let reading = app.reading();
    if json {
        println!("{}", serde_json::to_string_pretty(reading)?);
    } else {
        println!(
            "{}  {}  [{}]  hands h={:.2} m={:.2} s={:.0}",
            reading.digital,
            reading.date,
            reading.utc_offset,
            reading.angles.hours,
            reading.angles.minutes,
            reading.angles.seconds
        );
    }
    Ok(())
}

pub fn print_alarms(app: &ClockApp, json: bool) -> Result<()> {
    let views = app
        .alarms()
        .iter()
        .map(AlarmView::from_alarm)
        .collect::<Vec<_>>();
    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }
    if views.is_empty() {
        println!("No alarms scheduled");
        return Ok(());
    }
    for view in views {
        println!(
            "{:<28} {}  {:<16} {:<28} {}",
            view.id.unwrap_or_default(),
            view.time,
            view.label,
            view.repeat,
            if view.active { "on" } else { "off" }
        );
    }
    Ok(())
}

pub fn print_template(app: &mut ClockApp, json: bool) -> Result<()> {
    let view = AlarmView::from_draft(app.open_new_alarm().draft());
    app.cancel_editor();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{} at {} ({})", view.label, view.time, view.repeat);
    }
    Ok(())
}

pub fn add_alarm(app: &mut ClockApp, request: &NewAlarm) -> Result<Alarm> {
    let (hour, minute) = parse_dial_time(&request.time)?;
    let period = request.period.parse::<Period>()?;
    let days = parse_days(&request.days)?;

    app.select_screen(Screen::Alarm);
    let session = app.open_new_alarm();
    session.set_hour(hour);
    session.set_minute(minute);
    session.set_period(period);
    if let Some(label) = &request.label {
        session.set_label(label.clone());
    }
    for day in days {
        session.toggle_day(day);
    }
    session.set_active(request.active);
    info!("{}: {}", session.title(), session.draft().label);

    app.save_editor()
        .ok_or_else(|| anyhow!("alarm editor closed before saving"))
}

pub fn edit_alarm(app: &mut ClockApp, id: &str, request: &AlarmEdit) -> Result<Alarm> {
    let period = request
        .period
        .as_deref()
        .map(str::parse::<Period>)
        .transpose()?;
    let days = parse_days(&request.toggle_days)?;

    app.select_screen(Screen::Alarm);
    let session = app
        .open_edit_alarm(id)
        .ok_or_else(|| anyhow!("no alarm with id '{id}'"))?;
    session.step_hour(request.hour_step);
    session.step_minute(request.minute_step);
    if let Some(period) = period {
        session.set_period(period);
    }
    if let Some(label) = &request.label {
        session.set_label(label.clone());
    }
    for day in days {
        session.toggle_day(day);
    }
    if let Some(active) = request.active {
        session.set_active(active);
    }
    info!("{}: {}", session.title(), id);

    app.save_editor()
        .ok_or_else(|| anyhow!("alarm editor closed before saving"))
}

fn parse_days(tokens: &[String]) -> Result<Vec<Weekday>> {
    let days = tokens
        .iter()
        .filter(|token| !token.trim().is_empty())
        .map(|token| parse_weekday_token(token))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(days)
}

pub fn toggle_alarm(app: &mut ClockApp, id: &str) -> Result<bool> {
    app.select_screen(Screen::Alarm);
    app.toggle_alarm(id)
        .ok_or_else(|| anyhow!("no alarm with id '{id}'"))
}

pub fn run_timer(app: &mut ClockApp, json: bool) -> Result<()> {
    app.select_screen(Screen::Timer);
    app.timer_start_pause();
    print_timer(app, json);

    let origin = Instant::now();
    loop {
        let Some(deadline) = app.next_deadline() else {
            break;
        };
        sleep_until(origin + deadline);
        let outcome = app.advance(origin.elapsed())?;
        print_timer(app, json);
        if outcome.timer_expired {
            break;
        }
    }

    let expired = app
        .timer()
        .is_some_and(|timer| timer.state() == TimerState::Expired);
    if !json && expired {
        println!("Timer expired");
    }
    Ok(())
}

fn print_timer(app: &ClockApp, json: bool) {
    let Some(timer) = app.timer() else {
        return;
    };
    if json {
        println!(
            "{}",
            serde_json::json!({
                "remaining": timer.display(),
                "remaining_secs": timer.remaining_secs(),
                "state": format!("{:?}", timer.state()),
            })
        );
    } else {
        println!("{}", timer.display());
    }
}

pub fn run_stopwatch(app: &mut ClockApp, run_ms: u64, json: bool) -> Result<()> {
    app.select_screen(Screen::Stopwatch);
    app.stopwatch_start_pause();

    let origin = Instant::now();
    while app
        .stopwatch()
        .is_some_and(|stopwatch| stopwatch.elapsed_ms() < run_ms)
    {
        let Some(deadline) = app.next_deadline() else {
            break;
        };
        sleep_until(origin + deadline);
        app.advance(origin.elapsed())?;
    }
    app.stopwatch_start_pause();

    let Some(stopwatch) = app.stopwatch() else {
        bail!("stopwatch screen is not active");
    };
    if json {
        println!(
            "{}",
            serde_json::json!({
                "display": stopwatch.display(),
                "elapsed_ms": stopwatch.elapsed_ms(),
            })
        );
    } else {
        println!("{}", stopwatch.display());
    }
    Ok(())
}

pub fn parse_timer_secs(token: &str) -> Result<u64> {
    let duration = parse_duration_token(token)?;
    if duration.num_milliseconds() % 1000 != 0 {
        bail!("timer duration must be a whole number of seconds");
    }
    Ok(duration.num_seconds() as u64)
}

pub fn parse_run_ms(token: &str) -> Result<u64> {
    Ok(parse_duration_token(token)?.num_milliseconds() as u64)
}

fn parse_duration_token(token: &str) -> Result<TimeDelta> {
    let token = token.trim();
    let (raw, unit): (&str, fn(i64) -> Option<TimeDelta>) =
        if let Some(raw) = token.strip_suffix("ms") {
            (raw, TimeDelta::try_milliseconds)
        } else if let Some(raw) = token.strip_suffix('s') {
            (raw, TimeDelta::try_seconds)
        } else if let Some(raw) = token.strip_suffix('m') {
            (raw, TimeDelta::try_minutes)
        } else if let Some(raw) = token.strip_suffix('h') {
            (raw, TimeDelta::try_hours)
        } else {
            (token, TimeDelta::try_seconds)
        };
    let value: i64 = raw
        .parse()
        .map_err(|_| anyhow!("invalid duration '{token}', expected e.g. 90, 90s, 5m, 500ms"))?;
    if value <= 0 {
        bail!("duration must be > 0");
    }
    unit(value).ok_or_else(|| anyhow!("duration out of range: '{token}'"))
}

fn parse_dial_time(input: &str) -> Result<(u32, u32)> {
    let (hour_text, minute_text) = input
        .trim()
        .split_once(':')
        .ok_or_else(|| anyhow!("invalid time '{input}', expected H:MM"))?;
    let hour: u32 = hour_text
        .parse()
        .map_err(|_| anyhow!("invalid hour in '{input}'"))?;
    let minute: u32 = minute_text
        .parse()
        .map_err(|_| anyhow!("invalid minute in '{input}'"))?;
    if !(1..=12).contains(&hour) {
        bail!("hour must be between 1 and 12, got {hour}");
    }
    if minute > 59 {
        bail!("minute must be between 0 and 59, got {minute}");
    }
    Ok((hour, minute))
}
