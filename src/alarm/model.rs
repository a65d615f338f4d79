use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_ALARM_LABEL: &str = "Alarm";
pub const MINUTES_PER_DAY: u32 = 24 * 60;

const REPEAT_SEPARATOR: &str = " · ";
const ONE_TIME_LABEL: &str = "One-time alarm";

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseTokenError {
    #[error("invalid period '{0}', expected AM or PM")]
    Period(String),
    #[error("invalid weekday '{0}', expected one of Mon, Tue, Wed, Thu, Fri, Sat, Sun")]
    Weekday(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub enum Period {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Period {
    pub fn from_hour24(hour: u32) -> Self {
        if hour >= 12 { Period::Pm } else { Period::Am }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Am => "AM",
            Period::Pm => "PM",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParseTokenError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(Period::Am),
            "PM" => Ok(Period::Pm),
            _ => Err(ParseTokenError::Period(input.to_string())),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Alarm {
    pub id: String,
    pub label: String,
    pub repeat_days: Vec<Weekday>,
    pub hour: u32,
    pub minute: u32,
    pub period: Period,
    pub active: bool,
}

impl Alarm {
    pub fn sort_key(&self) -> u32 {
        sort_key(self)
    }

    pub fn toggled_active(&self) -> Alarm {
        Alarm {
            active: !self.active,
            ..self.clone()
        }
    }

    pub fn with_repeat_day_toggled(&self, day: Weekday) -> Alarm {
        Alarm {
            repeat_days: toggle_repeat_day(&self.repeat_days, day),
            ..self.clone()
        }
    }

    pub fn time_text(&self) -> String {
        format_alarm_time(self.hour, self.minute, self.period)
    }

    pub fn repeat_label(&self) -> String {
        repeat_label(&self.repeat_days)
    }
}

pub fn to_24_hour(hour: u32, period: Period) -> u32 {
    let normalized = hour % 12;
    match period {
        Period::Am => normalized,
        Period::Pm => normalized + 12,
    }
}

pub fn sort_key(alarm: &Alarm) -> u32 {
    to_24_hour(alarm.hour, alarm.period) * 60 + alarm.minute.min(59)
}

pub fn compare_alarms(a: &Alarm, b: &Alarm) -> Ordering {
    sort_key(a)
        .cmp(&sort_key(b))
        .then_with(|| compare_labels(&a.label, &b.label))
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn sort_alarms(alarms: &[Alarm]) -> Vec<Alarm> {
    let mut sorted = alarms.to_vec();
    sorted.sort_by(compare_alarms);
    sorted
}

// Days keep insertion order; they are never re-sorted into calendar order.
pub fn toggle_repeat_day(days: &[Weekday], day: Weekday) -> Vec<Weekday> {
    if days.contains(&day) {
        days.iter().copied().filter(|existing| *existing != day).collect()
    } else {
        let mut next = days.to_vec();
        next.push(day);
        next
    }
}

pub fn adjust_hour_step(hour: u32, delta: i32) -> u32 {
    let next = i64::from(hour) + i64::from(delta);
    if next < 1 {
        12
    } else if next > 12 {
        1
    } else {
        next as u32
    }
}

pub fn adjust_minute_step(minute: u32, delta: i32) -> u32 {
    (i64::from(minute) + i64::from(delta)).rem_euclid(60) as u32
}

pub fn format_alarm_time(hour: u32, minute: u32, period: Period) -> String {
    let safe_hour = hour.clamp(1, 12);
    let safe_minute = minute.min(59);
    format!("{safe_hour:02}:{safe_minute:02} {period}")
}

pub fn repeat_label(days: &[Weekday]) -> String {
    if days.is_empty() {
        return ONE_TIME_LABEL.to_string();
    }
    days.iter()
        .map(|day| weekday_to_token(*day))
        .collect::<Vec<_>>()
        .join(REPEAT_SEPARATOR)
}

pub fn parse_weekday_token(input: &str) -> Result<Weekday, ParseTokenError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "mon" => Ok(Weekday::Mon),
        "tue" => Ok(Weekday::Tue),
        "wed" => Ok(Weekday::Wed),
        "thu" => Ok(Weekday::Thu),
        "fri" => Ok(Weekday::Fri),
        "sat" => Ok(Weekday::Sat),
        "sun" => Ok(Weekday::Sun),
        _ => Err(ParseTokenError::Weekday(input.to_string())),
    }
}

pub fn weekday_to_token(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

pub fn seed_alarms() -> Vec<Alarm> {
    sort_alarms(&[
        Alarm {
            id: "alarm-1".to_string(),
            label: "Morning Run".to_string(),
            repeat_days: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
            hour: 7,
            minute: 0,
            period: Period::Am,
            active: true,
        },
        Alarm {
            id: "alarm-2".to_string(),
            label: "Daily Standup".to_string(),
            repeat_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            hour: 8,
            minute: 30,
            period: Period::Am,
            active: true,
        },
        Alarm {
            id: "alarm-3".to_string(),
            label: "Wind Down".to_string(),
            repeat_days: Vec::new(),
            hour: 10,
            minute: 0,
            period: Period::Pm,
            active: false,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarm(id: &str, label: &str, hour: u32, minute: u32, period: Period) -> Alarm {
        Alarm {
            id: id.to_string(),
            label: label.to_string(),
            repeat_days: Vec::new(),
            hour,
            minute,
            period,
            active: true,
        }
    }

    #[test]
    fn to_24_hour_handles_midnight_and_noon() {
        assert_eq!(to_24_hour(12, Period::Am), 0);
        assert_eq!(to_24_hour(12, Period::Pm), 12);
        assert_eq!(to_24_hour(1, Period::Am), 1);
        assert_eq!(to_24_hour(1, Period::Pm), 13);
        assert_eq!(to_24_hour(11, Period::Pm), 23);
    }

    #[test]
    fn to_24_hour_round_trips_every_hour_of_day() {
        for hour24 in 0..24 {
            let display_hour = if hour24 % 12 == 0 { 12 } else { hour24 % 12 };
            let period = Period::from_hour24(hour24);
            assert_eq!(to_24_hour(display_hour, period), hour24, "hour {hour24}");
        }
    }

    #[test]
    fn sorts_by_time_of_day_then_label() {
        let input = vec![
            alarm("c", "Wind Down", 10, 0, Period::Pm),
            alarm("b", "Standup", 8, 30, Period::Am),
            alarm("a", "Run", 7, 0, Period::Am),
        ];
        let sorted = sort_alarms(&input);
        let times = sorted.iter().map(Alarm::time_text).collect::<Vec<_>>();
        assert_eq!(times, vec!["07:00 AM", "08:30 AM", "10:00 PM"]);
        assert_eq!(input[0].id, "c");
    }

    #[test]
    fn ties_break_on_label_and_sorting_is_idempotent() {
        let input = vec![
            alarm("1", "Zebra", 6, 15, Period::Am),
            alarm("2", "Apple", 6, 15, Period::Am),
            alarm("3", "Apple", 6, 15, Period::Am),
            alarm("4", "Midnight", 12, 0, Period::Am),
        ];
        let once = sort_alarms(&input);
        let ids = once.iter().map(|a| a.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["4", "2", "3", "1"]);
        assert_eq!(sort_alarms(&once), once);
    }

    #[test]
    fn toggle_active_only_flips_active() {
        let original = alarm("x", "Nap", 3, 45, Period::Pm);
        let toggled = original.toggled_active();
        assert!(!toggled.active);
        assert_eq!(Alarm { active: true, ..toggled.clone() }, original);
        assert!(toggled.toggled_active().active);
    }

    #[test]
    fn ties_ignore_label_case_before_falling_back_to_bytes() {
        let input = vec![
            alarm("1", "Banana", 9, 0, Period::Am),
            alarm("2", "apple", 9, 0, Period::Am),
            alarm("3", "Apple", 9, 0, Period::Am),
        ];
        let ids = sort_alarms(&input)
            .iter()
            .map(|a| a.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn alarm_repeat_day_toggle_twice_restores_days_and_keeps_other_fields() {
        let original = Alarm {
            repeat_days: vec![Weekday::Tue, Weekday::Thu],
            ..alarm("keep-me", "Gym", 6, 40, Period::Am)
        };

        let added = original.with_repeat_day_toggled(Weekday::Sat);
        assert_eq!(added.repeat_days, vec![Weekday::Tue, Weekday::Thu, Weekday::Sat]);
        assert_eq!(
            Alarm {
                repeat_days: original.repeat_days.clone(),
                ..added.clone()
            },
            original
        );
        assert_eq!(added.with_repeat_day_toggled(Weekday::Sat), original);

        let removed = original.with_repeat_day_toggled(Weekday::Tue);
        assert_eq!(removed.repeat_days, vec![Weekday::Thu]);
        assert_eq!(removed.id, "keep-me");
        assert_eq!(
            removed.with_repeat_day_toggled(Weekday::Tue).repeat_days,
            vec![Weekday::Thu, Weekday::Tue]
        );
    }

    #[test]
    fn toggle_repeat_day_appends_and_removes_in_place() {
        let days = vec![Weekday::Wed, Weekday::Mon];
        let added = toggle_repeat_day(&days, Weekday::Sun);
        assert_eq!(added, vec![Weekday::Wed, Weekday::Mon, Weekday::Sun]);
        let restored = toggle_repeat_day(&added, Weekday::Sun);
        assert_eq!(restored, days);

        let removed = toggle_repeat_day(&days, Weekday::Wed);
        assert_eq!(removed, vec![Weekday::Mon]);
        assert_eq!(
            toggle_repeat_day(&removed, Weekday::Wed),
            vec![Weekday::Mon, Weekday::Wed]
        );
    }

    #[test]
    fn hour_step_wraps_between_one_and_twelve() {
        assert_eq!(adjust_hour_step(12, 1), 1);
        assert_eq!(adjust_hour_step(1, -1), 12);
        assert_eq!(adjust_hour_step(6, 1), 7);
        assert_eq!(adjust_hour_step(6, -1), 5);
    }

    #[test]
    fn minute_step_wraps_modulo_sixty() {
        assert_eq!(adjust_minute_step(0, -1), 59);
        assert_eq!(adjust_minute_step(59, 1), 0);
        assert_eq!(adjust_minute_step(30, -95), 55);
        assert_eq!(adjust_minute_step(10, 5), 15);
    }

    #[test]
    fn alarm_time_text_clamps_out_of_range_values() {
        assert_eq!(format_alarm_time(7, 5, Period::Am), "07:05 AM");
        assert_eq!(format_alarm_time(0, 75, Period::Pm), "01:59 PM");
        assert_eq!(format_alarm_time(19, 0, Period::Am), "12:00 AM");
    }

    #[test]
    fn repeat_label_joins_tokens_or_reports_one_time() {
        assert_eq!(repeat_label(&[]), "One-time alarm");
        assert_eq!(repeat_label(&[Weekday::Fri, Weekday::Mon]), "Fri · Mon");
    }

    #[test]
    fn parses_tokens_case_insensitively() {
        assert_eq!("pm".parse::<Period>(), Ok(Period::Pm));
        assert_eq!(" AM ".parse::<Period>(), Ok(Period::Am));
        assert!(matches!(
            "noon".parse::<Period>(),
            Err(ParseTokenError::Period(_))
        ));
        assert_eq!(parse_weekday_token("SAT"), Ok(Weekday::Sat));
        let err = parse_weekday_token("Funday").expect_err("unknown weekday");
        assert!(err.to_string().contains("invalid weekday 'Funday'"));
    }

    #[test]
    fn seed_alarms_are_sorted() {
        let seeds = seed_alarms();
        let labels = seeds.iter().map(|a| a.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["Morning Run", "Daily Standup", "Wind Down"]);
        assert!(!seeds[2].active);
    }
}
