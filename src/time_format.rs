use std::fmt::Display;

use chrono::{DateTime, Locale, Offset, TimeZone, Timelike};
use serde::Serialize;

use crate::alarm::model::Period;

const MONTH_FIRST_DATE: &str = "%A, %B %-d";
const DAY_FIRST_DATE: &str = "%A %-d %B";
const GERMAN_DATE: &str = "%A, %-d. %B";
const IBERIAN_DATE: &str = "%A, %-d de %B";
const CJK_DATE: &str = "%-m月%-d日%A";
const KOREAN_DATE: &str = "%-m월 %-d일 %A";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TimeDisplayMode {
    Hour24,
    Hour12,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ClockFace {
    pub display_hour: u32,
    pub minute_text: String,
    pub period: Period,
}

// Degrees clockwise from twelve o'clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HandAngles {
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
}

pub fn format_clock<T: Timelike>(now: &T) -> ClockFace {
    let hour = now.hour();
    let display_hour = if hour % 12 == 0 { 12 } else { hour % 12 };
    ClockFace {
        display_hour,
        minute_text: format!("{:02}", now.minute()),
        period: Period::from_hour24(hour),
    }
}

pub fn hand_angles<T: Timelike>(now: &T) -> HandAngles {
    let hours = f64::from(now.hour() % 12);
    let minutes = f64::from(now.minute());
    let seconds = f64::from(now.second());

    HandAngles {
        hours: hours * 30.0 + minutes * 0.5 + seconds * (0.5 / 60.0),
        minutes: minutes * 6.0 + seconds * 0.1,
        seconds: seconds * 6.0,
    }
}

pub fn format_full_date<Tz>(now: &DateTime<Tz>, locale: Locale) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format_localized(full_date_pattern(locale), locale).to_string()
}

fn full_date_pattern(locale: Locale) -> &'static str {
    match locale {
        Locale::en_US | Locale::en_CA | Locale::en_PH => MONTH_FIRST_DATE,
        Locale::de_DE | Locale::de_AT | Locale::de_CH => GERMAN_DATE,
        Locale::es_ES | Locale::es_MX | Locale::pt_BR | Locale::pt_PT => IBERIAN_DATE,
        Locale::ja_JP | Locale::zh_CN => CJK_DATE,
        Locale::ko_KR => KOREAN_DATE,
        _ => DAY_FIRST_DATE,
    }
}

pub fn format_utc_offset<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    let offset_secs = now.offset().fix().local_minus_utc();
    let sign = if offset_secs >= 0 { '+' } else { '-' };
    let offset_minutes = offset_secs.unsigned_abs() / 60;
    format!(
        "UTC{sign}{:02}:{:02}",
        offset_minutes / 60,
        offset_minutes % 60
    )
}

pub fn format_digital<T: Timelike>(now: &T, mode: TimeDisplayMode) -> String {
    match mode {
        TimeDisplayMode::Hour24 => format!("{:02}:{:02}", now.hour(), now.minute()),
        TimeDisplayMode::Hour12 => {
            let face = format_clock(now);
            format!("{}:{} {}", face.display_hour, face.minute_text, face.period)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockReading {
    pub iso_local: String,
    pub display_hour: u32,
    pub minute_text: String,
    pub period: Period,
    pub digital: String,
    pub angles: HandAngles,
    pub date: String,
    pub utc_offset: String,
}

impl ClockReading {
    pub fn at<Tz>(now: &DateTime<Tz>, locale: Locale, mode: TimeDisplayMode) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let face = format_clock(now);
        Self {
            iso_local: now.naive_local().format("%Y-%m-%dT%H:%M:%S").to_string(),
            display_hour: face.display_hour,
            minute_text: face.minute_text,
            period: face.period,
            digital: format_digital(now, mode),
            angles: hand_angles(now),
            date: format_full_date(now, locale),
            utc_offset: format_utc_offset(now),
        }
    }
}
