#[cfg(test)]
use std::cell::Cell;
use std::time::Instant;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};

pub trait TimeSource {
    fn now(&self) -> Result<DateTime<Local>>;
    fn label(&self) -> &'static str;
}

pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Result<DateTime<Local>> {
        Ok(Local::now())
    }

    fn label(&self) -> &'static str {
        "SYSTEM"
    }
}

pub struct AnchoredTimeSource {
    wall_anchor: DateTime<Local>,
    monotonic_anchor: Instant,
}

impl AnchoredTimeSource {
    pub fn new(wall_anchor: DateTime<Local>) -> Self {
        Self {
            wall_anchor,
            monotonic_anchor: Instant::now(),
        }
    }
}

impl TimeSource for AnchoredTimeSource {
    fn now(&self) -> Result<DateTime<Local>> {
        let elapsed = chrono::Duration::from_std(self.monotonic_anchor.elapsed())?;
        self.wall_anchor
            .checked_add_signed(elapsed)
            .ok_or_else(|| anyhow!("anchored time overflowed"))
    }

    fn label(&self) -> &'static str {
        "ANCHORED"
    }
}

#[cfg(test)]
pub struct FixedTimeSource {
    at: Cell<DateTime<Local>>,
}

#[cfg(test)]
impl FixedTimeSource {
    pub fn new(at: DateTime<Local>) -> Self {
        Self { at: Cell::new(at) }
    }

    pub fn set(&self, at: DateTime<Local>) {
        self.at.set(at);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.at.set(self.at.get() + by);
    }
}

#[cfg(test)]
impl TimeSource for FixedTimeSource {
    fn now(&self) -> Result<DateTime<Local>> {
        Ok(self.at.get())
    }

    fn label(&self) -> &'static str {
        "FIXED"
    }
}

pub struct SelectedTimeSource {
    pub source: Box<dyn TimeSource>,
    pub label: &'static str,
}

pub fn select_source(anchor: Option<NaiveDateTime>) -> Result<SelectedTimeSource> {
    let source: Box<dyn TimeSource> = match anchor {
        Some(naive) => {
            let resolved = resolve_local_datetime(&Local, naive)
                .ok_or_else(|| anyhow!("local time {naive} does not exist in this timezone"))?;
            Box::new(AnchoredTimeSource::new(resolved))
        }
        None => Box::new(SystemTimeSource),
    };
    let label = source.label();
    Ok(SelectedTimeSource { source, label })
}

pub fn resolve_local_datetime<Tz: TimeZone>(
    timezone: &Tz,
    naive: NaiveDateTime,
) -> Option<DateTime<Tz>> {
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(first, _second) => Some(first),
        LocalResult::None => None,
    }
}

pub fn parse_local_datetime(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .map_err(|_| anyhow!("invalid datetime '{input}', expected YYYY-MM-DDTHH:MM[:SS]"))
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use chrono::{NaiveDate, NaiveTime, Timelike};
    use chrono_tz::America::New_York;

    use super::*;

    fn naive(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2026, 2, 7).expect("date"),
            NaiveTime::from_hms_opt(hour, minute, 0).expect("time"),
        )
    }

    #[test]
    fn anchored_source_starts_at_anchor_and_moves_forward() {
        let anchor = resolve_local_datetime(&Local, naive(14, 2)).expect("resolvable");
        let source = AnchoredTimeSource::new(anchor);
        let first = source.now().expect("first sample");
        thread::sleep(Duration::from_millis(2));
        let second = source.now().expect("second sample");
        assert!(first >= anchor);
        assert!(second >= first);
        assert_eq!(first.hour(), 14);
    }

    #[test]
    fn fixed_source_only_moves_when_told() {
        let start = resolve_local_datetime(&Local, naive(8, 0)).expect("resolvable");
        let source = FixedTimeSource::new(start);
        assert_eq!(source.now().expect("now"), start);
        source.advance(chrono::Duration::seconds(90));
        assert_eq!(source.now().expect("now").minute(), 1);
        source.set(start);
        assert_eq!(source.now().expect("now"), start);
    }

    #[test]
    fn select_source_uses_system_clock_without_anchor() {
        let selected = select_source(None).expect("system source");
        assert_eq!(selected.label, "SYSTEM");
        let anchored = select_source(Some(naive(6, 30))).expect("anchored source");
        assert_eq!(anchored.label, "ANCHORED");
    }

    #[test]
    fn spring_forward_gap_does_not_resolve() {
        let gap = NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2026, 3, 8).expect("date"),
            NaiveTime::from_hms_opt(2, 30, 0).expect("time"),
        );
        assert!(resolve_local_datetime(&New_York, gap).is_none());
    }

    #[test]
    fn parses_iso_and_space_variants() {
        assert!(parse_local_datetime("2026-02-07T07:30:00").is_ok());
        assert!(parse_local_datetime("2026-02-07 07:30:00").is_ok());
        assert!(parse_local_datetime("2026-02-07T07:30").is_ok());
        let err = parse_local_datetime("tomorrow").expect_err("not a datetime");
        assert!(err.to_string().contains("invalid datetime"));
    }
}
