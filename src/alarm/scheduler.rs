use chrono::Timelike;

use crate::alarm::editor::AlarmDraft;
use crate::alarm::model::{MINUTES_PER_DAY, Period};

const TEMPLATE_STEP_MINUTES: u64 = 5;

// Proposals are not checked against existing alarms and may collide.
pub fn next_template<T: Timelike>(existing_count: usize, now: &T) -> AlarmDraft {
    let step = TEMPLATE_STEP_MINUTES;
    let day = u64::from(MINUTES_PER_DAY);
    let ordinal = (existing_count as u64).saturating_add(1);
    let total_minutes = u64::from(now.hour()) * 60 + u64::from(now.minute());
    let rounded = total_minutes.div_ceil(step) * step + (ordinal % day) * step;
    let wrapped = (rounded % day) as u32;

    let hours24 = wrapped / 60;
    let minute = wrapped % 60;
    let hour = (hours24 + 11) % 12 + 1;

    AlarmDraft {
        id: None,
        label: format!("New alarm {ordinal}"),
        repeat_days: Vec::new(),
        hour,
        minute,
        period: Period::from_hour24(hours24),
        active: true,
    }
}
