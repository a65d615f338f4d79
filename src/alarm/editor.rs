use chrono::Weekday;

use crate::alarm::model::{
    Alarm, DEFAULT_ALARM_LABEL, Period, adjust_hour_step, adjust_minute_step, toggle_repeat_day,
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EditorMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AlarmDraft {
    pub id: Option<String>,
    pub label: String,
    pub repeat_days: Vec<Weekday>,
    pub hour: u32,
    pub minute: u32,
    pub period: Period,
    pub active: bool,
}

impl AlarmDraft {
    pub fn from_alarm(alarm: &Alarm) -> Self {
        Self {
            id: Some(alarm.id.clone()),
            label: alarm.label.clone(),
            repeat_days: alarm.repeat_days.clone(),
            hour: alarm.hour,
            minute: alarm.minute,
            period: alarm.period,
            active: alarm.active,
        }
    }
}

pub fn commit_draft(
    draft: AlarmDraft,
    mode: EditorMode,
    fresh_id: impl FnOnce() -> String,
) -> Alarm {
    let trimmed = draft.label.trim();
    let label = if trimmed.is_empty() {
        DEFAULT_ALARM_LABEL.to_string()
    } else {
        trimmed.to_string()
    };
    let id = match (mode, draft.id) {
        (EditorMode::Edit, Some(id)) => id,
        _ => fresh_id(),
    };

    Alarm {
        id,
        label,
        repeat_days: draft.repeat_days,
        hour: draft.hour.clamp(1, 12),
        minute: draft.minute.min(59),
        period: draft.period,
        active: draft.active,
    }
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    mode: EditorMode,
    draft: AlarmDraft,
}

impl EditorSession {
    pub fn create(template: AlarmDraft) -> Self {
        Self {
            mode: EditorMode::Create,
            draft: AlarmDraft { id: None, ..template },
        }
    }

    pub fn edit(alarm: &Alarm) -> Self {
        Self {
            mode: EditorMode::Edit,
            draft: AlarmDraft::from_alarm(alarm),
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn draft(&self) -> &AlarmDraft {
        &self.draft
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            EditorMode::Create => "New alarm",
            EditorMode::Edit => "Edit alarm",
        }
    }

    pub fn step_hour(&mut self, delta: i32) {
        self.draft.hour = adjust_hour_step(self.draft.hour, delta);
    }

    pub fn step_minute(&mut self, delta: i32) {
        self.draft.minute = adjust_minute_step(self.draft.minute, delta);
    }

    pub fn set_hour(&mut self, hour: u32) {
        self.draft.hour = hour.clamp(1, 12);
    }

    pub fn set_minute(&mut self, minute: u32) {
        self.draft.minute = minute.min(59);
    }

    pub fn set_period(&mut self, period: Period) {
        self.draft.period = period;
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.draft.label = label.into();
    }

    pub fn set_active(&mut self, active: bool) {
        self.draft.active = active;
    }

    pub fn toggle_day(&mut self, day: Weekday) {
        self.draft.repeat_days = toggle_repeat_day(&self.draft.repeat_days, day);
    }

    pub fn into_parts(self) -> (AlarmDraft, EditorMode) {
        (self.draft, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::model::seed_alarms;

    fn blank_draft() -> AlarmDraft {
        AlarmDraft {
            id: None,
            label: "Coffee".to_string(),
            repeat_days: Vec::new(),
            hour: 9,
            minute: 0,
            period: Period::Am,
            active: true,
        }
    }

    #[test]
    fn whitespace_label_defaults_to_alarm() {
        let draft = AlarmDraft {
            label: "   ".to_string(),
            ..blank_draft()
        };
        let alarm = commit_draft(draft, EditorMode::Create, || "fresh".to_string());
        assert_eq!(alarm.label, "Alarm");
        assert_eq!(alarm.id, "fresh");
    }

    #[test]
    fn commit_trims_label_and_keeps_id_in_edit_mode() {
        let draft = AlarmDraft {
            id: Some("alarm-7".to_string()),
            label: "  Gym  ".to_string(),
            ..blank_draft()
        };
        let alarm = commit_draft(draft, EditorMode::Edit, || panic!("edit keeps its id"));
        assert_eq!(alarm.id, "alarm-7");
        assert_eq!(alarm.label, "Gym");
    }

    #[test]
    fn create_mode_ignores_any_draft_id() {
        let draft = AlarmDraft {
            id: Some("stale".to_string()),
            ..blank_draft()
        };
        let alarm = commit_draft(draft, EditorMode::Create, || "alarm-new".to_string());
        assert_eq!(alarm.id, "alarm-new");
    }

    #[test]
    fn editing_a_draft_never_touches_the_committed_alarm() {
        let committed = seed_alarms().remove(0);
        let before = committed.clone();
        let mut session = EditorSession::edit(&committed);
        session.toggle_day(committed.repeat_days[0]);
        session.toggle_day(chrono::Weekday::Sun);
        session.set_label("Changed");
        session.step_hour(3);
        session.set_active(false);

        assert_eq!(committed, before);
        assert_ne!(session.draft().repeat_days, committed.repeat_days);
        assert_eq!(session.title(), "Edit alarm");
    }

    #[test]
    fn session_mutators_wrap_and_clamp() {
        let mut session = EditorSession::create(blank_draft());
        assert_eq!(session.title(), "New alarm");
        session.set_hour(12);
        session.step_hour(1);
        assert_eq!(session.draft().hour, 1);
        session.set_minute(0);
        session.step_minute(-1);
        assert_eq!(session.draft().minute, 59);
        session.set_hour(40);
        assert_eq!(session.draft().hour, 12);
        session.set_period(Period::Pm);

        let (draft, mode) = session.into_parts();
        assert_eq!(mode, EditorMode::Create);
        assert_eq!(draft.period, Period::Pm);
        assert!(draft.id.is_none());
    }
}
