use chrono::{DateTime, TimeZone};
use log::{debug, warn};

use crate::alarm::editor::{AlarmDraft, EditorMode, EditorSession, commit_draft};
use crate::alarm::model::{Alarm, compare_alarms, sort_alarms};
use crate::alarm::scheduler::next_template;

#[derive(Debug, Clone, Default)]
pub struct AlarmCollection {
    alarms: Vec<Alarm>,
    next_seq: u64,
}

impl AlarmCollection {
    pub fn new(alarms: Vec<Alarm>) -> Self {
        Self {
            alarms: sort_alarms(&alarms),
            next_seq: 1,
        }
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Alarm> {
        self.alarms.iter().find(|alarm| alarm.id == id)
    }

    pub fn toggle_active(&mut self, id: &str) -> Option<bool> {
        let slot = self.alarms.iter_mut().find(|alarm| alarm.id == id)?;
        *slot = slot.toggled_active();
        debug!("alarm {id} active={}", slot.active);
        Some(slot.active)
    }

    pub fn open_new<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> EditorSession {
        EditorSession::create(next_template(self.alarms.len(), &now.time()))
    }

    pub fn open_edit(&self, id: &str) -> Option<EditorSession> {
        self.get(id).map(EditorSession::edit)
    }

    // An edit whose id has vanished leaves the collection untouched.
    pub fn commit<Tz: TimeZone>(
        &mut self,
        draft: AlarmDraft,
        mode: EditorMode,
        now: &DateTime<Tz>,
    ) -> Alarm {
        let stamp = now.timestamp_millis();
        let seq = &mut self.next_seq;
        let alarm = commit_draft(draft, mode, || {
            let id = format!("alarm-{stamp}-{seq}");
            *seq += 1;
            id
        });

        match mode {
            EditorMode::Create => {
                debug!("created alarm {} at {}", alarm.id, alarm.time_text());
                self.alarms.push(alarm.clone());
            }
            EditorMode::Edit => match self.alarms.iter_mut().find(|slot| slot.id == alarm.id) {
                Some(slot) => {
                    debug!("updated alarm {} at {}", alarm.id, alarm.time_text());
                    *slot = alarm.clone();
                }
                None => warn!("edited alarm {} is no longer in the collection", alarm.id),
            },
        }
        self.alarms.sort_by(compare_alarms);
        alarm
    }

    pub fn save(&mut self, session: EditorSession, now: &DateTime<impl TimeZone>) -> Alarm {
        let (draft, mode) = session.into_parts();
        self.commit(draft, mode, now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone, Weekday};

    use super::*;
    use crate::alarm::model::{Period, seed_alarms};

    fn fixed_now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 2, 7, 14, 2, 0)
            .single()
            .expect("valid local time")
    }

    #[test]
    fn new_collection_is_sorted() {
        let mut alarms = seed_alarms();
        alarms.reverse();
        let collection = AlarmCollection::new(alarms);
        let ids = collection
            .alarms()
            .iter()
            .map(|a| a.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["alarm-1", "alarm-2", "alarm-3"]);
    }

    #[test]
    fn toggle_active_flips_one_alarm() {
        let mut collection = AlarmCollection::new(seed_alarms());
        assert_eq!(collection.toggle_active("alarm-3"), Some(true));
        assert!(collection.get("alarm-3").expect("present").active);
        assert!(collection.get("alarm-1").expect("present").active);
        assert_eq!(collection.toggle_active("missing"), None);
    }

    #[test]
    fn create_assigns_unique_ids_and_resorts() {
        let now = fixed_now();
        let mut collection = AlarmCollection::new(seed_alarms());

        let mut first = collection.open_new(&now);
        first.set_hour(6);
        first.set_minute(0);
        first.set_period(Period::Am);
        let created = collection.save(first, &now);

        let second = collection.open_new(&now);
        let created_again = collection.save(second, &now);

        assert_ne!(created.id, created_again.id);
        assert_eq!(collection.len(), 5);
        assert_eq!(collection.alarms()[0].id, created.id);
        assert_eq!(created.label, "New alarm 4");
        assert_eq!(created_again.label, "New alarm 5");
    }

    #[test]
    fn edit_replaces_in_place_and_keeps_id() {
        let now = fixed_now();
        let mut collection = AlarmCollection::new(seed_alarms());
        let mut session = collection.open_edit("alarm-3").expect("existing alarm");
        session.set_hour(5);
        session.set_period(Period::Am);
        session.set_label("   ");
        session.toggle_day(Weekday::Sat);
        let saved = collection.save(session, &now);

        assert_eq!(saved.id, "alarm-3");
        assert_eq!(saved.label, "Alarm");
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.alarms()[0].id, "alarm-3");
        assert_eq!(collection.alarms()[0].repeat_days, vec![Weekday::Sat]);
    }

    #[test]
    fn cancelled_edit_leaves_collection_untouched() {
        let collection = AlarmCollection::new(seed_alarms());
        let before = collection.alarms().to_vec();
        let mut session = collection.open_edit("alarm-1").expect("existing alarm");
        session.toggle_day(Weekday::Mon);
        drop(session);
        assert_eq!(collection.alarms(), before.as_slice());
        assert!(collection.open_edit("nope").is_none());
    }
}
