#![forbid(unsafe_code)]

//! Reminders with simple recurrence.
//!
//! A reminder fires on a date at a wall-clock time. Repeat rules project a
//! past anchor date forward to its next occurrence on or after today:
//!
//! - `daily` reminders next fire today;
//! - `weekly` ones advance in whole weeks from the anchor;
//! - `monthly` ones advance in whole months, with the day-of-month clamped
//!   when the target month is shorter than the anchor's.
//!
//! A non-repeating reminder whose date has passed has no next occurrence
//! and drops out of the upcoming list.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::json::{JsonFileStore, StoreError};

const REMINDERS_FILE: &str = "reminders.json";

/// How often a reminder recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

/// One reminder entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub event_name: String,
    /// Anchor date. For repeating reminders this is the first occurrence.
    pub date: NaiveDate,
    /// Wall-clock time as `HH:MM`, compared lexically for ordering.
    pub time: String,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Reminder {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        event_name: impl Into<String>,
        date: NaiveDate,
        time: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            event_name: event_name.into(),
            date,
            time: time.into(),
            repeat: Repeat::None,
            link: None,
            notes: None,
        }
    }

    /// The next date this reminder fires on or after `today`, if any.
    #[must_use]
    pub fn next_occurrence(&self, today: NaiveDate) -> Option<NaiveDate> {
        if self.date >= today {
            return Some(self.date);
        }
        match self.repeat {
            Repeat::None => None,
            Repeat::Daily => Some(today),
            Repeat::Weekly => {
                let weeks = (today - self.date).num_days() / 7;
                let candidate = self.date + chrono::Duration::weeks(weeks);
                Some(if candidate < today {
                    candidate + chrono::Duration::weeks(1)
                } else {
                    candidate
                })
            }
            Repeat::Monthly => {
                let months = (today.year() - self.date.year()) * 12
                    + (today.month() as i32 - self.date.month() as i32);
                let months = u32::try_from(months.max(0)).ok()?;
                let candidate = self.date.checked_add_months(Months::new(months))?;
                if candidate < today {
                    self.date.checked_add_months(Months::new(months + 1))
                } else {
                    Some(candidate)
                }
            }
        }
    }
}

/// The dashboard's upcoming list: reminders with a next occurrence on or
/// after `today`, ordered by that date then time, truncated to `limit`.
#[must_use]
pub fn upcoming(reminders: &[Reminder], today: NaiveDate, limit: usize) -> Vec<(NaiveDate, Reminder)> {
    let mut projected: Vec<(NaiveDate, Reminder)> = reminders
        .iter()
        .filter_map(|r| r.next_occurrence(today).map(|d| (d, r.clone())))
        .collect();
    projected.sort_by(|(da, a), (db, b)| da.cmp(db).then_with(|| a.time.cmp(&b.time)));
    projected.truncate(limit);
    projected
}

/// CRUD over `reminders.json`.
#[derive(Debug, Clone)]
pub struct ReminderStore {
    files: JsonFileStore,
}

impl ReminderStore {
    #[must_use]
    pub fn new(files: JsonFileStore) -> Self {
        Self { files }
    }

    pub fn load(&self) -> Result<Vec<Reminder>, StoreError> {
        self.files.load(REMINDERS_FILE)
    }

    pub fn save(&self, reminders: &[Reminder]) -> Result<(), StoreError> {
        self.files.save(REMINDERS_FILE, reminders)
    }

    /// Insert or replace a reminder by id, then persist.
    pub fn upsert(&self, reminder: Reminder) -> Result<Vec<Reminder>, StoreError> {
        let mut reminders = self.load()?;
        match reminders.iter_mut().find(|r| r.id == reminder.id) {
            Some(existing) => *existing = reminder,
            None => reminders.push(reminder),
        }
        self.save(&reminders)?;
        Ok(reminders)
    }

    /// Remove a reminder by id and persist.
    pub fn remove(&self, id: &str) -> Result<Vec<Reminder>, StoreError> {
        let mut reminders = self.load()?;
        reminders.retain(|r| r.id != id);
        self.save(&reminders)?;
        Ok(reminders)
    }
}
