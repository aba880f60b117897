use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Identifiable, NamedEntity, Spanning};
use crate::errors::ValidationError;

use super::date_range::DateRange;
use super::day::Day;

/// A dated trip with one [`Day`] per covered date and a packing checklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    pub id: Uuid,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_uri: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Creates a trip covering `range` with its days already generated.
    pub fn new(title: impl Into<String>, range: DateRange) -> Result<Self, ValidationError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let now = Utc::now();
        let mut trip = Self {
            id: Uuid::new_v4(),
            title,
            start_date: range.start(),
            end_date: range.end(),
            days: Vec::new(),
            checklist: Vec::new(),
            cover_image_uri: None,
            created_at: now,
            updated_at: now,
        };
        trip.days = range
            .days()
            .enumerate()
            .map(|(offset, date)| Day::new(trip.id, offset as u32 + 1, date))
            .collect();
        Ok(trip)
    }

    /// The validated date range, or `None` for corrupt stored dates.
    pub fn range(&self) -> Option<DateRange> {
        DateRange::new(self.start_date, self.end_date).ok()
    }

    pub fn day(&self, id: Uuid) -> Option<&Day> {
        self.days.iter().find(|day| day.id == id)
    }

    pub(crate) fn day_mut(&mut self, id: Uuid) -> Option<&mut Day> {
        self.days.iter_mut().find(|day| day.id == id)
    }

    pub fn day_on(&self, date: NaiveDate) -> Option<&Day> {
        self.days.iter().find(|day| day.date == date)
    }

    /// Moves the trip to `range`. Days whose date stays inside the new range keep
    /// their id and schedules; every day is renumbered from the new start.
    pub fn reschedule(&mut self, range: DateRange) {
        let mut existing: HashMap<NaiveDate, Day> =
            self.days.drain(..).map(|day| (day.date, day)).collect();
        let trip_id = self.id;
        self.start_date = range.start();
        self.end_date = range.end();
        self.days = range
            .days()
            .enumerate()
            .map(|(offset, date)| {
                let number = offset as u32 + 1;
                match existing.remove(&date) {
                    Some(mut day) => {
                        day.day_number = number;
                        day
                    }
                    None => Day::new(trip_id, number, date),
                }
            })
            .collect();
        if !existing.is_empty() {
            tracing::debug!(
                trip = %self.id,
                dropped = existing.len(),
                "days outside the new range were removed"
            );
        }
        self.touch();
    }

    /// Unchecked items first; order within each group is preserved.
    pub fn sorted_checklist(&self) -> Vec<&ChecklistItem> {
        let mut items: Vec<&ChecklistItem> = self.checklist.iter().collect();
        items.sort_by_key(|item| item.is_checked);
        items
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for Trip {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Trip {
    fn name(&self) -> &str {
        &self.title
    }
}

impl Spanning for Trip {
    fn span(&self) -> Option<DateRange> {
        self.range()
    }
}

/// Packing-list entry attached to a trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub text: String,
    #[serde(default)]
    pub is_checked: bool,
    pub created_at: DateTime<Utc>,
}

impl ChecklistItem {
    pub fn new(trip_id: Uuid, text: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            trip_id,
            text: checklist_text(text)?,
            is_checked: false,
            created_at: Utc::now(),
        })
    }
}

pub(crate) fn checklist_text(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyChecklistText);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn range(from: NaiveDate, to: NaiveDate) -> DateRange {
        DateRange::new(from, to).unwrap()
    }

    #[test]
    fn new_trip_generates_numbered_days() {
        let trip = Trip::new("Osaka", range(date(4, 28), date(5, 2))).unwrap();
        assert_eq!(trip.days.len(), 5);
        assert_eq!(trip.days[0].day_number, 1);
        assert_eq!(trip.days[0].date, date(4, 28));
        assert_eq!(trip.days[4].day_number, 5);
        assert_eq!(trip.days[4].date, date(5, 2));
        assert!(trip.days.iter().all(|day| day.trip_id == trip.id));
    }

    #[test]
    fn new_trip_requires_title() {
        let err = Trip::new(" ", DateRange::single(date(1, 1))).unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
    }

    #[test]
    fn reschedule_keeps_surviving_days_and_renumbers() {
        let mut trip = Trip::new("Jeju", range(date(6, 1), date(6, 4))).unwrap();
        let kept_id = trip.day_on(date(6, 3)).unwrap().id;

        trip.reschedule(range(date(6, 3), date(6, 6)));

        assert_eq!(trip.start_date, date(6, 3));
        assert_eq!(trip.days.len(), 4);
        let kept = trip.day_on(date(6, 3)).unwrap();
        assert_eq!(kept.id, kept_id);
        assert_eq!(kept.day_number, 1);
        assert!(trip.day_on(date(6, 1)).is_none());
        assert_eq!(trip.day_on(date(6, 6)).unwrap().day_number, 4);
    }

    #[test]
    fn checklist_sorts_unchecked_first() {
        let mut trip = Trip::new("Hanoi", DateRange::single(date(9, 1))).unwrap();
        for text in ["Passport", "Charger", "Adapter"] {
            trip.checklist.push(ChecklistItem::new(trip.id, text).unwrap());
        }
        trip.checklist[0].is_checked = true;
        let order: Vec<_> = trip.sorted_checklist().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(order, vec!["Charger", "Adapter", "Passport"]);
    }
}
