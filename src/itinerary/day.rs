use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;

use super::schedule::ScheduleItem;

/// One calendar date of a trip. The trip id is a back-reference, not ownership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Day {
    pub id: Uuid,
    pub trip_id: Uuid,
    /// 1-based position within the trip, derived from the offset to the trip start.
    pub day_number: u32,
    pub date: NaiveDate,
    #[serde(default)]
    pub schedules: Vec<ScheduleItem>,
}

impl Day {
    pub fn new(trip_id: Uuid, day_number: u32, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            day_number,
            date,
            schedules: Vec::new(),
        }
    }

    pub fn schedule(&self, id: Uuid) -> Option<&ScheduleItem> {
        self.schedules.iter().find(|item| item.id == id)
    }

    pub(crate) fn schedule_mut(&mut self, id: Uuid) -> Option<&mut ScheduleItem> {
        self.schedules.iter_mut().find(|item| item.id == id)
    }

    /// Items ordered by start time; entries sharing a start keep insertion order.
    pub fn timeline(&self) -> Vec<&ScheduleItem> {
        let mut items: Vec<&ScheduleItem> = self.schedules.iter().collect();
        items.sort_by_key(|item| item.time);
        items
    }
}

impl Identifiable for Day {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::schedule::NewScheduleItem;

    #[test]
    fn timeline_sorts_by_start_and_keeps_ties_stable() {
        let mut day = Day::new(
            Uuid::new_v4(),
            1,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        );
        for (title, time) in [("Lunch", "12:00"), ("Walk", "08:30"), ("Market", "12:00")] {
            let item = NewScheduleItem::new(title, time).build(day.id).unwrap();
            day.schedules.push(item);
        }
        let titles: Vec<_> = day.timeline().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Walk", "Lunch", "Market"]);
    }
}
