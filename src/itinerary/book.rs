//! The trip collection and every mutation the itinerary screens perform on it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CoreError, CoreResult, ValidationError};

use super::date_range::DateRange;
use super::day::Day;
use super::schedule::{NewScheduleItem, ScheduleItemPatch};
use super::trip::{checklist_text, ChecklistItem, Trip};

/// Ordered collection of trips. Order is insertion order and is significant for
/// layering tie-breaks and date-tap routing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TripBook {
    trips: Vec<Trip>,
}

impl TripBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_trips(trips: Vec<Trip>) -> Self {
        Self { trips }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn into_trips(self) -> Vec<Trip> {
        self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn trip(&self, id: Uuid) -> Option<&Trip> {
        self.trips.iter().find(|trip| trip.id == id)
    }

    fn trip_mut(&mut self, id: Uuid) -> CoreResult<&mut Trip> {
        self.trips
            .iter_mut()
            .find(|trip| trip.id == id)
            .ok_or(CoreError::TripNotFound(id))
    }

    /// First trip (in collection order) with a day on `date`, and that day.
    pub fn locate(&self, date: NaiveDate) -> Option<(&Trip, &Day)> {
        self.trips
            .iter()
            .find_map(|trip| trip.day_on(date).map(|day| (trip, day)))
    }

    pub fn create_trip(
        &mut self,
        title: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<Uuid> {
        let range = DateRange::new(start, end)?;
        let trip = Trip::new(title, range)?;
        let id = trip.id;
        tracing::info!(trip = %id, %start, %end, "trip created");
        self.trips.push(trip);
        Ok(id)
    }

    pub fn rename_trip(&mut self, id: Uuid, title: &str) -> CoreResult<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        let trip = self.trip_mut(id)?;
        trip.title = title.to_string();
        trip.touch();
        Ok(())
    }

    pub fn reschedule_trip(&mut self, id: Uuid, start: NaiveDate, end: NaiveDate) -> CoreResult<()> {
        let range = DateRange::new(start, end)?;
        self.trip_mut(id)?.reschedule(range);
        Ok(())
    }

    pub fn set_cover_image(&mut self, id: Uuid, uri: Option<String>) -> CoreResult<()> {
        let trip = self.trip_mut(id)?;
        trip.cover_image_uri = super::schedule::non_blank(uri);
        trip.touch();
        Ok(())
    }

    /// Removes the trip and its days. Unknown ids are a no-op.
    pub fn delete_trip(&mut self, id: Uuid) -> Option<Trip> {
        let index = self.trips.iter().position(|trip| trip.id == id)?;
        tracing::info!(trip = %id, "trip deleted");
        Some(self.trips.remove(index))
    }

    pub fn add_schedule_item(
        &mut self,
        trip_id: Uuid,
        day_id: Uuid,
        input: NewScheduleItem,
    ) -> CoreResult<Uuid> {
        let item = input.build(day_id)?;
        let id = item.id;
        let trip = self.trip_mut(trip_id)?;
        let day = trip.day_mut(day_id).ok_or(CoreError::DayNotFound(day_id))?;
        day.schedules.push(item);
        trip.touch();
        tracing::debug!(trip = %trip_id, day = %day_id, item = %id, "schedule item added");
        Ok(id)
    }

    pub fn update_schedule_item(
        &mut self,
        trip_id: Uuid,
        day_id: Uuid,
        item_id: Uuid,
        patch: ScheduleItemPatch,
    ) -> CoreResult<()> {
        let trip = self.trip_mut(trip_id)?;
        let day = trip.day_mut(day_id).ok_or(CoreError::DayNotFound(day_id))?;
        let item = day
            .schedule_mut(item_id)
            .ok_or(CoreError::ScheduleItemNotFound(item_id))?;
        *item = patch.apply_to(item)?;
        trip.touch();
        Ok(())
    }

    /// Removes a schedule item. Returns `false` when nothing matched.
    pub fn remove_schedule_item(&mut self, trip_id: Uuid, day_id: Uuid, item_id: Uuid) -> bool {
        let Ok(trip) = self.trip_mut(trip_id) else {
            return false;
        };
        let Some(day) = trip.day_mut(day_id) else {
            return false;
        };
        let before = day.schedules.len();
        day.schedules.retain(|item| item.id != item_id);
        let removed = before != day.schedules.len();
        if removed {
            trip.touch();
        }
        removed
    }

    pub fn add_checklist_item(&mut self, trip_id: Uuid, text: &str) -> CoreResult<Uuid> {
        let item = ChecklistItem::new(trip_id, text)?;
        let id = item.id;
        let trip = self.trip_mut(trip_id)?;
        trip.checklist.push(item);
        trip.touch();
        Ok(id)
    }

    /// Flips the checked flag and returns the new value.
    pub fn toggle_checklist_item(&mut self, trip_id: Uuid, item_id: Uuid) -> CoreResult<bool> {
        let trip = self.trip_mut(trip_id)?;
        let item = trip
            .checklist
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(CoreError::ChecklistItemNotFound(item_id))?;
        item.is_checked = !item.is_checked;
        let checked = item.is_checked;
        trip.touch();
        Ok(checked)
    }

    pub fn update_checklist_item(
        &mut self,
        trip_id: Uuid,
        item_id: Uuid,
        text: &str,
    ) -> CoreResult<()> {
        let text = checklist_text(text)?;
        let trip = self.trip_mut(trip_id)?;
        let item = trip
            .checklist
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(CoreError::ChecklistItemNotFound(item_id))?;
        item.text = text;
        trip.touch();
        Ok(())
    }

    pub fn remove_checklist_item(&mut self, trip_id: Uuid, item_id: Uuid) -> bool {
        let Ok(trip) = self.trip_mut(trip_id) else {
            return false;
        };
        let before = trip.checklist.len();
        trip.checklist.retain(|item| item.id != item_id);
        let removed = before != trip.checklist.len();
        if removed {
            trip.touch();
        }
        removed
    }

    /// Pure reducer: returns the next snapshot, leaving `self` untouched.
    pub fn apply(&self, command: TripCommand) -> CoreResult<TripBook> {
        let mut next = self.clone();
        next.apply_in_place(command)?;
        Ok(next)
    }

    pub(crate) fn apply_in_place(&mut self, command: TripCommand) -> CoreResult<()> {
        match command {
            TripCommand::Create { title, start, end } => {
                self.create_trip(&title, start, end)?;
            }
            TripCommand::Rename { trip_id, title } => self.rename_trip(trip_id, &title)?,
            TripCommand::Reschedule {
                trip_id,
                start,
                end,
            } => self.reschedule_trip(trip_id, start, end)?,
            TripCommand::SetCoverImage { trip_id, uri } => self.set_cover_image(trip_id, uri)?,
            TripCommand::Delete { trip_id } => {
                self.delete_trip(trip_id);
            }
            TripCommand::AddScheduleItem {
                trip_id,
                day_id,
                item,
            } => {
                self.add_schedule_item(trip_id, day_id, item)?;
            }
            TripCommand::UpdateScheduleItem {
                trip_id,
                day_id,
                item_id,
                patch,
            } => self.update_schedule_item(trip_id, day_id, item_id, patch)?,
            TripCommand::RemoveScheduleItem {
                trip_id,
                day_id,
                item_id,
            } => {
                self.remove_schedule_item(trip_id, day_id, item_id);
            }
            TripCommand::AddChecklistItem { trip_id, text } => {
                self.add_checklist_item(trip_id, &text)?;
            }
            TripCommand::ToggleChecklistItem { trip_id, item_id } => {
                self.toggle_checklist_item(trip_id, item_id)?;
            }
            TripCommand::UpdateChecklistItem {
                trip_id,
                item_id,
                text,
            } => self.update_checklist_item(trip_id, item_id, &text)?,
            TripCommand::RemoveChecklistItem { trip_id, item_id } => {
                self.remove_checklist_item(trip_id, item_id);
            }
        }
        Ok(())
    }
}

/// A single user action against the trip collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TripCommand {
    Create {
        title: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    Rename {
        trip_id: Uuid,
        title: String,
    },
    Reschedule {
        trip_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    },
    SetCoverImage {
        trip_id: Uuid,
        uri: Option<String>,
    },
    Delete {
        trip_id: Uuid,
    },
    AddScheduleItem {
        trip_id: Uuid,
        day_id: Uuid,
        item: NewScheduleItem,
    },
    UpdateScheduleItem {
        trip_id: Uuid,
        day_id: Uuid,
        item_id: Uuid,
        patch: ScheduleItemPatch,
    },
    RemoveScheduleItem {
        trip_id: Uuid,
        day_id: Uuid,
        item_id: Uuid,
    },
    AddChecklistItem {
        trip_id: Uuid,
        text: String,
    },
    ToggleChecklistItem {
        trip_id: Uuid,
        item_id: Uuid,
    },
    UpdateChecklistItem {
        trip_id: Uuid,
        item_id: Uuid,
        text: String,
    },
    RemoveChecklistItem {
        trip_id: Uuid,
        item_id: Uuid,
    },
}
