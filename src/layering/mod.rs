//! Calendar layering: assigns each trip a fixed stacking lane so that trips
//! sharing a date never share a lane.
//!
//! Trips are processed in ascending start-date order (stable, so trips that
//! start on the same day keep their collection order). Each trip takes the
//! lowest lane that is free on every date it covers and keeps it for its whole
//! span. A lane, once given, is never revisited within the same computation.

pub mod palette;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Spanning;
use crate::itinerary::DateRange;

pub use palette::{Palette, DEFAULT_TRIP_COLORS};

/// One trip bar segment drawn on a single date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaneSlot {
    pub trip_id: Uuid,
    pub lane: usize,
    pub color: String,
    /// True only on the first covered date of the trip.
    pub is_range_start: bool,
    /// True only on the last covered date of the trip.
    pub is_range_end: bool,
}

/// The lane and colour a trip received for the whole of its span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripLane {
    pub trip_id: Uuid,
    pub lane: usize,
    pub color: String,
    pub range: DateRange,
}

/// Result of a layering pass.
///
/// Only dates covered by at least one trip have an entry; a missing date means
/// no trips, and [`CalendarLayout::slots_on`] returns an empty slice for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarLayout {
    days: BTreeMap<NaiveDate, Vec<LaneSlot>>,
    assignments: Vec<TripLane>,
}

impl CalendarLayout {
    /// Slots active on `date`, in processing order.
    pub fn slots_on(&self, date: NaiveDate) -> &[LaneSlot] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_covered(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn lane_of(&self, trip_id: Uuid) -> Option<usize> {
        self.assignment(trip_id).map(|assigned| assigned.lane)
    }

    pub fn assignment(&self, trip_id: Uuid) -> Option<&TripLane> {
        self.assignments
            .iter()
            .find(|assigned| assigned.trip_id == trip_id)
    }

    /// Per-trip assignments in start-date order.
    pub fn assignments(&self) -> &[TripLane] {
        &self.assignments
    }

    /// Covered dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Covered dates within `window`, e.g. the month currently on screen.
    pub fn within(
        &self,
        window: DateRange,
    ) -> impl Iterator<Item = (NaiveDate, &[LaneSlot])> + '_ {
        self.days
            .range(window.start()..=window.end())
            .map(|(date, slots)| (*date, slots.as_slice()))
    }

    /// Number of lanes in use, i.e. the height of the tallest stack.
    pub fn depth(&self) -> usize {
        self.assignments
            .iter()
            .map(|assigned| assigned.lane + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Lays out `trips` with the default trip palette.
pub fn compute_layout<T: Spanning>(trips: &[T]) -> CalendarLayout {
    compute_layout_with(trips, &Palette::default())
}

/// Lays out `trips`, colouring each by its position in start-date order.
///
/// Entries without a valid date range are skipped.
pub fn compute_layout_with<T: Spanning>(trips: &[T], palette: &Palette) -> CalendarLayout {
    let mut ordered: Vec<(Uuid, DateRange)> = trips
        .iter()
        .filter_map(|trip| match trip.span() {
            Some(range) => Some((trip.id(), range)),
            None => {
                tracing::warn!(trip = %trip.id(), "skipping trip with invalid date range");
                None
            }
        })
        .collect();
    // `sort_by_key` is stable: equal start dates keep insertion order.
    ordered.sort_by_key(|(_, range)| range.start());

    let mut occupied: HashMap<NaiveDate, BTreeSet<usize>> = HashMap::new();
    let mut layout = CalendarLayout::default();

    for (index, (trip_id, range)) in ordered.into_iter().enumerate() {
        let lane = lowest_free_lane(&occupied, range);
        let color = palette.color_for(index).to_string();
        tracing::debug!(trip = %trip_id, lane, %color, "lane assigned");

        for date in range.days() {
            occupied.entry(date).or_default().insert(lane);
            layout.days.entry(date).or_default().push(LaneSlot {
                trip_id,
                lane,
                color: color.clone(),
                is_range_start: date == range.start(),
                is_range_end: date == range.end(),
            });
        }
        layout.assignments.push(TripLane {
            trip_id,
            lane,
            color,
            range,
        });
    }

    layout
}

fn lowest_free_lane(occupied: &HashMap<NaiveDate, BTreeSet<usize>>, range: DateRange) -> usize {
    let mut lane = 0;
    // Terminates: a span touches finitely many lanes, so some lane is always free.
    while range.days().any(|date| {
        occupied
            .get(&date)
            .is_some_and(|lanes| lanes.contains(&lane))
    }) {
        lane += 1;
    }
    lane
}
