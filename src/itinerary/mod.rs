//! Trips, their days and schedules, and the date-interval helpers they share.

pub mod book;
pub mod date_range;
pub mod day;
pub mod schedule;
pub mod trip;

pub use book::{TripBook, TripCommand};
pub use date_range::{DateRange, Days};
pub use day::Day;
pub use schedule::{NewScheduleItem, ScheduleItem, ScheduleItemPatch, TimeOfDay};
pub use trip::{ChecklistItem, Trip};
