use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::common::{Identifiable, NamedEntity};
use crate::errors::ValidationError;

const TIME_FORMAT: &str = "%H:%M";

/// Wall-clock time within a single day, serialized as `HH:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        // chrono accepts single-digit hours; the stored format is strictly two digits.
        if trimmed.len() != 5 {
            return Err(ValidationError::InvalidTime(raw.to_string()));
        }
        NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidTime(raw.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

/// A timed entry on one day of a trip. Items may overlap each other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleItem {
    pub id: Uuid,
    pub day_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub time: TimeOfDay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Identifiable for ScheduleItem {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for ScheduleItem {
    fn name(&self) -> &str {
        &self.title
    }
}

/// Caller-supplied fields for a new schedule item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewScheduleItem {
    pub title: String,
    pub time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewScheduleItem {
    pub fn new(title: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            time: time.into(),
            ..Self::default()
        }
    }

    pub fn ending_at(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Validates the input and builds an item attached to `day_id`.
    pub fn build(self, day_id: Uuid) -> Result<ScheduleItem, ValidationError> {
        let title = normalized_title(&self.title)?;
        let time: TimeOfDay = self.time.parse()?;
        let end_time = self
            .end_time
            .as_deref()
            .map(str::parse::<TimeOfDay>)
            .transpose()?;
        check_time_order(time, end_time)?;
        Ok(ScheduleItem {
            id: Uuid::new_v4(),
            day_id,
            title,
            description: non_blank(self.description),
            time,
            end_time,
            color: non_blank(self.color),
            location: non_blank(self.location),
        })
    }
}

/// Partial update for an existing schedule item. `None` leaves a field as is;
/// `Some(None)` on an optional field clears it. In JSON an absent key leaves
/// the field alone and an explicit `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Option<String>>,
}

/// Only runs for keys present in the input, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ScheduleItemPatch {
    /// Applies the patch to a copy of `item`, so a rejected patch leaves it untouched.
    pub fn apply_to(self, item: &ScheduleItem) -> Result<ScheduleItem, ValidationError> {
        let mut updated = item.clone();
        if let Some(title) = self.title {
            updated.title = normalized_title(&title)?;
        }
        if let Some(time) = self.time {
            updated.time = time.parse()?;
        }
        if let Some(end_time) = self.end_time {
            updated.end_time = end_time.as_deref().map(str::parse).transpose()?;
        }
        if let Some(description) = self.description {
            updated.description = non_blank(description);
        }
        if let Some(color) = self.color {
            updated.color = non_blank(color);
        }
        if let Some(location) = self.location {
            updated.location = non_blank(location);
        }
        check_time_order(updated.time, updated.end_time)?;
        Ok(updated)
    }
}

fn normalized_title(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn check_time_order(start: TimeOfDay, end: Option<TimeOfDay>) -> Result<(), ValidationError> {
    match end {
        Some(end) if end <= start => Err(ValidationError::EndBeforeStart {
            start: start.to_string(),
            end: end.to_string(),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_twenty_four_hour_times() {
        let time: TimeOfDay = "07:05".parse().unwrap();
        assert_eq!(time.to_string(), "07:05");
        assert_eq!(time, TimeOfDay::new(7, 5).unwrap());
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("7:05".parse::<TimeOfDay>().is_err());
        assert!("noon".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let time = TimeOfDay::new(18, 30).unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"18:30\"");
        let parsed: TimeOfDay = serde_json::from_str("\"18:30\"").unwrap();
        assert_eq!(parsed, time);
        assert!(serde_json::from_str::<TimeOfDay>("\"31:00\"").is_err());
    }

    #[test]
    fn build_rejects_blank_title_and_inverted_times() {
        let day = Uuid::new_v4();
        let err = NewScheduleItem::new("   ", "09:00").build(day).unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);

        let err = NewScheduleItem::new("Museum", "14:00")
            .ending_at("13:00")
            .build(day)
            .unwrap_err();
        assert!(matches!(err, ValidationError::EndBeforeStart { .. }));

        let err = NewScheduleItem::new("Museum", "14:00")
            .ending_at("14:00")
            .build(day)
            .unwrap_err();
        assert!(matches!(err, ValidationError::EndBeforeStart { .. }));
    }

    #[test]
    fn build_trims_and_drops_blank_optionals() {
        let item = NewScheduleItem::new("  Ferry  ", "10:15")
            .with_description("  ")
            .with_color("#45B7D1")
            .build(Uuid::new_v4())
            .unwrap();
        assert_eq!(item.title, "Ferry");
        assert!(item.description.is_none());
        assert_eq!(item.color.as_deref(), Some("#45B7D1"));
    }

    #[test]
    fn patch_validates_against_merged_times() {
        let item = NewScheduleItem::new("Dinner", "18:00")
            .ending_at("20:00")
            .build(Uuid::new_v4())
            .unwrap();
        let patch = ScheduleItemPatch {
            time: Some("21:00".into()),
            ..Default::default()
        };
        assert!(patch.apply_to(&item).is_err());

        let patch = ScheduleItemPatch {
            time: Some("21:00".into()),
            end_time: Some(None),
            ..Default::default()
        };
        let updated = patch.apply_to(&item).unwrap();
        assert_eq!(updated.time.to_string(), "21:00");
        assert!(updated.end_time.is_none());
    }

    #[test]
    fn json_null_clears_and_missing_key_keeps() {
        let item = NewScheduleItem::new("Hike", "07:00")
            .ending_at("11:00")
            .with_description("Bring water")
            .with_location("Hallasan")
            .build(Uuid::new_v4())
            .unwrap();

        let patch: ScheduleItemPatch =
            serde_json::from_str(r#"{"end_time":null,"description":null}"#).unwrap();
        assert_eq!(patch.end_time, Some(None));
        assert!(patch.location.is_none());
        let updated = patch.apply_to(&item).unwrap();
        assert!(updated.end_time.is_none());
        assert!(updated.description.is_none());
        assert_eq!(updated.location.as_deref(), Some("Hallasan"));

        let patch: ScheduleItemPatch = serde_json::from_str(r##"{"color":"#FF6B6B"}"##).unwrap();
        assert_eq!(patch.color, Some(Some("#FF6B6B".into())));
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r##"{"color":"#FF6B6B"}"##);
    }
}
