use uuid::Uuid;

use crate::itinerary::DateRange;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Anything that occupies an inclusive span of calendar dates.
///
/// `span` returns `None` when the stored dates do not form a valid range;
/// callers skip such entries instead of failing.
pub trait Spanning: Identifiable {
    fn span(&self) -> Option<DateRange>;
}
