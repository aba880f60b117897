pub mod common;

pub use common::{Identifiable, NamedEntity, Spanning};
