use serde::{Deserialize, Serialize};

/// Trip bar colours, cycled by start-date order.
pub const DEFAULT_TRIP_COLORS: [&str; 7] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEEAD", "#D4A5A5", "#9B59B6",
];

/// Non-empty, ordered list of colours.
///
/// Colours are only stable within one layering pass: adding a trip that starts
/// earlier than the others shifts every later trip's colour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Palette(Vec<String>);

impl Palette {
    /// Returns `None` for an empty colour list.
    pub fn new(colors: Vec<String>) -> Option<Self> {
        let colors: Vec<String> = colors
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        (!colors.is_empty()).then_some(Self(colors))
    }

    pub fn color_for(&self, index: usize) -> &str {
        &self.0[index % self.0.len()]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(DEFAULT_TRIP_COLORS.iter().map(|c| c.to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for Palette {
    type Error = String;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Palette::new(value).ok_or_else(|| "palette must contain at least one colour".to_string())
    }
}

impl From<Palette> for Vec<String> {
    fn from(value: Palette) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_colours() {
        let palette = Palette::default();
        assert_eq!(palette.color_for(0), "#FF6B6B");
        assert_eq!(palette.color_for(7), "#FF6B6B");
        assert_eq!(palette.color_for(9), "#45B7D1");
    }

    #[test]
    fn rejects_empty_palettes() {
        assert!(Palette::new(vec![" ".into()]).is_none());
        assert!(serde_json::from_str::<Palette>("[]").is_err());
    }
}
