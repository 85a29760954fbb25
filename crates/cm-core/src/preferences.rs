//! Cooking preferences selected for the current session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cuisine choices offered by the preferences page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cuisine {
    #[default]
    Any,
    Italian,
    Chinese,
    Japanese,
    Indian,
    Mexican,
    French,
    Thai,
    Korean,
}

impl Cuisine {
    pub const ALL: [Cuisine; 9] = [
        Cuisine::Any,
        Cuisine::Italian,
        Cuisine::Chinese,
        Cuisine::Japanese,
        Cuisine::Indian,
        Cuisine::Mexican,
        Cuisine::French,
        Cuisine::Thai,
        Cuisine::Korean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cuisine::Any => "any",
            Cuisine::Italian => "italian",
            Cuisine::Chinese => "chinese",
            Cuisine::Japanese => "japanese",
            Cuisine::Indian => "indian",
            Cuisine::Mexican => "mexican",
            Cuisine::French => "french",
            Cuisine::Thai => "thai",
            Cuisine::Korean => "korean",
        }
    }

    /// Parse a cuisine tag, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spice level in `[0, 100]`.
///
/// Out-of-range values are clamped on construction and on deserialization,
/// so a stored `SpiceLevel` is always within bounds. Slider values arrive as
/// JSON numbers and may be fractional (`50.0`); they are rounded first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "u8")]
pub struct SpiceLevel(u8);

impl SpiceLevel {
    pub const MAX: u8 = 100;

    pub fn new(level: i64) -> Self {
        Self(level.clamp(0, Self::MAX as i64) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn tier(&self) -> SpiceTier {
        match self.0 {
            0 => SpiceTier::NotSpicy,
            1..=25 => SpiceTier::Mild,
            26..=50 => SpiceTier::Medium,
            51..=75 => SpiceTier::Spicy,
            _ => SpiceTier::VerySpicy,
        }
    }
}

impl From<i64> for SpiceLevel {
    fn from(level: i64) -> Self {
        Self::new(level)
    }
}

impl From<f64> for SpiceLevel {
    /// NaN maps to 0.
    fn from(level: f64) -> Self {
        Self::new(level.round() as i64)
    }
}

impl From<SpiceLevel> for u8 {
    fn from(level: SpiceLevel) -> Self {
        level.0
    }
}

/// Display bucket for a [`SpiceLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiceTier {
    NotSpicy,
    Mild,
    Medium,
    Spicy,
    VerySpicy,
}

impl SpiceTier {
    pub fn label(&self) -> &'static str {
        match self {
            SpiceTier::NotSpicy => "Not spicy",
            SpiceTier::Mild => "Mild",
            SpiceTier::Medium => "Medium",
            SpiceTier::Spicy => "Spicy",
            SpiceTier::VerySpicy => "Very spicy",
        }
    }
}

/// The four independent cooking-method switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceToggle {
    Traditional,
    QuickCook,
    Beginner,
    MicrowaveOnly,
}

/// Session preferences. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub traditional: bool,
    #[serde(default)]
    pub quick_cook: bool,
    #[serde(default)]
    pub beginner: bool,
    #[serde(default)]
    pub microwave_only: bool,
    #[serde(default)]
    pub spice_level: SpiceLevel,
    #[serde(default)]
    pub cuisine: Cuisine,
    #[serde(default)]
    pub custom_cuisine: String,
}

impl Preferences {
    /// Return a copy with one switch flipped.
    pub fn toggled(&self, toggle: PreferenceToggle) -> Self {
        let mut next = self.clone();
        let flag = match toggle {
            PreferenceToggle::Traditional => &mut next.traditional,
            PreferenceToggle::QuickCook => &mut next.quick_cook,
            PreferenceToggle::Beginner => &mut next.beginner,
            PreferenceToggle::MicrowaveOnly => &mut next.microwave_only,
        };
        *flag = !*flag;
        next
    }

    pub fn is_enabled(&self, toggle: PreferenceToggle) -> bool {
        match toggle {
            PreferenceToggle::Traditional => self.traditional,
            PreferenceToggle::QuickCook => self.quick_cook,
            PreferenceToggle::Beginner => self.beginner,
            PreferenceToggle::MicrowaveOnly => self.microwave_only,
        }
    }

    pub fn has_custom_cuisine(&self) -> bool {
        !self.custom_cuisine.trim().is_empty()
    }

    /// Whether `cuisine` is shown as the active choice.
    ///
    /// A non-blank custom cuisine hides the enumerated selection.
    pub fn is_cuisine_active(&self, cuisine: Cuisine) -> bool {
        !self.has_custom_cuisine() && self.cuisine == cuisine
    }

    /// The cuisine label shown to the user.
    pub fn effective_cuisine(&self) -> String {
        if self.has_custom_cuisine() {
            self.custom_cuisine.trim().to_string()
        } else {
            self.cuisine.as_str().to_string()
        }
    }
}
