use cm_core::{PreferenceToggle, Preferences};
use tracing::debug;

/// Cooking preferences for the current session.
///
/// Updates replace the whole object. Field bounds are carried by the types
/// (`SpiceLevel` is clamped, `Cuisine` is closed), so the store needs no
/// validation of its own.
#[derive(Debug, Clone, Default)]
pub struct PreferencesStore {
    current: Preferences,
}

impl PreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Preferences {
        &self.current
    }

    pub fn update(&mut self, preferences: Preferences) {
        if preferences != self.current {
            debug!(?preferences, "preferences updated");
        }
        self.current = preferences;
    }

    /// Read-modify-write helper for a single switch.
    pub fn toggle(&mut self, toggle: PreferenceToggle) {
        let next = self.current.toggled(toggle);
        self.update(next);
    }

    pub fn reset(&mut self) {
        self.current = Preferences::default();
    }
}
