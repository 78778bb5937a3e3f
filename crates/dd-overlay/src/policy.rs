//! Overlay resolution defaults.

use dd_core::DrillError;
use dd_core::DrillResult;
use dd_nav::NavigationEvent;

pub const DEFAULT_MARKER_CLASS: &str = "obscures";

/// Which overlays count as obscuring, and which host events re-run resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayPolicy {
    pub marker_class: String,
    pub on_page_show: bool,
    pub on_hash_change: bool,
    pub on_pop_state: bool,
}

impl Default for OverlayPolicy {
    fn default() -> Self {
        Self {
            marker_class: DEFAULT_MARKER_CLASS.to_owned(),
            on_page_show: true,
            on_hash_change: true,
            on_pop_state: true,
        }
    }
}

impl OverlayPolicy {
    pub fn validate(&self) -> DrillResult<()> {
        if self.marker_class.is_empty()
            || self.marker_class.chars().any(char::is_whitespace)
        {
            return Err(DrillError::new(
                "overlay.policy.invalid_marker",
                format!(
                    "marker class `{}` must be a single non-empty class name",
                    self.marker_class
                ),
            ));
        }

        Ok(())
    }

    pub fn handles(&self, event: NavigationEvent) -> bool {
        match event {
            NavigationEvent::PageShow => self.on_page_show,
            NavigationEvent::HashChange => self.on_hash_change,
            NavigationEvent::PopState => self.on_pop_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OverlayPolicy;
    use dd_nav::NavigationEvent;

    #[test]
    fn default_policy_is_valid_and_handles_every_event() {
        let policy = OverlayPolicy::default();
        assert!(policy.validate().is_ok());
        assert!(NavigationEvent::ALL.iter().all(|event| policy.handles(*event)));
    }

    #[test]
    fn rejects_blank_or_compound_marker() {
        for marker in ["", "two words", " obscures"] {
            let policy = OverlayPolicy {
                marker_class: marker.to_owned(),
                ..OverlayPolicy::default()
            };
            let result = policy.validate();
            assert!(
                matches!(result, Err(ref error) if error.code == "overlay.policy.invalid_marker"),
                "marker: {marker:?}"
            );
        }
    }

    #[test]
    fn disabled_triggers_are_not_handled() {
        let mut policy = OverlayPolicy::default();
        policy.on_pop_state = false;
        assert!(policy.handles(NavigationEvent::HashChange));
        assert!(!policy.handles(NavigationEvent::PopState));
    }
}
