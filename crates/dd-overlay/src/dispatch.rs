use crate::policy::OverlayPolicy;
use crate::resolver::HideReport;
use crate::resolver::OverlayVisibilityResolver;
use dd_core::DrillResult;
use dd_dom::Document;
use dd_nav::Location;
use dd_nav::NavigationEvent;
use tracing::debug;

/// Entry point for host glue: forward navigation events here.
///
/// Events arrive one at a time from the host's event loop; each run completes before the
/// next begins, and repeated runs are idempotent.
#[derive(Debug, Clone, Default)]
pub struct NavigationDispatcher {
    resolver: OverlayVisibilityResolver,
}

impl NavigationDispatcher {
    pub fn new(policy: OverlayPolicy) -> DrillResult<Self> {
        policy.validate()?;
        Ok(Self {
            resolver: OverlayVisibilityResolver::new(policy),
        })
    }

    pub fn resolver(&self) -> &OverlayVisibilityResolver {
        &self.resolver
    }

    /// Runs resolution for `event`, or returns `None` when the policy ignores it.
    pub fn dispatch(
        &self,
        event: NavigationEvent,
        location: &Location,
        document: &mut Document,
    ) -> Option<HideReport> {
        if !self.resolver.policy().handles(event) {
            debug!(event = event.as_str(), "navigation event disabled by policy");
            return None;
        }

        debug!(event = event.as_str(), hash = location.hash(), "resolving overlays");
        Some(self.resolver.resolve_and_hide(location, document))
    }
}
