use crate::policy::OverlayPolicy;
use dd_dom::Display;
use dd_dom::Document;
use dd_dom::ElementRole;
use dd_dom::NodeId;
use dd_nav::Location;
use tracing::debug;
use tracing::trace;

/// Why a resolution run touched nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skipped {
    EmptyFragment,
    MissingTarget,
}

/// Outcome of one resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HideReport {
    /// Target element, when the fragment resolved to one.
    pub target: Option<NodeId>,
    /// Ancestors visited, nearest first.
    pub visited: Vec<NodeId>,
    /// Overlays switched from visible to hidden by this run.
    pub hidden: Vec<NodeId>,
    /// Overlays that matched but were already hidden.
    pub already_hidden: Vec<NodeId>,
    pub skipped: Option<Skipped>,
}

impl HideReport {
    fn skipped(reason: Skipped) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    /// Every overlay matched during the walk, whatever its prior state.
    pub fn matched(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.hidden.iter().chain(&self.already_hidden).copied()
    }

    pub fn changed(&self) -> bool {
        !self.hidden.is_empty()
    }
}

/// Hides obscuring overlays above the element named by the location fragment.
///
/// The element's own group is the starting point; walking begins one level above it, so
/// overlays sitting next to the target inside that group stay visible.
#[derive(Debug, Clone, Default)]
pub struct OverlayVisibilityResolver {
    policy: OverlayPolicy,
}

impl OverlayVisibilityResolver {
    pub fn new(policy: OverlayPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &OverlayPolicy {
        &self.policy
    }

    pub fn resolve_and_hide(&self, location: &Location, document: &mut Document) -> HideReport {
        let fragment = location.fragment_id();
        if fragment.is_empty() {
            debug!("empty fragment, nothing to resolve");
            return HideReport::skipped(Skipped::EmptyFragment);
        }

        let Some(target) = document.get_element_by_id(fragment) else {
            debug!(fragment = %fragment, "fragment names no element");
            return HideReport::skipped(Skipped::MissingTarget);
        };

        let mut report = HideReport {
            target: Some(target),
            ..HideReport::default()
        };

        let Some(start) = document.parent(target) else {
            return report;
        };

        let mut matches = Vec::new();
        for ancestor in document.ancestors(start) {
            trace!(ancestor, "visiting ancestor");
            report.visited.push(ancestor);
            matches.extend(scoped_overlay_links(document, ancestor, &self.policy.marker_class));
        }

        for overlay in matches {
            if document.set_display(overlay, Display::Hidden) {
                debug!(overlay, fragment = %fragment, "hid obscuring overlay");
                report.hidden.push(overlay);
            } else {
                report.already_hidden.push(overlay);
            }
        }

        report
    }
}

/// Overlay links carrying `marker` exactly two levels below `scope`, through a group.
///
/// Equivalent to the selector `:scope > g > a.<marker>`; deeper descendants never match.
pub fn scoped_overlay_links(document: &Document, scope: NodeId, marker: &str) -> Vec<NodeId> {
    document
        .children(scope)
        .iter()
        .copied()
        .filter(|child| has_role(document, *child, ElementRole::Group))
        .flat_map(|group| document.children(group).iter().copied())
        .filter(|candidate| {
            document.element(*candidate).is_some_and(|element| {
                element.role == ElementRole::OverlayLink && element.has_class(marker)
            })
        })
        .collect()
}

fn has_role(document: &Document, id: NodeId, role: ElementRole) -> bool {
    document
        .element(id)
        .is_some_and(|element| element.role == role)
}
