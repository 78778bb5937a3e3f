//! Fragment-driven overlay hiding for nested SVG groups.
//!
//! When a viewer navigates to `#some-group`, every obscuring overlay link that sits
//! directly inside a group on the path above that group is hidden, revealing the
//! drilled-into content. Nothing is ever shown again by this crate.

mod dispatch;
mod policy;
mod resolver;

pub use dispatch::NavigationDispatcher;
pub use policy::DEFAULT_MARKER_CLASS;
pub use policy::OverlayPolicy;
pub use resolver::HideReport;
pub use resolver::OverlayVisibilityResolver;
pub use resolver::Skipped;
pub use resolver::scoped_overlay_links;
