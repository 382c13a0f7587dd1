//! UI panels of the dashboard.

pub mod detail_panel;
pub mod sidebar;
pub mod status_pane;

pub use sidebar::SidebarAction;
pub use status_pane::StatusPane;
