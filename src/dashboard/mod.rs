//! The role-gated dashboard: sessions, menu, section router and views.

/// Sections and the role-filtered menu
pub mod menu;
/// Navigation into the view region
pub mod router;
/// Tab-scoped login state
pub mod session;
/// HTML fragments
pub mod views;

pub use menu::{Menu, Section};
pub use router::{Dashboard, Navigation, ViewRegion};
pub use session::{MemoryTabStorage, SessionGate, TabStorage};
