//! TabShell Tab Management
//!
//! Tabs are independent navigation sessions. Each owns a back/forward
//! stack; the registry owns every tab, tracks the active one and tells
//! observers about each mutation.
//!
//! Registry operations never fail: unknown tab ids are ignored.

mod event;
mod location;
mod registry;
mod stack;
mod tab;

pub use event::{Observer, TabEvent};
pub use location::{Location, NEW_TAB_URL};
pub use registry::{LoadTicket, TabRegistry};
pub use stack::NavigationStack;
pub use tab::{Tab, TabId, LOADING_TITLE, NEW_TAB_TITLE};
