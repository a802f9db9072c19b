//! Change notifications

use std::sync::Arc;

use crate::tab::TabId;

/// What changed in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Created(TabId),
    Closed(TabId),
    Switched(TabId),
    Navigated(TabId),
    Updated(TabId),
}

impl TabEvent {
    pub fn tab_id(&self) -> TabId {
        match *self {
            TabEvent::Created(id)
            | TabEvent::Closed(id)
            | TabEvent::Switched(id)
            | TabEvent::Navigated(id)
            | TabEvent::Updated(id) => id,
        }
    }
}

/// Change callback.
///
/// Observers run synchronously inside the mutating call and must not call
/// back into the registry; schedule follow-up work instead.
pub type Observer = Arc<dyn Fn(&TabEvent) + Send + Sync>;
