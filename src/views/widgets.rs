//! Live widget handles.
//!
//! Every chart or map a page mounts gets a handle in the registry, and only
//! live handles are kept. Leaving a page destroys all of them; tearing down
//! an empty registry is a no-op, and mounting a widget id that is already
//! live destroys the old instance first, so at most one instance per id is
//! ever live.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Chart,
    Map,
}

/// A mounted widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetHandle {
    pub id: String,
    pub kind: WidgetKind,
    /// Mount sequence number, unique for the registry's lifetime
    pub instance: u64,
}

impl WidgetHandle {
    fn destroy(self) {
        tracing::trace!("Destroyed {:?} widget {}#{}", self.kind, self.id, self.instance);
    }
}

#[derive(Debug, Default)]
pub struct WidgetRegistry {
    handles: Vec<WidgetHandle>,
    next_instance: u64,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a widget, replacing any live instance with the same id.
    pub fn mount(&mut self, id: &str, kind: WidgetKind) -> &WidgetHandle {
        if let Some(index) = self.handles.iter().position(|h| h.id == id) {
            self.handles.remove(index).destroy();
        }
        self.next_instance += 1;
        self.handles.push(WidgetHandle {
            id: id.to_string(),
            kind,
            instance: self.next_instance,
        });
        &self.handles[self.handles.len() - 1]
    }

    /// Destroy every live widget. Returns how many were destroyed.
    pub fn teardown(&mut self) -> usize {
        let destroyed = self.handles.len();
        self.handles.drain(..).for_each(WidgetHandle::destroy);
        destroyed
    }

    pub fn live(&self) -> impl Iterator<Item = &WidgetHandle> {
        self.handles.iter()
    }

    pub fn live_count(&self) -> usize {
        self.handles.len()
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.handles.iter().any(|h| h.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teardown_is_idempotent() {
        let mut registry = WidgetRegistry::new();
        registry.mount("yield-forecast-chart", WidgetKind::Chart);
        registry.mount("map-container", WidgetKind::Map);
        assert_eq!(registry.teardown(), 2);
        assert_eq!(registry.teardown(), 0);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_remount_replaces_live_instance() {
        let mut registry = WidgetRegistry::new();
        let first = registry.mount("scenario-chart", WidgetKind::Chart).instance;
        let second = registry.mount("scenario-chart", WidgetKind::Chart).instance;
        assert_ne!(first, second);
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.live().next().map(|h| h.instance), Some(second));
    }

    #[test]
    fn test_mount_after_teardown_gets_fresh_instance() {
        let mut registry = WidgetRegistry::new();
        let first = registry.mount("map-container", WidgetKind::Map).instance;
        registry.mount("cash-flow-chart", WidgetKind::Chart);
        assert_eq!(registry.teardown(), 2);
        assert!(!registry.is_live("map-container"));

        let again = registry.mount("map-container", WidgetKind::Map).instance;
        assert!(again > first);
        assert_eq!(registry.live_count(), 1);
        assert!(!registry.is_live("cash-flow-chart"));
    }
}
