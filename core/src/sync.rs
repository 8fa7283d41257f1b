//! Input synchronization between keyboard instances.
//!
//! When `syncInstanceInputs` is on, the instance that just changed captures
//! a [`SyncSnapshot`] of its buffers and caret and broadcasts it. Every other
//! registered instance replaces its own state wholesale: this is a full-state
//! copy, not a diff, so the last broadcast wins and re-sending identical
//! state changes nothing.

use crate::caret::CaretRange;
use crate::error::Result;
use crate::input_store::InputMap;
use crate::mount::InstanceId;
use crate::registry::Registry;

/// State copied from the originating instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSnapshot {
    pub origin: InstanceId,
    /// Undecorated buffers.
    pub inputs: InputMap,
    pub caret: Option<CaretRange>,
}

/// Something that can take on another instance's input state.
pub trait Synchronized {
    /// Replace all buffers and the caret with the snapshot's.
    fn apply_sync(&mut self, snapshot: &SyncSnapshot);
}

/// Push `snapshot` to every registered instance except its origin.
///
/// Returns how many instances were updated.
pub fn broadcast<T: Synchronized>(registry: &Registry<T>, snapshot: &SyncSnapshot) -> Result<usize> {
    let mut updated = 0;
    registry.dispatch(|instance, id| {
        if *id == snapshot.origin {
            return;
        }
        instance.apply_sync(snapshot);
        updated += 1;
    })?;
    tracing::debug!(origin = %snapshot.origin, updated, "synced instance inputs");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyboardError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Mirror {
        inputs: InputMap,
        caret: Option<CaretRange>,
        applied: usize,
    }

    impl Synchronized for Mirror {
        fn apply_sync(&mut self, snapshot: &SyncSnapshot) {
            self.inputs = snapshot.inputs.clone();
            self.caret = snapshot.caret;
            self.applied += 1;
        }
    }

    fn snapshot(origin: &str, text: &str) -> SyncSnapshot {
        let mut inputs = InputMap::new();
        inputs.insert("default".to_string(), text.to_string());
        SyncSnapshot {
            origin: InstanceId::new(origin),
            inputs,
            caret: Some(CaretRange::collapsed(text.len())),
        }
    }

    #[test]
    fn test_broadcast_skips_origin() {
        let registry = Registry::new();
        let a = Rc::new(RefCell::new(Mirror::default()));
        let b = Rc::new(RefCell::new(Mirror::default()));
        registry.register(InstanceId::new("a"), Rc::clone(&a));
        registry.register(InstanceId::new("b"), Rc::clone(&b));

        let updated = broadcast(&registry, &snapshot("a", "hey")).unwrap();
        assert_eq!(updated, 1);
        assert_eq!(a.borrow().applied, 0);
        assert_eq!(b.borrow().inputs["default"], "hey");
        assert_eq!(b.borrow().caret, Some(CaretRange::collapsed(3)));
    }

    #[test]
    fn test_rebroadcast_is_idempotent() {
        let registry = Registry::new();
        let b = Rc::new(RefCell::new(Mirror::default()));
        registry.register(InstanceId::new("b"), Rc::clone(&b));

        let snap = snapshot("a", "same");
        broadcast(&registry, &snap).unwrap();
        let first = b.borrow().inputs.clone();
        broadcast(&registry, &snap).unwrap();
        assert_eq!(b.borrow().inputs, first);
        assert_eq!(b.borrow().applied, 2);
    }

    #[test]
    fn test_last_broadcast_wins() {
        let registry = Registry::new();
        let c = Rc::new(RefCell::new(Mirror::default()));
        registry.register(InstanceId::new("c"), Rc::clone(&c));

        broadcast(&registry, &snapshot("a", "from a")).unwrap();
        broadcast(&registry, &snapshot("b", "from b")).unwrap();
        assert_eq!(c.borrow().inputs["default"], "from b");
    }

    #[test]
    fn test_broadcast_without_registry() {
        let registry: Registry<Mirror> = Registry::new();
        assert!(matches!(
            broadcast(&registry, &snapshot("a", "x")),
            Err(KeyboardError::RegistryUnavailable)
        ));
    }
}
