//! Process-wide table of live keyboard instances.
//!
//! The registry is an explicit object: the host creates one and hands a
//! clone to every keyboard it builds. Clones share the same table. It is
//! single-threaded (`Rc`/`RefCell`) because activations never overlap.
//!
//! `dispatch` runs a callback against every registered instance in
//! registration order. It is used for input synchronization and for events
//! that concern all keyboards at once, such as a pointer release.

use crate::error::{KeyboardError, Result};
use crate::mount::InstanceId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable instance state as stored in the registry.
pub type Shared<T> = Rc<RefCell<T>>;

type Entries<T> = Vec<(InstanceId, Shared<T>)>;

pub struct Registry<T> {
    /// `None` until the first registration and after `clear`.
    inner: Rc<RefCell<Option<Entries<T>>>>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(None)),
        }
    }

    /// Add an instance. Registering an id that is already present replaces
    /// the previous handle in its original position.
    pub fn register(&self, id: InstanceId, handle: Shared<T>) {
        let mut inner = self.inner.borrow_mut();
        let entries = inner.get_or_insert_with(Vec::new);
        match entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => {
                tracing::debug!(instance = %id, "replacing registered keyboard instance");
                entry.1 = handle;
            }
            None => entries.push((id, handle)),
        }
    }

    /// Remove an instance. Returns `true` if it was registered.
    pub fn unregister(&self, id: &InstanceId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(entries) = inner.as_mut() else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(existing, _)| existing != id);
        entries.len() != before
    }

    /// Drop the whole table. Dispatch fails until something registers again.
    pub fn clear(&self) {
        *self.inner.borrow_mut() = None;
    }

    pub fn is_available(&self) -> bool {
        self.inner.borrow().is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.inner
            .borrow()
            .as_ref()
            .is_some_and(|entries| entries.iter().any(|(existing, _)| existing == id))
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<InstanceId> {
        self.inner
            .borrow()
            .as_ref()
            .map(|entries| entries.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, id: &InstanceId) -> Option<Shared<T>> {
        self.inner.borrow().as_ref().and_then(|entries| {
            entries
                .iter()
                .find(|(existing, _)| existing == id)
                .map(|(_, handle)| Rc::clone(handle))
        })
    }

    /// Call `f` for every registered instance, in registration order.
    ///
    /// The table is snapshotted first, so callbacks may register, unregister
    /// or dispatch again. An instance already borrowed by an outer callback
    /// is skipped by nested dispatches.
    pub fn dispatch<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut T, &InstanceId),
    {
        let entries: Entries<T> = match self.inner.borrow().as_ref() {
            Some(entries) => entries
                .iter()
                .map(|(id, handle)| (id.clone(), Rc::clone(handle)))
                .collect(),
            None => return Err(KeyboardError::RegistryUnavailable),
        };

        tracing::trace!(instances = entries.len(), "dispatch");
        for (id, handle) in &entries {
            match handle.try_borrow_mut() {
                Ok(mut instance) => f(&mut instance, id),
                Err(_) => {
                    tracing::warn!(instance = %id, "skipping busy keyboard instance during dispatch");
                }
            }
        }
        Ok(())
    }
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("available", &self.is_available())
            .field("ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(v: u32) -> Shared<u32> {
        Rc::new(RefCell::new(v))
    }

    #[test]
    fn test_dispatch_before_register_fails() {
        let registry: Registry<u32> = Registry::new();
        let result = registry.dispatch(|_, _| {});
        assert!(matches!(result, Err(KeyboardError::RegistryUnavailable)));
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let registry = Registry::new();
        registry.register(InstanceId::new("b"), shared(1));
        registry.register(InstanceId::new("a"), shared(2));

        let mut seen = Vec::new();
        registry
            .dispatch(|value, id| seen.push((id.as_str().to_string(), *value)))
            .unwrap();
        assert_eq!(seen, vec![("b".to_string(), 1), ("a".to_string(), 2)]);
    }

    #[test]
    fn test_duplicate_id_last_writer_wins() {
        let registry = Registry::new();
        registry.register(InstanceId::new("a"), shared(1));
        registry.register(InstanceId::new("b"), shared(2));
        registry.register(InstanceId::new("a"), shared(3));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids()[0].as_str(), "a");
        let handle = registry.get(&InstanceId::new("a")).unwrap();
        assert_eq!(*handle.borrow(), 3);
    }

    #[test]
    fn test_unregister_and_clear() {
        let registry = Registry::new();
        let id = InstanceId::new("a");
        registry.register(id.clone(), shared(1));
        assert!(registry.unregister(&id));
        assert!(!registry.unregister(&id));

        // empty but still available
        assert!(registry.dispatch(|_, _| {}).is_ok());

        registry.clear();
        assert!(!registry.is_available());
        assert!(matches!(
            registry.dispatch(|_, _| {}),
            Err(KeyboardError::RegistryUnavailable)
        ));
    }

    #[test]
    fn test_dispatch_mutates_instances() {
        let registry = Registry::new();
        let a = shared(1);
        let b = shared(2);
        registry.register(InstanceId::new("a"), Rc::clone(&a));
        registry.register(InstanceId::new("b"), Rc::clone(&b));

        registry.dispatch(|value, _| *value *= 10).unwrap();
        assert_eq!(*a.borrow(), 10);
        assert_eq!(*b.borrow(), 20);
    }

    #[test]
    fn test_reentrant_dispatch_skips_busy_instance() {
        let registry = Registry::new();
        registry.register(InstanceId::new("a"), shared(0));
        registry.register(InstanceId::new("b"), shared(0));

        let inner = registry.clone();
        registry
            .dispatch(|value, id| {
                *value += 1;
                if id.as_str() == "a" {
                    // "a" is borrowed here, so only "b" is reached
                    inner.dispatch(|other, _| *other += 100).unwrap();
                }
            })
            .unwrap();

        let a = registry.get(&InstanceId::new("a")).unwrap();
        let b = registry.get(&InstanceId::new("b")).unwrap();
        assert_eq!(*a.borrow(), 1);
        assert_eq!(*b.borrow(), 101);
    }
}
