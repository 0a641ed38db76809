//! Panel registry.
//!
//! Records live in an arena of slots addressed by generation-checked
//! handles. Freeing a slot bumps its generation, so a stale handle can never
//! resolve to a newer panel that happens to reuse the slot.

use crate::error::{Result, SelectionError};
use crate::panel::{PanelRecord, SharedRecord};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Opaque identifier of a panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelHandle {
    session: u64,
    index: u32,
    generation: u32,
}

impl PanelHandle {
    /// Id of the session that issued this handle.
    pub fn session_id(&self) -> u64 {
        self.session
    }
}

impl std::fmt::Display for PanelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "panel#{}.{}.{}", self.session, self.index, self.generation)
    }
}

struct Slot {
    generation: u32,
    record: Option<SharedRecord>,
}

#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

/// Owns every live panel record of a session.
pub struct PanelRegistry {
    session: u64,
    arena: RwLock<Arena>,
}

impl PanelRegistry {
    pub(crate) fn new(session: u64) -> Self {
        Self {
            session,
            arena: RwLock::new(Arena::default()),
        }
    }

    /// Store a new record and hand out its handle.
    pub(crate) fn insert(&self, record: PanelRecord) -> PanelHandle {
        let record = Arc::new(Mutex::new(record));
        let mut arena = self.arena.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(index) = arena.free.pop() {
            let slot = &mut arena.slots[index as usize];
            slot.record = Some(record);
            return PanelHandle {
                session: self.session,
                index,
                generation: slot.generation,
            };
        }

        let index = arena.slots.len() as u32;
        arena.slots.push(Slot {
            generation: 0,
            record: Some(record),
        });
        PanelHandle {
            session: self.session,
            index,
            generation: 0,
        }
    }

    /// Resolve a handle. Anything but a live match is reported as destroyed.
    pub(crate) fn get(&self, handle: PanelHandle) -> Result<SharedRecord> {
        let arena = self.arena.read().unwrap_or_else(PoisonError::into_inner);
        if handle.session != self.session {
            return Err(SelectionError::PanelDestroyed);
        }
        arena
            .slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.record.clone())
            .ok_or(SelectionError::PanelDestroyed)
    }

    /// Drop a handle and free its slot.
    pub(crate) fn remove(&self, handle: PanelHandle) -> Result<SharedRecord> {
        let mut arena = self.arena.write().unwrap_or_else(PoisonError::into_inner);
        if handle.session != self.session {
            return Err(SelectionError::PanelDestroyed);
        }
        let slot = arena
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(SelectionError::PanelDestroyed)?;
        let record = slot.record.take().ok_or(SelectionError::PanelDestroyed)?;

        // A slot whose generation space is used up is retired for good
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            arena.free.push(handle.index);
        }
        Ok(record)
    }

    pub fn contains(&self, handle: PanelHandle) -> bool {
        self.get(handle).is_ok()
    }

    /// Number of live panels.
    pub fn len(&self) -> usize {
        let arena = self.arena.read().unwrap_or_else(PoisonError::into_inner);
        arena.slots.iter().filter(|s| s.record.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles of all live panels, in slot order.
    pub fn handles(&self) -> Vec<PanelHandle> {
        let arena = self.arena.read().unwrap_or_else(PoisonError::into_inner);
        arena
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.record.is_some())
            .map(|(index, slot)| PanelHandle {
                session: self.session,
                index: index as u32,
                generation: slot.generation,
            })
            .collect()
    }
}
