use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::foundation::core::Rect;
use crate::foundation::error::{TourError, TourResult};

/// Capability a mounted target exposes so the tour can ask for its on-screen bounds.
///
/// The tour never assumes a concrete element type; any handle that can answer "what is my
/// current rectangle" in screen coordinates works.
pub trait MeasureTarget {
    /// Current bounds of the target in screen coordinates.
    fn measure(&self) -> TourResult<Rect>;
}

impl MeasureTarget for Rect {
    fn measure(&self) -> TourResult<Rect> {
        Ok(*self)
    }
}

impl<F> MeasureTarget for F
where
    F: Fn() -> TourResult<Rect>,
{
    fn measure(&self) -> TourResult<Rect> {
        self()
    }
}

struct TargetEntry {
    handle: Option<Arc<dyn MeasureTarget>>,
    last: Option<Rect>,
}

/// Step index -> measurement handle and last resolved bounds.
///
/// Entries are created when a target first registers and kept for the registry's lifetime so
/// revisited steps can be measured again.
#[derive(Default)]
pub struct TargetRegistry {
    entries: BTreeMap<usize, TargetEntry>,
}

impl fmt::Debug for TargetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(idx, e)| (idx, (e.handle.is_some(), e.last))),
            )
            .finish()
    }
}

impl TargetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `handle` with step `index`. The last registration wins.
    pub fn register(&mut self, index: usize, handle: Arc<dyn MeasureTarget>) {
        tracing::trace!(index, "register target");
        let entry = self.entries.entry(index).or_insert(TargetEntry {
            handle: None,
            last: None,
        });
        entry.handle = Some(handle);
    }

    /// Drop the handle for `index`, keeping its last resolved bounds.
    pub fn unregister(&mut self, index: usize) -> bool {
        self.entries
            .get_mut(&index)
            .and_then(|e| e.handle.take())
            .is_some()
    }

    /// Whether a handle is currently registered for `index`.
    pub fn is_registered(&self, index: usize) -> bool {
        self.entries
            .get(&index)
            .is_some_and(|e| e.handle.is_some())
    }

    /// Query the registered handle for its current bounds and remember the result.
    pub fn measure(&mut self, index: usize) -> TourResult<Rect> {
        let entry = self
            .entries
            .get_mut(&index)
            .ok_or(TourError::UnregisteredTarget(index))?;
        let handle = entry
            .handle
            .as_ref()
            .ok_or(TourError::UnregisteredTarget(index))?;
        let rect = handle.measure()?;
        entry.last = Some(rect);
        Ok(rect)
    }

    /// Bounds from the most recent successful measurement of `index`.
    pub fn last_bounds(&self, index: usize) -> Option<Rect> {
        self.entries.get(&index).and_then(|e| e.last)
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.entries.values().filter(|e| e.handle.is_some()).count()
    }

    /// No handle registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/target.rs"]
mod tests;
