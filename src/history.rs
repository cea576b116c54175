use crate::error::{EditError, EditResult};
use crate::snapshot::Snapshot;
use crate::surface::Surface;

/// Which way an undo/redo moved a snapshot between the stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMove {
    Undo,
    Redo,
}

/// Snapshot-based undo/redo.
///
/// The top of the undo stack is always the state currently shown. The
/// first entry is the baseline and is never popped, so undoing past the
/// beginning is a soft no-op rather than an empty stack.
#[derive(Debug, Default)]
pub struct History {
    /// Stack of states that can be returned to, current state on top
    undo_stack: Vec<Snapshot>,
    /// Stack of undone states that can be replayed
    redo_stack: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the surface unless it is identical to the current state.
    ///
    /// `force` records even a duplicate, for deliberate new documents.
    /// Recording always clears the redo stack. Returns whether a snapshot
    /// was pushed.
    pub fn save_state(&mut self, surface: &Surface, force: bool) -> EditResult<bool> {
        if !force {
            if let Some(top) = self.undo_stack.last() {
                if top.matches(surface) {
                    log::trace!("Skipping duplicate snapshot {}", top.short_id());
                    return Ok(false);
                }
            }
        }

        let snapshot = Snapshot::capture(surface).map_err(EditError::Encode)?;
        log::debug!(
            "Recorded snapshot {} ({}x{}, {} bytes), depth {}",
            snapshot.short_id(),
            snapshot.size()[0],
            snapshot.size()[1],
            snapshot.bytes().len(),
            self.undo_stack.len() + 1
        );
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        Ok(true)
    }

    /// Step back. Returns the snapshot the surface must be restored to.
    pub fn undo(&mut self) -> EditResult<Snapshot> {
        if self.undo_stack.len() <= 1 {
            return Err(EditError::NothingToUndo);
        }
        if let Some(current) = self.undo_stack.pop() {
            self.redo_stack.push(current);
        }
        self.undo_stack.last().cloned().ok_or(EditError::NothingToUndo)
    }

    /// Step forward. Returns the snapshot the surface must be restored to.
    pub fn redo(&mut self) -> EditResult<Snapshot> {
        let next = self.redo_stack.pop().ok_or(EditError::NothingToRedo)?;
        self.undo_stack.push(next.clone());
        Ok(next)
    }

    /// Put back a move whose restore never completed
    pub fn rollback(&mut self, step: StackMove) {
        let (from, to) = match step {
            StackMove::Undo => (&mut self.redo_stack, &mut self.undo_stack),
            StackMove::Redo => (&mut self.undo_stack, &mut self.redo_stack),
        };
        if let Some(snapshot) = from.pop() {
            log::debug!("Rolled back {:?} of {}", step, snapshot.short_id());
            to.push(snapshot);
        }
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.undo_stack.last()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Oldest first
    pub fn entries(&self) -> &[Snapshot] {
        &self.undo_stack
    }

    /// Next redo last
    pub fn redo_entries(&self) -> &[Snapshot] {
        &self.redo_stack
    }
}

#[cfg(test)]
impl History {
    /// Push without capturing or de-duplicating
    pub(crate) fn push_unchecked(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn shade(v: u8) -> Surface {
        Surface::new(3, 3, Rgba([v, v, v, 255]))
    }

    #[test]
    fn test_duplicate_save_is_skipped() {
        let mut history = History::new();
        assert!(history.save_state(&shade(1), false).unwrap());
        assert!(!history.save_state(&shade(1), false).unwrap());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_forced_save_records_duplicate() {
        let mut history = History::new();
        history.save_state(&shade(1), false).unwrap();
        assert!(history.save_state(&shade(1), true).unwrap());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_baseline_is_never_popped() {
        let mut history = History::new();
        assert!(matches!(history.undo(), Err(EditError::NothingToUndo)));

        history.save_state(&shade(1), false).unwrap();
        assert!(matches!(history.undo(), Err(EditError::NothingToUndo)));
        assert_eq!(history.len(), 1);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_undo_redo_moves_between_stacks() {
        let mut history = History::new();
        for v in 0..3 {
            history.save_state(&shade(v), false).unwrap();
        }

        let restored = history.undo().unwrap();
        assert!(restored.matches(&shade(1)));
        assert_eq!((history.len(), history.redo_len()), (2, 1));

        let replayed = history.redo().unwrap();
        assert!(replayed.matches(&shade(2)));
        assert_eq!((history.len(), history.redo_len()), (3, 0));
        assert!(matches!(history.redo(), Err(EditError::NothingToRedo)));
    }

    #[test]
    fn test_rollback_reverses_moves() {
        let mut history = History::new();
        history.save_state(&shade(0), false).unwrap();
        history.save_state(&shade(1), false).unwrap();

        history.undo().unwrap();
        history.rollback(StackMove::Undo);
        assert_eq!((history.len(), history.redo_len()), (2, 0));
        assert!(history.current().unwrap().matches(&shade(1)));

        history.undo().unwrap();
        history.redo().unwrap();
        history.rollback(StackMove::Redo);
        assert_eq!((history.len(), history.redo_len()), (1, 1));
    }

    #[test]
    fn test_new_save_clears_redo() {
        let mut history = History::new();
        history.save_state(&shade(0), false).unwrap();
        history.save_state(&shade(1), false).unwrap();
        history.undo().unwrap();
        assert!(history.can_redo());

        history.save_state(&shade(7), false).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_save_matching_after_undo_keeps_redo() {
        let mut history = History::new();
        history.save_state(&shade(0), false).unwrap();
        history.save_state(&shade(1), false).unwrap();
        history.undo().unwrap();

        // The restored state is already on top
        assert!(!history.save_state(&shade(0), false).unwrap());
        assert!(history.can_redo());
    }
}
