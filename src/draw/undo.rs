//! Snapshot-based undo/redo history for the canvas.

use super::canvas::Canvas;
use anyhow::Result;

/// Maximum retained snapshots on each side before the oldest is dropped.
const MAX_DEPTH: usize = 32;

/// Full-canvas snapshot history.
///
/// One snapshot is taken per discrete undoable action (a stroke, a shape
/// commit, a clear) - never per raw motion event - so memory and latency stay
/// bounded at pointer motion rates. The redo side is cleared whenever a new
/// action is recorded after an undo.
#[derive(Default)]
pub struct UndoStack {
    undo: Vec<cairo::ImageSurface>,
    redo: Vec<cairo::ImageSurface>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a full copy of the canvas and clears the redo sequence.
    pub fn snapshot(&mut self, canvas: &Canvas) -> Result<()> {
        if self.undo.len() >= MAX_DEPTH {
            self.undo.remove(0);
        }
        self.undo.push(canvas.snapshot()?);
        self.redo.clear();
        Ok(())
    }

    /// Restores the most recent snapshot, moving the current contents to redo.
    ///
    /// Returns false (no-op, not an error) when there is nothing to undo.
    pub fn undo(&mut self, canvas: &mut Canvas) -> Result<bool> {
        let Some(snapshot) = self.undo.pop() else {
            log::debug!("Undo requested with empty history");
            return Ok(false);
        };
        if self.redo.len() >= MAX_DEPTH {
            self.redo.remove(0);
        }
        self.redo.push(canvas.snapshot()?);
        canvas.restore(&snapshot)?;
        Ok(true)
    }

    /// Inverse of [`undo`](Self::undo). Returns false when redo is empty.
    pub fn redo(&mut self, canvas: &mut Canvas) -> Result<bool> {
        let Some(snapshot) = self.redo.pop() else {
            log::debug!("Redo requested with empty history");
            return Ok(false);
        };
        if self.undo.len() >= MAX_DEPTH {
            self.undo.remove(0);
        }
        self.undo.push(canvas.snapshot()?);
        canvas.restore(&snapshot)?;
        Ok(true)
    }

    /// Copies the top undo snapshot into the canvas without mutating either
    /// stack.
    ///
    /// This is the live-preview erase: repeated calls during one shape drag
    /// must not consume undo history. Returns false when there is no
    /// snapshot to restore from.
    pub fn restore_top_without_pop(&self, canvas: &mut Canvas) -> Result<bool> {
        let Some(snapshot) = self.undo.last() else {
            log::debug!("Preview restore requested with empty history");
            return Ok(false);
        };
        canvas.restore(snapshot)?;
        Ok(true)
    }

    /// Drops both sequences. Used when the surface itself is replaced and the
    /// snapshots no longer match its geometry.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}
