// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Undo/redo stacks and history-worthiness classification.
//!
//! Every applied change set passes through [`should_record`] before it may
//! become an undo step. The bias is deliberate: when a change cannot be
//! proven visual-only, it stays in history.

pub mod gesture;

use crate::ops::{CellChange, MutationKind};

/// Mutation kinds that never reach the undo stack: pure visual effects.
pub const EXCLUDED_KINDS: [MutationKind; 3] = [
    MutationKind::HoverHighlight,
    MutationKind::SelectionHighlight,
    MutationKind::DragPreview,
];

/// Attribute path prefixes that are visual-only. A diff touching *only*
/// these paths is suppressed; any path outside this list keeps the diff
/// history-worthy.
pub const VISUAL_ONLY_ATTR_PREFIXES: [&str; 5] = [
    "style/opacity",
    "style/filter",
    "style/hover-glow",
    "style/selection-highlight",
    "style/drag-preview",
];

pub fn kind_is_excluded(kind: MutationKind) -> bool {
    EXCLUDED_KINDS.contains(&kind)
}

pub fn attr_path_is_visual_only(path: &str) -> bool {
    VISUAL_ONLY_ATTR_PREFIXES
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")))
}

/// True when every change in the set is an attribute edit on a visual-only
/// path. Structural changes (geometry, labels, connectivity) never qualify,
/// and neither does an attribute path this module does not recognize.
pub fn changes_are_visual_only(changes: &[CellChange]) -> bool {
    !changes.is_empty()
        && changes.iter().all(|change| match change {
            CellChange::Attr { path, .. } => attr_path_is_visual_only(path),
            _ => false,
        })
}

/// The gatekeeper: does this applied change set become an undo step?
pub fn should_record(kind: MutationKind, changes: &[CellChange]) -> bool {
    if kind_is_excluded(kind) {
        return false;
    }
    if changes.is_empty() {
        return false;
    }
    !changes_are_visual_only(changes)
}

/// One undo/redo step: the applied changes of a single user intent, in
/// application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    changes: Vec<CellChange>,
}

impl HistoryRecord {
    pub fn new(changes: Vec<CellChange>) -> Self {
        Self { changes }
    }

    pub fn changes(&self) -> &[CellChange] {
        &self.changes
    }
}

/// Undo/redo stacks with a bounded depth. Pushing a new record clears the
/// redo stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoHistory {
    undo: Vec<HistoryRecord>,
    redo: Vec<HistoryRecord>,
    max_depth: usize,
}

pub const DEFAULT_MAX_DEPTH: usize = 200;

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl UndoHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn push(&mut self, record: HistoryRecord) {
        self.redo.clear();
        if self.undo.len() == self.max_depth {
            self.undo.remove(0);
        }
        self.undo.push(record);
    }

    pub fn pop_undo(&mut self) -> Option<HistoryRecord> {
        let record = self.undo.pop()?;
        self.redo.push(record.clone());
        Some(record)
    }

    pub fn pop_redo(&mut self) -> Option<HistoryRecord> {
        let record = self.redo.pop()?;
        self.undo.push(record.clone());
        Some(record)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
