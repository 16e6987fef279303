// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Gesture lifecycle tracking.
//!
//! A drag, resize, or vertex edit arrives as many interim mutation frames.
//! The tracker captures the state at the first frame and stays `tracking`
//! until the pointer is released, at which point exactly one start→end
//! record is produced. Abandoned gestures reset without emitting anything.

use std::collections::BTreeMap;

use crate::model::{CellGraph, CellId, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize,
    VertexEdit,
}

/// Cell state captured at gesture start and finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureState {
    Box(Rect),
    Waypoints(Vec<Point>),
}

impl GestureState {
    /// Captures the gesture-relevant state of `cell`, if it exists.
    pub fn capture(graph: &CellGraph, cell: &CellId) -> Option<Self> {
        if let Some(node) = graph.node(cell) {
            return Some(Self::Box(node.geometry()));
        }
        graph
            .edge(cell)
            .map(|edge| Self::Waypoints(edge.waypoints().to_vec()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GestureRecord {
    initial: GestureState,
    started_at: u64,
}

/// A finished gesture, summarized as one start→end transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedGesture {
    pub cell: CellId,
    pub kind: GestureKind,
    pub initial: GestureState,
    pub fin: GestureState,
    /// Ticks between first frame and finalization.
    pub duration: u64,
}

/// Per-session table of in-flight gestures, keyed by cell id. Owned by the
/// engine; all access is synchronous.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GestureTracker {
    active: BTreeMap<CellId, GestureRecord>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self, cell: &CellId) -> bool {
        self.active.contains_key(cell)
    }

    pub fn tracked_cells(&self) -> Vec<CellId> {
        self.active.keys().cloned().collect()
    }

    /// Starts tracking `cell` unless a gesture is already active for it.
    /// Call before the first interim frame is applied, so `initial` is the
    /// pre-gesture state.
    pub fn begin_if_untracked(&mut self, cell: &CellId, initial: GestureState, tick: u64) {
        self.active.entry(cell.clone()).or_insert(GestureRecord {
            initial,
            started_at: tick,
        });
    }

    /// Finalizes the gesture for `cell`, producing its summary. Returns
    /// `None` when no gesture is active or the cell vanished mid-gesture.
    /// A gesture that ended where it began yields a summary with equal
    /// states; the caller decides whether that is worth recording.
    pub fn finalize(
        &mut self,
        graph: &CellGraph,
        cell: &CellId,
        tick: u64,
    ) -> Option<FinalizedGesture> {
        let record = self.active.remove(cell)?;
        let fin = GestureState::capture(graph, cell)?;
        let kind = classify(&record.initial, &fin);
        Some(FinalizedGesture {
            cell: cell.clone(),
            kind,
            initial: record.initial,
            fin,
            duration: tick.saturating_sub(record.started_at),
        })
    }

    /// Abandons the gesture for `cell` without producing a record.
    pub fn cancel(&mut self, cell: &CellId) -> Option<GestureState> {
        self.active.remove(cell).map(|record| record.initial)
    }

    pub fn cancel_all(&mut self) -> Vec<(CellId, GestureState)> {
        let drained: Vec<(CellId, GestureState)> = std::mem::take(&mut self.active)
            .into_iter()
            .map(|(cell, record)| (cell, record.initial))
            .collect();
        drained
    }
}

fn classify(initial: &GestureState, fin: &GestureState) -> GestureKind {
    match (initial, fin) {
        (GestureState::Box(from), GestureState::Box(to)) => {
            if from.width == to.width && from.height == to.height {
                GestureKind::Move
            } else {
                GestureKind::Resize
            }
        }
        _ => GestureKind::VertexEdit,
    }
}
