// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The consistency engine: every mutation request passes through here.
//!
//! The engine owns the cell graph plus all per-session caches (port state,
//! gesture table, undo stacks, selection) and decides, per mutation, what
//! becomes an undo step and what stays transient. Everything is
//! single-threaded and synchronous; remote edits and local gestures
//! interleave on the caller's event loop.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use crate::embedding;
use crate::history::gesture::{FinalizedGesture, GestureState, GestureTracker};
use crate::history::{self, HistoryRecord, UndoHistory};
use crate::model::{CellGraph, CellId, DiagramSnapshot, Edge, Rect, SnapshotIssue};
use crate::ops::{
    self, ApplyError, CellChange, Highlight, Mutation, MutationKind, TRANSIENT_STYLE_PATHS,
};
use crate::ports::{self, PortState, PortStateCache, PortWarning};
use crate::repair::{self, RepairReport};
use crate::zorder::{self, ReorderOp};

pub use crate::history::gesture::GestureKind;

/// Notifications re-emitted outward, drained by the UI shell after each
/// dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    NodeAdded { id: CellId },
    NodeRemoved { id: CellId },
    NodeMoved { id: CellId, from: Rect, to: Rect },
    NodeResized { id: CellId, from: Rect, to: Rect },
    EdgeAdded { id: CellId },
    EdgeRemoved { id: CellId },
    SelectionChanged { selected: Vec<CellId> },
    HistoryChanged { can_undo: bool, can_redo: bool },
    GestureCompleted {
        cell: CellId,
        kind: GestureKind,
        initial: GestureState,
        fin: GestureState,
        duration: u64,
    },
    PortWarning(PortWarning),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Apply(ApplyError),
    EmbeddingRejected(embedding::EmbedRejection),
    NotContained { child: CellId, parent: CellId },
    /// Replaying recorded changes failed: a layer this engine depends on
    /// broke consistency. Not a user-recoverable condition.
    Inconsistent(ApplyError),
    NotAGestureMutation { kind: MutationKind },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply(err) => write!(f, "{err}"),
            Self::EmbeddingRejected(rejection) => write!(f, "{rejection}"),
            Self::NotContained { child, parent } => {
                write!(f, "node '{child}' is not completely contained by '{parent}'")
            }
            Self::Inconsistent(err) => write!(f, "graph consistency broken: {err}"),
            Self::NotAGestureMutation { kind } => {
                write!(f, "mutation kind {kind:?} cannot be a gesture frame")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ApplyError> for EngineError {
    fn from(err: ApplyError) -> Self {
        Self::Apply(err)
    }
}

/// One engine per open diagram session.
#[derive(Debug, Default)]
pub struct Engine {
    graph: CellGraph,
    history: UndoHistory,
    gestures: GestureTracker,
    port_cache: PortStateCache,
    selection: BTreeSet<CellId>,
    events: VecDeque<EngineEvent>,
    recording_suspended: u32,
    bulk_loading: bool,
    atomic_depth: u32,
    group_changes: Vec<CellChange>,
    group_record: Vec<CellChange>,
    group_events: Vec<EngineEvent>,
    tick: u64,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &CellGraph {
        &self.graph
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn selection(&self) -> &BTreeSet<CellId> {
        &self.selection
    }

    pub fn port_state(&self, node: &CellId) -> Option<&PortState> {
        self.port_cache.entry(node)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Drains the outward notification queue.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    // ----- mutation surface -------------------------------------------------

    /// Applies one mutation with normal history classification.
    pub fn apply(&mut self, mutation: Mutation) -> Result<(), EngineError> {
        self.apply_inner(&mutation)
    }

    /// Applies a sequence of structural mutations as one undo step. All
    /// sub-mutations apply before any history entry or notification becomes
    /// observable; on error, everything applied so far is rolled back.
    pub fn apply_atomic(&mut self, mutations: &[Mutation]) -> Result<(), EngineError> {
        self.atomic(|engine| {
            for mutation in mutations {
                engine.apply_inner(mutation)?;
            }
            Ok(())
        })
    }

    /// Runs mutations that must never reach the undo stack regardless of
    /// content (hover glow, temporary tooling).
    pub fn apply_visual(&mut self, mutations: &[Mutation]) -> Result<(), EngineError> {
        self.with_recording_suspended(|engine| {
            for mutation in mutations {
                engine.apply_inner(mutation)?;
            }
            Ok(())
        })
    }

    /// Applies a mutation originating from a remote collaborator: the graph
    /// changes and notifications fire, but local history stays untouched —
    /// the remote party owns its own history. Conflicts resolve as last
    /// applied wins.
    pub fn apply_remote(&mut self, mutation: Mutation) -> Result<(), EngineError> {
        self.with_recording_suspended(|engine| engine.apply_inner(&mutation))
    }

    fn apply_inner(&mut self, mutation: &Mutation) -> Result<(), EngineError> {
        self.tick += 1;
        let kind = mutation.kind();
        let target_tracked = self.gestures.is_tracking(mutation.target());

        let changes = ops::apply_mutation(&mut self.graph, mutation)?;
        self.invalidate_port_caches(&changes);

        let recordable = !self.bulk_loading
            && self.recording_suspended == 0
            && !target_tracked
            && history::should_record(kind, &changes);

        if self.atomic_depth > 0 {
            if recordable {
                self.group_record.extend(changes.iter().cloned());
            }
            let events = events_for(&changes);
            self.group_events.extend(events);
            self.group_changes.extend(changes);
        } else {
            if recordable {
                self.history.push(HistoryRecord::new(changes.clone()));
                self.emit_history_changed();
            }
            self.emit_change_events(&changes);
        }
        Ok(())
    }

    /// Runs `f` as (part of) one atomic group. Nested calls collapse into
    /// the outermost group; an error unwinds this level's changes.
    fn atomic<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let change_mark = self.group_changes.len();
        let record_mark = self.group_record.len();
        let event_mark = self.group_events.len();

        self.atomic_depth += 1;
        let result = f(self);
        self.atomic_depth -= 1;

        match result {
            Ok(value) => {
                if self.atomic_depth == 0 {
                    self.flush_group();
                }
                Ok(value)
            }
            Err(err) => {
                let undone = self.group_changes.split_off(change_mark);
                for change in undone.iter().rev() {
                    ops::apply_change(&mut self.graph, &change.inverted())
                        .map_err(EngineError::Inconsistent)?;
                }
                self.group_record.truncate(record_mark);
                self.group_events.truncate(event_mark);
                Err(err)
            }
        }
    }

    fn flush_group(&mut self) {
        self.group_changes.clear();
        let record = std::mem::take(&mut self.group_record);
        if !record.is_empty() {
            self.history.push(HistoryRecord::new(record));
            self.emit_history_changed();
        }
        let events = std::mem::take(&mut self.group_events);
        if !self.bulk_loading {
            self.events.extend(events);
        }
    }

    /// Suspends history recording for the duration of `f`. The counter is
    /// restored on every exit path, including unwinding, so an error inside
    /// `f` can never leave recording disabled.
    fn with_recording_suspended<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        struct Guard<'a> {
            engine: &'a mut Engine,
        }
        impl Drop for Guard<'_> {
            fn drop(&mut self) {
                self.engine.recording_suspended -= 1;
            }
        }

        self.recording_suspended += 1;
        let mut guard = Guard { engine: self };
        f(&mut *guard.engine)
    }

    // ----- structural convenience operations --------------------------------

    /// Commits an embedding: rule validation and geometric containment must
    /// both pass. The child is promoted above its parent (boundaries stay
    /// behind ordinary nodes) and its edges are re-layered, all as one undo
    /// step.
    pub fn embed_node(&mut self, parent: &CellId, child: &CellId) -> Result<(), EngineError> {
        embedding::validate_embedding(&self.graph, parent, child)
            .map_err(EngineError::EmbeddingRejected)?;

        let (child_box, kind) = self
            .graph
            .node(child)
            .map(|node| (node.geometry(), node.kind()))
            .ok_or_else(|| ApplyError::UnknownNode { id: child.clone() })?;
        let parent_box = self
            .graph
            .node(parent)
            .map(|node| node.geometry())
            .ok_or_else(|| ApplyError::UnknownNode { id: parent.clone() })?;
        if !embedding::is_completely_contained(&child_box, &parent_box) {
            return Err(EngineError::NotContained {
                child: child.clone(),
                parent: parent.clone(),
            });
        }

        let promoted = zorder::layer_for(kind, true);

        self.atomic(|engine| {
            engine.apply_inner(&Mutation::SetParent {
                id: child.clone(),
                parent: Some(parent.clone()),
            })?;
            engine.apply_inner(&Mutation::SetZOrder {
                id: child.clone(),
                z_order: promoted,
            })?;
            engine.relayer_edges_of(child)?;
            Ok(())
        })
    }

    /// Releases a node from its parent, reverting it to its kind's baseline
    /// layer.
    pub fn release_node(&mut self, child: &CellId) -> Result<(), EngineError> {
        let kind = self
            .graph
            .node(child)
            .map(|node| node.kind())
            .ok_or_else(|| ApplyError::UnknownNode { id: child.clone() })?;
        let baseline = zorder::layer_for(kind, false);

        self.atomic(|engine| {
            engine.apply_inner(&Mutation::SetParent {
                id: child.clone(),
                parent: None,
            })?;
            engine.apply_inner(&Mutation::SetZOrder {
                id: child.clone(),
                z_order: baseline,
            })?;
            engine.relayer_edges_of(child)?;
            Ok(())
        })
    }

    /// Deletes a node as one undo step: detaches its edges, releases its
    /// children, removes it, and refreshes port visibility on its former
    /// peers.
    pub fn delete_node(&mut self, id: &CellId) -> Result<(), EngineError> {
        if self.graph.node(id).is_none() {
            return Err(ApplyError::UnknownNode { id: id.clone() }.into());
        }
        let touching: Vec<CellId> = self
            .graph
            .edges_touching(id)
            .map(|(edge_id, _)| edge_id.clone())
            .collect();
        let peers: Vec<CellId> = self
            .graph
            .edges_touching(id)
            .flat_map(|(_, edge)| [edge.source().node().clone(), edge.target().node().clone()])
            .filter(|peer| peer != id)
            .collect();

        self.atomic(|engine| {
            for edge_id in &touching {
                engine.apply_inner(&Mutation::RemoveEdge {
                    id: edge_id.clone(),
                })?;
            }
            engine.apply_inner(&Mutation::RemoveNode { id: id.clone() })?;
            Ok(())
        })?;

        self.port_cache.invalidate(id);
        self.gestures.cancel(id);
        if self.selection.remove(id) {
            self.emit_selection_changed();
        }
        let tick = self.tick;
        for peer in peers {
            ports::update_node_port_visibility(&mut self.graph, &mut self.port_cache, &peer, tick);
        }
        Ok(())
    }

    /// Commits a drawn edge and forces its referenced ports visible.
    /// Malformed port references surface as [`EngineEvent::PortWarning`]s,
    /// never as errors.
    pub fn connect_edge(&mut self, edge: Edge) -> Result<(), EngineError> {
        let edge_id = edge.id().clone();
        self.atomic(|engine| {
            engine.apply_inner(&Mutation::AddEdge { edge })?;
            if let Some((id, z_order)) = edge_z_plan(&engine.graph, &edge_id) {
                engine.apply_inner(&Mutation::SetZOrder { id, z_order })?;
            }
            Ok(())
        })?;

        let tick = self.tick;
        let warnings = ports::ensure_connected_ports_visible(
            &mut self.graph,
            &mut self.port_cache,
            &edge_id,
            tick,
        );
        for warning in warnings {
            self.events.push_back(EngineEvent::PortWarning(warning));
        }
        Ok(())
    }

    /// Sibling-by-layer reorder of the given cells, clamped so the layering
    /// invariants hold. One undo step.
    pub fn reorder(&mut self, cells: &[CellId], op: ReorderOp) -> Result<(), EngineError> {
        let plan = zorder::reorder_plan(&self.graph, cells, op);
        if plan.is_empty() {
            return Ok(());
        }
        let affected: Vec<CellId> = plan.iter().map(|(id, _)| id.clone()).collect();
        self.atomic(|engine| {
            for (id, z_order) in plan {
                engine.apply_inner(&Mutation::SetZOrder { id, z_order })?;
            }
            for id in &affected {
                engine.relayer_edges_of(id)?;
            }
            Ok(())
        })
    }

    fn relayer_edges_of(&mut self, node: &CellId) -> Result<(), EngineError> {
        for (id, z_order) in zorder::edge_relayer_plan(&self.graph, node) {
            self.apply_inner(&Mutation::SetZOrder { id, z_order })?;
        }
        Ok(())
    }

    // ----- gestures ---------------------------------------------------------

    /// Applies one interim frame of a drag/resize/vertex-edit gesture.
    /// The first frame for an untracked cell starts tracking and captures
    /// the pre-gesture state; no frame reaches the undo stack.
    pub fn gesture_frame(&mut self, mutation: Mutation) -> Result<(), EngineError> {
        let kind = mutation.kind();
        if !matches!(kind, MutationKind::Geometry | MutationKind::VertexEdit) {
            return Err(EngineError::NotAGestureMutation { kind });
        }
        let target = mutation.target().clone();
        if !self.gestures.is_tracking(&target) {
            let initial = GestureState::capture(&self.graph, &target)
                .ok_or_else(|| ApplyError::UnknownCell { id: target.clone() })?;
            self.tick += 1;
            let tick = self.tick;
            self.gestures.begin_if_untracked(&target, initial, tick);
        }
        self.apply_inner(&mutation)
    }

    /// Finalizes the gesture on `cell` (pointer release), emitting exactly
    /// one history record for the whole start→end delta plus a
    /// gesture-completed notification. A gesture that ended where it began
    /// records nothing.
    pub fn finalize_gesture(&mut self, cell: &CellId) -> Result<(), EngineError> {
        self.tick += 1;
        let tick = self.tick;
        let Some(done) = self.gestures.finalize(&self.graph, cell, tick) else {
            return Ok(());
        };
        if let Some(change) = gesture_change(&done) {
            if !self.bulk_loading && self.recording_suspended == 0 {
                if self.atomic_depth > 0 {
                    // An open group absorbs the coalesced delta; the group
                    // still produces exactly one record.
                    self.group_record.push(change);
                } else {
                    self.history.push(HistoryRecord::new(vec![change]));
                    self.emit_history_changed();
                }
            }
        }
        let completed = EngineEvent::GestureCompleted {
            cell: done.cell,
            kind: done.kind,
            initial: done.initial,
            fin: done.fin,
            duration: done.duration,
        };
        if self.atomic_depth > 0 {
            self.group_events.push(completed);
        } else {
            self.events.push_back(completed);
        }
        Ok(())
    }

    /// Safety net for a pointer released outside the canvas: finalizes
    /// every still-active gesture.
    pub fn finalize_all_gestures(&mut self) -> Result<(), EngineError> {
        for cell in self.gestures.tracked_cells() {
            self.finalize_gesture(&cell)?;
        }
        Ok(())
    }

    /// Abandons the gesture on `cell` (e.g. the window lost focus
    /// mid-drag): the cell snaps back to its pre-gesture state and no
    /// history entry is emitted.
    pub fn cancel_gesture(&mut self, cell: &CellId) -> Result<(), EngineError> {
        let Some(initial) = self.gestures.cancel(cell) else {
            return Ok(());
        };
        let mutation = match initial {
            GestureState::Box(geometry) => Mutation::SetGeometry {
                id: cell.clone(),
                geometry,
            },
            GestureState::Waypoints(waypoints) => Mutation::SetWaypoints {
                id: cell.clone(),
                waypoints,
            },
        };
        self.with_recording_suspended(|engine| engine.apply_inner(&mutation))
    }

    pub fn cancel_all_gestures(&mut self) -> Result<(), EngineError> {
        for cell in self.gestures.tracked_cells() {
            self.cancel_gesture(&cell)?;
        }
        Ok(())
    }

    // ----- edge-draw port choreography --------------------------------------

    /// All ports become visible so every one is reachable as a drop target.
    pub fn begin_edge_draw(&mut self) {
        self.tick += 1;
        let tick = self.tick;
        ports::show_all_ports(&mut self.graph, &mut self.port_cache, tick);
    }

    /// Only truly connected ports remain visible.
    pub fn end_edge_draw(&mut self) {
        self.tick += 1;
        let tick = self.tick;
        ports::hide_unconnected_ports(&mut self.graph, &mut self.port_cache, tick);
    }

    // ----- selection --------------------------------------------------------

    /// Replaces the selection, toggling selection highlight as a visual
    /// effect (never recorded).
    pub fn select(&mut self, cells: &[CellId]) -> Result<(), EngineError> {
        let next: BTreeSet<CellId> = cells
            .iter()
            .filter(|id| self.graph.contains_cell(id))
            .cloned()
            .collect();
        if next == self.selection {
            return Ok(());
        }

        let previous = std::mem::replace(&mut self.selection, next.clone());
        let mut mutations = Vec::new();
        for id in previous.difference(&next) {
            if self.graph.contains_cell(id) {
                mutations.push(Mutation::SetHighlight {
                    id: id.clone(),
                    highlight: Highlight::Selection,
                    on: false,
                });
            }
        }
        for id in next.difference(&previous) {
            mutations.push(Mutation::SetHighlight {
                id: id.clone(),
                highlight: Highlight::Selection,
                on: true,
            });
        }
        self.apply_visual(&mutations)?;
        self.emit_selection_changed();
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<(), EngineError> {
        self.select(&[])
    }

    // ----- undo / redo ------------------------------------------------------

    /// Plays back the most recent history record in reverse. Recording is
    /// suspended for the duration (restored even on error), restored cells
    /// are stripped of transient visual styling, and the selection is
    /// cleared — restored cells must not appear pre-selected.
    pub fn undo(&mut self) -> Result<bool, EngineError> {
        let Some(record) = self.history.pop_undo() else {
            return Ok(false);
        };
        let inverted: Vec<CellChange> = record
            .changes()
            .iter()
            .rev()
            .map(CellChange::inverted)
            .collect();
        let result: Result<(), EngineError> = self.with_recording_suspended(|engine| {
            for change in &inverted {
                ops::apply_change(&mut engine.graph, change).map_err(EngineError::Inconsistent)?;
            }
            Ok(())
        });
        result?;
        self.after_playback(&inverted)?;
        Ok(true)
    }

    /// Re-applies the most recently undone record.
    pub fn redo(&mut self) -> Result<bool, EngineError> {
        let Some(record) = self.history.pop_redo() else {
            return Ok(false);
        };
        let result: Result<(), EngineError> = self.with_recording_suspended(|engine| {
            for change in record.changes() {
                ops::apply_change(&mut engine.graph, change).map_err(EngineError::Inconsistent)?;
            }
            Ok(())
        });
        result?;
        self.after_playback(record.changes())?;
        Ok(true)
    }

    fn after_playback(&mut self, changes: &[CellChange]) -> Result<(), EngineError> {
        self.tick += 1;
        self.strip_transient_styles();
        self.invalidate_port_caches(changes);
        self.resync_port_visibility(changes);
        if !self.selection.is_empty() {
            self.selection.clear();
            self.emit_selection_changed();
        }
        self.emit_history_changed();
        self.emit_change_events(changes);
        Ok(())
    }

    /// Removes transient visual styling (selection highlight, hover glow,
    /// drag preview) that might have been captured in a restored snapshot.
    fn strip_transient_styles(&mut self) {
        let node_ids: Vec<CellId> = self.graph.nodes().keys().cloned().collect();
        for id in node_ids {
            if let Some(node) = self.graph.node_mut(&id) {
                for path in TRANSIENT_STYLE_PATHS {
                    node.attrs_mut().remove(path);
                }
            }
        }
        let edge_ids: Vec<CellId> = self.graph.edges().keys().cloned().collect();
        for id in edge_ids {
            if let Some(edge) = self.graph.edge_mut(&id) {
                for path in TRANSIENT_STYLE_PATHS {
                    edge.attrs_mut().remove(path);
                }
            }
        }
    }

    // ----- bulk load & repair -----------------------------------------------

    /// Marks the start of a bulk diagram load: nothing recorded, nothing
    /// notified until [`Engine::finish_bulk_load`].
    pub fn begin_bulk_load(&mut self) {
        self.bulk_loading = true;
    }

    pub fn finish_bulk_load(&mut self) {
        self.bulk_loading = false;
        self.port_cache.invalidate_all();
    }

    /// Replaces the session's graph with a freshly deserialized snapshot.
    /// History, gestures, selection, and caches reset; returns the loader's
    /// findings.
    pub fn load_snapshot(&mut self, snapshot: &DiagramSnapshot) -> Vec<SnapshotIssue> {
        self.begin_bulk_load();
        let (graph, issues) = CellGraph::from_snapshot(snapshot);
        self.graph = graph;
        self.history.clear();
        self.gestures = GestureTracker::new();
        self.selection.clear();
        self.group_changes.clear();
        self.group_record.clear();
        self.group_events.clear();
        self.finish_bulk_load();
        self.emit_history_changed();
        issues
    }

    /// Post-load repair pass: corrects embedding and z-order violations and
    /// reports malformed port data. Never touches history. Running it twice
    /// finds nothing the second time.
    pub fn validate_and_fix_loaded_diagram(&mut self) -> RepairReport {
        self.tick += 1;
        let tick = self.tick;
        repair::validate_and_fix(&mut self.graph, &mut self.port_cache, tick)
    }

    // ----- internals --------------------------------------------------------

    /// Playback restores and removes edges; the endpoints' port visibility
    /// must track connection state again afterwards — a port with a live
    /// edge reference is never hidden.
    fn resync_port_visibility(&mut self, changes: &[CellChange]) {
        let mut touched: BTreeSet<CellId> = BTreeSet::new();
        for change in changes {
            match change {
                CellChange::EdgeAdded { edge } | CellChange::EdgeRemoved { edge } => {
                    touched.insert(edge.source().node().clone());
                    touched.insert(edge.target().node().clone());
                }
                CellChange::Source { from, to, .. } | CellChange::Target { from, to, .. } => {
                    touched.insert(from.node().clone());
                    touched.insert(to.node().clone());
                }
                _ => {}
            }
        }
        let tick = self.tick;
        for node in touched {
            ports::update_node_port_visibility(&mut self.graph, &mut self.port_cache, &node, tick);
        }
    }

    fn invalidate_port_caches(&mut self, changes: &[CellChange]) {
        for change in changes {
            match change {
                CellChange::EdgeAdded { edge } | CellChange::EdgeRemoved { edge } => {
                    self.port_cache.invalidate(edge.source().node());
                    self.port_cache.invalidate(edge.target().node());
                }
                CellChange::Source { from, to, .. } | CellChange::Target { from, to, .. } => {
                    self.port_cache.invalidate(from.node());
                    self.port_cache.invalidate(to.node());
                }
                CellChange::NodeRemoved { node } => {
                    self.port_cache.invalidate(node.id());
                }
                _ => {}
            }
        }
    }

    fn emit_change_events(&mut self, changes: &[CellChange]) {
        if self.bulk_loading {
            return;
        }
        for event in events_for(changes) {
            self.events.push_back(event);
        }
    }

    fn emit_history_changed(&mut self) {
        if self.bulk_loading {
            return;
        }
        self.events.push_back(EngineEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn emit_selection_changed(&mut self) {
        let selected: Vec<CellId> = self.selection.iter().cloned().collect();
        self.events
            .push_back(EngineEvent::SelectionChanged { selected });
    }
}

fn events_for(changes: &[CellChange]) -> Vec<EngineEvent> {
    changes
        .iter()
        .filter_map(|change| match change {
            CellChange::NodeAdded { node } => Some(EngineEvent::NodeAdded {
                id: node.id().clone(),
            }),
            CellChange::NodeRemoved { node } => Some(EngineEvent::NodeRemoved {
                id: node.id().clone(),
            }),
            CellChange::EdgeAdded { edge } => Some(EngineEvent::EdgeAdded {
                id: edge.id().clone(),
            }),
            CellChange::EdgeRemoved { edge } => Some(EngineEvent::EdgeRemoved {
                id: edge.id().clone(),
            }),
            CellChange::Geometry { id, from, to } => {
                if from.width == to.width && from.height == to.height {
                    Some(EngineEvent::NodeMoved {
                        id: id.clone(),
                        from: *from,
                        to: *to,
                    })
                } else {
                    Some(EngineEvent::NodeResized {
                        id: id.clone(),
                        from: *from,
                        to: *to,
                    })
                }
            }
            _ => None,
        })
        .collect()
}

/// Single start→end change for a finalized gesture, or `None` when the
/// gesture ended where it began.
fn gesture_change(done: &FinalizedGesture) -> Option<CellChange> {
    match (&done.initial, &done.fin) {
        (GestureState::Box(from), GestureState::Box(to)) if from != to => {
            Some(CellChange::Geometry {
                id: done.cell.clone(),
                from: *from,
                to: *to,
            })
        }
        (GestureState::Waypoints(from), GestureState::Waypoints(to)) if from != to => {
            Some(CellChange::Waypoints {
                id: done.cell.clone(),
                from: from.clone(),
                to: to.clone(),
            })
        }
        _ => None,
    }
}

/// Lifts a just-added edge to the max of its endpoint layers.
fn edge_z_plan(graph: &CellGraph, edge_id: &CellId) -> Option<(CellId, i32)> {
    let edge = graph.edge(edge_id)?;
    let source_z = graph.node(edge.source().node())?.z_order();
    let target_z = graph.node(edge.target().node())?.z_order();
    let new_z = source_z.max(target_z);
    (new_z != edge.z_order()).then(|| (edge_id.clone(), new_z))
}

#[cfg(test)]
mod tests;
