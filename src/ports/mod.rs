// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Port connection tracking.
//!
//! A port is *connected* iff at least one edge's source or target references
//! that exact (node, port) pair. Connected ports stay visible; unconnected
//! ports are hidden outside of edge-drawing gestures. Results are cached per
//! node and invalidated whenever a touching edge changes. Port visibility is
//! presentation state and never enters the undo history.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use smallvec::SmallVec;

use crate::model::{CellGraph, CellId, PortId};

/// Cached connection state for one node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortState {
    connected: BTreeSet<PortId>,
    visible: BTreeSet<PortId>,
    updated_at: u64,
}

impl PortState {
    pub fn connected(&self) -> &BTreeSet<PortId> {
        &self.connected
    }

    pub fn visible(&self) -> &BTreeSet<PortId> {
        &self.visible
    }

    /// Engine tick at which this entry was last rebuilt.
    pub fn updated_at(&self) -> u64 {
        self.updated_at
    }
}

/// Per-session cache of [`PortState`] entries, owned by the engine —
/// never a process-wide singleton.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortStateCache {
    entries: BTreeMap<CellId, PortState>,
}

impl PortStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, node: &CellId) -> Option<&PortState> {
        self.entries.get(node)
    }

    pub fn invalidate(&mut self, node: &CellId) {
        self.entries.remove(node);
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    fn refresh(&mut self, node: &CellId, graph: &CellGraph, tick: u64) {
        let Some(state) = graph.node(node) else {
            self.entries.remove(node);
            return;
        };
        let connected = connected_ports(graph, node);
        let visible = state
            .ports()
            .iter()
            .filter(|(_, port)| port.visible())
            .map(|(id, _)| id.clone())
            .collect();
        self.entries.insert(
            node.clone(),
            PortState {
                connected,
                visible,
                updated_at: tick,
            },
        );
    }
}

/// Malformed port data found while updating visibility. Warnings degrade
/// gracefully: the affected update is skipped, the rest proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortWarning {
    UnknownPort {
        edge: CellId,
        node: CellId,
        port: PortId,
    },
}

impl fmt::Display for PortWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPort { edge, node, port } => {
                write!(
                    f,
                    "edge '{edge}' references missing port '{port}' on node '{node}', \
                     visibility update skipped"
                )
            }
        }
    }
}

/// Ports on `node` referenced by at least one edge endpoint.
pub fn connected_ports(graph: &CellGraph, node: &CellId) -> BTreeSet<PortId> {
    let mut connected = BTreeSet::new();
    for (_, edge) in graph.edges_touching(node) {
        for endpoint in [edge.source(), edge.target()] {
            if endpoint.node() == node {
                if let Some(port) = endpoint.port() {
                    connected.insert(port.clone());
                }
            }
        }
    }
    connected
}

/// Recomputes connection status for every port on `node`: connected ports
/// become visible, unconnected ports hidden. Missing nodes and nodes
/// without ports are no-ops.
pub fn update_node_port_visibility(
    graph: &mut CellGraph,
    cache: &mut PortStateCache,
    node: &CellId,
    tick: u64,
) {
    let connected = connected_ports(graph, node);
    let Some(state) = graph.node_mut(node) else {
        return;
    };
    if state.ports().is_empty() {
        return;
    }
    for (id, port) in state.ports_mut() {
        port.set_visible(connected.contains(id));
    }
    cache.refresh(node, graph, tick);
}

/// Makes every port on every node visible — used when an edge-drawing
/// gesture begins and all ports must be reachable as drop targets.
pub fn show_all_ports(graph: &mut CellGraph, cache: &mut PortStateCache, tick: u64) {
    let ids: Vec<CellId> = graph.nodes().keys().cloned().collect();
    for id in ids {
        let Some(node) = graph.node_mut(&id) else {
            continue;
        };
        if node.ports().is_empty() {
            continue;
        }
        for port in node.ports_mut().values_mut() {
            port.set_visible(true);
        }
        cache.refresh(&id, graph, tick);
    }
}

/// Hides every port that no edge references — used when an edge-drawing
/// gesture ends. A port with a live edge reference is never hidden.
pub fn hide_unconnected_ports(graph: &mut CellGraph, cache: &mut PortStateCache, tick: u64) {
    let ids: Vec<CellId> = graph.nodes().keys().cloned().collect();
    for id in ids {
        update_node_port_visibility(graph, cache, &id, tick);
    }
}

/// Forces exactly the ports referenced by `edge` visible, leaving unrelated
/// ports untouched. Invoked right after an edge is committed. A referenced
/// port that does not exist on its node yields a warning and is skipped.
pub fn ensure_connected_ports_visible(
    graph: &mut CellGraph,
    cache: &mut PortStateCache,
    edge_id: &CellId,
    tick: u64,
) -> SmallVec<[PortWarning; 2]> {
    let mut warnings = SmallVec::new();
    let Some(edge) = graph.edge(edge_id) else {
        return warnings;
    };

    let endpoints: SmallVec<[(CellId, PortId); 2]> = [edge.source(), edge.target()]
        .into_iter()
        .filter_map(|endpoint| {
            endpoint
                .port()
                .map(|port| (endpoint.node().clone(), port.clone()))
        })
        .collect();

    for (node_id, port_id) in endpoints {
        let Some(node) = graph.node_mut(&node_id) else {
            continue;
        };
        let mut updated = false;
        match node.ports_mut().get_mut(&port_id) {
            Some(port) => {
                port.set_visible(true);
                updated = true;
            }
            None => warnings.push(PortWarning::UnknownPort {
                edge: edge_id.clone(),
                node: node_id.clone(),
                port: port_id.clone(),
            }),
        }
        if updated {
            cache.refresh(&node_id, graph, tick);
        }
    }

    warnings
}
