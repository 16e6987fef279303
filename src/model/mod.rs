// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: cells, geometry, the cell-graph arena, snapshots.
//!
//! The graph arena keys nodes and edges by id and stores the embedding
//! relation as parent ids, so cycle checks reduce to id walks.

pub mod cell;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod geometry;
pub mod graph;
pub mod ids;

pub use cell::{Edge, Endpoint, Node, NodeKind, Port};
pub use geometry::{Point, Rect};
pub use graph::{
    CellGraph, DiagramSnapshot, EdgeSnapshot, GraphError, NodeSnapshot, PortSnapshot,
    SnapshotIssue,
};
pub use ids::{CellId, Id, IdError, PortId};
