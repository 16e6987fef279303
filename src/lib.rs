// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus — graph consistency engine for data-flow diagram editors.
//!
//! Validates embeddings, maintains z-order layering, tracks port
//! connections, and classifies mutations into undo history with gesture
//! coalescing. The [`engine::Engine`] is the single entry point for a
//! session; everything below it is pure and synchronous.

pub mod embedding;
pub mod engine;
pub mod history;
pub mod model;
pub mod ops;
pub mod ports;
pub mod repair;
pub mod zorder;
