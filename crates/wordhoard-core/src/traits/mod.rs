// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions implemented by the storage crates.

pub mod store;

pub use store::StudyStore;
