// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types and trait seams for the Warden relay.
//!
//! Defines the error type shared across all crates, the domain records
//! persisted by the gateway (messages, membership events, the editors
//! roster), and the two abstraction boundaries everything else depends
//! on: [`EventStore`] for persistence transports and [`ChatControl`]
//! for outbound platform calls.

pub mod error;
pub mod traits;
pub mod types;

pub use error::WardenError;
pub use traits::{ChatControl, EventStore};
pub use types::*;
