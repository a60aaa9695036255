// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query operations over the SQLite schema.

pub mod membership;
pub mod messages;
pub mod roster;

use chrono::{DateTime, Utc};

/// Render a timestamp in the canonical stored form.
pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
