// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook server built on axum.
//!
//! One POST route receives Bot API update envelopes, one GET route
//! answers health probes. The platform sees only three outcomes: 200 on
//! success, 403 on a failed content-type or secret check, 500 on a
//! processing error (and will redeliver the update later).

pub mod server;

pub use server::{build_router, start_server, WebhookState};
