// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-handler — Turns storage events into stylized images and
// completion notifications.

pub mod event;
pub mod handler;
pub mod services;

pub use handler::{BatchReport, ItemOutcome, handle_event, notification_message};
pub use services::Services;
