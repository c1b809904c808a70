// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use thiserror::Error;

use crate::types::Stage;

/// Top-level error type for all Bildwerk operations.
///
/// Every variant is scoped to a single batch item: the handler logs it and
/// moves on to the next record.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Event source --
    #[error("unable to parse event record: {0}")]
    EventParse(String),

    // -- Collaborators --
    #[error("failed to fetch {key} from {bucket}: {detail}")]
    Fetch {
        bucket: String,
        key: String,
        detail: String,
    },

    #[error("failed to store {key} in {bucket}: {detail}")]
    StorageWrite {
        bucket: String,
        key: String,
        detail: String,
    },

    #[error("failed to publish notification to {topic}: {detail}")]
    Notify { topic: String, detail: String },

    // -- Pipeline --
    #[error("image decoding failed: {0}")]
    ImageDecode(String),

    #[error("image encoding failed: {0}")]
    ImageEncode(String),

    // -- Configuration / plumbing --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BildwerkError {
    /// The batch stage this error belongs to, used in per-item reports.
    pub fn stage(&self) -> Stage {
        match self {
            Self::EventParse(_) => Stage::Parse,
            Self::Fetch { .. } => Stage::Fetch,
            Self::ImageDecode(_) | Self::ImageEncode(_) => Stage::Stylize,
            Self::StorageWrite { .. } => Stage::Store,
            Self::Notify { .. } => Stage::Notify,
            Self::Config(_) | Self::Io(_) | Self::Serialization(_) => Stage::Setup,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;
