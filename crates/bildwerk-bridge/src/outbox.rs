// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outbox notifier — appends each published message as one JSON line to
// `{root}/outbox/{topic}.jsonl`.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::traits::Notifier;

pub(crate) const OUTBOX_DIR: &str = "outbox";

/// One published notification as written to the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub message_id: Uuid,
    pub topic: String,
    pub message: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    root: PathBuf,
}

impl OutboxNotifier {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn topic_path(&self, topic: &str) -> PathBuf {
        self.root.join(OUTBOX_DIR).join(format!("{topic}.jsonl"))
    }

    /// Every message published to `topic` so far, oldest first.
    pub fn read_topic(&self, topic: &str) -> Result<Vec<OutboxMessage>> {
        validate_topic(topic)?;
        let file = match std::fs::File::open(self.topic_path(topic)) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut messages = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                messages.push(serde_json::from_str(&line)?);
            }
        }
        Ok(messages)
    }
}

impl Notifier for OutboxNotifier {
    #[instrument(skip(self, message))]
    fn publish(&self, topic: &str, message: &str) -> Result<String> {
        let notify_error = |detail: String| BildwerkError::Notify {
            topic: topic.to_owned(),
            detail,
        };
        validate_topic(topic).map_err(|err| notify_error(err.to_string()))?;

        let record = OutboxMessage {
            message_id: Uuid::new_v4(),
            topic: topic.to_owned(),
            message: message.to_owned(),
            published_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&record).map_err(|err| notify_error(err.to_string()))?;
        line.push('\n');

        append(&self.topic_path(topic), line.as_bytes())
            .map_err(|err| notify_error(err.to_string()))?;

        info!(message_id = %record.message_id, "Notification published");
        Ok(record.message_id.to_string())
    }
}

fn append(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(data)
}

fn validate_topic(topic: &str) -> Result<()> {
    if topic.is_empty() || topic.starts_with('.') || topic.contains(['/', '\\']) {
        return Err(BildwerkError::Config(format!("invalid topic name: {topic:?}")));
    }
    Ok(())
}
