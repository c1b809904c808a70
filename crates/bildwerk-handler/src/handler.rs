// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch handler — runs fetch → stylize → store → notify for every record of
// a storage event. Each record is isolated: a failure is reported for that
// item and processing moves on.

use bildwerk_core::error::Result;
use bildwerk_core::{ObjectRef, Stage, Transformation};
use bildwerk_imaging::stylize;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::event::{extract_object_ref, parse_records};
use crate::services::Services;

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemOutcome {
    Stylized {
        source: ObjectRef,
        destination: ObjectRef,
        transformation: Transformation,
        content_type: String,
        width: u32,
        height: u32,
        etag: String,
        message_id: String,
    },
    /// The record named a bucket other than the configured source.
    Skipped { source: ObjectRef, reason: String },
    Failed {
        /// Absent when the record itself could not be parsed.
        source: Option<ObjectRef>,
        stage: Stage,
        error: String,
    },
}

/// Per-record outcomes of one event, in record order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn stylized(&self) -> usize {
        self.count(|item| matches!(item, ItemOutcome::Stylized { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|item| matches!(item, ItemOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|item| matches!(item, ItemOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| predicate(item)).count()
    }
}

/// Completion notification text.
pub fn notification_message(
    source_key: &str,
    transformation: Transformation,
    destination_bucket: &str,
    destination_key: &str,
) -> String {
    format!(
        "Image {source_key} has been {transformation} and uploaded to {destination_bucket} as {destination_key}"
    )
}

/// Process every record of `event`.
#[instrument(skip_all)]
pub fn handle_event(services: &Services, event: &Value) -> BatchReport {
    let records = parse_records(event);
    info!(records = records.len(), "Handling event");

    let items: Vec<ItemOutcome> = records
        .into_iter()
        .map(|record| handle_record(services, record))
        .collect();
    let report = BatchReport { items };

    info!(
        stylized = report.stylized(),
        skipped = report.skipped(),
        failed = report.failed(),
        "Event handled"
    );
    report
}

fn handle_record(services: &Services, record: &Value) -> ItemOutcome {
    let source = match extract_object_ref(record) {
        Ok(source) => source,
        Err(err) => {
            error!(error = %err, "Unable to parse event record");
            return ItemOutcome::Failed {
                source: None,
                stage: err.stage(),
                error: err.to_string(),
            };
        }
    };

    if let Some(expected) = services.config().source_bucket.as_deref() {
        if source.bucket != expected {
            info!(%source, expected, "Skipping object from unexpected bucket");
            return ItemOutcome::Skipped {
                reason: format!("bucket {} is not {expected}", source.bucket),
                source,
            };
        }
    }

    match process_object(services, &source) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(%source, stage = ?err.stage(), error = %err, "Failed to process object");
            ItemOutcome::Failed {
                source: Some(source),
                stage: err.stage(),
                error: err.to_string(),
            }
        }
    }
}

#[instrument(skip_all, fields(source = %source))]
fn process_object(services: &Services, source: &ObjectRef) -> Result<ItemOutcome> {
    let config = services.config();

    let object = services.store().get_object(&source.bucket, &source.key)?;
    let stylized = stylize(&object.bytes, Some(&object.content_type), &config.stylize)?;

    let destination = ObjectRef::new(
        config.destination_bucket.clone(),
        config.destination_key(&source.key),
    );
    let receipt = services.store().put_object(
        &destination.bucket,
        &destination.key,
        &stylized.bytes,
        &stylized.content_type,
    )?;

    let message = notification_message(
        &source.key,
        stylized.transformation,
        &destination.bucket,
        &destination.key,
    );
    let message_id = services.notifier().publish(&config.topic, &message)?;

    info!(%destination, transformation = %stylized.transformation, "Object stylized");
    Ok(ItemOutcome::Stylized {
        source: source.clone(),
        destination,
        transformation: stylized.transformation,
        content_type: stylized.content_type,
        width: stylized.width,
        height: stylized.height,
        etag: receipt.etag,
        message_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use bildwerk_bridge::{MemoryNotifier, MemoryObjectStore};
    use bildwerk_core::HandlerConfig;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
    use serde_json::json;

    fn png(image: DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png).unwrap();
        buffer
    }

    fn record(bucket: &str, key: &str) -> Value {
        json!({ "s3": { "bucket": { "name": bucket }, "object": { "key": key } } })
    }

    struct Fixture {
        store: Arc<MemoryObjectStore>,
        notifier: Arc<MemoryNotifier>,
        services: Services,
    }

    fn fixture(config: HandlerConfig) -> Fixture {
        let store = Arc::new(MemoryObjectStore::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let services = Services::new(store.clone(), notifier.clone(), config);
        Fixture {
            store,
            notifier,
            services,
        }
    }

    fn red_png() -> Vec<u8> {
        png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            20,
            20,
            Rgb([255, 0, 0]),
        )))
    }

    #[test]
    fn stylizes_stores_and_notifies() {
        let fx = fixture(HandlerConfig::default());
        fx.store.insert("uploads", "cat.png", red_png(), "image/png");

        let report = handle_event(&fx.services, &json!({ "Records": [record("uploads", "cat.png")] }));
        assert_eq!(report.stylized(), 1);

        let stored = fx.store.object("image-sized-1", "stylized/cat.png").expect("stored");
        assert_eq!(stored.content_type, "image/png");

        let published = fx.notifier.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "image-stylized");
        assert_eq!(
            published[0].message,
            "Image cat.png has been cartoonized and uploaded to image-sized-1 as stylized/cat.png"
        );

        match &report.items[0] {
            ItemOutcome::Stylized {
                transformation,
                width,
                height,
                message_id,
                ..
            } => {
                assert_eq!(*transformation, Transformation::Cartoonized);
                assert_eq!((*width, *height), (20, 20));
                assert_eq!(message_id, &published[0].message_id);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn monochrome_is_colorized() {
        let fx = fixture(HandlerConfig::default());
        let gray = png(DynamicImage::ImageLuma8(GrayImage::from_fn(16, 16, |x, _| {
            Luma([(x * 16) as u8])
        })));
        fx.store.insert("uploads", "gray.png", gray, "image/png");

        let report = handle_event(&fx.services, &record("uploads", "gray.png"));
        assert!(matches!(
            &report.items[0],
            ItemOutcome::Stylized { transformation: Transformation::Colorized, .. }
        ));
        assert!(fx.notifier.published()[0].message.contains("has been colorized"));
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let fx = fixture(HandlerConfig::default());
        fx.store.insert("uploads", "good.png", red_png(), "image/png");
        fx.store.insert("uploads", "bad.png", b"garbage".to_vec(), "image/png");

        let event = json!({ "Records": [
            record("uploads", "bad.png"),
            record("uploads", "missing.png"),
            json!({ "s3": {} }),
            record("uploads", "good.png"),
        ]});
        let report = handle_event(&fx.services, &event);

        assert_eq!(report.items.len(), 4);
        assert_eq!(report.stylized(), 1);
        assert_eq!(report.failed(), 3);

        let stages: Vec<Stage> = report
            .items
            .iter()
            .filter_map(|item| match item {
                ItemOutcome::Failed { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect();
        assert_eq!(stages, vec![Stage::Stylize, Stage::Fetch, Stage::Parse]);

        // Nothing was written for the failed items.
        assert_eq!(fx.store.keys("image-sized-1"), vec!["stylized/good.png"]);
    }

    #[test]
    fn foreign_bucket_is_skipped() {
        let fx = fixture(HandlerConfig {
            source_bucket: Some("uploads".into()),
            ..HandlerConfig::default()
        });
        fx.store.insert("elsewhere", "x.png", red_png(), "image/png");

        let report = handle_event(&fx.services, &record("elsewhere", "x.png"));
        assert_eq!(report.skipped(), 1);
        assert!(fx.notifier.published().is_empty());
        assert!(fx.store.keys("image-sized-1").is_empty());
    }

    #[test]
    fn storage_and_notify_failures_are_reported() {
        let fx = fixture(HandlerConfig::default());
        fx.store.insert("uploads", "a.png", red_png(), "image/png");
        fx.notifier.fail_topic("image-stylized");

        let report = handle_event(&fx.services, &record("uploads", "a.png"));
        assert!(matches!(
            &report.items[0],
            ItemOutcome::Failed { stage: Stage::Notify, .. }
        ));

        fx.store.fail_puts_to("image-sized-1");
        let report = handle_event(&fx.services, &record("uploads", "a.png"));
        assert!(matches!(
            &report.items[0],
            ItemOutcome::Failed { stage: Stage::Store, .. }
        ));
    }

    #[test]
    fn encoded_keys_are_decoded_before_fetch() {
        let fx = fixture(HandlerConfig::default());
        fx.store.insert("uploads", "my photos/cat 1.png", red_png(), "image/png");

        let report = handle_event(&fx.services, &record("uploads", "my+photos/cat%201.png"));
        assert_eq!(report.stylized(), 1);
        assert!(fx.store.object("image-sized-1", "stylized/my photos/cat 1.png").is_some());
    }

    #[test]
    fn report_serializes_with_status_tag() {
        let report = BatchReport {
            items: vec![ItemOutcome::Failed {
                source: None,
                stage: Stage::Parse,
                error: "bad".into(),
            }],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["items"][0]["status"], "failed");
        assert_eq!(value["items"][0]["stage"], "parse");
    }
}
