//! Property-based tests for the pipeline.
//!
//! Run with: cargo test -p input-pipeline -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use input_gesture::{GestureEvent, GestureResolver, ResetTarget, ScaleBounds};
use input_pipeline::{NullSensorService, Pipeline, PipelineConfig, TransformSink, TransformUpdate};
use proptest::prelude::*;
use sensor_types::{RawSample, SampleKind, Timestamp};

// =============================================================================
// Strategies
// =============================================================================

fn arb_event() -> impl Strategy<Value = GestureEvent> {
    prop_oneof![
        (0.05..4.0f32).prop_map(|factor| GestureEvent::Scale { factor }),
        (-50.0..50.0f32, -50.0..50.0f32).prop_map(|(dx, dy)| GestureEvent::Pan { dx, dy }),
        prop_oneof![
            Just(ResetTarget::Pan),
            Just(ResetTarget::Scale),
            Just(ResetTarget::All)
        ]
        .prop_map(|target| GestureEvent::Reset { target }),
    ]
}

fn arb_update() -> impl Strategy<Value = TransformUpdate> {
    (
        prop::option::of(prop_oneof![
            -10.0..1000.0f32,
            Just(f32::NAN),
            Just(f32::INFINITY),
            Just(f32::NEG_INFINITY),
        ]),
        prop::option::of((-10.0..10.0f32, -10.0..10.0f32)),
    )
        .prop_map(|(scale, pan)| {
            let mut update = TransformUpdate::new();
            update.scale = scale;
            update.pan = pan.map(|(dx, dy)| input_gesture::PanState::new(dx, dy));
            update
        })
}

/// Platform events with arbitrary type codes and component counts.
fn arb_platform_event() -> impl Strategy<Value = (i32, Vec<f32>)> {
    (
        prop_oneof![Just(1), Just(2), Just(4), Just(11), -3..30i32],
        prop::collection::vec(-2.0..2.0f32, 0..8),
    )
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Each publish advances the revision by exactly one and merges fields,
    /// and the published scale never leaves the bounds.
    #[test]
    fn sink_revision_counts_publishes(updates in prop::collection::vec(arb_update(), 0..64)) {
        let sink = TransformSink::new();
        let mut expected = sink.read_latest().unwrap();
        for update in &updates {
            let published = sink.publish(*update).unwrap();
            expected = expected.merged(update, ScaleBounds::DEFAULT);
            prop_assert_eq!(published, expected);
            prop_assert!(ScaleBounds::DEFAULT.contains(published.scale));
        }
        prop_assert_eq!(sink.revision(), Some(updates.len() as u64));
    }

    /// Gestures routed through the port match a sequential resolver.
    #[test]
    fn gesture_port_matches_resolver(events in prop::collection::vec(arb_event(), 1..48)) {
        let mut pipeline = Pipeline::new(PipelineConfig::default(), NullSensorService).unwrap();
        pipeline.start().unwrap();
        let port = pipeline.gesture_port().unwrap();

        let mut resolver = GestureResolver::default();
        for event in events {
            let snapshot = port.apply(event).unwrap();
            resolver.apply(event);
            prop_assert_eq!(snapshot.scale, resolver.scale().factor());
            prop_assert_eq!(snapshot.pan, resolver.pan());
        }
    }

    /// Arbitrary platform events never panic, unsupported type codes are
    /// dropped whatever their length, and only well-formed rotation vectors
    /// move the revision.
    #[test]
    fn ingest_is_total(events in prop::collection::vec(arb_platform_event(), 0..64)) {
        let mut pipeline = Pipeline::new(PipelineConfig::default(), NullSensorService).unwrap();
        pipeline.start().unwrap();
        let mut sensors = pipeline.sensor_port().unwrap();
        let render = pipeline.render_handle().unwrap();

        let mut published = 0_u64;
        for (nanos, (code, values)) in (0_i64..).zip(events) {
            let outcome = sensors.on_platform_event(code, &values, nanos);
            if let SampleKind::Unknown(unknown) = SampleKind::from_platform_code(code) {
                prop_assert_eq!(&outcome, &input_pipeline::IngestOutcome::Dropped(unknown));
            }
            if matches!(outcome, input_pipeline::IngestOutcome::Published(_)) {
                published += 1;
                let sample = RawSample::new(SampleKind::RotationVector, &values, Timestamp::zero());
                prop_assert!(sample.is_ok());
            }
            let snapshot = render.read_latest().unwrap();
            prop_assert!(snapshot.euler().is_finite());
        }
        prop_assert_eq!(render.read_latest().unwrap().revision, published);
    }
}
