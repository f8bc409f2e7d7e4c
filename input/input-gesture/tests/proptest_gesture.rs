//! Property-based tests for gesture resolution.
//!
//! Run with: cargo test -p input-gesture -- proptest

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use input_gesture::{GestureEvent, GestureResolver, PanState, ResetTarget, ScaleBounds};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Any f32 the detector could plausibly hand over, including junk.
fn arb_factor() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => 0.01..20.0f32,
        1 => -5.0..=0.0f32,
        1 => Just(f32::NAN),
        1 => Just(f32::INFINITY),
    ]
}

fn arb_bounds() -> impl Strategy<Value = ScaleBounds> {
    (0.01..2.0f32, 0.0..10.0f32).prop_map(|(min, span)| ScaleBounds::new(min, min + span).unwrap())
}

fn arb_event() -> impl Strategy<Value = GestureEvent> {
    prop_oneof![
        arb_factor().prop_map(|factor| GestureEvent::Scale { factor }),
        (-100.0..100.0f32, -100.0..100.0f32).prop_map(|(dx, dy)| GestureEvent::Pan { dx, dy }),
        prop_oneof![
            Just(ResetTarget::Pan),
            Just(ResetTarget::Scale),
            Just(ResetTarget::All)
        ]
        .prop_map(|target| GestureEvent::Reset { target }),
    ]
}

// =============================================================================
// Invariants
// =============================================================================

proptest! {
    /// Scale stays within its bounds after every update.
    #[test]
    fn scale_always_within_bounds(
        bounds in arb_bounds(),
        factors in prop::collection::vec(arb_factor(), 0..64),
    ) {
        let mut resolver = GestureResolver::new(bounds);
        for factor in factors {
            let state = resolver.on_scale_delta(factor);
            prop_assert!(bounds.contains(state.factor()), "{} outside {bounds:?}", state.factor());
        }
    }

    /// Any event sequence keeps scale bounded and pan finite.
    #[test]
    fn event_sequences_stay_sane(events in prop::collection::vec(arb_event(), 0..64)) {
        let mut resolver = GestureResolver::default();
        for event in events {
            resolver.apply(event);
            prop_assert!(ScaleBounds::DEFAULT.contains(resolver.scale().factor()));
            prop_assert!(resolver.pan().dx.is_finite() && resolver.pan().dy.is_finite());
        }
    }

    /// Pan reset is idempotent and leaves scale untouched.
    #[test]
    fn reset_pan_idempotent(events in prop::collection::vec(arb_event(), 0..32)) {
        let mut resolver = GestureResolver::default();
        for event in events {
            resolver.apply(event);
        }
        let scale = resolver.scale();
        prop_assert_eq!(resolver.reset_pan(), PanState::ZERO);
        prop_assert_eq!(resolver.reset_pan(), PanState::ZERO);
        prop_assert_eq!(resolver.scale(), scale);
    }
}
