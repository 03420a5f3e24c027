//! Property tests for fusion range safety.
//!
//! Whatever pixel content and exposure values the brackets carry, fusion
//! must never emit NaN or leave the display range, and the tone-map
//! operator must accept any bias without panicking.

use hdrbracket::fusion::{tonemap, HdrFusionEngine};
use hdrbracket::types::{Frame, FrameSet, RadianceMap};
use proptest::prelude::*;

const WIDTH: u32 = 4;
const HEIGHT: u32 = 4;
const PIXELS: usize = (WIDTH * HEIGHT) as usize;

fn arb_frame() -> impl Strategy<Value = Frame> {
    (
        prop::collection::vec(any::<u8>(), PIXELS),
        100u64..1_000_000,
    )
        .prop_map(|(data, exposure_us)| {
            Frame::new(data, WIDTH, HEIGHT, 1, exposure_us, "prop".to_string())
        })
}

proptest! {
    #[test]
    fn fuse_never_produces_nan(frames in prop::collection::vec(arb_frame(), 1..5)) {
        let engine = HdrFusionEngine::default();
        let set = FrameSet::from_frames(frames);

        let output = engine.fuse(&set).unwrap();
        prop_assert!(output.radiance.data.iter().all(|v| v.is_finite()));
        prop_assert_eq!(output.tone_mapped.data.len(), PIXELS);
    }

    #[test]
    fn exposure_fusion_never_panics(frames in prop::collection::vec(arb_frame(), 1..5)) {
        let engine = HdrFusionEngine::default();
        let set = FrameSet::from_frames(frames);

        let image = engine.fuse_exposures(&set).unwrap();
        prop_assert_eq!(image.data.len(), PIXELS);
    }

    #[test]
    fn tone_map_accepts_any_bias(
        values in prop::collection::vec(0.0f32..1e6, PIXELS),
        bias in -10.0f32..10.0,
    ) {
        let radiance = RadianceMap {
            width: WIDTH,
            height: HEIGHT,
            channels: 1,
            data: values,
        };

        let image = tonemap::tone_map(&radiance, bias);
        prop_assert_eq!(image.data.len(), PIXELS);
        prop_assert_eq!((image.width, image.height), (WIDTH, HEIGHT));
    }

    #[test]
    fn tone_map_is_deterministic(
        values in prop::collection::vec(0.0f32..1e4, PIXELS),
        bias in 0.05f32..1.0,
    ) {
        let radiance = RadianceMap {
            width: WIDTH,
            height: HEIGHT,
            channels: 1,
            data: values,
        };

        let a = tonemap::tone_map(&radiance, bias);
        let b = tonemap::tone_map(&radiance, bias);
        prop_assert_eq!(a, b);
    }
}
