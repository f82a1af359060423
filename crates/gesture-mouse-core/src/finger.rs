//! Finger extension encoding.
//!
//! Each of the index, middle, ring and pinky fingers contributes one bit,
//! index in the most significant position. A finger is extended when its tip
//! sits far enough above its knuckle relative to the knuckle's height above
//! the wrist.

use std::fmt;

use crate::landmark::{
    HandLandmarks, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, PINKY_TIP, RING_MCP,
    RING_TIP, WRIST,
};

/// Denominator used when the knuckle-to-wrist distance is too small to divide by.
const MIN_SEGMENT: f32 = 0.01;
const NEGLIGIBLE: f32 = 1e-6;

/// (tip, knuckle, base) landmark indices per encoded finger, index first.
const FINGER_JOINTS: [(usize, usize, usize); 4] = [
    (INDEX_TIP, INDEX_MCP, WRIST),
    (MIDDLE_TIP, MIDDLE_MCP, WRIST),
    (RING_TIP, RING_MCP, WRIST),
    (PINKY_TIP, PINKY_MCP, WRIST),
];

/// 4-bit extension mask: index, middle, ring, pinky (MSB to LSB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FingerMask(u8);

impl FingerMask {
    pub const INDEX: u8 = 0b1000;
    pub const MIDDLE: u8 = 0b0100;
    pub const RING: u8 = 0b0010;
    pub const PINKY: u8 = 0b0001;

    /// Build a mask from raw bits; anything above the low nibble is discarded.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn contains(&self, bits: u8) -> bool {
        self.0 & bits == bits
    }
}

impl fmt::Display for FingerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

/// Extension ratio of one finger. Exposed for diagnostics and tests.
pub fn extension_ratio(hand: &HandLandmarks, tip: usize, knuckle: usize, base: usize) -> f32 {
    let reach = hand.point(tip).signed_distance(hand.point(knuckle));
    let mut segment = hand.point(knuckle).signed_distance(hand.point(base));
    if segment.abs() < NEGLIGIBLE {
        segment = MIN_SEGMENT;
    }
    reach / segment
}

/// Derive the mask for one hand.
pub fn encode(hand: &HandLandmarks, threshold: f32) -> FingerMask {
    let bits = FINGER_JOINTS
        .iter()
        .fold(0u8, |bits, &(tip, knuckle, base)| {
            let extended = extension_ratio(hand, tip, knuckle, base) > threshold;
            (bits << 1) | u8::from(extended)
        });
    FingerMask::from_bits(bits)
}

/// Holds the last computed mask for one hand role.
///
/// A frame without landmarks for the role leaves the previous mask in place.
#[derive(Debug, Clone)]
pub struct FingerStateEncoder {
    threshold: f32,
    mask: FingerMask,
}

impl FingerStateEncoder {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            mask: FingerMask::default(),
        }
    }

    pub fn update(&mut self, hand: Option<&HandLandmarks>) -> FingerMask {
        if let Some(hand) = hand {
            self.mask = encode(hand, self.threshold);
        }
        self.mask
    }

    pub fn mask(&self) -> FingerMask {
        self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::HandBuilder;

    /// Index finger with wrist at y=1.0, knuckle at y=0.5 and the tip at `tip_y`,
    /// all on one vertical line so the ratio is exact.
    fn index_only(tip_y: f32) -> HandLandmarks {
        HandBuilder::right()
            .point(WRIST, 0.5, 1.0, 0.0)
            .point(INDEX_MCP, 0.5, 0.5, 0.0)
            .point(INDEX_TIP, 0.5, tip_y, 0.0)
            .build()
    }

    #[test]
    fn test_ratio_exactly_at_threshold_is_not_extended() {
        let hand = index_only(0.25);
        assert_eq!(extension_ratio(&hand, INDEX_TIP, INDEX_MCP, WRIST), 0.5);
        assert!(!encode(&hand, 0.5).contains(FingerMask::INDEX));
    }

    #[test]
    fn test_ratio_just_above_threshold_is_extended() {
        let hand = index_only(0.24);
        assert!(extension_ratio(&hand, INDEX_TIP, INDEX_MCP, WRIST) > 0.5);
        assert!(encode(&hand, 0.5).contains(FingerMask::INDEX));
    }

    #[test]
    fn test_ratio_just_below_threshold_is_folded() {
        let hand = index_only(0.26);
        assert!(extension_ratio(&hand, INDEX_TIP, INDEX_MCP, WRIST) < 0.5);
        assert!(!encode(&hand, 0.5).contains(FingerMask::INDEX));
    }

    #[test]
    fn test_degenerate_segment_uses_fixed_denominator() {
        let hand = HandBuilder::right()
            .point(WRIST, 0.5, 0.5, 0.0)
            .point(INDEX_MCP, 0.5, 0.5, 0.0)
            .point(INDEX_TIP, 0.5, 0.49, 0.0)
            .build();
        let ratio = extension_ratio(&hand, INDEX_TIP, INDEX_MCP, WRIST);
        assert!(ratio.is_finite());
        assert!((ratio - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_mask_is_index_first() {
        let hand = HandBuilder::right().extended(&[true, false, false, true]).build();
        assert_eq!(encode(&hand, 0.5).bits(), 0b1001);

        let hand = HandBuilder::right().extended(&[false, true, true, false]).build();
        assert_eq!(encode(&hand, 0.5).bits(), 0b0110);
    }

    #[test]
    fn test_missing_hand_keeps_previous_mask() {
        let mut encoder = FingerStateEncoder::new(0.5);
        let hand = HandBuilder::right().extended(&[true, true, false, false]).build();
        assert_eq!(encoder.update(Some(&hand)).bits(), 0b1100);
        assert_eq!(encoder.update(None).bits(), 0b1100);
        assert_eq!(encoder.mask().bits(), 0b1100);
    }
}
