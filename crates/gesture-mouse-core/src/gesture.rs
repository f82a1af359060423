//! Gesture vocabulary.

use std::fmt;

use crate::finger::FingerMask;

/// Role a detected hand plays for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandRole {
    /// The dominant hand: cursor, clicks, drag, brightness/volume pinch
    Major,
    /// The other hand: scroll pinch and volume/brightness
    Minor,
}

/// Recognized hand gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// All four fingers folded
    Fist,
    /// Only the pinky extended
    Pinky,
    /// Only the ring finger extended
    Ring,
    /// Middle finger alone, or index+middle held together at different depths
    Mid,
    /// Middle, ring and pinky extended
    Last3,
    /// Only the index finger extended
    Index,
    /// Index and middle extended
    First2,
    /// All four fingers extended
    Last4,
    /// Open hand; also the initial and idle state
    Palm,
    /// Index and middle spread apart: cursor tracking
    VGest,
    /// Index and middle touching side by side: double click
    TwoFingerClosed,
    /// Thumb-index pinch on the major hand
    PinchMajor,
    /// Thumb-index pinch on the minor hand
    PinchMinor,
    /// Index/middle/ring extended with the thumb tucked at the pinky knuckle
    VolumeBrightness,
    /// A finger combination with no assigned gesture
    Unmapped(FingerMask),
}

impl Gesture {
    /// Fixed lookup from finger mask to gesture, used when no geometric rule matched.
    pub fn from_mask(mask: FingerMask) -> Self {
        match mask.bits() {
            0b0000 => Self::Fist,
            0b0001 => Self::Pinky,
            0b0010 => Self::Ring,
            0b0100 => Self::Mid,
            0b0111 => Self::Last3,
            0b1000 => Self::Index,
            0b1100 => Self::First2,
            0b1111 => Self::Last4,
            _ => Self::Unmapped(mask),
        }
    }

    /// Pinch-family gesture for a role.
    pub fn pinch_for(role: HandRole) -> Self {
        match role {
            HandRole::Major => Self::PinchMajor,
            HandRole::Minor => Self::PinchMinor,
        }
    }

    /// Continuous-control family this gesture drives, if any.
    pub fn pinch_family(&self) -> Option<PinchFamily> {
        match self {
            Self::PinchMajor => Some(PinchFamily::Major),
            Self::PinchMinor => Some(PinchFamily::Minor),
            Self::VolumeBrightness => Some(PinchFamily::VolumeBrightness),
            _ => None,
        }
    }

    /// Gestures on the minor hand that take priority over the major hand.
    pub fn overrides_major(&self) -> bool {
        matches!(self, Self::PinchMinor | Self::VolumeBrightness)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fist => f.write_str("FIST"),
            Self::Pinky => f.write_str("PINKY"),
            Self::Ring => f.write_str("RING"),
            Self::Mid => f.write_str("MID"),
            Self::Last3 => f.write_str("LAST3"),
            Self::Index => f.write_str("INDEX"),
            Self::First2 => f.write_str("FIRST2"),
            Self::Last4 => f.write_str("LAST4"),
            Self::Palm => f.write_str("PALM"),
            Self::VGest => f.write_str("V_GEST"),
            Self::TwoFingerClosed => f.write_str("TWO_FINGER_CLOSED"),
            Self::PinchMajor => f.write_str("PINCH_MAJOR"),
            Self::PinchMinor => f.write_str("PINCH_MINOR"),
            Self::VolumeBrightness => f.write_str("VOLUME_BRIGHTNESS"),
            Self::Unmapped(mask) => write!(f, "MASK_{}", mask),
        }
    }
}

/// Gesture families that own a continuous pinch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinchFamily {
    Major,
    Minor,
    VolumeBrightness,
}

impl PinchFamily {
    pub const ALL: [PinchFamily; 3] = [Self::Major, Self::Minor, Self::VolumeBrightness];

    /// Slot index into fixed-size per-family storage.
    pub const fn slot(&self) -> usize {
        match self {
            Self::Major => 0,
            Self::Minor => 1,
            Self::VolumeBrightness => 2,
        }
    }
}
