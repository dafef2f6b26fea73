//! # Orientation
//!
//! Discrete device orientations, abstracted from the raw accelerometer
//! strings the sensor service reports.

use std::fmt;

/// Physical orientation of the device, as reported by the accelerometer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// The sensor has not produced a usable reading.
    #[default]
    Undefined,
    Normal,
    /// Rotated by 180 degrees; the top of the device points down.
    BottomUp,
    /// The left edge of the device points up.
    LeftUp,
    /// The right edge of the device points up.
    RightUp,
}

impl Orientation {
    /// Map a raw `AccelerometerOrientation` string onto an orientation.
    /// Unrecognized readings collapse to [`Orientation::Undefined`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "normal" => Self::Normal,
            "bottom-up" => Self::BottomUp,
            "left-up" => Self::LeftUp,
            "right-up" => Self::RightUp,
            _ => Self::Undefined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Normal => "normal",
            Self::BottomUp => "bottom-up",
            Self::LeftUp => "left-up",
            Self::RightUp => "right-up",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
