//! # Monitor transforms
//!
//! The eight ways a monitor can be oriented: four rotations, each with
//! an optional horizontal flip. The numeric layout matches the display
//! protocol's transform encoding (rotations in 0..=3, flipped variants
//! in 4..=7) and the composition arithmetic depends on it, so the
//! discriminants must never be reordered.

use wayland_client::protocol::wl_output;

use crate::orientation::Orientation;

/// Output transform: a rotation, optionally mirrored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u32)]
pub enum MonitorTransform {
    Normal = 0,
    Rotate90 = 1,
    Rotate180 = 2,
    Rotate270 = 3,
    Flipped = 4,
    Flipped90 = 5,
    Flipped180 = 6,
    Flipped270 = 7,
}

/// `Flipped` sits exactly at this value; it is the modulus boundary of
/// the rotation span and the offset of the mirrored half.
const FLIP_OFFSET: u32 = MonitorTransform::Flipped as u32;

impl MonitorTransform {
    /// Every transform, in protocol order.
    pub const ALL: [MonitorTransform; 8] = [
        Self::Normal,
        Self::Rotate90,
        Self::Rotate180,
        Self::Rotate270,
        Self::Flipped,
        Self::Flipped90,
        Self::Flipped180,
        Self::Flipped270,
    ];

    fn from_index(index: u32) -> Self {
        match index {
            0 => Self::Normal,
            1 => Self::Rotate90,
            2 => Self::Rotate180,
            3 => Self::Rotate270,
            4 => Self::Flipped,
            5 => Self::Flipped90,
            6 => Self::Flipped180,
            7 => Self::Flipped270,
            _ => unreachable!("transform index out of range: {index}"),
        }
    }

    /// Whether the transform swaps width and height.
    pub fn is_rotated(self) -> bool {
        self as u32 % 2 == 1
    }

    /// Whether the transform mirrors the output.
    pub fn is_flipped(self) -> bool {
        self as u32 >= FLIP_OFFSET
    }

    /// The transform a sensor orientation asks for. Undefined readings
    /// leave the output untouched.
    pub fn from_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::BottomUp => Self::Rotate180,
            Orientation::LeftUp => Self::Rotate90,
            Orientation::RightUp => Self::Rotate270,
            _ => Self::Normal,
        }
    }

    /// Mirror-image partner of the transform.
    fn flip(self) -> Self {
        match self {
            Self::Normal => Self::Flipped,
            Self::Rotate90 => Self::Flipped270,
            Self::Rotate180 => Self::Flipped180,
            Self::Rotate270 => Self::Flipped90,
            Self::Flipped => Self::Normal,
            Self::Flipped90 => Self::Rotate270,
            Self::Flipped180 => Self::Rotate180,
            Self::Flipped270 => Self::Rotate90,
        }
    }

    /// Inverse element. Pure rotations invert by swapping 90 and 270;
    /// every flipped transform is an involution and inverts to itself.
    pub fn invert(self) -> Self {
        match self {
            Self::Rotate90 => Self::Rotate270,
            Self::Rotate270 => Self::Rotate90,
            other => other,
        }
    }

    /// Compose `self` with `other`, as a rotation followed by an
    /// optional flip.
    ///
    /// Dihedral-group multiplication on the raw protocol values: when
    /// `other` mirrors, the base is flipped first; the rotation amounts
    /// then add modulo the rotation span, and the flip offset is
    /// restored if the pre-addition value was in the mirrored half.
    pub fn compose(self, other: Self) -> Self {
        let mut base = self;
        if other.is_flipped() {
            base = base.flip();
        }
        let flipped = base.is_flipped();

        let mut result = (base as u32 + other as u32) % FLIP_OFFSET;
        if flipped {
            result += FLIP_OFFSET;
        }

        Self::from_index(result)
    }
}

impl From<MonitorTransform> for wl_output::Transform {
    fn from(transform: MonitorTransform) -> Self {
        match transform {
            MonitorTransform::Normal => Self::Normal,
            MonitorTransform::Rotate90 => Self::_90,
            MonitorTransform::Rotate180 => Self::_180,
            MonitorTransform::Rotate270 => Self::_270,
            MonitorTransform::Flipped => Self::Flipped,
            MonitorTransform::Flipped90 => Self::Flipped90,
            MonitorTransform::Flipped180 => Self::Flipped180,
            MonitorTransform::Flipped270 => Self::Flipped270,
        }
    }
}

impl TryFrom<wl_output::Transform> for MonitorTransform {
    type Error = ();

    fn try_from(transform: wl_output::Transform) -> Result<Self, ()> {
        match transform {
            wl_output::Transform::Normal => Ok(Self::Normal),
            wl_output::Transform::_90 => Ok(Self::Rotate90),
            wl_output::Transform::_180 => Ok(Self::Rotate180),
            wl_output::Transform::_270 => Ok(Self::Rotate270),
            wl_output::Transform::Flipped => Ok(Self::Flipped),
            wl_output::Transform::Flipped90 => Ok(Self::Flipped90),
            wl_output::Transform::Flipped180 => Ok(Self::Flipped180),
            wl_output::Transform::Flipped270 => Ok(Self::Flipped270),
            _ => Err(()),
        }
    }
}
