//! CRTC mode descriptions.

use std::sync::Arc;

bitflags::bitflags! {
    /// Hardware sync/scan attributes of a mode. The bit positions
    /// mirror the kernel mode-setting flag encoding and must be kept
    /// bit-for-bit for ioctl compatibility.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct CrtcModeFlags: u32 {
        const PHSYNC = 1 << 0;
        const NHSYNC = 1 << 1;
        const PVSYNC = 1 << 2;
        const NVSYNC = 1 << 3;
        const INTERLACE = 1 << 4;
        const DBLSCAN = 1 << 5;
        const CSYNC = 1 << 6;
        const PCSYNC = 1 << 7;
        const NCSYNC = 1 << 8;
        const HSKEW = 1 << 9;
        const BCAST = 1 << 10;
        const PIXMUX = 1 << 11;
        const DBLCLK = 1 << 12;
        const CLKDIV2 = 1 << 13;
    }
}

/// One display mode: resolution, refresh rate and hardware flags.
///
/// Mode infos are immutable and shared; CRTCs and mode lists hold
/// [`Arc`] handles and the storage goes away with the last one.
#[derive(Clone, Debug, PartialEq)]
pub struct CrtcModeInfo {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: f64,
    pub flags: CrtcModeFlags,
}

impl CrtcModeInfo {
    /// A zeroed mode info behind a fresh handle.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            width: 0,
            height: 0,
            refresh_rate: 0.0,
            flags: CrtcModeFlags::empty(),
        })
    }

    pub fn with_mode(width: u32, height: u32, refresh_rate: f64, flags: CrtcModeFlags) -> Arc<Self> {
        Arc::new(Self {
            width,
            height,
            refresh_rate,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Weak;

    use super::*;

    #[test]
    fn flag_bits_match_wire_encoding() {
        assert_eq!(CrtcModeFlags::PHSYNC.bits(), 1 << 0);
        assert_eq!(CrtcModeFlags::NHSYNC.bits(), 1 << 1);
        assert_eq!(CrtcModeFlags::PVSYNC.bits(), 1 << 2);
        assert_eq!(CrtcModeFlags::NVSYNC.bits(), 1 << 3);
        assert_eq!(CrtcModeFlags::INTERLACE.bits(), 1 << 4);
        assert_eq!(CrtcModeFlags::DBLSCAN.bits(), 1 << 5);
        assert_eq!(CrtcModeFlags::CSYNC.bits(), 1 << 6);
        assert_eq!(CrtcModeFlags::PCSYNC.bits(), 1 << 7);
        assert_eq!(CrtcModeFlags::NCSYNC.bits(), 1 << 8);
        assert_eq!(CrtcModeFlags::HSKEW.bits(), 1 << 9);
        assert_eq!(CrtcModeFlags::BCAST.bits(), 1 << 10);
        assert_eq!(CrtcModeFlags::PIXMUX.bits(), 1 << 11);
        assert_eq!(CrtcModeFlags::DBLCLK.bits(), 1 << 12);
        assert_eq!(CrtcModeFlags::CLKDIV2.bits(), 1 << 13);

        // The whole set fits in the 14 defined bits.
        assert_eq!(CrtcModeFlags::all().bits(), (1 << 14) - 1);
    }

    #[test]
    fn zeroed_on_creation() {
        let mode = CrtcModeInfo::new();
        assert_eq!(mode.width, 0);
        assert_eq!(mode.height, 0);
        assert_eq!(mode.refresh_rate, 0.0);
        assert!(mode.flags.is_empty());
    }

    #[test]
    fn storage_lives_until_last_handle() {
        let mode = CrtcModeInfo::with_mode(1920, 1080, 60.0, CrtcModeFlags::PHSYNC);
        let weak: Weak<CrtcModeInfo> = Arc::downgrade(&mode);

        let retained = Arc::clone(&mode);
        drop(mode);
        // One handle left; the storage is still alive.
        assert!(weak.upgrade().is_some());
        assert_eq!(retained.width, 1920);

        drop(retained);
        assert!(weak.upgrade().is_none());
    }
}
