//! Monitor managers.
//!
//! A monitor manager is the backend-specific half of display
//! configuration: reading EDIDs, applying monitor layouts, answering
//! capability queries. Each backend constructs exactly one manager;
//! callers must not assume anything about one implementation from the
//! behavior of another.

pub mod dummy;
pub mod kms;
pub mod mode;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::monitors::mode::CrtcModeInfo;
use crate::transform::MonitorTransform;

bitflags::bitflags! {
    /// What a monitor manager supports beyond the bare contract.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct MonitorManagerCapabilities: u32 {
        const LAYOUT_MODE = 1 << 0;
        const GLOBAL_SCALE_REQUIRED = 1 << 1;
    }
}

/// How logical monitor dimensions are derived from modes.
///
/// The numbering follows the display-config protocol: 1 is logical
/// (mode scaled by the logical monitor scale), 2 is physical.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum LayoutMode {
    Logical = 1,
    Physical = 2,
}

/// How an applied configuration should stick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigMethod {
    Verify,
    Temporary,
    Persistent,
}

/// Display power management level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PowerSaveMode {
    On,
    Standby,
    Suspend,
    Off,
}

/// One monitor assignment inside a logical monitor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub connector: String,
    pub mode_id: String,
}

/// Placement of one logical monitor on the screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogicalMonitorConfig {
    pub x: i32,
    pub y: i32,
    pub scale: f64,
    pub transform: MonitorTransform,
    pub primary: bool,
    pub monitors: Vec<MonitorConfig>,
}

/// A full monitor layout to be applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitorsConfig {
    pub layout_mode: LayoutMode,
    pub logical_monitors: Vec<LogicalMonitorConfig>,
}

/// Per-channel gamma ramps of a CRTC.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrtcGamma {
    pub red: Vec<u16>,
    pub green: Vec<u16>,
    pub blue: Vec<u16>,
}

impl CrtcGamma {
    pub fn size(&self) -> usize {
        self.red.len()
    }
}

/// Backend-specific monitor operations.
pub trait MonitorManager: Send {
    /// Run the initial configuration pass. Invoked once, from the
    /// backend's `post_init`.
    fn ensure_initial_config(&mut self);

    /// The EDID blob of the monitor on `connector`, when one can be
    /// read.
    fn read_edid(&self, connector: &str) -> Option<Vec<u8>>;

    /// Apply a monitor layout. Fails with
    /// [`Error::NotImplemented`](crate::error::Error::NotImplemented)
    /// on managers that cannot reconfigure hardware.
    fn apply_monitors_config(
        &mut self,
        config: &MonitorsConfig,
        method: ConfigMethod,
    ) -> Result<()>;

    /// Whether the manager can offload `transform` to the hardware.
    fn is_transform_handled(&self, transform: MonitorTransform) -> bool;

    /// The scale to use for a monitor running `mode`.
    fn calculate_monitor_mode_scale(&self, mode: &CrtcModeInfo) -> f64;

    /// Every scale the manager supports for `mode`.
    fn calculate_supported_scales(&self, mode: &CrtcModeInfo) -> Vec<f64>;

    fn get_capabilities(&self) -> MonitorManagerCapabilities;

    /// Largest screen the manager can drive, when known.
    fn get_max_screen_size(&self) -> Option<(u32, u32)>;

    fn get_default_layout_mode(&self) -> LayoutMode;

    fn set_power_save_mode(&mut self, mode: PowerSaveMode);

    fn get_crtc_gamma(&self, crtc: u32) -> Result<CrtcGamma>;

    fn set_crtc_gamma(&mut self, crtc: u32, gamma: &CrtcGamma) -> Result<()>;
}
