//! KMS monitor manager.
//!
//! Placeholder for the kernel mode-setting path of the native backend.
//! Initialization succeeds trivially and every mutating operation is a
//! deliberate no-op; actual DRM I/O lives outside this crate. The
//! contract surface must stay interchangeable with the dummy manager.

use tracing::debug;

use super::{
    ConfigMethod, CrtcGamma, LayoutMode, MonitorManager, MonitorManagerCapabilities,
    MonitorsConfig, PowerSaveMode,
};
use crate::error::{Error, Result};
use crate::monitors::mode::CrtcModeInfo;
use crate::transform::MonitorTransform;

#[derive(Debug, Default)]
pub struct MonitorManagerKms;

impl MonitorManagerKms {
    pub fn new() -> Self {
        Self
    }
}

impl MonitorManager for MonitorManagerKms {
    fn ensure_initial_config(&mut self) {
        debug!("kms monitor manager: initial configuration pass");
    }

    fn read_edid(&self, _connector: &str) -> Option<Vec<u8>> {
        None
    }

    fn apply_monitors_config(
        &mut self,
        _config: &MonitorsConfig,
        _method: ConfigMethod,
    ) -> Result<()> {
        Err(Error::NotImplemented("apply_monitors_config"))
    }

    fn is_transform_handled(&self, _transform: MonitorTransform) -> bool {
        false
    }

    fn calculate_monitor_mode_scale(&self, _mode: &CrtcModeInfo) -> f64 {
        1.0
    }

    fn calculate_supported_scales(&self, _mode: &CrtcModeInfo) -> Vec<f64> {
        Vec::new()
    }

    fn get_capabilities(&self) -> MonitorManagerCapabilities {
        MonitorManagerCapabilities::empty()
    }

    fn get_max_screen_size(&self) -> Option<(u32, u32)> {
        None
    }

    fn get_default_layout_mode(&self) -> LayoutMode {
        LayoutMode::Physical
    }

    fn set_power_save_mode(&mut self, _mode: PowerSaveMode) {}

    fn get_crtc_gamma(&self, _crtc: u32) -> Result<CrtcGamma> {
        Ok(CrtcGamma::default())
    }

    fn set_crtc_gamma(&mut self, _crtc: u32, _gamma: &CrtcGamma) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitors::mode::CrtcModeFlags;

    #[test]
    fn apply_is_permanently_unimplemented() {
        let mut manager = MonitorManagerKms::new();
        let config = MonitorsConfig {
            layout_mode: LayoutMode::Physical,
            logical_monitors: Vec::new(),
        };
        let result = manager.apply_monitors_config(&config, ConfigMethod::Temporary);
        assert!(matches!(result, Err(Error::NotImplemented(_))));
    }

    #[test]
    fn contract_matches_dummy_surface() {
        // Both managers must stay interchangeable behind the trait.
        let manager = MonitorManagerKms::new();
        let mode = CrtcModeInfo::with_mode(1920, 1080, 60.0, CrtcModeFlags::empty());

        assert_eq!(
            manager.get_capabilities(),
            MonitorManagerCapabilities::empty()
        );
        assert_eq!(manager.get_max_screen_size(), None);
        assert_eq!(manager.get_default_layout_mode(), LayoutMode::Physical);
        assert_eq!(manager.calculate_monitor_mode_scale(&mode), 1.0);
        assert!(manager.calculate_supported_scales(&mode).is_empty());
        assert_eq!(manager.read_edid("DP-3"), None);
        assert!(!manager.is_transform_handled(MonitorTransform::Flipped270));
    }
}
