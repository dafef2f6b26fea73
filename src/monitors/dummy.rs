//! Dummy monitor manager.
//!
//! Backs the nested backend, where the host display server owns the
//! real hardware. Every capability query answers "unsupported" and
//! configuration requests fail permanently.

use tracing::debug;

use super::{
    ConfigMethod, CrtcGamma, LayoutMode, MonitorManager, MonitorManagerCapabilities,
    MonitorsConfig, PowerSaveMode,
};
use crate::error::{Error, Result};
use crate::monitors::mode::CrtcModeInfo;
use crate::transform::MonitorTransform;

#[derive(Debug, Default)]
pub struct MonitorManagerDummy;

impl MonitorManagerDummy {
    pub fn new() -> Self {
        Self
    }
}

impl MonitorManager for MonitorManagerDummy {
    fn ensure_initial_config(&mut self) {
        debug!("dummy monitor manager: nothing to configure");
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

    fn any_config() -> MonitorsConfig {
        MonitorsConfig {
            layout_mode: LayoutMode::Physical,
            logical_monitors: Vec::new(),
        }
    }

    #[test]
    fn apply_is_permanently_unimplemented() {
        let mut manager = MonitorManagerDummy::new();
        for method in [
            ConfigMethod::Verify,
            ConfigMethod::Temporary,
            ConfigMethod::Persistent,
        ] {
            let result = manager.apply_monitors_config(&any_config(), method);
            assert!(matches!(result, Err(Error::NotImplemented(_))));
        }
    }

    #[test]
    fn reports_no_capabilities() {
        let manager = MonitorManagerDummy::new();
        assert_eq!(
            manager.get_capabilities(),
            MonitorManagerCapabilities::empty()
        );
        assert_eq!(manager.get_max_screen_size(), None);
        assert_eq!(manager.get_default_layout_mode(), LayoutMode::Physical);
        assert_eq!(manager.read_edid("eDP-1"), None);
        assert!(!manager.is_transform_handled(MonitorTransform::Rotate90));
    }

    #[test]
    fn scales_are_trivial() {
        let manager = MonitorManagerDummy::new();
        let mode = CrtcModeInfo::with_mode(2560, 1440, 144.0, CrtcModeFlags::PHSYNC);
        assert_eq!(manager.calculate_monitor_mode_scale(&mode), 1.0);
        assert!(manager.calculate_supported_scales(&mode).is_empty());
    }

    #[test]
    fn gamma_is_empty() {
        let manager = MonitorManagerDummy::new();
        let gamma = manager.get_crtc_gamma(0).unwrap();
        assert_eq!(gamma.size(), 0);
    }
}
