//! Nested X11 backend.
//!
//! Runs under a host display server that owns the real hardware, so
//! monitor configuration goes through the dummy manager.

use super::BackendVariant;
use crate::error::Result;
use crate::monitors::dummy::MonitorManagerDummy;
use crate::monitors::MonitorManager;

#[derive(Debug, Default)]
pub struct X11NestedBackend;

impl X11NestedBackend {
    pub fn new() -> Self {
        Self
    }
}

impl BackendVariant for X11NestedBackend {
    fn name(&self) -> &'static str {
        "x11-nested"
    }

    fn create_monitor_manager(&self) -> Result<Box<dyn MonitorManager>> {
        Ok(Box::new(MonitorManagerDummy::new()))
    }
}
