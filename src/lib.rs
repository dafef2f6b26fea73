//! Display backends and sensor-driven orientation management for
//! fallback desktop sessions.
//!
//! The entry point is [`Backend::new`]: it wires up settings, the
//! orientation manager and the variant-specific monitor manager, and
//! starts watching the power-management service for lid state. The
//! orientation manager independently follows the host's sensor service
//! and announces discrete orientation changes, which
//! [`MonitorTransform::from_orientation`] turns into output transforms.

pub mod backend;
pub mod error;
pub mod events;
pub mod monitors;
pub mod orientation;
pub mod sensors;
pub mod settings;
pub mod transform;

pub use backend::{Backend, BackendEvent, BackendType, Gpu};
pub use error::{Error, Result};
pub use orientation::Orientation;
pub use sensors::{OrientationEvent, OrientationManager};
pub use settings::Settings;
pub use transform::MonitorTransform;
