//! Display backends.
//!
//! A backend owns the process-wide settings, the orientation manager
//! and exactly one monitor manager, picked by the concrete variant. At
//! most one backend exists per process; [`Backend::new`] is the only
//! construction path.

pub mod native;
mod upower;
pub mod x11_nested;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_channel::{Receiver, Sender};
use tracing::debug;

use crate::error::Result;
use crate::events::EventBus;
use crate::monitors::MonitorManager;
use crate::sensors::OrientationManager;
use crate::settings::Settings;

pub use native::NativeBackend;
pub use x11_nested::X11NestedBackend;

/// Which backend to construct.
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendType {
    /// Compositing X11 backend. Not wired to an implementation;
    /// requesting it is a programming error.
    #[value(skip)]
    X11Cm,
    /// Running nested under a host display server.
    X11Nested,
    /// Driving the hardware directly.
    Native,
}

/// A GPU known to the backend. Records are shared with whoever probed
/// the device; the backend only keeps handles for its own lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gpu {
    pub name: String,
    pub device_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BackendEvent {
    LidIsClosedChanged(bool),
    GpuAdded(Arc<Gpu>),
}

/// Variant-specific behavior of a backend.
///
/// Default method bodies are the generic implementations; a variant
/// overriding `post_init` must still run the default body's work.
pub trait BackendVariant: Send + Sync {
    fn name(&self) -> &'static str;

    /// Build the monitor manager this variant runs with. Invoked
    /// exactly once, during backend construction; a failure here aborts
    /// the whole backend.
    fn create_monitor_manager(&self) -> Result<Box<dyn MonitorManager>>;

    /// Hook run once after construction, when the caller is ready.
    fn post_init(&self, backend: &Backend) {
        backend.monitor_manager().ensure_initial_config();
    }

    /// Whether the generic power-service lid tracking is in use. A
    /// variant that overrides `is_lid_closed` entirely must return
    /// false here, which skips the watch.
    fn tracks_lid_state(&self) -> bool {
        true
    }

    fn is_lid_closed(&self, backend: &Backend) -> bool {
        backend.tracked_lid_state()
    }
}

/// State shared with the power-service watch task.
pub(crate) struct BackendShared {
    lid_is_closed: AtomicBool,
    bus: EventBus<BackendEvent>,
}

impl BackendShared {
    /// Record a new lid state; true when the value actually changed.
    pub(crate) fn update_lid(&self, closed: bool) -> bool {
        self.lid_is_closed.swap(closed, Ordering::SeqCst) != closed
    }

    pub(crate) fn emit(&self, event: BackendEvent) {
        self.bus.emit(event);
    }
}

pub struct Backend {
    /// Closing this channel stops the power-service watch.
    _lid_stop: Option<Sender<()>>,
    variant: Box<dyn BackendVariant>,
    monitor_manager: Mutex<Box<dyn MonitorManager>>,
    orientation_manager: OrientationManager,
    settings: Settings,
    gpus: Mutex<Vec<Arc<Gpu>>>,
    shared: Arc<BackendShared>,
}

impl Backend {
    /// Construct the backend for `backend_type` with settings from the
    /// default location.
    ///
    /// A failure here is fatal to the caller: a process cannot run
    /// without its backend, and retrying the same type will not help.
    pub fn new(backend_type: BackendType) -> Result<Self> {
        Self::with_settings(backend_type, Settings::load(None)?)
    }

    pub fn with_settings(backend_type: BackendType, settings: Settings) -> Result<Self> {
        let variant: Box<dyn BackendVariant> = match backend_type {
            BackendType::X11Nested => Box::new(X11NestedBackend::new()),
            BackendType::Native => Box::new(NativeBackend::new()),
            BackendType::X11Cm => {
                unreachable!("the compositing X11 backend is not wired to an implementation")
            }
        };

        let orientation_manager = OrientationManager::new(settings.clone());
        let monitor_manager = variant.create_monitor_manager()?;
        debug!("constructed {} backend", variant.name());

        let shared = Arc::new(BackendShared {
            lid_is_closed: AtomicBool::new(false),
            bus: EventBus::new(),
        });

        let lid_stop = if variant.tracks_lid_state() {
            let (stop_tx, stop_rx) = async_channel::bounded(1);
            async_std::task::spawn(upower::watch(Arc::clone(&shared), stop_rx));
            Some(stop_tx)
        } else {
            None
        };

        Ok(Self {
            _lid_stop: lid_stop,
            variant,
            monitor_manager: Mutex::new(monitor_manager),
            orientation_manager,
            settings,
            gpus: Mutex::new(Vec::new()),
            shared,
        })
    }

    /// Run the variant's post-initialization hook. The caller invokes
    /// this exactly once after a successful [`Backend::new`]; it is
    /// deliberately not automatic, so subsystems the hook depends on
    /// can be brought up in between.
    pub fn post_init(&self) {
        self.variant.post_init(self);
    }

    pub fn monitor_manager(&self) -> MutexGuard<'_, Box<dyn MonitorManager>> {
        self.monitor_manager.lock().unwrap()
    }

    pub fn orientation_manager(&self) -> &OrientationManager {
        &self.orientation_manager
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Append a GPU to the backend's list. Order is preserved and
    /// duplicates are allowed.
    pub fn add_gpu(&self, gpu: Arc<Gpu>) {
        self.gpus.lock().unwrap().push(Arc::clone(&gpu));
        self.shared.emit(BackendEvent::GpuAdded(gpu));
    }

    pub fn gpus(&self) -> Vec<Arc<Gpu>> {
        self.gpus.lock().unwrap().clone()
    }

    /// Whether the lid is closed, as the variant sees it.
    pub fn is_lid_closed(&self) -> bool {
        self.variant.is_lid_closed(self)
    }

    pub(crate) fn tracked_lid_state(&self) -> bool {
        self.shared.lid_is_closed.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> Receiver<BackendEvent> {
        self.shared.bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::error::Error;
    use crate::monitors::{ConfigMethod, LayoutMode, MonitorsConfig};

    fn test_settings() -> Settings {
        Settings::load(Some(Path::new("/nonexistent"))).unwrap()
    }

    #[test]
    fn nested_backend_gets_dummy_manager() {
        let backend = Backend::with_settings(BackendType::X11Nested, test_settings()).unwrap();
        backend.post_init();

        let mut manager = backend.monitor_manager();
        assert_eq!(manager.get_default_layout_mode(), LayoutMode::Physical);
        let config = MonitorsConfig {
            layout_mode: LayoutMode::Physical,
            logical_monitors: Vec::new(),
        };
        assert!(matches!(
            manager.apply_monitors_config(&config, ConfigMethod::Verify),
            Err(Error::NotImplemented(_))
        ));
    }

    #[test]
    fn native_backend_constructs() {
        let backend = Backend::with_settings(BackendType::Native, test_settings()).unwrap();
        backend.post_init();
        assert!(!backend.is_lid_closed());
    }

    #[test]
    #[should_panic(expected = "not wired to an implementation")]
    fn compositing_backend_is_a_contract_violation() {
        let _ = Backend::with_settings(BackendType::X11Cm, test_settings());
    }

    async fn next_gpu_event(events: &Receiver<BackendEvent>) -> Arc<Gpu> {
        loop {
            match events.recv().await.unwrap() {
                BackendEvent::GpuAdded(gpu) => return gpu,
                // Lid chatter from the watch task is irrelevant here.
                BackendEvent::LidIsClosedChanged(_) => {}
            }
        }
    }

    #[async_std::test]
    async fn gpus_keep_insertion_order() {
        let backend = Backend::with_settings(BackendType::X11Nested, test_settings()).unwrap();
        let events = backend.subscribe();

        let first = Arc::new(Gpu {
            name: "card0".into(),
            device_path: Some("/dev/dri/card0".into()),
        });
        let second = Arc::new(Gpu {
            name: "card1".into(),
            device_path: None,
        });

        backend.add_gpu(Arc::clone(&first));
        backend.add_gpu(Arc::clone(&second));
        // Duplicates are allowed.
        backend.add_gpu(Arc::clone(&first));

        let gpus = backend.gpus();
        assert_eq!(gpus.len(), 3);
        assert_eq!(gpus[0], first);
        assert_eq!(gpus[1], second);
        assert_eq!(gpus[2], first);

        assert_eq!(next_gpu_event(&events).await, first);
        assert_eq!(next_gpu_event(&events).await, second);
        assert_eq!(next_gpu_event(&events).await, first);
    }

    #[test]
    fn lid_state_updates_report_changes() {
        let shared = BackendShared {
            lid_is_closed: AtomicBool::new(false),
            bus: EventBus::new(),
        };

        assert!(!shared.update_lid(false));
        assert!(shared.update_lid(true));
        assert!(!shared.update_lid(true));
        assert!(shared.update_lid(false));
    }
}
