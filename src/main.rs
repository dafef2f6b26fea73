use std::path::PathBuf;

use clap::Parser;
use futures_util::{select, StreamExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wayland_client::protocol::wl_output;

use flashback_display::{
    Backend, BackendEvent, BackendType, MonitorTransform, OrientationEvent, Settings,
};

#[derive(Parser)]
#[command(version, about = "display backend daemon for fallback desktop sessions")]
struct Args {
    /// Backend to run with.
    #[arg(long, value_enum, default_value_t = BackendType::X11Nested)]
    backend: BackendType,

    /// Settings file to load instead of the per-user default.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[async_std::main]
async fn main() -> flashback_display::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flashback_display=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    let backend = Backend::with_settings(args.backend, settings)?;
    backend.post_init();
    info!("backend is up");

    let mut backend_events = Box::pin(backend.subscribe());
    let mut orientation_events = Box::pin(backend.orientation_manager().subscribe());

    loop {
        select! {
            event = backend_events.next() => match event {
                Some(BackendEvent::LidIsClosedChanged(closed)) => {
                    info!("lid is now {}", if closed { "closed" } else { "open" });
                }
                Some(BackendEvent::GpuAdded(gpu)) => info!("gpu added: {}", gpu.name),
                None => break,
            },
            event = orientation_events.next() => match event {
                Some(OrientationEvent::OrientationChanged) => {
                    let orientation = backend.orientation_manager().get_orientation();
                    let transform = MonitorTransform::from_orientation(orientation);
                    let wire: wl_output::Transform = transform.into();
                    info!("orientation {orientation}, output transform {wire:?}");
                }
                Some(OrientationEvent::HasAccelerometerChanged(present)) => {
                    if present {
                        info!("accelerometer available");
                    } else {
                        warn!("accelerometer gone");
                    }
                }
                None => break,
            },
        }
    }

    Ok(())
}
