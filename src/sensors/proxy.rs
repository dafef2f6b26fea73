//! D-Bus plumbing for the sensor service.
//!
//! A single detached task owns the whole lifecycle: waiting for the
//! well-known name, claiming the accelerometer, following property
//! changes, and tearing everything down when the name vanishes. The
//! task ends when the manager closes its stop channel; dropping an
//! in-flight call is the cancellation path and is deliberately silent.

use std::sync::Arc;

use async_channel::Receiver;
use futures_util::stream::FusedStream;
use futures_util::{pin_mut, select, FutureExt, StreamExt};
use tracing::{debug, warn};
use zbus::fdo::{DBusProxy, NameOwnerChanged};
use zbus::names::BusName;
use zbus::Connection;

use super::{SensorReading, Shared};
use crate::orientation::Orientation;
use crate::settings::SettingsEvent;

const SENSOR_BUS_NAME: &str = "net.hadess.SensorProxy";

#[zbus::proxy(
    interface = "net.hadess.SensorProxy",
    default_service = "net.hadess.SensorProxy",
    default_path = "/net/hadess/SensorProxy",
    gen_blocking = false
)]
trait SensorService {
    fn claim_accelerometer(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn has_accelerometer(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn accelerometer_orientation(&self) -> zbus::Result<String>;
}

enum SessionEnd {
    /// The service dropped off the bus.
    Vanished,
    /// The manager is shutting down.
    Stopped,
}

pub(super) async fn watch(shared: Arc<Shared>, sync_rx: Receiver<()>, stop_rx: Receiver<()>) {
    if let Err(err) = watch_inner(&shared, sync_rx, stop_rx).await {
        warn!("sensor service watch unavailable: {err}");
    }
}

async fn watch_inner(
    shared: &Shared,
    sync_rx: Receiver<()>,
    stop_rx: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::system().await?;
    let dbus = DBusProxy::new(&connection).await?;

    let mut owner_changes = dbus
        .receive_name_owner_changed_with_args(&[(0, SENSOR_BUS_NAME)])
        .await?
        .fuse();
    let mut sync_rx = Box::pin(sync_rx.fuse());
    let mut settings_rx = Box::pin(shared.settings.subscribe().fuse());
    let mut stop_rx = Box::pin(stop_rx.fuse());

    let mut present = dbus
        .name_has_owner(BusName::try_from(SENSOR_BUS_NAME)?)
        .await
        .unwrap_or(false);

    loop {
        if present {
            debug!("sensor service present on the bus");
            match claimed_session(
                &connection,
                shared,
                &mut owner_changes,
                &mut sync_rx,
                &mut settings_rx,
                &mut stop_rx,
            )
            .await
            {
                SessionEnd::Vanished => {
                    debug!("sensor service vanished");
                    present = false;
                    shared.apply_reading(SensorReading::default());
                }
                SessionEnd::Stopped => return Ok(()),
            }
        } else {
            select! {
                signal = owner_changes.next() => match signal {
                    Some(signal) => {
                        if let Ok(args) = signal.args() {
                            if args.new_owner().is_some() {
                                present = true;
                            }
                        }
                    }
                    None => return Ok(()),
                },
                _ = sync_rx.next() => shared.apply_reading(SensorReading::default()),
                _ = settings_rx.next() => shared.queue_sync(),
                _ = stop_rx.next() => return Ok(()),
            }
        }
    }
}

/// One tenancy of the sensor service: claim, follow, until it vanishes.
async fn claimed_session<O, SyncRx, SettingsRx, StopRx>(
    connection: &Connection,
    shared: &Shared,
    owner_changes: &mut O,
    sync_rx: &mut SyncRx,
    settings_rx: &mut SettingsRx,
    stop_rx: &mut StopRx,
) -> SessionEnd
where
    O: FusedStream<Item = NameOwnerChanged> + Unpin,
    SyncRx: FusedStream<Item = ()> + Unpin,
    SettingsRx: FusedStream<Item = SettingsEvent> + Unpin,
    StopRx: FusedStream<Item = ()> + Unpin,
{
    let proxy = match SensorServiceProxy::new(connection).await {
        Ok(proxy) => proxy,
        Err(err) => {
            warn!("failed to create sensor proxy: {err}");
            // No sensor readings this tenancy; wait out the owner.
            loop {
                select! {
                    signal = owner_changes.next() => match vanish(signal) {
                        Some(end) => return end,
                        None => {}
                    },
                    _ = sync_rx.next() => shared.apply_reading(SensorReading::default()),
                    _ = settings_rx.next() => shared.queue_sync(),
                    _ = stop_rx.next() => return SessionEnd::Stopped,
                }
            }
        }
    };

    // Claim the accelerometer. If the service vanishes or the manager
    // stops first, the call is dropped mid-flight; that is the normal
    // cancellation path, not a reportable error.
    let claim = proxy.claim_accelerometer().fuse();
    pin_mut!(claim);
    loop {
        select! {
            result = claim => {
                if let Err(err) = result {
                    warn!("failed to claim accelerometer: {err}");
                }
                break;
            }
            signal = owner_changes.next() => match vanish(signal) {
                Some(end) => return end,
                None => {}
            },
            _ = sync_rx.next() => sync_from_proxy(shared, &proxy).await,
            _ = settings_rx.next() => shared.queue_sync(),
            _ = stop_rx.next() => return SessionEnd::Stopped,
        }
    }

    let mut accelerometer_changes = proxy.receive_has_accelerometer_changed().await.fuse();
    let mut orientation_changes = proxy.receive_accelerometer_orientation_changed().await.fuse();

    sync_from_proxy(shared, &proxy).await;

    loop {
        select! {
            _ = accelerometer_changes.next() => shared.queue_sync(),
            _ = orientation_changes.next() => shared.queue_sync(),
            _ = sync_rx.next() => sync_from_proxy(shared, &proxy).await,
            _ = settings_rx.next() => shared.queue_sync(),
            signal = owner_changes.next() => match vanish(signal) {
                Some(end) => return end,
                None => {}
            },
            _ = stop_rx.next() => return SessionEnd::Stopped,
        }
    }
}

fn vanish(signal: Option<NameOwnerChanged>) -> Option<SessionEnd> {
    match signal {
        Some(signal) => {
            let args = signal.args().ok()?;
            if args.new_owner().is_none() {
                Some(SessionEnd::Vanished)
            } else {
                None
            }
        }
        None => Some(SessionEnd::Stopped),
    }
}

/// Read the proxy's cached state and fold it into the tracker. Cache
/// misses fall back to a round trip.
async fn sync_from_proxy(shared: &Shared, proxy: &SensorServiceProxy<'_>) {
    let has_accelerometer = match proxy.cached_has_accelerometer() {
        Ok(Some(value)) => value,
        _ => proxy.has_accelerometer().await.unwrap_or_else(|err| {
            debug!("failed to read HasAccelerometer: {err}");
            false
        }),
    };

    let orientation = if has_accelerometer {
        let name = match proxy.cached_accelerometer_orientation() {
            Ok(Some(value)) => value,
            _ => proxy.accelerometer_orientation().await.unwrap_or_default(),
        };
        Orientation::from_name(&name)
    } else {
        Orientation::Undefined
    };

    shared.apply_reading(SensorReading {
        has_accelerometer,
        orientation,
    });
}
