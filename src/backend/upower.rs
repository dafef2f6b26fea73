//! Lid-state tracking over the power-management service.
//!
//! The watch survives the service restarting: when the name vanishes
//! the proxy is dropped and the lid flag keeps its last known value
//! until a new owner shows up.

use std::sync::Arc;

use async_channel::Receiver;
use futures_util::stream::FusedStream;
use futures_util::{select, StreamExt};
use tracing::{debug, warn};
use zbus::fdo::{DBusProxy, NameOwnerChanged};
use zbus::names::BusName;
use zbus::Connection;

use super::{BackendEvent, BackendShared};

const UPOWER_BUS_NAME: &str = "org.freedesktop.UPower";

#[zbus::proxy(
    interface = "org.freedesktop.UPower",
    default_service = "org.freedesktop.UPower",
    default_path = "/org/freedesktop/UPower",
    gen_blocking = false
)]
trait UPower {
    #[zbus(property)]
    fn lid_is_closed(&self) -> zbus::Result<bool>;
}

pub(super) async fn watch(shared: Arc<BackendShared>, stop_rx: Receiver<()>) {
    if let Err(err) = watch_inner(&shared, stop_rx).await {
        warn!("power service watch unavailable: {err}");
    }
}

async fn watch_inner(shared: &BackendShared, stop_rx: Receiver<()>) -> zbus::Result<()> {
    let connection = Connection::system().await?;
    let dbus = DBusProxy::new(&connection).await?;

    let mut owner_changes = dbus
        .receive_name_owner_changed_with_args(&[(0, UPOWER_BUS_NAME)])
        .await?
        .fuse();
    let mut stop_rx = Box::pin(stop_rx.fuse());

    let mut present = dbus
        .name_has_owner(BusName::try_from(UPOWER_BUS_NAME)?)
        .await
        .unwrap_or(false);

    loop {
        if present {
            debug!("power service present on the bus");
            if !follow_lid(&connection, shared, &mut owner_changes, &mut stop_rx).await {
                return Ok(());
            }
            present = false;
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
                _ = stop_rx.next() => return Ok(()),
            }
        }
    }
}

/// Follow `LidIsClosed` until the service vanishes. Returns false when
/// the backend is shutting down.
async fn follow_lid<O, StopRx>(
    connection: &Connection,
    shared: &BackendShared,
    owner_changes: &mut O,
    stop_rx: &mut StopRx,
) -> bool
where
    O: FusedStream<Item = NameOwnerChanged> + Unpin,
    StopRx: FusedStream<Item = ()> + Unpin,
{
    let proxy = match UPowerProxy::new(connection).await {
        Ok(proxy) => proxy,
        Err(err) => {
            warn!("failed to create power service proxy: {err}");
            return wait_for_vanish(owner_changes, stop_rx).await;
        }
    };

    // Pick up the current value; a lid that is already closed counts as
    // a change from the initial open state and is announced.
    match proxy.lid_is_closed().await {
        Ok(closed) => apply_lid(shared, closed),
        Err(err) => debug!("failed to read LidIsClosed: {err}"),
    }

    let mut lid_changes = proxy.receive_lid_is_closed_changed().await.fuse();

    loop {
        select! {
            change = lid_changes.next() => {
                if let Some(change) = change {
                    match change.get().await {
                        Ok(closed) => apply_lid(shared, closed),
                        Err(err) => debug!("failed to decode LidIsClosed change: {err}"),
                    }
                }
            }
            signal = owner_changes.next() => match signal {
                Some(signal) => {
                    if let Ok(args) = signal.args() {
                        if args.new_owner().is_none() {
                            // The proxy goes away with this scope; the
                            // flag keeps its last known value.
                            return true;
                        }
                    }
                }
                None => return false,
            },
            _ = stop_rx.next() => return false,
        }
    }
}

async fn wait_for_vanish<O, StopRx>(owner_changes: &mut O, stop_rx: &mut StopRx) -> bool
where
    O: FusedStream<Item = NameOwnerChanged> + Unpin,
    StopRx: FusedStream<Item = ()> + Unpin,
{
    loop {
        select! {
            signal = owner_changes.next() => match signal {
                Some(signal) => {
                    if let Ok(args) = signal.args() {
                        if args.new_owner().is_none() {
                            return true;
                        }
                    }
                }
                None => return false,
            },
            _ = stop_rx.next() => return false,
        }
    }
}

fn apply_lid(shared: &BackendShared, closed: bool) {
    if shared.update_lid(closed) {
        debug!("lid is now {}", if closed { "closed" } else { "open" });
        shared.emit(BackendEvent::LidIsClosedChanged(closed));
    }
}
