//! Sensors
//!
//! Watches the host's sensor service for an accelerometer and turns its
//! raw property updates into discrete orientation changes. The service
//! may come and go at any time; consumers only ever see the last known
//! orientation and an accelerometer-presence flag.

mod proxy;

use std::mem;
use std::sync::{Arc, Mutex};

use async_channel::{Receiver, Sender};

use crate::events::EventBus;
use crate::orientation::Orientation;
use crate::settings::Settings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrientationEvent {
    /// The current orientation changed; re-query
    /// [`OrientationManager::get_orientation`] for the new value.
    OrientationChanged,
    /// An accelerometer appeared or went away.
    HasAccelerometerChanged(bool),
}

/// Snapshot of the sensor service's state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SensorReading {
    pub has_accelerometer: bool,
    pub orientation: Orientation,
}

#[derive(Default)]
struct SyncOutcome {
    accelerometer_changed: Option<bool>,
    orientation_changed: bool,
}

/// The orientation state machine, separated from the bus plumbing.
struct OrientationTracker {
    prev: Orientation,
    curr: Orientation,
    has_accelerometer: bool,
}

impl OrientationTracker {
    fn new() -> Self {
        Self {
            prev: Orientation::Undefined,
            curr: Orientation::Undefined,
            has_accelerometer: false,
        }
    }

    /// Fold one reading into the tracked state.
    ///
    /// Previous/current book-keeping happens on every sync; the lock
    /// only suppresses the orientation notification. An Undefined
    /// current orientation is tracked but never announced.
    fn sync(&mut self, reading: SensorReading, locked: bool) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        if self.has_accelerometer != reading.has_accelerometer {
            self.has_accelerometer = reading.has_accelerometer;
            outcome.accelerometer_changed = Some(self.has_accelerometer);
        }

        let orientation = if self.has_accelerometer {
            reading.orientation
        } else {
            Orientation::Undefined
        };
        self.prev = mem::replace(&mut self.curr, orientation);

        if locked {
            return outcome;
        }
        if self.curr == self.prev {
            return outcome;
        }
        if self.curr == Orientation::Undefined {
            return outcome;
        }

        outcome.orientation_changed = true;
        outcome
    }
}

pub(crate) struct Shared {
    tracker: Mutex<OrientationTracker>,
    bus: EventBus<OrientationEvent>,
    settings: Settings,
    sync_tx: Sender<()>,
}

impl Shared {
    /// Request a re-sync. The single-slot channel coalesces rapid
    /// triggers into at most one pending sync.
    pub(crate) fn queue_sync(&self) {
        let _ = self.sync_tx.try_send(());
    }

    pub(crate) fn apply_reading(&self, reading: SensorReading) {
        let locked = self.settings.orientation_lock();
        let outcome = self.tracker.lock().unwrap().sync(reading, locked);

        if let Some(present) = outcome.accelerometer_changed {
            self.bus
                .emit(OrientationEvent::HasAccelerometerChanged(present));
        }
        if outcome.orientation_changed {
            self.bus.emit(OrientationEvent::OrientationChanged);
        }
    }
}

/// Tracks the device orientation reported by the sensor service.
///
/// Construction starts the bus watch; dropping the manager stops it and
/// abandons any in-flight claim call.
pub struct OrientationManager {
    shared: Arc<Shared>,
    /// Closing this channel tells the watch task to stop.
    _stop_tx: Sender<()>,
}

impl OrientationManager {
    pub fn new(settings: Settings) -> Self {
        Self::build(settings, true)
    }

    fn build(settings: Settings, watch: bool) -> Self {
        let (sync_tx, sync_rx) = async_channel::bounded(1);
        let (stop_tx, stop_rx) = async_channel::bounded(1);

        let shared = Arc::new(Shared {
            tracker: Mutex::new(OrientationTracker::new()),
            bus: EventBus::new(),
            settings,
            sync_tx,
        });

        // Initial sync; with no sensor present this just records the
        // absence.
        shared.apply_reading(SensorReading::default());

        if watch {
            async_std::task::spawn(proxy::watch(Arc::clone(&shared), sync_rx, stop_rx));
        }

        Self {
            shared,
            _stop_tx: stop_tx,
        }
    }

    /// A manager without the bus watch, fed readings by hand.
    #[cfg(test)]
    fn unwatched(settings: Settings) -> Self {
        Self::build(settings, false)
    }

    /// Last computed orientation. Never blocks.
    pub fn get_orientation(&self) -> Orientation {
        self.shared.tracker.lock().unwrap().curr
    }

    /// Last known accelerometer presence. Never blocks.
    pub fn has_accelerometer(&self) -> bool {
        self.shared.tracker.lock().unwrap().has_accelerometer
    }

    pub fn subscribe(&self) -> Receiver<OrientationEvent> {
        self.shared.bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(has_accelerometer: bool, orientation: Orientation) -> SensorReading {
        SensorReading {
            has_accelerometer,
            orientation,
        }
    }

    #[test]
    fn tracker_reports_appearing_accelerometer() {
        let mut tracker = OrientationTracker::new();

        let outcome = tracker.sync(reading(true, Orientation::Normal), false);
        assert_eq!(outcome.accelerometer_changed, Some(true));
        assert!(outcome.orientation_changed);

        let outcome = tracker.sync(reading(false, Orientation::Normal), false);
        assert_eq!(outcome.accelerometer_changed, Some(false));
        // The orientation falls back to Undefined, which is never
        // announced.
        assert!(!outcome.orientation_changed);
        assert_eq!(tracker.curr, Orientation::Undefined);
    }

    #[test]
    fn tracker_ignores_identical_sync() {
        let mut tracker = OrientationTracker::new();

        let outcome = tracker.sync(reading(true, Orientation::LeftUp), false);
        assert!(outcome.orientation_changed);
        assert_eq!(tracker.curr, Orientation::LeftUp);

        let outcome = tracker.sync(reading(true, Orientation::LeftUp), false);
        assert!(!outcome.orientation_changed);
        assert_eq!(outcome.accelerometer_changed, None);
    }

    #[test]
    fn tracker_keeps_book_keeping_under_lock() {
        let mut tracker = OrientationTracker::new();
        tracker.sync(reading(true, Orientation::Normal), false);

        // Locked: the change is tracked but not announced.
        let outcome = tracker.sync(reading(true, Orientation::RightUp), true);
        assert!(!outcome.orientation_changed);
        assert_eq!(tracker.curr, Orientation::RightUp);
        assert_eq!(tracker.prev, Orientation::Normal);

        // Unlocking later must not retroactively announce the
        // suppressed change: prev already equals curr.
        let outcome = tracker.sync(reading(true, Orientation::RightUp), false);
        assert!(!outcome.orientation_changed);
    }

    #[test]
    fn tracker_never_announces_undefined() {
        let mut tracker = OrientationTracker::new();
        tracker.sync(reading(true, Orientation::Normal), false);

        let outcome = tracker.sync(reading(true, Orientation::Undefined), false);
        assert!(!outcome.orientation_changed);
        assert_eq!(tracker.prev, Orientation::Normal);
        assert_eq!(tracker.curr, Orientation::Undefined);
    }

    #[async_std::test]
    async fn manager_announces_orientation_once() {
        let settings = Settings::load(Some(std::path::Path::new("/nonexistent"))).unwrap();
        let manager = OrientationManager::unwatched(settings);
        let events = manager.subscribe();

        manager
            .shared
            .apply_reading(reading(true, Orientation::LeftUp));
        assert_eq!(manager.get_orientation(), Orientation::LeftUp);
        assert!(manager.has_accelerometer());

        assert_eq!(
            events.recv().await,
            Ok(OrientationEvent::HasAccelerometerChanged(true))
        );
        assert_eq!(events.recv().await, Ok(OrientationEvent::OrientationChanged));

        // An identical second sync stays quiet.
        manager
            .shared
            .apply_reading(reading(true, Orientation::LeftUp));
        assert!(events.is_empty());
    }

    #[async_std::test]
    async fn manager_honors_orientation_lock() {
        let settings = Settings::load(Some(std::path::Path::new("/nonexistent"))).unwrap();
        let manager = OrientationManager::unwatched(settings.clone());
        let events = manager.subscribe();

        manager
            .shared
            .apply_reading(reading(true, Orientation::Normal));
        assert_eq!(
            events.recv().await,
            Ok(OrientationEvent::HasAccelerometerChanged(true))
        );
        assert_eq!(events.recv().await, Ok(OrientationEvent::OrientationChanged));

        settings.set_orientation_lock(true);
        manager
            .shared
            .apply_reading(reading(true, Orientation::BottomUp));
        assert!(events.is_empty());
        // State keeps tracking while locked.
        assert_eq!(manager.get_orientation(), Orientation::BottomUp);

        // Releasing the lock and re-syncing unchanged hardware state
        // must not fire for the suppressed change.
        settings.set_orientation_lock(false);
        manager
            .shared
            .apply_reading(reading(true, Orientation::BottomUp));
        assert!(events.is_empty());
    }
}
