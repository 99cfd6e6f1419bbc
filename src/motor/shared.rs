//! Shared device handle (std only).

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::Result;
use crate::mode::MotionState;
use crate::validate::Attribute;

use super::device::MotorDevice;
use super::driver::TachoMotorDriver;
use super::notify::{Notifier, Observer, ObserverId, StateChange};
use super::snapshot::{AttributeValue, MotorSnapshot};

type Outbox = Arc<Mutex<VecDeque<StateChange>>>;

struct Shared<D> {
    device: RwLock<MotorDevice<D>>,
    observers: Mutex<Notifier>,
    outbox: Outbox,
}

/// A device shared between a control thread and readers.
///
/// Writers take the lock exclusively, so two setters on the same device
/// never interleave. Readers share the lock and see a consistent device.
///
/// Observers registered here run after the device lock is released, in
/// commit order. They may read or write the device through another handle.
/// Observers the device already had are moved over by [`new`](Self::new).
pub struct SharedMotor<D> {
    inner: Arc<Shared<D>>,
}

impl<D> Clone for SharedMotor<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: TachoMotorDriver> SharedMotor<D> {
    /// Wrap a device.
    pub fn new(mut device: MotorDevice<D>) -> Self {
        let outbox = Outbox::default();
        let queue = Arc::clone(&outbox);
        let forward: Observer = Box::new(move |change: &StateChange| {
            queue.lock().push_back(*change);
        });

        let mut forwarding = Notifier::new();
        // A fresh table always has room for one observer
        forwarding.subscribe(forward).ok();
        let observers = device.replace_notifier(forwarding);

        Self {
            inner: Arc::new(Shared {
                device: RwLock::new(device),
                observers: Mutex::new(observers),
                outbox,
            }),
        }
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&MotorDevice<D>) -> R) -> R {
        f(&self.inner.device.read())
    }

    /// Run `f` with exclusive access.
    ///
    /// Transitions made by `f` reach observers once the lock is released.
    pub fn write<R>(&self, f: impl FnOnce(&mut MotorDevice<D>) -> R) -> R {
        let result = f(&mut self.inner.device.write());
        self.deliver();
        result
    }

    /// Current motion state.
    pub fn state(&self) -> MotionState {
        self.inner.device.read().state()
    }

    /// Every readable field, under one read lock.
    pub fn snapshot(&self) -> MotorSnapshot {
        self.inner.device.read().snapshot()
    }

    /// Read one attribute.
    pub fn read_attribute(&self, attribute: Attribute) -> Option<AttributeValue> {
        self.inner.device.read().read(attribute)
    }

    /// Validate and apply a textual write, under the write lock.
    pub fn write_attribute(&self, attribute: Attribute, input: &str) -> Result<()> {
        self.write(|device| device.write(attribute, input))
    }

    /// Engage or release the emergency stop.
    pub fn set_estop(&self, engaged: bool) {
        self.write(|device| device.set_estop(engaged));
    }

    /// Run one control-loop step.
    pub fn poll(&self) -> Result<Option<MotionState>> {
        self.write(|device| device.poll())
    }

    /// Register a state-change observer.
    ///
    /// Must not be called from inside an observer.
    ///
    /// # Errors
    ///
    /// `Error::ObserverLimit` when the table is full.
    pub fn subscribe(&self, observer: Observer) -> Result<ObserverId> {
        self.inner.observers.lock().subscribe(observer)
    }

    /// Remove an observer. Must not be called from inside an observer.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.inner.observers.lock().unsubscribe(id)
    }

    /// Recover the device if this is the last handle.
    ///
    /// Observers go back to the device.
    pub fn try_unwrap(self) -> core::result::Result<MotorDevice<D>, Self> {
        self.deliver();
        Arc::try_unwrap(self.inner)
            .map(|shared| {
                let mut device = shared.device.into_inner();
                device.replace_notifier(shared.observers.into_inner());
                device
            })
            .map_err(|inner| Self { inner })
    }

    /// Hand queued changes to the observers, outside the device lock.
    ///
    /// Whoever holds the observer table drains the queue; a nested or
    /// concurrent caller leaves its changes to that holder.
    fn deliver(&self) {
        loop {
            let Some(observers) = self.inner.observers.try_lock() else {
                return;
            };
            while let Some(change) = self.pop() {
                observers.notify(&change);
            }
            drop(observers);
            if self.inner.outbox.lock().is_empty() {
                return;
            }
        }
    }

    fn pop(&self) -> Option<StateChange> {
        self.inner.outbox.lock().pop_front()
    }
}
