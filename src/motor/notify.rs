//! State-change notification.
//!
//! Observers are called synchronously, once per committed transition, after
//! the new state is visible. A callback must return quickly and must not
//! block; anything slow belongs behind [`channel`], which never blocks the
//! control loop. Observers of a bare device run while it is borrowed, so a
//! callback that needs the device must be registered through `SharedMotor`,
//! which delivers after its lock is released.

use core::fmt;

use crate::error::{Error, Result};
use crate::mode::MotionState;

/// Maximum observers per device.
pub const MAX_OBSERVERS: usize = 4;

/// A committed transition, as delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateChange {
    /// Ordinal of the device that changed.
    pub device: u32,
    /// Previous state.
    pub from: MotionState,
    /// New state.
    pub to: MotionState,
}

/// Handle returned by [`Notifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u32);

/// Observer callback.
#[cfg(feature = "alloc")]
pub type Observer = alloc::boxed::Box<dyn Fn(&StateChange) + Send + Sync>;

/// Observer callback.
#[cfg(not(feature = "alloc"))]
pub type Observer = fn(&StateChange);

/// Bounded observer table.
#[derive(Default)]
pub struct Notifier {
    observers: heapless::Vec<(ObserverId, Observer), MAX_OBSERVERS>,
    next_id: u32,
}

impl Notifier {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    ///
    /// # Errors
    ///
    /// `Error::ObserverLimit` when [`MAX_OBSERVERS`] are already registered.
    pub fn subscribe(&mut self, observer: Observer) -> Result<ObserverId> {
        let id = ObserverId(self.next_id);
        if self.observers.push((id, observer)).is_err() {
            warn!("observer table full ({} entries)", MAX_OBSERVERS);
            return Err(Error::ObserverLimit);
        }
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }

    /// Remove an observer. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        match self.observers.iter().position(|(i, _)| *i == id) {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// `true` when nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver `change` to every observer, in registration order.
    pub fn notify(&self, change: &StateChange) {
        for (_, observer) in self.observers.iter() {
            observer(change);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Observer that forwards into a bounded channel.
///
/// Sends use `try_send`: when the receiver lags or is gone the change is
/// dropped for that receiver and the transition proceeds.
#[cfg(feature = "std")]
pub fn channel(capacity: usize) -> (Observer, std::sync::mpsc::Receiver<StateChange>) {
    let (tx, rx) = std::sync::mpsc::sync_channel(capacity);
    let observer: Observer = Box::new(move |change: &StateChange| {
        let _ = tx.try_send(*change);
    });
    (observer, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "std")]
    fn change(to: MotionState) -> StateChange {
        StateChange { device: 0, from: MotionState::Idle, to }
    }

    #[cfg(feature = "alloc")]
    fn noop() -> Observer {
        alloc::boxed::Box::new(|_: &StateChange| {})
    }

    #[cfg(not(feature = "alloc"))]
    fn noop() -> Observer {
        |_| {}
    }

    #[test]
    fn test_subscribe_limit() {
        let mut notifier = Notifier::new();
        for _ in 0..MAX_OBSERVERS {
            notifier.subscribe(noop()).unwrap();
        }
        assert_eq!(notifier.subscribe(noop()).unwrap_err(), Error::ObserverLimit);
        assert_eq!(notifier.len(), MAX_OBSERVERS);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_channel_delivers_in_order() {
        let mut notifier = Notifier::new();
        let (observer, rx) = channel(8);
        notifier.subscribe(observer).unwrap();

        notifier.notify(&change(MotionState::RunForever));
        notifier.notify(&change(MotionState::Stop));

        let got: Vec<_> = rx.try_iter().map(|c| c.to).collect();
        assert_eq!(got, vec![MotionState::RunForever, MotionState::Stop]);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_full_channel_does_not_block() {
        let mut notifier = Notifier::new();
        let (observer, rx) = channel(1);
        notifier.subscribe(observer).unwrap();

        for _ in 0..5 {
            notifier.notify(&change(MotionState::RampUp));
        }
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_dropped_receiver_is_ignored() {
        let mut notifier = Notifier::new();
        let (observer, rx) = channel(1);
        let id = notifier.subscribe(observer).unwrap();
        drop(rx);
        notifier.notify(&change(MotionState::Stop));
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        assert!(notifier.is_empty());
    }
}
