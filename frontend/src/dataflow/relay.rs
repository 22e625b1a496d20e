//! Event channel from UI callbacks and request tasks into actors.

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use std::panic::Location;
use std::sync::{Arc, OnceLock};

/// Sending half of an event stream consumed by one actor.
///
/// Names follow `{source}_{event}_relay`, e.g. `slider_moved_relay` or
/// `plot_fetched_relay`. In debug builds every relay remembers the first
/// call site that sent through it and panics if a second site does, so each
/// event keeps exactly one origin.
#[derive(Clone, Debug)]
pub struct Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    sender: UnboundedSender<T>,
    #[cfg(debug_assertions)]
    origin: Arc<OnceLock<&'static Location<'static>>>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RelayError {
    #[error("relay receiver was dropped")]
    ChannelClosed,
    #[error("relay sent from {current} but its origin is {origin}")]
    SecondOrigin {
        origin: &'static Location<'static>,
        current: &'static Location<'static>,
    },
}

impl<T> Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = unbounded();
        let relay = Relay {
            sender,
            #[cfg(debug_assertions)]
            origin: Arc::new(OnceLock::new()),
        };
        (relay, receiver)
    }

    #[cfg(debug_assertions)]
    #[track_caller]
    fn check_origin(&self) -> Result<(), RelayError> {
        let current = Location::caller();
        let origin = *self.origin.get_or_init(|| current);
        if origin == current {
            Ok(())
        } else {
            Err(RelayError::SecondOrigin { origin, current })
        }
    }

    /// Send an event. Events sent after the actor is gone are dropped.
    #[track_caller]
    pub fn send(&self, value: T) {
        #[cfg(debug_assertions)]
        if let Err(error) = self.check_origin() {
            panic!("{}", error);
        }
        let _ = self.sender.unbounded_send(value);
    }

    #[track_caller]
    pub fn try_send(&self, value: T) -> Result<(), RelayError> {
        #[cfg(debug_assertions)]
        self.check_origin()?;
        self.sender
            .unbounded_send(value)
            .map_err(|_| RelayError::ChannelClosed)
    }
}

impl<T> Default for Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// A relay nobody listens to.
    fn default() -> Self {
        Self::new().0
    }
}

pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Clone + Send + Sync + 'static,
{
    Relay::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn delivers_events_in_order() {
        let (slider_moved_relay, mut slider_moved_stream) = relay::<(usize, usize)>();
        for window in [(0, 99), (10, 20)] {
            slider_moved_relay.send(window);
        }
        assert_eq!(slider_moved_stream.next().await, Some((0, 99)));
        assert_eq!(slider_moved_stream.next().await, Some((10, 20)));
    }

    #[tokio::test]
    async fn try_send_reports_closed_channel() {
        let (stride_selected_relay, stride_selected_stream) = relay::<u32>();
        drop(stride_selected_stream);
        assert!(matches!(
            stride_selected_relay.try_send(10),
            Err(RelayError::ChannelClosed)
        ));
    }

    #[cfg(debug_assertions)]
    #[test]
    fn second_call_site_is_rejected() {
        let (slider_moved_relay, _slider_moved_stream) = relay::<usize>();
        let send = |value| slider_moved_relay.try_send(value);
        assert!(send(1).is_ok());
        assert!(send(2).is_ok());
        assert!(matches!(
            slider_moved_relay.try_send(3),
            Err(RelayError::SecondOrigin { .. })
        ));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "but its origin is")]
    fn send_panics_from_a_second_call_site() {
        let (dark_mode_toggled_relay, _dark_mode_toggled_stream) = relay::<bool>();
        dark_mode_toggled_relay.send(true);
        dark_mode_toggled_relay.send(false);
    }

    #[test]
    fn default_relay_discards_events() {
        let dark_mode_toggled_relay = Relay::<bool>::default();
        dark_mode_toggled_relay.send(true);
    }
}
