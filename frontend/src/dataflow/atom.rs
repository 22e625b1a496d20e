//! Local UI state such as an open panel or the measured size of an element.

use futures::StreamExt;
use zoon::Signal;

use crate::dataflow::{relay, Actor, Relay};

/// Small piece of view-local state backed by an [`Actor`].
///
/// Domain state (the loaded track, the selection, fetched data) belongs to
/// the controller actor; atoms only hold what a single view needs.
#[derive(Clone, Debug)]
pub struct Atom<T>
where
    T: Clone + Send + Sync + 'static,
{
    actor: Actor<T>,
    value_set_relay: Relay<T>,
}

impl<T> Atom<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (value_set_relay, mut value_set_stream) = relay();
        let actor = Actor::new(initial, async move |state| {
            while let Some(value) = value_set_stream.next().await {
                state.set_neq(value);
            }
        });
        Self {
            actor,
            value_set_relay,
        }
    }

    pub fn set(&self, value: T) {
        self.value_set_relay.send(value);
    }

    pub fn signal(&self) -> impl Signal<Item = T> + use<T> {
        self.actor.signal()
    }
}

impl<T> Default for Atom<T>
where
    T: Clone + Default + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoon::SignalExt;

    #[tokio::test]
    async fn set_replaces_value() {
        let settings_open = Atom::new(false);
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        settings_open.set(true);
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        assert!(settings_open.signal().to_stream().next().await.unwrap());
    }

    #[tokio::test]
    async fn default_uses_type_default() {
        let viewport: Atom<(u32, u32)> = Atom::default();
        assert_eq!(viewport.signal().to_stream().next().await, Some((0, 0)));
    }
}
