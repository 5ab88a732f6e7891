// event.rs - Tick-scoped event log
//
// Events are opaque payloads emitted through command buffers. They carry no
// identity and are never stored in the world's pools; playback appends them to
// the tick's event list in emission order.

use crate::time::Tick;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// One emitted event payload.
#[derive(Clone)]
pub struct Event {
    payload: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Event {
    pub fn new<E: Any + Send + Sync>(payload: E) -> Self {
        Self {
            payload: Arc::new(payload),
            type_name: std::any::type_name::<E>(),
        }
    }

    /// Rust type name of the payload.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<E: Any>(&self) -> bool {
        self.payload.is::<E>()
    }

    pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
        self.payload.downcast_ref::<E>()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Event").field(&self.type_name).finish()
    }
}

/// Outcome of one `World::update` call.
#[derive(Clone, Debug, Default)]
pub struct PlaybackResult {
    pub tick: Tick,
    pub events: Vec<Event>,
}

impl PlaybackResult {
    /// Payloads of type `E`, in emission order.
    pub fn events_of<E: Any>(&self) -> impl Iterator<Item = &E> + '_ {
        self.events.iter().filter_map(Event::downcast_ref::<E>)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    #[derive(Debug, PartialEq)]
    struct Pong;

    #[test]
    fn events_of_filters_by_type_and_keeps_order() {
        let result = PlaybackResult {
            tick: 3,
            events: vec![Event::new(Ping(1)), Event::new(Pong), Event::new(Ping(2))],
        };

        let pings: Vec<_> = result.events_of::<Ping>().collect();
        assert_eq!(pings, vec![&Ping(1), &Ping(2)]);
        assert_eq!(result.events_of::<Pong>().count(), 1);
        assert!(result.events[1].is::<Pong>());
        assert!(result.events[0].type_name().ends_with("Ping"));
    }
}
