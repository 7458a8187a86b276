use serde::{Deserialize, Serialize};

/// Every lifecycle moment in a session produces an Event.
/// Emitted once, fanned out to zero-or-more subscribers; variants carry only
/// the fields relevant to their moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    BlockStart {
        block_index: u32,
    },
    /// Waiting for the athlete to confirm they are in position.
    AwaitReady {
        exercise_id: String,
    },
    /// Generic countdown (transitions between steps).
    Countdown {
        seconds: u32,
    },
    /// Pre-round countdown pip.
    RoundCountdown {
        round_index: u32,
        seconds: u32,
    },
    /// Heads-up for the upcoming exercise, spoken before the pips.
    WorkPreview {
        exercise_id: String,
        set_number: u32,
    },
    WorkStart {
        exercise_id: String,
        set_number: u32,
        duration_secs: u32,
    },
    /// A technique cue fired mid-round (at most one per round).
    TechHint {
        exercise_id: String,
        cue: String,
    },
    Halfway {
        remaining_secs: u32,
    },
    WorkEnd {
        exercise_id: String,
        set_number: u32,
    },
    RestStart {
        duration_secs: u32,
    },
    RestEnd,
    RoundRestStart {
        round_index: u32,
        duration_secs: u32,
    },
    RoundRestEnd {
        round_index: u32,
    },
    BlockEnd {
        block_index: u32,
    },
    WorkoutEnd,
}

/// Synchronous fan-out of events to subscribers.
///
/// Handlers are invoked in subscription order on the caller's thread and
/// must not panic; there is no unsubscribe -- subscriptions live as long as
/// the session.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Box<dyn FnMut(&Event)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&Event) + 'static) {
        self.subscribers.push(Box::new(handler));
    }

    pub fn publish(&mut self, event: &Event) {
        for sub in &mut self.subscribers {
            sub(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn publish_reaches_subscribers_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |_| seen.borrow_mut().push(tag));
        }
        bus.publish(&Event::WorkoutEnd);
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn publish_with_no_subscribers_is_noop() {
        let mut bus = EventBus::new();
        bus.publish(&Event::RestEnd);
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_string(&Event::Halfway { remaining_secs: 75 }).unwrap();
        assert!(json.contains("\"type\":\"Halfway\""));
        assert!(json.contains("\"remaining_secs\":75"));
    }
}
