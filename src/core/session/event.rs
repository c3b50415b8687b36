use crate::domain::error::SessionError;
use std::fmt;

/// One batch of bytes drained by a single read notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedChunk {
    /// Never empty.
    pub bytes: Vec<u8>,
    /// Increases by one per chunk for the lifetime of the session.
    pub arrival_order: u64,
}

/// Events raised by a connection session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ConnectionChanged(bool),
    DataReceived(ReceivedChunk),
    /// Framed bytes written by a successful send.
    DataSent(Vec<u8>),
    /// `DeviceError` or `ResourceLost`; the latter is followed by the
    /// forced close.
    ErrorOccurred(SessionError),
}

/// Receives session events.
///
/// Implement `on_event` to see every event, or any of the per-kind hooks.
/// Closures taking `&SessionEvent` are observers too.
pub trait SessionObserver: Send {
    fn on_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::ConnectionChanged(connected) => self.on_connection_changed(*connected),
            SessionEvent::DataReceived(chunk) => self.on_data(chunk),
            SessionEvent::DataSent(bytes) => self.on_sent(bytes),
            SessionEvent::ErrorOccurred(error) => self.on_error(error.diagnostic()),
        }
    }

    fn on_data(&mut self, _chunk: &ReceivedChunk) {}

    fn on_sent(&mut self, _bytes: &[u8]) {}

    fn on_error(&mut self, _diagnostic: &str) {}

    fn on_connection_changed(&mut self, _connected: bool) {}
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionEvent) + Send,
{
    fn on_event(&mut self, event: &SessionEvent) {
        self(event)
    }
}

/// Observer assembled from one closure per event kind.
pub struct Callbacks<D, E, C> {
    on_data: D,
    on_error: E,
    on_connection_changed: C,
}

pub fn callbacks<D, E, C>(on_data: D, on_error: E, on_connection_changed: C) -> Callbacks<D, E, C>
where
    D: FnMut(&[u8]) + Send,
    E: FnMut(&str) + Send,
    C: FnMut(bool) + Send,
{
    Callbacks {
        on_data,
        on_error,
        on_connection_changed,
    }
}

impl<D, E, C> SessionObserver for Callbacks<D, E, C>
where
    D: FnMut(&[u8]) + Send,
    E: FnMut(&str) + Send,
    C: FnMut(bool) + Send,
{
    fn on_data(&mut self, chunk: &ReceivedChunk) {
        (self.on_data)(&chunk.bytes)
    }

    fn on_error(&mut self, diagnostic: &str) {
        (self.on_error)(diagnostic)
    }

    fn on_connection_changed(&mut self, connected: bool) {
        (self.on_connection_changed)(connected)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Observers in registration order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn SessionObserver>)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn SessionObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Delivers `event` to every observer; returns once all have returned.
    pub(crate) fn dispatch(&mut self, event: &SessionEvent) {
        for (_, observer) in self.entries.iter_mut() {
            observer.on_event(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
