// Session module - Connection lifecycle, events and fault policy
pub mod event;
pub mod fault;
pub mod session;
pub mod state;

pub use event::{callbacks, Callbacks, ReceivedChunk, SessionEvent, SessionObserver, SubscriptionId};
pub use fault::FaultClass;
pub use session::ConnectionSession;
pub use state::ConnectionState;
