pub mod events;
pub mod repositories;

pub use events::TracingEventSink;
pub use repositories::InMemoryAuthRepository;
