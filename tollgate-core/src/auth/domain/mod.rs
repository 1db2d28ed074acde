pub mod aggregates;
pub mod collections;
pub mod credentials;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use aggregates::{Session, SessionError, SessionProps};
pub use collections::{CollectionError, CollectionScope, SessionCollection};
pub use credentials::{
    AccessToken, AccessTokenFactory, RefreshToken, RefreshTokenFactory,
};
pub use events::AuthEvent;
pub use repositories::{
    AuthEventSink, AuthRepository, SessionLimitExceeded, StaleSessionVersion,
};
pub use services::*;
pub use value_objects::{IpAddress, TokenValue, UserAgent, ValidationError};
