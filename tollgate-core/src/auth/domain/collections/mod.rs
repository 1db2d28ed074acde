mod session_collection;

pub use session_collection::{CollectionError, CollectionScope, SessionCollection};
