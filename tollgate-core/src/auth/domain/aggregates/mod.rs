mod session;

pub use session::{
    CreationRejection, RotationRejection, Session, SessionError, SessionProps,
};
