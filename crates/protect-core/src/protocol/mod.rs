//! Protocol module containing the event vocabulary and envelope decoding.

pub mod envelope;
pub mod events;

pub use envelope::{decode_envelope, MessageError};
pub use events::*;
