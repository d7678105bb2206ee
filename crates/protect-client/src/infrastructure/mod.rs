//! Infrastructure layer of the host SDK.
//!
//! Contains the adapters that face the outside world: the host document, the
//! iframe transport, the HTTP error-log endpoint, the tracking script server,
//! and the settings file of the preview binary.
//!
//! `dom` and `resizer` each pair a trait with an in-memory implementation.  A
//! browser build supplies its own implementations of the same traits.

pub mod dom;
pub mod error_log;
pub mod resizer;
pub mod settings;
pub mod tracking;
