//! Infrastructure layer of the child bridge.
//!
//! Contains the adapter to the embedded page's window and the transport's
//! parent handle.  A browser build supplies its own implementations of the
//! `window` traits; this crate ships in-memory ones.

pub mod window;
