//! Domain types shared by both sides of the iframe boundary.

pub mod geometry;
pub mod page;

pub use geometry::{current_min_iframe_height, ParentPageInfo, DEFAULT_IFRAME_HEIGHT};
pub use page::{decode_order_id, encode_order_id, ClientPage, OrderIdError, UnknownPage};
