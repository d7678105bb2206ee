pub mod binding;
pub mod config;

pub use binding::{event_callback, EventBinding, EventCallback, EventFuture, PartialEventBinding};
pub use config::{
    default_client_url, ClientConfig, ConfigError, IFrameConfig, PartialConfig,
    PartialIFrameConfig, PROTECT_PROD_URL, PROTECT_TEST_URL,
};
