pub mod config;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod platform;
pub mod proxy;
pub mod server;

pub use config::Config;
pub use error::{ApiError, DownloadError, ProxyError};
pub use server::{AppState, router};
