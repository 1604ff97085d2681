//! Infrastructure layer: configuration, logging, HTTP, rendering, parsing
//! and image storage.

pub mod config;
pub mod http_client;
pub mod image_downloader;
pub mod logging;
pub mod parsing;
pub mod renderer;
pub mod scrape_error;

pub use config::{AppConfig, ConfigManager, PlatformProfile};
pub use http_client::HttpClient;
pub use image_downloader::ImageDownloader;
pub use logging::{get_log_directory, init_logging_with_config};
pub use parsing::ProductDetailParser;
pub use renderer::{PageRenderer, RenderingDispatcher};
pub use scrape_error::{ScrapeError, ScrapeResult};
