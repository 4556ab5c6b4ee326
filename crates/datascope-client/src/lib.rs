pub mod error;
pub mod http;
pub mod service;

pub use error::{Error, Result};
pub use http::HttpDataService;
pub use service::DataService;
