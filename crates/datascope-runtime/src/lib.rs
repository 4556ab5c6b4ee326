pub mod config;
pub mod error;
pub mod session;

pub use config::{Config, ServiceEntry};
pub use error::{Error, Result};
pub use session::{BrowserSession, QueryTicket, SessionErrors};
