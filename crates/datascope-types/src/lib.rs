pub mod capability;
pub mod catalog;
pub mod error;
pub mod path;
pub mod problem;
pub mod query;

pub use capability::*;
pub use catalog::*;
pub use error::{Error, Result};
pub use path::ContainerPath;
pub use problem::Problem;
pub use query::*;
