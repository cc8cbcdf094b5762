pub mod config;
pub mod crypto;
pub mod csv_io;
pub mod date;
pub mod file;
pub mod json;
pub mod net;

pub mod error;
pub mod tagged;

pub use config::UtilConfig;
pub use error::{CoreError, CoreResult};
pub use tagged::{category_of, matches, matches_opt, ErrorCategory, ResultExt, TaggedError};
