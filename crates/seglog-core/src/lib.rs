pub mod commit_log;
pub mod error;
pub mod record;

pub use commit_log::CommitLog;
pub use error::{Error, Result};
pub use record::Record;
