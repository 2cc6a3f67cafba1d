// Upload pipeline: category rules, stored-file naming, disk staging, HTTP handlers.

pub mod category;
pub mod handlers;
pub mod naming;
pub mod storage;

pub use naming::TimestampNamer;
