//! operations built on top of the object store

mod fsck;
mod generate;
mod log;

pub use fsck::{fsck, CorruptObject, FsckReport, MismatchedObject, MissingObject};
pub use generate::{generate, ChainLink, ChainPlan, GenerateReport};
pub use log::{log, LogEntry};
