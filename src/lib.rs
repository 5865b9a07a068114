mod record;
pub use record::*;

mod error;
pub use error::{Error, Result, StatusCode};

mod config;
pub use config::*;

// core tree impl
pub mod tree;
pub use tree::{AugmentedTree, Bucket, DescendVisit, DescendVisitResult, Node, Summary, TreeMerge};

mod record_store;
pub use record_store::RecordStore;
mod record_stores;
pub use record_stores::*;

mod forest;
pub use forest::*;

mod manager;
pub use manager::*;
