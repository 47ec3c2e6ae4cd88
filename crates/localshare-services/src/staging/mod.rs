pub mod store;

pub use store::{SharedStagingStore, StagingStore};
