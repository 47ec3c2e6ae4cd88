pub mod service;

pub use service::archive_folder;
