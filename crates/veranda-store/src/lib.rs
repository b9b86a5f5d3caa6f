pub mod attachments;
pub mod config;
pub mod error;
pub mod log_store;

pub use attachments::AttachmentStoreClient;
pub use config::StoreConfig;
pub use error::{StoreError, UploadError, UploadErrorKind};
pub use log_store::LogStoreClient;
