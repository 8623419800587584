//! Port for storing uploaded attachment bytes.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by attachment storage adapters.
    pub enum AttachmentStorageError {
        /// The upload directory could not be prepared.
        Directory { message: String } => "upload directory unavailable: {message}",
        /// Writing or removing a file failed.
        Io { name: String, message: String } => "attachment {name} failed: {message}",
    }
}

/// Flat namespace of stored files addressed by generated name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentStorage: Send + Sync {
    /// Write `bytes` under `name`, creating the upload directory if needed.
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<(), AttachmentStorageError>;

    /// Read the file stored under `name`, `None` when it does not exist.
    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, AttachmentStorageError>;

    /// Remove the file stored under `name`. Missing files are not an error.
    async fn remove(&self, name: &str) -> Result<(), AttachmentStorageError>;
}
