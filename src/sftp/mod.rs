//! SFTP sessions for single-file upload and download.

pub mod session;
pub mod types;

pub use session::SftpSession;
pub use types::{TransferOutcome, format_size};
