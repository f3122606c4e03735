/// Result of one upload or download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    pub bytes_transferred: u64,
    /// Byte count matched the source size
    pub success: bool,
}

impl TransferOutcome {
    pub fn new(bytes_transferred: u64, expected_bytes: u64) -> Self {
        Self {
            bytes_transferred,
            success: bytes_transferred == expected_bytes,
        }
    }
}

/// Format file size for display
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.1} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.1} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.1} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}
