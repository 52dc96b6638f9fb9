use candid::CandidType;
use serde::Deserialize;

const DEFAULT_IN_MEMORY_RECORDS: usize = 1024;
const DEFAULT_MAX_RECORD_LENGTH: usize = 1024;

/// Log settings to initialize the logger
#[derive(Debug, Clone, PartialEq, Eq, CandidType, Deserialize)]
pub struct LogSettings {
    /// Enable logging to console (`ic_cdk::print` when running in IC)
    pub enable_console: bool,
    /// Number of records to be stored in the circular memory buffer.
    /// Zero disables storing records.
    pub in_memory_records: usize,
    /// Records longer than this number of bytes are truncated before being stored in memory.
    pub max_record_length: usize,
    /// Log configuration as combination of filters.
    /// Example of valid configurations:
    /// - info
    /// - debug,crate1::mod1=error,crate1::mod2,crate2=debug
    pub log_filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enable_console: true,
            in_memory_records: DEFAULT_IN_MEMORY_RECORDS,
            max_record_length: DEFAULT_MAX_RECORD_LENGTH,
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, CandidType, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub offset: usize,
    pub count: usize,
}
