//! Constants and default values for logrotate

/// Default capacity of the pending-payload queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default rotation threshold in bytes (10MB)
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of rotated files to keep
pub const DEFAULT_MAX_FILES: usize = 5;

/// Mode for log directories created on demand (before umask)
pub const DIR_MODE: u32 = 0o777;

/// Mode for newly created log files (before umask)
pub const FILE_MODE: u32 = 0o666;

/// Name given to the background writer thread
pub const WORKER_THREAD_NAME: &str = "logrotate-writer";

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "logrotate.toml",
    "logrotate.yaml",
    "logrotate.yml",
    "logrotate.json",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_queue_capacity() {
        assert_eq!(DEFAULT_QUEUE_CAPACITY, 1024);
    }

    #[test]
    fn test_config_files_cover_all_formats() {
        assert!(CONFIG_FILES.iter().any(|f| f.ends_with(".toml")));
        assert!(CONFIG_FILES.iter().any(|f| f.ends_with(".yaml")));
        assert!(CONFIG_FILES.iter().any(|f| f.ends_with(".json")));
    }
}
