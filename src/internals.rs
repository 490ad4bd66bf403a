use std::time::Duration;

/// Default timeout duration for waiting for frames from the sensor node.
pub const NANOLINK_DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Largest number of bytes sent to the node in a single upstream write.
/// The node's BLE characteristic rejects longer writes.
pub const NANOLINK_UPSTREAM_CHUNK_SIZE: usize = 50;
