// Discovery constants (no magic values)
use std::time::Duration;

/// Upper bound on establishing a store connection (5s)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Keys requested per SCAN round trip
pub const DEFAULT_SCAN_COUNT: usize = 1000;

/// Generation of the empty registry at process start
pub const INITIAL_GENERATION: u64 = 0;
