//! Catalog log event names.
//!
//! One constant per event keeps grep-ability and stops free-form event
//! strings from drifting between call sites.

/// Request rejected during validation, before any store call
pub const REQUEST_REJECTED: &str = "REQUEST_REJECTED";

/// Plan executed against a backing store
pub const QUERY_EXECUTED: &str = "QUERY_EXECUTED";

/// Page envelope constructed and handed to the caller
pub const PAGE_SERVED: &str = "PAGE_SERVED";

/// Backing store reported a failure
pub const STORE_ERROR: &str = "STORE_ERROR";

/// HTTP server lifecycle
pub const SERVER_STARTED: &str = "SERVER_STARTED";
