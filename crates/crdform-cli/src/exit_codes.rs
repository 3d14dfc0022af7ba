//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

#![allow(dead_code)]

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - configuration does not match the resource schema
pub const VALIDATION_ERROR: i32 = 2;

/// Conflict - fields are owned by another field manager
pub const CONFLICT: i32 = 3;

/// Not found - the object does not exist
pub const NOT_FOUND: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Offline - a network operation was refused in offline mode
pub const OFFLINE: i32 = 6;

/// Kubernetes error - transport failure, timeout or API rejection
pub const KUBE_ERROR: i32 = 7;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;

/// Configuration error - provider configuration is invalid (sysexits.h EX_CONFIG)
pub const CONFIG_ERROR: i32 = 78;
