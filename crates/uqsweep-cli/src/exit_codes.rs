//! Process exit codes. The sweep uses the process defaults only.

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1; // Configuration, runner or I/O error
