// doomdef.rs — engine-wide constants shared by every crate

// ============================================================
// com_error codes
// ============================================================

/// Unrecoverable consistency fault. Prints and panics.
pub const ERR_FATAL: i32 = 0;
/// Level-scoped problem. Printed, execution continues.
pub const ERR_DROP: i32 = 1;

// ============================================================
// cvar flags
// ============================================================

/// Only settable from code, never from the console.
pub const CVAR_NOSET: i32 = 8;

