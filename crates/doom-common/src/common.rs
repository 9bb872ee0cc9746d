// common.rs — print and error channel shared by the game and its tools

use crate::doomdef::ERR_FATAL;

// ============================================================
// Com_Printf / Com_DPrintf / Com_Error
// ============================================================

/// General-purpose print to stdout.
pub fn com_printf(msg: &str) {
    print!("{}", msg);
}

/// Developer-only print. Controlled by the "developer" cvar.
pub fn com_dprintf(msg: &str) {
    if crate::cvar::cvar_variable_value("developer") == 0.0 {
        return;
    }
    com_printf(msg);
}

/// Engine error handler.
/// - `ERR_FATAL`: prints to stderr and panics.
/// - anything else (`ERR_DROP`): prints the error and returns.
pub fn com_error(code: i32, msg: &str) {
    if code == ERR_FATAL {
        eprintln!("Error: {}", msg);
        panic!("Fatal error: {}", msg);
    }
    eprintln!("********************\nERROR: {}\n********************", msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doomdef::ERR_DROP;

    #[test]
    #[should_panic(expected = "Fatal error: bad state")]
    fn test_fatal_error_panics() {
        com_error(ERR_FATAL, "bad state");
    }

    #[test]
    fn test_drop_error_returns() {
        com_error(ERR_DROP, "recoverable");
    }
}
