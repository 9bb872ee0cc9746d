#![allow(clippy::too_many_arguments, clippy::collapsible_if, clippy::collapsible_else_if,
         clippy::manual_range_contains, clippy::comparison_chain, clippy::identity_op,
         clippy::needless_range_loop)]

pub mod doomdef;
pub mod common;
pub mod cvar;
pub mod m_fixed;
pub mod m_bbox;
pub mod tables;
pub mod m_random;
pub mod z_bmalloc;
