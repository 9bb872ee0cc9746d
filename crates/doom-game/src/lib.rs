#![allow(clippy::too_many_arguments, clippy::collapsible_if, clippy::collapsible_else_if,
         clippy::manual_range_contains, clippy::comparison_chain, clippy::nonminimal_bool)]

// Play simulation core: movement clipping, hitscan traces, use lines,
// radius damage and the sector-occupancy lists they maintain.

pub mod p_local;
pub mod p_setup;
pub mod p_maputl;
pub mod p_secnode;
pub mod p_spec;
pub mod p_map;
pub mod map_import;

#[cfg(test)]
pub(crate) mod testing;
