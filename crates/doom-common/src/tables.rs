// tables.rs — binary angles and fine trigonometric lookup tables

use std::sync::OnceLock;

use crate::m_fixed::{Fixed, FRACUNIT};

/// Binary angle: the full circle is the full u32 range.
pub type Angle = u32;

pub const ANG45: Angle = 0x2000_0000;
pub const ANG90: Angle = 0x4000_0000;
pub const ANG180: Angle = 0x8000_0000;
pub const ANG270: Angle = 0xc000_0000;

pub const FINEANGLES: usize = 8192;
pub const FINEMASK: usize = FINEANGLES - 1;

/// Shift from a binary angle to a fine table index.
pub const ANGLETOFINESHIFT: u32 = 19;

/// Sine over 5/4 of a circle so cosine can share the table.
static FINESINE: OnceLock<Vec<Fixed>> = OnceLock::new();

fn finesine_table() -> &'static [Fixed] {
    FINESINE.get_or_init(|| {
        (0..FINEANGLES * 5 / 4)
            .map(|i| {
                let a = (i as f64 + 0.5) * std::f64::consts::TAU / FINEANGLES as f64;
                (a.sin() * FRACUNIT as f64) as Fixed
            })
            .collect()
    })
}

#[inline]
pub fn finesine(fine: usize) -> Fixed {
    finesine_table()[fine & FINEMASK]
}

#[inline]
pub fn finecosine(fine: usize) -> Fixed {
    finesine_table()[(fine & FINEMASK) + FINEANGLES / 4]
}

#[inline]
pub fn angle_to_fine(angle: Angle) -> usize {
    (angle >> ANGLETOFINESHIFT) as usize
}
