//! Map import interface — services the movement core calls out to.
//!
//! Everything the core needs from the rest of the game (BSP point
//! location, damage and pickup rules, effect spawning, sector movers,
//! sound) goes through `MapImport`. The core never stores a reference to
//! the implementation past the call that received it.

use doom_common::m_fixed::Fixed;

use crate::p_local::Level;
use crate::p_spec::{DoorKind, FloorKind, PlatKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sfx {
    /// "Oof": a use attempt hit an unusable wall.
    Noway,
}

pub trait MapImport {
    /// BSP point location: the subsector containing (x, y).
    fn point_in_subsector(&self, level: &Level, x: Fixed, y: Fixed) -> usize;

    /// Next value from the play-simulation random stream, 0..=255.
    fn p_random(&mut self) -> i32;

    /// `toucher` walked over the pickup `special`. May remove `special`.
    fn touch_special_thing(&mut self, level: &mut Level, special: usize, toucher: usize);

    /// Apply `damage` to `target`. May kill or remove it.
    fn damage_mobj(
        &mut self,
        level: &mut Level,
        target: usize,
        inflictor: Option<usize>,
        source: Option<usize>,
        damage: i32,
    );

    /// Unobstructed line of sight between two mobjs.
    fn check_sight(&mut self, level: &Level, t1: usize, t2: usize) -> bool;

    fn spawn_puff(&mut self, level: &mut Level, x: Fixed, y: Fixed, z: Fixed);

    fn spawn_blood(&mut self, level: &mut Level, x: Fixed, y: Fixed, z: Fixed, damage: i32);

    /// Switch / manual-door activation. Returns true if something happened.
    fn use_special_line(&mut self, level: &mut Level, thing: usize, line: usize) -> bool;

    fn ev_do_door(&mut self, level: &mut Level, line: usize, kind: DoorKind) -> bool;

    fn ev_do_plat(&mut self, level: &mut Level, line: usize, kind: PlatKind) -> bool;

    fn ev_do_floor(&mut self, level: &mut Level, line: usize, kind: FloorKind) -> bool;

    fn start_sound(&mut self, level: &Level, origin: Option<usize>, sfx: Sfx);
}

/// The level plus the services operating on it, handed to every query
/// and to the iterator callbacks.
pub struct MapContext<'a> {
    pub level: &'a mut Level,
    pub gi: &'a mut dyn MapImport,
}

impl<'a> MapContext<'a> {
    pub fn new(level: &'a mut Level, gi: &'a mut dyn MapImport) -> Self {
        Self { level, gi }
    }
}
