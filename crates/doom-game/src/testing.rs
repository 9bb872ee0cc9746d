// testing.rs — level fixtures and a recording MapImport for unit tests

use doom_common::m_bbox::{BBox, BOXBOTTOM, BOXLEFT, BOXRIGHT, BOXTOP};
use doom_common::m_fixed::{Fixed, FRACUNIT};
use doom_common::m_random::MRandom;

use crate::map_import::{MapContext, MapImport, Sfx};
use crate::p_local::{Level, MobjFlags, Mobj, MobjType};
use crate::p_maputl::{p_add_mobj, p_remove_mobj};
use crate::p_setup::LevelBuilder;
use crate::p_spec::{DoorKind, FloorKind, PlatKind};

pub fn fu(units: i32) -> Fixed {
    units * FRACUNIT
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Pickup { special: usize, toucher: usize },
    Damage { target: usize, inflictor: Option<usize>, source: Option<usize>, damage: i32 },
    Puff { x: Fixed, y: Fixed, z: Fixed },
    Blood { x: Fixed, y: Fixed, z: Fixed, damage: i32 },
    UseLine { thing: usize, line: usize },
    Door { line: usize, kind: DoorKind },
    Plat { line: usize, kind: PlatKind },
    Floor { line: usize, kind: FloorKind },
    Sound { origin: Option<usize>, sfx: Sfx },
}

/// Records every callback. Subsectors are found by rectangular regions
/// checked in order, edges inclusive; points outside all of them land in
/// subsector 0.
pub struct TestImport {
    pub regions: Vec<(BBox, usize)>,
    pub events: Vec<Event>,
    pub rng: MRandom,
    pub fixed_random: Option<i32>,
    pub sight: bool,
    pub mover_result: bool,
    pub remove_on_pickup: bool,
    pub remove_on_damage: bool,
}

impl TestImport {
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            events: Vec::new(),
            rng: MRandom::new(0),
            fixed_random: None,
            sight: true,
            mover_result: true,
            remove_on_pickup: false,
            remove_on_damage: false,
        }
    }

    pub fn damage_events(&self) -> Vec<(usize, i32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Damage { target, damage, .. } => Some((*target, *damage)),
                _ => None,
            })
            .collect()
    }
}

impl MapImport for TestImport {
    fn point_in_subsector(&self, _level: &Level, x: Fixed, y: Fixed) -> usize {
        self.regions
            .iter()
            .find(|(b, _)| x >= b[BOXLEFT] && x <= b[BOXRIGHT] && y >= b[BOXBOTTOM] && y <= b[BOXTOP])
            .map_or(0, |&(_, ss)| ss)
    }

    fn p_random(&mut self) -> i32 {
        match self.fixed_random {
            Some(v) => v,
            None => self.rng.p_random(),
        }
    }

    fn touch_special_thing(&mut self, level: &mut Level, special: usize, toucher: usize) {
        self.events.push(Event::Pickup { special, toucher });
        if self.remove_on_pickup {
            p_remove_mobj(&mut MapContext::new(level, self), special);
        }
    }

    fn damage_mobj(
        &mut self,
        level: &mut Level,
        target: usize,
        inflictor: Option<usize>,
        source: Option<usize>,
        damage: i32,
    ) {
        self.events.push(Event::Damage { target, inflictor, source, damage });
        if !level.mobj_exists(target) {
            return;
        }
        if self.remove_on_damage {
            p_remove_mobj(&mut MapContext::new(level, self), target);
            return;
        }
        let mo = level.mobj_mut(target);
        mo.health -= damage;
        if mo.health <= 0 {
            mo.flags.remove(MobjFlags::SHOOTABLE | MobjFlags::SOLID);
            mo.flags |= MobjFlags::CORPSE;
        }
    }

    fn check_sight(&mut self, _level: &Level, _t1: usize, _t2: usize) -> bool {
        self.sight
    }

    fn spawn_puff(&mut self, _level: &mut Level, x: Fixed, y: Fixed, z: Fixed) {
        self.events.push(Event::Puff { x, y, z });
    }

    fn spawn_blood(&mut self, _level: &mut Level, x: Fixed, y: Fixed, z: Fixed, damage: i32) {
        self.events.push(Event::Blood { x, y, z, damage });
    }

    fn use_special_line(&mut self, _level: &mut Level, thing: usize, line: usize) -> bool {
        self.events.push(Event::UseLine { thing, line });
        true
    }

    fn ev_do_door(&mut self, _level: &mut Level, line: usize, kind: DoorKind) -> bool {
        self.events.push(Event::Door { line, kind });
        self.mover_result
    }

    fn ev_do_plat(&mut self, _level: &mut Level, line: usize, kind: PlatKind) -> bool {
        self.events.push(Event::Plat { line, kind });
        self.mover_result
    }

    fn ev_do_floor(&mut self, _level: &mut Level, line: usize, kind: FloorKind) -> bool {
        self.events.push(Event::Floor { line, kind });
        self.mover_result
    }

    fn start_sound(&mut self, _level: &Level, origin: Option<usize>, sfx: Sfx) {
        self.events.push(Event::Sound { origin, sfx });
    }
}

// ============================================================
// Two-room fixture
// ============================================================
//
//   (-512,256) +-----------+-----------+ (512,256)
//              |           |           |
//              |  WEST (0) D  EAST (1) E
//              |           |           |
//  (-512,-256) +-----------+-----------+ (512,-256)
//
// D is the two-sided divider at x=0, front facing west. Outer walls are
// one-sided, wound clockwise so their fronts face inward. The west room
// is floor 0 / ceiling 128.

pub const WEST: usize = 0;
pub const EAST: usize = 1;
pub const DIVIDER: usize = 0;
pub const EAST_WALL: usize = 3;
pub const SKY: i16 = 77;

fn region(left: i32, bottom: i32, right: i32, top: i32) -> BBox {
    let mut b = [0; 4];
    b[BOXLEFT] = fu(left);
    b[BOXBOTTOM] = fu(bottom);
    b[BOXRIGHT] = fu(right);
    b[BOXTOP] = fu(top);
    b
}

pub fn two_room_level(east_floor: i32, east_ceiling: i32) -> (Level, TestImport) {
    let mut b = LevelBuilder::new();
    let west = b.add_sector(0, 128);
    let east = b.add_sector(east_floor, east_ceiling);

    let divider = b.add_line((0, 256), (0, -256), west, Some(east));
    b.add_line((-512, 256), (0, 256), west, None);
    b.add_line((0, 256), (512, 256), east, None);
    let east_wall = b.add_line((512, 256), (512, -256), east, None);
    b.add_line((512, -256), (0, -256), east, None);
    b.add_line((0, -256), (-512, -256), west, None);
    b.add_line((-512, -256), (-512, 256), west, None);
    debug_assert_eq!((divider, east_wall), (DIVIDER, EAST_WALL));

    b.set_players(1);
    b.set_skyflatnum(SKY);
    let level = b.build();

    let mut gi = TestImport::new();
    gi.regions.push((region(-512, -256, 0, 256), WEST));
    gi.regions.push((region(0, -256, 512, 256), EAST));
    (level, gi)
}

pub fn spawn(ctx: &mut MapContext<'_>, kind: MobjType, x: Fixed, y: Fixed, z: Fixed) -> usize {
    p_add_mobj(ctx, Mobj::new(kind, x, y, z))
}

/// Spawn the body of the first player without one.
pub fn spawn_player(ctx: &mut MapContext<'_>, x: Fixed, y: Fixed) -> usize {
    let p = match ctx.level.players.iter().position(|pl| pl.mo.is_none()) {
        Some(p) => p,
        None => {
            ctx.level.players.push(Default::default());
            ctx.level.players.len() - 1
        }
    };
    let mut mo = Mobj::new(MobjType::Player, x, y, 0);
    mo.player = Some(p);
    p_add_mobj(ctx, mo)
}
