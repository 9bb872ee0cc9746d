// p_local.rs — play simulation data model: mobjs, lines, sectors, level

use doom_common::m_bbox::{BBox, BOXBOTTOM, BOXLEFT, BOXRIGHT, BOXTOP};
use doom_common::m_fixed::{Fixed, FRACBITS, FRACUNIT};
use doom_common::tables::Angle;
use doom_common::z_bmalloc::BlockPool;

use crate::p_secnode::{MSecnode, SecnodeId};
use crate::p_setup::Blockmap;

// ============================================================
// Map constants
// ============================================================

pub const MAPBLOCKUNITS: i32 = 128;
pub const MAPBLOCKSIZE: Fixed = MAPBLOCKUNITS * FRACUNIT;
pub const MAPBLOCKSHIFT: i32 = FRACBITS + 7;
pub const MAPBTOFRAC: i32 = MAPBLOCKSHIFT - FRACBITS;

/// Largest radius of any mobj; things are filed by origin so may overlap
/// neighbouring blocks by this much.
pub const MAXRADIUS: Fixed = 32 * FRACUNIT;

pub const USERANGE: Fixed = 64 * FRACUNIT;
pub const MELEERANGE: Fixed = 64 * FRACUNIT;
pub const MISSILERANGE: Fixed = 32 * 64 * FRACUNIT;

/// Highest floor step a walking mobj may climb, and the deepest drop a
/// non-dropoff mobj may stand over.
pub const MAXSTEPHEIGHT: Fixed = 24 * FRACUNIT;

// ============================================================
// Mobj flags
// ============================================================

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MobjFlags: u32 {
        /// Call the pickup routine when touched.
        const SPECIAL      = 0x00000001;
        /// Blocks movement.
        const SOLID        = 0x00000002;
        /// Can be hit by attacks.
        const SHOOTABLE    = 0x00000004;
        /// Not linked into sector touch lists.
        const NOSECTOR     = 0x00000008;
        /// Not linked into the blockmap.
        const NOBLOCKMAP   = 0x00000010;
        const AMBUSH       = 0x00000020;
        const JUSTHIT      = 0x00000040;
        const JUSTATTACKED = 0x00000080;
        const SPAWNCEILING = 0x00000100;
        const NOGRAVITY    = 0x00000200;
        /// May walk off ledges.
        const DROPOFF      = 0x00000400;
        /// Picks up items it touches.
        const PICKUP       = 0x00000800;
        const NOCLIP       = 0x00001000;
        const SLIDE        = 0x00002000;
        const FLOAT        = 0x00004000;
        /// Moves instantly; no height or line-crossing checks.
        const TELEPORT     = 0x00008000;
        const MISSILE      = 0x00010000;
        const DROPPED      = 0x00020000;
        const SHADOW       = 0x00040000;
        /// Hits spawn puffs instead of blood.
        const NOBLOOD      = 0x00080000;
        const CORPSE       = 0x00100000;
        const COUNTKILL    = 0x00400000;
        const COUNTITEM    = 0x00800000;
        /// Rebounds off solid things instead of exploding.
        const BOUNCES      = 0x20000000;
        /// Allied with the players.
        const FRIEND       = 0x40000000;
    }
}

// ============================================================
// Mobj types and info table
// ============================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MobjType {
    Player,
    Possessed,
    Shotguy,
    Troop,
    Sergeant,
    TroopShot,
    Rocket,
    Plasma,
    Barrel,
    Puff,
    Blood,
    Clip,
    Medikit,
    Column,
}

#[derive(Clone, Copy, Debug)]
pub struct MobjInfo {
    pub spawnhealth: i32,
    pub radius: Fixed,
    pub height: Fixed,
    /// Missile impact damage multiplier (damage is 1d8 times this).
    pub damage: i32,
    pub flags: MobjFlags,
}

const fn info(spawnhealth: i32, radius: i32, height: i32, damage: i32, flags: MobjFlags) -> MobjInfo {
    MobjInfo {
        spawnhealth,
        radius: radius * FRACUNIT,
        height: height * FRACUNIT,
        damage,
        flags,
    }
}

const MONSTER: MobjFlags = MobjFlags::SOLID
    .union(MobjFlags::SHOOTABLE)
    .union(MobjFlags::COUNTKILL);
const PROJECTILE: MobjFlags = MobjFlags::NOBLOCKMAP
    .union(MobjFlags::MISSILE)
    .union(MobjFlags::DROPOFF)
    .union(MobjFlags::NOGRAVITY);

pub fn mobjinfo(kind: MobjType) -> MobjInfo {
    match kind {
        MobjType::Player => info(100, 16, 56, 0, MobjFlags::SOLID
            .union(MobjFlags::SHOOTABLE)
            .union(MobjFlags::DROPOFF)
            .union(MobjFlags::PICKUP)),
        MobjType::Possessed => info(20, 20, 56, 0, MONSTER),
        MobjType::Shotguy => info(30, 20, 56, 0, MONSTER),
        MobjType::Troop => info(60, 20, 56, 0, MONSTER),
        MobjType::Sergeant => info(150, 30, 56, 0, MONSTER),
        MobjType::TroopShot => info(1000, 6, 8, 3, PROJECTILE),
        MobjType::Rocket => info(1000, 11, 8, 20, PROJECTILE),
        MobjType::Plasma => info(1000, 13, 8, 5, PROJECTILE),
        MobjType::Barrel => info(20, 10, 42, 0, MobjFlags::SOLID
            .union(MobjFlags::SHOOTABLE)
            .union(MobjFlags::NOBLOOD)),
        MobjType::Puff | MobjType::Blood => info(1000, 20, 16, 0, MobjFlags::NOBLOCKMAP
            .union(MobjFlags::NOGRAVITY)),
        MobjType::Clip | MobjType::Medikit => info(1000, 20, 16, 0, MobjFlags::SPECIAL),
        MobjType::Column => info(1000, 16, 16, 0, MobjFlags::SOLID),
    }
}

// ============================================================
// Mobj
// ============================================================

#[derive(Clone, Debug)]
pub struct Mobj {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
    pub angle: Angle,

    pub radius: Fixed,
    pub height: Fixed,

    pub momx: Fixed,
    pub momy: Fixed,
    pub momz: Fixed,

    pub kind: MobjType,
    pub flags: MobjFlags,
    pub health: i32,

    /// Floor / ceiling / lowest adjoining floor at the last committed
    /// position.
    pub floorz: Fixed,
    pub ceilingz: Fixed,
    pub dropoffz: Fixed,

    pub subsector: usize,

    /// For missiles, the mobj that fired it.
    pub target: Option<usize>,
    /// Index into `Level::players` when this mobj carries a player.
    pub player: Option<usize>,

    /// Head of this mobj's thread through the sector-occupancy nodes.
    pub touching_sectorlist: Option<SecnodeId>,
    /// Blockmap cell this mobj is filed in, when linked.
    pub blockcell: Option<usize>,
}

impl Mobj {
    /// A mobj of `kind` at (x, y, z) with its info-table size and flags.
    pub fn new(kind: MobjType, x: Fixed, y: Fixed, z: Fixed) -> Self {
        let info = mobjinfo(kind);
        Self {
            x,
            y,
            z,
            angle: 0,
            radius: info.radius,
            height: info.height,
            momx: 0,
            momy: 0,
            momz: 0,
            kind,
            flags: info.flags,
            health: info.spawnhealth,
            floorz: 0,
            ceilingz: 0,
            dropoffz: 0,
            subsector: 0,
            target: None,
            player: None,
            touching_sectorlist: None,
            blockcell: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Player {
    pub mo: Option<usize>,
}

// ============================================================
// Map geometry
// ============================================================

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct LineFlags: u16 {
        /// Solid, is an obstacle.
        const BLOCKING      = 0x0001;
        /// Blocks monsters only.
        const BLOCKMONSTERS = 0x0002;
        /// Backside will not be present at all if not two sided.
        const TWOSIDED      = 0x0004;
        const DONTPEGTOP    = 0x0008;
        const DONTPEGBOTTOM = 0x0010;
        const SECRET        = 0x0020;
        const SOUNDBLOCK    = 0x0040;
        const DONTDRAW      = 0x0080;
        const MAPPED        = 0x0100;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlopeType {
    Horizontal,
    Vertical,
    Positive,
    Negative,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Vertex {
    pub x: Fixed,
    pub y: Fixed,
}

#[derive(Clone, Debug)]
pub struct Line {
    pub v1: Vertex,
    pub v2: Vertex,
    pub dx: Fixed,
    pub dy: Fixed,
    pub bbox: BBox,
    pub slopetype: SlopeType,
    pub flags: LineFlags,
    /// Action id; one-shot triggers reset it to 0 once they fire.
    pub special: i16,
    pub tag: i16,
    pub frontsector: usize,
    pub backsector: Option<usize>,
    /// Last `Level::validcount` that visited this line.
    pub validcount: i32,
}

impl Line {
    pub fn new(v1: Vertex, v2: Vertex, frontsector: usize, backsector: Option<usize>) -> Self {
        let dx = v2.x - v1.x;
        let dy = v2.y - v1.y;

        let slopetype = if dx == 0 {
            SlopeType::Vertical
        } else if dy == 0 {
            SlopeType::Horizontal
        } else if (dy > 0) == (dx > 0) {
            SlopeType::Positive
        } else {
            SlopeType::Negative
        };

        let mut bbox = [0; 4];
        bbox[BOXLEFT] = v1.x.min(v2.x);
        bbox[BOXRIGHT] = v1.x.max(v2.x);
        bbox[BOXBOTTOM] = v1.y.min(v2.y);
        bbox[BOXTOP] = v1.y.max(v2.y);

        let mut flags = LineFlags::empty();
        if backsector.is_some() {
            flags |= LineFlags::TWOSIDED;
        }

        Self {
            v1,
            v2,
            dx,
            dy,
            bbox,
            slopetype,
            flags,
            special: 0,
            tag: 0,
            frontsector,
            backsector,
            validcount: 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Sector {
    pub floorheight: Fixed,
    pub ceilingheight: Fixed,
    pub floorpic: i16,
    pub ceilingpic: i16,
    pub tag: i16,
    /// Head of the thread of mobjs touching this sector.
    pub touching_thinglist: Option<SecnodeId>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Subsector {
    pub sector: usize,
}

// ============================================================
// Trace records
// ============================================================

/// Parametric line: origin plus direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Divline {
    pub x: Fixed,
    pub y: Fixed,
    pub dx: Fixed,
    pub dy: Fixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterceptTarget {
    Line(usize),
    Thing(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Intercept {
    /// Fraction along the trace, 0 at the origin and FRACUNIT at the end.
    pub frac: Fixed,
    pub d: InterceptTarget,
}

/// Vertical window through a two-sided line, from the last
/// `p_line_opening` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineOpening {
    pub opentop: Fixed,
    pub openbottom: Fixed,
    pub openrange: Fixed,
    pub lowfloor: Fixed,
}

// ============================================================
// Query contexts
// ============================================================

/// Special lines crossed by the move being checked.
pub const MAXSPECIALCROSS: usize = 4;

/// Bounded list of special lines touched during a position check.
/// Lines beyond the capacity are dropped without error; maps that cross
/// more than four specials in one step have always lost the extras.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpecHitList {
    lines: [usize; MAXSPECIALCROSS],
    count: usize,
}

impl SpecHitList {
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Append `line`. Returns false when the list is full and the line was
    /// dropped.
    pub fn push(&mut self, line: usize) -> bool {
        if self.count < MAXSPECIALCROSS {
            self.lines[self.count] = line;
            self.count += 1;
            true
        } else {
            false
        }
    }

    /// Remove the most recently added line.
    pub fn pop(&mut self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        Some(self.lines[self.count])
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.lines[..self.count]
    }
}

/// Movement query context: the thing being moved, where to, and what the
/// line and thing checks have accumulated so far. Only one query may be
/// open at a time; `p_map_start` enforces that.
#[derive(Clone, Debug, Default)]
pub struct MapQuery {
    pub thing: Option<usize>,
    pub x: Fixed,
    pub y: Fixed,
    pub bbox: BBox,

    /// Floor you'd hit if free to fall.
    pub floorz: Fixed,
    /// Ceiling of the sector you're in.
    pub ceilingz: Fixed,
    /// Dropoff on the other side of the lines you're crossing.
    pub dropoffz: Fixed,

    /// The line that lowered the ceiling, so missiles don't explode
    /// against sky hack walls.
    pub ceilingline: Option<usize>,
    /// The last line that restricted the move.
    pub blockline: Option<usize>,

    /// Whether a player may escape a line it is already stuck in.
    pub unstuck: bool,

    pub spechit: SpecHitList,

    /// Thing thread being rebuilt by `p_create_sec_node_list`.
    pub sector_list: Option<SecnodeId>,
}

/// State shared between the hitscan entry points and their traversers.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShotState {
    pub shootthing: Option<usize>,
    /// Height if not aiming up or down.
    pub shootz: Fixed,
    pub la_damage: i32,
    pub attackrange: Fixed,
    pub aimslope: Fixed,
    /// Slopes to the top and bottom of the admissible window.
    pub topslope: Fixed,
    pub bottomslope: Fixed,
    /// Flags a target must not share with the shooter to be aimed at.
    pub aim_flags_mask: MobjFlags,
}

// ============================================================
// Level
// ============================================================

/// Nodes per allocation block in the sector-occupancy pool.
pub const SECNODE_PERPOOL: usize = 32;

pub struct Level {
    pub vertexes: Vec<Vertex>,
    pub lines: Vec<Line>,
    pub sectors: Vec<Sector>,
    pub subsectors: Vec<Subsector>,
    pub players: Vec<Player>,
    pub mobjs: Vec<Option<Mobj>>,

    pub blockmap: Blockmap,
    pub secnodes: BlockPool<MSecnode>,

    /// Incremented every time a check is made, to visit each line once.
    pub validcount: i32,
    pub skyflatnum: i16,

    pub tm: MapQuery,
    pub shot: ShotState,
    pub opening: LineOpening,
    pub trace: Divline,
    pub intercepts: Vec<Intercept>,
    /// Who got hit by the last aim or shot, if anyone.
    pub linetarget: Option<usize>,
}

impl Level {
    pub fn mobj(&self, id: usize) -> &Mobj {
        match self.mobjs.get(id).and_then(|m| m.as_ref()) {
            Some(mo) => mo,
            None => panic!("Level::mobj: {} is not a live mobj", id),
        }
    }

    pub fn mobj_mut(&mut self, id: usize) -> &mut Mobj {
        match self.mobjs.get_mut(id).and_then(|m| m.as_mut()) {
            Some(mo) => mo,
            None => panic!("Level::mobj_mut: {} is not a live mobj", id),
        }
    }

    pub fn mobj_exists(&self, id: usize) -> bool {
        matches!(self.mobjs.get(id), Some(Some(_)))
    }

    /// The player index when `id` carries one.
    pub fn mobj_is_player(&self, id: usize) -> Option<usize> {
        self.mobj(id).player
    }

    /// The sector of the subsector a mobj is linked in.
    pub fn mobj_sector(&self, id: usize) -> usize {
        self.subsectors[self.mobj(id).subsector].sector
    }
}
