// p_setup.rs — level assembly: geometry, blockmap, per-level state
//
// Map loading from WAD lumps lives elsewhere; this builds the in-memory
// level the movement code runs against, from vertices, sectors and lines.

use doom_common::common::{com_dprintf, com_error};
use doom_common::cvar::cvar_value_or;
use doom_common::doomdef::ERR_DROP;
use doom_common::m_bbox::{m_add_to_box, m_clear_box, BBox, BOXBOTTOM, BOXLEFT, BOXRIGHT, BOXTOP};
use doom_common::m_fixed::{Fixed, FRACUNIT};
use doom_common::z_bmalloc::BlockPool;

use crate::p_local::{
    Divline, Level, Line, LineFlags, LineOpening, MapQuery, Player, Sector, ShotState,
    Subsector, Vertex, MAPBLOCKSHIFT, SECNODE_PERPOOL,
};

/// Default ceiling on live sector nodes; `secnode_max` overrides it.
pub const SECNODE_MAX_DEFAULT: f32 = 32768.0;

// ============================================================
// Blockmap
// ============================================================

/// Uniform grid of MAPBLOCKSIZE cells over the map. Each cell lists the
/// lines crossing it and the mobjs whose origin lies in it (head first).
#[derive(Clone, Debug, Default)]
pub struct Blockmap {
    pub orgx: Fixed,
    pub orgy: Fixed,
    pub width: i32,
    pub height: i32,
    pub lines: Vec<Vec<usize>>,
    pub links: Vec<Vec<usize>>,
}

impl Blockmap {
    /// Build the grid for `lines`. The origin sits 8 units below and left
    /// of the lowest vertex. Each line is filed in every cell its bounding
    /// box covers.
    pub fn build(lines: &[Line]) -> Self {
        if lines.is_empty() {
            com_error(ERR_DROP, "Blockmap::build: level has no lines");
            return Self {
                width: 1,
                height: 1,
                lines: vec![Vec::new()],
                links: vec![Vec::new()],
                ..Default::default()
            };
        }

        let mut bounds: BBox = [0; 4];
        m_clear_box(&mut bounds);
        for line in lines {
            m_add_to_box(&mut bounds, line.v1.x, line.v1.y);
            m_add_to_box(&mut bounds, line.v2.x, line.v2.y);
        }

        let orgx = bounds[BOXLEFT] - 8 * FRACUNIT;
        let orgy = bounds[BOXBOTTOM] - 8 * FRACUNIT;
        let width = ((bounds[BOXRIGHT] - orgx) >> MAPBLOCKSHIFT) + 1;
        let height = ((bounds[BOXTOP] - orgy) >> MAPBLOCKSHIFT) + 1;
        let cells = (width * height) as usize;

        let mut bmap = Self {
            orgx,
            orgy,
            width,
            height,
            lines: vec![Vec::new(); cells],
            links: vec![Vec::new(); cells],
        };

        for (i, line) in lines.iter().enumerate() {
            let xl = bmap.block_x(line.bbox[BOXLEFT]);
            let xh = bmap.block_x(line.bbox[BOXRIGHT]);
            let yl = bmap.block_y(line.bbox[BOXBOTTOM]);
            let yh = bmap.block_y(line.bbox[BOXTOP]);
            for by in yl..=yh {
                for bx in xl..=xh {
                    if let Some(cell) = bmap.cell_index(bx, by) {
                        bmap.lines[cell].push(i);
                    }
                }
            }
        }

        com_dprintf(&format!(
            "Blockmap::build: {}x{} cells for {} lines\n",
            width,
            height,
            lines.len()
        ));
        bmap
    }

    #[inline]
    pub fn block_x(&self, x: Fixed) -> i32 {
        (x - self.orgx) >> MAPBLOCKSHIFT
    }

    #[inline]
    pub fn block_y(&self, y: Fixed) -> i32 {
        (y - self.orgy) >> MAPBLOCKSHIFT
    }

    /// Cell span (xl, xh, yl, yh) of the square reaching `dist` from (x, y),
    /// pinned one cell past the grid edge. Computed wide so a huge `dist`
    /// cannot overflow.
    pub fn cells_around(&self, x: Fixed, y: Fixed, dist: i64) -> (i32, i32, i32, i32) {
        let cell = |v: i64, org: Fixed, len: i32| {
            ((v - org as i64) >> MAPBLOCKSHIFT).clamp(-1, len as i64) as i32
        };
        let (x, y) = (x as i64, y as i64);
        (
            cell(x - dist, self.orgx, self.width),
            cell(x + dist, self.orgx, self.width),
            cell(y - dist, self.orgy, self.height),
            cell(y + dist, self.orgy, self.height),
        )
    }

    /// Flat index of cell (x, y), or None outside the grid.
    pub fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// Drop every mobj link, keeping the line lists.
    pub fn clear_links(&mut self) {
        for cell in &mut self.links {
            cell.clear();
        }
    }
}

// ============================================================
// Level construction
// ============================================================

/// Accumulates map geometry, then produces a `Level`. Heights and
/// coordinates are given in whole map units.
#[derive(Default)]
pub struct LevelBuilder {
    vertexes: Vec<Vertex>,
    lines: Vec<Line>,
    sectors: Vec<Sector>,
    subsectors: Vec<Subsector>,
    players: usize,
    skyflatnum: i16,
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sector and a subsector covering it. Returns the sector index,
    /// which is also the index of its subsector unless `add_subsector` is
    /// used.
    pub fn add_sector(&mut self, floor: i32, ceiling: i32) -> usize {
        self.sectors.push(Sector {
            floorheight: floor * FRACUNIT,
            ceilingheight: ceiling * FRACUNIT,
            ..Default::default()
        });
        let sector = self.sectors.len() - 1;
        self.subsectors.push(Subsector { sector });
        sector
    }

    pub fn add_subsector(&mut self, sector: usize) -> usize {
        self.subsectors.push(Subsector { sector });
        self.subsectors.len() - 1
    }

    pub fn sector_mut(&mut self, sector: usize) -> &mut Sector {
        &mut self.sectors[sector]
    }

    /// Add a line from (x1, y1) to (x2, y2). The front side is on the right
    /// when walking from the first vertex to the second. One-sided lines
    /// block everything.
    pub fn add_line(
        &mut self,
        (x1, y1): (i32, i32),
        (x2, y2): (i32, i32),
        front: usize,
        back: Option<usize>,
    ) -> usize {
        let v1 = Vertex { x: x1 * FRACUNIT, y: y1 * FRACUNIT };
        let v2 = Vertex { x: x2 * FRACUNIT, y: y2 * FRACUNIT };
        self.vertexes.push(v1);
        self.vertexes.push(v2);
        let mut line = Line::new(v1, v2, front, back);
        if back.is_none() {
            line.flags |= LineFlags::BLOCKING;
        }
        self.lines.push(line);
        self.lines.len() - 1
    }

    pub fn line_mut(&mut self, line: usize) -> &mut Line {
        &mut self.lines[line]
    }

    pub fn set_special(&mut self, line: usize, special: i16, tag: i16) {
        self.lines[line].special = special;
        self.lines[line].tag = tag;
    }

    pub fn set_players(&mut self, count: usize) {
        self.players = count;
    }

    pub fn set_skyflatnum(&mut self, pic: i16) {
        self.skyflatnum = pic;
    }

    pub fn build(self) -> Level {
        let blockmap = Blockmap::build(&self.lines);
        Level {
            vertexes: self.vertexes,
            lines: self.lines,
            sectors: self.sectors,
            subsectors: self.subsectors,
            players: vec![Player::default(); self.players],
            mobjs: Vec::new(),
            blockmap,
            secnodes: new_secnode_pool(),
            validcount: 1,
            skyflatnum: self.skyflatnum,
            tm: MapQuery::default(),
            shot: ShotState::default(),
            opening: LineOpening::default(),
            trace: Divline::default(),
            intercepts: Vec::new(),
            linetarget: None,
        }
    }
}

fn new_secnode_pool() -> BlockPool<crate::p_secnode::MSecnode> {
    let max = cvar_value_or("secnode_max", SECNODE_MAX_DEFAULT);
    BlockPool::new("secnodezone", SECNODE_PERPOOL, max.max(0.0) as usize)
}

impl Level {
    /// Level teardown: drop every mobj and node, keep the geometry.
    /// Outstanding mobj and node ids become invalid.
    pub fn clear_things(&mut self) {
        self.mobjs.clear();
        self.secnodes.clear();
        self.blockmap.clear_links();
        for sector in &mut self.sectors {
            sector.touching_thinglist = None;
        }
        for player in &mut self.players {
            player.mo = None;
        }
        self.tm = MapQuery::default();
        self.shot = ShotState::default();
        self.intercepts.clear();
        self.linetarget = None;
    }
}
