// p_maputl.rs — movement/collision utility functions
//
// Line side tests, openings, blockmap iteration, intercept collection and
// path traversal, plus linking mobjs into the blockmap and sector lists.
// Everything here is pure geometry over the level; the policy decisions
// live in p_map.

use doom_common::m_bbox::{BBox, BOXBOTTOM, BOXLEFT, BOXRIGHT, BOXTOP};
use doom_common::m_fixed::{d_abs, fixed_div, fixed_mul, Fixed, FRACBITS, FRACUNIT};

use crate::map_import::MapContext;
use crate::p_local::{
    Divline, Intercept, InterceptTarget, Level, Line, Mobj, MobjFlags, SlopeType,
    MAPBLOCKSHIFT, MAPBLOCKSIZE, MAPBTOFRAC,
};
use crate::p_secnode::{p_create_sec_node_list, p_del_seclist};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PathFlags: u32 {
        const ADDLINES  = 1;
        const ADDTHINGS = 2;
    }
}

/// Most traces cross only a handful of cells; the list is reused across
/// traversals.
const MAXINTERCEPTS: usize = 128;

// ============================================================
// Geometry
// ============================================================

/// Gives an estimation of distance (not exact).
pub fn p_aprox_distance(dx: Fixed, dy: Fixed) -> Fixed {
    let dx = d_abs(dx);
    let dy = d_abs(dy);
    if dx < dy {
        dx + dy - (dx >> 1)
    } else {
        dx + dy - (dy >> 1)
    }
}

/// 0 for the front (right) side, 1 for the back.
pub fn p_point_on_line_side(x: Fixed, y: Fixed, line: &Line) -> i32 {
    let side = if line.dx == 0 {
        if x <= line.v1.x {
            line.dy > 0
        } else {
            line.dy < 0
        }
    } else if line.dy == 0 {
        if y <= line.v1.y {
            line.dx < 0
        } else {
            line.dx > 0
        }
    } else {
        fixed_mul(y - line.v1.y, line.dx >> FRACBITS) >= fixed_mul(line.dy >> FRACBITS, x - line.v1.x)
    };
    side as i32
}

/// Which side of `line` the box is on: 0 or 1, or -1 if it straddles.
pub fn p_box_on_line_side(bbox: &BBox, line: &Line) -> i32 {
    match line.slopetype {
        SlopeType::Horizontal => {
            let p = bbox[BOXTOP] > line.v1.y;
            if (bbox[BOXBOTTOM] > line.v1.y) == p {
                (p ^ (line.dx < 0)) as i32
            } else {
                -1
            }
        }
        SlopeType::Vertical => {
            let p = bbox[BOXRIGHT] < line.v1.x;
            if (bbox[BOXLEFT] < line.v1.x) == p {
                (p ^ (line.dy < 0)) as i32
            } else {
                -1
            }
        }
        SlopeType::Positive => {
            let p = p_point_on_line_side(bbox[BOXLEFT], bbox[BOXTOP], line);
            if p_point_on_line_side(bbox[BOXRIGHT], bbox[BOXBOTTOM], line) == p {
                p
            } else {
                -1
            }
        }
        SlopeType::Negative => {
            let p = p_point_on_line_side(bbox[BOXRIGHT], bbox[BOXTOP], line);
            if p_point_on_line_side(bbox[BOXLEFT], bbox[BOXBOTTOM], line) == p {
                p
            } else {
                -1
            }
        }
    }
}

/// 0 or 1.
pub fn p_point_on_divline_side(x: Fixed, y: Fixed, line: &Divline) -> i32 {
    let side = if line.dx == 0 {
        if x <= line.x {
            line.dy > 0
        } else {
            line.dy < 0
        }
    } else if line.dy == 0 {
        if y <= line.y {
            line.dx < 0
        } else {
            line.dx > 0
        }
    } else {
        let x = x.wrapping_sub(line.x);
        let y = y.wrapping_sub(line.y);
        if (line.dy ^ line.dx ^ x ^ y) < 0 {
            // sign check decides
            (line.dy ^ x) < 0
        } else {
            fixed_mul(y >> 8, line.dx >> 8) >= fixed_mul(line.dy >> 8, x >> 8)
        }
    };
    side as i32
}

pub fn p_make_divline(line: &Line) -> Divline {
    Divline {
        x: line.v1.x,
        y: line.v1.y,
        dx: line.dx,
        dy: line.dy,
    }
}

/// Fractional intercept point along the first divline, or 0 if the two
/// are parallel.
pub fn p_intercept_vector(v2: &Divline, v1: &Divline) -> Fixed {
    let den = fixed_mul(v1.dy >> 8, v2.dx) - fixed_mul(v1.dx >> 8, v2.dy);
    if den == 0 {
        return 0;
    }
    let num = fixed_mul((v1.x - v2.x) >> 8, v1.dy) + fixed_mul((v2.y - v1.y) >> 8, v1.dx);
    fixed_div(num, den)
}

/// Compute the vertical window through `ld` into `level.opening`. A
/// one-sided line only zeroes `openrange`; the rest keeps its last value.
pub fn p_line_opening(level: &mut Level, ld: usize) {
    let line = &level.lines[ld];
    let back = match line.backsector {
        Some(back) => &level.sectors[back],
        None => {
            level.opening.openrange = 0;
            return;
        }
    };
    let front = &level.sectors[line.frontsector];

    let op = &mut level.opening;
    op.opentop = front.ceilingheight.min(back.ceilingheight);
    if front.floorheight > back.floorheight {
        op.openbottom = front.floorheight;
        op.lowfloor = back.floorheight;
    } else {
        op.openbottom = back.floorheight;
        op.lowfloor = front.floorheight;
    }
    op.openrange = op.opentop - op.openbottom;
}

// ============================================================
// Thing position setting
// ============================================================

/// Unlink a mobj from the blockmap and detach its sector thread into
/// `tm.sector_list`, where `p_set_thing_position` picks it up again.
pub fn p_unset_thing_position(level: &mut Level, thing: usize) {
    let mo = level.mobj_mut(thing);
    let flags = mo.flags;

    if !flags.contains(MobjFlags::NOSECTOR) {
        let list = mo.touching_sectorlist.take();
        level.tm.sector_list = list;
    }

    if !flags.contains(MobjFlags::NOBLOCKMAP) {
        if let Some(cell) = level.mobj_mut(thing).blockcell.take() {
            level.blockmap.links[cell].retain(|&t| t != thing);
        }
    }
}

/// Link a mobj into its subsector, sector thread and blockmap cell at its
/// current x, y.
pub fn p_set_thing_position(ctx: &mut MapContext<'_>, thing: usize) {
    let (x, y, flags) = {
        let mo = ctx.level.mobj(thing);
        (mo.x, mo.y, mo.flags)
    };
    let ss = ctx.gi.point_in_subsector(ctx.level, x, y);
    ctx.level.mobj_mut(thing).subsector = ss;

    if !flags.contains(MobjFlags::NOSECTOR) {
        // Reuses the nodes left in tm.sector_list by the unset.
        p_create_sec_node_list(ctx, thing);
        let list = ctx.level.tm.sector_list.take();
        ctx.level.mobj_mut(thing).touching_sectorlist = list;
    }

    if !flags.contains(MobjFlags::NOBLOCKMAP) {
        let bmap = &mut ctx.level.blockmap;
        let cell = bmap.cell_index(bmap.block_x(x), bmap.block_y(y));
        if let Some(cell) = cell {
            bmap.links[cell].insert(0, thing);
        }
        ctx.level.mobj_mut(thing).blockcell = cell;
    }
}

/// Put a new mobj into the level at its x, y and link it. Floor and
/// ceiling heights are taken from the sector it lands in. Returns its id.
pub fn p_add_mobj(ctx: &mut MapContext<'_>, mut mo: Mobj) -> usize {
    mo.touching_sectorlist = None;
    mo.blockcell = None;
    ctx.level.mobjs.push(Some(mo));
    let id = ctx.level.mobjs.len() - 1;

    p_set_thing_position(ctx, id);

    let sector = &ctx.level.sectors[ctx.level.mobj_sector(id)];
    let (floor, ceiling) = (sector.floorheight, sector.ceilingheight);
    let mo = ctx.level.mobj_mut(id);
    mo.floorz = floor;
    mo.ceilingz = ceiling;
    mo.dropoffz = floor;

    if let Some(p) = mo.player {
        if let Some(player) = ctx.level.players.get_mut(p) {
            player.mo = Some(id);
        }
    }
    id
}

/// Unlink a mobj, free its sector nodes and drop it from the level.
pub fn p_remove_mobj(ctx: &mut MapContext<'_>, thing: usize) {
    if !ctx.level.mobj_exists(thing) {
        return;
    }
    p_unset_thing_position(ctx.level, thing);
    if ctx.level.tm.sector_list.is_some() {
        p_del_seclist(ctx.level);
    }

    if let Some(Some(mo)) = ctx.level.mobjs.get_mut(thing).map(|m| m.take()) {
        if let Some(p) = mo.player {
            if let Some(player) = ctx.level.players.get_mut(p) {
                if player.mo == Some(thing) {
                    player.mo = None;
                }
            }
        }
    }
}

// ============================================================
// Block map iterators
// ============================================================

/// Call `func` for every line in block (x, y) not yet visited this
/// validcount. Stops and returns false as soon as `func` does.
pub fn p_block_lines_iterator<F>(ctx: &mut MapContext<'_>, x: i32, y: i32, func: &mut F) -> bool
where
    F: FnMut(&mut MapContext<'_>, usize) -> bool,
{
    let cell = match ctx.level.blockmap.cell_index(x, y) {
        Some(cell) => cell,
        None => return true,
    };

    let count = ctx.level.blockmap.lines[cell].len();
    for i in 0..count {
        let ld = ctx.level.blockmap.lines[cell][i];
        let validcount = ctx.level.validcount;
        let line = &mut ctx.level.lines[ld];
        if line.validcount == validcount {
            continue; // line has already been checked
        }
        line.validcount = validcount;
        if !func(ctx, ld) {
            return false;
        }
    }
    true
}

/// Call `func` for every mobj filed in block (x, y). The cell is read up
/// front; mobjs removed by an earlier callback are skipped.
pub fn p_block_things_iterator<F>(ctx: &mut MapContext<'_>, x: i32, y: i32, func: &mut F) -> bool
where
    F: FnMut(&mut MapContext<'_>, usize) -> bool,
{
    let cell = match ctx.level.blockmap.cell_index(x, y) {
        Some(cell) => cell,
        None => return true,
    };

    let things = ctx.level.blockmap.links[cell].clone();
    for thing in things {
        if !ctx.level.mobj_exists(thing) {
            continue;
        }
        if !func(ctx, thing) {
            return false;
        }
    }
    true
}

// ============================================================
// Intercept routines
// ============================================================

/// Looks for lines in the given block that intercept the given trace to
/// add to the intercepts list.
fn pit_add_line_intercepts(ctx: &mut MapContext<'_>, ld: usize) -> bool {
    let level = &mut *ctx.level;
    let trace = level.trace;
    let line = &level.lines[ld];

    // avoid precision problems with two routines
    let (s1, s2) = if trace.dx > FRACUNIT * 16
        || trace.dy > FRACUNIT * 16
        || trace.dx < -FRACUNIT * 16
        || trace.dy < -FRACUNIT * 16
    {
        (
            p_point_on_divline_side(line.v1.x, line.v1.y, &trace),
            p_point_on_divline_side(line.v2.x, line.v2.y, &trace),
        )
    } else {
        (
            p_point_on_line_side(trace.x, trace.y, line),
            p_point_on_line_side(trace.x + trace.dx, trace.y + trace.dy, line),
        )
    };

    if s1 == s2 {
        return true; // line isn't crossed
    }

    let dl = p_make_divline(line);
    let frac = p_intercept_vector(&trace, &dl);
    if frac < 0 {
        return true; // behind source
    }

    level.intercepts.push(Intercept {
        frac,
        d: InterceptTarget::Line(ld),
    });
    true
}

fn pit_add_thing_intercepts(ctx: &mut MapContext<'_>, thing: usize) -> bool {
    let level = &mut *ctx.level;
    let trace = level.trace;
    let mo = level.mobj(thing);

    // check a corner to corner crossection for hit
    let (x1, y1, x2, y2) = if (trace.dx ^ trace.dy) > 0 {
        (mo.x - mo.radius, mo.y + mo.radius, mo.x + mo.radius, mo.y - mo.radius)
    } else {
        (mo.x - mo.radius, mo.y - mo.radius, mo.x + mo.radius, mo.y + mo.radius)
    };

    let s1 = p_point_on_divline_side(x1, y1, &trace);
    let s2 = p_point_on_divline_side(x2, y2, &trace);
    if s1 == s2 {
        return true; // line isn't crossed
    }

    let dl = Divline {
        x: x1,
        y: y1,
        dx: x2 - x1,
        dy: y2 - y1,
    };
    let frac = p_intercept_vector(&trace, &dl);
    if frac < 0 {
        return true; // behind source
    }

    level.intercepts.push(Intercept {
        frac,
        d: InterceptTarget::Thing(thing),
    });
    true
}

/// Returns true if the traverser function returns true for all lines
/// with a fraction up to `maxfrac`, visiting them nearest first.
pub fn p_traverse_intercepts<F>(ctx: &mut MapContext<'_>, func: &mut F, maxfrac: Fixed) -> bool
where
    F: FnMut(&mut MapContext<'_>, &Intercept) -> bool,
{
    // Taken out so a traverser may start a trace of its own.
    let mut intercepts = std::mem::take(&mut ctx.level.intercepts);
    let result = traverse_sorted(ctx, &mut intercepts, func, maxfrac);
    ctx.level.intercepts = intercepts;
    result
}

fn traverse_sorted<F>(
    ctx: &mut MapContext<'_>,
    intercepts: &mut [Intercept],
    func: &mut F,
    maxfrac: Fixed,
) -> bool
where
    F: FnMut(&mut MapContext<'_>, &Intercept) -> bool,
{
    for _ in 0..intercepts.len() {
        let mut dist = i32::MAX;
        let mut nearest = None;
        for (i, scan) in intercepts.iter().enumerate() {
            if scan.frac < dist {
                dist = scan.frac;
                nearest = Some(i);
            }
        }

        if dist > maxfrac {
            return true; // checked everything in range
        }
        let i = match nearest {
            Some(i) => i,
            None => return true,
        };

        let inter = intercepts[i];
        if !func(ctx, &inter) {
            return false; // don't bother going farther
        }
        intercepts[i].frac = i32::MAX;
    }
    true
}

/// Traces a line from x1,y1 to x2,y2, calling the traverser function for
/// each crossed line or mobj, nearest first. Returns true if the traverser
/// function returns true for all of them.
pub fn p_path_traverse<F>(
    ctx: &mut MapContext<'_>,
    mut x1: Fixed,
    mut y1: Fixed,
    mut x2: Fixed,
    mut y2: Fixed,
    flags: PathFlags,
    trav: &mut F,
) -> bool
where
    F: FnMut(&mut MapContext<'_>, &Intercept) -> bool,
{
    ctx.level.validcount += 1;
    ctx.level.intercepts.clear();
    ctx.level.intercepts.reserve(MAXINTERCEPTS);

    let orgx = ctx.level.blockmap.orgx;
    let orgy = ctx.level.blockmap.orgy;

    if (x1 - orgx) & (MAPBLOCKSIZE - 1) == 0 {
        x1 += FRACUNIT; // don't side exactly on a line
    }
    if (y1 - orgy) & (MAPBLOCKSIZE - 1) == 0 {
        y1 += FRACUNIT; // don't side exactly on a line
    }

    ctx.level.trace = Divline {
        x: x1,
        y: y1,
        dx: x2.wrapping_sub(x1),
        dy: y2.wrapping_sub(y1),
    };

    x1 -= orgx;
    y1 -= orgy;
    let xt1 = x1 >> MAPBLOCKSHIFT;
    let yt1 = y1 >> MAPBLOCKSHIFT;

    x2 = x2.wrapping_sub(orgx);
    y2 = y2.wrapping_sub(orgy);
    let xt2 = x2 >> MAPBLOCKSHIFT;
    let yt2 = y2 >> MAPBLOCKSHIFT;

    let (mapxstep, partial, ystep) = if xt2 > xt1 {
        (
            1,
            FRACUNIT - ((x1 >> MAPBTOFRAC) & (FRACUNIT - 1)),
            fixed_div(y2 - y1, d_abs(x2 - x1)),
        )
    } else if xt2 < xt1 {
        (
            -1,
            (x1 >> MAPBTOFRAC) & (FRACUNIT - 1),
            fixed_div(y2 - y1, d_abs(x2 - x1)),
        )
    } else {
        (0, FRACUNIT, 256 * FRACUNIT)
    };

    let mut yintercept = (y1 >> MAPBTOFRAC).wrapping_add(fixed_mul(partial, ystep));

    let (mapystep, partial, xstep) = if yt2 > yt1 {
        (
            1,
            FRACUNIT - ((y1 >> MAPBTOFRAC) & (FRACUNIT - 1)),
            fixed_div(x2 - x1, d_abs(y2 - y1)),
        )
    } else if yt2 < yt1 {
        (
            -1,
            (y1 >> MAPBTOFRAC) & (FRACUNIT - 1),
            fixed_div(x2 - x1, d_abs(y2 - y1)),
        )
    } else {
        (0, FRACUNIT, 256 * FRACUNIT)
    };

    let mut xintercept = (x1 >> MAPBTOFRAC).wrapping_add(fixed_mul(partial, xstep));

    // Step through map blocks. The count guards against a round off error
    // skipping the break.
    let mut mapx = xt1;
    let mut mapy = yt1;

    for _ in 0..64 {
        if flags.contains(PathFlags::ADDLINES)
            && !p_block_lines_iterator(ctx, mapx, mapy, &mut pit_add_line_intercepts)
        {
            return false; // early out
        }
        if flags.contains(PathFlags::ADDTHINGS)
            && !p_block_things_iterator(ctx, mapx, mapy, &mut pit_add_thing_intercepts)
        {
            return false; // early out
        }

        if mapx == xt2 && mapy == yt2 {
            break;
        }

        if (yintercept >> FRACBITS) == mapy {
            yintercept = yintercept.wrapping_add(ystep);
            mapx += mapxstep;
        } else if (xintercept >> FRACBITS) == mapx {
            xintercept = xintercept.wrapping_add(xstep);
            mapy += mapystep;
        }
    }

    // go through the sorted list
    p_traverse_intercepts(ctx, trav, FRACUNIT)
}
