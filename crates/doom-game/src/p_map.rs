// p_map.rs — movement, collision handling, shooting and aiming
//
// Every query here runs against `Level::tm` / `Level::shot`, which hold the
// state of the one query in flight. Callers bracket a tic's worth of
// queries with `p_map_start` / `p_map_end` (or a `MapSession`).

use std::ops::{Deref, DerefMut};

use doom_common::common::{com_dprintf, com_error};
use doom_common::doomdef::ERR_FATAL;
use doom_common::m_bbox::{m_box_around, m_boxes_overlap, BOXBOTTOM, BOXLEFT, BOXRIGHT, BOXTOP};
use doom_common::m_fixed::{
    d_abs, fixed_approx_div, fixed_mul, fixed_reciprocal, Fixed, FRACBITS, FRACUNIT,
};
use doom_common::tables::{angle_to_fine, finecosine, finesine, Angle};

use crate::map_import::{MapContext, MapImport, Sfx};
use crate::p_local::{
    mobjinfo, Intercept, InterceptTarget, Level, LineFlags, MobjFlags, MobjType, MAXRADIUS,
    MAXSTEPHEIGHT, MELEERANGE, USERANGE,
};
use crate::p_maputl::{
    p_block_lines_iterator, p_block_things_iterator, p_box_on_line_side, p_line_opening,
    p_path_traverse, p_point_on_line_side, p_set_thing_position, p_unset_thing_position,
    PathFlags,
};
use crate::p_spec::p_cross_special_line;

// ============================================================
// Map sessions
// ============================================================

/// Start of a tic's worth of map queries. A query left open from before
/// is a fatal logic error.
pub fn p_map_start(level: &mut Level) {
    if level.tm.thing.is_some() {
        com_dprintf("P_MapStart: previous query still open\n");
        com_error(ERR_FATAL, "P_MapStart: tmthing set!");
    }
}

pub fn p_map_end(level: &mut Level) {
    level.tm.thing = None;
}

/// Opens a map session on creation and closes it when dropped. Derefs to
/// the `MapContext` the queries run against.
pub struct MapSession<'a> {
    ctx: MapContext<'a>,
}

impl<'a> MapSession<'a> {
    pub fn begin(level: &'a mut Level, gi: &'a mut dyn MapImport) -> Self {
        p_map_start(level);
        Self {
            ctx: MapContext::new(level, gi),
        }
    }
}

impl<'a> Deref for MapSession<'a> {
    type Target = MapContext<'a>;

    fn deref(&self) -> &MapContext<'a> {
        &self.ctx
    }
}

impl<'a> DerefMut for MapSession<'a> {
    fn deref_mut(&mut self) -> &mut MapContext<'a> {
        &mut self.ctx
    }
}

impl Drop for MapSession<'_> {
    fn drop(&mut self) {
        p_map_end(self.ctx.level);
    }
}

pub fn p_is_attack_range_melee_range(level: &Level) -> bool {
    level.shot.attackrange == MELEERANGE
}

// ============================================================
// Movement iterator functions
// ============================================================

/// Whether the moving thing, at its current position, is clear of `ld`.
/// Used to let players out of lines they are already stuck in.
fn untouched(level: &Level, thing: usize, ld: usize) -> bool {
    let mo = level.mobj(thing);
    let line = &level.lines[ld];
    let bbox = m_box_around(mo.x, mo.y, mo.radius);

    bbox[BOXRIGHT] <= line.bbox[BOXLEFT]
        || bbox[BOXLEFT] >= line.bbox[BOXRIGHT]
        || bbox[BOXTOP] <= line.bbox[BOXBOTTOM]
        || bbox[BOXBOTTOM] >= line.bbox[BOXTOP]
        || p_box_on_line_side(&bbox, line) != -1
}

/// Adjusts tm.floorz and tm.ceilingz as lines are contacted.
fn pit_check_line(ctx: &mut MapContext<'_>, ld: usize) -> bool {
    let level = &mut *ctx.level;
    let tmthing = match level.tm.thing {
        Some(thing) => thing,
        None => return true,
    };
    let line = &level.lines[ld];

    if !m_boxes_overlap(&level.tm.bbox, &line.bbox) {
        return true; // didn't hit it
    }
    if p_box_on_line_side(&level.tm.bbox, line) != -1 {
        return true; // didn't hit it
    }

    // A line has been hit. Specials are not sorted by order, so two
    // special lines only a few units apart may be crossed in either order.

    let (dx, dy, flags, special) = (line.dx, line.dy, line.flags, line.special);
    let mo = level.mobj(tmthing);
    let (mo_x, mo_y, mo_flags) = (mo.x, mo.y, mo.flags);

    if line.backsector.is_none() {
        // one sided line; a player may back out of it
        level.tm.blockline = Some(ld);
        return level.tm.unstuck
            && !untouched(level, tmthing, ld)
            && fixed_mul(level.tm.x - mo_x, dy) > fixed_mul(level.tm.y - mo_y, dx);
    }

    if !mo_flags.contains(MobjFlags::MISSILE) {
        if flags.contains(LineFlags::BLOCKING) {
            // explicitly blocking everything
            return level.tm.unstuck && !untouched(level, tmthing, ld);
        }

        // monster-blockers don't affect friends
        if !(mo_flags.contains(MobjFlags::FRIEND) || level.mobj_is_player(tmthing).is_some())
            && flags.contains(LineFlags::BLOCKMONSTERS)
        {
            return false; // block monsters only
        }
    }

    // the window from one sector to another across this line
    p_line_opening(level, ld);
    let op = level.opening;
    let tm = &mut level.tm;

    if op.opentop < tm.ceilingz {
        tm.ceilingz = op.opentop;
        tm.ceilingline = Some(ld);
        tm.blockline = Some(ld);
    }
    if op.openbottom > tm.floorz {
        tm.floorz = op.openbottom;
        tm.blockline = Some(ld);
    }
    if op.lowfloor < tm.dropoffz {
        tm.dropoffz = op.lowfloor;
    }

    if special != 0 && !tm.spechit.push(ld) {
        com_dprintf(&format!("PIT_CheckLine: spechit overflow, line {} dropped\n", ld));
    }

    true
}

fn pit_check_thing(ctx: &mut MapContext<'_>, thing: usize) -> bool {
    let tmthing = match ctx.level.tm.thing {
        Some(tmthing) => tmthing,
        None => return true,
    };
    let th = ctx.level.mobj(thing).clone();

    if !th
        .flags
        .intersects(MobjFlags::SOLID | MobjFlags::SPECIAL | MobjFlags::SHOOTABLE)
    {
        return true;
    }

    let tmo = ctx.level.mobj(tmthing).clone();
    let blockdist = th.radius + tmo.radius;
    if d_abs(th.x - ctx.level.tm.x) >= blockdist || d_abs(th.y - ctx.level.tm.y) >= blockdist {
        return true; // didn't hit it
    }

    // don't clip against self
    if thing == tmthing {
        return true;
    }

    // missiles can hit other things; bouncers can bump them
    if tmo.flags.intersects(MobjFlags::MISSILE | MobjFlags::BOUNCES) {
        // see if it went over / under
        if tmo.z > th.z + th.height {
            return true; // overhead
        }
        if tmo.z + tmo.height < th.z {
            return true; // underneath
        }

        if let Some(target) = tmo.target {
            if ctx.level.mobj_exists(target) && ctx.level.mobj(target).kind == th.kind {
                if thing == target {
                    return true; // don't hit same species as originator
                } else if th.kind != MobjType::Player {
                    return false; // explode, but do no damage
                }
            }
        }

        // not a missile: no damage, and momentum is reduced if the object
        // hit is solid
        if !tmo.flags.contains(MobjFlags::MISSILE) {
            if !th.flags.contains(MobjFlags::SOLID) {
                return true;
            }
            let mo = ctx.level.mobj_mut(tmthing);
            mo.momx = -mo.momx;
            mo.momy = -mo.momy;
            if !mo.flags.contains(MobjFlags::NOGRAVITY) {
                mo.momx >>= 2;
                mo.momy >>= 2;
            }
            return false;
        }

        if !th.flags.contains(MobjFlags::SHOOTABLE) {
            return !th.flags.contains(MobjFlags::SOLID); // didn't do any damage
        }

        // damage / explode
        let damage = ((ctx.gi.p_random() % 8) + 1) * mobjinfo(tmo.kind).damage;
        ctx.gi
            .damage_mobj(ctx.level, thing, Some(tmthing), tmo.target, damage);

        // don't traverse any more
        return false;
    }

    // check for special pickup
    if th.flags.contains(MobjFlags::SPECIAL) {
        let solid = th.flags.contains(MobjFlags::SOLID);
        if tmo.flags.contains(MobjFlags::PICKUP) {
            ctx.gi.touch_special_thing(ctx.level, thing, tmthing); // can remove thing
        }
        return !solid;
    }

    !th.flags.contains(MobjFlags::SOLID)
}

// ============================================================
// Movement clipping
// ============================================================

/// Whether `thing` could stand at (x, y). Nothing is modified except
/// things picked up along the way, which happens even when the position
/// turns out to be blocked.
///
/// On return `tm` holds the floor, ceiling and dropoff heights contacted,
/// the special lines touched, and the lines that restricted the move.
pub fn p_check_position(ctx: &mut MapContext<'_>, thing: usize, x: Fixed, y: Fixed) -> bool {
    let (radius, player) = {
        let mo = ctx.level.mobj(thing);
        (mo.radius, mo.player)
    };
    let bbox = m_box_around(x, y, radius);

    {
        let tm = &mut ctx.level.tm;
        tm.thing = Some(thing);
        tm.x = x;
        tm.y = y;
        tm.bbox = bbox;
        tm.blockline = None;
        tm.ceilingline = None;
    }

    let newsubsec = ctx.gi.point_in_subsector(ctx.level, x, y);

    // Whether the object can get out of a sticky situation: only players
    // that are the live body of their player.
    let unstuck = match player {
        Some(p) => ctx.level.players.get(p).map_or(false, |pl| pl.mo == Some(thing)),
        None => false,
    };

    // The base floor / ceiling is from the subsector that contains the
    // point. Any contacted lines the step closer together will adjust them.
    let sector = &ctx.level.sectors[ctx.level.subsectors[newsubsec].sector];
    let (floor, ceiling) = (sector.floorheight, sector.ceilingheight);
    {
        let tm = &mut ctx.level.tm;
        tm.unstuck = unstuck;
        tm.floorz = floor;
        tm.dropoffz = floor;
        tm.ceilingz = ceiling;
        tm.spechit.clear();
    }
    ctx.level.validcount += 1;

    // Check things first, possibly picking things up. Mobjs are filed by
    // origin and can overlap into adjacent blocks by up to MAXRADIUS.
    let bmap = &ctx.level.blockmap;
    let xl = bmap.block_x(bbox[BOXLEFT] - MAXRADIUS);
    let xh = bmap.block_x(bbox[BOXRIGHT] + MAXRADIUS);
    let yl = bmap.block_y(bbox[BOXBOTTOM] - MAXRADIUS);
    let yh = bmap.block_y(bbox[BOXTOP] + MAXRADIUS);

    for bx in xl..=xh {
        for by in yl..=yh {
            if !p_block_things_iterator(ctx, bx, by, &mut pit_check_thing) {
                return false;
            }
        }
    }

    // check lines
    let bmap = &ctx.level.blockmap;
    let xl = bmap.block_x(bbox[BOXLEFT]);
    let xh = bmap.block_x(bbox[BOXRIGHT]);
    let yl = bmap.block_y(bbox[BOXBOTTOM]);
    let yh = bmap.block_y(bbox[BOXTOP]);

    for bx in xl..=xh {
        for by in yl..=yh {
            if !p_block_lines_iterator(ctx, bx, by, &mut pit_check_line) {
                return false; // doesn't fit
            }
        }
    }

    true
}

/// Attempt to move to a new position, crossing special lines unless
/// TELEPORT is set. On failure the mobj is left where it was.
pub fn p_try_move(ctx: &mut MapContext<'_>, thing: usize, x: Fixed, y: Fixed) -> bool {
    if !p_check_position(ctx, thing, x, y) {
        return false; // solid wall or thing
    }

    let tm = &ctx.level.tm;
    let (floorz, ceilingz, dropoffz) = (tm.floorz, tm.ceilingz, tm.dropoffz);
    let mo = ctx.level.mobj(thing);
    let teleport = mo.flags.contains(MobjFlags::TELEPORT);

    if ceilingz - floorz < mo.height {
        return false; // doesn't fit
    }
    if !teleport && ceilingz - mo.z < mo.height {
        return false; // mobj must lower itself to fit
    }
    if !teleport && floorz - mo.z > MAXSTEPHEIGHT {
        return false; // too big a step up
    }
    if !mo.flags.contains(MobjFlags::DROPOFF) && floorz - dropoffz > MAXSTEPHEIGHT {
        return false; // don't stand over a dropoff
    }

    // the move is ok, so unlink from the old position and link into the new
    p_unset_thing_position(ctx.level, thing);

    let mo = ctx.level.mobj_mut(thing);
    let (oldx, oldy) = (mo.x, mo.y);
    mo.floorz = floorz;
    mo.ceilingz = ceilingz;
    mo.dropoffz = dropoffz;
    mo.x = x;
    mo.y = y;

    p_set_thing_position(ctx, thing);

    // if any special lines were hit, do the effect
    if !teleport {
        while let Some(ld) = ctx.level.tm.spechit.pop() {
            let line = &ctx.level.lines[ld];
            if line.special == 0 {
                continue;
            }
            // see if the line was crossed
            if p_point_on_line_side(oldx, oldy, line) != p_point_on_line_side(x, y, line) {
                p_cross_special_line(ctx, ld, thing);
            }
        }
    }

    true
}

// ============================================================
// Aiming and shooting
// ============================================================

/// Slope from the shooter's eye to height `dz` above it at `dist` along
/// the ray. A zero distance gives the saturated slope.
fn slope_to(dz: Fixed, dist: Fixed) -> Fixed {
    if dist != 0 {
        fixed_approx_div(dz, dist)
    } else {
        i32::MAX
    }
}

fn fixed_mul3(a: Fixed, b: Fixed, c: Fixed) -> Fixed {
    if a == 0 {
        return 0;
    }
    fixed_mul(fixed_mul(c, b), a)
}

/// Whether `th` is friendly-exempt from the current shooter: it shares a
/// masked flag with the shooter and is not a player.
fn shot_skips_friend(level: &Level, th: usize) -> bool {
    let mask = level.shot.aim_flags_mask;
    if mask.is_empty() {
        return false;
    }
    let shooter = match level.shot.shootthing {
        Some(s) if level.mobj_exists(s) => level.mobj(s).flags,
        _ => return false,
    };
    level.mobj(th).flags.intersects(shooter & mask) && level.mobj_is_player(th).is_none()
}

/// Sets linetarget and aimslope when a target is aimed at.
fn ptr_aim_traverse(ctx: &mut MapContext<'_>, inter: &Intercept) -> bool {
    let level = &mut *ctx.level;

    let th = match inter.d {
        InterceptTarget::Line(li) => {
            let line = &level.lines[li];
            if !line.flags.contains(LineFlags::TWOSIDED) {
                return false; // stop
            }
            let back = match line.backsector {
                Some(back) => back,
                None => return false,
            };
            let front = &level.sectors[line.frontsector];
            let back = &level.sectors[back];
            let floors_differ = front.floorheight != back.floorheight;
            let ceilings_differ = front.ceilingheight != back.ceilingheight;

            // A two sided line will restrict the possible target ranges.
            p_line_opening(level, li);
            let op = level.opening;
            if op.openbottom >= op.opentop {
                return false; // stop
            }

            let shot = &mut level.shot;
            let dist = fixed_mul(shot.attackrange, inter.frac);

            if floors_differ {
                let slope = slope_to(op.openbottom - shot.shootz, dist);
                if slope > shot.bottomslope {
                    shot.bottomslope = slope;
                }
            }
            if ceilings_differ {
                let slope = slope_to(op.opentop - shot.shootz, dist);
                if slope < shot.topslope {
                    shot.topslope = slope;
                }
            }

            if shot.topslope <= shot.bottomslope {
                return false; // stop
            }
            return true; // shot continues
        }
        InterceptTarget::Thing(th) => th,
    };

    // shoot a thing
    if level.shot.shootthing == Some(th) {
        return true; // can't shoot self
    }
    let mo = level.mobj(th);
    if !mo.flags.contains(MobjFlags::SHOOTABLE) {
        return true; // corpse or something
    }
    let (z, height) = (mo.z, mo.height);
    // friends don't aim at friends (except players), at least not first
    if shot_skips_friend(level, th) {
        return true;
    }

    // check angles to see if the thing can be aimed at
    let shot = &mut level.shot;
    let dist = fixed_mul(shot.attackrange, inter.frac);
    let mut thingtopslope = slope_to(z + height - shot.shootz, dist);
    if thingtopslope < shot.bottomslope {
        return true; // shot over the thing
    }
    let mut thingbottomslope = slope_to(z - shot.shootz, dist);
    if thingbottomslope > shot.topslope {
        return true; // shot under the thing
    }

    // this thing can be hit!
    if thingtopslope > shot.topslope {
        thingtopslope = shot.topslope;
    }
    if thingbottomslope < shot.bottomslope {
        thingbottomslope = shot.bottomslope;
    }

    shot.aimslope = (thingtopslope + thingbottomslope) / 2;
    level.linetarget = Some(th);

    false // don't go any farther
}

fn ptr_shoot_traverse(ctx: &mut MapContext<'_>, inter: &Intercept) -> bool {
    let shot = ctx.level.shot;
    let trace = ctx.level.trace;

    let th = match inter.d {
        InterceptTarget::Line(li) => {
            let line = &ctx.level.lines[li];
            let front = ctx.level.sectors[line.frontsector].clone();
            let back = line.backsector.map(|b| ctx.level.sectors[b].clone());

            if line.flags.contains(LineFlags::TWOSIDED) {
                if let Some(back) = &back {
                    // crosses a two sided line
                    p_line_opening(ctx.level, li);
                    let op = ctx.level.opening;
                    let t = fixed_mul3(shot.aimslope, inter.frac, shot.attackrange) + shot.shootz;

                    if (front.floorheight == back.floorheight || op.openbottom <= t)
                        && (front.ceilingheight == back.ceilingheight || op.opentop >= t)
                    {
                        return true; // shot continues
                    }
                }
            }

            // hit line; position a bit closer
            let frac = inter.frac - 4 * fixed_reciprocal(shot.attackrange);
            let x = trace.x + fixed_mul(trace.dx, frac);
            let y = trace.y + fixed_mul(trace.dy, frac);
            let z = shot.shootz + fixed_mul3(shot.aimslope, frac, shot.attackrange);

            let sky = ctx.level.skyflatnum;
            if front.ceilingpic == sky {
                // don't shoot the sky!
                if z > front.ceilingheight {
                    return false;
                }
                // it's a sky hack wall
                if let Some(back) = &back {
                    if back.ceilingpic == sky && back.ceilingheight < z {
                        return false;
                    }
                }
            }

            ctx.gi.spawn_puff(ctx.level, x, y, z);

            // don't go any farther
            return false;
        }
        InterceptTarget::Thing(th) => th,
    };

    // shoot a thing
    if shot.shootthing == Some(th) {
        return true; // can't shoot self
    }
    let mo = ctx.level.mobj(th);
    if !mo.flags.contains(MobjFlags::SHOOTABLE) {
        return true; // corpse or something
    }
    if shot_skips_friend(ctx.level, th) {
        return true;
    }

    // check angles to see if the thing can be aimed at
    let dist = fixed_mul(shot.attackrange, inter.frac);
    let thingtopslope = fixed_approx_div(mo.z + mo.height - shot.shootz, dist);
    if thingtopslope < shot.aimslope {
        return true; // shot over the thing
    }
    let thingbottomslope = fixed_approx_div(mo.z - shot.shootz, dist);
    if thingbottomslope > shot.aimslope {
        return true; // shot under the thing
    }
    let noblood = mo.flags.contains(MobjFlags::NOBLOOD);

    // hit thing; position a bit closer
    let frac = inter.frac - 10 * fixed_reciprocal(shot.attackrange);
    let x = trace.x + fixed_mul(trace.dx, frac);
    let y = trace.y + fixed_mul(trace.dy, frac);
    let z = shot.shootz + fixed_mul3(shot.aimslope, frac, shot.attackrange);

    // puffs or blood spots, depending on target type
    if noblood {
        ctx.gi.spawn_puff(ctx.level, x, y, z);
    } else {
        ctx.gi.spawn_blood(ctx.level, x, y, z, shot.la_damage);
    }

    ctx.level.linetarget = Some(th);
    if shot.la_damage != 0 {
        ctx.gi
            .damage_mobj(ctx.level, th, shot.shootthing, shot.shootthing, shot.la_damage);
    }

    // don't go any farther
    false
}

/// End point `distance` away from (x, y) along `angle`.
fn trace_end(x: Fixed, y: Fixed, angle: Angle, distance: Fixed) -> (Fixed, Fixed) {
    let fine = angle_to_fine(angle);
    (
        x.wrapping_add((distance >> FRACBITS).wrapping_mul(finecosine(fine))),
        y.wrapping_add((distance >> FRACBITS).wrapping_mul(finesine(fine))),
    )
}

/// Find the first shootable target along `angle` within the vertical
/// view window. Returns the slope to aim at it, or 0 with `linetarget`
/// cleared when nothing can be hit. With `friend`, mobjs sharing the
/// shooter's FRIEND flag are passed over unless they are players.
pub fn p_aim_line_attack(
    ctx: &mut MapContext<'_>,
    t1: usize,
    angle: Angle,
    distance: Fixed,
    friend: bool,
) -> Fixed {
    let mo = ctx.level.mobj(t1);
    let (x1, y1) = (mo.x, mo.y);
    let (x2, y2) = trace_end(x1, y1, angle, distance);
    let shootz = mo.z + (mo.height >> 1) + 8 * FRACUNIT;

    let shot = &mut ctx.level.shot;
    shot.shootthing = Some(t1);
    shot.shootz = shootz;

    // can't shoot outside view angles
    shot.topslope = 100 * FRACUNIT / 160;
    shot.bottomslope = -100 * FRACUNIT / 160;

    shot.attackrange = distance;
    shot.aim_flags_mask = if friend {
        MobjFlags::FRIEND
    } else {
        MobjFlags::empty()
    };
    ctx.level.linetarget = None;

    p_path_traverse(
        ctx,
        x1,
        y1,
        x2,
        y2,
        PathFlags::ADDLINES | PathFlags::ADDTHINGS,
        &mut ptr_aim_traverse,
    );

    if ctx.level.linetarget.is_some() {
        ctx.level.shot.aimslope
    } else {
        0
    }
}

/// Fire a hitscan along `angle` at a fixed `slope`. The first wall or
/// mobj in the way gets a puff or blood; mobjs take `damage` when it is
/// nonzero. A damage of 0 is just a test trace.
pub fn p_line_attack(
    ctx: &mut MapContext<'_>,
    t1: usize,
    angle: Angle,
    distance: Fixed,
    slope: Fixed,
    damage: i32,
) {
    let mo = ctx.level.mobj(t1);
    let (x1, y1) = (mo.x, mo.y);
    let (x2, y2) = trace_end(x1, y1, angle, distance);
    let shootz = mo.z + (mo.height >> 1) + 8 * FRACUNIT;

    let shot = &mut ctx.level.shot;
    shot.shootthing = Some(t1);
    shot.la_damage = damage;
    shot.shootz = shootz;
    shot.attackrange = distance;
    shot.aimslope = slope;
    ctx.level.linetarget = None;

    p_path_traverse(
        ctx,
        x1,
        y1,
        x2,
        y2,
        PathFlags::ADDLINES | PathFlags::ADDTHINGS,
        &mut ptr_shoot_traverse,
    );
}

// ============================================================
// Use lines
// ============================================================

fn ptr_use_traverse(ctx: &mut MapContext<'_>, inter: &Intercept, usething: usize) -> bool {
    let li = match inter.d {
        InterceptTarget::Line(li) => li,
        InterceptTarget::Thing(_) => return true,
    };

    if ctx.level.lines[li].special == 0 {
        p_line_opening(ctx.level, li);
        if ctx.level.opening.openrange <= 0 {
            return false; // can't use through a wall
        }
        return true; // not a special line, but keep checking
    }

    let mo = ctx.level.mobj(usething);
    if p_point_on_line_side(mo.x, mo.y, &ctx.level.lines[li]) != 1 {
        ctx.gi.use_special_line(ctx.level, usething, li);
    }

    // can't use more than one special line in a row
    false
}

/// Returns false if a "oof" sound should be made because of a blocking
/// line: impassable two-sided middles and uppers or lowers the user could
/// not pass. Specials are ignored; the use trace already had its chance
/// at them.
fn ptr_no_way_traverse(ctx: &mut MapContext<'_>, inter: &Intercept, usething: usize) -> bool {
    let li = match inter.d {
        InterceptTarget::Line(li) => li,
        InterceptTarget::Thing(_) => return true,
    };
    let line = &ctx.level.lines[li];

    if line.special != 0 {
        return true; // ignore specials
    }
    if line.flags.contains(LineFlags::BLOCKING) {
        return false; // always blocking
    }

    p_line_opening(ctx.level, li);
    let op = ctx.level.opening;
    let mo = ctx.level.mobj(usething);

    !(op.openrange <= 0 // no opening
        || op.openbottom > mo.z + MAXSTEPHEIGHT // too high it blocks
        || op.opentop < mo.z + mo.height) // too low it blocks
}

/// Looks for special lines in front of `usething` to activate.
pub fn p_use_lines(ctx: &mut MapContext<'_>, usething: usize) {
    let mo = ctx.level.mobj(usething);
    let (x1, y1) = (mo.x, mo.y);
    let (x2, y2) = trace_end(x1, y1, mo.angle, USERANGE);

    let nothing_used = p_path_traverse(
        ctx,
        x1,
        y1,
        x2,
        y2,
        PathFlags::ADDLINES,
        &mut |ctx: &mut MapContext<'_>, inter: &Intercept| ptr_use_traverse(ctx, inter, usething),
    );
    if !nothing_used {
        return;
    }

    let clear = p_path_traverse(
        ctx,
        x1,
        y1,
        x2,
        y2,
        PathFlags::ADDLINES,
        &mut |ctx: &mut MapContext<'_>, inter: &Intercept| {
            ptr_no_way_traverse(ctx, inter, usething)
        },
    );
    if !clear {
        ctx.gi.start_sound(ctx.level, Some(usething), Sfx::Noway);
    }
}

// ============================================================
// Radius attack
// ============================================================

/// `source` is the creature that caused the explosion at `spot`, centred
/// on (spotx, spoty).
fn pit_radius_attack(
    ctx: &mut MapContext<'_>,
    thing: usize,
    (spot, spotx, spoty): (usize, Fixed, Fixed),
    source: Option<usize>,
    damage: i32,
) -> bool {
    let mo = ctx.level.mobj(thing);
    if !mo.flags.contains(MobjFlags::SHOOTABLE) {
        return true;
    }

    let dx = d_abs(mo.x - spotx);
    let dy = d_abs(mo.y - spoty);
    let dist = ((dx.max(dy) - mo.radius) >> FRACBITS).max(0);

    if dist >= damage {
        return true; // out of range
    }

    // must be in direct path
    if ctx.gi.check_sight(ctx.level, thing, spot) {
        ctx.gi
            .damage_mobj(ctx.level, thing, Some(spot), source, damage - dist);
    }
    true
}

/// Damage every shootable mobj within `damage` units of `spot`, less the
/// distance, that `spot` can see. `source` is credited with the damage.
pub fn p_radius_attack(ctx: &mut MapContext<'_>, spot: usize, source: Option<usize>, damage: i32) {
    let mo = ctx.level.mobj(spot);
    let (spotx, spoty) = (mo.x, mo.y);
    let dist = ((damage.max(0) as i64) << FRACBITS) + MAXRADIUS as i64;
    let (xl, xh, yl, yh) = ctx.level.blockmap.cells_around(spotx, spoty, dist);

    for y in yl..=yh {
        for x in xl..=xh {
            p_block_things_iterator(ctx, x, y, &mut |ctx: &mut MapContext<'_>, thing: usize| {
                pit_radius_attack(ctx, thing, (spot, spotx, spoty), source, damage)
            });
        }
    }
}
