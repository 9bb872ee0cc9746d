// p_secnode.rs — sector-occupancy nodes ("touching" lists)
//
// A mobj whose radius overlaps several sectors gets one node per sector.
// Each node is threaded twice: through the mobj's list of sectors
// (tprev/tnext, head in `Mobj::touching_sectorlist`) and through the
// sector's list of mobjs (sprev/snext, head in `Sector::touching_thinglist`).
// Nodes come from the level's block pool and are recycled, never freed
// individually.

use doom_common::m_bbox::{m_box_around, m_boxes_overlap, BOXBOTTOM, BOXLEFT, BOXRIGHT, BOXTOP};

use crate::map_import::MapContext;
use crate::p_local::Level;
use crate::p_maputl::{p_block_lines_iterator, p_box_on_line_side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SecnodeId(pub u32);

#[derive(Clone, Copy, Debug)]
pub struct MSecnode {
    pub m_sector: usize,
    /// Owning mobj; cleared while a list is being rebuilt to mark the
    /// node as unclaimed.
    pub m_thing: Option<usize>,
    pub m_tprev: Option<SecnodeId>,
    pub m_tnext: Option<SecnodeId>,
    pub m_sprev: Option<SecnodeId>,
    pub m_snext: Option<SecnodeId>,
    pub visited: bool,
}

fn p_get_secnode(level: &mut Level, node: MSecnode) -> SecnodeId {
    SecnodeId(level.secnodes.acquire(node))
}

fn p_put_secnode(level: &mut Level, id: SecnodeId) {
    level.secnodes.release(id.0);
}

/// Claim `sector` for `thing` in the list being rebuilt. An existing node
/// for the sector is reused; otherwise a new one goes at the head of both
/// threads.
pub fn p_add_secnode(level: &mut Level, sector: usize, thing: usize) {
    let mut node = level.tm.sector_list;
    while let Some(id) = node {
        let n = &mut level.secnodes[id.0];
        if n.m_sector == sector {
            n.m_thing = Some(thing);
            return;
        }
        node = n.m_tnext;
    }

    let thead = level.tm.sector_list;
    let shead = level.sectors[sector].touching_thinglist;
    let id = p_get_secnode(
        level,
        MSecnode {
            m_sector: sector,
            m_thing: Some(thing),
            m_tprev: None,
            m_tnext: thead,
            m_sprev: None,
            m_snext: shead,
            visited: false,
        },
    );

    if let Some(next) = thead {
        level.secnodes[next.0].m_tprev = Some(id);
    }
    if let Some(next) = shead {
        level.secnodes[next.0].m_sprev = Some(id);
    }
    level.sectors[sector].touching_thinglist = Some(id);
    level.tm.sector_list = Some(id);
}

/// Unlink a node from both threads and return it to the pool. Returns the
/// next node in the thing thread.
///
/// Fixing up the head of the thing thread is the caller's job; the sector
/// thread head is fixed up here.
pub fn p_del_secnode(level: &mut Level, node: Option<SecnodeId>) -> Option<SecnodeId> {
    let id = node?;
    let n = level.secnodes[id.0];

    if let Some(prev) = n.m_tprev {
        level.secnodes[prev.0].m_tnext = n.m_tnext;
    }
    if let Some(next) = n.m_tnext {
        level.secnodes[next.0].m_tprev = n.m_tprev;
    }

    match n.m_sprev {
        Some(prev) => level.secnodes[prev.0].m_snext = n.m_snext,
        None => level.sectors[n.m_sector].touching_thinglist = n.m_snext,
    }
    if let Some(next) = n.m_snext {
        level.secnodes[next.0].m_sprev = n.m_sprev;
    }

    p_put_secnode(level, id);
    n.m_tnext
}

/// Delete every node of the list held in `tm.sector_list`.
pub fn p_del_seclist(level: &mut Level) {
    let mut node = level.tm.sector_list;
    while node.is_some() {
        node = p_del_secnode(level, node);
    }
    level.tm.sector_list = None;
}

/// Lines iterator callback: claim both sectors of every line the query box
/// straddles, front first.
fn pit_get_sectors(ctx: &mut MapContext<'_>, ld: usize) -> bool {
    let level = &mut *ctx.level;
    let line = &level.lines[ld];

    if !m_boxes_overlap(&level.tm.bbox, &line.bbox) {
        return true;
    }
    if p_box_on_line_side(&level.tm.bbox, line) != -1 {
        return true;
    }

    let Some(thing) = level.tm.thing else {
        return true;
    };
    let (front, back) = (line.frontsector, line.backsector);
    p_add_secnode(level, front, thing);
    if let Some(back) = back.filter(|&b| b != front) {
        p_add_secnode(level, back, thing);
    }
    true
}

/// Rebuild the thing thread in `tm.sector_list` so it names exactly the
/// sectors `thing`'s radius overlaps at its current position. Nodes for
/// sectors still touched are kept, nodes for vacated ones are freed.
///
/// Only `tm.thing` survives the call; the query position and box are
/// overwritten.
pub fn p_create_sec_node_list(ctx: &mut MapContext<'_>, thing: usize) {
    let saved_tmthing = ctx.level.tm.thing;

    // Everything starts unclaimed.
    let mut node = ctx.level.tm.sector_list;
    while let Some(id) = node {
        let n = &mut ctx.level.secnodes[id.0];
        n.m_thing = None;
        node = n.m_tnext;
    }

    let (x, y, radius) = {
        let mo = ctx.level.mobj(thing);
        (mo.x, mo.y, mo.radius)
    };
    let bbox = m_box_around(x, y, radius);
    {
        let tm = &mut ctx.level.tm;
        tm.thing = Some(thing);
        tm.x = x;
        tm.y = y;
        tm.bbox = bbox;
    }

    ctx.level.validcount += 1;

    let bmap = &ctx.level.blockmap;
    let xl = bmap.block_x(bbox[BOXLEFT]);
    let xh = bmap.block_x(bbox[BOXRIGHT]);
    let yl = bmap.block_y(bbox[BOXBOTTOM]);
    let yh = bmap.block_y(bbox[BOXTOP]);

    for bx in xl..=xh {
        for by in yl..=yh {
            p_block_lines_iterator(ctx, bx, by, &mut pit_get_sectors);
        }
    }

    // The sector the origin is in.
    let own = ctx.level.mobj_sector(thing);
    p_add_secnode(ctx.level, own, thing);

    // Free whatever was not claimed again.
    let level = &mut *ctx.level;
    let mut node = level.tm.sector_list;
    while let Some(id) = node {
        let n = level.secnodes[id.0];
        if n.m_thing.is_none() {
            if level.tm.sector_list == Some(id) {
                level.tm.sector_list = n.m_tnext;
            }
            node = p_del_secnode(level, Some(id));
        } else {
            node = n.m_tnext;
        }
    }

    level.tm.thing = saved_tmthing;
}

/// Sectors on a mobj's thread, head first.
pub fn p_thing_sectors(level: &Level, thing: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut node = level.mobj(thing).touching_sectorlist;
    while let Some(id) = node {
        let n = &level.secnodes[id.0];
        out.push(n.m_sector);
        node = n.m_tnext;
    }
    out
}

/// Mobjs on a sector's thread, head first.
pub fn p_sector_things(level: &Level, sector: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut node = level.sectors[sector].touching_thinglist;
    while let Some(id) = node {
        let n = &level.secnodes[id.0];
        if let Some(thing) = n.m_thing {
            out.push(thing);
        }
        node = n.m_snext;
    }
    out
}
