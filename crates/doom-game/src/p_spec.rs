// p_spec.rs — walkover line specials
//
// Crossing a special line fires its action through the sector-mover
// services. One-shot triggers clear the line's special once they have
// started something; repeatable ones keep it.

use crate::map_import::MapContext;
use crate::p_local::{Line, MobjType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorKind {
    /// Open, wait, close.
    Normal,
    /// Open and stay open.
    Open,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatKind {
    DownWaitUpStay,
    RaiseToNearestAndChange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloorKind {
    TurboLower,
    RaiseFloor,
}

/// Walkover specials a monster may trigger.
const MONSTER_CROSSABLE: &[i16] = &[88];

/// Tagged actions need a sector to act on; a tag of 0 would select every
/// untagged sector in the map.
pub fn p_check_tag(line: &Line) -> bool {
    if line.tag != 0 {
        return true;
    }
    // zero tag allowed
    matches!(
        line.special,
        // manual doors act on the back sector
        1 | 26 | 27 | 28 | 31 | 32 | 33 | 34 | 117 | 118
        // lighting
        | 139 | 170 | 79 | 35 | 138 | 171 | 81 | 13 | 192 | 169 | 80 | 12
        | 194 | 173 | 157 | 104 | 193 | 172 | 156 | 17
        // thing teleporters
        | 195 | 174 | 97 | 39 | 126 | 125 | 210 | 209 | 208 | 207
        // exits
        | 11 | 52 | 197 | 51 | 124 | 198
        // scrolling walls
        | 48 | 85
    )
}

/// `thing` has crossed special line `ld`. Fires the walkover action.
pub fn p_cross_special_line(ctx: &mut MapContext<'_>, ld: usize, thing: usize) {
    let special = ctx.level.lines[ld].special;

    if ctx.level.mobj_is_player(thing).is_none() {
        // Imp fireballs never trigger anything.
        if ctx.level.mobj(thing).kind == MobjType::TroopShot {
            return;
        }
        if !MONSTER_CROSSABLE.contains(&special) {
            return;
        }
    }

    if !p_check_tag(&ctx.level.lines[ld]) {
        return;
    }

    match special {
        // W1 Open Door
        2 => {
            if ctx.gi.ev_do_door(ctx.level, ld, DoorKind::Open) {
                ctx.level.lines[ld].special = 0;
            }
        }
        // W1 Plat Raise to next highest floor, change texture
        22 => {
            if ctx.gi.ev_do_plat(ctx.level, ld, PlatKind::RaiseToNearestAndChange) {
                ctx.level.lines[ld].special = 0;
            }
        }
        // WR PlatDownWaitUpStay
        88 => {
            ctx.gi.ev_do_plat(ctx.level, ld, PlatKind::DownWaitUpStay);
        }
        // WR Door Raise
        90 => {
            ctx.gi.ev_do_door(ctx.level, ld, DoorKind::Normal);
        }
        // WR Raise Floor to lowest adjacent ceiling
        91 => {
            ctx.gi.ev_do_floor(ctx.level, ld, FloorKind::RaiseFloor);
        }
        // WR Turbo Lower
        98 => {
            ctx.gi.ev_do_floor(ctx.level, ld, FloorKind::TurboLower);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::p_local::{Mobj, MobjType};
    use crate::p_maputl::p_add_mobj;
    use crate::testing::{fu, spawn_player, two_room_level, Event, DIVIDER};

    #[test]
    fn test_check_tag() {
        let (mut level, _gi) = two_room_level(0, 128);
        let line = &mut level.lines[DIVIDER];
        line.special = 2;
        line.tag = 0;
        assert!(!p_check_tag(line));
        line.tag = 7;
        assert!(p_check_tag(line));
        line.tag = 0;
        line.special = 1;
        assert!(p_check_tag(line));
    }

    #[test]
    fn test_one_shot_special_clears() {
        let (mut level, mut gi) = two_room_level(0, 128);
        level.lines[DIVIDER].special = 2;
        level.lines[DIVIDER].tag = 1;
        let mut ctx = MapContext::new(&mut level, &mut gi);
        let player = spawn_player(&mut ctx, fu(-100), 0);

        p_cross_special_line(&mut ctx, DIVIDER, player);
        assert_eq!(ctx.level.lines[DIVIDER].special, 0);
        drop(ctx);
        assert_eq!(gi.events, vec![Event::Door { line: DIVIDER, kind: DoorKind::Open }]);
    }

    #[test]
    fn test_one_shot_special_kept_when_nothing_moved() {
        let (mut level, mut gi) = two_room_level(0, 128);
        level.lines[DIVIDER].special = 22;
        level.lines[DIVIDER].tag = 1;
        gi.mover_result = false;
        let mut ctx = MapContext::new(&mut level, &mut gi);
        let player = spawn_player(&mut ctx, fu(-100), 0);

        p_cross_special_line(&mut ctx, DIVIDER, player);
        assert_eq!(ctx.level.lines[DIVIDER].special, 22);
    }

    #[test]
    fn test_repeatable_specials_refire() {
        for (special, expected) in [
            (88, Event::Plat { line: DIVIDER, kind: PlatKind::DownWaitUpStay }),
            (90, Event::Door { line: DIVIDER, kind: DoorKind::Normal }),
            (91, Event::Floor { line: DIVIDER, kind: FloorKind::RaiseFloor }),
            (98, Event::Floor { line: DIVIDER, kind: FloorKind::TurboLower }),
        ] {
            let (mut level, mut gi) = two_room_level(0, 128);
            level.lines[DIVIDER].special = special;
            level.lines[DIVIDER].tag = 1;
            let mut ctx = MapContext::new(&mut level, &mut gi);
            let player = spawn_player(&mut ctx, fu(-100), 0);

            p_cross_special_line(&mut ctx, DIVIDER, player);
            p_cross_special_line(&mut ctx, DIVIDER, player);
            assert_eq!(ctx.level.lines[DIVIDER].special, special);
            drop(ctx);
            assert_eq!(gi.events, vec![expected.clone(), expected]);
        }
    }

    #[test]
    fn test_monsters_only_trigger_lifts() {
        let (mut level, mut gi) = two_room_level(0, 128);
        level.lines[DIVIDER].tag = 1;
        let mut ctx = MapContext::new(&mut level, &mut gi);
        let troop = p_add_mobj(&mut ctx, Mobj::new(MobjType::Troop, fu(-100), 0, 0));
        let fireball = p_add_mobj(&mut ctx, Mobj::new(MobjType::TroopShot, fu(-100), 0, 0));

        ctx.level.lines[DIVIDER].special = 2;
        p_cross_special_line(&mut ctx, DIVIDER, troop);
        ctx.level.lines[DIVIDER].special = 88;
        p_cross_special_line(&mut ctx, DIVIDER, fireball);
        assert_eq!(ctx.level.lines[DIVIDER].special, 88);
        p_cross_special_line(&mut ctx, DIVIDER, troop);
        drop(ctx);
        assert_eq!(
            gi.events,
            vec![Event::Plat { line: DIVIDER, kind: PlatKind::DownWaitUpStay }]
        );
    }

    #[test]
    fn test_untagged_special_does_nothing() {
        let (mut level, mut gi) = two_room_level(0, 128);
        level.lines[DIVIDER].special = 90;
        let mut ctx = MapContext::new(&mut level, &mut gi);
        let player = spawn_player(&mut ctx, fu(-100), 0);
        p_cross_special_line(&mut ctx, DIVIDER, player);
        drop(ctx);
        assert!(gi.events.is_empty());
    }
}
