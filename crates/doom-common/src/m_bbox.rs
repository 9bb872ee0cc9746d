// m_bbox.rs — axis-aligned bounding boxes in fixed point

use crate::m_fixed::Fixed;

pub const BOXTOP: usize = 0;
pub const BOXBOTTOM: usize = 1;
pub const BOXLEFT: usize = 2;
pub const BOXRIGHT: usize = 3;

pub type BBox = [Fixed; 4];

pub fn m_clear_box(bbox: &mut BBox) {
    bbox[BOXTOP] = i32::MIN;
    bbox[BOXRIGHT] = i32::MIN;
    bbox[BOXBOTTOM] = i32::MAX;
    bbox[BOXLEFT] = i32::MAX;
}

pub fn m_add_to_box(bbox: &mut BBox, x: Fixed, y: Fixed) {
    if x < bbox[BOXLEFT] {
        bbox[BOXLEFT] = x;
    }
    if x > bbox[BOXRIGHT] {
        bbox[BOXRIGHT] = x;
    }
    if y < bbox[BOXBOTTOM] {
        bbox[BOXBOTTOM] = y;
    }
    if y > bbox[BOXTOP] {
        bbox[BOXTOP] = y;
    }
}

/// Square box of half-size `radius` centered on (x, y).
pub fn m_box_around(x: Fixed, y: Fixed, radius: Fixed) -> BBox {
    let mut bbox = [0; 4];
    bbox[BOXTOP] = y + radius;
    bbox[BOXBOTTOM] = y - radius;
    bbox[BOXRIGHT] = x + radius;
    bbox[BOXLEFT] = x - radius;
    bbox
}

/// Strict overlap test: boxes that only share an edge do not overlap.
pub fn m_boxes_overlap(a: &BBox, b: &BBox) -> bool {
    !(a[BOXRIGHT] <= b[BOXLEFT]
        || a[BOXLEFT] >= b[BOXRIGHT]
        || a[BOXTOP] <= b[BOXBOTTOM]
        || a[BOXBOTTOM] >= b[BOXTOP])
}
