use image::{Rgba, RgbaImage};

use crate::constants::BOX_THICKNESS_PX;
use crate::motion::BoundingBox;

pub const DETECTION_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Outline `bbox` on the frame, growing the border inward by `thickness`.
pub fn draw_bounding_box(
    frame: &mut RgbaImage,
    bbox: BoundingBox,
    color: Rgba<u8>,
    thickness: u32,
) {
    if bbox.width == 0 || bbox.height == 0 || thickness == 0 {
        return;
    }

    // 1. Box extents (exclusive end), clamped to the frame
    let end_x = bbox.x.saturating_add(bbox.width);
    let end_y = bbox.y.saturating_add(bbox.height);
    let draw_end_x = end_x.min(frame.width());
    let draw_end_y = end_y.min(frame.height());

    // 2. Paint pixels within `thickness` of any edge
    for y in bbox.y..draw_end_y {
        for x in bbox.x..draw_end_x {
            let on_border = x - bbox.x < thickness
                || y - bbox.y < thickness
                || end_x - x <= thickness
                || end_y - y <= thickness;
            if on_border {
                frame.put_pixel(x, y, color);
            }
        }
    }
}

/// Outline a detection the way the detector's diagnostic view does.
pub fn draw_detection(frame: &mut RgbaImage, bbox: BoundingBox) {
    draw_bounding_box(frame, bbox, DETECTION_COLOR, BOX_THICKNESS_PX);
}
