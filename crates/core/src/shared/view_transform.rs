use crate::shared::rect::Rect;

/// Maps between on-screen view coordinates and camera frame pixel
/// coordinates.
///
/// The camera frame is assumed to fill the view vertically and be cropped
/// symmetrically on the horizontal axis, so the ratio is anchored on height
/// and the horizontal overflow is split evenly into `delta_x`.
#[derive(Clone, Copy, Debug)]
pub struct ViewTransform {
    trans_ratio: f32,
    delta_x: f32,
    frame_width: f32,
    frame_height: f32,
    view_width: f32,
}

impl ViewTransform {
    pub fn new(frame_width: u32, frame_height: u32, view_width: f32, view_height: f32) -> Self {
        let trans_ratio = frame_height as f32 / view_height;
        let delta_x = (frame_width as f32 - view_width * trans_ratio) / 2.0;
        Self {
            trans_ratio,
            delta_x,
            frame_width: frame_width as f32,
            frame_height: frame_height as f32,
            view_width,
        }
    }

    pub fn trans_ratio(&self) -> f32 {
        self.trans_ratio
    }

    /// The part of the frame that is visible on screen, in frame
    /// coordinates. This is the default region of interest and the face
    /// detection area.
    pub fn visible_region(&self) -> Rect {
        Rect::new(
            self.delta_x,
            0.0,
            self.view_width * self.trans_ratio,
            self.frame_height,
        )
    }

    /// Maps a user selection drawn in view coordinates into frame
    /// coordinates.
    pub fn map_selection(&self, selection: &Rect) -> Rect {
        Rect::new(
            selection.x * self.trans_ratio + self.delta_x,
            selection.y * self.trans_ratio,
            selection.width * self.trans_ratio,
            selection.height * self.trans_ratio,
        )
    }

    /// Maps a frame-coordinate rectangle (e.g. a detected face box) back
    /// into view coordinates for display.
    pub fn map_to_view(&self, region: &Rect) -> Rect {
        Rect::new(
            (region.x - self.delta_x) / self.trans_ratio,
            region.y / self.trans_ratio,
            region.width / self.trans_ratio,
            region.height / self.trans_ratio,
        )
    }

    pub fn frame_width(&self) -> f32 {
        self.frame_width
    }

    pub fn frame_height(&self) -> f32 {
        self.frame_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // 1280x720 frame shown in a 400x300 view: ratio 2.4, 160px cropped
    // off each horizontal side.
    fn transform() -> ViewTransform {
        ViewTransform::new(1280, 720, 400.0, 300.0)
    }

    #[test]
    fn test_ratio_is_height_anchored() {
        assert_relative_eq!(transform().trans_ratio(), 2.4);
    }

    #[test]
    fn test_visible_region_centered_horizontally() {
        let visible = transform().visible_region();
        assert_relative_eq!(visible.x, 160.0);
        assert_relative_eq!(visible.y, 0.0);
        assert_relative_eq!(visible.width, 960.0);
        assert_relative_eq!(visible.height, 720.0);
    }

    #[test]
    fn test_map_selection_scales_and_offsets() {
        let sel = Rect::new(100.0, 50.0, 40.0, 30.0);
        let mapped = transform().map_selection(&sel);
        assert_relative_eq!(mapped.x, 100.0 * 2.4 + 160.0);
        assert_relative_eq!(mapped.y, 120.0);
        assert_relative_eq!(mapped.width, 96.0);
        assert_relative_eq!(mapped.height, 72.0);
    }

    #[test]
    fn test_map_to_view_inverts_map_selection() {
        let t = transform();
        let sel = Rect::new(100.0, 50.0, 40.0, 30.0);
        let back = t.map_to_view(&t.map_selection(&sel));
        assert_relative_eq!(back.x, sel.x, epsilon = 1e-4);
        assert_relative_eq!(back.y, sel.y, epsilon = 1e-4);
        assert_relative_eq!(back.width, sel.width, epsilon = 1e-4);
        assert_relative_eq!(back.height, sel.height, epsilon = 1e-4);
    }

    #[test]
    fn test_matching_aspect_has_no_offset() {
        let t = ViewTransform::new(800, 600, 400.0, 300.0);
        let visible = t.visible_region();
        assert_relative_eq!(visible.x, 0.0);
        assert_relative_eq!(visible.width, 800.0);
    }
}
