/// An axis-aligned rectangle in continuous coordinates.
///
/// Used both for on-screen selections (view coordinates) and for regions of
/// interest in frame pixel coordinates; `ViewTransform` converts between the
/// two spaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shifts the rectangle so it lies inside `bounds`, preserving its size.
    ///
    /// A rectangle larger than the bounds is pinned to the bounds origin.
    pub fn keep_within(&self, bounds: &Rect) -> Rect {
        let mut out = *self;

        if out.x < bounds.x {
            out.x = bounds.x;
        } else if out.x > bounds.x + bounds.width - out.width {
            out.x = bounds.x + bounds.width - out.width;
        }

        if out.y < bounds.y {
            out.y = bounds.y;
        } else if out.y > bounds.y + bounds.height - out.height {
            out.y = bounds.y + bounds.height - out.height;
        }

        if out.x < bounds.x {
            out.x = bounds.x;
        }
        if out.y < bounds.y {
            out.y = bounds.y;
        }

        out
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Integer pixel bounds `(x, y, width, height)` clamped to a
    /// `frame_width` x `frame_height` raster. `None` if nothing remains.
    pub fn pixel_bounds(&self, frame_width: u32, frame_height: u32) -> Option<(u32, u32, u32, u32)> {
        let frame = Rect::new(0.0, 0.0, frame_width as f32, frame_height as f32);
        let clipped = self.intersect(&frame)?;

        let x = clipped.x.floor() as u32;
        let y = clipped.y.floor() as u32;
        let w = (clipped.width.round() as u32).min(frame_width - x);
        let h = (clipped.height.round() as u32).min(frame_height - y);

        if w == 0 || h == 0 {
            return None;
        }
        Some((x, y, w, h))
    }
}
