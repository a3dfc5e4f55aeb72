//! Fractal-plane camera: multiplicative zoom and 2D offset.

/// Zoom step per wheel notch.
const ZOOM_STEP: f32 = 0.2;
const DEFAULT_ZOOM: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Width of the visible span of the complex plane, roughly.
    pub zoom: f32,
    pub offset: (f32, f32),
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            offset: (0.0, 0.0),
        }
    }
}

impl CameraState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies a formula's default viewpoint.
    pub fn apply_defaults(&mut self, zoom: f32, offset: (f32, f32)) {
        self.zoom = zoom;
        self.offset = offset;
    }

    /// Zooms toward (or away from) `focus`, a point in fractal-plane
    /// coordinates, keeping that point fixed on screen.
    pub fn zoom_about(&mut self, focus: (f32, f32), zoom_in: bool) {
        let factor = if zoom_in {
            1.0 - ZOOM_STEP
        } else {
            1.0 + ZOOM_STEP
        };
        self.offset.0 = focus.0 + (self.offset.0 - focus.0) * factor;
        self.offset.1 = focus.1 + (self.offset.1 - focus.1) * factor;
        self.zoom *= factor;
    }

    /// Pans by a pixel delta; `min_dimension` is the smaller framebuffer
    /// edge so drag speed tracks the visible scale.
    pub fn pan_pixels(&mut self, dx: f32, dy: f32, min_dimension: f32) {
        let scale = self.zoom / min_dimension.max(1.0);
        self.offset.0 -= dx * scale;
        // Screen y grows downward, plane y grows upward.
        self.offset.1 += dy * scale;
    }

    /// Converts a normalized screen position (0..1 each axis) to the
    /// fractal-plane point currently under it.
    pub fn plane_point(&self, norm_x: f32, norm_y: f32, width: f32, height: f32) -> (f32, f32) {
        let aspect = width / height.max(1.0);
        let x = (norm_x - 0.5) * self.zoom * aspect + self.offset.0;
        let y = (0.5 - norm_y) * self.zoom + self.offset.1;
        (x, y)
    }
}
