//! Spring-damper camera simulation.
//!
//! The camera is a rectangular viewport over the content plane. Its center
//! behaves as a unit mass on a linear spring toward the target with linear
//! damping; zoom only ever shrinks, and pins permanently once it reaches
//! the 1.0 floor.
//!
//! Content coordinates are logical units (logical line height per row);
//! screen coordinates are content scaled by the current zoom.

use crate::schema::CameraTuning;

/// Per-frame camera output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// Pixel-aligned screen offset at which content origin is pasted.
    pub offset: (i32, i32),
    /// Exact (sub-pixel) cursor position on screen.
    pub cursor: (f64, f64),
    /// Current zoom factor.
    pub zoom: f64,
}

/// Camera state across a session.
#[derive(Debug, Clone)]
pub struct CameraController {
    tuning: CameraTuning,
    /// Viewport size in screen pixels.
    width: f64,
    height: f64,
    /// Seconds per frame.
    dt: f64,
    /// Viewport top-left in content coordinates.
    x: f64,
    y: f64,
    /// Center velocity in content units per second.
    vx: f64,
    vy: f64,
    zoom: f64,
    at_limit: bool,
}

impl CameraController {
    pub fn new(
        tuning: CameraTuning,
        viewport: (u32, u32),
        frame_rate: u32,
        initial_zoom: f64,
    ) -> Self {
        let zoom = initial_zoom.max(1.0);
        Self {
            tuning,
            width: viewport.0 as f64,
            height: viewport.1 as f64,
            dt: 1.0 / frame_rate.max(1) as f64,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            at_limit: zoom <= 1.0,
            zoom,
        }
    }

    /// Current zoom factor.
    #[inline]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Whether zoom reached the 1.0 floor and is pinned.
    #[inline]
    pub fn at_limit(&self) -> bool {
        self.at_limit
    }

    /// Viewport size in content units.
    #[inline]
    pub fn view_size(&self) -> (f64, f64) {
        (self.width / self.zoom, self.height / self.zoom)
    }

    /// Viewport center in content coordinates.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        let (vw, vh) = self.view_size();
        (self.x + vw / 2.0, self.y + vh / 2.0)
    }

    /// Move the viewport so its center lands on `c`.
    pub fn set_center(&mut self, c: (f64, f64)) {
        let (vw, vh) = self.view_size();
        self.x = c.0 - vw / 2.0;
        self.y = c.1 - vh / 2.0;
    }

    /// Change zoom while keeping the view center fixed.
    fn set_zoom_about_center(&mut self, zoom: f64) {
        let center = self.center();
        self.zoom = zoom;
        self.set_center(center);
    }

    /// Shrink zoom so the cursor and the content origin fit the viewport.
    ///
    /// No-op once the 1.0 floor has been hit. The smoothing curve
    /// `r' = 1 - 0.5 (1 - r)^2` keeps per-frame shrinkage gentle near the
    /// fit point so the zoom settles without oscillating.
    pub fn update_zoom(&mut self, cursor: (f64, f64)) {
        if self.at_limit {
            return;
        }
        let (vw, vh) = self.view_size();
        // Protrusion beyond the viewport on each axis; the small positive
        // margin also nudges the camera toward non-negative origins.
        let dy = (self.y + vh * 0.05)
            .max(cursor.1 - self.y - vh)
            .max(0.0);
        let dx = (self.x + vw * 0.05)
            .max(cursor.0 - self.x - vw)
            .max(0.0);

        let required_h = dy * 2.0 + vh;
        let required_w = dx * 2.0 + vw;
        let rate = (vh / required_h).min(vw / required_w);
        let smoothed = 1.0 - 0.5 * (1.0 - rate) * (1.0 - rate);

        let zoom = self.zoom * smoothed;
        if zoom <= 1.0 {
            self.set_zoom_about_center(1.0);
            self.at_limit = true;
        } else {
            self.set_zoom_about_center(zoom);
        }
    }

    /// Advance the center one frame toward `target` on the spring.
    ///
    /// Semi-implicit trapezoidal step; the per-axis velocity magnitude is
    /// capped at `max_velocity / zoom` so screen-space speed stays bounded
    /// regardless of zoom.
    pub fn update_pan(&mut self, target: (f64, f64)) {
        let max_v = self.tuning.max_velocity / self.zoom;
        let (cx, cy) = self.center();

        let ax = self.tuning.spring_k * (target.0 - cx) - self.tuning.damping * self.vx;
        let vx = self.vx + ax * self.dt;
        let nx = cx + self.dt * (self.vx + vx) / 2.0;
        self.vx = vx.clamp(-max_v, max_v);

        let ay = self.tuning.spring_k * (target.1 - cy) - self.tuning.damping * self.vy;
        let vy = self.vy + ay * self.dt;
        let ny = cy + self.dt * (self.vy + vy) / 2.0;
        self.vy = vy.clamp(-max_v, max_v);

        self.set_center((nx, ny));
    }

    /// Screen placement for the current state.
    pub fn frame(&self, cursor: (f64, f64)) -> CameraFrame {
        CameraFrame {
            offset: (
                (-self.x * self.zoom).round() as i32,
                (-self.y * self.zoom).round() as i32,
            ),
            cursor: (
                (cursor.0 - self.x) * self.zoom,
                (cursor.1 - self.y) * self.zoom,
            ),
            zoom: self.zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(zoom: f64) -> CameraController {
        CameraController::new(CameraTuning::default(), (1920, 1080), 24, zoom)
    }

    #[test]
    fn test_initial_zoom_clamped_to_floor() {
        let cam = camera(0.5);
        assert_eq!(cam.zoom(), 1.0);
        assert!(cam.at_limit());
    }

    #[test]
    fn test_zoom_non_increasing_and_pins() {
        let mut cam = camera(6.0);
        cam.set_center((0.0, 0.0));
        let mut last = cam.zoom();
        let mut cursor = (0.0, 0.0);
        for i in 0..4000 {
            // Cursor wanders far outside the viewport, forcing zoom-out.
            cursor = (cursor.0 + 40.0, (i % 7) as f64 * 30.0);
            cam.update_zoom(cursor);
            cam.update_pan(cursor);
            assert!(cam.zoom() <= last + 1e-12);
            assert!(cam.zoom() >= 1.0);
            last = cam.zoom();
        }
        assert!(cam.at_limit());
        let pinned = cam.zoom();
        cam.update_zoom((1e6, 1e6));
        assert_eq!(cam.zoom(), pinned);
        assert_eq!(pinned, 1.0);
    }

    #[test]
    fn test_zoom_keeps_center() {
        let mut cam = camera(4.0);
        cam.set_center((100.0, 200.0));
        let before = cam.center();
        // Cursor way below the view forces a shrink.
        cam.update_zoom((100.0, 5000.0));
        let after = cam.center();
        assert!((before.0 - after.0).abs() < 1e-9);
        assert!((before.1 - after.1).abs() < 1e-9);
        assert!(cam.zoom() < 4.0);
    }

    #[test]
    fn test_spring_converges_to_static_target() {
        let mut cam = camera(2.0);
        cam.set_center((0.0, 0.0));
        let target = (300.0, 150.0);
        for _ in 0..5000 {
            cam.update_pan(target);
        }
        let c = cam.center();
        assert!((c.0 - target.0).abs() < 1.0, "center x {}", c.0);
        assert!((c.1 - target.1).abs() < 1.0, "center y {}", c.1);
    }

    #[test]
    fn test_velocity_capped_by_zoom() {
        let mut cam = camera(2.0);
        cam.set_center((0.0, 0.0));
        let cap = CameraTuning::default().max_velocity / 2.0;
        for _ in 0..200 {
            cam.update_pan((1e7, -1e7));
            assert!(cam.vx.abs() <= cap + 1e-9);
            assert!(cam.vy.abs() <= cap + 1e-9);
        }
    }

    #[test]
    fn test_frame_placement() {
        let mut cam = camera(2.0);
        cam.set_center((480.0, 270.0));
        // Viewport is 960x540 content units at zoom 2: top-left at origin.
        let frame = cam.frame((10.0, 20.0));
        assert_eq!(frame.offset, (0, 0));
        assert_eq!(frame.cursor, (20.0, 40.0));
        assert_eq!(frame.zoom, 2.0);
    }
}
