//=========================================================================
// Coordinate Transform
//=========================================================================
//
// Converts between browser client coordinates (CSS pixels, top-left
// origin, y down) and game space (game units, canvas-center origin, y up).
//
// Architecture:
//   client_x ─► + scroll_x − canvas_left ─► × scale_x ─► − half_width ─► game_x
//   client_y ─► + scroll_y − canvas_top  ─► × scale_y ─► half_height − ─► game_y
//
// The transform is a plain value rebuilt from scratch on every geometry
// change; nothing holds on to a stale copy.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::DeviceSize;

//=== ViewportOffsets =====================================================

/// Canvas position and page scroll, all in CSS pixels.
///
/// `canvas_left`/`canvas_top` are measured from the document origin, so
/// the canvas edge in client space is `canvas_left - scroll_x`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportOffsets {
    pub canvas_left: f64,
    pub canvas_top: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

//=== CoordinateTransform =================================================

/// Bidirectional mapping between client pixels and game units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    offsets: ViewportOffsets,
    scale_x: f64,
    scale_y: f64,
    half_width: f64,
    half_height: f64,
}

impl CoordinateTransform {
    /// Builds the transform for the current device size and offsets.
    ///
    /// Scale is logical canvas units per CSS pixel, per axis (the axes
    /// only differ under the stretch strategy).
    pub fn new(size: &DeviceSize, offsets: ViewportOffsets) -> Self {
        Self {
            offsets,
            scale_x: size.logical_width() / size.device_width,
            scale_y: size.logical_height() / size.device_height,
            half_width: size.logical_width() / 2.0,
            half_height: size.logical_height() / 2.0,
        }
    }

    //--- Platform → Game --------------------------------------------------

    pub fn platform_to_game_x(&self, client_x: f64) -> f64 {
        (client_x + self.offsets.scroll_x - self.offsets.canvas_left) * self.scale_x
            - self.half_width
    }

    pub fn platform_to_game_y(&self, client_y: f64) -> f64 {
        self.half_height
            - (client_y + self.offsets.scroll_y - self.offsets.canvas_top) * self.scale_y
    }

    pub fn platform_to_game(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        (self.platform_to_game_x(client_x), self.platform_to_game_y(client_y))
    }

    //--- Game → Platform --------------------------------------------------

    /// Client x of a game-space x, used to place overlaid native elements.
    pub fn game_to_platform_x(&self, x: f64) -> f64 {
        (x + self.half_width) / self.scale_x + self.offsets.canvas_left - self.offsets.scroll_x
    }

    /// Client y of a game-space y, used to place overlaid native elements.
    pub fn game_to_platform_y(&self, y: f64) -> f64 {
        (self.half_height - y) / self.scale_y + self.offsets.canvas_top - self.offsets.scroll_y
    }

    pub fn game_to_platform(&self, x: f64, y: f64) -> (f64, f64) {
        (self.game_to_platform_x(x), self.game_to_platform_y(y))
    }

    //--- Accessors --------------------------------------------------------

    pub fn offsets(&self) -> ViewportOffsets {
        self.offsets
    }

    /// Logical units per CSS pixel on the x axis.
    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    /// Logical units per CSS pixel on the y axis.
    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{GameSize, RawViewport, SizingStrategy};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {} ≈ {}", a, b);
    }

    fn size_for(w: f64, h: f64, strategy: SizingStrategy) -> DeviceSize {
        let game = GameSize::new(400.0, 300.0)
            .unwrap()
            .with_max_margins(60.0, 60.0)
            .unwrap();
        DeviceSize::compute(RawViewport::new(w, h).unwrap(), strategy, &game)
    }

    #[test]
    fn canvas_center_maps_to_origin() {
        let size = size_for(800.0, 600.0, SizingStrategy::GameCoords);
        let offsets = ViewportOffsets {
            canvas_left: 10.0,
            canvas_top: 20.0,
            ..ViewportOffsets::default()
        };
        let transform = CoordinateTransform::new(&size, offsets);

        let (x, y) = transform.platform_to_game(410.0, 320.0);
        assert_close(x, 0.0);
        assert_close(y, 0.0);
    }

    #[test]
    fn y_axis_points_up() {
        let size = size_for(800.0, 600.0, SizingStrategy::GameCoords);
        let transform = CoordinateTransform::new(&size, ViewportOffsets::default());

        // Top-left corner of the canvas
        let (x, y) = transform.platform_to_game(0.0, 0.0);
        assert_close(x, -200.0);
        assert_close(y, 150.0);
    }

    #[test]
    fn scroll_shifts_client_coordinates() {
        let size = size_for(800.0, 600.0, SizingStrategy::GameCoords);
        let still = CoordinateTransform::new(&size, ViewportOffsets::default());
        let scrolled = CoordinateTransform::new(
            &size,
            ViewportOffsets {
                scroll_y: 100.0,
                ..ViewportOffsets::default()
            },
        );

        // Same document point, client y reduced by the scroll amount
        assert_close(scrolled.platform_to_game_y(200.0), still.platform_to_game_y(300.0));
    }

    #[test]
    fn round_trip_across_geometries() {
        let strategies = [
            SizingStrategy::GameCoords,
            SizingStrategy::ScaleUp,
            SizingStrategy::FitToWidth,
            SizingStrategy::FitToHeight,
            SizingStrategy::Stretch,
        ];
        let viewports = [(800.0, 600.0), (375.0, 812.0), (2560.0, 1080.0), (1.0, 1.0)];
        let offsets = ViewportOffsets {
            canvas_left: 33.5,
            canvas_top: -12.0,
            scroll_x: 7.0,
            scroll_y: 140.25,
        };
        let points = [(0.0, 0.0), (-200.0, 150.0), (199.9, -149.9), (12.34, 56.78)];

        for strategy in strategies {
            for &(w, h) in &viewports {
                let size = size_for(w, h, strategy);
                let transform = CoordinateTransform::new(&size, offsets);
                for &(gx, gy) in &points {
                    let (px, py) = transform.game_to_platform(gx, gy);
                    let (rx, ry) = transform.platform_to_game(px, py);
                    assert!((rx - gx).abs() < 1e-6, "{:?} {}x{}: {} vs {}", strategy, w, h, rx, gx);
                    assert!((ry - gy).abs() < 1e-6, "{:?} {}x{}: {} vs {}", strategy, w, h, ry, gy);
                }
            }
        }
    }

    #[test]
    fn stretch_uses_independent_axis_scales() {
        let size = size_for(800.0, 300.0, SizingStrategy::Stretch);
        let transform = CoordinateTransform::new(&size, ViewportOffsets::default());

        assert_close(transform.scale_x(), 0.5);
        assert_close(transform.scale_y(), 1.0);
    }
}
