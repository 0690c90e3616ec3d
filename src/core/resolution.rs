//=========================================================================
// Resolution Controller
//=========================================================================
//
// Keeps the canvas backing buffer under a pixel budget by lowering a
// resolution multiplier. Never raises it on its own.
//
// Architecture:
//   DeviceSize × dpr × multiplier ─┐
//                                  ├─ min ─► tentative buffer ─► over budget?
//   logical size × image_resolution┘                                │ yes
//                                          multiplier −= 0.1 ◄──────┘
//
// A user override (`set`) freezes the multiplier: automatic step-down is
// skipped from then on.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::geometry::DeviceSize;

//=== Constants ===========================================================

/// Lowest multiplier the automatic step-down (or a user) may reach.
pub const MIN_MULTIPLIER: f64 = 0.15;

/// Highest multiplier, also the starting value.
pub const MAX_MULTIPLIER: f64 = 1.0;

/// Amount removed per automatic step.
pub const MULTIPLIER_STEP: f64 = 0.1;

/// Key under which a user override is persisted.
pub const RESOLUTION_STORAGE_KEY: &str = "aetheric-resolution-multiplier";

//=== BufferSize ==========================================================

/// Canvas backing buffer size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferSize {
    pub width: u32,
    pub height: u32,
}

impl BufferSize {
    /// Rounds to whole pixels, never below 1x1.
    pub fn from_f64(width: f64, height: f64) -> Self {
        let to_px = |v: f64| v.round().clamp(1.0, u32::MAX as f64) as u32;
        Self {
            width: to_px(width),
            height: to_px(height),
        }
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

//=== ResolutionState =====================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionState {
    pub multiplier: f64,
    pub has_user_override: bool,
}

//=== ResolutionController ================================================

pub struct ResolutionController {
    state: ResolutionState,
}

impl ResolutionController {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            state: ResolutionState {
                multiplier: MAX_MULTIPLIER,
                has_user_override: false,
            },
        }
    }

    //--- Recalculation ----------------------------------------------------

    /// Picks the backing buffer size for a freshly computed device size.
    ///
    /// Steps the multiplier down while the buffer exceeds `max_pixels`,
    /// there is no user override and the floor has not been reached. The
    /// floor is accepted even if the budget is still exceeded there.
    pub fn recompute_after_resize(
        &mut self,
        size: &DeviceSize,
        device_pixel_ratio: f64,
        image_resolution: f64,
        max_pixels: Option<u64>,
    ) -> BufferSize {
        loop {
            let buffer = self.tentative_buffer(size, device_pixel_ratio, image_resolution);

            let Some(budget) = max_pixels else {
                return buffer;
            };

            if self.state.has_user_override
                || buffer.pixel_count() <= budget
                || self.state.multiplier <= MIN_MULTIPLIER
            {
                return buffer;
            }

            debug!(
                target: "viewport::resolution",
                "{}x{} ({} px) exceeds budget {} at multiplier {}",
                buffer.width,
                buffer.height,
                buffer.pixel_count(),
                budget,
                self.state.multiplier
            );
            self.step_down();
        }
    }

    /// Size implied by the tighter of the display density and the asset
    /// density; going finer than either wastes fill without visual gain.
    fn tentative_buffer(
        &self,
        size: &DeviceSize,
        device_pixel_ratio: f64,
        image_resolution: f64,
    ) -> BufferSize {
        let density = device_pixel_ratio * self.state.multiplier;
        let width = (size.device_width * density).min(size.logical_width() * image_resolution);
        let height = (size.device_height * density).min(size.logical_height() * image_resolution);
        BufferSize::from_f64(width, height)
    }

    fn step_down(&mut self) {
        let next = (self.state.multiplier - MULTIPLIER_STEP).max(MIN_MULTIPLIER);
        self.state.multiplier = round_hundredths(next);
    }

    //--- User Override ----------------------------------------------------

    /// Sets the multiplier explicitly and disables automatic step-down.
    ///
    /// Returns the clamped value actually stored. Persistence and the
    /// follow-up resize are the caller's job.
    pub fn set(&mut self, multiplier: f64) -> f64 {
        let clamped = if multiplier.is_finite() {
            round_hundredths(multiplier.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER))
        } else {
            MAX_MULTIPLIER
        };
        self.state = ResolutionState {
            multiplier: clamped,
            has_user_override: true,
        };
        clamped
    }

    /// Parses a persisted override. Unparsable values yield `None`.
    pub fn parse_stored(raw: &str) -> Option<f64> {
        raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    //--- Accessors --------------------------------------------------------

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn multiplier(&self) -> f64 {
        self.state.multiplier
    }

    pub fn has_user_override(&self) -> bool {
        self.state.has_user_override
    }
}

impl Default for ResolutionController {
    fn default() -> Self {
        Self::new()
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn device(width: f64, height: f64) -> DeviceSize {
        DeviceSize {
            width,
            height,
            device_width: width,
            device_height: height,
            width_margin: 0.0,
            height_margin: 0.0,
        }
    }

    //=====================================================================
    // Tentative Size
    //=====================================================================

    #[test]
    fn no_budget_keeps_full_multiplier() {
        let mut controller = ResolutionController::new();
        let buffer = controller.recompute_after_resize(&device(500.0, 400.0), 2.0, 3.0, None);

        assert_eq!(buffer, BufferSize { width: 1000, height: 800 });
        assert_eq!(controller.multiplier(), 1.0);
    }

    #[test]
    fn image_resolution_caps_buffer() {
        let mut controller = ResolutionController::new();
        let size = DeviceSize {
            width: 100.0,
            height: 50.0,
            device_width: 1000.0,
            device_height: 500.0,
            width_margin: 0.0,
            height_margin: 0.0,
        };

        // dpr 3 would give 3000x1500; assets only carry 2 px per unit
        let buffer = controller.recompute_after_resize(&size, 3.0, 2.0, None);
        assert_eq!(buffer, BufferSize { width: 200, height: 100 });
    }

    //=====================================================================
    // Step-Down
    //=====================================================================

    #[test]
    fn steps_down_until_under_budget() {
        let mut controller = ResolutionController::new();
        let buffer =
            controller.recompute_after_resize(&device(500.0, 400.0), 1.0, 10.0, Some(100_000));

        // 0.9 → 162000, 0.8 → 128000, 0.7 → 98000
        assert_eq!(controller.multiplier(), 0.7);
        assert_eq!(buffer, BufferSize { width: 350, height: 280 });
        assert!(buffer.pixel_count() <= 100_000);
    }

    #[test]
    fn step_down_is_monotonic_and_stops_at_floor() {
        let mut controller = ResolutionController::new();
        let size = device(500.0, 400.0);
        let mut seen = vec![controller.multiplier()];

        // Budget of one pixel can never be met; walk one step at a time
        for _ in 0..20 {
            if controller.multiplier() <= MIN_MULTIPLIER {
                break;
            }
            controller.step_down();
            seen.push(controller.multiplier());
        }

        assert_eq!(seen, vec![1.0, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.15]);

        let mut fresh = ResolutionController::new();
        fresh.recompute_after_resize(&size, 1.0, 10.0, Some(1));
        assert_eq!(fresh.multiplier(), MIN_MULTIPLIER);
    }

    #[test]
    fn budget_met_exactly_at_floor_is_accepted() {
        let mut controller = ResolutionController::new();
        // At 0.15: 150x120 = 18000
        let buffer =
            controller.recompute_after_resize(&device(1000.0, 800.0), 1.0, 10.0, Some(18_000));

        assert_eq!(controller.multiplier(), MIN_MULTIPLIER);
        assert_eq!(buffer.pixel_count(), 18_000);
    }

    #[test]
    fn never_steps_up_automatically() {
        let mut controller = ResolutionController::new();
        controller.recompute_after_resize(&device(500.0, 400.0), 1.0, 10.0, Some(100_000));
        assert_eq!(controller.multiplier(), 0.7);

        controller.recompute_after_resize(&device(50.0, 40.0), 1.0, 10.0, Some(100_000));
        assert_eq!(controller.multiplier(), 0.7);
    }

    //=====================================================================
    // User Override
    //=====================================================================

    #[test]
    fn user_override_disables_step_down() {
        let mut controller = ResolutionController::new();
        assert_eq!(controller.set(0.5), 0.5);

        let buffer = controller.recompute_after_resize(&device(500.0, 400.0), 1.0, 10.0, Some(1));

        assert_eq!(controller.multiplier(), 0.5);
        assert!(controller.has_user_override());
        assert_eq!(buffer, BufferSize { width: 250, height: 200 });
    }

    #[test]
    fn set_clamps_into_range() {
        let mut controller = ResolutionController::new();
        assert_eq!(controller.set(4.0), MAX_MULTIPLIER);
        assert_eq!(controller.set(0.01), MIN_MULTIPLIER);
        assert_eq!(controller.set(f64::NAN), MAX_MULTIPLIER);
    }

    #[test]
    fn parse_stored_values() {
        assert_eq!(ResolutionController::parse_stored(" 0.6 "), Some(0.6));
        assert_eq!(ResolutionController::parse_stored("high"), None);
        assert_eq!(ResolutionController::parse_stored("NaN"), None);
    }

    #[test]
    fn buffer_size_never_zero() {
        assert_eq!(BufferSize::from_f64(0.2, 0.0), BufferSize { width: 1, height: 1 });
    }
}
