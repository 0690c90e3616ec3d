//=========================================================================
// Device Size
//=========================================================================
//
// Derives the logical game viewport from raw browser viewport dimensions.
//
// Architecture:
//   RawViewport + GameSize + SizingStrategy → DeviceSize::compute()
//                                                   ↓
//                      { width, height, margins }  (game units)
//                      { device_width/height }     (CSS pixels)
//
// Every strategy is a pure function of its inputs. A zero-sized viewport
// cannot be represented as a `RawViewport`, so callers must defer instead
// of computing a degenerate size.
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::PlatformError;

//=== GameSize ============================================================

/// Requested logical size of the game, in game units.
///
/// `max_width_margin` / `max_height_margin` only matter for
/// [`SizingStrategy::ScaleUp`], which may extend the visible game area by
/// up to that many units on each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSize {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub max_width_margin: f64,
    #[serde(default)]
    pub max_height_margin: f64,
}

impl GameSize {
    /// Creates a game size without margins.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidConfig`] for non-positive or
    /// non-finite dimensions.
    pub fn new(width: f64, height: f64) -> Result<Self, PlatformError> {
        let size = Self {
            width,
            height,
            max_width_margin: 0.0,
            max_height_margin: 0.0,
        };
        size.validate()?;
        Ok(size)
    }

    /// Sets the maximum margins used by [`SizingStrategy::ScaleUp`].
    pub fn with_max_margins(mut self, width: f64, height: f64) -> Result<Self, PlatformError> {
        self.max_width_margin = width;
        self.max_height_margin = height;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), PlatformError> {
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(PlatformError::InvalidConfig(format!(
                "game size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.max_width_margin >= 0.0 && self.max_height_margin >= 0.0) {
            return Err(PlatformError::InvalidConfig(format!(
                "game margins must be non-negative, got {}x{}",
                self.max_width_margin, self.max_height_margin
            )));
        }
        Ok(())
    }
}

//=== RawViewport =========================================================

/// Browser viewport size in CSS pixels, guaranteed strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawViewport {
    width: f64,
    height: f64,
}

impl RawViewport {
    /// Returns `None` for zero, negative or non-finite dimensions (some
    /// mobile browsers briefly report 0x0 at launch).
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

//=== SizingStrategy ======================================================

/// How the game is fitted into the browser viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizingStrategy {
    /// Uniform scale, game rect letterboxed inside the viewport.
    #[default]
    GameCoords,

    /// Like `GameCoords`, but the spare axis is filled with extra game
    /// space up to the configured max margin.
    ScaleUp,

    /// Game width fills the viewport width; spare height becomes margin.
    FitToWidth,

    /// Game height fills the viewport height; spare width becomes margin.
    FitToHeight,

    /// Game rect stretched to the viewport (non-uniform scale).
    Stretch,
}

//=== DeviceSize ==========================================================

/// Logical game viewport plus its on-screen CSS box.
///
/// `width`/`height` are the requested game size; the logical canvas is
/// `width + 2 * width_margin` by `height + 2 * height_margin`.
/// `device_width`/`device_height` describe the canvas CSS box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSize {
    pub width: f64,
    pub height: f64,
    pub device_width: f64,
    pub device_height: f64,
    pub width_margin: f64,
    pub height_margin: f64,
}

impl DeviceSize {
    //--- Calculation ------------------------------------------------------

    /// Computes the device size for a viewport under a sizing strategy.
    pub fn compute(raw: RawViewport, strategy: SizingStrategy, game: &GameSize) -> Self {
        let (rw, rh) = (raw.width(), raw.height());
        let (w, h) = (game.width, game.height);

        match strategy {
            SizingStrategy::GameCoords => {
                let scale = (rw / w).min(rh / h);
                Self::unmargined(game, w * scale, h * scale)
            }

            SizingStrategy::ScaleUp => {
                if rw / w > rh / h {
                    // Viewport is wider than the game: extend horizontally
                    let scale = rh / h;
                    let spare = (rw / scale - w) / 2.0;
                    let width_margin = spare.min(game.max_width_margin).max(0.0);
                    Self {
                        width_margin,
                        device_width: (w + 2.0 * width_margin) * scale,
                        ..Self::unmargined(game, w * scale, rh)
                    }
                } else {
                    let scale = rw / w;
                    let spare = (rh / scale - h) / 2.0;
                    let height_margin = spare.min(game.max_height_margin).max(0.0);
                    Self {
                        height_margin,
                        device_height: (h + 2.0 * height_margin) * scale,
                        ..Self::unmargined(game, rw, h * scale)
                    }
                }
            }

            SizingStrategy::FitToWidth => {
                let scale = rw / w;
                let height_margin = ((rh / scale - h) / 2.0).max(0.0);
                Self {
                    height_margin,
                    device_height: (h + 2.0 * height_margin) * scale,
                    ..Self::unmargined(game, rw, h * scale)
                }
            }

            SizingStrategy::FitToHeight => {
                let scale = rh / h;
                let width_margin = ((rw / scale - w) / 2.0).max(0.0);
                Self {
                    width_margin,
                    device_width: (w + 2.0 * width_margin) * scale,
                    ..Self::unmargined(game, w * scale, rh)
                }
            }

            SizingStrategy::Stretch => Self::unmargined(game, rw, rh),
        }
    }

    fn unmargined(game: &GameSize, device_width: f64, device_height: f64) -> Self {
        Self {
            width: game.width,
            height: game.height,
            device_width,
            device_height,
            width_margin: 0.0,
            height_margin: 0.0,
        }
    }

    //--- Derived Values ---------------------------------------------------

    /// Full logical canvas width including both margins.
    pub fn logical_width(&self) -> f64 {
        self.width + 2.0 * self.width_margin
    }

    /// Full logical canvas height including both margins.
    pub fn logical_height(&self) -> f64 {
        self.height + 2.0 * self.height_margin
    }

    /// Returns `true` if a game-space point lies inside the play region
    /// (half size plus margins on each axis, edges inclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x.abs() <= self.width / 2.0 + self.width_margin
            && y.abs() <= self.height / 2.0 + self.height_margin
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
