//=========================================================================
// Aetheric Web — Library Root
//
// Browser platform adapter for the Aetheric Engine.
//
// Responsibilities:
// - Expose the platform-independent viewport core (`core`): sizing,
//   adaptive resolution, coordinate mapping, pointer dispatch, frame clock
// - Expose the entry configuration (`launcher::PlatformBuilder`)
// - Attach the core to a browser page on wasm32 (`platform`)
//
// Typical usage:
// ```ignore
// use aetheric_web::prelude::*;
//
// let launcher = PlatformBuilder::new(GameSize::new(400.0, 300.0)?)
//     .with_dimensions(SizingStrategy::FitToWidth)
//     .with_max_pixels(1_500_000)
//     .build()?;
//
// let platform = aetheric_web::platform::start(launcher, MyGame::default())?;
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` has no browser dependency and is tested natively. The controller
// in `core::viewport` talks to the page only through the collaborator
// traits in `core::collaborators`.
//
pub mod core;
pub mod launcher;
pub mod prelude;

//--- Browser Runtime -----------------------------------------------------
//
// `platform` implements the collaborators with web-sys and drives the
// controller from DOM listeners and `requestAnimationFrame`.
//
#[cfg(target_arch = "wasm32")]
pub mod platform;

//--- Public Exports ------------------------------------------------------

pub use launcher::{Launcher, PlatformBuilder};
