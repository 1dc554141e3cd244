//! Klimper Platform - control surface and menu for the synthesizer.
//!
//! Everything a user touches sits in front of the audio engine here:
//!
//! - [`ControlSurface`] - validated note and parameter API. Parameters land
//!   in a [`SharedParams`](klimper_synth::SharedParams) bank, notes in a
//!   bounded queue the audio worker drains without blocking.
//! - [`MenuItem`] / [`MenuNavigator`] - the command tree and its state
//!   machine, driven by `Enter`, `Exit`, `Home`, `Increase` and `Decrease`
//!   the way the hardware's buttons and rotary encoder drive it.
//! - [`Display`] / [`ConsoleDisplay`] - 16x2 character output.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use klimper_platform::{ConsoleDisplay, ControlSurface, MenuEvent, MenuNavigator, default_menu};
//! use klimper_synth::{Sequencer, SharedParams, Synth, SynthSettings};
//!
//! let synth = Synth::new(SynthSettings::default()).unwrap();
//! let seq = Sequencer::new(44100.0, &[60], 80, 1).unwrap();
//! let params = Arc::new(SharedParams::capture(&synth, &seq));
//! let (surface, _events) = ControlSurface::new(params, 16);
//!
//! let menu = default_menu();
//! let mut nav = MenuNavigator::new(&menu, surface);
//! let mut display = ConsoleDisplay::new(Vec::new());
//!
//! for key in "de+".chars() {
//!     if let Some(event) = MenuEvent::from_key(key)
//!         && nav.handle(event).unwrap()
//!     {
//!         nav.show(&mut display).unwrap();
//!     }
//! }
//! ```

mod display;
mod error;
mod menu;
mod surface;

pub use display::{ConsoleDisplay, Display, LINE_WIDTH, menu_lines, param_lines};
pub use error::ControlError;
pub use menu::{
    MAX_SCREENS, MenuAction, MenuEvent, MenuItem, MenuNavigator, Screen, default_menu,
};
pub use surface::{ControlSurface, DEFAULT_EVENT_CAPACITY};
