//! GearView core: CAN decode, bus timeout and display refresh.
//!
//! This crate contains the platform-agnostic engine shared between the Pico 2
//! firmware and the desktop simulator:
//!
//! - [`frame`]: Raw CAN frame as handed over by the bus controller
//! - [`vehicle`]: Gear/mode labels and the decoded [`VehicleState`]
//! - [`decoder`]: Identifier-to-rule table turning frames into field updates
//! - [`monitor`]: Bus activity timeout (Active/Inactive)
//! - [`compositor`]: Fixed-interval refresh scheduler and logical layout
//! - [`layout`]: Screen geometry and the display call sequence
//! - [`debug`]: Optional FPS/spinner overlay
//! - [`engine`]: One control-loop iteration tying everything together
//! - [`traits`]: Bus, display and clock collaborator traits
//! - [`graphics`] / [`framebuffer`]: embedded-graphics backed text display
//!
//! # no_std Compatibility
//!
//! The crate is `no_std`. Tests run on the host with `std` enabled via
//! `cfg_attr`:
//! ```bash
//! cargo test -p gearview-common
//! ```

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod compositor;
pub mod config;
pub mod debug;
pub mod decoder;
pub mod engine;
pub mod format;
pub mod frame;
pub mod framebuffer;
pub mod graphics;
pub mod layout;
pub mod monitor;
pub mod traits;
pub mod vehicle;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use compositor::{Compositor, RenderPlan, TempReadout};
pub use config::{ConfigError, GearViewConfig, TimeoutPolicy};
pub use debug::DebugOverlay;
pub use decoder::{FieldUpdate, FrameDecoder};
pub use engine::{GearView, PollReport};
pub use frame::RawFrame;
pub use framebuffer::Framebuffer;
pub use graphics::{GraphicsDisplay, Present};
pub use layout::TextScale;
pub use monitor::{BusActivityMonitor, BusStatus, BusTransition};
pub use traits::{CanBus, Clock, DisplayError, ManualClock, TextDisplay};
pub use vehicle::{GearLabel, ModeLabel, VehicleState};
