//! GearView firmware library - host-testable drivers for the Pico 2 overlay.
//!
//! This library contains the register-level drivers, written against the
//! `embedded-hal` 1.0 traits so they can be tested on the host machine.
//! The binary (`main.rs`) wires them to the RP2350 peripherals.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p gearview-pico2 --lib --target x86_64-unknown-linux-gnu  # Linux/macOS
//! cargo test -p gearview-pico2 --lib --target x86_64-pc-windows-msvc    # Windows
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// CAN controller (SPI0)
pub mod mcp2515;

// OLED panel (I2C0)
pub mod sh1106;

pub use mcp2515::{Mcp2515, Mcp2515Error, OperationMode, Oscillator};
pub use sh1106::{Rotation, Sh1106};
