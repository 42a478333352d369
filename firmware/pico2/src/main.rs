//! GearView firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Listens to the powertrain CAN bus through an MCP2515 and shows gear, drive
//! mode and oil/coolant/transmission temperatures on an SH1106 OLED.
//!
//! # Wiring
//!
//! - MCP2515: SPI0 (SCK GPIO18, MOSI GPIO19, MISO GPIO16), CS GPIO17, INT GPIO20
//! - SH1106: I2C0 (SDA GPIO4, SCL GPIO5), address 0x3C, mounted upside down
//!
//! # Loop
//!
//! Single task. Each iteration waits up to 1 ms for the MCP2515 interrupt line,
//! then runs one [`GearView::poll`]: drain both receive buffers, evaluate the
//! bus timeout and refresh the display every 125 ms.
//!
//! # Features
//!
//! - `xtal-16mhz`: MCP2515 module with a 16 MHz crystal (default 8 MHz)
//! - `debug-overlay`: FPS counter and activity spinners on the bottom line

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

#[cfg(target_arch = "arm")]
use defmt::{Debug2Format, error, info, warn};
#[cfg(target_arch = "arm")]
use embassy_executor::Spawner;
#[cfg(target_arch = "arm")]
use embassy_rp::gpio::{Input, Level, Output, Pull};
#[cfg(target_arch = "arm")]
use embassy_rp::{i2c, spi};
#[cfg(target_arch = "arm")]
use embassy_time::{Delay, Duration, Instant, Timer};
#[cfg(target_arch = "arm")]
use embedded_hal_bus::spi::ExclusiveDevice;
#[cfg(target_arch = "arm")]
use gearview_common::{BusTransition, Clock, Framebuffer, GearView, GearViewConfig, GraphicsDisplay};
#[cfg(target_arch = "arm")]
use gearview_pico2::sh1106::{self, Rotation, Sh1106};
#[cfg(target_arch = "arm")]
use gearview_pico2::{Mcp2515, Oscillator};
#[cfg(target_arch = "arm")]
use {defmt_rtt as _, panic_probe as _};

// =============================================================================
// Board Configuration
// =============================================================================

/// MCP2515 SPI clock (controller maximum is 10 MHz).
#[cfg(target_arch = "arm")]
const CAN_SPI_FREQUENCY: u32 = 8_000_000;

/// SH1106 I2C clock.
#[cfg(target_arch = "arm")]
const OLED_I2C_FREQUENCY: u32 = 400_000;

#[cfg(all(target_arch = "arm", feature = "xtal-16mhz"))]
const OSCILLATOR: Oscillator = Oscillator::Mhz16;
#[cfg(all(target_arch = "arm", not(feature = "xtal-16mhz")))]
const OSCILLATOR: Oscillator = Oscillator::Mhz8;

/// Interval between status lines on the RTT log.
#[cfg(target_arch = "arm")]
const STATUS_LOG_INTERVAL: Duration = Duration::from_secs(5);

// =============================================================================
// Clock
// =============================================================================

/// Milliseconds since boot from the embassy time driver.
#[cfg(target_arch = "arm")]
struct EmbassyClock;

#[cfg(target_arch = "arm")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 { Instant::now().as_millis() }
}

/// Idle forever after a fatal init error. The board stays up for RTT.
#[cfg(target_arch = "arm")]
async fn park() -> ! {
    loop {
        Timer::after_secs(1).await;
    }
}

// =============================================================================
// Entry Point
// =============================================================================

#[cfg(target_arch = "arm")]
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("GearView starting...");
    let p = embassy_rp::init(Default::default());

    // === Display (I2C0) ===
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = OLED_I2C_FREQUENCY;
    let i2c = i2c::I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let mut oled = Sh1106::new(i2c, sh1106::DEFAULT_ADDRESS);
    if let Err(e) = oled.init(Rotation::Rotate180) {
        error!("SH1106 init failed: {}", Debug2Format(&e));
        park().await;
    }
    let mut display = GraphicsDisplay::new(Framebuffer::new(), oled);
    info!("Display initialized");

    // === CAN controller (SPI0) ===
    let mut spi_config = spi::Config::default();
    spi_config.frequency = CAN_SPI_FREQUENCY;
    let spi_bus = spi::Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let spi_dev = ExclusiveDevice::new_no_delay(spi_bus, cs).unwrap_or_else(|e| match e {});
    let int = Input::new(p.PIN_20, Pull::Up);

    let mut can = Mcp2515::new(spi_dev, int);
    if let Err(e) = can.init(&mut Delay, OSCILLATOR) {
        error!("MCP2515 init failed: {}", Debug2Format(&e));
        park().await;
    }
    info!("MCP2515 listen-only at 500 kbit/s");

    // === Engine ===
    let config = GearViewConfig::new().with_debug_overlay(cfg!(feature = "debug-overlay"));
    let mut view = match GearView::new(config) {
        Ok(view) => view,
        Err(e) => {
            error!("Invalid configuration: {}", Debug2Format(&e));
            park().await
        }
    };

    let clock = EmbassyClock;
    let mut frames_total: u32 = 0;
    let mut last_status_log = Instant::now();
    info!("Main loop starting");

    loop {
        // INT stays low while a receive buffer is full
        if !can.interrupt_pending() {
            Timer::after_millis(1).await;
        }

        let report = view.poll(&mut can, &mut display, &clock);
        frames_total = frames_total.wrapping_add(report.received);

        match report.transition {
            Some(BusTransition::Activated) => info!("CAN bus active"),
            Some(BusTransition::TimedOut { idle_ms }) => {
                warn!("CAN bus silent for {} ms, clearing gear and mode", idle_ms);
            }
            None => {}
        }

        if let Some(e) = report.display_error {
            warn!("Display present failed: {}", e);
        }

        if last_status_log.elapsed() >= STATUS_LOG_INTERVAL {
            let state = view.state();
            info!(
                "STATUS: frames={} rx_errors={} renders={} active={} gear={} mode={}",
                frames_total,
                can.rx_errors(),
                view.compositor().render_count(),
                state.bus_active(),
                state.gear(),
                state.drive_mode()
            );
            last_status_log = Instant::now();
        }
    }
}

/// Host builds only compile the library; the firmware needs the RP2350 target.
#[cfg(not(target_arch = "arm"))]
fn main() {
    eprintln!("gearview-pico2: build for thumbv8m.main-none-eabihf to get the firmware image");
}
