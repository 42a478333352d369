//! GearView simulator for desktop.
//!
//! Replays a candump log (or a built-in drive) through the same engine the
//! firmware runs, on a simulated millisecond clock, and prints every frame the
//! display presents as ASCII art.
//!
//! ```bash
//! cargo run -p gearview-simulator -- --log drive.log --debug-overlay
//! ```

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

mod ascii;
mod candump;
mod replay;
mod scenario;
mod timing;

use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use gearview_common::{
    BusTransition,
    Clock,
    Framebuffer,
    GearView,
    GearViewConfig,
    GraphicsDisplay,
    ManualClock,
    TimeoutPolicy,
};

use crate::ascii::AsciiPresenter;
use crate::replay::ReplayBus;
use crate::timing::{TAIL, TICK};

/// GearView simulator - replay CAN traffic through the overlay engine
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "Replay CAN traffic through the GearView overlay", long_about = None)]
#[command(version)]
struct Args {
    /// candump log (`candump -l` format); omit for the built-in drive
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Base identifier of the gear/mode messages (hex)
    #[arg(long, value_name = "HEX", value_parser = parse_hex_id)]
    base_id: Option<u32>,

    /// Blank the whole screen while the bus is inactive
    #[arg(long)]
    blank_on_timeout: bool,

    /// Show the FPS/spinner line
    #[arg(long)]
    debug_overlay: bool,

    /// Sleep one tick per simulated millisecond
    #[arg(long)]
    realtime: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors and frames
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    log::info!("GearView simulator v{}", env!("CARGO_PKG_VERSION"));

    let mut config = GearViewConfig::new().with_debug_overlay(args.debug_overlay);
    if let Some(base_id) = args.base_id {
        config = config.with_base_id(base_id);
    }
    if args.blank_on_timeout {
        config = config.with_timeout_policy(TimeoutPolicy::BlankScreen);
    }
    let mut view = GearView::new(config).context("invalid configuration")?;

    let frames = match &args.log {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            let frames = candump::parse_log(&text, 0).with_context(|| format!("parsing {}", path.display()))?;
            log::info!("Loaded {} frames from {}", frames.len(), path.display());
            frames
        }
        None => {
            let frames = scenario::drive(&config, 0);
            log::info!("Using built-in drive ({} frames)", frames.len());
            frames
        }
    };

    let mut bus = ReplayBus::new(frames);
    let end_ms = bus.last_frame_ms().unwrap_or(0) + TAIL.as_millis() as u64;
    let mut display = GraphicsDisplay::new(Framebuffer::new(), AsciiPresenter::new());
    let clock = ManualClock::new(0);
    let tick_ms = TICK.as_millis() as u64;

    while clock.now_ms() <= end_ms {
        let now_ms = clock.now_ms();
        bus.advance_to(now_ms);

        let report = view.poll(&mut bus, &mut display, &clock);
        match report.transition {
            Some(BusTransition::Activated) => log::info!("[{now_ms:>6} ms] CAN bus active"),
            Some(BusTransition::TimedOut { idle_ms }) => {
                log::warn!("[{now_ms:>6} ms] CAN bus silent for {idle_ms} ms, clearing gear and mode");
            }
            None => {}
        }
        if let Some(e) = report.display_error {
            log::warn!("[{now_ms:>6} ms] display present failed: {e:?}");
        }
        if report.matched > 0 {
            log::debug!("[{now_ms:>6} ms] {} frames, {} matched", report.received, report.matched);
        }

        if let Some(art) = display.presenter_mut().take_changed() {
            let state = view.state();
            println!(
                "t={now_ms} ms  gear={:?} mode={:?} oil={:?} coolant={:?} tcu={:?}",
                state.gear(),
                state.drive_mode(),
                state.oil_temp(),
                state.coolant_temp(),
                state.tcu_oil_temp()
            );
            println!("{art}");
        }

        if args.realtime {
            thread::sleep(TICK);
        }
        clock.advance(tick_ms);
    }

    log::info!(
        "Done: {} frames delivered, {} presents, {} renders",
        bus.delivered(),
        display.presenter().presents(),
        view.compositor().render_count()
    );
    if !bus.is_exhausted() {
        log::warn!("Replay ended with frames still queued");
    }
    Ok(())
}

fn parse_hex_id(text: &str) -> Result<u32, String> {
    let digits = text.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|e| format!("`{text}` is not a hex identifier: {e}"))
}

fn init_logging(
    verbose: u8,
    quiet: bool,
) {
    use std::io::Write;

    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args()))
        .init();
}
