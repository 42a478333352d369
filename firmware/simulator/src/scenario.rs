//! Built-in drive used when no candump log is given.
//!
//! Park with a cold engine, pull away in D and shift up to 4th, switch to
//! sport, go silent long enough to trip the bus timeout, then come back.

use gearview_common::{GearViewConfig, RawFrame};

use crate::candump::TimedFrame;

/// Broadcast period of every message in the scripted drive.
const PERIOD_MS: u64 = 100;

/// One scripted phase: what the car reports and for how long.
struct Phase {
    duration_ms: u64,
    gear: i8,
    mode: u8,
    oil_c: i16,
    coolant_c: i16,
    tcu_c: i8,
}

const PHASES: &[Phase] = &[
    Phase { duration_ms: 1_500, gear: -1, mode: 0, oil_c: 40, coolant_c: 35, tcu_c: 30 },
    Phase { duration_ms: 1_000, gear: 1, mode: 0, oil_c: 55, coolant_c: 50, tcu_c: 35 },
    Phase { duration_ms: 1_000, gear: 2, mode: 0, oil_c: 70, coolant_c: 65, tcu_c: 42 },
    Phase { duration_ms: 1_000, gear: 3, mode: 0, oil_c: 85, coolant_c: 80, tcu_c: 50 },
    Phase { duration_ms: 1_500, gear: 4, mode: 0, oil_c: 100, coolant_c: 90, tcu_c: 60 },
    Phase { duration_ms: 1_500, gear: 3, mode: 1, oil_c: 110, coolant_c: 92, tcu_c: 75 },
    Phase { duration_ms: 1_000, gear: -3, mode: 0, oil_c: 105, coolant_c: 91, tcu_c: 72 },
];

/// Silence after the phases, longer than the bus timeout.
const SILENCE_MS: u64 = 2_000;

/// Frames for the whole drive, starting at `start_ms`.
pub fn drive(
    config: &GearViewConfig,
    start_ms: u64,
) -> Vec<TimedFrame> {
    let mut frames = Vec::new();
    let mut now = start_ms;

    for phase in PHASES {
        emit_phase(config, phase, now, &mut frames);
        now += phase.duration_ms;
    }

    // Bus goes quiet, then the car wakes up again in park
    now += SILENCE_MS;
    if let Some(last) = PHASES.last() {
        let wake = Phase { duration_ms: 1_000, gear: -1, ..*last };
        emit_phase(config, &wake, now, &mut frames);
    }
    frames
}

fn emit_phase(
    config: &GearViewConfig,
    phase: &Phase,
    start_ms: u64,
    frames: &mut Vec<TimedFrame>,
) {
    let oil_raw = encode_oil(phase.oil_c, config);
    let coolant_raw = encode_coolant(phase.coolant_c, config);

    for at_ms in (start_ms..start_ms + phase.duration_ms).step_by(PERIOD_MS as usize) {
        let messages = [
            (config.gear_id(), [0, 0, phase.gear as u8, 0, 0, 0, 0, 0]),
            (config.mode_id(), [0, 0, phase.tcu_c as u8, phase.mode, 0, 0, 0, 0]),
            (config.oil_temp_id, [0, 0, 0, 0, oil_raw, 0, 0, 0]),
            (config.coolant_temp_id, [0, coolant_raw, 0, 0, 0, 0, 0, 0]),
        ];
        for (id, data) in messages {
            if let Some(frame) = RawFrame::from_raw(id, id > 0x7FF, &data) {
                frames.push(TimedFrame { at_ms, frame });
            }
        }
    }
}

/// Inverse of `byte - offset`.
fn encode_oil(
    celsius: i16,
    config: &GearViewConfig,
) -> u8 {
    (celsius + config.temp_offset).clamp(0, 255) as u8
}

/// Inverse of `round(byte * scale) - offset`.
fn encode_coolant(
    celsius: i16,
    config: &GearViewConfig,
) -> u8 {
    let scaled = f32::from(celsius + config.temp_offset) / config.coolant_scale;
    scaled.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use gearview_common::FrameDecoder;

    use super::*;

    #[test]
    fn test_drive_is_sorted_and_has_gap() {
        let config = GearViewConfig::new();
        let frames = drive(&config, 0);
        assert!(frames.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));

        let max_gap = frames.windows(2).map(|w| w[1].at_ms - w[0].at_ms).max().unwrap();
        assert!(max_gap > config.bus_timeout_ms);
    }

    #[test]
    fn test_encoded_temperatures_decode_back() {
        let config = GearViewConfig::new();
        let decoder = FrameDecoder::new(&config);
        for celsius in [35, 50, 90, 114] {
            assert_eq!(decoder.oil_temp(encode_oil(celsius, &config)), celsius);
            assert_eq!(decoder.coolant_temp(encode_coolant(celsius, &config)), celsius);
        }
    }
}
