//! Frame decoder: identifier-to-rule table.
//!
//! | Identifier | Field(s)               | Bytes                          | Conversion                  |
//! |------------|------------------------|--------------------------------|-----------------------------|
//! | `B+2`      | gear                   | `i8` @2                        | [`GearLabel::from_raw`]     |
//! | `B+5`      | drive mode, TCU oil    | mode `u8` @3, temp `i8` @2     | [`ModeLabel::from_raw`]     |
//! | `0x545`    | engine oil temperature | `u8` @4                        | `byte - 48`                 |
//! | `0x329`    | coolant temperature    | `u8` @1                        | `round(byte * 0.75) - 48`   |
//!
//! Identifiers are compared numerically. Anything outside the table, remote
//! frames and payloads too short for the rule's offsets decode to `None`.

use crate::config::GearViewConfig;
use crate::frame::RawFrame;
use crate::vehicle::{GearLabel, ModeLabel, VehicleState};

/// Number of entries in the decode table.
pub const RULE_COUNT: usize = 4;

const GEAR_BYTE: usize = 2;
const TCU_TEMP_BYTE: usize = 2;
const MODE_BYTE: usize = 3;
const OIL_TEMP_BYTE: usize = 4;
const COOLANT_TEMP_BYTE: usize = 1;

/// Which signal layout an identifier carries.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rule {
    Gear,
    ModeAndTcuTemp,
    OilTemp,
    CoolantTemp,
}

/// Result of decoding one matched frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldUpdate {
    Gear(GearLabel),
    ModeAndTcuTemp { mode: ModeLabel, tcu_oil_temp: i16 },
    OilTemp(i16),
    CoolantTemp(i16),
}

/// Stateless decoder built from the identifier configuration.
#[derive(Clone, Copy, Debug)]
pub struct FrameDecoder {
    rules: [(u32, Rule); RULE_COUNT],
    temp_offset: i16,
    coolant_scale: f32,
}

impl FrameDecoder {
    pub const fn new(config: &GearViewConfig) -> Self {
        Self {
            rules: [
                (config.gear_id(), Rule::Gear),
                (config.mode_id(), Rule::ModeAndTcuTemp),
                (config.oil_temp_id, Rule::OilTemp),
                (config.coolant_temp_id, Rule::CoolantTemp),
            ],
            temp_offset: config.temp_offset,
            coolant_scale: config.coolant_scale,
        }
    }

    /// Rule registered for `id`, if any.
    pub fn rule_for(
        &self,
        id: u32,
    ) -> Option<Rule> {
        self.rules.iter().find(|(rule_id, _)| *rule_id == id).map(|(_, rule)| *rule)
    }

    /// Decode a frame without touching any state.
    pub fn decode(
        &self,
        frame: &RawFrame,
    ) -> Option<FieldUpdate> {
        match self.rule_for(frame.identifier())? {
            Rule::Gear => Some(FieldUpdate::Gear(GearLabel::from_raw(frame.signed_byte(GEAR_BYTE)?))),
            Rule::ModeAndTcuTemp => {
                let tcu = frame.signed_byte(TCU_TEMP_BYTE)?;
                let mode = frame.byte(MODE_BYTE)?;
                Some(FieldUpdate::ModeAndTcuTemp {
                    mode: ModeLabel::from_raw(mode),
                    tcu_oil_temp: i16::from(tcu),
                })
            }
            Rule::OilTemp => Some(FieldUpdate::OilTemp(self.oil_temp(frame.byte(OIL_TEMP_BYTE)?))),
            Rule::CoolantTemp => Some(FieldUpdate::CoolantTemp(
                self.coolant_temp(frame.byte(COOLANT_TEMP_BYTE)?),
            )),
        }
    }

    /// Write a decoded update into the vehicle state.
    pub fn apply(
        state: &mut VehicleState,
        update: FieldUpdate,
    ) {
        match update {
            FieldUpdate::Gear(gear) => state.set_gear(gear),
            FieldUpdate::ModeAndTcuTemp { mode, tcu_oil_temp } => {
                state.set_drive_mode(mode);
                state.set_tcu_oil_temp(tcu_oil_temp);
            }
            FieldUpdate::OilTemp(temp) => state.set_oil_temp(temp),
            FieldUpdate::CoolantTemp(temp) => state.set_coolant_temp(temp),
        }
    }

    /// `byte - offset`
    #[inline]
    pub fn oil_temp(
        &self,
        raw: u8,
    ) -> i16 {
        i16::from(raw).saturating_sub(self.temp_offset)
    }

    /// `round(byte * scale) - offset`
    #[inline]
    pub fn coolant_temp(
        &self,
        raw: u8,
    ) -> i16 {
        let scaled = micromath::F32Ext::round(f32::from(raw) * self.coolant_scale);
        (scaled as i16).saturating_sub(self.temp_offset)
    }
}

impl Default for FrameDecoder {
    fn default() -> Self { Self::new(&GearViewConfig::new()) }
}

// =============================================================================
// Unit Tests
// =============================================================================
