//! Decoded vehicle state.
//!
//! Gear and drive mode are closed enums with a render-time text mapping, so
//! the "symbolic gear overrides mode + number" rule in the compositor is a
//! total match rather than string comparisons.

/// Highest forward gear the TCU reports.
pub const MAX_GEAR: u8 = 8;

// =============================================================================
// Gear
// =============================================================================

/// Selected gear as reported by the TCU.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GearLabel {
    Park,
    Neutral,
    Reverse,
    /// Forward gear, always within `1..=MAX_GEAR`.
    Numeric(u8),
    #[default]
    Unknown,
}

impl GearLabel {
    /// Map the signed gear byte: `-3` N, `-2` R, `-1` P, `1..=8` forward.
    pub const fn from_raw(raw: i8) -> Self {
        match raw {
            1..=8 => Self::Numeric(raw as u8),
            -1 => Self::Park,
            -2 => Self::Reverse,
            -3 => Self::Neutral,
            _ => Self::Unknown,
        }
    }

    /// Forward gear `n`, or `None` outside `1..=MAX_GEAR`.
    pub const fn numeric(n: u8) -> Option<Self> {
        if n >= 1 && n <= MAX_GEAR {
            Some(Self::Numeric(n))
        } else {
            None
        }
    }

    /// Park, Neutral or Reverse.
    #[inline]
    pub const fn is_symbolic(self) -> bool { matches!(self, Self::Park | Self::Neutral | Self::Reverse) }

    /// Display character: letter for symbolic gears, digit for forward gears.
    pub const fn glyph(self) -> Option<char> {
        match self {
            Self::Park => Some('P'),
            Self::Neutral => Some('N'),
            Self::Reverse => Some('R'),
            Self::Numeric(n) if n >= 1 && n <= MAX_GEAR => Some((b'0' + n) as char),
            Self::Numeric(_) | Self::Unknown => None,
        }
    }
}

// =============================================================================
// Drive Mode
// =============================================================================

/// Transmission drive program.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeLabel {
    Drive,
    Sport,
    Manual,
    #[default]
    Unknown,
}

impl ModeLabel {
    /// Map the mode byte: `0` D, `1` S, `2` M.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Drive,
            1 => Self::Sport,
            2 => Self::Manual,
            _ => Self::Unknown,
        }
    }

    /// Display letter, `None` while unknown.
    pub const fn letter(self) -> Option<char> {
        match self {
            Self::Drive => Some('D'),
            Self::Sport => Some('S'),
            Self::Manual => Some('M'),
            Self::Unknown => None,
        }
    }

    #[inline]
    pub const fn is_known(self) -> bool { !matches!(self, Self::Unknown) }
}

// =============================================================================
// Vehicle State
// =============================================================================

/// Everything the overlay knows about the vehicle.
///
/// Temperatures are `None` until their frame has been seen once and then keep
/// their last value for the life of the process, including across bus
/// timeouts. Gear and mode are cleared by the activity monitor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VehicleState {
    gear: GearLabel,
    drive_mode: ModeLabel,
    oil_temp: Option<i16>,
    coolant_temp: Option<i16>,
    tcu_oil_temp: Option<i16>,
    bus_active: bool,
    last_frame_ms: u64,
}

impl VehicleState {
    /// Baseline state: everything unknown, bus inactive.
    pub const fn new() -> Self {
        Self {
            gear: GearLabel::Unknown,
            drive_mode: ModeLabel::Unknown,
            oil_temp: None,
            coolant_temp: None,
            tcu_oil_temp: None,
            bus_active: false,
            last_frame_ms: 0,
        }
    }

    #[inline]
    pub const fn gear(&self) -> GearLabel { self.gear }

    #[inline]
    pub const fn drive_mode(&self) -> ModeLabel { self.drive_mode }

    /// Engine oil temperature in degrees C.
    #[inline]
    pub const fn oil_temp(&self) -> Option<i16> { self.oil_temp }

    /// Coolant temperature in degrees C.
    #[inline]
    pub const fn coolant_temp(&self) -> Option<i16> { self.coolant_temp }

    /// Transmission (TCU) oil temperature in degrees C.
    #[inline]
    pub const fn tcu_oil_temp(&self) -> Option<i16> { self.tcu_oil_temp }

    #[inline]
    pub const fn bus_active(&self) -> bool { self.bus_active }

    /// Time of the last matched frame.
    #[inline]
    pub const fn last_frame_ms(&self) -> u64 { self.last_frame_ms }

    pub(crate) fn set_gear(
        &mut self,
        gear: GearLabel,
    ) {
        self.gear = gear;
    }

    pub(crate) fn set_drive_mode(
        &mut self,
        mode: ModeLabel,
    ) {
        self.drive_mode = mode;
    }

    pub(crate) fn set_oil_temp(
        &mut self,
        temp: i16,
    ) {
        self.oil_temp = Some(temp);
    }

    pub(crate) fn set_coolant_temp(
        &mut self,
        temp: i16,
    ) {
        self.coolant_temp = Some(temp);
    }

    pub(crate) fn set_tcu_oil_temp(
        &mut self,
        temp: i16,
    ) {
        self.tcu_oil_temp = Some(temp);
    }

    pub(crate) fn mark_frame(
        &mut self,
        now_ms: u64,
    ) {
        self.last_frame_ms = now_ms;
        self.bus_active = true;
    }

    /// Bus went quiet: drop gear and mode, keep temperatures.
    pub(crate) fn mark_inactive(&mut self) {
        self.bus_active = false;
        self.gear = GearLabel::Unknown;
        self.drive_mode = ModeLabel::Unknown;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
