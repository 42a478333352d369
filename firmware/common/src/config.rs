//! Engine configuration.
//!
//! All defaults are compile-time constants with validation assertions, gathered
//! into a [`GearViewConfig`] value that the engine is built from. The constants
//! mirror the vehicle's signal definitions and must stay bit-exact.
//!
//! # Compile-Time Validation
//!
//! The decode table requires the four identifiers to be distinct. The `const`
//! assertions below fail the build if the defaults ever overlap; runtime
//! overrides go through [`GearViewConfig::validate`].

use core::fmt;

// =============================================================================
// CAN Identifiers
// =============================================================================

/// Base identifier of the TCU broadcast block.
pub const CAN_BASE_ID: u32 = 0x5F0;

/// Gear frame offset from the base identifier.
pub const GEAR_ID_OFFSET: u32 = 2;

/// Drive mode / TCU oil temperature frame offset from the base identifier.
pub const MODE_ID_OFFSET: u32 = 5;

/// Engine oil temperature frame (fixed, not relative to the base).
pub const OIL_TEMP_ID: u32 = 0x545;

/// Coolant temperature frame (fixed, not relative to the base).
pub const COOLANT_TEMP_ID: u32 = 0x329;

/// Largest valid 29-bit extended identifier.
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

const _: () = assert!(CAN_BASE_ID + GEAR_ID_OFFSET != OIL_TEMP_ID);
const _: () = assert!(CAN_BASE_ID + GEAR_ID_OFFSET != COOLANT_TEMP_ID);
const _: () = assert!(CAN_BASE_ID + MODE_ID_OFFSET != OIL_TEMP_ID);
const _: () = assert!(CAN_BASE_ID + MODE_ID_OFFSET != COOLANT_TEMP_ID);
const _: () = assert!(OIL_TEMP_ID != COOLANT_TEMP_ID);
const _: () = assert!(GEAR_ID_OFFSET != MODE_ID_OFFSET);

// =============================================================================
// Timing
// =============================================================================

/// Idle time after which the bus is considered inactive.
pub const BUS_TIMEOUT_MS: u64 = 1000;

/// Minimum time between two display refreshes (8 FPS).
pub const DISPLAY_REFRESH_MS: u64 = 125;

const _: () = assert!(BUS_TIMEOUT_MS > 0);
const _: () = assert!(DISPLAY_REFRESH_MS > 0);

// =============================================================================
// Signal Scaling
// =============================================================================

/// Offset subtracted from raw temperature bytes (degrees C).
pub const TEMP_OFFSET: i16 = 48;

/// Coolant temperature resolution (degrees per bit).
pub const COOLANT_TEMP_SCALE: f32 = 0.75;

// =============================================================================
// Runtime Configuration
// =============================================================================

/// What the screen shows while the bus is inactive.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutPolicy {
    /// Gear and mode are cleared, temperatures keep their last values.
    #[default]
    KeepTemperatures,
    /// Nothing but the optional debug line is drawn until frames return.
    BlankScreen,
}

/// Complete configuration of the decode-and-refresh engine.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GearViewConfig {
    /// Base identifier `B`; gear is `B+2`, mode is `B+5`.
    pub base_id: u32,
    /// Engine oil temperature identifier.
    pub oil_temp_id: u32,
    /// Coolant temperature identifier.
    pub coolant_temp_id: u32,
    /// Bus inactivity timeout.
    pub bus_timeout_ms: u64,
    /// Display refresh interval.
    pub refresh_interval_ms: u64,
    /// Temperature decode offset.
    pub temp_offset: i16,
    /// Coolant temperature scale.
    pub coolant_scale: f32,
    /// Screen behaviour while the bus is inactive.
    pub timeout_policy: TimeoutPolicy,
    /// Draw the FPS/spinner line at the bottom of the screen.
    pub debug_overlay: bool,
}

impl GearViewConfig {
    /// Configuration matching the vehicle's signal definitions.
    pub const fn new() -> Self {
        Self {
            base_id: CAN_BASE_ID,
            oil_temp_id: OIL_TEMP_ID,
            coolant_temp_id: COOLANT_TEMP_ID,
            bus_timeout_ms: BUS_TIMEOUT_MS,
            refresh_interval_ms: DISPLAY_REFRESH_MS,
            temp_offset: TEMP_OFFSET,
            coolant_scale: COOLANT_TEMP_SCALE,
            timeout_policy: TimeoutPolicy::KeepTemperatures,
            debug_overlay: false,
        }
    }

    #[must_use]
    pub const fn with_base_id(
        mut self,
        base_id: u32,
    ) -> Self {
        self.base_id = base_id;
        self
    }

    #[must_use]
    pub const fn with_bus_timeout_ms(
        mut self,
        timeout_ms: u64,
    ) -> Self {
        self.bus_timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub const fn with_refresh_interval_ms(
        mut self,
        interval_ms: u64,
    ) -> Self {
        self.refresh_interval_ms = interval_ms;
        self
    }

    #[must_use]
    pub const fn with_timeout_policy(
        mut self,
        policy: TimeoutPolicy,
    ) -> Self {
        self.timeout_policy = policy;
        self
    }

    #[must_use]
    pub const fn with_debug_overlay(
        mut self,
        enabled: bool,
    ) -> Self {
        self.debug_overlay = enabled;
        self
    }

    /// Gear frame identifier (`B+2`).
    #[inline]
    pub const fn gear_id(&self) -> u32 { self.base_id.wrapping_add(GEAR_ID_OFFSET) }

    /// Drive mode frame identifier (`B+5`).
    #[inline]
    pub const fn mode_id(&self) -> u32 { self.base_id.wrapping_add(MODE_ID_OFFSET) }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_id > MAX_EXTENDED_ID - MODE_ID_OFFSET
            || self.oil_temp_id > MAX_EXTENDED_ID
            || self.coolant_temp_id > MAX_EXTENDED_ID
        {
            return Err(ConfigError::IdentifierOutOfRange);
        }

        let ids = [self.gear_id(), self.mode_id(), self.oil_temp_id, self.coolant_temp_id];
        for (i, a) in ids.iter().enumerate() {
            if ids[i + 1..].contains(a) {
                return Err(ConfigError::OverlappingIdentifiers(*a));
            }
        }

        if self.bus_timeout_ms == 0 {
            return Err(ConfigError::ZeroBusTimeout);
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::ZeroRefreshInterval);
        }
        if !self.coolant_scale.is_finite() || self.coolant_scale <= 0.0 {
            return Err(ConfigError::InvalidCoolantScale);
        }

        // Every raw byte must decode to a temperature that fits in i16.
        let max_scaled = micromath::F32Ext::round(f32::from(u8::MAX) * self.coolant_scale);
        if max_scaled > f32::from(i16::MAX) {
            return Err(ConfigError::TemperatureRange);
        }
        let offset = i32::from(self.temp_offset);
        let highest = i32::from(u8::MAX).max(max_scaled as i32) - offset;
        let lowest = -offset;
        if i16::try_from(highest).is_err() || i16::try_from(lowest).is_err() {
            return Err(ConfigError::TemperatureRange);
        }

        Ok(())
    }
}

impl Default for GearViewConfig {
    fn default() -> Self { Self::new() }
}

/// Rejected configuration.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Two decode rules would share this identifier.
    OverlappingIdentifiers(u32),
    /// An identifier does not fit in 29 bits.
    IdentifierOutOfRange,
    /// Bus timeout of zero would flip to inactive on every tick.
    ZeroBusTimeout,
    /// Refresh interval of zero would render on every tick.
    ZeroRefreshInterval,
    /// Coolant scale must be finite and positive.
    InvalidCoolantScale,
    /// Offset and scale would decode some raw byte outside `i16`.
    TemperatureRange,
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::OverlappingIdentifiers(id) => write!(f, "identifier {id:#X} used by two decode rules"),
            Self::IdentifierOutOfRange => f.write_str("identifier exceeds 29 bits"),
            Self::ZeroBusTimeout => f.write_str("bus timeout must be non-zero"),
            Self::ZeroRefreshInterval => f.write_str("refresh interval must be non-zero"),
            Self::InvalidCoolantScale => f.write_str("coolant scale must be finite and positive"),
            Self::TemperatureRange => f.write_str("temperature offset and scale overflow i16"),
        }
    }
}

impl core::error::Error for ConfigError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identifiers() {
        let config = GearViewConfig::new();
        assert_eq!(config.gear_id(), 0x5F2);
        assert_eq!(config.mode_id(), 0x5F5);
        assert_eq!(config.oil_temp_id, 0x545);
        assert_eq!(config.coolant_temp_id, 0x329);
    }

    #[test]
    fn test_default_is_valid() {
        assert_eq!(GearViewConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_timing() {
        let config = GearViewConfig::new();
        assert_eq!(config.bus_timeout_ms, 1000);
        assert_eq!(config.refresh_interval_ms, 125);
        assert_eq!(config.temp_offset, 48);
        assert_eq!(config.coolant_scale, 0.75);
        assert_eq!(config.timeout_policy, TimeoutPolicy::KeepTemperatures);
        assert!(!config.debug_overlay);
    }

    #[test]
    fn test_overlapping_base_rejected() {
        // 0x540 + 5 lands on the oil temperature frame
        let config = GearViewConfig::new().with_base_id(0x540);
        assert_eq!(config.validate(), Err(ConfigError::OverlappingIdentifiers(0x545)));
    }

    #[test]
    fn test_base_out_of_range_rejected() {
        let config = GearViewConfig::new().with_base_id(MAX_EXTENDED_ID);
        assert_eq!(config.validate(), Err(ConfigError::IdentifierOutOfRange));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        assert_eq!(
            GearViewConfig::new().with_bus_timeout_ms(0).validate(),
            Err(ConfigError::ZeroBusTimeout)
        );
        assert_eq!(
            GearViewConfig::new().with_refresh_interval_ms(0).validate(),
            Err(ConfigError::ZeroRefreshInterval)
        );
    }

    #[test]
    fn test_bad_coolant_scale_rejected() {
        let mut config = GearViewConfig::new();
        config.coolant_scale = f32::NAN;
        assert_eq!(config.validate(), Err(ConfigError::InvalidCoolantScale));
        config.coolant_scale = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidCoolantScale));
    }

    #[test]
    fn test_temperature_range_rejected() {
        let mut config = GearViewConfig::new();
        config.temp_offset = i16::MIN;
        assert_eq!(config.validate(), Err(ConfigError::TemperatureRange));

        let mut config = GearViewConfig::new();
        config.temp_offset = i16::MAX;
        assert_eq!(config.validate(), Ok(()));

        let mut config = GearViewConfig::new();
        config.coolant_scale = 200.0;
        assert_eq!(config.validate(), Err(ConfigError::TemperatureRange));

        // 255 * 128 = 32640, then +200 leaves i16
        let mut config = GearViewConfig::new();
        config.coolant_scale = 128.0;
        config.temp_offset = -200;
        assert_eq!(config.validate(), Err(ConfigError::TemperatureRange));
        config.temp_offset = 0;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_error_display() {
        let msg = ConfigError::OverlappingIdentifiers(0x545).to_string();
        assert_eq!(msg, "identifier 0x545 used by two decode rules");
    }
}
