//! Raw CAN frame as delivered by the bus controller.
//!
//! [`RawFrame`] is a fixed-size, `Copy` value: identifier, data length code and
//! an 8-byte payload (unused bytes zeroed). It implements
//! [`embedded_can::Frame`] so controller drivers can build it through the
//! standard constructor.

use embedded_can::{ExtendedId, Frame, Id, StandardId};

/// Classic CAN payload capacity.
pub const MAX_DATA_LEN: usize = 8;

/// A received CAN frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame {
    id: u32,
    extended: bool,
    remote: bool,
    dlc: u8,
    data: [u8; MAX_DATA_LEN],
}

impl RawFrame {
    /// Build a data frame from a raw identifier.
    ///
    /// Returns `None` if the identifier does not fit the requested format or
    /// the payload is longer than 8 bytes.
    pub fn from_raw(
        id: u32,
        extended: bool,
        data: &[u8],
    ) -> Option<Self> {
        let id = if extended {
            Id::Extended(ExtendedId::new(id)?)
        } else {
            Id::Standard(StandardId::new(u16::try_from(id).ok()?)?)
        };
        Self::new(id, data)
    }

    /// Build a standard (11-bit) data frame.
    pub fn standard(
        id: u16,
        data: &[u8],
    ) -> Option<Self> {
        Self::new(StandardId::new(id)?, data)
    }

    /// Numeric identifier, regardless of 11/29-bit format.
    #[inline]
    pub const fn identifier(&self) -> u32 { self.id }

    /// Payload byte at `offset`, if the frame carries it.
    #[inline]
    pub const fn byte(
        &self,
        offset: usize,
    ) -> Option<u8> {
        if !self.remote && offset < self.dlc as usize {
            Some(self.data[offset])
        } else {
            None
        }
    }

    /// Payload byte at `offset` reinterpreted as two's complement.
    #[inline]
    pub const fn signed_byte(
        &self,
        offset: usize,
    ) -> Option<i8> {
        match self.byte(offset) {
            Some(b) => Some(b as i8),
            None => None,
        }
    }
}

impl Frame for RawFrame {
    fn new(
        id: impl Into<Id>,
        data: &[u8],
    ) -> Option<Self> {
        if data.len() > MAX_DATA_LEN {
            return None;
        }
        let (id, extended) = split_id(id.into());
        let mut payload = [0u8; MAX_DATA_LEN];
        payload[..data.len()].copy_from_slice(data);
        Some(Self {
            id,
            extended,
            remote: false,
            dlc: data.len() as u8,
            data: payload,
        })
    }

    fn new_remote(
        id: impl Into<Id>,
        dlc: usize,
    ) -> Option<Self> {
        if dlc > MAX_DATA_LEN {
            return None;
        }
        let (id, extended) = split_id(id.into());
        Some(Self {
            id,
            extended,
            remote: true,
            dlc: dlc as u8,
            data: [0u8; MAX_DATA_LEN],
        })
    }

    fn is_extended(&self) -> bool { self.extended }

    fn is_remote_frame(&self) -> bool { self.remote }

    fn id(&self) -> Id {
        if self.extended {
            ExtendedId::new(self.id).map_or(Id::Standard(StandardId::ZERO), Id::Extended)
        } else {
            StandardId::new(self.id as u16).map_or(Id::Standard(StandardId::ZERO), Id::Standard)
        }
    }

    fn dlc(&self) -> usize { self.dlc as usize }

    fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..self.dlc as usize]
        }
    }
}

fn split_id(id: Id) -> (u32, bool) {
    match id {
        Id::Standard(id) => (u32::from(id.as_raw()), false),
        Id::Extended(id) => (id.as_raw(), true),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
