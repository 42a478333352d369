//! Listen-only MCP2515 CAN controller driver over SPI.
//!
//! Only the receive path is implemented: the overlay never transmits. After
//! [`Mcp2515::init`] the controller acknowledges nothing on the bus and both
//! receive buffers accept every frame, with RXB0 rolling over into RXB1.
//!
//! The INT pin (active low) stays asserted while either receive buffer holds
//! an unread frame, so it doubles as the activity alert.
//!
//! # Wiring (Pico 2)
//!
//! | MCP2515 | Pico 2        |
//! |---------|---------------|
//! | SCK     | GPIO18 (SPI0) |
//! | SI      | GPIO19 (SPI0) |
//! | SO      | GPIO16 (SPI0) |
//! | CS      | GPIO17        |
//! | INT     | GPIO20        |

use embedded_can::{ExtendedId, Frame, Id, StandardId};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use embedded_hal::spi::{Operation, SpiDevice};
use gearview_common::{CanBus, RawFrame};

// =============================================================================
// Instructions & Registers
// =============================================================================

mod instruction {
    pub const RESET: u8 = 0xC0;
    pub const READ: u8 = 0x03;
    pub const WRITE: u8 = 0x02;
    pub const BIT_MODIFY: u8 = 0x05;
    pub const READ_STATUS: u8 = 0xA0;
    /// Read RX buffer starting at RXBnSIDH; clears RXnIF when CS goes high.
    pub const READ_RX_BUFFER_0: u8 = 0x90;
    pub const READ_RX_BUFFER_1: u8 = 0x94;
}

mod reg {
    pub const CANSTAT: u8 = 0x0E;
    pub const CANCTRL: u8 = 0x0F;
    pub const CNF3: u8 = 0x28;
    pub const CANINTE: u8 = 0x2B;
    pub const CANINTF: u8 = 0x2C;
    pub const RXB0CTRL: u8 = 0x60;
    pub const RXB1CTRL: u8 = 0x70;
}

/// REQOP/OPMOD field in CANCTRL/CANSTAT.
const MODE_MASK: u8 = 0xE0;

/// RXM = 11: receive any message, filters off.
const RXM_ANY: u8 = 0x60;
/// RXB0CTRL.BUKT: roll over into RXB1 when RXB0 is full.
const BUKT: u8 = 0x04;

const RX0IF: u8 = 0x01;
const RX1IF: u8 = 0x02;

/// SIDL.IDE
const SIDL_IDE: u8 = 0x08;
/// SIDL.SRR, standard remote request
const SIDL_SRR: u8 = 0x10;
/// DLC.RTR, extended remote request
const DLC_RTR: u8 = 0x40;

/// SIDH, SIDL, EID8, EID0, DLC, D0..D7
const RX_BUFFER_LEN: usize = 13;

/// CANSTAT reads before a mode request counts as failed.
const MODE_POLL_ATTEMPTS: u32 = 10;

/// Oscillator start-up after reset (datasheet: 128 OSC1 cycles).
const RESET_DELAY_US: u32 = 100;

// =============================================================================
// Configuration
// =============================================================================

/// Operating mode as encoded in REQOP/OPMOD.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperationMode {
    Normal = 0x00,
    Sleep = 0x20,
    Loopback = 0x40,
    ListenOnly = 0x60,
    Configuration = 0x80,
}

impl OperationMode {
    #[inline]
    pub const fn bits(self) -> u8 { self as u8 }
}

/// Crystal fitted to the MCP2515 module.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Oscillator {
    Mhz8,
    Mhz16,
}

impl Oscillator {
    /// CNF3, CNF2, CNF1 for 500 kbit/s, in register address order.
    pub const fn cnf_500kbps(self) -> [u8; 3] {
        match self {
            // 8 TQ: sync 1, prop 1, PS1 3, PS2 3, BRP 0
            Self::Mhz8 => [0x82, 0x90, 0x00],
            // 16 TQ: sync 1, prop 1, PS1 7, PS2 7, BRP 0
            Self::Mhz16 => [0x86, 0xF0, 0x00],
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mcp2515Error<E> {
    /// SPI transfer failed.
    Spi(E),
    /// CANSTAT never reported the requested mode.
    ModeNotEntered {
        requested: OperationMode,
        canstat: u8,
    },
}

impl<E> From<E> for Mcp2515Error<E> {
    fn from(e: E) -> Self { Self::Spi(e) }
}

// =============================================================================
// Driver
// =============================================================================

pub struct Mcp2515<SPI, INT> {
    spi: SPI,
    int: INT,
    rx_errors: u32,
}

impl<SPI, INT> Mcp2515<SPI, INT>
where
    SPI: SpiDevice,
    INT: InputPin,
{
    pub fn new(
        spi: SPI,
        int: INT,
    ) -> Self {
        Self {
            spi,
            int,
            rx_errors: 0,
        }
    }

    /// Reset, program 500 kbit/s timing, accept all frames and enter
    /// listen-only mode.
    pub fn init<D: DelayNs>(
        &mut self,
        delay: &mut D,
        oscillator: Oscillator,
    ) -> Result<(), Mcp2515Error<SPI::Error>> {
        self.spi.write(&[instruction::RESET])?;
        delay.delay_us(RESET_DELAY_US);
        self.set_mode(OperationMode::Configuration, delay)?;

        // CNF3..CNF1 are consecutive, written in one burst
        let [cnf3, cnf2, cnf1] = oscillator.cnf_500kbps();
        self.spi.write(&[instruction::WRITE, reg::CNF3, cnf3, cnf2, cnf1])?;

        self.write_register(reg::RXB0CTRL, RXM_ANY | BUKT)?;
        self.write_register(reg::RXB1CTRL, RXM_ANY)?;
        self.write_register(reg::CANINTF, 0)?;
        self.write_register(reg::CANINTE, RX0IF | RX1IF)?;

        self.set_mode(OperationMode::ListenOnly, delay)
    }

    /// Request `mode` and wait until CANSTAT confirms it.
    pub fn set_mode<D: DelayNs>(
        &mut self,
        mode: OperationMode,
        delay: &mut D,
    ) -> Result<(), Mcp2515Error<SPI::Error>> {
        self.spi.write(&[instruction::BIT_MODIFY, reg::CANCTRL, MODE_MASK, mode.bits()])?;

        let mut canstat = 0;
        for _ in 0..MODE_POLL_ATTEMPTS {
            canstat = self.read_register(reg::CANSTAT)?;
            if canstat & MODE_MASK == mode.bits() {
                return Ok(());
            }
            delay.delay_us(100);
        }
        Err(Mcp2515Error::ModeNotEntered {
            requested: mode,
            canstat,
        })
    }

    /// Pop the next frame from RXB0, then RXB1.
    pub fn receive(&mut self) -> Result<Option<RawFrame>, Mcp2515Error<SPI::Error>> {
        let status = self.read_status()?;
        let read_cmd = if status & RX0IF != 0 {
            instruction::READ_RX_BUFFER_0
        } else if status & RX1IF != 0 {
            instruction::READ_RX_BUFFER_1
        } else {
            return Ok(None);
        };

        let mut buf = [0u8; RX_BUFFER_LEN];
        self.spi.transaction(&mut [Operation::Write(&[read_cmd]), Operation::Read(&mut buf)])?;
        Ok(parse_rx_buffer(&buf))
    }

    /// Whether INT is asserted. A pin read error counts as asserted.
    pub fn interrupt_pending(&mut self) -> bool { self.int.is_low().unwrap_or(true) }

    /// SPI errors swallowed by the [`CanBus`] receive path.
    #[inline]
    pub const fn rx_errors(&self) -> u32 { self.rx_errors }

    pub fn read_register(
        &mut self,
        address: u8,
    ) -> Result<u8, SPI::Error> {
        let mut value = [0u8];
        self.spi
            .transaction(&mut [Operation::Write(&[instruction::READ, address]), Operation::Read(&mut value)])?;
        Ok(value[0])
    }

    fn write_register(
        &mut self,
        address: u8,
        value: u8,
    ) -> Result<(), SPI::Error> {
        self.spi.write(&[instruction::WRITE, address, value])
    }

    fn read_status(&mut self) -> Result<u8, SPI::Error> {
        let mut status = [0u8];
        self.spi
            .transaction(&mut [Operation::Write(&[instruction::READ_STATUS]), Operation::Read(&mut status)])?;
        Ok(status[0])
    }
}

impl<SPI, INT> CanBus for Mcp2515<SPI, INT>
where
    SPI: SpiDevice,
    INT: InputPin,
{
    fn try_receive_frame(&mut self) -> Option<RawFrame> {
        match self.receive() {
            Ok(frame) => frame,
            Err(_) => {
                self.rx_errors = self.rx_errors.wrapping_add(1);
                None
            }
        }
    }

    fn has_activity_alert(&mut self) -> bool { self.interrupt_pending() }
}

/// Decode the 13-byte RXBn register image.
fn parse_rx_buffer(buf: &[u8; RX_BUFFER_LEN]) -> Option<RawFrame> {
    let [sidh, sidl, eid8, eid0, dlc] = [buf[0], buf[1], buf[2], buf[3], buf[4]];
    let sid = (u16::from(sidh) << 3) | u16::from(sidl >> 5);
    let len = usize::from(dlc & 0x0F).min(8);

    let (id, remote) = if sidl & SIDL_IDE != 0 {
        let eid = (u32::from(sid) << 18)
            | (u32::from(sidl & 0x03) << 16)
            | (u32::from(eid8) << 8)
            | u32::from(eid0);
        (Id::Extended(ExtendedId::new(eid)?), dlc & DLC_RTR != 0)
    } else {
        (Id::Standard(StandardId::new(sid)?), sidl & SIDL_SRR != 0)
    };

    if remote {
        RawFrame::new_remote(id, len)
    } else {
        RawFrame::new(id, &buf[5..5 + len])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
