//! SH1106 128x64 OLED driver over I2C.
//!
//! The controller has 132 columns of RAM; a 128-pixel panel is wired to
//! columns 2..130. The shared [`Framebuffer`] is already in page order, so a
//! flush is eight page-address commands each followed by one 128-byte data
//! write.

use embedded_hal::i2c::I2c;
use gearview_common::framebuffer::{PAGES, WIDTH};
use gearview_common::{Framebuffer, Present};

/// Default 7-bit address (SA0 low).
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// First visible RAM column.
pub const COLUMN_OFFSET: u8 = 2;

/// I2C control bytes.
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// Command bytes sent per I2C transfer, after the control byte.
const COMMAND_CHUNK: usize = 31;

mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SEG_REMAP_OFF: u8 = 0xA0;
    pub const SEG_REMAP_ON: u8 = 0xA1;
    pub const COM_SCAN_INC: u8 = 0xC0;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Panel orientation, applied in hardware through segment/COM remap.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Rotation {
    #[default]
    Normal,
    /// Upside down, for a panel mounted with the ribbon on top.
    Rotate180,
}

impl Rotation {
    const fn remap(self) -> [u8; 2] {
        match self {
            Self::Normal => [cmd::SEG_REMAP_ON, cmd::COM_SCAN_DEC],
            Self::Rotate180 => [cmd::SEG_REMAP_OFF, cmd::COM_SCAN_INC],
        }
    }
}

pub struct Sh1106<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Sh1106<I2C> {
    pub const fn new(
        i2c: I2C,
        address: u8,
    ) -> Self {
        Self { i2c, address }
    }

    /// Send the power-up sequence and switch the panel on.
    pub fn init(
        &mut self,
        rotation: Rotation,
    ) -> Result<(), I2C::Error> {
        let [seg, com] = rotation.remap();
        self.commands(&[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80,
            cmd::SET_MUX_RATIO,
            0x3F,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14,
            seg,
            com,
            cmd::SET_COM_PINS,
            0x12,
            cmd::SET_CONTRAST,
            0xCF,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ])
    }

    /// Write the whole framebuffer, page by page.
    pub fn flush(
        &mut self,
        framebuffer: &Framebuffer,
    ) -> Result<(), I2C::Error> {
        let mut data = [0u8; WIDTH + 1];
        data[0] = CONTROL_DATA;

        for page in 0..PAGES {
            let Some(columns) = framebuffer.page(page) else {
                break;
            };
            self.commands(&[
                cmd::SET_PAGE_ADDR | page as u8,
                cmd::SET_LOW_COLUMN | (COLUMN_OFFSET & 0x0F),
                cmd::SET_HIGH_COLUMN | (COLUMN_OFFSET >> 4),
            ])?;
            data[1..].copy_from_slice(columns);
            self.i2c.write(self.address, &data)?;
        }
        Ok(())
    }

    /// Command stream, split into transfers of at most `COMMAND_CHUNK` bytes.
    fn commands(
        &mut self,
        cmds: &[u8],
    ) -> Result<(), I2C::Error> {
        let mut buf = [0u8; COMMAND_CHUNK + 1];
        buf[0] = CONTROL_COMMAND;
        for chunk in cmds.chunks(COMMAND_CHUNK) {
            buf[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c.write(self.address, &buf[..=chunk.len()])?;
        }
        Ok(())
    }
}

impl<I2C: I2c> Present<Framebuffer> for Sh1106<I2C> {
    type Error = I2C::Error;

    fn present(
        &mut self,
        target: &Framebuffer,
    ) -> Result<(), Self::Error> {
        self.flush(target)
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use embedded_graphics::Pixel;
    use embedded_graphics::prelude::*;
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
    use gearview_common::{DisplayError, GraphicsDisplay, TextDisplay};

    use super::*;

    #[derive(Default)]
    struct FakeI2c {
        writes: Vec<(u8, Vec<u8>)>,
        nack: bool,
    }

    impl ErrorType for FakeI2c {
        type Error = ErrorKind;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            if self.nack {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_init_rotated() {
        let mut oled = Sh1106::new(FakeI2c::default(), DEFAULT_ADDRESS);
        oled.init(Rotation::Rotate180).unwrap();
        let (addr, bytes) = &oled.i2c.writes[0];
        assert_eq!(*addr, 0x3C);
        assert_eq!(bytes[0], CONTROL_COMMAND);
        assert!(bytes.contains(&cmd::SEG_REMAP_OFF));
        assert!(bytes.contains(&cmd::COM_SCAN_INC));
        assert_eq!(*bytes.last().unwrap(), cmd::DISPLAY_ON);
    }

    #[test]
    fn test_init_normal_orientation() {
        let mut oled = Sh1106::new(FakeI2c::default(), DEFAULT_ADDRESS);
        oled.init(Rotation::Normal).unwrap();
        let bytes = &oled.i2c.writes[0].1;
        assert!(bytes.contains(&cmd::SEG_REMAP_ON));
        assert!(bytes.contains(&cmd::COM_SCAN_DEC));
    }

    #[test]
    fn test_long_command_stream_is_split() {
        let mut oled = Sh1106::new(FakeI2c::default(), DEFAULT_ADDRESS);
        let stream: Vec<u8> = (0..40).collect();
        oled.commands(&stream).unwrap();

        let writes = &oled.i2c.writes;
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].1.len(), 32);
        assert_eq!(writes[1].1[0], CONTROL_COMMAND);
        assert_eq!(writes[1].1[1..], stream[31..]);
    }

    #[test]
    fn test_flush_pages_with_column_offset() {
        let mut fb = Framebuffer::new();
        Pixel(Point::new(0, 9), BinaryColor::On).draw(&mut fb).unwrap();

        let mut oled = Sh1106::new(FakeI2c::default(), DEFAULT_ADDRESS);
        oled.flush(&fb).unwrap();

        let writes = &oled.i2c.writes;
        assert_eq!(writes.len(), PAGES * 2);
        assert_eq!(writes[2].1, [CONTROL_COMMAND, 0xB1, 0x02, 0x10]);
        let page1 = &writes[3].1;
        assert_eq!(page1.len(), WIDTH + 1);
        assert_eq!(page1[0], CONTROL_DATA);
        assert_eq!(page1[1], 0b0000_0010);
    }

    #[test]
    fn test_nack_surfaces_as_display_error() {
        let oled = Sh1106::new(
            FakeI2c {
                nack: true,
                ..FakeI2c::default()
            },
            DEFAULT_ADDRESS,
        );
        let mut display = GraphicsDisplay::new(Framebuffer::new(), oled);
        display.clear();
        assert_eq!(display.present(), Err(DisplayError::Bus));
    }
}
