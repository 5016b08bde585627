use std::{fs, path::Path};

use log::{debug, warn};

use crate::error::CartridgeError;

// Cartridge header layout (gbdev.io/pandocs/The_Cartridge_Header.html)
const TITLE_START: usize = 0x0134;
const TITLE_END: usize = 0x0143;
const CGB_FLAG: usize = 0x0143;
const CART_TYPE: usize = 0x0147;
const ROM_SIZE: usize = 0x0148;
const RAM_SIZE: usize = 0x0149;
const HEADER_CHECKSUM: usize = 0x014D;
const CHECKSUM_START: usize = 0x0134;
const CHECKSUM_END: usize = 0x014C;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbcType {
    NoMbc,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
    Unknown(u8),
}

impl MbcType {
    fn from_header(byte: u8) -> Self {
        match byte {
            0x00 | 0x08 | 0x09 => MbcType::NoMbc,
            0x01..=0x03 => MbcType::Mbc1,
            0x05 | 0x06 => MbcType::Mbc2,
            0x0F..=0x13 => MbcType::Mbc3,
            0x19..=0x1E => MbcType::Mbc5,
            other => MbcType::Unknown(other),
        }
    }
}

/// A ROM image plus the header fields a frontend wants to show.
///
/// Bank switching is not emulated; only bank 0 ever reaches the memory map.
#[derive(Debug, Clone)]
pub struct Cartridge {
    pub rom: Vec<u8>,
    pub title: String,
    pub cgb: bool,
    pub mbc: MbcType,
    cart_type: u8,
    rom_size_code: u8,
    ram_size_code: u8,
}

impl Cartridge {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        debug!("read {} bytes from {}", data.len(), path.display());
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, CartridgeError> {
        if data.is_empty() {
            return Err(CartridgeError::Empty);
        }
        let header = |i: usize| data.get(i).copied().unwrap_or(0);

        let title = data
            .get(TITLE_START..=TITLE_END)
            .unwrap_or(&[])
            .iter()
            .take_while(|&&b| b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| b as char)
            .collect::<String>()
            .trim_end()
            .to_string();

        let cart_type = header(CART_TYPE);
        let cart = Self {
            title,
            cgb: header(CGB_FLAG) & 0x80 != 0,
            mbc: MbcType::from_header(cart_type),
            cart_type,
            rom_size_code: header(ROM_SIZE),
            ram_size_code: header(RAM_SIZE),
            rom: data,
        };

        if cart.mbc != MbcType::NoMbc {
            warn!(
                "cartridge type ${:02X} ({:?}) uses bank switching; only bank 0 is mapped",
                cart.cart_type, cart.mbc
            );
        }
        if !cart.header_checksum_ok() {
            warn!("cartridge header checksum mismatch");
        }
        Ok(cart)
    }

    pub fn cart_type(&self) -> u8 {
        self.cart_type
    }

    /// Declared ROM size in bytes (32 KiB << code), if the code is known.
    pub fn declared_rom_size(&self) -> Option<usize> {
        match self.rom_size_code {
            0x00..=0x08 => Some(0x8000 << self.rom_size_code),
            _ => None,
        }
    }

    /// Declared external RAM size in bytes.
    pub fn declared_ram_size(&self) -> Option<usize> {
        match self.ram_size_code {
            0x00 => Some(0),
            0x02 => Some(0x2000),
            0x03 => Some(0x8000),
            0x04 => Some(0x20000),
            0x05 => Some(0x10000),
            _ => None,
        }
    }

    pub fn header_checksum(&self) -> u8 {
        self.rom.get(HEADER_CHECKSUM).copied().unwrap_or(0)
    }

    /// Recomputes the boot ROM's header check over 0x0134-0x014C.
    pub fn header_checksum_ok(&self) -> bool {
        let Some(bytes) = self.rom.get(CHECKSUM_START..=CHECKSUM_END) else {
            return false;
        };
        let sum = bytes
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
        sum == self.header_checksum()
    }
}
