//! Flat 64 KiB address space.
//!
//! Every 16-bit address resolves directly into one byte of backing storage.
//! The [`Region`] table documents what lives where (gbdev.io/pandocs/Memory_Map.html)
//! but never gates an access: there is no mapper, so writes to ROM land in
//! storage like any other write.

use log::{debug, warn};

pub const MEMORY_SIZE: usize = 0x1_0000;

// A u16 address can never index past the end of storage.
const _: () = assert!(MEMORY_SIZE == u16::MAX as usize + 1);

pub const ROM_BANK0_START: u16 = 0x0000;
pub const ROM_BANK0_END: u16 = 0x3FFF;
pub const ROM_BANKN_START: u16 = 0x4000;
pub const ROM_BANKN_END: u16 = 0x7FFF;
pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9FFF;
pub const EXT_RAM_START: u16 = 0xA000;
pub const EXT_RAM_END: u16 = 0xBFFF;
pub const WRAM0_START: u16 = 0xC000;
pub const WRAM0_END: u16 = 0xCFFF;
pub const WRAMN_START: u16 = 0xD000;
pub const WRAMN_END: u16 = 0xDFFF;
pub const ECHO_START: u16 = 0xE000;
pub const ECHO_END: u16 = 0xFDFF;
pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFE9F;
pub const PROHIBITED_START: u16 = 0xFEA0;
pub const PROHIBITED_END: u16 = 0xFEFF;
pub const IO_START: u16 = 0xFF00;
pub const IO_END: u16 = 0xFF7F;
pub const HRAM_START: u16 = 0xFF80;
pub const HRAM_END: u16 = 0xFFFE;
pub const IE_ADDR: u16 = 0xFFFF;

pub const SPRITE_COUNT: usize = 40;
pub const SPRITE_ENTRY_SIZE: usize = 4;

/// Byte written past the end of a short ROM image.
pub const ROM_PAD_BYTE: u8 = 0xFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    RomBank0,
    RomBankN,
    Vram,
    ExternalRam,
    Wram0,
    WramN,
    Echo,
    Oam,
    Prohibited,
    Io,
    Hram,
    InterruptEnable,
}

impl Region {
    /// All regions in ascending address order.
    pub const ALL: [Region; 12] = [
        Region::RomBank0,
        Region::RomBankN,
        Region::Vram,
        Region::ExternalRam,
        Region::Wram0,
        Region::WramN,
        Region::Echo,
        Region::Oam,
        Region::Prohibited,
        Region::Io,
        Region::Hram,
        Region::InterruptEnable,
    ];

    pub const fn start(self) -> u16 {
        match self {
            Region::RomBank0 => ROM_BANK0_START,
            Region::RomBankN => ROM_BANKN_START,
            Region::Vram => VRAM_START,
            Region::ExternalRam => EXT_RAM_START,
            Region::Wram0 => WRAM0_START,
            Region::WramN => WRAMN_START,
            Region::Echo => ECHO_START,
            Region::Oam => OAM_START,
            Region::Prohibited => PROHIBITED_START,
            Region::Io => IO_START,
            Region::Hram => HRAM_START,
            Region::InterruptEnable => IE_ADDR,
        }
    }

    /// Inclusive end address.
    pub const fn end(self) -> u16 {
        match self {
            Region::RomBank0 => ROM_BANK0_END,
            Region::RomBankN => ROM_BANKN_END,
            Region::Vram => VRAM_END,
            Region::ExternalRam => EXT_RAM_END,
            Region::Wram0 => WRAM0_END,
            Region::WramN => WRAMN_END,
            Region::Echo => ECHO_END,
            Region::Oam => OAM_END,
            Region::Prohibited => PROHIBITED_END,
            Region::Io => IO_END,
            Region::Hram => HRAM_END,
            Region::InterruptEnable => IE_ADDR,
        }
    }

    pub const fn len(self) -> usize {
        (self.end() - self.start()) as usize + 1
    }

    pub const fn contains(self, addr: u16) -> bool {
        addr >= self.start() && addr <= self.end()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Region::RomBank0 => "ROM bank 0",
            Region::RomBankN => "ROM bank N",
            Region::Vram => "VRAM",
            Region::ExternalRam => "external RAM",
            Region::Wram0 => "WRAM bank 0",
            Region::WramN => "WRAM bank N",
            Region::Echo => "echo RAM",
            Region::Oam => "OAM",
            Region::Prohibited => "prohibited",
            Region::Io => "I/O registers",
            Region::Hram => "HRAM",
            Region::InterruptEnable => "IE",
        }
    }

    pub const fn of(addr: u16) -> Region {
        match addr {
            ROM_BANK0_START..=ROM_BANK0_END => Region::RomBank0,
            ROM_BANKN_START..=ROM_BANKN_END => Region::RomBankN,
            VRAM_START..=VRAM_END => Region::Vram,
            EXT_RAM_START..=EXT_RAM_END => Region::ExternalRam,
            WRAM0_START..=WRAM0_END => Region::Wram0,
            WRAMN_START..=WRAMN_END => Region::WramN,
            ECHO_START..=ECHO_END => Region::Echo,
            OAM_START..=OAM_END => Region::Oam,
            PROHIBITED_START..=PROHIBITED_END => Region::Prohibited,
            IO_START..=IO_END => Region::Io,
            HRAM_START..=HRAM_END => Region::Hram,
            IE_ADDR => Region::InterruptEnable,
        }
    }

    /// Whether the hardware forbids programs from touching this region.
    pub const fn is_forbidden(self) -> bool {
        matches!(self, Region::Echo | Region::Prohibited)
    }
}

const fn regions_are_contiguous() -> bool {
    let mut total = 0usize;
    let mut expected_start = 0usize;
    let mut i = 0;
    while i < Region::ALL.len() {
        let region = Region::ALL[i];
        if region.start() as usize != expected_start || region.end() < region.start() {
            return false;
        }
        total += region.len();
        expected_start = region.end() as usize + 1;
        i += 1;
    }
    expected_start == MEMORY_SIZE && total == MEMORY_SIZE
}

const _: () = assert!(regions_are_contiguous());

/// One 4-byte OAM entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpriteAttributes {
    pub y: u8,
    pub x: u8,
    pub tile: u8,
    pub flags: u8,
}

#[derive(Clone)]
pub struct MemoryMap {
    bytes: [u8; MEMORY_SIZE],
}

impl MemoryMap {
    pub const fn new() -> Self {
        Self {
            bytes: [0; MEMORY_SIZE],
        }
    }

    #[inline(always)]
    pub fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    #[inline(always)]
    pub fn write_byte(&mut self, addr: u16, val: u8) {
        self.bytes[addr as usize] = val;
    }

    /// Little-endian; the high byte comes from `addr + 1`, wrapping at 0xFFFF.
    pub fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read_byte(addr);
        let hi = self.read_byte(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub fn write_word(&mut self, addr: u16, val: u16) {
        let [lo, hi] = val.to_le_bytes();
        self.write_byte(addr, lo);
        self.write_byte(addr.wrapping_add(1), hi);
    }

    pub fn region(&self, region: Region) -> &[u8] {
        &self.bytes[region.start() as usize..=region.end() as usize]
    }

    pub fn region_mut(&mut self, region: Region) -> &mut [u8] {
        &mut self.bytes[region.start() as usize..=region.end() as usize]
    }

    pub fn as_bytes(&self) -> &[u8; MEMORY_SIZE] {
        &self.bytes
    }

    /// Copies a ROM image into the fixed bank at 0x0000-0x3FFF.
    ///
    /// Short images are padded with [`ROM_PAD_BYTE`]; anything past 16 KiB is
    /// dropped since bank switching is not modelled.
    pub fn load_rom(&mut self, rom: &[u8]) {
        let bank = self.region_mut(Region::RomBank0);
        let n = rom.len().min(bank.len());
        bank[..n].copy_from_slice(&rom[..n]);
        bank[n..].fill(ROM_PAD_BYTE);
        if rom.len() > n {
            warn!(
                "ROM image is {} bytes; only the first {} are mapped",
                rom.len(),
                n
            );
        }
        debug!("loaded {} ROM bytes into {}", n, Region::RomBank0.name());
    }

    /// Returns OAM entry `index` (0-39).
    pub fn sprite(&self, index: usize) -> Option<SpriteAttributes> {
        if index >= SPRITE_COUNT {
            return None;
        }
        let base = OAM_START as usize + index * SPRITE_ENTRY_SIZE;
        let entry = &self.bytes[base..base + SPRITE_ENTRY_SIZE];
        Some(SpriteAttributes {
            y: entry[0],
            x: entry[1],
            tile: entry[2],
            flags: entry[3],
        })
    }

    pub fn set_sprite(&mut self, index: usize, sprite: SpriteAttributes) -> bool {
        if index >= SPRITE_COUNT {
            return false;
        }
        let base = OAM_START as usize + index * SPRITE_ENTRY_SIZE;
        self.bytes[base..base + SPRITE_ENTRY_SIZE].copy_from_slice(&[
            sprite.y,
            sprite.x,
            sprite.tile,
            sprite.flags,
        ]);
        true
    }

    /// Zeroes every region except ROM bank 0.
    pub fn clear_ram(&mut self) {
        self.bytes[ROM_BANKN_START as usize..].fill(0);
    }
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}
