use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Word-addressed bus. Each of the 65536 cells holds one 32-bit instruction
/// word or one 16-bit data word.
pub trait Bus {
    fn read_cell(&mut self, addr: u16) -> Result<u32>;
    fn write_cell(&mut self, addr: u16, val: u32) -> Result<()>;

    fn read_word(&mut self, addr: u16) -> Result<u16> {
        Ok((self.read_cell(addr)? & 0xFFFF) as u16)
    }
    fn write_word(&mut self, addr: u16, val: u16) -> Result<()> {
        self.write_cell(addr, val as u32)
    }
}

pub const MEM_CELLS: usize = 0x1_0000;

#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u32>,
}

impl LinearMemory {
    pub fn new() -> Self {
        Self { mem: vec![0; MEM_CELLS] }
    }
}

impl Default for LinearMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for LinearMemory {
    fn read_cell(&mut self, addr: u16) -> Result<u32> {
        Ok(self.mem[addr as usize])
    }
    fn write_cell(&mut self, addr: u16, val: u32) -> Result<()> {
        self.mem[addr as usize] = val;
        Ok(())
    }
}

/// Copy a machine-code image to `base`, wrapping past 0xFFFF.
pub fn load_program<B: Bus>(bus: &mut B, base: u16, words: &[u32]) -> Result<()> {
    let mut addr = base;
    for &w in words {
        bus.write_cell(addr, w)?;
        addr = addr.wrapping_add(1);
    }
    Ok(())
}

/// Raw image bytes to instruction words, four little-endian bytes per word.
pub fn image_from_le_bytes(bytes: &[u8]) -> Result<Vec<u32>> {
    anyhow::ensure!(bytes.len() % 4 == 0, "image length {} is not a multiple of 4", bytes.len());
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

pub fn image_to_le_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

pub const IO_START: u16 = 0x9000;
pub const IO_END: u16 = 0x9FFF;

pub fn is_io(addr: u16) -> bool {
    (IO_START..=IO_END).contains(&addr)
}

/// A memory-mapped peripheral behind 0x9000..=0x9FFF. `port` is the full address.
pub trait IoDevice {
    fn read_io(&mut self, port: u16) -> Result<u16>;
    fn write_io(&mut self, port: u16, value: u16) -> Result<()>;
}

/// Reads as zero, drops writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDevice;

impl IoDevice for NullDevice {
    fn read_io(&mut self, _port: u16) -> Result<u16> {
        Ok(0)
    }
    fn write_io(&mut self, _port: u16, _value: u16) -> Result<()> {
        Ok(())
    }
}

/// Routes the I/O window to `io` and everything else to `mem`.
pub struct MappedBus<M, D> {
    pub mem: M,
    pub io: D,
}

impl<M: Bus, D: IoDevice> MappedBus<M, D> {
    pub fn new(mem: M, io: D) -> Self {
        Self { mem, io }
    }
}

impl<M: Bus, D: IoDevice> Bus for MappedBus<M, D> {
    fn read_cell(&mut self, addr: u16) -> Result<u32> {
        if is_io(addr) {
            Ok(self.io.read_io(addr)? as u32)
        } else {
            self.mem.read_cell(addr)
        }
    }
    fn write_cell(&mut self, addr: u16, val: u32) -> Result<()> {
        if is_io(addr) {
            self.io.write_io(addr, (val & 0xFFFF) as u16)
        } else {
            self.mem.write_cell(addr, val)
        }
    }
}
