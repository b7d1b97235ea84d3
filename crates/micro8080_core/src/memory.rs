use crate::cpu::MemoryPort;

/// Total addressable memory size (64 KiB).
pub const MEMORY_SIZE: usize = 0x10000;

/// Flat 64 KiB RAM, zero-initialised.
#[derive(Clone)]
pub struct Memory {
    ram: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            ram: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    /// Zero the whole address space.
    pub fn clear(&mut self) {
        self.ram.fill(0);
    }

    /// Copy `bytes` verbatim starting at `addr`, wrapping past 0xFFFF.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let mut at = addr;
        for &b in bytes {
            self.write(at, b);
            at = at.wrapping_add(1);
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.ram
    }
}

impl MemoryPort for Memory {
    #[inline]
    fn read(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    #[inline]
    fn write(&mut self, addr: u16, value: u8) {
        self.ram[addr as usize] = value;
    }
}
