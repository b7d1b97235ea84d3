mod exec;
pub mod flags;

pub use flags::Flags;

/// Memory interface for the 8080 core.
///
/// The CPU reaches memory only through this trait. Addresses wrap modulo
/// 65536 and there is no error path; word accesses are little-endian.
pub trait MemoryPort {
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);

    /// Read a little-endian word. The high byte comes from `addr + 1`, which
    /// wraps independently of `addr`.
    fn read_word(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }
}

/// Register index of the `M` operand (memory at HL) in the 3-bit
/// register fields of an opcode.
pub(crate) const REG_M: u8 = 6;

/// Intel 8080 register file and control flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cpu8080 {
    pub a: u8,
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
    pub halted: bool,
    /// Interrupt enable latch (`EI`/`DI`). No interrupt is ever delivered.
    pub inte: bool,
}

impl Cpu8080 {
    /// Create a CPU in its power-on state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every register, flag, SP and PC, and clear `halted`/`inte`.
    pub fn init(&mut self) {
        *self = Self::default();
    }

    /// Front-panel reset: PC back to 0 and leave the halt state.
    ///
    /// Registers, flags, SP and `inte` keep their values.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.halted = false;
    }

    /// Execute a single instruction and return the number of cycles consumed.
    ///
    /// A halted CPU does not fetch and reports 0 cycles.
    pub fn step<M: MemoryPort>(&mut self, mem: &mut M) -> u32 {
        if self.halted {
            return 0;
        }
        let opcode = self.fetch_byte(mem);
        self.exec_opcode(mem, opcode)
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        [self.b, self.c] = value.to_be_bytes();
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        [self.d, self.e] = value.to_be_bytes();
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        [self.h, self.l] = value.to_be_bytes();
    }

    /// Accumulator and flags as pushed by `PUSH PSW`.
    #[inline]
    pub fn psw(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f.bits() | flags::PSW_FIXED_BIT])
    }

    #[inline]
    pub fn set_psw(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        self.f = Flags::from_bits_retain((f & flags::PSW_POP_MASK) | flags::PSW_FIXED_BIT);
    }

    fn fetch_byte<M: MemoryPort>(&mut self, mem: &M) -> u8 {
        let b = mem.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        b
    }

    fn fetch_word<M: MemoryPort>(&mut self, mem: &M) -> u16 {
        let lo = self.fetch_byte(mem);
        let hi = self.fetch_byte(mem);
        u16::from_le_bytes([lo, hi])
    }

    /// Read the operand selected by a 3-bit register field
    /// (B, C, D, E, H, L, M, A).
    fn read_reg<M: MemoryPort>(&self, mem: &M, index: u8) -> u8 {
        match index {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            REG_M => mem.read(self.hl()),
            _ => self.a,
        }
    }

    fn write_reg<M: MemoryPort>(&mut self, mem: &mut M, index: u8, value: u8) {
        match index {
            0 => self.b = value,
            1 => self.c = value,
            2 => self.d = value,
            3 => self.e = value,
            4 => self.h = value,
            5 => self.l = value,
            REG_M => mem.write(self.hl(), value),
            _ => self.a = value,
        }
    }

    /// Register pair selected by bits 4-5 of an opcode (BC, DE, HL, SP).
    fn reg_pair(&self, index: u8) -> u16 {
        match index & 0x03 {
            0 => self.bc(),
            1 => self.de(),
            2 => self.hl(),
            _ => self.sp,
        }
    }

    fn set_reg_pair(&mut self, index: u8, value: u16) {
        match index & 0x03 {
            0 => self.set_bc(value),
            1 => self.set_de(value),
            2 => self.set_hl(value),
            _ => self.sp = value,
        }
    }

    fn push<M: MemoryPort>(&mut self, mem: &mut M, value: u16) {
        self.sp = self.sp.wrapping_sub(2);
        mem.write_word(self.sp, value);
    }

    fn pop<M: MemoryPort>(&mut self, mem: &M) -> u16 {
        let value = mem.read_word(self.sp);
        self.sp = self.sp.wrapping_add(2);
        value
    }

    /// Evaluate the condition encoded in bits 3-5 of a jump, call or return:
    /// NZ, Z, NC, C, PO, PE, P, M.
    fn condition(&self, cc: u8) -> bool {
        let f = self.f;
        match cc & 0x07 {
            0 => !f.contains(Flags::ZERO),
            1 => f.contains(Flags::ZERO),
            2 => !f.contains(Flags::CARRY),
            3 => f.contains(Flags::CARRY),
            4 => !f.contains(Flags::PARITY),
            5 => f.contains(Flags::PARITY),
            6 => !f.contains(Flags::SIGN),
            _ => f.contains(Flags::SIGN),
        }
    }
}
