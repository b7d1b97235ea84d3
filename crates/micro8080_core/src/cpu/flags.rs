//! Flag engine.
//!
//! Every arithmetic and logic opcode derives its flags through the four
//! functions in this module. They are pure: each takes the previous flag
//! byte and returns the updated one, leaving bits it does not own alone.

use bitflags::bitflags;

bitflags! {
    /// The 8080 flag byte (`F`).
    ///
    /// Bits 1, 3 and 5 are not flags. They are kept verbatim (`from_bits_retain`)
    /// so that `PUSH PSW`/`POP PSW` round-trip the byte the way hardware does.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const CARRY = 0x01;
        const PARITY = 0x04;
        const AUX_CARRY = 0x10;
        const ZERO = 0x40;
        const SIGN = 0x80;
    }
}

/// Bit 1 of the flag byte, always set when `F` goes through the stack.
pub const PSW_FIXED_BIT: u8 = 0x02;

/// Bits of a popped flag byte that survive `POP PSW`.
pub const PSW_POP_MASK: u8 = 0xd7;

/// True iff `value` has an even number of set bits.
#[inline]
pub fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

/// Zero, sign and parity of `value`. Carry and aux carry are untouched.
#[inline]
pub fn zsp(flags: Flags, value: u8) -> Flags {
    let mut f = flags;
    f.set(Flags::ZERO, value == 0);
    f.set(Flags::SIGN, value & 0x80 != 0);
    f.set(Flags::PARITY, parity(value));
    f
}

/// Flags for `a + b + carry_in`.
pub fn add(flags: Flags, a: u8, b: u8, carry_in: bool) -> Flags {
    let cy = carry_in as u16;
    let sum = a as u16 + b as u16 + cy;
    let mut f = zsp(flags, sum as u8);
    f.set(Flags::CARRY, sum > 0xff);
    f.set(
        Flags::AUX_CARRY,
        (a & 0x0f) as u16 + (b & 0x0f) as u16 + cy > 0x0f,
    );
    f
}

/// Flags for `a - b - carry_in`.
///
/// The difference is taken in wrapping 16-bit arithmetic, so a borrow shows up
/// as a result above 0xff and sets carry.
pub fn sub(flags: Flags, a: u8, b: u8, carry_in: bool) -> Flags {
    let cy = carry_in as u16;
    let diff = (a as u16).wrapping_sub(b as u16).wrapping_sub(cy);
    let mut f = zsp(flags, diff as u8);
    f.set(Flags::CARRY, diff > 0xff);
    f.set(
        Flags::AUX_CARRY,
        ((a & 0x0f) as i16) - ((b & 0x0f) as i16) - (cy as i16) < 0,
    );
    f
}
