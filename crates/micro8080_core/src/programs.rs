//! Built-in demo programs, selectable from the data switches on reset.

use crate::cpu::MemoryPort;

/// A fixed program image that the front panel can load on reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Program {
    /// Switch code (low byte of the data switches) that selects the image.
    pub code: u8,
    pub name: &'static str,
    pub address: u16,
    pub bytes: &'static [u8],
}

impl Program {
    /// Copy the image into memory at its load address.
    pub fn load<M: MemoryPort>(&self, mem: &mut M) {
        let mut addr = self.address;
        for &b in self.bytes {
            mem.write(addr, b);
            addr = addr.wrapping_add(1);
        }
    }
}

/// Increment A forever.
///
/// ```text
/// 0000: MVI A,00
/// 0002: INR A
/// 0003: JMP 0002
/// ```
pub const COUNTER: Program = Program {
    code: 0x01,
    name: "Counter",
    address: 0x0000,
    bytes: &[0x3e, 0x00, 0x3c, 0xc3, 0x02, 0x00],
};

/// Fill memory from 0x1000 upwards with an incrementing pattern.
///
/// ```text
/// 0000: LXI H,1000
/// 0003: MVI A,00
/// 0005: MOV M,A
/// 0006: INR A
/// 0007: INX H
/// 0008: JMP 0005
/// ```
pub const MEMFILL: Program = Program {
    code: 0x02,
    name: "Memfill",
    address: 0x0000,
    bytes: &[
        0x21, 0x00, 0x10, 0x3e, 0x00, 0x77, 0x3c, 0x23, 0xc3, 0x05, 0x00,
    ],
};

/// Fibonacci numbers in B (previous) and C (current).
///
/// ```text
/// 0000: MVI B,00
/// 0002: MVI C,01
/// 0004: MOV A,B
/// 0005: ADD C
/// 0006: MOV B,C
/// 0007: MOV C,A
/// 0008: JMP 0004
/// ```
pub const FIBONACCI: Program = Program {
    code: 0x03,
    name: "Fibonacci",
    address: 0x0000,
    bytes: &[
        0x06, 0x00, 0x0e, 0x01, 0x78, 0x81, 0x41, 0x4f, 0xc3, 0x04, 0x00,
    ],
};

/// Count in A with a nested B/C delay loop between increments.
///
/// ```text
/// 0000: MVI A,00
/// 0002: MVI B,FF
/// 0004: MVI C,FF
/// 0006: DCR C
/// 0007: JNZ 0006
/// 000A: DCR B
/// 000B: JNZ 0004
/// 000E: INR A
/// 000F: JMP 0002
/// ```
pub const DELAY_COUNT: Program = Program {
    code: 0x04,
    name: "Delay Count",
    address: 0x0000,
    bytes: &[
        0x3e, 0x00, 0x06, 0xff, 0x0e, 0xff, 0x0d, 0xc2, 0x06, 0x00, 0x05, 0xc2, 0x04, 0x00,
        0x3c, 0xc3, 0x02, 0x00,
    ],
};

/// PUSH/POP and CALL/RET exercise.
///
/// ```text
/// 0000: LXI SP,2000
/// 0003: MVI A,55
/// 0005: MVI B,AA
/// 0007: PUSH PSW
/// 0008: PUSH B
/// 0009: CALL 0010
/// 000C: JMP 0003
/// 000F: NOP
/// 0010: POP B
/// 0011: POP PSW
/// 0012: RET
/// ```
pub const STACK_TEST: Program = Program {
    code: 0x05,
    name: "Stack Test",
    address: 0x0000,
    bytes: &[
        0x31, 0x00, 0x20, 0x3e, 0x55, 0x06, 0xaa, 0xf5, 0xc5, 0xcd, 0x10, 0x00, 0xc3, 0x03, 0x00,
        0x00, 0xc1, 0xf1, 0xc9,
    ],
};

pub static CATALOG: [Program; 5] = [COUNTER, MEMFILL, FIBONACCI, DELAY_COUNT, STACK_TEST];

/// Look up a program by its switch code.
pub fn find(code: u8) -> Option<&'static Program> {
    CATALOG.iter().find(|p| p.code == code)
}

/// Look up a program by name, ignoring case, spaces, `-` and `_`.
pub fn find_by_name(name: &str) -> Option<&'static Program> {
    let wanted = normalize(name);
    CATALOG.iter().find(|p| normalize(p.name) == wanted)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
