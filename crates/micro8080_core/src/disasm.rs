//! Intel-syntax disassembler for the LCD and debugging views.
//!
//! Immediates are printed as upper-case hex without a suffix, e.g.
//! `MVI A,3E`, `JMP 0002`. Opcodes without a defined form render as
//! `*NOP` with length 1.

use crate::cpu::MemoryPort;

const REG: [&str; 8] = ["B", "C", "D", "E", "H", "L", "M", "A"];
const RP: [&str; 4] = ["B", "D", "H", "SP"];
const RP_STACK: [&str; 4] = ["B", "D", "H", "PSW"];
const ALU: [&str; 8] = ["ADD", "ADC", "SUB", "SBB", "ANA", "XRA", "ORA", "CMP"];
const ALU_IMM: [&str; 8] = ["ADI", "ACI", "SUI", "SBI", "ANI", "XRI", "ORI", "CPI"];
const COND: [&str; 8] = ["NZ", "Z", "NC", "C", "PO", "PE", "P", "M"];

/// Encoded length of `opcode` in bytes (1, 2 or 3).
pub fn opcode_length(opcode: u8) -> u8 {
    match opcode {
        // LXI, SHLD, LHLD, STA, LDA
        0x01 | 0x11 | 0x21 | 0x31 | 0x22 | 0x2a | 0x32 | 0x3a => 3,
        // JMP, CALL, Jcc, Ccc
        0xc3 | 0xcd => 3,
        op if op & 0xc7 == 0xc2 || op & 0xc7 == 0xc4 => 3,
        // MVI, immediate ALU, IN, OUT
        op if op & 0xc7 == 0x06 || op & 0xc7 == 0xc6 => 2,
        0xd3 | 0xdb => 2,
        _ => 1,
    }
}

/// Length of the instruction stored at `addr`.
pub fn instruction_length<M: MemoryPort>(mem: &M, addr: u16) -> u8 {
    opcode_length(mem.read(addr))
}

/// Mnemonic text and length of the instruction at `addr`.
///
/// Operand bytes are read with wrapping addresses, so an instruction that
/// straddles 0xFFFF decodes like the CPU would execute it.
pub fn disassemble<M: MemoryPort>(mem: &M, addr: u16) -> (String, u8) {
    let opcode = mem.read(addr);
    let len = opcode_length(opcode);
    let d8 = mem.read(addr.wrapping_add(1));
    let d16 = mem.read_word(addr.wrapping_add(1));

    let mid = ((opcode >> 3) & 0x07) as usize;
    let lo = (opcode & 0x07) as usize;
    let rp = ((opcode >> 4) & 0x03) as usize;

    let text = match opcode {
        0x76 => "HLT".to_string(),
        0x40..=0x7f => format!("MOV {},{}", REG[mid], REG[lo]),
        0x80..=0xbf => format!("{} {}", ALU[mid], REG[lo]),

        0x00 => "NOP".to_string(),
        0x01 | 0x11 | 0x21 | 0x31 => format!("LXI {},{:04X}", RP[rp], d16),
        0x02 | 0x12 => format!("STAX {}", RP[rp]),
        0x0a | 0x1a => format!("LDAX {}", RP[rp]),
        0x03 | 0x13 | 0x23 | 0x33 => format!("INX {}", RP[rp]),
        0x0b | 0x1b | 0x2b | 0x3b => format!("DCX {}", RP[rp]),
        0x09 | 0x19 | 0x29 | 0x39 => format!("DAD {}", RP[rp]),
        op if op & 0xc7 == 0x04 => format!("INR {}", REG[mid]),
        op if op & 0xc7 == 0x05 => format!("DCR {}", REG[mid]),
        op if op & 0xc7 == 0x06 => format!("MVI {},{:02X}", REG[mid], d8),
        0x07 => "RLC".to_string(),
        0x0f => "RRC".to_string(),
        0x17 => "RAL".to_string(),
        0x1f => "RAR".to_string(),
        0x22 => format!("SHLD {:04X}", d16),
        0x2a => format!("LHLD {:04X}", d16),
        0x32 => format!("STA {:04X}", d16),
        0x3a => format!("LDA {:04X}", d16),
        0x27 => "DAA".to_string(),
        0x2f => "CMA".to_string(),
        0x37 => "STC".to_string(),
        0x3f => "CMC".to_string(),

        op if op & 0xc7 == 0xc6 => format!("{} {:02X}", ALU_IMM[mid], d8),
        0xc3 => format!("JMP {:04X}", d16),
        op if op & 0xc7 == 0xc2 => format!("J{} {:04X}", COND[mid], d16),
        0xcd => format!("CALL {:04X}", d16),
        op if op & 0xc7 == 0xc4 => format!("C{} {:04X}", COND[mid], d16),
        0xc9 => "RET".to_string(),
        op if op & 0xc7 == 0xc0 => format!("R{}", COND[mid]),
        op if op & 0xc7 == 0xc7 => format!("RST {}", mid),
        0xc5 | 0xd5 | 0xe5 | 0xf5 => format!("PUSH {}", RP_STACK[rp]),
        0xc1 | 0xd1 | 0xe1 | 0xf1 => format!("POP {}", RP_STACK[rp]),
        0xe3 => "XTHL".to_string(),
        0xe9 => "PCHL".to_string(),
        0xeb => "XCHG".to_string(),
        0xf9 => "SPHL".to_string(),
        0xd3 => format!("OUT {:02X}", d8),
        0xdb => format!("IN {:02X}", d8),
        0xf3 => "DI".to_string(),
        0xfb => "EI".to_string(),

        _ => "*NOP".to_string(),
    };

    (text, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;
    use crate::programs;

    fn dis(bytes: &[u8]) -> (String, u8) {
        let mut mem = Memory::new();
        mem.load(0x0100, bytes);
        disassemble(&mem, 0x0100)
    }

    #[test]
    fn lengths_cover_every_opcode() {
        let mut counts = [0usize; 4];
        for op in 0..=255u8 {
            counts[opcode_length(op) as usize] += 1;
        }
        // 18 two-byte forms (8 MVI, 8 immediate ALU, IN, OUT) and
        // 26 three-byte forms (4 LXI, 4 direct, JMP, CALL, 8 Jcc, 8 Ccc).
        assert_eq!(counts, [0, 256 - 18 - 26, 18, 26]);
    }

    #[test]
    fn register_groups() {
        assert_eq!(dis(&[0x78]), ("MOV A,B".to_string(), 1));
        assert_eq!(dis(&[0x77]), ("MOV M,A".to_string(), 1));
        assert_eq!(dis(&[0x76]), ("HLT".to_string(), 1));
        assert_eq!(dis(&[0x86]), ("ADD M".to_string(), 1));
        assert_eq!(dis(&[0xbf]), ("CMP A".to_string(), 1));
        assert_eq!(dis(&[0x3c]), ("INR A".to_string(), 1));
        assert_eq!(dis(&[0x35]), ("DCR M".to_string(), 1));
    }

    #[test]
    fn immediates_and_addresses() {
        assert_eq!(dis(&[0x3e, 0x0a]), ("MVI A,0A".to_string(), 2));
        assert_eq!(dis(&[0x31, 0x00, 0x20]), ("LXI SP,2000".to_string(), 3));
        assert_eq!(dis(&[0xfe, 0xff]), ("CPI FF".to_string(), 2));
        assert_eq!(dis(&[0xc2, 0x06, 0x00]), ("JNZ 0006".to_string(), 3));
        assert_eq!(dis(&[0xec, 0x34, 0x12]), ("CPE 1234".to_string(), 3));
        assert_eq!(dis(&[0xf8]), ("RM".to_string(), 1));
        assert_eq!(dis(&[0xdb, 0x10]), ("IN 10".to_string(), 2));
        assert_eq!(dis(&[0x2a, 0xcd, 0xab]), ("LHLD ABCD".to_string(), 3));
    }

    #[test]
    fn stack_and_restart_forms() {
        assert_eq!(dis(&[0xf5]).0, "PUSH PSW");
        assert_eq!(dis(&[0xc1]).0, "POP B");
        assert_eq!(dis(&[0xef]).0, "RST 5");
        assert_eq!(dis(&[0xff]).0, "RST 7");
    }

    #[test]
    fn undefined_opcodes_are_marked() {
        for op in [0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38, 0xcb, 0xd9, 0xdd, 0xed, 0xfd] {
            assert_eq!(dis(&[op]), ("*NOP".to_string(), 1), "opcode {op:#04x}");
        }
    }

    #[test]
    fn operands_wrap_at_top_of_memory() {
        let mut mem = Memory::new();
        mem.load(0xfffe, &[0xc3, 0x34, 0x12]);
        assert_eq!(disassemble(&mem, 0xfffe), ("JMP 1234".to_string(), 3));
    }

    #[test]
    fn counter_listing() {
        let mut mem = Memory::new();
        programs::COUNTER.load(&mut mem);
        let mut addr = 0u16;
        let mut lines = Vec::new();
        while (addr as usize) < programs::COUNTER.bytes.len() {
            let (text, len) = disassemble(&mem, addr);
            lines.push(text);
            addr += len as u16;
        }
        assert_eq!(lines, vec!["MVI A,00", "INR A", "JMP 0002"]);
        assert_eq!(instruction_length(&mem, 0x0003), 3);
    }
}
