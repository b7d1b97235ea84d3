use super::flags::{self, Flags};
use super::{Cpu8080, MemoryPort, REG_M};

impl Cpu8080 {
    /// Decode and execute `opcode` (already fetched) and return its cycles.
    ///
    /// `MOV`/`HLT` (0x40-0x7F) and the register ALU block (0x80-0xBF) are
    /// decoded from their operand fields; everything else is matched by
    /// encoding. Opcodes without a defined form run as a 4-cycle `NOP`.
    pub(super) fn exec_opcode<M: MemoryPort>(&mut self, mem: &mut M, opcode: u8) -> u32 {
        let mid = (opcode >> 3) & 0x07;
        let lo = opcode & 0x07;

        match opcode >> 6 {
            1 => return self.exec_mov_or_halt(mem, opcode, mid, lo),
            2 => {
                let value = self.read_reg(mem, lo);
                self.alu(mid, value);
                return if lo == REG_M { 7 } else { 4 };
            }
            _ => {}
        }

        let rp = (opcode >> 4) & 0x03;

        match opcode {
            // NOP
            0x00 => 4,

            // LXI rp,word
            0x01 | 0x11 | 0x21 | 0x31 => {
                let v = self.fetch_word(mem);
                self.set_reg_pair(rp, v);
                10
            }

            // STAX B / STAX D
            0x02 | 0x12 => {
                let addr = self.reg_pair(rp);
                mem.write(addr, self.a);
                7
            }

            // LDAX B / LDAX D
            0x0a | 0x1a => {
                self.a = mem.read(self.reg_pair(rp));
                7
            }

            // INX rp
            0x03 | 0x13 | 0x23 | 0x33 => {
                let v = self.reg_pair(rp).wrapping_add(1);
                self.set_reg_pair(rp, v);
                5
            }

            // DCX rp
            0x0b | 0x1b | 0x2b | 0x3b => {
                let v = self.reg_pair(rp).wrapping_sub(1);
                self.set_reg_pair(rp, v);
                5
            }

            // INR r / INR M
            0x04 | 0x0c | 0x14 | 0x1c | 0x24 | 0x2c | 0x34 | 0x3c => {
                let value = self.read_reg(mem, mid);
                let result = value.wrapping_add(1);
                self.write_reg(mem, mid, result);
                self.f = flags::zsp(self.f, result);
                self.f.set(Flags::AUX_CARRY, value & 0x0f == 0x0f);
                if mid == REG_M {
                    10
                } else {
                    5
                }
            }

            // DCR r / DCR M
            0x05 | 0x0d | 0x15 | 0x1d | 0x25 | 0x2d | 0x35 | 0x3d => {
                let value = self.read_reg(mem, mid);
                let result = value.wrapping_sub(1);
                self.write_reg(mem, mid, result);
                self.f = flags::zsp(self.f, result);
                self.f.set(Flags::AUX_CARRY, value & 0x0f == 0x00);
                if mid == REG_M {
                    10
                } else {
                    5
                }
            }

            // MVI r,byte / MVI M,byte
            0x06 | 0x0e | 0x16 | 0x1e | 0x26 | 0x2e | 0x36 | 0x3e => {
                let v = self.fetch_byte(mem);
                self.write_reg(mem, mid, v);
                if mid == REG_M {
                    10
                } else {
                    7
                }
            }

            // RLC
            0x07 => {
                let bit7 = self.a & 0x80 != 0;
                self.a = self.a.rotate_left(1);
                self.f.set(Flags::CARRY, bit7);
                4
            }
            // RRC
            0x0f => {
                let bit0 = self.a & 0x01 != 0;
                self.a = self.a.rotate_right(1);
                self.f.set(Flags::CARRY, bit0);
                4
            }
            // RAL
            0x17 => {
                let bit7 = self.a & 0x80 != 0;
                let carry = self.f.contains(Flags::CARRY) as u8;
                self.a = (self.a << 1) | carry;
                self.f.set(Flags::CARRY, bit7);
                4
            }
            // RAR
            0x1f => {
                let bit0 = self.a & 0x01 != 0;
                let carry = if self.f.contains(Flags::CARRY) { 0x80 } else { 0 };
                self.a = (self.a >> 1) | carry;
                self.f.set(Flags::CARRY, bit0);
                4
            }

            // DAD rp
            0x09 | 0x19 | 0x29 | 0x39 => {
                let res = self.hl() as u32 + self.reg_pair(rp) as u32;
                self.set_hl(res as u16);
                self.f.set(Flags::CARRY, res > 0xffff);
                10
            }

            // SHLD addr
            0x22 => {
                let addr = self.fetch_word(mem);
                mem.write_word(addr, self.hl());
                16
            }
            // LHLD addr
            0x2a => {
                let addr = self.fetch_word(mem);
                let v = mem.read_word(addr);
                self.set_hl(v);
                16
            }
            // STA addr
            0x32 => {
                let addr = self.fetch_word(mem);
                mem.write(addr, self.a);
                13
            }
            // LDA addr
            0x3a => {
                let addr = self.fetch_word(mem);
                self.a = mem.read(addr);
                13
            }

            // DAA
            0x27 => {
                let mut adjust = 0u8;
                let mut carry = self.f.contains(Flags::CARRY);
                if self.f.contains(Flags::AUX_CARRY) || self.a & 0x0f > 9 {
                    adjust |= 0x06;
                }
                if carry || self.a > 0x99 {
                    adjust |= 0x60;
                    carry = true;
                }
                self.f = flags::add(self.f, self.a, adjust, false);
                self.a = self.a.wrapping_add(adjust);
                if carry {
                    self.f.insert(Flags::CARRY);
                }
                4
            }

            // CMA
            0x2f => {
                self.a = !self.a;
                4
            }
            // STC
            0x37 => {
                self.f.insert(Flags::CARRY);
                4
            }
            // CMC
            0x3f => {
                self.f.toggle(Flags::CARRY);
                4
            }

            // ADI ACI SUI SBI ANI XRI ORI CPI
            0xc6 | 0xce | 0xd6 | 0xde | 0xe6 | 0xee | 0xf6 | 0xfe => {
                let imm = self.fetch_byte(mem);
                self.alu(mid, imm);
                7
            }

            // JMP addr
            0xc3 => {
                self.pc = self.fetch_word(mem);
                10
            }
            // Jcc addr
            0xc2 | 0xca | 0xd2 | 0xda | 0xe2 | 0xea | 0xf2 | 0xfa => {
                let addr = self.fetch_word(mem);
                if self.condition(mid) {
                    self.pc = addr;
                }
                10
            }

            // CALL addr
            0xcd => {
                let addr = self.fetch_word(mem);
                self.push(mem, self.pc);
                self.pc = addr;
                17
            }
            // Ccc addr
            0xc4 | 0xcc | 0xd4 | 0xdc | 0xe4 | 0xec | 0xf4 | 0xfc => {
                let addr = self.fetch_word(mem);
                if self.condition(mid) {
                    self.push(mem, self.pc);
                    self.pc = addr;
                    17
                } else {
                    11
                }
            }

            // RET
            0xc9 => {
                self.pc = self.pop(mem);
                10
            }
            // Rcc
            0xc0 | 0xc8 | 0xd0 | 0xd8 | 0xe0 | 0xe8 | 0xf0 | 0xf8 => {
                if self.condition(mid) {
                    self.pc = self.pop(mem);
                    11
                } else {
                    5
                }
            }

            // RST n
            0xc7 | 0xcf | 0xd7 | 0xdf | 0xe7 | 0xef | 0xf7 | 0xff => {
                self.push(mem, self.pc);
                self.pc = u16::from(mid) << 3;
                11
            }

            // PUSH B / D / H
            0xc5 | 0xd5 | 0xe5 => {
                let value = self.reg_pair(rp);
                self.push(mem, value);
                11
            }
            // PUSH PSW
            0xf5 => {
                let value = self.psw();
                self.push(mem, value);
                11
            }

            // POP B / D / H
            0xc1 | 0xd1 | 0xe1 => {
                let value = self.pop(mem);
                self.set_reg_pair(rp, value);
                10
            }
            // POP PSW
            0xf1 => {
                let value = self.pop(mem);
                self.set_psw(value);
                10
            }

            // XTHL
            0xe3 => {
                let top = mem.read_word(self.sp);
                mem.write_word(self.sp, self.hl());
                self.set_hl(top);
                18
            }
            // PCHL
            0xe9 => {
                self.pc = self.hl();
                5
            }
            // XCHG
            0xeb => {
                core::mem::swap(&mut self.d, &mut self.h);
                core::mem::swap(&mut self.e, &mut self.l);
                4
            }
            // SPHL
            0xf9 => {
                self.sp = self.hl();
                5
            }

            // IN port / OUT port: no devices, only the port byte is consumed.
            0xdb | 0xd3 => {
                self.fetch_byte(mem);
                10
            }

            // EI / DI
            0xfb => {
                self.inte = true;
                4
            }
            0xf3 => {
                self.inte = false;
                4
            }

            // 08 10 18 20 28 30 38 CB D9 DD ED FD
            _ => 4,
        }
    }

    fn exec_mov_or_halt<M: MemoryPort>(
        &mut self,
        mem: &mut M,
        opcode: u8,
        dst: u8,
        src: u8,
    ) -> u32 {
        // HLT sits where MOV M,M would be.
        if opcode == 0x76 {
            self.halted = true;
            return 7;
        }
        let value = self.read_reg(mem, src);
        self.write_reg(mem, dst, value);
        if dst == REG_M || src == REG_M {
            7
        } else {
            5
        }
    }

    /// Accumulator operation selected by bits 3-5 of the opcode:
    /// ADD, ADC, SUB, SBB, ANA, XRA, ORA, CMP.
    fn alu(&mut self, op: u8, value: u8) {
        match op & 0x07 {
            0 => self.add(value, false),
            1 => self.add(value, self.f.contains(Flags::CARRY)),
            2 => self.sub(value, false),
            3 => self.sub(value, self.f.contains(Flags::CARRY)),
            4 => self.ana(value),
            5 => self.logic(self.a ^ value),
            6 => self.logic(self.a | value),
            _ => self.f = flags::sub(self.f, self.a, value, false),
        }
    }

    fn add(&mut self, value: u8, carry: bool) {
        self.f = flags::add(self.f, self.a, value, carry);
        self.a = self.a.wrapping_add(value).wrapping_add(carry as u8);
    }

    fn sub(&mut self, value: u8, carry: bool) {
        self.f = flags::sub(self.f, self.a, value, carry);
        self.a = self.a.wrapping_sub(value).wrapping_sub(carry as u8);
    }

    fn ana(&mut self, value: u8) {
        self.a &= value;
        self.f = flags::zsp(self.f, self.a);
        self.f.remove(Flags::CARRY);
        // AND always reports aux carry on this core.
        self.f.insert(Flags::AUX_CARRY);
    }

    /// XRA/ORA: store `result` and clear both carries.
    fn logic(&mut self, result: u8) {
        self.a = result;
        self.f = flags::zsp(self.f, result);
        self.f.remove(Flags::CARRY | Flags::AUX_CARRY);
    }
}
