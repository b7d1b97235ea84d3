//! LED bar and 20x2 character LCD.
//!
//! The LCD shows either a register dump (key switch off) or the
//! instruction at PC with a cursor walking over its opcode bytes (key
//! switch on). After a catalog load a `Loaded: <name>` banner stays up for
//! [`BANNER_MS`] before the regular view returns.

use crate::cpu::{Cpu8080, MemoryPort};
use crate::disasm;
use crate::panel::{Buttons, Panel};

pub const LCD_COLUMNS: usize = 20;
pub const LCD_ROWS: usize = 2;

/// Cursor animation period in the disassembly view.
pub const CURSOR_STEP_MS: u32 = 100;
/// How long the catalog banner is held.
pub const BANNER_MS: u32 = 500;

/// Longest mnemonic that fits after the `AAAA: ` prefix.
const MNEMONIC_WIDTH: usize = 11;
/// Opcode bytes shown on the second row.
const DUMP_BYTES: u16 = 7;

/// Character buffer of a 20x2 HD44780-style display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lcd {
    cells: [[u8; LCD_COLUMNS]; LCD_ROWS],
    col: usize,
    row: usize,
    display_on: bool,
    cursor_on: bool,
}

impl Default for Lcd {
    fn default() -> Self {
        Self::new()
    }
}

impl Lcd {
    pub fn new() -> Self {
        Self {
            cells: [[b' '; LCD_COLUMNS]; LCD_ROWS],
            col: 0,
            row: 0,
            display_on: true,
            cursor_on: false,
        }
    }

    /// Blank both rows and home the cursor.
    pub fn clear(&mut self) {
        self.cells = [[b' '; LCD_COLUMNS]; LCD_ROWS];
        self.col = 0;
        self.row = 0;
    }

    pub fn set_cursor(&mut self, col: usize, row: usize) {
        self.col = col.min(LCD_COLUMNS - 1);
        self.row = row.min(LCD_ROWS - 1);
    }

    /// Write one character and advance. Characters past the last column
    /// are dropped.
    pub fn put_char(&mut self, ch: u8) {
        if self.col < LCD_COLUMNS {
            self.cells[self.row][self.col] = ch;
            self.col += 1;
        }
    }

    pub fn print(&mut self, text: &str) {
        for ch in text.bytes() {
            self.put_char(ch);
        }
    }

    pub fn print_hex8(&mut self, value: u8) {
        self.print(&format!("{:02X}", value));
    }

    pub fn print_hex16(&mut self, value: u16) {
        self.print(&format!("{:04X}", value));
    }

    pub fn set_display(&mut self, on: bool, cursor: bool) {
        self.display_on = on;
        self.cursor_on = cursor;
    }

    pub fn row(&self, row: usize) -> &[u8; LCD_COLUMNS] {
        &self.cells[row.min(LCD_ROWS - 1)]
    }

    pub fn line(&self, row: usize) -> String {
        String::from_utf8_lossy(self.row(row)).into_owned()
    }

    /// `(column, row)` of the cursor. The column can sit one past the
    /// last cell after a full-width print.
    pub fn cursor(&self) -> (usize, usize) {
        (self.col, self.row)
    }

    pub fn cursor_visible(&self) -> bool {
        self.display_on && self.cursor_on
    }

    pub fn display_on(&self) -> bool {
        self.display_on
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Disassembly,
    Registers,
}

/// Renders machine state into the LED pattern and the LCD.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Display {
    lcd: Lcd,
    leds: u16,
    view: View,
    cursor_pos: u8,
    last_cursor_time: u32,
    banner_since: Option<u32>,
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lcd(&self) -> &Lcd {
        &self.lcd
    }

    /// Address high byte in the upper eight LEDs, the byte at PC in the
    /// lower eight.
    pub fn leds(&self) -> u16 {
        self.leds
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn banner_active(&self) -> bool {
        self.banner_since.is_some()
    }

    /// Put up the `Loaded: <name>` banner at `now`.
    pub fn show_banner(&mut self, name: &str, now: u32) {
        self.lcd.clear();
        self.lcd.set_cursor(0, 0);
        self.lcd.print("Loaded: ");
        self.lcd.print(name);
        self.lcd.set_display(true, false);
        self.banner_since = Some(now);
    }

    /// Refresh the LEDs and the LCD for the state after a panel tick.
    pub fn refresh<M: MemoryPort>(
        &mut self,
        now: u32,
        cpu: &Cpu8080,
        mem: &M,
        panel: &mut Panel,
    ) {
        self.leds = led_pattern(cpu, mem);

        if let Some(since) = self.banner_since {
            if now.wrapping_sub(since) < BANNER_MS {
                return;
            }
            self.banner_since = None;
            self.lcd.clear();
            panel.mark_dirty();
        }

        let view = if panel.buttons().current.contains(Buttons::KEY_SWITCH) {
            View::Disassembly
        } else {
            View::Registers
        };
        if view != self.view {
            self.view = view;
            self.lcd.clear();
            panel.mark_dirty();
        }

        match self.view {
            View::Registers => self.draw_registers(cpu),
            View::Disassembly => self.draw_disassembly(now, cpu, mem, panel),
        }
    }

    fn draw_registers(&mut self, cpu: &Cpu8080) {
        let lcd = &mut self.lcd;
        lcd.set_cursor(0, 0);
        lcd.print("A:");
        lcd.print_hex8(cpu.a);
        lcd.print(" BC:");
        lcd.print_hex16(cpu.bc());
        lcd.print(" DE:");
        lcd.print_hex16(cpu.de());

        lcd.set_cursor(0, 1);
        lcd.print("HL:");
        lcd.print_hex16(cpu.hl());
        lcd.print(" SP:");
        lcd.print_hex16(cpu.sp);
        lcd.print(" F:");
        lcd.print_hex8(cpu.f.bits());

        lcd.set_display(true, false);
    }

    fn draw_disassembly<M: MemoryPort>(
        &mut self,
        now: u32,
        cpu: &Cpu8080,
        mem: &M,
        panel: &mut Panel,
    ) {
        let addr = cpu.pc;
        let len = disasm::instruction_length(mem, addr);

        if panel.take_dirty() {
            self.cursor_pos = 0;
            self.last_cursor_time = now;

            let (text, _) = disasm::disassemble(mem, addr);
            let lcd = &mut self.lcd;
            lcd.clear();
            lcd.set_cursor(0, 0);
            lcd.print_hex16(addr);
            lcd.print(": ");
            lcd.print(&text[..text.len().min(MNEMONIC_WIDTH)]);

            lcd.set_cursor(0, 1);
            for i in 0..DUMP_BYTES {
                if i > 0 {
                    lcd.put_char(b'.');
                }
                lcd.print_hex8(mem.read(addr.wrapping_add(i)));
            }
        }

        if now.wrapping_sub(self.last_cursor_time) >= CURSOR_STEP_MS {
            self.last_cursor_time = now;
            self.cursor_pos += 1;
            if self.cursor_pos >= len * 2 {
                self.cursor_pos = 0;
            }
        }

        self.lcd.set_cursor(cursor_column(self.cursor_pos), 1);
        self.lcd.set_display(true, true);
    }
}

/// LED pattern for the current PC: `(PC & 0xFF00) | mem[PC]`.
pub fn led_pattern<M: MemoryPort>(cpu: &Cpu8080, mem: &M) -> u16 {
    (cpu.pc & 0xff00) | u16::from(mem.read(cpu.pc))
}

/// Column of nibble `pos` in the `xx.xx.xx` dump: two digits per byte plus
/// a separator.
fn cursor_column(pos: u8) -> usize {
    let pos = pos as usize;
    (pos / 2) * 3 + pos % 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;
    use crate::panel::RunMode;

    struct Rig {
        display: Display,
        panel: Panel,
        cpu: Cpu8080,
        mem: Memory,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                display: Display::new(),
                panel: Panel::new(),
                cpu: Cpu8080::new(),
                mem: Memory::new(),
            }
        }

        fn update(&mut self, now: u32, buttons: Buttons) {
            let events = self
                .panel
                .tick(&mut self.cpu, &mut self.mem, now, 0, buttons);
            if let Some(program) = events.loaded {
                self.display.show_banner(program.name, now);
            }
            self.display
                .refresh(now, &self.cpu, &self.mem, &mut self.panel);
        }
    }

    #[test]
    fn lcd_clamps_cursor_and_drops_overflow() {
        let mut lcd = Lcd::new();
        lcd.set_cursor(40, 7);
        assert_eq!(lcd.cursor(), (19, 1));
        lcd.print("XYZ");
        assert_eq!(lcd.row(1)[19], b'X');
        assert_eq!(lcd.cursor(), (20, 1));
        lcd.clear();
        assert_eq!(lcd.line(0), " ".repeat(20));
        assert_eq!(lcd.cursor(), (0, 0));
    }

    #[test]
    fn lcd_hex_printing_is_upper_case() {
        let mut lcd = Lcd::new();
        lcd.print_hex8(0xab);
        lcd.put_char(b' ');
        lcd.print_hex16(0x0c0d);
        assert_eq!(&lcd.line(0)[..7], "AB 0C0D");
    }

    #[test]
    fn led_pattern_combines_page_and_data() {
        let mut mem = Memory::new();
        mem.write(0x12ab, 0x5a);
        let cpu = Cpu8080 {
            pc: 0x12ab,
            ..Cpu8080::default()
        };
        assert_eq!(led_pattern(&cpu, &mem), 0x125a);
    }

    #[test]
    fn register_view_layout() {
        let mut rig = Rig::new();
        rig.cpu.a = 0x1f;
        rig.cpu.set_bc(0x0102);
        rig.cpu.set_de(0xa0b0);
        rig.cpu.set_hl(0xbeef);
        rig.cpu.sp = 0x2000;
        rig.cpu.set_psw(0x1fd7);
        rig.update(100, Buttons::empty());

        assert_eq!(rig.display.view(), View::Registers);
        assert_eq!(rig.display.lcd().line(0), "A:1F BC:0102 DE:A0B0");
        assert_eq!(rig.display.lcd().line(1), "HL:BEEF SP:2000 F:D7");
        assert!(!rig.display.lcd().cursor_visible());
    }

    #[test]
    fn disassembly_view_layout() {
        let mut rig = Rig::new();
        rig.mem.load(0x0100, &[0xc3, 0x34, 0x12, 0x00, 0x76, 0xff, 0x10]);
        rig.cpu.pc = 0x0100;
        rig.update(100, Buttons::KEY_SWITCH);

        let lcd = rig.display.lcd();
        assert_eq!(lcd.line(0).trim_end(), "0100: JMP 1234");
        assert_eq!(lcd.line(1), "C3.34.12.00.76.FF.10");
        assert!(lcd.cursor_visible());
        assert_eq!(lcd.cursor(), (0, 1));
        assert_eq!(rig.display.leds(), 0x01c3);
        assert!(!rig.panel.is_display_dirty());
    }

    #[test]
    fn long_mnemonics_are_truncated() {
        let mut rig = Rig::new();
        rig.mem.load(0, &[0x31, 0x00, 0x20]);
        rig.update(100, Buttons::KEY_SWITCH);
        assert_eq!(rig.display.lcd().line(0).trim_end(), "0000: LXI SP,2000");

        let mut lcd = Lcd::new();
        let text = "ABCDEFGHIJKLMNOP";
        lcd.print(&text[..text.len().min(MNEMONIC_WIDTH)]);
        assert_eq!(lcd.line(0).trim_end(), "ABCDEFGHIJK");
    }

    #[test]
    fn cursor_walks_instruction_nibbles() {
        let mut rig = Rig::new();
        rig.mem.load(0, &[0xc3, 0x00, 0x00]);
        rig.update(1000, Buttons::KEY_SWITCH);

        let mut columns = Vec::new();
        for i in 1..=7 {
            rig.update(1000 + i * CURSOR_STEP_MS, Buttons::KEY_SWITCH);
            columns.push(rig.display.lcd().cursor().0);
        }
        assert_eq!(columns, vec![1, 3, 4, 6, 7, 0, 1]);
    }

    #[test]
    fn cursor_waits_for_the_period() {
        let mut rig = Rig::new();
        rig.update(1000, Buttons::KEY_SWITCH);
        rig.update(1099, Buttons::KEY_SWITCH);
        assert_eq!(rig.display.lcd().cursor(), (0, 1));
        rig.update(1100, Buttons::KEY_SWITCH);
        assert_eq!(rig.display.lcd().cursor(), (1, 1));
        // One-byte NOP: positions 0 and 1 only.
        rig.update(1200, Buttons::KEY_SWITCH);
        assert_eq!(rig.display.lcd().cursor(), (0, 1));
    }

    #[test]
    fn view_change_clears_and_redraws() {
        let mut rig = Rig::new();
        rig.update(100, Buttons::KEY_SWITCH);
        assert_eq!(rig.display.view(), View::Disassembly);
        rig.update(200, Buttons::empty());
        assert_eq!(rig.display.view(), View::Registers);
        assert!(rig.display.lcd().line(0).starts_with("A:00"));
        rig.update(300, Buttons::KEY_SWITCH);
        assert!(rig.display.lcd().line(0).starts_with("0000: NOP"));
        assert_eq!(rig.display.lcd().line(1), "00.00.00.00.00.00.00");
    }

    #[test]
    fn disassembly_follows_steps() {
        let mut rig = Rig::new();
        rig.mem.load(0, &[0x3e, 0x42, 0x3c]);
        let held = Buttons::KEY_SWITCH;
        rig.update(1000, held);
        rig.update(1001, held | Buttons::SINGLE_STEP);
        assert_eq!(rig.display.lcd().line(0).trim_end(), "0002: INR A");
        assert_eq!(rig.display.leds(), 0x003c);
    }

    #[test]
    fn banner_holds_then_view_returns() {
        let mut rig = Rig::new();
        let held = Buttons::KEY_SWITCH;
        rig.update(1000, held);
        let switches = 0x0003;
        let events = rig.panel.tick(
            &mut rig.cpu,
            &mut rig.mem,
            2000,
            switches,
            held | Buttons::RESET,
        );
        let program = events.loaded.map(|p| p.name);
        assert_eq!(program, Some("Fibonacci"));
        rig.display.show_banner("Fibonacci", 2000);
        rig.display.refresh(2000, &rig.cpu, &rig.mem, &mut rig.panel);
        assert_eq!(rig.display.lcd().line(0).trim_end(), "Loaded: Fibonacci");

        rig.update(2499, held);
        assert!(rig.display.banner_active());
        assert_eq!(rig.display.lcd().line(0).trim_end(), "Loaded: Fibonacci");

        rig.update(2500, held);
        assert!(!rig.display.banner_active());
        assert_eq!(rig.display.lcd().line(0).trim_end(), "0000: MVI B,00");
    }

    #[test]
    fn running_machine_keeps_leds_current() {
        let mut rig = Rig::new();
        rig.mem.load(0, &[0x00, 0x00, 0x00, 0x76]);
        for now in 1..=50 {
            rig.update(now, RunMode::RunFast.buttons() | Buttons::KEY_SWITCH);
        }
        assert!(rig.cpu.halted);
        assert_eq!(rig.display.leds(), 0x0000);
        assert!(rig.display.lcd().line(0).starts_with("0004: NOP"));
    }
}
