use crate::display::{View, LCD_COLUMNS, LCD_ROWS};
use crate::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::machine::Machine;
use crate::panel::{Buttons, RunMode};
use crate::{SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH};
use micro8080_common::app::App;
use micro8080_common::clock::Clock;
use micro8080_common::color::Color;
use micro8080_common::key::Key;

const CELL_WIDTH: usize = GLYPH_WIDTH + 1;
const CELL_HEIGHT: usize = GLYPH_HEIGHT + 1;

const LCD_X: usize = 18;
const LCD_Y: usize = 8;
const LCD_BORDER: usize = 2;

const LED_Y: usize = 40;
const SWITCH_Y: usize = 54;
const STATUS_Y: usize = 80;
const BANK_X: usize = 8;
const LED_SIZE: usize = 6;
const SWITCH_HEIGHT: usize = 12;
/// Horizontal pitch of the LED and switch banks.
const BANK_PITCH: usize = 9;

/// Front panel application driven by the SDL2 frontend.
///
/// Keyboard layout:
///
/// - `0`-`9`, `A`-`F` shift a hex digit into the data switches,
///   `Backspace` clears them
/// - `F1` stop, `F2` run slow, `F3` run fast
/// - `F5` single step, `F6` reset, `F7` store address, `F8` store byte,
///   `F9` store word (momentary)
/// - `F10` toggles auto increment, `F11` the display key switch
/// - `Escape` quits
pub struct MicrocomputerApp {
    pub machine: Machine,
    clock: Clock,
    switches: u16,
    /// Level inputs and held momentary buttons.
    buttons: Buttons,
    /// Momentary presses not yet seen by a tick, so a press and release
    /// inside one frame still registers.
    latched: Buttons,
    should_exit: bool,
}

impl Default for MicrocomputerApp {
    fn default() -> Self {
        Self::new(Machine::new())
    }
}

impl MicrocomputerApp {
    pub fn new(machine: Machine) -> Self {
        Self {
            machine,
            clock: Clock::new(),
            switches: 0,
            buttons: Buttons::KEY_SWITCH,
            latched: Buttons::empty(),
            should_exit: false,
        }
    }

    /// Preset the data switches, e.g. with a catalog code before the first
    /// reset.
    pub fn with_switches(mut self, switches: u16) -> Self {
        self.switches = switches;
        self
    }

    pub fn switches(&self) -> u16 {
        self.switches
    }

    pub fn buttons(&self) -> Buttons {
        self.buttons | self.latched
    }

    fn set_run_mode(&mut self, mode: RunMode) {
        self.buttons.remove(Buttons::STOP_RUN | Buttons::RUN_SPEED);
        self.buttons.insert(mode.buttons());
    }

    fn momentary(key: Key) -> Option<Buttons> {
        match key {
            Key::F5 => Some(Buttons::SINGLE_STEP),
            Key::F6 => Some(Buttons::RESET),
            Key::F7 => Some(Buttons::STORE_ADDR),
            Key::F8 => Some(Buttons::STORE_BYTE),
            Key::F9 => Some(Buttons::STORE_WORD),
            _ => None,
        }
    }

    /// Tick the machine at `now` with the current inputs.
    pub fn tick(&mut self, now: u32) {
        let buttons = self.buttons | self.latched;
        self.machine.update(now, self.switches, buttons);
        self.latched = Buttons::empty();
    }

    fn render(&self, screen: &mut [u8]) {
        debug_assert_eq!(screen.len(), SCREEN_WIDTH * SCREEN_HEIGHT * 3);
        fill_rect(screen, 0, 0, SCREEN_WIDTH, SCREEN_HEIGHT, Color::PANEL);

        self.render_lcd(screen);

        let leds = self.machine.leds();
        for i in 0..16 {
            let bit = 15 - i;
            let color = if leds & (1 << bit) != 0 {
                Color::LED_ON
            } else {
                Color::LED_OFF
            };
            fill_rect(screen, bank_x(i), LED_Y, LED_SIZE, LED_SIZE, color);
        }

        for i in 0..16 {
            let bit = 15 - i;
            let x = bank_x(i);
            fill_rect(screen, x, SWITCH_Y, LED_SIZE, SWITCH_HEIGHT, Color::BLACK);
            let lever_y = if self.switches & (1 << bit) != 0 {
                SWITCH_Y
            } else {
                SWITCH_Y + SWITCH_HEIGHT / 2
            };
            fill_rect(screen, x, lever_y, LED_SIZE, SWITCH_HEIGHT / 2, Color::GRAY);
        }

        let panel = self.machine.panel();
        let status = format!(
            "{} {} {} SW:{:04X}",
            panel.run_mode().name(),
            if panel.auto_increment() { "AI" } else { "--" },
            match self.machine.display().view() {
                View::Disassembly => "DIS",
                View::Registers => "REG",
            },
            self.switches
        );
        draw_text(screen, BANK_X, STATUS_Y, status.as_bytes(), Color::WHITE);
        if self.machine.cpu().halted {
            draw_text(screen, BANK_X, STATUS_Y + CELL_HEIGHT, b"HALT", Color::RED);
        }
    }

    fn render_lcd(&self, screen: &mut [u8]) {
        let lcd = self.machine.lcd();
        fill_rect(
            screen,
            LCD_X - LCD_BORDER,
            LCD_Y - LCD_BORDER,
            LCD_COLUMNS * CELL_WIDTH + LCD_BORDER * 2,
            LCD_ROWS * CELL_HEIGHT + LCD_BORDER * 2,
            Color::LCD_BACKGROUND,
        );
        if !lcd.display_on() {
            return;
        }
        for row in 0..LCD_ROWS {
            draw_text(
                screen,
                LCD_X,
                LCD_Y + row * CELL_HEIGHT,
                lcd.row(row),
                Color::LCD_PIXEL,
            );
        }
        if lcd.cursor_visible() {
            let (col, row) = lcd.cursor();
            if col < LCD_COLUMNS {
                let x = LCD_X + col * CELL_WIDTH;
                let y = LCD_Y + row * CELL_HEIGHT + GLYPH_HEIGHT;
                fill_rect(screen, x, y, GLYPH_WIDTH, 1, Color::LCD_PIXEL);
            }
        }
    }
}

impl App for MicrocomputerApp {
    fn init(&mut self) {
        log::info!("micro8080 front panel init");
        self.clock = Clock::new();
    }

    fn update(&mut self, screen_state: &mut [u8]) {
        let now = self.clock.now_ms();
        self.tick(now);
        self.render(screen_state);
    }

    fn handle_key_event(&mut self, key: Key, is_down: bool) {
        if let Some(button) = Self::momentary(key) {
            if is_down {
                self.buttons.insert(button);
                self.latched.insert(button);
            } else {
                self.buttons.remove(button);
            }
            return;
        }
        if !is_down {
            return;
        }
        if let Some(digit) = key.hex_digit() {
            self.switches = (self.switches << 4) | u16::from(digit);
            return;
        }
        match key {
            Key::Backspace => self.switches = 0,
            Key::F1 => self.set_run_mode(RunMode::Stop),
            Key::F2 => self.set_run_mode(RunMode::RunSlow),
            Key::F3 => self.set_run_mode(RunMode::RunFast),
            Key::F10 => self.buttons.toggle(Buttons::AUTO_INC),
            Key::F11 => self.buttons.toggle(Buttons::KEY_SWITCH),
            Key::Escape => self.should_exit = true,
            _ => {}
        }
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        let cpu = self.machine.cpu();
        log::info!(
            "micro8080 exit at PC={:04X} A={:02X} halted={}",
            cpu.pc,
            cpu.a,
            cpu.halted
        );
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        SCREEN_SCALE
    }

    fn title(&self) -> String {
        "micro8080 front panel".to_string()
    }
}

fn bank_x(i: usize) -> usize {
    // Small gap between the high and low byte.
    BANK_X + i * BANK_PITCH + if i >= 8 { 2 } else { 0 }
}

fn put_pixel(screen: &mut [u8], x: usize, y: usize, color: Color) {
    if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
        return;
    }
    let idx = (y * SCREEN_WIDTH + x) * 3;
    screen[idx] = color.r;
    screen[idx + 1] = color.g;
    screen[idx + 2] = color.b;
}

fn fill_rect(screen: &mut [u8], x: usize, y: usize, w: usize, h: usize, color: Color) {
    for yy in y..y + h {
        for xx in x..x + w {
            put_pixel(screen, xx, yy, color);
        }
    }
}

fn draw_text(screen: &mut [u8], x: usize, y: usize, text: &[u8], color: Color) {
    for (i, &ch) in text.iter().enumerate() {
        let cx = x + i * CELL_WIDTH;
        for gy in 0..GLYPH_HEIGHT {
            for gx in 0..GLYPH_WIDTH {
                if font::pixel(ch, gx, gy) {
                    put_pixel(screen, cx + gx, y + gy, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut MicrocomputerApp, key: Key) {
        app.handle_key_event(key, true);
        app.handle_key_event(key, false);
    }

    fn pixel(screen: &[u8], x: usize, y: usize) -> Color {
        let idx = (y * SCREEN_WIDTH + x) * 3;
        Color::new_rgb(screen[idx], screen[idx + 1], screen[idx + 2])
    }

    #[test]
    fn hex_keys_shift_into_switches() {
        let mut app = MicrocomputerApp::default();
        for key in [Key::Num1, Key::A, Key::F, Key::Num0, Key::C] {
            press(&mut app, key);
        }
        assert_eq!(app.switches(), 0xaf0c);
        press(&mut app, Key::Backspace);
        assert_eq!(app.switches(), 0);
    }

    #[test]
    fn run_mode_keys_set_level_bits() {
        let mut app = MicrocomputerApp::default();
        press(&mut app, Key::F3);
        assert_eq!(RunMode::from_buttons(app.buttons()), RunMode::RunFast);
        press(&mut app, Key::F2);
        assert_eq!(RunMode::from_buttons(app.buttons()), RunMode::RunSlow);
        press(&mut app, Key::F1);
        assert_eq!(RunMode::from_buttons(app.buttons()), RunMode::Stop);
    }

    #[test]
    fn quick_tap_survives_until_the_next_tick() {
        let mut app = MicrocomputerApp::default().with_switches(0x0001);
        press(&mut app, Key::F6);
        assert!(app.buttons().contains(Buttons::RESET));
        app.tick(1000);
        assert!(!app.buttons().contains(Buttons::RESET));
        assert_eq!(app.machine.memory().as_slice()[..2], [0x3e, 0x00]);
    }

    #[test]
    fn toggles_flip_their_bits() {
        let mut app = MicrocomputerApp::default();
        assert!(app.buttons().contains(Buttons::KEY_SWITCH));
        press(&mut app, Key::F11);
        assert!(!app.buttons().contains(Buttons::KEY_SWITCH));
        press(&mut app, Key::F10);
        assert!(app.buttons().contains(Buttons::AUTO_INC));
    }

    #[test]
    fn escape_requests_exit() {
        let mut app = MicrocomputerApp::default();
        assert!(!app.should_exit());
        press(&mut app, Key::Escape);
        assert!(app.should_exit());
    }

    #[test]
    fn render_draws_leds_for_pc_page_and_data() {
        let mut app = MicrocomputerApp::default();
        app.machine.load_image(0x8000, &[0x01]);
        app.tick(1000);
        let mut screen = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
        app.render(&mut screen);

        // Bit 15 is the leftmost LED, bit 0 the rightmost.
        assert_eq!(pixel(&screen, bank_x(0), LED_Y), Color::LED_ON);
        assert_eq!(pixel(&screen, bank_x(1), LED_Y), Color::LED_OFF);
        assert_eq!(pixel(&screen, bank_x(15), LED_Y), Color::LED_ON);
        assert_eq!(pixel(&screen, bank_x(14), LED_Y), Color::LED_OFF);
        assert_eq!(pixel(&screen, 0, 0), Color::PANEL);
    }
}
