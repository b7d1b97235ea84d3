//! Front-panel controller.
//!
//! The panel samples the button/switch inputs once per host tick and turns
//! them into CPU and memory actions: run/stop, single step, reset with an
//! optional catalog load, and address/byte/word deposit. Momentary inputs
//! are edge-detected and debounced per bit.

use bitflags::bitflags;
use log::debug;

use crate::cpu::{Cpu8080, MemoryPort};
use crate::programs::{self, Program};

bitflags! {
    /// Panel inputs, already normalised so that 1 means pressed or ON.
    ///
    /// `AUTO_INC` is the exception: the toggle is active-low, so auto
    /// increment is on while the bit is clear.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u16 {
        const STOP_RUN = 0x001;
        const RUN_SPEED = 0x002;
        const SINGLE_STEP = 0x004;
        const RESET = 0x008;
        const STORE_ADDR = 0x010;
        const STORE_BYTE = 0x020;
        const STORE_WORD = 0x040;
        const AUTO_INC = 0x080;
        const KEY_SWITCH = 0x100;
    }
}

/// Number of input bits that carry a debounce timestamp.
pub const INPUT_COUNT: usize = 9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunMode {
    #[default]
    Stop,
    RunSlow,
    RunFast,
}

impl RunMode {
    /// Decode the run/speed pair: `00` stop, `01` slow, anything else fast.
    pub fn from_buttons(buttons: Buttons) -> Self {
        match buttons.bits() & 0x03 {
            0x00 => RunMode::Stop,
            0x01 => RunMode::RunSlow,
            _ => RunMode::RunFast,
        }
    }

    /// The run/speed input bits that select this mode.
    pub fn buttons(self) -> Buttons {
        match self {
            RunMode::Stop => Buttons::empty(),
            RunMode::RunSlow => Buttons::STOP_RUN,
            RunMode::RunFast => Buttons::STOP_RUN | Buttons::RUN_SPEED,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RunMode::Stop => "STOP",
            RunMode::RunSlow => "SLOW",
            RunMode::RunFast => "FAST",
        }
    }
}

/// Panel timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    /// Minimum time between two accepted presses of the same input.
    pub debounce_ms: u32,
    /// Step interval while running slow.
    pub slow_interval_ms: u32,
    /// Step interval while running fast.
    pub fast_interval_ms: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            slow_interval_ms: 300,
            fast_interval_ms: 10,
        }
    }
}

/// Current and previous input snapshot plus per-bit press timestamps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub current: Buttons,
    pub previous: Buttons,
    last_press: [u32; INPUT_COUNT],
}

impl ButtonState {
    pub fn update(&mut self, buttons: Buttons) {
        self.previous = self.current;
        self.current = buttons;
    }

    /// Debounced rising edge of `button` (a single input bit).
    ///
    /// An edge is accepted only when at least `debounce_ms` have elapsed
    /// since the last accepted press of the same bit. Accepting records
    /// `now`; a rejected edge leaves the timestamp alone.
    pub fn pressed(&mut self, button: Buttons, now: u32, debounce_ms: u32) -> bool {
        let is_pressed = self.current.contains(button);
        let was_pressed = self.previous.contains(button);
        if !is_pressed || was_pressed {
            return false;
        }
        let slot = button.bits().trailing_zeros() as usize;
        if now.wrapping_sub(self.last_press[slot]) >= debounce_ms {
            self.last_press[slot] = now;
            return true;
        }
        false
    }

    pub fn last_press(&self, button: Buttons) -> u32 {
        self.last_press[button.bits().trailing_zeros() as usize]
    }
}

/// What happened during one [`Panel::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Catalog image loaded by a reset press.
    pub loaded: Option<&'static Program>,
    /// A reset press was accepted.
    pub reset: bool,
    /// Instructions executed (single step or timed step).
    pub steps: u32,
    /// Cycles reported by those instructions.
    pub cycles: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Panel {
    config: PanelConfig,
    run_mode: RunMode,
    buttons: ButtonState,
    auto_increment: bool,
    step_interval_ms: u32,
    last_step_time: u32,
    display_dirty: bool,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel {
    pub fn new() -> Self {
        Self::with_config(PanelConfig::default())
    }

    pub fn with_config(config: PanelConfig) -> Self {
        Self {
            config,
            run_mode: RunMode::Stop,
            buttons: ButtonState::default(),
            auto_increment: false,
            step_interval_ms: config.slow_interval_ms,
            last_step_time: 0,
            display_dirty: true,
        }
    }

    /// Run one control pass over the inputs sampled at `now`.
    ///
    /// Actions run in a fixed order: reset, single step (stop mode only),
    /// store address, store byte, store word, then the timed step when
    /// running. Every action that changes CPU-visible state marks the
    /// display dirty.
    pub fn tick<M: MemoryPort>(
        &mut self,
        cpu: &mut Cpu8080,
        mem: &mut M,
        now: u32,
        switches: u16,
        buttons: Buttons,
    ) -> TickEvents {
        let mut events = TickEvents::default();
        let debounce = self.config.debounce_ms;

        self.buttons.update(buttons);
        self.auto_increment = !buttons.contains(Buttons::AUTO_INC);

        let mode = RunMode::from_buttons(buttons);
        match mode {
            RunMode::Stop => {}
            RunMode::RunSlow => self.step_interval_ms = self.config.slow_interval_ms,
            RunMode::RunFast => self.step_interval_ms = self.config.fast_interval_ms,
        }
        if mode != self.run_mode {
            debug!("run mode {} -> {}", self.run_mode.name(), mode.name());
            self.run_mode = mode;
        }

        if self.buttons.pressed(Buttons::RESET, now, debounce) {
            cpu.reset();
            events.reset = true;
            let code = (switches & 0xff) as u8;
            match programs::find(code) {
                Some(program) => {
                    program.load(mem);
                    events.loaded = Some(program);
                    debug!("reset, loaded {} ({:#04x})", program.name, code);
                }
                None => debug!("reset, no program for code {:#04x}", code),
            }
            self.display_dirty = true;
        }

        if self.run_mode == RunMode::Stop
            && self.buttons.pressed(Buttons::SINGLE_STEP, now, debounce)
            && !cpu.halted
        {
            events.cycles += cpu.step(mem);
            events.steps += 1;
            self.display_dirty = true;
            if cpu.halted {
                debug!("halted at {:04X}", cpu.pc.wrapping_sub(1));
            }
        }

        if self.buttons.pressed(Buttons::STORE_ADDR, now, debounce) {
            cpu.pc = switches;
            debug!("store address {:04X}", switches);
            self.display_dirty = true;
        }

        if self.buttons.pressed(Buttons::STORE_BYTE, now, debounce) {
            let value = (switches & 0xff) as u8;
            mem.write(cpu.pc, value);
            debug!("store byte {:02X} at {:04X}", value, cpu.pc);
            if self.auto_increment {
                cpu.pc = cpu.pc.wrapping_add(1);
            }
            self.display_dirty = true;
        }

        if self.buttons.pressed(Buttons::STORE_WORD, now, debounce) {
            mem.write_word(cpu.pc, switches);
            debug!("store word {:04X} at {:04X}", switches, cpu.pc);
            if self.auto_increment {
                cpu.pc = cpu.pc.wrapping_add(2);
            }
            self.display_dirty = true;
        }

        if self.run_mode != RunMode::Stop
            && !cpu.halted
            && now.wrapping_sub(self.last_step_time) >= self.step_interval_ms
        {
            events.cycles += cpu.step(mem);
            events.steps += 1;
            self.display_dirty = true;
            self.last_step_time = now;
            if cpu.halted {
                debug!("halted at {:04X}", cpu.pc.wrapping_sub(1));
            }
        }

        events
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    pub fn buttons(&self) -> &ButtonState {
        &self.buttons
    }

    pub fn auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn step_interval_ms(&self) -> u32 {
        self.step_interval_ms
    }

    pub fn last_step_time(&self) -> u32 {
        self.last_step_time
    }

    pub fn is_display_dirty(&self) -> bool {
        self.display_dirty
    }

    pub fn mark_dirty(&mut self) {
        self.display_dirty = true;
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.display_dirty)
    }
}
