use log::info;

use crate::cpu::Cpu8080;
use crate::display::{Display, Lcd};
use crate::memory::Memory;
use crate::panel::{Buttons, Panel, PanelConfig, TickEvents};
use crate::programs::Program;

/// The complete microcomputer: CPU, 64 KiB RAM, front panel and display.
///
/// Hosts sample their inputs and clock and call [`Machine::update`] once per
/// tick; everything else is derived state they can read back.
#[derive(Clone)]
pub struct Machine {
    cpu: Cpu8080,
    memory: Memory,
    panel: Panel,
    display: Display,
}

impl Machine {
    /// Construct a powered-up machine with cleared memory and the default
    /// panel timing.
    pub fn new() -> Self {
        Self::with_config(PanelConfig::default())
    }

    /// Construct a new machine with explicit panel timing.
    pub fn with_config(config: PanelConfig) -> Self {
        Self {
            cpu: Cpu8080::new(),
            memory: Memory::new(),
            panel: Panel::with_config(config),
            display: Display::new(),
        }
    }

    /// Run one panel tick at `now` and refresh the LEDs and LCD.
    pub fn update(&mut self, now: u32, switches: u16, buttons: Buttons) -> TickEvents {
        let events = self
            .panel
            .tick(&mut self.cpu, &mut self.memory, now, switches, buttons);
        if let Some(program) = events.loaded {
            info!(
                "loaded {} ({} bytes at {:04X})",
                program.name,
                program.bytes.len(),
                program.address
            );
            self.display.show_banner(program.name, now);
        }
        self.display
            .refresh(now, &self.cpu, &self.memory, &mut self.panel);
        events
    }

    /// Copy a raw image into memory and point PC at it.
    pub fn load_image(&mut self, addr: u16, bytes: &[u8]) {
        self.memory.load(addr, bytes);
        self.cpu.pc = addr;
        self.cpu.halted = false;
        self.panel.mark_dirty();
        info!("loaded {} byte image at {:04X}", bytes.len(), addr);
    }

    pub fn load_program(&mut self, program: &Program) {
        self.load_image(program.address, program.bytes);
    }

    /// Zero the CPU and memory, keeping the panel timing.
    pub fn power_cycle(&mut self) {
        let config = *self.panel.config();
        *self = Self::with_config(config);
    }

    pub fn cpu(&self) -> &Cpu8080 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu8080 {
        &mut self.cpu
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn lcd(&self) -> &Lcd {
        self.display.lcd()
    }

    pub fn leds(&self) -> u16 {
        self.display.leds()
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::MemoryPort;
    use crate::panel::RunMode;
    use crate::programs::{self, FIBONACCI};

    /// Press reset with `code` on the switches and release it again.
    fn reset_with(machine: &mut Machine, now: u32, code: u16, held: Buttons) -> TickEvents {
        let events = machine.update(now, code, held | Buttons::RESET);
        machine.update(now + 1, code, held);
        events
    }

    #[test]
    fn reset_loads_and_runs_counter() {
        let mut machine = Machine::new();
        let events = reset_with(&mut machine, 1000, 0x01, Buttons::KEY_SWITCH);
        assert_eq!(events.loaded.map(|p| p.name), Some("Counter"));
        assert!(machine.display().banner_active());

        let run = RunMode::RunFast.buttons() | Buttons::KEY_SWITCH;
        let mut steps = 0;
        for now in 1002..=1100 {
            steps += machine.update(now, 0x01, run).steps;
        }
        assert!(steps >= 9);
        assert!(machine.cpu().a > 0);
        assert!(matches!(machine.cpu().pc, 0x0002 | 0x0003));
    }

    #[test]
    fn every_catalog_code_loads_its_image() {
        for program in programs::CATALOG.iter() {
            let mut machine = Machine::new();
            let events = reset_with(&mut machine, 500, u16::from(program.code), Buttons::empty());
            assert_eq!(events.loaded, Some(program));
            let start = program.address as usize;
            assert_eq!(
                &machine.memory().as_slice()[start..start + program.bytes.len()],
                program.bytes
            );
        }
    }

    #[test]
    fn deposit_program_from_the_switches() {
        // Enter MVI A,07 ; INR A ; HLT by hand at 0x0100 and single-step it.
        let mut machine = Machine::new();
        let mut now = 1000;
        let mut press = |machine: &mut Machine, switches: u16, button: Buttons| {
            machine.update(now, switches, button);
            machine.update(now + 1, switches, Buttons::empty());
            now += 100;
        };
        press(&mut machine, 0x0100, Buttons::STORE_ADDR);
        press(&mut machine, 0x073e, Buttons::STORE_WORD);
        press(&mut machine, 0x003c, Buttons::STORE_BYTE);
        press(&mut machine, 0x0076, Buttons::STORE_BYTE);
        press(&mut machine, 0x0100, Buttons::STORE_ADDR);
        assert_eq!(machine.leds(), 0x013e);

        for _ in 0..3 {
            press(&mut machine, 0, Buttons::SINGLE_STEP);
        }
        assert_eq!(machine.cpu().a, 0x08);
        assert!(machine.cpu().halted);
        assert_eq!(machine.memory().read(0x0103), 0x76);
    }

    #[test]
    fn load_image_points_pc_at_it() {
        let mut machine = Machine::new();
        machine.cpu_mut().halted = true;
        machine.load_image(0x4000, &[0x3c, 0x76]);
        assert_eq!(machine.cpu().pc, 0x4000);
        assert!(!machine.cpu().halted);
        assert!(machine.panel().is_display_dirty());

        machine.load_program(&FIBONACCI);
        assert_eq!(machine.cpu().pc, 0x0000);
        assert_eq!(machine.memory().read(0x0004), 0x78);
    }

    #[test]
    fn power_cycle_clears_state_but_keeps_timing() {
        let config = PanelConfig {
            debounce_ms: 20,
            ..PanelConfig::default()
        };
        let mut machine = Machine::with_config(config);
        machine.load_image(0x0000, &[0x3e, 0x99]);
        machine.cpu_mut().a = 0x42;
        machine.power_cycle();
        assert_eq!(*machine.cpu(), Cpu8080::default());
        assert!(machine.memory().as_slice().iter().all(|&b| b == 0));
        assert_eq!(machine.panel().config().debounce_ms, 20);
        assert!(machine.memory_mut().read(0) == 0);
    }
}
