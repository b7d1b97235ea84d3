use crate::cpu::MemoryPort;
use crate::disasm;
use crate::machine::Machine;
use crate::panel::{Buttons, RunMode};
use js_sys::Uint8Array;
use micro8080_common::color::Color;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Browser binding. JavaScript owns the clock and the input widgets; it
/// calls `set_time` and `update` once per animation frame and reads the
/// LCD/LED state back.
#[wasm_bindgen]
pub struct EmuWasm {
    machine: Machine,
    time_ms: u32,
    ctx: CanvasRenderingContext2d,
}

#[wasm_bindgen]
impl EmuWasm {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<EmuWasm, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no #canvas element"))?;
        let canvas: HtmlCanvasElement = canvas
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("#canvas is not a canvas"))?;

        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("unexpected context type"))?;
        Ok(EmuWasm {
            machine: Machine::new(),
            time_ms: 0,
            ctx,
        })
    }

    #[wasm_bindgen]
    pub fn init(&mut self) {
        self.machine.power_cycle();
    }

    #[wasm_bindgen]
    pub fn set_time(&mut self, ms: u32) {
        self.time_ms = ms;
    }

    #[wasm_bindgen]
    pub fn update(&mut self, switches: u16, buttons: u16) {
        self.machine
            .update(self.time_ms, switches, Buttons::from_bits_truncate(buttons));
    }

    #[wasm_bindgen]
    pub fn lcd_line(&self, row: usize) -> String {
        if row > 1 {
            return String::new();
        }
        self.machine.lcd().line(row)
    }

    #[wasm_bindgen]
    pub fn lcd_cursor_col(&self) -> u8 {
        self.machine.lcd().cursor().0 as u8
    }

    #[wasm_bindgen]
    pub fn lcd_cursor_row(&self) -> u8 {
        self.machine.lcd().cursor().1 as u8
    }

    #[wasm_bindgen]
    pub fn lcd_cursor_on(&self) -> bool {
        self.machine.lcd().cursor_visible()
    }

    #[wasm_bindgen]
    pub fn led_pattern(&self) -> u16 {
        self.machine.leds()
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> u16 {
        self.machine.cpu().pc
    }

    #[wasm_bindgen]
    pub fn sp(&self) -> u16 {
        self.machine.cpu().sp
    }

    /// Register by name: `a f b c d e h l`.
    #[wasm_bindgen]
    pub fn reg(&self, name: &str) -> u8 {
        let cpu = self.machine.cpu();
        match name {
            "a" => cpu.a,
            "f" => cpu.f.bits(),
            "b" => cpu.b,
            "c" => cpu.c,
            "d" => cpu.d,
            "e" => cpu.e,
            "h" => cpu.h,
            "l" => cpu.l,
            _ => 0,
        }
    }

    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.machine.cpu().halted
    }

    /// 0 stop, 1 slow, 2 fast.
    #[wasm_bindgen]
    pub fn run_mode(&self) -> u8 {
        match self.machine.panel().run_mode() {
            RunMode::Stop => 0,
            RunMode::RunSlow => 1,
            RunMode::RunFast => 2,
        }
    }

    #[wasm_bindgen]
    pub fn read_memory(&self, addr: u16) -> u8 {
        self.machine.memory().read(addr)
    }

    #[wasm_bindgen]
    pub fn write_memory(&mut self, addr: u16, value: u8) {
        self.machine.memory_mut().write(addr, value);
    }

    #[wasm_bindgen]
    pub fn disasm(&self, addr: u16) -> String {
        disasm::disassemble(self.machine.memory(), addr).0
    }

    /// Load a raw image at 0x0000.
    #[wasm_bindgen]
    pub fn load_image(&mut self, data: Uint8Array) {
        self.machine.load_image(0x0000, &data.to_vec());
    }

    #[wasm_bindgen]
    pub fn draw_leds(&mut self, scale: usize) {
        let leds = self.machine.leds();
        for i in 0..16 {
            let color = if leds & (1 << (15 - i)) != 0 {
                Color::LED_ON
            } else {
                Color::LED_OFF
            };
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill_rect(
                (i * 2 * scale) as f64,
                0.0,
                scale as f64,
                scale as f64,
            );
        }
    }
}
