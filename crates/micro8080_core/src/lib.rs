pub mod app;
pub mod cpu;
pub mod disasm;
pub mod display;
pub mod font;
pub mod machine;
pub mod memory;
pub mod panel;
pub mod programs;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use app::MicrocomputerApp;
pub use cpu::{Cpu8080, Flags, MemoryPort};
pub use machine::Machine;
pub use memory::Memory;
pub use panel::{Buttons, Panel, PanelConfig, RunMode};

/// Logical width of the rendered front panel in pixels.
pub const SCREEN_WIDTH: usize = 160;
/// Logical height of the rendered front panel in pixels.
pub const SCREEN_HEIGHT: usize = 96;
/// Default integer scaling factor for the SDL2 frontend.
pub const SCREEN_SCALE: u32 = 4;
