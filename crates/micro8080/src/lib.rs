use anyhow::{bail, Context, Result};
use log::{info, trace};
use typed_builder::TypedBuilder;

use micro8080_common::app::App;
use micro8080_core::cpu::Cpu8080;
use micro8080_core::display::BANNER_MS;
use micro8080_core::programs::{self, Program};
use micro8080_core::{disasm, Buttons, Machine, MicrocomputerApp, PanelConfig, RunMode};
use micro8080_sdl2::{SdlContext, SdlInitInfo};

/// Simulated boot time of the headless clock. Panel timestamps start at 0,
/// so the first reset press has to come later than one debounce window.
const HEADLESS_START_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    Sdl,
    Headless,
}

impl Frontend {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "sdl" | "sdl2" | "gui" => Ok(Frontend::Sdl),
            "headless" | "cli" => Ok(Frontend::Headless),
            other => bail!("unknown frontend '{other}'. Supported: sdl, headless"),
        }
    }
}

/// What to put in memory before running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramSource {
    /// A built-in image, loaded through the reset button.
    Catalog(&'static Program),
    /// A raw binary loaded at 0x0000.
    Image(Vec<u8>),
}

impl ProgramSource {
    /// Catalog name (`stack-test`), catalog code (`5`, `0x05`) or a path to
    /// a raw image.
    pub fn parse(arg: &str) -> Result<Self> {
        if let Some(program) = programs::find_by_name(arg) {
            return Ok(ProgramSource::Catalog(program));
        }
        if let Some(code) = parse_code(arg) {
            return match programs::find(code) {
                Some(program) => Ok(ProgramSource::Catalog(program)),
                None => bail!("no catalog program with code {code:#04x}"),
            };
        }
        let bytes =
            std::fs::read(arg).with_context(|| format!("failed to read program image '{arg}'"))?;
        if bytes.is_empty() {
            bail!("program image '{arg}' is empty");
        }
        if bytes.len() > micro8080_core::memory::MEMORY_SIZE {
            bail!("program image '{arg}' is larger than 64 KiB");
        }
        Ok(ProgramSource::Image(bytes))
    }

    fn describe(&self) -> String {
        match self {
            ProgramSource::Catalog(program) => format!("{} ({:#04x})", program.name, program.code),
            ProgramSource::Image(bytes) => format!("{} byte image", bytes.len()),
        }
    }
}

fn parse_code(arg: &str) -> Option<u8> {
    match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) => arg.parse().ok(),
        None => None,
    }
}

/// Parsed command line: `micro8080 [sdl|headless] [program] [duration-ms]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub frontend: Frontend,
    pub program: Option<ProgramSource>,
    pub duration_ms: Option<u32>,
}

impl Cli {
    pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let frontend = match args.next() {
            Some(name) => Frontend::parse(&name)?,
            None => Frontend::Sdl,
        };
        let program = args
            .next()
            .map(|arg| ProgramSource::parse(&arg))
            .transpose()?;
        let duration_ms = args
            .next()
            .map(|arg| {
                arg.parse::<u32>()
                    .with_context(|| format!("invalid duration '{arg}'"))
            })
            .transpose()?;
        if let Some(extra) = args.next() {
            bail!("unexpected argument '{extra}'");
        }
        Ok(Cli {
            frontend,
            program,
            duration_ms,
        })
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.frontend {
        Frontend::Sdl => run_sdl(cli.program),
        Frontend::Headless => {
            let program = cli
                .program
                .unwrap_or(ProgramSource::Catalog(&programs::COUNTER));
            let config = HeadlessConfig::builder()
                .program(program)
                .duration_ms(cli.duration_ms.unwrap_or(1000))
                .build();
            let report = run_headless(&config)?;
            println!("{}", report.lcd[0]);
            println!("{}", report.lcd[1]);
            println!("{}", report.summary());
            Ok(())
        }
    }
}

pub fn run_sdl(program: Option<ProgramSource>) -> Result<()> {
    let mut app = MicrocomputerApp::default();
    match &program {
        Some(ProgramSource::Catalog(p)) => {
            app.machine.load_program(p);
            app = app.with_switches(u16::from(p.code));
        }
        Some(ProgramSource::Image(bytes)) => app.machine.load_image(0x0000, bytes),
        None => {}
    }
    if let Some(program) = &program {
        info!("Loaded {}", program.describe());
    }
    let width = app.width();
    let height = app.height();
    let scale = app.scale();
    let init_info = SdlInitInfo::builder()
        .width(width)
        .height(height)
        .scale(scale)
        .title(app.title())
        .build();
    SdlContext::run(init_info, app)?;
    Ok(())
}

/// Settings for a run without a window.
#[derive(Debug, Clone, TypedBuilder)]
pub struct HeadlessConfig {
    pub program: ProgramSource,
    #[builder(default = RunMode::RunFast)]
    pub run_mode: RunMode,
    /// Simulated run time after the program is loaded.
    #[builder(default = 1000)]
    pub duration_ms: u32,
    /// Simulated time between two panel ticks.
    #[builder(default = 1)]
    pub tick_ms: u32,
    #[builder(default)]
    pub panel: PanelConfig,
    /// Data switches while running.
    #[builder(default = 0)]
    pub switches: u16,
}

/// Machine state at the end of a headless run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessReport {
    pub cpu: Cpu8080,
    pub steps: u64,
    pub cycles: u64,
    pub leds: u16,
    pub lcd: [String; 2],
    /// Simulated time actually run, shorter than requested on HLT.
    pub elapsed_ms: u32,
}

impl HeadlessReport {
    pub fn summary(&self) -> String {
        let cpu = &self.cpu;
        format!(
            "PC={:04X} SP={:04X} A={:02X} F={:02X} BC={:04X} DE={:04X} HL={:04X} \
             halted={} steps={} cycles={} elapsed={}ms",
            cpu.pc,
            cpu.sp,
            cpu.a,
            cpu.f.bits(),
            cpu.bc(),
            cpu.de(),
            cpu.hl(),
            cpu.halted,
            self.steps,
            self.cycles,
            self.elapsed_ms
        )
    }
}

/// Run the machine on a simulated clock and report where it ended up.
///
/// Catalog programs are loaded the way a user would: code on the switches,
/// reset pressed and released, then a pause while the load banner shows.
/// The run stops early when the CPU halts.
pub fn run_headless(config: &HeadlessConfig) -> Result<HeadlessReport> {
    if config.tick_ms == 0 {
        bail!("tick length must be at least 1 ms");
    }

    let mut machine = Machine::with_config(config.panel);
    let mut now = HEADLESS_START_MS;
    let view = Buttons::KEY_SWITCH;

    match &config.program {
        ProgramSource::Catalog(program) => {
            let code = u16::from(program.code);
            let events = machine.update(now, code, view | Buttons::RESET);
            if events.loaded.is_none() {
                bail!("reset did not load {}", program.name);
            }
            now = now.wrapping_add(1);
            machine.update(now, code, view);
            // Wait out the load banner before switching to run.
            now = now.wrapping_add(BANNER_MS);
            machine.update(now, code, view);
        }
        ProgramSource::Image(bytes) => machine.load_image(0x0000, bytes),
    }
    info!(
        "headless run: {} for {} ms in {} mode",
        config.program.describe(),
        config.duration_ms,
        config.run_mode.name()
    );

    let buttons = view | config.run_mode.buttons();
    let mut steps = 0u64;
    let mut cycles = 0u64;
    let mut elapsed = 0u32;
    while elapsed < config.duration_ms {
        now = now.wrapping_add(config.tick_ms);
        elapsed = elapsed.saturating_add(config.tick_ms);

        let pc = machine.cpu().pc;
        let events = machine.update(now, config.switches, buttons);
        if events.steps > 0 {
            steps += u64::from(events.steps);
            cycles += u64::from(events.cycles);
            if log::log_enabled!(log::Level::Trace) {
                let (text, _) = disasm::disassemble(machine.memory(), pc);
                let cpu = machine.cpu();
                trace!(
                    "{:04X}  {:<12} A={:02X} BC={:04X} DE={:04X} HL={:04X} SP={:04X}",
                    pc,
                    text,
                    cpu.a,
                    cpu.bc(),
                    cpu.de(),
                    cpu.hl(),
                    cpu.sp
                );
            }
        }
        if machine.cpu().halted {
            info!("halted at {:04X} after {} ms", pc, elapsed);
            break;
        }
    }

    let lcd = machine.lcd();
    let report = HeadlessReport {
        cpu: *machine.cpu(),
        steps,
        cycles,
        leds: machine.leds(),
        lcd: [lcd.line(0), lcd.line(1)],
        elapsed_ms: elapsed,
    };
    info!("{}", report.summary());
    Ok(report)
}
