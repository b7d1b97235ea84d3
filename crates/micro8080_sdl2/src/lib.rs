use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use typed_builder::TypedBuilder;

use micro8080_common::app::App;
use micro8080_common::key::Key;
pub use sdl2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    RGB24,
}

#[derive(TypedBuilder)]
pub struct SdlInitInfo {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub title: String,
    #[builder(default = PixelFormat::RGB24)]
    pub pixel_format: PixelFormat,
    /// Sleep between two `App::update` calls.
    #[builder(default = 10)]
    pub tick_interval_ms: u64,
}

impl SdlInitInfo {
    /// Window geometry and title as reported by the app.
    pub fn for_app(app: &impl App) -> Self {
        SdlInitInfo::builder()
            .width(app.width())
            .height(app.height())
            .scale(app.scale())
            .title(app.title())
            .build()
    }
}

pub struct SdlContext;

impl SdlContext {
    pub fn run(sdl_init_info: SdlInitInfo, mut app: impl App) -> Result<()> {
        let SdlInitInfo {
            width,
            height,
            scale,
            title,
            pixel_format,
            tick_interval_ms,
        } = sdl_init_info;
        let sdl_context = sdl2::init()
            .map_err(|e| anyhow!(e))
            .context("failed to initialise SDL")?;
        let video_subsystem = sdl_context
            .video()
            .map_err(|e| anyhow!(e))
            .context("failed to initialise SDL video")?;
        let window = video_subsystem
            .window(&title, width * scale, height * scale)
            .position_centered()
            .build()
            .context("failed to create window")?;
        let mut canvas = window
            .into_canvas()
            .present_vsync()
            .build()
            .context("failed to create canvas")?;
        canvas
            .set_scale(scale as f32, scale as f32)
            .map_err(|e| anyhow!(e))?;
        let creator = canvas.texture_creator();
        let mut texture = creator
            .create_texture_target(map_pixel_format(pixel_format), width, height)
            .context("failed to create texture")?;
        let mut event_pump = sdl_context.event_pump().map_err(|e| anyhow!(e))?;

        let color_size = map_pixel_format_size(pixel_format);
        let mut screen_state = vec![0u8; (width * color_size * height) as usize];
        app.init();
        log::info!("{title}: {width}x{height} x{scale}, tick {tick_interval_ms} ms");
        loop {
            if app.should_exit() {
                app.exit();
                break;
            }

            while let Some(event) = event_pump.poll_event() {
                match event {
                    Event::Quit { .. } => {
                        app.exit();
                        return Ok(());
                    }
                    Event::KeyDown {
                        keycode: Some(keycode),
                        repeat: false,
                        ..
                    } => {
                        app.handle_key_event(map_keycode(keycode), true);
                    }
                    Event::KeyUp {
                        keycode: Some(keycode),
                        ..
                    } => {
                        app.handle_key_event(map_keycode(keycode), false);
                    }
                    _ => {}
                }
            }

            app.update(&mut screen_state);

            texture.update(None, &screen_state, (width * color_size) as usize)?;
            canvas.copy(&texture, None, None).map_err(|e| anyhow!(e))?;
            canvas.present();
            std::thread::sleep(Duration::from_millis(tick_interval_ms));
        }

        Ok(())
    }
}

pub fn map_pixel_format(pixel_format: PixelFormat) -> PixelFormatEnum {
    match pixel_format {
        PixelFormat::RGB24 => PixelFormatEnum::RGB24,
    }
}

pub fn map_pixel_format_size(pixel_format: PixelFormat) -> u32 {
    match pixel_format {
        PixelFormat::RGB24 => 3,
    }
}

pub fn map_keycode(keycode: Keycode) -> Key {
    match keycode {
        Keycode::Num0 | Keycode::Kp0 => Key::Num0,
        Keycode::Num1 | Keycode::Kp1 => Key::Num1,
        Keycode::Num2 | Keycode::Kp2 => Key::Num2,
        Keycode::Num3 | Keycode::Kp3 => Key::Num3,
        Keycode::Num4 | Keycode::Kp4 => Key::Num4,
        Keycode::Num5 | Keycode::Kp5 => Key::Num5,
        Keycode::Num6 | Keycode::Kp6 => Key::Num6,
        Keycode::Num7 | Keycode::Kp7 => Key::Num7,
        Keycode::Num8 | Keycode::Kp8 => Key::Num8,
        Keycode::Num9 | Keycode::Kp9 => Key::Num9,
        Keycode::A => Key::A,
        Keycode::B => Key::B,
        Keycode::C => Key::C,
        Keycode::D => Key::D,
        Keycode::E => Key::E,
        Keycode::F => Key::F,
        Keycode::F1 => Key::F1,
        Keycode::F2 => Key::F2,
        Keycode::F3 => Key::F3,
        Keycode::F5 => Key::F5,
        Keycode::F6 => Key::F6,
        Keycode::F7 => Key::F7,
        Keycode::F8 => Key::F8,
        Keycode::F9 => Key::F9,
        Keycode::F10 => Key::F10,
        Keycode::F11 => Key::F11,
        Keycode::Backspace => Key::Backspace,
        Keycode::Escape => Key::Escape,
        _ => Key::None,
    }
}
