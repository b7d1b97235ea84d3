#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0, 0, 0);
    pub const WHITE: Color = Color::new_rgb(255, 255, 255);
    pub const RED: Color = Color::new_rgb(255, 0, 0);
    pub const GRAY: Color = Color::new_rgb(128, 128, 128);
    pub const GREY: Color = Color::GRAY;

    /// Lit panel LED.
    pub const LED_ON: Color = Color::new_rgb(255, 48, 32);
    /// Unlit panel LED.
    pub const LED_OFF: Color = Color::new_rgb(72, 12, 8);
    /// Front panel face plate.
    pub const PANEL: Color = Color::new_rgb(36, 52, 88);
    /// LCD backlight and pixel colors (classic yellow-green HD44780).
    pub const LCD_BACKGROUND: Color = Color::new_rgb(140, 180, 40);
    pub const LCD_PIXEL: Color = Color::new_rgb(24, 40, 16);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    #[inline]
    pub const fn new_rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// CSS `rgb(...)` string, used by canvas based frontends.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn css_string_uses_rgb_components() {
        assert_eq!(Color::new_rgb(1, 2, 3).to_css(), "rgb(1, 2, 3)");
    }

    #[test]
    fn to_u32_is_little_endian_rgba() {
        assert_eq!(Color::new_rgba(0x11, 0x22, 0x33, 0x44).to_u32(), 0x4433_2211);
    }
}
