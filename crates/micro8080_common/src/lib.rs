pub mod app;
pub mod clock;
pub mod color;
pub mod key;

pub use color::Color;
