use colored::Color;

pub const PRIMARY: Color = Color::BrightBlue;
pub const ACCENT: Color = Color::BrightCyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const OK: Color = Color::Green;
pub const FAILED: Color = Color::Red;
pub const IGNORED: Color = Color::Yellow;
pub const COMMAND: Color = Color::BrightBlack;
