use inksac::prelude::*;

/// Colors for the prompt and for error lines. Everything comes out plain
/// when the terminal has no color support.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color_support: ColorSupport,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    pub fn plain() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if matches!(self.color_support, ColorSupport::NoColor) {
            return text.to_string();
        }
        text.style(style).to_string()
    }

    pub fn user_host(&self, text: &str) -> String {
        let style = Style::builder().foreground(Color::Green).bold().build();
        self.paint(text, style)
    }

    pub fn cwd(&self, text: &str) -> String {
        let style = Style::builder().foreground(Color::Cyan).bold().build();
        self.paint(text, style)
    }

    pub fn sysname(&self, text: &str) -> String {
        let style = Style::builder().foreground(Color::Yellow).build();
        self.paint(text, style)
    }

    pub fn error(&self, text: &str) -> String {
        let style = Style::builder().foreground(Color::Red).bold().build();
        self.paint(text, style)
    }

    pub fn hint(&self, text: &str) -> String {
        let style = Style::builder()
            .foreground(Color::RGB(128, 128, 128))
            .build();
        self.paint(text, style)
    }
}
