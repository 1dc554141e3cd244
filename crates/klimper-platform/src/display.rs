//! Character displays for the menu.
//!
//! The reference hardware is a 16x2 character LCD. [`ConsoleDisplay`] draws
//! the same two lines into any writer, optionally pinned to the top-left of
//! an ANSI terminal so it stays in place while logs scroll below.

use std::io::Write;

use crate::menu::MenuItem;

/// Characters per display line.
pub const LINE_WIDTH: usize = 16;

/// Something that can show the navigator's screens.
pub trait Display {
    /// Show a menu with `selection` highlighted.
    fn show_menu(&mut self, items: &[MenuItem], selection: usize) -> std::io::Result<()>;

    /// Show a parameter being edited.
    fn show_param(&mut self, name: &str, value: f32) -> std::io::Result<()>;
}

/// The two lines shown for a menu: the highlighted item upper-cased behind a
/// `>` marker, and the item after it.
pub fn menu_lines(items: &[MenuItem], selection: usize) -> [String; 2] {
    let Some(current) = items.get(selection) else {
        return [String::new(), String::new()];
    };
    let first = format!(">{}", current.name().to_uppercase());
    let second = if items.len() > 1 {
        items[(selection + 1) % items.len()].name().to_string()
    } else {
        String::new()
    };
    [first, second]
}

/// The two lines shown for a parameter: its name and its value.
pub fn param_lines(name: &str, value: f32) -> [String; 2] {
    let sign = if value.is_sign_negative() { "" } else { " " };
    [name.to_string(), format!("{sign}{value:.6}")]
}

/// Truncate to the line width and center.
fn fit(text: &str) -> String {
    let text: String = text.chars().take(LINE_WIDTH).collect();
    let len = text.chars().count();
    let left = (LINE_WIDTH - len) / 2;
    format!("{:left$}{text:<width$}", "", width = LINE_WIDTH - left)
}

/// LCD emulation on a text stream.
#[derive(Debug)]
pub struct ConsoleDisplay<W: Write> {
    out: W,
    ansi: bool,
}

impl<W: Write> ConsoleDisplay<W> {
    /// Plain output, one frame after another.
    pub fn new(out: W) -> Self {
        Self { out, ansi: false }
    }

    /// Draw at the top-left corner of an ANSI terminal in green.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// The underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, lines: &[String; 2]) -> std::io::Result<()> {
        let border = "━".repeat(LINE_WIDTH);
        if self.ansi {
            // save cursor, home, black on green
            write!(self.out, "\x1b[s\x1b[H\x1b[30;42m")?;
        }
        let eol = if self.ansi { "\x1b[K\n" } else { "\n" };
        write!(self.out, "┏{border}┓{eol}")?;
        for line in lines {
            write!(self.out, "┃{}┃{eol}", fit(line))?;
        }
        write!(self.out, "┗{border}┛{eol}")?;
        if self.ansi {
            // reset, restore cursor
            write!(self.out, "\x1b[0m\x1b[u")?;
        }
        self.out.flush()
    }
}

impl<W: Write> Display for ConsoleDisplay<W> {
    fn show_menu(&mut self, items: &[MenuItem], selection: usize) -> std::io::Result<()> {
        self.draw(&menu_lines(items, selection))
    }

    fn show_param(&mut self, name: &str, value: f32) -> std::io::Result<()> {
        self.draw(&param_lines(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{MenuAction, default_menu};

    #[test]
    fn test_menu_lines() {
        let menu = default_menu();
        let [first, second] = menu_lines(&menu, 0);
        assert_eq!(first, ">SEQUENCER");
        assert_eq!(second, "Volume");

        // Last item shows the first one below it
        let [first, second] = menu_lines(&menu, menu.len() - 1);
        assert_eq!(first, ">ALL NOTES OFF");
        assert_eq!(second, "Sequencer");
    }

    #[test]
    fn test_single_item_menu_has_empty_second_line() {
        let menu = vec![MenuItem::command("Stop", MenuAction::StopSequencer)];
        assert_eq!(menu_lines(&menu, 0), [">STOP".to_string(), String::new()]);
    }

    #[test]
    fn test_param_lines() {
        assert_eq!(param_lines("Volume", 0.5)[1], " 0.500000");
        assert_eq!(param_lines("Volume", -0.25)[1], "-0.250000");
    }

    #[test]
    fn test_fit_centers_and_truncates() {
        assert_eq!(fit("ab"), "       ab       ");
        assert_eq!(fit("a very long parameter name"), "a very long para");
        assert_eq!(fit("").chars().count(), LINE_WIDTH);
    }

    #[test]
    fn test_console_frame() {
        let mut display = ConsoleDisplay::new(Vec::new());
        display.show_param("BPM", 80.0).unwrap();
        let text = String::from_utf8(display.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("BPM"));
        assert!(lines[2].contains("80.000000"));
        assert!(!text.contains('\x1b'));
    }
}
