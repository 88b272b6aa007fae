use core::ops::DerefMut;

use crate::vga_buffer::{Buffer, Display};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "clear | cls | help | osinfo | ping";
pub const OS_INFO: &str = concat!(
    "AstralOs V",
    env!("CARGO_PKG_VERSION"),
    " HomeMade Kernel, booted successfully, Credits : Lucas Bouet"
);
pub const PONG: &str = "pong!";
pub const UNKNOWN_PREFIX: &str = "Unknown command: ";

/// A submitted line, resolved against the builtin set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Clear,
    Help,
    OsInfo,
    Ping,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Exact, case-sensitive match; nothing is trimmed.
    pub fn parse(line: &'a str) -> Self {
        match line {
            "" => Command::Empty,
            "clear" | "cls" => Command::Clear,
            "help" => Command::Help,
            "osinfo" => Command::OsInfo,
            "ping" => Command::Ping,
            other => Command::Unknown(other),
        }
    }

    /// Run the command. Builtins only ever see the display.
    pub fn execute<B>(self, display: &mut Display<B>)
    where
        B: DerefMut<Target = Buffer>,
    {
        match self {
            Command::Empty => {}
            Command::Clear => display.clear(),
            Command::Help => print_command_output(display, HELP_TEXT),
            Command::OsInfo => print_command_output(display, OS_INFO),
            Command::Ping => print_command_output(display, PONG),
            Command::Unknown(line) => {
                display.newline();
                display.write_text(UNKNOWN_PREFIX);
                display.write_text(line);
            }
        }
    }
}

fn print_command_output<B>(display: &mut Display<B>, output: &str)
where
    B: DerefMut<Target = Buffer>,
{
    display.newline();
    display.write_text(output);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vga_buffer::{BUFFER_WIDTH, LINE_SIZE};

    fn row(display: &Display<&mut Buffer>, row: usize) -> [u8; BUFFER_WIDTH] {
        display.buffer().row_text(row)
    }

    #[test]
    fn parse_builtins() {
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse("clear"), Command::Clear);
        assert_eq!(Command::parse("cls"), Command::Clear);
        assert_eq!(Command::parse("help"), Command::Help);
        assert_eq!(Command::parse("osinfo"), Command::OsInfo);
        assert_eq!(Command::parse("ping"), Command::Ping);
    }

    #[test]
    fn parse_is_case_sensitive_and_exact() {
        assert_eq!(Command::parse("PING"), Command::Unknown("PING"));
        assert_eq!(Command::parse("ping "), Command::Unknown("ping "));
        assert_eq!(Command::parse(" "), Command::Unknown(" "));
    }

    #[test]
    fn unknown_command_reports_the_literal_line() {
        for line in ["foo", "pingg", "a b c", " "] {
            let mut buffer = Buffer::blank();
            let mut display = Display::new(&mut buffer);
            Command::parse(line).execute(&mut display);

            let expected_len = UNKNOWN_PREFIX.len() + line.len();
            assert_eq!(display.cursor(), LINE_SIZE + expected_len * 2);
            let text = row(&display, 1);
            assert_eq!(&text[..UNKNOWN_PREFIX.len()], UNKNOWN_PREFIX.as_bytes());
            assert_eq!(&text[UNKNOWN_PREFIX.len()..expected_len], line.as_bytes());
        }
    }

    #[test]
    fn empty_line_does_nothing() {
        let mut buffer = Buffer::blank();
        let mut display = Display::new(&mut buffer);
        display.write_text("> ");
        Command::Empty.execute(&mut display);
        assert_eq!(display.cursor(), 4);
        assert_eq!(display.scrolls(), 0);
    }

    #[test]
    fn ping_prints_pong_on_next_row() {
        let mut buffer = Buffer::blank();
        let mut display = Display::new(&mut buffer);
        display.write_text("> ping");
        Command::Ping.execute(&mut display);
        assert_eq!(&row(&display, 1)[..5], b"pong!");
    }

    #[test]
    fn help_and_osinfo_print_fixed_text() {
        let mut buffer = Buffer::blank();
        let mut display = Display::new(&mut buffer);
        Command::Help.execute(&mut display);
        Command::OsInfo.execute(&mut display);
        assert_eq!(&row(&display, 1)[..HELP_TEXT.len()], HELP_TEXT.as_bytes());
        assert_eq!(&row(&display, 2)[..OS_INFO.len()], OS_INFO.as_bytes());
        assert!(OS_INFO.contains(VERSION));
        assert!(OS_INFO.ends_with("Credits : Lucas Bouet"));
        assert!(OS_INFO.len() <= BUFFER_WIDTH);
    }

    #[test]
    fn clear_resets_display() {
        let mut buffer = Buffer::blank();
        let mut display = Display::new(&mut buffer);
        display.write_text("garbage");
        Command::Clear.execute(&mut display);
        assert_eq!(display.cursor(), 0);
        assert_eq!(row(&display, 0), [b' '; BUFFER_WIDTH]);
    }
}
