//! PS/2 keyboard constants and the scancode set 1 lookup table (US layout).

pub const KEYBOARD_DATA_PORT: u16 = 0x60;
pub const KEYBOARD_STATUS_PORT: u16 = 0x64;

/// Status register bit: output buffer full, a code is waiting on the data port.
pub const STATUS_OUTPUT_FULL: u8 = 0x01;
/// Set on the break code of every key.
pub const RELEASE_BIT: u8 = 0x80;
pub const ENTER_KEY_CODE: u8 = 0x1C;

/// Table value for codes with no printable character.
pub const UNMAPPED: u8 = 0;
/// Table value for the backspace key.
pub const ERASE: u8 = 0x08;

/// Scancode set 1 make codes to ASCII. Index is the code with the release bit clear.
#[rustfmt::skip]
pub static KEYBOARD_MAP: [u8; 128] = [
    0,  27, b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'0', b'-', b'=', ERASE,
    b'\t', b'q', b'w', b'e', b'r', b't', b'y', b'u', b'i', b'o', b'p', b'[', b']', b'\n',
    0, // control
    b'a', b's', b'd', b'f', b'g', b'h', b'j', b'k', b'l', b';', b'\'', b'`',
    0, // left shift
    b'\\', b'z', b'x', b'c', b'v', b'b', b'n', b'm', b',', b'.', b'/',
    0, // right shift
    b'*',
    0, // alt
    b' ',
    0, // caps lock
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // F1..F10
    0, // num lock
    0, // scroll lock
    0, // home
    0, // up
    0, // page up
    b'-',
    0, // left
    0,
    0, // right
    b'+',
    0, // end
    0, // down
    0, // page down
    0, // insert
    0, // delete
    0, 0, 0,
    0, // F11
    0, // F12
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(u8),
    Erase,
    Unmapped,
}

/// Look up a make code in [`KEYBOARD_MAP`].
pub fn resolve(code: u8) -> Key {
    match KEYBOARD_MAP[usize::from(code & !RELEASE_BIT)] {
        UNMAPPED => Key::Unmapped,
        ERASE => Key::Erase,
        byte => Key::Char(byte),
    }
}

/// Make code that produces `byte`, if the table has one.
pub fn scancode_for(byte: u8) -> Option<u8> {
    if byte == UNMAPPED {
        return None;
    }
    KEYBOARD_MAP
        .iter()
        .position(|&mapped| mapped == byte)
        .map(|index| index as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_a_full_seven_bit_range() {
        assert_eq!(KEYBOARD_MAP.len(), 128);
    }

    #[test]
    fn letters_and_digits_resolve() {
        assert_eq!(resolve(0x19), Key::Char(b'p'));
        assert_eq!(resolve(0x17), Key::Char(b'i'));
        assert_eq!(resolve(0x02), Key::Char(b'1'));
        assert_eq!(resolve(0x0B), Key::Char(b'0'));
        assert_eq!(resolve(0x39), Key::Char(b' '));
        assert_eq!(resolve(0x32), Key::Char(b'm'));
    }

    #[test]
    fn backspace_resolves_to_erase() {
        assert_eq!(resolve(0x0E), Key::Erase);
    }

    #[test]
    fn modifiers_and_function_keys_are_unmapped() {
        assert_eq!(resolve(0x00), Key::Unmapped);
        assert_eq!(resolve(0x1D), Key::Unmapped);
        assert_eq!(resolve(0x2A), Key::Unmapped);
        assert_eq!(resolve(0x3B), Key::Unmapped);
        assert_eq!(resolve(0x48), Key::Unmapped);
        assert_eq!(resolve(0x7F), Key::Unmapped);
    }

    #[test]
    fn escape_and_tab_resolve_to_their_table_bytes() {
        assert_eq!(resolve(0x01), Key::Char(27));
        assert_eq!(resolve(0x0F), Key::Char(b'\t'));
    }

    #[test]
    fn enter_maps_to_newline_in_table() {
        assert_eq!(KEYBOARD_MAP[usize::from(ENTER_KEY_CODE)], b'\n');
    }

    #[test]
    fn scancode_for_inverts_the_table() {
        for byte in b"abcdefghijklmnopqrstuvwxyz0123456789 " {
            let code = scancode_for(*byte).expect("mapped");
            assert_eq!(resolve(code), Key::Char(*byte));
        }
        assert_eq!(scancode_for(b'A'), None);
        assert_eq!(scancode_for(UNMAPPED), None);
    }
}
