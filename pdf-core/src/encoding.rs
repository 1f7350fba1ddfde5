//! WinAnsiEncoding, the single-byte encoding declared on the standard
//! Helvetica font.
//!
//! Bytes 0x20..=0x7E and 0xA0..=0xFF are the Latin-1 code points of the
//! same value. 0x80..=0x9F carry the Windows-1252 punctuation below;
//! 0x81, 0x8D, 0x8F, 0x90 and 0x9D are unassigned.

const HIGH_CONTROL_RANGE: [Option<char>; 32] = [
    Some('\u{20AC}'), // 0x80 euro sign
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None, // 0x90
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Byte used for characters the encoding cannot represent.
pub const REPLACEMENT_BYTE: u8 = b'?';

/// Encode one character, or `None` if WinAnsiEncoding has no code for it.
pub fn encode_char(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x00..=0x7F | 0xA0..=0xFF => Some(code as u8),
        _ => HIGH_CONTROL_RANGE
            .iter()
            .position(|&mapped| mapped == Some(c))
            .map(|i| 0x80 + i as u8),
    }
}

/// Decode one byte. Unassigned codes decode to U+FFFD.
pub fn decode_byte(b: u8) -> char {
    match b {
        0x80..=0x9F => HIGH_CONTROL_RANGE[(b - 0x80) as usize]
            .unwrap_or(char::REPLACEMENT_CHARACTER),
        _ => b as char,
    }
}

pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| decode_byte(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_latin1_map_to_themselves() {
        assert_eq!(encode_char('A'), Some(b'A'));
        assert_eq!(encode_char('é'), Some(0xE9));
        assert_eq!(encode_char('\u{A0}'), Some(0xA0));
        assert_eq!(decode_byte(0xE9), 'é');
    }

    #[test]
    fn windows_punctuation_uses_high_control_range() {
        assert_eq!(encode_char('€'), Some(0x80));
        assert_eq!(encode_char('–'), Some(0x96));
        assert_eq!(encode_char('—'), Some(0x97));
        assert_eq!(encode_char('Ÿ'), Some(0x9F));
        assert_eq!(decode_byte(0x93), '“');
        assert_eq!(decode_byte(0x8C), 'Œ');
    }

    #[test]
    fn unmapped_characters() {
        assert_eq!(encode_char('\u{0080}'), None);
        assert_eq!(encode_char('ā'), None);
        assert_eq!(encode_char('日'), None);
        assert_eq!(decode_byte(0x81), char::REPLACEMENT_CHARACTER);
    }

    #[test]
    fn every_assigned_code_round_trips() {
        for b in 0x20..=0xFFu8 {
            let c = decode_byte(b);
            if c != char::REPLACEMENT_CHARACTER {
                assert_eq!(encode_char(c), Some(b), "byte {:#04x}", b);
            }
        }
    }
}
