//! Text extraction from page content streams.
//!
//! Only the operators that position and show text are interpreted:
//! `BT`, `Td`, `TD`, `Tm`, `Tj` and `TJ`. Everything else is skipped.
//! Shown strings are decoded as WinAnsiEncoding.

use crate::encoding;

/// A string shown by the content stream together with the position
/// of the text line it starts on, in user-space points.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    Str(Vec<u8>),
    Array(Vec<Operand>),
    Other,
}

/// Extract every shown string from a decoded content stream.
/// Returns `None` when the stream is not tokenizable.
pub fn text_runs(data: &[u8]) -> Option<Vec<TextRun>> {
    let mut runs = Vec::new();
    let mut operands: Vec<Operand> = Vec::new();
    // Start of the current text line (the Tlm translation).
    let mut line = (0.0, 0.0);
    let mut cursor = data;

    loop {
        cursor = skip_whitespace_and_comments(cursor);
        let Some(&first) = cursor.first() else {
            break;
        };
        match first {
            b'(' | b'<' | b'[' if !cursor.starts_with(b"<<") => {
                let (operand, rest) = parse_operand(cursor)?;
                operands.push(operand);
                cursor = rest;
            }
            b'/' => {
                let (_, rest) = regular_token(&cursor[1..]);
                operands.push(Operand::Other);
                cursor = rest;
            }
            _ => {
                let (token, rest) = regular_token(cursor);
                if token.is_empty() {
                    // Inline dictionary brackets or a stray delimiter.
                    let width =
                        if cursor.starts_with(b"<<") || cursor.starts_with(b">>") {
                            2
                        } else {
                            1
                        };
                    cursor = &cursor[width..];
                    continue;
                }
                cursor = rest;
                if let Some(n) = parse_number(token) {
                    operands.push(Operand::Number(n));
                    continue;
                }
                match token {
                    b"BT" => line = (0.0, 0.0),
                    b"Td" | b"TD" => {
                        if let [.., Operand::Number(tx), Operand::Number(ty)] =
                            operands.as_slice()
                        {
                            line = (line.0 + tx, line.1 + ty);
                        }
                    }
                    b"Tm" => {
                        if let [.., Operand::Number(e), Operand::Number(f)] =
                            operands.as_slice()
                        {
                            line = (*e, *f);
                        }
                    }
                    b"Tj" => {
                        if let Some(Operand::Str(s)) = operands.last() {
                            runs.push(run_at(line, s));
                        }
                    }
                    b"TJ" => {
                        if let Some(Operand::Array(items)) = operands.last() {
                            let joined: Vec<u8> = items
                                .iter()
                                .filter_map(|item| match item {
                                    Operand::Str(s) => Some(s.as_slice()),
                                    _ => None,
                                })
                                .flatten()
                                .copied()
                                .collect();
                            runs.push(run_at(line, &joined));
                        }
                    }
                    _ => {}
                }
                operands.clear();
            }
        }
    }

    Some(runs)
}

fn run_at(line: (f64, f64), bytes: &[u8]) -> TextRun {
    TextRun {
        x: line.0,
        y: line.1,
        text: encoding::decode(bytes),
    }
}

fn parse_operand(data: &[u8]) -> Option<(Operand, &[u8])> {
    match data.first()? {
        b'(' => {
            let (s, rest) = parse_literal_string(data)?;
            Some((Operand::Str(s), rest))
        }
        b'<' => {
            let (s, rest) = parse_hex_string(data)?;
            Some((Operand::Str(s), rest))
        }
        b'[' => {
            let mut items = Vec::new();
            let mut cursor = &data[1..];
            loop {
                cursor = skip_whitespace_and_comments(cursor);
                match cursor.first()? {
                    b']' => return Some((Operand::Array(items), &cursor[1..])),
                    b'(' | b'<' | b'[' => {
                        let (item, rest) = parse_operand(cursor)?;
                        items.push(item);
                        cursor = rest;
                    }
                    _ => {
                        let (token, rest) = regular_token(cursor);
                        if token.is_empty() {
                            return None;
                        }
                        items.push(
                            parse_number(token)
                                .map_or(Operand::Other, Operand::Number),
                        );
                        cursor = rest;
                    }
                }
            }
        }
        _ => None,
    }
}

/// Decode a `( ... )` literal string, handling nested parentheses,
/// escape sequences and octal codes.
fn parse_literal_string(data: &[u8]) -> Option<(Vec<u8>, &[u8])> {
    let mut out = Vec::new();
    let mut depth = 1usize;
    let mut i = 1;
    while i < data.len() {
        let b = data[i];
        i += 1;
        match b {
            b'\\' => {
                let esc = *data.get(i)?;
                i += 1;
                match esc {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    b'0'..=b'7' => {
                        let mut code = u32::from(esc - b'0');
                        for _ in 0..2 {
                            match data.get(i) {
                                Some(&d @ b'0'..=b'7') => {
                                    code = code * 8 + u32::from(d - b'0');
                                    i += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push(code as u8);
                    }
                    // Line continuation.
                    b'\n' => {}
                    b'\r' => {
                        if data.get(i) == Some(&b'\n') {
                            i += 1;
                        }
                    }
                    other => out.push(other),
                }
            }
            b'(' => {
                depth += 1;
                out.push(b);
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((out, &data[i..]));
                }
                out.push(b);
            }
            _ => out.push(b),
        }
    }
    None
}

fn parse_hex_string(data: &[u8]) -> Option<(Vec<u8>, &[u8])> {
    let end = data.iter().position(|&b| b == b'>')?;
    let digits: Vec<u8> = data[1..end]
        .iter()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|&b| hex_value(b))
        .collect::<Option<_>>()?;
    // An odd trailing digit is padded with 0.
    let bytes = digits
        .chunks(2)
        .map(|pair| pair[0] << 4 | pair.get(1).copied().unwrap_or(0))
        .collect();
    Some((bytes, &data[end + 1..]))
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn parse_number(token: &[u8]) -> Option<f64> {
    let first = *token.first()?;
    if !(first.is_ascii_digit() || matches!(first, b'+' | b'-' | b'.')) {
        return None;
    }
    std::str::from_utf8(token).ok()?.parse().ok()
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Split off the run of regular (non-whitespace, non-delimiter) bytes.
pub(crate) fn regular_token(data: &[u8]) -> (&[u8], &[u8]) {
    let end = data
        .iter()
        .position(|&b| b.is_ascii_whitespace() || is_delimiter(b))
        .unwrap_or(data.len());
    data.split_at(end)
}

fn skip_whitespace_and_comments(mut data: &[u8]) -> &[u8] {
    loop {
        match data.first() {
            Some(b) if b.is_ascii_whitespace() => data = &data[1..],
            Some(b'%') => {
                let end = data
                    .iter()
                    .position(|&b| b == b'\n' || b == b'\r')
                    .unwrap_or(data.len());
                data = &data[end..];
            }
            _ => return data,
        }
    }
}
