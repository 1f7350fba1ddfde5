use std::collections::HashMap;
use std::io::{self, Read};
use std::path::Path;

use flate2::read::ZlibDecoder;
use thiserror::Error;

use crate::analysis::DocumentSummary;
use crate::content::{self, TextRun};
use crate::paper::PageSize;

/// Page trees deeper than this are treated as cyclic.
const MAX_TREE_DEPTH: usize = 32;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur when reading a PDF file.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PdfReadError {
    /// The bytes do not start with a valid `%PDF-` header.
    #[error("not a PDF file")]
    NotAPdf,
    #[error("startxref not found")]
    StartxrefNotFound,
    #[error("malformed or missing xref table")]
    MalformedXref,
    #[error("malformed or missing trailer")]
    MalformedTrailer,
    /// PDF 1.5+ cross-reference streams are not supported.
    #[error("cross-reference streams (PDF 1.5+) are not supported")]
    XrefStreamNotSupported,
    /// Offset missing or out of range, or the object body is malformed.
    #[error("cannot resolve object {0}")]
    UnresolvableObject(u32),
    /// Missing `/Pages`, `/Count`, `/Kids` or `/MediaBox`, or a cyclic tree.
    #[error("malformed page tree")]
    MalformedPageTree,
    /// The content stream of the given object could not be decoded.
    #[error("malformed content stream in object {0}")]
    MalformedContent(u32),
    #[error("unsupported stream filter {0}")]
    UnsupportedFilter(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for PdfReadError {
    fn from(e: io::Error) -> Self {
        PdfReadError::Io(e.to_string())
    }
}

// ── Public API ─────────────────────────────────────────────────────────────────

/// What a page looks like to a page-size analyser.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    /// 1-based position in document order.
    pub number: usize,
    /// Width and height of the `/MediaBox`, inherited if needed.
    pub size: PageSize,
    pub text_runs: Vec<TextRun>,
}

impl PageInfo {
    /// Whether `text` is shown on this page starting at (x, y).
    pub fn has_text_at(&self, text: &str, x: f64, y: f64) -> bool {
        self.text_runs
            .iter()
            .any(|run| run.text == text && run.x == x && run.y == y)
    }
}

/// Reads an existing PDF file.
///
/// `PdfReader` parses the cross-reference table and trailer once and
/// keeps the raw bytes, so objects are resolved lazily on request.
///
/// # Limitations
/// PDF 1.5+ cross-reference streams are not supported. Files that use
/// them return `PdfReadError::XrefStreamNotSupported`.
pub struct PdfReader {
    data: Vec<u8>,
    /// Object number to byte offset in `data`.
    xref: HashMap<u32, usize>,
    version: String,
    pages_root: u32,
    page_count: usize,
}

impl PdfReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PdfReadError> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, PdfReadError> {
        let version = parse_version(&data)?;
        let xref_offset = find_startxref(&data)?;
        let (xref, root) = parse_xref_and_trailer(&data, xref_offset)?;

        let mut reader = PdfReader {
            data,
            xref,
            version,
            pages_root: 0,
            page_count: 0,
        };
        let catalog = reader.resolve_dict(root)?;
        reader.pages_root = catalog
            .get("Pages")
            .and_then(Value::as_reference)
            .ok_or(PdfReadError::MalformedPageTree)?;
        let pages = reader.resolve_dict(reader.pages_root)?;
        reader.page_count = pages
            .get("Count")
            .and_then(Value::as_number)
            .filter(|n| *n >= 0.0)
            .ok_or(PdfReadError::MalformedPageTree)?
            as usize;
        Ok(reader)
    }

    /// Number of pages, as declared by the root `/Count`.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// PDF version string (e.g. `"1.7"`).
    pub fn pdf_version(&self) -> &str {
        &self.version
    }

    /// Walk the page tree in document order, reading each page's size
    /// and the text its content stream shows.
    pub fn pages(&self) -> Result<Vec<PageInfo>, PdfReadError> {
        let mut pages = Vec::with_capacity(self.page_count);
        self.collect_pages(self.pages_root, None, 0, &mut pages)?;
        Ok(pages)
    }

    /// Size statistics over every page, as a page-size analyser
    /// reports them.
    pub fn summary(&self) -> Result<DocumentSummary, PdfReadError> {
        Ok(DocumentSummary::from_pages(&self.pages()?))
    }

    fn collect_pages(
        &self,
        obj_num: u32,
        inherited_size: Option<PageSize>,
        depth: usize,
        out: &mut Vec<PageInfo>,
    ) -> Result<(), PdfReadError> {
        if depth > MAX_TREE_DEPTH {
            return Err(PdfReadError::MalformedPageTree);
        }
        let dict = self.resolve_dict(obj_num)?;
        let size = match dict.get("MediaBox") {
            Some(Value::Array(items)) => Some(
                parse_media_box(items).ok_or(PdfReadError::MalformedPageTree)?,
            ),
            Some(_) => return Err(PdfReadError::MalformedPageTree),
            None => inherited_size,
        };

        let is_node = match dict.get("Type").and_then(Value::as_name) {
            Some("Pages") => true,
            Some(_) => false,
            None => dict.contains_key("Kids"),
        };
        if is_node {
            let kids = match dict.get("Kids") {
                Some(Value::Array(items)) => parse_refs(items),
                _ => return Err(PdfReadError::MalformedPageTree),
            };
            for kid in kids {
                self.collect_pages(kid, size, depth + 1, out)?;
            }
            return Ok(());
        }

        let size = size.ok_or(PdfReadError::MalformedPageTree)?;
        let content_refs = match dict.get("Contents") {
            Some(Value::Ref(n)) => vec![*n],
            Some(Value::Array(items)) => parse_refs(items),
            _ => Vec::new(),
        };
        let mut text_runs = Vec::new();
        for content_ref in content_refs {
            let data = self.resolve_stream(content_ref)?;
            let runs = content::text_runs(&data)
                .ok_or(PdfReadError::MalformedContent(content_ref))?;
            text_runs.extend(runs);
        }

        out.push(PageInfo {
            number: out.len() + 1,
            size,
            text_runs,
        });
        Ok(())
    }

    /// Slice starting right after the `N G obj` header of `obj_num`.
    fn object_body(&self, obj_num: u32) -> Result<&[u8], PdfReadError> {
        let offset = self
            .xref
            .get(&obj_num)
            .copied()
            .filter(|&off| off < self.data.len())
            .ok_or(PdfReadError::UnresolvableObject(obj_num))?;
        let body = skip_obj_header(&self.data[offset..])
            .ok_or(PdfReadError::UnresolvableObject(obj_num))?;
        Ok(skip_ascii_whitespace(body))
    }

    fn resolve_dict(
        &self,
        obj_num: u32,
    ) -> Result<HashMap<String, Value>, PdfReadError> {
        let body = self.object_body(obj_num)?;
        parse_dict_bytes(body)
            .map(|(dict, _)| dict)
            .ok_or(PdfReadError::UnresolvableObject(obj_num))
    }

    /// Read a stream object's data, inflating `/FlateDecode`.
    fn resolve_stream(&self, obj_num: u32) -> Result<Vec<u8>, PdfReadError> {
        let unresolvable = PdfReadError::UnresolvableObject(obj_num);
        let body = self.object_body(obj_num)?;
        let (dict, rest) = parse_dict_bytes(body).ok_or(unresolvable.clone())?;

        let length = match dict.get("Length") {
            Some(Value::Ref(n)) => self.resolve_integer(*n)?,
            Some(value) => value.as_number().ok_or(unresolvable.clone())? as usize,
            None => return Err(unresolvable),
        };

        let rest = skip_ascii_whitespace(rest);
        let rest = rest
            .strip_prefix(b"stream".as_slice())
            .ok_or(unresolvable.clone())?;
        let rest = rest
            .strip_prefix(b"\r\n".as_slice())
            .or_else(|| rest.strip_prefix(b"\n".as_slice()))
            .ok_or(unresolvable.clone())?;
        let raw = rest.get(..length).ok_or(unresolvable)?;

        match dict.get("Filter").and_then(Value::as_name) {
            None => Ok(raw.to_vec()),
            Some("FlateDecode") => {
                let mut decoded = Vec::new();
                ZlibDecoder::new(raw)
                    .read_to_end(&mut decoded)
                    .map_err(|_| PdfReadError::MalformedContent(obj_num))?;
                Ok(decoded)
            }
            Some(other) => Err(PdfReadError::UnsupportedFilter(other.to_string())),
        }
    }

    fn resolve_integer(&self, obj_num: u32) -> Result<usize, PdfReadError> {
        let body = self.object_body(obj_num)?;
        next_token(body)
            .and_then(|(tok, _)| tok.parse().ok())
            .ok_or(PdfReadError::UnresolvableObject(obj_num))
    }
}

// ── Dictionary values ─────────────────────────────────────────────────────────

/// A dictionary value, reduced to what page-tree traversal needs.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    /// Indirect reference; only the object number is kept.
    Ref(u32),
    /// Name, without the leading `/`.
    Name(String),
    /// Number, boolean or other keyword token.
    Token(String),
    /// Raw text between `[` and `]`.
    Array(String),
    /// Nested dictionary or string, not inspected.
    Skipped,
}

impl Value {
    fn as_reference(&self) -> Option<u32> {
        match self {
            Value::Ref(n) => Some(*n),
            _ => None,
        }
    }

    fn as_name(&self) -> Option<&str> {
        match self {
            Value::Name(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Token(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Object numbers of every `N G R` reference in an array body.
fn parse_refs(array: &str) -> Vec<u32> {
    let tokens: Vec<&str> = array.split_ascii_whitespace().collect();
    let mut refs = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens.get(i + 2) == Some(&"R") {
            if let Ok(n) = tokens[i].parse() {
                refs.push(n);
                i += 3;
                continue;
            }
        }
        i += 1;
    }
    refs
}

fn parse_media_box(array: &str) -> Option<PageSize> {
    let nums: Vec<f64> = array
        .split_ascii_whitespace()
        .map(|t| t.parse().ok())
        .collect::<Option<_>>()?;
    match nums.as_slice() {
        [x0, y0, x1, y1] => Some(PageSize::new((x1 - x0).abs(), (y1 - y0).abs())),
        _ => None,
    }
}

// ── Internal parsing ───────────────────────────────────────────────────────────

/// Extract the PDF version from the `%PDF-x.y` header.
fn parse_version(data: &[u8]) -> Result<String, PdfReadError> {
    if data.len() < 8 || !data.starts_with(b"%PDF-") {
        return Err(PdfReadError::NotAPdf);
    }
    let rest = &data[5..];
    let end = rest
        .iter()
        .position(|&b| b == b'\n' || b == b'\r' || b == b' ')
        .unwrap_or(rest.len());
    std::str::from_utf8(&rest[..end])
        .map(|s| s.to_string())
        .map_err(|_| PdfReadError::NotAPdf)
}

/// Find the `startxref` offset within the last 1024 bytes.
fn find_startxref(data: &[u8]) -> Result<usize, PdfReadError> {
    let tail = &data[data.len().saturating_sub(1024)..];
    let keyword = b"startxref";
    let pos = tail
        .windows(keyword.len())
        .rposition(|w| w == keyword)
        .ok_or(PdfReadError::StartxrefNotFound)?;

    let offset: usize = next_token(&tail[pos + keyword.len()..])
        .and_then(|(tok, _)| tok.parse().ok())
        .ok_or(PdfReadError::StartxrefNotFound)?;
    if offset >= data.len() {
        return Err(PdfReadError::StartxrefNotFound);
    }
    Ok(offset)
}

/// Parse the xref table at `xref_offset` and the trailer after it.
/// Returns `(object_offset_map, root_object_number)`.
fn parse_xref_and_trailer(
    data: &[u8],
    xref_offset: usize,
) -> Result<(HashMap<u32, usize>, u32), PdfReadError> {
    let section = &data[xref_offset..];

    // A cross-reference stream starts with "N 0 obj" instead.
    if !skip_ascii_whitespace(section).starts_with(b"xref") {
        return Err(PdfReadError::XrefStreamNotSupported);
    }

    let xref = parse_xref_table(section)?;
    let root = parse_trailer_root(section)?;
    Ok((xref, root))
}

/// Parse a classic xref table: subsection headers `{first} {count}`
/// followed by 20-byte entries `{offset:010} {gen:05} {n|f}\r\n`.
fn parse_xref_table(section: &[u8]) -> Result<HashMap<u32, usize>, PdfReadError> {
    const ENTRY_SIZE: usize = 20;
    let mut map = HashMap::new();
    let mut cursor = skip_ascii_whitespace(section)
        .strip_prefix(b"xref".as_slice())
        .ok_or(PdfReadError::MalformedXref)?;

    loop {
        let trimmed = skip_ascii_whitespace(cursor);
        if trimmed.is_empty() || trimmed.starts_with(b"trailer") {
            break;
        }

        let (first_obj, after_first) =
            next_token(trimmed).ok_or(PdfReadError::MalformedXref)?;
        let first_obj: u32 = first_obj.parse().map_err(|_| PdfReadError::MalformedXref)?;
        let (count, after_count) =
            next_token(after_first).ok_or(PdfReadError::MalformedXref)?;
        let count: usize = count.parse().map_err(|_| PdfReadError::MalformedXref)?;

        let entries = skip_line(after_count);
        let section_len = count
            .checked_mul(ENTRY_SIZE)
            .filter(|&len| len <= entries.len())
            .ok_or(PdfReadError::MalformedXref)?;
        // The last object number of the subsection must fit in a u32.
        if count > 0 {
            u32::try_from(count - 1)
                .ok()
                .and_then(|last| first_obj.checked_add(last))
                .ok_or(PdfReadError::MalformedXref)?;
        }

        for (i, entry) in entries.chunks(ENTRY_SIZE).take(count).enumerate() {
            // Byte 17 is the in-use ('n') or free ('f') marker.
            if entry[17] != b'n' {
                continue;
            }
            let offset: usize = std::str::from_utf8(&entry[..10])
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or(PdfReadError::MalformedXref)?;
            // In range: checked against the subsection header above.
            let obj_num = first_obj + i as u32;
            if obj_num > 0 {
                map.insert(obj_num, offset);
            }
        }

        cursor = &entries[section_len..];
    }

    Ok(map)
}

/// Object number of the trailer's `/Root` reference.
fn parse_trailer_root(section: &[u8]) -> Result<u32, PdfReadError> {
    let pos = section
        .windows(7)
        .position(|w| w == b"trailer")
        .ok_or(PdfReadError::MalformedTrailer)?;
    let (dict, _) = parse_dict_bytes(&section[pos + 7..])
        .ok_or(PdfReadError::MalformedTrailer)?;
    dict.get("Root")
        .and_then(Value::as_reference)
        .ok_or(PdfReadError::MalformedTrailer)
}

// ── Token / byte utilities ─────────────────────────────────────────────────────

/// Parse a `<<...>>` dictionary, returning its entries and the bytes
/// following the closing `>>`.
fn parse_dict_bytes(data: &[u8]) -> Option<(HashMap<String, Value>, &[u8])> {
    let mut cursor = skip_ascii_whitespace(data).strip_prefix(b"<<".as_slice())?;
    let mut map = HashMap::new();

    loop {
        cursor = skip_ascii_whitespace(cursor);
        if let Some(rest) = cursor.strip_prefix(b">>".as_slice()) {
            return Some((map, rest));
        }

        let key_bytes = cursor.strip_prefix(b"/".as_slice())?;
        let (key, after_key) = content::regular_token(key_bytes);
        if key.is_empty() {
            return None;
        }
        let key = String::from_utf8_lossy(key).into_owned();
        cursor = skip_ascii_whitespace(after_key);

        let value = if cursor.starts_with(b"<<") {
            cursor = skip_nested_dict(cursor)?;
            Value::Skipped
        } else if cursor.starts_with(b"[") {
            let end = cursor.iter().position(|&b| b == b']')?;
            let inner = String::from_utf8_lossy(&cursor[1..end]).into_owned();
            cursor = &cursor[end + 1..];
            Value::Array(inner)
        } else if cursor.starts_with(b"(") {
            cursor = skip_literal_string(cursor)?;
            Value::Skipped
        } else if let Some(name) = cursor.strip_prefix(b"/".as_slice()) {
            let (name, rest) = content::regular_token(name);
            cursor = rest;
            Value::Name(String::from_utf8_lossy(name).into_owned())
        } else {
            let (tok, rest) = content::regular_token(cursor);
            if tok.is_empty() {
                return None;
            }
            let tok = String::from_utf8_lossy(tok).into_owned();
            cursor = rest;
            match as_reference_tail(cursor) {
                Some(rest) if tok.bytes().all(|b| b.is_ascii_digit()) => {
                    cursor = rest;
                    Value::Ref(tok.parse().ok()?)
                }
                _ => Value::Token(tok),
            }
        };
        map.insert(key, value);
    }
}

/// If `data` continues with `G R`, return the bytes after `R`.
fn as_reference_tail(data: &[u8]) -> Option<&[u8]> {
    let (generation, rest) = content::regular_token(skip_ascii_whitespace(data));
    if generation.is_empty() || !generation.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let (r, rest) = content::regular_token(skip_ascii_whitespace(rest));
    (r == b"R").then_some(rest)
}

/// Skip a `<<...>>` block (with nested dicts), returning the bytes after `>>`.
fn skip_nested_dict(data: &[u8]) -> Option<&[u8]> {
    let mut depth = 0usize;
    let mut i = 0;
    while i < data.len() {
        if data[i..].starts_with(b"<<") {
            depth += 1;
            i += 2;
        } else if data[i..].starts_with(b">>") {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return Some(&data[i..]);
            }
        } else if data[i] == b'(' {
            let rest = skip_literal_string(&data[i..])?;
            i = data.len() - rest.len();
        } else {
            i += 1;
        }
    }
    None
}

/// Skip a `(...)` literal string, returning the bytes after `)`.
fn skip_literal_string(data: &[u8]) -> Option<&[u8]> {
    let mut i = 1;
    let mut depth = 1i32;
    while i < data.len() {
        match data[i] {
            b'\\' => i += 2,
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Some(&data[i..]);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// Skip an `N G obj` header, returning the bytes after `obj`.
fn skip_obj_header(data: &[u8]) -> Option<&[u8]> {
    let (_, rest) = next_token(data)?;
    let (_, rest) = next_token(rest)?;
    let (keyword, rest) = next_token(rest)?;
    (keyword == "obj").then_some(rest)
}

fn skip_ascii_whitespace(data: &[u8]) -> &[u8] {
    let pos = data
        .iter()
        .position(|&b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    &data[pos..]
}

/// Skip past the next `\n`.
fn skip_line(data: &[u8]) -> &[u8] {
    match data.iter().position(|&b| b == b'\n') {
        Some(pos) => &data[pos + 1..],
        None => &data[data.len()..],
    }
}

/// Next whitespace-delimited token and the bytes after it.
fn next_token(data: &[u8]) -> Option<(&str, &[u8])> {
    let data = skip_ascii_whitespace(data);
    if data.is_empty() {
        return None;
    }
    let end = data
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let token = std::str::from_utf8(&data[..end]).ok()?;
    Some((token, &data[end..]))
}
