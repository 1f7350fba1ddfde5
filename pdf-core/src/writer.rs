use std::io::{self, Write};

use crate::encoding;
use crate::objects::{ObjId, PdfObject};

/// Serializes PDF objects to any `Write` target while recording the
/// byte offset of every indirect object for the xref table.
pub struct PdfWriter<W: Write> {
    writer: W,
    offset: usize,
    xref_entries: Vec<(u32, usize)>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        PdfWriter {
            writer,
            offset: 0,
            xref_entries: Vec::new(),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// `%PDF-1.7` followed by a comment of four high bytes so that
    /// transfer tools treat the file as binary.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.write_str("%PDF-1.7\n")?;
        self.write_bytes(b"%\xe2\xe3\xcf\xd3\n")
    }

    /// Write `id` as an indirect object and record its offset.
    pub fn write_object(
        &mut self,
        id: ObjId,
        obj: &PdfObject,
    ) -> io::Result<()> {
        self.xref_entries.push((id.0, self.offset));
        self.write_str(&format!("{} {} obj\n", id.0, id.1))?;
        self.write_value(obj)?;
        self.write_str("\nendobj\n")
    }

    fn write_value(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Integer(n) => self.write_str(&n.to_string()),
            PdfObject::Real(f) => self.write_str(&format_real(*f)),
            PdfObject::Name(name) => {
                self.write_str("/")?;
                self.write_str(name)
            }
            PdfObject::LiteralString(s) => {
                self.write_str("(")?;
                self.write_str(&escape_pdf_string(s))?;
                self.write_str(")")
            }
            PdfObject::Array(items) => {
                self.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write_str(" ")?;
                    }
                    self.write_value(item)?;
                }
                self.write_str("]")
            }
            PdfObject::Dictionary(entries) => {
                self.write_dict_entries(entries)?;
                self.write_str(" >>")
            }
            PdfObject::Stream { dict, data } => {
                self.write_dict_entries(dict)?;
                self.write_str(&format!(
                    " /Length {} >>\nstream\n",
                    data.len()
                ))?;
                self.write_bytes(data)?;
                self.write_str("\nendstream")
            }
            PdfObject::Reference(id) => {
                self.write_str(&format!("{} {} R", id.0, id.1))
            }
        }
    }

    /// Writes `<<` and every ` /Key value` pair, leaving the dict open.
    fn write_dict_entries(
        &mut self,
        entries: &[(String, PdfObject)],
    ) -> io::Result<()> {
        self.write_str("<<")?;
        for (key, val) in entries {
            self.write_str(" /")?;
            self.write_str(key)?;
            self.write_str(" ")?;
            self.write_value(val)?;
        }
        Ok(())
    }

    pub fn current_offset(&self) -> usize {
        self.offset
    }

    /// Number of indirect objects written so far.
    pub fn object_count(&self) -> usize {
        self.xref_entries.len()
    }

    /// Write the xref table, trailer, `startxref` and `%%EOF`,
    /// then flush the underlying writer.
    pub fn write_xref_and_trailer(
        &mut self,
        root_id: ObjId,
        info_id: Option<ObjId>,
    ) -> io::Result<()> {
        let xref_offset = self.offset;
        let size = self
            .xref_entries
            .iter()
            .map(|&(num, _)| num)
            .max()
            .unwrap_or(0)
            + 1;

        // Index by object number; gaps stay free entries.
        let mut offsets: Vec<Option<usize>> = vec![None; size as usize];
        for &(num, off) in &self.xref_entries {
            offsets[num as usize] = Some(off);
        }

        self.write_str(&format!("xref\n0 {}\n", size))?;
        // Every entry is exactly 20 bytes including the CRLF.
        self.write_bytes(b"0000000000 65535 f\r\n")?;
        for off in offsets.iter().skip(1) {
            match off {
                Some(off) => {
                    let entry = format!("{:010} 00000 n\r\n", off);
                    self.write_bytes(entry.as_bytes())?;
                }
                None => self.write_bytes(b"0000000000 00000 f\r\n")?,
            }
        }

        self.write_str(&format!(
            "trailer\n<< /Size {} /Root {} {} R",
            size, root_id.0, root_id.1,
        ))?;
        if let Some(info) = info_id {
            self.write_str(&format!(" /Info {} {} R", info.0, info.1))?;
        }
        self.write_str(" >>\n")?;
        self.write_str(&format!("startxref\n{}\n%%EOF\n", xref_offset))?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Escape a string for use inside a PDF literal string `( ... )`.
///
/// Text is encoded as WinAnsiEncoding. Bytes outside printable ASCII
/// are written as octal escapes so the output stays 7-bit; characters
/// the encoding lacks become `?`.
pub fn escape_pdf_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '(' => result.push_str("\\("),
            ')' => result.push_str("\\)"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            ' '..='~' => result.push(c),
            _ => {
                let byte = encoding::encode_char(c)
                    .unwrap_or(encoding::REPLACEMENT_BYTE);
                if byte.is_ascii_graphic() || byte == b' ' {
                    result.push(byte as char);
                } else {
                    result.push_str(&format!("\\{:03o}", byte));
                }
            }
        }
    }
    result
}

/// Object-level real: integral values keep one decimal (`612.0`),
/// others drop trailing zeros. Never uses exponent notation.
fn format_real(f: f64) -> String {
    if f == f.floor() && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        trim_decimal(format!("{:.6}", f))
    }
}

/// Content-stream coordinate: integral values print without a
/// decimal point (`100`), others keep up to four decimals.
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        trim_decimal(format!("{:.4}", v))
    }
}

fn trim_decimal(s: String) -> String {
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
