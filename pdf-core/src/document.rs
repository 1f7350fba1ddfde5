use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::{debug, info};

use crate::objects::{ObjId, PdfObject};
use crate::paper::{PageSize, PaperSize};
use crate::writer::{escape_pdf_string, format_coord, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);
const FONT_HELV_OBJ: ObjId = ObjId(3, 0);
const FIRST_PAGE_OBJ_NUM: u32 = 4;

/// Font resource name and size used by `place_text`.
const DEFAULT_FONT: &str = "F1";
const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Streaming builder for PDF documents.
///
/// Generic over `Write` so it works with files (`BufWriter<File>`),
/// in-memory buffers (`Vec<u8>`), or any other writer.
///
/// The builder behaves like a drawing canvas: there is always a
/// current page size, drawing opens a page on demand, and
/// `end_page()` commits the page to the writer and frees its content.
/// The next page starts with the size of the previous one unless
/// `set_page_size` changes it.
pub struct PdfDocument<W: Write> {
    writer: PdfWriter<W>,
    info: Vec<(String, String)>,
    page_obj_ids: Vec<ObjId>,
    current_page: Option<PageBuilder>,
    page_size: PageSize,
    compress: bool,
    next_obj_num: u32,
}

struct PageBuilder {
    size: PageSize,
    content_ops: Vec<u8>,
}

impl PdfDocument<BufWriter<File>> {
    /// Create (or truncate) `path` and write the document into it.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> PdfDocument<W> {
    /// Start a document on `writer`. The header and the shared
    /// Helvetica font object are written immediately. The initial
    /// page size is A4 portrait.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut pdf_writer = PdfWriter::new(writer);
        pdf_writer.write_header()?;

        let font = PdfObject::dict(vec![
            ("Type", PdfObject::name("Font")),
            ("Subtype", PdfObject::name("Type1")),
            ("BaseFont", PdfObject::name("Helvetica")),
            ("Encoding", PdfObject::name("WinAnsiEncoding")),
        ]);
        pdf_writer.write_object(FONT_HELV_OBJ, &font)?;

        Ok(PdfDocument {
            writer: pdf_writer,
            info: Vec::new(),
            page_obj_ids: Vec::new(),
            current_page: None,
            page_size: PaperSize::A4.size(),
            compress: false,
            next_obj_num: FIRST_PAGE_OBJ_NUM,
        })
    }

    /// Set a document info entry (e.g. "Producer", "Title").
    /// A key that is already present gets the new value.
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        match self.info.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.info.push((key.to_string(), value.to_string())),
        }
        self
    }

    /// Deflate page content streams written after this call.
    pub fn set_compression(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }

    /// Set the size of the open page, or of the next page to open.
    /// Later pages keep this size until it is changed again.
    pub fn set_page_size(&mut self, width: f64, height: f64) -> &mut Self {
        self.page_size = PageSize::new(width, height);
        if let Some(page) = self.current_page.as_mut() {
            page.size = self.page_size;
        }
        self
    }

    /// Size the current or next page will be committed with.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Begin a new page with the given dimensions in points,
    /// committing any page that is still open.
    pub fn begin_page(
        &mut self,
        width: f64,
        height: f64,
    ) -> io::Result<&mut Self> {
        if self.current_page.is_some() {
            self.end_page()?;
        }
        self.set_page_size(width, height);
        self.open_page();
        Ok(self)
    }

    fn open_page(&mut self) -> &mut PageBuilder {
        let size = self.page_size;
        self.current_page.get_or_insert_with(|| PageBuilder {
            size,
            content_ops: Vec::new(),
        })
    }

    /// Place text at (x, y) in 12pt Helvetica. Coordinates use the
    /// PDF default bottom-left origin. Opens a page if none is open.
    pub fn place_text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        let ops = format!(
            "BT\n/{} {} Tf\n{} {} Td\n({}) Tj\nET\n",
            DEFAULT_FONT,
            format_coord(DEFAULT_FONT_SIZE),
            format_coord(x),
            format_coord(y),
            escape_pdf_string(text),
        );
        self.open_page().content_ops.extend_from_slice(ops.as_bytes());
        self
    }

    /// Commit the current page: its content stream and page
    /// dictionary are written and its content is freed. A page with
    /// nothing drawn is still committed, as a blank page.
    pub fn end_page(&mut self) -> io::Result<()> {
        let page = match self.current_page.take() {
            Some(page) => page,
            None => PageBuilder {
                size: self.page_size,
                content_ops: Vec::new(),
            },
        };

        let content_id = ObjId::new(self.next_obj_num);
        let page_id = ObjId::new(self.next_obj_num + 1);
        self.next_obj_num += 2;

        let content_stream = if self.compress {
            PdfObject::stream(
                vec![("Filter", PdfObject::name("FlateDecode"))],
                deflate(&page.content_ops)?,
            )
        } else {
            PdfObject::stream(vec![], page.content_ops)
        };
        self.writer.write_object(content_id, &content_stream)?;

        let page_dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::reference(PAGES_OBJ)),
            (
                "MediaBox",
                PdfObject::page_rect(page.size.width, page.size.height),
            ),
            ("Contents", PdfObject::reference(content_id)),
            (
                "Resources",
                PdfObject::dict(vec![(
                    "Font",
                    PdfObject::dict(vec![(
                        DEFAULT_FONT,
                        PdfObject::reference(FONT_HELV_OBJ),
                    )]),
                )]),
            ),
        ]);
        self.writer.write_object(page_id, &page_dict)?;
        self.page_obj_ids.push(page_id);

        debug!(
            page = self.page_obj_ids.len(),
            size = %page.size,
            orientation = %page.size.orientation(),
            paper = PaperSize::matching(page.size)
                .map_or("custom", PaperSize::name),
            "page committed"
        );
        Ok(())
    }

    /// Pages committed so far.
    pub fn page_count(&self) -> usize {
        self.page_obj_ids.len()
    }

    /// Finish the document: commits an open page, then writes the
    /// page tree, catalog, info dictionary, xref table and trailer,
    /// and flushes. Returns the underlying writer.
    pub fn end_document(mut self) -> io::Result<W> {
        if self.current_page.is_some() {
            self.end_page()?;
        }

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = ObjId::new(self.next_obj_num);
            self.next_obj_num += 1;
            let entries = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::literal_string(v)))
                .collect();
            self.writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        };

        let kids = self
            .page_obj_ids
            .iter()
            .map(|id| PdfObject::reference(*id))
            .collect();
        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::array(kids)),
            (
                "Count",
                PdfObject::Integer(self.page_obj_ids.len() as i64),
            ),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::reference(PAGES_OBJ)),
        ]);
        self.writer.write_object(CATALOG_OBJ, &catalog)?;

        self.writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;

        info!(
            pages = self.page_obj_ids.len(),
            bytes = self.writer.current_offset(),
            "document finished"
        );
        Ok(self.writer.into_inner())
    }
}

fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
