use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use pdf_core::{PageSize, PdfDocument, PdfReader};

fn finish(doc: PdfDocument<Vec<u8>>) -> String {
    let bytes = doc.end_document().unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[test]
fn create_single_page_document() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.begin_page(612.0, 792.0).unwrap();
    doc.end_page().unwrap();
    let output = finish(doc);
    assert!(output.starts_with("%PDF-1.7"));
    assert!(output.contains("/MediaBox [0 0 612.0 792.0]"));
    assert!(output.ends_with("%%EOF\n"));
}

#[test]
fn set_info_appears_in_output() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.set_info("Producer", "pdf-fixtures")
        .set_info("Title", "Test (draft)");
    doc.end_page().unwrap();
    let output = finish(doc);
    assert!(output.contains("/Producer (pdf-fixtures)"));
    assert!(output.contains("/Title (Test \\(draft\\))"));
    assert!(output.contains("/Info"));
}

#[test]
fn place_text_in_content_stream() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.place_text("Page 3 - Letter", 100.0, 400.0);
    doc.end_page().unwrap();
    let output = finish(doc);
    assert!(output.contains("/F1 12 Tf"));
    assert!(output.contains("100 400 Td"));
    assert!(output.contains("(Page 3 - Letter) Tj"));
    assert!(output.contains("/BaseFont /Helvetica"));
}

#[test]
fn set_page_size_resizes_open_page() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.place_text("x", 10.0, 10.0);
    doc.set_page_size(842.0, 595.0);
    doc.end_page().unwrap();
    let output = finish(doc);
    assert!(output.contains("/MediaBox [0 0 842.0 595.0]"));
    assert!(output.contains("/Count 1"));
}

#[test]
fn page_size_carries_over_to_next_page() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.set_page_size(842.0, 1191.0);
    doc.place_text("first", 10.0, 10.0);
    doc.end_page().unwrap();
    doc.place_text("second", 10.0, 10.0);
    doc.end_page().unwrap();
    assert_eq!(doc.page_size(), PageSize::new(842.0, 1191.0));

    let bytes = doc.end_document().unwrap();
    let pages = PdfReader::from_bytes(bytes).unwrap().pages().unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages
        .iter()
        .all(|p| p.size == PageSize::new(842.0, 1191.0)));
}

#[test]
fn default_page_size_is_a4_portrait() {
    let doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    assert_eq!(doc.page_size(), PageSize::new(595.0, 842.0));
}

/// end_page writes page data to the writer straight away instead of
/// buffering everything until end_document.
#[test]
fn end_page_flushes_to_writer() {
    struct TrackingWriter {
        byte_count: Rc<RefCell<usize>>,
        inner: Vec<u8>,
    }

    impl Write for TrackingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = self.inner.write(buf)?;
            *self.byte_count.borrow_mut() += n;
            Ok(n)
        }
        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    let counter = Rc::new(RefCell::new(0usize));
    let writer = TrackingWriter {
        byte_count: counter.clone(),
        inner: Vec::new(),
    };

    let mut doc = PdfDocument::new(writer).unwrap();
    let after_init = *counter.borrow();

    doc.begin_page(612.0, 792.0).unwrap();
    doc.place_text("Hello", 20.0, 20.0);
    assert_eq!(*counter.borrow(), after_init);

    doc.end_page().unwrap();
    assert!(*counter.borrow() > after_init);
    assert_eq!(doc.page_count(), 1);
}

#[test]
fn begin_page_commits_open_page() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.begin_page(612.0, 792.0).unwrap();
    doc.place_text("Page 1", 20.0, 20.0);
    doc.begin_page(595.0, 842.0).unwrap();
    doc.place_text("Page 2", 20.0, 20.0);
    assert_eq!(doc.page_count(), 1);
    let output = finish(doc);
    assert!(output.contains("/Count 2"));
}

#[test]
fn end_document_commits_open_page() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.place_text("Hello", 20.0, 20.0);
    let output = finish(doc);
    assert!(output.contains("/Count 1"));
    assert!(output.contains("(Hello) Tj"));
}

#[test]
fn document_without_pages() {
    let doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    let output = finish(doc);
    assert!(output.contains("/Kids [] /Count 0"));
}

#[test]
fn compressed_streams_use_flate_and_read_back() {
    let render = |compress: bool| -> Vec<u8> {
        let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
        doc.set_compression(compress);
        for line in 0..40 {
            doc.place_text("Page 4 - A3", 100.0, 40.0 + line as f64 * 20.0);
        }
        doc.end_page().unwrap();
        doc.end_document().unwrap()
    };
    let plain = render(false);
    let compressed = render(true);

    let output = String::from_utf8_lossy(&compressed);
    assert!(output.contains("/Filter /FlateDecode"));
    assert!(
        compressed.len() < plain.len(),
        "compressed ({}) should be smaller than uncompressed ({})",
        compressed.len(),
        plain.len(),
    );

    let pages = PdfReader::from_bytes(compressed).unwrap().pages().unwrap();
    assert_eq!(pages[0].text_runs.len(), 40);
    assert!(pages[0].has_text_at("Page 4 - A3", 100.0, 40.0));
    assert!(pages[0].has_text_at("Page 4 - A3", 100.0, 820.0));
}

#[test]
fn set_info_replaces_existing_key() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.set_info("Title", "First").set_info("Title", "Second");
    let output = finish(doc);
    assert_eq!(output.matches("/Title").count(), 1);
    assert!(output.contains("/Title (Second)"));
}

#[test]
fn non_ascii_text_round_trips_through_win_ansi() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.place_text("Café – 5 €", 100.0, 400.0);
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(output.contains("(Caf\\351 \\226 5 \\200) Tj"));

    let pages = PdfReader::from_bytes(bytes).unwrap().pages().unwrap();
    assert!(pages[0].has_text_at("Café – 5 €", 100.0, 400.0));
}

#[test]
fn uncompressed_document_has_no_filter() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.place_text("Hello", 20.0, 20.0);
    let output = finish(doc);
    assert!(!output.contains("FlateDecode"));
}

#[test]
fn fractional_coordinates_keep_precision() {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.place_text("test", 12.5, 0.0);
    let output = finish(doc);
    assert!(output.contains("12.5 0 Td"));
}

#[test]
fn create_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pdf");
    let mut doc = PdfDocument::create(&path).unwrap();
    doc.place_text("on disk", 72.0, 720.0);
    drop(doc.end_document().unwrap());

    let reader = PdfReader::open(&path).unwrap();
    assert_eq!(reader.page_count(), 1);
}

#[test]
fn create_in_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.pdf");
    let err = PdfDocument::create(&path).err().unwrap();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
    assert!(!path.exists());
}
