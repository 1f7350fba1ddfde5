use pdf_core::{PageSize, PaperSize};

/// One page of the fixture: its size in points and the label drawn on it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    pub width: f64,
    pub height: f64,
    pub label: String,
}

impl PageSpec {
    pub fn new(size: PageSize, label: impl Into<String>) -> Self {
        PageSpec {
            width: size.width,
            height: size.height,
            label: label.into(),
        }
    }

    pub fn size(&self) -> PageSize {
        PageSize::new(self.width, self.height)
    }
}

/// The five pages of `test_multi_size.pdf`, in document order.
pub fn multi_size_pages() -> Vec<PageSpec> {
    let a4 = PaperSize::A4.size();
    vec![
        PageSpec::new(a4, "Page 1 - A4 Portrait"),
        PageSpec::new(a4.landscape(), "Page 2 - A4 Landscape"),
        PageSpec::new(PaperSize::Letter.size(), "Page 3 - Letter"),
        PageSpec::new(PaperSize::A3.size(), "Page 4 - A3"),
        PageSpec::new(a4, "Page 5 - A4 Portrait"),
    ]
}
