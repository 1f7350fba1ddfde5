pub mod analysis;
pub mod content;
pub mod document;
pub mod encoding;
pub mod objects;
pub mod paper;
pub mod reader;
pub mod writer;

pub use analysis::{DimensionRange, DocumentSummary, PageReport};
pub use content::TextRun;
pub use document::PdfDocument;
pub use paper::{Orientation, PageSize, PaperSize};
pub use reader::{PageInfo, PdfReadError, PdfReader};
