use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pdf_core::PdfDocument;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FixtureConfig;
use crate::pages::PageSpec;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Render `pages` into `writer`, one committed page per `PageSpec`, and
/// return the writer once the document is finished.
pub fn write_fixture<W: Write>(
    writer: W,
    pages: &[PageSpec],
    config: &FixtureConfig,
) -> io::Result<W> {
    let mut doc = PdfDocument::new(writer)?;
    doc.set_compression(config.compress());
    for (key, value) in config.info() {
        doc.set_info(key, value);
    }

    let (x, y) = config.label_origin();
    for spec in pages {
        debug!(label = %spec.label, width = spec.width, height = spec.height, "drawing page");
        doc.set_page_size(spec.width, spec.height);
        doc.place_text(&spec.label, x, y);
        doc.end_page()?;
    }

    doc.end_document()
}

/// Write the fixture to `config.output()`, replacing any previous
/// file. On failure no file is left behind.
pub fn generate(
    config: &FixtureConfig,
    pages: &[PageSpec],
) -> Result<PathBuf, FixtureError> {
    generate_with(config, pages, |path| {
        fs::File::create(path).map(io::BufWriter::new)
    })
}

/// Like [`generate`], with `open` creating the writer for the output
/// path. If rendering or flushing fails after `open` succeeded, the
/// file at the output path is removed.
pub fn generate_with<W, F>(
    config: &FixtureConfig,
    pages: &[PageSpec],
    open: F,
) -> Result<PathBuf, FixtureError>
where
    W: Write,
    F: FnOnce(&Path) -> io::Result<W>,
{
    let path = config.output().to_path_buf();
    let io_err = |source| FixtureError::Io {
        path: path.clone(),
        source,
    };

    let writer = open(&path).map_err(io_err)?;
    let result = write_fixture(writer, pages, config).and_then(|mut w| w.flush());

    if let Err(source) = result {
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "could not remove partial fixture");
        } else {
            warn!(path = %path.display(), "removed partial fixture");
        }
        return Err(io_err(source));
    }

    info!(path = %path.display(), pages = pages.len(), "fixture written");
    Ok(path)
}
