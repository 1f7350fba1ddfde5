//! Per-page size reports and whole-document statistics, as a page-size
//! analyser shows them for a PDF that has been read back.

use std::fmt;

use crate::paper::{pt_to_inch, Orientation, PageSize, PaperSize};
use crate::reader::PageInfo;

/// Size details of one page in every unit the analyser shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    /// 1-based position in document order.
    pub number: usize,
    pub size: PageSize,
    pub orientation: Orientation,
    /// Reduced ratio of the rounded point dimensions, e.g. `"595:842"`.
    pub aspect_ratio: String,
    /// `None` for sizes that match no named paper.
    pub paper: Option<PaperSize>,
}

impl PageReport {
    pub fn new(number: usize, size: PageSize) -> Self {
        PageReport {
            number,
            size,
            orientation: size.orientation(),
            aspect_ratio: size.aspect_ratio(),
            paper: PaperSize::matching(size),
        }
    }

    pub fn inches(&self) -> (f64, f64) {
        (pt_to_inch(self.size.width), pt_to_inch(self.size.height))
    }

    pub fn millimetres(&self) -> (f64, f64) {
        self.size.to_mm()
    }

    pub fn centimetres(&self) -> (f64, f64) {
        let (w, h) = self.size.to_mm();
        (w / 10.0, h / 10.0)
    }

    /// Paper name, or `"Custom"` when nothing matched.
    pub fn paper_name(&self) -> &'static str {
        self.paper.map_or("Custom", PaperSize::name)
    }

    /// Dimensions rounded to whole millimetres. Two pages have the
    /// same size when their keys are equal.
    fn size_key(&self) -> (i64, i64) {
        let (w, h) = self.size.to_mm();
        (w.round() as i64, h.round() as i64)
    }
}

impl From<&PageInfo> for PageReport {
    fn from(page: &PageInfo) -> Self {
        PageReport::new(page.number, page.size)
    }
}

/// Smallest and largest page width and height, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionRange {
    pub min_width_mm: f64,
    pub max_width_mm: f64,
    pub min_height_mm: f64,
    pub max_height_mm: f64,
}

/// Statistics over every page of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub pages: Vec<PageReport>,
    /// `None` for a document without pages.
    pub dimensions: Option<DimensionRange>,
    /// Paper seen on the most pages, with its page count. Custom
    /// sizes are counted together under `None`. On a tie the paper
    /// seen first on a later page wins.
    pub most_common_paper: Option<(Option<PaperSize>, usize)>,
    pub portrait: usize,
    pub landscape: usize,
    pub square: usize,
}

impl DocumentSummary {
    pub fn from_pages(pages: &[PageInfo]) -> Self {
        DocumentSummary::from_reports(pages.iter().map(PageReport::from).collect())
    }

    pub fn from_reports(pages: Vec<PageReport>) -> Self {
        let dimensions = pages.iter().map(PageReport::millimetres).fold(
            None,
            |range: Option<DimensionRange>, (w, h)| {
                Some(match range {
                    None => DimensionRange {
                        min_width_mm: w,
                        max_width_mm: w,
                        min_height_mm: h,
                        max_height_mm: h,
                    },
                    Some(r) => DimensionRange {
                        min_width_mm: r.min_width_mm.min(w),
                        max_width_mm: r.max_width_mm.max(w),
                        min_height_mm: r.min_height_mm.min(h),
                        max_height_mm: r.max_height_mm.max(h),
                    },
                })
            },
        );

        // Counts in order of first appearance.
        let mut paper_counts: Vec<(Option<PaperSize>, usize)> = Vec::new();
        for report in &pages {
            match paper_counts.iter_mut().find(|(p, _)| *p == report.paper) {
                Some((_, count)) => *count += 1,
                None => paper_counts.push((report.paper, 1)),
            }
        }
        let most_common_paper = paper_counts
            .into_iter()
            .reduce(|best, next| if best.1 > next.1 { best } else { next });

        let count = |o: Orientation| pages.iter().filter(|r| r.orientation == o).count();
        let (portrait, landscape, square) = (
            count(Orientation::Portrait),
            count(Orientation::Landscape),
            count(Orientation::Square),
        );

        DocumentSummary {
            dimensions,
            most_common_paper,
            portrait,
            landscape,
            square,
            pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether every page has the same rounded millimetre size.
    /// Vacuously true for a document without pages.
    pub fn all_same_size(&self) -> bool {
        match self.pages.split_first() {
            Some((first, rest)) => {
                let key = first.size_key();
                rest.iter().all(|r| r.size_key() == key)
            }
            None => true,
        }
    }
}

impl fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages, {}",
            self.page_count(),
            if self.all_same_size() {
                "all the same size"
            } else {
                "mixed sizes"
            }
        )?;
        if let Some(r) = self.dimensions {
            write!(
                f,
                ", {:.1}-{:.1} x {:.1}-{:.1} mm",
                r.min_width_mm, r.max_width_mm, r.min_height_mm, r.max_height_mm
            )?;
        }
        if let Some((paper, count)) = self.most_common_paper {
            let name = paper.map_or("Custom", PaperSize::name);
            write!(f, ", most common {} ({})", name, count)?;
        }
        write!(
            f,
            ", {} portrait, {} landscape, {} square",
            self.portrait, self.landscape, self.square
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(sizes: &[(f64, f64)]) -> DocumentSummary {
        DocumentSummary::from_reports(
            sizes
                .iter()
                .enumerate()
                .map(|(i, &(w, h))| PageReport::new(i + 1, PageSize::new(w, h)))
                .collect(),
        )
    }

    #[test]
    fn report_units() {
        let report = PageReport::new(3, PageSize::new(612.0, 792.0));
        assert_eq!(report.inches(), (8.5, 11.0));
        let (w_mm, h_mm) = report.millimetres();
        assert!((w_mm - 215.9).abs() < 1e-9);
        assert!((h_mm - 279.4).abs() < 1e-9);
        let (w_cm, _) = report.centimetres();
        assert!((w_cm - 21.59).abs() < 1e-9);
        assert_eq!(report.aspect_ratio, "17:22");
        assert_eq!(report.orientation, Orientation::Portrait);
        assert_eq!(report.paper_name(), "Letter");
    }

    #[test]
    fn custom_size_report() {
        let report = PageReport::new(1, PageSize::new(500.0, 502.0));
        assert_eq!(report.paper, None);
        assert_eq!(report.paper_name(), "Custom");
        assert_eq!(report.orientation, Orientation::Square);
    }

    #[test]
    fn uniform_document() {
        let s = summary(&[(595.0, 842.0), (595.0, 842.0)]);
        assert!(s.all_same_size());
        assert_eq!(s.most_common_paper, Some((Some(PaperSize::A4), 2)));
        assert_eq!((s.portrait, s.landscape, s.square), (2, 0, 0));
    }

    #[test]
    fn landscape_copy_is_a_different_size() {
        let s = summary(&[(595.0, 842.0), (842.0, 595.0)]);
        assert!(!s.all_same_size());
        assert_eq!(s.most_common_paper, Some((Some(PaperSize::A4), 2)));
    }

    #[test]
    fn dimension_range_spans_all_pages() {
        let s = summary(&[(595.0, 842.0), (842.0, 1191.0), (612.0, 792.0)]);
        let r = s.dimensions.unwrap();
        assert!((r.min_width_mm - 209.9).abs() < 0.1);
        assert!((r.max_width_mm - 297.0).abs() < 0.1);
        assert!((r.min_height_mm - 279.4).abs() < 0.1);
        assert!((r.max_height_mm - 420.2).abs() < 0.1);
    }

    #[test]
    fn tie_goes_to_later_paper() {
        let s = summary(&[(612.0, 792.0), (595.0, 842.0)]);
        assert_eq!(s.most_common_paper, Some((Some(PaperSize::A4), 1)));
    }

    #[test]
    fn custom_sizes_count_together() {
        let s = summary(&[(500.0, 500.0), (300.0, 700.0), (595.0, 842.0)]);
        assert_eq!(s.most_common_paper, Some((None, 2)));
        assert_eq!((s.portrait, s.landscape, s.square), (2, 0, 1));
    }

    #[test]
    fn empty_document() {
        let s = summary(&[]);
        assert_eq!(s.page_count(), 0);
        assert!(s.all_same_size());
        assert_eq!(s.dimensions, None);
        assert_eq!(s.most_common_paper, None);
        assert_eq!(s.to_string(), "0 pages, all the same size, 0 portrait, 0 landscape, 0 square");
    }

    #[test]
    fn display_line() {
        let s = summary(&[(595.0, 842.0), (842.0, 595.0)]);
        assert_eq!(
            s.to_string(),
            "2 pages, mixed sizes, 209.9-297.0 x 209.9-297.0 mm, \
             most common A4 (2), 1 portrait, 1 landscape, 0 square"
        );
    }
}
