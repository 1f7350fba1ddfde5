//! Page dimensions, named paper sizes and the classification rules a
//! page-size analyser applies to them.

use std::fmt;

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f64 = 72.0;
const MM_PER_INCH: f64 = 25.4;

/// Widths and heights closer than this (in points) count as square.
const SQUARE_TOLERANCE_PT: f64 = 5.0;
/// Maximum per-axis distance (in millimetres) for a paper match.
const PAPER_TOLERANCE_MM: f64 = 3.0;

pub fn pt_to_mm(pt: f64) -> f64 {
    pt * MM_PER_INCH / POINTS_PER_INCH
}

pub fn pt_to_inch(pt: f64) -> f64 {
    pt / POINTS_PER_INCH
}

/// Page dimensions in points, origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const fn new(width: f64, height: f64) -> Self {
        PageSize { width, height }
    }

    /// Same size with width and height swapped.
    pub fn transposed(self) -> Self {
        PageSize::new(self.height, self.width)
    }

    /// Long edge vertical.
    pub fn portrait(self) -> Self {
        if self.width > self.height {
            self.transposed()
        } else {
            self
        }
    }

    /// Long edge horizontal.
    pub fn landscape(self) -> Self {
        if self.height > self.width {
            self.transposed()
        } else {
            self
        }
    }

    pub fn orientation(self) -> Orientation {
        if (self.width - self.height).abs() < SQUARE_TOLERANCE_PT {
            Orientation::Square
        } else if self.width > self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// `(width, height)` in millimetres.
    pub fn to_mm(self) -> (f64, f64) {
        (pt_to_mm(self.width), pt_to_mm(self.height))
    }

    /// Reduced ratio of the rounded point dimensions, e.g. `"4:3"`.
    pub fn aspect_ratio(self) -> String {
        let w = self.width.round() as u64;
        let h = self.height.round() as u64;
        let divisor = gcd(w, h).max(1);
        format!("{}:{}", w / divisor, h / divisor)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} pt", self.width, self.height)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
    Square,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
            Orientation::Square => "Square",
        };
        f.write_str(s)
    }
}

/// Named paper sizes, in the order matching tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperSize {
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    Letter,
    Legal,
    Tabloid,
}

impl PaperSize {
    pub const ALL: [PaperSize; 10] = [
        PaperSize::A0,
        PaperSize::A1,
        PaperSize::A2,
        PaperSize::A3,
        PaperSize::A4,
        PaperSize::A5,
        PaperSize::A6,
        PaperSize::Letter,
        PaperSize::Legal,
        PaperSize::Tabloid,
    ];

    /// Nominal portrait size in whole millimetres.
    pub fn millimetres(self) -> (f64, f64) {
        match self {
            PaperSize::A0 => (841.0, 1189.0),
            PaperSize::A1 => (594.0, 841.0),
            PaperSize::A2 => (420.0, 594.0),
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::A6 => (105.0, 148.0),
            PaperSize::Letter => (216.0, 279.0),
            PaperSize::Legal => (216.0, 356.0),
            PaperSize::Tabloid => (279.0, 432.0),
        }
    }

    /// Portrait size in whole points, as page boxes usually carry it.
    pub fn size(self) -> PageSize {
        let (w, h) = match self {
            PaperSize::A0 => (2384.0, 3370.0),
            PaperSize::A1 => (1684.0, 2384.0),
            PaperSize::A2 => (1191.0, 1684.0),
            PaperSize::A3 => (842.0, 1191.0),
            PaperSize::A4 => (595.0, 842.0),
            PaperSize::A5 => (420.0, 595.0),
            PaperSize::A6 => (298.0, 420.0),
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::Legal => (612.0, 1008.0),
            PaperSize::Tabloid => (792.0, 1224.0),
        };
        PageSize::new(w, h)
    }

    /// First paper within tolerance of `size` in either orientation.
    pub fn matching(size: PageSize) -> Option<PaperSize> {
        let (w, h) = size.to_mm();
        let close = |a: f64, b: f64| (a - b).abs() < PAPER_TOLERANCE_MM;
        PaperSize::ALL.into_iter().find(|paper| {
            let (pw, ph) = paper.millimetres();
            (close(w, pw) && close(h, ph)) || (close(w, ph) && close(h, pw))
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            PaperSize::A0 => "A0",
            PaperSize::A1 => "A1",
            PaperSize::A2 => "A2",
            PaperSize::A3 => "A3",
            PaperSize::A4 => "A4",
            PaperSize::A5 => "A5",
            PaperSize::A6 => "A6",
            PaperSize::Letter => "Letter",
            PaperSize::Legal => "Legal",
            PaperSize::Tabloid => "Tabloid",
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_paper_matches_itself() {
        for paper in PaperSize::ALL {
            assert_eq!(PaperSize::matching(paper.size()), Some(paper));
            assert_eq!(
                PaperSize::matching(paper.size().landscape()),
                Some(paper),
                "{} landscape",
                paper
            );
        }
    }

    #[test]
    fn custom_size_has_no_match() {
        assert_eq!(PaperSize::matching(PageSize::new(500.0, 500.0)), None);
    }

    #[test]
    fn orientation_rules() {
        assert_eq!(
            PaperSize::A4.size().orientation(),
            Orientation::Portrait
        );
        assert_eq!(
            PaperSize::A4.size().landscape().orientation(),
            Orientation::Landscape
        );
        assert_eq!(
            PageSize::new(600.0, 604.0).orientation(),
            Orientation::Square
        );
    }

    #[test]
    fn portrait_and_landscape_are_idempotent() {
        let a4 = PaperSize::A4.size();
        assert_eq!(a4.portrait(), a4);
        assert_eq!(a4.landscape(), PageSize::new(842.0, 595.0));
        assert_eq!(a4.landscape().landscape(), a4.landscape());
        assert_eq!(a4.landscape().portrait(), a4);
    }

    #[test]
    fn unit_conversions() {
        assert!((pt_to_mm(72.0) - 25.4).abs() < 1e-9);
        assert!((pt_to_inch(612.0) - 8.5).abs() < 1e-9);
        let (w, h) = PaperSize::Letter.size().to_mm();
        assert!((w - 215.9).abs() < 1e-9);
        assert!((h - 279.4).abs() < 1e-9);
    }

    #[test]
    fn aspect_ratios() {
        assert_eq!(PaperSize::Letter.size().aspect_ratio(), "17:22");
        assert_eq!(PageSize::new(800.0, 600.0).aspect_ratio(), "4:3");
        assert_eq!(PageSize::new(0.0, 0.0).aspect_ratio(), "0:0");
    }
}
