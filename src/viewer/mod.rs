//! # Viewer Module
//!
//! The page-navigation surface of the PDF viewer widget.
//!
//! Rendering, document loading, links and search live in the viewer itself;
//! this crate only drives it through [`PageViewer`]. [`deck::PageDeck`] is an
//! in-memory implementation used by the headless binary and the tests.

pub mod deck;

use std::fmt;
use std::str::FromStr;

use crate::presentation::PresentationState;

/// Zoom setting understood by the viewer.
///
/// The named variants mirror the viewer's string presets; anything else is a
/// plain zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleValue {
    /// Whole page visible (`page-fit`).
    PageFit,
    /// Page width fills the container (`page-width`).
    PageWidth,
    /// 100% (`page-actual`).
    PageActual,
    /// Viewer picks (`auto`).
    Auto,
    /// Explicit zoom factor, 1.0 = 100%.
    Factor(f64),
}

impl fmt::Display for ScaleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleValue::PageFit => f.write_str("page-fit"),
            ScaleValue::PageWidth => f.write_str("page-width"),
            ScaleValue::PageActual => f.write_str("page-actual"),
            ScaleValue::Auto => f.write_str("auto"),
            ScaleValue::Factor(factor) => write!(f, "{}", factor),
        }
    }
}

impl FromStr for ScaleValue {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "page-fit" => Ok(ScaleValue::PageFit),
            "page-width" => Ok(ScaleValue::PageWidth),
            "page-actual" => Ok(ScaleValue::PageActual),
            "auto" => Ok(ScaleValue::Auto),
            other => match other.parse::<f64>() {
                Ok(factor) if factor > 0.0 && factor.is_finite() => Ok(ScaleValue::Factor(factor)),
                _ => Err(format!("invalid scale value: {}", other)),
            },
        }
    }
}

/// How pages are laid out for scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollMode {
    Unknown,
    #[default]
    Vertical,
    Horizontal,
    Wrapped,
    /// One page at a time.
    Page,
}

/// Side-by-side page pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpreadMode {
    Unknown,
    #[default]
    None,
    /// Spreads start with odd-numbered pages.
    Odd,
    /// Spreads start with even-numbered pages.
    Even,
}

/// Page navigation capability of the PDF viewer widget.
///
/// Page numbers are 1-based.
#[cfg_attr(test, mockall::automock)]
pub trait PageViewer {
    fn pages_count(&self) -> u32;

    fn current_page_number(&self) -> u32;

    /// Jumps to `page`; out-of-range values are ignored.
    fn set_current_page_number(&mut self, page: u32);

    fn current_scale_value(&self) -> ScaleValue;

    fn set_current_scale_value(&mut self, value: ScaleValue);

    fn scroll_mode(&self) -> ScrollMode;

    fn set_scroll_mode(&mut self, mode: ScrollMode);

    fn spread_mode(&self) -> SpreadMode;

    fn set_spread_mode(&mut self, mode: SpreadMode);

    /// True once every page view has its final dimensions.
    fn page_views_ready(&self) -> bool;

    /// True if all pages share the same size (only meaningful once ready).
    fn has_equal_page_sizes(&self) -> bool;

    /// Advances one page (or one spread). Returns false at the end.
    fn next_page(&mut self) -> bool;

    /// Goes back one page (or one spread). Returns false at the start.
    fn previous_page(&mut self) -> bool;

    fn set_presentation_mode_state(&mut self, state: PresentationState);

    /// Recomputes the container size after a window resize.
    fn update_layout(&mut self);
}
