//! In-memory [`PageViewer`] holding only page geometry and view settings.

use tracing::debug;

use super::{PageViewer, ScaleValue, ScrollMode, SpreadMode};
use crate::presentation::PresentationState;

/// US Letter in PDF points.
const DEFAULT_PAGE_SIZE: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

/// Page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// A document stand-in that tracks navigation state the way the viewer does.
///
/// # Examples
///
/// ```
/// use pdf_presenter::viewer::deck::PageDeck;
/// use pdf_presenter::viewer::PageViewer;
///
/// let mut deck = PageDeck::new(3);
/// assert!(deck.next_page());
/// assert_eq!(deck.current_page_number(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct PageDeck {
    pages: Vec<PageSize>,
    current_page: u32,
    scale: ScaleValue,
    scroll_mode: ScrollMode,
    spread_mode: SpreadMode,
    presentation_state: PresentationState,
    views_ready: bool,
    layout_updates: u32,
}

impl PageDeck {
    /// Creates a deck of `page_count` equally sized pages.
    #[must_use]
    pub fn new(page_count: u32) -> Self {
        Self::with_page_sizes(vec![DEFAULT_PAGE_SIZE; page_count as usize])
    }

    /// Creates a deck with explicit page sizes.
    #[must_use]
    pub fn with_page_sizes(pages: Vec<PageSize>) -> Self {
        let current_page = if pages.is_empty() { 0 } else { 1 };
        Self {
            pages,
            current_page,
            scale: ScaleValue::Auto,
            scroll_mode: ScrollMode::default(),
            spread_mode: SpreadMode::default(),
            presentation_state: PresentationState::Unknown,
            views_ready: true,
            layout_updates: 0,
        }
    }

    /// Marks page views as (not) laid out yet.
    pub fn set_page_views_ready(&mut self, ready: bool) {
        self.views_ready = ready;
    }

    /// Last presentation state the viewer was told about.
    pub fn presentation_state(&self) -> PresentationState {
        self.presentation_state
    }

    /// Number of layout recomputations since creation.
    pub fn layout_updates(&self) -> u32 {
        self.layout_updates
    }

    fn page_advance(&self) -> u32 {
        if self.scroll_mode == ScrollMode::Page
            && matches!(self.spread_mode, SpreadMode::Odd | SpreadMode::Even)
        {
            2
        } else {
            1
        }
    }
}

impl PageViewer for PageDeck {
    fn pages_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn current_page_number(&self) -> u32 {
        self.current_page
    }

    fn set_current_page_number(&mut self, page: u32) {
        if page == 0 || page > self.pages_count() {
            debug!("Ignoring out-of-range page number {}", page);
            return;
        }
        self.current_page = page;
    }

    fn current_scale_value(&self) -> ScaleValue {
        self.scale
    }

    fn set_current_scale_value(&mut self, value: ScaleValue) {
        self.scale = value;
    }

    fn scroll_mode(&self) -> ScrollMode {
        self.scroll_mode
    }

    fn set_scroll_mode(&mut self, mode: ScrollMode) {
        self.scroll_mode = mode;
    }

    fn spread_mode(&self) -> SpreadMode {
        self.spread_mode
    }

    fn set_spread_mode(&mut self, mode: SpreadMode) {
        self.spread_mode = mode;
    }

    fn page_views_ready(&self) -> bool {
        self.views_ready
    }

    fn has_equal_page_sizes(&self) -> bool {
        match self.pages.first() {
            Some(first) => self.pages.iter().all(|page| page == first),
            None => true,
        }
    }

    fn next_page(&mut self) -> bool {
        let count = self.pages_count();
        if self.current_page >= count {
            return false;
        }
        self.current_page = (self.current_page + self.page_advance()).min(count);
        true
    }

    fn previous_page(&mut self) -> bool {
        if self.current_page <= 1 {
            return false;
        }
        self.current_page = self.current_page.saturating_sub(self.page_advance()).max(1);
        true
    }

    fn set_presentation_mode_state(&mut self, state: PresentationState) {
        self.presentation_state = state;
    }

    fn update_layout(&mut self) {
        self.layout_updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_deck_starts_on_first_page() {
        let deck = PageDeck::new(5);
        assert_eq!(deck.pages_count(), 5);
        assert_eq!(deck.current_page_number(), 1);
        assert!(deck.has_equal_page_sizes());
    }

    #[test]
    fn test_empty_deck() {
        let mut deck = PageDeck::new(0);
        assert_eq!(deck.current_page_number(), 0);
        assert!(!deck.next_page());
        assert!(!deck.previous_page());
    }

    #[test]
    fn test_navigation_clamps_to_bounds() {
        let mut deck = PageDeck::new(2);
        assert!(!deck.previous_page(), "Cannot go before the first page");
        assert!(deck.next_page());
        assert!(!deck.next_page(), "Cannot go past the last page");
        assert_eq!(deck.current_page_number(), 2);
    }

    #[test]
    fn test_out_of_range_page_number_ignored() {
        let mut deck = PageDeck::new(3);
        deck.set_current_page_number(4);
        assert_eq!(deck.current_page_number(), 1);
        deck.set_current_page_number(0);
        assert_eq!(deck.current_page_number(), 1);
        deck.set_current_page_number(3);
        assert_eq!(deck.current_page_number(), 3);
    }

    #[test]
    fn test_spread_advances_two_pages_in_page_mode() {
        let mut deck = PageDeck::new(6);
        deck.set_scroll_mode(ScrollMode::Page);
        deck.set_spread_mode(SpreadMode::Odd);

        assert!(deck.next_page());
        assert_eq!(deck.current_page_number(), 3);
        assert!(deck.previous_page());
        assert_eq!(deck.current_page_number(), 1);
    }

    #[test]
    fn test_mixed_page_sizes() {
        let deck = PageDeck::with_page_sizes(vec![
            PageSize { width: 612.0, height: 792.0 },
            PageSize { width: 792.0, height: 612.0 },
        ]);
        assert!(!deck.has_equal_page_sizes());
    }
}
