//! Scrollable viewport state

/// Lines scrolled per wheel notch
pub const WHEEL_STEP: usize = 3;

/// Offset bookkeeping for a window of `height` rows over `total` lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    offset: usize,
    height: usize,
    total: usize,
    /// Stay pinned to the last line as content grows
    follow: bool,
}

impl Viewport {
    pub fn new(follow: bool) -> Self {
        Self {
            follow,
            ..Self::default()
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn total(&self) -> usize {
        self.total
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.height)
    }

    pub fn at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Row range currently visible
    pub fn visible(&self) -> std::ops::Range<usize> {
        let end = (self.offset + self.height).min(self.total);
        self.offset.min(end)..end
    }

    pub fn set_height(&mut self, height: usize) {
        let was_bottom = self.at_bottom();
        self.height = height;
        if was_bottom && self.follow {
            self.offset = self.max_offset();
        }
        self.clamp();
    }

    /// Content length changed
    pub fn set_total(&mut self, total: usize) {
        let was_bottom = self.at_bottom();
        self.total = total;
        if was_bottom && self.follow {
            self.offset = self.max_offset();
        }
        self.clamp();
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.height.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height.max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.height / 2).max(1));
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down((self.height / 2).max(1));
    }

    pub fn top(&mut self) {
        self.offset = 0;
    }

    pub fn bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Wheel notch
    pub fn wheel(&mut self, up: bool) {
        if up {
            self.scroll_up(WHEEL_STEP);
        } else {
            self.scroll_down(WHEEL_STEP);
        }
    }

    /// Keep `row` inside the window
    pub fn reveal(&mut self, row: usize) {
        if row < self.offset {
            self.offset = row;
        } else if self.height > 0 && row >= self.offset + self.height {
            self.offset = row + 1 - self.height;
        }
        self.clamp();
    }

    pub fn percent(&self) -> u16 {
        super::utils::scroll_percent(self.offset, self.total, self.height)
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}
