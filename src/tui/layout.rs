//! Layout budget for dashboard chrome
//!
//! Pure arithmetic that splits the terminal between the header, separator,
//! helpline, shadows and dialog content. Every function clamps to a small
//! positive floor so a tiny terminal shrinks content instead of panicking.

use ratatui::layout::Rect;

pub const SEPARATOR_HEIGHT: u16 = 1;
pub const HELPLINE_HEIGHT: u16 = 1;
pub const GAP_BEFORE_HELPLINE: u16 = 1;
pub const DIALOG_BORDER: u16 = 2;
pub const DIALOG_PADDING: u16 = 0;
pub const BUTTON_HEIGHT: u16 = 3;
pub const SHADOW_WIDTH: u16 = 2;
pub const SHADOW_HEIGHT: u16 = 1;
pub const EDGE_INDENT: u16 = 2;
pub const GUTTER_WIDTH: u16 = 1;

pub const MIN_CONTENT_WIDTH: u16 = 10;
pub const MIN_CONTENT_HEIGHT: u16 = 3;
pub const MAX_HEADER_HEIGHT: u16 = 4;

/// Smallest terminal the floors are documented against
pub const MIN_TERMINAL: (u16, u16) = (20, 5);

/// How a dialog is placed inside the content area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Centered,
    /// Pinned to the content origin, filling the whole area
    Maximized,
    /// Full height, centered horizontally
    VerticalMaximized,
}

impl Placement {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Centered => "centered",
            Self::Maximized => "maximized",
            Self::VerticalMaximized => "vertical",
        }
    }
}

/// Content-area dimensions plus the chrome that surrounds them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentArea {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Header lines plus separator
    pub top_chrome: u16,
    /// Gap plus helpline
    pub bottom_chrome: u16,
    pub shadow_width: u16,
    pub shadow_height: u16,
}

impl ContentArea {
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Chrome flags that drive the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutBudget {
    pub shadow: bool,
    pub header_height: u16,
}

impl Default for LayoutBudget {
    fn default() -> Self {
        Self {
            shadow: false,
            header_height: 1,
        }
    }
}

impl LayoutBudget {
    pub fn new(shadow: bool, header_height: u16) -> Self {
        Self {
            shadow,
            header_height: header_height.clamp(1, MAX_HEADER_HEIGHT),
        }
    }

    /// Header lines plus separator; also the y where content starts
    pub fn top_chrome(&self) -> u16 {
        self.header_height + SEPARATOR_HEIGHT
    }

    pub fn bottom_chrome(&self) -> u16 {
        GAP_BEFORE_HELPLINE + HELPLINE_HEIGHT
    }

    pub fn shadow_size(&self) -> (u16, u16) {
        if self.shadow {
            (SHADOW_WIDTH, SHADOW_HEIGHT)
        } else {
            (0, 0)
        }
    }

    /// Space available for a screen or dialog on a `width` x `height` backdrop
    pub fn content_area(&self, width: u16, height: u16) -> ContentArea {
        let (shadow_w, shadow_h) = self.shadow_size();
        let w = i32::from(width) - 2 * i32::from(EDGE_INDENT) - i32::from(shadow_w);
        let h = i32::from(height)
            - i32::from(self.top_chrome())
            - i32::from(self.bottom_chrome())
            - i32::from(shadow_h);

        ContentArea {
            x: EDGE_INDENT,
            y: self.top_chrome(),
            width: clamp_floor(w, MIN_CONTENT_WIDTH),
            height: clamp_floor(h, MIN_CONTENT_HEIGHT),
            top_chrome: self.top_chrome(),
            bottom_chrome: self.bottom_chrome(),
            shadow_width: shadow_w,
            shadow_height: shadow_h,
        }
    }

    /// Top-left corner for a `dialog_w` x `dialog_h` dialog
    pub fn dialog_position(
        &self,
        placement: Placement,
        dialog_w: u16,
        dialog_h: u16,
        width: u16,
        height: u16,
    ) -> (u16, u16) {
        let start_y = self.top_chrome();
        let (shadow_w, _) = self.shadow_size();

        match placement {
            Placement::Maximized => (EDGE_INDENT, start_y),
            Placement::VerticalMaximized => {
                let x = (i32::from(width) - i32::from(dialog_w) - i32::from(shadow_w)) / 2;
                (clamp_floor(x, EDGE_INDENT), start_y)
            }
            Placement::Centered => {
                let area = self.content_area(width, height);
                let x = i32::from(EDGE_INDENT) + (i32::from(area.width) - i32::from(dialog_w)) / 2;
                // +1 biases odd remainders downward
                let y = i32::from(start_y)
                    + (i32::from(area.height) - i32::from(dialog_h) + 1) / 2;
                (clamp_floor(x, EDGE_INDENT), clamp_floor(y, start_y))
            }
        }
    }

    /// Size a dialog wants once clamped to the content area
    pub fn dialog_size(
        &self,
        placement: Placement,
        desired_w: u16,
        desired_h: u16,
        width: u16,
        height: u16,
    ) -> (u16, u16) {
        let area = self.content_area(width, height);
        match placement {
            Placement::Maximized => (area.width, area.height),
            Placement::VerticalMaximized => (desired_w.min(area.width), area.height),
            Placement::Centered => (desired_w.min(area.width), desired_h.min(area.height)),
        }
    }

    /// Full rectangle for a dialog: size clamp plus position
    pub fn place(
        &self,
        placement: Placement,
        desired_w: u16,
        desired_h: u16,
        width: u16,
        height: u16,
    ) -> Rect {
        let (w, h) = self.dialog_size(placement, desired_w, desired_h, width, height);
        let (x, y) = self.dialog_position(placement, w, h, width, height);
        Rect::new(x, y, w, h)
    }

    /// Rows left for a dialog body after border, header lines and buttons
    pub fn dialog_content_height(&self, dialog_h: u16, header_lines: u16, has_buttons: bool) -> u16 {
        let mut overhead = DIALOG_BORDER + DIALOG_PADDING + header_lines;
        if has_buttons {
            overhead += BUTTON_HEIGHT;
        }
        clamp_floor(i32::from(dialog_h) - i32::from(overhead), 1)
    }

    /// Two panes side by side: `(left_w, right_w, left_x, right_x)`
    pub fn side_by_side(&self, width: u16) -> (u16, u16, u16, u16) {
        let (shadow_w, _) = self.shadow_size();
        let available = clamp_floor(
            i32::from(width) - 2 * i32::from(EDGE_INDENT) - i32::from(GUTTER_WIDTH) - i32::from(shadow_w),
            2,
        );
        let left = available / 2;
        let right = available - left;
        (left, right, EDGE_INDENT, EDGE_INDENT + left + GUTTER_WIDTH)
    }
}

/// Content size inside a bordered box of `total` size
pub fn inner_size(total_w: u16, total_h: u16) -> (u16, u16) {
    (total_w.saturating_sub(2), total_h.saturating_sub(2))
}

/// Bordered box size around `content`
pub fn outer_size(content_w: u16, content_h: u16) -> (u16, u16) {
    (content_w.saturating_add(2), content_h.saturating_add(2))
}

/// Desired width clamped to what the content area allows
pub fn constrain_width(desired: u16, max_width: u16) -> u16 {
    if max_width == 0 {
        desired
    } else {
        desired.min(max_width)
    }
}

fn clamp_floor(value: i32, floor: u16) -> u16 {
    u16::try_from(value.max(i32::from(floor))).unwrap_or(u16::MAX)
}
