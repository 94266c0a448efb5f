//! Layer compositor
//!
//! Components describe each frame as a tree of [`Layer`]s. The compositor
//! flattens the tree depth-first, resolving absolute positions and Z tiers,
//! then paints in ascending Z into one `ratatui` buffer. The same flattening
//! pass yields the frame's hit regions.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use unicode_width::UnicodeWidthChar;

use super::hit::HitRegion;

/// Z tiers for the stacked surfaces
pub mod z {
    pub const BACKDROP: i32 = 0;
    pub const SCREEN: i32 = 10;
    pub const LOG_PANEL: i32 = 20;
    pub const DIALOG: i32 = 30;
    pub const HALO: i32 = 35;
    pub const OVERLAY: i32 = 40;
}

/// A rectangle of styled text placed relative to its parent
///
/// `z` is relative to the parent as well, so a child at `z = 1` sits just
/// above its parent wherever the parent lands in the stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub id: Option<String>,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub width: u16,
    pub height: u16,
    pub lines: Vec<Line<'static>>,
    /// Paint the whole rectangle with this style before drawing lines
    pub fill: Option<Style>,
    pub children: Vec<Layer>,
}

impl Layer {
    /// Layer sized to its content
    pub fn new(lines: Vec<Line<'static>>) -> Self {
        let width = lines.iter().map(Line::width).max().unwrap_or(0);
        let height = lines.len();
        Self {
            width: u16::try_from(width).unwrap_or(u16::MAX),
            height: u16::try_from(height).unwrap_or(u16::MAX),
            lines,
            ..Self::default()
        }
    }

    /// Empty layer of a fixed size
    pub fn blank(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Invisible layer that only contributes a hit region
    pub fn hotspot(id: impl Into<String>, x: i32, y: i32, width: u16, height: u16) -> Self {
        Self::blank(width, height).id(id).at(x, y)
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn fill(mut self, style: Style) -> Self {
        self.fill = Some(style);
        self
    }

    /// Force the rectangle size (content is neither padded nor clipped)
    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn child(mut self, child: Layer) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Layer>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push(&mut self, child: Layer) {
        self.children.push(child);
    }
}

/// A layer with its absolute placement resolved
#[derive(Debug, Clone, Copy)]
struct Placed<'a> {
    layer: &'a Layer,
    x: i32,
    y: i32,
    z: i32,
}

fn flatten<'a>(layer: &'a Layer, px: i32, py: i32, pz: i32, out: &mut Vec<Placed<'a>>) {
    let placed = Placed {
        layer,
        x: px + layer.x,
        y: py + layer.y,
        z: pz + layer.z,
    };
    out.push(placed);
    for child in &layer.children {
        flatten(child, placed.x, placed.y, placed.z, out);
    }
}

fn flatten_all(layers: &[Layer]) -> Vec<Placed<'_>> {
    let mut out = Vec::new();
    for layer in layers {
        flatten(layer, 0, 0, 0, &mut out);
    }
    // stable: depth-first order breaks ties
    out.sort_by_key(|p| p.z);
    out
}

/// Output of one compose pass
#[derive(Debug, Clone)]
pub struct Composition {
    pub grid: Buffer,
    pub regions: Vec<HitRegion>,
}

/// Flattens layer trees onto a fixed-size grid
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    area: Rect,
}

impl Compositor {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            area: Rect::new(0, 0, width, height),
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Render layers onto a blank grid
    pub fn render(&self, layers: &[Layer]) -> Buffer {
        let mut grid = Buffer::empty(self.area);
        self.render_into(layers, &mut grid);
        grid
    }

    /// Render layers onto an existing grid
    pub fn render_into(&self, layers: &[Layer], grid: &mut Buffer) {
        for placed in flatten_all(layers) {
            paint(grid, &placed);
        }
    }

    /// Render and collect hit regions in one pass
    pub fn compose(&self, layers: &[Layer]) -> Composition {
        let mut grid = Buffer::empty(self.area);
        let placed = flatten_all(layers);
        let mut regions = Vec::new();
        for p in &placed {
            paint(&mut grid, p);
            if let Some(region) = region_of(p, self.area) {
                regions.push(region);
            }
        }
        Composition { grid, regions }
    }

    /// Hit regions for `layers` without painting
    pub fn regions(&self, layers: &[Layer]) -> Vec<HitRegion> {
        flatten_all(layers)
            .iter()
            .filter_map(|p| region_of(p, self.area))
            .collect()
    }
}

fn region_of(p: &Placed<'_>, area: Rect) -> Option<HitRegion> {
    let id = p.layer.id.as_ref()?;
    let rect = clip(p.x, p.y, p.layer.width, p.layer.height, area)?;
    Some(HitRegion::new(id.clone(), rect, p.z))
}

/// Intersect a signed rectangle with the grid
fn clip(x: i32, y: i32, width: u16, height: u16, area: Rect) -> Option<Rect> {
    let left = x.max(i32::from(area.left()));
    let top = y.max(i32::from(area.top()));
    let right = (x + i32::from(width)).min(i32::from(area.right()));
    let bottom = (y + i32::from(height)).min(i32::from(area.bottom()));
    if right <= left || bottom <= top {
        return None;
    }
    let to_u16 = |v: i32| u16::try_from(v).unwrap_or(0);
    Some(Rect::new(
        to_u16(left),
        to_u16(top),
        to_u16(right - left),
        to_u16(bottom - top),
    ))
}

fn paint(grid: &mut Buffer, p: &Placed<'_>) {
    let area = grid.area;
    if let Some(style) = p.layer.fill {
        if let Some(rect) = clip(p.x, p.y, p.layer.width, p.layer.height, area) {
            for cy in rect.top()..rect.bottom() {
                for cx in rect.left()..rect.right() {
                    if let Some(cell) = grid.cell_mut((cx, cy)) {
                        cell.set_char(' ').set_style(style);
                    }
                }
            }
        }
    }

    for (row, line) in p.layer.lines.iter().enumerate() {
        let y = p.y + i32::try_from(row).unwrap_or(i32::MAX);
        draw_line(grid, p.x, y, line);
    }
}

/// Draw one line at a signed position, clipping each cell to the grid
fn draw_line(grid: &mut Buffer, x: i32, y: i32, line: &Line<'_>) {
    let area = grid.area;
    if y < i32::from(area.top()) || y >= i32::from(area.bottom()) {
        return;
    }
    let Ok(cy) = u16::try_from(y) else { return };
    let right = i32::from(area.right());

    let mut col = x;
    for span in &line.spans {
        let style = line.style.patch(span.style);
        for ch in span.content.chars() {
            let w = i32::try_from(ch.width().unwrap_or(0)).unwrap_or(0);
            if w == 0 {
                continue;
            }
            if col >= i32::from(area.left()) && col + w <= right {
                if let Ok(cx) = u16::try_from(col) {
                    if let Some(cell) = grid.cell_mut((cx, cy)) {
                        cell.set_char(ch).set_style(style);
                    }
                    // cells hidden under a wide character
                    for dx in 1..w {
                        let Ok(hx) = u16::try_from(col + dx) else { break };
                        if let Some(cell) = grid.cell_mut((hx, cy)) {
                            cell.set_symbol("").set_style(style);
                        }
                    }
                }
            }
            col += w;
            if col >= right {
                return;
            }
        }
    }
}

/// Rows of a grid as plain strings
pub fn grid_rows(grid: &Buffer) -> Vec<String> {
    let area = grid.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .filter_map(|x| grid.cell((x, y)).map(|c| c.symbol().to_string()))
                .collect()
        })
        .collect()
}
