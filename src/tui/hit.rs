//! Hit regions - mouse coordinates back to widget identities
//!
//! The registry is rebuilt from the layer tree on every frame, so regions
//! always describe what is currently on screen.

use ratatui::layout::{Position, Rect};

/// One clickable rectangle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRegion {
    pub id: String,
    pub rect: Rect,
    pub z: i32,
}

impl HitRegion {
    pub fn new(id: impl Into<String>, rect: Rect, z: i32) -> Self {
        Self {
            id: id.into(),
            rect,
            z,
        }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.rect.contains(Position::new(x, y))
    }
}

/// Per-frame region list, sorted ascending by Z
#[derive(Debug, Clone, Default)]
pub struct HitRegistry {
    regions: Vec<HitRegion>,
}

impl HitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every region
    ///
    /// The sort is stable, so among equal Z the region recorded last (drawn
    /// last) stays on top, matching the compositor.
    pub fn record(&mut self, mut regions: Vec<HitRegion>) {
        regions.sort_by_key(|r| r.z);
        self.regions = regions;
    }

    /// Highest-Z region containing the point
    pub fn find(&self, x: u16, y: u16) -> Option<&HitRegion> {
        self.regions.iter().rev().find(|r| r.contains(x, y))
    }

    pub fn find_id(&self, x: u16, y: u16) -> Option<&str> {
        self.find(x, y).map(|r| r.id.as_str())
    }

    /// Region by identity (topmost if duplicated)
    pub fn get(&self, id: &str) -> Option<&HitRegion> {
        self.regions.iter().rev().find(|r| r.id == id)
    }

    pub fn regions(&self) -> &[HitRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_find_returns_highest_z() {
        let mut hits = HitRegistry::new();
        hits.record(vec![
            HitRegion::new("dialog", Rect::new(0, 0, 10, 10), 30),
            HitRegion::new("backdrop", Rect::new(0, 0, 80, 24), 0),
            HitRegion::new("log_panel", Rect::new(0, 0, 80, 3), 20),
        ]);
        assert_eq!(hits.find_id(1, 1), Some("dialog"));
        assert_eq!(hits.find_id(20, 1), Some("log_panel"));
        assert_eq!(hits.find_id(20, 20), Some("backdrop"));
    }

    #[test]
    fn test_find_none_outside_all_regions() {
        let mut hits = HitRegistry::new();
        hits.record(vec![HitRegion::new("a", Rect::new(5, 5, 2, 2), 1)]);
        assert_eq!(hits.find_id(4, 5), None);
        assert_eq!(hits.find_id(7, 5), None);
        assert_eq!(hits.find_id(6, 6), Some("a"));
    }

    #[test]
    fn test_equal_z_later_wins() {
        let mut hits = HitRegistry::new();
        hits.record(vec![
            HitRegion::new("first", Rect::new(0, 0, 4, 4), 5),
            HitRegion::new("second", Rect::new(0, 0, 4, 4), 5),
        ]);
        assert_eq!(hits.find_id(0, 0), Some("second"));
    }

    #[test]
    fn test_record_replaces_previous_frame() {
        let mut hits = HitRegistry::new();
        hits.record(vec![HitRegion::new("old", Rect::new(0, 0, 4, 4), 0)]);
        hits.record(vec![HitRegion::new("new", Rect::new(10, 0, 4, 4), 0)]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.find_id(0, 0), None);
        assert!(hits.get("new").is_some());
    }

    fn region_strategy() -> impl Strategy<Value = HitRegion> {
        (0u16..40, 0u16..20, 1u16..20, 1u16..10, -5i32..50, 0u32..1000).prop_map(
            |(x, y, w, h, z, n)| HitRegion::new(format!("r{n}"), Rect::new(x, y, w, h), z),
        )
    }

    proptest! {
        #[test]
        fn prop_find_is_max_z_of_containing(
            regions in prop::collection::vec(region_strategy(), 0..12),
            px in 0u16..60,
            py in 0u16..30,
        ) {
            let mut hits = HitRegistry::new();
            hits.record(regions.clone());

            let best = regions.iter().filter(|r| r.contains(px, py)).map(|r| r.z).max();
            match hits.find(px, py) {
                Some(found) => {
                    prop_assert!(found.contains(px, py));
                    prop_assert_eq!(Some(found.z), best);
                }
                None => prop_assert!(best.is_none()),
            }
        }
    }
}
