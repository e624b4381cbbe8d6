// Author: Dustin Pilgrim
// License: MIT
//
// Darken/blur region from anchor relations.
//
// Naming follows the anchors, not screen directions: the box is "right of"
// one anchor (its left edge), "left of" another (its right edge), "below" one
// (its top edge) and "above" one (its bottom edge).

use serde::{Deserialize, Serialize};

use scrim_core::{AnchorHandle, Rect, ScreenExtent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    RightOf,
    LeftOf,
    Above,
    Below,
    Fill,
}

/// One anchor slot per role. Setting a role replaces its previous anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSpec {
    right_of: Option<AnchorHandle>,
    left_of: Option<AnchorHandle>,
    above: Option<AnchorHandle>,
    below: Option<AnchorHandle>,
    fill: Option<AnchorHandle>,
}

/// The four edges of the darken box, fresh from one resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRegion {
    pub right_of: i32,
    pub left_of: i32,
    pub below: i32,
    pub above: i32,
}

/// Rectangle to capture for the blur plus the padding that keeps the blurred
/// image off the top inset (status bar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlurViewport {
    pub rect: Rect,
    pub top_padding: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Unset,
    Anchored(i32),
}

impl Edge {
    fn is_unset(self) -> bool {
        self == Edge::Unset
    }

    fn or(self, default: i32) -> i32 {
        match self {
            Edge::Unset => default,
            Edge::Anchored(v) => v,
        }
    }
}

impl PlacementSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, role: Role, anchor: AnchorHandle) {
        *self.slot_mut(role) = Some(anchor);
    }

    pub fn anchor(&self, role: Role) -> Option<AnchorHandle> {
        match role {
            Role::RightOf => self.right_of,
            Role::LeftOf => self.left_of,
            Role::Above => self.above,
            Role::Below => self.below,
            Role::Fill => self.fill,
        }
    }

    /// Drop every anchor: the region goes back to the whole screen.
    pub fn fill_screen(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Evaluate every anchor against current geometry.
    ///
    /// `lookup` answers the anchor's on-screen box, or `None` when it is gone;
    /// gone anchors count as unset. Nothing is cached between calls.
    pub fn resolve<F>(&self, screen: ScreenExtent, lookup: F) -> ResolvedRegion
    where
        F: Fn(AnchorHandle) -> Option<Rect>,
    {
        let live = |slot: Option<AnchorHandle>| slot.and_then(&lookup);

        let mut right_of = Edge::Unset;
        let mut left_of = Edge::Unset;
        let mut below = Edge::Unset;
        let mut above = Edge::Unset;

        if let Some(b) = live(self.left_of) {
            left_of = Edge::Anchored(b.left);
        }
        if let Some(b) = live(self.right_of) {
            right_of = Edge::Anchored(b.right);
        }
        if let Some(b) = live(self.below) {
            below = Edge::Anchored(b.bottom);
        }
        if let Some(b) = live(self.above) {
            above = Edge::Anchored(b.top);
        }

        // Fill only steps in while the left-of/above roles are free; then it
        // owns all four edges, directional anchors included.
        if left_of.is_unset() && above.is_unset() {
            if let Some(b) = live(self.fill) {
                right_of = Edge::Anchored(b.left);
                left_of = Edge::Anchored(b.right);
                above = Edge::Anchored(b.bottom);
                below = Edge::Anchored(b.top);
            }
        }

        ResolvedRegion {
            right_of: right_of.or(0),
            left_of: left_of.or(screen.width),
            below: below.or(0),
            above: above.or(screen.height),
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<AnchorHandle> {
        match role {
            Role::RightOf => &mut self.right_of,
            Role::LeftOf => &mut self.left_of,
            Role::Above => &mut self.above,
            Role::Below => &mut self.below,
            Role::Fill => &mut self.fill,
        }
    }
}

impl ResolvedRegion {
    pub fn full_screen(screen: ScreenExtent) -> Self {
        Self {
            right_of: 0,
            left_of: screen.width,
            below: 0,
            above: screen.height,
        }
    }

    /// Box for the darken surface. Crossed edges give an empty box.
    pub fn darken_rect(&self) -> Rect {
        Rect::from_xywh(
            self.right_of,
            self.below,
            self.left_of - self.right_of,
            self.above - self.below,
        )
    }

    /// Capture rectangle for the blur, in the coordinate space of the
    /// captured surface, which starts `top_inset` pixels down the screen.
    ///
    /// When the box reaches into the inset, capture starts at 0 and the
    /// blurred image is padded down by `top_inset` instead.
    pub fn blur_viewport(&self, top_inset: i32) -> BlurViewport {
        let mut top = self.below - top_inset;
        let bottom = (self.above - top_inset).max(0);

        let top_padding = if top <= 0 {
            top = 0;
            top_inset
        } else {
            0
        };

        BlurViewport {
            rect: Rect {
                left: self.right_of,
                top,
                right: self.left_of.max(self.right_of),
                bottom: bottom.max(top),
            },
            top_padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SCREEN: ScreenExtent = ScreenExtent { width: 1080, height: 1920 };

    fn boxes(list: &[(u64, Rect)]) -> impl Fn(AnchorHandle) -> Option<Rect> + use<> {
        let map: HashMap<u64, Rect> = list.iter().copied().collect();
        move |a| map.get(&a.0).copied()
    }

    #[test]
    fn empty_spec_is_full_screen() {
        let r = PlacementSpec::new().resolve(SCREEN, |_| None);
        assert_eq!(r, ResolvedRegion::full_screen(SCREEN));
        assert_eq!(r.darken_rect(), Rect::new(0, 0, 1080, 1920));
    }

    #[test]
    fn each_direction_takes_one_edge() {
        let a = Rect::from_xywh(100, 100, 200, 50);
        let lookup = boxes(&[(1, a)]);

        for (role, expect) in [
            (Role::RightOf, ResolvedRegion { right_of: 300, ..ResolvedRegion::full_screen(SCREEN) }),
            (Role::LeftOf, ResolvedRegion { left_of: 100, ..ResolvedRegion::full_screen(SCREEN) }),
            (Role::Below, ResolvedRegion { below: 150, ..ResolvedRegion::full_screen(SCREEN) }),
            (Role::Above, ResolvedRegion { above: 100, ..ResolvedRegion::full_screen(SCREEN) }),
        ] {
            let mut spec = PlacementSpec::new();
            spec.set(role, AnchorHandle(1));
            assert_eq!(spec.resolve(SCREEN, &lookup), expect, "{role:?}");
        }
    }

    #[test]
    fn fill_covers_the_anchor_box() {
        let lookup = boxes(&[(1, Rect::from_xywh(100, 100, 200, 50))]);
        let mut spec = PlacementSpec::new();
        spec.set(Role::Fill, AnchorHandle(1));

        let r = spec.resolve(SCREEN, &lookup);
        assert_eq!(
            r,
            ResolvedRegion { right_of: 100, left_of: 300, below: 100, above: 150 }
        );
        assert_eq!(r.darken_rect(), Rect::from_xywh(100, 100, 200, 50));
    }

    #[test]
    fn fill_yields_to_claimed_roles() {
        let lookup = boxes(&[
            (1, Rect::from_xywh(400, 0, 10, 10)),
            (2, Rect::from_xywh(0, 900, 10, 10)),
            (3, Rect::from_xywh(100, 100, 200, 50)),
        ]);
        let mut spec = PlacementSpec::new();
        spec.set(Role::LeftOf, AnchorHandle(1));
        spec.set(Role::Above, AnchorHandle(2));
        spec.set(Role::Fill, AnchorHandle(3));

        let r = spec.resolve(SCREEN, &lookup);
        assert_eq!(r.left_of, 400);
        assert_eq!(r.above, 900);
        // fill is skipped outright, the rest stay at their defaults
        assert_eq!((r.right_of, r.below), (0, 0));
    }

    #[test]
    fn fill_overrides_right_of_and_below() {
        let lookup = boxes(&[
            (1, Rect::from_xywh(0, 0, 50, 10)),
            (2, Rect::from_xywh(0, 0, 10, 700)),
            (3, Rect::from_xywh(100, 100, 200, 50)),
        ]);
        let mut spec = PlacementSpec::new();
        spec.set(Role::RightOf, AnchorHandle(1));
        spec.set(Role::Below, AnchorHandle(2));
        spec.set(Role::Fill, AnchorHandle(3));

        let r = spec.resolve(SCREEN, &lookup);
        assert_eq!(r, ResolvedRegion { right_of: 100, left_of: 300, below: 100, above: 150 });
    }

    #[test]
    fn fill_skipped_when_only_left_of_is_set() {
        let lookup = boxes(&[
            (1, Rect::from_xywh(800, 0, 10, 10)),
            (3, Rect::from_xywh(100, 100, 200, 50)),
        ]);
        let mut spec = PlacementSpec::new();
        spec.set(Role::LeftOf, AnchorHandle(1));
        spec.set(Role::Fill, AnchorHandle(3));

        let r = spec.resolve(SCREEN, &lookup);
        assert_eq!(r, ResolvedRegion { left_of: 800, ..ResolvedRegion::full_screen(SCREEN) });
    }

    #[test]
    fn edge_resolving_to_zero_still_counts_as_claimed() {
        // left-of an anchor sitting at x = 0 is a real edge, not "unset".
        let lookup = boxes(&[
            (1, Rect::from_xywh(0, 500, 40, 40)),
            (3, Rect::from_xywh(100, 100, 200, 50)),
        ]);
        let mut spec = PlacementSpec::new();
        spec.set(Role::LeftOf, AnchorHandle(1));
        spec.set(Role::Fill, AnchorHandle(3));

        let r = spec.resolve(SCREEN, &lookup);
        assert_eq!(r.left_of, 0);
        assert_eq!(r.above, 1920);
    }

    #[test]
    fn composition_is_order_independent() {
        let lookup = boxes(&[
            (1, Rect::from_xywh(10, 20, 30, 40)),
            (2, Rect::from_xywh(500, 700, 60, 80)),
        ]);

        let mut ab = PlacementSpec::new();
        ab.set(Role::RightOf, AnchorHandle(1));
        ab.set(Role::Above, AnchorHandle(2));

        let mut ba = PlacementSpec::new();
        ba.set(Role::Above, AnchorHandle(2));
        ba.set(Role::RightOf, AnchorHandle(1));

        let r = ab.resolve(SCREEN, &lookup);
        assert_eq!(r, ba.resolve(SCREEN, &lookup));
        assert_eq!((r.right_of, r.above), (40, 700));
    }

    #[test]
    fn gone_anchor_falls_back_to_default() {
        let mut spec = PlacementSpec::new();
        spec.set(Role::RightOf, AnchorHandle(9));
        spec.set(Role::Fill, AnchorHandle(8));
        assert_eq!(spec.resolve(SCREEN, |_| None), ResolvedRegion::full_screen(SCREEN));
    }

    #[test]
    fn setting_a_role_replaces_it() {
        let lookup = boxes(&[(1, Rect::from_xywh(0, 0, 10, 10)), (2, Rect::from_xywh(0, 0, 90, 10))]);
        let mut spec = PlacementSpec::new();
        spec.set(Role::RightOf, AnchorHandle(1));
        spec.set(Role::RightOf, AnchorHandle(2));
        assert_eq!(spec.anchor(Role::RightOf), Some(AnchorHandle(2)));
        assert_eq!(spec.resolve(SCREEN, &lookup).right_of, 90);

        spec.fill_screen();
        assert!(spec.is_empty());
    }

    #[test]
    fn viewport_pads_when_box_reaches_inset() {
        let r = ResolvedRegion::full_screen(SCREEN);
        let v = r.blur_viewport(60);
        assert_eq!(v.top_padding, 60);
        assert_eq!(v.rect, Rect::new(0, 0, 1080, 1860));

        let below = ResolvedRegion { below: 150, ..r };
        let v = below.blur_viewport(60);
        assert_eq!(v.top_padding, 0);
        assert_eq!(v.rect, Rect::new(0, 90, 1080, 1860));

        assert_eq!(below.blur_viewport(0).rect, Rect::new(0, 150, 1080, 1920));
    }

    #[test]
    fn viewport_bottom_never_negative() {
        let r = ResolvedRegion { right_of: 0, left_of: 100, below: 0, above: 20 };
        let v = r.blur_viewport(60);
        assert_eq!(v.rect, Rect::new(0, 0, 100, 0));
        assert!(v.rect.is_empty());
    }
}
