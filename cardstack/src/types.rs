use kurbo::{Affine, Insets, Point, Rect, Size};

/// Placement of a single card for one layout pass.
///
/// Attributes are recreated by every [`crate::CardStackLayout::prepare`] call and are never
/// patched afterwards; a renderer applies them as-is.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutAttribute {
    pub index: usize,
    /// Untransformed frame in content coordinates.
    pub frame: Rect,
    /// Uniform scale applied about the frame center.
    pub scale: f64,
    pub alpha: f64,
    pub hidden: bool,
    /// Stacking order; higher values are drawn above lower ones.
    pub z_index: usize,
    pub is_revealed: bool,
}

impl LayoutAttribute {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            frame: Rect::ZERO,
            scale: 1.0,
            alpha: 1.0,
            hidden: false,
            z_index: index,
            is_revealed: false,
        }
    }

    /// The scale transform about the frame center, in content coordinates.
    pub fn transform(&self) -> Affine {
        if self.scale == 1.0 {
            return Affine::IDENTITY;
        }
        let center = self.frame.center().to_vec2();
        Affine::translate(center) * Affine::scale(self.scale) * Affine::translate(-center)
    }

    /// The frame after applying [`Self::transform`].
    pub fn visual_frame(&self) -> Rect {
        self.transform().transform_rect_bbox(self.frame)
    }
}

/// Geometry reported by the hosting scroll view for a layout pass.
///
/// `content_inset` follows `kurbo::Insets`: `x0` left, `y0` top, `x1` right, `y1` bottom.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostGeometry {
    /// Size of the scroll view's frame.
    pub viewport: Size,
    pub content_offset: Point,
    pub content_inset: Insets,
}

impl HostGeometry {
    pub fn new(viewport: Size, content_offset: Point, content_inset: Insets) -> Self {
        Self {
            viewport,
            content_offset,
            content_inset,
        }
    }

    /// Scroll offset measured from the top content inset.
    pub fn offset_top(&self) -> f64 {
        self.content_offset.y + self.content_inset.y0
    }
}

/// Result of [`crate::CardStackLayout::will_delete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeleteOutcome {
    /// The revealed card (if any) survived the delete.
    Kept,
    /// The revealed card itself was deleted; carries its index before the delete.
    Unrevealed(usize),
}
