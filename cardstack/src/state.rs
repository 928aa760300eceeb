use kurbo::Size;

/// A lightweight, serializable snapshot of the geometry model after a layout pass.
///
/// Useful for debugging overlays and for asserting layout state in tests without reaching into
/// the layout itself.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutSnapshot {
    pub item_count: usize,
    pub cell_size: Size,
    pub revealed_index: Option<usize>,
    pub collapse_all: bool,
    /// Ascending indices of the fanned bottom stack.
    pub bottom_stack: Vec<usize>,
    /// How many entries of `bottom_stack` lie below the revealed index.
    pub bottom_below_revealed: usize,
    pub temporary_top: f64,
    pub moving_index: Option<usize>,
}
