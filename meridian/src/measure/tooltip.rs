//! Floating measurement labels anchored to map coordinates.

use geo_types::Point;

/// Identifier of a tooltip within its [`TooltipStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TooltipId(u64);

/// Visual style of a measurement tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TooltipStyle {
    /// The tooltip follows an in-progress drawing.
    #[default]
    Live,
    /// The tooltip shows the frozen result of a finished drawing.
    Static,
}

/// A floating label anchored to a map coordinate.
///
/// A tooltip starts empty and unanchored, follows the drawing while it is live, and is
/// frozen in place once the drawing is finished.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureTooltip {
    id: TooltipId,
    anchor: Option<Point<f64>>,
    text: String,
    style: TooltipStyle,
}

impl MeasureTooltip {
    /// Identifier of the tooltip.
    pub fn id(&self) -> TooltipId {
        self.id
    }

    /// The lon/lat point the tooltip is anchored to. `None` until the drawing it belongs
    /// to gets its first vertex.
    pub fn anchor(&self) -> Option<Point<f64>> {
        self.anchor
    }

    /// The displayed measurement string.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current style of the tooltip.
    pub fn style(&self) -> TooltipStyle {
        self.style
    }

    pub(crate) fn set_anchor(&mut self, anchor: Option<Point<f64>>) {
        self.anchor = anchor;
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub(crate) fn freeze(&mut self) {
        self.style = TooltipStyle::Static;
    }
}

/// Owner of all tooltip overlays of the map panel.
#[derive(Debug, Default)]
pub struct TooltipStore {
    items: Vec<MeasureTooltip>,
    next_id: u64,
}

impl TooltipStore {
    /// Creates a new empty live tooltip and returns its id.
    pub fn create(&mut self) -> TooltipId {
        let id = TooltipId(self.next_id);
        self.next_id += 1;
        self.items.push(MeasureTooltip {
            id,
            anchor: None,
            text: String::new(),
            style: TooltipStyle::Live,
        });
        id
    }

    /// Removes the tooltip with the given id and returns it.
    pub fn remove(&mut self, id: TooltipId) -> Option<MeasureTooltip> {
        let index = self.items.iter().position(|tooltip| tooltip.id == id)?;
        Some(self.items.remove(index))
    }

    /// Removes all tooltips.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the tooltip with the given id.
    pub fn get(&self, id: TooltipId) -> Option<&MeasureTooltip> {
        self.items.iter().find(|tooltip| tooltip.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: TooltipId) -> Option<&mut MeasureTooltip> {
        self.items.iter_mut().find(|tooltip| tooltip.id == id)
    }

    /// Iterates over all tooltips in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &MeasureTooltip> {
        self.items.iter()
    }

    /// Returns the count of tooltips in the store.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the store contains zero tooltips.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
