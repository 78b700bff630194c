//! Lifecycle of measurement drawings.

use geo_types::{Geometry, LineString, Point, Polygon};

use super::tooltip::{TooltipId, TooltipStore};
use super::{measurement_text, representative_point, MeasureKind};

/// One in-progress measurement drawing.
///
/// A session is created when the first vertex is placed and lives until the drawing is
/// finished or the tool changes. Its tooltip shows the measurement of the live geometry:
/// the placed vertices plus the current cursor position.
#[derive(Debug)]
pub struct DrawSession {
    kind: MeasureKind,
    vertices: Vec<Point<f64>>,
    cursor: Option<Point<f64>>,
    tooltip: TooltipId,
}

impl DrawSession {
    /// Kind of measurement the session produces.
    pub fn kind(&self) -> MeasureKind {
        self.kind
    }

    /// Vertices placed so far.
    pub fn vertices(&self) -> &[Point<f64>] {
        &self.vertices
    }

    /// Id of the tooltip following the drawing.
    pub fn tooltip(&self) -> TooltipId {
        self.tooltip
    }

    fn live_vertices(&self) -> Vec<Point<f64>> {
        let mut vertices = self.vertices.clone();
        vertices.extend(self.cursor);
        vertices
    }
}

/// A finished measurement kept until measurements are cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// What was measured.
    pub kind: MeasureKind,
    /// The drawn geometry.
    pub geometry: Geometry<f64>,
    /// Id of the tooltip showing the frozen result.
    pub tooltip: TooltipId,
}

/// Controller of the draw-and-measure lifecycle.
///
/// The controller is armed with a [`MeasureKind`] when a measuring tool is selected.
/// The first placed vertex starts a [`DrawSession`]; every further vertex or cursor
/// movement recomputes the measurement and repositions the live tooltip. Finishing a
/// drawing freezes its tooltip, stores the geometry and prepares a fresh tooltip for the
/// next drawing. Disarming (tool change) discards an unfinished drawing together with
/// its tooltip.
#[derive(Debug, Default)]
pub struct MeasureController {
    tooltips: TooltipStore,
    armed: Option<MeasureKind>,
    pending_tooltip: Option<TooltipId>,
    active: Option<DrawSession>,
    finished: Vec<Measurement>,
}

impl MeasureController {
    /// Creates a disarmed controller with no measurements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the controller for a new kind of measurement.
    ///
    /// Any unfinished drawing is discarded first. A fresh tooltip is prepared so the
    /// first drawing has a label from its very first vertex.
    pub fn arm(&mut self, kind: MeasureKind) {
        self.disarm();
        self.armed = Some(kind);
        self.pending_tooltip = Some(self.tooltips.create());
    }

    /// Disarms the controller.
    ///
    /// An unfinished drawing is discarded together with its tooltip, not finalized.
    /// Finished measurements stay until [`MeasureController::clear`].
    pub fn disarm(&mut self) {
        if let Some(session) = self.active.take() {
            self.tooltips.remove(session.tooltip);
        }
        if let Some(pending) = self.pending_tooltip.take() {
            self.tooltips.remove(pending);
        }
        self.armed = None;
    }

    /// The kind of measurement the controller is armed for, if any.
    pub fn armed(&self) -> Option<MeasureKind> {
        self.armed
    }

    /// Whether a drawing is currently in progress.
    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// The in-progress drawing, if any.
    pub fn active_session(&self) -> Option<&DrawSession> {
        self.active.as_ref()
    }

    /// Places the next vertex of the drawing. The first vertex starts a new session.
    ///
    /// Does nothing while the controller is disarmed.
    pub fn add_vertex(&mut self, point: Point<f64>) {
        let Some(kind) = self.armed else {
            return;
        };

        match &mut self.active {
            Some(session) => session.vertices.push(point),
            None => {
                let tooltip = self
                    .pending_tooltip
                    .take()
                    .unwrap_or_else(|| self.tooltips.create());
                self.active = Some(DrawSession {
                    kind,
                    vertices: vec![point],
                    cursor: None,
                    tooltip,
                });
            }
        }

        self.refresh_tooltip();
    }

    /// Moves the live cursor vertex of the in-progress drawing.
    pub fn update_cursor(&mut self, point: Point<f64>) {
        let Some(session) = &mut self.active else {
            return;
        };
        session.cursor = Some(point);
        self.refresh_tooltip();
    }

    /// Finishes the in-progress drawing.
    ///
    /// The tooltip is frozen at the final geometry and the geometry is stored. A line
    /// needs at least two vertices and a polygon at least three; a drawing that is too
    /// short is discarded like a cancelled one. Either way a fresh tooltip is prepared
    /// for the next drawing.
    pub fn finish(&mut self) {
        let Some(session) = self.active.take() else {
            return;
        };

        let min_vertices = match session.kind {
            MeasureKind::Distance => 2,
            MeasureKind::Area => 3,
        };

        if session.vertices.len() < min_vertices {
            self.tooltips.remove(session.tooltip);
        } else {
            let text = measurement_text(session.kind, &session.vertices);
            let anchor = representative_point(session.kind, &session.vertices);
            if let Some(tooltip) = self.tooltips.get_mut(session.tooltip) {
                tooltip.set_text(text);
                tooltip.set_anchor(anchor);
                tooltip.freeze();
            }

            let geometry = match session.kind {
                MeasureKind::Distance => {
                    Geometry::LineString(LineString::from(session.vertices.clone()))
                }
                MeasureKind::Area => Geometry::Polygon(Polygon::new(
                    LineString::from(session.vertices.clone()),
                    Vec::new(),
                )),
            };
            self.finished.push(Measurement {
                kind: session.kind,
                geometry,
                tooltip: session.tooltip,
            });
        }

        self.pending_tooltip = Some(self.tooltips.create());
    }

    /// Removes all measurements and every tooltip overlay in one step.
    ///
    /// The controller stays armed; the next drawing starts from scratch with its own
    /// fresh tooltip.
    pub fn clear(&mut self) {
        self.active = None;
        self.finished.clear();
        self.tooltips.clear();
        self.pending_tooltip = self.armed.map(|_| self.tooltips.create());
    }

    /// Finished measurements in completion order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.finished
    }

    /// All tooltip overlays of the panel.
    pub fn tooltips(&self) -> &TooltipStore {
        &self.tooltips
    }

    fn refresh_tooltip(&mut self) {
        let Some(session) = &self.active else {
            return;
        };

        let vertices = session.live_vertices();
        let text = measurement_text(session.kind, &vertices);
        let anchor = representative_point(session.kind, &vertices);
        let id = session.tooltip;

        if let Some(tooltip) = self.tooltips.get_mut(id) {
            tooltip.set_text(text);
            tooltip.set_anchor(anchor);
        }
    }
}
