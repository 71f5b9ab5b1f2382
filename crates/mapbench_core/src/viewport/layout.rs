//! Panel measurement collaborator.

use crate::model::viewport::PixelSize;

/// Map panels hosted by the workbench layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapPanel {
    Primary,
    Overview,
}

impl MapPanel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Overview => "overview",
        }
    }
}

/// Measures the current pixel size of a map panel.
///
/// Implemented by the UI shell; only queried after a split-pane drag
/// finishes.
pub trait PanelLayout {
    fn measure(&self, panel: MapPanel) -> PixelSize;
}

/// Layout reporting sizes that were measured elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeasuredPanels {
    pub primary: PixelSize,
    pub overview: PixelSize,
}

impl MeasuredPanels {
    pub const fn new(primary: PixelSize, overview: PixelSize) -> Self {
        Self { primary, overview }
    }
}

impl PanelLayout for MeasuredPanels {
    fn measure(&self, panel: MapPanel) -> PixelSize {
        match panel {
            MapPanel::Primary => self.primary,
            MapPanel::Overview => self.overview,
        }
    }
}
