use serde::Serialize;

use crate::config::TooltipConfig;
use crate::error::{Error, Result};
use crate::human::group_thousands;
use crate::model::LeafId;
use crate::view::LeafTile;

/// Opacity of a tile nobody hovers.
pub const REST_OPACITY: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering(LeafId),
}

/// What the renderer shows as tooltip.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TooltipState {
    pub visible: bool,
    pub leaf_id: Option<LeafId>,
    pub name: String,
    pub category: String,
    /// Value with `.` thousands grouping.
    pub value: String,
    pub screen_x: f64,
    pub screen_y: f64,
}

impl TooltipState {
    pub fn hidden() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpacityChange {
    pub leaf_id: LeafId,
    pub opacity: f32,
}

/// Result of one pointer event: the tooltip to show and the tiles whose
/// opacity changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverUpdate {
    pub tooltip: TooltipState,
    pub opacity: Vec<OpacityChange>,
}

/// Hover state machine over the tiles of one view.
///
/// The controller never holds the tiles; callers pass the current slice with
/// each pointer event so a dataset swap cannot leave it pointing at stale data.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: HoverState,
    tooltip: TooltipState,
    config: TooltipConfig,
}

impl InteractionController {
    pub fn new(config: TooltipConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    /// The last emitted tooltip.
    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    pub fn opacity(&self, leaf_id: LeafId) -> f32 {
        match self.state {
            HoverState::Hovering(id) if id == leaf_id => self.config.hover_opacity,
            _ => REST_OPACITY,
        }
    }

    /// Pointer over `leaf_id` at (`x`, `y`).
    ///
    /// Fails with [`Error::UnknownLeafId`] and leaves the state untouched when
    /// the id is not in `tiles`.
    pub fn try_pointer_move(
        &mut self,
        tiles: &[LeafTile],
        leaf_id: LeafId,
        x: f64,
        y: f64,
    ) -> Result<HoverUpdate> {
        let tile = tiles
            .get(leaf_id.0)
            .filter(|t| t.id == leaf_id)
            .ok_or(Error::UnknownLeafId(leaf_id))?;

        let mut opacity = Vec::new();
        if self.state != HoverState::Hovering(leaf_id) {
            if let HoverState::Hovering(previous) = self.state {
                opacity.push(OpacityChange {
                    leaf_id: previous,
                    opacity: REST_OPACITY,
                });
            }
            opacity.push(OpacityChange {
                leaf_id,
                opacity: self.config.hover_opacity,
            });
            tracing::trace!("Hover {:?} -> {}", self.state, leaf_id);
            self.state = HoverState::Hovering(leaf_id);
        }

        self.tooltip = TooltipState {
            visible: true,
            leaf_id: Some(leaf_id),
            name: tile.name.clone(),
            category: tile.category.clone(),
            value: group_thousands(tile.value),
            screen_x: x - self.config.offset_x,
            screen_y: y - self.config.offset_y,
        };
        Ok(HoverUpdate {
            tooltip: self.tooltip.clone(),
            opacity,
        })
    }

    /// Like [`Self::try_pointer_move`], but a stale id (an event that raced
    /// a dataset swap) is treated as the pointer leaving.
    pub fn on_pointer_move(&mut self, tiles: &[LeafTile], leaf_id: LeafId, x: f64, y: f64) -> HoverUpdate {
        match self.try_pointer_move(tiles, leaf_id, x, y) {
            Ok(update) => update,
            Err(err) => {
                tracing::warn!("Ignoring pointer event: {}", err);
                self.on_pointer_leave()
            }
        }
    }

    pub fn on_pointer_leave(&mut self) -> HoverUpdate {
        let mut opacity = Vec::new();
        if let HoverState::Hovering(previous) = self.state {
            tracing::trace!("Hover {} -> idle", previous);
            opacity.push(OpacityChange {
                leaf_id: previous,
                opacity: REST_OPACITY,
            });
        }
        self.state = HoverState::Idle;
        self.tooltip = TooltipState::hidden();
        HoverUpdate {
            tooltip: TooltipState::hidden(),
            opacity,
        }
    }

    /// Forget the hovered tile without emitting anything, for a new view.
    pub fn reset(&mut self) {
        self.state = HoverState::Idle;
        self.tooltip = TooltipState::hidden();
    }
}
