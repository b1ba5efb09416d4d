use serde::Serialize;

use crate::color::{Color, ColorEncoder, CATEGORY20};
use crate::config::ViewConfig;
use crate::error::{Error, Result};
use crate::hierarchy;
use crate::human::initials;
use crate::legend::{LegendEntry, LegendLayout};
use crate::model::{Dataset, LeafId, Node, RawRecord};
use crate::treemap::{self, Rect};

/// The unit a renderer draws and pointer events refer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafTile {
    pub id: LeafId,
    pub name: String,
    pub category: String,
    pub value: f64,
    /// Proportional cell from the layout.
    pub cell: Rect,
    /// Cell minus the gutter, what gets filled.
    pub rect: Rect,
    pub color: Color,
    pub label: String,
}

/// Everything needed to draw one dataset: a complete, consistent snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub title: String,
    pub description: String,
    pub width: f64,
    pub height: f64,
    /// Where the treemap sits inside the viewport.
    pub bounds: Rect,
    pub tiles: Vec<LeafTile>,
    /// Top-left corner of the legend block; entries are relative to it.
    pub legend_origin: (f64, f64),
    pub legend: Vec<LegendEntry>,
    pub colors: ColorEncoder,
}

impl View {
    /// Color bound to `category` while building this view.
    pub fn color_for(&self, category: &str) -> Option<Color> {
        self.colors.get(category)
    }

    pub fn tile(&self, id: LeafId) -> Option<&LeafTile> {
        self.tiles.get(id.0)
    }

    /// The tile whose cell contains the viewport point (`x`, `y`).
    pub fn hit_test(&self, x: f64, y: f64) -> Option<LeafId> {
        self.tiles
            .iter()
            .find(|t| t.cell.contains(x, y))
            .map(|t| t.id)
    }
}

/// Build, lay out and color `dataset` for a `width` x `height` viewport.
///
/// The treemap takes the top `treemap_share` of the height, shrunk when the
/// legend below it would not otherwise fit. Tile colors are bound first, in
/// leaf order, then legend colors, all on one fresh encoder.
pub fn compute_view(dataset: &Dataset, width: f64, height: f64, config: &ViewConfig) -> Result<View> {
    if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
        return Err(Error::InvalidViewport { width, height });
    }
    config.validate()?;
    let root = hierarchy::build(&dataset.data)?;

    let legend_layout = LegendLayout::new(config.legend.clone());
    let legend_space = (height * (1.0 - config.treemap_share)).max(legend_layout.height() + config.legend_gap);
    let treemap_height = height - legend_space;
    if treemap_height <= 0.0 {
        return Err(Error::InvalidViewport { width, height });
    }
    let bounds = Rect::from_size(width, treemap_height);
    let cells = treemap::layout(&root, bounds.width(), bounds.height())?;

    let mut colors = ColorEncoder::new(&CATEGORY20, config.fade)?;
    let tiles: Vec<LeafTile> = cells
        .iter()
        .enumerate()
        .map(|(i, leaf)| LeafTile {
            id: LeafId(i),
            name: leaf.node.name.clone(),
            category: leaf.node.category.clone(),
            value: leaf.node.weight,
            cell: leaf.cell,
            rect: leaf.tile_rect(config.inset),
            color: colors.color_for(&leaf.node.category),
            label: initials(&leaf.node.name),
        })
        .collect();

    let categories = legend_categories(&dataset.data, &root);
    let legend = legend_layout.layout(&categories, width, &mut colors);

    tracing::debug!(
        "View '{}': {} tiles, {} legend entries, {} colors bound",
        dataset.title,
        tiles.len(),
        legend.len(),
        colors.len()
    );
    Ok(View {
        title: dataset.title.clone(),
        description: dataset.description.clone(),
        width,
        height,
        bounds,
        tiles,
        legend_origin: (0.0, bounds.y1 + config.legend_gap),
        legend,
        colors,
    })
}

/// Top-level group names in input order, without repeats.
fn legend_categories<'a>(raw: &'a RawRecord, root: &'a Node) -> Vec<&'a str> {
    let Some(children) = raw.children.as_deref().filter(|c| !c.is_empty()) else {
        return vec![root.category.as_str()];
    };
    let mut seen = Vec::with_capacity(children.len());
    for child in children {
        if !seen.contains(&child.name.as_str()) {
            seen.push(child.name.as_str());
        }
    }
    seen
}
