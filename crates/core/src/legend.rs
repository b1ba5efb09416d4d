use serde::Serialize;

use crate::color::{Color, ColorEncoder};
use crate::config::LegendConfig;
use crate::treemap::Rect;

/// Evenly spaced bands over a continuous range, without padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    count: usize,
    start: f64,
    end: f64,
}

impl BandScale {
    pub fn new(count: usize, start: f64, end: f64) -> Self {
        Self { count, start, end }
    }

    pub fn step(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.end - self.start) / self.count as f64
        }
    }

    pub fn bandwidth(&self) -> f64 {
        self.step()
    }

    /// Start of band `index`, or `None` past the last band.
    pub fn position(&self, index: usize) -> Option<f64> {
        (index < self.count).then(|| self.start + self.step() * index as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub category: String,
    pub color: Color,
    pub row: usize,
    pub column: usize,
    pub swatch: Rect,
    pub label_x: f64,
    /// Baseline of the label text.
    pub label_y: f64,
}

/// Places one swatch per category into a fixed number of rows.
///
/// Categories fill rows in order, `ceil(n / rows)` per row, and every row
/// reuses the same horizontal bands: the entry at row-local index `i` sits
/// in band `i` whatever row it is in.
#[derive(Debug, Clone, Default)]
pub struct LegendLayout {
    config: LegendConfig,
}

impl LegendLayout {
    pub fn new(config: LegendConfig) -> Self {
        Self { config }
    }

    pub fn row_size(&self, count: usize) -> usize {
        count.div_ceil(self.config.rows.max(1))
    }

    /// Height of the full legend block.
    pub fn height(&self) -> f64 {
        self.config.rows as f64 * self.row_height()
    }

    fn row_height(&self) -> f64 {
        2.0 * self.config.swatch
    }

    pub fn layout<S: AsRef<str>>(
        &self,
        categories: &[S],
        width: f64,
        colors: &mut ColorEncoder,
    ) -> Vec<LegendEntry> {
        let row_size = self.row_size(categories.len());
        let bands = BandScale::new(row_size, 0.0, width);
        let swatch = self.config.swatch;

        categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let category = category.as_ref();
                let row = i / row_size;
                let column = i % row_size;
                let x = bands.position(column).unwrap_or_default();
                let y = row as f64 * self.row_height();
                LegendEntry {
                    category: category.to_string(),
                    color: colors.color_for(category),
                    row,
                    column,
                    swatch: Rect::new(x, y, x + swatch, y + swatch),
                    label_x: x + swatch + self.config.label_gap,
                    label_y: y + swatch * 0.8,
                }
            })
            .collect()
    }
}
