//! Sequential color scale for the choropleth.

use climate_map_boundaries_models::Fill;

/// ColorBrewer YlOrRd, six classes, lightest first.
pub const PALETTE: [&str; 6] = [
    "#ffffb2", "#fed976", "#feb24c", "#fd8d3c", "#f03b20", "#bd0026",
];

/// Fill for polygons without data.
pub const NO_DATA_COLOR: &str = "#808080";

/// Equal-interval bins over the range of the matched values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    /// Builds a scale spanning the finite values, or `None` when there are
    /// none.
    #[must_use]
    pub fn sequential(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Self>, v| {
                Some(acc.map_or(Self { min: v, max: v }, |s| Self {
                    min: s.min.min(v),
                    max: s.max.max(v),
                }))
            })
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Palette index for `value`. A degenerate range maps everything to
    /// the first bucket.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn bucket(&self, value: f64) -> usize {
        let span = self.max - self.min;
        if span <= 0.0 || !value.is_finite() {
            return 0;
        }
        let position = ((value - self.min) / span).clamp(0.0, 1.0);
        ((position * PALETTE.len() as f64).floor() as usize).min(PALETTE.len() - 1)
    }

    /// Fill for an optional joined value.
    #[must_use]
    pub fn fill(&self, value: Option<f64>) -> Fill {
        value.map_or(Fill::NoData, |v| Fill::Bucket(self.bucket(v)))
    }

    /// Lower edge of each bucket followed by the upper bound, for legends.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn breaks(&self) -> [f64; 7] {
        let step = (self.max - self.min) / PALETTE.len() as f64;
        std::array::from_fn(|i| self.min + step * i as f64)
    }
}

/// Hex color for a fill.
#[must_use]
pub fn color(fill: Fill) -> &'static str {
    match fill {
        Fill::Bucket(i) => PALETTE[i.min(PALETTE.len() - 1)],
        Fill::NoData => NO_DATA_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_equal_bins() {
        let scale = ColorScale::sequential([0.0, 60.0]).unwrap();
        assert_eq!(scale.bucket(0.0), 0);
        assert_eq!(scale.bucket(9.99), 0);
        assert_eq!(scale.bucket(10.0), 1);
        assert_eq!(scale.bucket(35.0), 3);
        assert_eq!(scale.bucket(59.9), 5);
        assert_eq!(scale.bucket(60.0), 5);
    }

    #[test]
    fn ignores_non_finite_values() {
        let scale = ColorScale::sequential([f64::NAN, 2.0, 8.0, f64::INFINITY]).unwrap();
        assert!((scale.min() - 2.0).abs() < f64::EPSILON);
        assert!((scale.max() - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_values_no_scale() {
        assert!(ColorScale::sequential(std::iter::empty()).is_none());
    }

    #[test]
    fn single_value_uses_first_bucket() {
        let scale = ColorScale::sequential([5.0, 5.0]).unwrap();
        assert_eq!(scale.fill(Some(5.0)), Fill::Bucket(0));
        assert_eq!(color(scale.fill(Some(5.0))), "#ffffb2");
    }

    #[test]
    fn missing_value_is_gray() {
        let scale = ColorScale::sequential([1.0, 2.0]).unwrap();
        assert_eq!(scale.fill(None), Fill::NoData);
        assert_eq!(color(Fill::NoData), NO_DATA_COLOR);
        assert_eq!(color(scale.fill(Some(2.0))), "#bd0026");
    }

    #[test]
    fn breaks_span_range() {
        let scale = ColorScale::sequential([0.0, 6.0]).unwrap();
        assert_eq!(scale.breaks(), [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
