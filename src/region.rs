//! Region estimation from data bounds.
//!
//! `info` reports per-column extents, optionally rounded outward to a grid
//! so the resulting frame fully contains every data point.

use crate::data::Table;
use crate::error::{PlotError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of the spacing within which a bound counts as already on the grid.
const GRID_TOLERANCE: f64 = 1e-9;

/// Rectangular plot bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Region {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err(PlotError::InvalidRegion(format!(
                "bounds must be finite, got {}/{}/{}/{}",
                xmin, xmax, ymin, ymax
            )));
        }
        if xmin > xmax || ymin > ymax {
            return Err(PlotError::InvalidRegion(format!(
                "expected xmin <= xmax and ymin <= ymax, got {}/{}/{}/{}",
                xmin, xmax, ymin, ymax
            )));
        }
        Ok(Self {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Build from the flat `[xmin, xmax, ymin, ymax]` form `info` returns.
    pub fn from_slice(bounds: &[f64]) -> Result<Self> {
        match bounds {
            [xmin, xmax, ymin, ymax] => Self::new(*xmin, *xmax, *ymin, *ymax),
            _ => Err(PlotError::InvalidRegion(format!(
                "expected 4 values, got {}",
                bounds.len()
            ))),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.xmin, self.xmax, self.ymin, self.ymax)
    }
}

/// Per-column extents as a flat `[min0, max0, min1, max1, ...]` sequence.
///
/// `spacing` is either empty (exact bounds), a single value applied to every
/// column, or one value per column.
pub fn info(table: &Table, columns: &[&str], spacing: &[f64]) -> Result<Vec<f64>> {
    let spacing = expand_spacing(spacing, columns.len())?;

    let mut bounds = Vec::with_capacity(columns.len() * 2);
    for (i, column) in columns.iter().enumerate() {
        let (min, max) = column_extent(table, column)?;
        match spacing.get(i) {
            Some(&step) => {
                bounds.push(round_down(min, step));
                bounds.push(round_up(max, step));
            }
            None => {
                bounds.push(min);
                bounds.push(max);
            }
        }
    }
    Ok(bounds)
}

/// Region spanned by two columns, rounded to `(sx, sy)` when given.
pub fn region(table: &Table, x: &str, y: &str, spacing: Option<(f64, f64)>) -> Result<Region> {
    let spacing: Vec<f64> = spacing.map(|(sx, sy)| vec![sx, sy]).unwrap_or_default();
    Region::from_slice(&info(table, &[x, y], &spacing)?)
}

fn expand_spacing(spacing: &[f64], columns: usize) -> Result<Vec<f64>> {
    if let Some(bad) = spacing.iter().find(|s| !s.is_finite() || **s <= 0.0) {
        return Err(PlotError::InvalidSpacing(format!(
            "spacing must be positive, got {}",
            bad
        )));
    }
    match spacing.len() {
        0 => Ok(Vec::new()),
        1 => Ok(vec![spacing[0]; columns]),
        n if n == columns => Ok(spacing.to_vec()),
        n => Err(PlotError::InvalidSpacing(format!(
            "{} spacing values given for {} columns",
            n, columns
        ))),
    }
}

fn column_extent(table: &Table, column: &str) -> Result<(f64, f64)> {
    let values = table.numeric_column(column)?;
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return Err(PlotError::NoFiniteValues(column.to_string()));
    }
    Ok((min, max))
}

/// Largest multiple of `step` that is <= `value`.
fn round_down(value: f64, step: f64) -> f64 {
    let q = value / step;
    let nearest = q.round();
    if (q - nearest).abs() < GRID_TOLERANCE {
        nearest * step
    } else {
        q.floor() * step
    }
}

/// Smallest multiple of `step` that is >= `value`.
fn round_up(value: f64, step: f64) -> f64 {
    let q = value / step;
    let nearest = q.round();
    if (q - nearest).abs() < GRID_TOLERANCE {
        nearest * step
    } else {
        q.ceil() * step
    }
}

/// Summary of a table's extents, in the `N = rows <min/max> ...` layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub label: String,
    pub records: usize,
    pub extents: Vec<(f64, f64)>,
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: N = {}", self.label, self.records)?;
        for (min, max) in &self.extents {
            write!(f, " <{}/{}>", min, max)?;
        }
        Ok(())
    }
}

/// Exact extents of `columns`, counting rows that are finite in all of them.
pub fn describe(table: &Table, label: &str, columns: &[&str]) -> Result<TableInfo> {
    let mut extents = Vec::with_capacity(columns.len());
    let mut complete = vec![true; table.len()];

    for column in columns {
        let values = table.numeric_column(column)?;
        for (keep, v) in complete.iter_mut().zip(&values) {
            *keep &= v.is_finite();
        }
        extents.push(column_extent(table, column)?);
    }

    Ok(TableInfo {
        label: label.to_string(),
        records: complete.iter().filter(|&&k| k).count(),
        extents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn penguins() -> Table {
        Table::new(
            vec!["bill_length_mm".into(), "bill_depth_mm".into()],
            vec![
                vec!["39.1".into(), "18.7".into()],
                vec!["32.1".into(), "15.5".into()],
                vec!["NA".into(), "NA".into()],
                vec!["59.6".into(), "17.0".into()],
                vec!["46.5".into(), "13.1".into()],
                vec!["50.0".into(), "21.5".into()],
            ],
        )
    }

    #[test]
    fn test_info_rounds_outward() {
        let bounds = info(&penguins(), &["bill_length_mm", "bill_depth_mm"], &[3.0, 2.0]).unwrap();
        assert_eq!(bounds, vec![30.0, 60.0, 12.0, 22.0]);
    }

    #[test]
    fn test_info_exact_bounds_without_spacing() {
        let bounds = info(&penguins(), &["bill_length_mm"], &[]).unwrap();
        assert_eq!(bounds, vec![32.1, 59.6]);
    }

    #[test]
    fn test_info_single_spacing_applies_to_all() {
        let bounds = info(&penguins(), &["bill_length_mm", "bill_depth_mm"], &[5.0]).unwrap();
        assert_eq!(bounds, vec![30.0, 60.0, 10.0, 25.0]);
    }

    #[test]
    fn test_info_bound_on_grid_is_kept() {
        let table = Table::new(
            vec!["v".into()],
            vec![vec!["0.3".into()], vec!["0.9".into()]],
        );
        // 0.3 / 0.1 and 0.9 / 0.1 are not exact in binary floating point
        let bounds = info(&table, &["v"], &[0.1]).unwrap();
        assert!((bounds[0] - 0.3).abs() < 1e-12);
        assert!((bounds[1] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_info_contains_data() {
        let spacing = [3.0, 2.0];
        let bounds = info(&penguins(), &["bill_length_mm", "bill_depth_mm"], &spacing).unwrap();
        let table = penguins();
        for (col, (name, step)) in ["bill_length_mm", "bill_depth_mm"].iter().zip(spacing).enumerate() {
            let values: Vec<f64> = table
                .numeric_column(name)
                .unwrap()
                .into_iter()
                .filter(|v| v.is_finite())
                .collect();
            let lo = bounds[col * 2];
            let hi = bounds[col * 2 + 1];
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            assert!(values.iter().all(|&v| lo <= v && v <= hi));
            // lo is the largest multiple of step not above the minimum
            assert!(lo + step > min);
            assert_eq!((lo / step).fract(), 0.0);
        }
    }

    #[test]
    fn test_info_missing_column() {
        let result = info(&penguins(), &["flipper_length_mm"], &[]);
        assert!(matches!(result, Err(PlotError::ColumnNotFound(_))));
    }

    #[test]
    fn test_info_non_numeric_column() {
        let table = Table::new(vec!["species".into()], vec![vec!["Adelie".into()]]);
        let result = info(&table, &["species"], &[]);
        assert!(matches!(result, Err(PlotError::NonNumeric { .. })));
    }

    #[test]
    fn test_info_all_missing() {
        let table = Table::new(vec!["v".into()], vec![vec!["NA".into()]]);
        assert!(matches!(
            info(&table, &["v"], &[]),
            Err(PlotError::NoFiniteValues(_))
        ));
    }

    #[test]
    fn test_info_invalid_spacing() {
        let cols = ["bill_length_mm", "bill_depth_mm"];
        assert!(matches!(
            info(&penguins(), &cols, &[0.0]),
            Err(PlotError::InvalidSpacing(_))
        ));
        assert!(matches!(
            info(&penguins(), &cols, &[1.0, 2.0, 3.0]),
            Err(PlotError::InvalidSpacing(_))
        ));
    }

    #[test]
    fn test_region_helper() {
        let region = region(&penguins(), "bill_length_mm", "bill_depth_mm", Some((3.0, 2.0))).unwrap();
        assert_eq!(region, Region::new(30.0, 60.0, 12.0, 22.0).unwrap());
        assert_eq!(region.to_string(), "30/60/12/22");
    }

    #[test]
    fn test_region_invalid_order() {
        assert!(Region::new(5.0, 1.0, 0.0, 1.0).is_err());
        assert!(Region::from_slice(&[0.0, 1.0]).is_err());
    }

    #[test]
    fn test_describe() {
        let summary = describe(&penguins(), "penguins", &["bill_length_mm", "bill_depth_mm"]).unwrap();
        assert_eq!(summary.records, 5);
        assert_eq!(
            summary.to_string(),
            "penguins: N = 5 <32.1/59.6> <13.1/21.5>"
        );
    }
}
