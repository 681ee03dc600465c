use crate::error::{PlotError, Result};
use serde_json::Value;
use std::collections::BTreeSet;

/// Cell spellings read as a missing value rather than a parse failure.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Tabular dataset: a header row plus string cells, parsed on access.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Create a Table from a JSON Array of Objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value.as_array().ok_or_else(|| {
            PlotError::invalid_argument("input", "JSON data must be an array of objects")
        })?;

        if array.is_empty() {
            return Err(PlotError::EmptyTable);
        }

        let objects = array
            .iter()
            .map(|item| {
                item.as_object().ok_or_else(|| {
                    PlotError::invalid_argument("input", "Items in array must be objects")
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Union of keys, in order of first appearance
        let mut headers: Vec<String> = Vec::new();
        for obj in &objects {
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(array.len());
        for obj in objects {
            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    _ => {
                        return Err(PlotError::invalid_argument(
                            header,
                            "nested values are not supported",
                        ))
                    }
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Locate a column, preferring an exact match over a case-insensitive one.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| self.headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
            .ok_or_else(|| PlotError::ColumnNotFound(name.to_string()))
    }

    /// Read a column as numbers. Missing cells come back as NaN.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let cell = row.get(idx).map(|s| s.trim()).unwrap_or("");
                if is_missing(cell) {
                    return Ok(f64::NAN);
                }
                cell.parse::<f64>().map_err(|_| PlotError::NonNumeric {
                    column: self.headers[idx].clone(),
                    row: row_idx + 1,
                    value: cell.to_string(),
                })
            })
            .collect()
    }

    /// Promote a column to a categorical one with dense integer codes.
    pub fn categorize(&self, name: &str) -> Result<Categorical> {
        let idx = self.column_index(name)?;
        let cells: Vec<Option<&str>> = self
            .rows
            .iter()
            .map(|row| row.get(idx).map(|s| s.trim()).filter(|s| !is_missing(s)))
            .collect();

        let categories: Vec<String> = cells
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect();

        let codes = cells
            .iter()
            .map(|cell| cell.and_then(|c| categories.iter().position(|k| k == c)))
            .collect();

        Ok(Categorical {
            column: self.headers[idx].clone(),
            categories,
            codes,
        })
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

/// A column restricted to a finite set of values.
///
/// `categories` are sorted, and `codes[row]` indexes into them, so every code
/// lies in `0..categories.len()`. Rows with a missing value have no code.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    pub column: String,
    pub categories: Vec<String>,
    pub codes: Vec<Option<usize>>,
}

impl Categorical {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    /// Codes as plot color values, NaN where the row has no category.
    pub fn code_values(&self) -> Vec<f64> {
        self.codes
            .iter()
            .map(|c| c.map(|c| c as f64).unwrap_or(f64::NAN))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_table(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> Table {
        Table::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_numeric_column_missing_markers() {
        let table = make_table(
            vec!["mass"],
            vec![vec!["3750"], vec!["NA"], vec![""], vec!["4200.5"]],
        );
        let values = table.numeric_column("mass").unwrap();
        assert_eq!(values[0], 3750.0);
        assert!(values[1].is_nan());
        assert!(values[2].is_nan());
        assert_eq!(values[3], 4200.5);
    }

    #[test]
    fn test_numeric_column_non_numeric() {
        let table = make_table(vec!["species"], vec![vec!["Adelie"]]);
        let err = table.numeric_column("species").unwrap_err();
        assert!(err.to_string().contains("Failed to parse 'Adelie'"));
    }

    #[test]
    fn test_column_not_found() {
        let table = make_table(vec!["a"], vec![vec!["1"]]);
        assert!(matches!(
            table.numeric_column("b"),
            Err(PlotError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_column_index_case_insensitive_fallback() {
        let table = make_table(vec!["Species", "species_id"], vec![]);
        assert_eq!(table.column_index("species").unwrap(), 0);
        assert_eq!(table.column_index("species_id").unwrap(), 1);
    }

    #[test]
    fn test_categorize_sorted_dense_codes() {
        let table = make_table(
            vec!["species"],
            vec![
                vec!["Gentoo"],
                vec!["Adelie"],
                vec!["NA"],
                vec!["Chinstrap"],
                vec!["Adelie"],
            ],
        );
        let cat = table.categorize("species").unwrap();
        assert_eq!(cat.categories, vec!["Adelie", "Chinstrap", "Gentoo"]);
        assert_eq!(cat.codes, vec![Some(2), Some(0), None, Some(1), Some(0)]);
        assert!(cat.codes.iter().flatten().all(|&c| c < cat.len()));
        assert_eq!(cat.index_of("Gentoo"), Some(2));
    }

    #[test]
    fn test_code_values_nan_for_missing() {
        let table = make_table(vec!["k"], vec![vec!["b"], vec![""], vec!["a"]]);
        let values = table.categorize("k").unwrap().code_values();
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 0.0);
    }

    #[test]
    fn test_from_json() {
        let value = json!([
            {"species": "Adelie", "bill_length_mm": 39.1},
            {"species": "Gentoo", "bill_length_mm": null}
        ]);
        let table = Table::from_json(&value).unwrap();
        assert_eq!(table.len(), 2);
        let bills = table.numeric_column("bill_length_mm").unwrap();
        assert_eq!(bills[0], 39.1);
        assert!(bills[1].is_nan());
    }

    #[test]
    fn test_from_json_keys_from_later_objects() {
        let value = json!([
            {"species": "Adelie", "bill_length_mm": 39.1},
            {"species": "Gentoo", "bill_length_mm": 46.1, "body_mass_g": 4500}
        ]);
        let table = Table::from_json(&value).unwrap();
        assert_eq!(table.headers.len(), 3);
        let mass = table.numeric_column("body_mass_g").unwrap();
        assert!(mass[0].is_nan());
        assert_eq!(mass[1], 4500.0);
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        let value = json!([{"species": "Adelie"}, 3]);
        assert!(matches!(
            Table::from_json(&value),
            Err(PlotError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_from_json_empty() {
        assert!(matches!(
            Table::from_json(&json!([])),
            Err(PlotError::EmptyTable)
        ));
    }

    #[test]
    fn test_from_json_not_array() {
        assert!(Table::from_json(&json!({"a": 1})).is_err());
    }
}
