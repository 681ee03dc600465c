// Table loading from CSV or JSON, read from a URL, a file or stdin

use crate::data::Table;
use crate::error::{PlotError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the input table comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Url(String),
    Path(PathBuf),
    Stdin,
}

impl DataSource {
    /// Interpret a command-line argument: `-` is stdin, `http(s)://` a URL,
    /// anything else a path.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            DataSource::Stdin
        } else if arg.starts_with("http://") || arg.starts_with("https://") {
            DataSource::Url(arg.to_string())
        } else {
            DataSource::Path(PathBuf::from(arg))
        }
    }

    fn looks_like_json(&self) -> bool {
        let name = match self {
            DataSource::Url(url) => url.as_str(),
            DataSource::Path(path) => path.to_str().unwrap_or(""),
            DataSource::Stdin => return false,
        };
        name.to_ascii_lowercase().ends_with(".json")
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{}", url),
            DataSource::Path(path) => write!(f, "{}", path.display()),
            DataSource::Stdin => write!(f, "<stdin>"),
        }
    }
}

/// Input encoding of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    #[default]
    Csv,
    Json,
}

/// Load a table, guessing JSON from a `.json` suffix unless `format` is given.
pub fn load(source: &DataSource, format: Option<InputFormat>) -> Result<Table> {
    let format = format.unwrap_or(if source.looks_like_json() {
        InputFormat::Json
    } else {
        InputFormat::Csv
    });
    debug!(source = %source, ?format, "Loading table");

    let text = match source {
        DataSource::Url(url) => fetch(url)?,
        DataSource::Path(path) => {
            let mut text = String::new();
            File::open(path)?.read_to_string(&mut text)?;
            text
        }
        DataSource::Stdin => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let table = match format {
        InputFormat::Csv => read_csv(text.as_bytes())?,
        InputFormat::Json => Table::from_json(&serde_json::from_str(&text)?)?,
    };

    info!(
        source = %source,
        rows = table.len(),
        columns = table.headers.len(),
        "Loaded table"
    );
    Ok(table)
}

/// Read CSV data with a header row from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(String::from).collect()))
        .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;

    if rows.is_empty() {
        return Err(PlotError::EmptyTable);
    }

    Ok(Table::new(headers, rows))
}

fn fetch(url: &str) -> Result<String> {
    let fetch_err = |e: reqwest::Error| PlotError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(fetch_err)?;

    client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.text())
        .map_err(fetch_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_basic() {
        let csv = "species,bill_length_mm\nAdelie,39.1\nGentoo,46.1\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["species", "bill_length_mm"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], "Gentoo");
    }

    #[test]
    fn test_read_csv_trims_cells() {
        let csv = "a, b\n 1 , 2\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn test_read_csv_header_only() {
        let result = read_csv("x,y\n".as_bytes());
        assert!(matches!(result, Err(PlotError::EmptyTable)));
    }

    #[test]
    fn test_read_csv_ragged_row() {
        let result = read_csv("x,y\n1,2\n3\n".as_bytes());
        assert!(matches!(result, Err(PlotError::Csv(_))));
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!(DataSource::parse("-"), DataSource::Stdin);
        assert_eq!(
            DataSource::parse("https://example.org/penguins.csv"),
            DataSource::Url("https://example.org/penguins.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("test/penguins.csv"),
            DataSource::Path(PathBuf::from("test/penguins.csv"))
        );
    }

    #[test]
    fn test_json_guess() {
        assert!(DataSource::parse("data/points.JSON").looks_like_json());
        assert!(!DataSource::parse("data/points.csv").looks_like_json());
        assert!(!DataSource::Stdin.looks_like_json());
    }

    #[test]
    fn test_load_missing_file() {
        let source = DataSource::Path(PathBuf::from("does/not/exist.csv"));
        assert!(matches!(load(&source, None), Err(PlotError::Io(_))));
    }
}
