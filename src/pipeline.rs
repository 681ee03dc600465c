//! End-to-end categorical scatter pipeline.
//!
//! region from the table bounds → figure → basemap → colormap for the
//! categories → one batched symbol plot.

use crate::colormap::{makecpt, ColorModel, Colormap, Series};
use crate::csv_reader::{DataSource, InputFormat};
use crate::data::Table;
use crate::error::{PlotError, Result};
use crate::figure::{Figure, PlotArgs, SymbolColor};
use crate::parser;
use crate::region::{self, Region};
use crate::RenderOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const PENGUINS_URL: &str = "https://github.com/mwaskom/seaborn-data/raw/master/penguins.csv";

/// Everything needed to turn a table into a categorical scatter plot
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScatterJob {
    /// URL, path, or `-` for stdin
    pub input: String,
    pub input_format: Option<InputFormat>,
    pub x: String,
    pub y: String,
    /// Column whose values pick the symbol color
    pub category: String,
    /// Column scaled by `size_scale` to give the symbol size
    pub size_column: Option<String>,
    pub size_scale: f64,
    /// Region rounding per axis; empty for exact bounds
    pub spacing: Vec<f64>,
    pub projection: String,
    pub frame: Vec<String>,
    pub cmap: String,
    pub color_model: ColorModel,
    pub style: String,
    pub transparency: f64,
    pub no_clip: bool,
    pub render: RenderOptions,
}

impl Default for ScatterJob {
    /// Bill length against bill depth of the Palmer penguins, one color per species
    fn default() -> Self {
        Self {
            input: PENGUINS_URL.to_string(),
            input_format: None,
            x: "bill_length_mm".to_string(),
            y: "bill_depth_mm".to_string(),
            category: "species".to_string(),
            size_column: Some("body_mass_g".to_string()),
            size_scale: 7.5e-5,
            spacing: vec![3.0, 2.0],
            projection: "X10c/10c".to_string(),
            frame: vec![
                "xafg+l\"Bill length in mm\"".to_string(),
                "yafg+l\"Bill depth (mm)\"".to_string(),
                "WSen+t\"Penguin size at Palmer Station\"".to_string(),
            ],
            cmap: "inferno".to_string(),
            color_model: ColorModel::Categorical,
            style: "cc".to_string(),
            transparency: 40.0,
            no_clip: true,
            render: RenderOptions::default(),
        }
    }
}

impl ScatterJob {
    /// Load a job from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn source(&self) -> DataSource {
        DataSource::parse(&self.input)
    }

    /// Bounds of the x/y columns, rounded by `spacing`
    pub fn region(&self, table: &Table) -> Result<Region> {
        let bounds = region::info(table, &[self.x.as_str(), self.y.as_str()], &self.spacing)?;
        Region::from_slice(&bounds)
    }

    /// Colormap covering the codes of the category column
    pub fn colormap(&self, table: &Table) -> Result<Colormap> {
        let categorical = table.categorize(&self.category)?;
        match self.color_model {
            ColorModel::Categorical => {
                let cmap = Colormap::for_categories(&self.cmap, &categorical)?;
                cmap.check_domain(&categorical)?;
                Ok(cmap)
            }
            ColorModel::Continuous => makecpt(
                &self.cmap,
                ColorModel::Continuous,
                Series::new(0.0, categorical.len() as f64, 1.0),
            ),
        }
    }
}

/// Issue the drawing commands for `job` against a fresh figure.
pub fn build_figure(job: &ScatterJob, table: &Table) -> Result<Figure> {
    if !job.size_scale.is_finite() || job.size_scale < 0.0 {
        return Err(PlotError::invalid_argument(
            "size_scale",
            format!("must be a non-negative number, got {}", job.size_scale),
        ));
    }

    let region = job.region(table)?;
    let projection = parser::parse_projection(&job.projection)?;
    let frame = parser::parse_frame(&job.frame)?;
    let style = parser::parse_style(&job.style)?;
    debug!(%region, "Region from data bounds");

    let mut fig = Figure::with_options(job.render.clone());
    fig.basemap(region, projection, frame)?;

    let categorical = table.categorize(&job.category)?;
    let cmap = job.colormap(table)?;
    info!(
        column = %categorical.column,
        categories = ?categorical.categories,
        palette = %job.cmap,
        "Colormap for categories"
    );

    let sizes = job
        .size_column
        .as_deref()
        .map(|column| table.numeric_column(column))
        .transpose()?
        .map(|values| values.into_iter().map(|v| v * job.size_scale).collect());

    fig.plot(PlotArgs {
        x: table.numeric_column(&job.x)?,
        y: table.numeric_column(&job.y)?,
        sizes,
        color: SymbolColor::Mapped {
            values: categorical.code_values(),
            cmap,
        },
        style,
        no_clip: job.no_clip,
        transparency: job.transparency,
    })?;

    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::DrawCommand;

    const PENGUINS: &str = "\
species,island,bill_length_mm,bill_depth_mm,flipper_length_mm,body_mass_g,sex
Adelie,Torgersen,39.1,18.7,181,3750,Male
Adelie,Torgersen,NA,NA,NA,NA,NA
Adelie,Biscoe,32.1,15.5,188,3050,Female
Chinstrap,Dream,46.5,17.9,192,3500,Female
Chinstrap,Dream,58.0,17.8,181,3700,Female
Gentoo,Biscoe,59.6,17.0,230,6050,Male
Gentoo,Biscoe,46.1,13.1,211,4500,Female
";

    fn table() -> Table {
        crate::csv_reader::read_csv(PENGUINS.as_bytes()).unwrap()
    }

    #[test]
    fn test_default_job_matches_penguin_example() {
        let job = ScatterJob::default();
        assert_eq!(job.spacing, vec![3.0, 2.0]);
        assert_eq!(job.transparency, 40.0);
        assert!(job.no_clip);
        assert_eq!(job.source(), DataSource::Url(PENGUINS_URL.to_string()));
    }

    #[test]
    fn test_job_region() {
        let region = ScatterJob::default().region(&table()).unwrap();
        assert_eq!(region, Region::new(30.0, 60.0, 12.0, 20.0).unwrap());
    }

    #[test]
    fn test_build_figure_commands() {
        let fig = build_figure(&ScatterJob::default(), &table()).unwrap();
        let commands = fig.commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], DrawCommand::Basemap { .. }));
        match &commands[1] {
            DrawCommand::Symbols { symbols, no_clip, .. } => {
                // The all-NA row is skipped
                assert_eq!(symbols.len(), 6);
                assert!(*no_clip);
                // 3750 g * 7.5e-5 = 0.28125 cm
                assert!((symbols[0].size.value - 0.28125).abs() < 1e-12);
            }
            other => panic!("Expected Symbols, got {:?}", other),
        }
    }

    #[test]
    fn test_species_share_colors() {
        let fig = build_figure(&ScatterJob::default(), &table()).unwrap();
        if let DrawCommand::Symbols { symbols, .. } = &fig.commands()[1] {
            // rows: Adelie, Adelie, Chinstrap, Chinstrap, Gentoo, Gentoo
            assert_eq!(symbols[0].color, symbols[1].color);
            assert_eq!(symbols[2].color, symbols[3].color);
            assert_eq!(symbols[4].color, symbols[5].color);
            assert_ne!(symbols[0].color, symbols[2].color);
            assert_ne!(symbols[2].color, symbols[4].color);
        } else {
            panic!("Expected Symbols");
        }
    }

    #[test]
    fn test_continuous_model() {
        let job = ScatterJob {
            color_model: ColorModel::Continuous,
            cmap: "viridis".to_string(),
            ..Default::default()
        };
        let cmap = job.colormap(&table()).unwrap();
        assert_eq!(cmap.len(), 3);
        assert_eq!(cmap.model, ColorModel::Continuous);
    }

    #[test]
    fn test_missing_category_column() {
        let job = ScatterJob {
            category: "genus".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            build_figure(&job, &table()),
            Err(PlotError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_non_numeric_axis_column() {
        let job = ScatterJob {
            x: "island".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            build_figure(&job, &table()),
            Err(PlotError::NonNumeric { .. })
        ));
    }

    #[test]
    fn test_bad_frame_string() {
        let job = ScatterJob {
            frame: vec!["q?".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            build_figure(&job, &table()),
            Err(PlotError::Parse { what: "frame", .. })
        ));
    }

    #[test]
    fn test_fixed_style_size_without_size_column() {
        let job = ScatterJob {
            size_column: None,
            style: "s0.2c".to_string(),
            ..Default::default()
        };
        assert!(build_figure(&job, &table()).is_ok());
    }

    #[test]
    fn test_job_from_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        fs::write(&path, r#"{"input": "data.csv", "cmap": "viridis", "spacing": [5]}"#).unwrap();

        let job = ScatterJob::from_json_file(&path).unwrap();
        assert_eq!(job.input, "data.csv");
        assert_eq!(job.cmap, "viridis");
        assert_eq!(job.spacing, vec![5.0]);
        assert_eq!(job.x, "bill_length_mm");
    }

    #[test]
    fn test_render_penguins_png() {
        let mut fig = build_figure(&ScatterJob::default(), &table()).unwrap();
        let bytes = fig.render(crate::OutputFormat::Png).unwrap();
        assert_eq!(&bytes[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }
}
