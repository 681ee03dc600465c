use anyhow::{anyhow, Context, Result};
use catscatter::colormap::ColorModel;
use catscatter::csv_reader::{self, InputFormat};
use catscatter::logging::init_tracing;
use catscatter::pipeline::{self, ScatterJob};
use catscatter::region;
use catscatter::OutputFormat;
use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "catscatter")]
#[command(author, version, about = "Scatter plots of tabular data, colored by category", long_about = None)]
struct Args {
    /// Input table: URL, path, or '-' for stdin [default: Palmer penguins dataset]
    #[arg(short, long, env = "CATSCATTER_INPUT")]
    input: Option<String>,

    /// Read the input as a JSON array of objects
    #[arg(long)]
    json: bool,

    /// JSON job file; command-line flags override its values
    #[arg(short, long, env = "CATSCATTER_CONFIG")]
    config: Option<PathBuf>,

    /// Column for the x axis
    #[arg(short = 'x', long)]
    x: Option<String>,

    /// Column for the y axis
    #[arg(short = 'y', long)]
    y: Option<String>,

    /// Column whose categories pick the symbol color
    #[arg(long)]
    category: Option<String>,

    /// Column giving the symbol size, multiplied by --size-scale
    #[arg(long)]
    size_column: Option<String>,

    #[arg(long)]
    size_scale: Option<f64>,

    /// Round the region outward per axis, e.g. 3/2
    #[arg(long)]
    spacing: Option<String>,

    /// Linear projection, e.g. X10c/10c
    #[arg(short = 'J', long)]
    projection: Option<String>,

    /// Frame element, repeatable: -B 'xafg+l"Bill length"' -B 'WSen+t"Title"'
    #[arg(short = 'B', long)]
    frame: Vec<String>,

    /// Palette name or comma-separated color list
    #[arg(short = 'C', long)]
    cmap: Option<String>,

    /// Interpolate the palette instead of one exact color per category
    #[arg(long)]
    continuous: bool,

    /// Symbol style: shape [size] [unit], e.g. cc or s0.2c
    #[arg(short = 'S', long)]
    style: Option<String>,

    /// Symbol transparency, 0-100
    #[arg(short = 't', long)]
    transparency: Option<f64>,

    /// Drop symbols centered outside the frame
    #[arg(long, conflicts_with = "no_clip")]
    clip: bool,

    /// Draw symbols even when centered outside the frame
    #[arg(short = 'N', long)]
    no_clip: bool,

    #[arg(long, env = "CATSCATTER_DPI")]
    dpi: Option<u32>,

    /// Output file (format from its extension); stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format written to stdout
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Print the extents of the x/y columns and exit
    #[arg(long)]
    info: bool,

    /// Print the colormap built for the categories and exit
    #[arg(long)]
    cpt: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CATSCATTER_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Svg,
}

fn parse_spacing(spacing: &str) -> Result<Vec<f64>> {
    spacing
        .split('/')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| anyhow!("Invalid spacing '{}': expected numbers like 3/2", spacing))
        })
        .collect()
}

/// Start from the config file (or defaults) and apply the flags on top
fn build_job(args: &Args) -> Result<ScatterJob> {
    let mut job = match &args.config {
        Some(path) => ScatterJob::from_json_file(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?,
        None => ScatterJob::default(),
    };

    if let Some(input) = &args.input {
        job.input = input.clone();
    }
    if args.json {
        job.input_format = Some(InputFormat::Json);
    }
    if let Some(x) = &args.x {
        job.x = x.clone();
    }
    if let Some(y) = &args.y {
        job.y = y.clone();
    }
    if let Some(category) = &args.category {
        job.category = category.clone();
    }
    if let Some(column) = &args.size_column {
        job.size_column = Some(column.clone());
    }
    if let Some(scale) = args.size_scale {
        job.size_scale = scale;
    }
    if let Some(spacing) = &args.spacing {
        job.spacing = parse_spacing(spacing)?;
    }
    if let Some(projection) = &args.projection {
        job.projection = projection.clone();
    }
    if !args.frame.is_empty() {
        job.frame = args.frame.clone();
    }
    if let Some(cmap) = &args.cmap {
        job.cmap = cmap.clone();
    }
    if args.continuous {
        job.color_model = ColorModel::Continuous;
    }
    if let Some(style) = &args.style {
        job.style = style.clone();
    }
    if let Some(transparency) = args.transparency {
        job.transparency = transparency;
    }
    if args.clip {
        job.no_clip = false;
    }
    if args.no_clip {
        job.no_clip = true;
    }
    if let Some(dpi) = args.dpi {
        job.render.dpi = dpi;
    }
    if let Some(format) = args.format {
        job.render.format = match format {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Svg => OutputFormat::Svg,
        };
    }

    Ok(job)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let job = build_job(&args)?;
    info!(input = %job.input, x = %job.x, y = %job.y, category = %job.category, "Starting");

    let table = csv_reader::load(&job.source(), job.input_format)
        .with_context(|| format!("Failed to load '{}'", job.input))?;

    if args.info {
        let summary = region::describe(&table, &job.input, &[job.x.as_str(), job.y.as_str()])
            .context("Failed to summarize input")?;
        println!("{}", summary);
        return Ok(());
    }

    if args.cpt {
        let cmap = job.colormap(&table).context("Failed to build colormap")?;
        print!("{}", cmap);
        return Ok(());
    }

    let mut fig = pipeline::build_figure(&job, &table).context("Failed to build figure")?;

    match &args.output {
        Some(path) => fig
            .savefig(path)
            .with_context(|| format!("Failed to save figure to '{}'", path.display()))?,
        None => {
            let stdout = io::stdout();
            fig.show(stdout.lock()).context("Failed to write figure to stdout")?;
        }
    }

    Ok(())
}
