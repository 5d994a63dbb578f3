use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use preview_core::fit_preview;
use serde::Serialize;
use tiling_core::constants::CM_PER_M;
use tiling_core::{CalculateRequest, Catalog, LayoutResult, TileService};

#[derive(Parser, Debug)]
#[command(name = "tiling", version, about = "Work out how many tiles cover a floor")]
struct Cli {
    /// JSON catalog of tile sizes to use instead of the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available tile sizes
    Sizes {
        #[arg(long)]
        json: bool,
    },
    /// Lay out the area and print the result as JSON
    Calculate {
        #[command(flatten)]
        area: AreaArgs,
        /// Print counts only, without the tile list
        #[arg(long)]
        summary: bool,
        #[arg(long)]
        pretty: bool,
    },
    /// Answer a raw JSON request body read from a file or stdin
    Request { path: Option<PathBuf> },
    /// Render the layout to an .svg or .png file
    Preview {
        #[command(flatten)]
        area: AreaArgs,
        output: PathBuf,
        #[arg(long, default_value_t = 1400.0)]
        max_width: f64,
        #[arg(long, default_value_t = 1000.0)]
        max_height: f64,
        #[arg(long, default_value_t = 12.0)]
        pad: f64,
    },
}

#[derive(Args, Debug)]
struct AreaArgs {
    /// Area width (centimeters, or meters with --meters)
    width: f64,
    /// Area height (centimeters, or meters with --meters)
    height: f64,
    /// Catalog key, e.g. 30x60
    size: String,
    #[arg(long)]
    meters: bool,
}

impl AreaArgs {
    fn to_request(&self) -> CalculateRequest {
        let k = if self.meters { CM_PER_M } else { 1.0 };
        CalculateRequest::new(self.width * k, self.height * k, self.size.clone())
    }
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Summary {
    total_tiles: usize,
    whole_tiles: usize,
    partial_tiles: usize,
    orientation: bool,
    tile_width: f64,
    tile_height: f64,
    total_area: f64,
}

impl From<&LayoutResult> for Summary {
    fn from(l: &LayoutResult) -> Self {
        Summary {
            total_tiles: l.total_tiles,
            whole_tiles: l.whole_tiles(),
            partial_tiles: l.partial_tiles(),
            orientation: l.orientation_is_original,
            tile_width: l.tile_width,
            tile_height: l.tile_height,
            total_area: l.total_area,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()?
            .to_str()?
            .to_ascii_lowercase()
            .as_str()
        {
            "svg" => Some(OutputFormat::Svg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let txt = fs::read_to_string(p)?;
            let catalog = Catalog::from_json(&txt)?;
            debug!("loaded {} tile sizes from {}", catalog.len(), p.display());
            Ok(catalog)
        }
        None => Ok(Catalog::default()),
    }
}

fn to_json<T: Serialize>(v: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(v)
    } else {
        serde_json::to_string(v)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let catalog = load_catalog(cli.catalog.as_deref())?;
    let service = TileService::new(&catalog);

    match cli.command {
        Command::Sizes { json } => {
            let sizes = service.list_sizes();
            if json {
                println!("{}", serde_json::to_string(&sizes)?);
            } else {
                for key in sizes {
                    println!("{key}");
                }
            }
        }
        Command::Calculate {
            area,
            summary,
            pretty,
        } => {
            let layout = service.calculate(&area.to_request())?;
            debug!(
                "{} picked {}x{} ({})",
                area.size,
                layout.tile_width,
                layout.tile_height,
                layout.orientation_label()
            );
            let out = if summary {
                to_json(&Summary::from(&layout), pretty)?
            } else {
                to_json(&layout, pretty)?
            };
            println!("{out}");
        }
        Command::Request { path } => {
            let body = match path {
                Some(p) => fs::read_to_string(p)?,
                None => {
                    let mut s = String::new();
                    io::stdin().read_to_string(&mut s)?;
                    s
                }
            };
            println!("{}", tiling_core::calculate_json(&catalog, &body)?);
        }
        Command::Preview {
            area,
            output,
            max_width,
            max_height,
            pad,
        } => {
            let format = OutputFormat::from_path(&output).ok_or_else(|| {
                format!("unsupported output {}: use .svg or .png", output.display())
            })?;
            let layout = service.calculate(&area.to_request())?;
            let fit = fit_preview(layout.area_width, layout.area_height, max_width, max_height);
            match format {
                OutputFormat::Svg => {
                    let (svg, _w, _h) = preview_core::build_preview_svg(&layout, &fit, pad);
                    fs::write(&output, svg)?;
                }
                OutputFormat::Png => {
                    fs::write(&output, preview_core::render_png(&layout, &fit, pad)?)?;
                }
            }
            info!(
                "wrote {} ({} tiles, {})",
                output.display(),
                layout.total_tiles,
                layout.orientation_label()
            );
            println!("{}", to_json(&Summary::from(&layout), false)?);
        }
    }
    Ok(())
}
