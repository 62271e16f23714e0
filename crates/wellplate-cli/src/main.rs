//! wellplate CLI - unattended segmentation of plate photographs.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use wellplate_core::{Box, ImageFormat};
use wellplate_grid::{
    CalibratedGeometry, NoPreview, PlateLayout, PlatePreset, SegmentOptions, SegmentationReport,
    ValidationVerdict, WellOrder, segment_plate,
};
use wellplate_io::tiff::TiffCompression;

type CliError = std::boxed::Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "wellplate")]
#[command(about = "Split photographs of multi-well culture plates into per-well images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment one plate image into wells.
    Segment(SegmentArgs),

    /// Print the plate preset table.
    Presets,
}

#[derive(Debug, Clone, Args)]
struct SegmentArgs {
    /// Path to the plate image (PNG, JPEG, PNM or TIFF).
    #[arg(long)]
    image: PathBuf,

    /// Directory for the output images.
    #[arg(long)]
    out_dir: PathBuf,

    /// Plate selection: 1 = 6-well, 2 = 12-well, 3 = 24-well, 4 = custom, 0 = abort.
    #[arg(long, default_value = "2")]
    plate: u32,

    /// Number of well columns; with --rows, replaces the preset's counts.
    #[arg(long, default_value = "0")]
    cols: u32,

    /// Number of well rows; with --cols, replaces the preset's counts.
    #[arg(long, default_value = "0")]
    rows: u32,

    /// Wall thickness ratio k2 (custom plates).
    #[arg(long)]
    thickness: Option<f64>,

    /// Well spacing ratio k3 (custom plates).
    #[arg(long)]
    spacing: Option<f64>,

    /// Well diameter reduction in percent [default: 5, or 15 for --plate 4].
    #[arg(long)]
    reduction: Option<f64>,

    /// JSON plate layout; replaces --plate and the ratio options.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Plate region within the image as x,y,w,h.
    #[arg(long, value_parser = parse_roi)]
    roi: Option<Box>,

    /// Number wells column by column instead of row by row.
    #[arg(long)]
    column_major: bool,

    /// Also write the well mask.
    #[arg(long)]
    save_mask: bool,

    /// Path to write a JSON summary of the fitted grid.
    #[arg(long)]
    report: Option<PathBuf>,
}

impl SegmentArgs {
    /// Resolve the plate layout from a layout file or the preset options.
    fn to_layout(&self) -> CliResult<PlateLayout> {
        let mut layout = match &self.layout {
            Some(path) => PlateLayout::from_json_file(path)?,
            None => PlatePreset::from_selection(self.plate)?.layout(),
        };
        if let (Some(k2), Some(k3)) = (self.thickness, self.spacing) {
            layout = layout.with_ratios(k2, k3);
        } else if self.thickness.is_some() || self.spacing.is_some() {
            return Err("--thickness and --spacing must be given together".into());
        }
        if let Some(e) = self.reduction {
            layout = layout.with_reduction(e);
        }
        let layout = layout.with_counts(self.cols, self.rows);
        layout.validate()?;
        Ok(layout)
    }

    fn to_options(&self) -> SegmentOptions {
        let order = if self.column_major {
            WellOrder::ColumnMajor
        } else {
            WellOrder::RowMajor
        };
        SegmentOptions {
            order,
            interactive: false,
            roi: self.roi,
        }
    }
}

fn parse_roi(s: &str) -> Result<Box, String> {
    s.parse::<Box>().map_err(|e| e.to_string())
}

/// JSON summary of a segmentation run
#[derive(Serialize)]
struct ReportFile<'a> {
    image: String,
    layout: &'a PlateLayout,
    region: [i32; 4],
    geometry: &'a CalibratedGeometry,
    verdict: &'a ValidationVerdict,
    order: WellOrder,
    wells: Vec<WellEntry>,
}

#[derive(Serialize)]
struct WellEntry {
    index: u32,
    col: u32,
    row: u32,
    region: [i32; 4],
}

fn box_array(b: &Box) -> [i32; 4] {
    [b.x, b.y, b.w, b.h]
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Segment(args) => run_segment(&args),
        Commands::Presets => run_presets(),
    }
}

fn run_presets() -> CliResult<()> {
    println!("{:<4} {:<8} {:>10} {:>10} {:>5} {:>5}", "sel", "plate", "k2", "k3", "cols", "rows");
    for preset in PlatePreset::ALL {
        let (k2, k3) = preset.ratios();
        let (cols, rows) = preset.counts();
        println!(
            "{:<4} {:<8} {:>10.5} {:>10.5} {:>5} {:>5}",
            preset.selection(),
            preset.name(),
            k2,
            k3,
            cols,
            rows
        );
    }
    println!("0    abort");
    Ok(())
}

fn run_segment(args: &SegmentArgs) -> CliResult<()> {
    let layout = args.to_layout()?;
    tracing::info!("Loading image: {}", args.image.display());
    let pix = wellplate_io::read_image(&args.image)?;
    tracing::info!("Image size: {}x{}", pix.width(), pix.height());

    let report = segment_plate(&pix, &layout, &args.to_options(), &mut NoPreview)?;

    // Everything is encoded before the first file is created
    let name = file_stem(&args.image);
    let mut files = encode_outputs(&report, &args.out_dir, &name, args.save_mask)?;
    if let Some(path) = &args.report {
        let summary = ReportFile {
            image: args.image.display().to_string(),
            layout: &layout,
            region: box_array(&report.region),
            geometry: &report.geometry,
            verdict: &report.verdict,
            order: report.wells.order(),
            wells: report
                .wells
                .iter()
                .map(|w| WellEntry {
                    index: w.index,
                    col: w.col,
                    row: w.row,
                    region: box_array(&w.region),
                })
                .collect(),
        };
        files.push((path.clone(), serde_json::to_string_pretty(&summary)?.into_bytes()));
    }

    std::fs::create_dir_all(&args.out_dir)?;
    for (path, data) in &files {
        std::fs::write(path, data)?;
        tracing::info!("Wrote {}", path.display());
    }
    tracing::info!("{} wells segmented", report.wells.len());

    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plate".to_string())
}

/// Encode the well stack, the identified-wells preview and optionally the
/// mask, paired with their paths under `out_dir`.
fn encode_outputs(
    report: &SegmentationReport,
    out_dir: &Path,
    name: &str,
    save_mask: bool,
) -> CliResult<Vec<(PathBuf, Vec<u8>)>> {
    let mut files = vec![
        (
            out_dir.join(format!("wells_{name}.tif")),
            wellplate_io::write_pixa_tiff_mem(&report.wells.to_pixa(), TiffCompression::Lzw)?,
        ),
        (
            out_dir.join(format!("identified_wells_{name}.png")),
            wellplate_io::write_image_mem(&report.identified, ImageFormat::Png)?,
        ),
    ];
    if save_mask {
        files.push((
            out_dir.join(format!("templates_{name}.png")),
            wellplate_io::write_image_mem(&report.mask, ImageFormat::Png)?,
        ));
    }
    Ok(files)
}
