//! Simulated sky image renderer.
//!
//! Queries a star catalog around a pointing, renders a simulated CCD frame
//! for the chosen telescope/sensor, and writes the raw counts plus a
//! zscale-normalized display image as 16-bit PNGs.
//!
//! Usage:
//! ```
//! cargo run --release --bin sky_image_renderer -- --ra 83.82 --dec -5.39 --sensor sct8
//! cargo run --release --bin sky_image_renderer -- --ra 10 --dec 41.27 --config sensor.json --catalog-csv stars.csv --seed 42
//! ```

use clap::Parser;
use log::info;
use shared::algo::ImageStats;
use simulator::hardware::models;
use simulator::image_proc::io::{output_filename, save_u16_png};
use simulator::{
    zscale_normalize, Equatorial, RenderOptions, SensorParams, SimulatedSkyImage,
    ZeroPointPhotometry,
};
use starfield::catalogs::{CatalogProvider, CsvCatalog, TapCatalogClient, GAIA_TAP_URL};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "sky_image_renderer")]
#[command(about = "Render a simulated CCD image of a catalog star field")]
#[command(version)]
struct Args {
    /// Right ascension of the field center in degrees
    #[arg(long, allow_hyphen_values = true)]
    ra: f64,

    /// Declination of the field center in degrees
    #[arg(long, allow_hyphen_values = true)]
    dec: f64,

    /// Image width in pixels
    #[arg(long, default_value_t = 1024)]
    width: usize,

    /// Image height in pixels
    #[arg(long, default_value_t = 1024)]
    height: usize,

    /// Position angle of the detector y axis, degrees east of north
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    position_angle: f64,

    /// Sensor/optics/sky configuration as JSON (overrides --sensor)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Built-in sensor preset (sct8, refractor80)
    #[arg(long, default_value = "sct8")]
    sensor: String,

    /// Override the exposure time in seconds
    #[arg(short, long)]
    exposure: Option<f64>,

    /// Random seed for reproducible noise
    #[arg(long)]
    seed: Option<u64>,

    /// Faintest catalog magnitude to render
    #[arg(long, default_value_t = 16.0)]
    faint_limit: f64,

    /// Maximum number of catalog sources
    #[arg(long, default_value_t = 5000)]
    max_sources: usize,

    /// Read sources from a CSV file (ra, dec, mag columns) instead of TAP
    #[arg(long, value_name = "FILE")]
    catalog_csv: Option<PathBuf>,

    /// TAP service base URL
    #[arg(long, default_value = GAIA_TAP_URL)]
    tap_url: String,

    /// TAP request timeout in seconds
    #[arg(long, default_value_t = 60)]
    tap_timeout: u64,

    /// Shared-scalar background with uniform jitter instead of per-pixel noise
    #[arg(long)]
    legacy_background: bool,

    /// Display window half-width in standard deviations
    #[arg(long, default_value_t = 3.0)]
    zscale_factor: f64,

    /// Directory for output images
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Prefix for output file names
    #[arg(long, default_value = "sky")]
    prefix: String,
}

fn load_sensor(args: &Args) -> Result<SensorParams, Box<dyn std::error::Error>> {
    let sensor = match &args.config {
        Some(path) => SensorParams::from_json_file(path)?,
        None => models::by_name(&args.sensor)
            .ok_or_else(|| format!("unknown sensor preset '{}'", args.sensor))?,
    };
    Ok(match args.exposure {
        Some(exposure_s) => sensor.with_exposure(exposure_s),
        None => sensor,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let pointing = Equatorial::new(args.ra, args.dec)?;
    let sensor = load_sensor(&args)?;
    let sky = SimulatedSkyImage::new(
        pointing,
        sensor,
        args.width,
        args.height,
        args.position_angle,
    )?;

    let (scale_x, scale_y) = sky.sensor().pixel_scale_arcsec();
    println!("Sky Image Renderer");
    println!("==================");
    println!("Pointing: {pointing}");
    println!(
        "Frame: {} px, {:.3}\" x {:.3}\" per pixel",
        sky.shape(),
        scale_x,
        scale_y
    );
    println!("Field radius: {:.4}°", sky.field_radius_deg());
    println!("Exposure: {} s", sky.sensor().exposure_s);
    println!("PSF sigma: {:.3} px", sky.psf().sigma());
    println!();

    let catalog: Box<dyn CatalogProvider> = match &args.catalog_csv {
        Some(path) => {
            info!("Loading catalog from {}", path.display());
            Box::new(CsvCatalog::from_path(path)?)
        }
        None => {
            info!("Querying TAP service at {}", args.tap_url);
            Box::new(
                TapCatalogClient::new(&args.tap_url)
                    .with_timeout(Duration::from_secs(args.tap_timeout)),
            )
        }
    };

    let options = if args.legacy_background {
        RenderOptions::legacy()
    } else {
        RenderOptions::default()
    };

    let result = sky.render_from_catalog(
        catalog.as_ref(),
        args.max_sources,
        args.faint_limit,
        &ZeroPointPhotometry::default(),
        &options,
        args.seed,
    )?;

    let stats = ImageStats::from_array(result.detector_image.view())?;
    let display = zscale_normalize(
        result.detector_image.view(),
        stats.median,
        stats.std_dev,
        args.zscale_factor,
        u16::MAX,
    );

    std::fs::create_dir_all(&args.output_dir)?;
    let stem = output_filename(&args.prefix, &pointing);
    let raw_path = args.output_dir.join(format!("{stem}_raw.png"));
    let display_path = args.output_dir.join(format!("{stem}_display.png"));
    save_u16_png(&result.detector_image, &raw_path)?;
    save_u16_png(&display, &display_path)?;

    println!("Sources rendered: {}", result.rendered_sources.len());
    println!(
        "Sources skipped: {} (off frame {}, degenerate {}, no flux {})",
        result.skipped_sources(),
        result.skipped_out_of_bounds,
        result.skipped_degenerate,
        result.skipped_no_flux
    );
    println!("Median: {:.2} ADU", stats.median);
    println!("Std dev: {:.2} ADU", stats.std_dev);
    println!("Range: {:.0} - {:.0} ADU", stats.min, stats.max);
    println!("Raw image: {}", raw_path.display());
    println!("Display image: {}", display_path.display());

    Ok(())
}
