//! Detector image synthesis from a catalog and a sensor model

use log::{debug, info, warn};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{thread_rng, RngCore, SeedableRng};
use shared::algo::chunk_seed;
use shared::image_proc::noise::{
    apply_poisson_photon_noise, generate_background_field, jittered_background_field,
    shared_background_scalar, BackgroundRates,
};
use shared::image_size::PixelShape;
use starfield::{CatalogProvider, CatalogQuery, CatalogSource, Equatorial};

use super::psf::GaussianPsf;
use crate::hardware::SensorParams;
use crate::photometry::Photometry;
use crate::wcs::{AffineParameters, AffineTransform, Wcs};
use crate::{DetectorImage, Result, SimulationError};

/// Independent random streams drawn from one render seed
const BACKGROUND_STREAM: usize = 0;
const JITTER_STREAM: usize = 1;
const SHOT_NOISE_STREAM: usize = 2;

/// How the background floor is composed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundModel {
    /// Independent dark, read and sky draws for every pixel
    PerPixel,
    /// One dark + read + sky scalar for the whole frame, scaled per pixel by
    /// uniform jitter in [0, 1)
    SharedScalar,
}

/// Knobs for a single render call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub background: BackgroundModel,
    /// Apply Poisson statistics to the rendered source electrons
    pub source_shot_noise: bool,
    /// Stamp half-width in PSF sigmas
    pub stamp_sigmas: f64,
    /// Off-frame distance in pixels at which sources are still stamped.
    /// Defaults to the stamp radius.
    pub margin_px: Option<f64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: BackgroundModel::PerPixel,
            source_shot_noise: true,
            stamp_sigmas: 3.0,
            margin_px: None,
        }
    }
}

impl RenderOptions {
    /// Shared-scalar background and noiseless source stamps
    pub fn legacy() -> Self {
        Self {
            background: BackgroundModel::SharedScalar,
            source_shot_noise: false,
            ..Self::default()
        }
    }
}

/// A catalog source placed on the detector
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInFrame {
    pub x: f64,
    pub y: f64,
    /// Expected electrons before shot noise
    pub electrons: f64,
    pub source: CatalogSource,
}

#[derive(Debug, Clone)]
pub struct RenderingResult {
    /// Final counts in [0, max_adu]
    pub detector_image: DetectorImage,

    /// Background floor in electrons (dark + read + sky)
    pub background_electrons: Array2<f64>,

    /// Source contribution in electrons
    pub source_electrons: Array2<f64>,

    /// Sources that landed on (or near) the frame, faintest first
    pub rendered_sources: Vec<SourceInFrame>,

    /// Sources outside the frame plus margin
    pub skipped_out_of_bounds: usize,

    /// Sources on or behind the tangent plane
    pub skipped_degenerate: usize,

    /// Sources with no positive expected flux
    pub skipped_no_flux: usize,
}

impl RenderingResult {
    /// Total electrons per pixel before quantization
    pub fn electron_image(&self) -> Array2<f64> {
        &self.background_electrons + &self.source_electrons
    }

    pub fn skipped_sources(&self) -> usize {
        self.skipped_out_of_bounds + self.skipped_degenerate + self.skipped_no_flux
    }
}

#[derive(Debug, Default)]
struct SkipCounts {
    out_of_bounds: usize,
    degenerate: usize,
    no_flux: usize,
}

/// Validated field definition: pointing, sensor and frame size
///
/// Built once with [`SimulatedSkyImage::new`], which rejects bad parameters
/// before any rendering work. Immutable afterwards.
#[derive(Debug, Clone)]
pub struct SimulatedSkyImage {
    wcs: Wcs,
    sensor: SensorParams,
    shape: PixelShape,
    pixel_scale_deg: (f64, f64),
    psf: GaussianPsf,
}

impl SimulatedSkyImage {
    /// Build a field centered on `pointing`
    ///
    /// The reference pixel is `(width / 2, height / 2)`. RA increases to the
    /// left (east) and Dec increases with row index, rotated by
    /// `position_angle_deg`.
    pub fn new(
        pointing: Equatorial,
        sensor: SensorParams,
        width: usize,
        height: usize,
        position_angle_deg: f64,
    ) -> Result<Self> {
        let shape = PixelShape::new(width, height);
        if !shape.is_valid() {
            return Err(SimulationError::InvalidConfiguration(format!(
                "image dimensions must be positive, got {shape}"
            )));
        }
        if !position_angle_deg.is_finite() {
            return Err(SimulationError::InvalidConfiguration(format!(
                "position angle must be finite, got {position_angle_deg}"
            )));
        }
        sensor.validate()?;

        let pixel_scale_deg = sensor.pixel_scale_deg();
        let transform = AffineTransform::new(AffineParameters::from_cdelt_crota(
            -pixel_scale_deg.0,
            pixel_scale_deg.1,
            position_angle_deg,
        ))?;
        let wcs = Wcs::tan(shape.center(), pointing, transform)?;

        let (fwhm_x, fwhm_y) = sensor.seeing_fwhm_pixels();
        let psf = GaussianPsf::from_fwhm((fwhm_x * fwhm_y).sqrt()).ok_or_else(|| {
            SimulationError::InvalidConfiguration(format!(
                "seeing FWHM of {fwhm_x}x{fwhm_y} pixels is not usable"
            ))
        })?;

        Ok(Self {
            wcs,
            sensor,
            shape,
            pixel_scale_deg,
            psf,
        })
    }

    pub fn wcs(&self) -> &Wcs {
        &self.wcs
    }

    pub fn sensor(&self) -> &SensorParams {
        &self.sensor
    }

    pub fn shape(&self) -> PixelShape {
        self.shape
    }

    /// Degrees per output pixel (x, y)
    pub fn pixel_scale(&self) -> (f64, f64) {
        self.pixel_scale_deg
    }

    pub fn psf(&self) -> &GaussianPsf {
        &self.psf
    }

    pub fn pointing(&self) -> Equatorial {
        self.wcs.reference()
    }

    /// Half of the field diagonal in degrees, for catalog cone searches
    pub fn field_radius_deg(&self) -> f64 {
        let w = self.shape.width as f64 * self.pixel_scale_deg.0;
        let h = self.shape.height as f64 * self.pixel_scale_deg.1;
        0.5 * w.hypot(h)
    }

    /// Cone radius in degrees that reaches every source the renderer keeps
    ///
    /// Covers the frame corners plus the off-frame margin, capped at 90.
    pub fn search_radius_deg(&self, options: &RenderOptions) -> f64 {
        let reach = 0.5 + self.margin_px(options);
        let half_w = 0.5 * self.shape.width as f64 + reach;
        let half_h = 0.5 * self.shape.height as f64 + reach;
        let scale = self.pixel_scale_deg.0.max(self.pixel_scale_deg.1);
        (half_w.hypot(half_h) * scale).min(90.0)
    }

    fn stamp_radius(&self, options: &RenderOptions) -> f64 {
        self.psf.stamp_radius(options.stamp_sigmas.max(0.0))
    }

    fn margin_px(&self, options: &RenderOptions) -> f64 {
        options
            .margin_px
            .unwrap_or_else(|| self.stamp_radius(options))
            .max(0.0)
    }

    /// Per-pixel background levels over one exposure
    pub fn background_rates(&self) -> BackgroundRates {
        let exposure = self.sensor.exposure_s;
        BackgroundRates {
            dark_electrons: self.sensor.dark_current_e_per_s * exposure,
            sky_electrons: self.sensor.sky_electrons_per_pixel_per_s() * exposure,
            read_noise_e: self.sensor.read_noise_e,
        }
    }

    /// Render the field
    ///
    /// # Arguments
    /// * `sources` - Catalog sources, read only
    /// * `photometry` - Magnitude to electron conversion
    /// * `options` - Background model, shot noise and stamp settings
    /// * `rng_seed` - Fixed seed for reproducible output, or `None`
    ///
    /// Individual sources that cannot be placed are skipped and counted, never
    /// failing the render.
    pub fn render(
        &self,
        sources: &[CatalogSource],
        photometry: &dyn Photometry,
        options: &RenderOptions,
        rng_seed: Option<u64>,
    ) -> RenderingResult {
        let seed = rng_seed.unwrap_or_else(|| thread_rng().next_u64());
        let (width, height) = (self.shape.width, self.shape.height);

        let rates = self.background_rates();
        let background_electrons = match options.background {
            BackgroundModel::PerPixel => generate_background_field(
                width,
                height,
                &rates,
                Some(chunk_seed(seed, BACKGROUND_STREAM)),
            ),
            BackgroundModel::SharedScalar => {
                let mut rng = StdRng::seed_from_u64(chunk_seed(seed, BACKGROUND_STREAM));
                let scalar = shared_background_scalar(&mut rng, &rates);
                debug!("Shared background scalar: {scalar:.3} e-");
                let jitter_seed = Some(chunk_seed(seed, JITTER_STREAM));
                jittered_background_field(width, height, scalar, jitter_seed)
            }
        };

        let stamp_radius = self.stamp_radius(options);
        let margin = self.margin_px(options);

        let (rendered_sources, skipped) = self.place_sources(sources, photometry, margin);

        let mut source_mean = Array2::<f64>::zeros(self.shape.ndarray_dim());
        for placed in &rendered_sources {
            self.stamp(&mut source_mean, placed, stamp_radius);
        }

        let source_electrons = if options.source_shot_noise {
            apply_poisson_photon_noise(&source_mean, Some(chunk_seed(seed, SHOT_NOISE_STREAM)))
        } else {
            source_mean
        };

        let mut result = RenderingResult {
            detector_image: DetectorImage::zeros(self.shape.ndarray_dim()),
            background_electrons,
            source_electrons,
            rendered_sources,
            skipped_out_of_bounds: skipped.out_of_bounds,
            skipped_degenerate: skipped.degenerate,
            skipped_no_flux: skipped.no_flux,
        };
        result.detector_image = quantize_image(&result.electron_image(), &self.sensor);

        info!(
            "Rendered {} sources on {} frame ({} skipped)",
            result.rendered_sources.len(),
            self.shape,
            result.skipped_sources()
        );
        result
    }

    /// Query a catalog for the field and render it
    ///
    /// The cone is [`Self::search_radius_deg`], so sources in the off-frame
    /// margin are fetched as well. Bad query parameters are
    /// [`SimulationError::InvalidConfiguration`]. Catalog failures are
    /// returned unchanged as [`SimulationError::Catalog`]; an empty answer is
    /// rendered as a background-only frame with a warning.
    pub fn render_from_catalog(
        &self,
        catalog: &dyn CatalogProvider,
        max_sources: usize,
        faint_limit_mag: f64,
        photometry: &dyn Photometry,
        options: &RenderOptions,
        rng_seed: Option<u64>,
    ) -> Result<RenderingResult> {
        let radius = self.search_radius_deg(options);
        let query = CatalogQuery::new(self.pointing(), radius, max_sources, faint_limit_mag)
            .map_err(|e| {
                SimulationError::InvalidConfiguration(format!("catalog query: {e}"))
            })?;
        let sources = catalog.query(&query)?;
        if sources.is_empty() {
            warn!(
                "Catalog returned no sources within {radius:.4} deg of {}",
                self.pointing()
            );
        } else {
            debug!("Catalog returned {} sources", sources.len());
        }
        Ok(self.render(&sources, photometry, options, rng_seed))
    }

    /// Project, screen and sort sources
    fn place_sources(
        &self,
        sources: &[CatalogSource],
        photometry: &dyn Photometry,
        margin: f64,
    ) -> (Vec<SourceInFrame>, SkipCounts) {
        let area = self.sensor.aperture_area_m2();
        let mut placed = Vec::with_capacity(sources.len());
        let mut counts = SkipCounts::default();

        for source in sources {
            let (x, y) = match self.wcs.equatorial_to_pixel(&source.position) {
                Ok(xy) => xy,
                Err(e) => {
                    debug!("Skipping source at {}: {e}", source.position);
                    counts.degenerate += 1;
                    continue;
                }
            };

            // Pixel i spans [i - 0.5, i + 0.5)
            if !self.shape.contains_with_margin(x + 0.5, y + 0.5, margin) {
                counts.out_of_bounds += 1;
                continue;
            }

            let electrons = photometry.electrons(
                source.magnitude,
                area,
                self.sensor.quantum_efficiency,
                self.sensor.exposure_s,
            );
            if !(electrons > 0.0) {
                debug!("Skipping source at {} with no flux", source.position);
                counts.no_flux += 1;
                continue;
            }

            placed.push(SourceInFrame {
                x,
                y,
                electrons,
                source: source.clone(),
            });
        }

        // Sort by flux for consistent rendering (float addition isn't associative)
        placed.sort_by(|a, b| a.electrons.total_cmp(&b.electrons));
        (placed, counts)
    }

    /// Accumulate one source's pixel-integrated PSF over its stamp window
    fn stamp(&self, image: &mut Array2<f64>, placed: &SourceInFrame, radius: f64) {
        let max_col = self.shape.width as i64 - 1;
        let max_row = self.shape.height as i64 - 1;
        let col_lo = ((placed.x - radius).floor() as i64).max(0);
        let col_hi = ((placed.x + radius).ceil() as i64).min(max_col);
        let row_lo = ((placed.y - radius).floor() as i64).max(0);
        let row_hi = ((placed.y + radius).ceil() as i64).min(max_row);

        for row in row_lo..=row_hi {
            let dy = row as f64 - placed.y;
            for col in col_lo..=col_hi {
                let dx = col as f64 - placed.x;
                image[[row as usize, col as usize]] +=
                    placed.electrons * self.psf.pixel_fraction(dx, dy);
            }
        }
    }
}

/// Convert electrons to ADU: `round(clamp(e / gain + bias, 0, max_adu))`
pub fn quantize_image(electron_img: &Array2<f64>, sensor: &SensorParams) -> DetectorImage {
    let max_adu = sensor.max_adu as f64;
    electron_img.mapv(|electrons| {
        let adu = electrons / sensor.gain_e_per_adu + sensor.bias_offset_adu;
        // NaN maps to 0 through the saturating cast
        adu.clamp(0.0, max_adu).round() as u16
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::models;
    use crate::photometry::ZeroPointPhotometry;
    use approx::assert_relative_eq;
    use starfield::catalogs::StaticCatalog;

    fn quiet_sensor() -> SensorParams {
        SensorParams {
            read_noise_e: 0.0,
            dark_current_e_per_s: 0.0,
            sky_background_e_per_m2_arcsec2_s: 0.0,
            bias_offset_adu: 0.0,
            gain_e_per_adu: 10.0,
            ..models::SCT8_KAF8300.clone()
        }
    }

    fn field(width: usize, height: usize, sensor: SensorParams) -> SimulatedSkyImage {
        let pointing = Equatorial::new(150.0, 20.0).unwrap();
        SimulatedSkyImage::new(pointing, sensor, width, height, 0.0).unwrap()
    }

    fn quiet_options() -> RenderOptions {
        RenderOptions {
            source_shot_noise: false,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_center_source_is_brightest_pixel() {
        let sky = field(4, 4, quiet_sensor());
        let phot = ZeroPointPhotometry::default();
        let sources = vec![CatalogSource::new(sky.pointing(), 10.0)];
        let result = sky.render(&sources, &phot, &quiet_options(), Some(7));

        assert_eq!(result.rendered_sources.len(), 1);
        let center = result.detector_image[[2, 2]];
        assert!(center > 0);
        for ((row, col), &value) in result.detector_image.indexed_iter() {
            if (row, col) != (2, 2) {
                assert!(
                    value < center,
                    "pixel ({row}, {col}) = {value} >= center {center}"
                );
            }
        }
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let sky = field(32, 24, models::SCT8_KAF8300.clone());
        let sources = vec![
            CatalogSource::new(sky.pointing(), 9.0),
            CatalogSource::new(sky.wcs().pixel_to_equatorial(5.0, 7.0), 11.0),
        ];
        let phot = ZeroPointPhotometry::default();
        for options in [RenderOptions::default(), RenderOptions::legacy()] {
            let a = sky.render(&sources, &phot, &options, Some(1234));
            let b = sky.render(&sources, &phot, &options, Some(1234));
            assert_eq!(a.detector_image, b.detector_image);
            assert_eq!(a.background_electrons, b.background_electrons);
        }
    }

    #[test]
    fn test_counts_stay_in_range() {
        let sensor = SensorParams {
            max_adu: 4095,
            bias_offset_adu: 0.0,
            read_noise_e: 50.0,
            ..models::SCT8_KAF8300.clone()
        };
        let sky = field(40, 40, sensor);
        let phot = ZeroPointPhotometry::default();
        let sources = vec![CatalogSource::new(sky.pointing(), -2.0)];
        for seed in 0..5 {
            let result = sky.render(&sources, &phot, &RenderOptions::default(), Some(seed));
            assert!(result.detector_image.iter().all(|&v| v <= 4095));
            // Saturated core and read-noise clipped floor both reached
            assert!(result.detector_image.iter().any(|&v| v == 4095));
            assert!(result.detector_image.iter().any(|&v| v == 0));
        }
    }

    #[test]
    fn test_flux_conservation() {
        let sky = field(64, 64, quiet_sensor());
        let position = sky.wcs().pixel_to_equatorial(31.3, 30.8);
        let sources = vec![CatalogSource::new(position, 12.0)];
        let options = RenderOptions {
            stamp_sigmas: 8.0,
            ..quiet_options()
        };
        let result = sky.render(&sources, &ZeroPointPhotometry::default(), &options, Some(3));
        let expected = result.rendered_sources[0].electrons;
        assert_relative_eq!(result.source_electrons.sum(), expected, max_relative = 1e-5);
    }

    #[test]
    fn test_sources_skipped_not_fatal() {
        let sky = field(16, 16, quiet_sensor());
        let pointing = sky.pointing();
        let off_frame = Equatorial::new(pointing.ra_deg, pointing.dec_deg + 1.0).unwrap();
        let antipode = Equatorial::new(pointing.ra_deg + 180.0, -pointing.dec_deg).unwrap();
        let sources = vec![
            CatalogSource::new(pointing, 10.0),
            CatalogSource::new(off_frame, 10.0),
            CatalogSource::new(antipode, 10.0),
            CatalogSource::new(pointing, f64::NAN),
        ];
        let phot = ZeroPointPhotometry::default();
        let result = sky.render(&sources, &phot, &quiet_options(), Some(1));
        assert_eq!(result.rendered_sources.len(), 1);
        assert_eq!(result.skipped_out_of_bounds, 1);
        assert_eq!(result.skipped_degenerate, 1);
        assert_eq!(result.skipped_no_flux, 1);
        assert_eq!(result.skipped_sources(), 3);
    }

    #[test]
    fn test_source_in_margin_lights_edge_pixels() {
        let sky = field(16, 16, quiet_sensor());
        // 3 sigma stamp radius is about 5.8 px, so 1.5 px off the left edge is kept
        let position = sky.wcs().pixel_to_equatorial(-1.5, 5.0);
        let sources = vec![CatalogSource::new(position, 8.0)];
        let phot = ZeroPointPhotometry::default();

        let result = sky.render(&sources, &phot, &quiet_options(), Some(4));
        assert_eq!(result.rendered_sources.len(), 1);
        assert_eq!(result.skipped_out_of_bounds, 0);
        let edge = result.source_electrons[[5, 0]];
        assert!(edge > 0.0);
        assert!(edge > result.source_electrons[[5, 1]]);
        assert!(result.detector_image[[5, 0]] > 0);
        // Only the on-frame part of the stamp is deposited
        let expected = result.rendered_sources[0].electrons;
        assert!(result.source_electrons.sum() < expected);

        let no_margin = RenderOptions {
            margin_px: Some(0.0),
            ..quiet_options()
        };
        let clipped = sky.render(&sources, &phot, &no_margin, Some(4));
        assert!(clipped.rendered_sources.is_empty());
        assert_eq!(clipped.skipped_out_of_bounds, 1);
        assert_eq!(clipped.source_electrons.sum(), 0.0);
    }

    #[test]
    fn test_catalog_render_keeps_margin_sources() {
        let sky = field(128, 96, quiet_sensor());
        // Past the frame corner, outside half the field diagonal
        let corner = sky.wcs().pixel_to_equatorial(-2.0, -2.0);
        let separation = sky.pointing().angular_separation_deg(&corner);
        assert!(separation > sky.field_radius_deg());
        let sources = vec![CatalogSource::new(corner, 9.0)];
        let catalog = StaticCatalog::new(sources.clone());
        let phot = ZeroPointPhotometry::default();
        let options = quiet_options();

        let direct = sky.render(&sources, &phot, &options, Some(8));
        let queried = sky
            .render_from_catalog(&catalog, 100, 20.0, &phot, &options, Some(8))
            .unwrap();
        assert_eq!(direct.rendered_sources.len(), 1);
        assert_eq!(queried.rendered_sources.len(), 1);
        assert!(queried.source_electrons[[0, 0]] > 0.0);
        assert_eq!(queried.detector_image, direct.detector_image);
    }

    #[test]
    fn test_search_radius_covers_margin() {
        let sky = field(128, 96, quiet_sensor());
        let (sx, sy) = sky.pixel_scale();
        let scale = sx.max(sy);

        let no_margin = RenderOptions {
            margin_px: Some(0.0),
            ..RenderOptions::default()
        };
        assert_relative_eq!(
            sky.search_radius_deg(&no_margin),
            64.5f64.hypot(48.5) * scale,
            max_relative = 1e-12
        );

        let margin = sky.psf().stamp_radius(3.0);
        let radius = sky.search_radius_deg(&RenderOptions::default());
        assert_relative_eq!(
            radius,
            (64.5 + margin).hypot(48.5 + margin) * scale,
            max_relative = 1e-12
        );
        assert!(radius > sky.field_radius_deg());

        let huge = RenderOptions {
            margin_px: Some(1.0e9),
            ..RenderOptions::default()
        };
        assert_eq!(sky.search_radius_deg(&huge), 90.0);
    }

    #[test]
    fn test_bad_query_is_configuration_error() {
        let sky = field(16, 16, quiet_sensor());
        let catalog = StaticCatalog::new(vec![CatalogSource::new(sky.pointing(), 9.0)]);
        let phot = ZeroPointPhotometry::default();
        let options = quiet_options();

        let err = sky
            .render_from_catalog(&catalog, 0, 20.0, &phot, &options, Some(1))
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfiguration(_)));

        let err = sky
            .render_from_catalog(&catalog, 10, f64::NAN, &phot, &options, Some(1))
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_rendered_sources_sorted_by_flux() {
        let sky = field(32, 32, quiet_sensor());
        let sources = vec![
            CatalogSource::new(sky.wcs().pixel_to_equatorial(10.0, 10.0), 8.0),
            CatalogSource::new(sky.wcs().pixel_to_equatorial(20.0, 20.0), 12.0),
            CatalogSource::new(sky.wcs().pixel_to_equatorial(10.0, 20.0), 10.0),
        ];
        let phot = ZeroPointPhotometry::default();
        let result = sky.render(&sources, &phot, &quiet_options(), Some(1));
        let mags: Vec<f64> = result
            .rendered_sources
            .iter()
            .map(|s| s.source.magnitude)
            .collect();
        assert_eq!(mags, vec![12.0, 10.0, 8.0]);
        assert_relative_eq!(result.rendered_sources[2].x, 10.0, epsilon = 1e-6);
        assert_relative_eq!(result.rendered_sources[2].y, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_background_only_frame() {
        let sensor = SensorParams {
            read_noise_e: 0.0,
            bias_offset_adu: 100.0,
            gain_e_per_adu: 1.0,
            ..models::SCT8_KAF8300.clone()
        };
        let sky = field(64, 64, sensor.clone());
        let rates = sky.background_rates();
        let expected = rates.dark_electrons + rates.sky_electrons;
        let phot = ZeroPointPhotometry::default();

        let result = sky.render(&[], &phot, &RenderOptions::default(), Some(99));
        let mean = result.background_electrons.mean().unwrap();
        assert_relative_eq!(mean, expected, max_relative = 0.05);
        assert!(result.detector_image.iter().all(|&v| v >= 100));

        // Shared scalar model: every pixel is one scalar times a [0, 1) jitter
        let legacy = sky.render(&[], &phot, &RenderOptions::legacy(), Some(99));
        let max = legacy.background_electrons.fold(f64::MIN, |m, &v| m.max(v));
        assert!(legacy
            .background_electrons
            .iter()
            .all(|&v| v >= 0.0 && v <= max));
    }

    #[test]
    fn test_construction_failures() {
        let pointing = Equatorial::new(10.0, 10.0).unwrap();
        let sensor = models::SCT8_KAF8300.clone();
        for (width, height, angle) in [(0, 10, 0.0), (10, 0, 0.0), (10, 10, f64::NAN)] {
            let sky = SimulatedSkyImage::new(pointing, sensor.clone(), width, height, angle);
            assert!(sky.is_err(), "{width}x{height} at {angle}");
        }
        let bad = SensorParams {
            seeing_fwhm_arcsec: 0.0,
            ..sensor
        };
        assert!(matches!(
            SimulatedSkyImage::new(pointing, bad, 10, 10, 0.0),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_field_radius() {
        let sky = field(300, 400, quiet_sensor());
        let (sx, sy) = sky.pixel_scale();
        assert_relative_eq!(sky.field_radius_deg(), 0.5 * (300.0 * sx).hypot(400.0 * sy));
        assert_eq!(sky.wcs().reference_pixel(), (150.0, 200.0));
    }

    #[test]
    fn test_quantize() {
        let sensor = SensorParams {
            gain_e_per_adu: 2.0,
            bias_offset_adu: 10.0,
            max_adu: 1000,
            ..models::SCT8_KAF8300.clone()
        };
        let electrons =
            Array2::from_shape_vec((1, 5), vec![-100.0, 0.0, 5.0, 1e9, f64::NAN]).unwrap();
        let adu = quantize_image(&electrons, &sensor);
        assert_eq!(adu.into_raw_vec(), vec![0, 10, 13, 1000, 0]);
    }
}
