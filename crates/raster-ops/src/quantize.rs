//! Quantizer and ditherer contracts.
//!
//! Operations that can reduce colors accept an optional [`Quantizer`] and
//! [`Ditherer`]. Before touching pixels they create one session of each,
//! against the region that will be written:
//!
//! - [`QuantizingSession::quantized_color`] maps a color onto the palette
//! - [`DitheringSession::dithered_color`] perturbs a color depending on its
//!   position, then quantizes it
//!
//! Sessions are shared by worker threads unless
//! [`DitheringSession::is_sequential`] asks for row-ordered processing.
//!
//! Quantizers whose palette depends on the image content
//! ([`Quantizer::initialize_relies_on_content`]) can only be initialized
//! once the final pixels exist; resizing handles them by producing the
//! result in a temporary bitmap first.
//!
//! # Provided implementations
//!
//! - [`PredefinedColorsQuantizer`] - fixed palette, nearest color
//! - [`OrderedDitherer`] - Bayer matrix dithering
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Bitmap, Color32, PixelFormat};
//! use raster_ops::context::Context;
//! use raster_ops::quantize::{PredefinedColorsQuantizer, Quantizer};
//!
//! let bmp = Bitmap::new(4, 4, PixelFormat::Argb32).unwrap();
//! let session = PredefinedColorsQuantizer::black_and_white()
//!     .initialize(&bmp, bmp.bounds(), &Context::new())
//!     .unwrap();
//! assert_eq!(session.quantized_color(Color32::from_gray(200)), Color32::WHITE);
//! ```

use crate::context::Context;
use crate::{OpsError, OpsResult};
use raster_core::{Bitmap, Color32, ColorF, Rect, WorkingColorSpace};
use std::sync::Arc;

/// Palette lookup created by a [`Quantizer`] for one operation.
pub trait QuantizingSession: Send + Sync {
    /// Returns the palette color representing `color`.
    fn quantized_color(&self, color: Color32) -> Color32;

    /// Colors with alpha below this value are considered transparent.
    fn alpha_threshold(&self) -> u8;

    /// Color space in which the session prefers blending to happen.
    fn working_color_space(&self) -> WorkingColorSpace {
        WorkingColorSpace::Default
    }

    /// The palette, if the session has a fixed one.
    fn palette(&self) -> Option<&[Color32]> {
        None
    }
}

/// Creates [`QuantizingSession`]s.
pub trait Quantizer: Send + Sync {
    /// `true` if the palette is computed from the pixels of `source`, so
    /// the session can only be created after the final colors exist.
    fn initialize_relies_on_content(&self) -> bool {
        false
    }

    /// Creates a session for `area` of `source`.
    fn initialize(
        &self,
        source: &Bitmap,
        area: Rect,
        context: &Context,
    ) -> OpsResult<Arc<dyn QuantizingSession>>;
}

/// Position-dependent color perturbation created by a [`Ditherer`].
pub trait DitheringSession: Send + Sync {
    /// Returns the dithered and quantized color of pixel (x, y).
    fn dithered_color(&self, color: Color32, x: u32, y: u32) -> Color32;

    /// `true` if pixels must be visited row by row in order (error
    /// diffusion); forces sequential processing.
    fn is_sequential(&self) -> bool {
        false
    }
}

/// Creates [`DitheringSession`]s.
pub trait Ditherer: Send + Sync {
    /// Creates a session for `area` of `source`, quantizing through
    /// `quantizer`.
    fn initialize(
        &self,
        source: &Bitmap,
        area: Rect,
        quantizer: Arc<dyn QuantizingSession>,
        context: &Context,
    ) -> OpsResult<Box<dyn DitheringSession>>;
}

/// Quantizer with a fixed palette.
///
/// Colors with alpha below the threshold map to the palette's transparent
/// entry (or transparent black if it has none). Other translucent colors are
/// blended over the back color first, then the nearest palette entry by
/// RGB distance is returned.
#[derive(Debug, Clone)]
pub struct PredefinedColorsQuantizer {
    palette: Vec<Color32>,
    back_color: Color32,
    alpha_threshold: u8,
    working_color_space: WorkingColorSpace,
}

impl PredefinedColorsQuantizer {
    /// Creates a quantizer from an explicit palette.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for an empty palette.
    pub fn from_palette(palette: Vec<Color32>) -> OpsResult<Self> {
        if palette.is_empty() {
            return Err(OpsError::InvalidParameter("palette must not be empty".into()));
        }
        Ok(Self {
            palette,
            back_color: Color32::BLACK,
            alpha_threshold: 128,
            working_color_space: WorkingColorSpace::Default,
        })
    }

    /// Black and white palette.
    pub fn black_and_white() -> Self {
        Self {
            palette: vec![Color32::BLACK, Color32::WHITE],
            back_color: Color32::BLACK,
            alpha_threshold: 128,
            working_color_space: WorkingColorSpace::Default,
        }
    }

    /// Four evenly spaced gray levels.
    pub fn grayscale4() -> Self {
        Self {
            palette: [0, 85, 170, 255].map(Color32::from_gray).to_vec(),
            ..Self::black_and_white()
        }
    }

    /// Sets the color translucent pixels are blended over.
    pub fn with_back_color(mut self, color: Color32) -> Self {
        self.back_color = color.with_alpha(255);
        self
    }

    /// Sets the alpha threshold.
    pub fn with_alpha_threshold(mut self, threshold: u8) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    /// Sets the preferred working color space.
    pub fn with_working_color_space(mut self, space: WorkingColorSpace) -> Self {
        self.working_color_space = space;
        self
    }
}

impl Quantizer for PredefinedColorsQuantizer {
    fn initialize(
        &self,
        _source: &Bitmap,
        _area: Rect,
        _context: &Context,
    ) -> OpsResult<Arc<dyn QuantizingSession>> {
        Ok(Arc::new(PaletteSession {
            transparent: self.palette.iter().copied().find(|c| c.a == 0),
            palette: self.palette.clone(),
            back_color: self.back_color,
            alpha_threshold: self.alpha_threshold,
            working_color_space: self.working_color_space,
        }))
    }
}

struct PaletteSession {
    palette: Vec<Color32>,
    transparent: Option<Color32>,
    back_color: Color32,
    alpha_threshold: u8,
    working_color_space: WorkingColorSpace,
}

impl PaletteSession {
    fn nearest(&self, c: Color32) -> Color32 {
        let distance = |p: &Color32| {
            let dr = p.r as i32 - c.r as i32;
            let dg = p.g as i32 - c.g as i32;
            let db = p.b as i32 - c.b as i32;
            dr * dr + dg * dg + db * db
        };
        self.palette
            .iter()
            .filter(|p| p.a != 0)
            .min_by_key(|p| distance(p))
            .copied()
            .unwrap_or(c)
    }
}

impl QuantizingSession for PaletteSession {
    fn quantized_color(&self, color: Color32) -> Color32 {
        if color.a < self.alpha_threshold {
            return self.transparent.unwrap_or(Color32::TRANSPARENT);
        }
        let opaque = if color.a == 255 {
            color
        } else {
            let linear = self.working_color_space == WorkingColorSpace::Linear;
            let fg = ColorF::from_color32(color, linear);
            let bg = ColorF::from_color32(self.back_color, linear);
            let a = fg.a;
            ColorF::new(
                fg.r * a + bg.r * (1.0 - a),
                fg.g * a + bg.g * (1.0 - a),
                fg.b * a + bg.b * (1.0 - a),
                1.0,
            )
            .to_color32(linear)
        };
        self.nearest(opaque)
    }

    fn alpha_threshold(&self) -> u8 {
        self.alpha_threshold
    }

    fn working_color_space(&self) -> WorkingColorSpace {
        self.working_color_space
    }

    fn palette(&self) -> Option<&[Color32]> {
        Some(&self.palette)
    }
}

/// Size of the Bayer threshold matrix of an [`OrderedDitherer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BayerMatrix {
    /// 2x2 matrix.
    Bayer2x2,
    /// 4x4 matrix.
    Bayer4x4,
    /// 8x8 matrix.
    #[default]
    Bayer8x8,
}

impl BayerMatrix {
    fn size(self) -> u32 {
        match self {
            Self::Bayer2x2 => 2,
            Self::Bayer4x4 => 4,
            Self::Bayer8x8 => 8,
        }
    }

    /// Normalized thresholds in (-0.5, 0.5), row-major.
    fn thresholds(self) -> Vec<f32> {
        let n = self.size();
        let count = (n * n) as f32;
        (0..n * n)
            .map(|i| (bayer_index(i % n, i / n, n) as f32 + 0.5) / count - 0.5)
            .collect()
    }
}

/// Recursive Bayer index of (x, y) in an `n`x`n` matrix.
fn bayer_index(x: u32, y: u32, n: u32) -> u32 {
    if n == 1 {
        return 0;
    }
    let half = n / 2;
    let quadrant = match (x >= half, y >= half) {
        (false, false) => 0,
        (true, true) => 1,
        (true, false) => 2,
        (false, true) => 3,
    };
    4 * bayer_index(x % half, y % half, half) + quadrant
}

/// Ordered (Bayer matrix) ditherer. Position dependent only, so its
/// sessions can be used from any number of threads.
#[derive(Debug, Clone)]
pub struct OrderedDitherer {
    matrix: BayerMatrix,
    strength: Option<f32>,
}

impl OrderedDitherer {
    /// Creates a ditherer with automatic strength.
    pub fn new(matrix: BayerMatrix) -> Self {
        Self {
            matrix,
            strength: None,
        }
    }

    /// Sets the strength in [0, 1]; `1.0` spreads thresholds over the full
    /// channel range.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = Some(strength.clamp(0.0, 1.0));
        self
    }
}

impl Default for OrderedDitherer {
    fn default() -> Self {
        Self::new(BayerMatrix::default())
    }
}

impl Ditherer for OrderedDitherer {
    fn initialize(
        &self,
        _source: &Bitmap,
        _area: Rect,
        quantizer: Arc<dyn QuantizingSession>,
        _context: &Context,
    ) -> OpsResult<Box<dyn DitheringSession>> {
        // automatic strength: the average gap between palette levels per channel
        let strength = self.strength.unwrap_or_else(|| {
            let colors = quantizer.palette().map_or(256, <[Color32]>::len).max(2);
            let levels = (colors as f32).cbrt().max(2.0);
            1.0 / (levels - 1.0)
        });
        Ok(Box::new(OrderedSession {
            thresholds: self.matrix.thresholds(),
            size: self.matrix.size(),
            strength: strength * 255.0,
            quantizer,
        }))
    }
}

struct OrderedSession {
    thresholds: Vec<f32>,
    size: u32,
    strength: f32,
    quantizer: Arc<dyn QuantizingSession>,
}

impl DitheringSession for OrderedSession {
    fn dithered_color(&self, color: Color32, x: u32, y: u32) -> Color32 {
        if color.a < self.quantizer.alpha_threshold() {
            return self.quantizer.quantized_color(color);
        }
        let t = self.thresholds[((y % self.size) * self.size + x % self.size) as usize];
        let offset = t * self.strength;
        let shift = |c: u8| (c as f32 + offset).round().clamp(0.0, 255.0) as u8;
        let perturbed = Color32::new(shift(color.r), shift(color.g), shift(color.b), color.a);
        self.quantizer.quantized_color(perturbed)
    }
}
