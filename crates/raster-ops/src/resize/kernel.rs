//! Resampling kernels for one axis.
//!
//! A [`KernelMap`] holds one [`ResizeKernel`] per destination index. Each
//! kernel is a run of weights applied to consecutive source samples
//! starting at its own start index.
//!
//! # Construction
//!
//! Destination index `i` is centred at `(i + 0.5) * ratio - 0.5` in source
//! coordinates, where `ratio = source / destination`. When shrinking, the
//! interpolation function is stretched by `scale = max(1, ratio)` so that
//! every source sample contributes. Weights are evaluated in `f64`,
//! normalized to sum to 1 and stored as `f32`.
//!
//! # Periodic maps
//!
//! Kernel `i` and kernel `i + period` (with
//! `period = lcm(source, destination) / source`) have centers exactly
//! `lcm / destination` source pixels apart, so away from the clipped edges
//! they share their weights. Large maps build the leading edge and one
//! period explicitly, reuse those weights for the middle, and build the
//! trailing edge explicitly:
//!
//! ```text
//! dst: [ corner | period ][ slid ... slid ][ corner ]
//!        explicit           reused weights  explicit
//! ```
//!
//! # Memory Layout
//!
//! All weights live in one arena, `max_diameter` floats per explicitly
//! built kernel. Kernels are `(offset, length, start)` records into it.

use crate::resize::filter::ScalingMode;
use crate::{OpsError, OpsResult};
use raster_core::PColorF;
use tracing::{debug, warn};

/// Values closer than this to an integer are snapped to it before floor
/// and ceiling, so that accumulated rounding does not widen a window.
const SNAP_TOLERANCE: f64 = 1e-4;

#[inline]
fn floor_tolerant(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_TOLERANCE { r } else { v.floor() }
}

#[inline]
fn ceil_tolerant(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_TOLERANCE { r } else { v.ceil() }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Weights of one destination sample.
///
/// Borrowed from a [`KernelMap`]; several kernels may share the same
/// weights with different start indices.
#[derive(Debug, Clone, Copy)]
pub struct ResizeKernel<'a> {
    weights: &'a [f32],
    start: usize,
}

impl<'a> ResizeKernel<'a> {
    /// First source index covered by the kernel.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of source samples covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always `false`: a kernel covers at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// One past the last source index covered.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.weights.len()
    }

    /// The normalized weights.
    #[inline]
    pub fn weights(&self) -> &'a [f32] {
        self.weights
    }

    /// Returns a kernel with the same weights starting at `start`.
    #[inline]
    pub fn slide(&self, start: usize) -> ResizeKernel<'a> {
        ResizeKernel {
            weights: self.weights,
            start,
        }
    }

    /// Convolves `samples`, indexed by source position.
    ///
    /// # Panics
    ///
    /// Panics if `samples` is shorter than [`end`](Self::end).
    #[inline]
    pub fn convolve(&self, samples: &[PColorF]) -> PColorF {
        self.convolve_window(samples, 0)
    }

    /// Convolves a window of samples where `window[k]` holds source
    /// position `top + k`.
    ///
    /// # Panics
    ///
    /// Panics if the kernel reaches outside the window.
    #[inline]
    pub fn convolve_window(&self, window: &[PColorF], top: usize) -> PColorF {
        let from = self.start - top;
        window[from..from + self.weights.len()]
            .iter()
            .zip(self.weights)
            .fold(PColorF::default(), |acc, (&c, &w)| acc + c * w)
    }
}

#[derive(Debug, Clone, Copy)]
struct KernelSlot {
    offset: usize,
    length: usize,
    start: usize,
}

/// How a [`KernelMap`] may be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MapStrategy {
    /// Reuse periodic weights when it pays off.
    Auto,
    /// Reuse periodic weights wherever the layout allows.
    Periodic,
    /// Build every kernel.
    Explicit,
}

/// Kernels of every destination index along one axis.
#[derive(Debug, Clone)]
pub struct KernelMap {
    weights: Vec<f32>,
    kernels: Vec<KernelSlot>,
    source_length: usize,
    max_diameter: usize,
    periodic: bool,
}

impl KernelMap {
    /// Builds the map for resampling `source_length` samples to
    /// `destination_length` samples with the kernel of `mode`.
    ///
    /// # Errors
    ///
    /// - [`OpsError::InvalidDimensions`] if a length is zero
    /// - [`OpsError::InvalidParameter`] if `mode` has no kernel
    ///
    /// # Example
    ///
    /// ```rust
    /// use raster_ops::resize::{KernelMap, ScalingMode};
    ///
    /// let map = KernelMap::new(100, 40, ScalingMode::Lanczos3).unwrap();
    /// assert_eq!(map.len(), 40);
    /// let k = map.kernel(20);
    /// let sum: f32 = k.weights().iter().sum();
    /// assert!((sum - 1.0).abs() < 1e-4);
    /// assert!(k.end() <= 100);
    /// ```
    pub fn new(
        source_length: usize,
        destination_length: usize,
        mode: ScalingMode,
    ) -> OpsResult<Self> {
        let radius = mode.radius().ok_or_else(|| {
            OpsError::InvalidParameter(format!("scaling mode {mode} has no interpolation kernel"))
        })?;
        Self::with_function(source_length, destination_length, radius, |x| mode.weight(x))
    }

    /// Builds the map for an arbitrary interpolation function with support
    /// `radius`.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidDimensions`] if a length is zero, and
    /// [`OpsError::InvalidParameter`] for a non-positive or non-finite
    /// radius.
    pub fn with_function(
        source_length: usize,
        destination_length: usize,
        radius: f64,
        f: impl Fn(f64) -> f64,
    ) -> OpsResult<Self> {
        Self::build(source_length, destination_length, radius, &f, MapStrategy::Auto)
    }

    pub(crate) fn build(
        source_length: usize,
        destination_length: usize,
        radius: f64,
        f: &dyn Fn(f64) -> f64,
        strategy: MapStrategy,
    ) -> OpsResult<Self> {
        if source_length == 0 || destination_length == 0 {
            return Err(OpsError::InvalidDimensions(format!(
                "kernel map lengths must be > 0 (source {source_length}, destination {destination_length})"
            )));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(OpsError::InvalidParameter(format!("invalid kernel radius {radius}")));
        }

        let mut builder = Builder::new(source_length, destination_length, radius, f);
        let divisor = gcd(source_length, destination_length);
        let period = destination_length / divisor;
        let shift = source_length / divisor;
        let corner = builder.corner_interval();

        let periodic = match strategy {
            MapStrategy::Auto => 2 * (corner + period) < destination_length,
            MapStrategy::Periodic => true,
            MapStrategy::Explicit => false,
        };
        debug!(
            source_length,
            destination_length,
            period,
            corner,
            periodic,
            "building kernel map"
        );

        if periodic {
            builder.build_periodic(corner, period, shift);
        } else {
            for i in 0..destination_length {
                builder.push_explicit(i);
            }
        }
        Ok(builder.finish(periodic))
    }

    /// Number of kernels (the destination length).
    #[inline]
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Always `false`: maps are never built for an empty axis.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Length of the source axis.
    #[inline]
    pub fn source_length(&self) -> usize {
        self.source_length
    }

    /// Longest kernel; the minimum number of source rows a sliding window
    /// must hold.
    #[inline]
    pub fn max_diameter(&self) -> usize {
        self.max_diameter
    }

    /// `true` if middle kernels reuse the weights of earlier ones.
    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    /// Kernel of destination index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn kernel(&self, index: usize) -> ResizeKernel<'_> {
        let slot = self.kernels[index];
        ResizeKernel {
            weights: &self.weights[slot.offset..slot.offset + slot.length],
            start: slot.start,
        }
    }

    /// Iterates over all kernels in destination order.
    pub fn iter(&self) -> impl Iterator<Item = ResizeKernel<'_>> + '_ {
        (0..self.len()).map(|i| self.kernel(i))
    }
}

struct Builder<'f> {
    source_length: usize,
    destination_length: usize,
    ratio: f64,
    argument_denominator: f64,
    scaled_radius: f64,
    stride: usize,
    f: &'f dyn Fn(f64) -> f64,
    weights: Vec<f32>,
    kernels: Vec<KernelSlot>,
    max_diameter: usize,
    scratch: Vec<f64>,
}

impl<'f> Builder<'f> {
    fn new(
        source_length: usize,
        destination_length: usize,
        radius: f64,
        f: &'f dyn Fn(f64) -> f64,
    ) -> Self {
        let ratio = source_length as f64 / destination_length as f64;
        let scale = ratio.max(1.0);
        let scaled_radius = ceil_tolerant(scale * radius);
        let stride = (2.0 * scaled_radius) as usize + 2;
        Self {
            source_length,
            destination_length,
            ratio,
            // 2 * destination * max(1, ratio)
            argument_denominator: (2 * source_length.max(destination_length)) as f64,
            scaled_radius,
            stride,
            f,
            weights: Vec::new(),
            kernels: Vec::with_capacity(destination_length),
            max_diameter: 0,
            scratch: Vec::with_capacity(stride),
        }
    }

    /// `(index + 0.5) * ratio - 0.5`, computed from an exact integer
    /// numerator.
    #[inline]
    fn center(&self, index: usize) -> f64 {
        let numerator = (2 * index as i64 + 1) * self.source_length as i64
            - self.destination_length as i64;
        numerator as f64 / (2 * self.destination_length) as f64
    }

    /// Argument of the interpolation function for source sample `j` of
    /// kernel `index`: `(j - center) / scale`.
    ///
    /// Multiplied by `2 * destination * scale` the numerator is an integer,
    /// so kernels one period apart see bitwise identical arguments.
    #[inline]
    fn argument(&self, index: usize, j: usize) -> f64 {
        let numerator = (2 * j as i64 + 1) * self.destination_length as i64
            - (2 * index as i64 + 1) * self.source_length as i64;
        numerator as f64 / self.argument_denominator
    }

    /// Number of leading kernels whose window is clipped at 0.
    fn corner_interval(&self) -> usize {
        let destination_length = self.destination_length;
        let estimate = ((self.scaled_radius - self.center(0)) / self.ratio).ceil().max(0.0);
        let mut corner = (estimate as usize).min(destination_length);
        while corner < destination_length
            && floor_tolerant(self.center(corner) - self.scaled_radius) < 0.0
        {
            corner += 1;
        }
        corner
    }

    fn push_explicit(&mut self, index: usize) {
        let center = self.center(index);
        let last = (self.source_length - 1) as f64;
        let right = ceil_tolerant(center + self.scaled_radius).clamp(0.0, last) as usize;
        let left = (floor_tolerant(center - self.scaled_radius).clamp(0.0, last) as usize).min(right);
        let length = right - left + 1;

        self.scratch.clear();
        let mut sum = 0.0;
        for j in left..=right {
            let w = (self.f)(self.argument(index, j));
            sum += w;
            self.scratch.push(w);
        }
        if sum > 0.0 {
            for w in &mut self.scratch {
                *w /= sum;
            }
        }

        let offset = self.weights.len();
        self.weights.resize(offset + self.stride.max(length), 0.0);
        for (dst, &w) in self.weights[offset..offset + length].iter_mut().zip(&self.scratch) {
            *dst = w as f32;
        }
        self.max_diameter = self.max_diameter.max(length);
        self.kernels.push(KernelSlot {
            offset,
            length,
            start: left,
        });
    }

    fn build_periodic(&mut self, corner: usize, period: usize, shift: usize) {
        let destination_length = self.destination_length;
        let leading = (corner + period).min(destination_length);
        let trailing = destination_length.saturating_sub(corner).max(leading);

        for i in 0..leading {
            self.push_explicit(i);
        }
        for i in leading..trailing {
            let base = self.kernels[i - period];
            let mut start = base.start + shift;
            if start + base.length > self.source_length {
                let compensated = self.source_length - base.length;
                warn!(
                    index = i,
                    start,
                    compensated,
                    length = base.length,
                    "periodic kernel ends past the source, moving it back"
                );
                start = compensated;
            }
            self.kernels.push(KernelSlot { start, ..base });
        }
        for i in trailing..destination_length {
            self.push_explicit(i);
        }
    }

    fn finish(self, periodic: bool) -> KernelMap {
        KernelMap {
            weights: self.weights,
            kernels: self.kernels,
            source_length: self.source_length,
            max_diameter: self.max_diameter,
            periodic,
        }
    }
}
