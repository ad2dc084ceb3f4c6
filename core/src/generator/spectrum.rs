use rand::Rng;

/// Samples per simulated absorbance curve.
pub const SPECTRUM_LEN: usize = 100;

/// Upper bound (exclusive) of the per-sample baseline noise.
pub const NOISE_CEILING: f64 = 0.1;

pub const WAVENUMBER_START: f64 = 4000.0;
pub const WAVENUMBER_END: f64 = 400.0;

/// Gaussian absorption band: `amplitude * exp(-((i - center) / width)^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    pub center: f64,
    pub width: f64,
    pub amplitude: f64,
}

impl SpectralPeak {
    pub fn at(&self, index: f64) -> f64 {
        let offset = (index - self.center) / self.width;
        self.amplitude * (-(offset * offset)).exp()
    }
}

pub const SPECTRUM_PEAKS: [SpectralPeak; 3] = [
    SpectralPeak {
        center: 25.0,
        width: 8.0,
        amplitude: 0.7,
    },
    SpectralPeak {
        center: 55.0,
        width: 12.0,
        amplitude: 0.9,
    },
    SpectralPeak {
        center: 80.0,
        width: 6.0,
        amplitude: 0.5,
    },
];

/// Noise-free curve value at `index`.
pub fn band_shape(index: usize) -> f64 {
    SPECTRUM_PEAKS.iter().map(|peak| peak.at(index as f64)).sum()
}

/// Draws one spectrum: the fixed band shape plus uniform noise per sample.
pub fn generate_spectrum<R: Rng + ?Sized>(rng: &mut R) -> Vec<f64> {
    (0..SPECTRUM_LEN)
        .map(|i| rng.gen_range(0.0..NOISE_CEILING) + band_shape(i))
        .collect()
}

/// Wavenumber (cm^-1) of a sample index, descending from 4000 to 400.
pub fn wavenumber_at(index: usize) -> f64 {
    let step = (WAVENUMBER_START - WAVENUMBER_END) / (SPECTRUM_LEN - 1) as f64;
    WAVENUMBER_START - step * index as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn spectrum_has_fixed_length_and_non_negative_values() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let spectrum = generate_spectrum(&mut rng);
            assert_eq!(spectrum.len(), SPECTRUM_LEN);
            assert!(spectrum.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn spectrum_noise_stays_under_ceiling() {
        let mut rng = StdRng::seed_from_u64(9);
        let spectrum = generate_spectrum(&mut rng);
        for (i, value) in spectrum.iter().enumerate() {
            let noise = value - band_shape(i);
            assert!((0.0..NOISE_CEILING + 1e-12).contains(&noise));
        }
    }

    #[test]
    fn three_bands_always_stand_out() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..200 {
            let s = generate_spectrum(&mut rng);
            assert!(s[25] > s[40]);
            assert!(s[55] > s[40]);
            assert!(s[55] > s[70]);
            assert!(s[80] > s[70]);
            assert!(s[80] > s[95]);
        }
    }

    #[test]
    fn band_peaks_at_centers() {
        assert!((SPECTRUM_PEAKS[1].at(55.0) - 0.9).abs() < 1e-12);
        assert!(band_shape(55) > band_shape(54));
        assert!(band_shape(55) > band_shape(56));
    }

    #[test]
    fn wavenumber_axis_spans_mid_infrared() {
        assert_eq!(wavenumber_at(0), 4000.0);
        assert!((wavenumber_at(SPECTRUM_LEN - 1) - 400.0).abs() < 1e-9);
    }
}
