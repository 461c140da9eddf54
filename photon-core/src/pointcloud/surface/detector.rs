use crate::pointcloud::point::{Photon, CLASS_SURFACE};

pub trait SurfaceDetector {
    /// Locates the water surface, relabels surface photons in place, and
    /// returns the photons below the detected surface. An empty result means
    /// the segment could not be resolved and must be skipped.
    fn find_surface(&self, photons: &mut [Photon]) -> Vec<Photon>;
}

pub struct HistogramSurfaceDetector {
    pub min_elev: f64,
    pub max_elev: f64,
}

impl Default for HistogramSurfaceDetector {
    fn default() -> Self {
        Self {
            min_elev: -50.0,
            max_elev: 10.0,
        }
    }
}

impl SurfaceDetector for HistogramSurfaceDetector {
    fn find_surface(&self, photons: &mut [Photon]) -> Vec<Photon> {
        let num_bins = (self.max_elev - self.min_elev) as usize;
        if photons.is_empty() || num_bins == 0 {
            return Vec::new();
        }

        let mut low = f64::MAX;
        let mut high = f64::MIN;
        for photon in photons.iter() {
            low = low.min(photon.elevation);
            high = high.max(photon.elevation);
        }

        let mut counts = vec![0usize; num_bins];
        for photon in photons.iter() {
            counts[bin_index(photon.elevation, low, high, num_bins)] += 1;
        }

        let mut modal_bin = 0;
        for (bin, &count) in counts.iter().enumerate() {
            if count > counts[modal_bin] {
                modal_bin = bin;
            }
        }

        let Some((first_edge, last_edge)) = mode_window(modal_bin, num_bins) else {
            log::warn!(
                "irregular elevation distribution (modal bin {} of {}), skipping segment",
                modal_bin,
                num_bins
            );
            return Vec::new();
        };

        let lower = bin_edge(low, high, num_bins, first_edge);
        let upper = bin_edge(low, high, num_bins, last_edge);

        let mut sum = 0.0;
        let mut count = 0usize;
        for photon in photons.iter() {
            if photon.elevation > lower && photon.elevation < upper {
                sum += photon.elevation;
                count += 1;
            }
        }
        // an empty window subset yields NaN statistics, which select nothing below
        let mean = sum / count as f64;

        let mut squared_sum = 0.0;
        for photon in photons.iter() {
            if photon.elevation > lower && photon.elevation < upper {
                squared_sum += (photon.elevation - mean).powi(2);
            }
        }
        let sd = (squared_sum / count as f64).sqrt();

        for photon in photons.iter_mut() {
            if photon.elevation > mean - 2.0 * sd && photon.elevation < mean + 2.0 * sd {
                photon.class = CLASS_SURFACE;
            }
        }

        photons
            .iter()
            .filter(|photon| photon.elevation < mean)
            .cloned()
            .collect()
    }
}

/// Edge-index window around the modal bin `k`, classified by the position of
/// the mode relative to the histogram boundaries. Returns indices of the
/// first and last selected edge (the edge array has `num_bins + 1` entries),
/// or `None` when no window can be formed around the mode.
pub fn mode_window(k: usize, num_bins: usize) -> Option<(usize, usize)> {
    if k >= 2 && k + 2 <= num_bins {
        // two bins either side of the mode
        Some((k - 2, k + 2))
    } else if k + 1 == num_bins {
        // mode in the last bin, window cannot extend past the end
        if k < 2 {
            return None;
        }
        Some((k - 2, k + 1))
    } else if k == 1 {
        Some((0, 3))
    } else if k == 0 {
        // no land and no atmospheric noise in the segment
        Some((0, 2))
    } else {
        None
    }
}

fn bin_edge(low: f64, high: f64, num_bins: usize, edge: usize) -> f64 {
    low + (high - low) * edge as f64 / num_bins as f64
}

fn bin_index(elevation: f64, low: f64, high: f64, num_bins: usize) -> usize {
    if high <= low {
        return 0;
    }
    let bin = ((elevation - low) / (high - low) * num_bins as f64) as usize;
    // the last bin is closed at the upper edge
    bin.min(num_bins - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointcloud::point::CLASS_UNCLASSIFIED;

    fn make_photon(elevation: f64) -> Photon {
        Photon {
            index: 0,
            x: 0.0,
            y: 0.0,
            lon: 0.0,
            lat: 0.0,
            elevation,
            signal_conf: 4,
            class: CLASS_UNCLASSIFIED,
        }
    }

    fn elevations(photons: &[Photon]) -> Vec<f64> {
        photons.iter().map(|p| p.elevation).collect()
    }

    #[test]
    fn window_around_interior_mode() {
        assert_eq!(mode_window(5, 60), Some((3, 7)));
        assert_eq!(mode_window(2, 60), Some((0, 4)));
        assert_eq!(mode_window(58, 60), Some((56, 60)));
    }

    #[test]
    fn window_at_first_bin() {
        assert_eq!(mode_window(0, 60), Some((0, 2)));
    }

    #[test]
    fn window_at_second_bin() {
        assert_eq!(mode_window(1, 60), Some((0, 3)));
    }

    #[test]
    fn window_at_last_bin() {
        assert_eq!(mode_window(59, 60), Some((57, 60)));
    }

    #[test]
    fn window_undefined_for_tiny_histograms() {
        assert_eq!(mode_window(1, 2), None);
        assert_eq!(mode_window(0, 1), None);
    }

    #[test]
    fn interior_mode_relabels_and_truncates() {
        // observed range 2.5..8.5 over 10 bins puts the three mid photons in
        // bin 3, the mode; window edges land at 3.1 and 5.5
        let detector = HistogramSurfaceDetector {
            min_elev: 0.0,
            max_elev: 10.0,
        };
        let mut photons: Vec<Photon> = [2.5, 4.375, 4.5, 4.625, 8.5]
            .iter()
            .map(|&e| make_photon(e))
            .collect();

        let reduced = detector.find_surface(&mut photons);

        // mean of the windowed subset is exactly 4.5
        assert_eq!(elevations(&reduced), vec![2.5, 4.375]);
        assert_eq!(reduced[0].class, CLASS_UNCLASSIFIED);
        assert_eq!(reduced[1].class, CLASS_SURFACE);

        // relabeling applies to the full input, not only the returned subset
        assert_eq!(photons[2].class, CLASS_SURFACE);
        assert_eq!(photons[3].class, CLASS_SURFACE);
        assert_eq!(photons[4].class, CLASS_UNCLASSIFIED);
    }

    #[test]
    fn detection_is_deterministic() {
        let detector = HistogramSurfaceDetector {
            min_elev: 0.0,
            max_elev: 10.0,
        };
        let photons: Vec<Photon> = [2.5, 4.375, 4.5, 4.625, 8.5]
            .iter()
            .map(|&e| make_photon(e))
            .collect();

        let mut first = photons.clone();
        let mut second = photons.clone();
        let reduced_first = detector.find_surface(&mut first);
        let reduced_second = detector.find_surface(&mut second);

        assert_eq!(elevations(&reduced_first), elevations(&reduced_second));
        let classes_first: Vec<i32> = first.iter().map(|p| p.class).collect();
        let classes_second: Vec<i32> = second.iter().map(|p| p.class).collect();
        assert_eq!(classes_first, classes_second);
    }

    #[test]
    fn mode_in_first_bin_uses_narrow_window() {
        // mode pinned to bin 0; the window spans edges 0..2 only, so the high
        // outlier never enters the statistics
        let detector = HistogramSurfaceDetector {
            min_elev: 0.0,
            max_elev: 10.0,
        };
        let mut photons: Vec<Photon> = [0.25, 0.5, 0.75, 1.0, 9.9]
            .iter()
            .map(|&e| make_photon(e))
            .collect();

        let reduced = detector.find_surface(&mut photons);

        // windowed subset is (0.25, 2.18) exclusive -> {0.5, 0.75, 1.0}, mean 0.75
        assert_eq!(elevations(&reduced), vec![0.25, 0.5]);
        assert_eq!(photons[1].class, CLASS_SURFACE);
        assert_eq!(photons[2].class, CLASS_SURFACE);
        assert_eq!(photons[3].class, CLASS_SURFACE);
        assert_eq!(photons[0].class, CLASS_UNCLASSIFIED);
        assert_eq!(photons[4].class, CLASS_UNCLASSIFIED);
    }

    #[test]
    fn ambiguous_distribution_returns_empty() {
        // two bins only; the mode falls in the last bin and no window exists
        let detector = HistogramSurfaceDetector {
            min_elev: 0.0,
            max_elev: 2.0,
        };
        let mut photons: Vec<Photon> =
            [0.1, 1.8, 1.9].iter().map(|&e| make_photon(e)).collect();

        let reduced = detector.find_surface(&mut photons);

        assert!(reduced.is_empty());
        assert!(photons.iter().all(|p| p.class == CLASS_UNCLASSIFIED));
    }

    #[test]
    fn empty_segment_returns_empty() {
        let detector = HistogramSurfaceDetector::default();
        assert!(detector.find_surface(&mut []).is_empty());
    }

    #[test]
    fn constant_elevation_segment_degrades_to_empty() {
        let detector = HistogramSurfaceDetector {
            min_elev: 0.0,
            max_elev: 10.0,
        };
        let mut photons: Vec<Photon> = (0..8).map(|_| make_photon(3.0)).collect();

        // zero-width observed range leaves the window subset empty; NaN
        // statistics select nothing
        let reduced = detector.find_surface(&mut photons);
        assert!(reduced.is_empty());
        assert!(photons.iter().all(|p| p.class == CLASS_UNCLASSIFIED));
    }
}
