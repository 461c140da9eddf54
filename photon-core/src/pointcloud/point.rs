use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Class assigned to every photon when a beam is ingested.
pub const CLASS_UNCLASSIFIED: i32 = 3;
/// Class assigned by the surface detector to photons on the water surface.
pub const CLASS_SURFACE: i32 = 5;

fn default_class() -> i32 {
    CLASS_UNCLASSIFIED
}

// Column names follow the ATL03-derived beam CSV files
// (index_ph, x, y, lon, lat, elev, signal_conf_ph, class).
// The class column is absent until preprocessing has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photon {
    #[serde(rename = "index_ph")]
    pub index: u64,
    pub x: f64,
    pub y: f64,
    pub lon: f64,
    pub lat: f64,
    #[serde(rename = "elev")]
    pub elevation: f64,
    #[serde(rename = "signal_conf_ph")]
    pub signal_conf: i32,
    #[serde(default = "default_class")]
    pub class: i32,
}

// Extent of the cloud over (x, y, elevation).
#[derive(Debug, Clone, Default)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub point_count: usize,
    pub bounding_volume: BoundingVolume,
    pub source_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PhotonCloud {
    pub photons: Vec<Photon>,
    pub metadata: Metadata,
}

impl PhotonCloud {
    pub fn new(photons: Vec<Photon>, source_file: Option<PathBuf>) -> Self {
        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };

        for photon in &photons {
            for (i, value) in [photon.x, photon.y, photon.elevation].into_iter().enumerate() {
                bounding_volume.min[i] = bounding_volume.min[i].min(value);
                bounding_volume.max[i] = bounding_volume.max[i].max(value);
            }
        }

        let metadata = Metadata {
            point_count: photons.len(),
            bounding_volume,
            source_file,
        };

        PhotonCloud { photons, metadata }
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64, &Photon)> {
        self.photons
            .iter()
            .map(|photon| (photon.x, photon.y, photon.elevation, photon))
    }
}

/// Mean latitude over a photon slice, NaN when the slice is empty.
pub fn mean_latitude(photons: &[Photon]) -> f64 {
    let sum: f64 = photons.iter().map(|p| p.lat).sum();
    sum / photons.len() as f64
}
