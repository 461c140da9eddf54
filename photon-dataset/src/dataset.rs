use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::catalog::Catalog;
use crate::config::{DatasetConfig, Split};
use crate::error::DatasetError;
use crate::normalize::normalize;
use crate::tensor::SampleTensor;

// Sample tables carry `x y lon lat elev signal_conf ... label` columns; the
// coordinate channels are x, y and elev, with signal_conf as the optional
// fourth channel and the label always last.
const COORD_COLUMNS: [usize; 3] = [0, 1, 4];
const SIGNAL_CONF_COLUMN: usize = 5;

/// Numeric table access behind the dataset. The default implementation reads
/// whitespace-separated text tables from disk.
pub trait RecordSource {
    fn read_table(&self, path: &Path) -> Result<Vec<Vec<f64>>, DatasetError>;
}

pub struct WhitespaceTableSource;

impl RecordSource for WhitespaceTableSource {
    fn read_table(&self, path: &Path) -> Result<Vec<Vec<f64>>, DatasetError> {
        let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut rows = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|token| {
                    token.parse::<f64>().map_err(|_| DatasetError::Table {
                        path: path.to_path_buf(),
                        message: format!("bad numeric value {:?}", token),
                    })
                })
                .collect::<Result<Vec<f64>, DatasetError>>()?;
            rows.push(row);
        }

        Ok(rows)
    }
}

#[derive(Debug, Clone)]
struct CachedSample {
    points: SampleTensor,
    class_id: i32,
    labels: Vec<i32>,
}

/// Per-sample metadata returned only for the test split.
#[derive(Debug, Clone)]
pub struct EvalInfo {
    pub file_name: String,
    pub mins: [f64; 3],
    pub maxs: [f64; 3],
}

/// Fixed-size sample ready for the classifier: exactly `npoints` rows of
/// normalized coordinates, aligned labels, and a validity mask marking which
/// rows are real points rather than padding.
#[derive(Debug, Clone)]
pub struct FixedBatch {
    pub points: SampleTensor,
    pub class_id: i32,
    pub labels: Vec<i32>,
    pub mask: Vec<bool>,
    pub eval: Option<EvalInfo>,
}

/// Part-segmentation dataset over preprocessed photon beams: resolves a
/// (category, split) catalog, loads whitespace tables through a
/// [`RecordSource`], and adapts every sample to a [`FixedBatch`].
///
/// Loaded raw samples are cached up to `cache_capacity` and never evicted or
/// overwritten; normalization always runs on a fresh copy, so repeated `get`
/// calls never touch cached data. The cache has no internal locking; the
/// dataset requires `&mut self` and is not meant to be shared across workers
/// without external synchronization.
pub struct PhotonPartDataset {
    config: DatasetConfig,
    catalog: Catalog,
    source: Box<dyn RecordSource>,
    cache: HashMap<usize, CachedSample>,
}

impl PhotonPartDataset {
    pub fn open(root: &Path, config: DatasetConfig) -> Result<Self, DatasetError> {
        Self::with_source(root, config, Box::new(WhitespaceTableSource))
    }

    pub fn with_source(
        root: &Path,
        config: DatasetConfig,
        source: Box<dyn RecordSource>,
    ) -> Result<Self, DatasetError> {
        let catalog = Catalog::open(root, config.split, config.category_filter.as_ref())?;
        Ok(Self {
            config,
            catalog,
            source,
            cache: HashMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn seg_classes(&self) -> &HashMap<String, Vec<i32>> {
        &self.config.seg_classes
    }

    pub fn get(&mut self, index: usize) -> Result<FixedBatch, DatasetError> {
        let len = self.len();
        if index >= len {
            return Err(DatasetError::IndexOutOfRange { index, len });
        }

        let raw = if let Some(hit) = self.cache.get(&index) {
            hit.clone()
        } else {
            let loaded = self.load_sample(index)?;
            if self.cache.len() < self.config.cache_capacity {
                self.cache.insert(index, loaded.clone());
            }
            loaded
        };

        let CachedSample {
            mut points,
            class_id,
            mut labels,
        } = raw;

        let (mins, maxs) = normalize(&mut points);

        let npoints = self.config.npoints;
        let real_points = labels.len();
        let mut mask = vec![true; npoints];

        if real_points > npoints {
            let mut rng = rand::thread_rng();
            let choice = rand::seq::index::sample(&mut rng, real_points, npoints).into_vec();
            points = points.select_rows(&choice);
            labels = choice.iter().map(|&row| labels[row]).collect();
        } else if real_points < npoints {
            let padding = npoints - real_points;
            let pad_row = vec![1.0; points.channels()];
            for _ in 0..padding {
                points.push_row(&pad_row);
            }
            labels.resize(npoints, 0);
            for flag in mask.iter_mut().skip(real_points) {
                *flag = false;
            }
        }

        let eval = if self.config.split == Split::Test {
            let file_name = self.catalog.entries()[index]
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some(EvalInfo {
                file_name,
                mins,
                maxs,
            })
        } else {
            None
        };

        Ok(FixedBatch {
            points,
            class_id,
            labels,
            mask,
            eval,
        })
    }

    fn load_sample(&self, index: usize) -> Result<CachedSample, DatasetError> {
        let entry = &self.catalog.entries()[index];
        let table = self.source.read_table(&entry.path)?;

        let channels = if self.config.use_signal_conf { 4 } else { 3 };
        // the label column must sit past every selected channel
        let min_columns = if self.config.use_signal_conf { 7 } else { 6 };

        let mut points = SampleTensor::with_capacity(table.len(), channels);
        let mut labels = Vec::with_capacity(table.len());
        for row in &table {
            if row.len() < min_columns {
                return Err(DatasetError::Table {
                    path: entry.path.clone(),
                    message: format!(
                        "expected at least {} columns, got {}",
                        min_columns,
                        row.len()
                    ),
                });
            }

            let mut coords = [0.0; 4];
            for (channel, &column) in COORD_COLUMNS.iter().enumerate() {
                coords[channel] = row[column];
            }
            if self.config.use_signal_conf {
                // confidence arrives as a float column but is integral data
                coords[3] = row[SIGNAL_CONF_COLUMN].trunc();
            }
            points.push_row(&coords[..channels]);

            let label = row[row.len() - 1] as i32;
            // collapse the second seafloor class into the first
            labels.push(if label == 2 { 0 } else { label });
        }

        Ok(CachedSample {
            points,
            class_id: entry.class_id,
            labels,
        })
    }
}
