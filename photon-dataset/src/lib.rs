pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod normalize;
pub mod tensor;

pub use config::{DatasetConfig, Split};
pub use dataset::{FixedBatch, PhotonPartDataset, RecordSource};
pub use error::DatasetError;
