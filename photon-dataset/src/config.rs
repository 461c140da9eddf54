use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::error::DatasetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Val,
    Test,
    TrainVal,
}

impl FromStr for Split {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "val" => Ok(Split::Val),
            "test" => Ok(Split::Test),
            "trainval" => Ok(Split::TrainVal),
            other => Err(DatasetError::UnknownSplit(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Fixed number of points every batch is resampled or padded to.
    pub npoints: usize,
    pub split: Split,
    /// Restricts the dataset to the named categories when set.
    pub category_filter: Option<HashSet<String>>,
    /// Appends the signal confidence column as a fourth channel.
    pub use_signal_conf: bool,
    /// Upper bound on cached samples; the cache inserts once and never evicts.
    pub cache_capacity: usize,
    /// Segmentation label values belonging to each category.
    pub seg_classes: HashMap<String, Vec<i32>>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            npoints: 2500,
            split: Split::Train,
            category_filter: None,
            use_signal_conf: false,
            cache_capacity: 20000,
            seg_classes: HashMap::from([("Seafloor".to_string(), vec![0, 1])]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_names_parse() {
        assert_eq!("train".parse::<Split>().unwrap(), Split::Train);
        assert_eq!("val".parse::<Split>().unwrap(), Split::Val);
        assert_eq!("test".parse::<Split>().unwrap(), Split::Test);
        assert_eq!("trainval".parse::<Split>().unwrap(), Split::TrainVal);
    }

    #[test]
    fn unknown_split_is_rejected() {
        let err = "validation".parse::<Split>().unwrap_err();
        assert!(matches!(err, DatasetError::UnknownSplit(name) if name == "validation"));
    }
}
