use std::path::Path;

use photon_dataset::{DatasetConfig, PhotonPartDataset, Split};

fn main() {
    let config = DatasetConfig {
        npoints: 2500,
        split: Split::Test,
        ..DatasetConfig::default()
    };

    let mut dataset =
        PhotonPartDataset::open(Path::new("demos/data"), config).expect("failed to open dataset");

    println!("Number of samples: {}", dataset.len());
    println!("Segmentation classes: {:?}", dataset.seg_classes());

    let batch = dataset.get(0).expect("failed to load first sample");
    println!(
        "First batch: {} rows x {} channels, {} real points",
        batch.points.rows(),
        batch.points.channels(),
        batch.mask.iter().filter(|&&flag| flag).count()
    );
    if let Some(eval) = &batch.eval {
        println!("Source file: {}", eval.file_name);
        println!("Axis bounds: {:?} .. {:?}", eval.mins, eval.maxs);
    }
}
