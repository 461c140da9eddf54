use std::{error::Error, path::PathBuf};

use csv::ReaderBuilder;

use photon_core::pointcloud::point::{Photon, PhotonCloud};

use super::{Parser, ParserProvider};

pub struct CsvParserProvider {
    pub filenames: Vec<PathBuf>,
}

impl ParserProvider for CsvParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(CsvParser {
            filenames: self.filenames.clone(),
        })
    }
}

pub struct CsvParser {
    pub filenames: Vec<PathBuf>,
}

impl Parser for CsvParser {
    fn parse(&self) -> Result<PhotonCloud, Box<dyn Error>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.filenames[0])?;

        let mut photons = Vec::new();
        for record in reader.deserialize() {
            let photon: Photon = record?;
            photons.push(photon);
        }

        Ok(PhotonCloud::new(photons, Some(self.filenames[0].clone())))
    }
}
