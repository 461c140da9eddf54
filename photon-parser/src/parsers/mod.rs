use std::error::Error;

use photon_core::pointcloud::point::PhotonCloud;

pub mod csv;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<PhotonCloud, Box<dyn Error>>;
}

#[derive(Debug, Clone, Copy)]
pub enum Extension {
    Csv,
    Txt,
}

pub fn get_extension(extension: &str) -> Extension {
    match extension {
        "csv" => Extension::Csv,
        "txt" => Extension::Txt,
        _ => panic!("Unsupported extension"),
    }
}
