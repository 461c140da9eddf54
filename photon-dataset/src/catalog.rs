use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Split;
use crate::error::DatasetError;

pub const CATEGORY_FILE: &str = "categories.txt";
pub const SPLIT_DIR: &str = "train_test_split";

/// One (category, sample file) pair in enumeration order.
#[derive(Debug, Clone)]
pub struct SampleEntry {
    pub category: String,
    pub class_id: i32,
    pub path: PathBuf,
}

/// Resolved view of a dataset root for one split: the category table and the
/// ordered list of sample files belonging to the split.
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<SampleEntry>,
}

impl Catalog {
    pub fn open(
        root: &Path,
        split: Split,
        category_filter: Option<&HashSet<String>>,
    ) -> Result<Self, DatasetError> {
        let categories = read_categories(&root.join(CATEGORY_FILE))?;

        let train_ids = read_id_set(root, "train_file_list.json")?;
        let val_ids = read_id_set(root, "val_file_list.json")?;
        let test_ids = read_id_set(root, "test_file_list.json")?;

        let mut entries = Vec::new();
        // class ids follow category file order, independent of any filter
        for (class_id, (name, code)) in categories.iter().enumerate() {
            if let Some(filter) = category_filter {
                if !filter.contains(name) {
                    continue;
                }
            }

            let dir = root.join(code);
            let mut file_names = Vec::new();
            let dir_entries = fs::read_dir(&dir).map_err(|source| DatasetError::Io {
                path: dir.clone(),
                source,
            })?;
            for dir_entry in dir_entries {
                let dir_entry = dir_entry.map_err(|source| DatasetError::Io {
                    path: dir.clone(),
                    source,
                })?;
                if let Some(file_name) = dir_entry.file_name().to_str() {
                    file_names.push(file_name.to_string());
                }
            }
            file_names.sort();

            for file_name in file_names {
                let keep = match split {
                    Split::Train => train_ids.contains(&file_name),
                    Split::Val => val_ids.contains(&file_name),
                    Split::Test => test_ids.contains(&file_name),
                    Split::TrainVal => {
                        train_ids.contains(&file_name) || val_ids.contains(&file_name)
                    }
                };
                if keep {
                    entries.push(SampleEntry {
                        category: name.clone(),
                        class_id: class_id as i32,
                        path: dir.join(&file_name),
                    });
                }
            }
        }

        Ok(Catalog { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SampleEntry] {
        &self.entries
    }
}

// Whitespace-separated `name code` lines mapping category name to the
// subdirectory its samples live in.
fn read_categories(path: &Path) -> Result<Vec<(String, String)>, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut categories = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(name), Some(code)) => categories.push((name.to_string(), code.to_string())),
            _ => return Err(DatasetError::CategoryLine(line.to_string())),
        }
    }

    Ok(categories)
}

fn read_id_set(root: &Path, file_name: &str) -> Result<HashSet<String>, DatasetError> {
    let path = root.join(SPLIT_DIR).join(file_name);
    let text = fs::read_to_string(&path).map_err(|source| DatasetError::Io {
        path: path.clone(),
        source,
    })?;
    let ids: Vec<String> =
        serde_json::from_str(&text).map_err(|source| DatasetError::SplitList { path, source })?;
    Ok(ids.into_iter().collect())
}
