// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

use path_clean::clean;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_NAME: &str = "arena.config.yaml";
pub const DEFAULT_DB_NAME: &str = "db";

/// Resolves where a node keeps its files.
///
/// When the config file was found in a project folder, data lives next to it under
/// `.arena/data`. Otherwise the OS data dir is used.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsEngine {
    name: String,
    cwd: PathBuf,
    default_data_dir: PathBuf,
    default_config_dir: PathBuf,
    found_config_file: Option<PathBuf>,
    data_dir_override: Option<PathBuf>,
    db_file_override: Option<PathBuf>,
}

impl PathsEngine {
    pub fn new(
        name: &str,
        cwd: &Path,
        default_data_dir: &Path,
        default_config_dir: &Path,
        found_config_file: Option<&Path>,
        data_dir_override: Option<&Path>,
        db_file_override: Option<&Path>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            cwd: cwd.to_path_buf(),
            default_data_dir: default_data_dir.to_path_buf(),
            default_config_dir: default_config_dir.to_path_buf(),
            found_config_file: found_config_file.map(Path::to_path_buf),
            data_dir_override: data_dir_override.map(Path::to_path_buf),
            db_file_override: db_file_override.map(Path::to_path_buf),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        match &self.found_config_file {
            Some(file) => clean(file),
            None => clean(self.default_config_dir.join(DEFAULT_CONFIG_NAME)),
        }
    }

    /// `<data_dir>/<name>`
    pub fn node_data_dir(&self) -> PathBuf {
        clean(self.data_dir().join(&self.name))
    }

    /// The sled database. A relative override is taken from the node data dir.
    pub fn db_file(&self) -> PathBuf {
        match &self.db_file_override {
            Some(file) if file.is_absolute() => clean(file),
            Some(file) => clean(self.node_data_dir().join(file)),
            None => clean(self.node_data_dir().join(DEFAULT_DB_NAME)),
        }
    }

    /// Absolute paths are kept, relative ones are taken from the folder holding the config file.
    pub fn relative_to_config(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let config_file = self.config_file();
        let base = config_file.parent().unwrap_or(&self.cwd);
        clean(base.join(path))
    }

    fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir_override {
            return self.relative_to_config(dir);
        }
        if let Some(root) = self.root_dir() {
            return root.join("data");
        }
        self.default_data_dir.clone()
    }

    fn root_dir(&self) -> Option<PathBuf> {
        self.found_config_file
            .as_ref()
            .and_then(|file| file.parent())
            .map(|parent| parent.join(".arena"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Case {
        name: &'static str,
        found_config_file: Option<&'static str>,
        data_dir: Option<&'static str>,
        db_file: Option<&'static str>,
        expected_db: &'static str,
        expected_config: &'static str,
    }

    #[test]
    fn resolves_paths() {
        let cases = [
            Case {
                name: "os defaults",
                found_config_file: None,
                data_dir: None,
                db_file: None,
                expected_db: "/os/data/arena/_default/db",
                expected_config: "/os/config/arena/arena.config.yaml",
            },
            Case {
                name: "project config",
                found_config_file: Some("/proj/arena.config.yaml"),
                data_dir: None,
                db_file: None,
                expected_db: "/proj/.arena/data/_default/db",
                expected_config: "/proj/arena.config.yaml",
            },
            Case {
                name: "relative data dir",
                found_config_file: Some("/proj/arena.config.yaml"),
                data_dir: Some("./state"),
                db_file: Some("scores"),
                expected_db: "/proj/state/_default/scores",
                expected_config: "/proj/arena.config.yaml",
            },
            Case {
                name: "absolute db file",
                found_config_file: None,
                data_dir: Some("/var/arena"),
                db_file: Some("/tmp/arena.db"),
                expected_db: "/tmp/arena.db",
                expected_config: "/os/config/arena/arena.config.yaml",
            },
        ];

        for case in cases {
            let engine = PathsEngine::new(
                "_default",
                Path::new("/cwd"),
                Path::new("/os/data/arena"),
                Path::new("/os/config/arena"),
                case.found_config_file.map(Path::new),
                case.data_dir.map(Path::new),
                case.db_file.map(Path::new),
            );
            assert_eq!(engine.db_file(), PathBuf::from(case.expected_db), "{}", case.name);
            assert_eq!(
                engine.config_file(),
                PathBuf::from(case.expected_config),
                "{}",
                case.name
            );
        }
    }
}
