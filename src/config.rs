// Copyright (C) 2020-2024 Andy Kurnia.

use super::error;

pub const DATA_PATH_VAR: &str = "DATA_PATH";

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    pub data_path: std::path::PathBuf,
}

impl Config {
    pub fn new(data_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    /// Reads `DATA_PATH`, defaulting to the current directory.
    pub fn from_env() -> Self {
        let data_path = std::env::var_os(DATA_PATH_VAR).unwrap_or_else(|| ".".into());
        log::debug!("data path: {:?}", data_path);
        Self::new(data_path)
    }

    pub fn from_json_file(path: &std::path::Path) -> error::Returns<Self> {
        let f = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(f))?)
    }

    pub fn dawg_path(&self, lexicon: &str) -> std::path::PathBuf {
        self.data_path
            .join("lexica")
            .join("dawg")
            .join(format!("{lexicon}.dawg"))
    }

    pub fn letter_distribution_path(&self, name: &str) -> std::path::PathBuf {
        self.data_path
            .join("letterdistributions")
            .join(format!("{name}.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        let cfg = Config::new("/data");
        assert_eq!(
            cfg.dawg_path("NWL20"),
            std::path::Path::new("/data/lexica/dawg/NWL20.dawg")
        );
        assert_eq!(
            cfg.letter_distribution_path("english"),
            std::path::Path::new("/data/letterdistributions/english.csv")
        );
    }

    #[test]
    fn from_json() {
        let cfg: Config = serde_json::from_str(r#"{"data_path":"/srv/data"}"#).unwrap();
        assert_eq!(cfg, Config::new("/srv/data"));
    }
}
