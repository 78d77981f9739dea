// Runtime settings, loaded from a JSON file or defaulted.
use crate::data::csv_parser::TextEncoding;
use crate::error::{EngineError, Result};
use crate::services::normalizer::NormalizerOptions;
use demandas_shared::{NOT_INFORMED, NULL_SENTINEL};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub delimiter: char,
    pub null_sentinel: String,
    pub not_informed: String,
    pub datetime_format: String,
    pub encodings: Vec<String>, // tried in order, same encoding for both sources
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            delimiter: ';',
            null_sentinel: NULL_SENTINEL.to_string(),
            not_informed: NOT_INFORMED.to_string(),
            datetime_format: "%d/%m/%Y %H:%M".to_string(),
            encodings: TextEncoding::DEFAULT_ORDER
                .iter()
                .map(|e| e.label().to_string())
                .collect(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(EngineError::ConfigError(format!(
                "delimiter '{}' must be a single ASCII character",
                self.delimiter
            )));
        }
        if self.encodings.is_empty() {
            return Err(EngineError::ConfigError(
                "at least one encoding must be listed".to_string(),
            ));
        }
        self.text_encodings()?;
        Ok(())
    }

    /// Only meaningful after `validate`, which rejects non-ASCII delimiters.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn text_encodings(&self) -> Result<Vec<TextEncoding>> {
        self.encodings
            .iter()
            .map(|label| {
                TextEncoding::from_label(label).ok_or_else(|| {
                    EngineError::ConfigError(format!("unknown encoding '{}'", label))
                })
            })
            .collect()
    }

    pub fn normalizer_options(&self) -> NormalizerOptions {
        NormalizerOptions {
            null_sentinel: self.null_sentinel.clone(),
            not_informed: self.not_informed.clone(),
            datetime_format: self.datetime_format.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_matches_source_system() {
        let settings = Settings::default();
        assert_eq!(settings.delimiter, ';');
        assert_eq!(settings.null_sentinel, "<Null>");
        assert_eq!(settings.not_informed, "NÃO INFORMADO");
        assert_eq!(
            settings.encodings,
            vec!["utf-8", "latin1", "iso-8859-1", "windows-1252"]
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "log_level": "debug", "encodings": ["latin1"] }}"#).unwrap();
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.text_encodings().unwrap(), vec![TextEncoding::Latin1]);
        assert_eq!(settings.delimiter, ';');
    }

    #[test]
    fn test_unknown_encoding_is_config_error() {
        let settings = Settings {
            encodings: vec!["ebcdic".to_string()],
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
        assert!(err.to_string().contains("ebcdic"));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();
        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(Settings::load_or_default(None).unwrap(), Settings::default());
    }
}
