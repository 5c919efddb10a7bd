//! Runtime configuration.
//!
//! `AppConfig` is read once from the environment at startup. Every variable
//! has a default; a missing variable is logged at `info`, an unparseable one
//! at `warn`, and in both cases the default is used.
//!
//! `ValidationConfig` holds everything the submission rules need (compiled
//! patterns, bounds, formats) and is handed to the validator and committer at
//! construction instead of living in globals.

use crate::error::AppError;
use log::{info, warn};
use regex::Regex;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// RFC 5322 derived address pattern: dot-atom or quoted local part, dot-atom
/// or bracketed domain literal.
const EMAIL_PATTERN: &str = concat!(
    r#"^(?:[-!#-'*+/-9=?A-Z^-~]+(?:\.[-!#-'*+/-9=?A-Z^-~]+)*"#,
    r#"|"(?:[\]!#-\[^-~ \t]|\\[\t -~])+")"#,
    r#"@(?:[-!#-'*+/-9=?A-Z^-~]+(?:\.[-!#-'*+/-9=?A-Z^-~]+)*"#,
    r#"|\[[\t -Z^-~]*\])$"#,
);

/// A leading `+` and eleven digits, each of the first ten optionally followed
/// by one space.
const PHONE_PATTERN: &str = r"^\+(?:[0-9] ?){10}[0-9]$";

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub media_dir: PathBuf,
    /// URL prefix under which `media_dir` is served and recorded in `foto.ruta_archivo`.
    pub media_base_path: String,
    pub max_image_bytes: u64,
    pub write_attempts: u32,
}

impl AppConfig {
    pub fn load() -> Self {
        Self {
            host: try_load("FOOD_EVENTS_HOST", "127.0.0.1".to_string()),
            port: try_load("FOOD_EVENTS_PORT", 8080),
            database_path: PathBuf::from(try_load("FOOD_EVENTS_DATABASE", "food_events.sqlite".to_string())),
            media_dir: PathBuf::from(try_load("FOOD_EVENTS_MEDIA_DIR", "media".to_string())),
            media_base_path: "/media".to_string(),
            max_image_bytes: try_load("FOOD_EVENTS_MAX_IMAGE_BYTES", 2_000_000),
            write_attempts: try_load("FOOD_EVENTS_WRITE_ATTEMPTS", 3u32).max(1),
        }
    }
}

/// Where accepted images go and how hard to try writing them.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub media_dir: PathBuf,
    pub base_path: String,
    pub write_attempts: u32,
}

impl AppConfig {
    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            media_dir: self.media_dir.clone(),
            base_path: self.media_base_path.clone(),
            write_attempts: self.write_attempts,
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

/// Rules and bounds applied to an event submission.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub email: Regex,
    pub phone: Regex,
    pub date_format: String,
    pub date_length: usize,
    pub allowed_mimes: Vec<String>,
    pub max_image_bytes: u64,
    pub sector_max: usize,
    pub name_min: usize,
    pub name_max: usize,
    pub description_max: usize,
    /// Network name assigned to plausible hostnames that match no listed network.
    pub catch_all_network: String,
}

impl ValidationConfig {
    pub fn new(max_image_bytes: u64) -> Result<Self, AppError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AppError::Config(format!("Regex error: {e}")))
        };

        Ok(Self {
            email: compile(EMAIL_PATTERN)?,
            phone: compile(PHONE_PATTERN)?,
            date_format: DATE_FORMAT.to_string(),
            date_length: 16,
            allowed_mimes: vec!["image/jpeg".to_string(), "image/png".to_string()],
            max_image_bytes,
            sector_max: 100,
            name_min: 3,
            name_max: 200,
            description_max: 1000,
            catch_all_network: "otra".to_string(),
        })
    }

    /// Bytes kept of a text form part. A UTF-8 character is at most 4 bytes,
    /// so a value cut at this size still decodes to more characters than the
    /// longest text bound allows and the length rule rejects it.
    pub fn max_text_bytes(&self) -> usize {
        let longest = self.description_max.max(self.name_max).max(self.sector_max);
        4 * (longest + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compile() {
        assert!(ValidationConfig::new(1_000).is_ok());
    }

    #[test]
    fn email_pattern_matches_whole_address() {
        let config = ValidationConfig::new(1_000).unwrap();
        for good in [
            "ana@example.cl",
            "first.last+tag@sub.domain.org",
            "\"john doe\"@example.com",
            "user@[192.168.0.1]",
        ] {
            assert!(config.email.is_match(good), "rejected {good}");
        }
        for bad in ["ana", "ana@", "@example.cl", "ana@@example.cl", "a b@example.cl", "ana@example..cl"] {
            assert!(!config.email.is_match(bad), "accepted {bad}");
        }
    }

    #[test]
    fn phone_pattern_allows_single_interstitial_spaces() {
        let config = ValidationConfig::new(1_000).unwrap();
        assert!(config.phone.is_match("+56 9 1234 5678"));
        assert!(config.phone.is_match("+56912345678"));
        assert!(!config.phone.is_match("123456789"));
        assert!(!config.phone.is_match("+56  912345678"));
        assert!(!config.phone.is_match("+5691234567"));
        assert!(!config.phone.is_match("+56 9 1234 5678 "));
    }

    #[test]
    fn text_cap_covers_longest_bound_in_any_encoding() {
        let config = ValidationConfig::new(1_000).unwrap();
        assert_eq!(config.max_text_bytes(), 4 * 1001);
        assert!((config.max_text_bytes() - 3) / 4 > config.description_max);
    }

    #[test]
    fn storage_follows_app_config() {
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            database_path: PathBuf::from("db.sqlite"),
            media_dir: PathBuf::from("/srv/media"),
            media_base_path: "/media".into(),
            max_image_bytes: 1_000,
            write_attempts: 5,
        };
        let storage = config.storage();
        assert_eq!(storage.media_dir, PathBuf::from("/srv/media"));
        assert_eq!(storage.base_path, "/media");
        assert_eq!(storage.write_attempts, 5);
    }

    #[test]
    fn missing_variable_falls_back_to_default() {
        assert_eq!(try_load("FOOD_EVENTS_TEST_UNSET_VARIABLE", 42u16), 42);
    }
}
