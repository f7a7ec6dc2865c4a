//! Default config file creation.
//!
//! The file is assembled with a small builder that aligns the trailing comments.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::sunlight::SunlightLevel;

/// Write a default `daybreak.toml` to `path` with the coordinates commented out.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = default_config_content();
    fs::write(path, content)
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    log_indented!("Created default config: {}", path.display());
    Ok(())
}

pub(crate) fn default_config_content() -> String {
    let minimum = format!("\"{}\"", SunlightLevel::default().config_name());
    let iterations = crate::math::DEFAULT_MAX_ITERATIONS.to_string();

    ConfigBuilder::new()
        .add_section("Location")
        .add_commented_setting("latitude", "37.35", "Geographic latitude (-90 to 90)")
        .add_commented_setting("longitude", "-121.95", "Geographic longitude (-180 to 180)")
        .add_commented_setting(
            "timezone",
            "\"America/Los_Angeles\"",
            "IANA zone, defaults to the system zone",
        )
        .add_section("Events")
        .add_setting(
            "minimum_sunlight",
            &minimum,
            "night, astronomical-twilight, nautical-twilight, civil-twilight, daylight",
        )
        .add_section("Precision")
        .add_setting("max_iterations", &iterations, "Series iteration ceiling (10-10000)")
        .build()
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("# {key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        for (index, entry) in self.entries.into_iter().enumerate() {
            match entry {
                ConfigEntry::Section(title) => {
                    if index > 0 {
                        result.push(String::new());
                    }
                    result.push(title);
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.push(String::new());
        result.join("\n")
    }
}
