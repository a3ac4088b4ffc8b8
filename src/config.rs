use crate::options::DEFAULT_MAX_BUFFER;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default = "Tool::extractor")]
    pub extractor: Tool,
    #[serde(default = "Tool::rasterizer")]
    pub rasterizer: Tool,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub naming: Naming,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: Default::default(),
            extractor: Tool::extractor(),
            rasterizer: Tool::rasterizer(),
            limits: Default::default(),
            naming: Default::default(),
            logging: Default::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    /// Staged PDF inputs and temp copies.
    pub staging_dir: PathBuf,
    /// Generated thumbnails and, by default, extracted images.
    pub image_dir: PathBuf,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("files/pdf"),
            image_dir: PathBuf::from("files/image"),
        }
    }
}

/// An external executable plus the arguments that always precede the
/// per-call ones (e.g. `java -jar vendor/tika-app.jar`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Zero disables the timeout.
    #[serde(default)]
    pub timeout_seconds: u64,
}

impl Tool {
    pub fn extractor() -> Self {
        Self::java_jar("vendor/tika-app-1.13.jar")
    }

    pub fn rasterizer() -> Self {
        Self::java_jar("vendor/pdfbox-app-2.0.2.jar")
    }

    fn java_jar(jar: &str) -> Self {
        Self {
            program: "java".into(),
            args: vec!["-jar".into(), jar.into()],
            timeout_seconds: 0,
        }
    }

    /// A tool invoked directly, without prefix arguments.
    pub fn program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout_seconds: 0,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub max_buffer: usize,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_buffer: DEFAULT_MAX_BUFFER,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Naming {
    /// Substituted for the generated staging name of buffer inputs.
    pub buffer_resource_name: String,
}
impl Default for Naming {
    fn default() -> Self {
        Self {
            buffer_resource_name: "input.pdf".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
