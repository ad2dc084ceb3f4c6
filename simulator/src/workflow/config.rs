use anyhow::Context;
use mpcore::generator::GeneratorConfig;
use mpcore::model::DetectionMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub mode: DetectionMode,
    pub seed: Option<u64>,
    pub export_dir: PathBuf,
    pub bind: SocketAddr,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::Fast,
            seed: None,
            export_dir: PathBuf::from("exports"),
            bind: default_bind_address(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        mode: DetectionMode,
        seed: Option<u64>,
        export_dir: PathBuf,
        bind: SocketAddr,
    ) -> Self {
        Self {
            mode,
            seed,
            export_dir,
            bind,
        }
    }

    pub fn to_generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            seed: self.seed,
            ..Default::default()
        }
    }
}
