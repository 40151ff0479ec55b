//! `resource` command: run one lifecycle operation and print the state

use super::load_provider_config;
use crate::provider::Provider;
use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceAction {
    Create,
    Read,
    Delete,
    Import,
}

/// Arguments for the resource command
#[derive(Args, Debug)]
pub struct ResourceArgs {
    pub action: ResourceAction,

    /// Terraform type name, e.g. mongodbatlas_cluster
    pub type_name: String,

    /// JSON file with the configuration (create) or state (read, delete)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Import ID (import only)
    #[arg(long)]
    pub id: Option<String>,
}

impl ResourceArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = load_provider_config(config_path)?;
        let provider = Provider::new(&config)?;

        let result = match self.action {
            ResourceAction::Create => provider.create(&self.type_name, self.input()?).await,
            ResourceAction::Read => provider
                .read(&self.type_name, self.input()?)
                .await
                .map(|state| state.unwrap_or(Value::Null)),
            ResourceAction::Delete => provider
                .delete(&self.type_name, self.input()?)
                .await
                .map(|()| Value::Null),
            ResourceAction::Import => {
                let Some(id) = self.id.as_deref() else {
                    bail!("--id is required for import");
                };
                provider.import(&self.type_name, id).await
            }
        };

        match result {
            Ok(state) => {
                if !state.is_null() {
                    println!("{}", serde_json::to_string_pretty(&state)?);
                }
                Ok(0)
            }
            Err(e) => {
                tracing::error!(resource = %self.type_name, error = %e, "Resource operation failed");
                eprintln!("{}", serde_json::to_string_pretty(&e.to_diagnostic())?);
                Ok(1)
            }
        }
    }

    fn input(&self) -> anyhow::Result<Value> {
        let Some(path) = &self.input else {
            bail!("--input is required for {:?}", self.action);
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(action: ResourceAction, input: Option<PathBuf>) -> ResourceArgs {
        ResourceArgs {
            action,
            type_name: "mongodbatlas_project".to_string(),
            input,
            id: None,
        }
    }

    #[test]
    fn test_input_parsed_as_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "demo", "org_id": "o1"}}"#).unwrap();

        let value = args(ResourceAction::Create, Some(file.path().to_path_buf()))
            .input()
            .unwrap();
        assert_eq!(value["name"], "demo");
    }

    #[test]
    fn test_input_required() {
        assert!(args(ResourceAction::Read, None).input().is_err());
    }
}
