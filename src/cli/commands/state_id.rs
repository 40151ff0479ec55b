//! `state-id` command: inspect composite resource IDs

use crate::domain::StateId;
use anyhow::bail;
use clap::{Args, Subcommand};
use std::collections::BTreeMap;

/// Arguments for the state-id command
#[derive(Args, Debug)]
pub struct StateIdArgs {
    #[command(subcommand)]
    pub action: StateIdAction,
}

#[derive(Subcommand, Debug)]
pub enum StateIdAction {
    /// Encode `key=value` pairs into an ID
    Encode {
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Decode an ID into its fields, printed as JSON
    Decode { id: String },
}

impl StateIdArgs {
    pub async fn execute(&self) -> anyhow::Result<i32> {
        match &self.action {
            StateIdAction::Encode { fields } => {
                println!("{}", encode_pairs(fields)?);
                Ok(0)
            }
            StateIdAction::Decode { id } => {
                let decoded = StateId::decode(id);
                if decoded.is_empty() {
                    eprintln!("No fields could be decoded from '{id}'");
                    return Ok(1);
                }
                let fields: BTreeMap<String, String> = decoded.into();
                println!("{}", serde_json::to_string_pretty(&fields)?);
                Ok(0)
            }
        }
    }
}

fn encode_pairs(pairs: &[String]) -> anyhow::Result<String> {
    let mut id = StateId::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected key=value, got '{pair}'");
        };
        if key.is_empty() {
            bail!("empty key in '{pair}'");
        }
        id.insert(key, value);
    }
    Ok(id.encode())
}
