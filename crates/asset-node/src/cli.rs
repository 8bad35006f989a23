//! Command-line arguments and invocation scripts.

use anyhow::{bail, Context, Result};
use asset_transfer::config::{parse_principals, AssetConfig};
use asset_transfer::prelude::X509Credential;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Asset ledger host.
#[derive(Parser, Debug)]
#[command(name = "asset-node")]
#[command(about = "Run asset ledger invocations against an in-memory ledger")]
pub struct Args {
    /// Caller common name
    #[arg(short, long, default_value = "admin")]
    pub user: String,

    /// Full caller identity string (overrides --user)
    #[arg(long)]
    pub identity: Option<String>,

    /// Role attribute value carried by the caller
    #[arg(long)]
    pub usertype: Option<String>,

    /// Comma-separated admin common names
    #[arg(long)]
    pub admins: Option<String>,

    /// Attribute name carrying the caller's role
    #[arg(long)]
    pub usertype_attribute: Option<String>,

    /// Event name for mutation notifications
    #[arg(long)]
    pub event_name: Option<String>,

    /// UTC offset in seconds for history timestamps
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,

    /// Run InitLedger before anything else
    #[arg(long)]
    pub seed: bool,

    /// File with one JSON array per line: ["Function", "arg", ...]
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Function name followed by its arguments
    #[arg(trailing_var_arg = true)]
    pub call: Vec<String>,
}

/// One function call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub function: String,
    pub args: Vec<String>,
}

impl Args {
    /// Environment configuration with flag overrides applied.
    pub fn config(&self) -> Result<AssetConfig> {
        let mut config = AssetConfig::from_env().context("Failed to load configuration")?;
        if let Some(admins) = &self.admins {
            config.admin_principals = parse_principals(admins);
        }
        if let Some(attribute) = &self.usertype_attribute {
            config.usertype_attribute.clone_from(attribute);
        }
        if let Some(name) = &self.event_name {
            config.event_name.clone_from(name);
        }
        if let Some(offset) = self.utc_offset {
            config.utc_offset_seconds = offset;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// The caller credential described by the flags.
    pub fn credential(&self) -> X509Credential {
        let credential = match &self.identity {
            Some(identity) => X509Credential::new(identity.clone()),
            None => X509Credential::from_common_name(&self.user),
        };
        match &self.usertype {
            Some(value) => credential.with_attribute(self.usertype_attribute(), value.clone()),
            None => credential,
        }
    }

    fn usertype_attribute(&self) -> String {
        self.usertype_attribute
            .clone()
            .unwrap_or_else(|| asset_transfer::config::DEFAULT_USERTYPE_ATTRIBUTE.to_string())
    }

    /// Every invocation to run, in order.
    pub fn invocations(&self) -> Result<Vec<Invocation>> {
        let mut invocations = Vec::new();
        if self.seed {
            invocations.push(Invocation {
                function: "InitLedger".to_string(),
                args: Vec::new(),
            });
        }
        if let Some(path) = &self.script {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            invocations.extend(parse_script(&text)?);
        }
        if let Some((function, args)) = self.call.split_first() {
            invocations.push(Invocation {
                function: function.clone(),
                args: args.to_vec(),
            });
        }
        Ok(invocations)
    }
}

/// Parse a script: blank lines and `#` comments are skipped.
pub fn parse_script(text: &str) -> Result<Vec<Invocation>> {
    let mut invocations = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<String> = serde_json::from_str(line)
            .with_context(|| format!("line {}: expected a JSON array of strings", number + 1))?;
        let Some((function, args)) = parts.split_first() else {
            bail!("line {}: empty invocation", number + 1);
        };
        invocations.push(Invocation {
            function: function.clone(),
            args: args.to_vec(),
        });
    }
    Ok(invocations)
}
