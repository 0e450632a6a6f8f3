use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::session::CallerType;

// ---------------------------------------------------------------------------
// Console configuration
// ---------------------------------------------------------------------------

pub struct ConsoleConfig {
    /// Directory of `{caller}/{category}/{flow}.json` definitions. `None`
    /// runs the built-in demo flows.
    pub trees_dir: Option<PathBuf>,
    pub caller: CallerType,
    /// First flow to open once the caller details are taken.
    pub category: String,
    pub flow: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            trees_dir: None,
            caller: CallerType::AccountHolder,
            category: "sim".into(),
            flow: "sim_swap".into(),
        }
    }
}

impl ConsoleConfig {
    /// `[caller_type] [category] [flow] [trees_dir]`, each optional in order.
    /// `-` as trees_dir keeps the demo flows.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let defaults = Self::default();
        let caller = match args.get(1) {
            Some(s) => s
                .parse::<CallerType>()
                .with_context(|| format!("invalid caller type argument '{s}'"))?,
            None => defaults.caller,
        };
        Ok(Self {
            caller,
            category: args.get(2).cloned().unwrap_or(defaults.category),
            flow: args.get(3).cloned().unwrap_or(defaults.flow),
            trees_dir: args.get(4).filter(|s| s.as_str() != "-").map(PathBuf::from),
        })
    }
}
