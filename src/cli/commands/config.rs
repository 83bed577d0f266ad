//! Config command implementation.

use std::path::Path;

use anyhow::Result;

use crate::cli::{ConfigSubcommand, DeskContext};
use crate::config::{CliOverrides, ConfigPaths, config_schema, user_config_path};
use crate::format::print_json;

/// Execute a config subcommand.
///
/// # Errors
///
/// Returns an error if serialization fails or an explicit config file is missing.
pub fn execute(
    command: &ConfigSubcommand,
    overrides: &CliOverrides,
    ctx: &DeskContext,
) -> Result<()> {
    match command {
        ConfigSubcommand::Show => {
            if ctx.json {
                print_json(&ctx.config)
            } else {
                print!("{}", serde_yaml::to_string(&ctx.config)?);
                Ok(())
            }
        }
        ConfigSubcommand::Schema => print_json(&config_schema()),
        ConfigSubcommand::Path => show_paths(overrides, ctx.json),
    }
}

fn show_paths(overrides: &CliOverrides, json: bool) -> Result<()> {
    let found = ConfigPaths::discover(overrides.config.as_deref())?;
    let user = user_config_path();

    if json {
        return print_json(&serde_json::json!({
            "user": user,
            "userExists": found.user.is_some(),
            "workspace": found.workspace,
            "explicit": found.explicit,
        }));
    }

    println!("user:      {}", describe(user.as_deref(), found.user.is_some()));
    println!(
        "workspace: {}",
        describe(found.workspace.as_deref(), found.workspace.is_some())
    );
    println!(
        "explicit:  {}",
        describe(found.explicit.as_deref(), found.explicit.is_some())
    );
    Ok(())
}

fn describe(path: Option<&Path>, exists: bool) -> String {
    match (path, exists) {
        (Some(path), true) => path.display().to_string(),
        (Some(path), false) => format!("{} (missing)", path.display()),
        (None, _) => "(none)".to_string(),
    }
}
