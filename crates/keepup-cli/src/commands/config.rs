use super::context::AppContext;
use super::prompts;
use crate::output::{detail_table, Output};
use crate::ConfigCommands;
use color_eyre::Result;
use keepup_config::Config;
use serde_json::json;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::ApiKey { key } => set_api_key(key, output),
        ConfigCommands::Init { force } => init_config(force, output),
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let config = &ctx.config;
    let api_key = ctx
        .credentials
        .get_tmdb_api_key()
        .map(|k| if full { k.clone() } else { mask_string(k) });
    let store_path = config.store.path.clone().unwrap_or_else(|| ctx.paths.store_file());

    if !output.is_human() {
        output.json(&json!({
            "configFile": ctx.paths.config_file(),
            "tmdb": {
                "baseUrl": config.tmdb.base_url,
                "requestTimeoutSeconds": config.tmdb.request_timeout_seconds,
                "apiKey": api_key,
            },
            "store": { "path": store_path },
            "updates": { "includeUndated": config.updates.include_undated },
            "logging": { "file": config.logging.file },
            "signedInAs": ctx.credentials.get_session().map(|s| s.user_id),
        }));
        return Ok(());
    }

    let rows = vec![
        ("Config file", ctx.paths.config_file().display().to_string()),
        ("TMDB base URL", config.tmdb.base_url.clone()),
        ("Request timeout", format!("{}s", config.tmdb.request_timeout_seconds)),
        ("TMDB API key", api_key.unwrap_or_else(|| "not set".to_string())),
        ("Store file", store_path.display().to_string()),
        ("Preferences file", ctx.paths.preferences_file().display().to_string()),
        ("Undated updates", if config.updates.include_undated { "shown last" } else { "hidden" }.to_string()),
        (
            "Log file",
            config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stderr".to_string()),
        ),
        (
            "Signed in as",
            ctx.credentials
                .get_session()
                .map(|s| s.display_name)
                .unwrap_or_else(|| "nobody".to_string()),
        ),
    ];
    output.table(&detail_table("Configuration", &rows));
    Ok(())
}

fn set_api_key(key: Option<String>, output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;
    let key = match key {
        Some(key) => key,
        None => prompts::prompt_secret("TMDB API key")?,
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(color_eyre::eyre::eyre!("API key cannot be empty"));
    }

    ctx.credentials.set_tmdb_api_key(key);
    ctx.save_credentials()?;
    output.success(format!("TMDB API key saved to {}", ctx.paths.credentials_file().display()));
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let config_file = ctx.paths.config_file();
    if config_file.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
        return Ok(());
    }

    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write {}: {}", config_file.display(), e))?;
    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}

/// Keep the first and last four characters visible
fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string("short"), "*****");
        assert_eq!(mask_string("abcd1234efgh"), "abcd****efgh");
    }
}
