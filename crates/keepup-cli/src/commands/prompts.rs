use color_eyre::Result;
use dialoguer::{Confirm, Input, Password};

/// Prompt for a string value; empty input is rejected unless `allow_empty`
pub fn prompt_string(prompt: &str, allow_empty: bool) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Prompt for a secret (masked input)
pub fn prompt_secret(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))
}

/// Value from the command line, or prompted for when missing
pub fn value_or_prompt(value: Option<String>, prompt: &str, allow_empty: bool) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => prompt_string(prompt, allow_empty),
    }
}
