//! Scene configuration loading.
//!
//! Loads the scene YAML, expands `${VAR}` and `${VAR:-default}` references,
//! then applies `SCENE_*` environment overrides and validates the result.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use scene::SceneConfig;

/// Load and validate a scene configuration file.
pub fn load_scene_config<P: AsRef<Path>>(path: P) -> Result<SceneConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read scene config from {:?}", path.as_ref()))?;

    let mut config = parse_scene_config(&content)?;

    config.apply_env_overrides().map_err(|e| anyhow!(e))?;
    config
        .validate()
        .map_err(|e| anyhow!("Invalid scene config: {}", e))?;

    Ok(config)
}

/// Expand environment references and parse YAML.
pub fn parse_scene_config(content: &str) -> Result<SceneConfig> {
    let expanded = expand_env_vars(content)?;
    serde_yaml::from_str(&expanded).with_context(|| "Failed to parse scene config YAML")
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Tests
// ============================================================================
