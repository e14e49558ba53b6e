//! fwd-config
//!
//! Explicit connection-configuration resolution.
//!
//! Precedence is fixed and deterministic: an explicit parameter overrides
//! the properties-file value, which overrides the default (none). Blank
//! strings count as unset in both layers. There is no ambient lookup: the
//! caller hands in both layers and receives either a fully-populated
//! config or an error naming the missing field.
//!
//! Error codes are stable and uppercase so callers and tests can match on
//! them: `CONFIG_FILE_MISSING`, `CONFIG_MISSING_FIELD`.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Properties file consulted when the caller does not name one.
pub const DEFAULT_PROPERTIES_FILE: &str = "fwdctl.properties";

/// Caller-supplied parameter layer. Every field optional; blanks unset.
#[derive(Debug, Clone, Default)]
pub struct ParamOverlay {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub network_name: Option<String>,
}

/// Fully-resolved connection configuration.
#[derive(Clone, Serialize)]
pub struct ResolvedConfig {
    pub url: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Optional: tasks addressing a snapshot directly do not need it.
    pub network_name: Option<String>,
}

// The password never appears in logs or debug output.
impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"REDACTED")
            .field("network_name", &self.network_name)
            .finish()
    }
}

/// Parse `key=value` properties text. Splits at the first `=`; keys and
/// values are trimmed; later duplicates win.
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for line in text.lines() {
        let (name, value) = match line.split_once('=') {
            Some((name, value)) => (name, value),
            None => (line, ""),
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        out.insert(name.to_string(), value.trim().to_string());
    }
    out
}

/// Load the properties layer.
///
/// An explicitly-named file that does not exist is an error; the default
/// file is optional and its absence yields an empty layer.
pub fn load_properties(path: Option<&Path>) -> Result<BTreeMap<String, String>> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (Path::new(DEFAULT_PROPERTIES_FILE).to_path_buf(), false),
    };

    if !path.is_file() {
        if explicit {
            bail!("CONFIG_FILE_MISSING: properties file '{}' does not exist", path.display());
        }
        return Ok(BTreeMap::new());
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read properties file '{}'", path.display()))?;
    Ok(parse_properties(&text))
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn pick(field: &str, param: Option<&String>, file: &BTreeMap<String, String>) -> Option<String> {
    non_blank(param).or_else(|| non_blank(file.get(field)))
}

/// Resolve the effective configuration from both layers.
///
/// `url`, `username` and `password` are required; `network_name` stays
/// optional (tasks addressing a snapshot id directly do not need it).
pub fn resolve(file_values: &BTreeMap<String, String>, params: &ParamOverlay) -> Result<ResolvedConfig> {
    let url = match pick("url", params.url.as_ref(), file_values) {
        Some(v) => v,
        None => bail!("CONFIG_MISSING_FIELD: 'url' is not provided"),
    };
    let username = match pick("username", params.username.as_ref(), file_values) {
        Some(v) => v,
        None => bail!("CONFIG_MISSING_FIELD: 'username' is not provided"),
    };
    let password = match pick("password", params.password.as_ref(), file_values) {
        Some(v) => v,
        None => bail!("CONFIG_MISSING_FIELD: 'password' is not provided"),
    };
    let network_name = pick("network_name", params.network_name.as_ref(), file_values);

    Ok(ResolvedConfig {
        url,
        username,
        password,
        network_name,
    })
}

/// Convenience: load the file layer and resolve in one step.
pub fn load_and_resolve(path: Option<&Path>, params: &ParamOverlay) -> Result<ResolvedConfig> {
    let file_values = load_properties(path)?;
    resolve(&file_values, params)
}
