//! Profile command for showing or updating the local profile.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use minicross::{Clock, GUEST, ProfileStore, ProfileUpdate};
use serde_json::Value;

use crate::context::Context;

pub fn run(ctx: &Context, name: Option<String>, settings: &[String]) -> Result<()> {
    let user = ctx.user().unwrap_or(GUEST);
    let profiles = ProfileStore::new(ctx.local_store());

    let profile = if name.is_none() && settings.is_empty() {
        profiles.get(user)
    } else {
        let update = ProfileUpdate {
            name,
            settings: parse_settings(settings)?,
        };
        profiles.save(user, update, ctx.clock.now())
    };

    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

/// `KEY=VALUE` pairs; values that are not valid JSON are kept as strings.
fn parse_settings(pairs: &[String]) -> Result<BTreeMap<String, Value>> {
    let mut settings = BTreeMap::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("Expected KEY=VALUE, got {}", pair);
        };
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        settings.insert(key.trim().to_string(), value);
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_settings() {
        let pairs = vec![
            "smart_navigation=false".to_string(),
            "theme=dark".to_string(),
            "font_size=14".to_string(),
        ];
        let settings = parse_settings(&pairs).unwrap();
        assert_eq!(settings["smart_navigation"], json!(false));
        assert_eq!(settings["theme"], json!("dark"));
        assert_eq!(settings["font_size"], json!(14));
    }

    #[test]
    fn test_parse_settings_requires_equals() {
        assert!(parse_settings(&["theme".to_string()]).is_err());
    }
}
