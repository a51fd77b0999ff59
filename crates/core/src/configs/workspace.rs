use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::ConvoyResult;

/// Optional workspace settings from `.convoy/workspace.yml`. A missing file
/// means defaults everywhere.
#[derive(Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkspaceConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Glob patterns for manifest paths to include. If empty or not
    /// specified, every `package.json` under the root is considered.
    pub includes: Option<Vec<String>>,
    /// Glob patterns for paths to exclude from discovery.
    pub excludes: Option<Vec<String>>,
    /// Default dependency exemption spec: `*` or a comma-separated list of
    /// package names. The `--exempt` flag overrides it.
    pub exempt: Option<String>,
}

pub fn parse_workspace_config(yaml_str: &str) -> ConvoyResult<WorkspaceConfig> {
    let config: WorkspaceConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let config = parse_workspace_config(
            r#"
name: monorepo
includes:
  - "apps/**/package.json"
excludes:
  - "**/dist/**"
exempt: "legacy-tools"
"#,
        )
        .expect("config should parse");

        assert_eq!(config.name.as_deref(), Some("monorepo"));
        assert_eq!(config.exempt.as_deref(), Some("legacy-tools"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse_workspace_config("concurrencyy: 4\n").is_err());
    }
}
