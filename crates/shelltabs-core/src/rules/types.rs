use serde::{Deserialize, Serialize};

/// How an [`AutoGroupRule`] matches a window descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Case-insensitive equality against the owning process's file name.
    ProcessName,
    /// Case-insensitive substring test against the window title.
    TitleContains,
    /// Regular expression over the window title. A pattern that fails to
    /// compile never matches.
    TitleRegex,
    /// Exact, case-sensitive equality against the native window class.
    ClassName,
    /// Case-insensitive substring test against the full executable path.
    ProcessPathContains,
}

/// One auto-grouping rule.
///
/// Rules are immutable per evaluation and applied in descending priority
/// order, first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoGroupRule {
    pub kind: MatchKind,
    pub value: String,
    /// Name of the group a matching window should join.
    pub target: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_toml_roundtrip() {
        let rule = AutoGroupRule {
            kind: MatchKind::TitleContains,
            value: "Downloads".to_string(),
            target: "files".to_string(),
            priority: 10,
            enabled: true,
        };
        let toml_str = toml::to_string(&rule).unwrap();
        assert!(toml_str.contains("kind = \"title_contains\""));
        let parsed: AutoGroupRule = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, rule);
    }

    #[test]
    fn test_enabled_defaults_to_true() {
        let rule: AutoGroupRule = toml::from_str(
            r#"
kind = "process_name"
value = "explorer.exe"
target = "explorer"
"#,
        )
        .unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.priority, 0);
    }
}
