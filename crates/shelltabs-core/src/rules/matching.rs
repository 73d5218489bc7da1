use regex::Regex;
use tracing::debug;

use crate::registry::types::WindowDescriptor;
use crate::rules::types::{AutoGroupRule, MatchKind};

/// Whether a single rule matches a window descriptor.
///
/// Deterministic: depends only on the rule and the descriptor fields. A
/// malformed regex pattern yields "no match" and never escapes the
/// evaluator as an error.
pub fn rule_matches(rule: &AutoGroupRule, window: &WindowDescriptor) -> bool {
    match rule.kind {
        MatchKind::ProcessName => window.process_name() == rule.value.to_lowercase(),
        MatchKind::TitleContains => window
            .title
            .to_lowercase()
            .contains(&rule.value.to_lowercase()),
        MatchKind::TitleRegex => match Regex::new(&rule.value) {
            Ok(re) => re.is_match(&window.title),
            Err(e) => {
                debug!(
                    event = "core.rules.invalid_regex",
                    pattern = %rule.value,
                    error = %e,
                );
                false
            }
        },
        MatchKind::ClassName => window.class_name == rule.value,
        MatchKind::ProcessPathContains => window
            .process_path
            .to_string_lossy()
            .to_lowercase()
            .contains(&rule.value.to_lowercase()),
    }
}

/// Evaluate a rule set against a window descriptor.
///
/// Enabled rules are tried in descending priority order; the first match
/// decides the target group name. Returns `None` when no rule matches.
pub fn evaluate(rules: &[AutoGroupRule], window: &WindowDescriptor) -> Option<String> {
    let mut ordered: Vec<&AutoGroupRule> = rules.iter().filter(|r| r.enabled).collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

    ordered
        .into_iter()
        .find(|rule| rule_matches(rule, window))
        .map(|rule| rule.target.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn explorer_window(title: &str) -> WindowDescriptor {
        WindowDescriptor {
            title: title.to_string(),
            class_name: "CabinetWClass".to_string(),
            process_path: PathBuf::from("C:/Windows/explorer.exe"),
        }
    }

    fn rule(kind: MatchKind, value: &str, target: &str, priority: i32) -> AutoGroupRule {
        AutoGroupRule {
            kind,
            value: value.to_string(),
            target: target.to_string(),
            priority,
            enabled: true,
        }
    }

    #[test]
    fn test_process_name_is_case_insensitive() {
        let window = explorer_window("Downloads");
        assert!(rule_matches(
            &rule(MatchKind::ProcessName, "EXPLORER.EXE", "g", 0),
            &window
        ));
        assert!(!rule_matches(
            &rule(MatchKind::ProcessName, "notepad.exe", "g", 0),
            &window
        ));
    }

    #[test]
    fn test_title_contains_is_case_insensitive() {
        let window = explorer_window("C:\\Users\\me\\Downloads");
        assert!(rule_matches(
            &rule(MatchKind::TitleContains, "downloads", "g", 0),
            &window
        ));
    }

    #[test]
    fn test_class_name_is_case_sensitive() {
        let window = explorer_window("Downloads");
        assert!(rule_matches(
            &rule(MatchKind::ClassName, "CabinetWClass", "g", 0),
            &window
        ));
        assert!(!rule_matches(
            &rule(MatchKind::ClassName, "cabinetwclass", "g", 0),
            &window
        ));
    }

    #[test]
    fn test_process_path_contains_is_case_insensitive() {
        let window = explorer_window("Downloads");
        assert!(rule_matches(
            &rule(MatchKind::ProcessPathContains, "windows", "g", 0),
            &window
        ));
    }

    #[test]
    fn test_title_regex_matches() {
        let window = explorer_window("Downloads - 42 items");
        assert!(rule_matches(
            &rule(MatchKind::TitleRegex, r"\d+ items$", "g", 0),
            &window
        ));
    }

    #[test]
    fn test_malformed_regex_never_matches_and_never_panics() {
        let window = explorer_window("Downloads");
        let bad = rule(MatchKind::TitleRegex, "([unclosed", "g", 0);
        assert!(!rule_matches(&bad, &window));
    }

    #[test]
    fn test_evaluate_first_match_by_priority_wins() {
        let window = explorer_window("Downloads");
        let rules = vec![
            rule(MatchKind::TitleContains, "downloads", "low", 1),
            rule(MatchKind::ProcessName, "explorer.exe", "high", 10),
        ];
        assert_eq!(evaluate(&rules, &window), Some("high".to_string()));
    }

    #[test]
    fn test_evaluate_skips_disabled_rules() {
        let window = explorer_window("Downloads");
        let mut disabled = rule(MatchKind::TitleContains, "downloads", "off", 10);
        disabled.enabled = false;
        let rules = vec![
            disabled,
            rule(MatchKind::TitleContains, "downloads", "on", 1),
        ];
        assert_eq!(evaluate(&rules, &window), Some("on".to_string()));
    }

    #[test]
    fn test_evaluate_no_match_returns_none() {
        let window = explorer_window("Downloads");
        let rules = vec![rule(MatchKind::ProcessName, "notepad.exe", "g", 0)];
        assert_eq!(evaluate(&rules, &window), None);
    }

    #[test]
    fn test_evaluate_malformed_regex_falls_through_to_next_rule() {
        let window = explorer_window("Downloads");
        let rules = vec![
            rule(MatchKind::TitleRegex, "([broken", "broken", 10),
            rule(MatchKind::TitleContains, "downloads", "fallback", 1),
        ];
        assert_eq!(evaluate(&rules, &window), Some("fallback".to_string()));
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let window = explorer_window("Downloads");
        let rules = vec![
            rule(MatchKind::TitleContains, "downloads", "a", 5),
            rule(MatchKind::ClassName, "CabinetWClass", "b", 5),
        ];
        let first = evaluate(&rules, &window);
        for _ in 0..10 {
            assert_eq!(evaluate(&rules, &window), first);
        }
    }
}
