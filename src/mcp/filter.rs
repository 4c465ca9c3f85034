//! Static tool filter
//!
//! Restricts which server tools a client may see and invoke. A tool passes
//! when it is on the allow-list (or no allow-list is set) and is not on the
//! block-list. The filter is fixed at construction.

use crate::mcp::protocol::Tool;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolFilter {
    /// `None` means every tool not explicitly blocked is allowed
    allowed: Option<BTreeSet<String>>,
    blocked: BTreeSet<String>,
}

impl ToolFilter {
    /// Filter that lets every tool through
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Filter that only lets the named tools through
    ///
    /// ```ignore
    /// let filter = ToolFilter::allow(["semgrep_scan"]);
    /// assert!(filter.is_allowed("semgrep_scan"));
    /// ```
    pub fn allow<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Some(names.into_iter().map(Into::into).collect()),
            blocked: BTreeSet::new(),
        }
    }

    /// Add names that are rejected even if allowed
    pub fn with_blocked<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        let listed = self
            .allowed
            .as_ref()
            .map_or(true, |allowed| allowed.contains(name));
        listed && !self.blocked.contains(name)
    }

    /// The allow-list, if one is set
    pub fn allowed_names(&self) -> Option<Vec<&str>> {
        self.allowed
            .as_ref()
            .map(|allowed| allowed.iter().map(String::as_str).collect())
    }

    pub fn blocked_names(&self) -> Vec<&str> {
        self.blocked.iter().map(String::as_str).collect()
    }

    /// Drop tools the filter rejects, keeping server order
    pub fn apply(&self, tools: Vec<Tool>) -> Vec<Tool> {
        tools
            .into_iter()
            .filter(|tool| {
                let keep = self.is_allowed(&tool.name);
                if !keep {
                    tracing::debug!("Tool filter hides '{}'", tool.name);
                }
                keep
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str) -> Tool {
        Tool {
            name: name.to_string(),
            description: String::new(),
            input_schema: json!({"type": "object"}),
        }
    }

    #[test]
    fn test_allow_all() {
        let filter = ToolFilter::allow_all();
        assert!(filter.is_allowed("anything"));
        assert!(filter.allowed_names().is_none());
    }

    #[test]
    fn test_allow_list_of_one() {
        let filter = ToolFilter::allow(["semgrep_scan"]);

        assert!(filter.is_allowed("semgrep_scan"));
        assert!(!filter.is_allowed("semgrep_scan_with_custom_rule"));
        assert!(!filter.is_allowed("get_abstract_syntax_tree"));
        assert_eq!(filter.allowed_names(), Some(vec!["semgrep_scan"]));
    }

    #[test]
    fn test_block_list_wins() {
        let filter = ToolFilter::allow(["a", "b"]).with_blocked(["b"]);

        assert!(filter.is_allowed("a"));
        assert!(!filter.is_allowed("b"));
        assert_eq!(filter.blocked_names(), vec!["b"]);

        let filter = ToolFilter::allow_all().with_blocked(["c"]);
        assert!(filter.is_allowed("a"));
        assert!(!filter.is_allowed("c"));
    }

    #[test]
    fn test_empty_allow_list_rejects_everything() {
        let filter = ToolFilter::allow(Vec::<String>::new());
        assert!(!filter.is_allowed("semgrep_scan"));
    }

    #[test]
    fn test_apply_keeps_order() {
        let filter = ToolFilter::allow(["semgrep_scan", "security_check"]);
        let tools = vec![
            tool("security_check"),
            tool("semgrep_rule_schema"),
            tool("semgrep_scan"),
        ];

        let names: Vec<String> = filter.apply(tools).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["security_check", "semgrep_scan"]);
    }
}
