//! Tool permission policy
//!
//! Every tool call is checked against a [`ToolPermissionPolicy`] before the
//! tool is looked up. The stock policy is [`RulePolicy`]: an ordered rule
//! list where the first rule matching both agent and tool decides.

use std::fmt;
use std::str::FromStr;

/// Who is calling what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallContext<'a> {
    pub tool_id: &'a str,
    pub agent_id: &'a str,
    pub session_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    Allow,
    Deny { reason: String },
}

impl PermissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PermissionDecision::Allow)
    }
}

/// Decides whether an agent may call a tool.
pub trait ToolPermissionPolicy: Send + Sync {
    fn check(&self, ctx: &ToolCallContext<'_>) -> PermissionDecision;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionEffect {
    #[default]
    Allow,
    Deny,
}

impl FromStr for PermissionEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(PermissionEffect::Allow),
            "deny" => Ok(PermissionEffect::Deny),
            other => Err(format!("unknown permission effect '{}'", other)),
        }
    }
}

impl fmt::Display for PermissionEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionEffect::Allow => write!(f, "allow"),
            PermissionEffect::Deny => write!(f, "deny"),
        }
    }
}

/// `*` or an exact id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Any,
    Exact(String),
}

impl Pattern {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Exact(expected) => expected == value,
        }
    }
}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "*" => Pattern::Any,
            exact => Pattern::Exact(exact.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRule {
    pub agent: Pattern,
    pub tool: Pattern,
    pub effect: PermissionEffect,
}

impl FromStr for PermissionRule {
    type Err = String;

    /// `agent:tool:effect`, e.g. `*:data-parse-json:deny`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        match parts.as_slice() {
            [agent, tool, effect] if !agent.is_empty() && !tool.is_empty() => Ok(Self {
                agent: Pattern::from(*agent),
                tool: Pattern::from(*tool),
                effect: effect.parse()?,
            }),
            _ => Err(format!("expected agent:tool:effect, got '{}'", s)),
        }
    }
}

/// Parse a `;`-separated rule list. Malformed entries are skipped with a warning.
pub fn parse_rules(raw: &str) -> Vec<PermissionRule> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<PermissionRule>() {
            Ok(rule) => Some(rule),
            Err(err) => {
                tracing::warn!(rule = entry, error = %err, "ignoring tool permission rule");
                None
            }
        })
        .collect()
}

/// First-match rule list with a fallback effect.
#[derive(Debug, Clone, Default)]
pub struct RulePolicy {
    rules: Vec<PermissionRule>,
    fallback: PermissionEffect,
}

impl RulePolicy {
    pub fn new(rules: Vec<PermissionRule>, fallback: PermissionEffect) -> Self {
        Self { rules, fallback }
    }

    /// Allow everything.
    pub fn allow_all() -> Self {
        Self::default()
    }
}

impl ToolPermissionPolicy for RulePolicy {
    fn check(&self, ctx: &ToolCallContext<'_>) -> PermissionDecision {
        let effect = self
            .rules
            .iter()
            .find(|rule| rule.agent.matches(ctx.agent_id) && rule.tool.matches(ctx.tool_id))
            .map(|rule| rule.effect)
            .unwrap_or(self.fallback);

        match effect {
            PermissionEffect::Allow => PermissionDecision::Allow,
            PermissionEffect::Deny => PermissionDecision::Deny {
                reason: format!(
                    "Agent '{}' is not permitted to call tool '{}'",
                    ctx.agent_id, ctx.tool_id
                ),
            },
        }
    }
}
