//! Normalized middleware attachment rules.

/// Where a rule was written down. Compilation runs sources in a fixed
/// precedence order, so the origin has to survive normalization. Rules
/// cover config attachments only; a middleware's own declaration methods
/// are read directly at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    /// A bot's `middleware` section in the config file.
    BotConfig,
    /// The top-level `middleware` section in the config file.
    GlobalConfig,
}

/// One middleware attachment: an id, one event key, and its limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiddlewareRule {
    pub id: String,
    /// Event key or group name, verbatim from the author.
    pub event: String,
    /// Bots the rule applies to; `None` applies everywhere.
    pub for_bot: Option<Vec<String>>,
    /// Command names for `command` rules; `None` means every command.
    pub commands: Option<Vec<String>>,
    pub source: RuleSource,
}

impl MiddlewareRule {
    pub fn applies_to(&self, bot: &str) -> bool {
        match &self.for_bot {
            None => true,
            Some(bots) => bots.iter().any(|b| b == bot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscoped_rules_apply_everywhere() {
        let rule = MiddlewareRule {
            id: "auditLog".into(),
            event: "message".into(),
            for_bot: None,
            commands: None,
            source: RuleSource::GlobalConfig,
        };
        assert!(rule.applies_to("main"));
        assert!(rule.applies_to("support"));
    }

    #[test]
    fn scoped_rules_check_membership() {
        let rule = MiddlewareRule {
            id: "auditLog".into(),
            event: "message".into(),
            for_bot: Some(vec!["main".into()]),
            commands: None,
            source: RuleSource::BotConfig,
        };
        assert!(rule.applies_to("main"));
        assert!(!rule.applies_to("support"));
    }
}
