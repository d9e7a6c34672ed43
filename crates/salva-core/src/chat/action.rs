//! Routing of option actions.

use crate::dialogue::NodeId;

/// Action id that ends the session and restores the greeting.
pub const RESET_ACTION: &str = "reset";

/// Reserved prefix of action ids resolved from the scripted dialogue table.
pub const SCRIPTED_PREFIX: &str = "dating_";

/// Parsed form of [`ChatOption::action`](super::ChatOption::action).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionAction {
    /// No action: the line is relayed to the conversational service.
    Freeform,
    /// Ends the session.
    Reset,
    /// Resolved purely from the dialogue table.
    Scripted(NodeId),
    /// Any other id (`recommend`, `blend`, `"1"`...). Relayed like freeform
    /// input; the reply never carries options.
    Menu(String),
}

impl OptionAction {
    pub fn parse(action: Option<&str>) -> Self {
        match action {
            None => Self::Freeform,
            Some(RESET_ACTION) => Self::Reset,
            Some(id) if id.starts_with(SCRIPTED_PREFIX) => Self::Scripted(NodeId::new(id)),
            Some(other) => Self::Menu(other.to_string()),
        }
    }

    /// True for every action that needs the conversational service.
    pub fn is_relayed(&self) -> bool {
        matches!(self, Self::Freeform | Self::Menu(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(OptionAction::parse(None), OptionAction::Freeform);
        assert_eq!(OptionAction::parse(Some("reset")), OptionAction::Reset);
        assert_eq!(
            OptionAction::parse(Some("dating_2_rest")),
            OptionAction::Scripted(NodeId::new("dating_2_rest"))
        );
        assert_eq!(
            OptionAction::parse(Some("recommend")),
            OptionAction::Menu("recommend".to_string())
        );
        assert_eq!(OptionAction::parse(Some("2")), OptionAction::Menu("2".to_string()));
    }

    #[test]
    fn test_reset_is_exact_match() {
        assert_eq!(
            OptionAction::parse(Some("reset_all")),
            OptionAction::Menu("reset_all".to_string())
        );
    }

    #[test]
    fn test_relayed_actions() {
        assert!(OptionAction::Freeform.is_relayed());
        assert!(OptionAction::Menu("chat".into()).is_relayed());
        assert!(!OptionAction::Reset.is_relayed());
        assert!(!OptionAction::Scripted(NodeId::new("dating_start")).is_relayed());
    }
}
