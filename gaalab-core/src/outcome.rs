//! What a strategy hands back to the runner.

use serde::{Deserialize, Serialize};

/// A rendered message. Each non-empty part is delivered as its own block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub headline: String,
    /// Reserved for a one-line summary; empty for the built-in strategies.
    pub secondary: String,
    pub body: String,
}

impl Notification {
    pub fn new(headline: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            secondary: String::new(),
            body: body.into(),
        }
    }

    /// No headline and no secondary line: nothing worth delivering.
    pub fn is_blank(&self) -> bool {
        self.headline.is_empty() && self.secondary.is_empty()
    }

    /// The non-empty parts in delivery order.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        [&self.headline, &self.secondary, &self.body]
            .into_iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyOutcome {
    /// Nothing new this invocation.
    NoSignal,
    Signal(Notification),
    Error { strategy: String, message: String },
}

impl StrategyOutcome {
    pub fn error(strategy: impl Into<String>, err: &(dyn std::error::Error + 'static)) -> Self {
        Self::Error {
            strategy: strategy.into(),
            message: error_chain(err),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The notification to deliver, if any.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            Self::NoSignal => None,
            Self::Signal(n) => Some(n.clone()),
            Self::Error { strategy, message } => Some(crate::format::format_error(strategy, message)),
        }
    }
}

/// `outer: inner: root` rendering of an error and its sources.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_skip_empty_secondary() {
        let n = Notification::new("GO BUY NOW", "details");
        assert_eq!(n.parts().collect::<Vec<_>>(), vec!["GO BUY NOW", "details"]);
        assert!(!n.is_blank());
        assert!(Notification::default().is_blank());
    }

    #[test]
    fn error_outcome_renders_headline() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let outcome = StrategyOutcome::error("gaa", &io);
        let n = outcome.notification().unwrap();
        assert_eq!(n.headline, "Error in gaa");
        assert!(n.body.contains("disk full"));
        assert!(StrategyOutcome::NoSignal.notification().is_none());
    }
}
