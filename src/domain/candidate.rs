use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    PatternProbe { variant: String },
    WebSearch,
}

/// A guessed website together with the heuristic that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryCandidate {
    pub url: String,
    pub strategy: DiscoveryStrategy,
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryStrategy::PatternProbe { variant } => write!(f, "domain pattern '{}'", variant),
            DiscoveryStrategy::WebSearch => write!(f, "web search"),
        }
    }
}
