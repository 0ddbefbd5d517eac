//! Queue filtering and emphasis policy.
//!
//! Precedence, applied per panel:
//!
//! 1. `ignore` removes a queue type everywhere, unconditionally.
//! 2. `allow`, if non-empty, keeps only listed queue types.
//! 3. The panel's own [`PanelSelection`] narrows further.
//! 4. `highlight`, if non-empty and the panel has highlighting enabled,
//!    mutes every surviving type not in the list.

use serde::{Deserialize, Serialize};

use crate::style::Emphasis;

/// Figure-wide allow/highlight/ignore lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueFilter {
    /// If non-empty, only these queue types are drawn.
    pub allow: Vec<String>,

    /// Queue types drawn emphasised over a muted background.
    pub highlight: Vec<String>,

    /// Queue types never drawn.
    pub ignore: Vec<String>,
}

impl QueueFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allow<I, S>(mut self, queues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow = queues.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_highlight<I, S>(mut self, queues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight = queues.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ignore<I, S>(mut self, queues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = queues.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `queue_type` survives the ignore and allow lists.
    pub fn admits(&self, queue_type: &str) -> bool {
        if contains(&self.ignore, queue_type) {
            return false;
        }
        self.allow.is_empty() || contains(&self.allow, queue_type)
    }

    /// Whether highlight mode is active at all.
    pub fn highlight_mode(&self) -> bool {
        !self.highlight.is_empty()
    }

    /// Emphasis of an admitted queue type in a panel.
    pub fn emphasis(&self, queue_type: &str, highlight_enabled: bool) -> Emphasis {
        if !highlight_enabled || !self.highlight_mode() {
            Emphasis::Normal
        } else if contains(&self.highlight, queue_type) {
            Emphasis::Highlighted
        } else {
            Emphasis::Muted
        }
    }
}

/// Which admitted queue types a single panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelSelection {
    /// Every admitted type.
    #[default]
    All,
    /// Only the listed types.
    Only(Vec<String>),
    /// Every admitted type except the listed ones.
    Excluding(Vec<String>),
}

impl PanelSelection {
    pub fn admits(&self, queue_type: &str) -> bool {
        match self {
            PanelSelection::All => true,
            PanelSelection::Only(list) => contains(list, queue_type),
            PanelSelection::Excluding(list) => !contains(list, queue_type),
        }
    }
}

fn contains(list: &[String], queue_type: &str) -> bool {
    list.iter().any(|q| q == queue_type)
}
