use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Notice Level ====================

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ==================== Notice Category ====================

/// Stable notice key. A UI rendering these keeps at most one visible
/// notice per category: a repeat replaces the previous one rather than
/// stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeCategory {
    /// Channel lifecycle (connected, timed out, reconnecting)
    Channel,
    /// Mobile scanner presence
    Scanner,
    /// Relay-side faults and shutdown notices
    Relay,
    /// Scan acceptance
    Scan,
    /// Catalog lookup outcomes
    Lookup,
}

impl fmt::Display for NoticeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel => write!(f, "channel"),
            Self::Scanner => write!(f, "scanner"),
            Self::Relay => write!(f, "relay"),
            Self::Scan => write!(f, "scan"),
            Self::Lookup => write!(f, "lookup"),
        }
    }
}

// ==================== Notice ====================

/// Operator-facing transient notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub category: NoticeCategory,
    pub title: String,
    pub message: String,
    /// Attached payload (e.g. candidate products for an ambiguous scan)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Notice {
    pub fn new(
        level: NoticeLevel,
        category: NoticeCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            category,
            title: title.into(),
            message: message.into(),
            data: None,
        }
    }

    pub fn info(
        category: NoticeCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(NoticeLevel::Info, category, title, message)
    }

    pub fn success(
        category: NoticeCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(NoticeLevel::Success, category, title, message)
    }

    pub fn warning(
        category: NoticeCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(NoticeLevel::Warning, category, title, message)
    }

    pub fn error(
        category: NoticeCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(NoticeLevel::Error, category, title, message)
    }

    /// Attach a JSON payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}
