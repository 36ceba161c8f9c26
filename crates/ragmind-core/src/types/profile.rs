//! User profile types.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Implements `as_str`, `Display`, and `FromStr` for a lowercase preference enum.
macro_rules! preference_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every accepted value, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Get the wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(Error::InvalidValue {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// How much risk the user is comfortable with in suggestions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

preference_enum!(RiskTolerance, "risk_tolerance", {
    Low => "low",
    Medium => "medium",
    High => "high",
});

/// How deep explanations should go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationDepth {
    Simple,
    #[default]
    Detailed,
    Technical,
}

preference_enum!(ExplanationDepth, "explanation_depth", {
    Simple => "simple",
    Detailed => "detailed",
    Technical => "technical",
});

/// Preferred tone of responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreference {
    #[default]
    Formal,
    Casual,
    Concise,
}

preference_enum!(StylePreference, "style_preference", {
    Formal => "formal",
    Casual => "casual",
    Concise => "concise",
});

/// Structured preference record for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning user. Also the profile's record id.
    pub user_id: String,

    #[serde(default)]
    pub risk_tolerance: RiskTolerance,

    #[serde(default)]
    pub explanation_depth: ExplanationDepth,

    #[serde(default)]
    pub style_preference: StylePreference,
}

impl UserProfile {
    /// Create a profile with default preferences.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            risk_tolerance: RiskTolerance::default(),
            explanation_depth: ExplanationDepth::default(),
            style_preference: StylePreference::default(),
        }
    }

    /// Set the risk tolerance.
    pub fn with_risk_tolerance(mut self, risk: RiskTolerance) -> Self {
        self.risk_tolerance = risk;
        self
    }

    /// Set the explanation depth.
    pub fn with_explanation_depth(mut self, depth: ExplanationDepth) -> Self {
        self.explanation_depth = depth;
        self
    }

    /// Set the style preference.
    pub fn with_style_preference(mut self, style: StylePreference) -> Self {
        self.style_preference = style;
        self
    }

    /// Return a copy with every field present in `delta` overwritten.
    pub fn apply(&self, delta: &ProfileDelta) -> Self {
        Self {
            user_id: self.user_id.clone(),
            risk_tolerance: delta.risk_tolerance.unwrap_or(self.risk_tolerance),
            explanation_depth: delta.explanation_depth.unwrap_or(self.explanation_depth),
            style_preference: delta.style_preference.unwrap_or(self.style_preference),
        }
    }
}

/// Partial profile update produced by interaction analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_tolerance: Option<RiskTolerance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_depth: Option<ExplanationDepth>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_preference: Option<StylePreference>,
}

impl ProfileDelta {
    /// True when the delta carries no field updates.
    pub fn is_empty(&self) -> bool {
        self.risk_tolerance.is_none()
            && self.explanation_depth.is_none()
            && self.style_preference.is_none()
    }
}

/// Whether a user already has a stored profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    New,
    Old,
}

impl UserStatus {
    /// Get the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Old => "old",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
