use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Field, StoreError, Violation};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Orange,
    Green,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Red, Color::Orange, Color::Green];

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Green => "green",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .into_iter()
            .find(|color| color.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "{s:?} is not one of {}",
                    Color::ALL.map(Color::as_str).join(", ")
                )
            })
    }
}

/// One to-do entry as it is persisted under the activities key.
///
/// `color` stays a plain string so that a stored value outside the color
/// set still loads; it is checked by [`Activity::validate`] on the write
/// path only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    pub title: String,

    pub description: String,

    pub color: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Activity {
    /// A record without an id; the store assigns one when it is appended.
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: Color) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            color: color.as_str().to_string(),
            extra: BTreeMap::new(),
        }
    }

    pub fn parsed_color(&self) -> Option<Color> {
        self.color.parse().ok()
    }

    /// Checks every field and reports all violations at once.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push(Violation {
                field: Field::Title,
                reason: "must not be empty".to_string(),
            });
        }
        if self.description.trim().is_empty() {
            violations.push(Violation {
                field: Field::Description,
                reason: "must not be empty".to_string(),
            });
        }
        if let Err(reason) = self.color.parse::<Color>() {
            violations.push(Violation {
                field: Field::Color,
                reason,
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(violations))
        }
    }
}
