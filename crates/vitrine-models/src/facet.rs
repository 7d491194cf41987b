use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The filter facet a configurable option contributes its values to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Color,
    Style,
    Size,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Color, Facet::Style, Facet::Size];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Style => "style",
            Self::Size => "size",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown facet: {0}")]
pub struct UnknownFacet(pub String);

impl FromStr for Facet {
    type Err = UnknownFacet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(Self::Color),
            "style" | "material" => Ok(Self::Style),
            "size" => Ok(Self::Size),
            other => Err(UnknownFacet(other.to_string())),
        }
    }
}
