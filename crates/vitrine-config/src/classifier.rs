//! Option-title classification table.
//!
//! Configurable option titles are free text in several languages. The table
//! maps lowercase substrings to the facet they indicate; rules are checked
//! in order and the first facet with a matching token wins.
//!
//! # Environment Variables
//!
//! - `FACET_TOKENS`: `facet=token,token;facet=token` rules, for example
//!   `color=cor,color;style=estilo,style,material;size=size,tamanho,talla`
//!   (the default)

use tracing::warn;
use vitrine_models::Facet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub rules: Vec<(Facet, Vec<String>)>,
}

pub const DEFAULT_FACET_TOKENS: &str =
    "color=cor,color;style=estilo,style,material;size=size,tamanho,talla";

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::parse(DEFAULT_FACET_TOKENS)
    }
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(crate::env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("FACET_TOKENS") {
            Some(raw) => {
                let parsed = Self::parse(&raw);
                if parsed.rules.is_empty() {
                    warn!(value = %raw, "FACET_TOKENS has no usable rules, using defaults");
                    Self::default()
                } else {
                    parsed
                }
            }
            None => Self::default(),
        }
    }

    /// Parse a `facet=token,token;facet=token` rule list. Unknown facets
    /// and empty tokens are skipped; a facet named twice keeps its first
    /// position and accumulates tokens.
    pub fn parse(raw: &str) -> Self {
        let mut rules: Vec<(Facet, Vec<String>)> = Vec::new();

        for rule in raw.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            let Some((facet, tokens)) = rule.split_once('=') else {
                warn!(rule, "Skipping facet rule without '='");
                continue;
            };

            let facet: Facet = match facet.parse() {
                Ok(facet) => facet,
                Err(e) => {
                    warn!(rule, error = %e, "Skipping facet rule");
                    continue;
                }
            };

            let tokens: Vec<String> = tokens
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();

            match rules.iter_mut().find(|(f, _)| *f == facet) {
                Some((_, existing)) => existing.extend(tokens),
                None => rules.push((facet, tokens)),
            }
        }

        Self { rules }
    }
}
