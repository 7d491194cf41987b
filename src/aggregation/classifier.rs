use vitrine_config::ClassifierConfig;
use vitrine_models::Facet;

/// Maps free-text option titles to facets by substring match against an
/// ordered token table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetClassifier {
    rules: Vec<(Facet, Vec<String>)>,
}

impl FacetClassifier {
    /// Tokens are matched lowercase; rules are tried in the order given.
    pub fn new(rules: Vec<(Facet, Vec<String>)>) -> Self {
        let rules = rules
            .into_iter()
            .map(|(facet, tokens)| {
                let tokens = tokens
                    .into_iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect();
                (facet, tokens)
            })
            .collect();

        Self { rules }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.rules.clone())
    }

    /// First facet with a token contained in `title`, ignoring case.
    pub fn classify(&self, title: &str) -> Option<Facet> {
        let title = title.to_lowercase();
        self.rules
            .iter()
            .find(|(_, tokens)| tokens.iter().any(|token| title.contains(token.as_str())))
            .map(|(facet, _)| *facet)
    }

    pub fn rules(&self) -> &[(Facet, Vec<String>)] {
        &self.rules
    }
}

impl Default for FacetClassifier {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_covers_both_languages() {
        let classifier = FacetClassifier::default();
        assert_eq!(classifier.classify("Cor"), Some(Facet::Color));
        assert_eq!(classifier.classify("Color"), Some(Facet::Color));
        assert_eq!(classifier.classify("Estilo"), Some(Facet::Style));
        assert_eq!(classifier.classify("Material do tecido"), Some(Facet::Style));
        assert_eq!(classifier.classify("TAMANHO"), Some(Facet::Size));
        assert_eq!(classifier.classify("Talla"), Some(Facet::Size));
        assert_eq!(classifier.classify("Shoe size"), Some(Facet::Size));
    }

    #[test]
    fn test_unknown_title_is_unclassified() {
        let classifier = FacetClassifier::default();
        assert_eq!(classifier.classify("Peso"), None);
        assert_eq!(classifier.classify(""), None);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let classifier = FacetClassifier::default();
        assert_eq!(classifier.classify("Color / Size"), Some(Facet::Color));
        assert_eq!(classifier.classify("Size / Color"), Some(Facet::Color));
    }

    #[test]
    fn test_custom_table_replaces_defaults() {
        let classifier =
            FacetClassifier::from_config(&ClassifierConfig::parse("size=medida;color=tom"));
        assert_eq!(classifier.classify("Medida"), Some(Facet::Size));
        assert_eq!(classifier.classify("Tom de pele"), Some(Facet::Color));
        assert_eq!(classifier.classify("Cor"), None);
    }

    #[test]
    fn test_tokens_are_normalized() {
        let classifier = FacetClassifier::new(vec![(Facet::Style, vec![" Acabamento ".into(), "".into()])]);
        assert_eq!(classifier.classify("acabamento fosco"), Some(Facet::Style));
        assert_eq!(classifier.rules()[0].1, vec!["acabamento".to_string()]);
    }
}
