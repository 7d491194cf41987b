use std::collections::{BTreeMap, BTreeSet};

use vitrine_models::{
    CatalogItem, ContextKey, Facet, FilterSnapshot, FilterSummary, PriceRange, PriceUnit, Variant,
};

use super::FacetClassifier;

/// Price used for a variant: the calculated price when it is a positive
/// finite number, otherwise the base price under the same condition.
pub fn effective_price(variant: &Variant) -> Option<f64> {
    [variant.calculated_price, variant.price]
        .into_iter()
        .flatten()
        .find(|price| price.is_finite() && *price > 0.0)
}

/// Folds catalog items into one [`FilterSummary`].
#[derive(Debug, Clone)]
pub struct SummaryBuilder<'a> {
    classifier: &'a FacetClassifier,
    colors: BTreeSet<String>,
    styles: BTreeSet<String>,
    sizes: BTreeSet<String>,
    prices: Vec<f64>,
    product_count: u64,
    unclassified: BTreeSet<String>,
}

impl<'a> SummaryBuilder<'a> {
    pub fn new(classifier: &'a FacetClassifier) -> Self {
        Self {
            classifier,
            colors: BTreeSet::new(),
            styles: BTreeSet::new(),
            sizes: BTreeSet::new(),
            prices: Vec::new(),
            product_count: 0,
            unclassified: BTreeSet::new(),
        }
    }

    pub fn add_item(&mut self, item: &CatalogItem) {
        self.product_count += 1;

        for option in &item.options {
            let title = option.title.trim();
            if title.is_empty() || option.values.is_empty() {
                continue;
            }

            let Some(facet) = self.classifier.classify(title) else {
                self.unclassified.insert(title.to_string());
                continue;
            };

            let bucket = match facet {
                Facet::Color => &mut self.colors,
                Facet::Style => &mut self.styles,
                Facet::Size => &mut self.sizes,
            };
            bucket.extend(
                option
                    .values
                    .iter()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            );
        }

        self.prices
            .extend(item.variants.iter().filter_map(effective_price));
    }

    /// Option titles seen so far that matched no facet.
    pub fn unclassified(&self) -> &BTreeSet<String> {
        &self.unclassified
    }

    pub fn finish(self, unit: PriceUnit) -> FilterSummary {
        FilterSummary {
            price_range: PriceRange::from_prices(&self.prices, unit),
            colors: self.colors,
            styles: self.styles,
            sizes: self.sizes,
            product_count: self.product_count,
        }
    }
}

/// Result of grouping a catalog by item context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationOutput {
    pub snapshot: FilterSnapshot,
    pub unclassified: BTreeSet<String>,
}

/// Groups items by [`ContextKey::for_item`] and summarizes each group.
pub fn aggregate_by_context<'i, I>(
    items: I,
    classifier: &FacetClassifier,
    unit: PriceUnit,
) -> AggregationOutput
where
    I: IntoIterator<Item = &'i CatalogItem>,
{
    let mut groups: BTreeMap<ContextKey, SummaryBuilder<'_>> = BTreeMap::new();

    for item in items {
        groups
            .entry(ContextKey::for_item(item))
            .or_insert_with(|| SummaryBuilder::new(classifier))
            .add_item(item);
    }

    let mut unclassified = BTreeSet::new();
    let snapshot = groups
        .into_iter()
        .map(|(key, builder)| {
            unclassified.extend(builder.unclassified().iter().cloned());
            (key, builder.finish(unit))
        })
        .collect();

    AggregationOutput {
        snapshot,
        unclassified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_models::{
        CollectionId, ConfigurableOption, ProductId, ProductStatus, ProductTypeId, VariantId,
    };

    fn item(id: &str, options: Vec<ConfigurableOption>, prices: &[f64]) -> CatalogItem {
        CatalogItem {
            id: ProductId::from(id),
            status: ProductStatus::Published,
            type_id: None,
            collection_id: None,
            category_id: None,
            options,
            variants: prices
                .iter()
                .enumerate()
                .map(|(i, p)| Variant::priced(VariantId::new(format!("{id}_v{i}")), *p))
                .collect(),
        }
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_effective_price_prefers_usable_calculated_price() {
        let mut variant = Variant::priced(VariantId::from("v"), 1000.0);
        assert_eq!(effective_price(&variant), Some(1000.0));

        variant.calculated_price = Some(800.0);
        assert_eq!(effective_price(&variant), Some(800.0));

        variant.calculated_price = Some(0.0);
        assert_eq!(effective_price(&variant), Some(1000.0));

        variant.calculated_price = Some(f64::NAN);
        variant.price = Some(-5.0);
        assert_eq!(effective_price(&variant), None);
    }

    #[test]
    fn test_single_color_item_in_minor_units() {
        let items = [item(
            "prod_1",
            vec![ConfigurableOption::new("Color", ["Red", "Blue"])],
            &[2500.0],
        )];

        let output = aggregate_by_context(&items, &FacetClassifier::default(), PriceUnit::Minor);
        let summary = output.snapshot.get(&ContextKey::global()).unwrap();

        assert_eq!(summary.price_range, PriceRange { min: 25, max: 25 });
        assert_eq!(summary.colors, set(&["Blue", "Red"]));
        assert!(summary.styles.is_empty());
        assert!(summary.sizes.is_empty());
        assert_eq!(summary.product_count, 1);
    }

    #[test]
    fn test_unpriced_items_use_default_range() {
        let classifier = FacetClassifier::default();
        let mut builder = SummaryBuilder::new(&classifier);
        builder.add_item(&item("prod_1", Vec::new(), &[]));
        let summary = builder.finish(PriceUnit::Minor);
        assert_eq!(summary.price_range, PriceRange::DEFAULT);
        assert_eq!(summary.product_count, 1);
    }

    #[test]
    fn test_unclassified_option_contributes_nothing() {
        let classifier = FacetClassifier::default();
        let mut builder = SummaryBuilder::new(&classifier);
        builder.add_item(&item(
            "prod_1",
            vec![
                ConfigurableOption::new("Peso", ["1kg", "2kg"]),
                ConfigurableOption::new("Tamanho", ["M", " ", ""]),
                ConfigurableOption::new("Estilo", Vec::<String>::new()),
            ],
            &[],
        ));

        assert_eq!(builder.unclassified(), &set(&["Peso"]));
        let summary = builder.finish(PriceUnit::Minor);
        assert!(summary.colors.is_empty());
        assert!(summary.styles.is_empty());
        assert_eq!(summary.sizes, set(&["M"]));
    }

    #[test]
    fn test_values_deduplicate_across_items() {
        let classifier = FacetClassifier::default();
        let mut builder = SummaryBuilder::new(&classifier);
        builder.add_item(&item("a", vec![ConfigurableOption::new("Cor", ["Azul", "Verde"])], &[1999.0]));
        builder.add_item(&item("b", vec![ConfigurableOption::new("Cor", ["Azul"])], &[5001.0]));

        let summary = builder.finish(PriceUnit::Minor);
        assert_eq!(summary.colors, set(&["Azul", "Verde"]));
        assert_eq!(summary.price_range, PriceRange { min: 19, max: 51 });
        assert_eq!(summary.product_count, 2);
    }

    #[test]
    fn test_major_units_are_not_divided() {
        let classifier = FacetClassifier::default();
        let mut builder = SummaryBuilder::new(&classifier);
        builder.add_item(&item("a", Vec::new(), &[19.9, 5.5]));
        assert_eq!(
            builder.finish(PriceUnit::Major).price_range,
            PriceRange { min: 5, max: 20 }
        );
    }

    #[test]
    fn test_items_group_by_own_context() {
        let mut typed = item("a", vec![ConfigurableOption::new("Cor", ["Azul"])], &[1000.0]);
        typed.type_id = Some(ProductTypeId::from("ptyp_1"));
        let mut collected = item("b", vec![ConfigurableOption::new("Size", ["P"])], &[2000.0]);
        collected.collection_id = Some(CollectionId::from("pcol_1"));
        let loose = item("c", Vec::new(), &[3000.0]);

        let output = aggregate_by_context(
            [&typed, &collected, &loose],
            &FacetClassifier::default(),
            PriceUnit::Minor,
        );
        assert_eq!(output.snapshot.len(), 3);

        let by_type = ContextKey::from_filters([ProductTypeId::from("ptyp_1")], Vec::new(), Vec::new());
        assert_eq!(output.snapshot.get(&by_type).unwrap().colors, set(&["Azul"]));

        let global = output.snapshot.get(&ContextKey::global()).unwrap();
        assert_eq!(global.product_count, 1);
        assert_eq!(global.price_range, PriceRange { min: 30, max: 30 });
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let items: Vec<CatalogItem> = (0..20)
            .map(|i| {
                let mut it = item(
                    &format!("prod_{i}"),
                    vec![
                        ConfigurableOption::new("Cor", [format!("c{}", i % 3)]),
                        ConfigurableOption::new("Tamanho", [format!("s{}", i % 4)]),
                        ConfigurableOption::new("Sabor", ["x"]),
                    ],
                    &[100.0 * f64::from(i + 1)],
                );
                it.type_id = Some(ProductTypeId::new(format!("ptyp_{}", i % 2)));
                it
            })
            .collect();

        let classifier = FacetClassifier::default();
        let first = aggregate_by_context(&items, &classifier, PriceUnit::Minor);
        let second = aggregate_by_context(items.iter().rev(), &classifier, PriceUnit::Minor);

        assert_eq!(
            serde_json::to_string(&first.snapshot).unwrap(),
            serde_json::to_string(&second.snapshot).unwrap()
        );
        assert_eq!(first.unclassified, set(&["Sabor"]));
    }
}
