use crate::{
    db::Filter,
    models::{FilterSelection, PaymentType},
    services::provider_aliases::ProviderAliases,
};

/// Rating floor applied when a single person, genre or keyword is the only selection
pub const SINGLE_FACET_MIN_RATING: f64 = 7.0;

/// Turns facet selections into a filter tree
///
/// Every person, genre and keyword must match on its own (AND); languages
/// match any (OR); providers match any alias on any selected payment type.
/// Never fails.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    aliases: ProviderAliases,
    region: String,
}

impl FilterCompiler {
    pub fn new(aliases: ProviderAliases, region: impl Into<String>) -> Self {
        Self {
            aliases,
            region: region.into(),
        }
    }

    /// Compiles the facet selection
    ///
    /// `other_selections` counts selections outside the facets (free text,
    /// exact ids) so the single-facet rating floor is only applied when the
    /// facet really is the only thing selected.
    pub fn compile(&self, selection: &FilterSelection, other_selections: usize) -> Filter {
        let mut clauses = Vec::new();

        for (field, values) in [
            ("cast", &selection.persons),
            ("genres", &selection.genres),
            ("keywords", &selection.keywords),
        ] {
            for value in sorted_distinct(values) {
                clauses.push(Filter::field_in(field, [value]));
            }
        }

        if !selection.languages.is_empty() {
            clauses.push(Filter::field_in(
                "original_language",
                sorted_distinct(&selection.languages),
            ));
        }

        let payment_types = sorted_distinct(&selection.payment_types);

        if !selection.providers.is_empty() {
            let payment_types = if payment_types.is_empty() {
                vec![PaymentType::Stream]
            } else {
                payment_types
            };

            let per_provider = sorted_distinct(&selection.providers)
                .into_iter()
                .map(|provider| {
                    let aliases = self.aliases.expand(&provider);
                    tracing::debug!(
                        provider = %provider,
                        canonical = self.aliases.canonical_name(&provider).unwrap_or("unknown"),
                        labels = aliases.len(),
                        "Expanded provider aliases"
                    );
                    Filter::or(
                        payment_types
                            .iter()
                            .map(|payment_type| {
                                Filter::field_in(self.provider_field(*payment_type), aliases.clone())
                            })
                            .collect(),
                    )
                })
                .collect();
            clauses.push(Filter::or(per_provider));
        } else if !payment_types.is_empty() {
            clauses.push(Filter::or(
                payment_types
                    .iter()
                    .map(|payment_type| Filter::exists(self.provider_field(*payment_type)))
                    .collect(),
            ));
        }

        if is_single_facet(selection, other_selections) {
            clauses.push(Filter::gt("vote_average", SINGLE_FACET_MIN_RATING));
        }

        Filter::and(clauses)
    }

    fn provider_field(&self, payment_type: PaymentType) -> String {
        format!("watch_providers.{}.{}", self.region, payment_type)
    }
}

/// Exactly one person, genre or keyword and nothing else
fn is_single_facet(selection: &FilterSelection, other_selections: usize) -> bool {
    let facet_values = sorted_distinct(&selection.persons).len()
        + sorted_distinct(&selection.genres).len()
        + sorted_distinct(&selection.keywords).len();

    facet_values == 1
        && selection.languages.is_empty()
        && selection.providers.is_empty()
        && other_selections == 0
}

fn sorted_distinct<T: Ord + Clone>(values: &[T]) -> Vec<T> {
    let mut values = values.to_vec();
    values.sort();
    values.dedup();
    values
}
