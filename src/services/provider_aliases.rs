use std::collections::HashMap;

/// Canonical provider names and the labels stored documents use for them
///
/// Watch-provider data was crawled over several years, so a provider renamed
/// upstream shows up under every name it ever had. Rent/buy storefronts
/// ("Apple TV", "Amazon Video") are separate providers from the subscription
/// services sharing their brand.
const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("Netflix", &["Netflix", "Netflix basic with Ads", "Netflix Standard with Ads"]),
    (
        "Amazon Prime Video",
        &["Amazon Prime Video", "Prime Video", "Amazon Prime"],
    ),
    ("Amazon Video", &["Amazon Video"]),
    ("Disney+", &["Disney+", "Disney Plus"]),
    ("Hulu", &["Hulu"]),
    ("HBO Max", &["HBO Max", "Max"]),
    ("Apple TV+", &["Apple TV+", "Apple TV Plus"]),
    ("Apple TV", &["Apple TV", "Apple iTunes"]),
    (
        "Paramount+",
        &["Paramount+", "Paramount Plus", "Paramount+ with Showtime", "Paramount"],
    ),
    ("Peacock", &["Peacock", "Peacock Premium", "Peacock Premium Plus"]),
    ("Crunchyroll", &["Crunchyroll"]),
    ("YouTube", &["YouTube", "YouTube Premium", "YouTube Free"]),
    ("Tubi", &["Tubi", "Tubi TV"]),
    ("Pluto TV", &["Pluto TV"]),
];

/// Lookup from any known provider label to its full alias set
#[derive(Debug, Clone)]
pub struct ProviderAliases {
    canonical: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl Default for ProviderAliases {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALIASES
                .iter()
                .map(|(name, aliases)| (name.to_string(), aliases.iter().map(|a| a.to_string()).collect())),
        )
    }
}

impl ProviderAliases {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut canonical = Vec::new();
        let mut index = HashMap::new();

        for (name, mut aliases) in entries {
            if !aliases.contains(&name) {
                aliases.insert(0, name.clone());
            }
            let position = canonical.len();
            for alias in &aliases {
                index.entry(alias.to_lowercase()).or_insert(position);
            }
            canonical.push((name, aliases));
        }

        Self { canonical, index }
    }

    /// Every stored label that should match `provider`
    ///
    /// Matching is case-insensitive on any label. Unknown providers expand to
    /// themselves so a new provider still filters on its own name.
    pub fn expand(&self, provider: &str) -> Vec<String> {
        let provider = provider.trim();
        match self.index.get(&provider.to_lowercase()) {
            Some(&position) => {
                let mut aliases = self.canonical[position].1.clone();
                if !aliases.iter().any(|a| a == provider) {
                    aliases.push(provider.to_string());
                }
                aliases
            }
            None => vec![provider.to_string()],
        }
    }

    /// Canonical name for a label, if known
    pub fn canonical_name(&self, provider: &str) -> Option<&str> {
        self.index
            .get(&provider.trim().to_lowercase())
            .map(|&position| self.canonical[position].0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_canonical_disney() {
        let aliases = ProviderAliases::default();
        let expanded = aliases.expand("Disney+");
        assert!(expanded.contains(&"Disney+".to_string()));
        assert!(expanded.contains(&"Disney Plus".to_string()));
    }

    #[test]
    fn test_expand_from_legacy_label() {
        let aliases = ProviderAliases::default();
        assert_eq!(aliases.canonical_name("disney plus"), Some("Disney+"));
        assert_eq!(aliases.expand("disney plus"), vec!["Disney+", "Disney Plus", "disney plus"]);
    }

    #[test]
    fn test_expand_unknown_provider() {
        let aliases = ProviderAliases::default();
        assert_eq!(aliases.expand("Mubi"), vec!["Mubi"]);
        assert_eq!(aliases.canonical_name("Mubi"), None);
    }

    #[test]
    fn test_storefronts_are_not_subscription_aliases() {
        let aliases = ProviderAliases::default();
        assert!(!aliases.expand("Apple TV+").contains(&"Apple TV".to_string()));
        assert_eq!(aliases.canonical_name("apple tv"), Some("Apple TV"));
        assert_eq!(aliases.canonical_name("Apple TV Plus"), Some("Apple TV+"));
        assert!(!aliases.expand("Prime Video").contains(&"Amazon Video".to_string()));
        assert_eq!(aliases.expand("HBO"), vec!["HBO"]);
    }

    #[test]
    fn test_custom_table_includes_canonical_name() {
        let aliases = ProviderAliases::new(vec![(
            "Shudder".to_string(),
            vec!["Shudder Amazon Channel".to_string()],
        )]);
        assert_eq!(
            aliases.expand("Shudder"),
            vec!["Shudder", "Shudder Amazon Channel"]
        );
    }
}
