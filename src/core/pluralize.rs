//! English pluralization for envelope labels
//!
//! Resource labels are usually camelCase (`schoolClass`, `productVariety`);
//! only the trailing word is inflected, so the prefix is kept as written.

/// Nouns whose plural does not follow a suffix rule
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("datum", "data"),
    ("index", "indices"),
];

/// Nouns with identical singular and plural forms
const UNCOUNTABLE: &[&str] = &["sheep", "series", "species", "deer", "fish", "information"];

/// Utility for deriving the plural envelope label of a resource
pub struct Pluralizer;

impl Pluralizer {
    /// Convert a singular noun to its plural form
    ///
    /// # Examples
    ///
    /// ```
    /// use restbase::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("parent"), "parents");
    /// assert_eq!(Pluralizer::pluralize("child"), "children");
    /// assert_eq!(Pluralizer::pluralize("schoolClass"), "schoolClasses");
    /// assert_eq!(Pluralizer::pluralize("productVariety"), "productVarieties");
    /// ```
    pub fn pluralize(singular: &str) -> String {
        if singular.is_empty() {
            return String::new();
        }

        let split = Self::last_word_start(singular);
        let (prefix, word) = singular.split_at(split);
        let lower = word.to_lowercase();

        if UNCOUNTABLE.contains(&lower.as_str()) {
            return singular.to_string();
        }

        if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == lower) {
            return format!("{}{}", prefix, Self::match_case(word, plural));
        }

        format!("{}{}", prefix, Self::apply_suffix_rules(word))
    }

    fn apply_suffix_rules(word: &str) -> String {
        match word {
            // Consonant + y -> ies
            s if s.len() > 1
                && s.ends_with('y')
                && !["ay", "ey", "iy", "oy", "uy"].iter().any(|v| s.ends_with(v)) =>
            {
                format!("{}ies", &s[..s.len() - 1])
            }

            s if ["s", "sh", "ch", "x", "z"].iter().any(|e| s.ends_with(e)) => {
                format!("{}es", s)
            }

            s if s.ends_with("fe") && s.len() > 2 => format!("{}ves", &s[..s.len() - 2]),

            s if s.ends_with('f') && !s.ends_with("ff") && s.len() > 1 => {
                format!("{}ves", &s[..s.len() - 1])
            }

            // Consonant + o -> oes, with the usual exceptions
            s if s.ends_with('o') && s.len() > 1 => {
                let vowel_before = s[..s.len() - 1]
                    .chars()
                    .last()
                    .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'));
                if vowel_before || matches!(s, "photo" | "piano" | "halo" | "memo" | "logo") {
                    format!("{}s", s)
                } else {
                    format!("{}es", s)
                }
            }

            s => format!("{}s", s),
        }
    }

    /// Byte offset of the last camelCase word
    fn last_word_start(label: &str) -> usize {
        label
            .char_indices()
            .filter(|(i, c)| *i > 0 && c.is_uppercase())
            .map(|(i, _)| i)
            .last()
            .unwrap_or(0)
    }

    fn match_case(original: &str, replacement: &str) -> String {
        let capitalized = original.chars().next().is_some_and(char::is_uppercase);
        if !capitalized {
            return replacement.to_string();
        }
        let mut chars = replacement.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
