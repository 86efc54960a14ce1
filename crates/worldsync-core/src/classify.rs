//! Action-code classification and persistence scoping.
//!
//! Every catalog entry carries a raw numeric action code. Classification maps
//! that code to a semantic [`Category`], which drives two independent
//! decisions: whether the entry is in scope for persistence at all, and which
//! numeric category code the store receives.
//!
//! All tables live in an explicit [`ClassifierConfig`] passed at construction
//! so the allow-list and code mappings are testable in isolation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic item category derived from the raw action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fist,
    Tool,
    None,
    Background,
    Seed,
    Cloth,
    Component,
    Foreground,
}

impl Category {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Fist => "fist",
            Self::Tool => "tool",
            Self::None => "none",
            Self::Background => "background",
            Self::Seed => "seed",
            Self::Cloth => "cloth",
            Self::Component => "component",
            Self::Foreground => "foreground",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification rule: any listed action code maps to `category`.
#[derive(Debug, Clone)]
pub struct ClassifierRule {
    pub codes: Vec<i32>,
    pub category: Category,
}

/// Immutable classification tables.
///
/// The [`Default`] impl carries the canonical tables; tests construct
/// narrower configs to probe individual rules.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Ordered rules; first match wins.
    pub rules: Vec<ClassifierRule>,
    /// Category for any code no rule claims.
    pub fallback: Category,
    /// Categories eligible for persistence.
    pub scope_categories: Vec<Category>,
    /// Named exceptions persisted regardless of category (base tools).
    pub allow_list: Vec<String>,
    /// Semantic category to persisted numeric code.
    pub persisted_codes: Vec<(Category, i16)>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassifierRule {
                    codes: vec![0],
                    category: Category::Fist,
                },
                ClassifierRule {
                    codes: vec![1],
                    category: Category::Tool,
                },
                ClassifierRule {
                    codes: vec![8, 37, 44, 48, 64, 107, 121, 133, 137],
                    category: Category::None,
                },
                ClassifierRule {
                    codes: vec![18, 22, 23, 28],
                    category: Category::Background,
                },
                ClassifierRule {
                    codes: vec![19],
                    category: Category::Seed,
                },
                ClassifierRule {
                    codes: vec![20],
                    category: Category::Cloth,
                },
                ClassifierRule {
                    codes: vec![129],
                    category: Category::Component,
                },
            ],
            fallback: Category::Foreground,
            scope_categories: vec![Category::Foreground, Category::Background],
            allow_list: vec!["Fist".to_string(), "Wrench".to_string()],
            persisted_codes: vec![
                (Category::Foreground, 1),
                (Category::Background, 2),
                (Category::Fist, 3),
                (Category::Tool, 3),
            ],
        }
    }
}

/// Total classification function plus scope and code lookups.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    #[must_use]
    pub const fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Map a raw action code to its semantic category. Total over `i32`.
    #[must_use]
    pub fn classify(&self, action_type: i32) -> Category {
        self.config
            .rules
            .iter()
            .find(|rule| rule.codes.contains(&action_type))
            .map_or(self.config.fallback, |rule| rule.category)
    }

    /// Whether an entry with this category and name is persisted at all.
    ///
    /// Scope is category-driven; the allow-list admits named exceptions
    /// (base tools) whose categories would otherwise exclude them.
    #[must_use]
    pub fn in_scope(&self, category: Category, name: &str) -> bool {
        self.config.scope_categories.contains(&category)
            || self.config.allow_list.iter().any(|entry| entry == name)
    }

    /// Persisted numeric code for a category.
    ///
    /// `None` means the category has no mapping; callers report that as an
    /// anomaly and skip the field, never abort.
    #[must_use]
    pub fn persisted_code(&self, category: Category) -> Option<i16> {
        self.config
            .persisted_codes
            .iter()
            .find(|(mapped, _)| *mapped == category)
            .map(|(_, code)| *code)
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Classifier, ClassifierConfig, ClassifierRule};
    use proptest::prelude::*;

    #[test]
    fn canonical_fixed_points() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(0), Category::Fist);
        assert_eq!(classifier.classify(1), Category::Tool);
        assert_eq!(classifier.classify(19), Category::Seed);
        assert_eq!(classifier.classify(20), Category::Cloth);
        assert_eq!(classifier.classify(129), Category::Component);
        for code in [8, 37, 44, 48, 64, 107, 121, 133, 137] {
            assert_eq!(classifier.classify(code), Category::None, "code {code}");
        }
        for code in [18, 22, 23, 28] {
            assert_eq!(classifier.classify(code), Category::Background, "code {code}");
        }
    }

    #[test]
    fn unlisted_codes_fall_back_to_foreground() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(999), Category::Foreground);
        assert_eq!(classifier.classify(-1), Category::Foreground);
        assert_eq!(classifier.classify(2), Category::Foreground);
    }

    #[test]
    fn scope_admits_foreground_background_and_allow_listed_names() {
        let classifier = Classifier::default();
        assert!(classifier.in_scope(Category::Foreground, "Dirt"));
        assert!(classifier.in_scope(Category::Background, "Cave Background"));
        assert!(classifier.in_scope(Category::Fist, "Fist"));
        assert!(classifier.in_scope(Category::Tool, "Wrench"));
        assert!(!classifier.in_scope(Category::None, "Door Mover"));
        assert!(!classifier.in_scope(Category::Seed, "Dirt Seed"));
        assert!(!classifier.in_scope(Category::Fist, "Not A Base Tool"));
    }

    #[test]
    fn persisted_codes_follow_the_table() {
        let classifier = Classifier::default();
        assert_eq!(classifier.persisted_code(Category::Foreground), Some(1));
        assert_eq!(classifier.persisted_code(Category::Background), Some(2));
        assert_eq!(classifier.persisted_code(Category::Fist), Some(3));
        assert_eq!(classifier.persisted_code(Category::Tool), Some(3));
        assert_eq!(classifier.persisted_code(Category::None), None);
        assert_eq!(classifier.persisted_code(Category::Seed), None);
    }

    #[test]
    fn custom_tables_override_the_defaults() {
        let classifier = Classifier::new(ClassifierConfig {
            rules: vec![ClassifierRule {
                codes: vec![5],
                category: Category::Seed,
            }],
            fallback: Category::None,
            scope_categories: vec![Category::Seed],
            allow_list: vec![],
            persisted_codes: vec![(Category::Seed, 9)],
        });
        assert_eq!(classifier.classify(5), Category::Seed);
        assert_eq!(classifier.classify(0), Category::None);
        assert!(classifier.in_scope(Category::Seed, "anything"));
        assert_eq!(classifier.persisted_code(Category::Seed), Some(9));
    }

    proptest! {
        #[test]
        fn scoped_categories_always_have_a_persisted_code(code in any::<i32>()) {
            let classifier = Classifier::default();
            let category = classifier.classify(code);
            if matches!(category, Category::Foreground | Category::Background) {
                prop_assert!(classifier.persisted_code(category).is_some());
            }
        }
    }
}
