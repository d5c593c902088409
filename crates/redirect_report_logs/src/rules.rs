//! # Redirect rules
//!
//! Redirect rules are read from nginx `map` files, where every regular
//! expression entry starts with `~` (or `~*` for case-insensitive matching):
//!
//! ```text
//! ~*^/article/?$ /en/article;
//! ~^/Blog/(.*)$ /en/blog/$1;
//! ```
//!
//! Only the pattern itself is of interest, the redirect target and anything
//! else on the line are ignored.

use crate::classify::Category;
use derive_more::Deref;
use indexmap::IndexMap;
use fancy_regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use tracing::{debug, instrument, warn};

const DIRECTIVE_PREFIX: char = '~';
const CASE_INSENSITIVE_MARKER: char = '*';

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid redirect pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },
}

/// A single line of a redirect rule file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleLine<'a> {
    Directive {
        pattern: &'a str,
        case_insensitive: bool,
    },
    Ignored,
}

impl<'a> RuleLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let Some(rest) = line.strip_prefix(DIRECTIVE_PREFIX) else {
            return RuleLine::Ignored;
        };

        let (rest, case_insensitive) = match rest.strip_prefix(CASE_INSENSITIVE_MARKER) {
            Some(rest) => (rest, true),
            None => (rest, false),
        };

        match rest.split(char::is_whitespace).next() {
            Some(pattern) if !pattern.is_empty() => RuleLine::Directive {
                pattern,
                case_insensitive,
            },
            _ => RuleLine::Ignored,
        }
    }
}

/// Per-category hit counters of a redirect rule.
///
/// The derived ordering compares `public` first, then `syndication`,
/// `google` and `bing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RuleCounts {
    pub public: u64,
    pub syndication: u64,
    pub google: u64,
    pub bing: u64,
}

impl RuleCounts {
    pub fn increment(&mut self, category: Category) {
        *self.get_mut(category) += 1;
    }

    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Public => self.public,
            Category::Syndication => self.syndication,
            Category::Google => self.google,
            Category::Bing => self.bing,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut u64 {
        match category {
            Category::Public => &mut self.public,
            Category::Syndication => &mut self.syndication,
            Category::Google => &mut self.google,
            Category::Bing => &mut self.bing,
        }
    }

    /// Returns the number of hits across all categories.
    pub fn total(&self) -> u64 {
        self.public + self.syndication + self.google + self.bing
    }
}

#[derive(Debug, Clone)]
pub struct RedirectRule {
    pattern: Regex,
    source: String,
    counts: RuleCounts,
}

impl RedirectRule {
    pub fn new(source: &str, case_insensitive: bool) -> Result<Self, RuleError> {
        let pattern = RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source_err| RuleError::InvalidPattern {
                pattern: source.into(),
                source: source_err,
            })?;

        Ok(Self {
            pattern,
            source: source.into(),
            counts: RuleCounts::default(),
        })
    }

    /// The pattern as written in the rule file.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn counts(&self) -> &RuleCounts {
        &self.counts
    }

    /// Patterns that exceed the backtracking limit for a path are treated as
    /// not matching it.
    pub fn is_match(&self, path: &str) -> bool {
        self.pattern.is_match(path).unwrap_or_else(|error| {
            warn!(pattern = %self.source, %path, "Failed to match redirect rule: {error}");
            false
        })
    }

    pub fn count(&mut self, category: Category) {
        self.counts.increment(category);
    }

    /// Orders rules by descending hit counts, i.e. the most relevant rules
    /// first.
    pub fn cmp_relevance(&self, other: &Self) -> Ordering {
        other.counts.cmp(&self.counts)
    }
}

/// All known redirect rules, keyed by their pattern source and kept in the
/// order in which they were loaded.
#[derive(Debug, Clone, Default, Deref)]
pub struct RedirectRules(IndexMap<String, RedirectRule>);

impl RedirectRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new rule set from the contents of a single rule file.
    pub fn load_from(source: &str) -> Result<Self, RuleError> {
        let mut rules = Self::new();
        rules.load(source)?;
        Ok(rules)
    }

    /// Adds the rules of another rule file to the set and returns the number
    /// of rule directives that were found.
    ///
    /// A pattern that is already known replaces the existing rule, which
    /// resets its counters, but keeps its original position.
    #[instrument(level = "debug", skip_all, err)]
    pub fn load(&mut self, source: &str) -> Result<usize, RuleError> {
        let mut num_directives = 0;

        for line in source.lines() {
            let RuleLine::Directive {
                pattern,
                case_insensitive,
            } = RuleLine::parse(line)
            else {
                continue;
            };

            let rule = RedirectRule::new(pattern, case_insensitive)?;
            if self.0.insert(pattern.to_string(), rule).is_some() {
                debug!(%pattern, "Replacing duplicate redirect rule");
            }

            num_directives += 1;
        }

        Ok(num_directives)
    }

    /// Returns the first rule, in load order, matching the given path.
    pub fn find_match(&self, path: &str) -> Option<&RedirectRule> {
        self.0.values().find(|rule| rule.is_match(path))
    }

    pub fn find_match_mut(&mut self, path: &str) -> Option<&mut RedirectRule> {
        self.0.values_mut().find(|rule| rule.is_match(path))
    }
}
