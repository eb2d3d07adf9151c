//! Terminal-style symbol group filters.
//!
//! A group is a comma-separated list of glob patterns, matched without regard
//! to case. A leading `!` turns a pattern into an exclusion:
//! `*USD*,!EURUSD` selects every USD pair except EURUSD.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid symbol pattern: {0}")]
pub struct SymbolFilterError(#[from] globset::Error);

#[derive(Debug, Clone)]
pub struct SymbolFilter {
    patterns: Vec<String>,
    include: GlobSet,
    exclude: GlobSet,
}

impl SymbolFilter {
    /// Filter for a symbol typed at the prompt: `usdjpy` becomes `*USDJPY*`.
    pub fn for_symbol(input: &str) -> Result<Self, SymbolFilterError> {
        Self::parse(&format!("*{}*", input.trim().to_uppercase()))
    }

    /// Parse a group expression, compiling every pattern once.
    pub fn parse(group: &str) -> Result<Self, SymbolFilterError> {
        let mut patterns = Vec::new();
        let mut exclusions = Vec::new();
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();

        for pattern in group.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match pattern.strip_prefix('!') {
                Some(negated) => {
                    let negated = negated.to_uppercase();
                    exclude.add(GlobBuilder::new(&negated).case_insensitive(true).build()?);
                    exclusions.push(format!("!{negated}"));
                }
                None => {
                    let pattern = pattern.to_uppercase();
                    include.add(GlobBuilder::new(&pattern).case_insensitive(true).build()?);
                    patterns.push(pattern);
                }
            }
        }
        patterns.extend(exclusions);

        Ok(Self {
            patterns,
            include: include.build()?,
            exclude: exclude.build()?,
        })
    }

    /// True when the symbol hits an inclusion and no exclusion.
    pub fn matches(&self, symbol: &str) -> bool {
        self.include.is_match(symbol) && !self.exclude.is_match(symbol)
    }
}

impl fmt::Display for SymbolFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.patterns.join(","))
    }
}
