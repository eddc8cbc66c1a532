//! Category filter over a collection snapshot

use super::Categorized;
use std::str::FromStr;

/// "All" or one category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter<C> {
    All,
    Only(C),
}

impl<C: PartialEq> CategoryFilter<C> {
    pub fn matches(&self, category: &C) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => c == category,
        }
    }
}

impl<C> Default for CategoryFilter<C> {
    fn default() -> Self {
        Self::All
    }
}

impl<C: FromStr> FromStr for CategoryFilter<C> {
    type Err = C::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Entities matching `filter`, in their original order
pub fn project<E: Categorized>(items: &[E], filter: &CategoryFilter<E::Category>) -> Vec<E> {
    items
        .iter()
        .filter(|e| filter.matches(&e.category()))
        .cloned()
        .collect()
}
