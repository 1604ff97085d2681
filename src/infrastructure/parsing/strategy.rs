//! Ordered fallback chains for field extraction
//!
//! A field is resolved by trying named strategies in order and keeping the
//! first non-empty result. Results are never merged across strategies.

use std::fmt::Debug;

use tracing::{debug, trace};

use super::context::PageContext;
use crate::domain::Taxonomy;

/// Emptiness check applied to every strategy result
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Blank for Vec<String> {
    fn is_blank(&self) -> bool {
        self.iter().all(Blank::is_blank)
    }
}

impl Blank for Taxonomy {
    fn is_blank(&self) -> bool {
        !self.is_complete()
    }
}

pub type StrategyFn<T> = fn(&PageContext<'_>) -> Option<T>;

/// A single named extraction attempt
pub struct Strategy<T> {
    pub name: &'static str,
    pub run: StrategyFn<T>,
}

/// Ordered strategies for one field
pub struct FieldChain<T> {
    field: &'static str,
    strategies: Vec<Strategy<T>>,
}

impl<T: Blank + Debug> FieldChain<T> {
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy to the end of the chain
    #[must_use]
    pub fn then(mut self, name: &'static str, run: StrategyFn<T>) -> Self {
        self.strategies.push(Strategy { name, run });
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name).collect()
    }

    /// First non-blank strategy result, with the winning strategy's name
    pub fn resolve_with_source(&self, context: &PageContext<'_>) -> Option<(T, &'static str)> {
        for strategy in &self.strategies {
            match (strategy.run)(context) {
                Some(value) if !value.is_blank() => {
                    debug!(
                        field = self.field,
                        strategy = strategy.name,
                        "Resolved {}: {:?}",
                        self.field,
                        value
                    );
                    return Some((value, strategy.name));
                }
                _ => trace!(field = self.field, strategy = strategy.name, "No value"),
            }
        }

        debug!(field = self.field, "No strategy produced a value");
        None
    }

    pub fn resolve(&self, context: &PageContext<'_>) -> Option<T> {
        self.resolve_with_source(context).map(|(value, _)| value)
    }
}
