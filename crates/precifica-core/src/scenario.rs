//! # Scenario Context
//!
//! The item set and parameters of one pricing session, owned by the
//! caller and passed explicitly to every view that needs them.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  Scenario                    │──► price_items()   → Vec<CalculatedItem>
//! │  items:  Vec<LineItem>       │──► summary()       → GlobalSummary
//! │  params: GlobalParameters    │──► compare()       → RegimeComparison
//! └──────────────────────────────┘──► minimum_viable() → RegimeComparison
//! ```

use serde::{Deserialize, Serialize};

use crate::aggregation::{summarize_items, GlobalSummary};
use crate::comparison::{compare, compare_minimum_viable, RegimeComparison};
use crate::pricing::{price_all, CalculatedItem};
use crate::types::{GlobalParameters, LineItem, TaxRegime};

/// Items and parameters for one calculation session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub items: Vec<LineItem>,
    pub params: GlobalParameters,
}

impl Scenario {
    pub fn new(items: Vec<LineItem>, params: GlobalParameters) -> Self {
        Scenario { items, params }
    }

    /// Prices every item under the active regime.
    pub fn price_items(&self) -> Vec<CalculatedItem> {
        price_all(&self.items, &self.params)
    }

    /// Portfolio summary under the active regime.
    pub fn summary(&self) -> GlobalSummary {
        summarize_items(&self.price_items(), &self.params)
    }

    /// Compares `candidates` at the configured margin.
    pub fn compare(&self, candidates: &[TaxRegime]) -> RegimeComparison {
        compare(&self.items, &self.params, candidates)
    }

    /// Compares `candidates` at zero margin.
    pub fn minimum_viable(&self, candidates: &[TaxRegime]) -> RegimeComparison {
        compare_minimum_viable(&self.items, &self.params, candidates)
    }

    /// Same items under different parameters.
    pub fn with_params(&self, params: GlobalParameters) -> Self {
        Scenario {
            items: self.items.clone(),
            params,
        }
    }
}
