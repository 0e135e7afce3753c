//! Built-in CMMS field catalog.
//!
//! Used as fallback configuration when the caller has no rules table.

use super::catalog::RuleSet;
use super::types::{FieldRule, FieldType};
use crate::error::Result;

impl RuleSet {
    /// The default CMMS work-order catalog.
    pub fn builtin_cmms() -> Result<Self> {
        RuleSet::new([
            (
                FieldRule::new("Asset ID", FieldType::Text).with_required(true),
                vec!["asset", "asset number", "asset no", "equipment id", "equipment"],
            ),
            (
                FieldRule::new("Asset Type", FieldType::Text)
                    .with_reference_values(["Pump", "Motor", "Valve", "Compressor", "Fan"]),
                vec!["equipment type", "asset class", "class"],
            ),
            (
                FieldRule::new("Work Order Number", FieldType::Text).with_required(true),
                vec!["wo", "wo number", "wo #", "work order", "work order no", "order number"],
            ),
            (
                FieldRule::new("Work Order Date", FieldType::Date).with_required(true),
                vec!["wo date", "order date", "date", "created date", "date created"],
            ),
            (
                FieldRule::new("Completion Date", FieldType::Date),
                vec!["completed", "date completed", "finish date", "closed date"],
            ),
            (
                FieldRule::new("Description", FieldType::Text),
                vec!["desc", "work description", "details", "problem"],
            ),
            (
                FieldRule::new("Priority", FieldType::Text)
                    .with_reference_values(["Low", "Medium", "High", "Critical"]),
                vec!["prio", "urgency"],
            ),
            (
                FieldRule::new("Status", FieldType::Text)
                    .with_reference_values(["Open", "In Progress", "On Hold", "Closed"]),
                vec!["wo status", "state"],
            ),
            (
                FieldRule::new("Labor Hours", FieldType::Number),
                vec!["hours", "labour hours", "man hours", "labor"],
            ),
            (
                FieldRule::new("Cost", FieldType::Number),
                vec!["total cost", "amount", "price"],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_well_formed() {
        let rules = RuleSet::builtin_cmms().unwrap();
        assert_eq!(rules.len(), 10);
        assert_eq!(rules.field_names()[0], "Asset ID");
        assert!(rules.get("Work Order Date").unwrap().required);
        assert!(rules.get("Status").unwrap().has_reference_values());
    }
}
