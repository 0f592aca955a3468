//! Workshop income records
//!
//! Each income is one workshop. `total_cost` and `profit` are derived from the
//! guest count, per-guest cost and shipping, and are recomputed on every write
//! and every read rather than trusted from storage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, ClassType};
use crate::money;

/// Income entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    /// Database ID (None for incomes not yet saved)
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub class_type: String,
    #[serde(default, deserialize_with = "money::deserialize_count")]
    pub guest_count: i64,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub payment: f64,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub shipping_cost: f64,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub cost_per_guest: f64,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub total_cost: f64,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub profit: f64,
    #[serde(default)]
    pub name: String,
}

/// Fields accepted when creating or overwriting an income.
///
/// Derived fields are not accepted; `cost_per_guest` defaults to the class type's rate.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomeInput {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub class_type: String,
    #[serde(default, deserialize_with = "money::deserialize_count")]
    pub guest_count: i64,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub payment: f64,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub shipping_cost: f64,
    #[serde(default, deserialize_with = "money::deserialize_optional_amount")]
    pub cost_per_guest: Option<f64>,
    #[serde(default)]
    pub name: String,
}

/// `guest_count * cost_per_guest + shipping_cost`
pub fn compute_total_cost(guest_count: i64, cost_per_guest: f64, shipping_cost: f64) -> f64 {
    guest_count.max(0) as f64 * money::sanitize(cost_per_guest) + money::sanitize(shipping_cost)
}

impl IncomeRecord {
    /// Refresh `total_cost` and `profit` from the source fields
    pub fn recompute(&mut self) {
        self.payment = money::sanitize(self.payment);
        self.shipping_cost = money::sanitize(self.shipping_cost);
        self.cost_per_guest = money::sanitize(self.cost_per_guest);
        self.guest_count = self.guest_count.max(0);
        self.total_cost =
            compute_total_cost(self.guest_count, self.cost_per_guest, self.shipping_cost);
        self.profit = self.payment - self.total_cost;
    }
}

impl IncomeInput {
    /// Build a record, resolving the per-guest cost from the class type when not given
    pub fn into_record(self, date: NaiveDate, class_types: &[ClassType]) -> IncomeRecord {
        let cost_per_guest = self.cost_per_guest.map(money::sanitize).unwrap_or_else(|| {
            catalog::find_class_type(class_types, &self.class_type)
                .map(|c| c.cost_per_person)
                .unwrap_or(0.0)
        });

        let mut record = IncomeRecord {
            id: None,
            user_id: self.user_id.trim().to_string(),
            date: Some(date),
            platform: self.platform.trim().to_string(),
            class_type: self.class_type.trim().to_string(),
            guest_count: self.guest_count,
            payment: self.payment,
            shipping_cost: self.shipping_cost,
            cost_per_guest,
            total_cost: 0.0,
            profit: 0.0,
            name: self.name.trim().to_string(),
        };
        record.recompute();
        record
    }
}

/// Get total payments received
pub fn total_income(incomes: &[IncomeRecord]) -> f64 {
    incomes.iter().map(|i| money::sanitize(i.payment)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(class_type: &str, cost_per_guest: Option<f64>) -> IncomeInput {
        IncomeInput {
            user_id: " u1 ".to_string(),
            date: "2025-04-12".to_string(),
            platform: "Airbnb".to_string(),
            class_type: class_type.to_string(),
            guest_count: 6,
            payment: 300.0,
            shipping_cost: 12.5,
            cost_per_guest,
            name: "Saturday wheel".to_string(),
        }
    }

    fn wheel() -> Vec<ClassType> {
        vec![ClassType {
            id: Some(1),
            name: "Wheel Throwing".to_string(),
            cost_per_person: 15.0,
        }]
    }

    #[test]
    fn test_compute_total_cost() {
        assert_eq!(compute_total_cost(4, 10.0, 5.0), 45.0);
        assert_eq!(compute_total_cost(-3, 10.0, 5.0), 5.0);
        assert_eq!(compute_total_cost(2, f64::NAN, 1.0), 1.0);
    }

    #[test]
    fn test_into_record_uses_class_rate() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
        let record = input("wheel throwing", None).into_record(date, &wheel());

        assert_eq!(record.user_id, "u1");
        assert_eq!(record.cost_per_guest, 15.0);
        assert_eq!(record.total_cost, 6.0 * 15.0 + 12.5);
        assert_eq!(record.profit, 300.0 - 102.5);
    }

    #[test]
    fn test_into_record_explicit_rate_wins() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
        let record = input("Wheel Throwing", Some(0.0)).into_record(date, &wheel());

        assert_eq!(record.cost_per_guest, 0.0);
        assert_eq!(record.total_cost, 12.5);
    }

    #[test]
    fn test_unknown_class_type_costs_nothing_per_guest() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
        let record = input("Glazing", None).into_record(date, &wheel());
        assert_eq!(record.cost_per_guest, 0.0);
    }

    #[test]
    fn test_recompute_ignores_stored_derived_values() {
        let mut record: IncomeRecord = serde_json::from_str(
            r#"{"guest_count": 2, "payment": "100", "cost_per_guest": 20,
                "shipping_cost": null, "total_cost": 999, "profit": -999}"#,
        )
        .unwrap();
        record.recompute();

        assert_eq!(record.total_cost, 40.0);
        assert_eq!(record.profit, 60.0);
        assert_eq!(total_income(&[record]), 100.0);
    }

    #[test]
    fn test_input_accepts_text_rate() {
        let input: IncomeInput = serde_json::from_str(
            r#"{"user_id": "u1", "date": "2025-04-12", "guest_count": "3",
                "payment": "90", "cost_per_guest": "15"}"#,
        )
        .unwrap();
        assert_eq!(input.cost_per_guest, Some(15.0));

        let date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
        let record = input.into_record(date, &[]);
        assert_eq!(record.total_cost, 45.0);
        assert_eq!(record.profit, 45.0);
    }
}
