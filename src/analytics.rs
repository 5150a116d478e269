//! Revenue and expense aggregation
//!
//! Pure functions over already-filtered appointment and expense sets. No
//! side effects and no store access; callers pick the period, these fold it.
//! Every metric reports 0 on an empty set rather than erroring or producing
//! NaN.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Appointment, FixedExpense, VariableExpense};

/// Derived metrics for one reporting period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// Sum of prices charged plus tips
    pub total_revenue: f64,
    /// Number of appointments in the period
    pub appointment_count: usize,
    /// Mean price charged; 0 when the period has no appointments
    pub average_ticket: f64,
    /// Number of distinct clients seen
    pub unique_clients: usize,
    /// Sum of active fixed expense amounts
    pub total_fixed_expenses: f64,
    /// Sum of variable expense amounts in the period
    pub total_variable_expenses: f64,
}

/// Sum of prices charged plus tips.
#[must_use]
pub fn total_revenue(appointments: &[Appointment]) -> f64 {
    appointments.iter().map(|a| a.price_charged + a.tip).sum()
}

/// Mean price charged, 0 on an empty set (never a division by zero).
#[must_use]
pub fn average_ticket(appointments: &[Appointment]) -> f64 {
    if appointments.is_empty() {
        return 0.0;
    }
    appointments.iter().map(|a| a.price_charged).sum::<f64>() / appointments.len() as f64
}

/// Count of distinct client ids across the set.
#[must_use]
pub fn unique_clients(appointments: &[Appointment]) -> usize {
    appointments
        .iter()
        .map(|a| a.client_id)
        .collect::<HashSet<_>>()
        .len()
}

/// Sum of fixed expense amounts.
#[must_use]
pub fn total_fixed_expenses(expenses: &[FixedExpense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Sum of variable expense amounts.
#[must_use]
pub fn total_variable_expenses(expenses: &[VariableExpense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Revenue per day (prices charged, tips excluded), ascending by date.
/// This is the dashboard chart series.
#[must_use]
pub fn daily_revenue(appointments: &[Appointment]) -> Vec<(NaiveDate, f64)> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for appointment in appointments {
        *by_day.entry(appointment.date).or_insert(0.0) += appointment.price_charged;
    }
    by_day.into_iter().collect()
}

/// Fold a period's appointments and expenses into a [`PeriodSummary`].
#[must_use]
pub fn summarize(
    appointments: &[Appointment],
    fixed: &[FixedExpense],
    variable: &[VariableExpense],
) -> PeriodSummary {
    PeriodSummary {
        total_revenue: total_revenue(appointments),
        appointment_count: appointments.len(),
        average_ticket: average_ticket(appointments),
        unique_clients: unique_clients(appointments),
        total_fixed_expenses: total_fixed_expenses(fixed),
        total_variable_expenses: total_variable_expenses(variable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(id: i64, client_id: i64, date: &str, price: f64, tip: f64) -> Appointment {
        Appointment {
            id,
            date: date.parse().expect("valid date"),
            time: "10:00".to_string(),
            client_id,
            service_id: 1,
            price_charged: price,
            tip,
            channel: "Booksy".to_string(),
            payment_method: "Efectivo".to_string(),
            notes: String::new(),
            client_name: None,
            service_name: None,
            category_name: None,
            supply_cost: None,
        }
    }

    #[test]
    fn test_empty_set_yields_zeroes() {
        let summary = summarize(&[], &[], &[]);
        assert_eq!(summary, PeriodSummary::default());
        assert_eq!(summary.average_ticket, 0.0);
    }

    #[test]
    fn test_revenue_includes_tips_average_does_not() {
        let appointments = vec![
            appointment(1, 10, "2025-03-01", 40.0, 5.0),
            appointment(2, 11, "2025-03-02", 60.0, 0.0),
        ];
        assert_eq!(total_revenue(&appointments), 105.0);
        assert_eq!(average_ticket(&appointments), 50.0);
    }

    #[test]
    fn test_unique_clients_deduplicates() {
        let appointments = vec![
            appointment(1, 10, "2025-03-01", 40.0, 0.0),
            appointment(2, 10, "2025-03-02", 40.0, 0.0),
            appointment(3, 11, "2025-03-02", 40.0, 0.0),
        ];
        assert_eq!(unique_clients(&appointments), 2);
    }

    #[test]
    fn test_daily_revenue_groups_and_orders() {
        let appointments = vec![
            appointment(1, 10, "2025-03-02", 30.0, 2.0),
            appointment(2, 11, "2025-03-01", 45.0, 0.0),
            appointment(3, 12, "2025-03-02", 20.0, 0.0),
        ];
        let series = daily_revenue(&appointments);
        assert_eq!(
            series,
            vec![
                ("2025-03-01".parse().expect("valid date"), 45.0),
                ("2025-03-02".parse().expect("valid date"), 50.0),
            ]
        );
    }
}
