//! Cash-flow summary for the dashboard (today and the current month).

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use nexus_core::CurrencyFormat;

use crate::entry::{EntryKind, LedgerEntry};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardSummary {
    pub income_today: f64,
    pub expense_today: f64,
    pub balance_today: f64,
    pub income_month: f64,
    pub expense_month: f64,
    pub balance_month: f64,
    pub entries_this_month: usize,
    /// Most recently created entry, by `created_at`.
    pub latest: Option<LedgerEntry>,
}

impl DashboardSummary {
    pub fn compute(entries: &[LedgerEntry], today: NaiveDate) -> Self {
        let mut summary = Self::default();

        for entry in entries {
            let same_month =
                entry.date().year() == today.year() && entry.date().month() == today.month();

            if entry.date() == today {
                match entry.kind() {
                    EntryKind::Income => summary.income_today += entry.amount(),
                    EntryKind::Expense => summary.expense_today += entry.amount(),
                }
            }
            if same_month {
                summary.entries_this_month += 1;
                match entry.kind() {
                    EntryKind::Income => summary.income_month += entry.amount(),
                    EntryKind::Expense => summary.expense_month += entry.amount(),
                }
            }

            let newer = summary
                .latest
                .as_ref()
                .is_none_or(|l| entry.created_at() > l.created_at());
            if newer {
                summary.latest = Some(entry.clone());
            }
        }

        summary.balance_today = summary.income_today - summary.expense_today;
        summary.balance_month = summary.income_month - summary.expense_month;
        summary
    }

    /// One-line description of the latest entry, e.g. `Income of $27.00 on 2024-03-05`.
    pub fn latest_label(&self, currency: &CurrencyFormat) -> String {
        match &self.latest {
            Some(e) => format!(
                "{} of {} on {}",
                e.kind().label(),
                currency.format(e.amount()),
                e.date()
            ),
            None => "No recent entries".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryDraft;
    use chrono::{Duration, TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(id: &str, kind: EntryKind, date: NaiveDate, amount: f64, minutes: i64) -> LedgerEntry {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        LedgerEntry::record(
            id.parse().unwrap(),
            EntryDraft {
                kind,
                date: Some(date),
                description: id.to_string(),
                category: "General".to_string(),
                payment_method: "Cash".to_string(),
                amount,
            },
            created,
        )
    }

    #[test]
    fn splits_today_and_month() {
        let today = day(2024, 3, 15);
        let entries = vec![
            entry("a", EntryKind::Income, today, 100.0, 1),
            entry("b", EntryKind::Expense, today, 30.0, 2),
            entry("c", EntryKind::Income, day(2024, 3, 2), 50.0, 3),
            entry("d", EntryKind::Expense, day(2024, 2, 28), 999.0, 4),
            entry("e", EntryKind::Income, day(2023, 3, 15), 999.0, 0),
        ];

        let s = DashboardSummary::compute(&entries, today);
        assert_eq!(s.income_today, 100.0);
        assert_eq!(s.expense_today, 30.0);
        assert_eq!(s.balance_today, 70.0);
        assert_eq!(s.income_month, 150.0);
        assert_eq!(s.expense_month, 30.0);
        assert_eq!(s.balance_month, 120.0);
        assert_eq!(s.entries_this_month, 3);
        assert_eq!(s.latest.as_ref().map(|e| e.description()), Some("d"));
    }

    #[test]
    fn latest_label_formats_amount() {
        let today = day(2024, 3, 5);
        let s = DashboardSummary::compute(&[entry("a", EntryKind::Income, today, 27.0, 0)], today);
        assert_eq!(s.latest_label(&CurrencyFormat::default()), "Income of $27.00 on 2024-03-05");

        let empty = DashboardSummary::compute(&[], today);
        assert_eq!(empty.latest_label(&CurrencyFormat::default()), "No recent entries");
        assert_eq!(empty.balance_month, 0.0);
    }
}
