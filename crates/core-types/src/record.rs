use crate::error::CoreError;
use crate::period::FiscalPeriod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One row of reported figures for a fiscal period.
///
/// Monetary amounts are in thousands of dollars. `same_shop_sales_growth` is a
/// percentage (`0.8` means 0.8%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub period: FiscalPeriod,
    pub total_revenues: Decimal,
    pub company_operated_revenue: Decimal,
    pub franchising_and_other_revenue: Decimal,
    pub total_costs_and_expenses: Decimal,
    pub net_income_loss: Decimal,
    /// Shop count at the end of the period.
    pub shop_count: u32,
    pub systemwide_auv: Decimal,
    pub same_shop_sales_growth: Decimal,
}

/// The ordered table of records, oldest period first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialTable {
    records: Vec<FinancialRecord>,
}

impl FinancialTable {
    pub fn new(records: Vec<FinancialRecord>) -> Result<Self, CoreError> {
        if records.is_empty() {
            return Err(CoreError::EmptyTable);
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.period) {
                return Err(CoreError::DuplicatePeriod(record.period.to_string()));
            }
        }

        if let Some(pair) = records.windows(2).find(|w| w[0].period >= w[1].period) {
            return Err(CoreError::UnorderedPeriods {
                previous: pair[0].period.to_string(),
                next: pair[1].period.to_string(),
            });
        }

        Ok(Self { records })
    }

    /// For built-in rows whose periods are known to be unique and ascending.
    pub(crate) fn from_trusted(records: Vec<FinancialRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn periods(&self) -> Vec<FiscalPeriod> {
        self.records.iter().map(|r| r.period).collect()
    }

    pub fn last_period(&self) -> FiscalPeriod {
        // Construction guarantees at least one record.
        self.records[self.records.len() - 1].period
    }

    pub fn revenues(&self) -> Vec<Decimal> {
        self.column(|r| r.total_revenues)
    }

    pub fn shop_counts(&self) -> Vec<Decimal> {
        self.column(|r| Decimal::from(r.shop_count))
    }

    pub fn auvs(&self) -> Vec<Decimal> {
        self.column(|r| r.systemwide_auv)
    }

    pub fn same_shop_sales_growth(&self) -> Vec<Decimal> {
        self.column(|r| r.same_shop_sales_growth)
    }

    fn column<F>(&self, accessor: F) -> Vec<Decimal>
    where
        F: Fn(&FinancialRecord) -> Decimal,
    {
        self.records.iter().map(accessor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::reference_dataset;

    #[test]
    fn rejects_empty_table() {
        assert_eq!(FinancialTable::new(vec![]), Err(CoreError::EmptyTable));
    }

    #[test]
    fn rejects_duplicate_periods() {
        let mut records = reference_dataset().records().to_vec();
        records.push(records[0].clone());
        assert_eq!(
            FinancialTable::new(records),
            Err(CoreError::DuplicatePeriod("2020".to_string()))
        );
    }

    #[test]
    fn rejects_unordered_periods() {
        let mut records = reference_dataset().records().to_vec();
        records.reverse();
        assert_eq!(
            FinancialTable::new(records),
            Err(CoreError::UnorderedPeriods {
                previous: "2023_9M".to_string(),
                next: "2022".to_string(),
            })
        );
    }

    #[test]
    fn accepts_rows_in_ascending_order() {
        let records = reference_dataset().records().to_vec();
        let table = FinancialTable::new(records).unwrap();
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn columns_follow_row_order() {
        let table = reference_dataset();
        let shops: Vec<u32> = table.records().iter().map(|r| r.shop_count).collect();
        assert_eq!(shops, vec![441, 538, 671, 794]);
        assert_eq!(table.shop_counts()[3], Decimal::from(794));
        assert_eq!(table.last_period().to_string(), "2023_9M");
    }
}
