//! The built-in Dutch Bros Inc. figures, fiscal 2020 through the first nine
//! months of 2023. Amounts in thousands of dollars.

use crate::period::FiscalPeriod;
use crate::record::{FinancialRecord, FinancialTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct Row {
    year: i32,
    months: u8,
    total_revenues: Decimal,
    company_operated_revenue: Decimal,
    franchising_and_other_revenue: Decimal,
    total_costs_and_expenses: Decimal,
    net_income_loss: Decimal,
    shop_count: u32,
    systemwide_auv: Decimal,
    same_shop_sales_growth: Decimal,
}

// The 2023 AUV is a placeholder; it was not reported for the nine-month period.
const ROWS: [Row; 4] = [
    Row {
        year: 2020,
        months: 12,
        total_revenues: dec!(327413),
        company_operated_revenue: dec!(244514),
        franchising_and_other_revenue: dec!(82899),
        total_costs_and_expenses: dec!(316413),
        net_income_loss: dec!(6058),
        shop_count: 441,
        systemwide_auv: dec!(1679),
        same_shop_sales_growth: dec!(0.8),
    },
    Row {
        year: 2021,
        months: 12,
        total_revenues: dec!(497876),
        company_operated_revenue: dec!(403746),
        franchising_and_other_revenue: dec!(94130),
        total_costs_and_expenses: dec!(609102),
        net_income_loss: dec!(-117931),
        shop_count: 538,
        systemwide_auv: dec!(1850),
        same_shop_sales_growth: dec!(9.0),
    },
    Row {
        year: 2022,
        months: 12,
        total_revenues: dec!(739012),
        company_operated_revenue: dec!(639710),
        franchising_and_other_revenue: dec!(99302),
        total_costs_and_expenses: dec!(741624),
        net_income_loss: dec!(-19253),
        shop_count: 671,
        systemwide_auv: dec!(1924),
        same_shop_sales_growth: dec!(0.6),
    },
    Row {
        year: 2023,
        months: 9,
        total_revenues: dec!(711653),
        company_operated_revenue: dec!(630588),
        franchising_and_other_revenue: dec!(81065),
        total_costs_and_expenses: dec!(667610),
        net_income_loss: dec!(13721),
        shop_count: 794,
        systemwide_auv: dec!(1950),
        same_shop_sales_growth: dec!(0.5),
    },
];

/// Builds the built-in financial table from literal constants.
pub fn reference_dataset() -> FinancialTable {
    let records = ROWS
        .iter()
        .map(|row| FinancialRecord {
            period: FiscalPeriod::from_parts(row.year, row.months),
            total_revenues: row.total_revenues,
            company_operated_revenue: row.company_operated_revenue,
            franchising_and_other_revenue: row.franchising_and_other_revenue,
            total_costs_and_expenses: row.total_costs_and_expenses,
            net_income_loss: row.net_income_loss,
            shop_count: row.shop_count,
            systemwide_auv: row.systemwide_auv,
            same_shop_sales_growth: row.same_shop_sales_growth,
        })
        .collect();

    FinancialTable::from_trusted(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revenue_segments_add_up() {
        for record in reference_dataset().records() {
            assert_eq!(
                record.company_operated_revenue + record.franchising_and_other_revenue,
                record.total_revenues,
                "segments do not sum for {}",
                record.period
            );
        }
    }

    #[test]
    fn periods_are_in_order() {
        let labels: Vec<String> = reference_dataset()
            .periods()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(labels, vec!["2020", "2021", "2022", "2023_9M"]);
    }
}
