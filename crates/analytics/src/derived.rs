use core_types::{FinancialRecord, FinancialTable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Columns derived from a single row and, for growth rates, its predecessor.
///
/// Every value is a percentage. `None` marks a value that is undefined: the
/// growth of the first row, or any ratio over a zero denominator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub revenue_growth: Option<Decimal>,
    pub shop_count_growth: Option<Decimal>,
    pub cost_of_sales_pct: Option<Decimal>,
    /// The data carries no separate SG&A line, so this mirrors
    /// `cost_of_sales_pct`.
    pub sga_pct: Option<Decimal>,
    pub net_income_margin: Option<Decimal>,
    pub company_operated_share: Option<Decimal>,
}

/// Period-over-period percentage change, `(curr - prev) / prev * 100`.
///
/// The first element has no predecessor and is always `None`. A change from a
/// zero base, or one that overflows `Decimal`, is `None` as well.
pub fn pct_change(values: &[Decimal]) -> Vec<Option<Decimal>> {
    let mut changes = Vec::with_capacity(values.len());
    if values.is_empty() {
        return changes;
    }

    changes.push(None);
    changes.extend(values.windows(2).map(|w| {
        let (prev, curr) = (w[0], w[1]);
        curr.checked_sub(prev)
            .and_then(|delta| delta.checked_div(prev))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
    }));
    changes
}

/// `(numerator / denominator) * 100`, or `None` for a zero denominator or an
/// out-of-range result.
pub fn ratio_pct(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    numerator
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// Computes the derived columns for every row of the table, in row order.
pub fn derive_metrics(table: &FinancialTable) -> Vec<DerivedMetrics> {
    let revenue_growth = pct_change(&table.revenues());
    let shop_count_growth = pct_change(&table.shop_counts());

    table
        .records()
        .iter()
        .zip(revenue_growth)
        .zip(shop_count_growth)
        .map(|((record, revenue_growth), shop_count_growth)| {
            let margins = row_margins(record);
            DerivedMetrics {
                revenue_growth,
                shop_count_growth,
                ..margins
            }
        })
        .collect()
}

fn row_margins(record: &FinancialRecord) -> DerivedMetrics {
    let revenues = record.total_revenues;
    let cost_of_sales_pct = ratio_pct(record.total_costs_and_expenses, revenues);

    DerivedMetrics {
        revenue_growth: None,
        shop_count_growth: None,
        cost_of_sales_pct,
        sga_pct: cost_of_sales_pct,
        net_income_margin: ratio_pct(record.net_income_loss, revenues),
        company_operated_share: ratio_pct(record.company_operated_revenue, revenues),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::reference_dataset;
    use rust_decimal_macros::dec;

    fn rounded(value: Option<Decimal>) -> Option<Decimal> {
        value.map(|v| v.round_dp(2))
    }

    #[test]
    fn pct_change_matches_formula() {
        let changes = pct_change(&[dec!(100), dec!(110), dec!(99)]);
        assert_eq!(changes, vec![None, Some(dec!(10)), Some(dec!(-10))]);
    }

    #[test]
    fn pct_change_of_empty_and_single() {
        assert!(pct_change(&[]).is_empty());
        assert_eq!(pct_change(&[dec!(5)]), vec![None]);
    }

    #[test]
    fn pct_change_from_zero_is_undefined() {
        let changes = pct_change(&[dec!(0), dec!(10)]);
        assert_eq!(changes, vec![None, None]);
    }

    #[test]
    fn out_of_range_results_are_undefined() {
        let tiny = Decimal::new(1, 28);
        assert_eq!(pct_change(&[tiny, Decimal::MAX]), vec![None, None]);
        assert_eq!(pct_change(&[Decimal::MIN, Decimal::MAX]), vec![None, None]);
        assert_eq!(ratio_pct(Decimal::MAX, tiny), None);
    }

    #[test]
    fn ratio_pct_matches_formula() {
        assert_eq!(ratio_pct(dec!(25), dec!(200)), Some(dec!(12.5)));
        assert_eq!(ratio_pct(dec!(-50), dec!(200)), Some(dec!(-25)));
        assert_eq!(ratio_pct(dec!(1), dec!(0)), None);
    }

    #[test]
    fn derives_reference_columns() {
        let metrics = derive_metrics(&reference_dataset());
        assert_eq!(metrics.len(), 4);

        assert_eq!(metrics[0].revenue_growth, None);
        assert_eq!(metrics[0].shop_count_growth, None);
        assert_eq!(rounded(metrics[1].revenue_growth), Some(dec!(52.06)));
        assert_eq!(rounded(metrics[2].revenue_growth), Some(dec!(48.43)));
        assert_eq!(rounded(metrics[3].revenue_growth), Some(dec!(-3.70)));
        assert_eq!(rounded(metrics[1].shop_count_growth), Some(dec!(22.00)));

        assert_eq!(rounded(metrics[0].cost_of_sales_pct), Some(dec!(96.64)));
        assert_eq!(rounded(metrics[1].net_income_margin), Some(dec!(-23.69)));
        for m in &metrics {
            assert_eq!(m.sga_pct, m.cost_of_sales_pct);
        }
    }
}
