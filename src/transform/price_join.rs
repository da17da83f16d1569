//! As-of-date USD price join.
//!
//! Price series arrive per symbol with sub-day timestamps; amount rows
//! carry calendar dates. The join truncates every price timestamp to its
//! calendar day and left-joins amounts on (symbol, day). Rows without a
//! matching price keep an empty `amount_usd` - refusing to join beats
//! failing the whole pipeline when a token briefly lacks price data.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::model::{EnrichedAmountRow, NormalizedAmountRow, PricePoint};

/// Immutable day-granular price lookup built from concatenated per-symbol
/// series.
#[derive(Debug, Default)]
pub struct PriceTable {
    prices: FxHashMap<(String, NaiveDate), f64>,
}

impl PriceTable {
    /// A table with no prices; joining against it yields all-empty USD
    /// columns, which is the fetch-failure degradation path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from price points, truncating timestamps to calendar days.
    /// The first observation per (symbol, day) wins.
    pub fn from_series<I>(points: I) -> Self
    where
        I: IntoIterator<Item = PricePoint>,
    {
        let mut prices = FxHashMap::default();
        for point in points {
            prices.entry((point.symbol, point.at.date_naive())).or_insert(point.price);
        }
        Self { prices }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn price(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        self.prices.get(&(symbol.to_string(), date)).copied()
    }

    /// Left join: every input row appears exactly once in the output, in
    /// input order. Unmatched rows get `price = None`, `amount_usd = None`.
    pub fn join(&self, rows: &[NormalizedAmountRow]) -> Vec<EnrichedAmountRow> {
        rows.iter()
            .map(|row| {
                let price = self.price(&row.symbol, row.date);
                EnrichedAmountRow {
                    token_id: row.token_id.clone(),
                    symbol: row.symbol.clone(),
                    date: row.date,
                    amount: row.amount,
                    price,
                    amount_usd: price.map(|p| row.amount * p),
                }
            })
            .collect()
    }

    /// Re-apply the join to already-enriched rows. With the same table
    /// this is idempotent: prices and USD amounts are recomputed from
    /// (symbol, day) and come out identical.
    pub fn rejoin(&self, rows: &[EnrichedAmountRow]) -> Vec<EnrichedAmountRow> {
        rows.iter()
            .map(|row| {
                let price = self.price(&row.symbol, row.date);
                EnrichedAmountRow {
                    token_id: row.token_id.clone(),
                    symbol: row.symbol.clone(),
                    date: row.date,
                    amount: row.amount,
                    price,
                    amount_usd: price.map(|p| row.amount * p),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(symbol: &str, y: i32, m: u32, d: u32, h: u32, price: f64) -> PricePoint {
        PricePoint {
            symbol: symbol.to_string(),
            at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            price,
        }
    }

    fn amount(symbol: &str, y: i32, m: u32, d: u32, value: f64) -> NormalizedAmountRow {
        NormalizedAmountRow {
            token_id: format!("{}.token", symbol.to_lowercase()),
            symbol: symbol.to_string(),
            date: date(y, m, d),
            amount: value,
        }
    }

    #[test]
    fn sub_day_timestamps_truncate_to_day() {
        let table = PriceTable::from_series(vec![point("USDC", 2022, 1, 1, 7, 1.0)]);
        assert_eq!(table.price("USDC", date(2022, 1, 1)), Some(1.0));
    }

    #[test]
    fn unmatched_rows_keep_empty_usd_and_nothing_is_dropped() {
        let table = PriceTable::from_series(vec![point("USDC", 2022, 1, 1, 0, 1.0)]);
        let rows =
            vec![amount("USDC", 2022, 1, 1, 5.0), amount("USDC", 2022, 1, 2, 7.0)];

        let enriched = table.join(&rows);
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].amount_usd, Some(5.0));
        assert_eq!(enriched[1].price, None);
        assert_eq!(enriched[1].amount_usd, None);
        // The unmatched row keeps its normalized amount untouched.
        assert_eq!(enriched[1].amount, 7.0);
    }

    #[test]
    fn join_is_idempotent() {
        let table = PriceTable::from_series(vec![
            point("USDC", 2022, 1, 1, 0, 1.0),
            point("wNEAR", 2022, 1, 1, 12, 11.5),
        ]);
        let rows = vec![
            amount("USDC", 2022, 1, 1, 5.0),
            amount("wNEAR", 2022, 1, 1, 2.0),
            amount("wNEAR", 2022, 1, 3, 4.0),
        ];

        let once = table.join(&rows);
        let twice = table.rejoin(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_symbol_series_leaves_other_symbols_intact() {
        // wNEAR's fetch failed, so the table only holds USDC.
        let table = PriceTable::from_series(vec![point("USDC", 2022, 1, 1, 0, 1.0)]);
        let rows =
            vec![amount("USDC", 2022, 1, 1, 5.0), amount("wNEAR", 2022, 1, 1, 2.0)];

        let enriched = table.join(&rows);
        assert_eq!(enriched[0].amount_usd, Some(5.0));
        assert_eq!(enriched[1].amount_usd, None);
    }

    #[test]
    fn first_observation_per_day_wins() {
        let table = PriceTable::from_series(vec![
            point("USDC", 2022, 1, 1, 0, 1.0),
            point("USDC", 2022, 1, 1, 18, 0.98),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.price("USDC", date(2022, 1, 1)), Some(1.0));
    }

    #[test]
    fn end_to_end_usdc_row() {
        // 5 USDC on 2022-01-01 at $1.00 is $5.00.
        let at = date(2022, 1, 1).and_time(NaiveTime::MIN).and_utc();
        let table = PriceTable::from_series(vec![PricePoint {
            symbol: "USDC".to_string(),
            at,
            price: 1.0,
        }]);
        let enriched = table.join(&[amount("USDC", 2022, 1, 1, 5.0)]);
        assert_eq!(enriched[0].amount_usd, Some(5.0));
    }
}
