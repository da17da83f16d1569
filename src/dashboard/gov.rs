//! Governance panels: validator set health, stake concentration, staker
//! counts and per-validator track records.

use rustc_hash::FxHashMap;

use crate::chart::{
    build_time_series_chart, category_bar_chart, CategoryRow, DateGranularity, SeriesRow,
    TimeSeriesOptions,
};
use crate::client::{lookup, IndexerClient, QueryClient, GOV_QUERIES};
use crate::error::{Error, Result};
use crate::model::Row;
use crate::transform::gini;

use super::{format_thousands, Metric, Panel};

/// Minimum number of validators whose combined stake exceeds a third of
/// the total, i.e. enough to halt the network. Expects stakes sorted
/// descending; an empty set yields 0.
pub fn nakamoto_coefficient(stakes_desc: &[f64]) -> usize {
    let total: f64 = stakes_desc.iter().sum();
    let threshold = 0.33 * total;
    let mut cumulative = 0.0;
    for (index, stake) in stakes_desc.iter().enumerate() {
        cumulative += stake;
        if cumulative > threshold {
            return index + 1;
        }
    }
    0
}

/// Chain statistics plus a rank-ordered stake bar chart for the top
/// `top_n` validators of the active set.
pub async fn governance_panel(indexer: &IndexerClient, top_n: usize) -> Result<Panel> {
    let validators = indexer.validators().await?;
    let block_times = indexer.block_times(1000).await?;
    let status = indexer.status().await?;

    let mut stakes: Vec<(String, f64)> = validators
        .iter()
        .filter_map(|v| v.stake_near().map(|stake| (v.account_id.clone(), stake)))
        .collect();
    stakes.sort_by(|a, b| b.1.total_cmp(&a.1));

    let stake_values: Vec<f64> = stakes.iter().map(|(_, stake)| *stake).collect();
    let total_staked: f64 = stake_values.iter().sum();
    let gini_coefficient = gini(&stake_values)?;
    let nakamoto = nakamoto_coefficient(&stake_values);

    let mut metrics = vec![
        Metric::new("Number of Validators", validators.len().to_string()),
        Metric::new("Average block time (s)", format!("{:.2}", block_times.avg)),
        Metric::new("Total Staked NEAR", format_thousands(total_staked)),
        Metric::new("Nakamoto Coefficient", nakamoto.to_string()),
        Metric::new("Gini Coefficient", format!("{gini_coefficient:.3}")),
    ];
    if let Some(last_block_time) = status.last_block_time {
        metrics.push(Metric::new(
            "Last updated",
            last_block_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ));
    }

    let bars: Vec<CategoryRow> = stakes
        .into_iter()
        .take(top_n)
        .map(|(account_id, stake)| CategoryRow { category: account_id, value: stake })
        .collect();
    let chart = category_bar_chart(
        &bars,
        "Stake by Validator",
        "Stake (NEAR)",
        ",.0f",
        "tableau20",
    );

    Ok(Panel { title: "Local Government".to_string(), metrics, chart: Some(chart) })
}

/// Staker counts per validator, merged with the active set. Only
/// validators present in both the active set and the staker table are
/// charted, matching the upstream inner merge on the account id.
pub async fn staker_rank_panel(
    queries: &QueryClient,
    indexer: &IndexerClient,
    top_n: usize,
) -> Result<Panel> {
    let stakers_query = lookup(GOV_QUERIES, "stakers")
        .ok_or_else(|| Error::InvalidArgument("unknown query `stakers`".to_string()))?;
    let activity_query = lookup(GOV_QUERIES, "validator_activity").ok_or_else(|| {
        Error::InvalidArgument("unknown query `validator_activity`".to_string())
    })?;

    let stakers = queries.fetch(stakers_query).await?;
    let activity = queries.fetch(activity_query).await?;
    let validators = indexer.validators().await?;

    let active: Vec<String> = validators.into_iter().map(|v| v.account_id).collect();
    let (counts, oldest_age) = staker_counts(&stakers, &activity, &active)?;

    let total_stakers: f64 = counts.iter().map(|(_, stakers, _)| stakers).sum();
    let current_stakers: f64 = counts.iter().map(|(_, _, leftover)| leftover).sum();
    let metrics = vec![
        Metric::new("Number of Stakers", format_thousands(total_stakers)),
        Metric::new("Current Stakers (stakers - unstakers)", format_thousands(current_stakers)),
        Metric::new("Age of oldest governor (days)", format_thousands(oldest_age)),
    ];

    let bars: Vec<CategoryRow> = counts
        .into_iter()
        .take(top_n)
        .map(|(governor, stakers, _)| CategoryRow { category: governor, value: stakers })
        .collect();
    let chart = category_bar_chart(
        &bars,
        "Number of Stakers by Governor",
        "Number of Stakers",
        ",",
        "tableau20",
    );

    Ok(Panel { title: "Governor Overview".to_string(), metrics, chart: Some(chart) })
}

/// Merge the staker table with validator ages, keeping only governors in
/// the active set. Returns `(governor, stakers, leftover supporters)`
/// tuples sorted by staker count descending, plus the oldest merged
/// governor's age in days.
fn staker_counts(
    stakers: &[Row],
    activity: &[Row],
    active: &[String],
) -> Result<(Vec<(String, f64, f64)>, f64)> {
    let mut ages: FxHashMap<String, f64> = FxHashMap::default();
    for row in activity {
        ages.insert(row.text("BLOCK_AUTHOR")?, row.number("AGE_DAY")?);
    }

    let mut counts: Vec<(String, f64, f64)> = Vec::new();
    let mut oldest_age = 0.0f64;
    for row in stakers {
        let governor = row.text("GOVERNOR")?;
        let Some(age) = ages.get(&governor) else {
            continue;
        };
        if !active.iter().any(|account_id| *account_id == governor) {
            continue;
        }
        oldest_age = oldest_age.max(*age);
        counts.push((
            governor,
            row.number("NUMBER_OF_STAKERS")?,
            row.number("LEFTOVER_SUPPORTERS")?,
        ));
    }
    counts.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok((counts, oldest_age))
}

/// Per-epoch track record for one validator: staking balance and blocks
/// produced, binned at day+hour resolution because epochs end mid-day.
/// With no validator given, the largest staker in the active set is
/// examined.
pub async fn validator_history_panel(
    indexer: &IndexerClient,
    validator: Option<&str>,
) -> Result<Panel> {
    let validator = match validator {
        Some(name) => name.to_string(),
        None => indexer
            .validators()
            .await?
            .iter()
            .filter_map(|v| v.stake_near().map(|stake| (v.account_id.clone(), stake)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(account_id, _)| account_id)
            .ok_or_else(|| {
                Error::InvalidArgument("no validators in the active set".to_string())
            })?,
    };
    let epochs = indexer.validator_epochs(&validator).await?;

    let mut rows = Vec::with_capacity(epochs.len() * 2);
    for epoch in &epochs {
        let Some(at) = epoch.last_time else {
            continue;
        };
        if let Some(balance) = epoch.staking_balance_near() {
            rows.push(SeriesRow {
                series: "Staking Balance (NEAR)".to_string(),
                at,
                value: balance,
            });
        }
        if let Some(blocks) = epoch.produced_blocks {
            rows.push(SeriesRow {
                series: "Blocks produced".to_string(),
                at,
                value: blocks as f64,
            });
        }
    }
    rows.sort_by(|a, b| a.at.cmp(&b.at));

    let options = TimeSeriesOptions {
        title: format!("Governance Track Record: {validator}"),
        date_granularity: DateGranularity::DayHour,
        value_format: ",.2f".to_string(),
        ..TimeSeriesOptions::default()
    };

    Ok(Panel {
        title: format!("Results by Epoch: {validator}"),
        metrics: vec![Metric::new("Epochs recorded", epochs.len().to_string())],
        chart: Some(build_time_series_chart(&rows, &options)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_dominant_staker_gives_one() {
        assert_eq!(nakamoto_coefficient(&[90.0, 5.0, 5.0]), 1);
    }

    #[test]
    fn equal_stakes_need_over_a_third_of_the_set() {
        // 10 equal validators: 4 of them control 40% > 33%.
        assert_eq!(nakamoto_coefficient(&[10.0; 10]), 4);
    }

    #[test]
    fn two_validators_tip_the_threshold() {
        assert_eq!(nakamoto_coefficient(&[30.0, 25.0, 20.0, 15.0, 10.0]), 2);
    }

    #[test]
    fn empty_set_is_zero() {
        assert_eq!(nakamoto_coefficient(&[]), 0);
    }

    #[test]
    fn staker_counts_merge_on_the_active_set() {
        use serde_json::json;

        let stakers: Vec<Row> = vec![
            json!({"GOVERNOR": "a.pool", "NUMBER_OF_STAKERS": "10", "LEFTOVER_SUPPORTERS": "7"}),
            json!({"GOVERNOR": "b.pool", "NUMBER_OF_STAKERS": "80", "LEFTOVER_SUPPORTERS": "60"}),
            json!({"GOVERNOR": "gone.pool", "NUMBER_OF_STAKERS": "99", "LEFTOVER_SUPPORTERS": "1"}),
            json!({"GOVERNOR": "noage.pool", "NUMBER_OF_STAKERS": "5", "LEFTOVER_SUPPORTERS": "2"}),
        ]
        .into_iter()
        .map(|v| Row::from_value(v).unwrap())
        .collect();
        let activity: Vec<Row> = vec![
            json!({"BLOCK_AUTHOR": "a.pool", "AGE_DAY": "400"}),
            json!({"BLOCK_AUTHOR": "b.pool", "AGE_DAY": "120"}),
            json!({"BLOCK_AUTHOR": "gone.pool", "AGE_DAY": "900"}),
        ]
        .into_iter()
        .map(|v| Row::from_value(v).unwrap())
        .collect();
        let active = vec!["a.pool".to_string(), "b.pool".to_string(), "noage.pool".to_string()];

        let (counts, oldest_age) = staker_counts(&stakers, &activity, &active).unwrap();

        // gone.pool is not active, noage.pool never authored a block.
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0], ("b.pool".to_string(), 80.0, 60.0));
        assert_eq!(counts[1], ("a.pool".to_string(), 10.0, 7.0));
        assert_eq!(oldest_age, 400.0);
    }
}
