//! Single-layer chart variants.
//!
//! Panels that show one series or one categorical ranking do not need the
//! hover-rule machinery; the tooltip sits on the mark itself.

use serde_json::json;

use super::builder::TimeSeriesOptions;
use super::spec::{
    CategoryRow, ChartSpec, ColorChannel, Encoding, Layer, Mark, PositionChannel, SeriesRow,
    TooltipField,
};

/// Single-series area chart over dates, tooltip on the mark.
pub fn date_area_chart(rows: &[SeriesRow], options: &TimeSeriesOptions) -> ChartSpec {
    let tooltip = vec![
        TooltipField::temporal("at", "Date", options.date_granularity.date_format()),
        TooltipField::quantitative("value", &options.value_format),
    ];

    let layer = Layer {
        mark: Mark::Area,
        encoding: Encoding {
            x: Some(PositionChannel::temporal("at", options.date_granularity)),
            y: Some(PositionChannel::quantitative(
                "value",
                (!options.y_title.is_empty()).then_some(options.y_title.as_str()),
                options.log_scale,
            )),
            tooltip,
            ..Encoding::default()
        },
        transforms: Vec::new(),
        selection: None,
    };

    ChartSpec {
        title: options.title.clone(),
        data: rows
            .iter()
            .map(|row| json!({"at": row.at.to_rfc3339(), "value": row.value}))
            .collect(),
        layers: vec![layer],
    }
}

/// Rank-ordered bar chart: categories on x sorted by value descending,
/// one color per category.
pub fn category_bar_chart(
    rows: &[CategoryRow],
    title: &str,
    y_title: &str,
    value_format: &str,
    color_scheme: &str,
) -> ChartSpec {
    let tooltip = vec![
        TooltipField::nominal("category"),
        TooltipField::quantitative("value", value_format),
    ];

    let layer = Layer {
        mark: Mark::Bar,
        encoding: Encoding {
            x: Some(PositionChannel::nominal("category").sorted_by("-y")),
            y: Some(PositionChannel::quantitative("value", Some(y_title), false)),
            color: Some(ColorChannel::nominal("category", color_scheme)),
            tooltip,
            ..Encoding::default()
        },
        transforms: Vec::new(),
        selection: None,
    };

    ChartSpec {
        title: title.to_string(),
        data: rows
            .iter()
            .map(|row| json!({"category": row.category, "value": row.value}))
            .collect(),
        layers: vec![layer],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::DateGranularity;
    use chrono::{TimeZone, Utc};

    #[test]
    fn area_chart_is_one_layer_with_mark_tooltip() {
        let rows = vec![SeriesRow {
            series: "users".to_string(),
            at: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
            value: 120.0,
        }];
        let chart = date_area_chart(&rows, &TimeSeriesOptions::titled("New users", "Users"));

        assert_eq!(chart.layers.len(), 1);
        assert_eq!(chart.layers[0].mark, Mark::Area);
        assert_eq!(chart.layers[0].encoding.tooltip.len(), 2);
        assert!(chart.layers[0].selection.is_none());
        assert_eq!(chart.data.len(), 1);
    }

    #[test]
    fn bar_chart_sorts_categories_by_value() {
        let rows = vec![
            CategoryRow { category: "validator-a".to_string(), value: 100.0 },
            CategoryRow { category: "validator-b".to_string(), value: 250.0 },
        ];
        let chart = category_bar_chart(&rows, "Stake by validator", "NEAR", ",.0f", "tableau20");

        assert_eq!(chart.layers.len(), 1);
        assert_eq!(chart.layers[0].mark, Mark::Bar);
        let x = chart.layers[0].encoding.x.as_ref().unwrap();
        assert_eq!(x.sort.as_deref(), Some("-y"));
        let color = chart.layers[0].encoding.color.as_ref().unwrap();
        assert_eq!(color.scale.as_ref().unwrap().scheme, "tableau20");
    }

    #[test]
    fn grid_granularity_formats_flow_through() {
        let options = TimeSeriesOptions {
            date_granularity: DateGranularity::DayHour,
            value_format: ",.0f".to_string(),
            ..TimeSeriesOptions::default()
        };
        let chart = date_area_chart(&[], &options);
        let tooltip = &chart.layers[0].encoding.tooltip;
        assert_eq!(tooltip[0].format.as_deref(), Some("%Y-%m-%d %H:00"));
        assert_eq!(tooltip[1].format.as_deref(), Some(",.0f"));
    }
}
