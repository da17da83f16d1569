//! Three-layer interactive time-series chart construction.
//!
//! Every multi-series chart in the dashboards is the same composition:
//! a value layer (line, area or bar), a point layer that only shows near
//! the pointer, and a vertical rule at the hovered date whose tooltip
//! lists every series' value for that date. The layers share one
//! x-domain and one embedded dataset.

use serde_json::json;

use super::pivot::pivot_columns;
use super::spec::{
    ChartSpec, ColorChannel, DateGranularity, Encoding, Layer, Mark, OpacityChannel,
    PositionChannel, Selection, SeriesRow, TooltipField, Transform,
};

const HOVER_SELECTION: &str = "hover";

/// Caller-facing knobs for [`build_time_series_chart`].
#[derive(Debug, Clone)]
pub struct TimeSeriesOptions {
    pub title: String,
    pub y_title: String,
    pub mark: Mark,
    pub date_granularity: DateGranularity,
    pub log_scale: bool,
    /// d3-style numeric format applied to tooltip values, e.g. `,.2f`.
    pub value_format: String,
    pub color_scheme: String,
}

impl Default for TimeSeriesOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            y_title: String::new(),
            mark: Mark::Line,
            date_granularity: DateGranularity::Day,
            log_scale: false,
            value_format: ",.2f".to_string(),
            color_scheme: "tableau10".to_string(),
        }
    }
}

impl TimeSeriesOptions {
    pub fn titled(title: &str, y_title: &str) -> Self {
        Self { title: title.to_string(), y_title: y_title.to_string(), ..Self::default() }
    }
}

/// Build the three-layer hover-rule chart from long-form rows.
///
/// The rule layer carries a pivot transform so its tooltip can show one
/// formatted entry per distinct series (sorted by name) plus the hovered
/// date. The selection starts empty: no rule is visible until the first
/// mouseover, and mouseout clears it.
pub fn build_time_series_chart(rows: &[SeriesRow], options: &TimeSeriesOptions) -> ChartSpec {
    let x = PositionChannel::temporal("at", options.date_granularity);
    let y = PositionChannel::quantitative(
        "value",
        (!options.y_title.is_empty()).then_some(options.y_title.as_str()),
        options.log_scale,
    );
    let color = ColorChannel::nominal("series", &options.color_scheme);

    let value_layer = Layer {
        mark: options.mark,
        encoding: Encoding {
            x: Some(x.clone()),
            y: Some(y.clone()),
            color: Some(color.clone()),
            ..Encoding::default()
        },
        transforms: Vec::new(),
        selection: None,
    };

    // Same encoding as the value layer, visible only at the hovered date.
    let point_layer = Layer {
        mark: Mark::Point,
        encoding: Encoding {
            x: Some(x.clone()),
            y: Some(y),
            color: Some(color),
            ..Encoding::default()
        },
        transforms: vec![Transform::filter_selection(HOVER_SELECTION)],
        selection: None,
    };

    let mut tooltip = vec![TooltipField::temporal(
        "at",
        "Date",
        options.date_granularity.date_format(),
    )];
    for series in pivot_columns(rows) {
        tooltip.push(TooltipField::quantitative(&series, &options.value_format));
    }

    let rule_layer = Layer {
        mark: Mark::Rule,
        encoding: Encoding {
            x: Some(x),
            opacity: Some(OpacityChannel::on_selection(HOVER_SELECTION)),
            tooltip,
            ..Encoding::default()
        },
        transforms: vec![Transform::pivot("series", "value", &["at"])],
        selection: Some(Selection::nearest_point(HOVER_SELECTION, "at")),
    };

    ChartSpec {
        title: options.title.clone(),
        data: embed_rows(rows),
        layers: vec![value_layer, point_layer, rule_layer],
    }
}

fn embed_rows(rows: &[SeriesRow]) -> Vec<serde_json::Value> {
    rows.iter()
        .map(|row| {
            json!({
                "series": row.series,
                "at": row.at.to_rfc3339(),
                "value": row.value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rows() -> Vec<SeriesRow> {
        let mut rows = Vec::new();
        for day in 1..=3 {
            for (series, value) in [("wNEAR", 11.0), ("USDC", 1.0)] {
                rows.push(SeriesRow {
                    series: series.to_string(),
                    at: Utc.with_ymd_and_hms(2022, 1, day, 0, 0, 0).unwrap(),
                    value,
                });
            }
        }
        rows
    }

    #[test]
    fn builds_three_layers_sharing_the_x_field() {
        let chart = build_time_series_chart(&rows(), &TimeSeriesOptions::default());

        assert_eq!(chart.layers.len(), 3);
        for layer in &chart.layers {
            assert_eq!(layer.encoding.x.as_ref().unwrap().field, "at");
        }
        assert_eq!(chart.data.len(), 6);
    }

    #[test]
    fn value_layer_mark_follows_options() {
        let options = TimeSeriesOptions { mark: Mark::Area, ..TimeSeriesOptions::default() };
        let chart = build_time_series_chart(&rows(), &options);
        assert_eq!(chart.layers[0].mark, Mark::Area);
        assert_eq!(chart.layers[1].mark, Mark::Point);
        assert_eq!(chart.layers[2].mark, Mark::Rule);
    }

    #[test]
    fn point_layer_is_filtered_to_the_hover_selection() {
        let chart = build_time_series_chart(&rows(), &TimeSeriesOptions::default());
        let transforms = serde_json::to_value(&chart.layers[1].transforms).unwrap();
        assert_eq!(
            transforms,
            serde_json::json!([{"filter": {"selection": "hover"}}])
        );
        assert!(chart.layers[1].selection.is_none());
    }

    #[test]
    fn rule_layer_pivots_and_owns_the_selection() {
        let chart = build_time_series_chart(&rows(), &TimeSeriesOptions::default());
        let rule = &chart.layers[2];

        let transforms = serde_json::to_value(&rule.transforms).unwrap();
        assert_eq!(
            transforms,
            serde_json::json!([{"pivot": "series", "value": "value", "groupby": ["at"]}])
        );

        let selection = rule.selection.as_ref().unwrap();
        assert_eq!(selection.name, "hover");
        assert!(selection.nearest);
        assert_eq!(selection.fields, vec!["at".to_string()]);

        let opacity = rule.encoding.opacity.as_ref().unwrap();
        assert_eq!(opacity.value, 0.0);
        assert_eq!(opacity.condition.value, 0.3);
    }

    #[test]
    fn tooltip_lists_date_then_each_series_sorted() {
        let options =
            TimeSeriesOptions { value_format: ",.4f".to_string(), ..TimeSeriesOptions::default() };
        let chart = build_time_series_chart(&rows(), &options);
        let tooltip = &chart.layers[2].encoding.tooltip;

        assert_eq!(tooltip.len(), 3);
        assert_eq!(tooltip[0].field, "at");
        assert_eq!(tooltip[0].title.as_deref(), Some("Date"));
        assert_eq!(tooltip[1].field, "USDC");
        assert_eq!(tooltip[2].field, "wNEAR");
        assert_eq!(tooltip[1].format.as_deref(), Some(",.4f"));
    }

    #[test]
    fn log_scale_and_granularity_flow_into_encodings() {
        let options = TimeSeriesOptions {
            log_scale: true,
            date_granularity: DateGranularity::DayHour,
            ..TimeSeriesOptions::default()
        };
        let chart = build_time_series_chart(&rows(), &options);

        let y = serde_json::to_value(chart.layers[0].encoding.y.as_ref().unwrap()).unwrap();
        assert_eq!(y["scale"]["type"], serde_json::json!("log"));

        let x = serde_json::to_value(chart.layers[0].encoding.x.as_ref().unwrap()).unwrap();
        assert_eq!(x["timeUnit"], serde_json::json!("yearmonthdatehours"));
        assert_eq!(
            chart.layers[2].encoding.tooltip[0].format.as_deref(),
            Some("%Y-%m-%d %H:00")
        );
    }

    #[test]
    fn empty_input_still_builds_a_valid_spec() {
        let chart = build_time_series_chart(&[], &TimeSeriesOptions::default());
        assert_eq!(chart.layers.len(), 3);
        assert!(chart.data.is_empty());
        // Date tooltip only; no series columns to pivot.
        assert_eq!(chart.layers[2].encoding.tooltip.len(), 1);
    }
}
