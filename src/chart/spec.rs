//! Declarative chart specification types.
//!
//! A [`ChartSpec`] is data plus layers: each layer has a mark, an
//! encoding, optional transforms and an optional selection. The spec is
//! plain serde output consumed by a rendering surface; nothing in this
//! crate draws pixels.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// Input rows
// ============================================================================

/// One observation of a long-form multi-series dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub series: String,
    pub at: DateTime<Utc>,
    pub value: f64,
}

/// One observation of a categorical dataset (bar charts).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub value: f64,
}

// ============================================================================
// Spec tree
// ============================================================================

/// A complete serializable chart: embedded data plus layered views.
/// Every layer shares the spec-level data and x-domain.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub data: Vec<Value>,
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layer {
    pub mark: Mark,
    pub encoding: Encoding,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<Transform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Line,
    Area,
    Bar,
    Point,
    Rule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Temporal,
    Quantitative,
    Nominal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Linear,
    Log,
}

/// X-axis binning for temporal fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateGranularity {
    Day,
    DayHour,
}

impl DateGranularity {
    pub fn time_unit(self) -> &'static str {
        match self {
            DateGranularity::Day => "yearmonthdate",
            DateGranularity::DayHour => "yearmonthdatehours",
        }
    }

    /// Tooltip format for the temporal field at this binning.
    pub fn date_format(self) -> &'static str {
        match self {
            DateGranularity::Day => "%Y-%m-%d",
            DateGranularity::DayHour => "%Y-%m-%d %H:00",
        }
    }
}

// ============================================================================
// Encoding channels
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<PositionChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<PositionChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<OpacityChannel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tooltip: Vec<TooltipField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionChannel {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(rename = "timeUnit", skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<AxisScale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl PositionChannel {
    pub fn temporal(field: &str, granularity: DateGranularity) -> Self {
        Self {
            field: field.to_string(),
            field_type: FieldType::Temporal,
            time_unit: Some(granularity.time_unit().to_string()),
            scale: None,
            title: None,
            sort: None,
        }
    }

    pub fn quantitative(field: &str, title: Option<&str>, log_scale: bool) -> Self {
        Self {
            field: field.to_string(),
            field_type: FieldType::Quantitative,
            time_unit: None,
            scale: Some(AxisScale {
                scale_type: if log_scale { ScaleType::Log } else { ScaleType::Linear },
            }),
            title: title.map(str::to_string),
            sort: None,
        }
    }

    pub fn nominal(field: &str) -> Self {
        Self {
            field: field.to_string(),
            field_type: FieldType::Nominal,
            time_unit: None,
            scale: None,
            title: None,
            sort: None,
        }
    }

    /// Sort the axis by the other channel, descending (`-y` on an x
    /// channel gives rank-ordered bars).
    pub fn sorted_by(mut self, order: &str) -> Self {
        self.sort = Some(order.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisScale {
    #[serde(rename = "type")]
    pub scale_type: ScaleType,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorChannel {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ColorScale>,
}

impl ColorChannel {
    pub fn nominal(field: &str, scheme: &str) -> Self {
        Self {
            field: field.to_string(),
            field_type: FieldType::Nominal,
            scale: Some(ColorScale { scheme: scheme.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorScale {
    pub scheme: String,
}

/// Conditional opacity: `condition.value` while the named selection is
/// active, `value` otherwise. The hover rule uses 0.3 / 0.
#[derive(Debug, Clone, Serialize)]
pub struct OpacityChannel {
    pub condition: OpacityCondition,
    pub value: f64,
}

impl OpacityChannel {
    pub fn on_selection(selection: &str) -> Self {
        Self {
            condition: OpacityCondition { selection: selection.to_string(), value: 0.3 },
            value: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpacityCondition {
    pub selection: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TooltipField {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl TooltipField {
    pub fn temporal(field: &str, title: &str, format: &str) -> Self {
        Self {
            field: field.to_string(),
            field_type: FieldType::Temporal,
            title: Some(title.to_string()),
            format: Some(format.to_string()),
        }
    }

    pub fn quantitative(field: &str, format: &str) -> Self {
        Self {
            field: field.to_string(),
            field_type: FieldType::Quantitative,
            title: None,
            format: Some(format.to_string()),
        }
    }

    pub fn nominal(field: &str) -> Self {
        Self {
            field: field.to_string(),
            field_type: FieldType::Nominal,
            title: None,
            format: None,
        }
    }
}

// ============================================================================
// Transforms and selections
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Transform {
    /// Widen long-form rows: one column per distinct `pivot` value,
    /// grouped by the `groupby` fields.
    Pivot { pivot: String, value: String, groupby: Vec<String> },
    /// Keep only rows captured by the named selection.
    Filter { filter: SelectionFilter },
}

impl Transform {
    pub fn pivot(pivot: &str, value: &str, groupby: &[&str]) -> Self {
        Transform::Pivot {
            pivot: pivot.to_string(),
            value: value.to_string(),
            groupby: groupby.iter().map(|g| g.to_string()).collect(),
        }
    }

    pub fn filter_selection(selection: &str) -> Self {
        Transform::Filter { filter: SelectionFilter { selection: selection.to_string() } }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionFilter {
    pub selection: String,
}

/// Nearest-point hover selection. Starts empty (no rule shown), tracks
/// the nearest value of `fields` on mouseover, clears on mouseout.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub name: String,
    pub fields: Vec<String>,
    pub nearest: bool,
    pub on: String,
    pub clear: String,
    pub empty: String,
}

impl Selection {
    pub fn nearest_point(name: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: vec![field.to_string()],
            nearest: true,
            on: "mouseover".to_string(),
            clear: "mouseout".to_string(),
            empty: "none".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn marks_serialize_lowercase() {
        assert_eq!(serde_json::to_value(Mark::Line).unwrap(), json!("line"));
        assert_eq!(serde_json::to_value(Mark::Rule).unwrap(), json!("rule"));
    }

    #[test]
    fn temporal_channel_carries_time_unit() {
        let channel = PositionChannel::temporal("at", DateGranularity::Day);
        let value = serde_json::to_value(&channel).unwrap();
        assert_eq!(value["timeUnit"], json!("yearmonthdate"));
        assert_eq!(value["type"], json!("temporal"));
    }

    #[test]
    fn log_scale_is_explicit() {
        let channel = PositionChannel::quantitative("value", Some("Price"), true);
        let value = serde_json::to_value(&channel).unwrap();
        assert_eq!(value["scale"]["type"], json!("log"));
        assert_eq!(value["title"], json!("Price"));
    }

    #[test]
    fn pivot_transform_shape() {
        let transform = Transform::pivot("series", "value", &["at"]);
        let value = serde_json::to_value(&transform).unwrap();
        assert_eq!(value, json!({"pivot": "series", "value": "value", "groupby": ["at"]}));
    }

    #[test]
    fn filter_transform_names_the_selection() {
        let transform = Transform::filter_selection("hover");
        let value = serde_json::to_value(&transform).unwrap();
        assert_eq!(value, json!({"filter": {"selection": "hover"}}));
    }

    #[test]
    fn nearest_point_selection_defaults() {
        let selection = Selection::nearest_point("hover", "at");
        assert!(selection.nearest);
        assert_eq!(selection.on, "mouseover");
        assert_eq!(selection.clear, "mouseout");
        assert_eq!(selection.empty, "none");
        assert_eq!(selection.fields, vec!["at".to_string()]);
    }

    #[test]
    fn hover_opacity_toggles_between_zero_and_visible() {
        let opacity = OpacityChannel::on_selection("hover");
        assert_eq!(opacity.value, 0.0);
        assert_eq!(opacity.condition.value, 0.3);
        assert_eq!(opacity.condition.selection, "hover");
    }

    #[test]
    fn empty_encoding_serializes_to_empty_object() {
        let value = serde_json::to_value(Encoding::default()).unwrap();
        assert_eq!(value, json!({}));
    }
}
