//! Declarative chart specification construction.
//!
//! - [`spec`] types model the serialized output (marks, encodings,
//!   transforms, selections)
//! - [`builder`] composes the three-layer interactive time-series chart
//! - [`pivot`] is the long-to-wide transform behind the rule tooltip
//! - [`variants`] cover single-layer area and bar panels

mod builder;
mod pivot;
mod spec;
mod variants;

pub use builder::{build_time_series_chart, TimeSeriesOptions};
pub use pivot::{pivot_columns, pivot_series};
pub use spec::{
    CategoryRow, ChartSpec, ColorChannel, DateGranularity, Encoding, FieldType, Layer, Mark,
    OpacityChannel, PositionChannel, ScaleType, Selection, SeriesRow, TooltipField, Transform,
};
pub use variants::{category_bar_chart, date_area_chart};
