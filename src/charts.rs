//! Chart specifications and the pure result-to-spec mapping.
//!
//! A [`ChartSpec`] is a declarative description (traces, axes, annotations)
//! consumed by whatever presentation layer renders the dashboard; it knows
//! nothing about colors or fonts. [`build`] never raises: an empty result
//! table produces a structurally valid spec flagged `no_data`.

use serde::Serialize;

use crate::engine::Table;
use crate::reports::{ChartStrategy, ReportDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Indicator,
    Bar,
    HorizontalBar,
    GroupedBar,
    StackedBar,
    Scatter,
    Line,
    MultiLine,
    PolarBar,
}

/// A single axis coordinate: numeric or categorical.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coord {
    Num(f64),
    Label(String),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<Coord>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub x: Coord,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub traces: Vec<Trace>,
    pub annotations: Vec<Annotation>,
    /// Indicator charts carry their single number here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub no_data: bool,
}

impl ChartSpec {
    /// Placeholder spec for a report that produced no rows (or failed).
    pub fn empty(kind: ChartKind, title: &str, x_title: &str, y_title: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_title: x_title.to_string(),
            y_title: y_title.to_string(),
            traces: Vec::new(),
            annotations: Vec::new(),
            value: None,
            no_data: true,
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn chart_kind(strategy: &ChartStrategy) -> ChartKind {
    match strategy {
        ChartStrategy::Indicator { .. } => ChartKind::Indicator,
        ChartStrategy::Bar { .. } => ChartKind::Bar,
        ChartStrategy::HorizontalBar { .. } => ChartKind::HorizontalBar,
        ChartStrategy::GroupedBar { .. } => ChartKind::GroupedBar,
        ChartStrategy::StackedBar { .. } => ChartKind::StackedBar,
        ChartStrategy::Scatter { .. } | ChartStrategy::SeriesScatter { .. } => ChartKind::Scatter,
        ChartStrategy::Line { .. } => ChartKind::Line,
        ChartStrategy::MultiLine { .. } => ChartKind::MultiLine,
        ChartStrategy::PolarBar { .. } => ChartKind::PolarBar,
    }
}

/// Map a report's result table onto its chart spec. Pure: no I/O, no
/// panics. Rows whose bound coordinates are NULL are skipped; pivoted
/// stacked bars fill missing cells with zero so stack totals stay correct.
pub fn build(def: &ReportDef, filter_label: &str, table: &Table) -> ChartSpec {
    let kind = chart_kind(&def.strategy);
    let title = format!("{} ({})", def.title, filter_label);
    let mut spec = ChartSpec {
        kind,
        title,
        x_title: def.x_title.to_string(),
        y_title: def.y_title.to_string(),
        traces: Vec::new(),
        annotations: Vec::new(),
        value: None,
        no_data: table.is_empty(),
    };
    if table.is_empty() {
        return spec;
    }

    match &def.strategy {
        ChartStrategy::Indicator { value_col } => {
            let col = match table.col(value_col) {
                Some(c) => c,
                None => return spec_missing_column(spec),
            };
            spec.value = Some(table.sum_f64(col));
        }
        ChartStrategy::Bar { x_col, y_col } => {
            if let Some(trace) = category_value_trace(table, x_col, y_col, "") {
                spec.traces.push(trace);
            }
        }
        ChartStrategy::HorizontalBar { category_col, value_col } => {
            if let Some(trace) = category_value_trace(table, category_col, value_col, "") {
                spec.traces.push(trace);
            }
        }
        ChartStrategy::GroupedBar { category_col, series } => {
            let cat = match table.col(category_col) {
                Some(c) => c,
                None => return spec_missing_column(spec),
            };
            for (name, value_col) in series.iter() {
                let val = match table.col(value_col) {
                    Some(c) => c,
                    None => continue,
                };
                let mut trace = Trace { name: name.to_string(), ..Default::default() };
                for row in 0..table.rows.len() {
                    let label = table.str_at(row, cat).unwrap_or("").to_string();
                    trace.x.push(Coord::Label(label));
                    trace.y.push(table.f64_at(row, val).unwrap_or(0.0));
                }
                spec.traces.push(trace);
            }
        }
        ChartStrategy::StackedBar { category_col, series_col, value_col, text_col } => {
            spec.traces = pivot_stacked(table, category_col, series_col, value_col, *text_col);
        }
        ChartStrategy::Scatter { x_col, y_col, label_col, size_col } => {
            if let Some(trace) = scatter_trace(table, x_col, y_col, *label_col, *size_col) {
                spec.traces.push(trace);
            }
        }
        ChartStrategy::SeriesScatter { series_col, x_col, y_col, label_col } => {
            spec.traces = series_scatter_traces(table, series_col, x_col, y_col, *label_col);
        }
        ChartStrategy::Line { x_col, y_col, annotate_extremes } => {
            if let Some(trace) = numeric_xy_trace(table, x_col, y_col, "") {
                if *annotate_extremes {
                    spec.annotations = extreme_annotations(&trace);
                }
                spec.traces.push(trace);
            }
        }
        ChartStrategy::MultiLine { x_col, series } => {
            let x = match table.col(x_col) {
                Some(c) => c,
                None => return spec_missing_column(spec),
            };
            for (name, value_col) in series.iter() {
                let val = match table.col(value_col) {
                    Some(c) => c,
                    None => continue,
                };
                let mut trace = Trace { name: name.to_string(), ..Default::default() };
                for row in 0..table.rows.len() {
                    let coord = match table.str_at(row, x) {
                        Some(s) => Coord::Label(s.to_string()),
                        None => match table.f64_at(row, x) {
                            Some(n) => Coord::Num(n),
                            None => continue,
                        },
                    };
                    if let Some(v) = table.f64_at(row, val) {
                        trace.x.push(coord);
                        trace.y.push(v);
                    }
                }
                spec.traces.push(trace);
            }
        }
        ChartStrategy::PolarBar { month_col, value_col } => {
            let m = table.col(month_col);
            let v = table.col(value_col);
            let (m, v) = match (m, v) {
                (Some(m), Some(v)) => (m, v),
                _ => return spec_missing_column(spec),
            };
            let mut trace = Trace { name: "Seasonal Sales".to_string(), ..Default::default() };
            for row in 0..table.rows.len() {
                let month = match table.i64_at(row, m) {
                    Some(n) if (1..=12).contains(&n) => n as usize,
                    _ => continue,
                };
                if let Some(total) = table.f64_at(row, v) {
                    trace.x.push(Coord::Label(MONTH_NAMES[month - 1].to_string()));
                    trace.y.push(total);
                }
            }
            spec.traces.push(trace);
        }
    }

    if spec.value.is_none() && spec.traces.iter().all(|t| t.y.is_empty()) {
        spec.no_data = true;
    }
    spec
}

fn spec_missing_column(mut spec: ChartSpec) -> ChartSpec {
    spec.no_data = true;
    spec
}

/// Categorical x, numeric y; NULL values render as zero-height bars.
fn category_value_trace(table: &Table, cat_col: &str, val_col: &str, name: &str) -> Option<Trace> {
    let cat = table.col(cat_col)?;
    let val = table.col(val_col)?;
    let mut trace = Trace { name: name.to_string(), ..Default::default() };
    for row in 0..table.rows.len() {
        let label = table.str_at(row, cat).unwrap_or("").to_string();
        trace.x.push(Coord::Label(label));
        trace.y.push(table.f64_at(row, val).unwrap_or(0.0));
    }
    Some(trace)
}

/// Numeric x and y; rows with NULL on either axis are skipped.
fn numeric_xy_trace(table: &Table, x_col: &str, y_col: &str, name: &str) -> Option<Trace> {
    let x = table.col(x_col)?;
    let y = table.col(y_col)?;
    let mut trace = Trace { name: name.to_string(), ..Default::default() };
    for row in 0..table.rows.len() {
        if let (Some(xv), Some(yv)) = (table.f64_at(row, x), table.f64_at(row, y)) {
            trace.x.push(Coord::Num(xv));
            trace.y.push(yv);
        }
    }
    Some(trace)
}

fn scatter_trace(
    table: &Table,
    x_col: &str,
    y_col: &str,
    label_col: Option<&str>,
    size_col: Option<&str>,
) -> Option<Trace> {
    let x = table.col(x_col)?;
    let y = table.col(y_col)?;
    let label = label_col.and_then(|c| table.col(c));
    let size = size_col.and_then(|c| table.col(c));
    let mut trace = Trace::default();
    let mut texts = Vec::new();
    let mut sizes = Vec::new();
    for row in 0..table.rows.len() {
        let (xv, yv) = match (table.f64_at(row, x), table.f64_at(row, y)) {
            (Some(xv), Some(yv)) => (xv, yv),
            _ => continue,
        };
        trace.x.push(Coord::Num(xv));
        trace.y.push(yv);
        if let Some(l) = label {
            texts.push(table.str_at(row, l).unwrap_or("").to_string());
        }
        if let Some(s) = size {
            // A NULL average (account with no orders) sizes as 1.0.
            sizes.push(table.f64_at(row, s).unwrap_or(1.0));
        }
    }
    if label.is_some() {
        trace.text = Some(texts);
    }
    if size.is_some() {
        trace.size = Some(sizes);
    }
    Some(trace)
}

fn series_scatter_traces(
    table: &Table,
    series_col: &str,
    x_col: &str,
    y_col: &str,
    label_col: Option<&str>,
) -> Vec<Trace> {
    let (series, x, y) = match (table.col(series_col), table.col(x_col), table.col(y_col)) {
        (Some(s), Some(x), Some(y)) => (s, x, y),
        _ => return Vec::new(),
    };
    let label = label_col.and_then(|c| table.col(c));

    // Series appear in first-encounter (result) order for determinism.
    let mut order: Vec<String> = Vec::new();
    for row in 0..table.rows.len() {
        let name = table.str_at(row, series).unwrap_or("").to_string();
        if !order.contains(&name) {
            order.push(name);
        }
    }

    let mut traces = Vec::new();
    for name in order {
        let mut trace = Trace { name: name.clone(), ..Default::default() };
        let mut texts = Vec::new();
        for row in 0..table.rows.len() {
            if table.str_at(row, series).unwrap_or("") != name {
                continue;
            }
            let (xv, yv) = match (table.f64_at(row, x), table.f64_at(row, y)) {
                (Some(xv), Some(yv)) => (xv, yv),
                _ => continue,
            };
            trace.x.push(Coord::Num(xv));
            trace.y.push(yv);
            if let Some(l) = label {
                texts.push(table.str_at(row, l).unwrap_or("").to_string());
            }
        }
        if label.is_some() {
            trace.text = Some(texts);
        }
        traces.push(trace);
    }
    traces
}

/// Pivot long-form rows into stacked traces: one trace per distinct series
/// value, every trace spanning every category, missing cells as zero.
fn pivot_stacked(
    table: &Table,
    category_col: &str,
    series_col: &str,
    value_col: &str,
    text_col: Option<&str>,
) -> Vec<Trace> {
    let (cat, series, val) = match (
        table.col(category_col),
        table.col(series_col),
        table.col(value_col),
    ) {
        (Some(c), Some(s), Some(v)) => (c, s, v),
        _ => return Vec::new(),
    };
    let text = text_col.and_then(|c| table.col(c));

    let mut categories: Vec<String> = Vec::new();
    let mut series_names: Vec<String> = Vec::new();
    for row in 0..table.rows.len() {
        let c = table.str_at(row, cat).unwrap_or("").to_string();
        if !categories.contains(&c) {
            categories.push(c);
        }
        let s = table.str_at(row, series).unwrap_or("").to_string();
        if !series_names.contains(&s) {
            series_names.push(s);
        }
    }

    let mut traces = Vec::new();
    for name in &series_names {
        let mut trace = Trace { name: name.clone(), ..Default::default() };
        let mut texts = Vec::new();
        for c in &categories {
            let mut value = 0.0;
            let mut cell_text = String::new();
            for row in 0..table.rows.len() {
                if table.str_at(row, cat).unwrap_or("") == c.as_str()
                    && table.str_at(row, series).unwrap_or("") == name.as_str()
                {
                    value = table.f64_at(row, val).unwrap_or(0.0);
                    if let Some(t) = text {
                        cell_text = match table.str_at(row, t) {
                            Some(s) => s.to_string(),
                            None => table
                                .f64_at(row, t)
                                .map(|n| format!("{}", n))
                                .unwrap_or_default(),
                        };
                    }
                    break;
                }
            }
            trace.x.push(Coord::Label(c.clone()));
            trace.y.push(value);
            texts.push(cell_text);
        }
        if text.is_some() {
            trace.text = Some(texts);
        }
        traces.push(trace);
    }
    traces
}

/// Min/max markers for a single-series line; ties resolve to the first
/// occurrence.
fn extreme_annotations(trace: &Trace) -> Vec<Annotation> {
    if trace.y.is_empty() {
        return Vec::new();
    }
    let mut min_idx = 0;
    let mut max_idx = 0;
    for (i, v) in trace.y.iter().enumerate() {
        if *v < trace.y[min_idx] {
            min_idx = i;
        }
        if *v > trace.y[max_idx] {
            max_idx = i;
        }
    }
    vec![
        Annotation {
            x: trace.x[min_idx].clone(),
            y: trace.y[min_idx],
            text: format!("Lowest: ${:.2}", trace.y[min_idx]),
        },
        Annotation {
            x: trace.x[max_idx].clone(),
            y: trace.y[max_idx],
            text: format!("Highest: ${:.2}", trace.y[max_idx]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Table;
    use crate::reports::registry;
    use rusqlite::types::Value as SqlValue;

    fn def(id: &str) -> crate::reports::ReportDef {
        registry().into_iter().find(|d| d.id == id).unwrap()
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn empty_table_builds_valid_empty_spec() {
        for report in registry() {
            let table = Table { columns: Vec::new(), rows: Vec::new() };
            let spec = build(&report, "All Regions", &table);
            assert!(spec.no_data, "report {} not flagged no_data", report.id);
            assert!(spec.traces.is_empty());
        }
    }

    #[test]
    fn indicator_sums_rows() {
        let table = Table {
            columns: vec!["region_name".to_string(), "total_sales".to_string()],
            rows: vec![
                vec![text("Northeast"), SqlValue::Real(100.0)],
                vec![text("West"), SqlValue::Real(50.0)],
            ],
        };
        let spec = build(&def("total_sales_indicator"), "All Regions", &table);
        assert_eq!(spec.value, Some(150.0));
        assert!(!spec.no_data);
    }

    #[test]
    fn stacked_pivot_fills_missing_cells_with_zero() {
        // rep A has direct+facebook, rep B only direct: B's facebook cell
        // must be 0.0, not absent, so stack totals line up.
        let table = Table {
            columns: vec![
                "sales_rep_name".to_string(),
                "channel".to_string(),
                "number_of_occurrences".to_string(),
            ],
            rows: vec![
                vec![text("A"), text("direct"), SqlValue::Integer(5)],
                vec![text("A"), text("facebook"), SqlValue::Integer(2)],
                vec![text("B"), text("direct"), SqlValue::Integer(3)],
            ],
        };
        let spec = build(&def("web_events_by_rep_channel"), "All Regions", &table);
        assert_eq!(spec.traces.len(), 2);
        let facebook = spec.traces.iter().find(|t| t.name == "facebook").unwrap();
        assert_eq!(facebook.x.len(), 2);
        assert_eq!(facebook.y, vec![2.0, 0.0]);
    }

    #[test]
    fn line_extreme_annotations() {
        let table = Table {
            columns: vec!["year".to_string(), "total_usd".to_string()],
            rows: vec![
                vec![SqlValue::Integer(2014), SqlValue::Real(50.0)],
                vec![SqlValue::Integer(2013), SqlValue::Real(100.0)],
                vec![SqlValue::Integer(2017), SqlValue::Real(200.0)],
            ],
        };
        let spec = build(&def("yearly_sales_trend"), "All Regions", &table);
        assert_eq!(spec.annotations.len(), 2);
        assert_eq!(spec.annotations[0].y, 50.0);
        assert_eq!(spec.annotations[1].y, 200.0);
    }

    #[test]
    fn scatter_null_size_fills_one() {
        let table = Table {
            columns: vec![
                "account_id".to_string(),
                "account_name".to_string(),
                "total_spent".to_string(),
                "total_orders".to_string(),
                "average_order_amount".to_string(),
            ],
            rows: vec![vec![
                SqlValue::Integer(1),
                text("Acme"),
                SqlValue::Real(10.0),
                SqlValue::Integer(2),
                SqlValue::Null,
            ]],
        };
        let spec = build(&def("customer_lifetime_value"), "All Regions", &table);
        assert_eq!(spec.traces[0].size.as_ref().unwrap(), &vec![1.0]);
    }

    #[test]
    fn polar_bar_maps_month_numbers_to_names() {
        let table = Table {
            columns: vec!["month".to_string(), "total_sales".to_string()],
            rows: vec![
                vec![SqlValue::Integer(1), SqlValue::Real(10.0)],
                vec![SqlValue::Integer(12), SqlValue::Real(20.0)],
            ],
        };
        let spec = build(&def("seasonal_sales"), "All Regions", &table);
        assert_eq!(
            spec.traces[0].x,
            vec![
                Coord::Label("January".to_string()),
                Coord::Label("December".to_string())
            ]
        );
    }

    #[test]
    fn series_scatter_groups_by_segment() {
        let table = Table {
            columns: vec![
                "account_name".to_string(),
                "total_orders".to_string(),
                "total_spend".to_string(),
                "order_activity_segment".to_string(),
                "spending_segment".to_string(),
            ],
            rows: vec![
                vec![text("A"), SqlValue::Integer(9), SqlValue::Real(90.0), text("Highly Active"), text("High Spender")],
                vec![text("B"), SqlValue::Integer(1), SqlValue::Real(10.0), text("Less Active"), text("Low Spender")],
                vec![text("C"), SqlValue::Integer(8), SqlValue::Real(80.0), text("Highly Active"), text("High Spender")],
            ],
        };
        let spec = build(&def("customer_segmentation"), "All Regions", &table);
        assert_eq!(spec.traces.len(), 2);
        assert_eq!(spec.traces[0].name, "Highly Active");
        assert_eq!(spec.traces[0].x.len(), 2);
    }

    #[test]
    fn title_includes_filter_label() {
        let table = Table { columns: Vec::new(), rows: Vec::new() };
        let spec = build(&def("customer_churn"), "West", &table);
        assert!(spec.title.ends_with("(West)"));
    }
}
