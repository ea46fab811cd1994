//! The dashboard pipeline: tables in, chart specs out.
//!
//! Constructed once per process; construction loads and caches the five
//! tables (fatal on any load failure). Each [`Dashboard::render`] call is a
//! pure function of the filter: one synchronous pass over the eighteen
//! report definitions, each isolated so a defective report degrades to an
//! empty chart instead of blanking the page.

use serde::Serialize;
use std::path::Path;

use crate::charts::{self, ChartSpec};
use crate::engine::QueryEngine;
use crate::error::DataLoadError;
use crate::loader;
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::reports::{registry, RegionFilter, ReportDef, ALL_REGIONS};
use crate::schema::TableManifest;

/// Outcome of one report build. `error` is set when the report degraded
/// (its chart is then an empty placeholder).
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub id: String,
    pub chart: ChartSpec,
    pub row_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The fixed three-column page arrangement: six charts per column, render
/// order preserved.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardPage {
    pub filter: String,
    pub columns: Vec<Vec<ReportOutput>>,
}

pub struct Dashboard {
    engine: QueryEngine,
    reports: Vec<ReportDef>,
    manifests: Vec<TableManifest>,
    region_names: Vec<String>,
}

impl Dashboard {
    /// Load the five tables from `data_dir` and build the report registry.
    /// All-or-nothing: any table failure aborts construction.
    pub fn new(data_dir: &Path) -> Result<Self, DataLoadError> {
        let (conn, manifests) = loader::load_all(data_dir)?;
        let engine =
            QueryEngine::new(conn).map_err(|e| DataLoadError::Engine { source: e })?;

        // Region selector options follow table load order, not alphabetical.
        let region_names = {
            let conn = engine.connection();
            let mut stmt = conn
                .prepare("SELECT name FROM region ORDER BY rowid")
                .map_err(|e| DataLoadError::Engine { source: e })?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| DataLoadError::Engine { source: e })?
                .collect::<Result<Vec<String>, _>>()
                .map_err(|e| DataLoadError::Engine { source: e })?;
            names
        };

        log(
            Level::Info,
            Domain::System,
            "dashboard_ready",
            obj(&[
                ("tables", v_num(manifests.len() as f64)),
                ("regions", v_num(region_names.len() as f64)),
            ]),
        );

        Ok(Self { engine, reports: registry(), manifests, region_names })
    }

    /// Selector values: the sentinel first, then region names in load order.
    pub fn region_options(&self) -> Vec<String> {
        let mut options = Vec::with_capacity(self.region_names.len() + 1);
        options.push(ALL_REGIONS.to_string());
        options.extend(self.region_names.iter().cloned());
        options
    }

    pub fn manifests(&self) -> &[TableManifest] {
        &self.manifests
    }

    pub fn reports(&self) -> &[ReportDef] {
        &self.reports
    }

    /// Run all eighteen reports against the cached tables for one filter
    /// value. Per-report isolation: a query failure logs a diagnostic and
    /// yields an empty chart for that report only.
    pub fn render(&self, filter: &RegionFilter) -> Vec<ReportOutput> {
        let param = filter.to_param();
        let bindings: [(&str, &dyn rusqlite::ToSql); 1] = [(":region", &param)];
        self.reports
            .iter()
            .map(|def| {
                let sql = def.sql();
                match self.engine.execute(&sql, &bindings) {
                    Ok(table) => {
                        let chart = charts::build(def, filter.label(), &table);
                        if chart.no_data {
                            log(
                                Level::Debug,
                                Domain::Report,
                                "empty_result",
                                obj(&[
                                    ("report", v_str(def.id)),
                                    ("filter", v_str(filter.label())),
                                ]),
                            );
                        }
                        ReportOutput {
                            id: def.id.to_string(),
                            chart,
                            row_count: table.rows.len(),
                            error: None,
                        }
                    }
                    Err(err) => {
                        log(
                            Level::Error,
                            Domain::Report,
                            "report_failed",
                            obj(&[
                                ("report", v_str(def.id)),
                                ("filter", v_str(filter.label())),
                                ("error", v_str(&err.to_string())),
                            ]),
                        );
                        ReportOutput {
                            id: def.id.to_string(),
                            chart: ChartSpec::empty(
                                charts::chart_kind(&def.strategy),
                                def.title,
                                def.x_title,
                                def.y_title,
                            ),
                            row_count: 0,
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .collect()
    }

    /// Render and arrange into the fixed three-column layout.
    pub fn render_page(&self, filter: &RegionFilter) -> DashboardPage {
        let outputs = self.render(filter);
        let mut columns: Vec<Vec<ReportOutput>> = vec![Vec::new(), Vec::new(), Vec::new()];
        for (i, out) in outputs.into_iter().enumerate() {
            columns[i / 6].push(out);
        }
        DashboardPage { filter: filter.label().to_string(), columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::write_minimal_dataset;
    use tempfile::tempdir;

    fn dashboard() -> (tempfile::TempDir, Dashboard) {
        let dir = tempdir().unwrap();
        write_minimal_dataset(dir.path());
        let dash = Dashboard::new(dir.path()).unwrap();
        (dir, dash)
    }

    #[test]
    fn renders_all_eighteen_reports() {
        let (_dir, dash) = dashboard();
        let outputs = dash.render(&RegionFilter::All);
        assert_eq!(outputs.len(), 18);
        for out in &outputs {
            assert!(out.error.is_none(), "report {} failed: {:?}", out.id, out.error);
        }
    }

    #[test]
    fn page_layout_is_three_by_six() {
        let (_dir, dash) = dashboard();
        let page = dash.render_page(&RegionFilter::All);
        assert_eq!(page.columns.len(), 3);
        for col in &page.columns {
            assert_eq!(col.len(), 6);
        }
    }

    #[test]
    fn region_options_start_with_sentinel_in_load_order() {
        let (_dir, dash) = dashboard();
        let options = dash.region_options();
        assert_eq!(options[0], ALL_REGIONS);
        assert_eq!(&options[1..], &["Northeast", "West"]);
    }

    #[test]
    fn unknown_region_renders_empty_not_error() {
        let (_dir, dash) = dashboard();
        let outputs = dash.render(&RegionFilter::Region("Atlantis".to_string()));
        assert_eq!(outputs.len(), 18);
        for out in &outputs {
            assert!(out.error.is_none(), "report {} raised on unknown region", out.id);
        }
        // The indicator has nothing to sum for a region that does not exist.
        let indicator = outputs.iter().find(|o| o.id == "total_sales_indicator").unwrap();
        assert!(indicator.chart.no_data);
    }

    #[test]
    fn defective_report_degrades_without_blanking_the_rest() {
        let (_dir, mut dash) = dashboard();
        let broken = dash.reports[3]
            .clone()
            .with_template("SELECT nothing FROM missing_table WHERE {region}");
        dash.reports[3] = broken;

        let outputs = dash.render(&RegionFilter::All);
        assert_eq!(outputs.len(), 18);

        let bad = &outputs[3];
        assert!(bad.error.is_some(), "broken query must surface its error");
        assert!(bad.chart.no_data, "broken report must degrade to a placeholder");
        assert!(bad.chart.traces.is_empty());
        assert_eq!(bad.row_count, 0);

        for (i, out) in outputs.iter().enumerate() {
            if i != 3 {
                assert!(out.error.is_none(), "report {} should be unaffected", out.id);
            }
        }
    }

    #[test]
    fn quoted_region_name_is_inert() {
        let (_dir, dash) = dashboard();
        let outputs = dash.render(&RegionFilter::Region("O'Brien Region".to_string()));
        for out in &outputs {
            assert!(out.error.is_none(), "report {} choked on quoted name", out.id);
        }
    }
}
