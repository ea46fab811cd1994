use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

use salesdash::dashboard::Dashboard;
use salesdash::logging::{log, obj, v_num, v_str, Domain, Level};
use salesdash::reports::RegionFilter;

fn main() -> Result<()> {
    let data_dir = env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let region_choice = env::args()
        .nth(2)
        .or_else(|| env::var("REGION").ok())
        .unwrap_or_else(|| "All Regions".to_string());
    let out_path = env::args()
        .nth(3)
        .or_else(|| env::var("OUT_PATH").ok())
        .unwrap_or_else(|| "dashboard.json".to_string());

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[("data_dir", v_str(&data_dir)), ("region", v_str(&region_choice))]),
    );

    // Load failures are deployment problems: fatal, reported once.
    let dashboard = match Dashboard::new(&PathBuf::from(&data_dir)) {
        Ok(d) => d,
        Err(err) => {
            log(
                Level::Fatal,
                Domain::System,
                "load_failed",
                obj(&[("error", v_str(&err.to_string()))]),
            );
            return Err(err.into());
        }
    };

    let filter = RegionFilter::from_choice(&region_choice);
    let page = dashboard.render_page(&filter);

    let doc = serde_json::json!({
        "region_options": dashboard.region_options(),
        "manifests": dashboard.manifests(),
        "page": &page,
    });
    fs::write(&out_path, serde_json::to_string_pretty(&doc)?)
        .with_context(|| format!("failed to write {}", out_path))?;

    let charts: usize = page.columns.iter().map(|c| c.len()).sum();
    log(
        Level::Info,
        Domain::System,
        "render_complete",
        obj(&[
            ("out", v_str(&out_path)),
            ("charts", v_num(charts as f64)),
        ]),
    );
    Ok(())
}
