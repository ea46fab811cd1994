//! Report registry: the eighteen dashboard reports as data.
//!
//! Each report is a parameterized aggregation template with exactly one
//! region-predicate slot (`{region}`) plus a chart strategy telling the
//! chart builder how to reshape the result. The slot expands to a prepared
//! predicate bound to the `:region` parameter; the filter value itself never
//! enters the SQL text, so a region name containing a quote cannot alter
//! query semantics.

use rusqlite::types::Value as SqlValue;

/// Sentinel option meaning "no region filter".
pub const ALL_REGIONS: &str = "All Regions";

/// Zero-division guard for the unit-price derivation. Inherited from the
/// source metric definition; not a business constant.
pub const QTY_EPSILON: f64 = 0.01;

/// The single textual slot every template carries.
const REGION_SLOT: &str = "{region}";

/// Epsilon slot used only by the unit-price template.
const EPS_SLOT: &str = "{eps}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionFilter {
    All,
    Region(String),
}

impl RegionFilter {
    /// Interpret a user-facing selector choice. The sentinel maps to `All`;
    /// anything else (including unknown or empty names) is an exact-match
    /// filter that may legitimately select zero rows.
    pub fn from_choice(choice: &str) -> Self {
        if choice == ALL_REGIONS {
            RegionFilter::All
        } else {
            RegionFilter::Region(choice.to_string())
        }
    }

    /// Value bound to `:region`: NULL disables the predicate, text matches
    /// the region name exactly.
    pub fn to_param(&self) -> SqlValue {
        match self {
            RegionFilter::All => SqlValue::Null,
            RegionFilter::Region(name) => SqlValue::Text(name.clone()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RegionFilter::All => ALL_REGIONS,
            RegionFilter::Region(name) => name,
        }
    }
}

/// How the chart builder maps a result table onto traces.
#[derive(Debug, Clone)]
pub enum ChartStrategy {
    /// Single big number: sum of `value_col` over all rows.
    Indicator { value_col: &'static str },
    Bar {
        x_col: &'static str,
        y_col: &'static str,
    },
    HorizontalBar {
        category_col: &'static str,
        value_col: &'static str,
    },
    /// One series per (name, column) pair, shared categories.
    GroupedBar {
        category_col: &'static str,
        series: &'static [(&'static str, &'static str)],
    },
    /// Pivot: distinct `series_col` values become stacked traces; missing
    /// (category, series) cells fill as zero so stack totals stay correct.
    StackedBar {
        category_col: &'static str,
        series_col: &'static str,
        value_col: &'static str,
        text_col: Option<&'static str>,
    },
    Scatter {
        x_col: &'static str,
        y_col: &'static str,
        label_col: Option<&'static str>,
        size_col: Option<&'static str>,
    },
    /// Scatter with one trace per distinct `series_col` value.
    SeriesScatter {
        series_col: &'static str,
        x_col: &'static str,
        y_col: &'static str,
        label_col: Option<&'static str>,
    },
    Line {
        x_col: &'static str,
        y_col: &'static str,
        annotate_extremes: bool,
    },
    /// Multi-series line over a shared x column.
    MultiLine {
        x_col: &'static str,
        series: &'static [(&'static str, &'static str)],
    },
    /// Polar bar over calendar months (1..=12 mapped to month names).
    PolarBar {
        month_col: &'static str,
        value_col: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct ReportDef {
    pub id: &'static str,
    pub title: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    template: &'static str,
    /// Column the region predicate tests; almost always the joined region
    /// table's name, except where a CTE re-exposes it under another alias.
    region_column: &'static str,
    pub strategy: ChartStrategy,
}

impl ReportDef {
    /// Expand the template slots into executable SQL. The region slot
    /// becomes a prepared predicate over `:region`; user input is never
    /// interpolated.
    pub fn sql(&self) -> String {
        let predicate = format!(
            "(:region IS NULL OR {} = :region)",
            self.region_column
        );
        self.template
            .replace(REGION_SLOT, &predicate)
            .replace(EPS_SLOT, &QTY_EPSILON.to_string())
    }

    pub fn template(&self) -> &'static str {
        self.template
    }

    /// Test seam: same report, different SQL template.
    #[cfg(test)]
    pub(crate) fn with_template(mut self, template: &'static str) -> Self {
        self.template = template;
        self
    }
}

/// The full registry in render order: column 1 is reports 1-6, column 2 is
/// 7-12, column 3 is 13-18.
pub fn registry() -> Vec<ReportDef> {
    vec![
        ReportDef {
            id: "total_sales_indicator",
            title: "Total Sales Amount",
            x_title: "",
            y_title: "",
            region_column: "r.name",
            template: "\
SELECT r.name AS region_name,
       SUM(o.total_amt_usd) AS total_sales
FROM orders o
JOIN accounts a ON o.account_id = a.id
JOIN sales_reps sr ON a.sales_rep_id = sr.id
JOIN region r ON sr.region_id = r.id
WHERE {region}
GROUP BY r.name
ORDER BY total_sales DESC",
            strategy: ChartStrategy::Indicator { value_col: "total_sales" },
        },
        ReportDef {
            id: "accounts_per_rep",
            title: "Accounts by Sales Rep",
            x_title: "Sales Representative",
            y_title: "Number of Accounts",
            region_column: "r.name",
            template: "\
SELECT sr.name AS rep_name,
       COUNT(a.id) AS account_count
FROM region r
JOIN sales_reps sr ON r.id = sr.region_id
JOIN accounts a ON sr.id = a.sales_rep_id
WHERE {region}
GROUP BY sr.name
ORDER BY sr.name ASC",
            strategy: ChartStrategy::Bar { x_col: "rep_name", y_col: "account_count" },
        },
        ReportDef {
            id: "web_events_by_rep_channel",
            title: "Web Event Occurrences by Sales Representative and Channel",
            x_title: "Sales Representative",
            y_title: "Number of Occurrences",
            region_column: "r.name",
            template: "\
SELECT sr.name AS sales_rep_name,
       we.channel AS channel,
       COUNT(*) AS number_of_occurrences
FROM web_events we
JOIN accounts a ON we.account_id = a.id
JOIN sales_reps sr ON a.sales_rep_id = sr.id
JOIN region r ON sr.region_id = r.id
WHERE {region}
GROUP BY sr.name, we.channel
ORDER BY number_of_occurrences DESC, sr.name, we.channel",
            strategy: ChartStrategy::StackedBar {
                category_col: "sales_rep_name",
                series_col: "channel",
                value_col: "number_of_occurrences",
                text_col: None,
            },
        },
        ReportDef {
            id: "customer_acquisition",
            title: "Customer Acquisition Analysis by Sales Rep",
            x_title: "Year of First Order",
            y_title: "New Customers Acquired",
            region_column: "r.name",
            template: "\
SELECT sr.name AS sales_representative,
       COUNT(DISTINCT a.id) AS new_customers_acquired,
       CAST(strftime('%Y', MIN(o.occurred_at)) AS INTEGER) AS first_order_year
FROM sales_reps sr
LEFT JOIN accounts a ON sr.id = a.sales_rep_id
LEFT JOIN orders o ON a.id = o.account_id
LEFT JOIN region r ON sr.region_id = r.id
WHERE {region}
GROUP BY sr.name
ORDER BY new_customers_acquired DESC, sales_representative",
            strategy: ChartStrategy::SeriesScatter {
                series_col: "sales_representative",
                x_col: "first_order_year",
                y_col: "new_customers_acquired",
                label_col: None,
            },
        },
        ReportDef {
            id: "avg_order_size_by_region",
            title: "Average Order Size Comparison Across Regions",
            x_title: "Average Order Size (USD)",
            y_title: "Region",
            region_column: "r.name",
            template: "\
SELECT r.name AS region_name,
       AVG(o.total_amt_usd) AS avg_order_size
FROM orders o
JOIN accounts a ON o.account_id = a.id
JOIN sales_reps sr ON a.sales_rep_id = sr.id
JOIN region r ON sr.region_id = r.id
WHERE {region}
GROUP BY r.name
ORDER BY avg_order_size DESC",
            strategy: ChartStrategy::HorizontalBar {
                category_col: "region_name",
                value_col: "avg_order_size",
            },
        },
        ReportDef {
            id: "segment_analysis",
            title: "Analysis of Order Size, Number of Accounts, and Total Sales by Segment",
            x_title: "Customer Segment",
            y_title: "Values (USD / Accounts)",
            region_column: "r.name",
            // Volume boundary is exclusive: exactly 50 orders is Moderate.
            template: "\
WITH order_summary AS (
    SELECT a.id AS account_id,
           AVG(o.total_amt_usd) AS avg_order_amt_usd,
           stddev(o.total_amt_usd) AS order_amt_std_dev,
           COUNT(o.id) AS total_orders,
           SUM(o.total_amt_usd) AS total_sales
    FROM accounts a
    LEFT JOIN orders o ON a.id = o.account_id
    LEFT JOIN sales_reps sr ON a.sales_rep_id = sr.id
    LEFT JOIN region r ON sr.region_id = r.id
    WHERE {region}
    GROUP BY a.id
),
segmented_orders AS (
    SELECT *,
        CASE
            WHEN total_orders > 50 THEN 'High Volume'
            WHEN total_orders > 10 THEN 'Moderate Volume'
            ELSE 'Low Volume'
        END AS order_volume_segment,
        CASE
            WHEN avg_order_amt_usd > 1000 THEN 'High Value'
            ELSE 'Low Value'
        END AS order_value_segment
    FROM order_summary
)
SELECT order_volume_segment || ' - ' || order_value_segment AS segment,
       COUNT(account_id) AS num_accounts,
       AVG(avg_order_amt_usd) AS avg_order_size_usd,
       AVG(order_amt_std_dev) AS avg_order_std_dev_usd,
       SUM(total_sales) AS total_sales_in_segment
FROM segmented_orders
GROUP BY order_volume_segment, order_value_segment
ORDER BY num_accounts DESC, segment",
            strategy: ChartStrategy::GroupedBar {
                category_col: "segment",
                series: &[
                    ("Avg Order Size (USD)", "avg_order_size_usd"),
                    ("Number of Accounts", "num_accounts"),
                    ("Total Sales (USD)", "total_sales_in_segment"),
                    ("Order Std. Dev. (USD)", "avg_order_std_dev_usd"),
                ],
            },
        },
        ReportDef {
            id: "unit_price",
            title: "Unit Price for Orders with Quantity Conditions",
            x_title: "Account Name",
            y_title: "Unit Price (USD)",
            region_column: "r.name",
            template: "\
SELECT r.name AS region,
       a.name AS account_name,
       o.total_amt_usd / (o.total + {eps}) AS unit_price
FROM region r
JOIN sales_reps sr ON r.id = sr.region_id
JOIN accounts a ON sr.id = a.sales_rep_id
JOIN orders o ON a.id = o.account_id
WHERE o.standard_qty > 100
  AND o.poster_qty > 50
  AND {region}
ORDER BY unit_price DESC",
            strategy: ChartStrategy::Bar { x_col: "account_name", y_col: "unit_price" },
        },
        ReportDef {
            id: "yearly_sales_trend",
            title: "Total USD Amount of Orders by Year",
            x_title: "Year",
            y_title: "Total USD Amount",
            region_column: "r.name",
            template: "\
SELECT CAST(strftime('%Y', o.occurred_at) AS INTEGER) AS year,
       SUM(o.total_amt_usd) AS total_usd
FROM orders o
JOIN accounts a ON o.account_id = a.id
JOIN sales_reps sr ON a.sales_rep_id = sr.id
JOIN region r ON sr.region_id = r.id
WHERE {region}
GROUP BY year
ORDER BY total_usd ASC",
            strategy: ChartStrategy::Line {
                x_col: "year",
                y_col: "total_usd",
                annotate_extremes: true,
            },
        },
        ReportDef {
            id: "customer_lifetime_value",
            title: "Customer Lifetime Value Analysis",
            x_title: "Total Orders",
            y_title: "Total Spent (USD)",
            region_column: "r.name",
            template: "\
SELECT a.id AS account_id,
       a.name AS account_name,
       SUM(o.total_amt_usd) AS total_spent,
       COUNT(o.id) AS total_orders,
       AVG(o.total_amt_usd) AS average_order_amount
FROM accounts a
LEFT JOIN orders o ON a.id = o.account_id
LEFT JOIN sales_reps sr ON a.sales_rep_id = sr.id
LEFT JOIN region r ON sr.region_id = r.id
WHERE {region}
GROUP BY a.id, a.name
ORDER BY total_spent DESC, account_name",
            strategy: ChartStrategy::Scatter {
                x_col: "total_orders",
                y_col: "total_spent",
                label_col: Some("account_name"),
                size_col: Some("average_order_amount"),
            },
        },
        ReportDef {
            id: "customer_churn",
            title: "Customer Churn Analysis",
            x_title: "Number of Customers",
            y_title: "Customer Status",
            region_column: "r.name",
            // "Active" means ever ordered; no recency window is applied, so
            // this is closer to never-converted than true churn.
            template: "\
WITH last_order_dates AS (
    SELECT account_id,
           MAX(occurred_at) AS last_order_date
    FROM orders
    GROUP BY account_id
),
counts AS (
    SELECT COUNT(DISTINCT l.account_id) AS active_customers,
           COUNT(DISTINCT a.id) - COUNT(DISTINCT l.account_id) AS churned_customers
    FROM accounts a
    LEFT JOIN last_order_dates l ON a.id = l.account_id
    LEFT JOIN sales_reps sr ON a.sales_rep_id = sr.id
    LEFT JOIN region r ON sr.region_id = r.id
    WHERE {region}
)
SELECT 'Active Customers' AS customer_status, active_customers AS customers FROM counts
UNION ALL
SELECT 'Churned Customers' AS customer_status, churned_customers AS customers FROM counts",
            strategy: ChartStrategy::HorizontalBar {
                category_col: "customer_status",
                value_col: "customers",
            },
        },
        ReportDef {
            id: "channel_effectiveness_by_region",
            title: "Web Event Effectiveness by Region and Channel",
            x_title: "Region",
            y_title: "Total Events",
            region_column: "r.name",
            template: "\
SELECT r.name AS region_name,
       we.channel AS channel,
       COUNT(we.id) AS total_events,
       COUNT(DISTINCT a.id) AS unique_accounts_impacted
FROM web_events we
LEFT JOIN accounts a ON we.account_id = a.id
LEFT JOIN sales_reps sr ON a.sales_rep_id = sr.id
LEFT JOIN region r ON sr.region_id = r.id
WHERE {region}
GROUP BY r.name, we.channel
ORDER BY r.name, total_events DESC, we.channel",
            strategy: ChartStrategy::StackedBar {
                category_col: "region_name",
                series_col: "channel",
                value_col: "total_events",
                text_col: Some("unique_accounts_impacted"),
            },
        },
        ReportDef {
            id: "rep_contribution",
            title: "Sales Contribution by Sales Rep and Region",
            x_title: "Sales Representative",
            y_title: "Contribution Percentage (%)",
            // Region totals are computed over all data; the filter narrows
            // the output rows only, so percentages stay region-relative.
            region_column: "sc.region_name",
            template: "\
WITH sales_contribution AS (
    SELECT r.name AS region_name,
           sr.name AS sales_representative,
           COUNT(o.id) AS num_orders,
           SUM(o.total_amt_usd) AS total_amt_usd
    FROM sales_reps sr
    JOIN accounts a ON sr.id = a.sales_rep_id
    JOIN orders o ON a.id = o.account_id
    JOIN region r ON sr.region_id = r.id
    GROUP BY r.name, sr.name
),
region_total_sales AS (
    SELECT region_name,
           SUM(total_amt_usd) AS region_total_amt_usd
    FROM sales_contribution
    GROUP BY region_name
)
SELECT sc.region_name,
       sc.sales_representative,
       sc.num_orders,
       sc.total_amt_usd,
       rt.region_total_amt_usd,
       ROUND(sc.total_amt_usd / rt.region_total_amt_usd * 100, 2) AS contribution_percent_of_region
FROM sales_contribution sc
JOIN region_total_sales rt ON sc.region_name = rt.region_name
WHERE {region}
ORDER BY sc.region_name, contribution_percent_of_region DESC, sc.sales_representative",
            strategy: ChartStrategy::Bar {
                x_col: "sales_representative",
                y_col: "contribution_percent_of_region",
            },
        },
        ReportDef {
            id: "order_trends_2013_2017",
            title: "Order Trends by Year and Month",
            x_title: "Year-Month",
            y_title: "Amount / Number of Orders",
            region_column: "r.name",
            // Inclusion list, not a range: only 2013 and 2017 participate.
            template: "\
SELECT CAST(strftime('%Y', o.occurred_at) AS INTEGER) AS year,
       CAST(strftime('%m', o.occurred_at) AS INTEGER) AS month,
       strftime('%Y-%m', o.occurred_at) AS year_month,
       SUM(o.total_amt_usd) AS total_usd,
       AVG(o.total_amt_usd) AS avg_order_amt,
       COUNT(o.id) AS total_orders,
       MAX(o.total_amt_usd) AS max_order_amt
FROM orders o
JOIN accounts a ON o.account_id = a.id
JOIN sales_reps sr ON a.sales_rep_id = sr.id
JOIN region r ON sr.region_id = r.id
WHERE {region}
  AND CAST(strftime('%Y', o.occurred_at) AS INTEGER) IN (2013, 2017)
GROUP BY year, month
ORDER BY year ASC, month ASC",
            strategy: ChartStrategy::MultiLine {
                x_col: "year_month",
                series: &[
                    ("Total USD", "total_usd"),
                    ("Average Order Amount (USD)", "avg_order_amt"),
                    ("Total Orders", "total_orders"),
                    ("Max Order Amount (USD)", "max_order_amt"),
                ],
            },
        },
        ReportDef {
            id: "avg_product_amounts",
            title: "Average Order Amounts by Account Name",
            x_title: "Account Name",
            y_title: "Average Order Amount (USD)",
            region_column: "r.name",
            template: "\
SELECT a.name AS account_name,
       AVG(o.standard_amt_usd) AS avg_standard_amt_usd,
       AVG(o.gloss_amt_usd) AS avg_gloss_amt_usd,
       AVG(o.poster_amt_usd) AS avg_poster_amt_usd
FROM accounts a
JOIN orders o ON a.id = o.account_id
JOIN sales_reps sr ON a.sales_rep_id = sr.id
JOIN region r ON sr.region_id = r.id
WHERE {region}
GROUP BY a.name
ORDER BY a.name",
            strategy: ChartStrategy::MultiLine {
                x_col: "account_name",
                series: &[
                    ("Avg Standard Amt (USD)", "avg_standard_amt_usd"),
                    ("Avg Gloss Amt (USD)", "avg_gloss_amt_usd"),
                    ("Avg Poster Amt (USD)", "avg_poster_amt_usd"),
                ],
            },
        },
        ReportDef {
            id: "channel_effectiveness",
            title: "Channel Effectiveness Analysis",
            x_title: "Channel",
            y_title: "Count",
            region_column: "r.name",
            template: "\
SELECT we.channel AS channel,
       COUNT(we.id) AS total_events,
       COUNT(DISTINCT we.account_id) AS unique_accounts,
       COUNT(DISTINCT a.id) AS total_customers
FROM web_events we
LEFT JOIN accounts a ON we.account_id = a.id
LEFT JOIN sales_reps sr ON a.sales_rep_id = sr.id
LEFT JOIN region r ON sr.region_id = r.id
WHERE {region}
GROUP BY we.channel
ORDER BY total_events DESC, we.channel",
            strategy: ChartStrategy::GroupedBar {
                category_col: "channel",
                series: &[
                    ("Total Events", "total_events"),
                    ("Unique Accounts", "unique_accounts"),
                    ("Total Customers", "total_customers"),
                ],
            },
        },
        ReportDef {
            id: "seasonal_sales",
            title: "Seasonal Sales Trends",
            x_title: "Month",
            y_title: "Total Sales (USD)",
            region_column: "r.name",
            template: "\
SELECT CAST(strftime('%m', o.occurred_at) AS INTEGER) AS month,
       SUM(o.total_amt_usd) AS total_sales
FROM orders o
LEFT JOIN accounts a ON o.account_id = a.id
LEFT JOIN sales_reps sr ON a.sales_rep_id = sr.id
LEFT JOIN region r ON sr.region_id = r.id
WHERE {region}
GROUP BY month
ORDER BY month",
            strategy: ChartStrategy::PolarBar {
                month_col: "month",
                value_col: "total_sales",
            },
        },
        ReportDef {
            id: "customer_segmentation",
            title: "Customer Segmentation by Purchase Frequency and Total Spend",
            x_title: "Total Orders",
            y_title: "Total Spend (USD)",
            region_column: "r.name",
            // Dense ranks: ties share a rank and the next distinct value
            // continues without gaps.
            template: "\
WITH customer_summary AS (
    SELECT a.id AS account_id,
           a.name AS account_name,
           COUNT(o.id) AS total_orders,
           SUM(o.total_amt_usd) AS total_spend,
           DENSE_RANK() OVER (ORDER BY COUNT(o.id) DESC) AS order_rank,
           DENSE_RANK() OVER (ORDER BY SUM(o.total_amt_usd) DESC) AS spend_rank
    FROM accounts a
    LEFT JOIN orders o ON a.id = o.account_id
    LEFT JOIN sales_reps sr ON a.sales_rep_id = sr.id
    LEFT JOIN region r ON sr.region_id = r.id
    WHERE {region}
    GROUP BY a.id, a.name
)
SELECT account_name,
       total_orders,
       total_spend,
       CASE
           WHEN order_rank <= 3 THEN 'Highly Active'
           WHEN order_rank <= 10 THEN 'Moderately Active'
           ELSE 'Less Active'
       END AS order_activity_segment,
       CASE
           WHEN spend_rank <= 3 THEN 'High Spender'
           WHEN spend_rank <= 10 THEN 'Moderate Spender'
           ELSE 'Low Spender'
       END AS spending_segment
FROM customer_summary
ORDER BY order_rank, spend_rank, account_name",
            strategy: ChartStrategy::SeriesScatter {
                series_col: "order_activity_segment",
                x_col: "total_orders",
                y_col: "total_spend",
                label_col: Some("account_name"),
            },
        },
        ReportDef {
            id: "activity_segment_sales",
            title: "Average Sales by Account Activity Segment",
            x_title: "Account Activity Segment",
            y_title: "Average Sales (USD)",
            region_column: "r.name",
            template: "\
WITH account_order_count AS (
    SELECT a.id AS account_id,
           a.name AS account_name,
           COUNT(o.id) AS order_count,
           SUM(o.total_amt_usd) AS total_sales,
           r.name AS region_name
    FROM accounts a
    LEFT JOIN orders o ON a.id = o.account_id
    LEFT JOIN sales_reps sr ON a.sales_rep_id = sr.id
    LEFT JOIN region r ON sr.region_id = r.id
    WHERE {region}
    GROUP BY a.id, a.name, r.name
),
activity_segments AS (
    SELECT account_id,
           account_name,
           total_sales,
           region_name,
        CASE
            WHEN order_count > 20 THEN 'High Activity'
            WHEN order_count BETWEEN 10 AND 20 THEN 'Medium Activity'
            ELSE 'Low Activity'
        END AS activity_segment
    FROM account_order_count
)
SELECT region_name,
       activity_segment,
       AVG(total_sales) AS avg_sales
FROM activity_segments
GROUP BY region_name, activity_segment
ORDER BY region_name, avg_sales DESC, activity_segment",
            strategy: ChartStrategy::StackedBar {
                category_col: "activity_segment",
                series_col: "region_name",
                value_col: "avg_sales",
                text_col: None,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_eighteen_reports() {
        assert_eq!(registry().len(), 18);
    }

    #[test]
    fn report_ids_are_unique() {
        let defs = registry();
        let mut ids: Vec<&str> = defs.iter().map(|d| d.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), defs.len());
    }

    #[test]
    fn every_template_has_exactly_one_region_slot() {
        for def in registry() {
            let count = def.template().matches(REGION_SLOT).count();
            assert_eq!(count, 1, "report {} has {} region slots", def.id, count);
        }
    }

    #[test]
    fn no_template_interpolates_filter_text() {
        // The expanded SQL binds :region; no single-quoted placeholder for
        // the filter value may appear anywhere.
        for def in registry() {
            let sql = def.sql();
            assert!(sql.contains(":region"), "report {} lost its parameter", def.id);
            assert!(!sql.contains("{region}"), "report {} left its slot unexpanded", def.id);
        }
    }

    #[test]
    fn unit_price_template_carries_epsilon_guard() {
        let defs = registry();
        let def = defs.iter().find(|d| d.id == "unit_price").unwrap();
        assert!(def.sql().contains(&QTY_EPSILON.to_string()));
    }

    #[test]
    fn filter_from_choice_maps_sentinel() {
        assert_eq!(RegionFilter::from_choice(ALL_REGIONS), RegionFilter::All);
        assert_eq!(
            RegionFilter::from_choice("Northeast"),
            RegionFilter::Region("Northeast".to_string())
        );
    }

    #[test]
    fn filter_binds_null_or_text() {
        assert_eq!(RegionFilter::All.to_param(), SqlValue::Null);
        assert_eq!(
            RegionFilter::Region("West".to_string()).to_param(),
            SqlValue::Text("West".to_string())
        );
    }
}
