//! HTML rendering for report artifacts
//!
//! Each artifact is a single self-contained page: summary statistics, a
//! results table and two chart.js bar charts whose labels are the district
//! names and whose datasets are the report's two metrics.

use crate::data::TypeLabel;
use crate::report::generator::{BudgetReportRow, PriceReportRow, ReportStats};
use chrono::{DateTime, Local};
use std::fmt::Write;

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";

/// Render the price-by-district report page
pub fn render_price_report(
    rows: &[PriceReportRow],
    stats: ReportStats,
    type_label: TypeLabel,
    area: f64,
    generated_at: DateTime<Local>,
) -> String {
    let mut page = String::new();
    push_header(&mut page, "Predicted property prices by district");

    let _ = writeln!(
        page,
        "<h3>Generated {}, area {} m², property type {}</h3>",
        generated_at.format("%Y-%m-%d %H:%M"),
        area,
        type_label
    );
    let _ = writeln!(page, "<p>Mean price: {:.2} €</p>", stats.mean);
    let _ = writeln!(page, "<p>Maximum price: {:.2} €</p>", stats.max);
    let _ = writeln!(page, "<p>Minimum price: {:.2} €</p>", stats.min);

    page.push_str(
        "<table border='1'><tr><th>District</th><th>Total Price (€)</th>\
         <th>Price per m² (€)</th></tr>\n",
    );
    for row in rows {
        let _ = writeln!(
            page,
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td></tr>",
            row.district, row.total_price, row.price_per_sqm
        );
    }
    page.push_str("</table>\n");

    let labels: Vec<&str> = rows.iter().map(|r| r.district.as_str()).collect();
    push_chart(
        &mut page,
        "totalPriceChart",
        "Total Price (€)",
        &labels,
        &rows.iter().map(|r| r.total_price).collect::<Vec<_>>(),
    );
    push_chart(
        &mut page,
        "pricePerSqMChart",
        "Price per m² (€)",
        &labels,
        &rows.iter().map(|r| r.price_per_sqm).collect::<Vec<_>>(),
    );

    page.push_str("</body></html>\n");
    page
}

/// Render the max-affordable-area report page
pub fn render_budget_report(
    rows: &[BudgetReportRow],
    stats: ReportStats,
    type_label: TypeLabel,
    max_budget: f64,
    generated_at: DateTime<Local>,
) -> String {
    let mut page = String::new();
    push_header(&mut page, "Maximum affordable area by district");

    let _ = writeln!(
        page,
        "<h3>Generated {}, budget {} €, property type {}</h3>",
        generated_at.format("%Y-%m-%d %H:%M"),
        max_budget,
        type_label
    );
    let _ = writeln!(page, "<p>Mean affordable area: {:.2} m²</p>", stats.mean);
    let _ = writeln!(page, "<p>Maximum affordable area: {:.2} m²</p>", stats.max);
    let _ = writeln!(page, "<p>Minimum affordable area: {:.2} m²</p>", stats.min);

    page.push_str(
        "<table border='1'><tr><th>District</th><th>Max Area (m²)</th>\
         <th>Max Rooms</th><th>Avg Price per m² (€)</th></tr>\n",
    );
    for row in rows {
        let _ = writeln!(
            page,
            "<tr><td>{}</td><td>{:.2}</td><td>{}</td><td>{:.2}</td></tr>",
            row.district, row.max_area, row.max_rooms, row.price_per_sqm
        );
    }
    page.push_str("</table>\n");

    let labels: Vec<&str> = rows.iter().map(|r| r.district.as_str()).collect();
    push_chart(
        &mut page,
        "maxAreaChart",
        "Max Area (m²)",
        &labels,
        &rows.iter().map(|r| r.max_area).collect::<Vec<_>>(),
    );
    push_chart(
        &mut page,
        "avgPricePerSqMChart",
        "Avg Price per m² (€)",
        &labels,
        &rows.iter().map(|r| r.price_per_sqm).collect::<Vec<_>>(),
    );

    page.push_str("</body></html>\n");
    page
}

fn push_header(page: &mut String, subtitle: &str) {
    let _ = writeln!(
        page,
        "<html><head><meta charset='utf-8'>\
         <script src='{}'></script></head><body>",
        CHART_JS_CDN
    );
    page.push_str("<h1>Real Estate Market Report</h1>\n");
    let _ = writeln!(page, "<h2>{}</h2>", subtitle);
}

fn push_chart(page: &mut String, canvas_id: &str, label: &str, labels: &[&str], values: &[f64]) {
    let label_list = labels
        .iter()
        .map(|l| format!("'{}'", l))
        .collect::<Vec<_>>()
        .join(", ");
    let value_list = values
        .iter()
        .map(|v| format!("{:.2}", v))
        .collect::<Vec<_>>()
        .join(", ");

    let _ = writeln!(page, "<canvas id='{}'></canvas>", canvas_id);
    let _ = writeln!(
        page,
        "<script>new Chart(document.getElementById('{}').getContext('2d'), \
         {{ type: 'bar', data: {{ labels: [{}], datasets: [{{ label: '{}', data: [{}] }}] }} }});</script>",
        canvas_id, label_list, label, value_list
    );
}
