/// Visualization module: printable dashboard report.
///
/// Produces a self-contained HTML document where each section sits on its
/// own printed page:
/// - Summary cards (distinct counts and status totals)
/// - Shipped vs received bar chart
/// - Vendor order/available grouped bar chart
/// - Metrics for one category
/// - Aging buckets for one category or product
/// - Backorder breakdown for one category
///
/// Charts are inline SVG built here; the document has no scripts and no
/// external assets, so it prints the same everywhere.
use chrono::{DateTime, Utc};

use crate::aggregation::{
    AgeBucketReport, BackorderReport, CategoryMetrics, InventorySummary, RollupEntry, StatusCount,
};

// ── Config ──────────────────────────────────────────────────────────────────

/// Configuration for the report document.
pub struct ReportConfig {
    /// Document heading and `<title>`
    pub title: String,
    /// Pixel width of every chart
    pub chart_width_px: u32,
    /// Pixel height of a single bar
    pub bar_height_px: u32,
    /// Timestamp printed under the heading
    pub generated_at: DateTime<Utc>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Inventory Summary".to_string(),
            chart_width_px: 640,
            bar_height_px: 22,
            generated_at: Utc::now(),
        }
    }
}

/// One printed page of the report.
#[derive(Debug, Clone)]
pub enum ReportSection {
    Summary(InventorySummary),
    StatusChart(StatusCount),
    VendorChart(Vec<RollupEntry>),
    CategoryMetrics(CategoryMetrics),
    Aging {
        subject: String,
        report: AgeBucketReport,
    },
    Backorders(BackorderReport),
}

// ── Intermediate chart data ─────────────────────────────────────────────────

struct ChartSeries {
    name: &'static str,
    color: &'static str,
}

struct ChartRow {
    label: String,
    values: Vec<u64>,
}

const BLUE: &str = "#3498db";
const GREEN: &str = "#2ecc71";
const ORANGE: &str = "#f39c12";
const RED: &str = "#e74c3c";

const LABEL_WIDTH_PX: u32 = 160;
const VALUE_WIDTH_PX: u32 = 60;

// ── Section rendering ───────────────────────────────────────────────────────

fn render_summary(summary: &InventorySummary) -> String {
    let cards = [
        ("Total Categories", summary.categories as u64, "#3b82f6"),
        ("Total Warehouses", summary.warehouses as u64, "#22c55e"),
        ("Total Products", summary.products as u64, "#eab308"),
        ("Total Vendors", summary.vendors as u64, "#ef4444"),
        ("Total Orders Shipped", summary.shipped, "#a855f7"),
        ("Total Orders Received", summary.received, "#6366f1"),
    ];

    let mut html = String::from(r#"<h2>Summary</h2><div class="cards">"#);
    for (title, value, color) in cards {
        html.push_str(&format!(
            r#"<div class="card" style="background:{color};"><h3>{title}</h3><p>{value}</p></div>"#
        ));
    }
    html.push_str("</div>");
    html
}

fn render_status(status: &StatusCount, config: &ReportConfig) -> String {
    let series = [ChartSeries {
        name: "Order Status",
        color: BLUE,
    }];
    let rows = vec![
        ChartRow {
            label: "Shipped".to_string(),
            values: vec![status.shipped],
        },
        ChartRow {
            label: "Received".to_string(),
            values: vec![status.received],
        },
    ];
    format!(
        "<h2>Shipped vs Received</h2>{}",
        bar_chart_svg(&series, &rows, config.chart_width_px, config.bar_height_px)
    )
}

fn render_vendors(entries: &[RollupEntry], config: &ReportConfig) -> String {
    let series = [
        ChartSeries {
            name: "Total Order Quantity",
            color: BLUE,
        },
        ChartSeries {
            name: "Total Available Quantity",
            color: GREEN,
        },
    ];
    let rows: Vec<ChartRow> = entries
        .iter()
        .map(|e| ChartRow {
            label: e.key.clone(),
            values: vec![e.total_order_qty, e.total_available_qty],
        })
        .collect();
    format!(
        "<h2>Vendor Wise: Total Order Quantity and Total Available Quantity</h2>{}",
        bar_chart_svg(&series, &rows, config.chart_width_px, config.bar_height_px)
    )
}

fn render_category_metrics(metrics: &CategoryMetrics, config: &ReportConfig) -> String {
    let quantities = [
        ChartSeries {
            name: "Total Order Qty",
            color: BLUE,
        },
        ChartSeries {
            name: "Total Available Qty",
            color: GREEN,
        },
    ];
    let counts = [
        ChartSeries {
            name: "Shipped",
            color: ORANGE,
        },
        ChartSeries {
            name: "Received",
            color: RED,
        },
    ];
    let label = escape_html(&metrics.category);
    // Quantities and record counts live on different scales, so two charts.
    format!(
        "<h2>Category Metrics for {label}</h2><h3>Total Quantities</h3>{}<h3>Shipped/Received Count</h3>{}",
        bar_chart_svg(
            &quantities,
            &[ChartRow {
                label: metrics.category.clone(),
                values: vec![metrics.total_order_qty, metrics.total_available_qty],
            }],
            config.chart_width_px,
            config.bar_height_px,
        ),
        bar_chart_svg(
            &counts,
            &[ChartRow {
                label: metrics.category.clone(),
                values: vec![metrics.shipped, metrics.received],
            }],
            config.chart_width_px,
            config.bar_height_px,
        ),
    )
}

fn render_aging(subject: &str, report: &AgeBucketReport, config: &ReportConfig) -> String {
    let series = [ChartSeries {
        name: "Available Quantity",
        color: "#4caf50",
    }];
    let rows: Vec<ChartRow> = report
        .iter()
        .map(|(label, qty)| ChartRow {
            label: label.to_string(),
            values: vec![qty],
        })
        .collect();
    format!(
        "<h2>Inventory Aging Report for {}</h2>{}",
        escape_html(subject),
        bar_chart_svg(&series, &rows, config.chart_width_px, config.bar_height_px)
    )
}

fn render_backorders(report: &BackorderReport, config: &ReportConfig) -> String {
    let Some(category) = &report.category else {
        return "<h2>Backorder Analysis</h2><p class=\"muted\">No category selected.</p>"
            .to_string();
    };
    let heading = format!("<h2>Backorders for {}</h2>", escape_html(category));
    if report.is_empty() {
        return format!(
            "{heading}<p class=\"muted\">No backorders found for the selected category.</p>"
        );
    }

    let series = [ChartSeries {
        name: "Backorder Quantity",
        color: "#ff6384",
    }];
    let rows: Vec<ChartRow> = report
        .products
        .iter()
        .map(|e| ChartRow {
            label: e.product.clone(),
            values: vec![e.quantity],
        })
        .collect();
    format!(
        "{heading}{}",
        bar_chart_svg(&series, &rows, config.chart_width_px, config.bar_height_px)
    )
}

// ── SVG ─────────────────────────────────────────────────────────────────────

/// Horizontal grouped bar chart. One group per row, one bar per series,
/// all bars scaled against the largest value in the chart.
fn bar_chart_svg(
    series: &[ChartSeries],
    rows: &[ChartRow],
    width_px: u32,
    bar_px: u32,
) -> String {
    let legend_px = 24;
    let group_px = bar_px * series.len().max(1) as u32 + 8;
    let height_px = legend_px + group_px * rows.len().max(1) as u32;
    let plot_px = width_px.saturating_sub(LABEL_WIDTH_PX + VALUE_WIDTH_PX).max(1);
    let max_value = rows
        .iter()
        .flat_map(|r| r.values.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width_px}" height="{height_px}" class="chart">"#
    );

    let mut legend_x = LABEL_WIDTH_PX;
    for s in series {
        svg.push_str(&format!(
            r#"<rect x="{legend_x}" y="4" width="12" height="12" fill="{}"/><text x="{}" y="14" class="legend">{}</text>"#,
            s.color,
            legend_x + 16,
            escape_html(s.name)
        ));
        legend_x += 16 + 8 * s.name.len() as u32;
    }

    for (i, row) in rows.iter().enumerate() {
        let group_y = legend_px + group_px * i as u32;
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" class="axis-label">{}</text>"#,
            LABEL_WIDTH_PX - 8,
            group_y + group_px / 2,
            escape_html(&row.label)
        ));
        for (j, (value, s)) in row.values.iter().zip(series).enumerate() {
            let bar_y = group_y + bar_px * j as u32;
            let bar_w = (*value as f64 / max_value as f64 * plot_px as f64).round() as u32;
            svg.push_str(&format!(
                r#"<rect x="{LABEL_WIDTH_PX}" y="{bar_y}" width="{bar_w}" height="{}" fill="{}"><title>{}: {value}</title></rect><text x="{}" y="{}" class="value">{value}</text>"#,
                bar_px.saturating_sub(2),
                s.color,
                escape_html(s.name),
                LABEL_WIDTH_PX + bar_w + 4,
                bar_y + bar_px * 3 / 4,
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

// ── HTML generation ─────────────────────────────────────────────────────────

/// Main entry point: a complete HTML document, one section per printed page.
pub fn generate_report_html(sections: &[ReportSection], config: &ReportConfig) -> String {
    if sections.is_empty() {
        return "<div>No sections to render.</div>".to_string();
    }

    let pages: String = sections
        .iter()
        .map(|section| {
            let body = match section {
                ReportSection::Summary(summary) => render_summary(summary),
                ReportSection::StatusChart(status) => render_status(status, config),
                ReportSection::VendorChart(entries) => render_vendors(entries, config),
                ReportSection::CategoryMetrics(metrics) => {
                    render_category_metrics(metrics, config)
                }
                ReportSection::Aging { subject, report } => render_aging(subject, report, config),
                ReportSection::Backorders(report) => render_backorders(report, config),
            };
            format!(r#"<section class="page">{body}</section>"#)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ font-family: sans-serif; color: #212529; margin: 10mm; }}
  h1 {{ text-align: center; }}
  .generated {{ text-align: center; color: #868e96; font-size: 12px; }}
  .page {{ page-break-after: always; break-after: page; }}
  .page:last-child {{ page-break-after: auto; break-after: auto; }}
  .cards {{ display: grid; grid-template-columns: repeat(3, 1fr); gap: 12px; }}
  .card {{ color: #fff; border-radius: 8px; padding: 12px; }}
  .card p {{ font-size: 24px; font-weight: bold; margin: 0; }}
  .chart .legend {{ font-size: 11px; fill: #495057; }}
  .chart .axis-label {{ font-size: 12px; fill: #495057; text-anchor: end; }}
  .chart .value {{ font-size: 10px; fill: #495057; }}
  .muted {{ color: #6c757d; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p class="generated">Generated {generated}</p>
{pages}
</body>
</html>
"##,
        title = escape_html(&config.title),
        generated = config.generated_at.format("%Y-%m-%d %H:%M UTC"),
        pages = pages,
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
