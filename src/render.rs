//! HTML pages for the upload form, the report and its failure states.

use chrono::{NaiveDateTime, Utc};

use crate::config::ReportConfig;
use crate::loader::REQUIRED_COLUMNS;
use crate::report::{BankrollPoint, Report, TeamSummary};

pub const NOT_APPLICABLE: &str = "N/A";

const CHART_WIDTH: f64 = 960.0;
const CHART_HEIGHT: f64 = 380.0;
const CHART_MARGIN_LEFT: f64 = 96.0;
const CHART_MARGIN_RIGHT: f64 = 24.0;
const CHART_MARGIN_TOP: f64 = 24.0;
const CHART_MARGIN_BOTTOM: f64 = 84.0;
const CHART_Y_TICKS: usize = 5;
const CHART_X_TICKS: usize = 6;

const PAGE_STYLE: &str = "<style>:root{--bg:#f5f1e7;--bg2:#e9f0f2;--card:#ffffff;--ink:#182026;--muted:#5f6a73;--line:#d7dce1;--head:#14343f;--btn:#0c5f78;--btnhover:#094d61;--gain:#17713a;--loss:#a8282b;--warnbg:#fff5b8;--warnink:#6b5200;--errbg:#fde2e1;--errink:#7d1a1c;--okbg:#e1f4e6;--okink:#17532c}*{box-sizing:border-box}body{margin:0;color:var(--ink);font-family:\"Space Grotesk\",\"Avenir Next\",\"Segoe UI\",sans-serif;background:radial-gradient(circle at 10% 5%, #ffe7a3 0%, transparent 30%),radial-gradient(circle at 90% 0%, #b9e5f0 0%, transparent 28%),linear-gradient(160deg,var(--bg),var(--bg2));min-height:100vh}.shell{max-width:1200px;margin:0 auto;padding:24px 18px 28px}.hero{background:linear-gradient(135deg,#102f3a 0%,#24576b 100%);color:#f7fbfc;border-radius:16px;padding:18px 20px;box-shadow:0 10px 30px rgba(16,47,58,.25)}.hero h1{margin:0 0 8px;font-size:1.6rem;letter-spacing:.01em}.hero-meta{display:flex;gap:16px;flex-wrap:wrap;font-size:.92rem;color:#dcebf0}.card{margin-top:16px;background:var(--card);border:1px solid #cbd4db;border-radius:16px;overflow:hidden;box-shadow:0 12px 28px rgba(26,35,42,.12)}.card h2{margin:0;padding:14px 16px;font-size:1.1rem;border-bottom:1px solid var(--line)}.card-body{padding:14px 16px}.banner{margin-top:16px;border-radius:12px;padding:12px 16px;font-weight:600}.banner-ok{background:var(--okbg);color:var(--okink)}.banner-warn{background:var(--warnbg);color:var(--warnink)}.banner-error{background:var(--errbg);color:var(--errink)}.metrics{display:grid;grid-template-columns:repeat(4,minmax(0,1fr));gap:12px;padding:14px 16px}.metric{border:1px solid var(--line);border-radius:12px;padding:12px}.metric-label{font-size:.8rem;color:var(--muted);text-transform:uppercase;letter-spacing:.04em}.metric-value{margin-top:6px;font-size:1.35rem;font-weight:700}.gain{color:var(--gain)}.loss{color:var(--loss)}.split{display:grid;grid-template-columns:1fr 1fr;gap:16px}table{width:100%;border-collapse:collapse}thead th{background:var(--head);color:#f2f7f9;font-size:.8rem;text-transform:uppercase;letter-spacing:.04em;padding:10px 10px;text-align:left}tbody td{font-size:.9rem;padding:9px 10px;border-bottom:1px solid var(--line)}tbody tr:nth-child(even){background:#fafcfd}td.num{text-align:right;font-variant-numeric:tabular-nums}.chart{display:block;width:100%;height:auto}.chart .grid{stroke:#c9d1d8;stroke-dasharray:4 4}.chart .axis{stroke:#5f6a73}.chart .line{fill:none;stroke:#1f77b4;stroke-width:2}.chart .dot{fill:#1f77b4}.chart text{font-size:11px;fill:#5f6a73}.upload-form{display:flex;gap:12px;align-items:center;flex-wrap:wrap}.btn{background:linear-gradient(135deg,var(--btn),#0f7592);color:#fff;border:1px solid rgba(0,0,0,.12);padding:8px 14px;border-radius:9px;font-weight:700;cursor:pointer;text-decoration:none}.btn:hover{background:linear-gradient(135deg,var(--btnhover),#0d5f78)}.notes li{margin:4px 0;color:var(--muted)}code{font-family:\"IBM Plex Mono\",\"SFMono-Regular\",monospace;font-size:.85rem}@media (max-width:760px){.hero h1{font-size:1.28rem}.shell{padding:12px}.metrics{grid-template-columns:1fr 1fr}.split{grid-template-columns:1fr}}</style>\n";

/// `R$ 1,234.56` style amount with thousands separators.
pub fn format_currency(value: f64, prefix: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.chars().all(|c| c == '0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if prefix.is_empty() {
        format!("{sign}{grouped}.{frac_part}")
    } else {
        format!("{prefix} {sign}{grouped}.{frac_part}")
    }
}

pub fn format_optional_currency(value: Option<f64>, prefix: &str) -> String {
    value
        .map(|v| format_currency(v, prefix))
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

pub fn render_upload_page() -> String {
    let mut out = page_open("P/L Report Upload");
    out.push_str(&hero("Sports Trading Performance Report", &[]));
    out.push_str("<section class=\"card\"><h2>Upload your profit/loss report (.csv)</h2><div class=\"card-body\">\n");
    out.push_str("<p>Upload the profit/loss CSV exported from the exchange. It must contain the columns ");
    let columns: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .map(|column| format!("<code>{}</code>", escape_html(column)))
        .collect();
    out.push_str(&columns.join(", "));
    out.push_str(".</p>\n");
    out.push_str("<form id=\"upload-form\" class=\"upload-form\" method=\"post\" action=\"/report\" enctype=\"multipart/form-data\">");
    out.push_str("<input type=\"file\" name=\"file\" accept=\".csv\" required>");
    out.push_str("<button class=\"btn\" type=\"submit\">Analyze</button>");
    out.push_str("</form>\n");
    out.push_str("</div></section>\n");
    out.push_str("<div class=\"banner banner-warn\">Waiting for a CSV upload to start the analysis.</div>\n");
    out.push_str(&page_close());
    out
}

pub fn render_report_page(report: &Report, cfg: &ReportConfig) -> String {
    let prefix = cfg.currency_prefix.as_str();
    let generated = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    let mut out = page_open("P/L Report");
    out.push_str(&hero(
        "Sports Trading Performance Report",
        &[
            format!("Rows read: {}", report.rows_read),
            format!("Rows without settlement date: {}", report.rows_dropped),
            format!("Generated: {generated}"),
        ],
    ));
    out.push_str("<div class=\"banner banner-ok\">File loaded and processed successfully.</div>\n");

    let summary = &report.summary;
    out.push_str("<section class=\"card\" id=\"summary\"><h2>Bankroll Summary</h2><div class=\"metrics\">\n");
    out.push_str(&metric(
        "Current Net Worth",
        Some(summary.net_worth),
        prefix,
    ));
    out.push_str(&metric("Largest Single Gain", summary.largest_gain, prefix));
    out.push_str(&metric("Largest Single Loss", summary.largest_loss, prefix));
    out.push_str(&metric(
        "Average Daily Profit/Loss",
        summary.average_daily_profit_loss,
        prefix,
    ));
    out.push_str("</div></section>\n");

    out.push_str("<section class=\"card\" id=\"bankroll\"><h2>Bankroll Over Time</h2><div class=\"card-body\">\n");
    out.push_str(&render_bankroll_chart(&report.bankroll_series, prefix));
    out.push_str("</div></section>\n");

    out.push_str("<section class=\"card\" id=\"categories\"><h2>Results by Market Type</h2>\n");
    out.push_str("<table id=\"category-table\"><thead><tr><th>Market Type</th><th>Count</th><th>Total Profit/Loss</th></tr></thead><tbody>\n");
    for row in &report.categories {
        out.push_str("<tr><td>");
        out.push_str(&escape_html(row.category.label()));
        out.push_str(&format!("</td><td class=\"num\">{}</td>", row.count));
        out.push_str(&amount_cell(row.total_profit_loss, prefix));
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody></table></section>\n");

    out.push_str("<div class=\"split\">\n");
    out.push_str(&team_table(
        "top-teams",
        "Most Profitable Teams (Top 5)",
        report.top_teams(),
        prefix,
    ));
    out.push_str(&team_table(
        "bottom-teams",
        "Least Profitable Teams (Bottom 5)",
        report.bottom_teams(),
        prefix,
    ));
    out.push_str("</div>\n");

    out.push_str("<section class=\"card\" id=\"notes\"><h2>Notes</h2><div class=\"card-body\"><ul class=\"notes\">");
    out.push_str("<li>ROI cannot be calculated: the export has no stake column.</li>");
    out.push_str("<li>Average odds cannot be calculated: the export has no odds column.</li>");
    out.push_str("</ul><a class=\"btn\" href=\"/\">Upload another file</a></div></section>\n");

    out.push_str(&page_close());
    out
}

pub fn render_empty_page(rows_read: usize, rows_dropped: usize) -> String {
    let mut out = page_open("P/L Report");
    out.push_str(&hero(
        "Sports Trading Performance Report",
        &[
            format!("Rows read: {rows_read}"),
            format!("Rows without settlement date: {rows_dropped}"),
        ],
    ));
    out.push_str("<div class=\"banner banner-warn\" id=\"no-valid-data\">The file was read, but no valid rows remain after parsing settlement dates. Check the file format and the dates.</div>\n");
    out.push_str("<p><a class=\"btn\" href=\"/\">Upload another file</a></p>\n");
    out.push_str(&page_close());
    out
}

pub fn render_error_page(message: &str) -> String {
    let mut out = page_open("P/L Report Error");
    out.push_str(&hero("Sports Trading Performance Report", &[]));
    out.push_str("<div class=\"banner banner-error\" id=\"load-error\">The file could not be processed: ");
    out.push_str(&escape_html(message));
    out.push_str("</div>\n");
    out.push_str("<p><a class=\"btn\" href=\"/\">Upload another file</a></p>\n");
    out.push_str(&page_close());
    out
}

/// Inline SVG line chart of bankroll against settlement date.
pub fn render_bankroll_chart(series: &[BankrollPoint], prefix: &str) -> String {
    if series.is_empty() {
        return String::new();
    }

    let plot_w = CHART_WIDTH - CHART_MARGIN_LEFT - CHART_MARGIN_RIGHT;
    let plot_h = CHART_HEIGHT - CHART_MARGIN_TOP - CHART_MARGIN_BOTTOM;

    let timestamps: Vec<i64> = series
        .iter()
        .map(|p| p.settled_date.and_utc().timestamp())
        .collect();
    let t_min = timestamps.iter().copied().min().unwrap_or_default();
    let t_max = timestamps.iter().copied().max().unwrap_or_default();

    let (mut y_min, mut y_max) = series.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        (lo.min(p.bankroll), hi.max(p.bankroll))
    });
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let x_at = |ts: i64| -> f64 {
        if t_max == t_min {
            CHART_MARGIN_LEFT + plot_w / 2.0
        } else {
            CHART_MARGIN_LEFT + (ts - t_min) as f64 / (t_max - t_min) as f64 * plot_w
        }
    };
    let y_at = |v: f64| -> f64 { CHART_MARGIN_TOP + (y_max - v) / (y_max - y_min) * plot_h };

    let mut out = String::new();
    out.push_str(&format!(
        "<svg id=\"bankroll-chart\" class=\"chart\" viewBox=\"0 0 {CHART_WIDTH} {CHART_HEIGHT}\" role=\"img\" aria-label=\"Bankroll over time\">\n"
    ));

    for tick in 0..CHART_Y_TICKS {
        let value = y_min + (y_max - y_min) * tick as f64 / (CHART_Y_TICKS - 1) as f64;
        let y = y_at(value);
        out.push_str(&format!(
            "<line class=\"grid\" x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\"/>",
            CHART_MARGIN_LEFT,
            CHART_MARGIN_LEFT + plot_w
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>\n",
            CHART_MARGIN_LEFT - 8.0,
            y + 4.0,
            escape_html(&format_currency(value, prefix))
        ));
    }

    let axis_y = CHART_MARGIN_TOP + plot_h;
    out.push_str(&format!(
        "<line class=\"axis\" x1=\"{CHART_MARGIN_LEFT:.1}\" y1=\"{axis_y:.1}\" x2=\"{:.1}\" y2=\"{axis_y:.1}\"/>\n",
        CHART_MARGIN_LEFT + plot_w
    ));

    for idx in x_tick_indices(series.len()) {
        let x = x_at(timestamps[idx]);
        out.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"end\" transform=\"rotate(-45 {x:.1} {:.1})\">{}</text>\n",
            axis_y + 16.0,
            axis_y + 16.0,
            escape_html(&chart_date(series[idx].settled_date))
        ));
    }

    let points: Vec<String> = series
        .iter()
        .zip(&timestamps)
        .map(|(p, ts)| format!("{:.1},{:.1}", x_at(*ts), y_at(p.bankroll)))
        .collect();
    out.push_str(&format!(
        "<polyline class=\"line\" points=\"{}\"/>\n",
        points.join(" ")
    ));

    for (p, ts) in series.iter().zip(&timestamps) {
        out.push_str(&format!(
            "<circle class=\"dot\" cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\"><title>{} · {}</title></circle>\n",
            x_at(*ts),
            y_at(p.bankroll),
            escape_html(&chart_date(p.settled_date)),
            escape_html(&format_currency(p.bankroll, prefix))
        ));
    }

    out.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">Settlement date</text>\n",
        CHART_MARGIN_LEFT + plot_w / 2.0,
        CHART_HEIGHT - 6.0
    ));
    out.push_str("</svg>\n");
    out
}

fn x_tick_indices(len: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let ticks = CHART_X_TICKS.min(len);
    if ticks == 1 {
        return vec![0];
    }
    let mut out: Vec<usize> = (0..ticks)
        .map(|i| i * (len - 1) / (ticks - 1))
        .collect();
    out.dedup();
    out
}

fn chart_date(ts: NaiveDateTime) -> String {
    ts.format("%d/%m/%y %H:%M").to_string()
}

fn page_open(title: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    out.push_str(PAGE_STYLE);
    out.push_str("</head><body><main class=\"shell\">\n");
    out
}

fn page_close() -> String {
    "</main></body></html>\n".to_string()
}

fn hero(title: &str, meta: &[String]) -> String {
    let mut out = String::new();
    out.push_str("<section class=\"hero\"><h1>");
    out.push_str(&escape_html(title));
    out.push_str("</h1><div class=\"hero-meta\">");
    for entry in meta {
        out.push_str("<span>");
        out.push_str(&escape_html(entry));
        out.push_str("</span>");
    }
    out.push_str("</div></section>\n");
    out
}

fn metric(label: &str, value: Option<f64>, prefix: &str) -> String {
    format!(
        "<div class=\"metric\"><div class=\"metric-label\">{}</div><div class=\"metric-value {}\">{}</div></div>\n",
        escape_html(label),
        sign_class(value),
        escape_html(&format_optional_currency(value, prefix))
    )
}

fn amount_cell(value: f64, prefix: &str) -> String {
    format!(
        "<td class=\"num {}\">{}</td>",
        sign_class(Some(value)),
        escape_html(&format_currency(value, prefix))
    )
}

fn team_table(id: &str, title: &str, rows: &[TeamSummary], prefix: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<section class=\"card\" id=\"{}\"><h2>{}</h2>",
        escape_html(id),
        escape_html(title)
    ));
    out.push_str("<table><thead><tr><th>Team</th><th>Profit/Loss</th></tr></thead><tbody>\n");
    for row in rows {
        out.push_str("<tr><td>");
        out.push_str(&escape_html(&row.team));
        out.push_str("</td>");
        out.push_str(&amount_cell(row.total_profit_loss, prefix));
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody></table></section>\n");
    out
}

fn sign_class(value: Option<f64>) -> &'static str {
    match value {
        Some(v) if v > 0.0 => "gain",
        Some(v) if v < 0.0 => "loss",
        _ => "",
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
