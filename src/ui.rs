use crate::chart::{ChartSpec, render_svg};
use crate::filter::DateBounds;
use crate::models::{DATE_COLUMN, Dataset};
use chrono::NaiveDate;

pub const PAGE_TITLE: &str = "📊 退货运营可视化面板";
pub const RANGE_LABEL: &str = "选择可视化时间范围";
pub const EMPTY_WARNING: &str = "所选日期范围内无数据，请调整筛选条件。";
pub const RAW_DATA_LABEL: &str = "查看原始数据";

pub struct Page<'a> {
    pub dataset: &'a Dataset,
    pub bounds: Option<DateBounds>,
    pub range: Option<(NaiveDate, NaiveDate)>,
    /// `None` when the selected window holds no rows.
    pub chart: Option<&'a ChartSpec>,
}

pub fn render_page(page: &Page<'_>) -> String {
    let content = match page.chart {
        Some(spec) => format!(r#"<div class="chart-card">{}</div>"#, render_svg(spec)),
        None => format!(r#"<div class="warning" role="alert">{EMPTY_WARNING}</div>"#),
    };

    let min = page.bounds.map(|bounds| bounds.min.to_string()).unwrap_or_default();
    let max = page.bounds.map(|bounds| bounds.max.to_string()).unwrap_or_default();
    let start = page.range.map(|(start, _)| start.to_string()).unwrap_or_default();
    let end = page.range.map(|(_, end)| end.to_string()).unwrap_or_default();

    let raw_table = render_table(page.dataset);
    fill_template(INDEX_HTML, |key| match key {
        "TITLE" => Some(PAGE_TITLE),
        "RANGE_LABEL" => Some(RANGE_LABEL),
        "RAW_DATA_LABEL" => Some(RAW_DATA_LABEL),
        "MIN" => Some(min.as_str()),
        "MAX" => Some(max.as_str()),
        "START" => Some(start.as_str()),
        "END" => Some(end.as_str()),
        "CONTENT" => Some(content.as_str()),
        "RAW_TABLE" => Some(raw_table.as_str()),
        _ => None,
    })
}

/// Substitutes `{{KEY}}` placeholders in one pass over `template`. Inserted
/// values are never scanned again; unknown keys are left as they are.
fn fill_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}").and_then(|close| Some((close, lookup(&after[..close])?))) {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The full cleaned dataset, file columns included as loaded.
pub fn render_table(dataset: &Dataset) -> String {
    let mut html = String::from(r#"<table class="raw"><thead><tr>"#);
    html.push_str(&format!("<th>{DATE_COLUMN}</th>"));
    for column in &dataset.columns {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr></thead><tbody>");
    for record in &dataset.records {
        html.push_str(&format!("<tr><td>{}</td>", record.date));
        for value in &record.values {
            match value {
                Some(value) => html.push_str(&format!("<td>{value}</td>")),
                None => html.push_str("<td></td>"),
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f6f7fb;
      --ink: #262730;
      --muted: #6b6f80;
      --card: #ffffff;
      --sidebar: #eef0f6;
      --accent: #ff4b4b;
      --warn-bg: #fffbe6;
      --warn-ink: #8a6d00;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Source Sans Pro", "PingFang SC", "Microsoft YaHei", sans-serif;
      display: grid;
      grid-template-columns: 280px 1fr;
    }

    aside {
      background: var(--sidebar);
      padding: 32px 20px;
      display: grid;
      align-content: start;
      gap: 14px;
    }

    aside label {
      font-size: 0.9rem;
      color: var(--muted);
    }

    aside input[type="date"] {
      width: 100%;
      padding: 8px 10px;
      border: 1px solid rgba(38, 39, 48, 0.2);
      border-radius: 8px;
      font: inherit;
    }

    aside button,
    aside a {
      appearance: none;
      border: none;
      border-radius: 8px;
      padding: 10px 14px;
      font: inherit;
      font-weight: 600;
      text-align: center;
      text-decoration: none;
      cursor: pointer;
    }

    aside button {
      background: var(--accent);
      color: white;
    }

    aside a {
      background: white;
      color: var(--ink);
    }

    main {
      padding: 32px 40px 48px;
      display: grid;
      align-content: start;
      gap: 24px;
      min-width: 0;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 3vw, 2.6rem);
    }

    .chart-card {
      background: var(--card);
      border-radius: 12px;
      padding: 12px;
      box-shadow: 0 8px 24px rgba(38, 39, 48, 0.08);
    }

    .chart {
      display: block;
      width: 100%;
      height: auto;
    }

    .chart text {
      font-family: inherit;
    }

    .chart-title {
      font-size: 18px;
      font-weight: 600;
      fill: var(--ink);
    }

    .chart-grid {
      stroke: rgba(38, 39, 48, 0.08);
    }

    .chart-axis {
      stroke: rgba(38, 39, 48, 0.4);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 12px;
    }

    .chart-axis-title,
    .chart-legend-title {
      fill: var(--ink);
      font-size: 14px;
    }

    .chart-bar:hover {
      opacity: 0.8;
    }

    .chart-segment-label {
      fill: white;
      pointer-events: none;
    }

    .warning {
      background: var(--warn-bg);
      color: var(--warn-ink);
      border-radius: 8px;
      padding: 16px 18px;
    }

    details {
      background: var(--card);
      border-radius: 12px;
      padding: 12px 16px;
      overflow-x: auto;
    }

    summary {
      cursor: pointer;
      font-weight: 600;
    }

    table.raw {
      border-collapse: collapse;
      margin-top: 12px;
      font-size: 0.9rem;
    }

    table.raw th,
    table.raw td {
      border: 1px solid rgba(38, 39, 48, 0.1);
      padding: 6px 10px;
      text-align: right;
      white-space: nowrap;
    }

    table.raw th {
      background: var(--sidebar);
    }

    @media (max-width: 800px) {
      body {
        grid-template-columns: 1fr;
      }
      main {
        padding: 24px 16px;
      }
    }
  </style>
</head>
<body>
  <aside>
    <form method="get" action="/">
      <label for="start">{{RANGE_LABEL}}</label>
      <input id="start" name="start" type="date" value="{{START}}" min="{{MIN}}" max="{{MAX}}" />
      <input id="end" name="end" type="date" value="{{END}}" min="{{MIN}}" max="{{MAX}}" />
      <button type="submit">应用</button>
    </form>
    <a href="/">重置</a>
  </aside>

  <main>
    <h1>{{TITLE}}</h1>
    {{CONTENT}}
    <details>
      <summary>{{RAW_DATA_LABEL}}</summary>
      {{RAW_TABLE}}
    </details>
  </main>
</body>
</html>
"#;
