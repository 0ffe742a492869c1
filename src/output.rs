//! HTML page assembly.
//!
//! One self-contained page: a date filter form, the data-freshness line,
//! and per-route chart fragments (or inline notices where a route has
//! nothing to show). Errors render into the same page; status codes never
//! carry them.

use crate::charts::{figure_fragment, travel_time_figure, volume_figure};
use crate::report::{Body, Dashboard, RouteSection};

/// Escapes text interpolated into HTML. File names, column lists, and the
/// date parameter all originate outside this process.
fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn last_updated_label(dashboard: &Dashboard) -> String {
    match dashboard.last_updated {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "Not available".to_string(),
    }
}

fn route_fragment(index: usize, section: &RouteSection) -> String {
    let route = &section.route;
    let mut html = String::new();

    match &section.travel {
        Some(travel) => {
            let figure = travel_time_figure(route, travel);
            html.push_str(&figure_fragment(&format!("travel-{index}"), &figure));
        }
        None => {
            html.push_str(&format!(
                "<h3>Avg travel time: {} → {}</h3><p>No completed journeys found for this route in the selected period.</p>",
                escape(&route.start_checkpoint),
                escape(&route.end_checkpoint)
            ));
        }
    }

    if section.volume.is_empty() {
        html.push_str(&format!(
            "<h3>Vehicle volume at start point: {}</h3><p>No vehicles detected at this start point in the selected period.</p>",
            escape(&route.start_checkpoint)
        ));
    } else {
        let figure = volume_figure(route, &section.volume);
        html.push_str(&figure_fragment(&format!("volume-{index}"), &figure));
    }

    html.push_str("<hr>");
    html
}

fn body_fragment(dashboard: &Dashboard) -> String {
    match &dashboard.body {
        Body::Error(message) => {
            format!("<p class=\"error\">{}</p>", escape(message))
        }
        Body::Notice(message) => format!("<p>{}</p>", escape(message)),
        Body::Routes(sections) => sections
            .iter()
            .enumerate()
            .map(|(index, section)| route_fragment(index, section))
            .collect(),
    }
}

/// Renders the complete dashboard page.
pub fn render_page(dashboard: &Dashboard, selected_date: Option<&str>) -> String {
    let date_value = escape(selected_date.unwrap_or(""));
    let last_updated = last_updated_label(dashboard);
    let body = body_fragment(dashboard);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Checkpoint Traffic Dashboard</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
body {{ font-family: sans-serif; margin: 1.5em; }}
.error {{ color: red; }}
.updated {{ color: #555; }}
.chart {{ margin-bottom: 1em; }}
</style>
</head>
<body>
<h1>Checkpoint Traffic Dashboard</h1>
<form method="get" action="/">
<label for="date">Date:</label>
<input type="date" id="date" name="date" value="{date_value}">
<button type="submit">Apply</button>
<a href="/">Full history</a>
</form>
<p class="updated">Data last updated: {last_updated}</p>
{body}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_error_page_has_message_and_no_charts() {
        let dash = Dashboard::error("File error in 'x.xlsx': missing columns: License Plate. Found: Device Name".to_string());
        let page = render_page(&dash, None);

        assert!(page.contains("class=\"error\""));
        assert!(page.contains("missing columns: License Plate"));
        assert!(!page.contains("Plotly.newPlot"));
        assert!(page.contains("Not available"));
    }

    #[test]
    fn test_notice_page_is_plain() {
        let dash = Dashboard::notice("No data files found for 2026-08-01.".to_string());
        let page = render_page(&dash, Some("2026-08-01"));

        assert!(page.contains("<p>No data files found for 2026-08-01.</p>"));
        assert!(page.contains("value=\"2026-08-01\""));
    }

    #[test]
    fn test_last_updated_formatting() {
        let dash = Dashboard {
            last_updated: Some(Utc.with_ymd_and_hms(2026, 8, 1, 6, 45, 12).unwrap()),
            body: Body::Notice("No valid data found on 2026-08-01.".to_string()),
        };
        let page = render_page(&dash, None);
        assert!(page.contains("2026-08-01 06:45:12 UTC"));
    }

    #[test]
    fn test_reflected_date_is_escaped() {
        let dash = Dashboard::error("Invalid date format: '<script>'. Please use YYYY-MM-DD.".to_string());
        let page = render_page(&dash, Some("<script>"));

        assert!(!page.contains("value=\"<script>\""));
        assert!(page.contains("&lt;script&gt;"));
    }
}
