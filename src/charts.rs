//! Plotly figure construction.
//!
//! Figures are built as plain JSON documents and handed to the plotly.js
//! runtime in the page; nothing here draws pixels. The figure structure
//! mirrors what the dashboard has always shown: a travel-time line with
//! congestion bands per route, and a departure-volume bar chart.

use serde_json::{Value, json};

use crate::config::Route;
use crate::pipeline::types::VolumeBucket;
use crate::report::TravelReport;

fn interval_label(t: chrono::DateTime<chrono::Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Travel-time figure: per-bucket averages with journey counts in the
/// hover, dashed reference/threshold lines, and yellow/red band shapes.
/// The y-axis is pinned to `[0, graph_top]` so the bands stay visible.
pub fn travel_time_figure(route: &Route, report: &TravelReport) -> Value {
    let x: Vec<String> = report.series.iter().map(|b| interval_label(b.interval)).collect();
    let y: Vec<f64> = report.series.iter().map(|b| b.avg_travel_minutes).collect();
    let counts: Vec<usize> = report.series.iter().map(|b| b.journey_count).collect();

    let th = &report.thresholds;
    let moderate_offset = (th.moderate - th.reference) as i64;
    let heavy_offset = (th.heavy - th.reference) as i64;

    let reference_line = constant_line(
        &x,
        th.reference,
        &format!("Reference avg: {} mins", th.reference as i64),
        "green",
    );
    let moderate_line = constant_line(
        &x,
        th.moderate,
        &format!("Moderate threshold (+{moderate_offset} mins)"),
        "orange",
    );
    let heavy_line = constant_line(
        &x,
        th.heavy,
        &format!("Heavy threshold (+{heavy_offset} mins)"),
        "red",
    );

    json!({
        "data": [
            {
                "type": "scatter",
                "mode": "lines+markers",
                "name": "Actual avg travel time",
                "x": x,
                "y": y,
                "customdata": counts,
                "hovertemplate": "<b>Time</b>: %{x}<br><b>Avg travel time</b>: %{y:.1f} mins<br><b>Vehicles reached</b>: %{customdata}<extra></extra>",
            },
            reference_line,
            moderate_line,
            heavy_line,
        ],
        "layout": {
            "title": format!("Avg travel time: {} → {}", route.start_checkpoint, route.end_checkpoint),
            "xaxis": { "title": "Time (trip start)" },
            "yaxis": { "title": "Travel time (mins)", "range": [0.0, th.graph_top] },
            "height": 450,
            "shapes": [
                band(th.moderate, th.heavy, "yellow"),
                band(th.heavy, th.graph_top, "red"),
            ],
        },
    })
}

/// Departure-volume figure: distinct plates per 15-minute interval.
pub fn volume_figure(route: &Route, volume: &[VolumeBucket]) -> Value {
    let x: Vec<String> = volume.iter().map(|b| interval_label(b.interval)).collect();
    let y: Vec<usize> = volume.iter().map(|b| b.vehicle_count).collect();

    json!({
        "data": [
            {
                "type": "bar",
                "name": "Vehicle count",
                "x": x,
                "y": y,
                "hovertemplate": "<b>Time</b>: %{x}<br><b>Vehicles started</b>: %{y}<extra></extra>",
            },
        ],
        "layout": {
            "title": format!("Vehicle volume at start point: {}", route.start_checkpoint),
            "xaxis": { "title": "Time (15 min intervals)" },
            "yaxis": { "title": "Number of vehicles" },
            "height": 400,
            "bargap": 0.2,
        },
    })
}

fn constant_line(x: &[String], level: f64, name: &str, color: &str) -> Value {
    json!({
        "type": "scatter",
        "mode": "lines",
        "name": name,
        "x": x,
        "y": vec![level; x.len()],
        "line": { "color": color, "dash": "dash" },
    })
}

/// Full-width horizontal band between two travel-time levels.
fn band(y0: f64, y1: f64, color: &str) -> Value {
    json!({
        "type": "rect",
        "xref": "paper",
        "x0": 0,
        "x1": 1,
        "y0": y0,
        "y1": y1,
        "fillcolor": color,
        "opacity": 0.2,
        "layer": "below",
        "line": { "width": 0 },
    })
}

/// Embeds a figure into an HTML fragment rendered by plotly.js.
pub fn figure_fragment(div_id: &str, figure: &Value) -> String {
    format!(
        "<div id=\"{div_id}\" class=\"chart\"></div>\n<script>(function() {{ var fig = {figure}; Plotly.newPlot(\"{div_id}\", fig.data, fig.layout); }})();</script>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{Thresholds, TravelBucket};
    use chrono::{TimeZone, Utc};

    fn report() -> TravelReport {
        TravelReport {
            series: vec![TravelBucket {
                interval: Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap(),
                avg_travel_minutes: 40.0,
                journey_count: 1,
            }],
            thresholds: Thresholds {
                reference: 50.0,
                moderate: 80.0,
                heavy: 110.0,
                graph_top: 130.0,
            },
        }
    }

    fn route() -> Route {
        Route::new("SEITHUNGANALLUR", "ARUMUGANERI", 50)
    }

    #[test]
    fn test_travel_figure_traces_and_axis() {
        let fig = travel_time_figure(&route(), &report());

        assert_eq!(fig["data"].as_array().unwrap().len(), 4);
        assert_eq!(fig["data"][0]["x"][0], "2026-08-01 10:00:00");
        assert_eq!(fig["data"][0]["y"][0], 40.0);
        assert_eq!(fig["layout"]["yaxis"]["range"][1], 130.0);
        assert_eq!(fig["layout"]["shapes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_band_placement() {
        let fig = travel_time_figure(&route(), &report());
        let shapes = fig["layout"]["shapes"].as_array().unwrap();

        assert_eq!(shapes[0]["y0"], 80.0);
        assert_eq!(shapes[0]["y1"], 110.0);
        assert_eq!(shapes[1]["y0"], 110.0);
        assert_eq!(shapes[1]["y1"], 130.0);
    }

    #[test]
    fn test_volume_figure() {
        let volume = vec![VolumeBucket {
            interval: Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap(),
            vehicle_count: 3,
        }];
        let fig = volume_figure(&route(), &volume);

        assert_eq!(fig["data"][0]["type"], "bar");
        assert_eq!(fig["data"][0]["y"][0], 3);
        assert_eq!(fig["layout"]["bargap"], 0.2);
    }

    #[test]
    fn test_fragment_wires_up_the_div() {
        let fragment = figure_fragment("travel-0", &volume_figure(&route(), &[]));
        assert!(fragment.contains("id=\"travel-0\""));
        assert!(fragment.contains("Plotly.newPlot(\"travel-0\""));
    }
}
