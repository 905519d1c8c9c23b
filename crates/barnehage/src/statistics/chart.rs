use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Value};

use super::aggregate::{RankedAverage, StatsError};
use super::table::{CoverageTable, Year};

/// One melted observation: a four-digit year label and its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub municipality: String,
    pub year: String,
    pub value: Option<f64>,
}

/// Reshape the nine year columns of one municipality into ordered
/// (year, value) pairs.
pub fn municipality_series(
    table: &CoverageTable,
    municipality: &str,
) -> Result<Vec<SeriesPoint>, StatsError> {
    let row = table
        .find(municipality)
        .ok_or_else(|| StatsError::UnknownMunicipality {
            name: municipality.to_string(),
        })?;

    Ok(Year::all()
        .map(|year| SeriesPoint {
            municipality: row.municipality.clone(),
            year: year.label(),
            value: row.value(year),
        })
        .collect())
}

/// Vega-Lite line chart over one municipality's series.
pub fn line_chart_spec(municipality: &str, points: &[SeriesPoint]) -> Value {
    json!({
        "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
        "title": format!(
            "Share of one- and two-year-olds in kindergarten (2015-2023) for {municipality}"
        ),
        "width": 800,
        "height": 400,
        "data": { "values": points },
        "mark": { "type": "line", "point": true },
        "encoding": {
            "x": { "field": "year", "type": "nominal", "title": "Year" },
            "y": { "field": "value", "type": "quantitative", "title": "Coverage (%)" },
            "tooltip": [
                { "field": "year", "type": "nominal" },
                { "field": "value", "type": "quantitative" }
            ]
        }
    })
}

/// Vega-Lite bar chart over a ranked top-N cross-section.
pub fn bar_chart_spec(ranked: &[RankedAverage]) -> Value {
    json!({
        "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
        "title": format!(
            "The {} municipalities with the highest average coverage (2015-2023)",
            ranked.len()
        ),
        "width": 800,
        "height": 400,
        "data": { "values": ranked },
        "mark": "bar",
        "encoding": {
            "x": { "field": "municipality", "type": "nominal", "title": "Municipality", "sort": "-y" },
            "y": { "field": "average", "type": "quantitative", "title": "Average coverage (%)" },
            "tooltip": [
                { "field": "municipality", "type": "nominal" },
                { "field": "average", "type": "quantitative" }
            ]
        }
    })
}

/// A standalone, browser-viewable chart document.
///
/// Rendering is delegated to Vega-Lite loaded from a CDN; the document
/// itself only carries the spec.
#[derive(Debug, Clone)]
pub struct ChartDocument {
    file_stem: String,
    spec: Value,
}

impl ChartDocument {
    /// Line chart for one municipality.
    pub fn municipality_line(
        table: &CoverageTable,
        municipality: &str,
    ) -> Result<Self, StatsError> {
        let points = municipality_series(table, municipality)?;
        Ok(Self {
            file_stem: format!("coverage_{}_2015_2023", file_safe(municipality)),
            spec: line_chart_spec(municipality, &points),
        })
    }

    /// Bar chart for a ranked cross-section.
    pub fn top_averages_bar(ranked: &[RankedAverage]) -> Self {
        Self {
            file_stem: format!("top_{}_municipalities_2015_2023", ranked.len()),
            spec: bar_chart_spec(ranked),
        }
    }

    pub fn spec(&self) -> &Value {
        &self.spec
    }

    pub fn file_name(&self) -> String {
        format!("{}.html", self.file_stem)
    }

    pub fn to_html(&self) -> String {
        format!(
            concat!(
                "<!DOCTYPE html>\n",
                "<html>\n<head>\n<meta charset=\"utf-8\"/>\n",
                "<script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>\n",
                "<script src=\"https://cdn.jsdelivr.net/npm/vega-lite@5\"></script>\n",
                "<script src=\"https://cdn.jsdelivr.net/npm/vega-embed@6\"></script>\n",
                "</head>\n<body>\n<div id=\"vis\"></div>\n",
                "<script>\n  vegaEmbed(\"#vis\", {spec});\n</script>\n",
                "</body>\n</html>\n"
            ),
            spec = self.spec
        )
    }

    /// Write the document into `dir`, creating the directory if needed.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        fs::write(&path, self.to_html())?;
        Ok(path)
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::table::{CoverageRow, YEAR_COUNT};

    fn sample_table() -> CoverageTable {
        let mut values = [Some(70.0); YEAR_COUNT];
        values[2] = Some(72.5);
        values[7] = None;
        CoverageTable::new(vec![CoverageRow {
            municipality: "Oslo".to_string(),
            values,
        }])
    }

    #[test]
    fn series_maps_codes_to_four_digit_years() {
        let points = municipality_series(&sample_table(), "Oslo").expect("oslo exists");
        assert_eq!(points.len(), YEAR_COUNT);
        assert_eq!(points[0].year, "2015");
        assert_eq!(points[2].year, "2017");
        assert_eq!(points[2].value, Some(72.5));
        assert_eq!(points[7].value, None);
        assert_eq!(points[8].year, "2023");
    }

    #[test]
    fn unknown_municipality_is_an_error() {
        let err = municipality_series(&sample_table(), "Atlantis").expect_err("no such row");
        assert!(matches!(err, StatsError::UnknownMunicipality { .. }));
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn line_spec_embeds_all_points() {
        let points = municipality_series(&sample_table(), "Oslo").expect("oslo exists");
        let spec = line_chart_spec("Oslo", &points);
        assert_eq!(spec["mark"]["type"], "line");
        assert_eq!(
            spec["data"]["values"].as_array().map(Vec::len),
            Some(YEAR_COUNT)
        );
        assert!(spec["title"].as_str().unwrap_or_default().contains("Oslo"));
    }

    #[test]
    fn bar_spec_sorts_descending() {
        let ranked = vec![
            RankedAverage {
                municipality: "A".to_string(),
                average: 97.0,
            },
            RankedAverage {
                municipality: "B".to_string(),
                average: 95.5,
            },
        ];
        let spec = bar_chart_spec(&ranked);
        assert_eq!(spec["mark"], "bar");
        assert_eq!(spec["encoding"]["x"]["sort"], "-y");
    }

    #[test]
    fn document_is_self_contained_html() {
        let document =
            ChartDocument::municipality_line(&sample_table(), "Oslo").expect("oslo exists");
        assert_eq!(document.file_name(), "coverage_Oslo_2015_2023.html");
        let html = document.to_html();
        assert!(html.contains("vega-embed"));
        assert!(html.contains("vegaEmbed"));
        assert!(html.contains("Oslo"));
    }
}
