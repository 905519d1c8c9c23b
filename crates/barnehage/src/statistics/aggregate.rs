use serde::Serialize;

use super::table::{round1, CoverageTable, Year};

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("year '{code}' is not valid, choose a year between y15 and y23")]
    UnknownYear { code: String },
    #[error("municipality '{name}' does not exist in the dataset")]
    UnknownMunicipality { name: String },
}

/// Validate a year column code supplied by a user.
pub fn parse_year(code: &str) -> Result<Year, StatsError> {
    Year::from_code(code).ok_or_else(|| StatsError::UnknownYear {
        code: code.to_string(),
    })
}

/// Highest value in a year column and every municipality attaining it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearExtreme {
    pub value: f64,
    pub municipalities: Vec<String>,
}

/// Lowest value in a year column. Only the first row attaining it is
/// reported, unlike the maximum where all ties are kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearMinimum {
    pub value: f64,
    pub municipality: String,
}

/// A municipality ranked by its nine-year average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAverage {
    pub municipality: String,
    pub average: f64,
}

/// A municipality tied at the extreme average, annotated with the year in
/// which that municipality reaches its own extreme value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageExtreme {
    pub municipality: String,
    pub average: f64,
    pub year: String,
    pub value: f64,
}

/// Maximum over one year column, missing values skipped; all ties returned.
pub fn year_max(table: &CoverageTable, year: Year) -> Option<YearExtreme> {
    let value = table
        .rows()
        .iter()
        .filter_map(|row| row.value(year))
        .fold(None::<f64>, |best, candidate| match best {
            Some(best) if best >= candidate => Some(best),
            _ => Some(candidate),
        })?;

    let municipalities = table
        .rows()
        .iter()
        .filter(|row| row.value(year) == Some(value))
        .map(|row| row.municipality.clone())
        .collect();

    Some(YearExtreme {
        value,
        municipalities,
    })
}

/// Minimum over one year column, missing values skipped; first tie only.
pub fn year_min(table: &CoverageTable, year: Year) -> Option<YearMinimum> {
    let value = table
        .rows()
        .iter()
        .filter_map(|row| row.value(year))
        .fold(None::<f64>, |best, candidate| match best {
            Some(best) if best <= candidate => Some(best),
            _ => Some(candidate),
        })?;

    let municipality = table
        .rows()
        .iter()
        .find(|row| row.value(year) == Some(value))
        .map(|row| row.municipality.clone())?;

    Some(YearMinimum {
        value,
        municipality,
    })
}

/// Mean over one year column, missing values skipped, one decimal.
pub fn year_mean(table: &CoverageTable, year: Year) -> Option<f64> {
    let values: Vec<f64> = table
        .rows()
        .iter()
        .filter_map(|row| row.value(year))
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(round1(values.iter().sum::<f64>() / values.len() as f64))
}

/// Top `n` municipalities by descending average.
///
/// Rows with any missing year value are excluded up front: averages over
/// partial data never enter the ranking, even though the same skip-missing
/// averages are reported elsewhere.
pub fn top_averages(table: &CoverageTable, n: usize) -> Vec<RankedAverage> {
    let mut ranked: Vec<RankedAverage> = table
        .rows()
        .iter()
        .filter(|row| row.is_complete())
        .filter_map(|row| {
            row.average().map(|average| RankedAverage {
                municipality: row.municipality.clone(),
                average,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.average
            .partial_cmp(&a.average)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

/// Every municipality tied at the highest average, with its own peak year.
pub fn max_average_entries(table: &CoverageTable) -> Vec<AverageExtreme> {
    average_entries(table, true)
}

/// Every municipality tied at the lowest average, with its own trough year.
pub fn min_average_entries(table: &CoverageTable) -> Vec<AverageExtreme> {
    average_entries(table, false)
}

fn average_entries(table: &CoverageTable, maximum: bool) -> Vec<AverageExtreme> {
    let averages: Vec<(usize, f64)> = table
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(index, row)| row.average().map(|average| (index, average)))
        .collect();

    let Some(extreme) = averages
        .iter()
        .map(|(_, average)| *average)
        .fold(None::<f64>, |best, candidate| match best {
            Some(best) => Some(if maximum {
                best.max(candidate)
            } else {
                best.min(candidate)
            }),
            None => Some(candidate),
        })
    else {
        return Vec::new();
    };

    averages
        .into_iter()
        .filter(|(_, average)| *average == extreme)
        .filter_map(|(index, average)| {
            let row = &table.rows()[index];
            let own = if maximum {
                row.peak_year()
            } else {
                row.trough_year()
            }?;
            Some(AverageExtreme {
                municipality: row.municipality.clone(),
                average,
                year: own.0.label(),
                value: own.1,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::table::{CoverageRow, YEAR_COUNT};

    fn row(municipality: &str, values: [Option<f64>; YEAR_COUNT]) -> CoverageRow {
        CoverageRow {
            municipality: municipality.to_string(),
            values,
        }
    }

    fn y23_table() -> CoverageTable {
        let mut a = [Some(50.0); YEAR_COUNT];
        a[8] = Some(10.2);
        let mut b = [Some(50.0); YEAR_COUNT];
        b[8] = Some(15.5);
        let mut c = [Some(50.0); YEAR_COUNT];
        c[8] = Some(15.5);
        let mut d = [Some(50.0); YEAR_COUNT];
        d[8] = None;
        CoverageTable::new(vec![row("A", a), row("B", b), row("C", c), row("D", d)])
    }

    #[test]
    fn maximum_returns_all_ties() {
        let table = y23_table();
        let year = Year::from_code("y23").expect("valid code");
        let max = year_max(&table, year).expect("column has values");
        assert_eq!(max.value, 15.5);
        assert_eq!(max.municipalities, vec!["B", "C"]);
    }

    #[test]
    fn minimum_returns_first_tie_only() {
        let mut table_rows = Vec::new();
        let mut a = [Some(50.0); YEAR_COUNT];
        a[8] = Some(10.2);
        let mut b = [Some(50.0); YEAR_COUNT];
        b[8] = Some(10.2);
        table_rows.push(row("First", a));
        table_rows.push(row("Second", b));
        let table = CoverageTable::new(table_rows);

        let year = Year::from_code("y23").expect("valid code");
        let min = year_min(&table, year).expect("column has values");
        assert_eq!(min.value, 10.2);
        assert_eq!(min.municipality, "First");
    }

    #[test]
    fn empty_column_has_no_extremes() {
        let table = CoverageTable::new(vec![row("A", [None; YEAR_COUNT])]);
        let year = Year::from_code("y23").expect("valid code");
        assert!(year_max(&table, year).is_none());
        assert!(year_min(&table, year).is_none());
        assert!(year_mean(&table, year).is_none());
    }

    #[test]
    fn mean_skips_missing_and_rounds() {
        let table = y23_table();
        let year = Year::from_code("y23").expect("valid code");
        // mean of [10.2, 15.5, 15.5] = 13.733... -> 13.7
        assert_eq!(year_mean(&table, year), Some(13.7));
    }

    #[test]
    fn parse_year_rejects_unknown_codes() {
        assert!(parse_year("y20").is_ok());
        let err = parse_year("y99").expect_err("invalid code");
        assert!(err.to_string().contains("y99"));
    }

    #[test]
    fn top_averages_exclude_incomplete_rows() {
        let mut partial = [Some(99.0); YEAR_COUNT];
        partial[4] = None;
        let table = CoverageTable::new(vec![
            row("Partial", partial),
            row("Low", [Some(40.0); YEAR_COUNT]),
            row("High", [Some(90.0); YEAR_COUNT]),
        ]);

        let ranked = top_averages(&table, 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].municipality, "High");
        assert_eq!(ranked[1].municipality, "Low");
        assert!(ranked.iter().all(|entry| entry.municipality != "Partial"));
    }

    #[test]
    fn top_averages_truncate_to_n() {
        let rows = (0..15)
            .map(|index| row(&format!("M{index}"), [Some(index as f64); YEAR_COUNT]))
            .collect();
        let ranked = top_averages(&CoverageTable::new(rows), 10);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].municipality, "M14");
    }

    #[test]
    fn average_extremes_report_each_rows_own_year() {
        let mut a = [Some(80.0); YEAR_COUNT];
        a[2] = Some(89.0); // peak in 2017, average 81.0
        let mut b = [Some(80.5); YEAR_COUNT];
        b[6] = Some(85.0); // peak in 2021, average 81.0
        let table = CoverageTable::new(vec![
            row("A", a),
            row("B", b),
            row("C", [Some(10.0); YEAR_COUNT]),
        ]);

        let entries = max_average_entries(&table);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].municipality, "A");
        assert_eq!(entries[0].year, "2017");
        assert_eq!(entries[0].value, 89.0);
        assert_eq!(entries[1].municipality, "B");
        assert_eq!(entries[1].year, "2021");

        let lows = min_average_entries(&table);
        assert_eq!(lows.len(), 1);
        assert_eq!(lows[0].municipality, "C");
        assert_eq!(lows[0].average, 10.0);
        assert_eq!(lows[0].year, "2015");
    }
}
