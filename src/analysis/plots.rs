use linreg::linear_regression;

use crate::config::AnalysisConfig;
use crate::data::model::{CellValue, Table};
use crate::error::PlotError;

// ---------------------------------------------------------------------------
// Hue grouping
// ---------------------------------------------------------------------------

/// Rows grouped by the distinct non-null values of the hue column.
#[derive(Debug, Clone, PartialEq)]
struct HueGroups {
    labels: Vec<String>,
    /// Group index per row; `None` for rows with a null hue.
    row_group: Vec<Option<usize>>,
}

fn hue_groups(table: &Table, hue: Option<&str>, plot: &'static str) -> Result<HueGroups, PlotError> {
    let hue = hue.filter(|h| !h.is_empty()).ok_or(PlotError::MissingHue(plot))?;
    let column = table
        .column(hue)
        .ok_or_else(|| PlotError::UnknownColumn(hue.to_string()))?;

    let levels: Vec<CellValue> = column
        .unique_values()
        .into_iter()
        .filter(|v| *v != CellValue::Null)
        .collect();
    let row_group = column
        .values
        .iter()
        .map(|v| levels.binary_search(v).ok())
        .collect();

    Ok(HueGroups {
        labels: levels.iter().map(|v| v.to_string()).collect(),
        row_group,
    })
}

fn numeric_values(table: &Table, name: &str) -> Result<Vec<f64>, PlotError> {
    table
        .column(name)
        .map(|c| c.to_f64())
        .ok_or_else(|| PlotError::UnknownColumn(name.to_string()))
}

// ---------------------------------------------------------------------------
// Pairwise relationship grid
// ---------------------------------------------------------------------------

/// Equal-width histogram of one variable, split by hue level.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub start: f64,
    pub bin_width: f64,
    /// `counts[level][bin]`
    pub counts: Vec<Vec<usize>>,
}

impl Histogram {
    fn build(per_level: &[Vec<f64>], bins: usize) -> Self {
        let finite = per_level.iter().flatten().copied().filter(|v| v.is_finite());
        let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        if !lo.is_finite() {
            return Histogram {
                start: 0.0,
                bin_width: 1.0,
                counts: vec![vec![0; bins]; per_level.len()],
            };
        }

        // A constant column still gets one visible bar.
        let span = if hi > lo { hi - lo } else { 1.0 };
        let start = if hi > lo { lo } else { lo - 0.5 };
        let bin_width = span / bins as f64;

        let counts = per_level
            .iter()
            .map(|values| {
                let mut counts = vec![0; bins];
                for v in values.iter().filter(|v| v.is_finite()) {
                    let bin = (((v - start) / bin_width) as usize).min(bins - 1);
                    counts[bin] += 1;
                }
                counts
            })
            .collect();

        Histogram {
            start,
            bin_width,
            counts,
        }
    }

    /// Center of bin `i` on the value axis.
    pub fn bin_center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.bin_width
    }
}

/// Data for a scatter-plot matrix over numeric columns, colored by hue.
#[derive(Debug, Clone, PartialEq)]
pub struct PairGrid {
    pub variables: Vec<String>,
    pub hue: String,
    pub levels: Vec<String>,
    /// `values[level][variable]`, one entry per row of that level.
    values: Vec<Vec<Vec<f64>>>,
    /// One histogram per variable for the diagonal.
    pub histograms: Vec<Histogram>,
}

impl PairGrid {
    /// Finite `(x, y)` points of one hue level for the panel at
    /// `(row, col)`: column variable on x, row variable on y.
    pub fn scatter(&self, row: usize, col: usize, level: usize) -> Vec<[f64; 2]> {
        let values = &self.values[level];
        values[col]
            .iter()
            .zip(&values[row])
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| [x, y])
            .collect()
    }

    pub fn size(&self) -> usize {
        self.variables.len()
    }
}

/// Build the pairwise grid. Fails without a hue column or without variables.
pub fn pair_grid(
    table: &Table,
    numeric: &[String],
    hue: Option<&str>,
    config: &AnalysisConfig,
) -> Result<PairGrid, PlotError> {
    const PLOT: &str = "pair plot";
    let groups = hue_groups(table, hue, PLOT)?;
    if numeric.is_empty() {
        return Err(PlotError::NoVariables(PLOT));
    }

    let mut values = vec![vec![Vec::new(); numeric.len()]; groups.labels.len()];
    for (v, name) in numeric.iter().enumerate() {
        let column = numeric_values(table, name)?;
        for (row, value) in column.into_iter().enumerate() {
            if let Some(level) = groups.row_group[row] {
                values[level][v].push(value);
            }
        }
    }

    let bins = config.bins_for(table.len()).max(1);
    let histograms = (0..numeric.len())
        .map(|v| {
            let per_level: Vec<Vec<f64>> = values.iter().map(|lv| lv[v].clone()).collect();
            Histogram::build(&per_level, bins)
        })
        .collect();

    log::debug!(
        "pair grid: {} variables, {} hue levels",
        numeric.len(),
        groups.labels.len()
    );

    Ok(PairGrid {
        variables: numeric.to_vec(),
        hue: hue.unwrap_or_default().to_string(),
        levels: groups.labels,
        values,
        histograms,
    })
}

// ---------------------------------------------------------------------------
// Per-variable relationship plots
// ---------------------------------------------------------------------------

/// Least-squares line over the x range of its points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl LinearFit {
    fn fit(points: &[[f64; 2]]) -> Option<Self> {
        let xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
        let ys: Vec<f64> = points.iter().map(|p| p[1]).collect();
        let (slope, intercept) = linear_regression::<f64, f64, f64>(&xs, &ys).ok()?;
        if !slope.is_finite() || !intercept.is_finite() {
            return None;
        }
        let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(LinearFit {
            slope,
            intercept,
            x_min,
            x_max,
        })
    }

    /// End points of the fitted segment.
    pub fn segment(&self) -> [[f64; 2]; 2] {
        [
            [self.x_min, self.slope * self.x_min + self.intercept],
            [self.x_max, self.slope * self.x_max + self.intercept],
        ]
    }
}

/// Points and fitted line of one hue level.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub label: String,
    pub points: Vec<[f64; 2]>,
    pub fit: Option<LinearFit>,
}

/// One predictor plotted against the result column.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub hue: String,
    pub series: Vec<ScatterSeries>,
}

/// One plot per numeric predictor, predictor on x and result on y.
pub fn relationship_plots(
    table: &Table,
    result: &str,
    numeric: &[String],
    hue: Option<&str>,
) -> Result<Vec<RelationshipPlot>, PlotError> {
    let groups = hue_groups(table, hue, "relationship plots")?;
    let ys = numeric_values(table, result)?;

    numeric
        .iter()
        .map(|var| {
            let xs = numeric_values(table, var)?;
            let mut points: Vec<Vec<[f64; 2]>> = vec![Vec::new(); groups.labels.len()];
            for (row, (&x, &y)) in xs.iter().zip(&ys).enumerate() {
                if let Some(level) = groups.row_group[row] {
                    if x.is_finite() && y.is_finite() {
                        points[level].push([x, y]);
                    }
                }
            }

            let series = groups
                .labels
                .iter()
                .zip(points)
                .map(|(label, points)| {
                    let fit = LinearFit::fit(&points);
                    if fit.is_none() && !points.is_empty() {
                        log::debug!("no regression line for {var} at {label}");
                    }
                    ScatterSeries {
                        label: label.clone(),
                        points,
                        fit,
                    }
                })
                .collect();

            Ok(RelationshipPlot {
                title: format!("Relationship between {var} and {result}"),
                x_label: var.clone(),
                y_label: result.to_string(),
                hue: hue.unwrap_or_default().to_string(),
                series,
            })
        })
        .collect()
}
