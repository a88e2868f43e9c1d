//! Chart Plotter Module
//! Static SVG charts via plotters, plus the presenter seam the report renders through.

use crate::charts::tables::{self, round3};
use crate::charts::RenderError;
use crate::config::{CountrySet, Indicator, Palette, Rgb};
use crate::data::LongRecord;
use crate::stats::{AggregateRow, BucketKey, CorrelationMatrix, CountryDistribution};
use plotters::prelude::*;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::debug;

const MISSING_FILL: RGBColor = RGBColor(220, 220, 220);
const CHART_SIZE: (u32, u32) = (960, 540);
/// Wider grids drop cell annotations and thin out column labels.
const MAX_ANNOTATED_COLUMNS: usize = 16;
const BOX_HALF_WIDTH: f64 = 0.25;

/// Consumes tidy tables and produces rendered artifacts. Returns the artifact path.
pub trait Presenter: Sync {
    fn line_chart(
        &self,
        indicator: Indicator,
        records: &[LongRecord],
        title: &str,
    ) -> Result<PathBuf, RenderError>;

    /// Country x bucket grid of group means, written as `<name>.svg`.
    fn heatmap(&self, name: &str, rows: &[AggregateRow], title: &str) -> Result<PathBuf, RenderError>;

    /// One box per country: p25..p75 box, p05/p95 whiskers, median line, mean dot.
    fn distribution_chart(
        &self,
        indicator: Indicator,
        distributions: &[CountryDistribution],
        title: &str,
    ) -> Result<PathBuf, RenderError>;

    fn correlation_heatmap(
        &self,
        matrix: &CorrelationMatrix,
        title: &str,
    ) -> Result<PathBuf, RenderError>;

    fn summary_table(&self, name: &str, rows: &[AggregateRow]) -> Result<PathBuf, RenderError>;
}

fn draw_error(path: &Path, error: impl Display) -> RenderError {
    RenderError::Draw {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// White at 0, full `hot` at +1, full `cold` at -1.
fn diverging(t: f64) -> RGBColor {
    let t = t.clamp(-1.0, 1.0);
    let (target, weight) = if t >= 0.0 {
        ((202.0, 0.0, 32.0), t)
    } else {
        ((5.0, 113.0, 176.0), -t)
    };
    let mix = |to: f64| (255.0 + (to - 255.0) * weight).round() as u8;
    RGBColor(mix(target.0), mix(target.1), mix(target.2))
}

/// Contiguous runs of present values; gaps break the line.
fn segments(points: &[(i32, Option<f64>)]) -> Vec<Vec<(i32, f64)>> {
    let mut out: Vec<Vec<(i32, f64)>> = Vec::new();
    let mut current = Vec::new();
    for &(year, value) in points {
        match value {
            Some(v) => current.push((year, v)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs() * 0.05 + 0.01 };
    (lo - pad, hi + pad)
}

/// Renders SVG charts and CSV tables into one output directory.
pub struct SvgPresenter {
    out_dir: PathBuf,
    countries: CountrySet,
    palette: Palette,
}

impl SvgPresenter {
    pub fn new(out_dir: impl Into<PathBuf>, countries: CountrySet, palette: Palette) -> Self {
        Self {
            out_dir: out_dir.into(),
            countries,
            palette,
        }
    }

    /// Grid of labelled cells; `cells[row][col]` is `(fill, annotation)`.
    fn draw_grid(
        &self,
        path: &Path,
        title: &str,
        row_labels: &[String],
        col_labels: &[String],
        cells: &[Vec<(RGBColor, String)>],
    ) -> Result<(), RenderError> {
        let rows = row_labels.len().max(1) as f64;
        let cols = col_labels.len().max(1) as f64;
        // one extra band on the left for row labels and on top for column labels
        let label_band = 2.0;

        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(|e| draw_error(path, e))?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(15)
            .build_cartesian_2d(-label_band..cols, 0.0..rows + 1.0)
            .map_err(|e| draw_error(path, e))?;

        let top = |r: usize| rows - r as f64;
        chart
            .draw_series(cells.iter().enumerate().flat_map(|(r, row)| {
                row.iter().enumerate().map(move |(c, (fill, _))| {
                    Rectangle::new(
                        [(c as f64, top(r)), (c as f64 + 1.0, top(r) - 1.0)],
                        fill.filled(),
                    )
                })
            }))
            .map_err(|e| draw_error(path, e))?;

        chart
            .draw_series(cells.iter().enumerate().flat_map(|(r, row)| {
                row.iter().enumerate().map(move |(c, (_, text))| {
                    Text::new(
                        text.clone(),
                        (c as f64 + 0.2, top(r) - 0.4),
                        ("sans-serif", 13).into_font(),
                    )
                })
            }))
            .map_err(|e| draw_error(path, e))?;

        chart
            .draw_series(row_labels.iter().enumerate().map(|(r, label)| {
                Text::new(
                    label.clone(),
                    (-label_band + 0.1, top(r) - 0.4),
                    ("sans-serif", 14).into_font(),
                )
            }))
            .map_err(|e| draw_error(path, e))?;

        chart
            .draw_series(col_labels.iter().enumerate().map(|(c, label)| {
                Text::new(
                    label.clone(),
                    (c as f64 + 0.1, rows + 0.6),
                    ("sans-serif", 14).into_font(),
                )
            }))
            .map_err(|e| draw_error(path, e))?;

        root.present().map_err(|e| draw_error(path, e))
    }
}

impl Presenter for SvgPresenter {
    fn line_chart(
        &self,
        indicator: Indicator,
        records: &[LongRecord],
        title: &str,
    ) -> Result<PathBuf, RenderError> {
        let path = self.out_dir.join(format!("{}_trend.svg", indicator.key()));

        let (first_year, last_year) = records
            .iter()
            .fold((i32::MAX, i32::MIN), |(lo, hi), r| (lo.min(r.year), hi.max(r.year)));
        let (first_year, last_year) = if first_year > last_year {
            (0, 1)
        } else {
            (first_year, last_year.max(first_year + 1))
        };
        let (y_min, y_max) = value_range(records.iter().filter_map(|r| r.value));

        let root = SVGBackend::new(&path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(|e| draw_error(&path, e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(60)
            .build_cartesian_2d(first_year..last_year, y_min..y_max)
            .map_err(|e| draw_error(&path, e))?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc(indicator.name())
            .draw()
            .map_err(|e| draw_error(&path, e))?;

        for (i, country) in self.countries.iter().enumerate() {
            let color = rgb(self.palette.color_for(i));
            let mut points: Vec<(i32, Option<f64>)> = records
                .iter()
                .filter(|r| r.country == country && r.indicator == indicator)
                .map(|r| (r.year, r.value))
                .collect();
            points.sort_by_key(|&(year, _)| year);

            for (n, segment) in segments(&points).into_iter().enumerate() {
                let series = chart
                    .draw_series(LineSeries::new(segment, color.stroke_width(2)))
                    .map_err(|e| draw_error(&path, e))?;
                if n == 0 {
                    series.label(country).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                }
            }
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| draw_error(&path, e))?;
        root.present().map_err(|e| draw_error(&path, e))?;

        debug!(path = %path.display(), "line chart written");
        Ok(path.clone())
    }

    fn heatmap(&self, name: &str, rows: &[AggregateRow], title: &str) -> Result<PathBuf, RenderError> {
        let path = self.out_dir.join(format!("{name}.svg"));

        let mut buckets: Vec<BucketKey> = rows.iter().map(|r| r.bucket).collect();
        buckets.sort();
        buckets.dedup();
        let annotate = buckets.len() <= MAX_ANNOTATED_COLUMNS;
        let label_step = buckets.len().div_ceil(MAX_ANNOTATED_COLUMNS).max(1);

        let (lo, hi) = value_range(rows.iter().filter_map(|r| r.mean));
        let span = (hi - lo).max(f64::EPSILON);

        let cells: Vec<Vec<(RGBColor, String)>> = self
            .countries
            .iter()
            .map(|country| {
                buckets
                    .iter()
                    .map(|&bucket| {
                        let mean = rows
                            .iter()
                            .find(|r| r.country == country && r.bucket == bucket)
                            .and_then(|r| r.mean);
                        match mean {
                            Some(m) if annotate => {
                                (diverging((m - lo) / span), format!("{:.3}", round3(m)))
                            }
                            Some(m) => (diverging((m - lo) / span), String::new()),
                            None if annotate => (MISSING_FILL, "n/a".to_string()),
                            None => (MISSING_FILL, String::new()),
                        }
                    })
                    .collect()
            })
            .collect();

        let row_labels: Vec<String> = self.countries.names().to_vec();
        let col_labels: Vec<String> = buckets
            .iter()
            .enumerate()
            .map(|(i, b)| if i % label_step == 0 { b.to_string() } else { String::new() })
            .collect();
        self.draw_grid(&path, title, &row_labels, &col_labels, &cells)?;

        debug!(path = %path.display(), "heatmap written");
        Ok(path)
    }

    fn distribution_chart(
        &self,
        indicator: Indicator,
        distributions: &[CountryDistribution],
        title: &str,
    ) -> Result<PathBuf, RenderError> {
        let path = self.out_dir.join(format!("{}_distribution.svg", indicator.key()));

        let names = self.countries.names();
        let slots = names.len().max(1);
        let (y_min, y_max) = value_range(
            distributions
                .iter()
                .flat_map(|d| [d.p05, d.p95])
                .flatten(),
        );
        let country_label = |x: &f64| {
            let slot = x.round();
            if (x - slot).abs() < 1e-6 && slot >= 0.0 {
                names.get(slot as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };

        let root = SVGBackend::new(&path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(|e| draw_error(&path, e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..slots as f64 - 0.5, y_min..y_max)
            .map_err(|e| draw_error(&path, e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(slots)
            .x_label_formatter(&country_label)
            .y_desc(indicator.name())
            .draw()
            .map_err(|e| draw_error(&path, e))?;

        for d in distributions {
            let (Some(slot), Some(p05), Some(p25), Some(median), Some(p75), Some(p95)) = (
                self.countries.position(&d.country),
                d.p05,
                d.p25,
                d.median,
                d.p75,
                d.p95,
            ) else {
                // no observations, or a country outside the set
                continue;
            };
            let color = rgb(self.palette.color_for(slot));
            let x = slot as f64;
            let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);

            chart
                .draw_series([
                    Rectangle::new([(left, p75), (right, p25)], color.mix(0.3).filled()),
                    Rectangle::new([(left, p75), (right, p25)], color.stroke_width(2)),
                ])
                .map_err(|e| draw_error(&path, e))?;

            let cap = BOX_HALF_WIDTH / 2.0;
            chart
                .draw_series(
                    [
                        vec![(x, p05), (x, p25)],
                        vec![(x, p75), (x, p95)],
                        vec![(x - cap, p05), (x + cap, p05)],
                        vec![(x - cap, p95), (x + cap, p95)],
                        vec![(left, median), (right, median)],
                    ]
                    .into_iter()
                    .map(|line| PathElement::new(line, color.stroke_width(2))),
                )
                .map_err(|e| draw_error(&path, e))?;

            if let Some(mean) = d.mean {
                chart
                    .draw_series([Circle::new((x, mean), 4, BLACK.filled())])
                    .map_err(|e| draw_error(&path, e))?;
            }
        }

        root.present().map_err(|e| draw_error(&path, e))?;

        debug!(path = %path.display(), "distribution chart written");
        Ok(path.clone())
    }

    fn correlation_heatmap(
        &self,
        matrix: &CorrelationMatrix,
        title: &str,
    ) -> Result<PathBuf, RenderError> {
        let path = self.out_dir.join("correlation_heatmap.svg");

        let labels: Vec<String> = matrix.indicators.iter().map(|i| i.name().to_string()).collect();
        let cells: Vec<Vec<(RGBColor, String)>> = matrix
            .coefficients
            .iter()
            .map(|row| {
                row.iter()
                    .map(|r| match r {
                        Some(r) => (diverging(*r), format!("{:.3}", round3(*r))),
                        None => (MISSING_FILL, "n/a".to_string()),
                    })
                    .collect()
            })
            .collect();
        self.draw_grid(&path, title, &labels, &labels, &cells)?;

        debug!(path = %path.display(), "correlation heatmap written");
        Ok(path)
    }

    fn summary_table(&self, name: &str, rows: &[AggregateRow]) -> Result<PathBuf, RenderError> {
        let path = self.out_dir.join(format!("{name}.csv"));
        tables::write_aggregate_csv(&path, rows)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::YearWindow;
    use crate::stats::{Aggregator, CorrelationCalculator, StatsCalculator};
    use crate::data::MergedRecord;

    fn records() -> Vec<LongRecord> {
        [(1980, Some(0.40)), (1981, None), (1982, Some(0.42)), (1983, Some(0.43))]
            .into_iter()
            .map(|(year, value)| LongRecord {
                country: "Ghana".into(),
                year,
                indicator: Indicator::GiniCoefficient,
                value,
            })
            .collect()
    }

    #[test]
    fn gaps_split_line_segments() {
        let points = [(1980, Some(1.0)), (1981, None), (1982, Some(2.0)), (1983, Some(3.0))];
        let segs = segments(&points);
        assert_eq!(segs, vec![vec![(1980, 1.0)], vec![(1982, 2.0), (1983, 3.0)]]);
        assert!(segments(&[(1980, None)]).is_empty());
    }

    #[test]
    fn diverging_scale_endpoints() {
        assert_eq!(diverging(0.0), RGBColor(255, 255, 255));
        assert_eq!(diverging(1.0), RGBColor(202, 0, 32));
        assert_eq!(diverging(-1.0), RGBColor(5, 113, 176));
    }

    #[test]
    fn value_range_handles_empty_and_constant() {
        assert_eq!(value_range(std::iter::empty()), (0.0, 1.0));
        let (lo, hi) = value_range([0.33, 0.33].into_iter());
        assert!(lo < 0.33 && hi > 0.33);
    }

    #[test]
    fn wide_heatmap_is_unannotated() {
        let dir = tempfile::tempdir().unwrap();
        let countries = CountrySet::new(["Ghana"]).unwrap();
        let presenter = SvgPresenter::new(dir.path(), countries.clone(), Palette::default());
        let long: Vec<LongRecord> = (1975..=2024)
            .map(|year| LongRecord {
                country: "Ghana".into(),
                year,
                indicator: Indicator::Hdi,
                value: (year != 1990).then_some(0.5 + f64::from(year - 1975) * 0.01),
            })
            .collect();
        let years = Aggregator::by_year(&long, &countries, YearWindow::default());
        assert_eq!(years.rows.len(), 50);

        let heat = presenter.heatmap("hdi_heatmap", &years.rows, "HDI").unwrap();
        let svg = std::fs::read_to_string(heat).unwrap();
        assert!(!svg.contains("n/a"));
        assert!(svg.contains("1975"));
    }

    #[test]
    fn renders_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let countries = CountrySet::new(["Switzerland", "Ghana"]).unwrap();
        let presenter = SvgPresenter::new(dir.path(), countries.clone(), Palette::default());
        let long = records();

        let line = presenter
            .line_chart(Indicator::GiniCoefficient, &long, "Gini Coefficient")
            .unwrap();
        assert!(std::fs::read_to_string(&line).unwrap().contains("<svg"));

        let decades = Aggregator::by_decade(&long, &countries, YearWindow::default());
        let heat = presenter
            .heatmap("gini_decade_heatmap", &decades.rows, "Gini by decade")
            .unwrap();
        assert_eq!(heat, dir.path().join("gini_decade_heatmap.svg"));
        assert!(heat.exists());

        let distributions =
            StatsCalculator::country_distributions(&long, Indicator::GiniCoefficient, &countries);
        let dist = presenter
            .distribution_chart(Indicator::GiniCoefficient, &distributions, "Gini distribution")
            .unwrap();
        assert_eq!(dist, dir.path().join("gini_coefficient_distribution.svg"));
        assert!(std::fs::read_to_string(&dist).unwrap().contains("<svg"));

        let mut merged = MergedRecord::new("Ghana", 2000);
        merged.set(Indicator::Hdi, Some(0.5));
        let matrix = CorrelationCalculator::pairwise_complete(&[merged], &Indicator::ALL);
        let corr = presenter.correlation_heatmap(&matrix, "Correlation").unwrap();
        assert!(corr.exists());

        let table = presenter.summary_table("gini_decades", &decades.rows).unwrap();
        assert_eq!(table, dir.path().join("gini_decades.csv"));
    }
}
