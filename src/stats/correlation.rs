//! Correlation Module
//! Pairwise-complete Pearson correlation across merged indicator records.

use crate::config::Indicator;
use crate::data::MergedRecord;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Square matrix over `indicators`; `observations[i][j]` is the number of rows
/// where both indicators were present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub indicators: Vec<Indicator>,
    pub coefficients: Vec<Vec<Option<f64>>>,
    pub observations: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    fn position(&self, indicator: Indicator) -> Option<usize> {
        self.indicators.iter().position(|&i| i == indicator)
    }

    pub fn get(&self, a: Indicator, b: Indicator) -> Option<f64> {
        let (i, j) = (self.position(a)?, self.position(b)?);
        self.coefficients[i][j]
    }

    pub fn observations(&self, a: Indicator, b: Indicator) -> usize {
        match (self.position(a), self.position(b)) {
            (Some(i), Some(j)) => self.observations[i][j],
            _ => 0,
        }
    }
}

/// Pearson's r, or `None` with fewer than two pairs or a constant side.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let sx = Statistics::std_dev(xs);
    let sy = Statistics::std_dev(ys);
    if !(sx > 0.0 && sy > 0.0) {
        return None;
    }
    let r = Statistics::covariance(xs, ys) / (sx * sy);
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

pub struct CorrelationCalculator;

impl CorrelationCalculator {
    /// Each pair uses only the rows where both of its indicators are present,
    /// independent of gaps in the other indicators.
    ///
    /// `indicators` is an explicit allow-list; duplicates are dropped.
    pub fn pairwise_complete(records: &[MergedRecord], indicators: &[Indicator]) -> CorrelationMatrix {
        let mut allowed: Vec<Indicator> = Vec::with_capacity(indicators.len());
        for &ind in indicators {
            if !allowed.contains(&ind) {
                allowed.push(ind);
            }
        }

        let n = allowed.len();
        let mut coefficients = vec![vec![None; n]; n];
        let mut observations = vec![vec![0usize; n]; n];

        for i in 0..n {
            for j in i..n {
                let (xs, ys): (Vec<f64>, Vec<f64>) = records
                    .iter()
                    .filter_map(|r| match (r.get(allowed[i]), r.get(allowed[j])) {
                        (Some(x), Some(y)) if !x.is_nan() && !y.is_nan() => Some((x, y)),
                        _ => None,
                    })
                    .unzip();
                let r = pearson(&xs, &ys);
                coefficients[i][j] = r;
                coefficients[j][i] = r;
                observations[i][j] = xs.len();
                observations[j][i] = xs.len();
            }
        }

        CorrelationMatrix {
            indicators: allowed,
            coefficients,
            observations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged(year: i32, x: Option<f64>, y: Option<f64>, z: Option<f64>) -> MergedRecord {
        let mut m = MergedRecord::new("Ghana", year);
        m.set(Indicator::Hdi, x);
        m.set(Indicator::LifeExpectancy, y);
        m.set(Indicator::GiniCoefficient, z);
        m
    }

    #[test]
    fn perfect_linear_relationship() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_have_no_coefficient() {
        assert_eq!(pearson(&[1.0], &[1.0]), None);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn uses_only_overlapping_rows() {
        // HDI has 2000..=2002, life expectancy only 2001..=2002.
        let records = vec![
            merged(2000, Some(0.5), None, None),
            merged(2001, Some(0.6), Some(60.0), None),
            merged(2002, Some(0.7), Some(55.0), None),
        ];
        let matrix = CorrelationCalculator::pairwise_complete(
            &records,
            &[Indicator::Hdi, Indicator::LifeExpectancy],
        );
        assert_eq!(matrix.observations(Indicator::Hdi, Indicator::LifeExpectancy), 2);
        assert_eq!(matrix.observations(Indicator::Hdi, Indicator::Hdi), 3);
        // two points always correlate perfectly; sign shows which rows were used
        assert!((matrix.get(Indicator::Hdi, Indicator::LifeExpectancy).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pairwise_not_listwise() {
        // Gini is present in only one row; list-wise deletion would leave
        // a single row and no HDI/Life Expectancy coefficient at all.
        let records = vec![
            merged(2000, Some(0.5), Some(50.0), Some(0.4)),
            merged(2001, Some(0.6), Some(52.0), None),
            merged(2002, Some(0.7), Some(55.0), None),
        ];
        let matrix = CorrelationCalculator::pairwise_complete(
            &records,
            &[Indicator::Hdi, Indicator::LifeExpectancy, Indicator::GiniCoefficient],
        );
        assert_eq!(matrix.observations(Indicator::Hdi, Indicator::LifeExpectancy), 3);
        assert!(matrix.get(Indicator::Hdi, Indicator::LifeExpectancy).unwrap() > 0.9);
        assert_eq!(matrix.get(Indicator::Hdi, Indicator::GiniCoefficient), None);
        assert_eq!(matrix.observations(Indicator::Hdi, Indicator::GiniCoefficient), 1);
    }

    #[test]
    fn diagonal_and_symmetry() {
        let records = vec![
            merged(2000, Some(0.5), Some(50.0), None),
            merged(2001, Some(0.6), Some(49.0), None),
            merged(2002, Some(0.8), Some(56.0), None),
        ];
        let matrix = CorrelationCalculator::pairwise_complete(
            &records,
            &[Indicator::Hdi, Indicator::LifeExpectancy, Indicator::Hdi],
        );
        assert_eq!(matrix.indicators, vec![Indicator::Hdi, Indicator::LifeExpectancy]);
        assert!((matrix.get(Indicator::Hdi, Indicator::Hdi).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(
            matrix.get(Indicator::Hdi, Indicator::LifeExpectancy),
            matrix.get(Indicator::LifeExpectancy, Indicator::Hdi)
        );
        assert_eq!(matrix.get(Indicator::Hdi, Indicator::PovertyRate), None);
    }
}
