use crate::data::TaskType;
use crate::errors::StreamwiseError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Performance measures tracked during prequential evaluation.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Accuracy,
    Kappa,
    KappaT,
    MeanSquaredError,
    MeanAbsoluteError,
}

impl Metric {
    /// The task the metric is defined for.
    pub fn task(&self) -> TaskType {
        match self {
            Metric::Accuracy | Metric::Kappa | Metric::KappaT => TaskType::Classification,
            Metric::MeanSquaredError | Metric::MeanAbsoluteError => TaskType::Regression,
        }
    }

    pub fn defaults(task: TaskType) -> Vec<Metric> {
        match task {
            TaskType::Classification => vec![Metric::Accuracy, Metric::Kappa],
            TaskType::Regression => vec![Metric::MeanSquaredError, Metric::MeanAbsoluteError],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::Kappa => "kappa",
            Metric::KappaT => "kappa_t",
            Metric::MeanSquaredError => "mse",
            Metric::MeanAbsoluteError => "mae",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = StreamwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Accuracy" | "accuracy" | "performance" => Ok(Metric::Accuracy),
            "Kappa" | "kappa" => Ok(Metric::Kappa),
            "KappaT" | "kappa_t" => Ok(Metric::KappaT),
            "MeanSquaredError" | "mse" => Ok(Metric::MeanSquaredError),
            "MeanAbsoluteError" | "mae" => Ok(Metric::MeanAbsoluteError),
            _ => Err(StreamwiseError::ParseString(
                s.to_string(),
                "Metric".to_string(),
                items_to_strings(vec![
                    "Accuracy",
                    "Kappa",
                    "KappaT",
                    "MeanSquaredError",
                    "MeanAbsoluteError",
                ]),
            )),
        }
    }
}

/// Agreement beyond chance, `(p0 - pe) / (1 - pe)`.
///
/// * `p0` - Observed agreement, the accuracy of the learner.
/// * `pe` - Agreement expected from the reference predictor.
///
/// Returns NaN when the reference is always right.
pub fn kappa_statistic(p0: f64, pe: f64) -> f64 {
    if pe >= 1.0 {
        f64::NAN
    } else {
        (p0 - pe) / (1.0 - pe)
    }
}

/// Chance agreement of Cohen's kappa from the marginal counts of the confusion matrix.
pub fn chance_agreement(true_counts: &[f64], pred_counts: &[f64], n: f64) -> f64 {
    if n <= 0.0 {
        return 0.0;
    }
    true_counts
        .iter()
        .zip(pred_counts)
        .map(|(t, p)| (t / n) * (p / n))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::precision_round;

    #[test]
    fn test_metric_from_str() {
        assert_eq!("kappa_t".parse::<Metric>().unwrap(), Metric::KappaT);
        assert_eq!("performance".parse::<Metric>().unwrap(), Metric::Accuracy);
        assert!("auc".parse::<Metric>().is_err());
        assert_eq!(Metric::MeanSquaredError.to_string(), "mse");
    }

    #[test]
    fn test_metric_task() {
        assert_eq!(Metric::Kappa.task(), TaskType::Classification);
        assert_eq!(Metric::MeanAbsoluteError.task(), TaskType::Regression);
        assert!(Metric::defaults(TaskType::Regression)
            .iter()
            .all(|m| m.task() == TaskType::Regression));
    }

    #[test]
    fn test_kappa() {
        // 2x2 confusion: [[20, 5], [10, 15]]
        let true_counts = [25., 25.];
        let pred_counts = [30., 20.];
        let pe = chance_agreement(&true_counts, &pred_counts, 50.);
        assert_eq!(precision_round(pe, 4), 0.5);
        assert_eq!(precision_round(kappa_statistic(0.7, pe), 4), 0.4);
        assert!(kappa_statistic(1.0, 1.0).is_nan());
    }
}
