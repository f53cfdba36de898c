//! Adaptive Bagging
//!
//! Online bagging where every member is paired with an [`Adwin`] detector
//! watching its prequential error. For each arriving instance a member
//!
//! 1. predicts the instance,
//! 2. trains on it `k ~ Poisson(lambda)` times,
//! 3. feeds the error of the prediction from step 1 to its detector.
//!
//! Members whose detector cuts its window with a higher error estimate are
//! reset once every member has seen the instance. A reset member keeps its slot, its random generator
//! and its detector, it only forgets what it learned.
use crate::data::{Batch, TaskType};
use crate::drift::adwin::Adwin;
use crate::ensemble::config::EnsembleConfig;
use crate::errors::StreamwiseError;
use crate::learner::{error_signal, OnlineLearner, StreamModel};
use crate::sampler::{PoissonSampler, WeightSampler};
use hashbrown::HashMap;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// A member reset triggered by drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResetEvent {
    /// Index of the instance, counted over every instance passed to `partial_fit`.
    pub sample: usize,
    pub member: usize,
    /// Error estimate of the member's detector right after the cut.
    pub error_estimate: f64,
}

#[derive(Debug, Clone)]
struct Member<L> {
    learner: L,
    detector: Option<Adwin>,
    rng: StdRng,
    n_resets: usize,
}

impl<L: OnlineLearner> Member<L> {
    /// Test then train on a single instance, returning whether the member drifted.
    fn learn_one(
        &mut self,
        sampler: PoissonSampler,
        task: TaskType,
        x: &[f64],
        y: f64,
    ) -> Result<bool, StreamwiseError> {
        let prediction = self.learner.predict_one(x)?;
        let mut sampler = sampler;
        let k = sampler.sample(&mut self.rng);
        for _ in 0..k {
            self.learner.fit_one(x, y)?;
        }
        // Only a cut that raised the error estimate counts, a member that is
        // improving is never reset.
        let drift = match (self.detector.as_mut(), prediction) {
            (Some(adwin), Some(p)) => {
                let before = adwin.estimate();
                adwin.add_element(error_signal(task, p, y)) && adwin.estimate() > before
            }
            _ => false,
        };
        Ok(drift)
    }

    fn vote(&self, x: &[f64]) -> Result<Option<f64>, StreamwiseError> {
        if self.learner.is_cold() {
            return Ok(None);
        }
        self.learner.predict_one(x)
    }
}

#[inline]
fn label_key(y: f64) -> u64 {
    // Adding zero folds -0.0 into 0.0.
    (y + 0.0).to_bits()
}

/// ADWIN driven online bagging ensemble.
pub struct AdaptiveBagging<L> {
    cfg: EnsembleConfig,
    members: Vec<Member<L>>,
    sampler: PoissonSampler,
    task: TaskType,
    classes: Option<Vec<f64>>,
    class_index: HashMap<u64, usize>,
    n_features: Option<usize>,
    n_samples_seen: usize,
    reset_log: Vec<ResetEvent>,
}

impl<L: OnlineLearner + Clone> AdaptiveBagging<L> {
    /// Build an ensemble of `cfg.n_estimators` copies of `base`.
    ///
    /// * `cfg` - Ensemble configuration, validated here.
    /// * `base` - Prototype learner. Members start from a reset clone of it.
    pub fn new(cfg: EnsembleConfig, base: L) -> Result<Self, StreamwiseError> {
        cfg.validate()?;
        let members = (0..cfg.n_estimators)
            .map(|_| {
                let mut learner = base.clone();
                learner.reset();
                learner
            })
            .collect();
        Self::from_members(cfg, members)
    }
}

impl<L: OnlineLearner> AdaptiveBagging<L> {
    /// Build an ensemble from explicit members, which must all solve the same task.
    pub fn from_members(cfg: EnsembleConfig, learners: Vec<L>) -> Result<Self, StreamwiseError> {
        cfg.validate()?;
        if learners.len() != cfg.n_estimators {
            return Err(StreamwiseError::InvalidParameter(
                "n_estimators".to_string(),
                format!("{} members", learners.len()),
                cfg.n_estimators.to_string(),
            ));
        }
        let task = learners[0].task();
        if learners.iter().any(|l| l.task() != task) {
            return Err(StreamwiseError::InvalidParameter(
                "learners".to_string(),
                format!("members solving {:?}", task),
                "members with mixed tasks".to_string(),
            ));
        }
        let mut members = Vec::with_capacity(learners.len());
        for (i, learner) in learners.into_iter().enumerate() {
            let detector = if cfg.drift_detection {
                Some(Adwin::with_config(cfg.adwin)?)
            } else {
                None
            };
            members.push(Member {
                learner,
                detector,
                rng: StdRng::seed_from_u64(cfg.seed.wrapping_add(i as u64)),
                n_resets: 0,
            });
        }
        Ok(AdaptiveBagging {
            sampler: PoissonSampler::new(cfg.lambda)?,
            cfg,
            members,
            task,
            classes: None,
            class_index: HashMap::new(),
            n_features: None,
            n_samples_seen: 0,
            reset_log: Vec::new(),
        })
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.cfg
    }

    pub fn n_members(&self) -> usize {
        self.members.len()
    }

    pub fn learners(&self) -> impl Iterator<Item = &L> {
        self.members.iter().map(|m| &m.learner)
    }

    pub fn classes(&self) -> Option<&[f64]> {
        self.classes.as_deref()
    }

    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    /// Every drift triggered reset so far, in order.
    pub fn reset_log(&self) -> &[ResetEvent] {
        &self.reset_log
    }

    pub fn n_resets(&self) -> usize {
        self.reset_log.len()
    }

    pub fn member_resets(&self) -> Vec<usize> {
        self.members.iter().map(|m| m.n_resets).collect()
    }

    /// Current error estimate of each member, `None` without drift detection.
    pub fn member_errors(&self) -> Vec<Option<f64>> {
        self.members
            .iter()
            .map(|m| m.detector.as_ref().map(|d| d.estimate()))
            .collect()
    }

    fn register_classes(&mut self, classes: Option<&[f64]>) -> Result<(), StreamwiseError> {
        if self.classes.is_none() {
            let new = classes.filter(|c| !c.is_empty()).ok_or(StreamwiseError::MissingClasses)?;
            for (i, c) in new.iter().enumerate() {
                self.class_index.entry(label_key(*c)).or_insert(i);
            }
            self.classes = Some(new.to_vec());
            return Ok(());
        }
        let known = self.classes.as_deref().unwrap_or_default();
        match classes {
            Some(new) if new != known => Err(StreamwiseError::InvalidParameter(
                "classes".to_string(),
                format!("{:?}", known),
                format!("{:?}", new),
            )),
            _ => Ok(()),
        }
    }

    fn check_batch(&self, batch: &Batch) -> Result<(), StreamwiseError> {
        if let Some(n) = self.n_features {
            if !batch.is_empty() && batch.cols != n {
                return Err(StreamwiseError::DimensionMismatch {
                    expected: n,
                    found: batch.cols,
                });
            }
        }
        Ok(())
    }

    /// Update every member with every instance of the batch.
    ///
    /// * `batch` - The instances to learn from.
    /// * `classes` - All labels of a classification task, required on the first call.
    pub fn partial_fit(&mut self, batch: &Batch, classes: Option<&[f64]>) -> Result<(), StreamwiseError> {
        if self.task == TaskType::Classification {
            self.register_classes(classes)?;
            if let Some(y) = batch.y.iter().find(|y| !self.class_index.contains_key(&label_key(**y))) {
                return Err(StreamwiseError::UnknownLabel(*y));
            }
        }
        self.check_batch(batch)?;
        if batch.is_empty() {
            return Ok(());
        }
        self.n_features.get_or_insert(batch.cols);

        for (x, y) in batch.iter() {
            let (sampler, task) = (self.sampler, self.task);
            let drifts: Vec<bool> = if self.cfg.parallel {
                self.members
                    .par_iter_mut()
                    .map(|m| m.learn_one(sampler, task, x, y))
                    .collect::<Result<_, _>>()?
            } else {
                self.members
                    .iter_mut()
                    .map(|m| m.learn_one(sampler, task, x, y))
                    .collect::<Result<_, _>>()?
            };

            for (i, drift) in drifts.into_iter().enumerate() {
                if !drift {
                    continue;
                }
                let member = &mut self.members[i];
                member.learner.reset();
                member.n_resets += 1;
                let error_estimate = member.detector.as_ref().map_or(f64::NAN, |d| d.estimate());
                debug!(
                    "Member {} reset at sample {}, error estimate {:.4}.",
                    i, self.n_samples_seen, error_estimate
                );
                self.reset_log.push(ResetEvent {
                    sample: self.n_samples_seen,
                    member: i,
                    error_estimate,
                });
            }
            self.n_samples_seen += 1;
        }
        Ok(())
    }

    /// Predict a single instance by aggregating the votes of the warm members.
    pub fn predict_one(&self, x: &[f64]) -> Result<Option<f64>, StreamwiseError> {
        let votes: Vec<Option<f64>> = if self.cfg.parallel {
            self.members
                .par_iter()
                .map(|m| m.vote(x))
                .collect::<Result<_, _>>()?
        } else {
            self.members.iter().map(|m| m.vote(x)).collect::<Result<_, _>>()?
        };
        self.aggregate(votes.into_iter().flatten())
    }

    fn aggregate(&self, votes: impl Iterator<Item = f64>) -> Result<Option<f64>, StreamwiseError> {
        match self.task {
            TaskType::Classification => {
                let classes = match &self.classes {
                    Some(c) => c,
                    None => return Ok(None),
                };
                let mut counts = vec![0usize; classes.len()];
                let mut any = false;
                for vote in votes {
                    let idx = self
                        .class_index
                        .get(&label_key(vote))
                        .ok_or(StreamwiseError::UnknownLabel(vote))?;
                    counts[*idx] += 1;
                    any = true;
                }
                if !any {
                    return Ok(None);
                }
                // Ties go to the class declared first.
                let mut best = 0;
                for (i, c) in counts.iter().enumerate() {
                    if *c > counts[best] {
                        best = i;
                    }
                }
                Ok(Some(classes[best]))
            }
            TaskType::Regression => {
                let (sum, n) = votes.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                Ok(if n == 0 { None } else { Some(sum / n as f64) })
            }
        }
    }

    /// Predict every instance of a batch.
    pub fn predict(&self, batch: &Batch) -> Result<Vec<Option<f64>>, StreamwiseError> {
        self.check_batch(batch)?;
        batch.iter().map(|(x, _)| self.predict_one(x)).collect()
    }

    /// Reset every member and detector, keeping configuration and classes.
    pub fn reset(&mut self) {
        for m in self.members.iter_mut() {
            m.learner.reset();
            if let Some(d) = m.detector.as_mut() {
                d.reset();
            }
        }
    }
}

impl<L: OnlineLearner> StreamModel for AdaptiveBagging<L> {
    fn partial_fit(&mut self, batch: &Batch, classes: Option<&[f64]>) -> Result<(), StreamwiseError> {
        AdaptiveBagging::partial_fit(self, batch, classes)
    }

    fn predict(&self, batch: &Batch) -> Result<Vec<Option<f64>>, StreamwiseError> {
        AdaptiveBagging::predict(self, batch)
    }

    fn task(&self) -> TaskType {
        self.task
    }
}
