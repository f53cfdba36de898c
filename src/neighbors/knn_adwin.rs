//! KNN with ADWIN
//!
//! A [`WindowedKnn`] that tracks its own prequential error with an [`Adwin`]
//! detector. When the detector cuts its window the oldest instances of the
//! KNN window are dropped, so the instance window never spans more history than
//! the part of the stream that still looks stationary.
use crate::data::TaskType;
use crate::drift::adwin::{Adwin, AdwinConfig};
use crate::errors::StreamwiseError;
use crate::learner::{error_signal, impl_stream_model, OnlineLearner};
use crate::neighbors::knn::{KnnConfig, WindowedKnn};
use log::debug;

#[derive(Debug, Clone)]
pub struct KnnAdwin {
    knn: WindowedKnn,
    adwin: Adwin,
}

impl KnnAdwin {
    pub fn new(knn_cfg: KnnConfig, adwin_cfg: AdwinConfig) -> Result<Self, StreamwiseError> {
        Ok(KnnAdwin {
            knn: WindowedKnn::new(knn_cfg)?,
            adwin: Adwin::with_config(adwin_cfg)?,
        })
    }

    pub fn knn(&self) -> &WindowedKnn {
        &self.knn
    }

    pub fn adwin(&self) -> &Adwin {
        &self.adwin
    }
}

impl OnlineLearner for KnnAdwin {
    fn fit_one(&mut self, x: &[f64], y: f64) -> Result<(), StreamwiseError> {
        let tracked = self.knn.window().len() >= self.knn.config().n_neighbors;
        let prediction = if tracked { self.knn.predict_one(x)? } else { None };
        self.knn.fit_one(x, y)?;

        let prediction = match prediction {
            Some(p) => p,
            None => return Ok(()),
        };
        if self.adwin.add_element(error_signal(self.knn.config().task, prediction, y)) {
            let width = self.adwin.width();
            let len = self.knn.window().len();
            if width < len {
                debug!("KnnAdwin detected a change, shrinking window from {} to {}.", len, width);
                self.knn.shrink_window(len - width);
            }
        }
        Ok(())
    }

    fn predict_one(&self, x: &[f64]) -> Result<Option<f64>, StreamwiseError> {
        self.knn.predict_one(x)
    }

    fn reset(&mut self) {
        self.knn.reset();
        self.adwin.reset();
    }

    fn is_cold(&self) -> bool {
        self.knn.is_cold()
    }

    fn task(&self) -> TaskType {
        self.knn.config().task
    }
}

impl_stream_model!(KnnAdwin);
