// Modules
pub mod constants;
pub mod data;
pub mod drift;
pub mod ensemble;
pub mod errors;
pub mod evaluation;
pub mod learner;
pub mod metric;
pub mod neighbors;
pub mod sampler;
pub mod stream;
pub mod utils;

// Individual classes, and functions
pub use data::{Batch, TaskType};
pub use drift::{Adwin, AdwinConfig};
pub use ensemble::{AdaptiveBagging, ConfigIO, EnsembleConfig};
pub use errors::StreamwiseError;
pub use evaluation::{EvaluationSummary, EvaluatorConfig, PrequentialEvaluator, StreamSpeedEvaluator};
pub use learner::{OnlineLearner, StreamModel};
pub use metric::Metric;
pub use neighbors::{DistanceMetric, KnnAdwin, KnnConfig, WindowedKnn};
pub use stream::{ArrayStream, ConceptDriftStream, DataStream, SeaConfig, SeaGenerator};
