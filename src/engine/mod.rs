// ==========================================
// 工厂不良预测分析系统 - 分析引擎层
// ==========================================
// 特征化 / 编码 / 权重 / 分类 / 排名 / 流水线编排
// ==========================================

pub mod classifier;
pub mod encoder;
pub mod error;
pub mod featurizer;
pub mod orchestrator;
pub mod ranker;
pub mod segmenter;
pub mod weighter;

pub use classifier::{DefectClassifier, ModelBundle, PredictQuery, TrainReport};
pub use encoder::LabelEncoder;
pub use error::{EngineError, EngineResult};
pub use featurizer::{TextFeaturizer, Vocabulary};
pub use orchestrator::{DefectPipeline, PipelineOutcome};
pub use ranker::PriorityRanker;
pub use segmenter::{MorphemeSegmenter, WhitespaceSegmenter};
pub use weighter::ProductionWeighter;
