//! # 预测模型模块
//!
//! 加载预训练的二分类模型，并以黑盒方式提供 `predict` / `predict_proba`。

pub mod artifact;
pub mod classifier;
pub mod predictor;

pub use artifact::{load_model, ModelArtifact};
pub use classifier::{Classifier, LogisticRegression, SoftVotingEnsemble, StandardScaler};
pub use predictor::Predictor;
