//! 预测适配器
//!
//! 对分类器做一次 `predict_proba` + `predict` 调用，失败直接返回，不重试。

use crate::artifact::load_model;
use crate::classifier::Classifier;
use asthma_core::{AsthmaError, FeatureVector, PredictionResult, Result};
use std::path::Path;
use tracing::debug;

pub struct Predictor {
    classifier: Box<dyn Classifier>,
}

impl Predictor {
    /// 包装分类器；参数不一致时返回模型错误
    pub fn new(classifier: Box<dyn Classifier>) -> Result<Self> {
        classifier.validate()?;
        Ok(Self { classifier })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(load_model(path)?)
    }

    /// 模型声明的特征列
    pub fn feature_names(&self) -> &[String] {
        self.classifier.feature_names()
    }

    /// 单行推理
    pub fn predict(&self, row: &FeatureVector) -> Result<PredictionResult> {
        let [_, probability] = self.classifier.predict_proba(row)?;
        let label = self.classifier.predict(row)?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(AsthmaError::Inference(format!(
                "probability {} is outside [0, 1]",
                probability
            )));
        }
        if label > 1 {
            return Err(AsthmaError::Inference(format!("unexpected label {}", label)));
        }

        debug!("Prediction: label={} probability={:.4}", label, probability);
        Ok(PredictionResult { label, probability })
    }
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("features", &self.feature_names())
            .finish()
    }
}
