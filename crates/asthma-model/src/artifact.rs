//! 模型文件格式与加载
//!
//! 模型以 JSON 描述，通过 `kind` 字段区分分类器类型：
//!
//! ```json
//! { "kind": "logistic_regression", "feature_names": ["Age", "BMI"],
//!   "coefficients": [0.01, 0.02], "intercept": -1.5 }
//! ```

use crate::classifier::{Classifier, LogisticRegression, SoftVotingEnsemble};
use asthma_core::{AsthmaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// 模型文件内容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegression),
    SoftVoting(SoftVotingEnsemble),
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AsthmaError::Model(format!("malformed model artifact: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ModelArtifact::LogisticRegression(model) => model.validate(),
            ModelArtifact::SoftVoting(model) => model.validate(),
        }
    }

    /// 校验后转换为分类器
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>> {
        self.validate()?;
        Ok(match self {
            ModelArtifact::LogisticRegression(model) => Box::new(model),
            ModelArtifact::SoftVoting(model) => Box::new(model),
        })
    }
}

/// 从文件加载模型；文件缺失或损坏均视为模型错误
pub fn load_model(path: impl AsRef<Path>) -> Result<Box<dyn Classifier>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| {
        AsthmaError::Model(format!("cannot read model artifact {}: {}", path.display(), e))
    })?;

    let classifier = ModelArtifact::from_json(&json)?.into_classifier()?;
    info!(
        "Model loaded from {} ({} features)",
        path.display(),
        classifier.feature_names().len()
    );
    Ok(classifier)
}
