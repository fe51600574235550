//! 二分类器实现
//!
//! 提供逻辑回归与软投票集成两种分类器，二者都按声明的特征列表顺序读取输入行。

use asthma_core::{AsthmaError, FeatureVector, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 二分类器接口
pub trait Classifier: Send + Sync {
    /// 模型声明的特征列（训练时的列顺序）
    fn feature_names(&self) -> &[String];

    /// 检查模型参数，默认不做检查
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// 返回 `[P(0), P(1)]`
    fn predict_proba(&self, row: &FeatureVector) -> Result<[f64; 2]>;

    /// 概率最大的类别，相等时取 0
    fn predict(&self, row: &FeatureVector) -> Result<u8> {
        let [p0, p1] = self.predict_proba(row)?;
        Ok(if p1 > p0 { 1 } else { 0 })
    }
}

/// 标准化参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn transform(&self, idx: usize, value: f64) -> Result<f64> {
        match (self.mean.get(idx), self.scale.get(idx)) {
            (Some(mean), Some(scale)) if *scale == 0.0 => Ok(value - mean),
            (Some(mean), Some(scale)) => Ok((value - mean) / scale),
            _ => Err(AsthmaError::Inference(format!(
                "scaler has no entry for feature index {}",
                idx
            ))),
        }
    }
}

/// 逻辑回归
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl LogisticRegression {
    fn decision_function(&self, values: &[f64]) -> Result<f64> {
        if values.len() != self.coefficients.len() {
            return Err(AsthmaError::Inference(format!(
                "model has {} coefficients for {} features",
                self.coefficients.len(),
                values.len()
            )));
        }

        let mut linear = self.intercept;
        for (idx, (value, coef)) in values.iter().zip(&self.coefficients).enumerate() {
            let x = match &self.scaler {
                Some(scaler) => scaler.transform(idx, *value)?,
                None => *value,
            };
            linear += x * coef;
        }
        Ok(linear)
    }
}

impl Classifier for LogisticRegression {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// 检查参数与特征列是否一致
    fn validate(&self) -> Result<()> {
        validate_feature_names(&self.feature_names)?;

        let n = self.feature_names.len();
        if self.coefficients.len() != n {
            return Err(AsthmaError::Model(format!(
                "expected {} coefficients, found {}",
                n,
                self.coefficients.len()
            )));
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(AsthmaError::Model(format!(
                    "scaler must have {} entries (mean: {}, scale: {})",
                    n,
                    scaler.mean.len(),
                    scaler.scale.len()
                )));
            }
            if !all_finite(&scaler.mean) || !all_finite(&scaler.scale) {
                return Err(AsthmaError::Model("scaler contains non-finite values".to_string()));
            }
        }
        if !all_finite(&self.coefficients) || !self.intercept.is_finite() {
            return Err(AsthmaError::Model(
                "coefficients contain non-finite values".to_string(),
            ));
        }

        Ok(())
    }

    fn predict_proba(&self, row: &FeatureVector) -> Result<[f64; 2]> {
        check_row(&self.feature_names, row)?;
        let p1 = sigmoid(self.decision_function(row.values())?);
        Ok([1.0 - p1, p1])
    }
}

/// 软投票集成：成员概率按权重取平均
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftVotingEnsemble {
    pub feature_names: Vec<String>,
    pub estimators: Vec<LogisticRegression>,
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

impl Classifier for SoftVotingEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn validate(&self) -> Result<()> {
        validate_feature_names(&self.feature_names)?;

        if self.estimators.is_empty() {
            return Err(AsthmaError::Model("ensemble has no estimators".to_string()));
        }
        for (idx, estimator) in self.estimators.iter().enumerate() {
            estimator.validate()?;
            if estimator.feature_names != self.feature_names {
                return Err(AsthmaError::Model(format!(
                    "estimator {} declares a different feature list",
                    idx
                )));
            }
        }
        if let Some(weights) = &self.weights {
            if weights.len() != self.estimators.len() {
                return Err(AsthmaError::Model(format!(
                    "expected {} weights, found {}",
                    self.estimators.len(),
                    weights.len()
                )));
            }
            if !all_finite(weights) || weights.iter().any(|w| *w < 0.0) {
                return Err(AsthmaError::Model(
                    "weights must be finite and non-negative".to_string(),
                ));
            }
            if weights.iter().sum::<f64>() == 0.0 {
                return Err(AsthmaError::Model("weights sum to zero".to_string()));
            }
        }

        Ok(())
    }

    fn predict_proba(&self, row: &FeatureVector) -> Result<[f64; 2]> {
        check_row(&self.feature_names, row)?;

        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for (idx, estimator) in self.estimators.iter().enumerate() {
            let weight = match &self.weights {
                Some(weights) => *weights.get(idx).ok_or_else(|| {
                    AsthmaError::Inference(format!("no weight for estimator {}", idx))
                })?,
                None => 1.0,
            };
            let [_, p1] = estimator.predict_proba(row)?;
            weighted += weight * p1;
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            return Err(AsthmaError::Inference("ensemble weights sum to zero".to_string()));
        }
        let p1 = weighted / total_weight;
        Ok([1.0 - p1, p1])
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn validate_feature_names(names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(AsthmaError::Model("feature list is empty".to_string()));
    }
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(AsthmaError::Model(format!("duplicate feature: {}", name)));
        }
    }
    Ok(())
}

/// 输入行必须与声明的特征列完全一致
fn check_row(expected: &[String], row: &FeatureVector) -> Result<()> {
    if row.columns() != expected {
        return Err(AsthmaError::Inference(format!(
            "feature columns {:?} do not match model features {:?}",
            row.columns(),
            expected
        )));
    }
    if let Some((name, value)) = row.iter().find(|(_, v)| !v.is_finite()) {
        return Err(AsthmaError::Inference(format!(
            "feature {} has non-finite value {}",
            name, value
        )));
    }
    Ok(())
}
