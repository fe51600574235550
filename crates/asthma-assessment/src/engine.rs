//! 评估引擎
//!
//! 串联特征组装、预测和风险解读，生成一条评估记录

use crate::{assembler::assemble, narrator::narrate, narrator::Narrative};
use asthma_core::{AssessmentRecord, PatientInput, PredictionResult, Result};
use asthma_model::Predictor;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

fn default_patient_name() -> String {
    "John Doe".to_string()
}

/// 表单提交内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(default = "default_patient_name")]
    pub patient_name: String,
    #[serde(default)]
    pub doctor_note: String,
    #[serde(flatten)]
    pub input: PatientInput,
}

/// 单次评估结果
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub record: AssessmentRecord,
    pub prediction: PredictionResult,
    pub narrative: Narrative,
}

/// 评估引擎
#[derive(Debug)]
pub struct AssessmentEngine {
    predictor: Predictor,
}

impl AssessmentEngine {
    pub fn new(predictor: Predictor) -> Self {
        Self { predictor }
    }

    /// 模型声明的特征列
    pub fn feature_names(&self) -> &[String] {
        self.predictor.feature_names()
    }

    /// 执行一次评估
    pub fn assess(&self, request: &AssessmentRequest) -> Result<Assessment> {
        let row = assemble(&request.input, self.predictor.feature_names()).map_err(|e| {
            warn!("Rejected input for {}: {}", request.patient_name, e);
            e
        })?;

        let prediction = self.predictor.predict(&row)?;
        let narrative = narrate(&prediction, &request.input, &row);

        info!(
            "Assessed {}: {} ({}%, {})",
            request.patient_name,
            prediction.diagnosis(),
            narrative.risk_percent,
            narrative.risk_level
        );

        let record = AssessmentRecord {
            patient_name: request.patient_name.clone(),
            features: row,
            prediction: prediction.diagnosis(),
            risk_percent: narrative.risk_percent,
            risk_level: narrative.risk_level,
            age_group: narrative.age_group,
            top_risks: narrative.top_risks_joined(),
            action: narrative.action,
            doctor_note: request.doctor_note.trim().to_string(),
        };

        Ok(Assessment {
            record,
            prediction,
            narrative,
        })
    }
}
