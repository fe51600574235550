//! 风险解读
//!
//! 由预测结果和患者输入推导风险等级、年龄段、主要风险因素和建议处置。
//! 风险因素按原始取值排序，不代表模型的特征重要性。

use asthma_core::{
    feature, AgeGroup, FeatureVector, PatientInput, PredictionResult, RiskLevel, SuggestedAction,
};
use serde::Serialize;

/// 参与排序的候选风险因素（顺序即并列时的先后）
pub const RISK_FACTOR_CANDIDATES: [&str; 8] = [
    feature::PET_ALLERGY,
    feature::POLLEN_EXPOSURE,
    feature::DUST_EXPOSURE,
    feature::POLLUTION_EXPOSURE,
    feature::SMOKING,
    feature::SYMPTOM_SCORE,
    feature::HISTORY_OF_ALLERGIES,
    feature::FAMILY_HISTORY_ASTHMA,
];

const TOP_RISK_COUNT: usize = 3;

/// 解读结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub risk_percent: f64,
    pub risk_level: RiskLevel,
    pub age_group: AgeGroup,
    pub top_risks: Vec<String>,
    pub action: SuggestedAction,
}

impl Narrative {
    pub fn top_risks_joined(&self) -> String {
        self.top_risks.join(", ")
    }
}

pub fn risk_level(risk_percent: f64) -> RiskLevel {
    if risk_percent < 30.0 {
        RiskLevel::Low
    } else if risk_percent < 70.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

pub fn age_group(age: u32) -> AgeGroup {
    if age < 13 {
        AgeGroup::Child
    } else if age < 60 {
        AgeGroup::Adult
    } else {
        AgeGroup::Senior
    }
}

pub fn suggested_action(risk_percent: f64) -> SuggestedAction {
    if risk_percent >= 70.0 {
        SuggestedAction::UrgentReferral
    } else if risk_percent >= 40.0 {
        SuggestedAction::LungFunctionTest
    } else {
        SuggestedAction::NoAction
    }
}

/// 取值最高的三个候选因素；只考虑模型特征中存在的候选，并列按候选顺序
pub fn top_risk_factors(row: &FeatureVector) -> Vec<String> {
    let mut ranked: Vec<(&str, f64)> = RISK_FACTOR_CANDIDATES
        .iter()
        .filter_map(|name| row.get(name).map(|value| (*name, value)))
        .collect();

    // sort_by 是稳定排序
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(TOP_RISK_COUNT)
        .map(|(name, _)| name.to_string())
        .collect()
}

pub fn narrate(prediction: &PredictionResult, input: &PatientInput, row: &FeatureVector) -> Narrative {
    let risk_percent = prediction.risk_percent();

    Narrative {
        risk_percent,
        risk_level: risk_level(risk_percent),
        age_group: age_group(input.age),
        top_risks: top_risk_factors(row),
        action: suggested_action(risk_percent),
    }
}
