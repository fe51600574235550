//! 特征组装
//!
//! 输出列永远等于模型声明的特征列表，顺序一致；缺失列补 0，多余列丢弃。

use asthma_core::utils::round_to;
use asthma_core::{feature, AsthmaError, FeatureVector, PatientInput, Result};
use tracing::debug;

/// FEV1/FVC 比值，保留三位小数
pub fn fev1_fvc_ratio(fev1: f64, fvc: f64) -> Result<f64> {
    if fvc == 0.0 || !fvc.is_finite() || !fev1.is_finite() {
        return Err(AsthmaError::Validation(format!(
            "cannot compute FEV1/FVC ratio with FEV1={} FVC={}",
            fev1, fvc
        )));
    }
    Ok(round_to(fev1 / fvc, 3))
}

/// 表单输入加派生比值，按采集顺序排列
pub fn named_inputs(input: &PatientInput) -> Result<FeatureVector> {
    let ratio = fev1_fvc_ratio(input.fev1, input.fvc)?;

    Ok([
        (feature::AGE, input.age as f64),
        (feature::BMI, input.bmi),
        (feature::PHYSICAL_ACTIVITY, input.physical_activity as f64),
        (feature::DIET_QUALITY, input.diet_quality as f64),
        (feature::SLEEP_QUALITY, input.sleep_quality as f64),
        (feature::POLLUTION_EXPOSURE, input.pollution_exposure as f64),
        (feature::POLLEN_EXPOSURE, input.pollen_exposure as f64),
        (feature::DUST_EXPOSURE, input.dust_exposure as f64),
        (feature::LUNG_FUNCTION_FEV1, input.fev1),
        (feature::LUNG_FUNCTION_FVC, input.fvc),
        (feature::FEV1_FVC_RATIO, ratio),
        (feature::SYMPTOM_SCORE, input.symptom_score as f64),
        (feature::SMOKING, input.smoking as f64),
        (feature::PET_ALLERGY, input.pet_allergy as f64),
        (feature::FAMILY_HISTORY_ASTHMA, input.family_history_asthma as f64),
        (feature::HISTORY_OF_ALLERGIES, input.history_of_allergies as f64),
    ]
    .into_iter()
    .collect())
}

/// 按模型特征列重排
pub fn assemble(input: &PatientInput, expected_features: &[String]) -> Result<FeatureVector> {
    input.validate()?;
    let collected = named_inputs(input)?;

    let row: FeatureVector = expected_features
        .iter()
        .map(|name| (name.clone(), collected.get(name).unwrap_or(0.0)))
        .collect();

    debug!("Assembled feature row: {:?}", row);
    Ok(row)
}
