//! 核心数据模型定义

use crate::error::{AsthmaError, Result};
use crate::utils::in_range;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 特征列名（与训练时的列名一致）
pub mod feature {
    pub const AGE: &str = "Age";
    pub const BMI: &str = "BMI";
    pub const PHYSICAL_ACTIVITY: &str = "PhysicalActivity";
    pub const DIET_QUALITY: &str = "DietQuality";
    pub const SLEEP_QUALITY: &str = "SleepQuality";
    pub const POLLUTION_EXPOSURE: &str = "PollutionExposure";
    pub const POLLEN_EXPOSURE: &str = "PollenExposure";
    pub const DUST_EXPOSURE: &str = "DustExposure";
    pub const LUNG_FUNCTION_FEV1: &str = "LungFunctionFEV1";
    pub const LUNG_FUNCTION_FVC: &str = "LungFunctionFVC";
    pub const FEV1_FVC_RATIO: &str = "FEV1_FVC_Ratio";
    pub const SYMPTOM_SCORE: &str = "SymptomScore";
    pub const SMOKING: &str = "Smoking";
    pub const PET_ALLERGY: &str = "PetAllergy";
    pub const FAMILY_HISTORY_ASTHMA: &str = "FamilyHistoryAsthma";
    pub const HISTORY_OF_ALLERGIES: &str = "HistoryOfAllergies";
}

/// 表单采集的患者指标
///
/// 每次提交后不再修改。评分类字段为 0–10 的整数，标志位只取 0 或 1。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub age: u32,                  // 0–100
    pub bmi: f64,                  // 10–50
    pub physical_activity: u32,    // 0–10
    pub diet_quality: u32,         // 0–10
    pub sleep_quality: u32,        // 0–10
    pub pollution_exposure: u32,   // 0–10
    pub pollen_exposure: u32,      // 0–10
    pub dust_exposure: u32,        // 0–10
    pub fev1: f64,                 // 0.5–5.0 L
    pub fvc: f64,                  // 0.5–6.0 L
    pub symptom_score: u32,        // 0–6
    pub smoking: u8,
    pub pet_allergy: u8,
    pub family_history_asthma: u8,
    pub history_of_allergies: u8,
}

impl Default for PatientInput {
    fn default() -> Self {
        Self {
            age: 30,
            bmi: 22.5,
            physical_activity: 5,
            diet_quality: 5,
            sleep_quality: 6,
            pollution_exposure: 5,
            pollen_exposure: 5,
            dust_exposure: 5,
            fev1: 3.2,
            fvc: 4.0,
            symptom_score: 2,
            smoking: 0,
            pet_allergy: 0,
            family_history_asthma: 0,
            history_of_allergies: 0,
        }
    }
}

impl PatientInput {
    /// 校验各字段取值范围
    pub fn validate(&self) -> Result<()> {
        check_range(feature::AGE, self.age as f64, 0.0, 100.0)?;
        check_range(feature::BMI, self.bmi, 10.0, 50.0)?;

        let scores = [
            (feature::PHYSICAL_ACTIVITY, self.physical_activity),
            (feature::DIET_QUALITY, self.diet_quality),
            (feature::SLEEP_QUALITY, self.sleep_quality),
            (feature::POLLUTION_EXPOSURE, self.pollution_exposure),
            (feature::POLLEN_EXPOSURE, self.pollen_exposure),
            (feature::DUST_EXPOSURE, self.dust_exposure),
        ];
        for (name, value) in scores {
            check_range(name, value as f64, 0.0, 10.0)?;
        }

        check_range(feature::LUNG_FUNCTION_FEV1, self.fev1, 0.5, 5.0)?;
        check_range(feature::LUNG_FUNCTION_FVC, self.fvc, 0.5, 6.0)?;
        check_range(feature::SYMPTOM_SCORE, self.symptom_score as f64, 0.0, 6.0)?;

        let flags = [
            (feature::SMOKING, self.smoking),
            (feature::PET_ALLERGY, self.pet_allergy),
            (feature::FAMILY_HISTORY_ASTHMA, self.family_history_asthma),
            (feature::HISTORY_OF_ALLERGIES, self.history_of_allergies),
        ];
        for (name, value) in flags {
            if value > 1 {
                return Err(AsthmaError::Validation(format!(
                    "{} must be 0 or 1, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if in_range(value, min, max) {
        Ok(())
    } else {
        Err(AsthmaError::Validation(format!(
            "{} must be within [{}, {}], got {}",
            name, min, max, value
        )))
    }
}

/// 按列名有序排列的单行特征
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一列；同名列已存在时覆盖其值
    pub fn insert(&mut self, column: impl Into<String>, value: f64) {
        let column = column.into();
        match self.position(&column) {
            Some(idx) => self.values[idx] = value,
            None => {
                self.columns.push(column);
                self.values.push(value);
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.position(column).map(|idx| self.values[idx])
    }

    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut vector = FeatureVector::new();
        for (column, value) in iter {
            vector.insert(column, value);
        }
        vector
    }
}

/// 分类器输出
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 0 = 无哮喘, 1 = 哮喘
    pub label: u8,
    /// 阳性类概率
    pub probability: f64,
}

impl PredictionResult {
    /// 风险百分比，保留两位小数
    pub fn risk_percent(&self) -> f64 {
        crate::utils::round_to(self.probability * 100.0, 2)
    }

    pub fn diagnosis(&self) -> Diagnosis {
        if self.label == 1 {
            Diagnosis::AsthmaDetected
        } else {
            Diagnosis::NoAsthma
        }
    }
}

/// 为带固定文本标签的枚举生成 as_str / Display / FromStr
macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AsthmaError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(AsthmaError::Validation(format!(
                        "unknown {} label: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

/// 诊断结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diagnosis {
    #[serde(rename = "Asthma Detected")]
    AsthmaDetected,
    #[serde(rename = "No Asthma")]
    NoAsthma,
}

labelled_enum!(Diagnosis {
    AsthmaDetected => "Asthma Detected",
    NoAsthma => "No Asthma",
});

/// 风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

labelled_enum!(RiskLevel {
    Low => "Low Risk",
    Medium => "Medium Risk",
    High => "High Risk",
});

/// 年龄段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    Child,
    Adult,
    Senior,
}

labelled_enum!(AgeGroup {
    Child => "Child",
    Adult => "Adult",
    Senior => "Senior",
});

/// 建议处置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestedAction {
    #[serde(rename = "Refer to pulmonologist urgently.")]
    UrgentReferral,
    #[serde(rename = "Suggest lung function test.")]
    LungFunctionTest,
    #[serde(rename = "No immediate action needed.")]
    NoAction,
}

labelled_enum!(SuggestedAction {
    UrgentReferral => "Refer to pulmonologist urgently.",
    LungFunctionTest => "Suggest lung function test.",
    NoAction => "No immediate action needed.",
});

/// 一次评估的完整记录
///
/// 写入记录库后不再修改，只会被整体清空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub patient_name: String,
    pub features: FeatureVector,
    pub prediction: Diagnosis,
    pub risk_percent: f64,
    pub risk_level: RiskLevel,
    pub age_group: AgeGroup,
    pub top_risks: String,
    pub action: SuggestedAction,
    pub doctor_note: String,
}

impl AssessmentRecord {
    pub fn to_history_row(&self) -> HistoryRow {
        HistoryRow {
            patient_name: self.patient_name.clone(),
            prediction: self.prediction,
            risk_percent: self.risk_percent,
            risk_level: self.risk_level,
            age_group: self.age_group,
            top_risks: self.top_risks.clone(),
            action: self.action,
            doctor_note: self.doctor_note.clone(),
        }
    }
}

/// 历史列表展示的列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub patient_name: String,
    pub prediction: Diagnosis,
    pub risk_percent: f64,
    pub risk_level: RiskLevel,
    pub age_group: AgeGroup,
    pub top_risks: String,
    pub action: SuggestedAction,
    pub doctor_note: String,
}
