//! # 风险评估模块
//!
//! 一次评估的完整流程：
//! - 特征组装：把表单输入映射到模型声明的特征列，计算 FEV1/FVC 比值
//! - 预测：调用预测适配器得到标签和概率
//! - 风险解读：风险等级、年龄段、主要风险因素和建议处置
//! - 生成评估记录，交给记录库保存

pub mod assembler;
pub mod engine;
pub mod narrator;

pub use assembler::{assemble, fev1_fvc_ratio, named_inputs};
pub use engine::{Assessment, AssessmentEngine, AssessmentRequest};
pub use narrator::{narrate, top_risk_factors, Narrative, RISK_FACTOR_CANDIDATES};
