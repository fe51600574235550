//! 通用工具函数

/// 按小数位数舍入，以浮点数的精确十进制值为准（与 Python `round` 一致）
pub fn round_to(value: f64, places: u32) -> f64 {
    format!("{:.*}", places as usize, value)
        .parse()
        .unwrap_or(value)
}

/// 在闭区间内
pub fn in_range(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && value >= min && value <= max
}
