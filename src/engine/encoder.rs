// ==========================================
// 工厂不良预测分析系统 - 类别标签编码器
// ==========================================
// 职责: 类别值 ↔ 整数编码
// 约定: 训练期未见过的值编入专用 "未知" 桶,预测期绝不报错
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// LabelEncoder - 标签编码器
// ==========================================
// classes 排序存储,查找用二分,序列化后无需重建索引
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// 从训练值集合拟合编码器 (去重 + 排序,保证编码稳定)
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// 已知类别数 (不含未知桶)
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// 编码空间大小 (含未知桶)
    pub fn num_codes(&self) -> usize {
        self.classes.len() + 1
    }

    /// 未知桶编码
    pub fn unknown_code(&self) -> usize {
        self.classes.len()
    }

    /// 精确编码: 未见过的值返回 None
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(value)).ok()
    }

    /// 降级编码: 未见过的值编入未知桶并告警
    pub fn encode_or_unknown(&self, value: &str, field: &str) -> usize {
        match self.encode(value) {
            Some(code) => code,
            None => {
                tracing::warn!("未知类别值,使用未知桶: 字段={} 值={}", field, value);
                self.unknown_code()
            }
        }
    }

    /// 解码 (未知桶返回 None)
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_encode_decode() {
        let encoder = LabelEncoder::fit(["DRAGON", "GAIA-P", "DRAGON"]);
        assert_eq!(encoder.num_classes(), 2);

        let code = encoder.encode("DRAGON").unwrap();
        assert_eq!(encoder.decode(code), Some("DRAGON"));
    }

    #[test]
    fn test_unknown_bucket() {
        let encoder = LabelEncoder::fit(["DRAGON"]);
        assert_eq!(encoder.encode("WET 1000"), None);
        assert_eq!(
            encoder.encode_or_unknown("WET 1000", "제품명"),
            encoder.unknown_code()
        );
        assert_eq!(encoder.decode(encoder.unknown_code()), None);
    }

    #[test]
    fn test_encoding_stable_across_input_order() {
        let a = LabelEncoder::fit(["B", "A", "C"]);
        let b = LabelEncoder::fit(["C", "B", "A"]);
        assert_eq!(a, b);
        assert_eq!(a.encode("B"), b.encode("B"));
    }

    #[test]
    fn test_serde_roundtrip_keeps_codes() {
        let encoder = LabelEncoder::fit(["가압검사", "출하검사"]);
        let json = serde_json::to_string(&encoder).unwrap();
        let back: LabelEncoder = serde_json::from_str(&json).unwrap();
        assert_eq!(encoder.encode("가압검사"), back.encode("가압검사"));
    }
}
