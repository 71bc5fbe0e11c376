// ==========================================
// 工厂不良预测分析系统 - 形态素分词协作者
// ==========================================
// 职责: 韩语文本 → 形态素/词 序列
// 约定: 分词是外部能力,以 trait 注入; 核心只依赖确定性输出
// ==========================================

/// 形态素分词协作者
///
/// 生产部署注入真实形态素分析器 (如 MeCab 的进程外封装);
/// 本仓库自带的实现只做确定性的空白/标点切分,供离线运行与测试使用。
pub trait MorphemeSegmenter {
    /// 将一段原生语言文本切为 token 序列
    ///
    /// 必须是确定性的: 同一输入永远返回同一序列
    fn segment(&self, text: &str) -> Vec<String>;
}

// ==========================================
// WhitespaceSegmenter - 内置回退分词器
// ==========================================
// 按空白与标点切分,不做词干化
pub struct WhitespaceSegmenter;

impl MorphemeSegmenter for WhitespaceSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        text.split(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '-'))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_segmenter_basic() {
        let seg = WhitespaceSegmenter;
        let tokens = seg.segment("체결 불량, 재작업");
        assert_eq!(tokens, vec!["체결", "불량", "재작업"]);
    }

    #[test]
    fn test_whitespace_segmenter_deterministic() {
        let seg = WhitespaceSegmenter;
        let text = "누수 부위 재검사";
        assert_eq!(seg.segment(text), seg.segment(text));
    }

    #[test]
    fn test_whitespace_segmenter_empty() {
        let seg = WhitespaceSegmenter;
        assert!(seg.segment("   ").is_empty());
    }
}
