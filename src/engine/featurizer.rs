// ==========================================
// 工厂不良预测分析系统 - 文本特征化器
// ==========================================
// 职责: 不良内容文本 → 定长 tf-idf 特征向量
// 约定: 词汇表每次运行从当期语料重建,不做增量持久化;
//       特征向量只在同一次运行内可比
// ==========================================

use crate::config::MlConfig;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::segmenter::MorphemeSegmenter;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ==========================================
// 混合文本分词
// ==========================================
// - ASCII 技术词 (公司缩写/部品名): 整词保留,小写化做大小写归一
// - 韩语片段: 交给注入的形态素分词器,过滤停用词与单字
pub fn tokenize(
    text: &str,
    segmenter: &dyn MorphemeSegmenter,
    stop_words: &HashSet<String>,
) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut ascii_run = String::new();
    let mut native_run = String::new();

    let mut flush_ascii = |run: &mut String, out: &mut Vec<String>| {
        if run.chars().count() > 1 && run.chars().any(|c| c.is_ascii_alphabetic()) {
            out.push(run.to_lowercase());
        }
        run.clear();
    };

    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            if !native_run.is_empty() {
                native_run.push(' ');
            }
            ascii_run.push(c);
        } else if !c.is_ascii() {
            flush_ascii(&mut ascii_run, &mut tokens);
            native_run.push(c);
        } else {
            // ASCII 分隔符: 同时断开两类 run
            flush_ascii(&mut ascii_run, &mut tokens);
            if !native_run.is_empty() {
                native_run.push(' ');
            }
        }
    }
    flush_ascii(&mut ascii_run, &mut tokens);

    // 韩语片段整体送分词器 (空白已标记 run 边界)
    if !native_run.trim().is_empty() {
        for token in segmenter.segment(&native_run) {
            if token.chars().count() > 1 && !stop_words.contains(&token) {
                tokens.push(token);
            }
        }
    }

    tokens
}

// ==========================================
// Vocabulary - 当期词汇表
// ==========================================
// 与分类器同捆绑包持久化; 脱离词汇表的分类器无法变换新输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// 排序后的词项 (二分查找)
    terms: Vec<String>,
    /// 与 terms 对齐的 idf 值
    idf: Vec<f64>,
    /// 拟合时使用的停用词 (保证变换一致性)
    stop_words: HashSet<String>,
    /// 拟合语料的文档数
    doc_count: usize,
}

impl Vocabulary {
    /// 特征向量长度
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// 词项清单 (特征重要度报告用)
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// 文本 → 定长 tf-idf 向量 (l2 归一化)
    ///
    /// 词汇表外的 token 直接忽略 (不影响向量长度)
    pub fn vectorize(&self, text: &str, segmenter: &dyn MorphemeSegmenter) -> Vec<f64> {
        let mut vector = vec![0.0; self.terms.len()];
        if self.terms.is_empty() {
            return vector;
        }

        for token in tokenize(text, segmenter, &self.stop_words) {
            if let Ok(idx) = self.terms.binary_search(&token) {
                vector[idx] += 1.0;
            }
        }

        for (idx, value) in vector.iter_mut().enumerate() {
            *value *= self.idf[idx];
        }

        let norm: f64 = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in vector.iter_mut() {
                *value /= norm;
            }
        }

        vector
    }
}

// ==========================================
// TextFeaturizer - 文本特征化器
// ==========================================
pub struct TextFeaturizer {
    min_df: usize,
    max_df: f64,
    max_features: usize,
    stop_words: HashSet<String>,
}

impl TextFeaturizer {
    pub fn new(config: &MlConfig) -> Self {
        Self {
            min_df: config.min_df,
            max_df: config.max_df,
            max_features: config.max_features,
            stop_words: crate::config::KOREAN_STOP_WORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// 从当期语料拟合词汇表
    ///
    /// 过滤规则:
    /// - 文档频率 < min_df 或 > max_df × 文档数 的词项剔除
    /// - 超出 max_features 时按 (文档频率降序, 词项升序) 截断
    pub fn fit(
        &self,
        corpus: &[&str],
        segmenter: &dyn MorphemeSegmenter,
    ) -> EngineResult<Vocabulary> {
        if corpus.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }

        let doc_count = corpus.len();
        let mut df: HashMap<String, usize> = HashMap::new();
        for text in corpus {
            let unique: HashSet<String> =
                tokenize(text, segmenter, &self.stop_words).into_iter().collect();
            for token in unique {
                *df.entry(token).or_insert(0) += 1;
            }
        }

        let max_df_count = (self.max_df * doc_count as f64).floor() as usize;
        let mut candidates: Vec<(String, usize)> = df
            .into_iter()
            .filter(|(_, count)| *count >= self.min_df && *count <= max_df_count.max(1))
            .collect();

        // 词汇表规模上限: 高频优先,同频按词项字典序 (确定性截断)
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        candidates.truncate(self.max_features);

        // 二分查找要求词项有序
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        if candidates.is_empty() {
            tracing::warn!("词汇表为空: 语料 {} 篇均未产生达标词项", doc_count);
        }

        let terms: Vec<String> = candidates.iter().map(|(t, _)| t.clone()).collect();
        let idf: Vec<f64> = candidates
            .iter()
            .map(|(_, count)| (((1 + doc_count) as f64) / ((1 + count) as f64)).ln() + 1.0)
            .collect();

        tracing::info!("词汇表构建完成: {} 词项 / {} 篇语料", terms.len(), doc_count);

        Ok(Vocabulary {
            terms,
            idf,
            stop_words: self.stop_words.clone(),
            doc_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::segmenter::WhitespaceSegmenter;

    fn featurizer(min_df: usize) -> TextFeaturizer {
        TextFeaturizer::new(&MlConfig {
            min_df,
            ..MlConfig::default()
        })
    }

    #[test]
    fn test_tokenize_mixed_script() {
        let stop_words = HashSet::new();
        let tokens = tokenize(
            "Speed Controller LEAK 체결 불량",
            &WhitespaceSegmenter,
            &stop_words,
        );
        // ASCII 词小写化整词保留, 韩语词走分词器
        assert!(tokens.contains(&"speed".to_string()));
        assert!(tokens.contains(&"leak".to_string()));
        assert!(tokens.contains(&"체결".to_string()));
        assert!(tokens.contains(&"불량".to_string()));
    }

    #[test]
    fn test_tokenize_case_insensitive_abbreviations() {
        let stop_words = HashSet::new();
        let a = tokenize("LEAK", &WhitespaceSegmenter, &stop_words);
        let b = tokenize("leak", &WhitespaceSegmenter, &stop_words);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tokenize_keeps_hyphenated_part_names() {
        let stop_words = HashSet::new();
        let tokens = tokenize("O-RING 변형", &WhitespaceSegmenter, &stop_words);
        assert!(tokens.contains(&"o-ring".to_string()));
    }

    #[test]
    fn test_tokenize_filters_stop_words_and_single_chars() {
        let stop_words: HashSet<String> = ["불량".to_string()].into_iter().collect();
        let tokens = tokenize("불량 체결 가", &WhitespaceSegmenter, &stop_words);
        assert_eq!(tokens, vec!["체결".to_string()]);
    }

    #[test]
    fn test_fit_respects_df_bounds() {
        let corpus = vec![
            "leak 발생 누수",
            "leak 체결",
            "leak 누수 재발",
            "압력 점검",
        ];
        let vocab = featurizer(2).fit(&corpus, &WhitespaceSegmenter).unwrap();

        // leak(3/4=75%) 与 누수(2) 达标; 체결(1) 低于 min_df=2 剔除
        assert!(vocab.terms().contains(&"leak".to_string()));
        assert!(vocab.terms().contains(&"누수".to_string()));
        assert!(!vocab.terms().contains(&"체결".to_string()));
    }

    #[test]
    fn test_fit_drops_terms_above_max_df() {
        // 출현率 100% > max_df=0.85 的词项剔除
        let corpus = vec!["leak 누수", "leak 체결", "leak 삽입", "leak 점검"];
        let vocab = featurizer(1).fit(&corpus, &WhitespaceSegmenter).unwrap();
        assert!(!vocab.terms().contains(&"leak".to_string()));
    }

    #[test]
    fn test_vectorize_fixed_length_and_l2_norm() {
        let corpus = vec!["leak 누수 발생", "leak 누수", "체결 발생 leak"];
        let vocab = featurizer(2).fit(&corpus, &WhitespaceSegmenter).unwrap();

        let v1 = vocab.vectorize("leak 누수", &WhitespaceSegmenter);
        let v2 = vocab.vectorize("unseen token", &WhitespaceSegmenter);
        assert_eq!(v1.len(), vocab.len());
        assert_eq!(v2.len(), vocab.len());

        let norm: f64 = v1.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
        // 词汇表外 token 产生零向量
        assert!(v2.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_fit_empty_corpus_is_error() {
        let result = featurizer(2).fit(&[], &WhitespaceSegmenter);
        assert!(matches!(result, Err(EngineError::EmptyCorpus)));
    }

    #[test]
    fn test_vocabulary_serde_roundtrip() {
        let corpus = vec!["leak 누수", "체결 발생", "삽입 점검"];
        let vocab = featurizer(1).fit(&corpus, &WhitespaceSegmenter).unwrap();
        assert!(!vocab.is_empty());

        let json = serde_json::to_string(&vocab).unwrap();
        let back: Vocabulary = serde_json::from_str(&json).unwrap();

        let a = vocab.vectorize("leak 누수", &WhitespaceSegmenter);
        let b = back.vectorize("leak 누수", &WhitespaceSegmenter);
        assert_eq!(a, b);
        assert!(a.iter().any(|v| *v > 0.0));
    }
}
