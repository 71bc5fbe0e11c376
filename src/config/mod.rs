// ==========================================
// 工厂不良预测分析系统 - 配置层
// ==========================================
// 职责: 显式配置值对象,各组件在构造时注入所需分节
// 红线: 不使用全局可变配置
// ==========================================

pub mod settings;

pub use settings::{
    AppConfig, DataSourceConfig, MlConfig, ProductionSourceConfig, RankingActionRule,
    RankingConfig, StorageConfig,
};

// ==========================================
// 韩语停用词
// ==========================================
// 形态素分词结果中过滤的高频无信息词
pub const KOREAN_STOP_WORDS: &[&str] = &[
    "이다", "있", "하", "것", "들", "그", "되", "수", "이", "보", "않", "없", "나", "사람",
    "주", "아", "등", "같", "우리", "때", "년", "가", "한", "지", "대하", "오", "말", "일",
    "그렇", "위하",
];
