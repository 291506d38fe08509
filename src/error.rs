use thiserror::Error;

/// 核对流程错误 (行级跳过和数据质量提示都不属于错误)
#[derive(Debug, Error)]
pub enum CheckError {
    /// 料号列与数量列相同，解析前拦截
    #[error("{sheet}: 料号列和数量列不能相同 (列 {column})")]
    SameColumn { sheet: String, column: usize },

    #[error("请至少提供一个待核对清单")]
    NoChecklists,

    #[error("状态文本 '{label}' 必须以 '{prefix}' 开头")]
    InvalidStatusLabel { label: String, prefix: &'static str },

    #[error("箱号正则无效: {0}")]
    InvalidMarkerPattern(#[from] regex::Error),

    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV 导出失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("后台任务失败: {0}")]
    Task(String),
}

impl CheckError {
    /// 调用方输入问题 (而非服务内部故障)
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::SameColumn { .. } | Self::NoChecklists)
    }
}
