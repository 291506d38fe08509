use crate::error::CheckError;
use crate::models::MatchStatus;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub recon: ReconSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// 无法识别的级别回退到 INFO
    pub fn max_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

/// 核对参数: 关键词池、状态文本、箱号正则都在这里注入，不做进程级全局常量
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconSettings {
    pub tolerance: f64,           // 数量相等判定容差
    pub header_scan_rows: usize,  // Smart Anchor 最多扫描行数
    pub min_header_score: usize,  // 表头最低得分
    pub marker_scan_rows: usize,  // 预判流式分箱时扫描的行数
    pub keywords: KeywordTable,
    pub labels: StatusLabels,
    pub box_marker_patterns: Vec<String>,
}

impl Default for ReconSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            header_scan_rows: 20,
            min_header_score: 2,
            marker_scan_rows: 60,
            keywords: KeywordTable::default(),
            labels: StatusLabels::default(),
            box_marker_patterns: default_box_marker_patterns(),
        }
    }
}

/// 箱号标记正则，按顺序尝试，第 1 个捕获组为箱号
pub fn default_box_marker_patterns() -> Vec<String> {
    [
        r"第?\s*([0-9]+)\s*号?\s*箱",
        r"第?\s*([零一二三四五六七八九十百千]+)\s*号?\s*箱",
        r"[Bb]ox\s*[#№]?\s*([0-9]+)",
        r"[Cc]arton\s*[#№]?\s*([0-9]+)",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

/// 关键词池 (表头打分 + 列预判)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTable {
    pub part: Vec<String>,
    pub qty: Vec<String>,
    pub substitute: Vec<String>,
    pub name: Vec<String>,
    #[serde(rename = "box")]
    pub box_: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self {
            part: words(&[
                "编号", "料号", "物料编号", "物料号", "零件号", "材料编号",
                "Part No", "PartNo", "P/N", "PN", "Part Number", "Material No",
            ]),
            qty: words(&[
                "数量", "需求数", "用量", "需求量", "单机用量",
                "实收数", "实收", "收货数", "来货数", "发货数",
                "Qty", "QTY", "Quantity", "Required Qty", "Usage",
            ]),
            substitute: words(&[
                "替代状况", "替代料", "替代", "可替代", "代用料", "替换料",
                "Substitute", "Alt", "Alternative", "Replacement",
            ]),
            name: words(&[
                "名称", "品名", "物料名称", "零件名称", "材料名称", "品名规格",
                "Description", "Name", "Part Name", "Material Name",
            ]),
            box_: words(&[
                "箱号", "箱别", "箱序号", "箱编号",
                "Box", "Carton", "Box No", "Carton No", "Package",
            ]),
        }
    }
}

impl KeywordTable {
    /// BOM 表头打分用: 料号 + 数量 + 替代 + 名称
    pub fn bom_header(&self) -> Vec<String> {
        [&self.part, &self.qty, &self.substitute, &self.name]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }

    /// 清单表头打分用: 料号 + 数量 + 箱号
    pub fn checklist_header(&self) -> Vec<String> {
        [&self.part, &self.qty, &self.box_]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// 五种判定状态的展示文本
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusLabels {
    pub ok: String,
    pub ok_with_substitute: String,
    pub ng_qty_difference: String,
    pub ng_missing: String,
    pub ng_not_in_bom: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            ok: "OK".to_string(),
            ok_with_substitute: "OK (含替料)".to_string(),
            ng_qty_difference: "NG (数量差异)".to_string(),
            ng_missing: "NG (缺料)".to_string(),
            ng_not_in_bom: "NG (BOM无)".to_string(),
        }
    }
}

impl StatusLabels {
    pub fn label(&self, status: MatchStatus) -> &str {
        match status {
            MatchStatus::Ok => &self.ok,
            MatchStatus::OkWithSubstitute => &self.ok_with_substitute,
            MatchStatus::NgQuantityDifference => &self.ng_qty_difference,
            MatchStatus::NgMissing => &self.ng_missing,
            MatchStatus::NgNotInBom => &self.ng_not_in_bom,
        }
    }

    /// 下游筛选/高亮只看 "OK"/"NG" 前缀，文本可改但前缀必须保留
    pub fn validate(&self) -> Result<(), CheckError> {
        for status in MatchStatus::ALL {
            let label = self.label(status);
            let prefix = match status {
                MatchStatus::Ok | MatchStatus::OkWithSubstitute => "OK",
                _ => "NG",
            };
            if !label.starts_with(prefix) {
                return Err(CheckError::InvalidStatusLabel {
                    label: label.to_string(),
                    prefix,
                });
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// 加载配置: config/default → config/local → CKD__* 环境变量
    pub fn load() -> Result<Self, CheckError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("CKD").separator("__"))
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.recon.labels.validate()?;
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_labels_pass_validation() {
        assert!(StatusLabels::default().validate().is_ok());
    }

    #[test]
    fn label_without_prefix_rejected() {
        let labels = StatusLabels {
            ng_missing: "缺料".to_string(),
            ..StatusLabels::default()
        };
        let err = labels.validate().unwrap_err();
        assert!(err.to_string().contains("缺料"));
    }

    #[test]
    fn header_vocabularies() {
        let kw = KeywordTable::default();
        let bom = kw.bom_header();
        assert!(bom.contains(&"替代料".to_string()));
        assert!(!bom.contains(&"箱号".to_string()));
        let list = kw.checklist_header();
        assert!(list.contains(&"箱号".to_string()));
        assert!(!list.contains(&"替代料".to_string()));
    }

    #[test]
    fn log_level_fallback() {
        let log = LogConfig { level: "verbose".into() };
        assert_eq!(log.max_level(), tracing::Level::INFO);
        let log = LogConfig { level: "debug".into() };
        assert_eq!(log.max_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::builder()
            .add_source(File::from_str(
                "[server]\nport = 9000\n[recon]\ntolerance = 0.01\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let app: AppConfig = config.try_deserialize().unwrap();
        assert_eq!(app.server.port, 9000);
        assert_eq!(app.server.host, "127.0.0.1");
        assert_eq!(app.recon.tolerance, 0.01);
        assert_eq!(app.recon.header_scan_rows, 20);
        assert_eq!(app.recon.labels.ok_with_substitute, "OK (含替料)");
    }
}
