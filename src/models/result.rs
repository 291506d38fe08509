use serde::{Deserialize, Serialize};

/// 五种判定状态 (互斥且完备)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Ok,
    OkWithSubstitute,
    NgQuantityDifference,
    NgMissing,
    NgNotInBom,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 5] = [
        MatchStatus::Ok,
        MatchStatus::OkWithSubstitute,
        MatchStatus::NgQuantityDifference,
        MatchStatus::NgMissing,
        MatchStatus::NgNotInBom,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::OkWithSubstitute => "OK_WITH_SUBSTITUTE",
            Self::NgQuantityDifference => "NG_QUANTITY_DIFFERENCE",
            Self::NgMissing => "NG_MISSING",
            Self::NgNotInBom => "NG_NOT_IN_BOM",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// 比对结果: 每个 BOM 料号一行，清单多出的料号各一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareRecord {
    pub work_order: String,
    pub part_id: String,
    pub part_name: String,
    pub bom_quantity: f64,
    pub actual_quantity: f64,
    pub difference: f64,               // actual - bom
    pub status: MatchStatus,
    pub status_label: String,          // 展示文本，OK/NG 判定只看前缀
    pub box_sources: Vec<String>,      // 去重, 按 (长度, 字典序) 排序
    pub matched_substitutes: Vec<String>,
    pub remark: String,
    pub bom_row: Option<usize>,        // BOM 原表行号; BOM 无时为 None
    pub source_rows: Vec<usize>,       // 参与计数的清单行号
}

impl CompareRecord {
    pub fn is_pass(&self) -> bool {
        self.status_label.starts_with("OK")
    }

    pub fn is_ng(&self) -> bool {
        self.status_label.starts_with("NG")
    }
}

/// 报表数据行 (交给外部 Excel 渲染器的列契约)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareRow {
    #[serde(rename = "工单号")]
    pub work_order: String,
    #[serde(rename = "料号")]
    pub part_id: String,
    #[serde(rename = "名称")]
    pub part_name: String,
    #[serde(rename = "BOM数量")]
    pub bom_quantity: String,
    #[serde(rename = "清单实收")]
    pub actual_quantity: String,
    #[serde(rename = "差异")]
    pub difference: String,
    #[serde(rename = "判定结果")]
    pub status: String,
    #[serde(rename = "箱号溯源")]
    pub box_sources: String,
    #[serde(rename = "备注")]
    pub remark: String,
}
