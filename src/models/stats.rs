use serde::{Deserialize, Serialize};

/// 单份清单的核对统计 (核对完成后一次性计算，之后只读)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub label: String,
    pub total_items: usize,
    pub bom_items_count: usize,
    pub ok_count: usize,
    pub ng_count: usize,
    pub ok_main_only: usize,
    pub ok_with_substitute: usize,
    pub substitute_used_count: usize,
    pub ng_qty_difference: usize,
    pub ng_missing: usize,
    pub ng_not_in_bom: usize,
    pub pass_rate: f64, // 0..=100
}

/// 整次核对的汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub bom_item_count: usize,
    pub checklists: Vec<RunStats>,
    pub total_substitute_ok: usize, // 各清单 "含替料OK" 之和
}

/// 汇总表的一行 (项目 / 值)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "项目")]
    pub item: String,
    #[serde(rename = "值")]
    pub value: String,
}

impl SummaryRow {
    pub fn new(item: impl Into<String>, value: impl ToString) -> Self {
        Self {
            item: item.into(),
            value: value.to_string(),
        }
    }
}
