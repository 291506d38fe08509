use serde::{Deserialize, Serialize};

/// 待核对清单单项 (实物清点的一行)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistRecord {
    pub part_id: String,
    pub quantity: f64,     // 允许为 0: "实收 0" 是有效数据
    pub box_label: String, // 可能为空
    pub source_row: usize,
}

impl ChecklistRecord {
    pub fn new(part_id: impl Into<String>, quantity: f64) -> Self {
        Self {
            part_id: part_id.into(),
            quantity,
            box_label: String::new(),
            source_row: 0,
        }
    }

    pub fn in_box(mut self, label: impl Into<String>) -> Self {
        self.box_label = label.into();
        self
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.source_row = row;
        self
    }
}
