use serde::{Deserialize, Serialize};

/// 列映射配置 (由列映射界面生成，传入解析器)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub header_row: usize,              // 表头行索引 (0-based)
    pub part_col: usize,                // 料号列
    pub qty_col: usize,                 // 数量列
    #[serde(default)]
    pub box_col: Option<usize>,         // 箱号列 (None = 不使用)
    #[serde(default)]
    pub name_col: Option<usize>,        // 名称列 (BOM 专用)
    #[serde(default)]
    pub substitute_col: Option<usize>,  // 替代料列 (BOM 专用)
    #[serde(default)]
    pub stream_parse: bool,             // 是否启用流式分箱
}

impl MappingConfig {
    pub fn new(header_row: usize, part_col: usize, qty_col: usize) -> Self {
        Self {
            header_row,
            part_col,
            qty_col,
            box_col: None,
            name_col: None,
            substitute_col: None,
            stream_parse: false,
        }
    }

    pub fn with_box_col(mut self, col: usize) -> Self {
        self.box_col = Some(col);
        self
    }

    pub fn with_name_col(mut self, col: usize) -> Self {
        self.name_col = Some(col);
        self
    }

    pub fn with_substitute_col(mut self, col: usize) -> Self {
        self.substitute_col = Some(col);
        self
    }

    pub fn streaming(mut self) -> Self {
        self.stream_parse = true;
        self
    }

    /// 数据行至少需要的单元格数量
    pub fn min_row_len(&self) -> usize {
        self.part_col.max(self.qty_col) + 1
    }

    pub fn parse_mode(&self) -> ParseMode {
        if self.stream_parse {
            ParseMode::Stream
        } else {
            ParseMode::Standard
        }
    }
}

/// 解析模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    Standard,
    Stream,
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "标准列模式"),
            Self::Stream => write!(f, "流式分箱模式"),
        }
    }
}

/// 表格类型: BOM 或待核对清单
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    Bom,
    Checklist,
}

/// 解析诊断 (仅供展示，不阻断后续流程)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    pub label: String,
    pub header_row: usize,   // 1-based
    pub parse_mode: ParseMode,
    pub total_rows: usize,   // 表头之后扫描的行数
    pub parsed_items: usize,
    pub skipped_rows: usize,
    pub marker_rows: usize,  // 流式模式下被箱号标记消耗的行
}
