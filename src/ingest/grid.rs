use crate::error::CheckError;
use crate::ingest::normalize::{
    clean_box_label, clean_part_id, clean_text, eval_quantity, extract_substitute_ids, is_empty_row,
};
use crate::ingest::stream::{parse_stream, BoxMarkers};
use crate::models::cell::cell_at;
use crate::models::{BomRecord, Cell, ChecklistRecord, MappingConfig, ParseDiagnostics, ParseMode};
use serde::Serialize;

/// 解析结果: 记录 + 诊断
#[derive(Debug, Clone, Serialize)]
pub struct ParsedSheet<T> {
    pub records: Vec<T>,
    pub diagnostics: ParseDiagnostics,
}

/// 行级跳过原因 (不是错误，只计入诊断)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    ShortRow,
    MissingPartId,
    BadQuantity,
    NonPositiveQuantity,
}

/// 解析前的配置检查: 料号列和数量列不能相同
pub fn check_mapping(sheet: &str, mapping: &MappingConfig) -> Result<(), CheckError> {
    if mapping.part_col == mapping.qty_col {
        return Err(CheckError::SameColumn {
            sheet: sheet.to_string(),
            column: mapping.part_col,
        });
    }
    Ok(())
}

/// 表头之后的数据行，附带 1-based 原表行号
fn data_rows<'a>(
    grid: &'a [Vec<Cell>],
    mapping: &MappingConfig,
) -> impl Iterator<Item = (usize, &'a [Cell])> {
    grid.iter()
        .enumerate()
        .skip(mapping.header_row + 1)
        .map(|(idx, row)| (idx + 1, row.as_slice()))
}

/// 料号 + 数量 (标准模式和流式模式共用的行检查)
pub(crate) fn read_part_and_qty(
    row: &[Cell],
    mapping: &MappingConfig,
) -> Result<(String, f64), SkipReason> {
    if is_empty_row(row) {
        return Err(SkipReason::Empty);
    }
    if row.len() < mapping.min_row_len() {
        return Err(SkipReason::ShortRow);
    }
    let part_id = clean_part_id(cell_at(row, mapping.part_col));
    if part_id.is_empty() {
        return Err(SkipReason::MissingPartId);
    }
    let qty = eval_quantity(cell_at(row, mapping.qty_col)).ok_or(SkipReason::BadQuantity)?;
    Ok((part_id, qty))
}

fn read_bom_row(
    row: &[Cell],
    row_no: usize,
    mapping: &MappingConfig,
) -> Result<BomRecord, SkipReason> {
    let (part_id, qty) = read_part_and_qty(row, mapping)?;
    // BOM 行不可能需求 0 或负数
    if qty <= 0.0 {
        return Err(SkipReason::NonPositiveQuantity);
    }

    let substitutes = mapping
        .substitute_col
        .map(|col| extract_substitute_ids(cell_at(row, col)))
        .unwrap_or_default();
    let name = mapping
        .name_col
        .map(|col| clean_text(cell_at(row, col)))
        .unwrap_or_default();

    Ok(BomRecord::new(part_id, qty, substitutes)
        .with_name(name)
        .at_row(row_no))
}

pub(crate) fn read_checklist_row(
    row: &[Cell],
    row_no: usize,
    mapping: &MappingConfig,
    box_label: String,
) -> Result<ChecklistRecord, SkipReason> {
    let (part_id, qty) = read_part_and_qty(row, mapping)?;
    Ok(ChecklistRecord::new(part_id, qty)
        .in_box(box_label)
        .at_row(row_no))
}

/// 根据列映射解析 BOM (始终是标准列模式)
pub fn parse_bom(
    grid: &[Vec<Cell>],
    mapping: &MappingConfig,
    label: &str,
) -> Result<ParsedSheet<BomRecord>, CheckError> {
    check_mapping(label, mapping)?;
    if mapping.stream_parse {
        tracing::warn!("{}: BOM 不支持流式分箱，按标准列模式解析", label);
    }

    let mut records = Vec::new();
    let mut total = 0;
    for (row_no, row) in data_rows(grid, mapping) {
        total += 1;
        match read_bom_row(row, row_no, mapping) {
            Ok(rec) => records.push(rec),
            Err(reason) => tracing::debug!("{}: 跳过第 {} 行 ({:?})", label, row_no, reason),
        }
    }

    let diagnostics = ParseDiagnostics {
        label: label.to_string(),
        header_row: mapping.header_row + 1,
        parse_mode: ParseMode::Standard,
        total_rows: total,
        parsed_items: records.len(),
        skipped_rows: total - records.len(),
        marker_rows: 0,
    };
    Ok(ParsedSheet { records, diagnostics })
}

/// 解析任意清单
///
/// * `stream_parse = false` → 标准列模式 (按 box_col 取箱号)
/// * `stream_parse = true`  → 流式分箱模式 (扫描 "第X箱" 标记行)
pub fn parse_checklist(
    grid: &[Vec<Cell>],
    mapping: &MappingConfig,
    label: &str,
    markers: &BoxMarkers,
) -> Result<ParsedSheet<ChecklistRecord>, CheckError> {
    check_mapping(label, mapping)?;
    let sheet = match mapping.parse_mode() {
        ParseMode::Standard => parse_standard(grid, mapping, label),
        ParseMode::Stream => parse_stream(grid, mapping, label, markers),
    };
    Ok(sheet)
}

fn parse_standard(
    grid: &[Vec<Cell>],
    mapping: &MappingConfig,
    label: &str,
) -> ParsedSheet<ChecklistRecord> {
    let mut records = Vec::new();
    let mut total = 0;
    for (row_no, row) in data_rows(grid, mapping) {
        total += 1;
        let box_label = mapping
            .box_col
            .map(|col| clean_box_label(cell_at(row, col)))
            .unwrap_or_default();
        match read_checklist_row(row, row_no, mapping, box_label) {
            Ok(rec) => records.push(rec),
            Err(reason) => tracing::debug!("{}: 跳过第 {} 行 ({:?})", label, row_no, reason),
        }
    }

    ParsedSheet {
        diagnostics: ParseDiagnostics {
            label: label.to_string(),
            header_row: mapping.header_row + 1,
            parse_mode: ParseMode::Standard,
            total_rows: total,
            parsed_items: records.len(),
            skipped_rows: total - records.len(),
            marker_rows: 0,
        },
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: Vec<Cell>) -> Vec<Cell> {
        cells
    }

    fn bom_grid() -> Vec<Vec<Cell>> {
        vec![
            row(vec!["物料清单".into()]),
            row(vec!["料号".into(), "名称".into(), "用量".into(), "替代料".into()]),
            row(vec![Cell::Number(1001.0), "螺丝".into(), Cell::Number(4.0), "2002/3003".into()]),
            row(vec!["'1002".into(), "垫片".into(), "2*3".into(), Cell::Empty]),
            row(vec!["1003".into(), "弹簧".into(), Cell::Number(0.0), Cell::Empty]),
            row(vec!["1004".into(), "卡扣".into(), "-1".into(), Cell::Empty]),
            row(vec![Cell::Empty, Cell::Empty]),
            row(vec!["1005".into()]),
            row(vec![Cell::Empty, "无料号".into(), Cell::Number(1.0), Cell::Empty]),
            row(vec!["1006".into(), "端子".into(), "abc".into(), Cell::Empty]),
            row(vec!["1007".into(), "导线".into(), "1.5".into(), "1007;4004".into()]),
        ]
    }

    #[test]
    fn bom_standard_parse() {
        let mapping = MappingConfig::new(1, 0, 2).with_name_col(1).with_substitute_col(3);
        let sheet = parse_bom(&bom_grid(), &mapping, "BOM").unwrap();

        let ids: Vec<_> = sheet.records.iter().map(|r| r.main_part_id.as_str()).collect();
        assert_eq!(ids, vec!["1001", "1002", "1007"]);

        let first = &sheet.records[0];
        assert_eq!(first.quantity, 4.0);
        assert_eq!(first.name, "螺丝");
        assert_eq!(first.source_row, 3);
        assert_eq!(first.substitute_ids.iter().collect::<Vec<_>>(), vec!["2002", "3003"]);

        assert_eq!(sheet.records[1].quantity, 6.0);
        assert_eq!(sheet.records[1].source_row, 4);

        // 主料号不会出现在自己的替代料里
        let last = &sheet.records[2];
        assert_eq!(last.substitute_ids.iter().collect::<Vec<_>>(), vec!["4004"]);

        let d = &sheet.diagnostics;
        assert_eq!(d.header_row, 2);
        assert_eq!(d.total_rows, 9);
        assert_eq!(d.parsed_items, 3);
        assert_eq!(d.skipped_rows, 6);
        assert_eq!(d.parse_mode, ParseMode::Standard);
    }

    #[test]
    fn same_part_and_qty_column_blocks_parse() {
        let mapping = MappingConfig::new(0, 1, 1);
        let err = parse_bom(&bom_grid(), &mapping, "BOM").unwrap_err();
        assert!(matches!(err, CheckError::SameColumn { column: 1, .. }));

        let err = parse_checklist(&bom_grid(), &mapping, "清单", &BoxMarkers::default()).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn checklist_keeps_zero_quantity_and_reads_box_column() {
        let grid = vec![
            row(vec!["箱号".into(), "料号".into(), "实收".into()]),
            row(vec![Cell::Number(1.0), "1001".into(), Cell::Number(0.0)]),
            row(vec!["A2.0".into(), "1002".into(), "100*9".into()]),
            row(vec![Cell::Empty, "1003".into(), Cell::Number(-2.0)]),
        ];
        let mapping = MappingConfig::new(0, 1, 2).with_box_col(0);
        let sheet = parse_checklist(&grid, &mapping, "清单", &BoxMarkers::default()).unwrap();

        assert_eq!(sheet.records.len(), 3);
        assert_eq!(sheet.records[0].quantity, 0.0);
        assert_eq!(sheet.records[0].box_label, "1");
        assert_eq!(sheet.records[1].quantity, 900.0);
        assert_eq!(sheet.records[1].box_label, "A2");
        assert_eq!(sheet.records[2].quantity, -2.0);
        assert_eq!(sheet.records[2].box_label, "");
        assert_eq!(sheet.diagnostics.skipped_rows, 0);
    }

    #[test]
    fn header_beyond_grid_yields_nothing() {
        let mapping = MappingConfig::new(10, 0, 1);
        let sheet = parse_bom(&bom_grid(), &mapping, "BOM").unwrap();
        assert!(sheet.records.is_empty());
        assert_eq!(sheet.diagnostics.total_rows, 0);
    }

    #[test]
    fn short_rows_skipped() {
        let grid = vec![
            row(vec!["料号".into(), "数量".into(), "箱号".into()]),
            row(vec!["1001".into()]),
            row(vec!["1002".into(), Cell::Number(3.0)]),
        ];
        let mapping = MappingConfig::new(0, 0, 1).with_box_col(2);
        let sheet = parse_checklist(&grid, &mapping, "清单", &BoxMarkers::default()).unwrap();
        assert_eq!(sheet.records.len(), 1);
        assert_eq!(sheet.records[0].part_id, "1002");
        assert_eq!(sheet.records[0].box_label, "");
        assert_eq!(sheet.records[0].source_row, 3);
    }
}
