//! 报表数据: 比对行、筛选和 CSV 导出 (渲染 Excel 交给外部)

use crate::error::CheckError;
use crate::ingest::normalize::{format_quantity, merge_box_labels};
use crate::models::{CompareRecord, CompareRow, SummaryRow};

fn or_dash(s: &str) -> String {
    if s.trim().is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

impl From<&CompareRecord> for CompareRow {
    fn from(r: &CompareRecord) -> Self {
        Self {
            work_order: or_dash(&r.work_order),
            part_id: r.part_id.clone(),
            part_name: or_dash(&r.part_name),
            bom_quantity: format_quantity(r.bom_quantity),
            actual_quantity: format_quantity(r.actual_quantity),
            difference: format_quantity(r.difference),
            status: r.status_label.clone(),
            box_sources: merge_box_labels(&r.box_sources),
            remark: r.remark.clone(),
        }
    }
}

pub fn compare_rows(results: &[CompareRecord]) -> Vec<CompareRow> {
    results.iter().map(CompareRow::from).collect()
}

/// 仅异常行; 状态文本已校验前缀，与 `ok_rows` 一样只看前缀
pub fn abnormal_rows(rows: &[CompareRow]) -> Vec<CompareRow> {
    rows.iter().filter(|r| r.status.starts_with("NG")).cloned().collect()
}

pub fn ok_rows(rows: &[CompareRow]) -> Vec<CompareRow> {
    rows.iter().filter(|r| r.status.starts_with("OK")).cloned().collect()
}

const COMPARE_HEADERS: [&str; 9] = [
    "工单号", "料号", "名称", "BOM数量", "清单实收", "差异", "判定结果", "箱号溯源", "备注",
];

fn row_fields(r: &CompareRow) -> [&str; 9] {
    [
        r.work_order.as_str(),
        r.part_id.as_str(),
        r.part_name.as_str(),
        r.bom_quantity.as_str(),
        r.actual_quantity.as_str(),
        r.difference.as_str(),
        r.status.as_str(),
        r.box_sources.as_str(),
        r.remark.as_str(),
    ]
}

/// 多份清单的比对行导出为一张 CSV，首列为清单名
pub fn export_compare_csv<'a>(
    sheets: impl IntoIterator<Item = (&'a str, &'a [CompareRow])>,
) -> Result<String, CheckError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["清单"];
    header.extend_from_slice(&COMPARE_HEADERS);
    wtr.write_record(&header)?;

    for (name, rows) in sheets {
        for r in rows {
            let mut record = vec![name];
            record.extend_from_slice(&row_fields(r));
            wtr.write_record(&record)?;
        }
    }
    into_string(wtr)
}

pub fn export_summary_csv(rows: &[SummaryRow]) -> Result<String, CheckError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for r in rows {
        wtr.serialize(r)?;
    }
    into_string(wtr)
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, CheckError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| CheckError::Io(std::io::Error::new(e.error().kind(), e.to_string())))?;
    String::from_utf8(bytes)
        .map_err(|e| CheckError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
