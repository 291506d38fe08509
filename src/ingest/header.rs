//! Smart Anchor: 关键词打分定位表头行，并据此预判各列。

use crate::config::ReconSettings;
use crate::ingest::stream::BoxMarkers;
use crate::models::cell::row_text;
use crate::models::{Cell, MappingConfig, SheetKind};
use indexmap::IndexSet;
use serde::Serialize;

/// 表头定位结果; `row` 为 None 时调用方回退到第 0 行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderMatch {
    pub row: Option<usize>,
    pub score: usize,
}

impl HeaderMatch {
    pub fn row_or_default(&self) -> usize {
        self.row.unwrap_or(0)
    }
}

fn distinct_lowercase(keywords: &[String]) -> IndexSet<String> {
    keywords
        .iter()
        .map(|k| k.to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// 一行作为表头的得分: 命中的不同关键词个数 (每个关键词最多计一次)
pub fn header_score(row: &[Cell], keywords: &[String]) -> usize {
    let text = row_text(row).to_lowercase();
    distinct_lowercase(keywords)
        .iter()
        .filter(|kw| text.contains(kw.as_str()))
        .count()
}

/// 扫描前 `max_scan_rows` 行，得分严格最高者胜出 (同分保留靠前的行)
pub fn find_header_row(
    grid: &[Vec<Cell>],
    keywords: &[String],
    max_scan_rows: usize,
    min_score: usize,
) -> HeaderMatch {
    let not_found = HeaderMatch { row: None, score: 0 };
    if grid.is_empty() || keywords.is_empty() {
        return not_found;
    }

    let vocabulary = distinct_lowercase(keywords);
    let mut best: Option<(usize, usize)> = None;

    for (idx, row) in grid.iter().take(max_scan_rows).enumerate() {
        // 标题行、噪声行: 非空单元格少于 2 个
        let non_empty = row.iter().filter(|c| !c.is_blank()).count();
        if non_empty < 2 {
            continue;
        }

        let text = row_text(row).to_lowercase();
        let score = vocabulary.iter().filter(|kw| text.contains(kw.as_str())).count();
        if best.map_or(score > 0, |(_, best_score)| score > best_score) {
            best = Some((idx, score));
        }
    }

    match best {
        Some((row, score)) if score >= min_score => HeaderMatch { row: Some(row), score },
        _ => not_found,
    }
}

/// 按关键词预判列: 每列统计表头文本包含的关键词数，最高分胜出
pub fn predict_column(headers: &[String], keywords: &[String]) -> Option<usize> {
    predict_column_except(headers, keywords, &[])
}

/// 同 `predict_column`，但跳过已被其他字段占用的列
pub fn predict_column_except(
    headers: &[String],
    keywords: &[String],
    taken: &[usize],
) -> Option<usize> {
    let vocabulary = distinct_lowercase(keywords);
    let mut best: Option<(usize, usize)> = None;
    for (idx, header) in headers.iter().enumerate() {
        if taken.contains(&idx) {
            continue;
        }
        let text = header.to_lowercase();
        let score = vocabulary.iter().filter(|kw| text.contains(kw.as_str())).count();
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

/// 0-based 列号转 Excel 列字母 (A, B, ..., Z, AA, ...)
pub fn column_letter(idx: usize) -> String {
    let mut letters = Vec::new();
    let mut i = idx as i64;
    loop {
        letters.push((b'A' + (i % 26) as u8) as char);
        i = i / 26 - 1;
        if i < 0 {
            break;
        }
    }
    letters.iter().rev().collect()
}

/// 表头文本，空单元格显示为 "列N"
pub fn header_names(row: &[Cell]) -> Vec<String> {
    row.iter()
        .enumerate()
        .map(|(i, c)| {
            if c.is_blank() {
                format!("列{}", i + 1)
            } else {
                c.as_text().trim().to_string()
            }
        })
        .collect()
}

/// 表头之后 `limit` 行内是否出现箱号标记
pub fn has_stream_markers(
    grid: &[Vec<Cell>],
    header_row: usize,
    markers: &BoxMarkers,
    limit: usize,
) -> bool {
    let end = grid.len().min(header_row + limit);
    grid.iter()
        .take(end)
        .skip(header_row + 1)
        .filter(|row| !row.is_empty())
        .any(|row| markers.detect(&row_text(row)).is_some())
}

/// 列映射预判结果 (列映射界面的默认值)
#[derive(Debug, Clone, Serialize)]
pub struct MappingSuggestion {
    pub kind: SheetKind,
    pub header: HeaderMatch,
    pub headers: Vec<String>,
    pub options: Vec<String>, // "A列: 料号"
    pub mapping: MappingConfig,
}

/// 预判整张表的列映射; 表头行没有任何列时返回 None
pub fn suggest_mapping(
    grid: &[Vec<Cell>],
    kind: SheetKind,
    settings: &ReconSettings,
    markers: &BoxMarkers,
) -> Option<MappingSuggestion> {
    let kw = &settings.keywords;
    let vocabulary = match kind {
        SheetKind::Bom => kw.bom_header(),
        SheetKind::Checklist => kw.checklist_header(),
    };
    let header = find_header_row(
        grid,
        &vocabulary,
        settings.header_scan_rows,
        settings.min_header_score,
    );
    if header.row.is_none() {
        tracing::warn!("未识别到表头行 (得分不足 {})，回退到第 1 行", settings.min_header_score);
    }
    let header_row = header.row_or_default();

    let headers = header_names(grid.get(header_row).map(Vec::as_slice).unwrap_or(&[]));
    let n = headers.len();
    if n == 0 {
        return None;
    }

    // 数量列不与料号列重合 (合并表头如 "料号 数量")，只剩一列时才无法避免
    let part_col = predict_column(&headers, &kw.part).unwrap_or(0);
    let qty_col = predict_column_except(&headers, &kw.qty, &[part_col])
        .or_else(|| (0..n).find(|&i| i != part_col))
        .unwrap_or(part_col);
    let mut mapping = MappingConfig::new(header_row, part_col, qty_col);
    let taken = [part_col, qty_col];

    match kind {
        SheetKind::Bom => {
            mapping.substitute_col = predict_column_except(&headers, &kw.substitute, &taken);
            mapping.name_col = predict_column_except(&headers, &kw.name, &taken);
        }
        SheetKind::Checklist => {
            mapping.box_col = predict_column_except(&headers, &kw.box_, &taken);
            if mapping.box_col.is_none() {
                mapping.stream_parse =
                    has_stream_markers(grid, header_row, markers, settings.marker_scan_rows);
            }
        }
    }

    let options = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{}列: {}", column_letter(i), h))
        .collect();

    Some(MappingSuggestion {
        kind,
        header,
        headers,
        options,
        mapping,
    })
}
