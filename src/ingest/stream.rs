//! 流式分箱: 箱号不在独立列里，而是由 "第3箱" / "Box #3" 这类行间标记行宣布。
//!
//! 扫描是一个显式的 fold: 状态只有 "当前箱号"，每行要么更新箱号，要么跳过，
//! 要么产出一条带当前箱号的记录。

use crate::config::default_box_marker_patterns;
use crate::error::CheckError;
use crate::ingest::grid::{read_checklist_row, ParsedSheet, SkipReason};
use crate::models::cell::row_text;
use crate::models::{Cell, ChecklistRecord, MappingConfig, ParseDiagnostics, ParseMode};
use regex::Regex;

/// 编译好的箱号标记正则 (按顺序尝试，第 1 个捕获组为箱号)
#[derive(Debug, Clone)]
pub struct BoxMarkers {
    patterns: Vec<Regex>,
}

impl BoxMarkers {
    pub fn new(patterns: &[String]) -> Result<Self, CheckError> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// 从文本中识别箱号，统一为 "N号箱"
    pub fn detect(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        for re in &self.patterns {
            let Some(num) = re.captures(text).and_then(|caps| caps.get(1)) else {
                continue;
            };
            let num = num.as_str();
            if num.chars().all(is_chinese_numeral) {
                // 中文数字转换失败 (如 "零") 时继续尝试下一个正则
                if let Some(n) = chinese_to_arabic(num) {
                    return Some(format!("{}号箱", n));
                }
            } else {
                return Some(format!("{}号箱", num));
            }
        }
        None
    }
}

impl Default for BoxMarkers {
    fn default() -> Self {
        // 内置正则是常量，编译不会失败
        let patterns = default_box_marker_patterns()
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self { patterns }
    }
}

fn digit_value(c: char) -> Option<u64> {
    let v = match c {
        '零' => 0,
        '一' | '壹' => 1,
        '二' | '两' | '贰' => 2,
        '三' | '叁' => 3,
        '四' | '肆' => 4,
        '五' | '伍' => 5,
        '六' | '陆' => 6,
        '七' | '柒' => 7,
        '八' | '捌' => 8,
        '九' | '玖' => 9,
        _ => return None,
    };
    Some(v)
}

fn multiplier_value(c: char) -> Option<u64> {
    match c {
        '十' | '拾' => Some(10),
        '百' => Some(100),
        '千' => Some(1000),
        _ => None,
    }
}

fn is_chinese_numeral(c: char) -> bool {
    digit_value(c).is_some() || multiplier_value(c).is_some()
}

/// 中文数字转阿拉伯数字: 单遍累加，"十一" -> 11, "二十三" -> 23, "一百零五" -> 105
pub fn chinese_to_arabic(text: &str) -> Option<u64> {
    let mut total = 0u64;
    let mut digit: Option<u64> = None;
    for c in text.trim().chars() {
        if let Some(d) = digit_value(c) {
            digit = Some(d);
        } else if let Some(m) = multiplier_value(c) {
            total += digit.unwrap_or(1) * m;
            digit = None;
        } else {
            return None;
        }
    }
    total += digit.unwrap_or(0);
    (total > 0).then_some(total)
}

/// 单行在流式扫描中的归类
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRow {
    Marker(String),
    Skip(SkipReason),
    Item(ChecklistRecord),
}

/// 扫描状态
#[derive(Debug, Default)]
struct StreamState {
    current_box: String,
    records: Vec<ChecklistRecord>,
    skipped: usize,
    markers: usize,
    total: usize,
}

/// 归类一行: 先看是否箱号标记，再走与标准模式相同的行检查
pub fn classify_row(
    row: &[Cell],
    row_no: usize,
    mapping: &MappingConfig,
    markers: &BoxMarkers,
    current_box: &str,
) -> StreamRow {
    if row.is_empty() {
        return StreamRow::Skip(SkipReason::Empty);
    }
    if let Some(label) = markers.detect(&row_text(row)) {
        return StreamRow::Marker(label);
    }
    match read_checklist_row(row, row_no, mapping, current_box.to_string()) {
        Ok(rec) => StreamRow::Item(rec),
        Err(reason) => StreamRow::Skip(reason),
    }
}

fn step(
    mut state: StreamState,
    row_no: usize,
    row: &[Cell],
    mapping: &MappingConfig,
    markers: &BoxMarkers,
) -> StreamState {
    state.total += 1;
    match classify_row(row, row_no, mapping, markers, &state.current_box) {
        StreamRow::Marker(label) => {
            tracing::debug!("第 {} 行识别到箱号标记: {}", row_no, label);
            state.current_box = label;
            state.markers += 1;
        }
        StreamRow::Skip(_) => state.skipped += 1,
        StreamRow::Item(rec) => state.records.push(rec),
    }
    state
}

pub fn parse_stream(
    grid: &[Vec<Cell>],
    mapping: &MappingConfig,
    label: &str,
    markers: &BoxMarkers,
) -> ParsedSheet<ChecklistRecord> {
    let state = grid
        .iter()
        .enumerate()
        .skip(mapping.header_row + 1)
        .fold(StreamState::default(), |state, (idx, row)| {
            step(state, idx + 1, row, mapping, markers)
        });

    ParsedSheet {
        diagnostics: ParseDiagnostics {
            label: label.to_string(),
            header_row: mapping.header_row + 1,
            parse_mode: ParseMode::Stream,
            total_rows: state.total,
            parsed_items: state.records.len(),
            skipped_rows: state.skipped,
            marker_rows: state.markers,
        },
        records: state.records,
    }
}
