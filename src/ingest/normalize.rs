//! 脏数据清洗: 料号、箱号、数量、替代料。
//!
//! 全部是纯函数，不做 IO，也不会失败，清洗不出结果时返回空串 / `None`。

use crate::ingest::expr;
use crate::models::Cell;
use indexmap::IndexSet;

/// Excel 强制文本前缀 (单引号、反引号及其 Unicode 变体)
const QUOTE_PREFIXES: &[char] = &['\'', '`', '\u{2018}', '\u{2019}', '\u{201B}', '\u{FF07}'];

/// 控制字符、零宽字符、BOM、不换行空格
fn is_invisible(c: char) -> bool {
    matches!(c,
        '\u{0000}'..='\u{001F}'
        | '\u{007F}'..='\u{009F}'
        | '\u{200B}'..='\u{200D}'
        | '\u{FEFF}'
        | '\u{00A0}')
}

fn strip_invisible(s: &str) -> String {
    s.chars().filter(|c| !is_invisible(*c)).collect()
}

/// 文本形式的 "123.0" 也按整数处理
fn strip_float_suffix(s: &str) -> &str {
    s.strip_suffix(".0").unwrap_or(s)
}

fn is_null_token(s: &str, extra: &[&str]) -> bool {
    let lower = s.trim().to_lowercase();
    lower.is_empty() || lower == "nan" || lower == "none" || extra.contains(&lower.as_str())
}

/// 清洗料号: 去 .0 后缀、去强制文本前缀、去不可见字符
pub fn clean_part_id(raw: &Cell) -> String {
    if let Cell::Number(n) = raw {
        if n.is_nan() {
            return String::new();
        }
    }
    let text = strip_invisible(&raw.as_text());
    let text = text.trim();
    let text = if matches!(raw, Cell::Text(_)) {
        strip_float_suffix(text)
    } else {
        text
    };
    text.trim_start_matches(QUOTE_PREFIXES).trim().to_string()
}

/// 已是字符串的料号再清洗一次 (幂等)
pub fn clean_part_text(raw: &str) -> String {
    clean_part_id(&Cell::Text(raw.to_string()))
}

/// 清洗箱号: 与料号相同，但不去引号前缀
pub fn clean_box_label(raw: &Cell) -> String {
    if let Cell::Number(n) = raw {
        if n.is_nan() {
            return String::new();
        }
    }
    let text = strip_invisible(&raw.as_text());
    let text = text.trim();
    let text = if matches!(raw, Cell::Text(_)) {
        strip_float_suffix(text)
    } else {
        text
    };
    text.trim().to_string()
}

/// 普通展示文本 (名称列等)
pub fn clean_text(raw: &Cell) -> String {
    strip_invisible(&raw.as_text()).trim().to_string()
}

/// 数量求值: 数值直接返回，文本先直接解析，再走白名单算式 (如 "100*9")
pub fn eval_quantity(raw: &Cell) -> Option<f64> {
    match raw {
        Cell::Number(n) => n.is_finite().then_some(*n),
        Cell::Text(s) => eval_quantity_text(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

fn eval_quantity_text(raw: &str) -> Option<f64> {
    let cleaned = strip_invisible(raw);
    let text = cleaned.trim().trim_start_matches(QUOTE_PREFIXES).trim();
    if is_null_token(text, &["-"]) {
        return None;
    }

    if let Ok(v) = text.parse::<f64>() {
        return v.is_finite().then_some(v);
    }

    // 白名单: 只允许数字、空白、+ - * / ( ) .
    if !is_expression_allowed(text) {
        return None;
    }
    expr::evaluate(text).ok()
}

pub fn is_expression_allowed(text: &str) -> bool {
    !text.is_empty()
        && text.chars().all(|c| {
            c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.')
        })
}

/// 从替代状况文本中提取替代料号: 连续 ASCII 数字且至少 3 位，去重保序
pub fn extract_substitute_ids(raw: &Cell) -> Vec<String> {
    let text = raw.as_text();
    let text = text.trim();
    if is_null_token(text, &["无", "-", "null"]) {
        return Vec::new();
    }

    let mut seen: IndexSet<&str> = IndexSet::new();
    let mut start: Option<usize> = None;
    for (idx, c) in text.char_indices() {
        match (c.is_ascii_digit(), start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                seen.insert(&text[s..idx]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        seen.insert(&text[s..]);
    }

    seen.into_iter()
        .filter(|run| run.len() >= 3) // 少于 3 位视为噪声
        .map(str::to_string)
        .collect()
}

/// 整行为空 (全空、空白或 nan/none)
pub fn is_empty_row(row: &[Cell]) -> bool {
    row.iter().all(|cell| match cell {
        Cell::Empty => true,
        other => is_null_token(&other.as_text(), &[]),
    })
}

/// 数量展示: 整数不带小数，否则保留 2 位
pub fn format_quantity(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    if value == value.trunc() {
        // 不经 i64 转换，超大整数原样输出; -0 显示为 0
        format!("{:.0}", value + 0.0)
    } else {
        format!("{:.2}", value)
    }
}

/// 箱号去重并按 (长度, 字典序) 排序，空箱号丢弃
pub fn sort_box_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut boxes: Vec<&str> = labels.into_iter().filter(|b| !b.is_empty()).collect();
    boxes.sort_by(|a, b| (a.chars().count(), *a).cmp(&(b.chars().count(), *b)));
    boxes.dedup();
    boxes.into_iter().map(str::to_string).collect()
}

/// 合并箱号为展示文本，如 "1号箱, 2号箱"；没有箱号时为 "-"
pub fn merge_box_labels(labels: &[String]) -> String {
    let sorted = sort_box_labels(labels.iter().map(String::as_str));
    if sorted.is_empty() {
        "-".to_string()
    } else {
        sorted.join(", ")
    }
}
