use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// 原始表格单元格 (解密读取层给出的标量)
///
/// JSON 中 `null` 对应 `Empty`，数字统一按 `f64` 读入。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

/// 二维原始表格，行长度可以不一致
pub type Grid = Vec<Vec<Cell>>;

impl Cell {
    /// 转为显示文本；整数值浮点去掉小数部分，NaN 视为空
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Bool(true) => Cow::Borrowed("TRUE"),
            Cell::Bool(false) => Cow::Borrowed("FALSE"),
            Cell::Number(n) => Cow::Owned(number_text(*n)),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// 空单元格、空白文本、NaN
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(n) => n.is_nan(),
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Bool(_) => false,
        }
    }
}

/// 数值转文本: 123.0 -> "123", 1.5 -> "1.5"
pub(crate) fn number_text(n: f64) -> String {
    if n.is_nan() {
        return String::new();
    }
    if n.is_finite() && n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// 按索引取单元格，越界视为空
pub fn cell_at(row: &[Cell], idx: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(idx).unwrap_or(&EMPTY)
}

/// 行内所有单元格文本以空格拼接 (表头打分、箱号标记识别用)
pub fn row_text(row: &[Cell]) -> String {
    row.iter()
        .map(|c| c.as_text())
        .collect::<Vec<_>>()
        .join(" ")
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(n as f64)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_text_strips_integral_fraction() {
        assert_eq!(Cell::Number(123.0).as_text(), "123");
        assert_eq!(Cell::Number(-4.0).as_text(), "-4");
        assert_eq!(Cell::Number(1.5).as_text(), "1.5");
        assert_eq!(Cell::Number(f64::NAN).as_text(), "");
    }

    #[test]
    fn deserialize_mixed_row() {
        let row: Vec<Cell> = serde_json::from_str(r#"["1001", 5, null, 2.5, true]"#).unwrap();
        assert_eq!(
            row,
            vec![
                Cell::Text("1001".into()),
                Cell::Number(5.0),
                Cell::Empty,
                Cell::Number(2.5),
                Cell::Bool(true),
            ]
        );
    }

    #[test]
    fn row_text_joins_with_spaces() {
        let row = vec![Cell::from("第"), Cell::Empty, Cell::from(3)];
        assert_eq!(row_text(&row), "第  3");
    }

    #[test]
    fn cell_at_out_of_range_is_empty() {
        let row = vec![Cell::from("a")];
        assert_eq!(cell_at(&row, 5), &Cell::Empty);
    }
}
