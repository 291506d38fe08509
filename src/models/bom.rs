use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// BOM 单项 (一条需求料号)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomRecord {
    pub main_part_id: String,
    pub quantity: f64,
    pub substitute_ids: IndexSet<String>, // 保序去重，不含主料号
    pub name: String,
    pub source_row: usize,                // 原表 1-based 行号
}

impl BomRecord {
    /// 构造时剔除与主料号相同的替代料
    pub fn new(
        main_part_id: impl Into<String>,
        quantity: f64,
        substitutes: impl IntoIterator<Item = String>,
    ) -> Self {
        let main_part_id = main_part_id.into();
        let substitute_ids = substitutes
            .into_iter()
            .filter(|s| !s.is_empty() && *s != main_part_id)
            .collect();
        Self {
            main_part_id,
            quantity,
            substitute_ids,
            name: String::new(),
            source_row: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.source_row = row;
        self
    }

    /// 候选料号: 主料在前，替代料按原顺序
    pub fn candidate_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.main_part_id.as_str())
            .chain(self.substitute_ids.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_drops_main_id_and_duplicates() {
        let rec = BomRecord::new(
            "1001",
            2.0,
            vec!["2002".to_string(), "1001".to_string(), "2002".to_string(), "3003".to_string()],
        );
        let subs: Vec<_> = rec.substitute_ids.iter().cloned().collect();
        assert_eq!(subs, vec!["2002", "3003"]);
        let cands: Vec<_> = rec.candidate_ids().collect();
        assert_eq!(cands, vec!["1001", "2002", "3003"]);
    }
}
