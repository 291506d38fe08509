use crate::models::{BomRecord, ChecklistRecord};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;

const MAX_LISTED: usize = 5;

/// 数据质量提示 (只提示，不阻断核对)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    EmptyBom,
    EmptyChecklist { name: String },
    DuplicateBomParts { parts: Vec<String> },
    ZeroQuantityBom { count: usize },
    ZeroQuantityChecklist { name: String, count: usize },
    SharedSubstitutes { parts: Vec<String> },
}

fn listed(parts: &[String]) -> String {
    let head: Vec<&str> = parts.iter().take(MAX_LISTED).map(String::as_str).collect();
    let more = if parts.len() > MAX_LISTED { "..." } else { "" };
    format!("{}{}", head.join(", "), more)
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBom => write!(f, "⚠️ BOM数据为空，请检查文件"),
            Self::EmptyChecklist { name } => write!(f, "⚠️ {}数据为空，请检查文件", name),
            Self::DuplicateBomParts { parts } => write!(f, "⚠️ BOM重复料号: {}", listed(parts)),
            Self::ZeroQuantityBom { count } => write!(f, "⚠️ BOM中有 {} 项数量为0", count),
            Self::ZeroQuantityChecklist { name, count } => {
                write!(f, "⚠️ {}中有 {} 项数量为0", name, count)
            }
            Self::SharedSubstitutes { parts } => {
                write!(f, "⚠️ 替代料被多个BOM料号共用，将重复计数: {}", listed(parts))
            }
        }
    }
}

/// BOM 中重复的主料号 (按首次出现顺序)
pub fn duplicate_parts(bom: &[BomRecord]) -> Vec<String> {
    let mut seen: IndexMap<&str, usize> = IndexMap::new();
    for b in bom {
        *seen.entry(b.main_part_id.as_str()).or_default() += 1;
    }
    seen.into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id.to_string())
        .collect()
}

/// 被多条 BOM 同时列为替代料的料号
pub fn shared_substitutes(bom: &[BomRecord]) -> Vec<String> {
    let mut owners: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
    for b in bom {
        for s in &b.substitute_ids {
            owners.entry(s.as_str()).or_default().insert(b.main_part_id.as_str());
        }
    }
    owners
        .into_iter()
        .filter(|(_, mains)| mains.len() > 1)
        .map(|(id, _)| id.to_string())
        .collect()
}

pub fn check_bom(bom: &[BomRecord]) -> Vec<DataWarning> {
    if bom.is_empty() {
        return vec![DataWarning::EmptyBom];
    }

    let mut warnings = Vec::new();
    let dups = duplicate_parts(bom);
    if !dups.is_empty() {
        warnings.push(DataWarning::DuplicateBomParts { parts: dups });
    }
    let zero = bom.iter().filter(|b| b.quantity == 0.0).count();
    if zero > 0 {
        warnings.push(DataWarning::ZeroQuantityBom { count: zero });
    }
    let shared = shared_substitutes(bom);
    if !shared.is_empty() {
        warnings.push(DataWarning::SharedSubstitutes { parts: shared });
    }
    warnings
}

pub fn check_checklist(name: &str, items: &[ChecklistRecord]) -> Vec<DataWarning> {
    if items.is_empty() {
        return vec![DataWarning::EmptyChecklist { name: name.to_string() }];
    }
    let zero = items.iter().filter(|i| i.quantity == 0.0).count();
    if zero > 0 {
        return vec![DataWarning::ZeroQuantityChecklist {
            name: name.to_string(),
            count: zero,
        }];
    }
    Vec::new()
}

/// 核对前的全部数据质量提示
pub fn validate_inputs<'a>(
    bom: &[BomRecord],
    checklists: impl IntoIterator<Item = (&'a str, &'a [ChecklistRecord])>,
) -> Vec<DataWarning> {
    let mut warnings = check_bom(bom);
    for (name, items) in checklists {
        warnings.extend(check_checklist(name, items));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bom(id: &str, qty: f64, subs: &[&str]) -> BomRecord {
        BomRecord::new(id, qty, subs.iter().map(|s| s.to_string()))
    }

    #[test]
    fn empty_inputs_warn() {
        let w = validate_inputs(&[], [("装箱单", &[][..])]);
        assert_eq!(
            w,
            vec![
                DataWarning::EmptyBom,
                DataWarning::EmptyChecklist { name: "装箱单".into() }
            ]
        );
        assert_eq!(w[0].to_string(), "⚠️ BOM数据为空，请检查文件");
        assert_eq!(w[1].to_string(), "⚠️ 装箱单数据为空，请检查文件");
    }

    #[test]
    fn duplicates_listed_first_five_in_order() {
        let ids = ["7", "1", "7", "2", "3", "4", "5", "6", "1", "2", "3", "4", "5", "6"];
        let records: Vec<BomRecord> = ids.iter().map(|id| bom(id, 1.0, &[])).collect();
        assert_eq!(duplicate_parts(&records), vec!["7", "1", "2", "3", "4", "5", "6"]);
        let w = check_bom(&records);
        assert_eq!(w[0].to_string(), "⚠️ BOM重复料号: 7, 1, 2, 3, 4...");
    }

    #[test]
    fn zero_quantities_counted() {
        let w = check_bom(&[bom("1", 0.0, &[]), bom("2", 1.0, &[])]);
        assert_eq!(w, vec![DataWarning::ZeroQuantityBom { count: 1 }]);
        assert_eq!(w[0].to_string(), "⚠️ BOM中有 1 项数量为0");

        let items = vec![ChecklistRecord::new("1", 0.0), ChecklistRecord::new("2", 0.0)];
        let w = check_checklist("清单A", &items);
        assert_eq!(w[0].to_string(), "⚠️ 清单A中有 2 项数量为0");
    }

    #[test]
    fn shared_substitute_reported() {
        let records = vec![bom("1", 1.0, &["9"]), bom("2", 1.0, &["9", "8"]), bom("3", 1.0, &["8"])];
        assert_eq!(shared_substitutes(&records), vec!["9", "8"]);
        let w = check_bom(&records);
        assert!(matches!(&w[0], DataWarning::SharedSubstitutes { parts } if parts.len() == 2));
    }

    #[test]
    fn clean_inputs_have_no_warnings() {
        let w = validate_inputs(
            &[bom("1", 2.0, &["3"])],
            [("清单", &[ChecklistRecord::new("1", 2.0)][..])],
        );
        assert!(w.is_empty());
    }
}
