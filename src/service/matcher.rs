use crate::config::{ReconSettings, StatusLabels};
use crate::ingest::normalize::{clean_part_text, format_quantity, sort_box_labels};
use crate::models::{BomRecord, ChecklistRecord, CompareRecord, MatchStatus};
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeSet, HashMap, HashSet};

const REMARK_MISSING: &str = "清单中未找到该料号及其替代料";
const REMARK_NOT_IN_BOM: &str = "疑似技术变更或异常混料，请核实";

/// 单份清单的料号索引: 清洗后的料号 -> 清单记录 (保持清单原顺序)
///
/// 每份清单单独构建，核对完即丢弃。
pub struct PartLookup<'c> {
    index: HashMap<String, Vec<&'c ChecklistRecord>>,
}

impl<'c> PartLookup<'c> {
    pub fn build(items: &'c [ChecklistRecord]) -> Self {
        let mut index: HashMap<String, Vec<&'c ChecklistRecord>> = HashMap::new();
        for item in items {
            let pid = clean_part_text(&item.part_id);
            if pid.is_empty() {
                continue;
            }
            index.entry(pid).or_default().push(item);
        }
        Self { index }
    }

    pub fn get(&self, part_id: &str) -> &[&'c ChecklistRecord] {
        self.index.get(part_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// BOM 中出现过的全部料号 (主料 + 替代料)
pub fn bom_part_ids(bom: &[BomRecord]) -> HashSet<String> {
    let mut all = HashSet::new();
    for b in bom {
        for id in b.candidate_ids() {
            let cleaned = clean_part_text(id);
            if !cleaned.is_empty() {
                all.insert(cleaned);
            }
        }
    }
    all
}

/// 判定规则，按顺序第一条命中生效
pub fn classify(matched_any: bool, difference: f64, used_substitutes: bool, tolerance: f64) -> MatchStatus {
    if !matched_any {
        MatchStatus::NgMissing
    } else if difference.abs() < tolerance {
        if used_substitutes {
            MatchStatus::OkWithSubstitute
        } else {
            MatchStatus::Ok
        }
    } else {
        MatchStatus::NgQuantityDifference
    }
}

fn build_remark(status: MatchStatus, difference: f64, substitutes: &[String]) -> String {
    let mut remarks: Vec<String> = Vec::new();
    match status {
        MatchStatus::NgMissing => remarks.push(REMARK_MISSING.to_string()),
        MatchStatus::OkWithSubstitute => {
            remarks.push(format!("使用替代料: {}", substitutes.join(", ")));
        }
        MatchStatus::NgQuantityDifference => {
            let prefix = if difference > 0.0 { "超量 +" } else { "欠量 " };
            remarks.push(format!("{}{}", prefix, format_quantity(difference)));
            if !substitutes.is_empty() {
                remarks.push(format!("含替代料: {}", substitutes.join(", ")));
            }
        }
        MatchStatus::NgNotInBom => remarks.push(REMARK_NOT_IN_BOM.to_string()),
        MatchStatus::Ok => {}
    }
    remarks.join("; ")
}

/// BOM ↔ 清单 双向核对引擎 (五种状态判定)
pub struct ReconEngine<'s> {
    tolerance: f64,
    labels: &'s StatusLabels,
}

impl<'s> ReconEngine<'s> {
    pub fn new(settings: &'s ReconSettings) -> Self {
        Self {
            tolerance: settings.tolerance,
            labels: &settings.labels,
        }
    }

    /// 核对一份清单: 正向逐条 BOM 匹配 + 反向补漏
    pub fn reconcile(
        &self,
        bom: &[BomRecord],
        checklist: &[ChecklistRecord],
        work_order: &str,
    ) -> Vec<CompareRecord> {
        let lookup = PartLookup::build(checklist);

        let mut results: Vec<CompareRecord> = bom
            .iter()
            .map(|b| self.match_bom_item(b, &lookup, work_order))
            .collect();

        let bom_all = bom_part_ids(bom);
        results.extend(self.unmatched_items(checklist, &bom_all, work_order));
        results
    }

    /// 单项匹配 (主料 + 替代料合并计数)
    pub fn match_bom_item(
        &self,
        bom_item: &BomRecord,
        lookup: &PartLookup<'_>,
        work_order: &str,
    ) -> CompareRecord {
        let main_part = clean_part_text(&bom_item.main_part_id);

        // 候选料号: 主料在前，替代料去重保序且不含主料
        let mut candidates: IndexSet<String> = IndexSet::new();
        candidates.insert(main_part.clone());
        for s in &bom_item.substitute_ids {
            let cleaned = clean_part_text(s);
            if !cleaned.is_empty() {
                candidates.insert(cleaned);
            }
        }

        let mut matched: Vec<&ChecklistRecord> = Vec::new();
        let mut matched_subs: BTreeSet<String> = BTreeSet::new();
        for pid in &candidates {
            let items = lookup.get(pid);
            if items.is_empty() {
                continue;
            }
            matched.extend_from_slice(items);
            if *pid != main_part {
                matched_subs.insert(pid.clone());
            }
        }

        let actual: f64 = matched.iter().map(|i| i.quantity).sum();
        let difference = actual - bom_item.quantity;
        let substitutes: Vec<String> = matched_subs.into_iter().collect();
        let status = classify(!matched.is_empty(), difference, !substitutes.is_empty(), self.tolerance);

        CompareRecord {
            work_order: work_order.to_string(),
            part_id: main_part,
            part_name: bom_item.name.clone(),
            bom_quantity: bom_item.quantity,
            actual_quantity: actual,
            difference,
            status,
            status_label: self.labels.label(status).to_string(),
            box_sources: sort_box_labels(matched.iter().map(|i| i.box_label.as_str())),
            remark: build_remark(status, difference, &substitutes),
            matched_substitutes: substitutes,
            bom_row: Some(bom_item.source_row),
            source_rows: source_rows(&matched),
        }
    }

    /// 反向补漏: 清单中有、BOM (含替代料) 中完全没有的料号，按料号合并
    pub fn unmatched_items(
        &self,
        checklist: &[ChecklistRecord],
        bom_all: &HashSet<String>,
        work_order: &str,
    ) -> Vec<CompareRecord> {
        let mut unmatched: IndexMap<String, Vec<&ChecklistRecord>> = IndexMap::new();
        for item in checklist {
            let pid = clean_part_text(&item.part_id);
            if !pid.is_empty() && !bom_all.contains(&pid) {
                unmatched.entry(pid).or_default().push(item);
            }
        }

        let status = MatchStatus::NgNotInBom;
        unmatched
            .into_iter()
            .map(|(pid, items)| {
                let total: f64 = items.iter().map(|i| i.quantity).sum();
                CompareRecord {
                    work_order: work_order.to_string(),
                    part_id: pid,
                    part_name: String::new(),
                    bom_quantity: 0.0,
                    actual_quantity: total,
                    difference: total,
                    status,
                    status_label: self.labels.label(status).to_string(),
                    box_sources: sort_box_labels(items.iter().map(|i| i.box_label.as_str())),
                    matched_substitutes: Vec::new(),
                    remark: build_remark(status, total, &[]),
                    bom_row: None,
                    source_rows: source_rows(&items),
                }
            })
            .collect()
    }
}

fn source_rows(items: &[&ChecklistRecord]) -> Vec<usize> {
    let mut rows: Vec<usize> = items.iter().map(|i| i.source_row).collect();
    rows.sort_unstable();
    rows.dedup();
    rows
}
