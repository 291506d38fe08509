use crate::models::{CompareRecord, MatchStatus, RunStats, RunSummary, SummaryRow};

/// 单份清单统计; OK/NG 总数只看展示文本前缀，细分按状态
pub fn compute_stats(label: &str, bom_items_count: usize, results: &[CompareRecord]) -> RunStats {
    let count = |status: MatchStatus| results.iter().filter(|r| r.status == status).count();

    let total_items = results.len();
    let ok_count = results.iter().filter(|r| r.is_pass()).count();
    let ng_count = results.iter().filter(|r| r.is_ng()).count();
    let ok_with_substitute = count(MatchStatus::OkWithSubstitute);

    let pass_rate = if total_items > 0 {
        ok_count as f64 / total_items as f64 * 100.0
    } else {
        0.0
    };

    RunStats {
        label: label.to_string(),
        total_items,
        bom_items_count,
        ok_count,
        ng_count,
        ok_main_only: count(MatchStatus::Ok),
        ok_with_substitute,
        substitute_used_count: ok_with_substitute,
        ng_qty_difference: count(MatchStatus::NgQuantityDifference),
        ng_missing: count(MatchStatus::NgMissing),
        ng_not_in_bom: count(MatchStatus::NgNotInBom),
        pass_rate,
    }
}

/// 全部清单核对完成后再汇总
pub fn summarize(bom_item_count: usize, checklists: Vec<RunStats>) -> RunSummary {
    let total_substitute_ok = checklists.iter().map(|s| s.ok_with_substitute).sum();
    RunSummary {
        bom_item_count,
        checklists,
        total_substitute_ok,
    }
}

/// 汇总表 (项目 / 值)
pub fn summary_rows(work_order: &str, batch: &str, summary: &RunSummary) -> Vec<SummaryRow> {
    let mut rows = vec![
        SummaryRow::new("工单号", or_dash(work_order)),
        SummaryRow::new("批量", or_dash(batch)),
        SummaryRow::new("BOM物料总数", summary.bom_item_count),
    ];

    for s in &summary.checklists {
        let name = &s.label;
        rows.push(SummaryRow::new(format!("{}-核对总数", name), s.total_items));
        rows.push(SummaryRow::new(format!("{}-OK数量", name), s.ok_count));
        rows.push(SummaryRow::new(format!("{}-OK(仅主料)", name), s.ok_main_only));
        rows.push(SummaryRow::new(format!("{}-OK(含替料)", name), s.ok_with_substitute));
        rows.push(SummaryRow::new(format!("{}-NG数量", name), s.ng_count));
        rows.push(SummaryRow::new(format!("{}-NG(数量差异)", name), s.ng_qty_difference));
        rows.push(SummaryRow::new(format!("{}-NG(缺料)", name), s.ng_missing));
        rows.push(SummaryRow::new(format!("{}-NG(BOM无)", name), s.ng_not_in_bom));
        rows.push(SummaryRow::new(
            format!("{}-通过率", name),
            format!("{:.1}%", s.pass_rate),
        ));
    }
    rows
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconSettings;
    use crate::models::{BomRecord, ChecklistRecord};
    use crate::service::matcher::ReconEngine;

    fn sample_results() -> Vec<CompareRecord> {
        let settings = ReconSettings::default();
        let bom = vec![
            BomRecord::new("1001", 5.0, Vec::<String>::new()),
            BomRecord::new("1002", 2.0, vec!["2002".to_string()]),
            BomRecord::new("1003", 1.0, Vec::<String>::new()),
            BomRecord::new("1004", 3.0, Vec::<String>::new()),
        ];
        let list = vec![
            ChecklistRecord::new("1001", 5.0),
            ChecklistRecord::new("2002", 2.0),
            ChecklistRecord::new("1003", 4.0),
            ChecklistRecord::new("9999", 1.0),
        ];
        ReconEngine::new(&settings).reconcile(&bom, &list, "W1")
    }

    #[test]
    fn counts_partition_results() {
        let results = sample_results();
        let s = compute_stats("清单", 4, &results);
        assert_eq!(s.total_items, 5);
        assert_eq!(s.ok_count, 2);
        assert_eq!(s.ng_count, 3);
        assert_eq!(s.ok_main_only + s.ok_with_substitute, s.ok_count);
        assert_eq!(s.ng_qty_difference + s.ng_missing + s.ng_not_in_bom, s.ng_count);
        assert_eq!(s.ok_count + s.ng_count, s.total_items);
        assert_eq!(s.substitute_used_count, 1);
        assert!((s.pass_rate - 40.0).abs() < 1e-9);
    }

    #[test]
    fn empty_results_have_zero_pass_rate() {
        let s = compute_stats("空", 0, &[]);
        assert_eq!(s.total_items, 0);
        assert_eq!(s.pass_rate, 0.0);
    }

    #[test]
    fn summary_sums_substitute_ok() {
        let results = sample_results();
        let a = compute_stats("A", 4, &results);
        let b = compute_stats("B", 4, &results);
        let summary = summarize(4, vec![a, b]);
        assert_eq!(summary.total_substitute_ok, 2);
        assert_eq!(summary.checklists.len(), 2);
    }

    #[test]
    fn summary_table_layout() {
        let s = compute_stats("装箱单", 4, &sample_results());
        let rows = summary_rows("WO-9", "", &summarize(4, vec![s]));
        assert_eq!(rows.len(), 3 + 9);
        assert_eq!(rows[0], SummaryRow::new("工单号", "WO-9"));
        assert_eq!(rows[1], SummaryRow::new("批量", "-"));
        assert_eq!(rows[2], SummaryRow::new("BOM物料总数", 4));
        assert_eq!(rows[3].item, "装箱单-核对总数");
        assert_eq!(rows[11], SummaryRow::new("装箱单-通过率", "40.0%"));
    }
}
