use crate::config::ReconSettings;
use crate::error::CheckError;
use crate::ingest::header::{suggest_mapping, MappingSuggestion};
use crate::ingest::{check_mapping, parse_bom, parse_checklist, BoxMarkers, ParsedSheet};
use crate::models::{
    Cell, ChecklistRecord, CompareRecord, CompareRow, Grid, MappingConfig, ParseDiagnostics, RunStats,
    RunSummary, SheetKind, SummaryRow,
};
use crate::service::aggregate::{compute_stats, summarize, summary_rows};
use crate::service::matcher::ReconEngine;
use crate::service::report::{compare_rows, export_compare_csv};
use crate::service::validate::validate_inputs;
use chrono::{DateTime, Local};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// 一张待解析的表: 原始单元格 + 可选列映射 (缺省时自动预判)
#[derive(Debug, Clone, Deserialize)]
pub struct SheetInput {
    pub name: String,
    pub grid: Grid,
    #[serde(default)]
    pub mapping: Option<MappingConfig>,
}

impl SheetInput {
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
            mapping: None,
        }
    }

    pub fn with_mapping(mut self, mapping: MappingConfig) -> Self {
        self.mapping = Some(mapping);
        self
    }
}

/// 一次核对: 一份 BOM 对多份清单
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub work_order: String,
    #[serde(default)]
    pub batch: String,
    pub bom: SheetInput,
    pub checklists: Vec<SheetInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistReport {
    pub name: String,
    pub diagnostics: ParseDiagnostics,
    pub stats: RunStats,
    pub records: Vec<CompareRecord>,
    pub rows: Vec<CompareRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub work_order: String,
    pub batch: String,
    pub generated_at: DateTime<Local>,
    pub bom: ParseDiagnostics,
    pub bom_item_count: usize,
    pub warnings: Vec<String>,
    pub checklists: Vec<ChecklistReport>,
    pub summary: RunSummary,
    pub summary_rows: Vec<SummaryRow>,
}

impl CheckReport {
    /// 全部清单的比对行，首列为清单名
    pub fn to_csv(&self) -> Result<String, CheckError> {
        export_compare_csv(
            self.checklists
                .iter()
                .map(|c| (c.name.as_str(), c.rows.as_slice())),
        )
    }
}

/// CKD 核对服务: 解析 → 数据检查 → 逐清单核对 (并行) → 汇总
pub struct CheckService {
    settings: ReconSettings,
    markers: BoxMarkers,
}

impl CheckService {
    pub fn new(settings: ReconSettings) -> Result<Self, CheckError> {
        settings.labels.validate()?;
        let markers = BoxMarkers::new(&settings.box_marker_patterns)?;
        Ok(Self { settings, markers })
    }

    pub fn settings(&self) -> &ReconSettings {
        &self.settings
    }

    pub fn suggest(&self, grid: &[Vec<Cell>], kind: SheetKind) -> Option<MappingSuggestion> {
        suggest_mapping(grid, kind, &self.settings, &self.markers)
    }

    /// 请求未给出映射时按表头预判，预判失败回退到 (0, 0, 1)
    fn resolve_mapping(&self, sheet: &SheetInput, kind: SheetKind) -> MappingConfig {
        if let Some(mapping) = &sheet.mapping {
            return mapping.clone();
        }
        match self.suggest(&sheet.grid, kind) {
            Some(s) => {
                tracing::info!(
                    "{}: 自动识别表头第 {} 行, 料号列 {}, 数量列 {}, {}",
                    sheet.name,
                    s.mapping.header_row + 1,
                    s.mapping.part_col,
                    s.mapping.qty_col,
                    s.mapping.parse_mode()
                );
                s.mapping
            }
            None => MappingConfig::new(0, 0, 1),
        }
    }

    pub fn run(&self, req: &CheckRequest) -> Result<CheckReport, CheckError> {
        if req.checklists.is_empty() {
            return Err(CheckError::NoChecklists);
        }
        let wo = req.work_order.as_str();

        // Phase 1: 确定列映射，任何一张表配置非法都不开始解析
        let bom_mapping = self.resolve_mapping(&req.bom, SheetKind::Bom);
        let list_mappings: Vec<MappingConfig> = req
            .checklists
            .iter()
            .map(|s| self.resolve_mapping(s, SheetKind::Checklist))
            .collect();
        check_mapping(&req.bom.name, &bom_mapping)?;
        for (sheet, mapping) in req.checklists.iter().zip(&list_mappings) {
            check_mapping(&sheet.name, mapping)?;
        }

        // Phase 2: 解析
        let bom = parse_bom(&req.bom.grid, &bom_mapping, &req.bom.name)?;
        let lists: Vec<ParsedSheet<ChecklistRecord>> = req
            .checklists
            .par_iter()
            .zip(list_mappings.par_iter())
            .map(|(sheet, mapping)| parse_checklist(&sheet.grid, mapping, &sheet.name, &self.markers))
            .collect::<Result<_, _>>()?;

        tracing::info!(
            "[CKD] 工单 {}: BOM {} 项, {} 份清单",
            wo,
            bom.records.len(),
            lists.len()
        );

        // Phase 3: 数据质量检查 (只提示)
        let warnings: Vec<String> = validate_inputs(
            &bom.records,
            req.checklists
                .iter()
                .zip(&lists)
                .map(|(s, l)| (s.name.as_str(), l.records.as_slice())),
        )
        .iter()
        .map(ToString::to_string)
        .collect();
        for w in &warnings {
            tracing::warn!("[CKD] 工单 {}: {}", wo, w);
        }

        // Phase 4: 逐清单核对; BOM 只读共享，各清单索引互不可见
        let engine = ReconEngine::new(&self.settings);
        let bom_count = bom.records.len();
        let checklists: Vec<ChecklistReport> = req
            .checklists
            .par_iter()
            .zip(lists.into_par_iter())
            .map(|(sheet, parsed)| {
                let records = engine.reconcile(&bom.records, &parsed.records, wo);
                let stats = compute_stats(&sheet.name, bom_count, &records);
                ChecklistReport {
                    name: sheet.name.clone(),
                    diagnostics: parsed.diagnostics,
                    stats,
                    rows: compare_rows(&records),
                    records,
                }
            })
            .collect();

        for c in &checklists {
            tracing::info!(
                "[CKD] 工单 {}: {} 核对完成 - 总数: {}, OK: {}, NG: {}, 通过率: {:.1}%",
                wo,
                c.name,
                c.stats.total_items,
                c.stats.ok_count,
                c.stats.ng_count,
                c.stats.pass_rate
            );
        }

        // Phase 5: 汇总 (所有清单完成之后)
        let summary = summarize(
            bom_count,
            checklists.iter().map(|c| c.stats.clone()).collect(),
        );
        let summary_rows = summary_rows(wo, &req.batch, &summary);

        Ok(CheckReport {
            work_order: req.work_order.clone(),
            batch: req.batch.clone(),
            generated_at: Local::now(),
            bom: bom.diagnostics,
            bom_item_count: bom_count,
            warnings,
            checklists,
            summary,
            summary_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;

    fn text_grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| Cell::from(*c)).collect())
            .collect()
    }

    fn service() -> CheckService {
        CheckService::new(ReconSettings::default()).unwrap()
    }

    #[test]
    fn no_checklists_is_rejected() {
        let req = CheckRequest {
            work_order: String::new(),
            batch: String::new(),
            bom: SheetInput::new("BOM", Vec::new()),
            checklists: Vec::new(),
        };
        let err = service().run(&req).unwrap_err();
        assert!(matches!(err, CheckError::NoChecklists));
    }

    #[test]
    fn bad_mapping_blocks_whole_run() {
        let req = CheckRequest {
            work_order: "W".into(),
            batch: String::new(),
            bom: SheetInput::new("BOM", text_grid(&[&["料号", "数量"], &["1001", "1"]])),
            checklists: vec![SheetInput::new("清单", text_grid(&[&["1001", "1"]]))
                .with_mapping(MappingConfig::new(0, 1, 1))],
        };
        let err = service().run(&req).unwrap_err();
        assert!(matches!(err, CheckError::SameColumn { ref sheet, .. } if sheet == "清单"));
    }

    #[test]
    fn run_with_auto_mapping() {
        let req = CheckRequest {
            work_order: "WO-7".into(),
            batch: "50".into(),
            bom: SheetInput::new(
                "BOM",
                text_grid(&[
                    &["料号", "名称", "用量", "替代料"],
                    &["1001", "螺丝", "4", "2002"],
                    &["1002", "垫片", "2", ""],
                ]),
            ),
            checklists: vec![
                SheetInput::new(
                    "装箱单",
                    text_grid(&[&["箱号", "料号", "实收数"], &["1", "2002", "4"], &["2", "1002", "2"]]),
                ),
                SheetInput::new("空清单", text_grid(&[&["料号", "数量"]])),
            ],
        };
        let report = service().run(&req).unwrap();

        assert_eq!(report.bom_item_count, 2);
        assert_eq!(report.checklists.len(), 2);
        let first = &report.checklists[0];
        assert_eq!(first.records[0].status, MatchStatus::OkWithSubstitute);
        assert_eq!(first.records[0].box_sources, vec!["1"]);
        assert_eq!(first.records[1].status, MatchStatus::Ok);
        assert_eq!(first.stats.pass_rate, 100.0);

        let second = &report.checklists[1];
        assert!(second.records.iter().all(|r| r.status == MatchStatus::NgMissing));
        assert_eq!(report.warnings, vec!["⚠️ 空清单数据为空，请检查文件".to_string()]);
        assert_eq!(report.summary.total_substitute_ok, 1);
        assert_eq!(report.summary_rows[0], SummaryRow::new("工单号", "WO-7"));
    }

    #[test]
    fn merged_header_without_mapping_still_runs() {
        let req = CheckRequest {
            work_order: "W".into(),
            batch: String::new(),
            bom: SheetInput::new("BOM", text_grid(&[&["料号", "数量"], &["1001", "2"]])),
            checklists: vec![SheetInput::new(
                "清单",
                vec![
                    vec![Cell::from("料号 数量"), Cell::Empty],
                    vec![Cell::from("1001"), Cell::Number(2.0)],
                ],
            )],
        };
        let report = service().run(&req).unwrap();
        let list = &report.checklists[0];
        assert_eq!(list.diagnostics.parsed_items, 1);
        assert_eq!(list.records[0].status, MatchStatus::Ok);
    }

    #[test]
    fn invalid_label_rejected_at_construction() {
        let mut settings = ReconSettings::default();
        settings.labels.ok_with_substitute = "含替料".into();
        assert!(CheckService::new(settings).is_err());
    }
}
