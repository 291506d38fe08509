use crate::error::CheckError;
use crate::ingest::MappingSuggestion;
use crate::models::{Grid, SheetKind};
use crate::service::{CheckReport, CheckRequest, CheckService};
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 核对响应体
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub success: bool,
    pub message: String,
    pub report: Option<CheckReport>,
}

/// 列映射预判请求
#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub grid: Grid,
    pub kind: SheetKind,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub success: bool,
    pub message: String,
    pub suggestion: Option<MappingSuggestion>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

fn error_status(e: &CheckError) -> StatusCode {
    if e.is_precondition() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// 核对是纯 CPU 计算 (内部用 rayon)，放到阻塞线程池里跑
async fn run_blocking(service: Arc<CheckService>, req: CheckRequest) -> Result<CheckReport, CheckError> {
    tokio::task::spawn_blocking(move || service.run(&req))
        .await
        .map_err(|e| CheckError::Task(e.to_string()))?
}

/// 核对接口: 一份 BOM 对多份清单
pub async fn check(
    State(service): State<Arc<CheckService>>,
    Json(req): Json<CheckRequest>,
) -> Response {
    let checklist_count = req.checklists.len();
    match run_blocking(service, req).await {
        Ok(report) => {
            let ng: usize = report.checklists.iter().map(|c| c.stats.ng_count).sum();
            let response = CheckResponse {
                success: true,
                message: format!(
                    "Checked {} checklists against {} BOM items, {} NG",
                    checklist_count, report.bom_item_count, ng
                ),
                report: Some(report),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::warn!("核对失败: {}", e);
            let response = CheckResponse {
                success: false,
                message: format!("Error: {}", e),
                report: None,
            };
            (error_status(&e), Json(response)).into_response()
        }
    }
}

/// 导出接口: 全部比对行 CSV
pub async fn export_csv(
    State(service): State<Arc<CheckService>>,
    Json(req): Json<CheckRequest>,
) -> Response {
    match run_blocking(service, req).await.and_then(|report| report.to_csv()) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(e) => {
            let response = CheckResponse {
                success: false,
                message: format!("Error: {}", e),
                report: None,
            };
            (error_status(&e), Json(response)).into_response()
        }
    }
}

/// 列映射预判接口
pub async fn suggest_mapping(
    State(service): State<Arc<CheckService>>,
    Json(req): Json<SuggestRequest>,
) -> Response {
    match service.suggest(&req.grid, req.kind) {
        Some(suggestion) => {
            let response = SuggestResponse {
                success: true,
                message: format!("Header row {}", suggestion.mapping.header_row + 1),
                suggestion: Some(suggestion),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        None => {
            let response = SuggestResponse {
                success: false,
                message: "Error: 表格为空，无法识别列".to_string(),
                suggestion: None,
            };
            (StatusCode::BAD_REQUEST, Json(response)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconSettings;
    use crate::models::Cell;
    use crate::service::SheetInput;

    fn service() -> Arc<CheckService> {
        Arc::new(CheckService::new(ReconSettings::default()).unwrap())
    }

    fn request(checklists: Vec<SheetInput>) -> CheckRequest {
        let bom: Grid = vec![
            vec![Cell::from("料号"), Cell::from("数量")],
            vec![Cell::from("1001"), Cell::Number(3.0)],
        ];
        CheckRequest {
            work_order: "W1".into(),
            batch: String::new(),
            bom: SheetInput::new("BOM", bom),
            checklists,
        }
    }

    #[tokio::test]
    async fn health() {
        assert_eq!(health_check().await, "OK");
    }

    #[tokio::test]
    async fn check_ok_and_precondition_failure() {
        let list: Grid = vec![
            vec![Cell::from("料号"), Cell::from("数量")],
            vec![Cell::from("1001"), Cell::Number(3.0)],
        ];
        let resp = check(
            State(service()),
            Json(request(vec![SheetInput::new("清单", list)])),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = check(State(service()), Json(request(Vec::new()))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn export_is_csv() {
        let list: Grid = vec![
            vec![Cell::from("料号"), Cell::from("数量")],
            vec![Cell::from("1001"), Cell::Number(1.0)],
        ];
        let resp = export_csv(
            State(service()),
            Json(request(vec![SheetInput::new("清单", list)])),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn suggest_on_empty_grid_is_bad_request() {
        let resp = suggest_mapping(
            State(service()),
            Json(SuggestRequest { grid: Vec::new(), kind: SheetKind::Bom }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
