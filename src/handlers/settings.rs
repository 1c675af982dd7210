//! Settings page: connected data sources and import history

use assistant_types::{QueryActionResult, QueryType};
use serde_json::json;

use super::common::{format_number, navigation_only, respond};
use super::QueryContext;
use crate::data::{int, text, DataImport, DataSourceRow};
use crate::error::Result;

const SETTINGS_SUGGESTIONS: &[&str] = &["연결된 데이터 소스 보여줘", "최근 import 내역은?", "매장 설정 열어줘"];

pub async fn handle(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    match ctx.query_type {
        QueryType::DataSources => {
            let sources = ctx.source.data_sources(&ctx.scope).await?;
            Ok(respond(
                ctx,
                describe_sources(&sources),
                SETTINGS_SUGGESTIONS,
                Some(sources_json(&sources)),
            ))
        }
        QueryType::ImportHistory => {
            let imports = ctx.source.data_imports(&ctx.scope, &ctx.date_range).await?;
            let message = format!("{} {}", ctx.period(), describe_imports(&imports));
            Ok(respond(
                ctx,
                message,
                SETTINGS_SUGGESTIONS,
                Some(imports_json(&imports)),
            ))
        }
        QueryType::ApiConnections => Ok(navigation_only(ctx, "API 연결", SETTINGS_SUGGESTIONS)),
        QueryType::UserManagement => Ok(navigation_only(ctx, "사용자 관리", SETTINGS_SUGGESTIONS)),
        QueryType::SystemSettings => Ok(navigation_only(ctx, "시스템 설정", SETTINGS_SUGGESTIONS)),
        QueryType::LicenseInfo => Ok(navigation_only(ctx, "라이선스", SETTINGS_SUGGESTIONS)),
        _ => Ok(navigation_only(ctx, "매장 설정", SETTINGS_SUGGESTIONS)),
    }
}

// ============================================================================
// SHARED WITH THE DATA CONTROL TOWER
// ============================================================================

pub(super) fn describe_sources(sources: &[DataSourceRow]) -> String {
    if sources.is_empty() {
        return "연결된 데이터 소스가 없어요.".to_string();
    }
    let connected = sources
        .iter()
        .filter(|s| matches!(text(&s.status), "connected" | "active"))
        .count();
    let mut lines = vec![format!(
        "데이터 소스 {}개 중 {}개가 정상 연결되어 있어요.",
        sources.len(),
        connected
    )];
    lines.extend(sources.iter().map(|s| {
        let synced = s
            .last_synced_at
            .map(|t| format!(", 마지막 동기화 {}", t.format("%m/%d %H:%M")))
            .unwrap_or_default();
        format!(
            "• {} ({}): {}{}",
            text(&s.source_name),
            text(&s.source_type),
            text(&s.status),
            synced
        )
    }));
    lines.join("\n")
}

pub(super) fn sources_json(sources: &[DataSourceRow]) -> serde_json::Value {
    json!({
        "sources": sources
            .iter()
            .map(|s| json!({
                "name": text(&s.source_name),
                "type": text(&s.source_type),
                "status": text(&s.status),
                "lastSyncedAt": s.last_synced_at,
            }))
            .collect::<Vec<_>>(),
    })
}

pub(super) fn describe_imports(imports: &[DataImport]) -> String {
    if imports.is_empty() {
        return "데이터 import 내역이 없어요.".to_string();
    }
    let failed = imports
        .iter()
        .filter(|i| text(&i.status) == "failed")
        .count();
    let mut lines = vec![format!(
        "데이터 import {}건 (실패 {}건)이 있어요.",
        imports.len(),
        failed
    )];
    lines.extend(imports.iter().take(5).map(|i| {
        format!(
            "• {} [{}] {}행 - {}",
            text(&i.file_name),
            text(&i.import_type),
            format_number(int(i.row_count)),
            text(&i.status)
        )
    }));
    lines.join("\n")
}

pub(super) fn imports_json(imports: &[DataImport]) -> serde_json::Value {
    json!({
        "imports": imports
            .iter()
            .map(|i| json!({
                "fileName": text(&i.file_name),
                "type": text(&i.import_type),
                "status": text(&i.status),
                "rowCount": int(i.row_count),
                "importedAt": i.imported_at,
            }))
            .collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::{context, MemorySource};
    use super::*;
    use assistant_types::{PageContext, UiAction};

    #[tokio::test]
    async fn test_data_sources_summary() {
        let source = MemorySource {
            sources: vec![
                DataSourceRow {
                    source_name: Some("POS".into()),
                    source_type: Some("pos".into()),
                    status: Some("connected".into()),
                    last_synced_at: None,
                },
                DataSourceRow {
                    source_name: Some("센서".into()),
                    source_type: Some("wifi".into()),
                    status: Some("error".into()),
                    last_synced_at: None,
                },
            ],
            ..MemorySource::default()
        };
        let page = PageContext::new("/settings");
        let ctx = context(&source, &page, QueryType::DataSources, &[]);

        let result = handle(&ctx).await.unwrap();
        assert!(result.message.contains("2개 중 1개"));
        assert_eq!(result.actions[0], UiAction::set_tab("data"));
    }

    #[tokio::test]
    async fn test_license_is_navigation_only() {
        let source = MemorySource::default();
        let page = PageContext::with_tab("/insights", "overview");
        let ctx = context(&source, &page, QueryType::LicenseInfo, &[]);

        let result = handle(&ctx).await.unwrap();
        assert_eq!(result.actions[0], UiAction::navigate("/settings?tab=license"));
        assert_eq!(source.calls(), 0);
    }
}
