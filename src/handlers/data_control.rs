//! Data control tower: source health, imports, pipeline

use assistant_types::{QueryActionResult, QueryType};
use serde_json::json;

use super::common::{navigation_only, respond};
use super::settings::{describe_imports, describe_sources, imports_json, sources_json};
use super::QueryContext;
use crate::data::text;
use crate::error::Result;

const CONTROL_SUGGESTIONS: &[&str] = &["데이터 품질 점수는?", "파이프라인 상태 알려줘", "최근 import 보여줘"];

pub async fn handle(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    match ctx.query_type {
        QueryType::DataSourceStatus => {
            let sources = ctx.source.data_sources(&ctx.scope).await?;
            Ok(respond(
                ctx,
                describe_sources(&sources),
                CONTROL_SUGGESTIONS,
                Some(sources_json(&sources)),
            ))
        }
        QueryType::RecentImports => {
            let imports = ctx.source.data_imports(&ctx.scope, &ctx.date_range).await?;
            let message = format!("{} {}", ctx.period(), describe_imports(&imports));
            Ok(respond(ctx, message, CONTROL_SUGGESTIONS, Some(imports_json(&imports))))
        }
        QueryType::PipelineStatus => pipeline(ctx).await,
        QueryType::DataLineage => Ok(navigation_only(ctx, "데이터 계보", CONTROL_SUGGESTIONS)),
        _ => Ok(navigation_only(ctx, "데이터 품질", CONTROL_SUGGESTIONS)),
    }
}

/// Pipeline health derived from source sync state and recent import results
async fn pipeline(ctx: &QueryContext<'_>) -> Result<QueryActionResult> {
    let sources = ctx.source.data_sources(&ctx.scope).await?;
    let imports = ctx.source.data_imports(&ctx.scope, &ctx.date_range).await?;

    let unhealthy: Vec<&str> = sources
        .iter()
        .filter(|s| !matches!(text(&s.status), "connected" | "active"))
        .map(|s| text(&s.source_name))
        .collect();
    let failed = imports
        .iter()
        .filter(|i| text(&i.status) == "failed")
        .count();
    let healthy = unhealthy.is_empty() && failed == 0;

    let message = if healthy {
        format!(
            "데이터 파이프라인이 정상 동작 중이에요. 소스 {}개, {} import {}건 모두 정상입니다.",
            sources.len(),
            ctx.period(),
            imports.len()
        )
    } else {
        let mut lines = vec!["데이터 파이프라인에 확인이 필요한 항목이 있어요.".to_string()];
        if !unhealthy.is_empty() {
            lines.push(format!("• 연결 이상 소스: {}", unhealthy.join(", ")));
        }
        if failed > 0 {
            lines.push(format!("• 실패한 import: {failed}건"));
        }
        lines.join("\n")
    };
    let data = json!({
        "healthy": healthy,
        "unhealthySources": unhealthy,
        "failedImports": failed,
    });
    Ok(respond(ctx, message, CONTROL_SUGGESTIONS, Some(data)))
}
