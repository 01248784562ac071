use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use crate::analysis::{TextGenerator, comment, parse, prompt};
use crate::audit;
use crate::errors::AppError;
use crate::models::idea::{self, AiAnalysis};
use crate::models::{feedback, startup};

/// Analyze one idea of `tenant` and attach the result.
///
/// Nothing is written until the upstream answer has been parsed; the analysis, the AI
/// feedback entry and the audit entry then commit together. A second run overwrites the
/// stored analysis and adds another AI entry.
pub async fn analyze_idea<G: TextGenerator>(
    pool: &PgPool,
    generator: &G,
    idea_id: i64,
    tenant: i64,
) -> Result<AiAnalysis, AppError> {
    let idea = idea::find_by_id(pool, idea_id, tenant).await?;
    let company = startup::find_by_id(pool, idea.startup_id).await?;

    let raw = generator.generate(&prompt::build_prompt(company.as_ref(), &idea)).await?;
    let parsed = parse::parse_analysis(&raw, Utc::now()).inspect_err(|e| {
        if let AppError::UpstreamParse { raw } = e {
            log::error!("Unparseable analysis for idea #{idea_id}: {raw}");
        }
    })?;

    let content = comment::render_comment(parsed.summary.as_deref(), &parsed.analysis);
    let rating = comment::ai_rating(&parsed.analysis);

    let mut tx = pool.begin().await?;
    idea::set_analysis(&mut tx, idea_id, &parsed.analysis).await?;
    feedback::insert_ai_entry(&mut tx, idea_id, &content, rating).await?;
    audit::log(
        &mut *tx,
        None,
        "idea.analyzed",
        "idea",
        idea_id,
        json!({
            "recommendation": parsed.analysis.recommendation,
            "score": parsed.analysis.score(),
        }),
    )
    .await?;
    tx.commit().await?;

    log::info!(
        "Idea #{idea_id} analyzed: {} (score {})",
        parsed.analysis.recommendation,
        parsed.analysis.score()
    );
    Ok(parsed.analysis)
}
