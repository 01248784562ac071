use crate::models::idea::{AiAnalysis, Recommendation};

fn numbered(heading: &str, items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let lines: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect();
    Some(format!("**{heading}:**\n{}", lines.join("\n")))
}

fn banner(recommendation: Recommendation) -> &'static str {
    match recommendation {
        Recommendation::Approve => {
            "✅ **Recommendation: Approved**\nThis idea shows strong potential and aligns well with your goals."
        }
        Recommendation::Reject => {
            "❌ **Recommendation: Not Recommended**\nThere are significant challenges that make this idea less viable at this time."
        }
        Recommendation::NeedsWork => {
            "⚠️ **Recommendation: Needs Work**\nThis idea has potential but requires some refinement before moving forward."
        }
    }
}

/// Conversational thread entry for a completed analysis. Empty sections are left out.
pub fn render_comment(summary: Option<&str>, analysis: &AiAnalysis) -> String {
    let mut sections: Vec<String> = Vec::new();
    if let Some(summary) = summary {
        sections.push(summary.to_string());
    }
    sections.push(banner(analysis.recommendation).to_string());
    sections.extend(numbered("Key Strengths", &analysis.pros));
    sections.extend(numbered("Areas of Concern", &analysis.cons));
    sections.extend(numbered("Suggested Next Steps", &analysis.suggestions));
    sections.join("\n\n")
}

/// Rating of the AI entry: mean of feasibility and market potential, halves rounded up.
pub fn ai_rating(analysis: &AiAnalysis) -> i16 {
    (i16::from(analysis.feasibility) + i16::from(analysis.market_potential) + 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn analysis(recommendation: Recommendation) -> AiAnalysis {
        AiAnalysis {
            feasibility: 8,
            market_potential: 7,
            technical_complexity: 4,
            pros: vec!["Cheap".into(), "Loved by users".into()],
            cons: vec![],
            risks: vec!["Scope creep".into()],
            recommendation,
            suggestions: vec!["Prototype it".into()],
            full_analysis: "Good idea.".into(),
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn renders_sections_in_order_and_skips_empty_ones() {
        let text = render_comment(Some("Good idea."), &analysis(Recommendation::Approve));
        assert_eq!(
            text,
            "Good idea.\n\n\
             ✅ **Recommendation: Approved**\nThis idea shows strong potential and aligns well with your goals.\n\n\
             **Key Strengths:**\n1. Cheap\n2. Loved by users\n\n\
             **Suggested Next Steps:**\n1. Prototype it"
        );
        assert!(!text.contains("Areas of Concern"));
    }

    #[test]
    fn banner_follows_recommendation() {
        assert!(render_comment(None, &analysis(Recommendation::Reject)).starts_with("❌ **Recommendation: Not Recommended**"));
        assert!(render_comment(None, &analysis(Recommendation::NeedsWork)).starts_with("⚠️ **Recommendation: Needs Work**"));
    }

    #[test]
    fn rating_rounds_half_up() {
        assert_eq!(ai_rating(&analysis(Recommendation::Approve)), 8);
        let mut even = analysis(Recommendation::Approve);
        even.market_potential = 6;
        assert_eq!(ai_rating(&even), 7);
    }
}
