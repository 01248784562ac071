use crate::models::idea::Idea;
use crate::models::startup::Startup;

/// Advisor prompt with company context and the JSON shape the answer must follow.
pub fn build_prompt(startup: Option<&Startup>, idea: &Idea) -> String {
    let name = startup.map(|s| s.name.as_str()).unwrap_or("Startup");
    let domain = startup.and_then(|s| s.domain.as_deref()).unwrap_or("Technology");
    let stage = startup.and_then(|s| s.stage.as_deref()).unwrap_or("Early stage");

    format!(
        r#"You are a startup advisor analyzing a new idea/feature proposal.

**Company Context:**
Name: {name}
Industry: {domain}
Stage: {stage}

**Idea Details:**
Title: {title}
Description: {description}
Category: {category}

**Task:**
Analyze this idea and provide:

1. **Feasibility Score** (1-10): How technically viable is this?
2. **Market Potential** (1-10): Business value and market demand
3. **Technical Complexity** (1-10): Implementation difficulty
4. **Pros** (3 key benefits, be specific)
5. **Cons** (3 potential drawbacks)
6. **Risks** (2-3 main risks to consider)
7. **Recommendation**: Choose ONE: approve, needs-work, or reject
8. **Suggestions** (2-3 actionable next steps)

Format your response as JSON:
{{
  "feasibility": <number>,
  "marketPotential": <number>,
  "technicalComplexity": <number>,
  "pros": ["...", "...", "..."],
  "cons": ["...", "...", "..."],
  "risks": ["...", "..."],
  "recommendation": "approve|needs-work|reject",
  "suggestions": ["...", "...", "..."],
  "summary": "Brief 2-3 sentence overall assessment"
}}"#,
        title = idea.title,
        description = idea.description,
        category = idea.category,
    )
}
