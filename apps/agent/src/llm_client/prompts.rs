// Prompt constants for the query-generation call.

/// Skill profile the generated queries are biased toward.
pub const SKILL_FOCUS: &str =
    "Generative AI, Data Science, Python, Computer Vision, Deep Learning";

/// Location profile the generated queries are biased toward.
pub const LOCATION_FOCUS: &str = "India (Remote or On-site)";

/// Query-generation prompt template. Replace `{resume}` before sending.
pub const QUERY_PROMPT_TEMPLATE: &str = r#"Analyze this resume and generate 5 job search queries for LinkedIn/Indeed.
Focus on skills: {skills}.
Location: {location}.

Respond with ONLY a JSON array of exactly 5 strings, one query per string,
each in the form "Role | Location". No markdown fences, no commentary.

Example: ["Data Scientist | India", "Python Developer | India"]

Resume context:
{resume}"#;

/// Builds the query-generation prompt for one resume.
pub fn build_query_prompt(resume_context: &str) -> String {
    QUERY_PROMPT_TEMPLATE
        .replace("{skills}", SKILL_FOCUS)
        .replace("{location}", LOCATION_FOCUS)
        .replace("{resume}", resume_context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_prompt_substitutes_all_placeholders() {
        let prompt = build_query_prompt("worked on CV pipelines");
        assert!(prompt.contains("worked on CV pipelines"));
        assert!(prompt.contains(SKILL_FOCUS));
        assert!(prompt.contains(LOCATION_FOCUS));
        assert!(!prompt.contains("{resume}"));
        assert!(!prompt.contains("{skills}"));
        assert!(!prompt.contains("{location}"));
    }
}
