//! Prompt builders. Each prompt pins the JSON shape the parser expects.

const JSON_ONLY: &str = "Respond with JSON only. No markdown, no commentary.";

pub fn analyze_idea(idea: &str, niche: &str) -> String {
    format!(
        "You are a viral content strategist for {niche} creators.\n\
         Score this short-form video idea from 0 to 100 for its viral potential \
         and explain the verdict in one sentence.\n\
         Idea: \"{idea}\"\n\
         {JSON_ONLY}\n\
         Shape: {{\"score\": 0-100, \"verdict\": \"...\", \"strengths\": [\"...\"], \
         \"weaknesses\": [\"...\"], \"improved_angle\": \"...\"}}"
    )
}

pub fn vision_bios(niche: &str, vision: &str, tone: &str) -> String {
    format!(
        "Write three social media bios for a {niche} creator whose vision is: \"{vision}\".\n\
         Tone: {tone}. One bio each for Instagram, TikTok and YouTube, \
         respecting each platform's length limits.\n\
         {JSON_ONLY}\n\
         Shape: [{{\"platform\": \"instagram\", \"text\": \"...\"}}]"
    )
}

pub fn blueprint(topic: &str, niche: &str, duration_secs: u32) -> String {
    format!(
        "Write a {duration_secs}-second short-form video script about \"{topic}\" \
         for a {niche} audience.\n\
         Split it into a scroll-stopping hook (first 3 seconds), the meat (the value), \
         a call to action, and one practical filming setup tip.\n\
         {JSON_ONLY}\n\
         Shape: {{\"hook\": \"...\", \"meat\": \"...\", \"cta\": \"...\", \"setup_tip\": \"...\"}}"
    )
}

pub fn platform_blueprints(topic: &str, niche: &str) -> String {
    format!(
        "Write three versions of a short-form video script about \"{topic}\" for a \
         {niche} audience: one tuned for TikTok, one for Instagram Reels and one for \
         YouTube Shorts. Each has a hook, meat, cta and setup_tip.\n\
         {JSON_ONLY}\n\
         Shape: {{\"tiktok\": {{\"hook\": \"...\", \"meat\": \"...\", \"cta\": \"...\", \"setup_tip\": \"...\"}}, \
         \"instagram\": {{...same keys}}, \"youtube\": {{...same keys}}}}"
    )
}

pub fn captions(topic: &str, platform: &str, tone: &str) -> String {
    format!(
        "Write three {platform} captions for a post about \"{topic}\".\n\
         Tone: {tone}. Each caption should end with a question that invites comments. \
         Do not include hashtags.\n\
         {JSON_ONLY}\n\
         Shape: [\"caption one\", \"caption two\", \"caption three\"]"
    )
}

pub fn hashtags(topic: &str, niche: &str, count: usize) -> String {
    format!(
        "Suggest {count} hashtags for a {niche} post about \"{topic}\". Mix broad, \
         mid-size and niche tags.\n\
         {JSON_ONLY}\n\
         Shape: [\"#tag\", \"#tag\"]"
    )
}

pub fn hook_variations(topic: &str, count: usize) -> String {
    format!(
        "Write {count} different opening hooks for a short-form video about \"{topic}\". \
         Each hook must be under 15 words and use a different technique \
         (question, bold claim, curiosity gap, story, statistic).\n\
         {JSON_ONLY}\n\
         Shape: [\"hook\", \"hook\"]"
    )
}

pub fn content_ideas(niche: &str, count: usize) -> String {
    format!(
        "Generate {count} short-form video ideas for a {niche} creator.\n\
         {JSON_ONLY}\n\
         Shape: [{{\"title\": \"...\", \"angle\": \"...\", \"format\": \"talking head | tutorial | storytime | listicle\"}}]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_carry_inputs_and_shape() {
        let p = blueprint("morning routines", "fitness", 45);
        assert!(p.contains("morning routines"));
        assert!(p.contains("45-second"));
        assert!(p.contains("\"setup_tip\""));
        assert!(p.contains(JSON_ONLY));

        let h = hashtags("meal prep", "nutrition", 12);
        assert!(h.starts_with("Suggest 12 hashtags"));
    }
}
