//! Static fallback content served when live generation is unavailable

use super::types::{Bio, Blueprint, ContentIdea, IdeaAnalysis, PlatformBlueprints};

pub fn idea_analysis(idea: &str, niche: &str) -> IdeaAnalysis {
    let words = idea.split_whitespace().count().min(20) as u8;
    // Specific ideas score higher than one-liners
    let score = (55 + words * 2).min(95);

    IdeaAnalysis {
        score,
        verdict: format!("Solid {} angle with room to sharpen the hook.", niche),
        strengths: vec![
            "Clear audience fit".to_string(),
            "Easy to film in one take".to_string(),
        ],
        weaknesses: vec![
            "Opening line needs more tension".to_string(),
            "Add a concrete result or number".to_string(),
        ],
        improved_angle: format!("The one {} mistake nobody talks about: {}", niche, idea),
    }
}

pub fn vision_bios(niche: &str, vision: &str) -> Vec<Bio> {
    vec![
        Bio {
            platform: "instagram".to_string(),
            text: format!("{} creator | {}\nNew drops every week. DM \"START\"", capitalize(niche), vision),
        },
        Bio {
            platform: "tiktok".to_string(),
            text: format!("Daily {} tips that actually work. {}", niche, vision),
        },
        Bio {
            platform: "youtube".to_string(),
            text: format!(
                "Helping you win at {}. {} Subscribe for weekly breakdowns.",
                niche, vision
            ),
        },
    ]
}

pub fn blueprint(topic: &str, niche: &str) -> Blueprint {
    Blueprint {
        hook: format!("Stop scrolling if you care about {}.", topic),
        meat: format!(
            "Here are the three things every {} creator gets wrong about {}: \
             they start too slow, they skip the proof, and they never repeat the win.",
            niche, topic
        ),
        cta: "Follow for part two and save this for later.".to_string(),
        setup_tip: "Film facing a window for free soft light and keep the phone at eye level."
            .to_string(),
    }
}

pub fn platform_blueprints(topic: &str, niche: &str) -> PlatformBlueprints {
    let base = blueprint(topic, niche);
    PlatformBlueprints {
        tiktok: Blueprint {
            hook: format!("POV: you finally figured out {}.", topic),
            ..base.clone()
        },
        instagram: Blueprint {
            cta: "Share this with a friend who needs it and save it for later.".to_string(),
            ..base.clone()
        },
        youtube: Blueprint {
            cta: "Subscribe so you don't miss the full breakdown.".to_string(),
            ..base
        },
    }
}

pub fn captions(topic: &str) -> Vec<String> {
    vec![
        format!("Nobody talks about this side of {}. Have you tried it yet?", topic),
        format!("Saving this {} breakdown for my future self. Which tip hit hardest?", topic),
        format!("Day one vs day thirty of {}. Where are you right now?", topic),
    ]
}

pub fn hashtags(topic: &str, niche: &str, count: usize) -> Vec<String> {
    let mut tags: Vec<String> = [niche, topic]
        .iter()
        .map(|s| s.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|s| !s.is_empty())
        .map(|s| format!("#{}", s.to_lowercase()))
        .collect();

    tags.extend(
        [
            "#contentcreator",
            "#creatortips",
            "#growthmindset",
            "#socialmediatips",
            "#viral",
            "#fyp",
            "#explorepage",
            "#reels",
            "#shorts",
            "#trending",
            "#smallcreator",
            "#contentstrategy",
            "#personalbrand",
            "#creatoreconomy",
            "#dailytips",
        ]
        .iter()
        .map(|s| s.to_string()),
    );

    super::service::normalize_hashtags(tags, count)
}

pub fn hook_variations(topic: &str, count: usize) -> Vec<String> {
    [
        format!("What if everything you know about {} is wrong?", topic),
        format!("I tried {} for 30 days. Here's what happened.", topic),
        format!("The {} trick nobody is using yet.", topic),
        format!("Stop doing {} like this.", topic),
        format!("9 out of 10 people get {} wrong.", topic),
        format!("This changed how I think about {}.", topic),
        format!("You're one tweak away from better {}.", topic),
        format!("Don't start {} until you watch this.", topic),
        format!("The lazy way to get results with {}.", topic),
        format!("Here's the {} advice I wish I had sooner.", topic),
    ]
    .into_iter()
    .take(count)
    .collect()
}

pub fn content_ideas(niche: &str, count: usize) -> Vec<ContentIdea> {
    let ideas = [
        ("Beginner mistakes", "three mistakes you made when starting out", "listicle"),
        ("Day in the life", "show the unglamorous parts of the work", "storytime"),
        ("Myth busting", "debunk the most common advice in the space", "talking head"),
        ("Quick win tutorial", "one result your viewer can get in five minutes", "tutorial"),
        ("Before and after", "a transformation with the exact steps", "tutorial"),
        ("Hot take", "an unpopular opinion you can defend", "talking head"),
        ("Tool stack", "everything you use and what it costs", "listicle"),
        ("Reacting to advice", "rate viral tips from other creators", "talking head"),
        ("Origin story", "why you started and what almost made you quit", "storytime"),
        ("Challenge", "a seven day challenge your audience can join", "listicle"),
    ];

    ideas
        .iter()
        .take(count)
        .map(|(title, angle, format)| ContentIdea {
            title: format!("{}: {}", capitalize(niche), title),
            angle: angle.to_string(),
            format: format.to_string(),
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
