//! Generated content shapes

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Bios and captions come in sets of at least this many
pub const MIN_SET_LEN: usize = 3;

/// Where a generated value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Live,
    Mock,
}

/// Generated payload tagged with its source
#[derive(Debug, Clone, Serialize)]
pub struct Generated<T> {
    pub data: T,
    pub source: Source,
}

impl<T> Generated<T> {
    pub fn live(data: T) -> Self {
        Self { data, source: Source::Live }
    }

    pub fn mock(data: T) -> Self {
        Self { data, source: Source::Mock }
    }

    #[cfg(test)]
    pub fn is_mock(&self) -> bool {
        self.source == Source::Mock
    }
}

/// Shape checks applied to parsed model output before it is trusted
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for String {
    fn validate(&self) -> Result<(), String> {
        if self.trim().is_empty() {
            Err("blank string".to_string())
        } else {
            Ok(())
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("empty list".to_string());
        }
        self.iter().try_for_each(Validate::validate)
    }
}

/// At least `min` items, each of them valid
pub fn at_least<T: Validate>(items: &[T], min: usize) -> Result<(), String> {
    if items.len() < min {
        return Err(format!("expected at least {} items, got {}", min, items.len()));
    }
    items.iter().try_for_each(Validate::validate)
}

fn non_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("`{}` is blank", field))
    } else {
        Ok(())
    }
}

/// Verdict on a content idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaAnalysis {
    /// 0..=100
    pub score: u8,
    pub verdict: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default, alias = "improvedAngle")]
    pub improved_angle: String,
}

impl Validate for IdeaAnalysis {
    fn validate(&self) -> Result<(), String> {
        if self.score > 100 {
            return Err(format!("score {} out of range", self.score));
        }
        non_blank("verdict", &self.verdict)
    }
}

/// Profile bio for one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bio {
    pub platform: String,
    pub text: String,
}

impl Validate for Bio {
    fn validate(&self) -> Result<(), String> {
        non_blank("platform", &self.platform)?;
        non_blank("text", &self.text)
    }
}

/// A full bio set: enough bios, one per platform
pub fn validate_bio_set(bios: &[Bio]) -> Result<(), String> {
    at_least(bios, MIN_SET_LEN)?;

    let mut platforms = HashSet::new();
    match bios
        .iter()
        .find(|bio| !platforms.insert(bio.platform.trim().to_lowercase()))
    {
        Some(dup) => Err(format!("duplicate platform `{}`", dup.platform)),
        None => Ok(()),
    }
}

/// Short-form video script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub hook: String,
    pub meat: String,
    pub cta: String,
    #[serde(default, alias = "setupTip")]
    pub setup_tip: String,
}

impl Validate for Blueprint {
    fn validate(&self) -> Result<(), String> {
        non_blank("hook", &self.hook)?;
        non_blank("meat", &self.meat)?;
        non_blank("cta", &self.cta)
    }
}

/// One blueprint per short-form platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformBlueprints {
    pub tiktok: Blueprint,
    pub instagram: Blueprint,
    pub youtube: Blueprint,
}

impl Validate for PlatformBlueprints {
    fn validate(&self) -> Result<(), String> {
        self.tiktok.validate()?;
        self.instagram.validate()?;
        self.youtube.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentIdea {
    pub title: String,
    pub angle: String,
    #[serde(default)]
    pub format: String,
}

impl Validate for ContentIdea {
    fn validate(&self) -> Result<(), String> {
        non_blank("title", &self.title)?;
        non_blank("angle", &self.angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_validation_rejects_empty_and_blank_items() {
        assert!(Vec::<String>::new().validate().is_err());
        assert!(vec!["ok".to_string(), " ".to_string()].validate().is_err());
        assert!(vec!["ok".to_string()].validate().is_ok());
    }

    #[test]
    fn sets_need_minimum_length() {
        let two = vec!["a".to_string(), "b".to_string()];
        assert!(at_least(&two, MIN_SET_LEN).is_err());
        let three = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(at_least(&three, MIN_SET_LEN).is_ok());
    }

    #[test]
    fn bio_set_needs_distinct_platforms() {
        let bio = |platform: &str| Bio { platform: platform.to_string(), text: "hi".to_string() };

        assert!(validate_bio_set(&[bio("tiktok"), bio("instagram")]).is_err());
        let err = validate_bio_set(&[bio("tiktok"), bio("instagram"), bio("TikTok ")]).unwrap_err();
        assert!(err.contains("duplicate platform"));
        assert!(validate_bio_set(&[bio("tiktok"), bio("instagram"), bio("youtube")]).is_ok());
    }

    #[test]
    fn idea_analysis_score_is_bounded() {
        let mut analysis = IdeaAnalysis {
            score: 101,
            verdict: "Strong".to_string(),
            strengths: vec![],
            weaknesses: vec![],
            improved_angle: String::new(),
        };
        assert!(analysis.validate().is_err());
        analysis.score = 100;
        assert!(analysis.validate().is_ok());
    }

    #[test]
    fn blueprint_accepts_camel_case_setup_tip() {
        let bp: Blueprint = serde_json::from_str(
            r#"{"hook":"h","meat":"m","cta":"c","setupTip":"ring light"}"#,
        )
        .unwrap();
        assert_eq!(bp.setup_tip, "ring light");
    }

    #[test]
    fn generated_serializes_source_lowercase() {
        let value = serde_json::to_value(Generated::mock(vec!["#a".to_string()])).unwrap();
        assert_eq!(value["source"], "mock");
        assert_eq!(value["data"][0], "#a");
    }
}
