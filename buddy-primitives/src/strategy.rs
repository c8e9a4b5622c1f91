//! Generated strategy sections and the output schema check.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// The three sections of a generated strategy, in presentation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Go-to-market strategy.
    GtmStrategy,
    /// Feature roadmap.
    FeatureRoadmap,
    /// SWOT analysis.
    SwotAnalysis,
}

impl SectionKind {
    /// Every section, in presentation order.
    pub const ALL: [Self; 3] = [Self::GtmStrategy, Self::FeatureRoadmap, Self::SwotAnalysis];

    /// Human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::GtmStrategy => "GTM Strategy",
            Self::FeatureRoadmap => "Feature Roadmap",
            Self::SwotAnalysis => "SWOT Analysis",
        }
    }

    /// JSON key of the section within a [`StrategyResult`].
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::GtmStrategy => "gtmStrategy",
            Self::FeatureRoadmap => "featureRoadmap",
            Self::SwotAnalysis => "swotAnalysis",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A section exposes its fields as ordered `(field_name, value)` pairs.
pub trait Section {
    /// Which section this is.
    fn kind(&self) -> SectionKind;

    /// Field names (camelCase, as serialized) and values in declaration order.
    fn fields(&self) -> Vec<(&'static str, &str)>;
}

/// Go-to-market strategy.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GtmStrategy {
    /// Description of the target users.
    pub target_users: String,
    /// Acquisition channels.
    pub acquisition_channels: String,
    /// Monetization model.
    pub monetization_model: String,
    /// Positioning statement.
    pub positioning_statement: String,
}

impl Section for GtmStrategy {
    fn kind(&self) -> SectionKind {
        SectionKind::GtmStrategy
    }

    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("targetUsers", &self.target_users),
            ("acquisitionChannels", &self.acquisition_channels),
            ("monetizationModel", &self.monetization_model),
            ("positioningStatement", &self.positioning_statement),
        ]
    }
}

/// Feature roadmap.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRoadmap {
    /// MVP features.
    pub mvp_features: String,
    /// v1.0 improvements.
    pub v1_improvements: String,
    /// Future or stretch features.
    pub stretch_features: String,
}

impl Section for FeatureRoadmap {
    fn kind(&self) -> SectionKind {
        SectionKind::FeatureRoadmap
    }

    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("mvpFeatures", &self.mvp_features),
            ("v1Improvements", &self.v1_improvements),
            ("stretchFeatures", &self.stretch_features),
        ]
    }
}

/// SWOT analysis.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwotAnalysis {
    /// Strengths.
    pub strengths: String,
    /// Weaknesses.
    pub weaknesses: String,
    /// Opportunities.
    pub opportunities: String,
    /// Threats.
    pub threats: String,
}

impl Section for SwotAnalysis {
    fn kind(&self) -> SectionKind {
        SectionKind::SwotAnalysis
    }

    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("strengths", &self.strengths),
            ("weaknesses", &self.weaknesses),
            ("opportunities", &self.opportunities),
            ("threats", &self.threats),
        ]
    }
}

/// Aggregate of the three generated sections.
///
/// Produced once per successful generation and never mutated; a regeneration
/// replaces it wholesale.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    /// Go-to-market strategy.
    pub gtm_strategy: GtmStrategy,
    /// Feature roadmap.
    pub feature_roadmap: FeatureRoadmap,
    /// SWOT analysis.
    pub swot_analysis: SwotAnalysis,
}

impl StrategyResult {
    /// Returns the requested section.
    #[must_use]
    pub fn section(&self, kind: SectionKind) -> &dyn Section {
        match kind {
            SectionKind::GtmStrategy => &self.gtm_strategy,
            SectionKind::FeatureRoadmap => &self.feature_roadmap,
            SectionKind::SwotAnalysis => &self.swot_analysis,
        }
    }

    /// Returns all sections in presentation order.
    #[must_use]
    pub fn sections(&self) -> [&dyn Section; 3] {
        [&self.gtm_strategy, &self.feature_roadmap, &self.swot_analysis]
    }

    /// Checks that every field carries non-whitespace content.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] naming every empty field as `section.field`.
    pub fn check_schema(&self) -> Result<(), SchemaError> {
        let empty: Vec<String> = self
            .sections()
            .iter()
            .flat_map(|section| {
                let key = section.kind().key();
                section
                    .fields()
                    .into_iter()
                    .filter(|(_, value)| value.trim().is_empty())
                    .map(move |(name, _)| format!("{key}.{name}"))
            })
            .collect();

        if empty.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::new(empty))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StrategyResult {
        StrategyResult {
            gtm_strategy: GtmStrategy {
                target_users: "Busy professionals".into(),
                acquisition_channels: "App stores, fitness influencers".into(),
                monetization_model: "Freemium subscription".into(),
                positioning_statement: "Your pocket personal trainer".into(),
            },
            feature_roadmap: FeatureRoadmap {
                mvp_features: "Workout generator".into(),
                v1_improvements: "Wearable sync".into(),
                stretch_features: "Live coaching".into(),
            },
            swot_analysis: SwotAnalysis {
                strengths: "Personalisation".into(),
                weaknesses: "Crowded market".into(),
                opportunities: "Corporate wellness".into(),
                threats: "Big-tech incumbents".into(),
            },
        }
    }

    #[test]
    fn deserializes_camel_case_schema() {
        let json = r#"{
            "gtmStrategy": {
                "targetUsers": "a", "acquisitionChannels": "b",
                "monetizationModel": "c", "positioningStatement": "d"
            },
            "featureRoadmap": {"mvpFeatures": "e", "v1Improvements": "f", "stretchFeatures": "g"},
            "swotAnalysis": {"strengths": "h", "weaknesses": "i", "opportunities": "j", "threats": "k"}
        }"#;

        let parsed: StrategyResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.feature_roadmap.v1_improvements, "f");
        assert!(parsed.check_schema().is_ok());
    }

    #[test]
    fn missing_field_fails_to_deserialize() {
        let json = r#"{
            "gtmStrategy": {"targetUsers": "a"},
            "featureRoadmap": {"mvpFeatures": "e", "v1Improvements": "f", "stretchFeatures": "g"},
            "swotAnalysis": {"strengths": "h", "weaknesses": "i", "opportunities": "j", "threats": "k"}
        }"#;

        assert!(serde_json::from_str::<StrategyResult>(json).is_err());
    }

    #[test]
    fn schema_check_names_every_empty_field() {
        let mut result = sample();
        result.gtm_strategy.target_users = "   ".into();
        result.swot_analysis.threats = String::new();

        let err = result.check_schema().expect_err("empty fields");
        assert_eq!(
            err.empty_fields(),
            &["gtmStrategy.targetUsers".to_owned(), "swotAnalysis.threats".to_owned()]
        );
    }

    #[test]
    fn fields_follow_declaration_order() {
        let result = sample();
        let names: Vec<_> = result
            .section(SectionKind::FeatureRoadmap)
            .fields()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["mvpFeatures", "v1Improvements", "stretchFeatures"]);
        assert_eq!(result.sections().len(), SectionKind::ALL.len());
    }
}
