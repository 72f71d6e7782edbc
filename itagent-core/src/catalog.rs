//! Catalog entities: agent templates and capabilities

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{CapabilityType, EntityId, RatingBook, TemplateCategory, Timestamp};

/// Reusable agent configuration with a user-rating aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AgentTemplate {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub role: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    #[serde(default)]
    pub config: JsonValue,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub category: TemplateCategory,
    /// Times the template was cloned or exported.
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub is_featured: bool,
    /// Rank among featured templates, lowest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_order: Option<u32>,
    /// Average of all stored ratings.
    pub rating: f64,
    pub rating_count: u64,
    #[serde(skip)]
    pub ratings: RatingBook,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl AgentTemplate {
    /// Copy under a fresh id with usage, featuring and ratings reset.
    pub fn derive_copy(
        &self,
        id: EntityId,
        name: String,
        created_by: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            created_by,
            usage_count: 0,
            is_featured: false,
            recommendation_order: None,
            rating: 0.0,
            rating_count: 0,
            ratings: RatingBook::default(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}

/// A skill an agent can be equipped with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub capability_type: CapabilityType,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    #[serde(default)]
    pub parameters: JsonValue,
    pub rating: f64,
    pub rating_count: u64,
    #[serde(skip)]
    pub ratings: RatingBook,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// Entities whose `rating` and `rating_count` mirror a [`RatingBook`].
pub trait Rated {
    fn ratings_mut(&mut self) -> &mut RatingBook;
    fn set_aggregate(&mut self, average: f64, count: u64, now: Timestamp);

    /// Record a validated rating and refresh the aggregate fields.
    fn rate(&mut self, user_id: Option<&str>, rating: f64, now: Timestamp) -> (f64, u64) {
        let book = self.ratings_mut();
        book.record(user_id, rating);
        let (average, count) = (book.average(), book.count());
        self.set_aggregate(average, count, now);
        (average, count)
    }
}

impl Rated for AgentTemplate {
    fn ratings_mut(&mut self) -> &mut RatingBook {
        &mut self.ratings
    }

    fn set_aggregate(&mut self, average: f64, count: u64, now: Timestamp) {
        self.rating = average;
        self.rating_count = count;
        self.updated_at = now;
    }
}

impl Rated for Capability {
    fn ratings_mut(&mut self) -> &mut RatingBook {
        &mut self.ratings
    }

    fn set_aggregate(&mut self, average: f64, count: u64, now: Timestamp) {
        self.rating = average;
        self.rating_count = count;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_entity_id;
    use chrono::Utc;

    fn reviewer(now: Timestamp) -> AgentTemplate {
        AgentTemplate {
            id: new_entity_id(),
            name: "Reviewer".to_string(),
            description: String::new(),
            role: "expert".to_string(),
            config: JsonValue::Null,
            tags: vec![],
            created_by: None,
            is_public: true,
            category: TemplateCategory::Analysis,
            usage_count: 0,
            is_featured: false,
            recommendation_order: None,
            rating: 0.0,
            rating_count: 0,
            ratings: RatingBook::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_rate_updates_aggregate() {
        let now = Utc::now();
        let mut template = reviewer(now);

        assert_eq!(template.rate(Some("u1"), 4.0, now), (4.0, 1));
        assert_eq!(template.rate(Some("u2"), 2.0, now), (3.0, 2));
        assert_eq!(template.rate(Some("u1"), 4.5, now), (3.25, 2));
        assert_eq!(template.rating_count, 2);
    }

    #[test]
    fn test_derive_copy_resets_popularity() {
        let now = Utc::now();
        let mut source = reviewer(now);
        source.is_featured = true;
        source.recommendation_order = Some(1);
        source.usage_count = 12;
        source.tags = vec!["review".to_string()];
        source.rate(Some("u1"), 5.0, now);

        let copy = source.derive_copy(
            new_entity_id(),
            "Mine".to_string(),
            Some("carol".to_string()),
            now,
        );
        assert_eq!(copy.name, "Mine");
        assert_eq!(copy.created_by.as_deref(), Some("carol"));
        assert_eq!(copy.category, TemplateCategory::Analysis);
        assert_eq!(copy.tags, source.tags);
        assert_eq!((copy.usage_count, copy.rating_count, copy.rating), (0, 0, 0.0));
        assert!(!copy.is_featured);
        assert_eq!(copy.recommendation_order, None);
        assert_eq!(copy.ratings.count(), 0);
    }

    #[test]
    fn test_ratings_are_not_serialized() -> Result<(), serde_json::Error> {
        let now = Utc::now();
        let capability = Capability {
            id: new_entity_id(),
            name: "search".to_string(),
            description: String::new(),
            capability_type: CapabilityType::Tool,
            parameters: JsonValue::Null,
            rating: 0.0,
            rating_count: 0,
            ratings: RatingBook::default(),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&capability)?;
        assert!(value.get("ratings").is_none());
        assert_eq!(value["type"], "tool");
        Ok(())
    }
}
