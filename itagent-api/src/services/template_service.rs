//! Template Service
//!
//! Agent templates with user ratings, gallery views (popular, recommended,
//! top rated, by category) and JSON export, import and cloning.

use chrono::Utc;
use itagent_core::{
    new_entity_id, validate_rating, AgentTemplate, EntityId, Rated, RatingBook, TemplateCategory,
};
use itagent_storage::InMemoryRepository;
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::types::{
    CreateTemplateRequest, DeletedResponse, TemplateImport, TemplateListQuery, TemplateListing,
    TemplateRatingResponse, UpdateTemplateRequest, DEFAULT_TEMPLATE_HIGHLIGHTS,
};
use crate::validation::{parse_optional, ValidateNonEmpty};

#[derive(Debug, Clone)]
pub struct TemplateService {
    templates: InMemoryRepository<AgentTemplate>,
}

fn template_not_found() -> ApiError {
    ApiError::from_code(ErrorCode::TemplateNotFound)
}

/// Featured templates without an explicit rank sort after every ranked one.
const UNRANKED: u32 = 999;

fn template(
    name: &str,
    description: &str,
    role: &str,
    category: TemplateCategory,
    config: JsonValue,
    tags: &[&str],
) -> AgentTemplate {
    let now = Utc::now();
    AgentTemplate {
        id: new_entity_id(),
        name: name.to_string(),
        description: description.to_string(),
        role: role.to_string(),
        config,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        created_by: None,
        is_public: true,
        category,
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

fn featured(mut template: AgentTemplate, order: u32) -> AgentTemplate {
    template.is_featured = true;
    template.recommendation_order = Some(order);
    template
}

fn default_templates() -> Vec<AgentTemplate> {
    vec![
        featured(
            template(
                "General Assistant",
                "Answers questions and carries out everyday tasks",
                "assistant",
                TemplateCategory::General,
                json!({"temperature": 0.7}),
                &["general", "chat"],
            ),
            1,
        ),
        featured(
            template(
                "Domain Expert",
                "Gives in-depth answers within one field of expertise",
                "expert",
                TemplateCategory::Analysis,
                json!({"temperature": 0.3}),
                &["knowledge", "analysis"],
            ),
            2,
        ),
        featured(
            template(
                "Tool Operator",
                "Solves tasks by calling registered tools",
                "tool_user",
                TemplateCategory::Development,
                json!({"tools": ["data-parse-json", "data-calculate-stats"]}),
                &["tools", "automation"],
            ),
            3,
        ),
        template(
            "Team Coordinator",
            "Plans work and routes it between team members",
            "coordinator",
            TemplateCategory::Business,
            json!({"maxRounds": 10}),
            &["planning", "collaboration"],
        ),
    ]
}

fn by_name(a: &AgentTemplate, b: &AgentTemplate) -> std::cmp::Ordering {
    a.name.cmp(&b.name).then(a.id.cmp(&b.id))
}

fn matches_search(template: &AgentTemplate, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    template.name.to_lowercase().contains(&needle)
        || template.description.to_lowercase().contains(&needle)
        || template.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

impl TemplateService {
    /// Service seeded with the default template catalog.
    pub fn new() -> ApiResult<Self> {
        let templates = InMemoryRepository::new();
        for template in default_templates() {
            templates.insert(template)?;
        }
        Ok(Self { templates })
    }

    /// Templates filtered by role, tag, category and search text, by name.
    ///
    /// Role and tag compare case-insensitively.
    pub fn list_templates(&self, query: &TemplateListQuery) -> ApiResult<Vec<AgentTemplate>> {
        let role = query.role.as_deref().map(str::trim).filter(|r| !r.is_empty());
        let tag = query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let search = query.search.as_deref().map(str::trim).filter(|q| !q.is_empty());
        let category = parse_optional::<TemplateCategory>(query.category.as_deref())?;
        let mut templates = self.templates.find(|t| {
            role.map_or(true, |r| t.role.eq_ignore_ascii_case(r))
                && tag.map_or(true, |tag| t.tags.iter().any(|x| x.eq_ignore_ascii_case(tag)))
                && category.map_or(true, |c| t.category == c)
                && search.map_or(true, |q| matches_search(t, q))
        })?;
        templates.sort_by(by_name);
        Ok(templates)
    }

    /// `GET /agents/templates`: a gallery view when a mode flag is set,
    /// otherwise the filtered list.
    pub fn list_view(&self, query: &TemplateListQuery) -> ApiResult<TemplateListing> {
        let limit = query.limit.unwrap_or(DEFAULT_TEMPLATE_HIGHLIGHTS);
        let on = |flag: Option<bool>| flag.unwrap_or(false);

        if on(query.popular) {
            return Ok(TemplateListing::Templates(self.popular(limit)?));
        }
        if on(query.recommended) {
            return Ok(TemplateListing::Templates(self.recommended(limit)?));
        }
        if on(query.rated) {
            return Ok(TemplateListing::Templates(self.top_rated(limit)?));
        }
        if on(query.categories) {
            return Ok(TemplateListing::Categories(TemplateCategory::ALL.to_vec()));
        }
        if on(query.by_category) {
            return Ok(TemplateListing::ByCategory(self.by_category()?));
        }
        Ok(TemplateListing::Templates(self.list_templates(query)?))
    }

    /// Most used first.
    pub fn popular(&self, limit: usize) -> ApiResult<Vec<AgentTemplate>> {
        let mut templates = self.templates.list()?;
        templates.sort_by(|a, b| b.usage_count.cmp(&a.usage_count).then_with(|| by_name(a, b)));
        templates.truncate(limit);
        Ok(templates)
    }

    /// Featured templates in recommendation order.
    pub fn recommended(&self, limit: usize) -> ApiResult<Vec<AgentTemplate>> {
        let mut templates = self.templates.find(|t| t.is_featured)?;
        templates.sort_by(|a, b| {
            let rank = |t: &AgentTemplate| t.recommendation_order.unwrap_or(UNRANKED);
            rank(a).cmp(&rank(b)).then_with(|| by_name(a, b))
        });
        templates.truncate(limit);
        Ok(templates)
    }

    /// Rated templates, highest average first.
    pub fn top_rated(&self, limit: usize) -> ApiResult<Vec<AgentTemplate>> {
        let mut templates = self.templates.find(|t| t.rating_count > 0)?;
        templates.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| by_name(a, b)));
        templates.truncate(limit);
        Ok(templates)
    }

    /// Every category, including empty ones, each sorted by name.
    pub fn by_category(&self) -> ApiResult<BTreeMap<TemplateCategory, Vec<AgentTemplate>>> {
        let mut groups: BTreeMap<_, Vec<_>> =
            TemplateCategory::ALL.iter().map(|c| (*c, Vec::new())).collect();
        for template in self.templates.list()? {
            groups.entry(template.category).or_default().push(template);
        }
        for templates in groups.values_mut() {
            templates.sort_by(by_name);
        }
        Ok(groups)
    }

    /// Create a template, or clone or import one when the body asks for it.
    pub fn create_template(
        &self,
        created_by: Option<&str>,
        req: CreateTemplateRequest,
    ) -> ApiResult<AgentTemplate> {
        if req.from_config.unwrap_or(false) {
            let source: EntityId = req
                .config_id
                .validate_non_empty("configId")?
                .parse()
                .map_err(|_| ApiError::invalid_format("configId", "a UUID"))?;
            let name = req.template_name.validate_non_empty("templateName")?;
            let author = req
                .author_id
                .as_deref()
                .or(created_by)
                .unwrap_or("system");
            return self.clone_template(source, name, author);
        }
        if let Some(data) = req.import_data {
            return self.import_template(data, created_by);
        }

        let name = req.name.validate_non_empty("name")?;
        let role = req.role.validate_non_empty("role")?;
        let category = parse_optional::<TemplateCategory>(req.category.as_deref())?;

        let mut template = template(
            &name,
            "",
            &role,
            category.unwrap_or_default(),
            req.config.unwrap_or_else(|| json!({})),
            &[],
        );
        template.description = req.description.unwrap_or_default();
        template.tags = req.tags.unwrap_or_default();
        template.is_public = req.is_public.unwrap_or(true);
        template.created_by = created_by.map(str::to_string);

        self.templates.insert(template.clone())?;
        tracing::info!(template_id = %template.id, "template created");
        Ok(template)
    }

    /// Copy `source` as a new unfeatured, unrated template owned by `author`.
    ///
    /// Counts as one use of the source.
    pub fn clone_template(
        &self,
        source: EntityId,
        name: String,
        author: &str,
    ) -> ApiResult<AgentTemplate> {
        let original = self
            .templates
            .update(&source, |t| {
                t.usage_count += 1;
                Ok::<_, ApiError>(t.clone())
            })?
            .ok_or_else(template_not_found)?;
        let copy =
            original.derive_copy(new_entity_id(), name, Some(author.to_string()), Utc::now());
        self.templates.insert(copy.clone())?;
        tracing::info!(source_id = %source, template_id = %copy.id, "template cloned");
        Ok(copy)
    }

    /// Pretty-printed JSON of one template. Counts as one use.
    pub fn export_template(&self, id: EntityId) -> ApiResult<String> {
        let template = self
            .templates
            .update(&id, |t| {
                t.usage_count += 1;
                Ok::<_, ApiError>(t.clone())
            })?
            .ok_or_else(template_not_found)?;
        serde_json::to_string_pretty(&template)
            .map_err(|e| ApiError::internal_error(format!("Failed to export template: {}", e)))
    }

    /// Store a template read from exported JSON, given as text or as an
    /// object. Ids, counters and ratings in the data are ignored.
    pub fn import_template(
        &self,
        data: JsonValue,
        created_by: Option<&str>,
    ) -> ApiResult<AgentTemplate> {
        let malformed = |e: serde_json::Error| {
            ApiError::invalid_input(format!("Template import data is malformed: {}", e))
        };
        let parsed: TemplateImport = match data {
            JsonValue::String(text) => serde_json::from_str(&text).map_err(malformed)?,
            other => serde_json::from_value(other).map_err(malformed)?,
        };
        let name = parsed.name.validate_non_empty("name")?;
        let role = parsed.role.validate_non_empty("role")?;

        let config = match parsed.config {
            JsonValue::Null => json!({}),
            config => config,
        };
        let mut template = template(&name, "", &role, parsed.category, config, &[]);
        template.description = parsed.description;
        template.tags = parsed.tags;
        template.is_public = parsed.is_public.unwrap_or(true);
        template.created_by = created_by.map(str::to_string);

        self.templates.insert(template.clone())?;
        tracing::info!(template_id = %template.id, "template imported");
        Ok(template)
    }

    pub fn get_template(&self, id: EntityId) -> ApiResult<AgentTemplate> {
        self.templates.get(&id)?.ok_or_else(template_not_found)
    }

    pub fn update_template(
        &self,
        id: EntityId,
        req: UpdateTemplateRequest,
    ) -> ApiResult<AgentTemplate> {
        let name = req.name.as_ref().map(|n| n.validate_non_empty("name")).transpose()?;
        let role = req.role.as_ref().map(|r| r.validate_non_empty("role")).transpose()?;
        let category = parse_optional::<TemplateCategory>(req.category.as_deref())?;

        self.templates
            .update(&id, |template| {
                if let Some(name) = name {
                    template.name = name;
                }
                if let Some(role) = role {
                    template.role = role;
                }
                if let Some(description) = req.description {
                    template.description = description;
                }
                if let Some(config) = req.config {
                    template.config = config;
                }
                if let Some(tags) = req.tags {
                    template.tags = tags;
                }
                if let Some(is_public) = req.is_public {
                    template.is_public = is_public;
                }
                if let Some(category) = category {
                    template.category = category;
                }
                if let Some(is_featured) = req.is_featured {
                    template.is_featured = is_featured;
                }
                if let Some(order) = req.recommendation_order {
                    template.recommendation_order = Some(order);
                }
                template.updated_at = Utc::now();
                Ok::<_, ApiError>(template.clone())
            })?
            .ok_or_else(template_not_found)
    }

    pub fn delete_template(&self, id: EntityId) -> ApiResult<DeletedResponse> {
        self.templates.remove(&id)?.ok_or_else(template_not_found)?;
        Ok(DeletedResponse { id, deleted: true })
    }

    /// Record a rating and return the new aggregate.
    ///
    /// Out-of-range ratings are rejected before the template is touched.
    pub fn rate_template(
        &self,
        id: EntityId,
        rating: Option<f64>,
        user_id: Option<&str>,
    ) -> ApiResult<TemplateRatingResponse> {
        let raw = rating.ok_or_else(|| ApiError::missing_field("rating"))?;
        let rating = validate_rating(raw)?;

        let (average, count) = self
            .templates
            .update(&id, |template| {
                Ok::<_, ApiError>(template.rate(user_id, rating, Utc::now()))
            })?
            .ok_or_else(template_not_found)?;
        tracing::debug!(template_id = %id, rating, average, "template rated");
        Ok(TemplateRatingResponse {
            template_id: id,
            rating: average,
            rating_count: count,
        })
    }
}
