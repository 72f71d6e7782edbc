//! Tool Service
//!
//! Tool catalog, permission-checked invocation and the simulated execute
//! path. Every call that reaches dispatch writes exactly one tool log.

use chrono::Utc;
use itagent_core::{
    new_entity_id, slugify, EntityId, Tool, ToolAction, ToolCategory, ToolLog, ToolLogStatus,
};
use itagent_storage::InMemoryRepository;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::services::builtin_tools::{builtin_handlers, builtin_tools, HandlerRegistry};
use crate::services::permission::{PermissionDecision, ToolCallContext, ToolPermissionPolicy};
use crate::services::ToolLogService;
use crate::types::{
    CallToolRequest, CallToolResponse, ExecuteToolRequest, ExecuteToolResponse,
    ExecuteToolResult, RegisterToolRequest, ToolExecutionsPage, ToolExecutionsQuery,
    ToolListFilter, ToolListResponse,
};
use crate::validation::{is_blank, parse_optional, ValidateNonEmpty};

/// Default page size for `GET /tools/{id}/executions`.
pub const DEFAULT_EXECUTIONS_PAGE_SIZE: usize = 20;
const MAX_EXECUTIONS_PAGE_SIZE: usize = 100;

#[derive(Clone)]
pub struct ToolService {
    tools: InMemoryRepository<Tool>,
    handlers: Arc<HandlerRegistry>,
    policy: Arc<dyn ToolPermissionPolicy>,
    logs: ToolLogService,
}

fn tool_not_found() -> ApiError {
    ApiError::from_code(ErrorCode::ToolNotFound)
}

/// Check `params` against the tool's input schema.
fn validate_params(tool: &Tool, params: &JsonValue) -> ApiResult<()> {
    let schema = tool.input_schema();
    let validator = jsonschema::draft202012::new(&schema)
        .map_err(|e| ApiError::internal_error(format!("Invalid schema for tool {}: {}", tool.id, e)))?;

    let errors: Vec<String> = validator.iter_errors(params).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        return Ok(());
    }
    Err(ApiError::tool_parameter_invalid(format!(
        "Invalid parameters for tool {}: {}",
        tool.id,
        errors.join("; ")
    ))
    .with_details(json!({ "errors": errors })))
}

fn matches_search(tool: &Tool, needle: &str) -> bool {
    tool.name.to_lowercase().contains(needle)
        || tool.description.to_lowercase().contains(needle)
        || tool.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

impl ToolService {
    /// Catalog seeded with the built-in data tools and their handlers.
    pub fn new(policy: Arc<dyn ToolPermissionPolicy>, logs: ToolLogService) -> ApiResult<Self> {
        let tools = InMemoryRepository::new();
        for tool in builtin_tools(Utc::now()) {
            tools.insert(tool)?;
        }
        Ok(Self {
            tools,
            handlers: Arc::new(builtin_handlers()),
            policy,
            logs,
        })
    }

    // ========================================================================
    // CATALOG
    // ========================================================================

    /// Matching tools ordered by name. `total` counts matches before the limit.
    pub fn list_tools(&self, filter: &ToolListFilter) -> ApiResult<ToolListResponse> {
        let mut tools = self.tools.find(|tool| {
            filter.category.map_or(true, |c| tool.category == c)
                && filter.enabled.map_or(true, |e| tool.enabled == e)
                && filter.search.as_deref().map_or(true, |s| matches_search(tool, s))
        })?;
        tools.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        let total = tools.len();
        tools.truncate(filter.limit);
        Ok(ToolListResponse { tools, total })
    }

    pub fn count(&self) -> ApiResult<usize> {
        Ok(self.tools.count()?)
    }

    pub fn get_tool(&self, id: &str) -> ApiResult<Tool> {
        self.tools.get(&id.to_string())?.ok_or_else(tool_not_found)
    }

    /// Register a custom tool. The id defaults to a slug of the name.
    pub fn register_tool(&self, req: RegisterToolRequest) -> ApiResult<Tool> {
        let name = req.name.validate_non_empty("name")?;
        let description = req.description.validate_non_empty("description")?;
        let category: ToolCategory = req.category.validate_non_empty("category")?.parse()?;
        let id = match req.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => slugify(&name),
        };
        if id.is_empty() {
            return Err(ApiError::validation_failed(
                "Tool id could not be derived from the name; provide an id",
            ));
        }
        for param in &req.parameters {
            param.name.validate_non_empty("parameters[].name")?;
        }

        let now = Utc::now();
        let tool = Tool {
            id,
            name,
            description,
            category,
            tags: req.tags,
            is_builtin: false,
            enabled: req.enabled.unwrap_or(true),
            parameters: req.parameters,
            return_type: req.return_type,
            examples: req.examples,
            created_at: now,
            updated_at: now,
        };

        let inserted = self.tools.insert_unless(tool.clone(), |existing, new| {
            existing.id == new.id || existing.name.eq_ignore_ascii_case(&new.name)
        })?;
        if let Err(existing) = inserted {
            return Err(ApiError::entity_already_exists("Tool", existing.id));
        }
        tracing::info!(tool_id = %tool.id, "tool registered");
        Ok(tool)
    }

    pub fn list_actions(&self, id: &str) -> ApiResult<Vec<ToolAction>> {
        Ok(self.get_tool(id)?.actions())
    }

    /// One page of a tool's logs, newest first.
    pub fn list_executions(
        &self,
        id: &str,
        query: ToolExecutionsQuery,
    ) -> ApiResult<ToolExecutionsPage> {
        self.get_tool(id)?;
        let status = parse_optional::<ToolLogStatus>(query.status.as_deref())?;
        let page = query.page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = query
            .page_size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_EXECUTIONS_PAGE_SIZE)
            .min(MAX_EXECUTIONS_PAGE_SIZE);

        let logs: Vec<ToolLog> = self
            .logs
            .for_tool(id)?
            .into_iter()
            .filter(|l| status.map_or(true, |s| l.status == s))
            .collect();
        let total = logs.len();
        let executions = logs
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        Ok(ToolExecutionsPage {
            executions,
            total,
            page,
            page_size,
        })
    }

    // ========================================================================
    // INVOCATION
    // ========================================================================

    /// Validate, authorize and dispatch one tool call.
    pub async fn call_tool(&self, req: CallToolRequest) -> ApiResult<CallToolResponse> {
        let missing: Vec<&str> = [
            ("toolId", req.tool_id.as_deref()),
            ("sessionId", req.session_id.as_deref()),
            ("agentId", req.agent_id.as_deref()),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(*value))
        .map(|(field, _)| field)
        .collect();
        if !missing.is_empty() {
            return Err(ApiError::validation_failed(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        let tool_id = req.tool_id.unwrap_or_default().trim().to_string();
        let session_id = req.session_id.unwrap_or_default().trim().to_string();
        let agent_id = req.agent_id.unwrap_or_default().trim().to_string();

        let ctx = ToolCallContext {
            tool_id: &tool_id,
            agent_id: &agent_id,
            session_id: &session_id,
        };
        if let PermissionDecision::Deny { reason } = self.policy.check(&ctx) {
            tracing::warn!(tool_id = %tool_id, agent_id = %agent_id, "tool call denied");
            return Err(ApiError::tool_permission_denied(reason));
        }

        let tool = self.get_tool(&tool_id)?;
        if !tool.enabled {
            return Err(ApiError::validation_failed(format!(
                "Tool {} is disabled",
                tool.id
            )));
        }

        let params = req.params.unwrap_or_else(|| json!({}));
        if !params.is_object() {
            return Err(ApiError::tool_parameter_invalid(
                "Tool parameters must be a JSON object",
            ));
        }
        let params = tool.apply_defaults(&params);
        validate_params(&tool, &params)?;

        let start_time = Utc::now();
        let started = Instant::now();
        let outcome = match self.handlers.get(&tool.id) {
            Some(handler) => handler.call(params.clone()).await.map_err(|e| e.to_string()),
            None => Err(format!("No handler registered for tool {}", tool.id)),
        };
        let execution_time_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

        let (status, result, error) = match &outcome {
            Ok(value) => (ToolLogStatus::Success, Some(value.clone()), None),
            Err(message) => (ToolLogStatus::Error, None, Some(message.clone())),
        };
        let log = ToolLog {
            id: new_entity_id(),
            tool_id: tool.id.clone(),
            session_id,
            agent_id,
            params,
            result,
            error,
            status,
            start_time,
            end_time: Utc::now(),
            execution_time_ms,
        };
        let execution_id = log.id;
        self.logs.append(log)?;

        match outcome {
            Ok(result) => {
                tracing::info!(tool_id = %tool.id, execution_time_ms, "tool call succeeded");
                Ok(CallToolResponse {
                    tool_id: tool.id,
                    execution_id,
                    result,
                    execution_time_ms,
                })
            }
            Err(message) => {
                Err(ApiError::tool_execution_failed(message)
                    .with_details(json!({ "executionId": execution_id })))
            }
        }
    }

    /// Simulated execution: echoes the request in a fixed envelope.
    pub fn execute_tool(&self, req: ExecuteToolRequest) -> ApiResult<ExecuteToolResponse> {
        let tool_id = req
            .tool_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::validation_failed("Missing tool id"))?
            .to_string();
        let started = Instant::now();
        let parameters = req.parameters.unwrap_or_else(|| json!({}));
        let execution_id: EntityId = new_entity_id();
        let elapsed = started.elapsed().as_millis();

        let logs = vec![
            format!("[INFO] Starting tool {}", tool_id),
            format!("[INFO] Using parameters: {}", parameters),
            format!("[INFO] Completed in {}ms", elapsed),
        ];
        Ok(ExecuteToolResponse {
            success: true,
            timestamp: Utc::now(),
            result: ExecuteToolResult {
                message: format!("{} executed successfully", tool_id),
                action: req.action,
                parameters,
                execution_id,
            },
            tool_id,
            logs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::permission::{parse_rules, PermissionEffect, RulePolicy};
    use crate::types::ToolLogQuery;

    fn service_with(policy: RulePolicy) -> ApiResult<(ToolService, ToolLogService)> {
        let logs = ToolLogService::new(10);
        let service = ToolService::new(Arc::new(policy), logs.clone())?;
        Ok((service, logs))
    }

    fn call(tool_id: &str, params: JsonValue) -> CallToolRequest {
        CallToolRequest {
            tool_id: Some(tool_id.to_string()),
            params: Some(params),
            session_id: Some("s1".to_string()),
            agent_id: Some("agent-1".to_string()),
        }
    }

    fn log_count(logs: &ToolLogService) -> ApiResult<usize> {
        Ok(logs.query(&ToolLogQuery::default())?.len())
    }

    #[tokio::test]
    async fn test_successful_call_writes_one_log() -> ApiResult<()> {
        let (service, logs) = service_with(RulePolicy::allow_all())?;
        let response = service
            .call_tool(call("data-calculate-stats", json!({"arr": [1, 2, 3]})))
            .await?;
        assert_eq!(response.result["sum"], 6.0);
        assert_eq!(log_count(&logs)?, 1);
        let log = logs.get_log(response.execution_id)?;
        assert_eq!(log.status, ToolLogStatus::Success);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_fields_are_listed() -> ApiResult<()> {
        let (service, logs) = service_with(RulePolicy::allow_all())?;
        let err = service
            .call_tool(CallToolRequest {
                tool_id: Some("data-parse-json".to_string()),
                ..Default::default()
            })
            .await
            .err();
        assert_eq!(
            err.map(|e| e.message),
            Some("Missing required fields: sessionId, agentId".to_string())
        );
        assert_eq!(log_count(&logs)?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_permission_is_checked_before_lookup() -> ApiResult<()> {
        let policy = RulePolicy::new(parse_rules("agent-1:*:deny"), PermissionEffect::Allow);
        let (service, _) = service_with(policy)?;
        let err = service.call_tool(call("no-such-tool", json!({}))).await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ToolPermissionDenied));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_tool_and_bad_params() -> ApiResult<()> {
        let (service, logs) = service_with(RulePolicy::allow_all())?;
        let err = service.call_tool(call("no-such-tool", json!({}))).await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ToolNotFound));

        let err = service
            .call_tool(call("data-calculate-stats", json!({"arr": "nope"})))
            .await
            .err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ToolParameterInvalid));
        assert_eq!(log_count(&logs)?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_handler_failure_is_logged() -> ApiResult<()> {
        let (service, logs) = service_with(RulePolicy::allow_all())?;
        let err = service
            .call_tool(call("data-parse-json", json!({"jsonString": "{broken"})))
            .await
            .err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ToolExecutionFailed));
        let stored = logs.query(&ToolLogQuery::default())?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, ToolLogStatus::Error);
        Ok(())
    }

    #[tokio::test]
    async fn test_registered_tool_without_handler_fails_at_dispatch() -> ApiResult<()> {
        let (service, logs) = service_with(RulePolicy::allow_all())?;
        let tool = service.register_tool(RegisterToolRequest {
            name: Some("Web Search".to_string()),
            description: Some("Search the web".to_string()),
            category: Some("ai".to_string()),
            ..Default::default()
        })?;
        assert_eq!(tool.id, "web-search");

        let err = service.call_tool(call("web-search", json!({}))).await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ToolExecutionFailed));
        assert_eq!(log_count(&logs)?, 1);
        Ok(())
    }

    #[test]
    fn test_duplicate_registration_conflicts() -> ApiResult<()> {
        let (service, _) = service_with(RulePolicy::allow_all())?;
        let err = service
            .register_tool(RegisterToolRequest {
                name: Some("parse json".to_string()),
                description: Some("dup".to_string()),
                category: Some("analysis".to_string()),
                ..Default::default()
            })
            .err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::EntityAlreadyExists));
        Ok(())
    }

    #[test]
    fn test_list_tools_search_and_limit() -> ApiResult<()> {
        let (service, _) = service_with(RulePolicy::allow_all())?;
        let filter = ToolListFilter {
            category: None,
            search: Some("csv".to_string()),
            enabled: None,
            limit: 1,
        };
        let listed = service.list_tools(&filter)?;
        assert_eq!(listed.total, 2);
        assert_eq!(listed.tools.len(), 1);
        assert_eq!(listed.tools[0].name, "CSV to JSON");
        Ok(())
    }

    #[test]
    fn test_execute_envelope() -> ApiResult<()> {
        let (service, _) = service_with(RulePolicy::allow_all())?;
        let out = service.execute_tool(ExecuteToolRequest {
            tool_id: Some("data-parse-json".to_string()),
            action: Some("invoke".to_string()),
            parameters: Some(json!({"a": 1})),
        })?;
        assert!(out.success);
        assert_eq!(out.result.message, "data-parse-json executed successfully");
        assert_eq!(out.logs.len(), 3);
        assert_eq!(out.logs[0], "[INFO] Starting tool data-parse-json");
        assert_eq!(out.logs[1], "[INFO] Using parameters: {\"a\":1}");
        assert!(out.logs[2].starts_with("[INFO] Completed in "));

        let err = service.execute_tool(ExecuteToolRequest::default()).err();
        assert_eq!(err.map(|e| e.message), Some("Missing tool id".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_executions_are_paginated() -> ApiResult<()> {
        let (service, _) = service_with(RulePolicy::allow_all())?;
        for n in 0..3 {
            service
                .call_tool(call("data-stringify-json", json!({"data": {"n": n}})))
                .await?;
        }
        let page = service.list_executions(
            "data-stringify-json",
            ToolExecutionsQuery {
                page: Some(2),
                page_size: Some(2),
                ..Default::default()
            },
        )?;
        assert_eq!(page.total, 3);
        assert_eq!(page.executions.len(), 1);
        assert!(service
            .list_executions("missing", ToolExecutionsQuery::default())
            .is_err());
        Ok(())
    }
}
