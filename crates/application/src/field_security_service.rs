//! Role-based masking of entity payloads.

use serde_json::{Map, Value};

use baladiya_core::{AppError, AppResult, UserIdentity};
use baladiya_domain::{EntityType, FieldFilterOutcome, FieldSecurityPolicy};

use crate::AuthorizationService;

/// Input for filtering one entity payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEntityPayloadInput {
    /// Transport value of the entity type.
    pub entity_type: String,
    /// Optional projection applied before masking. Empty keeps every field.
    pub fields: Vec<String>,
    /// Entity payload; must be a JSON object.
    pub data: Value,
}

/// Application service applying the field policy for the caller's roles.
#[derive(Clone)]
pub struct FieldSecurityService {
    authorization_service: AuthorizationService,
    policy: FieldSecurityPolicy,
}

impl FieldSecurityService {
    /// Creates the service from a validated policy.
    #[must_use]
    pub fn new(authorization_service: AuthorizationService, policy: FieldSecurityPolicy) -> Self {
        Self {
            authorization_service,
            policy,
        }
    }

    /// Returns the caller's view of an entity payload.
    pub async fn filter_entity_payload(
        &self,
        actor: &UserIdentity,
        input: FilterEntityPayloadInput,
    ) -> AppResult<FieldFilterOutcome> {
        let entity_type = input.entity_type.parse::<EntityType>()?;
        let Value::Object(data) = input.data else {
            return Err(AppError::Validation(
                "field security data must be a JSON object".to_owned(),
            ));
        };

        let access = self.authorization_service.subject_access(actor).await?;
        let projected = project(data, &input.fields);
        let outcome = self
            .policy
            .filter(entity_type, &projected, &access.roles, access.is_admin);

        if !outcome.masked_fields.is_empty() {
            tracing::debug!(
                entity_type = entity_type.as_str(),
                subject = actor.subject(),
                masked = outcome.masked_fields.len(),
                "masked restricted fields"
            );
        }

        Ok(outcome)
    }
}

fn project(data: Map<String, Value>, fields: &[String]) -> Map<String, Value> {
    if fields.is_empty() {
        return data;
    }

    data.into_iter()
        .filter(|(key, _)| fields.iter().any(|field| field == key))
        .collect()
}
