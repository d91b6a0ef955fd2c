//! Static field-level visibility rules for entity payloads.
//!
//! Rules form a denylist: only listed fields are restricted, every other
//! field passes through untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use baladiya_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::security::RoleName;

/// Entity types whose payloads can be filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Municipal challenge statement.
    Challenge,
    /// Pilot project run against a challenge.
    Pilot,
    /// Research and development proposal.
    RdProposal,
    /// Policy document or recommendation.
    Policy,
    /// Idea submitted by a citizen.
    CitizenIdea,
    /// Solution offered by a provider.
    Solution,
}

impl EntityType {
    /// Returns all entity types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[EntityType] = &[
            EntityType::Challenge,
            EntityType::Pilot,
            EntityType::RdProposal,
            EntityType::Policy,
            EntityType::CitizenIdea,
            EntityType::Solution,
        ];

        ALL
    }

    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Challenge => "challenge",
            Self::Pilot => "pilot",
            Self::RdProposal => "rd_proposal",
            Self::Policy => "policy",
            Self::CitizenIdea => "citizen_idea",
            Self::Solution => "solution",
        }
    }

    /// Returns the fields a payload of this type may carry.
    #[must_use]
    pub fn known_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Challenge => &[
                "id",
                "code",
                "title_en",
                "title_ar",
                "description_en",
                "description_ar",
                "sector",
                "municipality_id",
                "status",
                "priority",
                "budget_estimate",
                "internal_notes",
                "owner_email",
                "created_date",
            ],
            Self::Pilot => &[
                "id",
                "code",
                "title_en",
                "title_ar",
                "challenge_id",
                "solution_id",
                "stage",
                "budget",
                "actual_cost",
                "risk_assessment",
                "kpis",
                "team_contacts",
                "created_date",
            ],
            Self::RdProposal => &[
                "id",
                "title_en",
                "title_ar",
                "abstract_en",
                "abstract_ar",
                "institution",
                "principal_investigator_email",
                "budget_requested",
                "evaluation_scores",
                "reviewer_comments",
                "status",
                "created_date",
            ],
            Self::Policy => &[
                "id",
                "title_en",
                "title_ar",
                "summary_en",
                "summary_ar",
                "workflow_stage",
                "legal_review_notes",
                "stakeholder_feedback",
                "created_date",
            ],
            Self::CitizenIdea => &[
                "id",
                "title",
                "description",
                "category",
                "municipality_id",
                "status",
                "submitter_name",
                "submitter_email",
                "submitter_phone",
                "votes_count",
                "created_date",
            ],
            Self::Solution => &[
                "id",
                "name_en",
                "name_ar",
                "provider_id",
                "maturity_level",
                "pricing_details",
                "contract_terms",
                "created_date",
            ],
        }
    }

    /// Returns whether a payload of this type may carry the field.
    #[must_use]
    pub fn has_field(&self, field_name: &str) -> bool {
        self.known_fields().contains(&field_name)
    }
}

impl FromStr for EntityType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|entity_type| entity_type.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown entity type '{value}'")))
    }
}

/// Restriction of one field to holders of specific roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Entity the rule applies to.
    pub entity_type: EntityType,
    /// Restricted field name.
    pub field_name: String,
    /// Roles allowed to see the field; admins always see it.
    pub required_roles: BTreeSet<RoleName>,
}

/// Result of filtering one payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilterOutcome {
    /// Payload copy without masked fields.
    pub filtered: Map<String, Value>,
    /// Names of removed fields, in payload order.
    pub masked_fields: Vec<String>,
}

/// Restricted fields of the platform entities and the roles that may read them.
const MUNICIPAL_FIELD_RULES: &[(EntityType, &str, &[&str])] = &[
    (EntityType::Challenge, "budget_estimate", &["admin", "challenge_manage"]),
    (EntityType::Challenge, "internal_notes", &["admin", "challenge_manage"]),
    (EntityType::Pilot, "budget", &["admin", "pilot_manage", "finance_officer"]),
    (EntityType::Pilot, "actual_cost", &["admin", "pilot_manage", "finance_officer"]),
    (EntityType::Pilot, "risk_assessment", &["admin", "pilot_manage"]),
    (EntityType::Pilot, "team_contacts", &["admin", "pilot_manage"]),
    (EntityType::RdProposal, "budget_requested", &["admin", "rd_manage"]),
    (EntityType::RdProposal, "evaluation_scores", &["admin", "rd_manage", "expert_evaluator"]),
    (EntityType::RdProposal, "reviewer_comments", &["admin", "rd_manage", "expert_evaluator"]),
    (EntityType::Policy, "legal_review_notes", &["admin", "policy_manage", "legal_reviewer"]),
    (EntityType::CitizenIdea, "submitter_email", &["admin", "idea_screener"]),
    (EntityType::CitizenIdea, "submitter_phone", &["admin", "idea_screener"]),
    (
        EntityType::Solution,
        "pricing_details",
        &["admin", "solution_manage", "procurement_officer"],
    ),
    (EntityType::Solution, "contract_terms", &["admin", "procurement_officer"]),
];

/// Validated set of field rules keyed by entity type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSecurityPolicy {
    rules: BTreeMap<EntityType, BTreeMap<String, BTreeSet<RoleName>>>,
}

impl FieldSecurityPolicy {
    /// Builds a policy, rejecting rules that name fields the entity type does not have.
    pub fn new(rules: impl IntoIterator<Item = FieldRule>) -> AppResult<Self> {
        let mut by_entity: BTreeMap<EntityType, BTreeMap<String, BTreeSet<RoleName>>> =
            BTreeMap::new();

        for rule in rules {
            if !rule.entity_type.has_field(rule.field_name.as_str()) {
                return Err(AppError::Validation(format!(
                    "field rule targets unknown field '{}' on entity type '{}'",
                    rule.field_name,
                    rule.entity_type.as_str()
                )));
            }

            if rule.required_roles.is_empty() {
                return Err(AppError::Validation(format!(
                    "field rule for '{}.{}' must name at least one role",
                    rule.entity_type.as_str(),
                    rule.field_name
                )));
            }

            by_entity
                .entry(rule.entity_type)
                .or_default()
                .entry(rule.field_name)
                .or_default()
                .extend(rule.required_roles);
        }

        Ok(Self { rules: by_entity })
    }

    /// Builds the rules shipped with the platform.
    pub fn municipal_defaults() -> AppResult<Self> {
        let rules = MUNICIPAL_FIELD_RULES
            .iter()
            .map(|(entity_type, field_name, roles)| {
                Ok(FieldRule {
                    entity_type: *entity_type,
                    field_name: (*field_name).to_owned(),
                    required_roles: roles
                        .iter()
                        .map(|role| RoleName::new(*role))
                        .collect::<AppResult<_>>()?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Self::new(rules)
    }

    /// Returns the restricted fields of an entity type and the roles allowed to see them.
    #[must_use]
    pub fn rules_for(
        &self,
        entity_type: EntityType,
    ) -> Option<&BTreeMap<String, BTreeSet<RoleName>>> {
        self.rules.get(&entity_type)
    }

    /// Returns a copy of the payload without fields the requester may not see.
    #[must_use]
    pub fn filter(
        &self,
        entity_type: EntityType,
        payload: &Map<String, Value>,
        requester_roles: &BTreeSet<RoleName>,
        is_admin: bool,
    ) -> FieldFilterOutcome {
        let mut filtered = payload.clone();
        let mut masked_fields = Vec::new();

        let Some(rules) = self.rules.get(&entity_type) else {
            return FieldFilterOutcome {
                filtered,
                masked_fields,
            };
        };

        for field_name in payload.keys() {
            let Some(required_roles) = rules.get(field_name) else {
                continue;
            };

            let has_access = is_admin || !required_roles.is_disjoint(requester_roles);
            if !has_access {
                filtered.remove(field_name);
                masked_fields.push(field_name.clone());
            }
        }

        FieldFilterOutcome {
            filtered,
            masked_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::str::FromStr;

    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    use super::{EntityType, FieldRule, FieldSecurityPolicy};
    use crate::security::RoleName;

    fn roles(values: &[&str]) -> BTreeSet<RoleName> {
        values
            .iter()
            .filter_map(|value| RoleName::new(*value).ok())
            .collect()
    }

    fn policy() -> FieldSecurityPolicy {
        FieldSecurityPolicy::municipal_defaults().unwrap_or_default()
    }

    fn challenge_payload() -> Map<String, Value> {
        match json!({
            "id": "ch-1",
            "title_en": "Flood monitoring",
            "budget_estimate": 250000,
            "internal_notes": "pending ministry input",
        }) {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(FieldSecurityPolicy::municipal_defaults().is_ok());
    }

    #[test]
    fn rule_on_unknown_field_is_rejected() {
        let result = FieldSecurityPolicy::new([FieldRule {
            entity_type: EntityType::Challenge,
            field_name: "budget_estimat".to_owned(),
            required_roles: roles(&["admin"]),
        }]);
        assert!(result.is_err());
    }

    #[test]
    fn requester_without_role_gets_sensitive_fields_masked() {
        let payload = challenge_payload();
        let outcome = policy().filter(
            EntityType::Challenge,
            &payload,
            &roles(&["user", "expert_evaluator"]),
            false,
        );

        assert_eq!(outcome.masked_fields, vec!["budget_estimate", "internal_notes"]);
        assert!(!outcome.filtered.contains_key("budget_estimate"));
        assert_eq!(outcome.filtered.get("title_en"), payload.get("title_en"));
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn any_required_role_grants_visibility() {
        let outcome = policy().filter(
            EntityType::Challenge,
            &challenge_payload(),
            &roles(&["challenge_manage"]),
            false,
        );
        assert!(outcome.masked_fields.is_empty());
        assert_eq!(outcome.filtered.len(), 4);
    }

    #[test]
    fn admin_sees_everything() {
        let outcome = policy().filter(
            EntityType::Challenge,
            &challenge_payload(),
            &roles(&[]),
            true,
        );
        assert!(outcome.masked_fields.is_empty());
    }

    #[test]
    fn entity_type_without_rules_passes_payload_through() {
        let restricted_only_challenges = FieldSecurityPolicy::new([FieldRule {
            entity_type: EntityType::Challenge,
            field_name: "budget_estimate".to_owned(),
            required_roles: roles(&["admin"]),
        }])
        .unwrap_or_default();

        let payload = match json!({"id": "p-1", "budget": 10}) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let outcome =
            restricted_only_challenges.filter(EntityType::Pilot, &payload, &roles(&[]), false);
        assert_eq!(outcome.filtered, payload);
        assert!(outcome.masked_fields.is_empty());
    }

    #[test]
    fn entity_type_parses_transport_values() {
        assert_eq!(EntityType::from_str("rd_proposal").ok(), Some(EntityType::RdProposal));
        assert!(EntityType::from_str("RdProposal").is_err());
    }

    fn arbitrary_payload() -> impl Strategy<Value = Map<String, Value>> {
        let field = prop_oneof![
            Just("budget".to_owned()),
            Just("actual_cost".to_owned()),
            Just("risk_assessment".to_owned()),
            Just("title_en".to_owned()),
            Just("stage".to_owned()),
            "[a-z_]{1,12}",
        ];
        proptest::collection::btree_map(field, any::<i64>(), 0..8).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect()
        })
    }

    fn arbitrary_roles() -> impl Strategy<Value = BTreeSet<RoleName>> {
        proptest::sample::subsequence(
            vec!["pilot_manage", "finance_officer", "user", "expert_evaluator"],
            0..4,
        )
        .prop_map(|values| roles(&values))
    }

    proptest! {
        #[test]
        fn filtering_is_idempotent(
            payload in arbitrary_payload(),
            requester_roles in arbitrary_roles(),
            is_admin in any::<bool>(),
        ) {
            let policy = policy();
            let once = policy.filter(EntityType::Pilot, &payload, &requester_roles, is_admin);
            let twice =
                policy.filter(EntityType::Pilot, &once.filtered, &requester_roles, is_admin);

            prop_assert_eq!(&twice.filtered, &once.filtered);
            prop_assert!(twice.masked_fields.is_empty());
        }

        #[test]
        fn unlisted_fields_are_never_masked(
            payload in arbitrary_payload(),
            requester_roles in arbitrary_roles(),
        ) {
            let policy = policy();
            let rules = policy.rules_for(EntityType::Pilot).cloned().unwrap_or_default();
            let outcome = policy.filter(EntityType::Pilot, &payload, &requester_roles, false);

            for (field_name, value) in &payload {
                if !rules.contains_key(field_name) {
                    prop_assert_eq!(outcome.filtered.get(field_name), Some(value));
                }
            }
        }
    }
}
