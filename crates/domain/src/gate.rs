//! Approval gates for entity lifecycle stage transitions.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use baladiya_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::field_security::EntityType;
use crate::security::RoleName;

/// Side effect a caller should enqueue after a gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoAction {
    /// Notify the citizen who submitted the entity.
    NotifyCitizen,
    /// Notify the entity owner.
    NotifyOwner,
    /// Notify the reviewing committee.
    NotifyCommittee,
    /// Assign expert evaluators.
    AssignEvaluators,
    /// Convert an accepted idea into a challenge draft.
    CreateChallengeDraft,
    /// Schedule the pilot kickoff.
    SchedulePilotKickoff,
    /// Publish the entity to the public portal.
    PublishToPortal,
    /// Archive the entity.
    ArchiveRecord,
}

impl AutoAction {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotifyCitizen => "notify_citizen",
            Self::NotifyOwner => "notify_owner",
            Self::NotifyCommittee => "notify_committee",
            Self::AssignEvaluators => "assign_evaluators",
            Self::CreateChallengeDraft => "create_challenge_draft",
            Self::SchedulePilotKickoff => "schedule_pilot_kickoff",
            Self::PublishToPortal => "publish_to_portal",
            Self::ArchiveRecord => "archive_record",
        }
    }
}

impl FromStr for AutoAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "notify_citizen" => Ok(Self::NotifyCitizen),
            "notify_owner" => Ok(Self::NotifyOwner),
            "notify_committee" => Ok(Self::NotifyCommittee),
            "assign_evaluators" => Ok(Self::AssignEvaluators),
            "create_challenge_draft" => Ok(Self::CreateChallengeDraft),
            "schedule_pilot_kickoff" => Ok(Self::SchedulePilotKickoff),
            "publish_to_portal" => Ok(Self::PublishToPortal),
            "archive_record" => Ok(Self::ArchiveRecord),
            _ => Err(AppError::Validation(format!("unknown auto action '{value}'"))),
        }
    }
}

/// Stage change performed by a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    /// Stage the entity must be in.
    pub from: String,
    /// Stage reached by an advancing decision.
    pub to: String,
}

/// One allowed outcome of a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    /// Decision identifier, e.g. `approve`.
    pub decision: String,
    /// Whether the decision moves the entity to `stage_transition.to`.
    pub advances_stage: bool,
}

impl DecisionOption {
    /// Creates a decision option.
    #[must_use]
    pub fn new(decision: impl Into<String>, advances_stage: bool) -> Self {
        Self {
            decision: decision.into(),
            advances_stage,
        }
    }
}

/// Static descriptor of an approval gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    entity_type: EntityType,
    gate_name: NonEmptyString,
    required_role: RoleName,
    stage_transition: StageTransition,
    decision_options: Vec<DecisionOption>,
    auto_actions: BTreeMap<String, Vec<AutoAction>>,
}

impl GateConfig {
    /// Builds a gate, checking that decisions are unique and auto actions only
    /// reference declared decisions.
    pub fn new(
        entity_type: EntityType,
        gate_name: &str,
        required_role: RoleName,
        stage_transition: StageTransition,
        decision_options: Vec<DecisionOption>,
        auto_actions: BTreeMap<String, Vec<AutoAction>>,
    ) -> AppResult<Self> {
        let gate_name = NonEmptyString::new(gate_name)?;

        if decision_options.is_empty() {
            return Err(AppError::Validation(format!(
                "gate '{gate_name}' must declare at least one decision option"
            )));
        }

        let mut seen = BTreeSet::new();
        for option in &decision_options {
            if option.decision.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "gate '{gate_name}' has an empty decision option"
                )));
            }
            if !seen.insert(option.decision.as_str()) {
                return Err(AppError::Validation(format!(
                    "gate '{gate_name}' declares decision '{}' twice",
                    option.decision
                )));
            }
        }

        if let Some(undeclared) = auto_actions.keys().find(|key| !seen.contains(key.as_str())) {
            return Err(AppError::Validation(format!(
                "gate '{gate_name}' has auto actions for undeclared decision '{undeclared}'"
            )));
        }

        Ok(Self {
            entity_type,
            gate_name,
            required_role,
            stage_transition,
            decision_options,
            auto_actions,
        })
    }

    /// Returns the gated entity type.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the gate name, unique per entity type.
    #[must_use]
    pub fn gate_name(&self) -> &str {
        self.gate_name.as_str()
    }

    /// Returns the role required to decide.
    #[must_use]
    pub fn required_role(&self) -> &RoleName {
        &self.required_role
    }

    /// Returns the stage transition.
    #[must_use]
    pub fn stage_transition(&self) -> &StageTransition {
        &self.stage_transition
    }

    /// Returns the closed set of decisions.
    #[must_use]
    pub fn decision_options(&self) -> &[DecisionOption] {
        &self.decision_options
    }

    /// Returns auto actions keyed by decision.
    #[must_use]
    pub fn auto_actions(&self) -> &BTreeMap<String, Vec<AutoAction>> {
        &self.auto_actions
    }

    /// Returns the option matching a submitted decision.
    pub fn validate_decision(&self, decision: &str) -> AppResult<&DecisionOption> {
        self.decision_options
            .iter()
            .find(|option| option.decision == decision)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "decision '{decision}' is not allowed for gate '{}' on '{}'; expected [{}]",
                    self.gate_name,
                    self.entity_type.as_str(),
                    self.decision_options
                        .iter()
                        .map(|option| option.decision.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }

    /// Returns the stage an entity ends up in after the decision.
    #[must_use]
    pub fn resulting_stage(&self, option: &DecisionOption) -> &str {
        if option.advances_stage {
            self.stage_transition.to.as_str()
        } else {
            self.stage_transition.from.as_str()
        }
    }

    /// Returns the auto actions configured for a decision.
    #[must_use]
    pub fn auto_actions_for(&self, decision: &str) -> &[AutoAction] {
        self.auto_actions
            .get(decision)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Gates indexed by entity type and gate name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GateRegistry {
    gates: BTreeMap<(EntityType, String), GateConfig>,
}

impl GateRegistry {
    /// Builds a registry, rejecting duplicate gates.
    pub fn new(gates: impl IntoIterator<Item = GateConfig>) -> AppResult<Self> {
        let mut indexed = BTreeMap::new();
        for gate in gates {
            let key = (gate.entity_type, gate.gate_name().to_owned());
            if indexed.contains_key(&key) {
                return Err(AppError::Validation(format!(
                    "gate '{}' is declared twice for '{}'",
                    key.1,
                    key.0.as_str()
                )));
            }
            indexed.insert(key, gate);
        }

        Ok(Self { gates: indexed })
    }

    /// Builds the gates shipped with the platform.
    pub fn municipal_defaults() -> AppResult<Self> {
        use AutoAction::*;

        let transition = |from: &str, to: &str| StageTransition {
            from: from.to_owned(),
            to: to.to_owned(),
        };
        let actions = |entries: Vec<(&str, Vec<AutoAction>)>| -> BTreeMap<String, Vec<AutoAction>> {
            entries
                .into_iter()
                .map(|(decision, actions)| (decision.to_owned(), actions))
                .collect()
        };

        Self::new([
            GateConfig::new(
                EntityType::CitizenIdea,
                "screening",
                RoleName::new("idea_screener")?,
                transition("submitted", "under_evaluation"),
                vec![
                    DecisionOption::new("approve", true),
                    DecisionOption::new("reject", false),
                    DecisionOption::new("request_more_info", false),
                ],
                actions(vec![
                    ("approve", vec![NotifyCitizen, AssignEvaluators]),
                    ("reject", vec![NotifyCitizen, ArchiveRecord]),
                    ("request_more_info", vec![NotifyCitizen]),
                ]),
            )?,
            GateConfig::new(
                EntityType::CitizenIdea,
                "evaluation",
                RoleName::new("expert_evaluator")?,
                transition("under_evaluation", "converted"),
                vec![
                    DecisionOption::new("convert_to_challenge", true),
                    DecisionOption::new("reject", false),
                ],
                actions(vec![
                    ("convert_to_challenge", vec![CreateChallengeDraft, NotifyCitizen]),
                    ("reject", vec![NotifyCitizen]),
                ]),
            )?,
            GateConfig::new(
                EntityType::Challenge,
                "review",
                RoleName::new("challenge_manage")?,
                transition("draft", "published"),
                vec![
                    DecisionOption::new("approve", true),
                    DecisionOption::new("reject", false),
                    DecisionOption::new("request_changes", false),
                ],
                actions(vec![
                    ("approve", vec![PublishToPortal, NotifyOwner]),
                    ("reject", vec![NotifyOwner]),
                    ("request_changes", vec![NotifyOwner]),
                ]),
            )?,
            GateConfig::new(
                EntityType::Pilot,
                "approval",
                RoleName::new("pilot_manage")?,
                transition("design", "approved"),
                vec![
                    DecisionOption::new("approve", true),
                    DecisionOption::new("reject", false),
                    DecisionOption::new("approve_with_conditions", true),
                ],
                actions(vec![
                    ("approve", vec![SchedulePilotKickoff, NotifyOwner]),
                    ("approve_with_conditions", vec![SchedulePilotKickoff, NotifyOwner]),
                    ("reject", vec![NotifyOwner]),
                ]),
            )?,
            GateConfig::new(
                EntityType::RdProposal,
                "evaluation",
                RoleName::new("expert_evaluator")?,
                transition("submitted", "shortlisted"),
                vec![
                    DecisionOption::new("accept", true),
                    DecisionOption::new("reject", false),
                    DecisionOption::new("request_more_info", false),
                ],
                actions(vec![
                    ("accept", vec![NotifyOwner, NotifyCommittee]),
                    ("reject", vec![NotifyOwner]),
                    ("request_more_info", vec![NotifyOwner]),
                ]),
            )?,
            GateConfig::new(
                EntityType::Policy,
                "legal_review",
                RoleName::new("legal_reviewer")?,
                transition("draft", "approved"),
                vec![
                    DecisionOption::new("approve", true),
                    DecisionOption::new("reject", false),
                ],
                actions(vec![
                    ("approve", vec![NotifyCommittee, PublishToPortal]),
                    ("reject", vec![NotifyOwner]),
                ]),
            )?,
        ])
    }

    /// Returns a gate by entity type and name.
    #[must_use]
    pub fn find(&self, entity_type: EntityType, gate_name: &str) -> Option<&GateConfig> {
        self.gates.get(&(entity_type, gate_name.to_owned()))
    }

    /// Returns all gates ordered by entity type then name.
    pub fn iter(&self) -> impl Iterator<Item = &GateConfig> {
        self.gates.values()
    }
}
