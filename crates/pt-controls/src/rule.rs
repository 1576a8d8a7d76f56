//! Rule primitives: triggers, conditions and effects.
//!
//! Parsing never fails. Unknown operators, targets and actions are kept as
//! `Unsupported` values so the engine can log and skip just that rule.

use pt_core::{Real, RegisterAddr};

/// Comparison operator of a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Unsupported(String),
}

impl Condition {
    pub fn parse(op: &str) -> Self {
        match op.trim() {
            "==" => Condition::Eq,
            "!=" => Condition::Ne,
            ">" => Condition::Gt,
            "<" => Condition::Lt,
            ">=" => Condition::Ge,
            "<=" => Condition::Le,
            other => Condition::Unsupported(other.to_string()),
        }
    }

    /// Compare `actual` against `expected`.
    ///
    /// Comparisons are exact: `==` on values that went through arithmetic may
    /// never hold. Returns `None` for unsupported operators.
    pub fn evaluate(&self, actual: Real, expected: Real) -> Option<bool> {
        Some(match self {
            Condition::Eq => actual == expected,
            Condition::Ne => actual != expected,
            Condition::Gt => actual > expected,
            Condition::Lt => actual < expected,
            Condition::Ge => actual >= expected,
            Condition::Le => actual <= expected,
            Condition::Unsupported(_) => return None,
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Condition::Eq => "==",
            Condition::Ne => "!=",
            Condition::Gt => ">",
            Condition::Lt => "<",
            Condition::Ge => ">=",
            Condition::Le => "<=",
            Condition::Unsupported(op) => op,
        }
    }
}

/// `register <condition> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub register: RegisterAddr,
    pub condition: Condition,
    pub value: Real,
}

/// Sentinel target naming the supervisor alert channel.
pub const SUPERVISOR_ALERT: &str = "supervisor-alert";
/// Legacy alias of [`SUPERVISOR_ALERT`].
pub const SCADA_ALIAS: &str = "scada";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectTarget {
    /// The alert side channel. Never looked up in the graph.
    Supervisor,
    Device(String),
}

impl EffectTarget {
    pub fn parse(target: &str) -> Self {
        match target {
            SUPERVISOR_ALERT | SCADA_ALIAS => EffectTarget::Supervisor,
            device => EffectTarget::Device(device.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectAction {
    Open,
    Close,
    Unsupported(String),
}

impl EffectAction {
    pub fn parse(action: &str) -> Self {
        match action.trim().to_ascii_lowercase().as_str() {
            "open" => EffectAction::Open,
            "close" | "closed" => EffectAction::Close,
            _ => EffectAction::Unsupported(action.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub targets: Vec<EffectTarget>,
    pub action: Option<EffectAction>,
    pub message: Option<String>,
}

impl Effect {
    /// Build an effect from raw target ids.
    pub fn new<S: AsRef<str>>(
        targets: impl IntoIterator<Item = S>,
        action: Option<&str>,
        message: Option<String>,
    ) -> Self {
        Self {
            targets: targets
                .into_iter()
                .map(|t| EffectTarget::parse(t.as_ref()))
                .collect(),
            action: action.map(EffectAction::parse),
            message,
        }
    }
}

/// A stateless rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub trigger: Trigger,
    pub effect: Effect,
}

impl Action {
    pub fn new(register: RegisterAddr, condition: &str, value: Real, effect: Effect) -> Self {
        Self {
            trigger: Trigger {
                register,
                condition: Condition::parse(condition),
                value,
            },
            effect,
        }
    }
}
