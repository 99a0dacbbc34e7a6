use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Values and domains
// ---------------------------------------------------------------------------

/// The current value of a control. The variant follows the control kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ControlValue {
    /// Select-one dropdown.
    One(String),
    /// Checklist: any subset of the options.
    Many(BTreeSet<String>),
    /// Numeric input.
    Number(i64),
}

impl ControlValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ControlValue::One(_) => "one",
            ControlValue::Many(_) => "many",
            ControlValue::Number(_) => "number",
        }
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlValue::One(s) => write!(f, "{s}"),
            ControlValue::Many(set) => {
                let items: Vec<&str> = set.iter().map(String::as_str).collect();
                write!(f, "[{}]", items.join(", "))
            }
            ControlValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The legal values of a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Domain {
    OneOf { options: Vec<String> },
    SubsetOf { options: Vec<String> },
    /// Inclusive integer range.
    Range { min: i64, max: i64 },
}

impl Domain {
    pub fn one_of<S: Into<String>>(options: impl IntoIterator<Item = S>) -> Self {
        Domain::OneOf {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn subset_of<S: Into<String>>(options: impl IntoIterator<Item = S>) -> Self {
        Domain::SubsetOf {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Admit a value into this domain.
    ///
    /// Numbers are clamped into range; selections outside the option list and
    /// values of the wrong kind are refused.
    fn admit(
        &self,
        id: &str,
        value: ControlValue,
    ) -> Result<(ControlValue, SetOutcome), ControlError> {
        match (self, value) {
            (Domain::OneOf { options }, ControlValue::One(s)) => {
                if options.contains(&s) {
                    Ok((ControlValue::One(s), SetOutcome::Applied))
                } else {
                    Err(ControlError::OutOfDomain {
                        id: id.to_string(),
                        value: s,
                    })
                }
            }
            (Domain::SubsetOf { options }, ControlValue::Many(set)) => {
                match set.iter().find(|s| !options.contains(s)) {
                    Some(bad) => Err(ControlError::OutOfDomain {
                        id: id.to_string(),
                        value: bad.clone(),
                    }),
                    None => Ok((ControlValue::Many(set), SetOutcome::Applied)),
                }
            }
            (Domain::Range { min, max }, ControlValue::Number(n)) => {
                let clamped = n.clamp(*min, *max);
                let outcome = if clamped == n {
                    SetOutcome::Applied
                } else {
                    SetOutcome::Clamped {
                        requested: n,
                        applied: clamped,
                    }
                };
                Ok((ControlValue::Number(clamped), outcome))
            }
            (domain, value) => Err(ControlError::KindMismatch {
                id: id.to_string(),
                expected: domain.value_kind(),
                found: value.kind(),
            }),
        }
    }

    fn value_kind(&self) -> &'static str {
        match self {
            Domain::OneOf { .. } => "one",
            Domain::SubsetOf { .. } => "many",
            Domain::Range { .. } => "number",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("no control named '{0}'")]
    UnknownControl(String),
    #[error("control '{0}' is registered twice")]
    Duplicate(String),
    #[error("'{value}' is not a legal value for '{id}'")]
    OutOfDomain { id: String, value: String },
    #[error("control '{id}' takes a {expected} value, got {found}")]
    KindMismatch {
        id: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("'{raw}' is not an integer (control '{id}')")]
    InvalidNumber { id: String, raw: String },
}

/// What a successful [`ControlRegistry::set`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Applied,
    Clamped { requested: i64, applied: i64 },
}

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

/// A named, user-settable input with a constrained domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    /// Text shown next to the widget.
    pub label: String,
    pub domain: Domain,
    value: ControlValue,
}

impl Control {
    /// Create a control. The initial value goes through the same admission
    /// as later updates, so an out-of-range default number is clamped.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        domain: Domain,
        initial: ControlValue,
    ) -> Result<Self, ControlError> {
        let id = id.into();
        let (value, _) = domain.admit(&id, initial)?;
        Ok(Self {
            id,
            label: label.into(),
            domain,
            value,
        })
    }

    pub fn value(&self) -> &ControlValue {
        &self.value
    }

    /// Parse a textual value for this control's kind.
    ///
    /// Dropdowns take the raw text, checklists a comma-separated list (empty
    /// for none), numbers a decimal integer. Domain checks happen in `set`.
    pub fn parse(&self, raw: &str) -> Result<ControlValue, ControlError> {
        match self.domain {
            Domain::OneOf { .. } => Ok(ControlValue::One(raw.to_string())),
            Domain::SubsetOf { .. } => Ok(ControlValue::Many(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            Domain::Range { .. } => raw
                .trim()
                .parse::<i64>()
                .map(ControlValue::Number)
                .map_err(|_| ControlError::InvalidNumber {
                    id: self.id.clone(),
                    raw: raw.to_string(),
                }),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// All controls of one dashboard instance, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ControlRegistry {
    controls: Vec<Control>,
    index: BTreeMap<String, usize>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, control: Control) -> Result<(), ControlError> {
        if self.index.contains_key(&control.id) {
            return Err(ControlError::Duplicate(control.id));
        }
        self.index.insert(control.id.clone(), self.controls.len());
        self.controls.push(control);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn control(&self, id: &str) -> Option<&Control> {
        self.index.get(id).map(|&i| &self.controls[i])
    }

    /// Current value of a control.
    pub fn get(&self, id: &str) -> Option<&ControlValue> {
        self.control(id).map(Control::value)
    }

    /// Update one control. On error the stored value is left untouched.
    pub fn set(&mut self, id: &str, value: ControlValue) -> Result<SetOutcome, ControlError> {
        let &i = self
            .index
            .get(id)
            .ok_or_else(|| ControlError::UnknownControl(id.to_string()))?;
        let control = &mut self.controls[i];
        let (admitted, outcome) = control.domain.admit(id, value)?;
        control.value = admitted;
        Ok(outcome)
    }

    /// Parse `raw` with the control's own parser.
    pub fn parse(&self, id: &str, raw: &str) -> Result<ControlValue, ControlError> {
        self.control(id)
            .ok_or_else(|| ControlError::UnknownControl(id.to_string()))?
            .parse(raw)
    }

    /// Copy the current values of `ids`, all taken at the same point.
    pub fn snapshot(&self, ids: &[String]) -> Result<InputSnapshot, ControlError> {
        let values = ids
            .iter()
            .map(|id| {
                self.get(id)
                    .cloned()
                    .map(|v| (id.clone(), v))
                    .ok_or_else(|| ControlError::UnknownControl(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(InputSnapshot { values })
    }

    /// Every control's current value, keyed by id.
    pub fn values(&self) -> BTreeMap<String, ControlValue> {
        self.controls
            .iter()
            .map(|c| (c.id.clone(), c.value.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Snapshot handed to derivations
// ---------------------------------------------------------------------------

/// The values a derivation sees: exactly its declared inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSnapshot {
    values: Vec<(String, ControlValue)>,
}

impl InputSnapshot {
    pub fn get(&self, id: &str) -> Option<&ControlValue> {
        self.values.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }
}

#[cfg(test)]
impl InputSnapshot {
    pub fn len(&self) -> usize {
        self.values.len()
    }
}
