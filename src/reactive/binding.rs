use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::controls::{ControlRegistry, ControlValue, InputSnapshot};
use super::render::Renderer;
use crate::artifact::Artifact;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A derivation could not produce its artifact. Given validated controls and
/// data this indicates a wiring bug, not a user error.
#[derive(Debug, Error, PartialEq)]
pub enum DeriveError {
    #[error("input '{0}' missing from snapshot")]
    MissingInput(String),
    #[error("input '{id}' should be a {expected} value")]
    WrongKind { id: String, expected: &'static str },
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),
    #[error("no values to summarise for '{0}'")]
    EmptySample(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum BindingError {
    #[error("binding '{binding}' reads unknown control '{control}'")]
    UnknownInput { binding: String, control: String },
    #[error("binding '{0}' declares no inputs")]
    NoInputs(String),
    #[error("slot '{0}' is written by more than one binding")]
    DuplicateOutput(String),
}

// ---------------------------------------------------------------------------
// Typed access to snapshot values
// ---------------------------------------------------------------------------

impl InputSnapshot {
    /// The selected option of a dropdown input.
    pub fn one(&self, id: &str) -> Result<&str, DeriveError> {
        match self.get(id) {
            Some(ControlValue::One(s)) => Ok(s),
            Some(_) => Err(DeriveError::WrongKind {
                id: id.to_string(),
                expected: "one",
            }),
            None => Err(DeriveError::MissingInput(id.to_string())),
        }
    }

    /// Whether a checklist input has `option` ticked.
    pub fn checked(&self, id: &str, option: &str) -> Result<bool, DeriveError> {
        match self.get(id) {
            Some(ControlValue::Many(set)) => Ok(set.contains(option)),
            Some(_) => Err(DeriveError::WrongKind {
                id: id.to_string(),
                expected: "many",
            }),
            None => Err(DeriveError::MissingInput(id.to_string())),
        }
    }

    pub fn number(&self, id: &str) -> Result<i64, DeriveError> {
        match self.get(id) {
            Some(ControlValue::Number(n)) => Ok(*n),
            Some(_) => Err(DeriveError::WrongKind {
                id: id.to_string(),
                expected: "number",
            }),
            None => Err(DeriveError::MissingInput(id.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

type DeriveFn<C> = Box<dyn Fn(&C, &InputSnapshot) -> Result<Artifact, DeriveError>>;

/// Controls read → derivation → slot written.
pub struct Binding<C> {
    pub name: String,
    pub inputs: Vec<String>,
    pub output: String,
    derive: DeriveFn<C>,
}

impl<C> Binding<C> {
    pub fn new(
        name: impl Into<String>,
        inputs: &[&str],
        output: impl Into<String>,
        derive: impl Fn(&C, &InputSnapshot) -> Result<Artifact, DeriveError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: output.into(),
            derive: Box::new(derive),
        }
    }
}

impl<C> std::fmt::Debug for Binding<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// BindingGraph
// ---------------------------------------------------------------------------

/// The static subscription table: control id → bindings that read it.
///
/// Built once and immutable afterwards. Bindings run in registration order.
/// The graph is bipartite (no derivation reads another's output), so no
/// scheduling beyond that order is needed.
pub struct BindingGraph<C> {
    bindings: Vec<Binding<C>>,
    subscribers: BTreeMap<String, Vec<usize>>,
}

impl<C> std::fmt::Debug for BindingGraph<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingGraph")
            .field("bindings", &self.bindings)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

impl<C> BindingGraph<C> {
    /// Validate and index `bindings` against the controls they read.
    pub fn new(
        bindings: Vec<Binding<C>>,
        controls: &ControlRegistry,
    ) -> Result<Self, BindingError> {
        let mut outputs = BTreeSet::new();
        let mut subscribers: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (i, binding) in bindings.iter().enumerate() {
            if binding.inputs.is_empty() {
                return Err(BindingError::NoInputs(binding.name.clone()));
            }
            if !outputs.insert(binding.output.clone()) {
                return Err(BindingError::DuplicateOutput(binding.output.clone()));
            }
            for input in &binding.inputs {
                if !controls.contains(input) {
                    return Err(BindingError::UnknownInput {
                        binding: binding.name.clone(),
                        control: input.clone(),
                    });
                }
                let subs = subscribers.entry(input.clone()).or_default();
                if !subs.contains(&i) {
                    subs.push(i);
                }
            }
        }

        Ok(Self {
            bindings,
            subscribers,
        })
    }

    /// Bindings that read `control`, in registration order.
    pub fn subscribers(&self, control: &str) -> impl Iterator<Item = &Binding<C>> {
        self.subscribers
            .get(control)
            .into_iter()
            .flatten()
            .map(|&i| &self.bindings[i])
    }

    /// Re-run every binding subscribed to `changed`. Returns the slots that
    /// received a new artifact.
    pub fn propagate<R: Renderer + ?Sized>(
        &self,
        changed: &str,
        context: &C,
        controls: &ControlRegistry,
        renderer: &mut R,
    ) -> Vec<String> {
        self.subscribers(changed)
            .filter_map(|b| Self::run(b, context, controls, &mut *renderer))
            .collect()
    }

    /// Run every binding once, e.g. to fill all slots at startup.
    pub fn render_all<R: Renderer + ?Sized>(
        &self,
        context: &C,
        controls: &ControlRegistry,
        renderer: &mut R,
    ) -> Vec<String> {
        self.bindings
            .iter()
            .filter_map(|b| Self::run(b, context, controls, &mut *renderer))
            .collect()
    }

    fn run<R: Renderer + ?Sized>(
        binding: &Binding<C>,
        context: &C,
        controls: &ControlRegistry,
        renderer: &mut R,
    ) -> Option<String> {
        // Inputs are copied before the call so the derivation sees one
        // consistent set of values.
        let snapshot = match controls.snapshot(&binding.inputs) {
            Ok(s) => s,
            Err(e) => {
                log::error!("binding '{}': {e}", binding.name);
                return None;
            }
        };
        match (binding.derive)(context, &snapshot) {
            Ok(artifact) => {
                log::debug!("binding '{}' re-rendered '{}'", binding.name, binding.output);
                renderer.render(&binding.output, artifact);
                Some(binding.output.clone())
            }
            Err(e) => {
                log::error!(
                    "binding '{}' failed, keeping previous '{}': {e}",
                    binding.name,
                    binding.output
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::TextNode;
    use crate::reactive::controls::{Control, Domain};
    use crate::reactive::render::SlotStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn controls() -> ControlRegistry {
        let mut reg = ControlRegistry::new();
        reg.register(
            Control::new("a", "A", Domain::one_of(["p", "q"]), ControlValue::One("p".into()))
                .unwrap(),
        )
        .unwrap();
        reg.register(
            Control::new("n", "N", Domain::Range { min: 1, max: 9 }, ControlValue::Number(1))
                .unwrap(),
        )
        .unwrap();
        reg
    }

    fn echo(name: &str, inputs: &[&str], output: &str) -> Binding<()> {
        let ids: Vec<String> = inputs.iter().map(|s| s.to_string()).collect();
        Binding::new(name, inputs, output, move |_: &(), snap: &InputSnapshot| {
            let parts: Vec<String> = ids
                .iter()
                .map(|id| snap.get(id).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            Ok(Artifact::Text(TextNode::line(parts.join("|"))))
        })
    }

    fn text(store: &SlotStore, slot: &str) -> String {
        match store.get(slot) {
            Some(Artifact::Text(TextNode::Line { text })) => text.clone(),
            other => panic!("unexpected slot content {other:?}"),
        }
    }

    #[test]
    fn change_reruns_only_subscribers_with_full_snapshot() {
        let mut reg = controls();
        let graph = BindingGraph::new(
            vec![
                echo("both", &["a", "n"], "s1"),
                echo("only_n", &["n"], "s2"),
                echo("only_a", &["a"], "s3"),
            ],
            &reg,
        )
        .unwrap();
        let mut store = SlotStore::new();
        assert_eq!(graph.render_all(&(), &reg, &mut store), vec!["s1", "s2", "s3"]);

        reg.set("n", ControlValue::Number(7)).unwrap();
        let updated = graph.propagate("n", &(), &reg, &mut store);

        assert_eq!(updated, vec!["s1", "s2"]);
        // the unchanged input keeps its last value
        assert_eq!(text(&store, "s1"), "p|7");
        assert_eq!(text(&store, "s2"), "7");
        assert_eq!(text(&store, "s3"), "p");
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let reg = controls();
        let order = Rc::new(RefCell::new(Vec::new()));
        let make = |name: &'static str, slot: &'static str| {
            let order = Rc::clone(&order);
            Binding::new(name, &["a"], slot, move |_: &(), _: &InputSnapshot| {
                order.borrow_mut().push(name);
                Ok(Artifact::Text(TextNode::line(name)))
            })
        };
        let bindings = vec![make("first", "x"), make("second", "y"), make("third", "z")];
        let graph = BindingGraph::new(bindings, &reg).unwrap();

        graph.propagate("a", &(), &reg, &mut SlotStore::new());
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn failing_derivation_keeps_previous_artifact() {
        let mut reg = controls();
        let graph = BindingGraph::new(
            vec![Binding::new("picky", &["n"], "out", |_: &(), snap: &InputSnapshot| {
                let n = snap.number("n")?;
                if n > 5 {
                    return Err(DeriveError::UnknownFeature(format!("n={n}")));
                }
                Ok(Artifact::Text(TextNode::line(n.to_string())))
            })],
            &reg,
        )
        .unwrap();
        let mut store = SlotStore::new();
        graph.render_all(&(), &reg, &mut store);

        reg.set("n", ControlValue::Number(8)).unwrap();
        assert!(graph.propagate("n", &(), &reg, &mut store).is_empty());
        assert_eq!(text(&store, "out"), "1");
    }

    #[test]
    fn construction_validates_wiring() {
        let reg = controls();
        assert_eq!(
            BindingGraph::new(vec![echo("b", &["ghost"], "s")], &reg).unwrap_err(),
            BindingError::UnknownInput {
                binding: "b".into(),
                control: "ghost".into()
            }
        );
        assert_eq!(
            BindingGraph::new(vec![echo("b1", &["a"], "s"), echo("b2", &["n"], "s")], &reg)
                .unwrap_err(),
            BindingError::DuplicateOutput("s".into())
        );
        assert_eq!(
            BindingGraph::new(vec![echo("b", &[], "s")], &reg).unwrap_err(),
            BindingError::NoInputs("b".into())
        );
    }

    #[test]
    fn debug_output_lists_bindings_and_subscriptions() {
        let reg = controls();
        let graph = BindingGraph::new(vec![echo("only_a", &["a"], "s")], &reg).unwrap();
        let text = format!("{graph:?}");
        assert!(text.contains("only_a"));
        assert!(text.contains("subscribers"));
    }

    #[test]
    fn unsubscribed_control_triggers_nothing() {
        let reg = controls();
        let graph = BindingGraph::new(vec![echo("only_a", &["a"], "s")], &reg).unwrap();
        assert!(graph.propagate("n", &(), &reg, &mut SlotStore::new()).is_empty());
        assert_eq!(graph.subscribers("a").count(), 1);
    }

    #[test]
    fn snapshot_accessors_check_kinds() {
        let reg = controls();
        let snap = reg.snapshot(&["a".to_string(), "n".to_string()]).unwrap();
        assert_eq!(snap.one("a"), Ok("p"));
        assert_eq!(snap.number("n"), Ok(1));
        assert!(matches!(snap.number("a"), Err(DeriveError::WrongKind { .. })));
        assert_eq!(snap.checked("zz", "yes"), Err(DeriveError::MissingInput("zz".into())));
    }
}
