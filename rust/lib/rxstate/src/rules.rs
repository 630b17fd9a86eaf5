use std::any::Any;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::action::{Action, ActionEvent};
use crate::error::StoreError;
use crate::path::{Key, Path};
use crate::value::{self, type_name};

/// Transform for action rules: `(current, event) -> Some(next)`, or `None`
/// to leave the path untouched.
pub(crate) type ApplyFn<T> = Rc<dyn Fn(T, &ActionEvent) -> Result<Option<T>, StoreError>>;

/// Transform for dependency rules: current dependency values, in declaration
/// order, to the next value.
pub(crate) type ComputeFn<T> = Rc<dyn Fn(Vec<Value>) -> Result<T, StoreError>>;

/// One update rule of a reducer binding.
///
/// A `distinct` rule drops values equal to the one already stored.
pub(crate) enum Rule<T> {
    /// Fires on dispatches whose tag is one of `tags`.
    Action {
        tags: Vec<&'static str>,
        apply: ApplyFn<T>,
        distinct: bool,
    },
    /// Fires on writes related to any of `deps`.
    Dependency {
        deps: Vec<Path>,
        compute: ComputeFn<T>,
        distinct: bool,
    },
}

impl<T> Rule<T> {
    fn set_distinct(&mut self) {
        match self {
            Rule::Action { distinct, .. } | Rule::Dependency { distinct, .. } => *distinct = true,
        }
    }
}

/// Rule-collecting interface handed to a reducer's setup closure.
///
/// ```ignore
/// rx.reducer("counter", 0, |on| {
///     on.on(INCREMENT, |count, amount| count + amount);
///     on.merge([RESET, CLEAR], |_, _| 0);
///     on.on_filtered(SET, |_, value| (*value >= 0).then_some(*value)).distinct();
/// })?;
///
/// rx.reducer("status", String::new(), |on| {
///     on.combine((mode_key, selected_key), |(mode, id)| describe(mode, id));
/// })?;
/// ```
///
/// Rules fire in the order they are registered here.
pub struct Rules<T> {
    rules: Vec<Rule<T>>,
}

impl<T: 'static> Rules<T> {
    pub(crate) fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub(crate) fn into_vec(self) -> Vec<Rule<T>> {
        self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    // ====================================================================
    // Action rules
    // ====================================================================

    /// Update the path when `action` is dispatched.
    pub fn on<P, F>(&mut self, action: Action<P>, transform: F) -> &mut Self
    where
        P: Any,
        F: Fn(T, &P) -> T + 'static,
    {
        self.push_action(vec![action.tag()], move |state, event| {
            let payload = downcast::<P>(event)?;
            Ok(Some(transform(state, payload)))
        })
    }

    /// Like [`on`](Self::on), but the transform may decline to emit by
    /// returning `None`, leaving the path and its subscribers untouched.
    pub fn on_filtered<P, F>(&mut self, action: Action<P>, transform: F) -> &mut Self
    where
        P: Any,
        F: Fn(&T, &P) -> Option<T> + 'static,
    {
        self.push_action(vec![action.tag()], move |state, event| {
            let payload = downcast::<P>(event)?;
            Ok(transform(&state, payload))
        })
    }

    /// One transform for several actions sharing a payload type.
    ///
    /// Actions with different payload types cannot share a transform; give
    /// each its own [`on`](Self::on) rule. They still fire in registration
    /// order.
    pub fn merge<P, I, F>(&mut self, actions: I, transform: F) -> &mut Self
    where
        P: Any,
        I: IntoIterator<Item = Action<P>>,
        F: Fn(T, &P) -> T + 'static,
    {
        let tags = actions.into_iter().map(|action| action.tag()).collect();
        self.push_action(tags, move |state, event| {
            let payload = downcast::<P>(event)?;
            Ok(Some(transform(state, payload)))
        })
    }

    /// [`merge`](Self::merge) with a transform that may decline to emit.
    pub fn merge_filtered<P, I, F>(&mut self, actions: I, transform: F) -> &mut Self
    where
        P: Any,
        I: IntoIterator<Item = Action<P>>,
        F: Fn(&T, &P) -> Option<T> + 'static,
    {
        let tags = actions.into_iter().map(|action| action.tag()).collect();
        self.push_action(tags, move |state, event| {
            let payload = downcast::<P>(event)?;
            Ok(transform(&state, payload))
        })
    }

    fn push_action<F>(&mut self, tags: Vec<&'static str>, apply: F) -> &mut Self
    where
        F: Fn(T, &ActionEvent) -> Result<Option<T>, StoreError> + 'static,
    {
        self.rules.push(Rule::Action {
            tags,
            apply: Rc::new(apply),
            distinct: false,
        });
        self
    }

    /// Make the rule added last skip values equal to the one already stored.
    ///
    /// A skipped value is neither written nor notified, so dependents do not
    /// recompute. Values are compared in their serialized form.
    pub fn distinct(&mut self) -> &mut Self {
        if let Some(rule) = self.rules.last_mut() {
            rule.set_distinct();
        }
        self
    }

    // ====================================================================
    // Dependency rules
    // ====================================================================

    /// Derive the path from another path's value.
    ///
    /// The value is computed as soon as the reducer is bound, and again on
    /// every write at, above or below `dependency`.
    pub fn on_path<D, F>(&mut self, dependency: impl Into<Key<D>>, compute: F) -> &mut Self
    where
        D: DeserializeOwned + 'static,
        F: Fn(D) -> T + 'static,
    {
        let path = dependency.into().path().clone();
        let decode_path = path.clone();
        self.rules.push(Rule::Dependency {
            deps: vec![path],
            compute: Rc::new(move |values: Vec<Value>| {
                let value = values.into_iter().next().unwrap_or(Value::Null);
                Ok(compute(value::decode::<D>(&decode_path, value)?))
            }),
            distinct: false,
        });
        self
    }

    /// Derive the path from several paths at once.
    ///
    /// `compute` receives the current values of every dependency, in
    /// declaration order, whenever any one of them changes.
    pub fn combine<D, F>(&mut self, dependencies: D, compute: F) -> &mut Self
    where
        D: Dependencies + 'static,
        F: Fn(D::Values) -> T + 'static,
    {
        let deps = dependencies.paths();
        self.rules.push(Rule::Dependency {
            compute: combined::<T, D, F>(deps.clone(), compute),
            deps,
            distinct: false,
        });
        self
    }
}

/// Compute function for a [`Dependencies`] set: decode, then `compute`.
pub(crate) fn combined<T, D, F>(deps: Vec<Path>, compute: F) -> ComputeFn<T>
where
    T: 'static,
    D: Dependencies + 'static,
    F: Fn(D::Values) -> T + 'static,
{
    Rc::new(move |values: Vec<Value>| Ok(compute(D::decode(&deps, values)?)))
}

fn downcast<P: Any>(event: &ActionEvent) -> Result<&P, StoreError> {
    event.payload::<P>().ok_or(StoreError::PayloadType {
        tag: event.tag,
        expected: type_name::<P>(),
    })
}

// ============================================================================
// Dependencies
// ============================================================================

/// A fixed set of dependency paths for [`Rules::combine`].
///
/// Implemented for tuples of [`Key`]s (decoding each value to its key's
/// type) and for `Vec<Path>` (raw JSON values).
pub trait Dependencies {
    type Values;

    fn paths(&self) -> Vec<Path>;

    fn decode(paths: &[Path], values: Vec<Value>) -> Result<Self::Values, StoreError>;
}

macro_rules! impl_dependencies {
    ($($ty:ident => $idx:tt),+) => {
        impl<$($ty: DeserializeOwned),+> Dependencies for ($(Key<$ty>,)+) {
            type Values = ($($ty,)+);

            fn paths(&self) -> Vec<Path> {
                vec![$(self.$idx.path().clone()),+]
            }

            fn decode(paths: &[Path], values: Vec<Value>) -> Result<Self::Values, StoreError> {
                let mut values = values.into_iter();
                Ok(($(
                    value::decode::<$ty>(&paths[$idx], values.next().unwrap_or(Value::Null))?,
                )+))
            }
        }
    };
}

impl_dependencies!(A => 0);
impl_dependencies!(A => 0, B => 1);
impl_dependencies!(A => 0, B => 1, C => 2);
impl_dependencies!(A => 0, B => 1, C => 2, D => 3);
impl_dependencies!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_dependencies!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);

impl Dependencies for Vec<Path> {
    type Values = Vec<Value>;

    fn paths(&self) -> Vec<Path> {
        self.clone()
    }

    fn decode(_paths: &[Path], values: Vec<Value>) -> Result<Self::Values, StoreError> {
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const INCREMENT: Action<i64> = Action::define("counter.increment");
    const RESET: Action = Action::define("counter.reset");
    const CLEAR: Action = Action::define("counter.clear");

    fn event<P: Any + std::fmt::Debug>(action: Action<P>, payload: P) -> ActionEvent {
        ActionEvent::new(1, action.tag(), Rc::new(payload))
    }

    fn apply_first(rules: &Rules<i64>, state: i64, ev: &ActionEvent) -> Option<i64> {
        match &rules.rules[0] {
            Rule::Action { apply, .. } => apply(state, ev).unwrap(),
            Rule::Dependency { .. } => panic!("expected an action rule"),
        }
    }

    // ========================================================================
    // Action rules
    // ========================================================================

    #[test]
    fn on_records_tag_and_transform() {
        let mut rules = Rules::<i64>::new();
        rules.on(INCREMENT, |s, a| s + a);

        assert_eq!(rules.len(), 1);
        match &rules.rules[0] {
            Rule::Action { tags, .. } => assert_eq!(tags, &vec!["counter.increment"]),
            Rule::Dependency { .. } => panic!("expected an action rule"),
        }
        assert_eq!(apply_first(&rules, 3, &event(INCREMENT, 4)), Some(7));
    }

    #[test]
    fn on_filtered_can_skip() {
        let mut rules = Rules::<i64>::new();
        rules.on_filtered(INCREMENT, |s, a| (*a > 0).then(|| s + a));

        assert_eq!(apply_first(&rules, 1, &event(INCREMENT, 2)), Some(3));
        assert_eq!(apply_first(&rules, 1, &event(INCREMENT, -2)), None);
    }

    #[test]
    fn merge_collects_all_tags() {
        let mut rules = Rules::<i64>::new();
        rules.merge([RESET, CLEAR], |_, _| 0);

        match &rules.rules[0] {
            Rule::Action { tags, .. } => {
                assert_eq!(tags, &vec!["counter.reset", "counter.clear"])
            }
            Rule::Dependency { .. } => panic!("expected an action rule"),
        }
        assert_eq!(apply_first(&rules, 9, &event(CLEAR, ())), Some(0));
    }

    #[test]
    fn merge_filtered_can_skip() {
        let mut rules = Rules::<i64>::new();
        rules.merge_filtered([RESET, CLEAR], |s, _| (*s != 0).then_some(0));

        assert_eq!(apply_first(&rules, 9, &event(RESET, ())), Some(0));
        assert_eq!(apply_first(&rules, 0, &event(CLEAR, ())), None);
    }

    #[test]
    fn distinct_marks_only_the_last_rule() {
        let mut rules = Rules::<i64>::new();
        rules.on(INCREMENT, |s, a| s + a);
        rules.on_path("other", |n: i64| n).distinct();

        let distinct: Vec<bool> = rules
            .rules
            .iter()
            .map(|rule| match rule {
                Rule::Action { distinct, .. } | Rule::Dependency { distinct, .. } => *distinct,
            })
            .collect();
        assert_eq!(distinct, vec![false, true]);
    }

    #[test]
    fn distinct_without_rules_is_noop() {
        let mut rules = Rules::<i64>::new();
        rules.distinct();
        assert!(rules.is_empty());
    }

    #[test]
    fn wrong_payload_type_is_reported() {
        let mut rules = Rules::<i64>::new();
        rules.on(INCREMENT, |s, a| s + a);

        let bogus = ActionEvent::new(1, INCREMENT.tag(), Rc::new("three"));
        match &rules.rules[0] {
            Rule::Action { apply, .. } => match apply(0, &bogus) {
                Err(StoreError::PayloadType { tag, .. }) => assert_eq!(tag, "counter.increment"),
                other => panic!("expected PayloadType, got {other:?}"),
            },
            Rule::Dependency { .. } => panic!("expected an action rule"),
        }
    }

    // ========================================================================
    // Dependency rules
    // ========================================================================

    #[test]
    fn on_path_decodes_dependency() {
        let mut rules = Rules::<String>::new();
        rules.on_path("mode", |mode: String| format!("mode={mode}"));

        match &rules.rules[0] {
            Rule::Dependency { deps, compute, .. } => {
                assert_eq!(deps, &vec![Path::parse("mode")]);
                assert_eq!(compute(vec![json!("edit")]).unwrap(), "mode=edit");
            }
            Rule::Action { .. } => panic!("expected a dependency rule"),
        }
    }

    #[test]
    fn combine_passes_values_in_order() {
        let mode: Key<String> = "mode".into();
        let selected: Key<Option<String>> = "selectedId".into();
        let mut rules = Rules::<String>::new();
        rules.combine((mode, selected), |(mode, id)| match id {
            Some(id) if mode == "edit" => format!("Editing: {id}"),
            _ => "idle".to_string(),
        });

        match &rules.rules[0] {
            Rule::Dependency { deps, compute, .. } => {
                assert_eq!(deps.len(), 2);
                assert_eq!(
                    compute(vec![json!("edit"), json!("n1")]).unwrap(),
                    "Editing: n1"
                );
                assert_eq!(compute(vec![json!("view"), json!("n1")]).unwrap(), "idle");
                assert_eq!(compute(vec![json!("edit"), Value::Null]).unwrap(), "idle");
            }
            Rule::Action { .. } => panic!("expected a dependency rule"),
        }
    }

    #[test]
    fn combine_decode_error_names_path() {
        let count: Key<u32> = "count".into();
        let mut rules = Rules::<u32>::new();
        rules.combine((count,), |(n,)| n * 2);

        match &rules.rules[0] {
            Rule::Dependency { compute, .. } => match compute(vec![json!("x")]) {
                Err(StoreError::Decode { path, .. }) => assert_eq!(path.to_string(), "count"),
                other => panic!("expected Decode, got {other:?}"),
            },
            Rule::Action { .. } => panic!("expected a dependency rule"),
        }
    }

    #[test]
    fn combine_raw_paths() {
        let mut rules = Rules::<usize>::new();
        rules.combine(vec![Path::parse("a"), Path::parse("b")], |values| values.len());

        match &rules.rules[0] {
            Rule::Dependency { compute, .. } => {
                assert_eq!(compute(vec![json!(1), json!(2)]).unwrap(), 2)
            }
            Rule::Action { .. } => panic!("expected a dependency rule"),
        }
    }
}
