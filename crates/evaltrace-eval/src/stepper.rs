//! Substitution stepper.
//!
//! Walks an expression against an environment and records every
//! observable rewrite as a [`Step`]. Evaluation is strict and
//! left-to-right; a conditional only ever evaluates the arm it takes.

use crate::env::Environment;
use crate::error::{TraceError, TraceResult};
use crate::registry::Registry;
use crate::stack::ensure_sufficient_stack;
use evaltrace_types::pretty::{call_text, value_text};
use evaltrace_types::{Expr, ExprPath, PathSegment, Step, StepKind, MAIN_ROOT};
use tracing::{debug, trace};

/// Default per-trace evaluation budget, in evaluated nodes.
pub const DEFAULT_GAS_LIMIT: u64 = 10_000;

/// Knobs for a stepper run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepperConfig {
    /// Maximum number of expression nodes evaluated before giving up.
    pub gas_limit: u64,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Frames
// ══════════════════════════════════════════════════════════════════════════════

/// The evaluation state of one call (or of the driver's top level).
#[derive(Debug)]
struct Frame {
    root: String,
    depth: u32,
    env: Environment,
    /// The frame's expression with every step so far applied to it.
    residual: Expr,
}

impl Frame {
    fn main(expr: &Expr, env: Environment) -> Self {
        Self {
            root: MAIN_ROOT.to_string(),
            depth: 0,
            env,
            residual: expr.clone(),
        }
    }

    /// Depth given to calls made from this frame.
    fn callee_depth(&self) -> u32 {
        if self.root == MAIN_ROOT {
            self.depth
        } else {
            self.depth + 1
        }
    }

    fn rewrite(&mut self, site: &[PathSegment], with: Expr) {
        // Sites are derived from the residual itself, so the path exists.
        if let Some(next) = self.residual.replaced(site, with) {
            self.residual = next;
        }
    }

    fn text_at(&self, site: &[PathSegment]) -> String {
        self.residual
            .at(site)
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

fn extend(site: &[PathSegment], segment: PathSegment) -> Vec<PathSegment> {
    let mut next = Vec::with_capacity(site.len() + 1);
    next.extend_from_slice(site);
    next.push(segment);
    next
}

// ══════════════════════════════════════════════════════════════════════════════
// Stepper
// ══════════════════════════════════════════════════════════════════════════════

/// Produces the step sequence for one expression.
///
/// Each evaluated node is tracked by two paths: `origin`, its position in
/// the function definition (reported to renderers), and `site`, its
/// current position in the frame's residual (which shrinks as branches
/// and `let`s are resolved).
pub struct Stepper<'r> {
    registry: &'r Registry,
    gas: u64,
    gas_limit: u64,
    steps: Vec<Step>,
}

impl<'r> Stepper<'r> {
    pub fn new(registry: &'r Registry, config: StepperConfig) -> Self {
        Self {
            registry,
            gas: 0,
            gas_limit: config.gas_limit,
            steps: Vec::new(),
        }
    }

    /// Evaluate `expr` in `env`, returning every step and the final value.
    pub fn run(mut self, expr: &Expr, env: Environment) -> TraceResult<(Vec<Step>, i64)> {
        let mut frame = Frame::main(expr, env);
        let value = self.eval(expr, &ExprPath::root(MAIN_ROOT), &[], &mut frame)?;
        Ok((self.steps, value))
    }

    /// Nodes evaluated so far.
    pub fn gas_used(&self) -> u64 {
        self.gas
    }

    fn tick(&mut self) -> TraceResult<()> {
        self.gas += 1;
        if self.gas > self.gas_limit {
            Err(TraceError::GasExhausted(self.gas_limit))
        } else {
            Ok(())
        }
    }

    fn emit(&mut self, step: Step) {
        trace!(
            kind = %step.kind,
            path = %step.path,
            depth = step.depth,
            before = %step.before,
            after = %step.after,
            "step"
        );
        self.steps.push(step);
    }

    fn emit_in(
        &mut self,
        frame: &Frame,
        kind: StepKind,
        origin: &ExprPath,
        before: String,
        after: String,
        value: i64,
    ) {
        self.emit(Step {
            kind,
            path: origin.clone(),
            depth: frame.depth,
            before,
            after,
            env: frame.env.snapshot(),
            residual: frame.residual.to_string(),
            value: Some(value),
            callee: None,
        });
    }

    // ── Dispatch ─────────────────────────────────────────────────────────

    fn eval(
        &mut self,
        expr: &Expr,
        origin: &ExprPath,
        site: &[PathSegment],
        frame: &mut Frame,
    ) -> TraceResult<i64> {
        ensure_sufficient_stack(|| self.eval_node(expr, origin, site, frame))
    }

    fn eval_node(
        &mut self,
        expr: &Expr,
        origin: &ExprPath,
        site: &[PathSegment],
        frame: &mut Frame,
    ) -> TraceResult<i64> {
        self.tick()?;
        match expr {
            Expr::Literal { value } => Ok(*value),
            Expr::Variable { name } => self.eval_variable(name, origin, site, frame),
            Expr::BinaryOp { op, left, right } => {
                let lv = self.eval(
                    left,
                    &origin.child(PathSegment::Left),
                    &extend(site, PathSegment::Left),
                    frame,
                )?;
                let rv = self.eval(
                    right,
                    &origin.child(PathSegment::Right),
                    &extend(site, PathSegment::Right),
                    frame,
                )?;
                let value = op.apply(lv, rv).ok_or_else(|| {
                    TraceError::ArithmeticOverflow(format!("{lv} {} {rv}", op.symbol()))
                })?;
                let before = Expr::binary(*op, Expr::lit(lv), Expr::lit(rv)).to_string();
                frame.rewrite(site, Expr::lit(value));
                let after = value_text(value, op.is_comparison());
                self.emit_in(frame, StepKind::Reduce, origin, before, after, value);
                Ok(value)
            }
            Expr::Conditional {
                cond,
                then_branch,
                else_branch,
            } => self.eval_conditional(cond, then_branch, else_branch, origin, site, frame),
            Expr::Call { callee, argument } => {
                self.eval_call(callee, argument, origin, site, frame)
            }
            Expr::Let { name, value, body } => {
                self.eval_let(name, value, body, origin, site, frame)
            }
        }
    }

    // ── Variables ────────────────────────────────────────────────────────

    fn eval_variable(
        &mut self,
        name: &str,
        origin: &ExprPath,
        site: &[PathSegment],
        frame: &mut Frame,
    ) -> TraceResult<i64> {
        let value = frame.env.lookup(name)?;
        frame.rewrite(site, Expr::lit(value));
        self.emit_in(
            frame,
            StepKind::Substitute,
            origin,
            name.to_string(),
            value.to_string(),
            value,
        );
        Ok(value)
    }

    // ── Control flow ─────────────────────────────────────────────────────

    fn eval_conditional(
        &mut self,
        cond: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
        origin: &ExprPath,
        site: &[PathSegment],
        frame: &mut Frame,
    ) -> TraceResult<i64> {
        let test = self.eval(
            cond,
            &origin.child(PathSegment::Cond),
            &extend(site, PathSegment::Cond),
            frame,
        )?;
        let (segment, arm) = if test != 0 {
            (PathSegment::Then, then_branch)
        } else {
            (PathSegment::Else, else_branch)
        };
        let before = frame.text_at(site);
        frame.rewrite(site, arm.clone());
        self.emit_in(frame, StepKind::Branch, origin, before, arm.to_string(), test);
        // The chosen arm now sits where the conditional was.
        self.eval(arm, &origin.child(segment), site, frame)
    }

    fn eval_let(
        &mut self,
        name: &str,
        value: &Expr,
        body: &Expr,
        origin: &ExprPath,
        site: &[PathSegment],
        frame: &mut Frame,
    ) -> TraceResult<i64> {
        let bound = self.eval(
            value,
            &origin.child(PathSegment::Value),
            &extend(site, PathSegment::Value),
            frame,
        )?;
        let extended = frame.env.bind(name, bound)?;
        let outer = std::mem::replace(&mut frame.env, extended);
        frame.rewrite(site, body.clone());
        self.emit_in(
            frame,
            StepKind::Bind,
            origin,
            bound.to_string(),
            format!("{name} = {bound}"),
            bound,
        );
        let result = self.eval(body, &origin.child(PathSegment::Body), site, frame);
        frame.env = outer;
        result
    }

    // ── Calls ────────────────────────────────────────────────────────────

    fn eval_call(
        &mut self,
        callee: &str,
        argument: &Expr,
        origin: &ExprPath,
        site: &[PathSegment],
        frame: &mut Frame,
    ) -> TraceResult<i64> {
        let arg = self.eval(
            argument,
            &origin.child(PathSegment::Arg),
            &extend(site, PathSegment::Arg),
            frame,
        )?;

        let registry = self.registry;
        let def = registry.get(callee)?;
        let depth = frame.callee_depth();
        let mut inner = Frame {
            root: def.name.clone(),
            depth,
            env: Environment::empty().bind(&def.param, arg)?,
            residual: def.body.clone(),
        };
        let call = call_text(callee, arg);
        debug!(callee, arg, depth, "enter call");

        self.emit(Step {
            kind: StepKind::Bind,
            path: ExprPath::root(&def.name),
            depth,
            before: call.clone(),
            after: format!("{} = {arg}", def.param),
            env: inner.env.snapshot(),
            residual: inner.residual.to_string(),
            value: Some(arg),
            callee: Some(def.name.clone()),
        });

        let result = self.eval(&def.body, &ExprPath::root(&def.name), &[], &mut inner)?;
        debug!(callee, arg, depth, result, "leave call");

        frame.rewrite(site, Expr::lit(result));
        self.emit(Step {
            kind: StepKind::Return,
            path: origin.clone(),
            depth,
            before: call,
            after: result.to_string(),
            env: frame.env.snapshot(),
            residual: frame.residual.to_string(),
            value: Some(result),
            callee: Some(def.name.clone()),
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evaltrace_types::FunctionDef;

    fn run(expr: &Expr, env: Environment) -> TraceResult<(Vec<Step>, i64)> {
        Stepper::new(Registry::standard(), StepperConfig::default()).run(expr, env)
    }

    fn env(pairs: &[(&str, i64)]) -> Environment {
        pairs.iter().fold(Environment::empty(), |e, (n, v)| {
            e.bind(n, *v).unwrap_or_else(|err| panic!("{err}"))
        })
    }

    #[test]
    fn test_literal_emits_nothing() {
        let (steps, v) = run(&Expr::lit(7), Environment::empty()).unwrap();
        assert!(steps.is_empty());
        assert_eq!(v, 7);
    }

    #[test]
    fn test_variable_substitutes() {
        let (steps, v) = run(&Expr::var("n"), env(&[("n", 3)])).unwrap();
        assert_eq!(v, 3);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].kind, StepKind::Substitute);
        assert_eq!(steps[0].before, "n");
        assert_eq!(steps[0].after, "3");
        assert_eq!(steps[0].residual, "3");
    }

    #[test]
    fn test_unbound_variable_is_fatal() {
        let err = run(&Expr::var("q"), Environment::empty()).unwrap_err();
        assert_eq!(err, TraceError::UnboundName("q".to_string()));
    }

    #[test]
    fn test_binary_left_before_right() {
        let e = Expr::sub(Expr::var("a"), Expr::var("b"));
        let (steps, v) = run(&e, env(&[("a", 10), ("b", 4)])).unwrap();
        assert_eq!(v, 6);
        let kinds: Vec<_> = steps.iter().map(|s| (s.kind, s.before.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (StepKind::Substitute, "a"),
                (StepKind::Substitute, "b"),
                (StepKind::Reduce, "10 - 4"),
            ]
        );
        assert_eq!(steps[0].residual, "10 - b");
        assert_eq!(steps[1].residual, "10 - 4");
        assert_eq!(steps[2].residual, "6");
        assert_eq!(steps[0].path.to_string(), "main/left");
        assert_eq!(steps[1].path.to_string(), "main/right");
    }

    #[test]
    fn test_eq_reduces_to_truth_text() {
        let e = Expr::equals(Expr::lit(3), Expr::lit(0));
        let (steps, v) = run(&e, Environment::empty()).unwrap();
        assert_eq!(v, 0);
        assert_eq!(steps[0].before, "3 = 0");
        assert_eq!(steps[0].after, "false");
        assert_eq!(steps[0].value, Some(0));
    }

    #[test]
    fn test_conditional_short_circuits() {
        // The untaken arm references an unbound name: evaluating it would fail.
        let e = Expr::cond(Expr::lit(1), Expr::lit(5), Expr::var("missing"));
        let (steps, v) = run(&e, Environment::empty()).unwrap();
        assert_eq!(v, 5);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].kind, StepKind::Branch);
        assert_eq!(steps[0].before, "if true then 5 else missing");
        assert_eq!(steps[0].after, "5");
    }

    #[test]
    fn test_let_binds_in_frame_and_restores() {
        let e = Expr::mul(
            Expr::let_in("y", Expr::lit(2), Expr::var("y")),
            Expr::var("x"),
        );
        let (steps, v) = run(&e, env(&[("x", 3)])).unwrap();
        assert_eq!(v, 6);
        let bind = &steps[0];
        assert_eq!(bind.kind, StepKind::Bind);
        assert_eq!(bind.after, "y = 2");
        assert_eq!(bind.callee, None);
        assert_eq!(bind.env.to_string(), "{x: 3, y: 2}");
        assert_eq!(bind.residual, "y * x");
        // After the let body, `y` is out of scope again.
        let subst_x = steps.iter().find(|s| s.before == "x").unwrap();
        assert_eq!(subst_x.env.to_string(), "{x: 3}");
    }

    #[test]
    fn test_let_rebinding_same_name_rejected() {
        let e = Expr::let_in("x", Expr::lit(1), Expr::var("x"));
        let err = run(&e, env(&[("x", 3)])).unwrap_err();
        assert_eq!(err, TraceError::DuplicateBinding("x".to_string()));
    }

    #[test]
    fn test_unknown_callee() {
        let err = run(&Expr::call("fib", Expr::lit(3)), Environment::empty()).unwrap_err();
        assert_eq!(err, TraceError::UnknownFunction("fib".to_string()));
    }

    #[test]
    fn test_call_uses_fresh_frame() {
        // The caller's `n` must not leak into the callee.
        let e = Expr::call("square_of_pred", Expr::var("n"));
        let (steps, v) = run(&e, env(&[("n", 4)])).unwrap();
        assert_eq!(v, 9);
        let bind = steps.iter().find(|s| s.is_call_bind()).unwrap();
        assert_eq!(bind.env.to_string(), "{x: 4}");
        let ret = steps.last().unwrap();
        assert_eq!(ret.kind, StepKind::Return);
        assert_eq!(ret.env.to_string(), "{n: 4}");
        assert_eq!(ret.residual, "9");
    }

    #[test]
    fn test_custom_registry() {
        let reg = Registry::new(vec![FunctionDef::new(
            "double",
            "k",
            Expr::mul(Expr::var("k"), Expr::lit(2)),
        )]);
        let (steps, v) = Stepper::new(&reg, StepperConfig::default())
            .run(&Expr::call("double", Expr::lit(21)), Environment::empty())
            .unwrap();
        assert_eq!(v, 42);
        assert_eq!(steps.first().unwrap().residual, "k * 2");
    }

    #[test]
    fn test_gas_exhaustion() {
        let stepper = Stepper::new(Registry::standard(), StepperConfig { gas_limit: 25 });
        let err = stepper
            .run(&Expr::call("fact", Expr::lit(10)), Environment::empty())
            .unwrap_err();
        assert_eq!(err, TraceError::GasExhausted(25));
    }

    #[test]
    fn test_gas_used_counts_nodes() {
        let mut stepper = Stepper::new(Registry::standard(), StepperConfig::default());
        let mut frame = Frame::main(&Expr::lit(1), Environment::empty());
        let e = Expr::sub(Expr::lit(3), Expr::lit(1));
        stepper
            .eval(&e, &ExprPath::root(MAIN_ROOT), &[], &mut frame)
            .unwrap();
        assert_eq!(stepper.gas_used(), 3);
    }

    #[test]
    fn test_deep_recursion_hits_gas_not_stack() {
        let stepper = Stepper::new(Registry::standard(), StepperConfig { gas_limit: 200_000 });
        let err = stepper
            .run(&Expr::call("fact", Expr::lit(100_000)), Environment::empty())
            .unwrap_err();
        assert_eq!(err, TraceError::GasExhausted(200_000));
    }

    #[test]
    fn test_overflow_is_reported() {
        let e = Expr::mul(Expr::lit(i64::MAX), Expr::lit(2));
        let err = run(&e, Environment::empty()).unwrap_err();
        assert!(matches!(err, TraceError::ArithmeticOverflow(_)));
    }
}
