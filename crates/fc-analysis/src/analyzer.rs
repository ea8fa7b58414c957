//! Analyzer driver: walks each function body and threads frame types
//! through assignments, branches, calls and operations

use crate::checker::{check_assignable, check_return, CheckOutcome};
use crate::dsl::parse_schema;
use crate::error::{Diagnostic, InferResult, OperationError, Severity, TypeError};
use crate::frame::FrameType;
use crate::lowering::{lower_aggs, lower_exprs, lower_join_keys, lower_join_kind, lower_expr};
use crate::ops::{OperationArgs, OperationRegistry};
use crate::tables::InferenceTables;
use fc_core::program::{FrameExpr, FunctionDef, Program, Statement};
use fc_core::CallGraph;
use serde::Serialize;
use std::collections::HashMap;

/// Analyzer settings
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerOptions {
    /// Emit the inferred schema of unannotated returns as informational diagnostics
    pub report_inferred: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            report_inferred: true,
        }
    }
}

/// Outcome of checking one function
#[derive(Debug, Clone, Serialize)]
pub struct FunctionReport {
    /// Function name
    pub function: String,
    /// Declared return schema, if any
    pub declared: Option<FrameType>,
    /// Inferred schema of each return point that could be inferred
    pub inferred: Vec<FrameType>,
    /// Every diagnostic produced for the function
    pub diagnostics: Vec<Diagnostic>,
}

impl FunctionReport {
    fn new(function: &str) -> Self {
        Self {
            function: function.to_string(),
            declared: None,
            inferred: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// True when no error-severity diagnostic was produced
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Pass/fail, where strict mode also fails on advisories
    pub fn passed(&self, strict: bool) -> bool {
        let threshold = if strict {
            Severity::Warning
        } else {
            Severity::Error
        };
        !self.diagnostics.iter().any(|d| d.severity >= threshold)
    }

    /// Diagnostics of error severity
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    fn push(&mut self, operation: Option<&str>, error: TypeError) {
        self.diagnostics
            .push(Diagnostic::new(&self.function, operation, error));
    }
}

/// Parsed parameter and return annotations of one function
#[derive(Debug, Clone)]
struct Signature {
    params: Vec<(String, Option<FrameType>)>,
    returns: Option<FrameType>,
}

impl Signature {
    fn parse(def: &FunctionDef) -> InferResult<Self> {
        let params = def
            .params
            .iter()
            .map(|p| {
                let schema = p.schema.as_deref().map(parse_schema).transpose()?;
                Ok((p.name.clone(), schema))
            })
            .collect::<InferResult<Vec<_>>>()?;
        let returns = def.returns.as_deref().map(parse_schema).transpose()?;
        Ok(Self { params, returns })
    }
}

/// What is known about a variable at one program point
#[derive(Debug, Clone, PartialEq)]
enum Binding {
    Known(FrameType),
    /// Bound, but its schema cannot be determined statically
    Unknown,
}

type Scope = HashMap<String, Binding>;

/// State of one body walk
struct Walk<'r> {
    function: String,
    /// Functions whose bodies are being inferred, outermost first
    call_stack: Vec<String>,
    /// Inferred type of every return point reached
    returns: Vec<FrameType>,
    /// Where checks and advisories go; `None` while inferring a callee body
    report: Option<&'r mut FunctionReport>,
    declared: Option<FrameType>,
}

impl Walk<'_> {
    fn advise(&mut self, operation: &str, advisories: Vec<TypeError>) {
        if let Some(report) = self.report.as_deref_mut() {
            for advisory in advisories {
                report.push(Some(operation), advisory);
            }
        }
    }
}

/// Checks every annotated function of one program document
pub struct Analyzer<'a> {
    program: &'a Program,
    call_graph: CallGraph,
    registry: OperationRegistry,
    tables: &'a InferenceTables,
    options: AnalyzerOptions,
    signatures: HashMap<&'a str, InferResult<Signature>>,
}

impl<'a> Analyzer<'a> {
    /// Analyzer over `program` with the built-in operations
    pub fn new(program: &'a Program, tables: &'a InferenceTables, options: AnalyzerOptions) -> Self {
        Self::with_registry(program, tables, options, OperationRegistry::with_defaults())
    }

    /// Analyzer with a custom operation registry
    pub fn with_registry(
        program: &'a Program,
        tables: &'a InferenceTables,
        options: AnalyzerOptions,
        registry: OperationRegistry,
    ) -> Self {
        let signatures = program
            .functions
            .iter()
            .map(|f| (f.name.as_str(), Signature::parse(f)))
            .collect();
        Self {
            program,
            call_graph: CallGraph::build(program),
            registry,
            tables,
            options,
            signatures,
        }
    }

    /// Check every annotated function, in document order.
    ///
    /// Functions without any annotation are helpers: they are only
    /// inferred when called.
    pub fn check_all(&self) -> Vec<FunctionReport> {
        self.program
            .functions
            .iter()
            .filter(|f| f.is_annotated())
            .map(|f| self.check_function(f))
            .collect()
    }

    /// Check one function against its declared return schema
    pub fn check_function(&self, def: &FunctionDef) -> FunctionReport {
        log::debug!("checking function '{}'", def.name);
        let mut report = FunctionReport::new(&def.name);

        for callee in self.call_graph.unresolved_calls(&def.name) {
            log::warn!("'{}' calls '{}', which is not defined", def.name, callee);
        }

        let signature = match self.signature(&def.name) {
            Ok(signature) => signature.clone(),
            Err(error) => {
                report.push(Some("signature"), error);
                return report;
            }
        };
        report.declared = signature.returns.clone();

        let mut scope: Scope = signature
            .params
            .iter()
            .map(|(name, schema)| {
                let binding = match schema {
                    Some(frame) => Binding::Known(frame.clone()),
                    None => Binding::Unknown,
                };
                (name.clone(), binding)
            })
            .collect();

        let declared = signature.returns.clone();
        let mut walk = Walk {
            function: def.name.clone(),
            call_stack: vec![def.name.clone()],
            returns: Vec::new(),
            report: Some(&mut report),
            declared,
        };

        let outcome = self.walk_body(&def.body, &mut scope, &mut walk);
        let return_count = walk.returns.len();
        drop(walk);

        match outcome {
            Err(err) => report.push(err.operation.as_deref(), err.error),
            Ok(()) if return_count == 0 && report.declared.is_some() => {
                report.push(
                    None,
                    TypeError::MissingReturn {
                        function: def.name.clone(),
                    },
                );
            }
            Ok(()) => {}
        }
        report
    }

    fn signature(&self, name: &str) -> InferResult<&Signature> {
        match self.signatures.get(name) {
            Some(Ok(signature)) => Ok(signature),
            Some(Err(error)) => Err(error.clone()),
            None => Err(TypeError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }

    fn walk_body(
        &self,
        statements: &[Statement],
        scope: &mut Scope,
        walk: &mut Walk<'_>,
    ) -> Result<(), OperationError> {
        for statement in statements {
            match statement {
                Statement::Assign(assign) => {
                    let binding = match &assign.schema {
                        Some(schema) => {
                            let declared = parse_schema(schema)
                                .map_err(|e| OperationError::new("assign", e))?;
                            self.check_annotated_value(&assign.value, &declared, scope, walk)?;
                            Binding::Known(declared)
                        }
                        None => Binding::Known(self.infer_frame(&assign.value, scope, walk)?),
                    };
                    scope.insert(assign.target.clone(), binding);
                }
                Statement::Return(value) => {
                    let inferred = self.infer_frame(value, scope, walk)?;
                    self.record_return(inferred, walk);
                }
                Statement::If(block) => {
                    let mut then_scope = scope.clone();
                    self.walk_body(&block.then, &mut then_scope, walk)?;
                    let mut else_scope = scope.clone();
                    self.walk_body(&block.otherwise, &mut else_scope, walk)?;
                    *scope = merge_scopes(then_scope, else_scope);
                }
            }
        }
        Ok(())
    }

    /// Check one return point; every return point is checked on its own
    fn record_return(&self, inferred: FrameType, walk: &mut Walk<'_>) {
        if let Some(report) = walk.report.as_deref_mut() {
            match check_return(walk.declared.as_ref(), &inferred) {
                CheckOutcome::Matched => {}
                CheckOutcome::Mismatched(errors) => {
                    for error in errors {
                        report.push(Some("return"), error);
                    }
                }
                CheckOutcome::Unannotated(frame) => {
                    if self.options.report_inferred {
                        report.push(Some("return"), TypeError::InferredSchema { schema: frame });
                    }
                }
            }
            report.inferred.push(inferred.clone());
        }
        walk.returns.push(inferred);
    }

    /// An annotated assignment binds its declaration. A value whose schema
    /// can be inferred must still be assignable to it.
    fn check_annotated_value(
        &self,
        value: &FrameExpr,
        declared: &FrameType,
        scope: &Scope,
        walk: &mut Walk<'_>,
    ) -> Result<(), OperationError> {
        match self.infer_frame(value, scope, walk) {
            Ok(actual) => {
                let errors = check_assignable(declared, &actual);
                match walk.report.as_deref_mut() {
                    Some(report) => {
                        for error in errors {
                            report.push(Some("assign"), error);
                        }
                    }
                    // Inside a callee body the first error aborts the call
                    None => {
                        if let Some(error) = errors.into_iter().next() {
                            return Err(OperationError::new("assign", error));
                        }
                    }
                }
                Ok(())
            }
            Err(OperationError {
                error: TypeError::UninferableExpression { .. } | TypeError::UnknownFunction { .. },
                ..
            }) => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn infer_frame(
        &self,
        expr: &FrameExpr,
        scope: &Scope,
        walk: &mut Walk<'_>,
    ) -> Result<FrameType, OperationError> {
        match expr {
            FrameExpr::Var(name) => match scope.get(name) {
                Some(Binding::Known(frame)) => Ok(frame.clone()),
                Some(Binding::Unknown) => Err(OperationError::bare(
                    TypeError::UninferableExpression {
                        description: format!("variable '{}'", name),
                    },
                )),
                None => Err(OperationError::bare(TypeError::UnknownVariable {
                    name: name.clone(),
                })),
            },
            FrameExpr::External(source) => Err(OperationError::bare(
                TypeError::UninferableExpression {
                    description: format!("external value '{}'", source),
                },
            )),
            FrameExpr::Call(call) => {
                let args = call
                    .args
                    .iter()
                    .map(|arg| self.infer_frame(arg, scope, walk))
                    .collect::<Result<Vec<_>, _>>()?;
                let operation = format!("call {}", call.function);
                self.infer_call(&call.function, &args, walk)
                    .map_err(|error| match error.operation {
                        Some(_) => error,
                        None => OperationError::new(&operation, error.error),
                    })
            }
            FrameExpr::Join(join) => {
                let left = self.infer_frame(&join.left, scope, walk)?;
                let right = self.infer_frame(&join.right, scope, walk)?;
                let args = OperationArgs::Join {
                    keys: lower_join_keys(join).map_err(|e| OperationError::new("join", e))?,
                    kind: lower_join_kind(join.how),
                };
                self.run_operation("join", &[left, right], &args, walk)
            }
            FrameExpr::GroupBy(group_by) => {
                let input = self.infer_frame(&group_by.frame, scope, walk)?;
                let args = OperationArgs::GroupBy {
                    keys: group_by.keys.clone(),
                    aggs: lower_aggs(&group_by.aggs)
                        .map_err(|e| OperationError::new("group_by", e))?,
                };
                self.run_operation("group_by", &[input], &args, walk)
            }
            FrameExpr::Select(projection) => {
                let input = self.infer_frame(&projection.frame, scope, walk)?;
                let exprs =
                    lower_exprs(&projection.exprs).map_err(|e| OperationError::new("select", e))?;
                self.run_operation("select", &[input], &OperationArgs::Exprs(exprs), walk)
            }
            FrameExpr::WithColumns(projection) => {
                let input = self.infer_frame(&projection.frame, scope, walk)?;
                let exprs = lower_exprs(&projection.exprs)
                    .map_err(|e| OperationError::new("with_columns", e))?;
                self.run_operation("with_columns", &[input], &OperationArgs::Exprs(exprs), walk)
            }
            FrameExpr::Filter(filter) => {
                let input = self.infer_frame(&filter.frame, scope, walk)?;
                let predicate =
                    lower_expr(&filter.predicate).map_err(|e| OperationError::new("filter", e))?;
                self.run_operation("filter", &[input], &OperationArgs::Predicate(predicate), walk)
            }
        }
    }

    fn run_operation(
        &self,
        name: &str,
        inputs: &[FrameType],
        args: &OperationArgs,
        walk: &mut Walk<'_>,
    ) -> Result<FrameType, OperationError> {
        let inferred = self
            .registry
            .infer(name, inputs, args, self.tables)
            .map_err(|e| OperationError::new(name, e))?;
        walk.advise(name, inferred.advisories);
        Ok(inferred.frame)
    }

    /// Result type of a call.
    ///
    /// A callee with a declared return yields that declaration after its
    /// arguments are checked. Otherwise the callee body is inferred with
    /// the arguments bound to its parameters.
    fn infer_call(
        &self,
        callee: &str,
        args: &[FrameType],
        walk: &mut Walk<'_>,
    ) -> Result<FrameType, OperationError> {
        let def = self.program.function(callee).ok_or_else(|| {
            OperationError::bare(TypeError::UnknownFunction {
                name: callee.to_string(),
            })
        })?;
        let signature = self.signature(callee).map_err(|_| {
            OperationError::bare(TypeError::UninferableExpression {
                description: format!("call to '{}', whose annotations are malformed", callee),
            })
        })?;

        if args.len() != signature.params.len() {
            return Err(OperationError::bare(TypeError::InvalidExpression {
                message: format!(
                    "'{}' takes {} argument(s), got {}",
                    callee,
                    signature.params.len(),
                    args.len()
                ),
            }));
        }

        let mut callee_scope = Scope::new();
        for ((param, schema), actual) in signature.params.iter().zip(args) {
            let bound = match schema {
                Some(expected) => {
                    if let Some(detail) = check_assignable(expected, actual).into_iter().next() {
                        return Err(OperationError::bare(TypeError::ArgumentMismatch {
                            function: callee.to_string(),
                            parameter: param.clone(),
                            detail: Box::new(detail),
                        }));
                    }
                    expected.clone()
                }
                None => actual.clone(),
            };
            callee_scope.insert(param.clone(), Binding::Known(bound));
        }

        if let Some(returns) = &signature.returns {
            return Ok(returns.clone());
        }

        if self.call_graph.is_recursive(callee) || walk.call_stack.iter().any(|f| f == callee) {
            let cycle = self
                .call_graph
                .cycle_path(callee)
                .unwrap_or_else(|| format!("{} -> {}", walk.call_stack.join(" -> "), callee));
            return Err(OperationError::bare(TypeError::RecursiveCall { cycle }));
        }

        log::debug!("inferring untyped callee '{}' for '{}'", callee, walk.function);
        let mut call_stack = walk.call_stack.clone();
        call_stack.push(callee.to_string());
        let mut inner = Walk {
            function: callee.to_string(),
            call_stack,
            returns: Vec::new(),
            report: None,
            declared: None,
        };
        self.walk_body(&def.body, &mut callee_scope, &mut inner)?;
        inner.returns.into_iter().next().ok_or_else(|| {
            OperationError::bare(TypeError::UninferableExpression {
                description: format!("call to '{}', which has no return statement", callee),
            })
        })
    }
}

/// Scope after a two-way branch: a variable keeps its schema only when
/// both branches agree on it
fn merge_scopes(then_scope: Scope, mut else_scope: Scope) -> Scope {
    let mut merged = Scope::with_capacity(then_scope.len());
    for (name, binding) in then_scope {
        let merged_binding = match else_scope.remove(&name) {
            Some(other) if other == binding => binding,
            _ => Binding::Unknown,
        };
        merged.insert(name, merged_binding);
    }
    for (name, _) in else_scope {
        merged.insert(name, Binding::Unknown);
    }
    merged
}

/// Check every annotated function of a document with the standard tables
pub fn check_program(program: &Program, options: AnalyzerOptions) -> Vec<FunctionReport> {
    Analyzer::new(program, InferenceTables::standard(), options).check_all()
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
