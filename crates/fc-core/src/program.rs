//! Program documents: the structured form of the functions being checked
//!
//! A document is YAML. Enum-valued nodes are written as single-key maps,
//! e.g. `{ var: users }` or `{ join: { left: ..., right: ..., on: [id] } }`.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A program document: a set of functions checked together
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Program {
    /// Function definitions, in document order
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
}

/// A function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionDef {
    /// Function name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Parameters, in call order
    #[serde(default)]
    pub params: Vec<ParamDef>,

    /// Declared return schema
    #[serde(default)]
    pub returns: Option<String>,

    /// Function body
    #[serde(default)]
    pub body: Vec<Statement>,
}

/// A function parameter with an optional declared schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDef {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
}

/// A statement in a function body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// Bind a frame to a variable
    Assign(Assign),
    /// Return a frame
    Return(FrameExpr),
    /// Two-way branch
    If(IfBlock),
}

/// `target = value`, optionally annotated with a schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assign {
    pub target: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub value: FrameExpr,
}

/// Conditional block; the condition itself is not typed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IfBlock {
    #[serde(default)]
    pub then: Vec<Statement>,
    #[serde(default, rename = "else")]
    pub otherwise: Vec<Statement>,
}

/// An expression producing a frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameExpr {
    /// Variable or parameter reference
    Var(String),
    /// Call to a function in the same document
    Call(CallExpr),
    /// Value from outside the document; its schema is unknown
    External(String),
    Join(JoinExpr),
    GroupBy(GroupByExpr),
    Select(ProjectionExpr),
    WithColumns(ProjectionExpr),
    Filter(FilterExpr),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallExpr {
    pub function: String,
    #[serde(default)]
    pub args: Vec<FrameExpr>,
}

/// Join kind as written in documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinHow {
    #[default]
    Inner,
    Left,
    Right,
    #[serde(alias = "outer")]
    Full,
}

/// Join on shared key names (`on`) or on key pairs (`left_on`/`right_on`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinExpr {
    pub left: Box<FrameExpr>,
    pub right: Box<FrameExpr>,
    #[serde(default)]
    pub on: Vec<String>,
    #[serde(default)]
    pub left_on: Vec<String>,
    #[serde(default)]
    pub right_on: Vec<String>,
    #[serde(default)]
    pub how: JoinHow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupByExpr {
    pub frame: Box<FrameExpr>,
    pub keys: Vec<String>,
    #[serde(default)]
    pub aggs: Vec<ColumnExpr>,
}

/// Shared shape of `select` and `with_columns`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionExpr {
    pub frame: Box<FrameExpr>,
    pub exprs: Vec<ColumnExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterExpr {
    pub frame: Box<FrameExpr>,
    pub predicate: ColumnExpr,
}

/// A column expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnExpr {
    Col(String),
    Lit(LiteralValue),
    Binary(BinaryExpr),
    Not(Box<ColumnExpr>),
    Neg(Box<ColumnExpr>),
    IsNull(Box<ColumnExpr>),
    IsNotNull(Box<ColumnExpr>),
    Cast(CastExpr),
    When(WhenExpr),
    FillNull(FillNullExpr),
    Agg(AggExpr),
    Alias(AliasExpr),
}

/// Literal scalar; the YAML scalar kind decides the variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    /// YAML `~` or `null`
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    #[serde(alias = "+")]
    Add,
    #[serde(alias = "-")]
    Sub,
    #[serde(alias = "*")]
    Mul,
    #[serde(alias = "/")]
    Div,
    #[serde(alias = "%")]
    Mod,
    #[serde(alias = "==")]
    Eq,
    #[serde(alias = "!=")]
    Ne,
    #[serde(alias = "<")]
    Lt,
    #[serde(alias = "<=")]
    Le,
    #[serde(alias = ">")]
    Gt,
    #[serde(alias = ">=")]
    Ge,
    #[serde(alias = "&")]
    And,
    #[serde(alias = "|")]
    Or,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinaryExpr {
    pub op: BinaryOperator,
    pub left: Box<ColumnExpr>,
    pub right: Box<ColumnExpr>,
}

/// Cast to a type written in schema syntax, e.g. `Float64?`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CastExpr {
    pub expr: Box<ColumnExpr>,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhenExpr {
    pub branches: Vec<WhenBranch>,
    #[serde(default)]
    pub otherwise: Option<Box<ColumnExpr>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhenBranch {
    pub condition: ColumnExpr,
    pub then: ColumnExpr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FillNullExpr {
    pub expr: Box<ColumnExpr>,
    pub value: Box<ColumnExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggExpr {
    pub function: String,
    pub expr: Box<ColumnExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasExpr {
    pub expr: Box<ColumnExpr>,
    pub name: String,
}

impl Program {
    /// Parse a document from YAML text.
    ///
    /// `origin` names the source in error messages.
    pub fn from_yaml_str(content: &str, origin: &str) -> CoreResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(content);
        let program: Program = serde_yaml::with::singleton_map_recursive::deserialize(
            deserializer,
        )
        .map_err(|e| CoreError::ProgramParse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        program.validate()?;
        Ok(program)
    }

    /// Load a document from a file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::PathNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&content, &path.display().to_string())
    }

    /// Reject empty and duplicate function or parameter names
    fn validate(&self) -> CoreResult<()> {
        let mut names = HashSet::new();
        for function in &self.functions {
            if function.name.is_empty() {
                return Err(CoreError::EmptyName {
                    context: "function definition".into(),
                });
            }
            if !names.insert(function.name.as_str()) {
                return Err(CoreError::DuplicateFunction {
                    name: function.name.clone(),
                });
            }
            let mut params = HashSet::new();
            for param in &function.params {
                if param.name.is_empty() {
                    return Err(CoreError::EmptyName {
                        context: format!("parameter of '{}'", function.name),
                    });
                }
                if !params.insert(param.name.as_str()) {
                    return Err(CoreError::DuplicateParameter {
                        function: function.name.clone(),
                        param: param.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Find a function by name
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl FunctionDef {
    /// True when the function declares a return schema
    pub fn is_typed(&self) -> bool {
        self.returns.is_some()
    }

    /// True when any parameter or the return carries a schema
    pub fn is_annotated(&self) -> bool {
        self.is_typed() || self.params.iter().any(|p| p.schema.is_some())
    }

    /// Names of functions called anywhere in the body, in first-call order
    pub fn callees(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_statement_calls(&self.body, &mut out);
        let mut seen = HashSet::new();
        out.retain(|name| seen.insert(*name));
        out
    }
}

fn collect_statement_calls<'a>(statements: &'a [Statement], out: &mut Vec<&'a str>) {
    for statement in statements {
        match statement {
            Statement::Assign(assign) => collect_frame_calls(&assign.value, out),
            Statement::Return(value) => collect_frame_calls(value, out),
            Statement::If(block) => {
                collect_statement_calls(&block.then, out);
                collect_statement_calls(&block.otherwise, out);
            }
        }
    }
}

fn collect_frame_calls<'a>(expr: &'a FrameExpr, out: &mut Vec<&'a str>) {
    match expr {
        FrameExpr::Var(_) | FrameExpr::External(_) => {}
        FrameExpr::Call(call) => {
            out.push(&call.function);
            for arg in &call.args {
                collect_frame_calls(arg, out);
            }
        }
        FrameExpr::Join(join) => {
            collect_frame_calls(&join.left, out);
            collect_frame_calls(&join.right, out);
        }
        FrameExpr::GroupBy(group_by) => collect_frame_calls(&group_by.frame, out),
        FrameExpr::Select(projection) | FrameExpr::WithColumns(projection) => {
            collect_frame_calls(&projection.frame, out)
        }
        FrameExpr::Filter(filter) => collect_frame_calls(&filter.frame, out),
    }
}

#[cfg(test)]
#[path = "program_test.rs"]
mod tests;
