//! Structural representation of kernel statements.

use crate::ir::{
    DartType, Expression, FunctionNode, LabeledStatementRc, LabeledStatementWeak, SwitchCaseRc,
    SwitchCaseWeak, VariableDeclarationRc,
};

/// A statement carrying a label that `break` can target.
///
/// Created empty before its body is decoded, because break statements inside
/// the body resolve to it through the label scope stack.
#[derive(Debug)]
pub struct LabeledStatement {
    /// The labeled body
    pub body: Statement,
}

/// One case of a switch statement.
///
/// Created empty before any case body is decoded: continue-switch statements
/// may target cases that appear textually later, so all case objects of a
/// switch exist before the first body is read.
#[derive(Debug)]
pub struct SwitchCase {
    /// Case expressions with their source offsets
    pub expressions: Vec<(u32, Expression)>,
    /// `true` for the `default:` case
    pub is_default: bool,
    /// The case body
    pub body: Statement,
}

/// One catch clause of a try/catch statement.
#[derive(Debug)]
pub struct Catch {
    /// The guard type (`on` clause), `dynamic` when absent in source
    pub guard: DartType,
    /// The bound exception variable, if any
    pub exception: Option<VariableDeclarationRc>,
    /// The bound stack-trace variable, if any
    pub stack_trace: Option<VariableDeclarationRc>,
    /// The clause body
    pub body: Statement,
}

/// The closed set of statement shapes the binary format encodes.
#[derive(Debug)]
pub enum Statement {
    /// An expression evaluated for effect
    Expression {
        /// The evaluated expression
        expression: Box<Expression>,
    },
    /// `{ ... }`; variables declared inside go out of scope at the end
    Block {
        /// The contained statements
        statements: Vec<Statement>,
    },
    /// `;`
    Empty,
    /// `assert(condition, message)`
    Assert {
        /// The asserted condition
        condition: Box<Expression>,
        /// Optional failure message
        message: Option<Box<Expression>>,
    },
    /// A labeled statement break can target
    Labeled {
        /// The label node shared with targeting breaks
        statement: LabeledStatementRc,
    },
    /// `break label`
    Break {
        /// The targeted label (weak: the label owns the break through its body)
        target: LabeledStatementWeak,
    },
    /// `while (condition) body`
    While {
        /// Loop condition
        condition: Box<Expression>,
        /// Loop body
        body: Box<Statement>,
    },
    /// `do body while (condition)`
    Do {
        /// Loop body
        body: Box<Statement>,
        /// Loop condition
        condition: Box<Expression>,
    },
    /// `for (variables; condition; updates) body`
    For {
        /// Variables introduced by the loop header
        variables: Vec<VariableDeclarationRc>,
        /// Optional loop condition
        condition: Option<Box<Expression>>,
        /// Update expressions
        updates: Vec<Expression>,
        /// Loop body
        body: Box<Statement>,
    },
    /// `switch (expression) { cases }`
    Switch {
        /// The switched-on value
        expression: Box<Expression>,
        /// The case nodes shared with targeting continues
        cases: Vec<SwitchCaseRc>,
    },
    /// `continue label;` targeting a switch case
    ContinueSwitch {
        /// The targeted case (weak: the switch owns the continue through its body)
        target: SwitchCaseWeak,
    },
    /// `if (condition) then else otherwise`
    If {
        /// The condition
        condition: Box<Expression>,
        /// Branch taken when the condition holds
        then: Box<Statement>,
        /// Optional else branch
        otherwise: Option<Box<Statement>>,
    },
    /// `return expression;`
    Return {
        /// Optional returned value
        expression: Option<Box<Expression>>,
    },
    /// `try body catch ...`
    TryCatch {
        /// The guarded body
        body: Box<Statement>,
        /// Handler flags as encoded
        flags: u8,
        /// The catch clauses
        catches: Vec<Catch>,
    },
    /// `try body finally finalizer`
    TryFinally {
        /// The guarded body
        body: Box<Statement>,
        /// The finalizer
        finalizer: Box<Statement>,
    },
    /// `yield expression` inside a generator
    Yield {
        /// `true` for `yield*`
        is_yield_star: bool,
        /// The yielded value
        expression: Box<Expression>,
    },
    /// A local variable declaration
    VariableDeclaration {
        /// The declared variable, shared with reads/writes of it
        variable: VariableDeclarationRc,
    },
    /// A local function declaration
    FunctionDeclaration {
        /// Source offset
        file_offset: u32,
        /// The variable the function is bound to (pushed into scope before
        /// the body is decoded, so the function can recurse)
        variable: VariableDeclarationRc,
        /// The declared function
        function: Box<FunctionNode>,
    },
}
