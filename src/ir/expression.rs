//! Structural representation of kernel expressions.

use strum::FromRepr;

use crate::ir::{ConstantRc, DartType, FunctionNode, Reference, VariableDeclarationRc};

/// A member name, optionally qualified by the library that owns it.
///
/// Private names (leading underscore) are scoped to their defining library, so
/// their encodings carry a library reference alongside the text.
#[derive(Debug, Clone)]
pub struct Name {
    /// The name text
    pub text: String,
    /// Owning library, present only for private names
    pub library: Option<Reference>,
}

impl Name {
    /// Returns `true` if this is a library-private name.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.text.starts_with('_')
    }
}

/// Operator of a [`Expression::Logical`] expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum LogicalOperator {
    /// `&&`
    And = 0,
    /// `||`
    Or = 1,
}

/// The argument list of an invocation.
#[derive(Debug)]
pub struct Arguments {
    /// Type arguments of the invocation
    pub type_arguments: Vec<DartType>,
    /// Positional arguments
    pub positional: Vec<Expression>,
    /// Named arguments as (name, value) pairs
    pub named: Vec<(String, Expression)>,
}

/// The closed set of expression shapes the binary format encodes.
///
/// Decoded by tag dispatch over [`crate::binary::tags::NodeTag`]; unknown tags
/// are a fatal decode error.
#[derive(Debug)]
pub enum Expression {
    /// A placeholder for an expression that failed to compile
    Invalid {
        /// Compiler-produced description of the failure
        message: String,
    },
    /// Read of a local variable
    VariableGet {
        /// Source offset of the read
        file_offset: u32,
        /// The variable being read, resolved through the scope stack
        variable: VariableDeclarationRc,
    },
    /// Write of a local variable
    VariableSet {
        /// Source offset of the write
        file_offset: u32,
        /// The variable being written
        variable: VariableDeclarationRc,
        /// The value being assigned
        value: Box<Expression>,
    },
    /// Instance property read
    PropertyGet {
        /// Source offset
        file_offset: u32,
        /// Receiver of the access
        receiver: Box<Expression>,
        /// Property name
        name: Name,
        /// Statically resolved interface member, when known
        interface_target: Option<Reference>,
    },
    /// Instance property write
    PropertySet {
        /// Source offset
        file_offset: u32,
        /// Receiver of the access
        receiver: Box<Expression>,
        /// Property name
        name: Name,
        /// The value being assigned
        value: Box<Expression>,
        /// Statically resolved interface member, when known
        interface_target: Option<Reference>,
    },
    /// Read of a static field or getter
    StaticGet {
        /// Source offset
        file_offset: u32,
        /// The static member being read
        target: Reference,
    },
    /// Write of a static field or setter
    StaticSet {
        /// Source offset
        file_offset: u32,
        /// The static member being written
        target: Reference,
        /// The value being assigned
        value: Box<Expression>,
    },
    /// Instance method invocation
    MethodInvocation {
        /// Source offset
        file_offset: u32,
        /// Receiver of the call
        receiver: Box<Expression>,
        /// Method name
        name: Name,
        /// Argument list
        arguments: Arguments,
        /// Statically resolved interface member, when known
        interface_target: Option<Reference>,
    },
    /// Static function invocation
    StaticInvocation {
        /// Source offset
        file_offset: u32,
        /// The procedure being invoked
        target: Reference,
        /// Argument list
        arguments: Arguments,
    },
    /// Constructor invocation
    ConstructorInvocation {
        /// Source offset
        file_offset: u32,
        /// The constructor being invoked
        target: Reference,
        /// Argument list
        arguments: Arguments,
        /// `true` for const instantiations
        is_const: bool,
    },
    /// Boolean negation
    Not {
        /// The negated expression
        operand: Box<Expression>,
    },
    /// Short-circuiting `&&` / `||`
    Logical {
        /// Left operand
        left: Box<Expression>,
        /// The operator
        operator: LogicalOperator,
        /// Right operand
        right: Box<Expression>,
    },
    /// Ternary conditional
    Conditional {
        /// The condition
        condition: Box<Expression>,
        /// Value when the condition holds
        then: Box<Expression>,
        /// Value when the condition does not hold
        otherwise: Box<Expression>,
        /// Static type of the whole expression, when recorded
        static_type: Option<DartType>,
    },
    /// String interpolation
    StringConcatenation {
        /// Source offset
        file_offset: u32,
        /// The interpolated parts
        expressions: Vec<Expression>,
    },
    /// `operand is T`
    Is {
        /// Source offset
        file_offset: u32,
        /// The tested expression
        operand: Box<Expression>,
        /// The tested type
        tested_type: DartType,
    },
    /// `operand as T`
    As {
        /// Source offset
        file_offset: u32,
        /// Cast behavior flags as encoded
        flags: u8,
        /// The cast expression
        operand: Box<Expression>,
        /// The target type
        target_type: DartType,
    },
    /// String literal
    StringLiteral {
        /// The literal value
        value: String,
    },
    /// Integer literal
    IntLiteral {
        /// The literal value
        value: i64,
    },
    /// Integer literal too large for the direct encodings, kept as text
    BigIntLiteral {
        /// Decimal digits of the literal
        value: String,
    },
    /// Double literal
    DoubleLiteral {
        /// The literal value
        value: f64,
    },
    /// Boolean literal
    BoolLiteral {
        /// The literal value
        value: bool,
    },
    /// `null`
    NullLiteral,
    /// Symbol literal
    SymbolLiteral {
        /// The symbol text
        value: String,
    },
    /// Type literal
    TypeLiteral {
        /// The reified type
        literal_type: DartType,
    },
    /// `this`
    This,
    /// `rethrow`
    Rethrow {
        /// Source offset
        file_offset: u32,
    },
    /// `throw expression`
    Throw {
        /// Source offset
        file_offset: u32,
        /// The thrown value
        expression: Box<Expression>,
    },
    /// List literal
    ListLiteral {
        /// Source offset
        file_offset: u32,
        /// Element type
        type_argument: DartType,
        /// Element expressions
        expressions: Vec<Expression>,
        /// `true` for const lists
        is_const: bool,
    },
    /// Map literal
    MapLiteral {
        /// Source offset
        file_offset: u32,
        /// Key type
        key_type: DartType,
        /// Value type
        value_type: DartType,
        /// Key/value entry pairs
        entries: Vec<(Expression, Expression)>,
        /// `true` for const maps
        is_const: bool,
    },
    /// `await operand`
    Await {
        /// The awaited expression
        operand: Box<Expression>,
    },
    /// Function literal
    FunctionExpression {
        /// Source offset
        file_offset: u32,
        /// The function body and signature
        function: Box<FunctionNode>,
    },
    /// `let variable = init in body`
    Let {
        /// The bound variable
        variable: VariableDeclarationRc,
        /// The body the binding is visible in
        body: Box<Expression>,
    },
    /// Explicit generic instantiation of a tear-off
    Instantiation {
        /// The instantiated expression
        expression: Box<Expression>,
        /// The supplied type arguments
        type_arguments: Vec<DartType>,
    },
    /// Reference to an entry of the constant pool
    ConstantExpression {
        /// The pool constant
        constant: ConstantRc,
    },
}
