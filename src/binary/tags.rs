//! The closed tag enumerations of the component encoding.
//!
//! A tag byte selects the record kind at each position for members,
//! initializers, expressions, statements, and types; constants use a tag space
//! of their own. Tags outside these enumerations are a fatal
//! [`crate::Error::UnexpectedTag`], never a default branch.
//!
//! Tag bytes with the high bit set are *specialized* single-byte forms: the
//! upper five bits select the operation and the lower three carry an immediate
//! payload (a scope-stack slot or a small integer). Decoding a specialized form
//! is equivalent to, but faster than, the general form of the same operation.

use strum::FromRepr;

/// Mask isolating the operation of a specialized (high-bit) tag byte.
pub const SPECIALIZED_TAG_MASK: u8 = 0xF8;
/// Mask isolating the immediate payload of a specialized tag byte.
pub const SPECIALIZED_PAYLOAD_MASK: u8 = 0x07;
/// Specialized form of [`NodeTag::VariableGet`] for stack slots 0..8.
pub const SPECIALIZED_VARIABLE_GET: u8 = 128;
/// Specialized form of [`NodeTag::VariableSet`] for stack slots 0..8.
pub const SPECIALIZED_VARIABLE_SET: u8 = 136;
/// Specialized integer literal carrying `payload - 3` directly in the tag.
pub const SPECIALIZED_INT_LITERAL: u8 = 144;
/// Bias subtracted from the payload of a specialized integer literal.
pub const SPECIALIZED_INT_LITERAL_BIAS: i64 = 3;

/// Tag space shared by members, initializers, expressions, statements, and
/// types. Option markers (`Nothing`/`Something`) prefix every optional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum NodeTag {
    Nothing = 0,
    Something = 1,
    Class = 2,
    FunctionNode = 3,
    Field = 4,
    Constructor = 5,
    Procedure = 6,
    InvalidInitializer = 7,
    FieldInitializer = 8,
    SuperInitializer = 9,
    RedirectingInitializer = 10,
    LocalInitializer = 11,
    AssertInitializer = 12,
    Typedef = 13,
    Extension = 14,
    InvalidExpression = 19,
    VariableGet = 20,
    VariableSet = 21,
    PropertyGet = 22,
    PropertySet = 23,
    StaticGet = 26,
    StaticSet = 27,
    MethodInvocation = 28,
    StaticInvocation = 30,
    ConstructorInvocation = 31,
    ConstConstructorInvocation = 32,
    Not = 33,
    LogicalExpression = 34,
    ConditionalExpression = 35,
    StringConcatenation = 36,
    IsExpression = 37,
    AsExpression = 38,
    StringLiteral = 39,
    DoubleLiteral = 40,
    TrueLiteral = 41,
    FalseLiteral = 42,
    NullLiteral = 43,
    SymbolLiteral = 44,
    TypeLiteral = 45,
    ThisExpression = 46,
    Rethrow = 47,
    Throw = 48,
    ListLiteral = 49,
    MapLiteral = 50,
    AwaitExpression = 51,
    FunctionExpression = 52,
    Let = 53,
    Instantiation = 54,
    PositiveIntLiteral = 55,
    NegativeIntLiteral = 56,
    BigIntLiteral = 57,
    ConstListLiteral = 58,
    ConstMapLiteral = 59,
    ConstantExpression = 60,
    ExpressionStatement = 61,
    Block = 62,
    EmptyStatement = 63,
    AssertStatement = 64,
    LabeledStatement = 65,
    BreakStatement = 66,
    WhileStatement = 67,
    DoStatement = 68,
    ForStatement = 69,
    SwitchStatement = 70,
    ContinueSwitchStatement = 71,
    IfStatement = 72,
    ReturnStatement = 73,
    TryCatch = 75,
    TryFinally = 76,
    YieldStatement = 77,
    VariableDeclarationStatement = 78,
    FunctionDeclaration = 79,
    InvalidType = 90,
    DynamicType = 91,
    VoidType = 92,
    InterfaceType = 93,
    FunctionType = 94,
    TypeParameterType = 95,
    SimpleInterfaceType = 96,
    NeverType = 98,
    NullType = 99,
}

/// Tag space of the constant pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ConstantTag {
    NullConstant = 0,
    BoolConstant = 1,
    IntConstant = 2,
    DoubleConstant = 3,
    StringConstant = 4,
    SymbolConstant = 5,
    MapConstant = 6,
    ListConstant = 7,
    InstanceConstant = 8,
    TearOffConstant = 10,
    TypeLiteralConstant = 11,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_resolve() {
        assert_eq!(NodeTag::from_repr(2), Some(NodeTag::Class));
        assert_eq!(NodeTag::from_repr(62), Some(NodeTag::Block));
        assert_eq!(NodeTag::from_repr(93), Some(NodeTag::InterfaceType));
        assert_eq!(ConstantTag::from_repr(8), Some(ConstantTag::InstanceConstant));
    }

    #[test]
    fn unknown_tags_are_rejected() {
        // Holes in the tag space stay holes.
        assert_eq!(NodeTag::from_repr(24), None);
        assert_eq!(NodeTag::from_repr(74), None);
        assert_eq!(NodeTag::from_repr(97), None);
        assert_eq!(ConstantTag::from_repr(9), None);
        assert_eq!(ConstantTag::from_repr(255), None);
    }

    #[test]
    fn specialized_tag_decomposition() {
        let byte = SPECIALIZED_VARIABLE_GET + 5;
        assert_eq!(byte & SPECIALIZED_TAG_MASK, SPECIALIZED_VARIABLE_GET);
        assert_eq!(byte & SPECIALIZED_PAYLOAD_MASK, 5);

        let byte = SPECIALIZED_INT_LITERAL + 1;
        assert_eq!(
            i64::from(byte & SPECIALIZED_PAYLOAD_MASK) - SPECIALIZED_INT_LITERAL_BIAS,
            -2
        );
    }
}
