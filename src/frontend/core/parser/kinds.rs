//! Statement and expression tags

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which statement grammar matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    // Program header
    Report,
    Program,
    Include,

    // Declarations
    Data,
    DataBegin,
    DataEnd,
    ClassData,
    Statics,
    Constants,
    ConstantBegin,
    ConstantEnd,
    Types,
    TypeBegin,
    TypeEnd,
    IncludeType,
    FieldSymbol,
    Tables,
    Parameter,

    // Classes and interfaces
    ClassDefinition,
    ClassDeferred,
    ClassImplementation,
    EndClass,
    Interface,
    InterfaceDeferred,
    EndInterface,
    /// `INTERFACES zif_foo.`
    InterfaceDef,
    Public,
    Protected,
    Private,
    /// `METHODS` and `CLASS-METHODS`
    MethodDef,
    MethodImplementation,
    EndMethod,

    // Subroutines
    Form,
    EndForm,
    Perform,

    // Control flow
    If,
    ElseIf,
    Else,
    EndIf,
    Case,
    When,
    EndCase,
    Do,
    EndDo,
    While,
    EndWhile,
    Loop,
    EndLoop,
    Try,
    Catch,
    Cleanup,
    EndTry,
    Exit,
    Continue,
    Check,
    Return,
    Raise,

    // Operations
    Move,
    Call,
    CallFunction,
    Clear,
    Free,
    Append,
    Insert,
    InsertDatabase,
    ReadTable,
    Assign,
    CreateObject,
    Concatenate,
    Write,
    Uline,
    ModifyDatabase,
    ModifyInternal,
    Assert,
    Message,

    // Special
    /// No grammar matched
    Unknown,
    Comment,
    /// A lone period
    Empty,
}

impl StatementKind {
    /// Statements without grammar, produced by the splitter or as fallback
    pub fn is_special(&self) -> bool {
        matches!(
            self,
            StatementKind::Unknown | StatementKind::Comment | StatementKind::Empty
        )
    }
}

impl fmt::Display for StatementKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Which expression grammar produced a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExprKind {
    // Literals
    Integer,
    TextLiteral,
    /// `'a' & 'b'`
    ConcatenatedConstant,
    Constant,
    StringTemplate,

    // Names
    Field,
    FieldSymbol,
    ClassName,
    ComponentName,
    /// `a-b-c` relative to a row or structure
    ComponentChain,
    AttributeName,
    MethodName,
    DefinitionName,
    ParameterName,
    FormName,
    /// Report, include and classic exception names
    SimpleName,
    TypeName,
    /// `#` or a type name, in constructor expressions
    TypeNameOrInfer,
    /// `(lv_name)`
    Dynamic,

    // Data access
    FieldChain,
    /// `+3` in `lv+3(2)`
    FieldOffset,
    /// `(2)` in `lv+3(2)`
    FieldLength,
    /// `lt_tab[ ... ]`
    TableExpression,
    /// `lt_tab[]`
    TableBody,
    /// `->*`
    Dereference,
    Target,
    /// `DATA(x)`
    InlineData,
    /// `FIELD-SYMBOL(<x>)`
    InlineFieldSymbol,
    Source,
    ArithOperator,

    // Conditions
    CompareOperator,
    Compare,
    Cond,
    /// `comp = source`, left side names a row component
    ComponentCompare,
    ComponentCond,

    // Calls
    MethodCall,
    MethodCallChain,
    /// Parenthesised argument list of a functional call
    MethodCallParam,
    /// `EXPORTING ... IMPORTING ...` sections
    MethodParameters,
    /// Called method in `CALL METHOD`
    MethodSource,
    ParameterS,
    ParameterListS,
    ParameterT,
    ParameterListT,
    ParameterException,
    ParameterListExceptions,
    FunctionName,
    FunctionParameters,

    // Constructors
    NewObject,
    ConstructorExpression,
    ValueBody,
    CondBody,
    SwitchBody,

    // Declarations
    TypeClause,
    TableType,
    TableKey,
    Length,
    Decimals,
    Value,
    /// `(10)` in `DATA foo(10) TYPE c`
    ConstantFieldLength,
    DataDefinition,
    MethodDefImporting,
    MethodDefExporting,
    MethodDefChanging,
    MethodDefReturning,
    MethodDefRaising,
    MethodParam,
    FormParam,

    // Statement parts
    DatabaseTable,
    /// `INTO wa`, `ASSIGNING <fs>`, `REFERENCE INTO ref`
    LoopTarget,
    /// `AT /1(10)` in WRITE and ULINE
    WriteOffsetLength,
}

impl ExprKind {
    pub const ALL: &'static [ExprKind] = &[
        ExprKind::Integer,
        ExprKind::TextLiteral,
        ExprKind::ConcatenatedConstant,
        ExprKind::Constant,
        ExprKind::StringTemplate,
        ExprKind::Field,
        ExprKind::FieldSymbol,
        ExprKind::ClassName,
        ExprKind::ComponentName,
        ExprKind::ComponentChain,
        ExprKind::AttributeName,
        ExprKind::MethodName,
        ExprKind::DefinitionName,
        ExprKind::ParameterName,
        ExprKind::FormName,
        ExprKind::SimpleName,
        ExprKind::TypeName,
        ExprKind::TypeNameOrInfer,
        ExprKind::Dynamic,
        ExprKind::FieldChain,
        ExprKind::FieldOffset,
        ExprKind::FieldLength,
        ExprKind::TableExpression,
        ExprKind::TableBody,
        ExprKind::Dereference,
        ExprKind::Target,
        ExprKind::InlineData,
        ExprKind::InlineFieldSymbol,
        ExprKind::Source,
        ExprKind::ArithOperator,
        ExprKind::CompareOperator,
        ExprKind::Compare,
        ExprKind::Cond,
        ExprKind::ComponentCompare,
        ExprKind::ComponentCond,
        ExprKind::MethodCall,
        ExprKind::MethodCallChain,
        ExprKind::MethodCallParam,
        ExprKind::MethodParameters,
        ExprKind::MethodSource,
        ExprKind::ParameterS,
        ExprKind::ParameterListS,
        ExprKind::ParameterT,
        ExprKind::ParameterListT,
        ExprKind::ParameterException,
        ExprKind::ParameterListExceptions,
        ExprKind::FunctionName,
        ExprKind::FunctionParameters,
        ExprKind::NewObject,
        ExprKind::ConstructorExpression,
        ExprKind::ValueBody,
        ExprKind::CondBody,
        ExprKind::SwitchBody,
        ExprKind::TypeClause,
        ExprKind::TableType,
        ExprKind::TableKey,
        ExprKind::Length,
        ExprKind::Decimals,
        ExprKind::Value,
        ExprKind::ConstantFieldLength,
        ExprKind::DataDefinition,
        ExprKind::MethodDefImporting,
        ExprKind::MethodDefExporting,
        ExprKind::MethodDefChanging,
        ExprKind::MethodDefReturning,
        ExprKind::MethodDefRaising,
        ExprKind::MethodParam,
        ExprKind::FormParam,
        ExprKind::DatabaseTable,
        ExprKind::LoopTarget,
        ExprKind::WriteOffsetLength,
    ];

    /// Position in [`ExprKind::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ExprKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
