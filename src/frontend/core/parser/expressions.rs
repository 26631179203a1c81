//! Expression grammars
//!
//! One combinator tree per [`ExprKind`]. Whitespace flags on tokens carry
//! meaning here: `a-b` is a component, `a - b` a subtraction, `m( )` a call
//! and `f(2)` a substring.

use crate::frontend::core::combi::*;
use crate::frontend::core::lexer::TokenKind;
use crate::frontend::core::parser::kinds::ExprKind as E;
use crate::frontend::version::Version;

/// Plain name: letters, digits, `_ % $`, optionally with a `/ns/` prefix
pub const NAME: &str = r"[\w%$]*(?:/\w+/)?[\w%$]+";

fn name() -> Combinator {
    regex(NAME)
}

/// Token glued to both neighbours
fn tight(kind: TokenKind) -> Combinator {
    tok_ws(kind, Some(false), Some(false))
}

/// `(` opening an argument list: `meth( `
fn call_open() -> Combinator {
    tok_ws(TokenKind::ParenLeft, Some(false), Some(true))
}

/// `)` closing an argument list: ` )`
fn call_close() -> Combinator {
    tok_ws(TokenKind::ParenRight, Some(true), None)
}

/// `( ` with whitespace inside, as in `( a + b )`
fn paren_open() -> Combinator {
    tok_ws(TokenKind::ParenLeft, None, Some(true))
}

/// `(` of `DATA(x)` and `foo(10)`
fn glued_open() -> Combinator {
    tight(TokenKind::ParenLeft)
}

fn glued_close() -> Combinator {
    tok_ws(TokenKind::ParenRight, Some(false), None)
}

fn equals() -> Combinator {
    tok(TokenKind::Equals)
}

fn digits() -> Combinator {
    regex(r"\d+")
}

/// Words ending a row component list in table keys
const KEY_STOP: &[&str] = &["INITIAL", "WITH", "READ", "VALUE", "OCCURS"];

/// Grammar of one expression kind
pub fn expression(kind: E) -> Combinator {
    match kind {
        E::Integer => seq![opt(tok_ws(TokenKind::Dash, None, Some(false))), digits()],
        E::TextLiteral => seq![
            tok(TokenKind::StringLiteral),
            opt(seq![glued_open(), regex(r"\w{1,3}"), glued_close()]),
        ],
        E::ConcatenatedConstant => seq![
            E::TextLiteral,
            plus(seq![tok(TokenKind::Ampersand), E::TextLiteral]),
        ],
        E::Constant => alt![E::ConcatenatedConstant, E::TextLiteral, E::Integer],
        E::StringTemplate => {
            let formatting = plus(seq![
                regex(
                    "WIDTH|ALIGN|PAD|CASE|SIGN|DECIMALS|NUMBER|DATE|TIME|STYLE|ALPHA|CURRENCY|EXPONENT|ZERO|XSD|TIMESTAMP|TIMEZONE|COUNTRY"
                ),
                equals(),
                E::Source,
            ]);
            alt![
                tok(TokenKind::StringTemplate),
                seq![
                    tok(TokenKind::StringTemplateBegin),
                    E::Source,
                    opt(formatting.clone()),
                    star(seq![tok(TokenKind::StringTemplateMiddle), E::Source, opt(formatting)]),
                    tok(TokenKind::StringTemplateEnd),
                ],
            ]
        }

        E::Field => regex(r"!?[\w%$]*(?:/\w+/)?\d*[a-z_%$][\w%$]*"),
        E::FieldSymbol => regex(r"<[\w%$/]+>"),
        E::ClassName | E::ComponentName | E::SimpleName | E::FormName => name(),
        E::DefinitionName | E::ParameterName => regex(&format!("!?{}", NAME)),
        E::ComponentChain => seq![E::ComponentName, star(seq![tight(TokenKind::Dash), E::ComponentName])],
        E::AttributeName | E::MethodName => seq![name(), opt(seq![tight(TokenKind::Tilde), name()])],
        E::TypeName => seq![
            name(),
            opt(alt![
                seq![tight(TokenKind::StaticArrow), name()],
                seq![tight(TokenKind::Tilde), name()],
            ]),
            star(seq![tight(TokenKind::Dash), name()]),
        ],
        E::TypeNameOrInfer => alt![tok(TokenKind::Hash), E::TypeName],
        E::Dynamic => seq![
            tok_ws(TokenKind::ParenLeft, None, Some(false)),
            alt![E::TextLiteral, E::FieldChain],
            glued_close(),
        ],

        E::FieldChain => seq![
            alt![
                seq![E::ClassName, tight(TokenKind::StaticArrow), E::AttributeName],
                E::FieldSymbol,
                E::Field,
            ],
            star(alt![
                E::Dereference,
                seq![tight(TokenKind::InstanceArrow), E::AttributeName],
                seq![tight(TokenKind::Dash), E::ComponentName],
                E::TableExpression,
                E::TableBody,
                E::FieldOffset,
                E::FieldLength,
            ]),
        ],
        E::Dereference => seq![
            tight(TokenKind::InstanceArrow),
            tok_ws(TokenKind::Star, Some(false), None),
        ],
        E::FieldOffset => seq![tight(TokenKind::Plus), alt![digits(), E::Field]],
        E::FieldLength => seq![
            glued_open(),
            alt![digits(), tok(TokenKind::Star), E::Field],
            glued_close(),
        ],
        E::TableExpression => seq![
            tok_ws(TokenKind::BracketLeft, Some(false), Some(true)),
            alt![
                seq![
                    opt(seq!["KEY", E::SimpleName, opt("COMPONENTS")]),
                    plus(E::ComponentCompare),
                ],
                seq![opt("INDEX"), E::Source],
            ],
            tok_ws(TokenKind::BracketRight, Some(true), None),
        ],
        E::TableBody => seq![
            tight(TokenKind::BracketLeft),
            tok_ws(TokenKind::BracketRight, Some(false), None),
        ],
        E::Target => alt![
            ver(Version::V740sp02, E::InlineData),
            ver(Version::V740sp02, E::InlineFieldSymbol),
            E::FieldChain,
        ],
        E::InlineData => seq![
            alt!["DATA", ver(Version::V757, "FINAL")],
            glued_open(),
            E::DefinitionName,
            glued_close(),
        ],
        E::InlineFieldSymbol => seq![
            "FIELD-SYMBOL",
            glued_open(),
            E::FieldSymbol,
            glued_close(),
        ],

        E::Source => {
            let term = alt![
                seq![paren_open(), E::Source, call_close()],
                ver(Version::V740sp02, E::ConstructorExpression),
                E::MethodCallChain,
                ver(Version::V740sp02, E::NewObject),
                E::StringTemplate,
                E::Constant,
                E::FieldChain,
            ];
            seq![
                opt(seq!["BIT-NOT"]),
                term.clone(),
                star(seq![E::ArithOperator, term]),
            ]
        }
        E::ArithOperator => alt![
            tok_ws(TokenKind::Plus, Some(true), Some(true)),
            tok_ws(TokenKind::Dash, Some(true), Some(true)),
            tok_ws(TokenKind::Star, Some(true), Some(true)),
            tok_ws(TokenKind::Slash, Some(true), Some(true)),
            tok(TokenKind::Power),
            tok(TokenKind::Concat),
            "DIV",
            "MOD",
            "BIT-AND",
            "BIT-OR",
            "BIT-XOR",
        ],

        E::CompareOperator => alt![
            tok(TokenKind::Equals),
            tok(TokenKind::Compare),
            regex("EQ|NE|LT|GT|LE|GE|CO|CN|CA|NA|CS|NS|CP|NP"),
        ],
        E::Compare => alt![
            seq![E::Source, E::CompareOperator, E::Source],
            seq![
                E::Source,
                "IS",
                opt("NOT"),
                alt![
                    "INITIAL",
                    "BOUND",
                    "ASSIGNED",
                    "SUPPLIED",
                    seq!["INSTANCE OF", E::ClassName],
                ],
            ],
            seq![E::Source, opt("NOT"), "BETWEEN", E::Source, "AND", E::Source],
            seq![E::Source, opt("NOT"), "IN", E::Source],
            ver(Version::V702, E::MethodCallChain),
        ],
        E::Cond => {
            let term = seq![
                star("NOT"),
                alt![E::Compare, seq![paren_open(), E::Cond, call_close()]],
            ];
            seq![term.clone(), star(seq![alt!["AND", "OR", "EQUIV"], term])]
        }
        E::ComponentCompare => alt![
            seq![E::ComponentChain, E::CompareOperator, E::Source],
            seq![
                E::ComponentChain,
                "IS",
                opt("NOT"),
                alt!["INITIAL", "BOUND", "ASSIGNED"],
            ],
            seq![E::ComponentChain, opt("NOT"), "IN", E::Source],
        ],
        E::ComponentCond => {
            let term = seq![
                star("NOT"),
                alt![
                    E::ComponentCompare,
                    seq![paren_open(), E::ComponentCond, call_close()],
                ],
            ];
            seq![term.clone(), star(seq![alt!["AND", "OR"], term])]
        }

        E::MethodCall => seq![E::MethodName, E::MethodCallParam],
        E::MethodCallChain => seq![
            alt![
                seq![
                    opt(alt![
                        seq![E::ClassName, tight(TokenKind::StaticArrow)],
                        seq![E::FieldChain, tight(TokenKind::InstanceArrow)],
                    ]),
                    E::MethodCall,
                ],
                seq![
                    ver(Version::V740sp02, E::NewObject),
                    tight(TokenKind::InstanceArrow),
                    E::MethodCall,
                ],
            ],
            star(seq![tight(TokenKind::InstanceArrow), E::MethodCall]),
        ],
        E::MethodCallParam => seq![
            call_open(),
            opt(alt![E::MethodParameters, E::ParameterListS, E::Source]),
            call_close(),
        ],
        E::MethodParameters => per![
            opt(seq!["EXPORTING", E::ParameterListS]),
            opt(seq!["IMPORTING", E::ParameterListT]),
            opt(seq!["CHANGING", E::ParameterListT]),
            opt(seq!["RECEIVING", E::ParameterT]),
            opt(seq!["EXCEPTIONS", E::ParameterListExceptions]),
        ],
        E::MethodSource => seq![
            opt(alt![
                seq![E::ClassName, tight(TokenKind::StaticArrow)],
                seq![E::FieldChain, tight(TokenKind::InstanceArrow)],
            ]),
            alt![E::MethodName, E::Dynamic],
        ],
        E::ParameterS => seq![E::ParameterName, equals(), E::Source],
        E::ParameterListS => plus(E::ParameterS),
        E::ParameterT => seq![E::ParameterName, equals(), E::Target],
        E::ParameterListT => plus(E::ParameterT),
        E::ParameterException => seq![
            alt!["OTHERS", E::ParameterName],
            equals(),
            E::Source,
            opt(seq!["MESSAGE", E::Target]),
        ],
        E::ParameterListExceptions => plus(E::ParameterException),
        E::FunctionName => alt![E::TextLiteral, E::FieldChain],
        E::FunctionParameters => per![
            opt(seq!["EXPORTING", E::ParameterListS]),
            opt(seq!["IMPORTING", E::ParameterListT]),
            opt(seq!["TABLES", E::ParameterListT]),
            opt(seq!["CHANGING", E::ParameterListT]),
            opt(seq!["EXCEPTIONS", E::ParameterListExceptions]),
        ],

        E::NewObject => seq!["NEW", E::TypeNameOrInfer, E::MethodCallParam],
        E::ConstructorExpression => alt![
            seq!["VALUE", E::TypeNameOrInfer, call_open(), opt(E::ValueBody), call_close()],
            seq![
                alt!["CONV", "REF", "CAST", "EXACT", "CORRESPONDING"],
                E::TypeNameOrInfer,
                call_open(),
                E::Source,
                call_close(),
            ],
            seq!["COND", E::TypeNameOrInfer, call_open(), E::CondBody, call_close()],
            seq!["SWITCH", E::TypeNameOrInfer, call_open(), E::SwitchBody, call_close()],
        ],
        E::ValueBody => {
            let row = seq![
                paren_open(),
                opt(alt![E::ParameterListS, E::Source]),
                call_close(),
            ];
            let base = opt(seq!["BASE", E::Source]);
            alt![
                seq![base.clone(), plus(row.clone())],
                seq![base, E::ParameterListS, star(row)],
            ]
        }
        E::CondBody => seq![
            plus(seq!["WHEN", E::Cond, "THEN", E::Source]),
            opt(seq!["ELSE", E::Source]),
        ],
        E::SwitchBody => seq![
            E::Source,
            plus(seq!["WHEN", E::Source, "THEN", E::Source]),
            opt(seq!["ELSE", E::Source]),
        ],

        E::TypeClause => alt![
            seq!["TYPE REF TO", E::TypeName],
            seq!["LIKE REF TO", E::FieldChain],
            seq!["TYPE LINE OF", E::TypeName],
            seq!["LIKE LINE OF", E::FieldChain],
            seq!["TYPE", E::TypeName],
            seq!["LIKE", E::FieldChain],
        ],
        E::TableType => {
            let access = alt!["STANDARD", "SORTED", "HASHED", "ANY", "INDEX"];
            let size = opt(seq!["INITIAL SIZE", alt![E::Integer, E::FieldChain]]);
            alt![
                seq![
                    "TYPE",
                    opt(access.clone()),
                    "TABLE OF",
                    opt("REF TO"),
                    E::TypeName,
                    star(E::TableKey),
                    size.clone(),
                ],
                seq![
                    "LIKE",
                    opt(access.clone()),
                    "TABLE OF",
                    opt("REF TO"),
                    E::FieldChain,
                    star(E::TableKey),
                    size.clone(),
                ],
                seq!["TYPE RANGE OF", E::TypeName, size.clone()],
                seq!["LIKE RANGE OF", E::FieldChain, size],
                seq!["TYPE", opt(access), "TABLE", star(E::TableKey)],
            ]
        }
        E::TableKey => {
            let uniqueness = opt(alt!["UNIQUE", "NON-UNIQUE"]);
            let components = plus(except(KEY_STOP, E::ComponentChain));
            seq![
                "WITH",
                alt![
                    seq![uniqueness.clone(), "DEFAULT KEY"],
                    seq![
                        uniqueness,
                        opt(alt!["SORTED", "HASHED"]),
                        "KEY",
                        alt![
                            seq![E::SimpleName, "COMPONENTS", components.clone()],
                            components,
                        ],
                    ],
                    "EMPTY KEY",
                ],
            ]
        }
        E::Length => seq!["LENGTH", alt![E::Integer, E::TextLiteral, E::FieldChain]],
        E::Decimals => seq!["DECIMALS", alt![E::Integer, E::FieldChain]],
        E::Value => seq!["VALUE", alt!["IS INITIAL", E::Constant, E::FieldChain]],
        E::ConstantFieldLength => seq![glued_open(), alt![E::Integer, E::SimpleName], glued_close()],
        E::DataDefinition => seq![
            E::DefinitionName,
            opt(E::ConstantFieldLength),
            opt(per![
                opt(alt![E::TableType, E::TypeClause]),
                opt(E::Value),
                opt(E::Length),
                opt(E::Decimals),
                opt("READ-ONLY"),
                opt(seq!["OCCURS", alt![E::Integer, E::FieldChain]]),
                opt("WITH HEADER LINE"),
                opt("BOXED"),
            ]),
        ],
        E::MethodParam => seq![
            alt![
                seq![alt!["VALUE", "REFERENCE"], glued_open(), E::DefinitionName, glued_close()],
                E::DefinitionName,
            ],
            alt![E::TableType, E::TypeClause],
            opt(alt![
                "OPTIONAL",
                seq!["DEFAULT", alt![E::Constant, E::FieldChain]],
            ]),
        ],
        E::MethodDefImporting => seq![
            "IMPORTING",
            plus(E::MethodParam),
            opt(seq!["PREFERRED PARAMETER", E::SimpleName]),
        ],
        E::MethodDefExporting => seq!["EXPORTING", plus(E::MethodParam)],
        E::MethodDefChanging => seq!["CHANGING", plus(E::MethodParam)],
        E::MethodDefReturning => seq!["RETURNING", E::MethodParam],
        E::MethodDefRaising => alt![
            seq![
                "RAISING",
                plus(alt![
                    seq!["RESUMABLE", glued_open(), E::ClassName, glued_close()],
                    E::ClassName,
                ]),
            ],
            seq!["EXCEPTIONS", plus(E::SimpleName)],
        ],
        E::FormParam => seq![
            alt![
                seq!["VALUE", glued_open(), E::DefinitionName, glued_close()],
                except(&["TABLES", "USING", "CHANGING", "RAISING"], E::DefinitionName),
            ],
            opt(alt![
                E::TableType,
                E::TypeClause,
                seq!["STRUCTURE", alt![E::TypeName, E::FieldChain]],
            ]),
        ],

        E::DatabaseTable => alt![E::Dynamic, name()],
        E::LoopTarget => alt![
            seq!["INTO", E::Target],
            seq!["ASSIGNING", E::Target, opt("CASTING")],
            seq!["REFERENCE INTO", E::Target],
            "TRANSPORTING NO FIELDS",
        ],
        E::WriteOffsetLength => {
            let length = seq![
                tok(TokenKind::ParenLeft),
                alt![digits(), tok(TokenKind::Star), E::FieldChain],
                tok(TokenKind::ParenRight),
            ];
            let slash = seq![tok(TokenKind::Slash), opt(digits()), opt(length.clone())];
            alt![
                seq![
                    "AT",
                    alt![
                        slash.clone(),
                        seq![alt![digits(), E::FieldChain], opt(length.clone())],
                        length.clone(),
                    ],
                ],
                slash,
                length,
            ]
        }
    }
}
