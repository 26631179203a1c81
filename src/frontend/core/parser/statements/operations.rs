//! Data manipulation, calls and output
//!
//! `Move` and `Call` accept arbitrary targets and call chains, so they are
//! registered after every keyword statement.

use crate::frontend::core::combi::*;
use crate::frontend::core::lexer::TokenKind;
use crate::frontend::core::parser::kinds::{ExprKind as E, StatementKind as S};
use crate::frontend::version::Version;

pub fn statements() -> Vec<(S, Combinator)> {
    let arrow = alt![tok(TokenKind::InstanceArrow), tok(TokenKind::StaticArrow)];
    let assign_source = alt![
        seq!["COMPONENT", E::Source, "OF STRUCTURE", E::Source],
        seq!["TABLE FIELD", alt![E::Source, E::Dynamic]],
        seq![E::Dynamic, opt(seq![arrow.clone(), alt![E::Field, E::Dynamic]])],
        seq![E::Source, opt(seq![arrow, E::Dynamic])],
    ];
    let decimals = seq!["DECIMALS", E::Source];
    let casting = seq![
        "CASTING",
        opt(alt![
            seq!["LIKE", alt![E::Dynamic, E::Source]],
            seq!["TYPE HANDLE", E::Source],
            per![seq!["TYPE", alt![E::Dynamic, E::TypeName]], opt(decimals.clone())],
        ]),
    ];
    let obsolete_type = seq!["TYPE", E::Source, opt(decimals)];

    let write_options = per![
        opt("NO-GAP"),
        opt("NO-ZERO"),
        opt("LEFT-JUSTIFIED"),
        opt("RIGHT-JUSTIFIED"),
        opt("CENTERED"),
        opt("AS CHECKBOX"),
        opt("HOTSPOT"),
        opt("INTENSIFIED"),
        opt(seq!["COLOR", E::Source]),
        opt(seq!["UNDER", E::Source]),
        opt(seq!["USING EDIT MASK", E::Source]),
        opt(seq!["CURRENCY", E::Source]),
        opt(seq!["DECIMALS", E::Source]),
    ];

    let message_stop = &["TYPE", "DISPLAY", "WITH", "RAISING", "INTO"];
    let line_target = opt(alt![
        seq!["REFERENCE INTO", E::Target],
        seq!["ASSIGNING", E::Target],
    ]);

    vec![
        (
            S::CallFunction,
            seq![
                "CALL FUNCTION",
                E::FunctionName,
                opt(seq!["DESTINATION", E::Source]),
                opt(E::FunctionParameters),
            ],
        ),
        (
            S::Call,
            seq![
                "CALL METHOD",
                E::MethodSource,
                opt(alt![E::MethodCallParam, E::MethodParameters]),
            ],
        ),
        (
            S::Clear,
            seq![
                "CLEAR",
                E::Target,
                opt(alt!["WITH NULL", seq!["WITH", E::Source]]),
            ],
        ),
        (S::Free, seq!["FREE", E::Target]),
        (
            S::Append,
            seq![
                "APPEND",
                alt![
                    seq![
                        alt![
                            "INITIAL LINE",
                            seq![
                                "LINES OF",
                                E::Source,
                                opt(seq!["FROM", E::Source]),
                                opt(seq!["TO", E::Source]),
                            ],
                            E::Source,
                        ],
                        "TO",
                        E::Target,
                        line_target.clone(),
                        opt(seq!["SORTED BY", E::ComponentChain]),
                    ],
                    E::Target,
                ],
            ],
        ),
        (
            S::Insert,
            seq![
                "INSERT",
                alt!["INITIAL LINE", seq!["LINES OF", E::Source], E::Source],
                "INTO",
                opt("TABLE"),
                E::Target,
                opt(seq!["INDEX", E::Source]),
                line_target.clone(),
            ],
        ),
        (
            S::InsertDatabase,
            seq![
                "INSERT",
                E::DatabaseTable,
                "FROM",
                opt("TABLE"),
                opt(tok(TokenKind::At)),
                E::Source,
            ],
        ),
        (
            S::ReadTable,
            seq![
                "READ TABLE",
                E::Source,
                opt(per![
                    opt(seq!["INDEX", E::Source]),
                    opt(seq![
                        alt!["WITH TABLE KEY", "WITH KEY"],
                        alt![plus(E::ComponentCompare), E::Source],
                    ]),
                    opt(seq!["FROM", E::Source]),
                    opt(E::LoopTarget),
                    opt("BINARY SEARCH"),
                    opt(seq![
                        "TRANSPORTING",
                        plus(except(&["INTO", "ASSIGNING", "REFERENCE", "BINARY", "WITH", "INDEX"], E::ComponentChain)),
                    ]),
                ]),
            ],
        ),
        (
            S::Assign,
            seq![
                "ASSIGN",
                assign_source,
                "TO",
                E::Target,
                opt(alt![casting, obsolete_type]),
                opt(seq!["RANGE", E::Source]),
                opt(ver(Version::V757, "ELSE UNASSIGN")),
            ],
        ),
        (
            S::CreateObject,
            seq![
                "CREATE OBJECT",
                E::Target,
                opt(seq!["TYPE", alt![E::Dynamic, E::ClassName]]),
                opt(seq!["EXPORTING", E::ParameterListS]),
                opt(seq!["EXCEPTIONS", E::ParameterListExceptions]),
            ],
        ),
        (
            S::Concatenate,
            seq![
                "CONCATENATE",
                alt![seq!["LINES OF", E::Source], plus(E::Source)],
                "INTO",
                E::Target,
                opt(per![
                    opt(seq!["SEPARATED BY", E::Source]),
                    opt(seq!["IN", alt!["BYTE", "CHARACTER"], "MODE"]),
                    opt("RESPECTING BLANKS"),
                ]),
            ],
        ),
        (
            S::Write,
            seq![
                "WRITE",
                alt![
                    seq![E::Source, "TO", E::Target],
                    seq![E::WriteOffsetLength, opt(E::Source), opt(write_options.clone())],
                    seq![E::Source, opt(write_options)],
                ],
            ],
        ),
        (S::Uline, seq!["ULINE", opt(E::WriteOffsetLength), opt("NO-GAP")]),
        (
            S::ModifyDatabase,
            seq![
                "MODIFY",
                E::DatabaseTable,
                "FROM",
                opt("TABLE"),
                opt(tok(TokenKind::At)),
                E::Source,
            ],
        ),
        (
            S::ModifyInternal,
            seq![
                "MODIFY",
                opt("TABLE"),
                E::Target,
                opt(seq!["INDEX", E::Source]),
                "FROM",
                E::Source,
                opt(seq!["TRANSPORTING", plus(except(&["WHERE"], E::ComponentChain))]),
                opt(seq!["WHERE", E::ComponentCond]),
            ],
        ),
        (
            S::Assert,
            seq![
                "ASSERT",
                opt(seq![
                    "ID",
                    E::SimpleName,
                    opt(seq!["SUBKEY", E::Source]),
                    opt(seq!["FIELDS", plus(except(&["CONDITION"], E::Source))]),
                    "CONDITION",
                ]),
                E::Cond,
            ],
        ),
        (
            S::Message,
            seq![
                "MESSAGE",
                alt![
                    seq![
                        regex(r"[aeiswx]\d{3}"),
                        tok_ws(TokenKind::ParenLeft, Some(false), Some(false)),
                        E::SimpleName,
                        tok_ws(TokenKind::ParenRight, Some(false), None),
                    ],
                    E::Source,
                ],
                opt(per![
                    opt(seq!["TYPE", E::Source]),
                    opt(seq!["DISPLAY LIKE", E::Source]),
                    opt(seq!["WITH", plus(except(message_stop, E::Source))]),
                    opt(seq!["RAISING", E::SimpleName]),
                    opt(seq!["INTO", E::Target]),
                ]),
            ],
        ),
        (
            S::Move,
            alt![
                seq!["MOVE", opt("EXACT"), E::Source, "TO", E::Target],
                seq![
                    plus(seq![
                        E::Target,
                        alt![tok(TokenKind::Equals), tok(TokenKind::CastEquals)],
                    ]),
                    E::Source,
                ],
                ver(
                    Version::V757,
                    seq![E::Target, tok(TokenKind::CompoundAssign), E::Source],
                ),
            ],
        ),
        (S::Call, E::MethodCallChain.into()),
    ]
}
