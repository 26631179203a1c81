//! Branches, loops and exception handling

use crate::frontend::core::combi::*;
use crate::frontend::core::parser::kinds::{ExprKind as E, StatementKind as S};

pub fn statements() -> Vec<(S, Combinator)> {
    vec![
        (S::If, seq!["IF", E::Cond]),
        (S::ElseIf, seq!["ELSEIF", E::Cond]),
        (S::Else, seq!["ELSE"]),
        (S::EndIf, seq!["ENDIF"]),
        (S::Case, seq!["CASE", opt("TYPE OF"), E::Source]),
        (
            S::When,
            seq![
                "WHEN",
                alt![
                    "OTHERS",
                    seq!["TYPE", E::ClassName, opt(seq!["INTO", E::Target])],
                    seq![E::Source, star(seq!["OR", E::Source])],
                ],
            ],
        ),
        (S::EndCase, seq!["ENDCASE"]),
        (S::Do, seq!["DO", opt(seq![E::Source, "TIMES"])]),
        (S::EndDo, seq!["ENDDO"]),
        (S::While, seq!["WHILE", E::Cond]),
        (S::EndWhile, seq!["ENDWHILE"]),
        (
            S::Loop,
            seq![
                "LOOP",
                opt(seq![
                    "AT",
                    E::Source,
                    opt(E::LoopTarget),
                    opt(per![
                        opt(seq!["FROM", E::Source]),
                        opt(seq!["TO", E::Source]),
                        opt(seq!["WHERE", E::ComponentCond]),
                        opt(seq!["USING KEY", E::SimpleName]),
                    ]),
                ]),
            ],
        ),
        (S::EndLoop, seq!["ENDLOOP"]),
        (S::Try, seq!["TRY"]),
        (
            S::Catch,
            seq![
                "CATCH",
                opt("BEFORE UNWIND"),
                plus(except(&["INTO"], E::ClassName)),
                opt(seq!["INTO", E::Target]),
            ],
        ),
        (S::Cleanup, seq!["CLEANUP", opt(seq!["INTO", E::Target])]),
        (S::EndTry, seq!["ENDTRY"]),
        (S::Exit, seq!["EXIT"]),
        (S::Continue, seq!["CONTINUE"]),
        (S::Check, seq!["CHECK", E::Cond]),
        (S::Return, seq!["RETURN"]),
        (
            S::Raise,
            seq![
                "RAISE",
                alt![
                    seq![
                        opt("RESUMABLE"),
                        "EXCEPTION",
                        alt![
                            seq![
                                "TYPE",
                                E::ClassName,
                                opt(seq!["EXPORTING", E::ParameterListS]),
                            ],
                            E::Source,
                        ],
                    ],
                    E::SimpleName,
                ],
            ],
        ),
    ]
}
