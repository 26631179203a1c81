//! Classes, interfaces, methods and subroutines

use crate::frontend::core::combi::*;
use crate::frontend::core::parser::kinds::{ExprKind as E, StatementKind as S};

pub fn statements() -> Vec<(S, Combinator)> {
    let visibility = alt!["PUBLIC", "PROTECTED", "PRIVATE"];

    let class_options = per![
        opt("PUBLIC"),
        opt(seq!["INHERITING FROM", E::ClassName]),
        opt("ABSTRACT"),
        opt("FINAL"),
        opt(seq!["CREATE", visibility]),
        opt("FOR TESTING"),
        opt(seq!["RISK LEVEL", E::SimpleName]),
        opt(seq!["DURATION", E::SimpleName]),
        opt(seq![opt("GLOBAL"), "FRIENDS", plus(E::ClassName)]),
        opt("SHARED MEMORY ENABLED"),
    ];

    let method_signature = seq![
        opt("ABSTRACT"),
        opt("FINAL"),
        opt("FOR TESTING"),
        opt(seq!["DEFAULT", alt!["IGNORE", "FAIL"]]),
        opt(E::MethodDefImporting),
        opt(E::MethodDefExporting),
        opt(E::MethodDefChanging),
        opt(E::MethodDefReturning),
        opt(E::MethodDefRaising),
    ];
    let event_handler = seq![
        "FOR EVENT",
        E::SimpleName,
        "OF",
        E::ClassName,
        opt(seq!["IMPORTING", plus(E::DefinitionName)]),
    ];

    let form_section = |word: &str| opt(seq![word, plus(E::FormParam)]);
    let perform_args = |word: &str| {
        opt(seq![
            word,
            plus(except(&["TABLES", "USING", "CHANGING"], E::Source)),
        ])
    };

    vec![
        (
            S::ClassDeferred,
            seq![
                "CLASS",
                E::ClassName,
                "DEFINITION",
                alt!["DEFERRED", "LOAD"],
                opt("PUBLIC"),
            ],
        ),
        (
            S::ClassDefinition,
            seq!["CLASS", E::ClassName, "DEFINITION", opt(class_options)],
        ),
        (S::ClassImplementation, seq!["CLASS", E::ClassName, "IMPLEMENTATION"]),
        (S::EndClass, seq!["ENDCLASS"]),
        (
            S::InterfaceDeferred,
            seq!["INTERFACE", E::ClassName, alt!["DEFERRED", "LOAD"], opt("PUBLIC")],
        ),
        (S::Interface, seq!["INTERFACE", E::ClassName, opt("PUBLIC")]),
        (S::EndInterface, seq!["ENDINTERFACE"]),
        (
            S::InterfaceDef,
            seq![
                "INTERFACES",
                E::ClassName,
                opt(seq!["ALL METHODS", alt!["ABSTRACT", "FINAL"]]),
            ],
        ),
        (S::Public, seq!["PUBLIC SECTION"]),
        (S::Protected, seq!["PROTECTED SECTION"]),
        (S::Private, seq!["PRIVATE SECTION"]),
        (
            S::MethodDef,
            seq![
                alt!["METHODS", "CLASS-METHODS"],
                E::MethodName,
                alt![
                    seq![opt("FINAL"), "REDEFINITION"],
                    event_handler,
                    method_signature,
                ],
            ],
        ),
        (S::MethodImplementation, seq!["METHOD", E::MethodName]),
        (S::EndMethod, seq!["ENDMETHOD"]),
        (
            S::Form,
            seq![
                "FORM",
                E::FormName,
                form_section("TABLES"),
                form_section("USING"),
                form_section("CHANGING"),
                opt(seq!["RAISING", plus(E::ClassName)]),
            ],
        ),
        (S::EndForm, seq!["ENDFORM"]),
        (
            S::Perform,
            seq![
                "PERFORM",
                alt![E::Dynamic, E::FormName],
                opt(seq!["IN PROGRAM", E::SimpleName]),
                opt("IF FOUND"),
                perform_args("TABLES"),
                perform_args("USING"),
                perform_args("CHANGING"),
            ],
        ),
    ]
}
