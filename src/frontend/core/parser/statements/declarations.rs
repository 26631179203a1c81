//! Program headers and data declarations
//!
//! - `REPORT`, `PROGRAM`, `INCLUDE`
//! - `DATA`, `CLASS-DATA`, `STATICS`, `CONSTANTS`, `TYPES` and their `BEGIN OF` / `END OF` forms
//! - `INCLUDE TYPE`, `FIELD-SYMBOLS`, `TABLES`, `PARAMETERS`

use crate::frontend::core::combi::*;
use crate::frontend::core::parser::kinds::{ExprKind as E, StatementKind as S};

pub fn statements() -> Vec<(S, Combinator)> {
    let program_options = opt(per![
        opt(seq!["MESSAGE-ID", E::SimpleName]),
        opt(seq!["LINE-SIZE", E::Integer]),
        opt(seq!["LINE-COUNT", E::Integer]),
        opt("NO STANDARD PAGE HEADING"),
        opt("REDUCED FUNCTIONALITY"),
    ]);
    let data_words = alt!["DATA", "CLASS-DATA", "STATICS"];

    vec![
        (S::Report, seq!["REPORT", opt(E::SimpleName), program_options.clone()]),
        (S::Program, seq!["PROGRAM", opt(E::SimpleName), program_options]),
        (
            S::IncludeType,
            seq![
                "INCLUDE",
                alt!["TYPE", "STRUCTURE"],
                E::TypeName,
                opt(seq!["AS", E::SimpleName]),
                opt(seq!["RENAMING WITH SUFFIX", E::SimpleName]),
            ],
        ),
        (S::Include, seq!["INCLUDE", E::SimpleName, opt("IF FOUND")]),
        (
            S::DataBegin,
            seq![
                data_words.clone(),
                "BEGIN OF",
                opt("COMMON PART"),
                E::DefinitionName,
                opt("READ-ONLY"),
                opt(seq!["OCCURS", E::Integer]),
            ],
        ),
        (
            S::DataEnd,
            seq![data_words, "END OF", opt("COMMON PART"), E::DefinitionName],
        ),
        (S::Data, seq!["DATA", E::DataDefinition]),
        (S::ClassData, seq!["CLASS-DATA", E::DataDefinition]),
        (S::Statics, seq!["STATICS", E::DataDefinition]),
        (S::ConstantBegin, seq!["CONSTANTS BEGIN OF", E::DefinitionName]),
        (S::ConstantEnd, seq!["CONSTANTS END OF", E::DefinitionName]),
        (S::Constants, seq!["CONSTANTS", E::DataDefinition]),
        (S::TypeBegin, seq!["TYPES BEGIN OF", E::DefinitionName]),
        (S::TypeEnd, seq!["TYPES END OF", E::DefinitionName]),
        (S::Types, seq!["TYPES", E::DataDefinition]),
        (
            S::FieldSymbol,
            seq![
                "FIELD-SYMBOLS",
                E::FieldSymbol,
                opt(alt![
                    E::TableType,
                    E::TypeClause,
                    seq!["STRUCTURE", E::TypeName, "DEFAULT", E::FieldChain],
                ]),
            ],
        ),
        (S::Tables, seq!["TABLES", E::Field]),
        (
            S::Parameter,
            seq![
                alt!["PARAMETERS", "PARAMETER"],
                E::DefinitionName,
                opt(E::ConstantFieldLength),
                opt(per![
                    opt(E::TypeClause),
                    opt(seq!["DEFAULT", E::Source]),
                    opt("OBLIGATORY"),
                    opt("LOWER CASE"),
                    opt("AS CHECKBOX"),
                    opt(seq!["RADIOBUTTON GROUP", E::SimpleName]),
                    opt(seq!["MEMORY ID", E::SimpleName]),
                ]),
            ],
        ),
    ]
}
