//! 可赋值性
//!
//! 宁可放过也不误报：void / unknown 两侧都放行，泛型按类别接受，
//! 基本类型之间只拒绝明显不可转换的组合。

use super::types::{AbapType, ElementaryKind, StructureType};

/// `source` 能否赋给 `target`
pub fn assignable(
    source: &AbapType,
    target: &AbapType,
) -> bool {
    if source.is_permissive() || target.is_permissive() {
        return true;
    }
    if let AbapType::Generic(kind) = target {
        return kind.accepts(source);
    }
    if source.is_generic() {
        return true;
    }

    match (source, target) {
        (AbapType::Table(from), AbapType::Table(to)) => assignable(&from.row, &to.row),
        (AbapType::Table(from), _) if from.header_line => assignable(&from.row, target),
        (_, AbapType::Table(to)) if to.header_line => assignable(source, &to.row),

        (
            AbapType::Elementary { kind: from, .. },
            AbapType::Elementary { kind: to, .. },
        ) => elementary_assignable(*from, *to),

        (AbapType::Structure(from), AbapType::Structure(to)) => structures_assignable(from, to),
        (AbapType::Structure(from), AbapType::Elementary { kind, .. })
        | (AbapType::Elementary { kind, .. }, AbapType::Structure(from)) => {
            is_flat_character(*kind) && from.is_character_like()
        }

        (
            AbapType::DataReference { target: from, .. },
            AbapType::DataReference { target: to, .. },
        ) => from.is_generic() || to.is_generic() || assignable(from, to),
        (AbapType::ObjectReference(_), AbapType::ObjectReference(_)) => true,

        _ => false,
    }
}

fn elementary_assignable(
    from: ElementaryKind,
    to: ElementaryKind,
) -> bool {
    if from == to {
        return true;
    }
    let timestamp = |kind: ElementaryKind| kind == ElementaryKind::UtcLong;
    let incompatible = |kind: ElementaryKind| {
        kind.is_numeric()
            || kind.is_byte_like()
            || matches!(kind, ElementaryKind::D | ElementaryKind::T)
    };
    !(timestamp(from) && incompatible(to) || timestamp(to) && incompatible(from))
}

fn is_flat_character(kind: ElementaryKind) -> bool {
    matches!(kind, ElementaryKind::C | ElementaryKind::String)
}

fn structures_assignable(
    from: &StructureType,
    to: &StructureType,
) -> bool {
    if from.components.len() != to.components.len() {
        return from.is_character_like() && to.is_character_like();
    }
    from.components
        .iter()
        .zip(&to.components)
        .all(|(a, b)| assignable(&a.ty, &b.ty))
}

impl AbapType {
    /// 便捷方法：`assignable(self, target)`
    pub fn is_assignable_to(
        &self,
        target: &AbapType,
    ) -> bool {
        assignable(self, target)
    }
}
