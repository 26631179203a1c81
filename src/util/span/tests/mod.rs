//! Span 单元测试
//!
//! 测试源位置跟踪的 Position、Span 和 SourceFile

use crate::util::span::{Position, SourceFile, Span};

#[cfg(test)]
mod position_tests {
    use super::*;

    #[test]
    fn test_position_with_offset() {
        let pos = Position::with_offset(1, 5, 100);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 5);
        assert_eq!(pos.offset, 100);
    }

    #[test]
    fn test_position_display() {
        let pos = Position::new(10, 20);
        assert_eq!(format!("{}", pos), "10:20");
    }

    #[test]
    fn test_position_ordering_is_row_major() {
        assert!(Position::new(1, 50) < Position::new(2, 1));
        assert!(Position::new(3, 2) > Position::new(3, 1));
    }
}

#[cfg(test)]
mod span_tests {
    use super::*;

    #[test]
    fn test_span_len_uses_offsets() {
        let span = Span::new(
            Position::with_offset(1, 1, 10),
            Position::with_offset(1, 6, 15),
        );
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_span_contains() {
        let span = Span::new(Position::new(2, 1), Position::new(4, 1));
        assert!(span.contains(Position::new(2, 1)));
        assert!(span.contains(Position::new(3, 80)));
        assert!(!span.contains(Position::new(4, 1)));
        assert!(!span.contains(Position::new(1, 9)));
    }

    #[test]
    fn test_span_merge_ignores_dummy() {
        let a = Span::new(Position::new(1, 1), Position::new(1, 5));
        let b = Span::new(Position::new(2, 3), Position::new(2, 9));
        assert_eq!(a.merge(&b), Span::new(Position::new(1, 1), Position::new(2, 9)));
        assert_eq!(Span::dummy().merge(&a), a);
    }
}

#[cfg(test)]
mod source_file_tests {
    use super::*;

    #[test]
    fn test_position_from_offset() {
        let file = SourceFile::new("z.abap".to_string(), "DATA x.\nWRITE x.".to_string());
        let pos = file.position_from_offset(8);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn test_line_lookup() {
        let file = SourceFile::new("z.abap".to_string(), "a.\r\nb.\nc.".to_string());
        assert_eq!(file.line(1), Some("a."));
        assert_eq!(file.line(2), Some("b."));
        assert_eq!(file.line(3), Some("c."));
        assert_eq!(file.line(4), None);
        assert_eq!(file.line(0), None);
    }

    #[test]
    fn test_source_text() {
        let file = SourceFile::new("z.abap".to_string(), "WRITE x.".to_string());
        let span = file.span_from_range(6, 7);
        assert_eq!(file.source_text(span), Some("x"));
    }
}
