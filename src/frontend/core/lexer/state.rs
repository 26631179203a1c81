//! Lexer state management
//! Tracks open string templates and version-dependent lexical features

use crate::frontend::version::Version;

/// Lexer state management
#[derive(Debug, Clone)]
pub struct LexerState {
    version: Version,
    /// Number of string templates whose embedded expression is currently open
    template_depth: usize,
}

impl LexerState {
    /// Create new lexer state
    pub fn new(version: Version) -> Self {
        Self {
            version,
            template_depth: 0,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Inside `{ ... }` of a string template
    #[inline]
    pub fn in_template(&self) -> bool {
        self.template_depth > 0
    }

    pub fn enter_template(&mut self) {
        self.template_depth += 1;
    }

    pub fn leave_template(&mut self) {
        self.template_depth = self.template_depth.saturating_sub(1);
    }

    /// String templates arrived with 7.02
    pub fn allows_templates(&self) -> bool {
        self.version.supports(Version::V702)
    }

    /// `##` pragmas arrived with 7.02
    pub fn allows_pragmas(&self) -> bool {
        self.version.supports(Version::V702)
    }
}

impl Default for LexerState {
    fn default() -> Self {
        Self::new(Version::default())
    }
}
