//! 分析流水线
//!
//! 单文件：词法 → 语句识别 → 结构构建，彼此独立，可跨文件并行。
//! 多文件：所有文件的定义收集（第一遍）完成后，才开始任何文件的完整解析
//! （第二遍）。第一遍按依赖顺序逐文件进行，第二遍并行。

use std::collections::{BinaryHeap, HashMap};
use std::cmp::Reverse;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;

use super::config::AnalyzeConfig;
use super::core::lexer::{self, Token};
use super::core::parser::{self, NodeArena, Statement};
use super::core::structure::{self, StructureNode};
use super::syntax::{self, Dictionary, FileDependencies, GlobalDefinitions, SyntaxResult};
use super::version::Version;
use crate::util::diagnostic::Diagnostic;
use crate::util::span::SourceFile;

/// 流水线错误（只出现在读取输入时；分析本身从不失败）
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// 读取源文件失败
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelinePhase {
    /// 词法、语句识别与结构构建
    Parsing,
    /// 第一遍：收集类与接口定义
    CollectingDefinitions,
    /// 第二遍：完整解析
    Resolving,
}

impl fmt::Display for PipelinePhase {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            PipelinePhase::Parsing => write!(f, "parsing"),
            PipelinePhase::CollectingDefinitions => write!(f, "collecting definitions"),
            PipelinePhase::Resolving => write!(f, "resolving"),
        }
    }
}

/// 一个待分析的源文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    pub filename: String,
    pub source: String,
    /// 覆盖配置中的版本
    pub version: Option<Version>,
}

impl SourceInput {
    pub fn new(
        filename: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            source: source.into(),
            version: None,
        }
    }

    pub fn with_version(
        mut self,
        version: Version,
    ) -> Self {
        self.version = Some(version);
        self
    }

    /// 从磁盘读取
    pub fn from_path(path: &Path) -> Result<Self, AnalyzeError> {
        let source = std::fs::read_to_string(path).map_err(|source| AnalyzeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), source))
    }
}

/// 单文件的解析产物
#[derive(Debug)]
pub struct ParsedFile {
    pub filename: String,
    pub version: Version,
    pub source: SourceFile,
    /// 所有记号，包括注释与 pragma
    pub tokens: Vec<Token>,
    pub arena: NodeArena,
    pub statements: Vec<Statement>,
    pub structure: StructureNode,
    /// 词法、语法与结构诊断
    pub diagnostics: Vec<Diagnostic>,
}

/// 单文件：词法 → 语句识别 → 结构构建
pub fn parse_file(
    filename: &str,
    source: &str,
    version: Version,
) -> ParsedFile {
    let lexed = lexer::tokenize(filename, source, version);
    let parsed = parser::parse_statements(filename, &lexed.tokens, version);
    let built = structure::build_structure(filename, &parsed.statements);

    let mut diagnostics = lexed.diagnostics;
    diagnostics.extend(parsed.diagnostics.into_vec());
    diagnostics.extend(built.diagnostics.into_vec());

    ParsedFile {
        filename: filename.to_string(),
        version,
        source: SourceFile::new(filename.to_string(), source.to_string()),
        tokens: lexed.tokens,
        arena: parsed.arena,
        statements: parsed.statements,
        structure: built.root,
        diagnostics,
    }
}

/// 一个文件的完整分析结果
#[derive(Debug)]
pub struct FileAnalysis {
    pub parsed: ParsedFile,
    pub syntax: SyntaxResult,
}

impl FileAnalysis {
    pub fn filename(&self) -> &str {
        &self.parsed.filename
    }

    /// 解析与语义诊断
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.parsed
            .diagnostics
            .iter()
            .chain(self.syntax.diagnostics.iter())
    }
}

/// 多文件分析结果
#[derive(Debug)]
pub struct Analysis {
    /// 与输入顺序一致
    pub files: Vec<FileAnalysis>,
    pub config: AnalyzeConfig,
    /// 第一遍合并后的定义
    pub definitions: GlobalDefinitions,
    /// 各阶段耗时（毫秒）
    pub phase_durations: Vec<(PipelinePhase, u64)>,
}

impl Analysis {
    /// 诊断级别允许的全部诊断
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        let level = self.config.diagnostic_level;
        self.files
            .iter()
            .flat_map(|file| file.diagnostics())
            .filter(move |d| level.admits(d))
    }

    pub fn file(
        &self,
        filename: &str,
    ) -> Option<&FileAnalysis> {
        self.files.iter().find(|f| f.filename() == filename)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics().filter(|d| d.is_error()).count()
    }
}

/// 分析流水线
pub struct Pipeline<'d> {
    config: AnalyzeConfig,
    dictionary: &'d dyn Dictionary,
    phase_durations: Vec<(PipelinePhase, u64)>,
}

impl fmt::Debug for Pipeline<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish()
    }
}

impl<'d> Pipeline<'d> {
    pub fn new(
        config: AnalyzeConfig,
        dictionary: &'d dyn Dictionary,
    ) -> Self {
        Self {
            config,
            dictionary,
            phase_durations: Vec::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &AnalyzeConfig {
        &self.config
    }

    /// 运行全部阶段
    pub fn run(
        mut self,
        inputs: Vec<SourceInput>,
    ) -> Analysis {
        let start_time = Instant::now();
        tracing::debug!("analyzing {} files", inputs.len());

        let parsed = self.timed(PipelinePhase::Parsing, |this| this.run_parsing(inputs));
        let (definitions, collected) = self.timed(PipelinePhase::CollectingDefinitions, |this| {
            this.run_definitions(&parsed)
        });
        let resolved = self.timed(PipelinePhase::Resolving, |this| {
            this.run_resolution(&parsed, &definitions)
        });

        let files = parsed
            .into_iter()
            .zip(resolved)
            .zip(collected)
            .map(|((parsed, mut syntax), collected)| {
                let mut diagnostics = collected.diagnostics;
                diagnostics.append(&mut syntax.diagnostics);
                syntax.diagnostics = diagnostics;
                let mut references = collected.references;
                references.append(&mut syntax.references);
                syntax.references = references;
                FileAnalysis { parsed, syntax }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "analysis finished: {} files in {} ms",
            files.len(),
            start_time.elapsed().as_millis()
        );
        Analysis {
            files,
            config: self.config,
            definitions,
            phase_durations: self.phase_durations,
        }
    }

    fn timed<T>(
        &mut self,
        phase: PipelinePhase,
        f: impl FnOnce(&Self) -> T,
    ) -> T {
        let start = Instant::now();
        tracing::debug!("phase: {}", phase);
        let result = f(&*self);
        self.phase_durations
            .push((phase, start.elapsed().as_millis() as u64));
        result
    }

    fn run_parsing(
        &self,
        inputs: Vec<SourceInput>,
    ) -> Vec<ParsedFile> {
        let default_version = self.config.version;
        let parse = |input: SourceInput| {
            let version = input.version.unwrap_or(default_version);
            parse_file(&input.filename, &input.source, version)
        };
        if self.config.parallel {
            inputs.into_par_iter().map(parse).collect()
        } else {
            inputs.into_iter().map(parse).collect()
        }
    }

    /// 第一遍按依赖顺序逐文件收集，结果按输入顺序返回
    fn run_definitions(
        &self,
        parsed: &[ParsedFile],
    ) -> (GlobalDefinitions, Vec<syntax::DefinitionsOutput>) {
        let dependencies: Vec<FileDependencies> = parsed.iter().map(syntax::dependencies).collect();
        let order = definition_order(&dependencies);

        let mut globals = GlobalDefinitions::new();
        let mut outputs: Vec<Option<syntax::DefinitionsOutput>> =
            parsed.iter().map(|_| None).collect();
        for index in order {
            let mut output =
                syntax::collect_definitions(&parsed[index], &globals, &self.config, self.dictionary);
            globals.extend(std::mem::take(&mut output.definitions));
            outputs[index] = Some(output);
        }
        let outputs = outputs.into_iter().map(Option::unwrap_or_default).collect();
        (globals, outputs)
    }

    fn run_resolution(
        &self,
        parsed: &[ParsedFile],
        definitions: &GlobalDefinitions,
    ) -> Vec<SyntaxResult> {
        let resolve = |file: &ParsedFile| {
            syntax::resolve(file, definitions, &self.config, self.dictionary)
        };
        if self.config.parallel {
            parsed.par_iter().map(resolve).collect()
        } else {
            parsed.iter().map(resolve).collect()
        }
    }
}

/// 多文件分析
pub fn analyze(
    inputs: Vec<SourceInput>,
    config: &AnalyzeConfig,
    dictionary: &dyn Dictionary,
) -> Analysis {
    Pipeline::new(config.clone(), dictionary).run(inputs)
}

/// 第一遍的文件顺序：被依赖的文件在前，只含接口的文件优先；
/// 循环依赖中剩下的文件按输入顺序排在最后
fn definition_order(dependencies: &[FileDependencies]) -> Vec<usize> {
    let mut defined_by: HashMap<&str, usize> = HashMap::new();
    for (index, deps) in dependencies.iter().enumerate() {
        for name in &deps.defines {
            defined_by.entry(name.as_str()).or_insert(index);
        }
    }

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); dependencies.len()];
    let mut pending = vec![0usize; dependencies.len()];
    for (index, deps) in dependencies.iter().enumerate() {
        for name in &deps.requires {
            if let Some(&provider) = defined_by.get(name.as_str()) {
                if provider != index {
                    dependents[provider].push(index);
                    pending[index] += 1;
                }
            }
        }
    }

    let priority = |index: usize| Reverse((!dependencies[index].interfaces_only, index));
    let mut ready: BinaryHeap<_> = (0..dependencies.len())
        .filter(|&i| pending[i] == 0)
        .map(priority)
        .collect();
    let mut order = Vec::with_capacity(dependencies.len());
    let mut done = vec![false; dependencies.len()];
    while let Some(Reverse((_, index))) = ready.pop() {
        order.push(index);
        done[index] = true;
        for &dependent in &dependents[index] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.push(priority(dependent));
            }
        }
    }
    if order.len() < dependencies.len() {
        tracing::warn!("cyclic class dependencies, collecting the rest in input order");
        order.extend((0..dependencies.len()).filter(|&i| !done[i]));
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(
        defines: &[&str],
        requires: &[&str],
        interfaces_only: bool,
    ) -> FileDependencies {
        FileDependencies {
            defines: defines.iter().map(|s| s.to_string()).collect(),
            requires: requires.iter().map(|s| s.to_string()).collect(),
            interfaces_only,
        }
    }

    #[test]
    fn test_definition_order_parents_first() {
        let files = vec![
            deps(&["ZCL_CHILD"], &["ZCL_PARENT"], false),
            deps(&["ZCL_PARENT"], &["ZIF_A"], false),
            deps(&["ZIF_A"], &[], true),
        ];
        assert_eq!(definition_order(&files), vec![2, 1, 0]);
    }

    #[test]
    fn test_definition_order_interfaces_first() {
        let files = vec![
            deps(&["ZCL_A"], &[], false),
            deps(&["ZIF_B"], &[], true),
        ];
        assert_eq!(definition_order(&files), vec![1, 0]);
    }

    #[test]
    fn test_definition_order_cycle() {
        let files = vec![
            deps(&["ZCL_A"], &["ZCL_B"], false),
            deps(&["ZCL_B"], &["ZCL_A"], false),
            deps(&["ZCL_C"], &[], false),
        ];
        assert_eq!(definition_order(&files), vec![2, 0, 1]);
    }

    #[test]
    fn test_parse_file_collects_diagnostics() {
        let parsed = parse_file("zfoo.prog.abap", "REPORT zfoo.\nIF 1 = 1.\n", Version::V757);
        assert_eq!(parsed.filename, "zfoo.prog.abap");
        assert_eq!(parsed.statements.len(), 2);
        assert!(!parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_source_input_from_missing_path() {
        let err = SourceInput::from_path(Path::new("/nonexistent/zfoo.prog.abap")).unwrap_err();
        assert!(matches!(err, AnalyzeError::Io { .. }));
    }
}
