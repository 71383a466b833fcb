//! Structural extraction for JavaScript and TypeScript
//!
//! This module scans raw source text for lexical markers of:
//! - Function declarations, function expressions, arrows and methods
//! - Classes (plus interfaces and enums in TypeScript)
//! - Loops and conditionals
//! - Variable bindings and import/require statements
//!
//! It is a heuristic scanner, not a parser. Markers inside strings and
//! comments are reported like real code.

use crate::analysis::source::{self, LineIndex};
use codelens_shared::{
    ClassKind, ClassRef, CodelensError, ConditionalKind, ConditionalRef, DeclarationKind,
    FunctionKind, FunctionRecord, FunctionRef, ImportKind, ImportRef, Language, LoopKind, LoopRef,
    Result, Span, StructuralInventory, VariableRef,
};
use regex::Regex;
use tracing::{debug, instrument};

/// Identifiers that look like method names to the method pattern but are control flow
const NON_METHOD_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "with", "else", "do", "typeof",
    "new", "await", "yield",
];

/// A function found by the scanner, with where its body search starts
struct ScannedFunction {
    reference: FunctionRef,
    body_from: usize,
    expression_body: bool,
}

/// Lexical structure extractor for the C-family scripting languages
pub struct StructuralExtractor {
    function_decl: Regex,
    bound_function: Regex,
    method: Regex,
    class_decl: Regex,
    interface_decl: Regex,
    enum_decl: Regex,
    loop_header: Regex,
    conditional: Regex,
    variable: Regex,
    es_import: Regex,
    require_call: Regex,
}

impl StructuralExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            function_decl: Regex::new(
                r"\bfunction\b\s*\*?\s*([A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\(([^)]*)\)",
            )?,
            bound_function: Regex::new(concat!(
                r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?",
                r"(?:function\b\s*\*?\s*[\w$]*\s*\(([^)]*)\)",
                r"|(?:<[^>]*>\s*)?\(([^)]*)\)\s*(?::\s*[^=;{]+?)?\s*=>",
                r"|([A-Za-z_$][\w$]*)\s*=>)",
            ))?,
            method: Regex::new(concat!(
                r"(?m)^[ \t]*",
                r"(?:(?:public|private|protected|static|async|readonly|override|get|set)\s+)*",
                r"([A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*\(([^()]*)\)\s*(?::\s*[^{;=]+?)?\s*\{",
            ))?,
            class_decl: Regex::new(
                r"\bclass\s+([A-Za-z_$][\w$]*)(?:\s*<[^>]*>)?(?:\s+extends\s+([A-Za-z_$][\w$.]*))?",
            )?,
            interface_decl: Regex::new(concat!(
                r"\binterface\s+([A-Za-z_$][\w$]*)(?:\s*<[^>]*>)?",
                r"(?:\s+extends\s+([A-Za-z_$][\w$.]*))?",
            ))?,
            enum_decl: Regex::new(r"\benum\s+([A-Za-z_$][\w$]*)")?,
            loop_header: Regex::new(r"\b(?:for\s*(?:await\s*)?\(|while\s*\(|do\s*\{)")?,
            conditional: Regex::new(r"\b(if|switch)\s*\(")?,
            variable: Regex::new(
                r"\b(var|let|const)\s+([A-Za-z_$][\w$]*|\{[^}]*\}|\[[^\]]*\])",
            )?,
            es_import: Regex::new(
                r#"\bimport\s+(?:[\w$*{}\s,]+?\s+from\s+)?["']([^"']+)["']"#,
            )?,
            require_call: Regex::new(r#"\brequire\s*\(\s*["']([^"']+)["']\s*\)"#)?,
        })
    }

    /// Whether the extractor has patterns for this language
    pub fn supports(language: Language) -> bool {
        matches!(language, Language::JavaScript | Language::TypeScript)
    }

    /// Resolve an editor language tag to a supported language
    pub fn resolve_language(language_tag: &str) -> Result<Language> {
        Language::from_tag(language_tag)
            .filter(|language| Self::supports(*language))
            .ok_or_else(|| CodelensError::UnsupportedLanguage {
                language: language_tag.to_string(),
            })
    }

    /// Extract the structural inventory of `text` written in `language_tag`
    pub fn extract(&self, text: &str, language_tag: &str) -> Result<StructuralInventory> {
        let language = Self::resolve_language(language_tag)?;
        self.extract_language(text, language)
    }

    /// Extract with an already resolved language
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn extract_language(&self, text: &str, language: Language) -> Result<StructuralInventory> {
        if !Self::supports(language) {
            return Err(CodelensError::UnsupportedLanguage {
                language: language.display_name().to_string(),
            });
        }

        let index = LineIndex::new(text);
        let inventory = StructuralInventory {
            functions: self
                .scan_functions(text, &index)
                .into_iter()
                .map(|scanned| scanned.reference)
                .collect(),
            classes: self.extract_classes(text, &index, language),
            loops: self.extract_loops(text, &index),
            conditionals: self.extract_conditionals(text, &index),
            variables: self.extract_variables(text, &index),
            imports: self.extract_imports(text, &index),
        };

        if inventory.is_empty() && !text.trim().is_empty() {
            debug!("No structural markers recognized in {} bytes of {}", text.len(), language);
        }

        Ok(inventory)
    }

    /// Lift every recognized function out of `text` together with its body
    pub fn function_records(&self, text: &str, language: Language) -> Result<Vec<FunctionRecord>> {
        if !Self::supports(language) {
            return Err(CodelensError::UnsupportedLanguage {
                language: language.display_name().to_string(),
            });
        }

        let index = LineIndex::new(text);
        let records = self
            .scan_functions(text, &index)
            .into_iter()
            .map(|scanned| {
                let (body, end) = Self::body_of(text, &scanned);
                FunctionRecord {
                    name: scanned.reference.name,
                    params: scanned.reference.params,
                    body,
                    position: scanned.reference.position,
                    range: Span {
                        start: scanned.reference.position.offset,
                        end,
                    },
                }
            })
            .collect();

        Ok(records)
    }

    fn scan_functions(&self, text: &str, index: &LineIndex<'_>) -> Vec<ScannedFunction> {
        let mut found = Vec::new();

        for caps in self.function_decl.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            found.push(ScannedFunction {
                reference: FunctionRef {
                    name: name.as_str().to_string(),
                    kind: FunctionKind::Declaration,
                    params: source::split_params(caps.get(2).map_or("", |m| m.as_str())),
                    position: index.position(whole.start()),
                },
                body_from: whole.end(),
                expression_body: false,
            });
        }

        for caps in self.bound_function.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let (kind, params) = if let Some(params) = caps.get(2) {
                (FunctionKind::Expression, source::split_params(params.as_str()))
            } else if let Some(params) = caps.get(3) {
                (FunctionKind::Arrow, source::split_params(params.as_str()))
            } else {
                let single = caps.get(4).map(|m| m.as_str().to_string());
                (FunctionKind::Arrow, single.into_iter().collect())
            };

            // An arrow body is a block only when `{` follows `=>` directly
            let after = text[whole.end()..].trim_start();
            let expression_body = kind == FunctionKind::Arrow && !after.starts_with('{');

            found.push(ScannedFunction {
                reference: FunctionRef {
                    name: name.as_str().to_string(),
                    kind,
                    params,
                    position: index.position(whole.start()),
                },
                body_from: whole.end(),
                expression_body,
            });
        }

        for caps in self.method.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if NON_METHOD_KEYWORDS.contains(&name.as_str()) {
                continue;
            }
            found.push(ScannedFunction {
                reference: FunctionRef {
                    name: name.as_str().to_string(),
                    kind: FunctionKind::Method,
                    params: source::split_params(caps.get(2).map_or("", |m| m.as_str())),
                    position: index.position(name.start()),
                },
                body_from: whole.end() - 1,
                expression_body: false,
            });
        }

        found.sort_by_key(|f| f.reference.position.offset);
        found.dedup_by(|a, b| {
            a.reference.position.offset == b.reference.position.offset
                && a.reference.kind == b.reference.kind
                && a.reference.name == b.reference.name
        });
        found
    }

    /// Body text (without the outer braces) and the end offset of the function
    fn body_of(text: &str, scanned: &ScannedFunction) -> (String, usize) {
        if scanned.expression_body {
            let start = scanned.body_from + (text[scanned.body_from..].len()
                - text[scanned.body_from..].trim_start().len());
            let span = source::expression_span(text, start);
            return (text[span.start..span.end].trim().to_string(), span.end);
        }

        match source::next_open_brace(text, scanned.body_from) {
            Some(open) => {
                let span = source::block_span(text, open);
                let inner_end = if text[..span.end].ends_with('}') && span.end > open + 1 {
                    span.end - 1
                } else {
                    span.end
                };
                (text[open + 1..inner_end].trim().to_string(), span.end)
            }
            None => (String::new(), scanned.body_from),
        }
    }

    fn extract_classes(
        &self,
        text: &str,
        index: &LineIndex<'_>,
        language: Language,
    ) -> Vec<ClassRef> {
        let mut classes = Self::collect_classes(&self.class_decl, text, index, ClassKind::Class);

        if language == Language::TypeScript {
            classes.extend(Self::collect_classes(
                &self.interface_decl,
                text,
                index,
                ClassKind::Interface,
            ));
            classes.extend(Self::collect_classes(&self.enum_decl, text, index, ClassKind::Enum));
            classes.sort_by_key(|c| c.position.offset);
        }

        classes
    }

    fn collect_classes(
        pattern: &Regex,
        text: &str,
        index: &LineIndex<'_>,
        kind: ClassKind,
    ) -> Vec<ClassRef> {
        pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(ClassRef {
                    name: caps.get(1)?.as_str().to_string(),
                    kind,
                    extends: caps.get(2).map(|m| m.as_str().to_string()),
                    position: index.position(whole.start()),
                })
            })
            .collect()
    }

    fn extract_loops(&self, text: &str, index: &LineIndex<'_>) -> Vec<LoopRef> {
        let headers: Vec<_> = self.loop_header.find_iter(text).collect();
        // the `while` after a do-block is part of that loop
        let do_ends = source::block_ends(
            text,
            headers
                .iter()
                .filter(|m| m.as_str().starts_with("do"))
                .map(|m| m.end() - 1),
        );

        headers
            .into_iter()
            .filter(|m| {
                !(m.as_str().starts_with("while")
                    && source::follows_block(text, m.start(), &do_ends))
            })
            .map(|m| {
                let kind = if m.as_str().starts_with("while") {
                    LoopKind::While
                } else if m.as_str().starts_with("do") {
                    LoopKind::DoWhile
                } else {
                    let header = text[m.end()..].split(')').next().unwrap_or("");
                    if header.contains(" of ") {
                        LoopKind::ForOf
                    } else if header.contains(" in ") {
                        LoopKind::ForIn
                    } else {
                        LoopKind::For
                    }
                };
                LoopRef {
                    kind,
                    position: index.position(m.start()),
                }
            })
            .collect()
    }

    fn extract_conditionals(&self, text: &str, index: &LineIndex<'_>) -> Vec<ConditionalRef> {
        self.conditional
            .captures_iter(text)
            .filter_map(|caps| {
                let keyword = caps.get(1)?;
                let kind = if keyword.as_str() == "if" {
                    ConditionalKind::If
                } else {
                    ConditionalKind::Switch
                };
                Some(ConditionalRef {
                    kind,
                    position: index.position(keyword.start()),
                })
            })
            .collect()
    }

    fn extract_variables(&self, text: &str, index: &LineIndex<'_>) -> Vec<VariableRef> {
        self.variable
            .captures_iter(text)
            .filter_map(|caps| {
                let keyword = caps.get(1)?;
                let name = caps.get(2)?.as_str();
                // `const enum Color` is a TypeScript enum, not a binding
                if name == "enum" {
                    return None;
                }
                let kind = match keyword.as_str() {
                    "var" => DeclarationKind::Var,
                    "let" => DeclarationKind::Let,
                    _ => DeclarationKind::Const,
                };
                Some(VariableRef {
                    name: name.split_whitespace().collect::<Vec<_>>().join(" "),
                    kind,
                    position: index.position(keyword.start()),
                })
            })
            .collect()
    }

    fn extract_imports(&self, text: &str, index: &LineIndex<'_>) -> Vec<ImportRef> {
        let es = self.es_import.captures_iter(text).filter_map(|caps| {
            Some(ImportRef {
                module: caps.get(1)?.as_str().to_string(),
                kind: ImportKind::Es,
                position: index.position(caps.get(0)?.start()),
            })
        });
        let common = self.require_call.captures_iter(text).filter_map(|caps| {
            Some(ImportRef {
                module: caps.get(1)?.as_str().to_string(),
                kind: ImportKind::CommonJs,
                position: index.position(caps.get(0)?.start()),
            })
        });

        let mut imports: Vec<ImportRef> = es.chain(common).collect();
        imports.sort_by_key(|i| i.position.offset);
        imports
    }
}
