//! Per-function behavior records

use crate::analysis::complexity::ComplexityScorer;
use crate::analysis::explain::ExplanationComposer;
use crate::analysis::patterns::PatternDetector;
use codelens_shared::{
    ComplexityConfig, Dependency, DependencyKind, FunctionBehavior, FunctionRecord, Result,
    ReturnValue,
};
use regex::Regex;
use tracing::{debug, instrument};

/// Composes return, dependency, side-effect, pattern and complexity facts for one function
pub struct FunctionBehaviorAnalyzer {
    detector: PatternDetector,
    scorer: ComplexityScorer,
    return_statement: Regex,
    import_from: Regex,
    require_call: Regex,
}

impl FunctionBehaviorAnalyzer {
    pub fn new(thresholds: ComplexityConfig) -> Result<Self> {
        Ok(Self {
            detector: PatternDetector::new()?,
            scorer: ComplexityScorer::new(thresholds)?,
            return_statement: Regex::new(r"\breturn\s+([^;]+);")?,
            import_from: Regex::new(r#"\bimport\s+[^;]*?\bfrom\s+["']([^"']+)["']"#)?,
            require_call: Regex::new(r#"\brequire\s*\(\s*["']([^"']+)["']\s*\)"#)?,
        })
    }

    /// Build the behavior record of a single function
    #[instrument(skip(self, function), fields(name = %function.name))]
    pub fn analyze(&self, function: &FunctionRecord) -> FunctionBehavior {
        let body = function.body.as_str();

        let return_value = self.return_value(body);
        let dependencies = self.dependencies(body);
        let side_effects = self.detector.detect_side_effects(body);
        let patterns = self.detector.detect_patterns(body);
        let complexity = self.scorer.score_body(body);

        let explanation = ExplanationComposer::describe_behavior(
            function,
            &return_value,
            &side_effects,
            &patterns,
        );

        debug!(
            "Analyzed function {}: complexity {} ({}), {} dependencies",
            function.name,
            complexity.level,
            complexity.score,
            dependencies.len()
        );

        FunctionBehavior {
            function: function.clone(),
            complexity,
            return_value,
            dependencies,
            side_effects,
            patterns,
            explanation,
        }
    }

    /// First `return <expr>;` in the body
    fn return_value(&self, body: &str) -> ReturnValue {
        let Some(expr) = self
            .return_statement
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
        else {
            return ReturnValue::default();
        };

        let is_variable = !expr.contains(' ') && !expr.starts_with('{') && !expr.starts_with('[');
        ReturnValue {
            exists: true,
            value: Some(expr),
            is_variable: Some(is_variable),
        }
    }

    /// Every import/require target, in source order
    fn dependencies(&self, body: &str) -> Vec<Dependency> {
        let imports = self.import_from.captures_iter(body).filter_map(|caps| {
            let module = caps.get(1)?;
            Some((module.start(), module.as_str(), DependencyKind::Import))
        });
        let requires = self.require_call.captures_iter(body).filter_map(|caps| {
            let module = caps.get(1)?;
            Some((module.start(), module.as_str(), DependencyKind::Require))
        });

        let mut found: Vec<_> = imports.chain(requires).collect();
        found.sort_by_key(|(offset, _, _)| *offset);
        found
            .into_iter()
            .map(|(_, module, kind)| Dependency {
                module: module.to_string(),
                kind,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_shared::{ComplexityLevel, PatternKind, Position, SideEffectKind, Span};

    fn analyzer() -> FunctionBehaviorAnalyzer {
        FunctionBehaviorAnalyzer::new(ComplexityConfig::default()).unwrap()
    }

    fn record(name: &str, params: &[&str], body: &str) -> FunctionRecord {
        FunctionRecord {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body: body.to_string(),
            position: Position::default(),
            range: Span::default(),
        }
    }

    #[test]
    fn test_fetch_function() {
        let body =
            "try { const r = await fetch(url); return await r.json(); } catch(e) { return null; }";
        let behavior = analyzer().analyze(&record("load", &["url"], body));

        assert!(behavior.return_value.exists);
        assert_eq!(behavior.return_value.value.as_deref(), Some("await r.json()"));
        assert_eq!(behavior.return_value.is_variable, Some(false));

        let network = behavior
            .side_effects
            .iter()
            .filter(|e| e.kind == SideEffectKind::Network)
            .count();
        assert_eq!(network, 1);

        let async_patterns = behavior
            .patterns
            .iter()
            .filter(|p| p.kind == PatternKind::Async)
            .count();
        assert_eq!(async_patterns, 1);

        assert_eq!(behavior.complexity.level, ComplexityLevel::Low);
        assert!(behavior.explanation.starts_with("The function `load` takes 1 parameter (`url`)"));
        assert!(behavior.explanation.contains("makes network requests"));
        assert!(behavior.explanation.contains("Async/Await"));
    }

    #[test]
    fn test_return_value_shapes() {
        let analyzer = analyzer();

        let behavior = analyzer.analyze(&record("f", &[], "const total = 1; return total;"));
        assert_eq!(behavior.return_value.is_variable, Some(true));

        let behavior = analyzer.analyze(&record("f", &[], "return {a: 1};"));
        assert_eq!(behavior.return_value.is_variable, Some(false));

        let behavior = analyzer.analyze(&record("f", &[], "return [1,2];"));
        assert_eq!(behavior.return_value.is_variable, Some(false));

        let behavior = analyzer.analyze(&record("f", &[], "console.log('x')"));
        assert_eq!(behavior.return_value, ReturnValue::default());
        assert!(behavior.explanation.contains("doesn't explicitly return a value"));
    }

    #[test]
    fn test_dependencies_in_source_order() {
        let body = r#"
const fs = require('fs');
import { join } from "path";
const lodash = require("lodash");
"#;
        let behavior = analyzer().analyze(&record("setup", &[], body));
        let deps: Vec<(&str, DependencyKind)> = behavior
            .dependencies
            .iter()
            .map(|d| (d.module.as_str(), d.kind))
            .collect();
        assert_eq!(
            deps,
            vec![
                ("fs", DependencyKind::Require),
                ("path", DependencyKind::Import),
                ("lodash", DependencyKind::Require)
            ]
        );
    }

    #[test]
    fn test_body_complexity() {
        let body = "for (let i = 0; i < n; i++) { if (a) {} if (b) {} while (c) {} }";
        let behavior = analyzer().analyze(&record("loop", &["n"], body));
        // 2 loops * 2 + 2 conditionals
        assert_eq!(behavior.complexity.score, 6.0);
        assert_eq!(behavior.complexity.level, ComplexityLevel::Medium);
    }
}
