//! Complexity scoring
//!
//! Two scorers share one threshold pair. Both compare inclusively on the
//! upper edge of a bucket: `score <= low_max` is low, `score <= medium_max`
//! is medium, anything above is high.

use crate::analysis::source;
use codelens_shared::{
    ComplexityConfig, ComplexityLevel, ComplexityResult, Result, StructuralInventory,
};
use regex::Regex;

const FUNCTION_WEIGHT: f64 = 2.0;
const CLASS_WEIGHT: f64 = 3.0;
const LOOP_WEIGHT: f64 = 2.0;
const CONDITIONAL_WEIGHT: f64 = 1.0;
const VARIABLE_WEIGHT: f64 = 0.5;

/// Body-level weights, applied to raw regex counts
const BODY_LOOP_WEIGHT: f64 = 2.0;
const BODY_CONDITIONAL_WEIGHT: f64 = 1.0;
const BODY_FUNCTION_WEIGHT: f64 = 1.0;

/// Converts structure or raw text into a scored complexity bucket
pub struct ComplexityScorer {
    thresholds: ComplexityConfig,
    loop_header: Regex,
    do_block: Regex,
    conditional: Regex,
    function_keyword: Regex,
}

impl ComplexityScorer {
    pub fn new(thresholds: ComplexityConfig) -> Result<Self> {
        Ok(Self {
            thresholds,
            loop_header: Regex::new(r"\b(?:for|while)\s*\(")?,
            do_block: Regex::new(r"\bdo\s*\{")?,
            conditional: Regex::new(r"\b(?:if|switch)\s*\(")?,
            function_keyword: Regex::new(r"\bfunction\b")?,
        })
    }

    /// Weighted score of a full structural inventory
    pub fn score_structure(&self, inventory: &StructuralInventory) -> ComplexityResult {
        let score = inventory.functions.len() as f64 * FUNCTION_WEIGHT
            + inventory.classes.len() as f64 * CLASS_WEIGHT
            + inventory.loops.len() as f64 * LOOP_WEIGHT
            + inventory.conditionals.len() as f64 * CONDITIONAL_WEIGHT
            + inventory.variables.len() as f64 * VARIABLE_WEIGHT;

        self.result(score)
    }

    /// Weighted score of a snippet from direct marker counts
    pub fn score_body(&self, text: &str) -> ComplexityResult {
        let do_opens: Vec<usize> = self.do_block.find_iter(text).map(|m| m.end() - 1).collect();
        let do_ends = source::block_ends(text, do_opens.iter().copied());
        let headers = self
            .loop_header
            .find_iter(text)
            .filter(|m| {
                !(m.as_str().starts_with("while")
                    && source::follows_block(text, m.start(), &do_ends))
            })
            .count();
        let loops = headers + do_opens.len();
        let conditionals = self.conditional.find_iter(text).count();
        let functions =
            self.function_keyword.find_iter(text).count() + text.matches("=>").count();

        let score = loops as f64 * BODY_LOOP_WEIGHT
            + conditionals as f64 * BODY_CONDITIONAL_WEIGHT
            + functions as f64 * BODY_FUNCTION_WEIGHT;

        self.result(score)
    }

    /// Bucket a score
    pub fn level(&self, score: f64) -> ComplexityLevel {
        if score <= self.thresholds.low_max {
            ComplexityLevel::Low
        } else if score <= self.thresholds.medium_max {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::High
        }
    }

    fn result(&self, score: f64) -> ComplexityResult {
        ComplexityResult {
            level: self.level(score),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelens_shared::{
        ClassKind, ClassRef, ConditionalKind, ConditionalRef, DeclarationKind, FunctionKind,
        FunctionRef, LoopKind, LoopRef, Position, VariableRef,
    };

    fn scorer() -> ComplexityScorer {
        ComplexityScorer::new(ComplexityConfig::default()).unwrap()
    }

    fn inventory(
        functions: usize,
        classes: usize,
        loops: usize,
        conditionals: usize,
        variables: usize,
    ) -> StructuralInventory {
        let position = Position::default();
        StructuralInventory {
            functions: (0..functions)
                .map(|i| FunctionRef {
                    name: format!("f{}", i),
                    kind: FunctionKind::Declaration,
                    params: Vec::new(),
                    position,
                })
                .collect(),
            classes: (0..classes)
                .map(|i| ClassRef {
                    name: format!("C{}", i),
                    kind: ClassKind::Class,
                    extends: None,
                    position,
                })
                .collect(),
            loops: (0..loops)
                .map(|_| LoopRef {
                    kind: LoopKind::For,
                    position,
                })
                .collect(),
            conditionals: (0..conditionals)
                .map(|_| ConditionalRef {
                    kind: ConditionalKind::If,
                    position,
                })
                .collect(),
            variables: (0..variables)
                .map(|i| VariableRef {
                    name: format!("v{}", i),
                    kind: DeclarationKind::Const,
                    position,
                })
                .collect(),
            imports: Vec::new(),
        }
    }

    #[test]
    fn test_single_function_is_low() {
        let result = scorer().score_structure(&inventory(1, 0, 0, 0, 0));
        assert_eq!(result.score, 2.0);
        assert_eq!(result.level, ComplexityLevel::Low);
    }

    #[test]
    fn test_weights() {
        let result = scorer().score_structure(&inventory(1, 1, 1, 1, 1));
        assert_eq!(result.score, 2.0 + 3.0 + 2.0 + 1.0 + 0.5);
        assert_eq!(result.level, ComplexityLevel::High);
    }

    #[test]
    fn test_threshold_boundaries() {
        let scorer = scorer();

        // exactly low_max
        let at_low = scorer.score_structure(&inventory(1, 0, 0, 0, 2));
        assert_eq!(at_low.score, 3.0);
        assert_eq!(at_low.level, ComplexityLevel::Low);

        // low_max + 0.5
        let above_low = scorer.score_structure(&inventory(1, 0, 0, 0, 3));
        assert_eq!(above_low.score, 3.5);
        assert_eq!(above_low.level, ComplexityLevel::Medium);

        assert_eq!(scorer.level(7.0), ComplexityLevel::Medium);
        assert_eq!(scorer.level(7.5), ComplexityLevel::High);
        assert_eq!(scorer.level(0.0), ComplexityLevel::Low);
    }

    #[test]
    fn test_monotonic_in_every_count() {
        let scorer = scorer();
        let base = [1usize, 0, 1, 2, 3];

        for axis in 0..base.len() {
            let mut previous =
                scorer.score_structure(&inventory(base[0], base[1], base[2], base[3], base[4]));
            for extra in 1..6 {
                let mut counts = base;
                counts[axis] += extra;
                let current = scorer.score_structure(&inventory(
                    counts[0], counts[1], counts[2], counts[3], counts[4],
                ));
                assert!(current.score >= previous.score);
                assert!(current.level >= previous.level);
                previous = current;
            }
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let scorer = ComplexityScorer::new(ComplexityConfig {
            low_max: 1.0,
            medium_max: 2.0,
        })
        .unwrap();
        assert_eq!(
            scorer.score_structure(&inventory(1, 0, 0, 0, 0)).level,
            ComplexityLevel::Medium
        );
        assert_eq!(scorer.level(1.0), ComplexityLevel::Low);
    }

    #[test]
    fn test_body_scoring() {
        let scorer = scorer();

        let body =
            "try { const r = await fetch(url); return await r.json(); } catch(e) { return null; }";
        let result = scorer.score_body(body);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.level, ComplexityLevel::Low);

        let body = r#"
for (const x of xs) {
    if (x) { items.forEach(i => log(i)); }
}
do { n--; } while (n > 0);
switch (mode) {}
"#;
        // loops: for, do = 2 * 2; conditionals: if, switch = 2; functions: one arrow = 1
        let result = scorer.score_body(body);
        assert_eq!(result.score, 7.0);
        assert_eq!(result.level, ComplexityLevel::Medium);
    }

    #[test]
    fn test_do_while_counts_as_one_loop() {
        let scorer = scorer();
        assert_eq!(scorer.score_body("do { x(); } while (y);").score, 2.0);
        assert_eq!(scorer.score_body("do {\n  x();\n}\nwhile (y);").score, 2.0);

        // a plain while after an unrelated block still counts
        assert_eq!(scorer.score_body("do { x(); } while (y); while (z) {}").score, 4.0);
        assert_eq!(scorer.score_body("{ x(); } while (z) {}").score, 2.0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = scorer();
        let inv = inventory(2, 1, 3, 1, 4);
        assert_eq!(scorer.score_structure(&inv), scorer.score_structure(&inv));
    }
}
