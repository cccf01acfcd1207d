//! Conformance suite every `AnnotationGrammar` must pass.
//!
//! The parser's structural guarantees (range validity, contiguous order,
//! determinism) hold for any grammar that passes these checks. Each grammar
//! supplies a `render` function producing its directive syntax.

use explainer_parser::{
    AnnotatedCodeBlock, AnnotationGrammar, AnnotationParser, BracketGrammar, DirectiveContext,
    HtmlCommentGrammar, LineRange, ParseError,
};
use pretty_assertions::assert_eq;

/// Directive syntax writer: (order, range spec) -> directive line.
type Syntax = fn(Option<usize>, &str) -> String;

fn bracket(order: Option<usize>, spec: &str) -> String {
    match order {
        Some(n) => format!("[[annotation {n}: {spec}]]"),
        None => format!("[[annotation: {spec}]]"),
    }
}

fn comment(order: Option<usize>, spec: &str) -> String {
    match order {
        Some(n) => format!("<!-- annotation {n}: {spec} -->"),
        None => format!("<!-- annotation: {spec} -->"),
    }
}

const CODE: &str = "```python\nimport os\nx = 1\ny = 2\nprint(x + y)\n```\n";

fn only_block<G: AnnotationGrammar>(parser: &AnnotationParser<G>, md: &str) -> AnnotatedCodeBlock {
    let doc = parser.parse(md).unwrap();
    doc.code_blocks().next().unwrap().clone()
}

fn check_recognizes_ranges<G: AnnotationGrammar>(grammar: &G, syntax: Syntax) {
    let ctx = DirectiveContext {
        line: 1,
        code_line_count: Some(4),
    };
    for (spec, expected) in [("lines 1-4", (1, 4)), ("line 2", (2, 2)), ("3", (3, 3))] {
        let line = syntax(None, spec);
        let directive = grammar
            .try_parse_directive(&line, &ctx)
            .unwrap_or_else(|| panic!("{line} not recognized"))
            .unwrap();
        assert_eq!(
            directive.range,
            LineRange::new(expected.0, expected.1).unwrap()
        );
        assert_eq!(directive.body_start, line.len());
    }
}

fn check_ignores_plain_lines<G: AnnotationGrammar>(grammar: &G) {
    let ctx = DirectiveContext {
        line: 1,
        code_line_count: None,
    };
    for line in ["", "Plain prose.", "# Heading", "- list item", "`inline`"] {
        assert!(grammar.try_parse_directive(line, &ctx).is_none(), "{line:?}");
    }
}

fn check_rejects_malformed<G: AnnotationGrammar>(grammar: G, syntax: Syntax) {
    let parser = AnnotationParser::with_grammar(grammar);
    for spec in ["lines x-2", "lines 3-1", "lines 0-1", "lines"] {
        let md = format!("{CODE}{}\nBody\n", syntax(None, spec));
        let err = parser.parse(&md).unwrap_err();
        assert!(matches!(err, ParseError::InvalidRange { line: 7, .. }), "{spec}: {err}");
    }

    let md = format!("{CODE}{}\nBody\n", syntax(None, "lines 4-5"));
    assert!(matches!(
        parser.parse(&md).unwrap_err(),
        ParseError::InvalidRange { .. }
    ));
}

fn check_orders_contiguously<G: AnnotationGrammar>(grammar: G, syntax: Syntax) {
    let parser = AnnotationParser::with_grammar(grammar);
    let md = format!(
        "{CODE}{}\nImports.\n{}\nSetup.\n{} Prints.\n",
        syntax(None, "line 1"),
        syntax(Some(2), "lines 2-3"),
        syntax(None, "line 4"),
    );
    let block = only_block(&parser, &md);

    let orders: Vec<usize> = block.annotations.iter().map(|a| a.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    let bodies: Vec<&str> = block.annotations.iter().map(|a| a.body.as_str()).collect();
    assert_eq!(bodies, vec!["Imports.", "Setup.", "Prints."]);
    assert!(block
        .annotations
        .iter()
        .all(|a| a.target.fits(block.source_lines.len())));

    assert_eq!(parser.parse(&md).unwrap(), parser.parse(&md).unwrap());
}

fn check_rejects_gaps<G: AnnotationGrammar>(grammar: G, syntax: Syntax) {
    let parser = AnnotationParser::with_grammar(grammar);
    let md = format!("{CODE}{}\nA\n{}\nB\n", syntax(Some(1), "line 1"), syntax(Some(3), "line 2"));
    assert!(matches!(
        parser.parse(&md).unwrap_err(),
        ParseError::DuplicateOrGappedOrder {
            expected: 2,
            found: 3,
            ..
        }
    ));
}

fn check_dangling<G: AnnotationGrammar>(grammar: G, syntax: Syntax) {
    let parser = AnnotationParser::with_grammar(grammar);
    let md = format!("Intro.\n{}\nBody\n{CODE}", syntax(None, "line 1"));
    assert_eq!(
        parser.parse(&md).unwrap_err(),
        ParseError::DanglingAnnotation { line: 2 }
    );
}

macro_rules! conformance {
    ($name:ident, $grammar:expr, $syntax:expr) => {
        mod $name {
            use super::*;

            #[test]
            fn test_recognizes_ranges() {
                check_recognizes_ranges(&$grammar, $syntax);
            }

            #[test]
            fn test_ignores_plain_lines() {
                check_ignores_plain_lines(&$grammar);
            }

            #[test]
            fn test_rejects_malformed() {
                check_rejects_malformed($grammar, $syntax);
            }

            #[test]
            fn test_orders_contiguously() {
                check_orders_contiguously($grammar, $syntax);
            }

            #[test]
            fn test_rejects_gaps() {
                check_rejects_gaps($grammar, $syntax);
            }

            #[test]
            fn test_dangling() {
                check_dangling($grammar, $syntax);
            }
        }
    };
}

conformance!(bracket_grammar, BracketGrammar, bracket);
conformance!(html_comment_grammar, HtmlCommentGrammar, comment);
