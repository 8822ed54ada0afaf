//! Parser test suite

use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::core::nodes::{Node, NodeKind, NodeList};
use crate::core::registry::SpecRegistry;
use crate::core::specs::{EnvironmentSpec, MacroSpec, SpecialsSpec};
use crate::core::state::StateChange;
use crate::core::tokens::StringTokenReader;
use crate::core::walker::{Walker, WalkerOptions};
use crate::utils::diagnostics::{DiagnosticKind, DiagnosticLevel};
use crate::utils::error::ParseError;

// ============================================================================
// Helpers
// ============================================================================

fn registry() -> Arc<SpecRegistry> {
    let mut registry = SpecRegistry::new();
    registry
        .add_context_category(
            "test",
            [
                MacroSpec::new("section", "*[{").unwrap(),
                MacroSpec::new("textbf", "{").unwrap(),
                MacroSpec::new("frac", "{{").unwrap(),
                MacroSpec::new("item", "[").unwrap(),
                MacroSpec::no_arguments("(").with_after_state(StateChange::MathMode(true)),
                MacroSpec::no_arguments(")").with_after_state(StateChange::MathMode(false)),
            ],
            [
                EnvironmentSpec::new("itemize", "[").unwrap(),
                EnvironmentSpec::no_arguments("equation")
                    .with_body_state(StateChange::MathMode(true)),
            ],
            [
                SpecialsSpec::new("~"),
                SpecialsSpec::with_arguments("!", vec![ArgumentSpec::new("{").unwrap()]),
            ],
        )
        .unwrap();
    registry.freeze();
    Arc::new(registry)
}

fn parse(source: &str) -> NodeList {
    Walker::new(source, registry()).parse_document().unwrap()
}

fn parse_err(source: &str) -> ParseError {
    Walker::new(source, registry()).parse_document().unwrap_err()
}

/// Short label, start and end of each top-level node
fn outline(nodes: &NodeList) -> Vec<(String, usize, usize)> {
    nodes
        .iter()
        .map(|node| {
            let label = match &node.kind {
                NodeKind::Chars { text } => format!("chars {:?}", text),
                NodeKind::Macro { name, .. } => format!("macro {}", name),
                NodeKind::Group { .. } => "group".to_string(),
                NodeKind::Comment { text, .. } => format!("comment {:?}", text),
                NodeKind::Environment { name, .. } => format!("environment {}", name),
                NodeKind::Specials { symbol, .. } => format!("specials {}", symbol),
            };
            (label, node.pos, node.pos_end)
        })
        .collect()
}

fn o(label: &str, pos: usize, pos_end: usize) -> (String, usize, usize) {
    (label.to_string(), pos, pos_end)
}

fn chars_text(node: &Node) -> &str {
    match &node.kind {
        NodeKind::Chars { text } => text,
        other => panic!("expected chars, got {:?}", other),
    }
}

// ============================================================================
// General sequences
// ============================================================================

#[test]
fn test_adjacent_spans_are_contiguous() {
    let nodes = parse(r"Hello there, \yourname. What's that about {}?");
    assert_eq!(
        outline(&nodes),
        vec![
            o(r#"chars "Hello there, ""#, 0, 13),
            o("macro yourname", 13, 22),
            o(r#"chars ". What's that about ""#, 22, 42),
            o("group", 42, 44),
            o(r#"chars "?""#, 44, 45),
        ]
    );
    for pair in nodes.nodes.windows(2) {
        assert_eq!(pair[0].pos_end, pair[1].pos);
    }
    assert!(nodes[1].arguments().unwrap().is_empty());
    assert_eq!((nodes.pos, nodes.pos_end), (0, 45));
}

#[test]
fn test_group_children() {
    let nodes = parse(r"{a\textbf{b}}");
    let children = nodes[0].children().unwrap();
    assert_eq!(
        outline(children),
        vec![o(r#"chars "a""#, 1, 2), o("macro textbf", 2, 12)]
    );
    assert_eq!(nodes[0].latex_verbatim(), r"{a\textbf{b}}");
}

#[test]
fn test_empty_group_children_sit_after_brace() {
    let nodes = parse("x{}");
    let children = nodes[1].children().unwrap();
    assert!(children.is_empty());
    assert_eq!((children.pos, children.pos_end), (2, 2));
}

#[test]
fn test_general_parser_stops_before_comment() {
    let walker_source = "abc% note\ndef";
    let mut walker = Walker::new(walker_source, registry());
    let state = walker.make_parsing_state();
    let mut reader = walker.make_token_reader();

    let parser = GeneralNodesParser::new().stop_on_comment(true);
    let (nodes, delta) = walker
        .parse_content(&parser, &mut reader, &state, None)
        .unwrap();
    assert_eq!(outline(&nodes), vec![o(r#"chars "abc""#, 0, 3)]);
    assert_eq!(reader.cur_pos(), 3);
    assert!(delta.is_none());
}

#[test]
fn test_general_parser_keeps_comments() {
    let nodes = parse("abc% note\ndef");
    assert_eq!(
        outline(&nodes),
        vec![
            o(r#"chars "abc""#, 0, 3),
            o(r#"comment " note""#, 3, 10),
            o(r#"chars "def""#, 10, 13),
        ]
    );
}

#[test]
fn test_comments_disabled() {
    let mut walker = Walker::new("a%b", registry()).with_options(WalkerOptions {
        enable_comments: false,
        ..WalkerOptions::default()
    });
    let nodes = walker.parse_document().unwrap();
    assert_eq!(outline(&nodes), vec![o(r#"chars "a%b""#, 0, 3)]);
}

// ============================================================================
// Single nodes
// ============================================================================

const COMMENTED: &str = "% comment here.\nHello there, \\yourname. What's that about {}?";

#[test]
fn test_single_node_stops_on_comment() {
    let mut walker = Walker::new(COMMENTED, registry());
    let state = walker.make_parsing_state();
    let mut reader = walker.make_token_reader();

    let (nodes, _) = walker
        .parse_content(&SingleNodeParser::new(), &mut reader, &state, None)
        .unwrap();
    assert_eq!(nodes.len(), 1);
    match &nodes[0].kind {
        NodeKind::Comment { text, post_space } => {
            assert_eq!(text, " comment here.");
            assert_eq!(post_space, "\n");
        }
        other => panic!("expected a comment, got {:?}", other),
    }
    assert_eq!((nodes[0].pos, nodes[0].pos_end), (0, 16));
    assert_eq!(reader.cur_pos(), 16);

    // the next call picks up right after the comment
    let (nodes, _) = walker
        .parse_content(&SingleNodeParser::new(), &mut reader, &state, None)
        .unwrap();
    assert_eq!(outline(&nodes), vec![o(r#"chars "Hello there, ""#, 16, 29)]);
}

#[test]
fn test_single_node_through_comments() {
    let mut walker = Walker::new(COMMENTED, registry());
    let state = walker.make_parsing_state();
    let mut reader = walker.make_token_reader();

    let parser = SingleNodeParser::new().stop_on_comment(false);
    let (nodes, _) = walker
        .parse_content(&parser, &mut reader, &state, None)
        .unwrap();
    assert_eq!(
        outline(&nodes),
        vec![
            o(r#"comment " comment here.""#, 0, 16),
            o(r#"chars "Hello there, ""#, 16, 29),
        ]
    );
    assert_eq!(reader.cur_pos(), 29);
}

#[test]
fn test_single_node_reads_one_construct() {
    let mut walker = Walker::new(r"\textbf{x}y", registry());
    let state = walker.make_parsing_state();
    let mut reader = walker.make_token_reader();

    let (nodes, _) = walker
        .parse_content(&SingleNodeParser::new(), &mut reader, &state, None)
        .unwrap();
    assert_eq!(outline(&nodes), vec![o("macro textbf", 0, 10)]);
    assert_eq!(reader.cur_pos(), 10);
}

// ============================================================================
// Arguments
// ============================================================================

#[test]
fn test_optional_and_mandatory_arguments() {
    let nodes = parse(r"\section*[short]{Long title} after");
    assert_eq!(
        outline(&nodes),
        vec![o("macro section", 0, 28), o(r#"chars " after""#, 28, 34)]
    );

    let args = nodes[0].arguments().unwrap();
    assert_eq!(args.len(), 3);
    assert_eq!((args.pos, args.pos_end), (8, 28));
    assert_eq!(args.get(0).unwrap().latex_verbatim(), "*");
    assert_eq!(args.get(1).unwrap().latex_verbatim(), "[short]");
    assert_eq!(args.get(2).unwrap().latex_verbatim(), "{Long title}");
}

#[test]
fn test_absent_optional_arguments_are_none() {
    let nodes = parse(r"\section{Title}");
    let args = nodes[0].arguments().unwrap();
    assert!(!args.is_present(0));
    assert!(!args.is_present(1));
    assert!(args.is_present(2));
    assert_eq!((args.pos, args.pos_end), (8, 15));
}

#[test]
fn test_mandatory_single_tokens() {
    let nodes = parse(r"\frac12");
    let args = nodes[0].arguments().unwrap();
    assert_eq!(args.get(0).unwrap().latex_verbatim(), "1");
    assert_eq!(args.get(1).unwrap().latex_verbatim(), "2");
    assert_eq!(nodes[0].pos_end, 7);

    let nodes = parse(r"\frac\alpha~");
    let args = nodes[0].arguments().unwrap();
    assert_eq!(outline(args.get(0).unwrap()), vec![o("macro alpha", 5, 11)]);
    assert_eq!(outline(args.get(1).unwrap()), vec![o("specials ~", 11, 12)]);
}

#[test]
fn test_absent_arguments_collapse_to_start() {
    let source = "abc  xyz";
    let mut walker = Walker::new(source, registry());
    let state = walker.make_parsing_state();
    let mut reader = StringTokenReader::new(source);
    reader.move_to_pos(3);

    let parser = ArgumentsParser::new(ArgumentSpec::list_from_compact("[*t+").unwrap());
    let (args, delta) = walker
        .parse_content(&parser, &mut reader, &state, None)
        .unwrap();
    assert_eq!(args.values, vec![None, None, None]);
    assert_eq!((args.pos, args.pos_end), (3, 3));
    assert_eq!(reader.cur_pos(), 3);
    assert!(delta.is_none());
}

#[test]
fn test_no_arguments_parser() {
    let mut walker = Walker::new("abc", registry());
    let state = walker.make_parsing_state();
    let mut reader = walker.make_token_reader();
    reader.move_to_pos(2);

    let (args, delta) = walker
        .parse_content(&NoArgumentsParser, &mut reader, &state, None)
        .unwrap();
    assert!(args.is_empty());
    assert_eq!((args.pos, args.pos_end), (2, 2));
    assert_eq!(reader.cur_pos(), 2);
    assert!(delta.is_none());
}

/// Mandatory argument that also asks for math mode afterwards
struct MathSwitchingArgument;

impl ContentParser for MathSwitchingArgument {
    type Output = Option<NodeList>;

    fn parse(
        &self,
        walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Option<NodeList>>> {
        let (value, _) =
            StandardArgumentParser::new(StandardArgument::Mandatory).parse(walker, reader, state)?;
        Ok((value, Some(StateChange::MathMode(true).delta_from(state))))
    }
}

/// Consumes nothing and reports the mode it was called in
struct ModeProbe;

impl ContentParser for ModeProbe {
    type Output = Option<NodeList>;

    fn parse(
        &self,
        _walker: &mut Walker,
        reader: &mut dyn TokenReader,
        state: &ParsingState,
    ) -> ParseResult<Parsed<Option<NodeList>>> {
        let text = if state.in_math_mode { "math" } else { "text" };
        let pos = reader.cur_pos();
        let node = Node::new(
            NodeKind::Chars {
                text: text.to_string(),
            },
            pos,
            pos,
            state.clone(),
        );
        Ok((Some(NodeList::from_node(node)), None))
    }
}

#[test]
fn test_argument_delta_is_discarded() {
    let source = "{x} rest";
    let mut walker = Walker::new(source, registry());
    let state = walker.make_parsing_state();
    let mut reader = walker.make_token_reader();

    let parser = ArgumentsParser::new(vec![
        ArgumentSpec::custom(Arc::new(MathSwitchingArgument)),
        ArgumentSpec::custom(Arc::new(ModeProbe)),
    ]);
    let (args, delta) = walker
        .parse_content(&parser, &mut reader, &state, None)
        .unwrap();

    assert!(delta.is_none());
    assert_eq!(chars_text(&args.get(1).unwrap()[0]), "text");
    assert_eq!((args.pos, args.pos_end), (0, 3));

    let discarded: Vec<_> = walker
        .diagnostics()
        .of_kind(|k| matches!(k, DiagnosticKind::DiscardedStateDelta { .. }))
        .collect();
    assert_eq!(discarded.len(), 1);
    assert_eq!(discarded[0].level, DiagnosticLevel::Warning);
    assert_eq!(
        discarded[0].kind,
        DiagnosticKind::DiscardedStateDelta { argument_index: 0 }
    );
}

#[test]
fn test_discarded_delta_spans_its_own_argument() {
    let mut walker = Walker::new("{a} {x} rest", registry());
    let state = walker.make_parsing_state();
    let mut reader = walker.make_token_reader();

    let parser = ArgumentsParser::new(vec![
        ArgumentSpec::new("{").unwrap(),
        ArgumentSpec::custom(Arc::new(MathSwitchingArgument)),
    ]);
    walker
        .parse_content(&parser, &mut reader, &state, None)
        .unwrap();

    let diag = &walker.diagnostics().items[0];
    assert_eq!(
        diag.kind,
        DiagnosticKind::DiscardedStateDelta { argument_index: 1 }
    );
    assert_eq!(diag.span, Some((3, 7)));
    assert_eq!(diag.column, Some(4));
}

#[test]
fn test_comments_before_arguments_are_skipped() {
    let source = "\\textbf% c\n{x} y";
    let nodes = parse(source);
    assert_eq!(
        outline(&nodes),
        vec![o("macro textbf", 0, 14), o(r#"chars " y""#, 14, 16)]
    );
    let args = nodes[0].arguments().unwrap();
    assert_eq!(args.get(0).unwrap().latex_verbatim(), "{x}");
    assert_eq!((args.pos, args.pos_end), (11, 14));

    let nodes = parse("\\section% c\n[s]% d\n{x}");
    let args = nodes[0].arguments().unwrap();
    assert!(!args.is_present(0));
    assert_eq!(args.get(1).unwrap().latex_verbatim(), "[s]");
    assert_eq!(args.get(2).unwrap().latex_verbatim(), "{x}");
    assert_eq!(nodes.latex_verbatim(), "\\section% c\n[s]% d\n{x}");
}

#[test]
fn test_absent_optional_argument_leaves_comment() {
    let nodes = parse("\\item% note\nx");
    assert_eq!(
        outline(&nodes),
        vec![
            o("macro item", 0, 5),
            o(r#"comment " note""#, 5, 13),
            o(r#"chars "x""#, 13, 14),
        ]
    );
}

#[test]
fn test_argument_failure_aborts() {
    assert!(matches!(
        parse_err(r"\textbf"),
        ParseError::ExpectedArgument { pos: 7, .. }
    ));
    assert!(matches!(
        parse_err(r"{\textbf}"),
        ParseError::ExpectedArgument { pos: 8, .. }
    ));
}

// ============================================================================
// Environments and specials
// ============================================================================

#[test]
fn test_environment() {
    let nodes = parse(r"\begin{itemize}\item a\end{itemize}");
    assert_eq!(outline(&nodes), vec![o("environment itemize", 0, 35)]);

    let body = nodes[0].children().unwrap();
    assert_eq!(
        outline(body),
        vec![o("macro item", 15, 21), o(r#"chars "a""#, 21, 22)]
    );
    assert!(!nodes[0].arguments().unwrap().is_present(0));
}

#[test]
fn test_environment_arguments() {
    let nodes = parse(r"\begin{itemize}[label]x\end{itemize}");
    let args = nodes[0].arguments().unwrap();
    assert_eq!(args.get(0).unwrap().latex_verbatim(), "[label]");
    assert_eq!(nodes[0].children().unwrap().latex_verbatim(), "x");
}

#[test]
fn test_environment_errors() {
    assert_eq!(
        parse_err(r"\begin{a}x\end{b}"),
        ParseError::MismatchedEnvironment {
            pos: 10,
            expected: "a".to_string(),
            found: "b".to_string(),
        }
    );
    assert_eq!(
        parse_err(r"\begin{a}x"),
        ParseError::unterminated(0, r"\end{a}")
    );
    assert_eq!(
        parse_err(r"ab \begin{itemize}[x]y"),
        ParseError::unterminated(3, r"\end{itemize}")
    );
    assert!(matches!(
        parse_err(r"x\end{a}"),
        ParseError::UnexpectedToken { pos: 1, .. }
    ));
}

#[test]
fn test_specials() {
    let nodes = parse("a~b!{c}d");
    assert_eq!(
        outline(&nodes),
        vec![
            o(r#"chars "a""#, 0, 1),
            o("specials ~", 1, 2),
            o(r#"chars "b""#, 2, 3),
            o("specials !", 3, 7),
            o(r#"chars "d""#, 7, 8),
        ]
    );
    let args = nodes[3].arguments().unwrap();
    assert_eq!(args.get(0).unwrap().latex_verbatim(), "{c}");
}

#[test]
fn test_specials_disabled() {
    let mut walker = Walker::new("a~b", registry()).with_options(WalkerOptions {
        enable_specials: false,
        ..WalkerOptions::default()
    });
    let nodes = walker.parse_document().unwrap();
    assert_eq!(outline(&nodes), vec![o(r#"chars "a~b""#, 0, 3)]);
}

// ============================================================================
// State changes
// ============================================================================

#[test]
fn test_after_state_applies_to_following_siblings() {
    let mut walker = Walker::new(r"a\(b{c}", registry());
    let state = walker.make_parsing_state();
    let mut reader = walker.make_token_reader();

    let (nodes, delta) = walker
        .parse_content(&GeneralNodesParser::new(), &mut reader, &state, None)
        .unwrap();
    let modes: Vec<_> = nodes.iter().map(|n| n.parsing_state.in_math_mode).collect();
    assert_eq!(modes, vec![false, false, true, true]);
    assert!(delta.unwrap().state().in_math_mode);
}

#[test]
fn test_state_change_ends_with_group() {
    let mut walker = Walker::new(r"{\(x}y", registry());
    let nodes = walker.parse_document().unwrap();

    let inner = nodes[0].children().unwrap();
    assert!(inner[1].parsing_state.in_math_mode);
    assert!(!nodes[1].parsing_state.in_math_mode);

    let scoped = walker
        .diagnostics()
        .of_kind(|k| *k == DiagnosticKind::DiscardedScopedDelta)
        .count();
    assert_eq!(scoped, 1);
    assert_eq!(walker.diagnostics().infos, 1);
}

#[test]
fn test_math_environment_body() {
    let nodes = parse(r"\begin{equation}x\end{equation}");
    assert!(!nodes[0].parsing_state.in_math_mode);
    assert!(nodes[0].children().unwrap()[0].parsing_state.in_math_mode);
}

// ============================================================================
// Errors and options
// ============================================================================

#[test]
fn test_stray_and_missing_braces() {
    assert!(matches!(
        parse_err("ab}"),
        ParseError::UnexpectedToken { pos: 2, .. }
    ));
    assert_eq!(parse_err("{abc"), ParseError::unterminated(0, "'}'"));
    assert_eq!(parse_err("x {a{b}"), ParseError::unterminated(2, "'}'"));
    assert_eq!(parse_err(r"\textbf{ab"), ParseError::unterminated(7, "'}'"));
    assert_eq!(parse_err(r"\section[ab"), ParseError::unterminated(8, "']'"));
}

#[test]
fn test_strict_callables() {
    let mut walker = Walker::new(r"\foo", registry()).with_options(WalkerOptions::strict());
    assert_eq!(
        walker.parse_document().unwrap_err(),
        ParseError::UnknownMacro {
            pos: 0,
            name: "foo".to_string(),
        }
    );

    let mut walker =
        Walker::new(r"\begin{foo}\end{foo}", registry()).with_options(WalkerOptions::strict());
    assert!(matches!(
        walker.parse_document().unwrap_err(),
        ParseError::UnknownEnvironment { .. }
    ));

    // unknown names are plain callables otherwise
    let nodes = parse(r"\begin{foo}\end{foo}");
    assert_eq!(outline(&nodes), vec![o("environment foo", 0, 20)]);
}
