use canopy_syntax::{Builder, SyntaxTree};
use crossbeam_channel::Receiver;
use expect_test::expect;
use text_size::{TextRange, TextSize};

use crate::{
    Event, ExpansionState, ItemId, NavigateOptions, SyntaxCategory, SyntaxTreeView, TriviaSide,
};

/// `class Widget {\n    // ...\n}` shaped so the root covers exactly [0, 50).
fn class_tree() -> SyntaxTree {
    let comment = format!("//{}\n", "x".repeat(27));

    let mut b = Builder::new();
    b.start_node("CompilationUnit");
    b.start_node("ClassDeclaration");
    b.token("ClassKeyword", "class");
    b.trailing_trivia("WhitespaceTrivia", " ");
    b.token("IdentifierToken", "Widget");
    b.trailing_trivia("WhitespaceTrivia", " ");
    b.token("OpenBraceToken", "{");
    b.trailing_trivia("WhitespaceTrivia", "\n");
    b.trivia("WhitespaceTrivia", "    ");
    b.trivia("CommentTrivia", &comment);
    b.token("CloseBraceToken", "}");
    b.finish_node();
    b.finish_node();

    let tree = b.finish();
    assert_eq!(tree.root().full_span(), range(0, 50));
    tree
}

fn directive_tree() -> SyntaxTree {
    let mut b = Builder::new();
    b.start_node("CompilationUnit");
    b.start_structured_trivia("DirectiveTrivia");
    b.start_node("PragmaDirective");
    b.token("HashToken", "#");
    b.token("PragmaKeyword", "pragma");
    b.finish_node();
    b.finish_structured_trivia();
    b.token("EndOfFileToken", "");
    b.finish_node();
    b.finish()
}

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

fn drain<'t>(receiver: &Receiver<Event<'t>>) -> Vec<Event<'t>> {
    receiver.try_iter().collect()
}

fn expand_all(view: &mut SyntaxTreeView<'_>) {
    let mut index = 0;
    while index < view.mirror.as_ref().unwrap().items.len() {
        view.expand(ItemId::new(index));
        index += 1;
    }
}

fn find_by_kind(view: &SyntaxTreeView<'_>, kind: &str) -> ItemId {
    let mirror = view.mirror.as_ref().unwrap();
    (0..mirror.items.len())
        .map(ItemId::new)
        .find(|&id| mirror.item(id).kind == kind)
        .unwrap_or_else(|| panic!("no `{kind}` item materialized"))
}

#[test]
fn lazy_display_defers_children() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    let root = view.root().unwrap();
    assert_eq!(view.item(root).state(), ExpansionState::DeferredChildren);
    expect![[r#"
        CompilationUnit@0..50 ...
    "#]]
    .assert_eq(&view.render());
}

#[test]
fn eager_display_materializes_everything() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, false);

    expect![[r#"
        CompilationUnit@0..50
          ClassDeclaration@0..50
            ClassKeyword@0..5
              Trail: WhitespaceTrivia@5..6
            IdentifierToken@6..12
              Trail: WhitespaceTrivia@12..13
            OpenBraceToken@13..14
              Trail: WhitespaceTrivia@14..15
            CloseBraceToken@49..50
              Lead: WhitespaceTrivia@15..19
              Lead: CommentTrivia@19..49
    "#]]
    .assert_eq(&view.render());
}

#[test]
fn lazy_and_eager_mirrors_are_structurally_identical() {
    let tree = class_tree();

    let (mut eager, _events) = SyntaxTreeView::new();
    eager.display_tree(&tree, false);

    let (mut lazy, _events) = SyntaxTreeView::new();
    lazy.display_tree(&tree, true);
    expand_all(&mut lazy);

    assert_eq!(eager.render(), lazy.render());
}

#[test]
fn expansion_is_idempotent() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    let root = view.root().unwrap();
    view.expand(root);
    let once = view.item(root).children().to_vec();
    let count = view.mirror.as_ref().unwrap().items.len();

    view.expand(root);
    assert_eq!(view.item(root).children(), once);
    assert_eq!(view.mirror.as_ref().unwrap().items.len(), count);
}

#[test]
fn children_tile_their_parents_full_span() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, false);

    let mirror = view.mirror.as_ref().unwrap();
    for index in 0..mirror.items.len() {
        let item = mirror.item(ItemId::new(index));
        if item.children().is_empty() {
            continue;
        }
        match item.category() {
            SyntaxCategory::Node => {
                let mut position = item.full_span().start();
                for &child in item.children() {
                    let child = mirror.item(child);
                    assert_eq!(child.full_span().start(), position);
                    position = child.full_span().end();
                }
                assert_eq!(position, item.full_span().end());
            }
            SyntaxCategory::Token => {
                let mut position = item.full_span().start();
                for &child in item.children() {
                    let child = mirror.item(child);
                    if child.trivia_side() == Some(TriviaSide::Trailing)
                        && position == item.span().start()
                    {
                        position = item.span().end();
                    }
                    assert_eq!(child.full_span().start(), position);
                    position = child.full_span().end();
                }
                if position == item.span().start() {
                    position = item.span().end();
                }
                assert_eq!(position, item.full_span().end());
            }
            SyntaxCategory::Trivia => {
                for &child in item.children() {
                    assert_eq!(mirror.item(child).full_span(), item.span());
                }
            }
        }
    }
}

#[test]
fn position_match_is_maximally_specific() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    for position in 0..50u32 {
        let position = TextSize::new(position);
        assert!(view.navigate_to_position(position, &NavigateOptions::default()));

        let matched = view.active_item().unwrap();
        let item = view.item(matched);
        assert!(item.full_span().contains(position));
        for &child in item.children() {
            assert!(!view.item(child).full_span().contains(position));
        }
    }
}

#[test]
fn navigation_reveals_the_match_and_collapses_siblings() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    assert!(view.navigate_to_position(3.into(), &NavigateOptions::default()));
    expect![[r#"
        CompilationUnit@0..50
          ClassDeclaration@0..50
            ClassKeyword@0..5 [selected]
              Trail: WhitespaceTrivia@5..6
            IdentifierToken@6..12 ...
            OpenBraceToken@13..14 ...
            CloseBraceToken@49..50 ...
    "#]]
    .assert_eq(&view.render());

    // Navigating elsewhere moves the selection and collapses the old chain.
    assert!(view.navigate_to_position(6.into(), &NavigateOptions::default()));
    expect![[r#"
        CompilationUnit@0..50
          ClassDeclaration@0..50
            ClassKeyword@0..5 [collapsed]
            IdentifierToken@6..12 [selected]
              Trail: WhitespaceTrivia@12..13
            OpenBraceToken@13..14 ...
            CloseBraceToken@49..50 ...
    "#]]
    .assert_eq(&view.render());
}

#[test]
fn kind_filter_falls_back_to_the_closest_ancestor() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    let options = NavigateOptions { kind: Some("ClassDeclaration"), ..NavigateOptions::default() };
    assert!(view.navigate_to_position(3.into(), &options));
    assert_eq!(view.item(view.active_item().unwrap()).kind(), "ClassDeclaration");

    let options = NavigateOptions { kind: Some("NoSuchKind"), ..NavigateOptions::default() };
    assert!(!view.navigate_to_position(3.into(), &options));
}

#[test]
fn category_filter_falls_back_to_the_owning_token() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    // Position 5 sits in the keyword's trailing space: the deepest
    // containing element is the trivia itself.
    assert!(view.navigate_to_position(5.into(), &NavigateOptions::default()));
    assert_eq!(view.item(view.active_item().unwrap()).kind(), "WhitespaceTrivia");

    // Filtering by category climbs back to the token that owns it.
    let options =
        NavigateOptions { category: Some(SyntaxCategory::Token), ..NavigateOptions::default() };
    assert!(view.navigate_to_position(5.into(), &options));
    assert_eq!(view.item(view.active_item().unwrap()).kind(), "ClassKeyword");
}

#[test]
fn positions_outside_the_tree_do_not_match() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    assert!(!view.navigate_to_position(50.into(), &NavigateOptions::default()));
    assert!(view.active_item().is_none());
}

#[test]
fn exact_span_queries_return_the_item_itself() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, false);

    let item_count = view.mirror.as_ref().unwrap().items.len();
    for index in 0..item_count {
        let id = ItemId::new(index);
        let (kind, span) = {
            let item = view.item(id);
            (item.kind(), item.span())
        };

        let options = NavigateOptions { kind: Some(kind), ..NavigateOptions::default() };
        assert!(view.navigate_to_span(span, &options));
        assert_eq!(view.active_item(), Some(id), "span query for `{kind}` at {span:?}");
    }
}

#[test]
fn span_queries_prefer_exactness_over_depth() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    // CompilationUnit and ClassDeclaration share [0, 50); the shallowest
    // exact match short-circuits before any descent.
    assert!(view.navigate_to_span(range(0, 50), &NavigateOptions::default()));
    assert_eq!(view.item(view.active_item().unwrap()).kind(), "CompilationUnit");

    // A kind filter skips the shallow exact match and finds the deeper one.
    let options = NavigateOptions { kind: Some("ClassDeclaration"), ..NavigateOptions::default() };
    assert!(view.navigate_to_span(range(0, 50), &options));
    assert_eq!(view.item(view.active_item().unwrap()).kind(), "ClassDeclaration");

    // A position query over the same range always descends.
    assert!(view.navigate_to_position(0.into(), &NavigateOptions::default()));
    assert_eq!(view.item(view.active_item().unwrap()).kind(), "ClassKeyword");
}

#[test]
fn span_queries_fall_back_like_position_queries() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    // No element has span [1, 4); the deepest container satisfying the
    // filters wins.
    assert!(view.navigate_to_span(range(1, 4), &NavigateOptions::default()));
    assert_eq!(view.item(view.active_item().unwrap()).kind(), "ClassKeyword");

    assert!(!view.navigate_to_span(range(40, 60), &NavigateOptions::default()));
}

#[test]
fn external_navigation_reports_nothing_outward() {
    let tree = class_tree();
    let (mut view, events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    assert!(view.navigate_to_position(3.into(), &NavigateOptions::default()));
    assert!(view.navigate_to_span(range(0, 50), &NavigateOptions::default()));
    assert!(drain(&events).is_empty());
}

#[test]
fn user_selection_reports_once() {
    let tree = class_tree();
    let (mut view, events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    assert!(view.navigate_to_position(3.into(), &NavigateOptions::default()));
    drain(&events);

    let keyword = find_by_kind(&view, "ClassKeyword");
    view.select(keyword);

    let reported = drain(&events);
    assert_eq!(reported.len(), 1);
    match reported[0] {
        Event::SelectedForNavigation { category, element } => {
            assert_eq!(category, SyntaxCategory::Token);
            assert_eq!(element.kind().as_str(), "ClassKeyword");
        }
        Event::ExportRequested { .. } => panic!("unexpected export request"),
    }

    // The host's caret move calls back in as an external query; the
    // resulting selection must not echo a second report.
    assert!(view.navigate_to_position(0.into(), &NavigateOptions::default()));
    assert!(drain(&events).is_empty());
}

#[test]
fn export_requests_are_gated_and_follow_the_selection() {
    let tree = class_tree();
    let (mut view, events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    assert!(!view.request_export(), "exports start disabled");

    view.set_exports_enabled(true);
    assert!(!view.request_export(), "no selection yet");

    assert!(view.navigate_to_position(6.into(), &NavigateOptions::default()));
    drain(&events);

    assert!(view.request_export());
    let reported = drain(&events);
    assert_eq!(reported.len(), 1);
    match reported[0] {
        Event::ExportRequested { category, element } => {
            assert_eq!(category, SyntaxCategory::Token);
            assert_eq!(element.kind().as_str(), "IdentifierToken");
        }
        Event::SelectedForNavigation { .. } => panic!("unexpected selection report"),
    }
}

#[test]
fn highlight_persists_until_replaced_or_cleared() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    let options = NavigateOptions {
        highlight: true,
        caption: Some("definition"),
        ..NavigateOptions::default()
    };
    assert!(view.navigate_to_position(3.into(), &options));
    assert!(view.render().contains("ClassKeyword@0..5 [selected] [highlight: definition]"));

    // A plain navigation moves the selection but leaves the highlight.
    assert!(view.navigate_to_position(13.into(), &NavigateOptions::default()));
    assert!(view.render().contains("ClassKeyword@0..5 [highlight: definition]"));

    // A new highlight replaces the old one.
    let options = NavigateOptions { highlight: true, ..NavigateOptions::default() };
    assert!(view.navigate_to_position(6.into(), &options));
    let rendered = view.render();
    assert!(rendered.contains("IdentifierToken@6..12 [selected] [highlight]"));
    assert!(!rendered.contains("definition"));

    view.clear_highlight();
    assert!(!view.render().contains("[highlight]"));
}

#[test]
fn display_replaces_the_previous_mirror() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();

    view.display_tree(&tree, true);
    let class_decl = tree.root().children()[0].as_node().unwrap();
    view.display_node(class_decl, true);

    expect![[r#"
        ClassDeclaration@0..50 ...
    "#]]
    .assert_eq(&view.render());

    // An absent element is a no-op, not a replacement.
    view.display_root(None, true);
    assert!(view.render().starts_with("ClassDeclaration"));

    view.clear();
    assert!(view.root().is_none());
    assert_eq!(view.render(), "");
}

#[test]
fn structured_trivia_is_navigable() {
    let tree = directive_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    // Unfiltered, the deepest containing element lives inside the
    // directive's structured subtree.
    assert!(view.navigate_to_position(2.into(), &NavigateOptions::default()));
    assert_eq!(view.item(view.active_item().unwrap()).kind(), "PragmaKeyword");

    let options =
        NavigateOptions { category: Some(SyntaxCategory::Trivia), ..NavigateOptions::default() };
    assert!(view.navigate_to_position(2.into(), &options));
    let matched = view.item(view.active_item().unwrap());
    assert_eq!(matched.kind(), "DirectiveTrivia");
    assert_eq!(matched.category(), SyntaxCategory::Trivia);
    assert_eq!(matched.trivia_side(), Some(TriviaSide::Leading));
}

#[test]
fn diagnostics_surface_as_annotations() {
    let mut b = Builder::new();
    b.start_node("Module");
    b.start_node("ClassDeclaration");
    b.token("ClassKeyword", "class");
    b.diagnostic("identifier expected");
    b.finish_node();
    b.finish_node();
    let tree = b.finish();

    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, false);

    expect![[r#"
        Module@0..5 [diagnostics]
          ClassDeclaration@0..5 [diagnostics]
            ClassKeyword@0..5 [diagnostics]
    "#]]
    .assert_eq(&view.render());

    let keyword = find_by_kind(&view, "ClassKeyword");
    assert_eq!(view.diagnostic_summary(keyword), "identifier expected");
    assert_eq!(view.diagnostic_summary(view.root().unwrap()), "");
}

/// The concrete scenario from the engine's requirements: a root
/// `CompilationUnit` [0, 50) with one `ClassDeclaration` [0, 50) whose
/// `ClassKeyword` has span [0, 5) and full span [0, 6).
#[test]
fn class_keyword_scenario() {
    let tree = class_tree();
    let (mut view, _events) = SyntaxTreeView::new();
    view.display_tree(&tree, true);

    assert!(view.navigate_to_position(3.into(), &NavigateOptions::default()));
    assert_eq!(view.item(view.active_item().unwrap()).kind(), "ClassKeyword");

    // Trivia-inclusive containment: position 5 is past the keyword's span
    // but inside its full span. The token wins under a token filter; the
    // trailing space itself is deeper and wins unfiltered.
    let options =
        NavigateOptions { category: Some(SyntaxCategory::Token), ..NavigateOptions::default() };
    assert!(view.navigate_to_position(5.into(), &options));
    let matched = view.item(view.active_item().unwrap());
    assert_eq!(matched.kind(), "ClassKeyword");
    assert_eq!(matched.span(), range(0, 5));
    assert_eq!(matched.full_span(), range(0, 6));

    let options = NavigateOptions { kind: Some("ClassDeclaration"), ..NavigateOptions::default() };
    assert!(view.navigate_to_position(3.into(), &options));
    assert_eq!(view.item(view.active_item().unwrap()).kind(), "ClassDeclaration");
}
