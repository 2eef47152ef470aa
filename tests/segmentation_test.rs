//! Segmentation model tests.
//!
//! Unit boundaries, cursor movement, and word ranges over small documents.
//! Adjacent text nodes are built with the `ContentTree` helpers because the
//! HTML parser would merge them.

use proptest::prelude::*;
use readaloud::{ContentTree, DomNodeId, NodeStore, ReadAloudModel};

fn parse(html: &str) -> (ContentTree, NodeStore, ReadAloudModel) {
    let mut store = NodeStore::new();
    let tree = ContentTree::parse(html, &mut store).expect("parse");
    let mut model = ReadAloudModel::new();
    model.init(tree.document(), &store, tree.root());
    (tree, store, model)
}

/// A paragraph made of one text node per entry.
fn paragraph(texts: &[&str]) -> (ContentTree, NodeStore, Vec<DomNodeId>) {
    let mut store = NodeStore::new();
    let mut tree = ContentTree::new();
    let p = tree.append_element(&mut store, tree.root(), "p");
    let nodes = texts
        .iter()
        .map(|text| tree.append_text(&mut store, p, text))
        .collect();
    (tree, store, nodes)
}

fn init(tree: &ContentTree, store: &NodeStore) -> ReadAloudModel {
    let mut model = ReadAloudModel::new();
    model.init(tree.document(), store, tree.root());
    model
}

fn assert_text_empty(model: &ReadAloudModel) {
    assert_eq!(model.current_text_content(), "");
    assert!(model.current_text_segments().is_empty());
}

fn units(model: &mut ReadAloudModel) -> Vec<String> {
    let mut out = Vec::new();
    while model.current_unit_range().is_some() {
        out.push(model.current_text_content());
        model.move_speech_forward();
    }
    out
}

/// Expect the segments for `index` as `(node, start, length)` triples.
fn expect_highlight(model: &ReadAloudModel, index: i64, expected: &[(DomNodeId, usize, usize)]) {
    let actual: Vec<_> = model
        .highlight_for_current_segment_index(index, false)
        .iter()
        .map(|s| (s.node.dom_node(), s.start, s.length))
        .collect();
    assert_eq!(actual, expected, "highlight at index {index}");
}

// ============================================================================
// Opening punctuation and citations
// ============================================================================

#[test]
fn test_opening_punctuation_starts_next_unit() {
    let (tree, store, _) = paragraph(&["Run, take cover.", "(I'm gonna come up with a plan.)"]);
    let mut model = init(&tree, &store);

    assert_eq!(model.current_text_content().trim(), "Run, take cover.");
    model.move_speech_forward();
    assert_eq!(
        model.current_text_content().trim(),
        "(I'm gonna come up with a plan.)"
    );
    model.move_speech_forward();
    assert_text_empty(&model);
}

#[test]
fn test_multiple_opening_punctuation() {
    let (tree, store, _) = paragraph(&["Run, take cover.", "[{<(((I'm gonna come up with a plan.)"]);
    let mut model = init(&tree, &store);

    assert_eq!(model.current_text_content().trim(), "Run, take cover.");
    model.move_speech_forward();
    assert_eq!(
        model.current_text_content().trim(),
        "[{<(((I'm gonna come up with a plan.)"
    );
}

#[test]
fn test_bracketed_node_stays_whole() {
    let (_tree, _store, mut model) = parse("<p>And I am almost there.<b>[2]</b></p>");
    assert_eq!(model.current_text_content().trim(), "And I am almost there.");
    model.move_speech_forward();
    assert_eq!(model.current_text_content().trim(), "[2]");
    model.move_speech_forward();
    assert_text_empty(&model);
}

#[test]
fn test_superscript_joins_preceding_unit() {
    let (_tree, _store, mut model) =
        parse("<div><b>And I am almost there.</b><sup>2</sup></div>");
    assert_eq!(model.current_text_content().trim(), "And I am almost there.2");
    model.move_speech_forward();
    assert_text_empty(&model);
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_blocks_split_units() {
    let (_tree, _store, model) = parse(
        "<h3>Vuelo</h3><div>rodar entre nubez <strong>cada vez</strong> más lejos.</div>",
    );
    assert_eq!(model.current_text_content(), "Vuelo\n");
}

#[test]
fn test_inline_elements_join_sentences() {
    let (_tree, _store, mut model) = parse(
        "<a>But there ain't no other way.</a>\
         <div><i>Even though it kills me to say... </i>Run, run brother.</div>",
    );
    assert_eq!(
        model.current_text_content().trim(),
        "But there ain't no other way."
    );
    model.move_speech_forward();
    assert_eq!(
        model.current_text_content().trim(),
        "Even though it kills me to say..."
    );
    model.move_speech_forward();
    assert_eq!(model.current_text_content().trim(), "Run, run brother.");
    model.move_speech_forward();
    assert_text_empty(&model);
}

#[test]
fn test_text_newlines_split_units() {
    let (_tree, _store, mut model) = parse(
        "<b>You'd never get away\n</b><b>with all this in a play\n</b><b>, but if it's loudly sung...</b>",
    );
    assert_eq!(
        units(&mut model)
            .iter()
            .map(|u| u.trim().to_string())
            .collect::<Vec<_>>(),
        vec![
            "You'd never get away",
            "with all this in a play",
            ", but if it's loudly sung...",
        ]
    );
}

#[test]
fn test_whitespace_between_inline_nodes_is_kept() {
    let (_tree, _store, mut model) = parse(
        "<p><a>teen</a><span> </span><a>satirical</a><span> </span><a>crime film</a></p>",
    );
    assert_eq!(model.current_text_content().trim(), "teen satirical crime film");
    model.move_speech_forward();
    assert_text_empty(&model);
}

#[test]
fn test_ordered_list_items() {
    let (_tree, _store, mut model) = parse(
        "<ol><li>Realize numbers are ignored in read aloud.</li><li>Fix it.</li><li>Profit</li></ol>",
    );
    let units: Vec<_> = units(&mut model)
        .iter()
        .map(|u| u.trim().to_string())
        .collect();
    assert_eq!(
        units,
        vec![
            "",
            "1.",
            "Realize numbers are ignored in read aloud.",
            "2.",
            "Fix it.",
            "3.",
            "Profit",
        ]
    );
}

#[test]
fn test_ordered_list_custom_start() {
    let (_tree, _store, mut model) =
        parse("<ol start=\"100\"><li>bugs to fix</li><li>cls to submit</li></ol>");
    assert_eq!(model.current_text_content(), "\n");
    model.move_speech_forward();
    assert_eq!(model.current_text_content().trim(), "100. bugs to fix");
    model.move_speech_forward();
    assert_eq!(model.current_text_content().trim(), "101. cls to submit");
}

#[test]
fn test_ordered_list_custom_values() {
    let (_tree, _store, mut model) = parse(
        "<ol><li value=\"5\">golden rings</li><li value=\"4\">calling birds</li>\
         <li value=\"3\">french hens</li><li value=\"2\">turtle doves</li></ol>",
    );
    let units: Vec<_> = units(&mut model)
        .iter()
        .map(|u| u.trim_end().to_string())
        .collect();
    assert_eq!(
        units,
        vec![
            "",
            "5. golden rings",
            "4. calling birds",
            "3. french hens",
            "2. turtle doves",
        ]
    );
}

// ============================================================================
// Cursor
// ============================================================================

#[test]
fn test_init_called_multiple_times() {
    let (tree, store, mut model) = parse(
        "<div>Keep a grip and take a deep breath. </div>\
         <div><strong>And soon we'll know what's what.  </strong>\
         Put on a show, rewards will flow, and we'll go from there.</div>",
    );
    model.init(tree.document(), &store, tree.root());
    model.init(tree.document(), &store, tree.root());
    assert_eq!(
        model.current_text_content(),
        "Keep a grip and take a deep breath. \n"
    );

    model.init(tree.document(), &store, tree.root());
    model.move_speech_forward();
    assert_eq!(model.current_text_content(), "And soon we'll know what's what.  ");

    model.init(tree.document(), &store, tree.root());
    model.move_speech_forward();
    assert_eq!(
        model.current_text_content(),
        "Put on a show, rewards will flow, and we'll go from there."
    );
}

#[test]
fn test_backwards_walk() {
    let (_tree, _store, mut model) = parse(
        "<div>See the line where the sky meets the sea? </div>\
         <div>It calls me. </div><div>And no one knows how far it goes.</div>",
    );
    let first = "See the line where the sky meets the sea?";
    let second = "It calls me.";
    let third = "And no one knows how far it goes.";

    assert_eq!(model.current_text_content().trim(), first);
    model.move_speech_forward();
    model.move_speech_forward();
    assert_eq!(model.current_text_content().trim(), third);

    model.move_speech_backwards();
    assert_eq!(model.current_text_content().trim(), second);
    model.move_speech_backwards();
    assert_eq!(model.current_text_content().trim(), first);
    model.move_speech_backwards();
    assert_eq!(model.current_text_content().trim(), first);

    model.move_speech_forward();
    assert_eq!(model.current_text_content().trim(), second);
    model.move_speech_forward();
    assert_eq!(model.current_text_content().trim(), third);
    model.move_speech_forward();
    assert_text_empty(&model);
}

#[test]
fn test_backwards_over_split_sentence() {
    let (_tree, _store, mut model) =
        parse("<div><b>And I am almost </b><a>there. </a><b>I am almost there.</b></div>");
    assert_eq!(model.current_text_content(), "And I am almost there. ");

    model.move_speech_forward();
    model.move_speech_backwards();
    assert_eq!(model.current_text_content(), "And I am almost there. ");
    assert_eq!(model.current_text_segments().len(), 2);

    model.move_speech_forward();
    assert_eq!(model.current_text_content(), "I am almost there.");
    assert_eq!(model.current_text_segments().len(), 1);
    model.move_speech_forward();
    assert_text_empty(&model);
}

#[test]
fn test_repeated_reads_are_stable() {
    let (_tree, _store, mut model) = parse(
        "<h1>Run, run brother- you gotta get out while you can.</h1>\
         <div><strong>Run, take cover. I'm gonna come up with a plan</strong>I hate to make you go.</div>",
    );
    for _ in 0..10 {
        assert_eq!(
            model.current_text_content().trim(),
            "Run, run brother- you gotta get out while you can."
        );
    }
    let segments = model.current_text_segments();
    assert_eq!(model.current_text_segments(), segments);

    model.move_speech_forward();
    for _ in 0..10 {
        assert_eq!(model.current_text_content().trim(), "Run, take cover.");
    }
}

#[test]
fn test_deleted_node_is_skipped() {
    let (tree, store, mut model) = parse(
        "<div>You need help </div><div><strong>I can't provide. </strong>I am not qualified. </div>",
    );
    assert_eq!(model.current_text_content(), "You need help \n");

    let div = tree.document().find_by_tag("div").unwrap();
    let text = tree.document().text_leaves(div)[0];
    model.on_node_will_be_deleted(tree.document(), &store, text);
    assert_eq!(model.current_text_content(), "I can't provide. ");
}

const SHORT_LIST: &str =
    "<ol><li>golden rings</li><li>calling birds</li></ol><p>Tail.</p>";

#[test]
fn test_content_update_keeps_list_number() {
    let (tree, store, mut model) = parse(SHORT_LIST);
    assert_eq!(model.current_text_content(), "\n");
    model.on_content_updated(tree.document(), &store, false);
    assert_eq!(model.current_text_content(), "\n");

    model.move_speech_forward();
    assert_eq!(model.current_text_content(), "1. golden rings\n");
    model.on_content_updated(tree.document(), &store, false);
    assert_eq!(model.current_text_content(), "1. golden rings\n");

    model.move_speech_forward();
    model.on_content_updated(tree.document(), &store, false);
    assert_eq!(model.current_text_content(), "2. calling birds\n");

    model.move_speech_backwards();
    assert_eq!(model.current_text_content(), "1. golden rings\n");
    model.move_speech_backwards();
    assert_eq!(model.current_text_content(), "\n");
}

#[test]
fn test_unrelated_deletion_keeps_list_number() {
    let (tree, store, mut model) = parse(SHORT_LIST);
    model.move_speech_forward();
    model.move_speech_forward();
    assert_eq!(model.current_text_content(), "2. calling birds\n");

    let tail = tree.document().find_by_tag("p").unwrap();
    model.on_node_will_be_deleted(tree.document(), &store, tail);
    // Nothing follows the list any more, so its line break goes too.
    assert_eq!(model.current_text_content(), "2. calling birds");

    model.move_speech_backwards();
    assert_eq!(model.current_text_content(), "1. golden rings\n");
    model.move_speech_backwards();
    assert_eq!(model.current_text_content(), "\n");
}

#[test]
fn test_unrelated_deletion_keeps_leading_line_break() {
    let (tree, store, mut model) = parse(SHORT_LIST);
    let tail = tree.document().find_by_tag("p").unwrap();
    model.on_node_will_be_deleted(tree.document(), &store, tail);
    assert_eq!(model.current_text_content(), "\n");

    model.move_speech_forward();
    assert_eq!(model.current_text_content(), "1. golden rings\n");
}

#[test]
fn test_deleting_current_item_moves_to_next_number() {
    let (tree, store, mut model) = parse("<ol><li>golden rings</li><li>calling birds</li></ol>");
    model.move_speech_forward();
    assert_eq!(model.current_text_content(), "1. golden rings\n");

    let first = tree.document().find_by_tag("li").unwrap();
    model.on_node_will_be_deleted(tree.document(), &store, first);
    // The remaining item is renumbered.
    assert_eq!(model.current_text_content(), "1. calling birds");
}

// ============================================================================
// Segments
// ============================================================================

#[test]
fn test_segments_across_nodes() {
    let texts = [
        "and I can't go back, ",
        "But now I'm seeing all the beauty ",
        "in the broken glass.",
    ];
    let (tree, store, nodes) = paragraph(&texts);
    let model = init(&tree, &store);

    let segments: Vec<_> = model
        .current_text_segments()
        .iter()
        .map(|s| (s.node.dom_node(), s.start, s.length))
        .collect();
    let expected: Vec<_> = nodes
        .iter()
        .zip(texts)
        .map(|(&node, text)| (node, 0, text.chars().count()))
        .collect();
    assert_eq!(segments, expected);
}

#[test]
fn test_node_spanning_sentences() {
    let s1 = "The scars are part of me! ";
    let s2 = "Darkness and harmony. ";
    let s3 = "My voice without the lies. ";
    let s4 = "This is what it sounds ";
    let node1_text = format!("{s1}{s2}{s3}{s4}");
    let (tree, store, nodes) = paragraph(&[&node1_text, "like."]);
    let mut model = init(&tree, &store);

    let mut start = 0;
    for sentence in [s1, s2, s3] {
        assert_eq!(model.current_text_content(), sentence);
        let segments = model.current_text_segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].node.dom_node(), nodes[0]);
        assert_eq!((segments[0].start, segments[0].length), (start, sentence.len()));
        start += sentence.len();
        model.move_speech_forward();
    }

    assert_eq!(model.current_text_content(), format!("{s4}like."));
    let segments = model.current_text_segments();
    assert_eq!(segments.len(), 2);
    assert_eq!((segments[0].start, segments[0].length), (start, s4.len()));
    assert_eq!(segments[1].node.dom_node(), nodes[1]);
    assert_eq!((segments[1].start, segments[1].length), (0, 5));
}

// ============================================================================
// Word ranges
// ============================================================================

#[test]
fn test_word_highlight_after_forward() {
    let (tree, store, n) = paragraph(&[
        "Never feel heavy or earthbound. ",
        "No worries or doubts ",
        "interfere.",
    ]);
    let mut model = init(&tree, &store);

    expect_highlight(&model, 0, &[(n[0], 0, 5)]);
    expect_highlight(&model, 7, &[(n[0], 7, 3)]);
    expect_highlight(&model, 31, &[]);
    expect_highlight(&model, 32, &[]);

    model.move_speech_forward();
    assert_eq!(model.current_text_content(), "No worries or doubts interfere.");
    expect_highlight(&model, 0, &[(n[1], 0, 2)]);
    expect_highlight(&model, 7, &[(n[1], 7, 3)]);
    expect_highlight(&model, 21, &[(n[2], 0, 9)]);
    expect_highlight(&model, 22, &[(n[2], 1, 8)]);
    expect_highlight(&model, 27, &[(n[2], 6, 3)]);
    expect_highlight(&model, 30, &[]);
    expect_highlight(&model, 32, &[]);
}

#[test]
fn test_word_highlight_after_backwards() {
    let (tree, store, n) = paragraph(&[
        "There's nothing but you ",
        "looking down on the view from up here. ",
        "Stretch out with the wind behind you.",
    ]);
    let mut model = ReadAloudModel::new();
    expect_highlight(&model, 1, &[]);
    model.init(tree.document(), &store, tree.root());

    model.move_speech_forward();
    expect_highlight(&model, 0, &[(n[2], 0, 7)]);
    expect_highlight(&model, 7, &[(n[2], 7, 4)]);
    expect_highlight(&model, 36, &[]);

    model.move_speech_backwards();
    expect_highlight(&model, 0, &[(n[0], 0, 7)]);
    expect_highlight(&model, 6, &[(n[0], 6, 1)]);
    expect_highlight(&model, 23, &[(n[0], 23, 1), (n[1], 0, 7)]);
    expect_highlight(&model, 25, &[(n[1], 1, 6)]);
    expect_highlight(&model, 27, &[(n[1], 3, 4)]);
    expect_highlight(&model, 62, &[]);
    expect_highlight(&model, 64, &[]);
}

#[test]
fn test_word_split_across_nodes() {
    let (tree, store, n) = paragraph(&["Stretch out with the wind beh", "ind you."]);
    let model = init(&tree, &store);
    assert_eq!(
        model.current_text_content(),
        "Stretch out with the wind behind you."
    );

    expect_highlight(&model, 0, &[(n[0], 0, 7)]);
    expect_highlight(&model, 2, &[(n[0], 2, 5)]);
    expect_highlight(&model, 6, &[(n[0], 6, 1)]);
    expect_highlight(&model, 12, &[(n[0], 12, 4)]);
    expect_highlight(&model, 14, &[(n[0], 14, 2)]);
    expect_highlight(&model, 26, &[(n[0], 26, 3), (n[1], 0, 3)]);
    expect_highlight(&model, 28, &[(n[0], 28, 1), (n[1], 0, 3)]);
    expect_highlight(&model, 29, &[(n[1], 0, 3)]);
    expect_highlight(&model, 31, &[(n[1], 2, 1)]);
    expect_highlight(&model, 33, &[(n[1], 4, 3)]);
    expect_highlight(&model, 35, &[(n[1], 6, 1)]);
    expect_highlight(&model, -5, &[]);
    expect_highlight(&model, 37, &[]);
    expect_highlight(&model, 38, &[]);
}

#[test]
fn test_word_highlight_within_long_node() {
    let s1 = "I'm taking what's mine! ";
    let s2 = "Every drop, every smidge. ";
    let s3 = "If I'm burning a bridge, let it burn. ";
    let s4 = "But I'm crossing the ";
    let node1_text = format!("{s1}{s2}{s3}{s4}");
    let (tree, store, n) = paragraph(&[&node1_text, "line."]);
    let mut model = init(&tree, &store);

    expect_highlight(&model, 0, &[(n[0], 0, 3)]);
    expect_highlight(&model, 6, &[(n[0], 6, 4)]);
    expect_highlight(&model, 15, &[(n[0], 15, 2)]);
    expect_highlight(&model, 23, &[]);

    model.move_speech_forward();
    let base = s1.len();
    expect_highlight(&model, 0, &[(n[0], base, 5)]);
    expect_highlight(&model, 10, &[(n[0], base + 10, 7)]);
    expect_highlight(&model, 13, &[(n[0], base + 13, 4)]);
    expect_highlight(&model, 25, &[]);

    model.move_speech_forward();
    let base = base + s2.len();
    expect_highlight(&model, 0, &[(n[0], base, 2)]);
    expect_highlight(&model, 9, &[(n[0], base + 9, 5)]);
    expect_highlight(&model, 13, &[(n[0], base + 13, 1)]);

    model.move_speech_forward();
    let base = base + s3.len();
    expect_highlight(&model, 0, &[(n[0], base, 3)]);
    expect_highlight(&model, 8, &[(n[0], base + 8, 8)]);
    expect_highlight(&model, 20, &[(n[0], base + 20, 1), (n[1], 0, 4)]);
    expect_highlight(&model, 21, &[(n[1], 0, 4)]);
    expect_highlight(&model, 23, &[(n[1], 2, 2)]);
    expect_highlight(&model, 24, &[(n[1], 3, 1)]);
    expect_highlight(&model, 25, &[]);
    expect_highlight(&model, 26, &[]);
}

#[test]
fn test_phrase_highlight_segments() {
    let (tree, store, n) = paragraph(&["It might sound cheesy, ", "but I wanted her to stay."]);
    let model = init(&tree, &store);

    let segments = model.highlight_for_current_segment_index(0, true);
    assert_eq!(segments.len(), 1);
    assert_eq!((segments[0].node.dom_node(), segments[0].length), (n[0], 21));

    let segments = model.highlight_for_current_segment_index(21, true);
    assert_eq!(
        segments
            .iter()
            .map(|s| (s.node.dom_node(), s.start, s.length))
            .collect::<Vec<_>>(),
        vec![(n[0], 21, 2), (n[1], 0, 24)]
    );
}

// ============================================================================
// Properties
// ============================================================================

fn sentence() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,8}", 1..6).prop_map(|words| {
        let mut s = words.join(" ");
        s[..1].make_ascii_uppercase();
        s.push('.');
        s
    })
}

proptest! {
    #[test]
    fn prop_units_reassemble_text(
        paragraphs in prop::collection::vec(prop::collection::vec(sentence(), 1..4), 1..5)
    ) {
        let html: String = paragraphs
            .iter()
            .map(|p| format!("<p>{}</p>", p.join(" ")))
            .collect();
        let (tree, _store, mut model) = parse(&html);

        let forward = units(&mut model);
        let joined: String = forward.concat().replace('\n', "");
        prop_assert_eq!(joined, tree.document().text_content(tree.root()));

        // Walking back from the end visits the same units in reverse.
        let mut backward = Vec::new();
        for _ in 0..forward.len() {
            model.move_speech_backwards();
            backward.push(model.current_text_content());
        }
        backward.reverse();
        prop_assert_eq!(backward, forward);
    }
}
