//! Integration tests for editor crate

use blockmail_editor::{
    ContainerRef, DocumentHandle, DragPayload, DropZone, EditorConfig, EditorState,
    FragmentRecord, ItemBounds, MutationOutcome,
};
use blockmail_model::{
    validate_tree, Block, BlockId, BlockKind, BlockType, ColumnId, Document, IdGenerator, Variant,
};
use serde_json::json;

fn session(document: Document) -> EditorState {
    EditorState::with_ids(document, EditorConfig::default(), IdGenerator::with_prefix("it"))
}

fn selected(state: &EditorState) -> BlockId {
    state.selection().cloned().expect("a block should be selected")
}

fn column_ids(state: &EditorState, structure: &BlockId) -> Vec<ColumnId> {
    blockmail_editor::find_block(&state.blocks().blocks, structure)
        .and_then(Block::columns)
        .map(|columns| columns.iter().map(|c| c.id.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_two_column_structure_end_to_end() {
    let mut state = session(Document::default());

    state
        .insert(
            BlockType::Structure,
            Some(Variant::parse("2-2")),
            ContainerRef::Root,
            None,
        )
        .unwrap();
    let structure = selected(&state);
    let columns = column_ids(&state, &structure);
    assert_eq!(columns.len(), 2);

    state
        .insert(BlockType::Text, None, ContainerRef::Column(columns[0].clone()), None)
        .unwrap();
    let text = selected(&state);
    state
        .update_field(&text, "content", json!("Left side"))
        .unwrap();

    state
        .insert(BlockType::Button, None, ContainerRef::Column(columns[1].clone()), None)
        .unwrap();
    let button = selected(&state);
    state
        .update_field(&button, "label", json!("Right side"))
        .unwrap();

    let html = state.preview_html();
    println!("Generated HTML:\n{}", html);

    assert!(html.contains("class=\"bm-structure\""));
    assert_eq!(html.matches("max-width: 50%;").count(), 2);
    let left = html.find("Left side").expect("text rendered");
    let right = html.find("Right side").expect("button rendered");
    assert!(left < right);
    assert!(validate_tree(state.blocks()).is_empty());
}

#[test]
fn test_detach_fragment_expands_in_place() {
    let cached = vec![
        Block::new(BlockId::from("c1"), BlockKind::Text { content: "one".to_string() }),
        Block::new(BlockId::from("c2"), BlockKind::Divider),
        Block::new(BlockId::from("c3"), BlockKind::Text { content: "three".to_string() }),
    ];
    let document: Document = serde_json::from_value(json!({
        "blocks": [
            { "id": "a", "type": "text", "content": "before" },
            {
                "id": "f",
                "type": "fragment",
                "fragmentId": "footer",
                "fragmentBlocks": cached,
                "fragmentLocked": true
            },
            { "id": "b", "type": "text", "content": "after" }
        ]
    }))
    .unwrap();

    let mut state = session(document);
    let outcome = state.detach_fragment(&BlockId::from("f")).unwrap();

    let blocks = &state.blocks().blocks;
    assert_eq!(blocks.len(), 5);
    assert_eq!(blocks[0].id, BlockId::from("a"));
    assert_eq!(blocks[4].id, BlockId::from("b"));
    assert_eq!(blocks[2].kind, BlockKind::Divider);

    for block in &blocks[1..4] {
        assert!(!["c1", "c2", "c3", "f"].contains(&block.id.as_str()));
    }
    assert_eq!(
        outcome,
        MutationOutcome::Applied {
            selection: Some(blocks[1].id.clone())
        }
    );
    assert_eq!(state.selection(), Some(&blocks[1].id));
}

#[test]
fn test_drop_new_block_uses_pointer_index() {
    let mut state = session(Document::default());
    for _ in 0..2 {
        state
            .insert(BlockType::Divider, None, ContainerRef::Root, None)
            .unwrap();
    }

    let zone = DropZone::new(
        ContainerRef::Root,
        60.0,
        vec![ItemBounds::new(0.0, 50.0), ItemBounds::new(50.0, 50.0)],
    );
    state
        .handle_drop(
            &zone,
            DragPayload::New {
                block_type: BlockType::Text,
                variant: None,
            },
        )
        .unwrap();

    let types: Vec<_> = state.blocks().iter().map(|b| b.type_name()).collect();
    assert_eq!(types, vec!["divider", "text", "divider"]);
}

#[test]
fn test_drop_move_within_container() {
    let document: Document = serde_json::from_value(json!({
        "blocks": [
            { "id": "a", "type": "divider" },
            { "id": "b", "type": "divider" },
            { "id": "c", "type": "divider" }
        ]
    }))
    .unwrap();
    let mut state = session(document);

    // Pointer below every item: append slot 3, which is 2 after removing "a"
    let zone = DropZone::new(
        ContainerRef::Root,
        1000.0,
        vec![
            ItemBounds::new(0.0, 10.0),
            ItemBounds::new(10.0, 10.0),
            ItemBounds::new(20.0, 10.0),
        ],
    );
    state
        .handle_drop(&zone, DragPayload::Move { block_id: BlockId::from("a") })
        .unwrap();

    let ids: Vec<_> = state.blocks().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
}

#[test]
fn test_structure_dropped_on_column_becomes_sibling() {
    let mut state = session(Document::default());
    state
        .insert(BlockType::Structure, Some(Variant::parse("1-1")), ContainerRef::Root, None)
        .unwrap();
    let outer = selected(&state);
    let column = column_ids(&state, &outer).remove(0);

    let zone = DropZone::new(ContainerRef::Column(column), 20.0, vec![])
        .with_owner(ItemBounds::new(0.0, 200.0));
    state
        .handle_drop(
            &zone,
            DragPayload::New {
                block_type: BlockType::Structure,
                variant: Some(Variant::parse("3-3")),
            },
        )
        .unwrap();

    let blocks = &state.blocks().blocks;
    assert_eq!(blocks.len(), 2);
    assert!(blocks.iter().all(Block::is_structure));
    assert_eq!(blocks[1].id, outer);
    assert!(validate_tree(state.blocks()).is_empty());
}

#[test]
fn test_moving_container_with_structure_into_column_keeps_it_top_level() {
    let document = Document::from_json(
        &json!({
            "blocks": [
                { "id": "s", "type": "structure", "variant": "1-1", "columns": [
                    { "id": "c", "blocks": [] }
                ]},
                { "id": "k", "type": "container", "columns": [
                    { "id": "ck", "blocks": [
                        { "id": "inner", "type": "structure", "variant": "1-1", "columns": [
                            { "id": "ic", "blocks": [] }
                        ]}
                    ]}
                ]}
            ]
        })
        .to_string(),
    )
    .unwrap();
    let mut state = session(document);

    let zone = DropZone::new(ContainerRef::Column(ColumnId::from("c")), 150.0, vec![])
        .with_owner(ItemBounds::new(0.0, 200.0));
    let outcome = state
        .handle_drop(&zone, DragPayload::Move { block_id: BlockId::from("k") })
        .unwrap();

    assert!(matches!(outcome, MutationOutcome::Applied { .. }));
    assert!(validate_tree(state.blocks()).is_empty());
    let ids: Vec<_> = state.blocks().blocks.iter().map(|b| b.id.clone()).collect();
    assert_eq!(ids, vec![BlockId::from("s"), BlockId::from("k")]);
}

#[test]
fn test_asset_drop_on_image_and_on_canvas() {
    let mut state = session(Document::default());
    state
        .insert(BlockType::Image, None, ContainerRef::Root, None)
        .unwrap();
    let image = selected(&state);

    let over_image = DropZone::new(ContainerRef::Root, 0.0, vec![]).over(image.clone());
    state
        .handle_drop(
            &over_image,
            DragPayload::Asset {
                url: "https://cdn.test/hero.png".to_string(),
            },
        )
        .unwrap();
    assert_eq!(state.blocks().len(), 1);
    assert!(matches!(
        &state.blocks().blocks[0].kind,
        BlockKind::Image { src, .. } if src == "https://cdn.test/hero.png"
    ));

    let canvas = DropZone::new(ContainerRef::Root, 999.0, vec![ItemBounds::new(0.0, 10.0)]);
    state
        .handle_drop(
            &canvas,
            DragPayload::Asset {
                url: "https://cdn.test/second.png".to_string(),
            },
        )
        .unwrap();
    assert_eq!(state.blocks().len(), 2);
    assert!(state.preview_html().contains("https://cdn.test/second.png"));
}

#[test]
fn test_fragment_drop_from_library() {
    let mut state = session(Document::default());
    state.register_fragment(FragmentRecord {
        id: "footer".to_string(),
        name: "Footer".to_string(),
        version: 2,
        blocks: vec![Block::new(BlockId::from("x"), BlockKind::Divider)],
        html: Some("<footer>Legal</footer>".to_string()),
    });

    let zone = DropZone::new(ContainerRef::Root, 0.0, vec![]);
    let outcome = state
        .handle_drop(&zone, DragPayload::Fragment { fragment_id: "footer".to_string() })
        .unwrap();
    assert!(outcome.is_applied());
    assert!(state.preview_html().contains("<footer>Legal</footer>"));

    let outcome = state
        .handle_drop(&zone, DragPayload::Fragment { fragment_id: "missing".to_string() })
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Noop);
    assert_eq!(state.blocks().len(), 1);
}

#[test]
fn test_commit_after_delete_is_silent() {
    let mut state = session(Document::default());
    state
        .insert(BlockType::Text, None, ContainerRef::Root, None)
        .unwrap();
    let id = selected(&state);
    state.delete(&id).unwrap();

    let history = state.history().len();
    let outcome = state.update_field(&id, "content", json!("late")).unwrap();
    assert_eq!(outcome, MutationOutcome::Noop);
    assert_eq!(state.history().len(), history);
}

#[test]
fn test_document_lifecycle() {
    let source = r##"{
        "blocks": [
            { "id": "t", "type": "text", "content": "Hello {{contacts.first_name}}" },
            { "id": "o", "type": "offer", "decisionId": 5, "placementId": 9, "offerFallbackHtml": "<p>Later</p>" }
        ],
        "bodyStyle": { "backgroundColor": "#fafafa" }
    }"##;

    let mut handle = DocumentHandle::from_json(source).unwrap();
    let mut state = session(handle.document().clone());
    state.duplicate(&BlockId::from("t")).unwrap();

    handle.replace(state.to_document());
    assert_eq!(handle.version, 1);

    let json = handle.to_json().unwrap();
    let reloaded = DocumentHandle::from_json(&json).unwrap();
    assert_eq!(reloaded.document(), handle.document());
    assert_eq!(reloaded.document().blocks.len(), 3);
    assert!(state
        .export_html()
        .contains("<!-- OFFER_BLOCK:decision=5&placement=9 --><p>Later</p><!-- /OFFER_BLOCK -->"));
}
