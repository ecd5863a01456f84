//! End-to-end extraction over the fixtures in `testdata/`

use dor_pointer::get_at_pointer;
use dor_schema::{
    label_edge, outgoing_references, preview_entries, validate_document, ExtractorConfig,
    RelationshipEdge, SchemaPointerExtractor,
};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

fn load(relative: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../testdata")
        .join(relative);
    let contents = fs::read_to_string(&path).expect("read fixture");
    serde_json::from_str(&contents).expect("fixture is JSON")
}

fn dataset() -> (Value, Value) {
    (
        load("objects/dataset.schema.json"),
        load("objects/dataset.json"),
    )
}

#[test]
fn custom_keyword_scenario() {
    let schema = json!({"properties": {"a": {"type": "string", "x-annotate": true}}});
    let document = json!({"a": "hello"});
    let extractor = SchemaPointerExtractor::new(ExtractorConfig::with_keyword("x-annotate")).unwrap();
    let map = extractor.extract(&document, &schema).unwrap();

    assert_eq!(map.len(), 1);
    assert!(std::ptr::eq(
        map.get("/a").unwrap(),
        &schema["properties"]["a"]
    ));
}

#[test]
fn dataset_annotations_are_found() {
    let (schema, document) = dataset();
    let map = SchemaPointerExtractor::default()
        .extract(&document, &schema)
        .unwrap();

    let pointers: Vec<_> = map.sorted().into_iter().map(|(p, _)| p).collect();
    assert_eq!(
        pointers,
        vec![
            "/landingPage",
            "/license",
            "/name",
            "/creators/0/id",
            "/creators/1/id",
        ]
    );
}

#[test]
fn tracked_formats_join_the_map() {
    let (schema, document) = dataset();
    let config = ExtractorConfig::default().track_format("file");
    let map = SchemaPointerExtractor::new(config)
        .unwrap()
        .extract(&document, &schema)
        .unwrap();
    assert_eq!(map.get("/payload").unwrap()["format"], "file");
}

#[test]
fn array_items_under_one_of_resolve() {
    let schema = json!({
        "properties": {
            "array": {
                "type": "array",
                "items": {
                    "oneOf": [
                        {"type": "string", "repository": {"kind": "text"}},
                        {
                            "type": "object",
                            "properties": {
                                "prop": {"type": "string", "repository": {"kind": "prop"}}
                            }
                        }
                    ]
                }
            }
        }
    });
    let document = json!({"array": ["9", {"prop": "10"}]});
    let map = SchemaPointerExtractor::default()
        .extract(&document, &schema)
        .unwrap();

    assert_eq!(map.len(), 2);
    assert_eq!(map.get("/array/0").unwrap()["repository"]["kind"], "text");
    assert_eq!(map.get("/array/1/prop").unwrap()["repository"]["kind"], "prop");
    assert_eq!(get_at_pointer(&document, "/array/0"), Some(&json!("9")));
    assert_eq!(get_at_pointer(&document, "/array/1/prop"), Some(&json!("10")));
}

#[test]
fn preview_of_dataset() {
    let (schema, document) = dataset();
    let map = SchemaPointerExtractor::default()
        .extract(&document, &schema)
        .unwrap();
    let entries = preview_entries(&document, &map, "repository");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].pointer, "/landingPage");
    assert!(entries[0].is_uri);
    assert!(entries[0].exclude_title);
    assert_eq!(entries[1].title, "Name");
    assert!(entries[1].is_primary);
}

#[test]
fn dataset_edges_are_listed_and_labelled() {
    let (schema, document) = dataset();
    let map = SchemaPointerExtractor::default()
        .extract(&document, &schema)
        .unwrap();

    let mut edges = outgoing_references("20.5000/dataset-1", &document, &map, "repository");
    for edge in &mut edges {
        label_edge(edge, &document, &map, "repository");
    }
    let labels: Vec<_> = edges
        .iter()
        .map(|e| (e.json_pointer.as_str(), e.label.as_deref()))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("/license", Some("license")),
            ("/creators/0/id", Some("Grace Hopper")),
            ("/creators/1/id", None),
        ]
    );
}

#[test]
fn stale_edge_is_not_labelled() {
    let (schema, document) = dataset();
    let map = SchemaPointerExtractor::default()
        .extract(&document, &schema)
        .unwrap();
    let mut edge = RelationshipEdge::new("20.5000/dataset-1", "20.5000/someone-else", "/creators/0/id");
    assert!(!label_edge(&mut edge, &document, &map, "repository"));
    assert_eq!(edge.label, None);
}

#[test]
fn parallel_extraction_matches_sequential() {
    let (schema, document) = dataset();
    let editor_schema = load("editor/schema.json");
    let editor_document = load("editor/document.json");
    let extractor = SchemaPointerExtractor::default();

    let pairs = vec![(&document, &schema), (&editor_document, &editor_schema)];
    let results = extractor.extract_many(&pairs);
    assert_eq!(results.len(), 2);
    let sequential = extractor.extract(&document, &schema).unwrap();
    assert_eq!(results[0].as_ref().unwrap(), &sequential);
    assert!(results[1].as_ref().unwrap().is_empty());
}

#[test]
fn dataset_fixture_is_valid_and_broken_copy_is_not() {
    let (schema, mut document) = dataset();
    assert!(validate_document(&schema, &document).unwrap().is_empty());

    document["creators"][0]["id"] = json!("not a handle");
    let issues = validate_document(&schema, &document).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].instance_pointer, "/creators/0/id");
}

#[test]
fn editor_fixture_values_are_addressable() {
    let document = load("editor/document.json");
    let expected = [
        ("/", "1"),
        ("/a'b]<\"p", "2"),
        ("/a][b", "3"),
        ("/a.b", "4"),
        ("/a/b", "5"),
        ("/.//.", "6"),
        ("/././", "7"),
        ("/~0~1", "8"),
        ("/array/0", "9"),
        ("/array/1/prop", "10"),
        ("/textarea", "11"),
        ("/enum", "12"),
    ];
    for (pointer, value) in expected {
        assert_eq!(
            get_at_pointer(&document, pointer),
            Some(&json!(value)),
            "pointer {pointer}"
        );
    }
}
