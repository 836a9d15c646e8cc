use std::path::PathBuf;

use declgen_core::format::{ConcatSink, DeclarationFormatter};
use declgen_core::parsers::{
    DoxygenHtmlParser,
    DoxygenParseOptions,
    LuaEnumParseOptions,
    LuaEnumParser,
};
use declgen_store::models::DeclarationRecord;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path).unwrap_or_else(|err| {
        let path_display = path.display();
        panic!("failed to read fixture at {path_display}: {err}")
    })
}

fn member_pairs(record: &DeclarationRecord) -> Vec<(&str, &str)> {
    record
        .members
        .iter()
        .map(|entry| (entry.name.as_str(), entry.raw_value.as_str()))
        .collect()
}

#[test]
fn enum_listing_round_trip() {
    let source = "Color = {\n  RED = 1,\n  BLUE = 2<<3,\n}\n";
    let parsed = LuaEnumParser::parse(source, &LuaEnumParseOptions::new());

    assert_eq!(
        DeclarationFormatter::render_all(&parsed.records),
        "declare enum Color {\n  RED = 1,\n  BLUE = 2 << 3,\n}\n"
    );
}

#[test]
fn enum_listing_fixture_produces_one_record_per_table() {
    let source = load_fixture("enums.lua");
    let parsed = LuaEnumParser::parse(&source, &LuaEnumParseOptions::new());

    let names: Vec<_> = parsed.records.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names, ["EntityType", "EntityFlag", "RoomShape", "ButtonAction"]);
    assert_eq!(
        member_pairs(&parsed.records[0]),
        [
            ("ENTITY_NULL", "0"),
            ("ENTITY_PLAYER", "1"),
            ("ENTITY_TEAR", "2"),
            ("ENTITY_FAMILIAR", "3"),
        ]
    );
    assert_eq!(
        member_pairs(&parsed.records[1]),
        [
            ("FLAG_NO_STATUS_EFFECTS", "1 << 0"),
            ("FLAG_NO_INTERPOLATE", "1 << 1"),
            ("FLAG_APPEAR", "1 << 2"),
        ]
    );
    assert!(parsed.records[2].is_empty());
    assert_eq!(parsed.records[3].member_count(), 3);
    assert_eq!(parsed.skipped.len(), 1);
    assert_eq!(parsed.skipped[0].text.trim(), "[2] = \"unused\",");
}

#[test]
fn enum_listing_fixture_renders_blank_line_between_blocks() {
    let source = load_fixture("enums.lua");
    let parsed = LuaEnumParser::parse(&source, &LuaEnumParseOptions::new());
    let rendered = DeclarationFormatter::render_all(&parsed.records);

    assert!(rendered.contains("  ENTITY_FAMILIAR = 3,\n}\n\ndeclare enum EntityFlag {\n"));
    assert!(rendered.contains("declare enum RoomShape {\n}\n\ndeclare enum ButtonAction {\n"));
    assert!(rendered.ends_with("  NUM_BUTTON_ACTIONS = 2,\n}\n"));
    assert_eq!(rendered.matches("declare enum ").count(), parsed.records.len());
}

#[test]
fn doxygen_fixture_scans_member_rows() {
    let markup = load_fixture("class_game.html");
    let parsed = DoxygenHtmlParser::parse(&markup, &DoxygenParseOptions::new());

    assert_eq!(parsed.rows_seen, 3);
    assert_eq!(parsed.records.len(), 3);

    let max_players = &parsed.records[0];
    assert_eq!(max_players.kind, "const");
    assert_eq!(max_players.name, "MAX_PLAYERS");
    assert_eq!(member_pairs(max_players), [("MAX_PLAYERS", "4")]);

    let palette = &parsed.records[1];
    assert_eq!(palette.kind, "static");
    assert_eq!(palette.name, "Palette");
    assert_eq!(
        member_pairs(palette),
        [("Default", "0"), ("Red", "1 << 0"), ("Blue", "1 << 1")]
    );

    let get_room = &parsed.records[2];
    assert_eq!(get_room.kind, "Room");
    assert_eq!(get_room.name, "GetRoom");
    assert!(get_room.is_empty());
}

#[test]
fn doxygen_blocks_can_stream_into_any_sink() {
    let markup = load_fixture("class_game.html");
    let options = DoxygenParseOptions::new();
    let mut sink = ConcatSink::new();
    DoxygenHtmlParser::scan(&markup, &options, |record| {
        DeclarationFormatter::write_all([&record], &mut sink);
    });

    assert_eq!(sink.blocks(), 3);
    let rendered = sink.finish();
    assert!(rendered.starts_with("declare const MAX_PLAYERS {\n  MAX_PLAYERS = 4,\n}\n\n"));
    assert!(rendered.ends_with("declare Room GetRoom {\n}\n"));
}
