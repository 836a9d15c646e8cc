pub const KIND_ENUM: &str = "enum";

pub const SOURCE_KIND_LUA_ENUMS: &str = "lua_enums";
pub const SOURCE_KIND_DOXYGEN_HTML: &str = "doxygen_html";

pub const DEFAULT_PAGE_EXTENSION: &str = "html";
/// Documentation page listing enumerations; enums come from the Lua listing instead.
pub const ENUM_LISTING_PAGE: &str = "group__enums.html";

pub const ROW_CLASS_PREFIX: &str = "memitem:";
pub const LEFT_CELL_CLASS: &str = "memItemLeft";
pub const RIGHT_CELL_CLASS: &str = "memItemRight";

/// Returns true when `value` is a bare identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}
