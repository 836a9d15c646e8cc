//! Parsers for declaration sources.
//!
//! Each parser normalizes an external source format into declaration records
//! suitable for the shared formatter.

pub mod doxygen_html;
pub mod lua_enums;

pub use doxygen_html::{
    DoxygenHtmlParser,
    DoxygenParseOptions,
    DoxygenParseOutput,
    RowScanner,
};
pub use lua_enums::{
    LuaEnumParseError,
    LuaEnumParseOptions,
    LuaEnumParseOutput,
    LuaEnumParser,
};
