//! Block model of the shared Python tool-definition file.
//!
//! The file is split into top-level blocks (a block starts at every
//! unindented line outside brackets and strings, decorators stay with the
//! function they decorate). Blocks are classified as tool definitions, the
//! registration function, or opaque text. Rendering concatenates the blocks,
//! so an unmodified catalog renders back to the exact input.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static TOOL_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@tool\s+(?:async\s+)?def\s+(\w+)\s*\(").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static ANY_REGISTRATION_FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:async\s+)?def\s+register_\w+_tools\s*\(").expect("constant regex pattern is valid")
});

/// Marker comment placed after generated registration entries.
pub const GENERATED_ENTRY_COMMENT: &str = "# Auto-generated tool";

/// Why a tool could not be added to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("tools file not found at {0:?}")]
    MissingFile(PathBuf),

    #[error("Failed to read tools file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write tools file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not find {0} function")]
    RegistrationFunctionNotFound(String),

    #[error("Could not find {0} call")]
    RegistrationCallNotFound(String),

    #[error("Could not find end of {0} list")]
    UnterminatedList(String),

    #[error("'{0}' is not a valid Python identifier")]
    InvalidToolName(String),

    #[error("Template file not found: {0}")]
    TemplateNotFound(String),
}

/// How the registration function and its list call are spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSyntax {
    /// Exact function name. `None` accepts any `register_<x>_tools`.
    pub function: Option<String>,

    /// Call inside the function receiving the tool list.
    pub call: String,
}

impl Default for RegistrationSyntax {
    fn default() -> Self {
        Self {
            function: None,
            call: "register_usecase_tools".to_string(),
        }
    }
}

impl RegistrationSyntax {
    fn function_label(&self) -> String {
        match &self.function {
            Some(name) => name.clone(),
            None => "register_<name>_tools".to_string(),
        }
    }

    fn matches_function(&self, block: &str) -> bool {
        match &self.function {
            Some(name) => {
                let pattern = format!(r"^(?:async\s+)?def\s+{}\s*\(", regex::escape(name));
                Regex::new(&pattern)
                    .map(|re| re.is_match(block))
                    .unwrap_or(false)
            }
            None => ANY_REGISTRATION_FN.is_match(block),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Text(String),
    Tool { name: String, text: String },
    Registration(RegistrationBlock),
}

impl Block {
    fn text(&self) -> &str {
        match self {
            Block::Text(text) | Block::Tool { text, .. } => text,
            Block::Registration(registration) => &registration.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RegistrationBlock {
    text: String,
    list: Result<ListSpan, ListProblem>,
}

/// Byte offsets of a registration list inside its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListSpan {
    /// Just past the opening `[`.
    body_start: usize,
    /// The closing `]`.
    body_end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListProblem {
    CallNotFound,
    Unterminated,
}

impl RegistrationBlock {
    fn new(text: String, syntax: &RegistrationSyntax) -> Self {
        let list = locate_list(&text, &syntax.call);
        Self { text, list }
    }

    /// Indentation of the line holding the opening `[`.
    fn bracket_indent(&self, span: ListSpan) -> String {
        let head = &self.text[..span.body_start];
        let line = head.rsplit('\n').next().unwrap_or(head);
        leading_whitespace(line).to_string()
    }

    fn append_entry(&mut self, name: &str, syntax: &RegistrationSyntax) -> Result<(), CatalogError> {
        let span = match self.list {
            Ok(span) => span,
            Err(ListProblem::CallNotFound) => {
                return Err(CatalogError::RegistrationCallNotFound(syntax.call.clone()))
            }
            Err(ListProblem::Unterminated) => {
                return Err(CatalogError::UnterminatedList(syntax.call.clone()))
            }
        };

        let bracket_indent = self.bracket_indent(span);
        let body = &self.text[span.body_start..span.body_end];
        let new_body = append_list_entry(body, name, &bracket_indent);

        let mut text = String::with_capacity(self.text.len() + new_body.len());
        text.push_str(&self.text[..span.body_start]);
        text.push_str(&new_body);
        text.push_str(&self.text[span.body_end..]);
        *self = RegistrationBlock::new(text, syntax);
        Ok(())
    }
}

/// The parsed tool file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCatalog {
    blocks: Vec<Block>,
    syntax: RegistrationSyntax,
}

impl ToolCatalog {
    pub fn parse(source: &str, syntax: RegistrationSyntax) -> Self {
        let mut registration_seen = false;
        let blocks = split_blocks(source)
            .into_iter()
            .map(|text| {
                if let Some(caps) = TOOL_DEF.captures(&text) {
                    let name = caps[1].to_string();
                    return Block::Tool { name, text };
                }
                if !registration_seen && syntax.matches_function(&text) {
                    registration_seen = true;
                    return Block::Registration(RegistrationBlock::new(text, &syntax));
                }
                Block::Text(text)
            })
            .collect();
        Self { blocks, syntax }
    }

    pub fn render(&self) -> String {
        self.blocks.iter().map(Block::text).collect()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tool_names().any(|existing| existing == name)
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Tool { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    fn registration_index(&self) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| matches!(block, Block::Registration(_)))
    }

    /// Insert `code` as a new tool block and register `name`.
    ///
    /// The block goes right after the last tool preceding the registration
    /// function, or directly before that function. The catalog is unchanged
    /// when an error is returned.
    pub fn add_tool(&mut self, name: &str, code: &str) -> Result<(), CatalogError> {
        if !super::naming::is_python_identifier(name) {
            return Err(CatalogError::InvalidToolName(name.to_string()));
        }
        let registration_at = self.registration_index().ok_or_else(|| {
            CatalogError::RegistrationFunctionNotFound(self.syntax.function_label())
        })?;

        let mut registration = match &self.blocks[registration_at] {
            Block::Registration(block) => block.clone(),
            _ => return Err(CatalogError::RegistrationFunctionNotFound(self.syntax.function_label())),
        };
        registration.append_entry(name, &self.syntax)?;
        self.blocks[registration_at] = Block::Registration(registration);

        let insert_at = self.blocks[..registration_at]
            .iter()
            .rposition(|block| matches!(block, Block::Tool { .. }))
            .map_or(registration_at, |last_tool| last_tool + 1);

        let mut text = String::new();
        if let Some(previous) = insert_at.checked_sub(1).map(|i| self.blocks[i].text()) {
            if !previous.is_empty() && !previous.ends_with('\n') {
                text.push('\n');
            }
        }
        text.push_str(code);
        self.blocks.insert(
            insert_at,
            Block::Tool {
                name: name.to_string(),
                text,
            },
        );
        Ok(())
    }
}

/// Registration list body with `name` appended on its own line.
fn append_list_entry(body: &str, name: &str, bracket_indent: &str) -> String {
    let entry = format!("{name},  {GENERATED_ENTRY_COMMENT}");
    let lines: Vec<&str> = body.split_inclusive('\n').collect();

    let last_code = lines
        .iter()
        .rposition(|line| !split_comment(line).0.trim().is_empty());

    let mut out = String::with_capacity(body.len() + entry.len() + 16);
    match last_code {
        Some(index) => {
            let anchor = lines[index];
            let indent = if index == 0 {
                format!("{bracket_indent}    ")
            } else {
                leading_whitespace(anchor).to_string()
            };

            for line in &lines[..index] {
                out.push_str(line);
            }
            out.push_str(&with_trailing_comma(anchor));
            if !anchor.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&indent);
            out.push_str(&entry);
            out.push('\n');

            let rest: String = lines[index + 1..].concat();
            if index + 1 == lines.len() {
                out.push_str(bracket_indent);
            } else {
                out.push_str(&rest);
            }
        }
        None => {
            // Empty list, or only comments.
            let complete = lines.iter().rposition(|line| line.ends_with('\n'));
            match complete {
                Some(index) if index > 0 || lines[0].trim_start().starts_with('#') => {
                    let indent = if index == 0 {
                        format!("{bracket_indent}    ")
                    } else {
                        leading_whitespace(lines[index]).to_string()
                    };
                    for line in &lines[..=index] {
                        out.push_str(line);
                    }
                    out.push_str(&indent);
                    out.push_str(&entry);
                    out.push('\n');
                    out.push_str(&lines[index + 1..].concat());
                }
                _ => {
                    out.push_str(body.trim_end_matches([' ', '\t']));
                    if !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(bracket_indent);
                    out.push_str("    ");
                    out.push_str(&entry);
                    out.push('\n');
                    out.push_str(bracket_indent);
                }
            }
        }
    }
    out
}

/// `line` with a comma after its code part, if it does not end in one.
fn with_trailing_comma(line: &str) -> String {
    let (code, comment) = split_comment(line);
    let trimmed = code.trim_end();
    if trimmed.ends_with(',') {
        return line.to_string();
    }
    let gap = &code[trimmed.len()..];
    format!("{trimmed},{gap}{comment}")
}

/// Split a single line into code and `#` comment (including the newline, if any).
fn split_comment(line: &str) -> (&str, &str) {
    let kinds = lex(line);
    match kinds.iter().position(|kind| *kind == Lex::Comment) {
        Some(at) => line.split_at(at),
        None => {
            let without_newline = line.trim_end_matches('\n');
            line.split_at(without_newline.len())
        }
    }
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// Lexical class of one byte of Python source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    Comment,
    Str,
}

/// Classify every byte of `source`. Handles single, double and triple
/// quoted strings with backslash escapes; an unterminated single-line string
/// ends at the newline.
fn lex(source: &str) -> Vec<Lex> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut kinds = vec![Lex::Code; len];
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'#' => {
                while i < len && bytes[i] != b'\n' {
                    kinds[i] = Lex::Comment;
                    i += 1;
                }
            }
            quote @ (b'\'' | b'"') => {
                let triple = bytes[i..].starts_with(&[quote, quote, quote]);
                let width = if triple { 3 } else { 1 };
                let start = i;
                i += width;
                loop {
                    if i >= len {
                        break;
                    }
                    if bytes[i] == b'\\' {
                        i = (i + 2).min(len);
                        continue;
                    }
                    if triple && bytes[i..].starts_with(&[quote, quote, quote]) {
                        i += 3;
                        break;
                    }
                    if !triple && bytes[i] == quote {
                        i += 1;
                        break;
                    }
                    if !triple && bytes[i] == b'\n' {
                        break;
                    }
                    i += 1;
                }
                for kind in &mut kinds[start..i] {
                    *kind = Lex::Str;
                }
            }
            _ => i += 1,
        }
    }
    kinds
}

/// Split `source` at top-level statement starts.
fn split_blocks(source: &str) -> Vec<String> {
    let bytes = source.as_bytes();
    let kinds = lex(source);
    let mut blocks = Vec::new();
    let mut block_start = 0;
    let mut depth: usize = 0;
    let mut after_decorator = false;
    let mut line_start = 0;

    while line_start < bytes.len() {
        let line_end = source[line_start..]
            .find('\n')
            .map_or(bytes.len(), |offset| line_start + offset + 1);

        let first = bytes[line_start];
        let top_level = depth == 0
            && kinds[line_start] != Lex::Str
            && !first.is_ascii_whitespace();

        if top_level {
            if line_start > block_start && !after_decorator {
                blocks.push(source[block_start..line_start].to_string());
                block_start = line_start;
            }
            after_decorator = first == b'@';
        }

        for index in line_start..line_end {
            if kinds[index] != Lex::Code {
                continue;
            }
            match bytes[index] {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        line_start = line_end;
    }

    if block_start < bytes.len() {
        blocks.push(source[block_start..].to_string());
    }
    blocks
}

/// Find the list passed to `call(` inside a registration block.
fn locate_list(text: &str, call: &str) -> Result<ListSpan, ListProblem> {
    let pattern = format!(r"\b{}\s*\(\s*\[", regex::escape(call));
    let Ok(re) = Regex::new(&pattern) else {
        return Err(ListProblem::CallNotFound);
    };
    let kinds = lex(text);
    let found = re
        .find_iter(text)
        .find(|m| kinds[m.start()] == Lex::Code)
        .ok_or(ListProblem::CallNotFound)?;

    let body_start = found.end();
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    for index in body_start..bytes.len() {
        if kinds[index] != Lex::Code {
            continue;
        }
        match bytes[index] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth -= 1;
                if depth == 0 {
                    return if bytes[index] == b']' {
                        Ok(ListSpan {
                            body_start,
                            body_end: index,
                        })
                    } else {
                        Err(ListProblem::Unterminated)
                    };
                }
            }
            _ => {}
        }
    }
    Err(ListProblem::Unterminated)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUB: &str = "# --- Auto-generated tool: get_time ---\n\n@tool\ndef get_time(runtime) -> str:\n    return \"ok\"\n\n\n";

    const TOOLS_PY: &str = r#""""Concierge tools."""

from dynagent import tool


@tool
def tell_joke(runtime: ToolRuntime[None, Dynagent]) -> str:
    """Tell a joke.

    def not_a_tool(x):
    """
    return "joke"


@tool
def get_weather(
    runtime: ToolRuntime[None, Dynagent],
    city: str,
) -> str:
    data = {
"city": city,
    }
    return f"{data}"


# --- Registration entry-point (called once at app startup) ---


def register_concierge_tools() -> None:
    """Register all Concierge tools."""
    from dynagent import register_usecase_tools

    register_usecase_tools(
        [
            tell_joke,
            # Weather
            get_weather
        ]
    )
"#;

    fn catalog(source: &str) -> ToolCatalog {
        ToolCatalog::parse(source, RegistrationSyntax::default())
    }

    #[test]
    fn test_parse_render_is_lossless() {
        for source in [TOOLS_PY, "", "x = 1", "\n\n", "def f(\n):\n  pass", "s = '''\nunterminated"] {
            assert_eq!(catalog(source).render(), source);
        }
    }

    #[test]
    fn test_parse_finds_top_level_tools() {
        let catalog = catalog(TOOLS_PY);
        let names: Vec<&str> = catalog.tool_names().collect();
        assert_eq!(names, ["tell_joke", "get_weather"]);
        assert!(!catalog.has_tool("not_a_tool"), "docstring text is not a definition");
    }

    #[test]
    fn test_add_tool_inserts_after_last_tool_and_registers() {
        let mut catalog = catalog(TOOLS_PY);
        catalog.add_tool("get_time", STUB).expect("add_tool");
        let rendered = catalog.render();

        let weather_tail = "return f\"{data}\"\n\n\n";
        let weather_end = rendered.find(weather_tail).expect("weather body") + weather_tail.len();
        assert_eq!(&rendered[weather_end..weather_end + STUB.len()], STUB);
        assert!(
            rendered.find("# --- Registration entry-point").unwrap() > weather_end + STUB.len(),
            "stub stays before the registration section"
        );
        assert!(rendered.contains(
            "            tell_joke,\n            # Weather\n            get_weather,\n            get_time,  # Auto-generated tool\n        ]\n"
        ));
        assert!(catalog.has_tool("get_time"));

        let reparsed = ToolCatalog::parse(&rendered, RegistrationSyntax::default());
        assert_eq!(reparsed.tool_names().collect::<Vec<_>>(), ["tell_joke", "get_weather", "get_time"]);
    }

    #[test]
    fn test_comma_goes_before_comment() {
        let source = "def register_x_tools():\n    register_usecase_tools([\n        a  # first\n    ])\n";
        let mut catalog = catalog(source);
        catalog.add_tool("b", "@tool\ndef b():\n    pass\n\n\n").unwrap();
        assert_eq!(
            catalog.render(),
            "@tool\ndef b():\n    pass\n\n\ndef register_x_tools():\n    register_usecase_tools([\n        a,  # first\n        b,  # Auto-generated tool\n    ])\n"
        );
    }

    #[test]
    fn test_one_line_list() {
        let source = "def register_x_tools():\n    register_usecase_tools([a, b])\n";
        let mut catalog = catalog(source);
        catalog.add_tool("c", "").unwrap();
        assert!(catalog.render().ends_with(
            "    register_usecase_tools([a, b,\n        c,  # Auto-generated tool\n    ])\n"
        ));
    }

    #[test]
    fn test_empty_list() {
        let source = "def register_x_tools():\n    register_usecase_tools([])\n";
        let mut catalog = catalog(source);
        catalog.add_tool("c", "").unwrap();
        assert!(catalog.render().ends_with(
            "    register_usecase_tools([\n        c,  # Auto-generated tool\n    ])\n"
        ));
    }

    #[test]
    fn test_comment_only_list() {
        let source = "def register_x_tools():\n    register_usecase_tools(\n        [\n            # nothing yet\n        ]\n    )\n";
        let mut catalog = catalog(source);
        catalog.add_tool("c", "").unwrap();
        assert!(catalog.render().contains(
            "        [\n            # nothing yet\n            c,  # Auto-generated tool\n        ]\n"
        ));
    }

    #[test]
    fn test_missing_registration_function() {
        let mut catalog = catalog("@tool\ndef a():\n    pass\n");
        let before = catalog.clone();
        let err = catalog.add_tool("b", "code").unwrap_err();
        assert!(matches!(err, CatalogError::RegistrationFunctionNotFound(_)));
        assert_eq!(catalog, before, "catalog unchanged on error");
    }

    #[test]
    fn test_missing_call_and_unterminated_list() {
        let mut no_call = catalog("def register_x_tools():\n    pass\n");
        assert!(matches!(
            no_call.add_tool("b", "code").unwrap_err(),
            CatalogError::RegistrationCallNotFound(_)
        ));

        let mut unterminated = catalog("def register_x_tools():\n    register_usecase_tools([\n        a,\n");
        assert!(matches!(
            unterminated.add_tool("b", "code").unwrap_err(),
            CatalogError::UnterminatedList(_)
        ));
    }

    #[test]
    fn test_configured_function_name() {
        let syntax = RegistrationSyntax {
            function: Some("setup".to_string()),
            call: "register".to_string(),
        };
        let source = "def register_other_tools():\n    pass\n\n\ndef setup():\n    register([\n        a,\n    ])\n";
        let mut catalog = ToolCatalog::parse(source, syntax);
        catalog.add_tool("b", "").unwrap();
        assert!(catalog.render().ends_with("        a,\n        b,  # Auto-generated tool\n    ])\n"));
    }

    #[test]
    fn test_invalid_tool_name_rejected() {
        let mut catalog = catalog(TOOLS_PY);
        assert!(matches!(
            catalog.add_tool("get-time", STUB).unwrap_err(),
            CatalogError::InvalidToolName(_)
        ));
    }

    #[test]
    fn test_split_comment_ignores_hash_in_strings() {
        assert_eq!(split_comment("    \"#x\",  # note\n"), ("    \"#x\",  ", "# note\n"));
        assert_eq!(split_comment("    a\n"), ("    a", "\n"));
    }
}
