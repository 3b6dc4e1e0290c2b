//! Lossy source compression applied before a file is sent to the LLM
//!
//! Compression drops comments and blank lines so more of a legacy file fits
//! into a single completion request. It is a single-pass transform and is
//! not guaranteed to be idempotent.
//!
//! The C-family rule is regex based and not string aware: a `//` inside a
//! string literal (for example a URL) truncates the rest of that line.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::info;

/// Compression strategy selected from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionRule {
    /// `#` comments and triple-quoted literals
    Script,
    /// `//` and `/* */` comments
    CFamily,
    /// C/C++ sources, same as `CFamily` plus preprocessor comment remnants
    CPreprocessor,
    /// Blank line removal only
    Generic,
}

impl CompressionRule {
    /// Accepts extensions with or without the leading dot
    pub fn for_extension(extension: &str) -> Self {
        match extension.trim_start_matches('.') {
            "py" => Self::Script,
            "java" | "js" | "ts" => Self::CFamily,
            "c" | "cpp" | "h" => Self::CPreprocessor,
            _ => Self::Generic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionStats {
    pub original_lines: usize,
    pub compressed_lines: usize,
    pub original_chars: usize,
    pub compressed_chars: usize,
    pub reduction_percent: f64,
}

/// Stateless source compressor
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextCompressor;

impl ContextCompressor {
    pub fn new() -> Self {
        Self
    }

    /// Compresses `content` with the rule registered for `extension`
    pub fn compress(&self, content: &str, extension: &str) -> String {
        let compressed = match CompressionRule::for_extension(extension) {
            CompressionRule::Script => compress_script(content),
            CompressionRule::CFamily => compress_c_family(content, false),
            CompressionRule::CPreprocessor => compress_c_family(content, true),
            CompressionRule::Generic => drop_blank_lines(content),
        };

        let original_lines = line_count(content);
        let compressed_lines = line_count(&compressed);
        let reduction = if original_lines > 0 {
            original_lines.saturating_sub(compressed_lines) as f64 / original_lines as f64 * 100.0
        } else {
            0.0
        };

        info!(
            extension,
            original_lines,
            compressed_lines,
            "Compressed file ({:.1}% reduction)",
            reduction
        );

        compressed
    }

    pub fn compression_stats(&self, original: &str, compressed: &str) -> CompressionStats {
        compression_stats(original, compressed)
    }
}

/// Convenience wrapper around [`ContextCompressor::compress`]
pub fn compress(content: &str, extension: &str) -> String {
    ContextCompressor.compress(content, extension)
}

pub fn compression_stats(original: &str, compressed: &str) -> CompressionStats {
    let original_chars = original.chars().count();
    let compressed_chars = compressed.chars().count();
    let reduction_percent = if original_chars > 0 {
        let ratio = 1.0 - compressed_chars as f64 / original_chars as f64;
        (ratio * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    CompressionStats {
        original_lines: line_count(original),
        compressed_lines: line_count(compressed),
        original_chars,
        compressed_chars,
        reduction_percent,
    }
}

fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

fn drop_blank_lines(content: &str) -> String {
    content
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn line_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)//.*$").expect("valid regex"))
}

fn block_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"))
}

fn preprocessor_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)#\s*//.*$").expect("valid regex"))
}

fn compress_c_family(content: &str, preprocessor: bool) -> String {
    let without_line = line_comment_regex().replace_all(content, "");
    let mut stripped = block_comment_regex()
        .replace_all(&without_line, "")
        .into_owned();
    if preprocessor {
        stripped = preprocessor_comment_regex()
            .replace_all(&stripped, "")
            .into_owned();
    }
    drop_blank_lines(&stripped)
}

const TRIPLE_DOUBLE: &str = "\"\"\"";
const TRIPLE_SINGLE: &str = "'''";

fn compress_script(content: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut open_delimiter: Option<&str> = None;

    for line in content.split('\n') {
        let has_double = line.contains(TRIPLE_DOUBLE);
        if has_double || line.contains(TRIPLE_SINGLE) {
            match open_delimiter {
                None => {
                    open_delimiter = Some(if has_double { TRIPLE_DOUBLE } else { TRIPLE_SINGLE });
                }
                Some(delimiter) if line.contains(delimiter) => open_delimiter = None,
                Some(_) => {}
            }
            kept.push(line);
            continue;
        }

        if open_delimiter.is_some() {
            kept.push(line);
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match line.find('#') {
            Some(pos) if !inside_quotes(line, pos) => kept.push(line[..pos].trim_end()),
            _ => kept.push(line),
        }
    }

    kept.join("\n")
}

/// Parity scan over unescaped quotes before `position`
fn inside_quotes(line: &str, position: usize) -> bool {
    let mut in_single = false;
    let mut in_double = false;
    let mut previous: Option<char> = None;

    for c in line[..position].chars() {
        let escaped = previous == Some('\\');
        match c {
            '\'' if !escaped => in_single = !in_single,
            '"' if !escaped => in_double = !in_double,
            _ => {}
        }
        previous = Some(c);
    }

    in_single || in_double
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        python = { ".py", CompressionRule::Script },
        python_no_dot = { "py", CompressionRule::Script },
        java = { ".java", CompressionRule::CFamily },
        javascript = { ".js", CompressionRule::CFamily },
        typescript = { ".ts", CompressionRule::CFamily },
        c = { ".c", CompressionRule::CPreprocessor },
        cpp = { ".cpp", CompressionRule::CPreprocessor },
        header = { ".h", CompressionRule::CPreprocessor },
        ruby = { ".rb", CompressionRule::Generic },
        empty = { "", CompressionRule::Generic },
    )]
    fn test_rule_dispatch(extension: &str, expected: CompressionRule) {
        assert_eq!(CompressionRule::for_extension(extension), expected);
    }

    #[parameterized(
        python = { ".py" },
        java = { ".java" },
        javascript = { ".js" },
        cpp = { ".cpp" },
        text = { ".txt" },
    )]
    fn test_clean_content_is_unchanged(extension: &str) {
        let content = "let total = price * quantity\nlet tax = total * rate\nreturn total + tax";
        assert_eq!(compress(content, extension), content);
    }

    #[parameterized(
        python = { ".py", "# header\n\nx = 1  # inline\n\n\ny = 2\n" },
        java = { ".java", "// header\n\nint x = 1; // inline\n/* block\n spanning */\nint y = 2;\n" },
        cpp = { ".cpp", "#include <x> // why\n\n/* a */ int y;\n" },
        generic = { ".md", "a\n\n\nb\n\n" },
    )]
    fn test_never_increases_line_count(extension: &str, content: &str) {
        let compressed = compress(content, extension);
        assert!(line_count(&compressed) <= line_count(content));
    }

    #[test]
    fn test_python_comments_removed() {
        let content = "# module comment\nimport os\n\nx = 1  # set x\ny = 2";
        assert_eq!(compress(content, ".py"), "import os\nx = 1\ny = 2");
    }

    #[test]
    fn test_python_hash_inside_string_is_kept() {
        let content = "color = \"#ff0000\"\nchannel = '#general'";
        assert_eq!(compress(content, ".py"), content);
    }

    #[test]
    fn test_python_escaped_quote_does_not_flip_parity() {
        let content = r#"msg = "say \"hi\" # not a comment""#;
        assert_eq!(compress(content, ".py"), content);
    }

    #[test]
    fn test_python_docstring_preserved_verbatim() {
        let content = "def price():\n    \"\"\"\n    # VIPs get 20% off\n\n    Details here\n    \"\"\"\n    return 1  # trailing";
        let expected = "def price():\n    \"\"\"\n    # VIPs get 20% off\n\n    Details here\n    \"\"\"\n    return 1";
        assert_eq!(compress(content, ".py"), expected);
    }

    #[test]
    fn test_python_literal_closes_on_matching_delimiter_only() {
        let content = "x = '''\n\"\"\" still inside\n# kept\n'''\n# dropped";
        assert_eq!(
            compress(content, ".py"),
            "x = '''\n\"\"\" still inside\n# kept\n'''"
        );
    }

    #[test]
    fn test_c_family_strips_comments() {
        let content = "// header\nint x = 1; // inline\n/* block\n spanning */\nint y = 2;";
        assert_eq!(compress(content, ".java"), "int x = 1; \nint y = 2;");
    }

    #[test]
    fn test_c_family_is_not_string_aware() {
        let content = "const url = \"http://example.com\";";
        assert_eq!(compress(content, ".js"), "const url = \"http:");
    }

    #[test]
    fn test_generic_drops_blank_lines() {
        assert_eq!(compress("a\n   \n\tb\n\n", ".rb"), "a\n\tb");
    }

    #[test]
    fn test_never_introduces_comment_markers() {
        let content = "int a = 1; /* note */ int b = 2;\n\n";
        let compressed = compress(content, ".c");
        assert!(!compressed.contains("//"));
        assert!(!compressed.contains("/*"));
    }

    #[test]
    fn test_compression_stats() {
        let original = "a\n\nb\n\n";
        let compressed = compress(original, ".txt");
        let stats = compression_stats(original, &compressed);

        assert_eq!(stats.original_lines, 5);
        assert_eq!(stats.compressed_lines, 2);
        assert_eq!(stats.original_chars, 6);
        assert_eq!(stats.compressed_chars, 3);
        assert_eq!(stats.reduction_percent, 50.0);
    }

    #[test]
    fn test_compression_stats_empty_original() {
        let stats = compression_stats("", "");
        assert_eq!(stats.reduction_percent, 0.0);
    }
}
