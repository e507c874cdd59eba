//! Markdown scanning for usage examples and package descriptions.
//!
//! This is deliberately heuristic, not a markdown parser: the scan only
//! recognizes fenced code blocks, heading lines, and image-only lines, which
//! is enough to harvest language-tagged snippets and a lead paragraph from
//! real-world READMEs. The individual scanning rules are kept as named
//! predicates so they can be tested apart from the block-assembly logic.
//!
//! All functions here are pure reads over the input text; malformed input
//! (unterminated fences, empty documents, no headings) degrades to partial or
//! empty results and never errors.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Language tag used when a fenced block carries no info-string.
const FALLBACK_LANGUAGE: &str = "text";

/// Returned when no line of the document qualifies as a description. Callers
/// rely on this exact string as the "no description found" sentinel.
pub const FALLBACK_DESCRIPTION: &str = "C/C++ package";

/// Longest description attached to a single example. Pathological documents
/// can put thousands of prose lines ahead of a fence; the cap keeps one block
/// from dominating the response.
const MAX_EXAMPLE_DESCRIPTION: usize = 300;

/// Shortest line considered substantial enough to be a package description.
const MIN_DESCRIPTION_LINE: usize = 20;

/// Opening or closing fence delimiter, with optional info-string.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(?:`{3,}|~{3,})\s*(\S*)").unwrap());

/// ATX heading: one to six leading `#` markers followed by text.
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(#{1,6})\s+(.*\S)\s*$").unwrap());

/// A line that is entirely image references (including badge rows of
/// link-wrapped images), nothing else.
static IMAGE_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\[?!\[[^\]]*\]\([^)]*\)\]?(?:\([^)]*\))?\s*)+$").unwrap()
});

/// A single code example harvested from a README.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageExample {
    /// Lower-cased fence info-string, or `"text"` when the fence had none.
    pub language: String,
    /// Nearest preceding heading, or a generated `"Example N"` default.
    pub title: String,
    /// Verbatim block contents, fence delimiters excluded.
    pub code: String,
    /// Prose between the heading and the fence; empty when none was found.
    pub description: String,
}

/// Returns the fence info-string if the line opens (or closes) a fenced block.
fn fence_info(line: &str) -> Option<&str> {
    FENCE_RE
        .captures(line)
        .map(|c| c.get(1).map_or("", |m| m.as_str()))
}

/// A fence line with no info-string, i.e. a closing delimiter.
fn is_closing_fence(line: &str) -> bool {
    fence_info(line).is_some_and(str::is_empty)
}

/// Returns the heading text (markers stripped, trimmed) for a heading line.
fn heading_text(line: &str) -> Option<&str> {
    HEADING_RE.captures(line).map(|c| c.get(2).unwrap().as_str())
}

/// A level-one heading, e.g. `# zlib`.
fn is_top_level_heading(line: &str) -> bool {
    HEADING_RE
        .captures(line)
        .is_some_and(|c| c.get(1).unwrap().as_str().len() == 1)
}

/// A line that consists entirely of image references.
fn is_image_only(line: &str) -> bool {
    IMAGE_ONLY_RE.is_match(line)
}

/// Truncate to at most `max` characters on a char boundary.
fn cap_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text,
    }
}

/// Extract one [`UsageExample`] per well-formed fenced code block, in
/// document order.
///
/// A block is well-formed when its opening fence has a matching closing
/// delimiter later in the document; an unterminated fence yields nothing.
/// Titles come from the nearest heading between the previous block's end (or
/// document start) and the fence; descriptions from the prose lines between
/// that heading and the fence.
pub fn parse_usage_examples(markdown: &str) -> Vec<UsageExample> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut examples = Vec::new();

    // Index of the first line after the previous block's closing fence.
    // Headings and prose before it belong to earlier examples.
    let mut floor = 0;
    let mut i = 0;

    while i < lines.len() {
        let Some(info) = fence_info(lines[i]) else {
            i += 1;
            continue;
        };

        // Find the matching closing delimiter.
        let Some(close) = (i + 1..lines.len()).find(|&j| is_closing_fence(lines[j])) else {
            // Unterminated fence: nothing more can be well-formed.
            break;
        };

        let language = if info.is_empty() {
            FALLBACK_LANGUAGE.to_string()
        } else {
            info.to_lowercase()
        };

        let code = lines[i + 1..close].join("\n");

        // Nearest preceding heading, bounded by the previous block's end.
        let heading_idx = (floor..i).rev().find(|&h| heading_text(lines[h]).is_some());
        let title = match heading_idx {
            Some(h) => heading_text(lines[h]).unwrap_or_default().to_string(),
            None => format!("Example {}", examples.len() + 1),
        };

        // Prose strictly between the chosen heading (or the previous block's
        // end) and the fence.
        let desc_start = heading_idx.map_or(floor, |h| h + 1);
        let description = lines[desc_start..i]
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && heading_text(l).is_none())
            .collect::<Vec<_>>()
            .join(" ");
        let description = cap_chars(description, MAX_EXAMPLE_DESCRIPTION);

        examples.push(UsageExample {
            language,
            title,
            code,
            description,
        });

        floor = close + 1;
        i = close + 1;
    }

    examples
}

/// Extract a short package description from the document's lead prose.
///
/// Scans the lines following the first top-level heading (or the whole
/// document when there is none), skipping blanks, headings, image-only lines,
/// anything inside a fenced code block, and lines too short to be
/// substantial. Returns [`FALLBACK_DESCRIPTION`] when nothing qualifies.
pub fn extract_package_description(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let start = lines
        .iter()
        .position(|l| is_top_level_heading(l))
        .map_or(0, |h| h + 1);

    // Fence state is tracked from the top of the document so that code inside
    // a block opened before the heading is never mistaken for prose.
    let mut in_fence = false;
    for (idx, line) in lines.iter().enumerate() {
        if fence_info(line).is_some() {
            in_fence = !in_fence;
            continue;
        }
        if idx < start || in_fence {
            continue;
        }

        let trimmed = line.trim();
        if trimmed.len() < MIN_DESCRIPTION_LINE
            || heading_text(trimmed).is_some()
            || is_image_only(trimmed)
        {
            continue;
        }
        return trimmed.to_string();
    }

    FALLBACK_DESCRIPTION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_examples() {
        assert!(parse_usage_examples("").is_empty());
    }

    #[test]
    fn test_prose_only_document_yields_no_examples() {
        let md = "# zlib\n\nA compression library.\n\n## Notes\n\nNothing to run here.\n";
        assert!(parse_usage_examples(md).is_empty());
    }

    #[test]
    fn test_unterminated_fence_is_skipped_silently() {
        assert!(parse_usage_examples("```cpp\ncode").is_empty());
    }

    #[test]
    fn test_single_block_with_heading_and_description() {
        let md = "\
# fmt

## Basic usage

Format a string and print it to stdout.

```cpp
#include <fmt/core.h>
int main() { fmt::print(\"Hello\\n\"); }
```
";
        let examples = parse_usage_examples(md);
        assert_eq!(examples.len(), 1);
        let ex = &examples[0];
        assert_eq!(ex.language, "cpp");
        assert_eq!(ex.title, "Basic usage");
        assert_eq!(ex.description, "Format a string and print it to stdout.");
        assert!(ex.code.starts_with("#include <fmt/core.h>"));
        assert!(!ex.code.contains("```"));
    }

    #[test]
    fn test_three_blocks_keep_document_order_and_headings() {
        let md = "\
# pkg

## Configure

```cmake
find_package(pkg REQUIRED)
```

## Include

```cpp
#include <pkg.h>
```

## Build

```bash
cmake --build .
```
";
        let examples = parse_usage_examples(md);
        assert_eq!(examples.len(), 3);
        let languages: Vec<&str> = examples.iter().map(|e| e.language.as_str()).collect();
        assert_eq!(languages, ["cmake", "cpp", "bash"]);
        let titles: Vec<&str> = examples.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Configure", "Include", "Build"]);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let md = "## A\n\n```cpp\nint x;\n```\n\n```bash\nmake\n```\n";
        assert_eq!(parse_usage_examples(md), parse_usage_examples(md));
    }

    #[test]
    fn test_untagged_fence_falls_back_to_text() {
        let md = "```\nplain contents\n```\n";
        let examples = parse_usage_examples(md);
        assert_eq!(examples[0].language, "text");
        assert_eq!(examples[0].code, "plain contents");
    }

    #[test]
    fn test_info_string_is_lowercased_and_first_word_only() {
        let md = "```CMake ignored-rest\nproject(x)\n```\n";
        assert_eq!(parse_usage_examples(md)[0].language, "cmake");
    }

    #[test]
    fn test_adjacent_blocks_second_gets_synthesized_title() {
        let md = "\
## Install

```bash
conan install .
```
```cpp
#include <x.h>
```
";
        let examples = parse_usage_examples(md);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].title, "Install");
        // No heading or prose intervenes before the second block.
        assert_eq!(examples[1].title, "Example 2");
        assert_eq!(examples[1].description, "");
    }

    #[test]
    fn test_heading_lookback_stops_at_previous_fence() {
        let md = "\
## Only heading

```bash
step one
```

some prose in between

```bash
step two
```
";
        let examples = parse_usage_examples(md);
        assert_eq!(examples[0].title, "Only heading");
        // The heading sits before the first fence, so the second block must
        // not claim it.
        assert_eq!(examples[1].title, "Example 2");
        assert_eq!(examples[1].description, "some prose in between");
    }

    #[test]
    fn test_code_preserves_indentation_and_blank_lines() {
        let md = "```python\ndef f():\n    pass\n\nf()\n```\n";
        assert_eq!(parse_usage_examples(md)[0].code, "def f():\n    pass\n\nf()");
    }

    #[test]
    fn test_blocks_after_unterminated_fence_are_not_invented() {
        // The stray opening fence swallows the rest of the document.
        let md = "```cpp\nint a;\n```\n\n```bash\nno closer";
        let examples = parse_usage_examples(md);
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].language, "cpp");
    }

    #[test]
    fn test_well_formed_blocks_survive_trailing_unterminated_fence_in_order() {
        let md = "\
# pkg

## First

```cmake
add_subdirectory(pkg)
```

## Second

```cpp
#include <pkg.h>
```

## Broken

```bash
never closed";
        let examples = parse_usage_examples(md);
        let languages: Vec<&str> = examples.iter().map(|e| e.language.as_str()).collect();
        assert_eq!(languages, ["cmake", "cpp"]);
        let titles: Vec<&str> = examples.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second"]);
        // The same degraded document still yields the description fallback
        // when stripped of its prose.
        assert_eq!(extract_package_description("```bash\nnever closed"), FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_example_description_is_capped() {
        let long_line = "x".repeat(1000);
        let md = format!("## T\n\n{long_line}\n\n```sh\nls\n```\n");
        let examples = parse_usage_examples(&md);
        assert_eq!(examples[0].description.chars().count(), 300);
    }

    #[test]
    fn test_description_empty_input_returns_fallback() {
        assert_eq!(extract_package_description(""), FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_description_skips_heading_images_and_code() {
        let md = "\
# zlib

[![build](https://img.shields.io/badge.svg)](https://ci.example.com)

```sh
this line is code, definitely not a description
```

## Subheading

zlib is a general-purpose lossless data-compression library.
";
        assert_eq!(
            extract_package_description(md),
            "zlib is a general-purpose lossless data-compression library."
        );
    }

    #[test]
    fn test_description_skips_short_lines() {
        let md = "# pkg\n\nTiny.\n\nA longer, properly substantial description line.\n";
        assert_eq!(
            extract_package_description(md),
            "A longer, properly substantial description line."
        );
    }

    #[test]
    fn test_description_without_any_heading_uses_first_prose() {
        let md = "A library without any markdown headings at all.\n";
        assert_eq!(
            extract_package_description(md),
            "A library without any markdown headings at all."
        );
    }

    #[test]
    fn test_description_fallback_when_nothing_qualifies() {
        let md = "# title\n\n![logo](logo.png)\n\nshort\n";
        assert_eq!(extract_package_description(md), FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_fence_predicates() {
        assert_eq!(fence_info("```cpp"), Some("cpp"));
        assert_eq!(fence_info("~~~bash"), Some("bash"));
        assert_eq!(fence_info("```"), Some(""));
        assert!(fence_info("plain text").is_none());
        assert!(is_closing_fence("```"));
        assert!(!is_closing_fence("```cpp"));
    }

    #[test]
    fn test_heading_predicates() {
        assert_eq!(heading_text("## Usage  "), Some("Usage"));
        assert_eq!(heading_text("###Tight"), None);
        assert!(is_top_level_heading("# Title"));
        assert!(!is_top_level_heading("## Title"));
    }

    #[test]
    fn test_image_only_predicate() {
        assert!(is_image_only("![logo](assets/logo.png)"));
        assert!(is_image_only(
            "[![build](https://x/b.svg)](https://ci) [![docs](https://x/d.svg)](https://docs)"
        ));
        assert!(!is_image_only("See the ![icon](i.png) inline."));
    }
}
