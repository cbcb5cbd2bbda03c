//! Sentinel-based block splitting and line tokenizing.

/// Marker that opens an article block.
pub const ARTICLE_START: &str = "---ARTICLE START---";
/// Marker that closes an article block.
pub const ARTICLE_END: &str = "---ARTICLE END---";

/// Split raw text into article blocks.
///
/// A block is the text following an [`ARTICLE_START`] marker up to the first
/// of: the next [`ARTICLE_END`], the next [`ARTICLE_START`], or the end of
/// the text. Anything outside a block (preamble, text after an end marker)
/// is discarded. Blocks are returned in the order they appear.
pub fn split_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(ARTICLE_START) {
        let body = &rest[start + ARTICLE_START.len()..];

        let end = body.find(ARTICLE_END);
        let next_start = body.find(ARTICLE_START);
        match (end, next_start) {
            (Some(e), Some(s)) if s < e => {
                // unterminated block, the next one starts here
                blocks.push(&body[..s]);
                rest = &body[s..];
            }
            (Some(e), _) => {
                blocks.push(&body[..e]);
                rest = &body[e + ARTICLE_END.len()..];
            }
            (None, Some(s)) => {
                blocks.push(&body[..s]);
                rest = &body[s..];
            }
            (None, None) => {
                blocks.push(body);
                break;
            }
        }
    }

    blocks
}

/// Split a block into trimmed, non-empty lines, preserving order.
pub fn tokenize_lines(block: &str) -> Vec<&str> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
