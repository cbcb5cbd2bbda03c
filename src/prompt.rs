//! Crawl prompt construction.
//!
//! The prompt pins the model to the sentinel format that
//! [`crate::extractor`] understands.

use crate::extractor::blocks::{ARTICLE_END, ARTICLE_START};
use crate::extractor::fields::FieldTag;
use std::fmt::Write;

/// Build the prompt asking for `count` recent articles in `category`.
pub fn crawl_prompt(category: &str, count: usize) -> String {
    let mut prompt = String::new();

    writeln!(
        prompt,
        "You are a financial news researcher for Indian retail investors.\n\
         Find the {count} most recent and relevant news articles in the \"{category}\" category."
    )
    .unwrap();
    writeln!(prompt).unwrap();
    writeln!(
        prompt,
        "Return every article in exactly this format, with one field per line:"
    )
    .unwrap();
    // values stay blank: an echoed template must fail the validity gate
    writeln!(prompt, "{}", ARTICLE_START).unwrap();
    for tag in FieldTag::ALL {
        writeln!(prompt, "{}", tag.prefix()).unwrap();
    }
    writeln!(prompt, "{}", ARTICLE_END).unwrap();
    writeln!(prompt).unwrap();
    writeln!(prompt, "Fields:").unwrap();
    for tag in FieldTag::ALL {
        writeln!(prompt, "- {} {}", tag.prefix(), field_hint(tag)).unwrap();
    }
    writeln!(prompt).unwrap();
    writeln!(
        prompt,
        "Rules:\n\
         - Return at most {count} articles.\n\
         - {title}, {summary} and {source} are required for every article.\n\
         - Leave {image} or {url} empty if you do not know them; never invent links.\n\
         - Do not add any text outside the article blocks.",
        title = FieldTag::Title.prefix(),
        summary = FieldTag::Summary.prefix(),
        source = FieldTag::Source.prefix(),
        image = FieldTag::ImageUrl.prefix(),
        url = FieldTag::SourceUrl.prefix(),
    )
    .unwrap();

    prompt
}

fn field_hint(tag: FieldTag) -> &'static str {
    match tag {
        FieldTag::Title => "<headline>",
        FieldTag::Summary => "<two or three sentence summary>",
        FieldTag::ImageUrl => "<thumbnail image URL>",
        FieldTag::SourceUrl => "<link to the original article>",
        FieldTag::Source => "<publication name>",
    }
}
