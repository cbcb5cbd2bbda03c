//! Prefix-based field classification for article lines.

/// The fields an article block can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTag {
    Title,
    Summary,
    ImageUrl,
    SourceUrl,
    Source,
}

impl FieldTag {
    /// Every tag, in matching order.
    ///
    /// `SourceUrl` comes before `Source` so the longer prefix is tried first.
    pub const ALL: [FieldTag; 5] = [
        FieldTag::Title,
        FieldTag::Summary,
        FieldTag::ImageUrl,
        FieldTag::SourceUrl,
        FieldTag::Source,
    ];

    pub const fn prefix(self) -> &'static str {
        match self {
            FieldTag::Title => "TITLE:",
            FieldTag::Summary => "SUMMARY:",
            FieldTag::ImageUrl => "IMAGE_URL:",
            FieldTag::SourceUrl => "SOURCE_URL:",
            FieldTag::Source => "SOURCE:",
        }
    }
}

/// Classify one tokenized line.
///
/// Returns the matching tag and the trimmed text after the prefix, or `None`
/// when the line carries no known prefix. Matching is case-sensitive.
pub fn classify_line(line: &str) -> Option<(FieldTag, &str)> {
    FieldTag::ALL.into_iter().find_map(|tag| {
        line.strip_prefix(tag.prefix())
            .map(|value| (tag, value.trim()))
    })
}

/// The classified values of a single block.
///
/// Values are stored as found; empty values are kept so the assembler can
/// decide on fallbacks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassifiedFields {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub source: Option<String>,
}

impl ClassifiedFields {
    /// Fold tokenized lines into fields. A repeated tag overwrites the
    /// earlier value, so the last occurrence wins.
    pub fn collect<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut fields = Self::default();
        for (tag, value) in lines.into_iter().filter_map(classify_line) {
            fields.set(tag, value);
        }
        fields
    }

    pub fn set(&mut self, tag: FieldTag, value: &str) {
        let slot = match tag {
            FieldTag::Title => &mut self.title,
            FieldTag::Summary => &mut self.summary,
            FieldTag::ImageUrl => &mut self.image_url,
            FieldTag::SourceUrl => &mut self.source_url,
            FieldTag::Source => &mut self.source,
        };
        *slot = Some(value.to_string());
    }
}
