/// A contiguous span of text sharing one style combination.
///
/// Concatenating the `text` of every run in a block, in order, reproduces the
/// source text with the markdown markers stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl RichTextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            code: false,
        }
    }

    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.code
    }

    /// Style flags as a tuple, for comparing adjacent runs.
    pub fn style(&self) -> (bool, bool, bool) {
        (self.bold, self.italic, self.code)
    }
}

/// Block-level elements parsed from Markdown, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbstractBlock {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    BulletItem {
        text: String,
        depth: usize,
    },
    NumberedItem {
        text: String,
        depth: usize,
        index: usize,
    },
    CodeBlock {
        text: String,
        language: Option<String>,
    },
}

/// Discriminant of a mapped block, carrying the attributes that survive
/// character splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading { level: u8 },
    Paragraph,
    BulletItem { depth: usize },
    NumberedItem { depth: usize, index: usize },
    Code { language: Option<String> },
}

/// A block in the shape the Notion API accepts: a kind tag plus a rich-text
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeBlock {
    pub kind: BlockKind,
    pub rich_text: Vec<RichTextRun>,
    /// Detected `Name:`-style prefix. Only consulted when choosing page
    /// boundaries; the label text stays part of the content.
    pub speaker_label: Option<String>,
}

impl NativeBlock {
    pub fn new(kind: BlockKind, rich_text: Vec<RichTextRun>) -> Self {
        Self {
            kind,
            rich_text,
            speaker_label: None,
        }
    }

    /// The block's text with all styling dropped.
    pub fn plain_text(&self) -> String {
        self.rich_text.iter().map(|run| run.text.as_str()).collect()
    }

    /// Total text length in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.rich_text
            .iter()
            .map(|run| run.text.chars().count())
            .sum()
    }

    /// List nesting depth; non-list blocks sit at depth 0.
    pub fn depth(&self) -> usize {
        match self.kind {
            BlockKind::BulletItem { depth } | BlockKind::NumberedItem { depth, .. } => depth,
            _ => 0,
        }
    }
}

/// An ordered batch of blocks sent in one page-creation or append call.
pub type PageGroup = Vec<NativeBlock>;
