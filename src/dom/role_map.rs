//! Maps HTML elements to the roles the segmenter cares about.

use html5ever::LocalName;

/// How an element affects read-aloud flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Starts and ends on its own line.
    Block,
    /// Flows with surrounding text.
    Inline,
    /// Inline, but its text is a citation marker that attaches backward.
    Superscript,
    /// A list item: always starts a new line, may carry a number.
    ListItem,
    OrderedList,
    UnorderedList,
    /// Line break (leaf).
    Break,
    /// Never read.
    Ignored,
}

impl Role {
    /// Whether text inside this element is never read.
    pub fn is_ignored(self) -> bool {
        self == Role::Ignored
    }

    /// Whether the element forces a line break around its content.
    pub fn is_block_like(self) -> bool {
        matches!(
            self,
            Role::Block | Role::ListItem | Role::OrderedList | Role::UnorderedList
        )
    }
}

/// Map an HTML element name to its role.
pub fn element_to_role(local_name: &LocalName) -> Role {
    match local_name.as_ref() {
        // Never rendered as text
        "script" | "style" | "head" | "template" | "noscript" | "title" | "meta" | "link"
        | "iframe" | "svg" | "math" | "canvas" | "object" => Role::Ignored,

        "br" => Role::Break,

        // Citation markers
        "sup" => Role::Superscript,

        "ul" => Role::UnorderedList,
        "ol" => Role::OrderedList,
        "li" => Role::ListItem,

        // Inline formatting
        "span" | "em" | "i" | "cite" | "var" | "dfn" | "strong" | "b" | "code" | "kbd" | "samp"
        | "tt" | "sub" | "u" | "ins" | "s" | "strike" | "del" | "small" | "mark" | "abbr"
        | "time" | "q" | "a" | "img" | "label" | "output" | "data" | "ruby" | "rt" | "rp"
        | "bdi" | "bdo" | "wbr" | "font" => Role::Inline,

        // Everything else (p, div, headings, tables, sections, unknown tags)
        _ => Role::Block,
    }
}
