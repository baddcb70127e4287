//! Markdown round-tripping with comrak.
//!
//! The source-view toggle and save path serialize the block sequence to
//! CommonMark; loading a file parses it back. Only the constructs the
//! block model can hold survive the round trip: paragraphs, fenced code
//! blocks, and standalone images. Everything else flattens to paragraph
//! text.

use anyhow::Result;
use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, parse_document};

use super::{Block, DocumentModel};

/// Parse markdown source into a document model.
pub fn parse(source: &str) -> Result<DocumentModel> {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let mut blocks = Vec::new();
    for child in root.children() {
        match &child.data.borrow().value {
            NodeValue::CodeBlock(code) => {
                blocks.push(Block::CodeBlock {
                    language: code.info.trim().to_string(),
                    text: code.literal.trim_end_matches('\n').to_string(),
                });
            }
            NodeValue::Paragraph => {
                if let Some(image) = standalone_image(child) {
                    blocks.push(image);
                } else {
                    let text = extract_text(child);
                    if !text.is_empty() {
                        blocks.push(Block::Paragraph(text));
                    }
                }
            }
            _ => {
                let text = extract_text(child);
                if !text.is_empty() {
                    blocks.push(Block::Paragraph(text));
                }
            }
        }
    }
    Ok(DocumentModel::from_blocks(blocks))
}

/// Serialize the block sequence back to markdown.
pub fn serialize(doc: &DocumentModel) -> String {
    let mut out = String::new();
    for (_, block) in doc.blocks() {
        match block {
            Block::Paragraph(text) => {
                out.push_str(text);
            }
            Block::CodeBlock { language, text } => {
                out.push_str("```");
                out.push_str(language);
                out.push('\n');
                out.push_str(text);
                out.push_str("\n```");
            }
            // Angle brackets keep filenames with spaces parseable.
            Block::Image { src, alt } => {
                out.push_str(&format!("![{alt}](<{src}>)"));
            }
        }
        out.push_str("\n\n");
    }
    out
}

fn create_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options
}

/// A paragraph whose only child is an image becomes an image block.
fn standalone_image<'a>(node: &'a AstNode<'a>) -> Option<Block> {
    let mut children = node.children();
    let first = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match &first.data.borrow().value {
        NodeValue::Image(link) => Some(Block::Image {
            src: link.url.clone(),
            alt: extract_text(first),
        }),
        _ => None,
    }
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) | NodeValue::Code(comrak::nodes::NodeCode { literal: t, .. }) => {
            out.push_str(t);
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paragraph_and_code_block() {
        let doc = parse("intro text\n\n```javascript\nlet x = 1\n```\n").unwrap();
        let blocks: Vec<&Block> = doc.blocks().map(|(_, b)| b).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], &Block::Paragraph("intro text".to_string()));
        assert_eq!(
            blocks[1],
            &Block::CodeBlock {
                language: "javascript".to_string(),
                text: "let x = 1".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_standalone_image() {
        let doc = parse("![logo](<logo.png>)\n").unwrap();
        let blocks: Vec<&Block> = doc.blocks().map(|(_, b)| b).collect();
        assert_eq!(
            blocks,
            vec![&Block::Image {
                src: "logo.png".to_string(),
                alt: "logo".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_flattens_inline_markup() {
        let doc = parse("some *styled* `code` text\n").unwrap();
        let blocks: Vec<&Block> = doc.blocks().map(|(_, b)| b).collect();
        assert_eq!(
            blocks,
            vec![&Block::Paragraph("some styled code text".to_string())]
        );
    }

    #[test]
    fn test_roundtrip_preserves_blocks() {
        let doc = DocumentModel::from_blocks(vec![
            Block::Paragraph("before".to_string()),
            Block::CodeBlock {
                language: "rust".to_string(),
                text: "fn main() {}".to_string(),
            },
            Block::Image {
                src: "pic one.png".to_string(),
                alt: "pic".to_string(),
            },
            Block::Paragraph("after".to_string()),
        ]);
        let md = serialize(&doc);
        let reparsed = parse(&md).unwrap();
        let original: Vec<&Block> = doc.blocks().map(|(_, b)| b).collect();
        let roundtripped: Vec<&Block> = reparsed.blocks().map(|(_, b)| b).collect();
        assert_eq!(original, roundtripped);
    }

    #[test]
    fn test_code_block_without_language() {
        let doc = parse("```\nplain\n```\n").unwrap();
        let blocks: Vec<&Block> = doc.blocks().map(|(_, b)| b).collect();
        assert_eq!(
            blocks,
            vec![&Block::CodeBlock {
                language: String::new(),
                text: "plain".to_string(),
            }]
        );
    }
}
