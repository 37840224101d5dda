/// HTML/CSS assembly for grouped placements

use super::grid::{CellSize, Placement};
use crate::Resolution;
use std::collections::HashMap;
use std::fmt::Write;

/// Everything the emitter needs besides the placements themselves.
pub struct EmitContext<'a> {
    pub resolution: Resolution,
    pub cell: CellSize,
    pub title: &'a str,
    pub content: &'a HashMap<String, String>,
    pub styles: &'a HashMap<String, String>,
}

/// Inline style for one placement: fixed positioning first, override last.
pub fn inline_style(placement: &Placement, cell: CellSize, extra: &str) -> String {
    let r = placement.bounds.to_rect(cell);
    let mut style = format!(
        "position:absolute; top:{}px; left:{}px; width:{}px; height:{}px; margin:0; display:block;",
        r.top, r.left, r.width, r.height
    );
    if !extra.is_empty() {
        if !extra.starts_with(char::is_whitespace) {
            style.push(' ');
        }
        style.push_str(extra);
    }
    style
}

/// `tag1, tag2 { display: block; }`, or nothing when no tag was seen.
pub fn display_rule(tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        None
    } else {
        Some(format!("{} {{ display: block; }}", tags.join(", ")))
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Render the full document.
pub fn render_document(ctx: &EmitContext<'_>, placements: &[Placement], tags: &[String]) -> String {
    let Resolution { width, height } = ctx.resolution;
    let mut out = String::with_capacity(1024 + placements.len() * 160);

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    // Writing into a String cannot fail.
    let _ = writeln!(out, "<title>{}</title>", escape_text(ctx.title));
    out.push_str("<style>\n");
    let _ = writeln!(
        out,
        "html, body {{ margin: 0; padding: 0; overflow: hidden; width: {}px; height: {}px; }}",
        width, height
    );
    let _ = writeln!(
        out,
        ".container {{ position: fixed; top: 0; left: 0; width: {}px; height: {}px; }}",
        width, height
    );
    if let Some(rule) = display_rule(tags) {
        out.push_str(&rule);
        out.push('\n');
    }
    out.push_str("</style>\n</head>\n<body>\n<div class=\"container\">\n");

    for p in placements {
        let extra = ctx.styles.get(&p.element_id).map(String::as_str).unwrap_or("");
        let inner = ctx.content.get(&p.element_id).map(String::as_str).unwrap_or("");
        let _ = writeln!(
            out,
            "<{tag} style=\"{style}\">{inner}</{tag}>",
            tag = p.tag,
            style = inline_style(p, ctx.cell, extra),
            inner = inner
        );
    }

    out.push_str("</div>\n</body>\n</html>\n");
    out
}
