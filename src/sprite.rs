//! SVG "stack" sprite assembly.
//!
//! Each icon becomes a nested `<svg id="...">` inside one root `<svg>`. A
//! `:target` rule shows only the referenced icon, so `sprite.svg#logo` works
//! as an image URL.
//!
//! ```text
//! <svg xmlns="...">
//!   <style>:root>svg{display:none}:root>svg:target{display:block}</style>
//!   <svg id="logo" viewBox="0 0 24 24">...</svg>
//! </svg>
//! ```

use anyhow::{Result, anyhow, bail};
use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use rustc_hash::FxHashSet;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const STACK_STYLE: &str = ":root>svg{display:none}:root>svg:target{display:block}";

/// Root attributes that the sprite root already provides or that would clash.
const DROPPED_ATTRS: &[&[u8]] = &[b"id", b"version", b"xmlns"];

pub struct SpriteBuilder {
    writer: Writer<Vec<u8>>,
    ids: FxHashSet<String>,
}

impl SpriteBuilder {
    pub fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());

        let mut root = BytesStart::new("svg");
        root.push_attribute(("xmlns", SVG_NS));
        root.push_attribute(("xmlns:xlink", XLINK_NS));
        writer.write_event(Event::Start(root))?;
        writer.write_event(Event::Start(BytesStart::new("style")))?;
        writer.write_event(Event::Text(BytesText::from_escaped(STACK_STYLE)))?;
        writer.write_event(Event::End(BytesEnd::new("style")))?;

        Ok(Self {
            writer,
            ids: FxHashSet::default(),
        })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Append one icon. On error the sprite is left unchanged.
    pub fn add(&mut self, id: &str, svg: &[u8]) -> Result<()> {
        if !self.ids.insert(id.to_string()) {
            bail!("duplicate icon id `{id}`");
        }
        match nest_icon(id, svg) {
            Ok(bytes) => {
                self.writer.get_mut().extend_from_slice(&bytes);
                Ok(())
            }
            Err(e) => {
                self.ids.remove(id);
                Err(e)
            }
        }
    }

    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.writer.write_event(Event::End(BytesEnd::new("svg")))?;
        Ok(self.writer.into_inner())
    }
}

/// Rewrite an icon document as a nested `<svg id="...">` element.
fn nest_icon(id: &str, svg: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(svg);
    let mut writer = Writer::new(Vec::with_capacity(svg.len()));
    let mut depth = 0usize;
    let mut state = RootState::Before;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| anyhow!("XML parse error at position {}: {e}", reader.error_position()))?;

        match event {
            Event::Start(elem) if depth == 0 => {
                state.open()?;
                writer.write_event(Event::Start(icon_root(&elem, id)?))?;
                depth = 1;
            }
            Event::Empty(elem) if depth == 0 => {
                state.open()?;
                writer.write_event(Event::Empty(icon_root(&elem, id)?))?;
                state = RootState::Closed;
            }
            Event::Start(elem) => {
                depth += 1;
                writer.write_event(Event::Start(elem))?;
            }
            Event::End(elem) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| anyhow!("unexpected closing tag"))?;
                if depth == 0 {
                    writer.write_event(Event::End(BytesEnd::new("svg")))?;
                    state = RootState::Closed;
                } else {
                    writer.write_event(Event::End(elem))?;
                }
            }
            Event::Eof => break,
            // prolog, doctype and trailing whitespace
            _ if depth == 0 => {}
            Event::Comment(_) => {}
            event => writer.write_event(event)?,
        }
    }

    match state {
        RootState::Before => bail!("no <svg> root element"),
        RootState::Open => bail!("unclosed <svg> root element"),
        RootState::Closed => Ok(writer.into_inner()),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RootState {
    Before,
    Open,
    Closed,
}

impl RootState {
    fn open(&mut self) -> Result<()> {
        if *self != Self::Before {
            bail!("multiple root elements");
        }
        *self = Self::Open;
        Ok(())
    }
}

/// The icon's root element renamed for nesting: `id` set first, namespace
/// declarations dropped, `viewBox`/`width`/`height` and the rest kept.
fn icon_root(elem: &BytesStart<'_>, id: &str) -> Result<BytesStart<'static>> {
    if elem.local_name().as_ref() != b"svg" {
        bail!(
            "root element is <{}>, expected <svg>",
            String::from_utf8_lossy(elem.name().as_ref())
        );
    }

    let mut nested = BytesStart::new("svg");
    nested.push_attribute(("id", id));
    for attr in elem.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if DROPPED_ATTRS.contains(&key) || key.starts_with(b"xmlns:") {
            continue;
        }
        nested.push_attribute((key, attr.value.as_ref()));
    }
    Ok(nested.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- Generator: an editor -->
<svg xmlns="http://www.w3.org/2000/svg" version="1.1" id="Layer_1" viewBox="0 0 24 24" width="24" height="24"><path d="M0 0h24v24H0z"/></svg>
"#;

    fn build(icons: &[(&str, &str)]) -> String {
        let mut sprite = SpriteBuilder::new().unwrap();
        for (id, svg) in icons {
            sprite.add(id, svg.as_bytes()).unwrap();
        }
        String::from_utf8(sprite.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_stack_sprite() {
        let out = build(&[("logo", LOGO), ("logo-small", r#"<svg viewBox="0 0 8 8"/>"#)]);

        assert!(out.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><style>:root>svg{display:none}"#));
        assert!(out.contains(r#"<svg id="logo" viewBox="0 0 24 24" width="24" height="24"><path d="M0 0h24v24H0z"/></svg>"#));
        assert!(out.contains(r#"<svg id="logo-small" viewBox="0 0 8 8"/>"#));
        assert!(out.ends_with("</svg></svg>"));
        assert!(!out.contains("<?xml"));
        assert!(!out.contains("Generator"));
        assert!(!out.contains("Layer_1"));
    }

    #[test]
    fn test_order_follows_insertion() {
        let out = build(&[("a", "<svg><g/></svg>"), ("b", "<svg><g/></svg>")]);
        assert!(out.find(r#"id="a""#).unwrap() < out.find(r#"id="b""#).unwrap());
    }

    #[test]
    fn test_malformed_icon_leaves_sprite_unchanged() {
        let mut sprite = SpriteBuilder::new().unwrap();
        sprite.add("ok", b"<svg><g/></svg>").unwrap();
        assert!(sprite.add("broken", b"<svg><g></svg>").is_err());
        assert!(sprite.add("html", b"<html></html>").is_err());
        assert!(sprite.add("empty", b"   ").is_err());
        assert_eq!(sprite.len(), 1);

        let out = String::from_utf8(sprite.finish().unwrap()).unwrap();
        assert!(!out.contains("broken"));
    }

    #[test]
    fn test_duplicate_id() {
        let mut sprite = SpriteBuilder::new().unwrap();
        sprite.add("logo", b"<svg/>").unwrap();
        assert!(sprite.add("logo", b"<svg/>").is_err());
    }
}
