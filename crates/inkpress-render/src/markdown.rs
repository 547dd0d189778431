//! Markdown to HTML.

use pulldown_cmark::{html, CowStr, Event, Parser, Tag, TagEnd};

use inkpress_markdown::{markdown_options, HeadingIds};

/// Render a post body to HTML.
///
/// Headings without an explicit `{#id}` get the same unique slug id the
/// post outline uses, so outline links resolve against the rendered page.
pub fn render_markdown(markdown: &str) -> String {
    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, markdown_options()).collect();

    let mut ids = HeadingIds::new();
    for event in &events {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            ids.reserve(id);
        }
    }

    let mut index = 0;
    while index < events.len() {
        if let Event::Start(Tag::Heading { id: None, .. }) = &events[index] {
            let text = heading_text(&events[index + 1..]);
            let slug = ids.assign(&text);
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[index] {
                *id = slug.map(CowStr::from);
            }
        }
        index += 1;
    }

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}
