use std::fmt::Write as _;

use crate::view::View;

pub fn to_json(view: &View) -> serde_json::Value {
    serde_json::json!({
        "title": view.title,
        "description": view.description,
        "width": view.width,
        "height": view.height,
        "tiles": view.tiles,
        "legend": {
            "x": view.legend_origin.0,
            "y": view.legend_origin.1,
            "entries": view.legend,
        },
        "colors": view.colors,
    })
}

/// One row per tile, in layout order.
pub fn to_csv(view: &View, mut w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record(["id", "name", "category", "value", "x0", "y0", "x1", "y1", "color"])?;
    for t in &view.tiles {
        writer.write_record([
            t.id.0.to_string(),
            t.name.clone(),
            t.category.clone(),
            t.value.to_string(),
            t.rect.x0.to_string(),
            t.rect.y0.to_string(),
            t.rect.x1.to_string(),
            t.rect.y1.to_string(),
            t.color.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Standalone SVG document: heading, tiles with their labels, legend.
pub fn to_svg(view: &View) -> String {
    let heading = 48.0;
    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = view.width,
        h = view.height + heading,
    );
    let _ = writeln!(svg, r#"  <text id="title" x="0" y="20" font-size="20">{}</text>"#, escape(&view.title));
    let _ = writeln!(
        svg,
        r#"  <text id="description" x="0" y="40" font-size="12">{}</text>"#,
        escape(&view.description)
    );

    let _ = writeln!(svg, r#"  <g id="map" transform="translate(0, {heading})">"#);
    for t in &view.tiles {
        let _ = writeln!(
            svg,
            r#"    <g transform="translate({}, {})"><rect class="tile" data-name="{}" data-category="{}" data-value="{}" width="{}" height="{}" fill="{}"/><text x="5" y="12" font-size="6">{}</text></g>"#,
            t.rect.x0,
            t.rect.y0,
            escape(&t.name),
            escape(&t.category),
            t.value,
            t.rect.width(),
            t.rect.height(),
            t.color,
            escape(&t.label),
        );
    }
    let _ = writeln!(svg, "  </g>");

    let (lx, ly) = view.legend_origin;
    let _ = writeln!(svg, r#"  <g id="legend" transform="translate({lx}, {})">"#, ly + heading);
    for e in &view.legend {
        let _ = writeln!(
            svg,
            r#"    <rect class="legend-item" x="{}" y="{}" width="{}" height="{}" fill="{}"/><text x="{}" y="{}" font-size="12">{}</text>"#,
            e.swatch.x0,
            e.swatch.y0,
            e.swatch.width(),
            e.swatch.height(),
            e.color,
            e.label_x,
            e.label_y,
            escape(&e.category),
        );
    }
    let _ = writeln!(svg, "  </g>");
    svg.push_str("</svg>\n");
    svg
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
