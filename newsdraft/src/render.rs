//! HTML for the single form page.

use std::fmt::Write as _;

use crate::pipeline::GenerationResult;
use crate::prompt::Style;

/// Values echoed back into the form inputs.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pub topic: String,
    pub audience: String,
    pub style: Option<Style>,
}

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the page: the form, an optional notice, and an optional result.
/// The generated post is inserted as HTML; everything user-supplied is escaped.
pub fn render_page(values: &FormValues, result: Option<&GenerationResult>, notice: Option<&str>) -> String {
    let mut html = String::new();
    html.push_str(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Newsdraft</title>
<style>
body { font-family: sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }
label { display: block; margin-top: 0.8rem; }
input, select { width: 100%; padding: 0.4rem; }
.notice { background: #fdecea; border: 1px solid #f5c2c0; padding: 0.6rem; margin-top: 1rem; }
.post { border-top: 1px solid #ccc; margin-top: 2rem; padding-top: 1rem; }
table.meta td { padding: 0.2rem 0.8rem 0.2rem 0; }
</style>
</head>
<body>
<h1>Generate a post from recent news</h1>
<form method="post" action="/">
"#,
    );

    let _ = write!(
        html,
        "<label for=\"topic\">Topic</label>\n<input id=\"topic\" name=\"topic\" value=\"{}\" required>\n",
        escape_html(&values.topic)
    );
    let _ = write!(
        html,
        "<label for=\"audience\">Audience</label>\n<input id=\"audience\" name=\"audience\" value=\"{}\">\n",
        escape_html(&values.audience)
    );

    html.push_str("<label for=\"style\">Style</label>\n<select id=\"style\" name=\"style\">\n");
    let selected_style = values.style.unwrap_or(Style::EasyToRead);
    for style in Style::ALL {
        let selected = if style == selected_style { " selected" } else { "" };
        let _ = writeln!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            style.code(),
            selected,
            style.label()
        );
    }
    html.push_str("</select>\n<p><button type=\"submit\">Generate</button></p>\n</form>\n");

    if let Some(notice) = notice {
        let _ = writeln!(html, "<div class=\"notice\">{}</div>", escape_html(notice));
    }

    if let Some(result) = result {
        html.push_str("<section class=\"post\">\n<table class=\"meta\">\n");
        let rows = [
            ("Topic", escape_html(&result.topic)),
            ("Audience", escape_html(&result.audience)),
            ("Style", escape_html(&result.style_label)),
            ("Input tokens used", result.input_token_count.to_string()),
            ("Output tokens used", result.output_token_count.to_string()),
            ("Inference time", format!("{:.2} s", result.latency_seconds)),
            ("Sources", source_summary(result)),
        ];
        for (name, value) in rows {
            let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", name, value);
        }
        html.push_str("</table>\n<article>\n");
        html.push_str(&result.post_html);
        html.push_str("\n</article>\n</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn source_summary(result: &GenerationResult) -> String {
    if result.used_fallback {
        return "none (written from general knowledge)".to_string();
    }
    let links: Vec<String> = result
        .sources
        .iter()
        .map(|u| {
            let u = escape_html(u);
            format!("<a href=\"{u}\">{u}</a>")
        })
        .collect();
    format!("{} article(s): {}", links.len(), links.join(", "))
}
