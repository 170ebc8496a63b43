// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A self-contained HTML report around rendered SVG.

use crate::svg::escape_xml;

/// One chart on the report page.
#[derive(Debug)]
pub(crate) struct HtmlSection<'a> {
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    /// Inline SVG markup.
    pub(crate) svg: String,
    /// `(reason, checked)` rows, drawn read-only next to the chart.
    pub(crate) checkboxes: Vec<(String, bool)>,
}

const STYLE: &str = "\
body { font-family: sans-serif; margin: 24px; color: #222; }
section { margin-bottom: 32px; }
.chart-row { display: flex; gap: 24px; align-items: flex-start; }
.checkbox-container { max-height: 600px; overflow-y: auto; font-size: 13px; }
.checkbox-item { margin: 2px 0; }
.checkbox-item label { margin-left: 5px; }
p.description { color: #555; }
";

/// Renders `sections` into one page.
pub(crate) fn render_report(title: &str, sections: &[HtmlSection<'_>]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_xml(title)));
    out.push_str(&format!("<style>\n{STYLE}</style>\n"));
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape_xml(title)));

    for section in sections {
        out.push_str("<section>\n");
        out.push_str(&format!("<h2>{}</h2>\n", escape_xml(section.title)));
        out.push_str(&format!(
            "<p class=\"description\">{}</p>\n",
            escape_xml(section.description)
        ));
        out.push_str("<div class=\"chart-row\">\n");
        if !section.checkboxes.is_empty() {
            out.push_str("<div class=\"checkbox-container\">\n");
            for (i, (reason, checked)) in section.checkboxes.iter().enumerate() {
                let reason = escape_xml(reason);
                out.push_str(&format!(
                    "<div class=\"checkbox-item\"><input type=\"checkbox\" id=\"reason-{i}\" \
                     value=\"{reason}\" disabled{}><label for=\"reason-{i}\">{reason}</label></div>\n",
                    if *checked { " checked" } else { "" }
                ));
            }
            out.push_str("</div>\n");
        }
        out.push_str("<div class=\"chart-container\">\n");
        out.push_str(&section.svg);
        out.push_str("</div>\n</div>\n</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkboxes_reflect_the_selection() {
        let html = render_report(
            "311 <calls>",
            &[HtmlSection {
                title: "Top reasons",
                description: "2 of 3",
                svg: String::from("<svg></svg>"),
                checkboxes: vec![
                    ("Street Lights".into(), true),
                    ("Rodent & Pests".into(), false),
                ],
            }],
        );
        assert!(html.contains("<title>311 &lt;calls&gt;</title>"));
        assert!(html.contains(r#"value="Street Lights" disabled checked>"#));
        assert!(html.contains(r#"value="Rodent &amp; Pests" disabled>"#));
        assert!(html.contains("<svg></svg>"));
        assert_eq!(html.matches("type=\"checkbox\"").count(), 2);
    }
}
