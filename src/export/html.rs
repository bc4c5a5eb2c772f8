use crate::database::is_titled;
use crate::database::ColumnRecord;
use crate::error::SheetExportError;
use crate::export::common_row_count;
use crate::export::ExportFormat;
use crate::export::Exporter;
use quick_xml::escape::escape;
use quick_xml::escape::partial_escape;
use std::borrow::Cow;
use url::Url;

/// One `<table>` per form. Linked cells render as anchors.
#[derive(Copy, Clone, Debug, Default)]
pub struct HtmlExporter;

impl Exporter for HtmlExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }

    fn render(&self, _index: usize, form: &[ColumnRecord]) -> Result<String, SheetExportError> {
        let row_count = common_row_count(form)?;
        let mut html = String::from("<table>");

        if !form.is_empty() && is_titled(form) {
            html.push_str("<thead><tr>");
            for record in form {
                html.push_str(&format!("<th>{}</th>", partial_escape(&record.title.to_string())));
            }
            html.push_str("</tr></thead>");
        }

        html.push_str("<tbody>");
        for row in 0..row_count {
            html.push_str("<tr>");
            for record in form {
                match record.cell(row) {
                    (text, Some(link)) => html.push_str(&format!(
                        r#"<td><a href="{}">{}</a></td>"#,
                        escape(&*with_scheme(link)),
                        partial_escape(text)
                    )),
                    (text, None) => html.push_str(&format!("<td>{}</td>", partial_escape(text))),
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        Ok(html)
    }
}

/// Schemes a link may keep; anything else is treated as a host name.
const LINK_SCHEMES: [&str; 4] = ["http", "https", "ftp", "mailto"];

/// Prefixes `http://` to links that carry no known scheme.
///
/// `host:port` parses as a URL with the host as scheme, so only the listed
/// schemes count.
fn with_scheme(link: &str) -> Cow<'_, str> {
    match Url::parse(link) {
        Ok(url) if LINK_SCHEMES.contains(&url.scheme()) => Cow::Borrowed(link),
        _ => Cow::Owned(format!("http://{}", link)),
    }
}
