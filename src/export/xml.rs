use crate::database::ColumnRecord;
use crate::error::SheetExportError;
use crate::export::common_row_count;
use crate::export::ExportError;
use crate::export::ExportFormat;
use crate::export::Exporter;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Writer;
use std::collections::HashSet;
use std::io::Cursor;

/// One `<SheetN>` element per form holding a self-closing `<_R>` element per
/// row. Columns become attributes named after their titles.
#[derive(Copy, Clone, Debug, Default)]
pub struct XmlExporter;

impl Exporter for XmlExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xml
    }

    fn render(&self, index: usize, form: &[ColumnRecord]) -> Result<String, SheetExportError> {
        let names = attribute_names(form)?;
        let row_count = common_row_count(form)?;
        let root = format!("Sheet{}", index + 1);

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Start(BytesStart::new(root.as_str())))?;
        for row in 0..row_count {
            let name = format!("_{}", row + 1);
            let mut element = BytesStart::new(name.as_str());
            for (record, name) in form.iter().zip(&names) {
                let (text, link) = record.cell(row);
                element.push_attribute((name.as_str(), text));
                if let Some(link) = link {
                    element.push_attribute((format!("{}_link", name).as_str(), link));
                }
            }
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new(root.as_str())))?;

        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }
}

/// Attribute name of every column, derived from its title.
///
/// Fails when a column is untitled or when two attributes of a row would share
/// a name, counting the `_link` attributes of linked columns.
fn attribute_names(form: &[ColumnRecord]) -> Result<Vec<String>, ExportError> {
    let names = form
        .iter()
        .enumerate()
        .map(|(column, record)| {
            record
                .title
                .as_str()
                .map(attribute_name)
                .ok_or(ExportError::MissingTitlesForXml(column + 1))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for (record, name) in form.iter().zip(&names) {
        let link = record.row_links.as_ref().map(|_| format!("{}_link", name));
        for attribute in std::iter::once(name.to_owned()).chain(link) {
            if !seen.insert(attribute.to_owned()) {
                return Err(ExportError::DuplicateXmlAttribute(attribute));
            }
        }
    }
    Ok(names)
}

/// Turns a title into an XML name: characters outside letters, digits, `_`,
/// `-` and `.` become `_`, and a name not starting with a letter or `_` is
/// prefixed with `_`.
fn attribute_name(title: &str) -> String {
    let name: String = title
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') => c,
            _ => '_',
        })
        .collect();
    match name.chars().next() {
        Some(first) if first.is_alphabetic() || first == '_' => name,
        _ => format!("_{}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::linked;
    use crate::export::tests::named;
    use crate::export::tests::sample_form;
    use crate::export::tests::untitled;
    use pretty_assertions::assert_eq;

    #[test]
    fn rows_as_attributes() {
        assert_eq!(
            XmlExporter.render(0, &sample_form()).unwrap(),
            concat!(
                "<Sheet1>",
                r#"<_1 Name="Ann" Site="Ann" Site_link="a.example"/>"#,
                r#"<_2 Name="Bo" Site="Bo" Site_link="b.example"/>"#,
                "</Sheet1>",
            )
        );
    }

    #[test]
    fn root_follows_form_position() {
        let output = XmlExporter.render(2, &[named("Id", &["7"])]).unwrap();
        assert_eq!(output, r#"<Sheet3><_1 Id="7"/></Sheet3>"#);
    }

    #[test]
    fn spaces_in_titles_and_escaped_values() {
        let form = vec![
            named("First name", &["<Ann> & \"Co\""]),
            linked("Home page", &["x"], &["a.example/?a=1&b=2"]),
        ];
        assert_eq!(
            XmlExporter.render(0, &form).unwrap(),
            concat!(
                "<Sheet1>",
                r#"<_1 First_name="&lt;Ann&gt; &amp; &quot;Co&quot;" Home_page="x" Home_page_link="a.example/?a=1&amp;b=2"/>"#,
                "</Sheet1>",
            )
        );
    }

    #[test]
    fn titles_become_valid_names() {
        assert_eq!(attribute_name("Price ($)"), "Price____");
        assert_eq!(attribute_name("2024"), "_2024");
        assert_eq!(attribute_name("Say \"hi\""), "Say__hi_");
        assert_eq!(attribute_name("ns:tag"), "ns_tag");
        assert_eq!(attribute_name("-x"), "_-x");
        assert_eq!(attribute_name("Größe.v2"), "Größe.v2");
        assert_eq!(attribute_name(""), "_");

        let form = vec![named("Price ($)", &["3"]), named("2024", &["yes"])];
        assert_eq!(
            XmlExporter.render(0, &form).unwrap(),
            r#"<Sheet1><_1 Price____="3" _2024="yes"/></Sheet1>"#
        );
    }

    #[test]
    fn duplicate_attributes_are_rejected() {
        let form = vec![named("First name", &["a"]), named("First_name", &["b"])];
        assert_eq!(
            attribute_names(&form),
            Err(ExportError::DuplicateXmlAttribute("First_name".to_string()))
        );

        let form = vec![linked("Site", &["a"], &["l"]), named("Site link", &["b"])];
        assert!(matches!(
            XmlExporter.render(0, &form),
            Err(SheetExportError::ExportError(ExportError::DuplicateXmlAttribute(name))) if name == "Site_link"
        ));
    }

    #[test]
    fn zero_rows() {
        assert_eq!(
            XmlExporter.render(0, &[named("Name", &[])]).unwrap(),
            "<Sheet1></Sheet1>"
        );
    }

    #[test]
    fn untitled_columns_are_rejected() {
        let form = vec![named("Name", &["Ann"]), untitled(&["x"])];
        assert!(matches!(
            XmlExporter.render(0, &form),
            Err(SheetExportError::ExportError(ExportError::MissingTitlesForXml(2)))
        ));

        // Rejected even without rows to render
        assert!(XmlExporter.render(0, &[untitled(&[])]).is_err());
    }
}
