use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::collector::ResultSet;

pub const ROOT_ELEMENT: &str = "SNMPData";
pub const ENTRY_ELEMENT: &str = "Entry";

/// XML выгрузка результата:
///
/// ```xml
/// <SNMPData><Entry name="sysDescr"><OID>1.3.6.1.2.1.1.1.0</OID><Value>Linux</Value></Entry></SNMPData>
/// ```
pub struct XmlFormatter;

impl XmlFormatter {
    /// По `Entry` на метрику в порядке записи. Имена и текст экранируются
    pub fn export_markup(results: &ResultSet) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
        for (name, entry) in results {
            let mut element = BytesStart::new(ENTRY_ELEMENT);
            element.push_attribute(("name", name.as_str()));
            writer.write_event(Event::Start(element))?;
            Self::write_text_element(&mut writer, "OID", &entry.oid)?;
            Self::write_text_element(&mut writer, "Value", &entry.value)?;
            writer.write_event(Event::End(BytesEnd::new(ENTRY_ELEMENT)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new(tag)))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }
}
