//! Content type declarations (`[Content_Types].xml`)

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;

/// Parsed `[Content_Types].xml`
///
/// Keys are lowercased: part names and extensions are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// Extension (without dot) to content type
    defaults: HashMap<String, String>,
    /// Part name (with leading slash) to content type
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    /// Parse content type declarations from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e) => {
                    let local = e.local_name();
                    let is_default = local.as_ref() == b"Default";
                    let is_override = local.as_ref() == b"Override";

                    if is_default || is_override {
                        let mut key = None;
                        let mut content_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
                            match attr.key.as_ref() {
                                b"Extension" | b"PartName" => {
                                    key = Some(value.to_ascii_lowercase());
                                }
                                b"ContentType" => content_type = Some(value.into_owned()),
                                _ => {}
                            }
                        }

                        if let (Some(key), Some(content_type)) = (key, content_type) {
                            if is_default {
                                types.defaults.insert(key, content_type);
                            } else {
                                types.overrides.insert(key, content_type);
                            }
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Look up the content type for a part URI
    pub fn lookup(&self, uri: &str) -> Option<&str> {
        let part_name = format!("/{}", uri.trim_start_matches('/')).to_ascii_lowercase();
        if let Some(ct) = self.overrides.get(&part_name) {
            return Some(ct.as_str());
        }

        let file = part_name.rsplit('/').next().unwrap_or(&part_name);
        let (_, extension) = file.rsplit_once('.')?;
        self.defaults.get(extension).map(|s| s.as_str())
    }
}
