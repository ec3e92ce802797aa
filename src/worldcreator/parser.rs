use super::types::*;
use crate::error::DocumentError;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

const ROOT_ELEMENT: &str = "WorldCreator";
const OBJECTS_ELEMENT: &str = "Objects";

/// Read an attribute value, XML-unescaped
fn attribute(e: &BytesStart, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .map(|attr| {
            let raw = String::from_utf8_lossy(&attr.value);
            unescape(&raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
}

/// Object group being assembled from XML events
struct PendingGroup {
    tag: String,
    data_count: Option<String>,
    first_child_seen: bool,
    data: String,
}

impl PendingGroup {
    fn finish(self) -> ObjectGroup {
        ObjectGroup {
            tag: self.tag,
            data_count: self.data_count.unwrap_or_default(),
            data: self.data,
        }
    }
}

/// Tracks where the reader is relative to the first `Objects` element.
///
/// Depths are 1-based element depths: the root is 1. With `Objects` at
/// depth `d`, the layer container sits at `d + 1`, layers at `d + 2`, object
/// groups at `d + 3` and the element carrying `DataCount` at `d + 4`.
#[derive(Default)]
struct DocumentBuilder {
    root_seen: bool,
    objects_depth: Option<usize>,
    in_container: bool,
    container_done: bool,
    layer: Option<Layer>,
    group: Option<PendingGroup>,
    layers: Vec<Layer>,
}

impl DocumentBuilder {
    fn open(&mut self, e: &BytesStart, depth: usize, empty: bool) -> Result<(), DocumentError> {
        let name_bytes = e.name();
        let name = std::str::from_utf8(name_bytes.as_ref()).unwrap_or("");

        if !self.root_seen {
            if name != ROOT_ELEMENT {
                return Err(DocumentError::InvalidRoot {
                    found: name.to_string(),
                });
            }
            self.root_seen = true;
        }

        let Some(objects) = self.objects_depth else {
            if name == OBJECTS_ELEMENT {
                self.objects_depth = Some(depth);
                self.container_done = empty;
            }
            return Ok(());
        };

        if depth == objects + 1 && !self.in_container && !self.container_done {
            self.in_container = true;
        } else if self.in_container && depth == objects + 2 {
            self.layer = Some(Layer {
                name: attribute(e, "Name").unwrap_or_default(),
                groups: Vec::new(),
            });
        } else if self.in_container && depth == objects + 3 && self.layer.is_some() {
            self.group = Some(PendingGroup {
                tag: attribute(e, "Tag").unwrap_or_default(),
                data_count: attribute(e, "DataCount"),
                first_child_seen: false,
                data: String::new(),
            });
        } else if self.in_container && depth == objects + 4 {
            if let Some(group) = self.group.as_mut()
                && !group.first_child_seen
            {
                group.first_child_seen = true;
                if let Some(count) = attribute(e, "DataCount") {
                    group.data_count = Some(count);
                }
            }
        }

        if empty {
            self.close(depth);
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(group) = self.group.as_mut() {
            group.data.push_str(text);
        }
    }

    fn close(&mut self, depth: usize) {
        let Some(objects) = self.objects_depth else {
            return;
        };
        if !self.in_container {
            if depth == objects {
                self.container_done = true;
            }
            return;
        }

        if depth == objects + 3 {
            if let (Some(group), Some(layer)) = (self.group.take(), self.layer.as_mut()) {
                layer.groups.push(group.finish());
            }
        } else if depth == objects + 2 {
            if let Some(layer) = self.layer.take() {
                self.layers.push(layer);
            }
        } else if depth == objects + 1 {
            self.in_container = false;
            self.container_done = true;
        }
    }
}

/// Parse a World Creator XML project into its object layers
pub fn parse_world_creator(xml_string: &str) -> Result<WorldCreatorDocument, DocumentError> {
    let mut reader = Reader::from_str(xml_string);
    reader.config_mut().trim_text(true);

    let mut builder = DocumentBuilder::default();
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                builder.open(e, depth, false)?;
            }
            Ok(Event::Empty(ref e)) => {
                builder.open(e, depth + 1, true)?;
            }
            Ok(Event::Text(ref e)) => {
                builder.text(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(ref e)) => {
                builder.text(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::End(_)) => {
                builder.close(depth);
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocumentError::Xml(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if !builder.root_seen {
        return Err(DocumentError::InvalidRoot {
            found: String::new(),
        });
    }
    if builder.objects_depth.is_none() {
        return Err(DocumentError::MissingObjects);
    }

    Ok(WorldCreatorDocument {
        layers: builder.layers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layers_and_groups() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<WorldCreator Version="2">
  <Terrain Width="1024" />
  <Objects>
    <Layers>
      <Layer Name="Trees">
        <Object Tag="Pine"><Data DataCount="2">AAAA
          BBBB</Data></Object>
        <Object Tag="Birch &amp; Oak"><Data DataCount="x">CCCC</Data></Object>
      </Layer>
      <Layer Name="Rocks" />
    </Layers>
    <Ignored><Layer Name="Other" /></Ignored>
  </Objects>
</WorldCreator>"#;

        let doc = parse_world_creator(xml).unwrap();
        assert_eq!(doc.layers.len(), 2);

        let trees = &doc.layers[0];
        assert_eq!(trees.name, "Trees");
        assert_eq!(trees.groups.len(), 2);
        assert_eq!(trees.groups[0].tag, "Pine");
        assert_eq!(trees.groups[0].data_count, "2");
        assert_eq!(trees.groups[0].data, "AAAA\n          BBBB");
        assert_eq!(trees.groups[1].tag, "Birch & Oak");
        assert_eq!(trees.groups[1].data_count, "x");

        assert_eq!(doc.layers[1].name, "Rocks");
        assert!(doc.layers[1].groups.is_empty());
    }

    #[test]
    fn test_data_count_on_object_element() {
        let xml = r#"<WorldCreator><Objects><Layers>
            <Layer Name="A"><Object Tag="T" DataCount="4"><![CDATA[QUJD]]></Object></Layer>
        </Layers></Objects></WorldCreator>"#;

        let doc = parse_world_creator(xml).unwrap();
        let group = &doc.layers[0].groups[0];
        assert_eq!(group.data_count, "4");
        assert_eq!(group.data, "QUJD");
    }

    #[test]
    fn test_missing_data_count() {
        let xml = r#"<WorldCreator><Objects><Layers>
            <Layer Name="A"><Object Tag="T"><Data>QUJD</Data></Object></Layer>
        </Layers></Objects></WorldCreator>"#;

        let doc = parse_world_creator(xml).unwrap();
        assert_eq!(doc.layers[0].groups[0].data_count, "");
    }

    #[test]
    fn test_wrong_root() {
        let xml = r#"<?xml version="1.0"?><LightBurnProject><Objects/></LightBurnProject>"#;
        match parse_world_creator(xml) {
            Err(DocumentError::InvalidRoot { found }) => assert_eq!(found, "LightBurnProject"),
            other => panic!("Expected InvalidRoot, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_objects() {
        let xml = r#"<WorldCreator><Terrain/></WorldCreator>"#;
        assert!(matches!(
            parse_world_creator(xml),
            Err(DocumentError::MissingObjects)
        ));
    }

    #[test]
    fn test_empty_objects() {
        let doc = parse_world_creator("<WorldCreator><Objects/></WorldCreator>").unwrap();
        assert!(doc.layers.is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        let xml = "<WorldCreator><Objects><Layers></Objects></WorldCreator>";
        assert!(matches!(
            parse_world_creator(xml),
            Err(DocumentError::Xml(_))
        ));
    }
}
