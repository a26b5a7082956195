//! Template document handling
//!
//! A template is a FIBEX skeleton with empty ECUS/FRAMES/SIGNALS/CODINGS
//! containers, one FRAME-TRIGGERINGS container per channel, and a scaffold
//! node carrying the default controller parameters:
//!
//! ```xml
//! <xls2fbx>
//!   <ControllerValues>
//!     <flexray:MAX-DYNAMIC-PAYLOAD-LENGTH>127</flexray:MAX-DYNAMIC-PAYLOAD-LENGTH>
//!     ...
//!   </ControllerValues>
//!   <ChannelA>Channel_1</ChannelA>
//!   <ChannelB>Channel_2</ChannelB>
//! </xls2fbx>
//! ```
//!
//! Everything is validated when the template is loaded, before any fragment
//! is generated. The scaffold is removed when the template is finished.

use crate::config::DocumentOrder;
use crate::model::Channel;
use crate::schema::{self, fx};
use crate::types::{FibexError, Result};
use crate::xml::{Document, Element};

/// Shared containers that receive generated fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Ecus,
    Frames,
    Signals,
    Codings,
}

impl Container {
    pub const ALL: [Container; 4] = [Container::Ecus, Container::Frames, Container::Signals, Container::Codings];

    pub fn element_name(self) -> &'static str {
        match self {
            Container::Ecus => fx::ECUS,
            Container::Frames => fx::FRAMES,
            Container::Signals => fx::SIGNALS,
            Container::Codings => fx::CODINGS,
        }
    }
}

/// Default controller parameters, copied into every generated controller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerDefaults {
    params: Vec<Element>,
}

impl ControllerDefaults {
    pub fn new(params: Vec<Element>) -> Self {
        Self { params }
    }

    /// Parameters in template order
    pub fn params(&self) -> &[Element] {
        &self.params
    }
}

/// Ids of the two channels declared by the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelIds([String; 2]);

impl ChannelIds {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self([a.into(), b.into()])
    }

    pub fn get(&self, channel: Channel) -> &str {
        &self.0[channel.index()]
    }
}

impl Default for ChannelIds {
    fn default() -> Self {
        let [a, b] = schema::DEFAULT_CHANNEL_IDS;
        Self::new(a, b)
    }
}

/// A validated template, ready to receive fragments
#[derive(Debug)]
pub struct Template {
    document: Document,
    scaffold: String,
    controller_defaults: ControllerDefaults,
    channel_ids: ChannelIds,
}

impl Template {
    /// Parse and validate a template
    ///
    /// Fails with `MalformedTemplate` if the document is not well formed,
    /// misses a namespace declaration, a container, or the scaffold.
    pub fn parse(text: &str, scaffold: &str) -> Result<Self> {
        let document = Document::parse(text)
            .map_err(|e| FibexError::MalformedTemplate(format!("not well-formed: {}", e)))?;
        let root = &document.root;

        for (prefix, uri) in schema::NAMESPACES {
            let declared = root.attr(&format!("xmlns:{}", prefix));
            if declared != Some(uri) {
                return Err(FibexError::MalformedTemplate(format!(
                    "root <{}> must bind prefix '{}' to {}",
                    root.name, prefix, uri
                )));
            }
        }

        for container in Container::ALL {
            if root.find(container.element_name()).is_none() {
                return Err(FibexError::MalformedTemplate(format!(
                    "missing <{}> container",
                    container.element_name()
                )));
            }
        }

        let triggerings = root.find_all(fx::FRAME_TRIGGERINGS).len();
        if triggerings < 2 {
            return Err(FibexError::MalformedTemplate(format!(
                "expected one <{}> container per channel, found {}",
                fx::FRAME_TRIGGERINGS,
                triggerings
            )));
        }
        if triggerings > 2 {
            log::warn!(
                "Template has {} <{}> containers, only the first two are used",
                triggerings,
                fx::FRAME_TRIGGERINGS
            );
        }

        let scaffold_node = root
            .child(scaffold)
            .ok_or_else(|| FibexError::MalformedTemplate(format!("missing <{}> scaffold node", scaffold)))?;
        let controller_values = scaffold_node.child(schema::SCAFFOLD_CONTROLLER_VALUES).ok_or_else(|| {
            FibexError::MalformedTemplate(format!(
                "scaffold <{}> has no <{}>",
                scaffold,
                schema::SCAFFOLD_CONTROLLER_VALUES
            ))
        })?;
        let controller_defaults = ControllerDefaults::new(controller_values.child_elements().cloned().collect());

        let defaults = ChannelIds::default();
        let channel_id = |name: &str, channel: Channel| {
            scaffold_node
                .child(name)
                .map(|e| e.text().trim().to_string())
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| defaults.get(channel).to_string())
        };
        let channel_ids = ChannelIds::new(
            channel_id(schema::SCAFFOLD_CHANNEL_A, Channel::A),
            channel_id(schema::SCAFFOLD_CHANNEL_B, Channel::B),
        );

        log::debug!(
            "Template loaded: {} default controller parameters, channels {} / {}",
            controller_defaults.params().len(),
            channel_ids.get(Channel::A),
            channel_ids.get(Channel::B)
        );

        Ok(Self {
            document,
            scaffold: scaffold.to_string(),
            controller_defaults,
            channel_ids,
        })
    }

    pub fn controller_defaults(&self) -> &ControllerDefaults {
        &self.controller_defaults
    }

    pub fn channel_ids(&self) -> &ChannelIds {
        &self.channel_ids
    }

    /// Place fragments into one of the shared containers
    pub fn insert(&mut self, container: Container, fragments: Vec<Element>, order: DocumentOrder) -> Result<()> {
        let target = self
            .document
            .root
            .find_mut(container.element_name())
            .ok_or_else(|| FibexError::MalformedTemplate(format!("missing <{}> container", container.element_name())))?;
        target.place_all(fragments, order);
        Ok(())
    }

    /// Place frame triggerings into the container of `channel`
    pub fn insert_triggerings(&mut self, channel: Channel, fragments: Vec<Element>, order: DocumentOrder) -> Result<()> {
        let mut containers = self.document.root.find_all_mut(fx::FRAME_TRIGGERINGS);
        if containers.len() <= channel.index() {
            return Err(FibexError::MalformedTemplate(format!(
                "no <{}> container for channel {}",
                fx::FRAME_TRIGGERINGS,
                channel
            )));
        }
        containers.swap_remove(channel.index()).place_all(fragments, order);
        Ok(())
    }

    /// Remove the scaffold and hand out the finished document
    pub fn finish(mut self) -> Result<Document> {
        self.document
            .root
            .remove_child(&self.scaffold)
            .ok_or_else(|| FibexError::MalformedTemplate(format!("missing <{}> scaffold node", self.scaffold)))?;
        Ok(self.document)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TEMPLATE: &str = concat!(
        r#"<fx:FIBEX xmlns:fx="http://www.asam.net/xml/fbx" xmlns:ho="http://www.asam.net/xml" "#,
        r#"xmlns:flexray="http://www.asam.net/xml/fbx/flexray" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        r#"<fx:ELEMENTS><fx:CLUSTERS/><fx:CHANNELS>"#,
        r#"<fx:CHANNEL ID="Channel_1"><fx:FRAME-TRIGGERINGS/></fx:CHANNEL>"#,
        r#"<fx:CHANNEL ID="Channel_2"><fx:FRAME-TRIGGERINGS/></fx:CHANNEL>"#,
        r#"</fx:CHANNELS><fx:ECUS/><fx:SIGNALS/><fx:FRAMES/></fx:ELEMENTS>"#,
        r#"<fx:PROCESSING-INFORMATION><fx:CODINGS/></fx:PROCESSING-INFORMATION>"#,
        r#"<xls2fbx><ControllerValues><flexray:MAX-DYNAMIC-PAYLOAD-LENGTH>127</flexray:MAX-DYNAMIC-PAYLOAD-LENGTH>"#,
        r#"<flexray:CLUSTER-DRIFT-DAMPING>2</flexray:CLUSTER-DRIFT-DAMPING></ControllerValues></xls2fbx>"#,
        r#"</fx:FIBEX>"#
    );

    #[test]
    fn test_template_loads_defaults() {
        let template = Template::parse(TEMPLATE, "xls2fbx").unwrap();
        let names: Vec<_> = template
            .controller_defaults()
            .params()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["flexray:MAX-DYNAMIC-PAYLOAD-LENGTH", "flexray:CLUSTER-DRIFT-DAMPING"]
        );
        assert_eq!(template.channel_ids().get(Channel::A), "Channel_1");
        assert_eq!(template.channel_ids().get(Channel::B), "Channel_2");
    }

    #[test]
    fn test_channel_ids_from_scaffold() {
        let text = TEMPLATE.replace(
            "</ControllerValues>",
            "</ControllerValues><ChannelA>FR_A</ChannelA><ChannelB> FR_B </ChannelB>",
        );
        let template = Template::parse(&text, "xls2fbx").unwrap();
        assert_eq!(template.channel_ids().get(Channel::A), "FR_A");
        assert_eq!(template.channel_ids().get(Channel::B), "FR_B");
    }

    #[test]
    fn test_missing_containers_are_rejected() {
        for removed in ["<fx:ECUS/>", "<fx:SIGNALS/>", "<fx:FRAMES/>", "<fx:CODINGS/>"] {
            let text = TEMPLATE.replace(removed, "");
            let err = Template::parse(&text, "xls2fbx").unwrap_err();
            assert!(matches!(err, FibexError::MalformedTemplate(_)), "{} -> {:?}", removed, err);
        }

        let text = TEMPLATE.replacen("<fx:FRAME-TRIGGERINGS/>", "", 1);
        assert!(matches!(
            Template::parse(&text, "xls2fbx"),
            Err(FibexError::MalformedTemplate(_))
        ));
    }

    #[test]
    fn test_missing_scaffold_is_rejected() {
        assert!(matches!(
            Template::parse(TEMPLATE, "scaffold"),
            Err(FibexError::MalformedTemplate(_))
        ));

        let text = TEMPLATE.replace("ControllerValues", "Values");
        assert!(matches!(
            Template::parse(&text, "xls2fbx"),
            Err(FibexError::MalformedTemplate(_))
        ));
    }

    #[test]
    fn test_missing_namespace_is_rejected() {
        let text = TEMPLATE.replace(r#" xmlns:ho="http://www.asam.net/xml""#, "");
        assert!(matches!(
            Template::parse(&text, "xls2fbx"),
            Err(FibexError::MalformedTemplate(_))
        ));
        assert!(matches!(
            Template::parse("<fx:FIBEX>", "xls2fbx"),
            Err(FibexError::MalformedTemplate(_))
        ));
    }

    #[test]
    fn test_finish_removes_scaffold() {
        let mut template = Template::parse(TEMPLATE, "xls2fbx").unwrap();
        template
            .insert_triggerings(Channel::B, vec![Element::new("fx:FRAME-TRIGGERING")], DocumentOrder::Prepend)
            .unwrap();
        let doc = template.finish().unwrap();
        assert!(doc.root.child("xls2fbx").is_none());

        let channels = doc.root.find_all(fx::FRAME_TRIGGERINGS);
        assert_eq!(channels[0].child_elements().count(), 0);
        assert_eq!(channels[1].child_elements().count(), 1);
    }
}
