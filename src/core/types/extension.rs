//! Extension elements: named, attributed, text- or child-bearing nodes
//! carried by an Entry outside the Atom vocabulary.

/// One extension element. Children and attributes keep insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtensionElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<ExtensionElement>,
}

impl ExtensionElement {
    pub fn new(name: impl Into<String>) -> Self {
        ExtensionElement {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: ExtensionElement) -> Self {
        self.children.push(child);
        self
    }

    /// First attribute value under the given name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&ExtensionElement> {
        self.children.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let ext = ExtensionElement::new("x:price")
            .with_attribute("currency", "EUR")
            .with_text("9.50")
            .with_child(ExtensionElement::new("x:tax").with_text("1.50"));
        assert_eq!(ext.attribute("currency"), Some("EUR"));
        assert_eq!(ext.text.as_deref(), Some("9.50"));
        assert_eq!(ext.child("x:tax").unwrap().text.as_deref(), Some("1.50"));
        assert!(ext.child("missing").is_none());
    }
}
