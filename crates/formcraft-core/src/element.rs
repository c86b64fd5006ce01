//! The closed set of palette element types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A component type that can be placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ElementType {
    TextInput,
    EmailInput,
    PasswordInput,
    NumberInput,
    DateInput,
    Textarea,
    Select,
    RadioGroup,
    Checkbox,
    Button,
    Heading,
    Paragraph,
    Container,
}

impl ElementType {
    /// Every element type, in palette order.
    pub const ALL: [ElementType; 13] = [
        Self::TextInput,
        Self::EmailInput,
        Self::PasswordInput,
        Self::NumberInput,
        Self::DateInput,
        Self::Textarea,
        Self::Select,
        Self::RadioGroup,
        Self::Checkbox,
        Self::Button,
        Self::Heading,
        Self::Paragraph,
        Self::Container,
    ];

    /// Kebab-case type string used by palettes, snapshots and markup.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TextInput => "text-input",
            Self::EmailInput => "email-input",
            Self::PasswordInput => "password-input",
            Self::NumberInput => "number-input",
            Self::DateInput => "date-input",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::RadioGroup => "radio-group",
            Self::Checkbox => "checkbox",
            Self::Button => "button",
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::Container => "container",
        }
    }

    /// Human-readable name, used as the default editor label.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::TextInput => "Text Input",
            Self::EmailInput => "Email Input",
            Self::PasswordInput => "Password Input",
            Self::NumberInput => "Number Input",
            Self::DateInput => "Date Input",
            Self::Textarea => "Textarea",
            Self::Select => "Select",
            Self::RadioGroup => "Radio Group",
            Self::Checkbox => "Checkbox",
            Self::Button => "Button",
            Self::Heading => "Heading",
            Self::Paragraph => "Paragraph",
            Self::Container => "Container",
        }
    }

    /// Whether nodes of this type own children.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Container)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ElementTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| ElementTypeParseError {
                input: s.to_string(),
            })
    }
}

impl TryFrom<String> for ElementType {
    type Error = ElementTypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementType> for &'static str {
    fn from(ty: ElementType) -> Self {
        ty.as_str()
    }
}

/// An element type string outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTypeParseError {
    pub input: String,
}

impl fmt::Display for ElementTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown element type: {:?}", self.input)
    }
}

impl std::error::Error for ElementTypeParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for ty in ElementType::ALL {
            assert_eq!(ty.as_str().parse::<ElementType>(), Ok(ty), "type {ty:?}");
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "slider".parse::<ElementType>().expect_err("slider is unsupported");
        assert_eq!(err.input, "slider");
        assert_eq!(err.to_string(), "unknown element type: \"slider\"");
    }

    #[test]
    fn only_containers_are_containers() {
        let containers: Vec<_> = ElementType::ALL
            .into_iter()
            .filter(|ty| ty.is_container())
            .collect();
        assert_eq!(containers, vec![ElementType::Container]);
    }
}
