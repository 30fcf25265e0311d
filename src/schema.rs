use crate::form::{Form, Type};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Schema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<BTreeMap<String, Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Box<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_properties: Option<BTreeMap<String, Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Box<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Discriminator {
    pub tag: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<BTreeMap<String, Schema>>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("ambiguous or invalid schema form")]
    InvalidForm,

    #[error("non-root definition")]
    NonRootDefinition,

    #[error("no such definition: {definition}")]
    NoSuchDefinition { definition: String },

    #[error("no such type: {type_value}")]
    InvalidType { type_value: String },

    #[error("empty enum")]
    EmptyEnum,

    #[error("repeated enum value: {value}")]
    RepeatedEnumValue { value: String },

    #[error("repeated property in properties and optionalProperties: {property}")]
    RepeatedProperty { property: String },

    #[error("discriminator with missing mapping")]
    MissingDiscriminatorMapping,

    #[error("value of discriminator mapping is not of properties form")]
    NonPropertiesMapping,

    #[error("discriminator tag repeated in properties or optionalProperties: {tag}")]
    RepeatedTagInProperties { tag: String },
}

impl Schema {
    // On a schema carrying multiple form keywords, the highest-priority
    // keyword wins; verify rejects such schemas.
    pub fn form(&self) -> Form {
        if self.ref_.is_some() {
            Form::Ref
        } else if self.type_.is_some() {
            Form::Type
        } else if self.enum_.is_some() {
            Form::Enum
        } else if self.elements.is_some() {
            Form::Elements
        } else if self.properties.is_some() || self.optional_properties.is_some() {
            Form::Properties
        } else if self.values.is_some() {
            Form::Values
        } else if self.discriminator.is_some() {
            Form::Discriminator
        } else {
            Form::Empty
        }
    }

    pub fn verify(&self) -> Result<(), VerifyError> {
        self.verify_node(self, true)
    }

    fn verify_node(&self, root: &Schema, is_root: bool) -> Result<(), VerifyError> {
        if !is_root && self.definitions.is_some() {
            return Err(VerifyError::NonRootDefinition);
        }

        let mut num_forms = 0;
        if self.ref_.is_some() {
            num_forms += 1;
        }
        if self.type_.is_some() {
            num_forms += 1;
        }
        if self.enum_.is_some() {
            num_forms += 1;
        }
        if self.elements.is_some() {
            num_forms += 1;
        }
        if self.properties.is_some() || self.optional_properties.is_some() {
            num_forms += 1;
        }
        if self.values.is_some() {
            num_forms += 1;
        }
        if self.discriminator.is_some() {
            num_forms += 1;
        }

        if num_forms > 1 {
            return Err(VerifyError::InvalidForm);
        }

        if let Some(definition) = &self.ref_ {
            let defined = root
                .definitions
                .as_ref()
                .map_or(false, |definitions| definitions.contains_key(definition));

            if !defined {
                return Err(VerifyError::NoSuchDefinition {
                    definition: definition.clone(),
                });
            }
        }

        if let Some(type_value) = &self.type_ {
            if type_value.parse::<Type>().is_err() {
                return Err(VerifyError::InvalidType {
                    type_value: type_value.clone(),
                });
            }
        }

        if let Some(values) = &self.enum_ {
            if values.is_empty() {
                return Err(VerifyError::EmptyEnum);
            }

            let mut seen = BTreeSet::new();
            for value in values {
                if !seen.insert(value) {
                    return Err(VerifyError::RepeatedEnumValue {
                        value: value.clone(),
                    });
                }
            }
        }

        if let (Some(required), Some(optional)) = (&self.properties, &self.optional_properties) {
            for property in required.keys() {
                if optional.contains_key(property) {
                    return Err(VerifyError::RepeatedProperty {
                        property: property.clone(),
                    });
                }
            }
        }

        if let Some(discriminator) = &self.discriminator {
            let mapping = discriminator
                .mapping
                .as_ref()
                .ok_or(VerifyError::MissingDiscriminatorMapping)?;

            for schema in mapping.values() {
                if schema.form() != Form::Properties {
                    return Err(VerifyError::NonPropertiesMapping);
                }

                let tag_repeated = schema
                    .properties
                    .as_ref()
                    .map_or(false, |properties| {
                        properties.contains_key(&discriminator.tag)
                    })
                    || schema.optional_properties.as_ref().map_or(false, |properties| {
                        properties.contains_key(&discriminator.tag)
                    });

                if tag_repeated {
                    return Err(VerifyError::RepeatedTagInProperties {
                        tag: discriminator.tag.clone(),
                    });
                }
            }
        }

        if is_root {
            if let Some(definitions) = &self.definitions {
                for sub_schema in definitions.values() {
                    sub_schema.verify_node(root, false)?;
                }
            }
        }

        if let Some(sub_schema) = &self.elements {
            sub_schema.verify_node(root, false)?;
        }

        if let Some(properties) = &self.properties {
            for sub_schema in properties.values() {
                sub_schema.verify_node(root, false)?;
            }
        }

        if let Some(properties) = &self.optional_properties {
            for sub_schema in properties.values() {
                sub_schema.verify_node(root, false)?;
            }
        }

        if let Some(sub_schema) = &self.values {
            sub_schema.verify_node(root, false)?;
        }

        if let Some(discriminator) = &self.discriminator {
            if let Some(mapping) = &discriminator.mapping {
                for sub_schema in mapping.values() {
                    sub_schema.verify_node(root, false)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(feature = "fuzz")]
impl arbitrary::Arbitrary for Schema {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        Ok(Schema {
            definitions: arbitrary::Arbitrary::arbitrary(u)?,
            ref_: arbitrary::Arbitrary::arbitrary(u)?,
            type_: arbitrary::Arbitrary::arbitrary(u)?,
            enum_: arbitrary::Arbitrary::arbitrary(u)?,
            elements: arbitrary::Arbitrary::arbitrary(u)?,
            properties: arbitrary::Arbitrary::arbitrary(u)?,
            optional_properties: arbitrary::Arbitrary::arbitrary(u)?,
            values: arbitrary::Arbitrary::arbitrary(u)?,
            discriminator: arbitrary::Arbitrary::arbitrary(u)?,
        })
    }
}

#[cfg(feature = "fuzz")]
impl arbitrary::Arbitrary for Discriminator {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        Ok(Discriminator {
            tag: arbitrary::Arbitrary::arbitrary(u)?,
            mapping: arbitrary::Arbitrary::arbitrary(u)?,
        })
    }
}
