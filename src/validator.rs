use crate::form::Type;
use crate::schema::Schema;
use chrono::DateTime;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Validator {
    max_depth: usize,
    max_errors: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationError {
    pub instance_path: Vec<String>,
    pub schema_path: Vec<String>,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ValidateError {
    #[error("max depth exceeded")]
    MaxDepthExceeded,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    // For both bounds, zero means unlimited.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    // The schema must have passed Schema::verify; this may panic otherwise.
    pub fn validate(
        &self,
        schema: &Schema,
        instance: &Value,
    ) -> Result<Vec<ValidationError>, ValidateError> {
        let mut vm = Vm {
            max_depth: self.max_depth,
            max_errors: self.max_errors,
            instance_tokens: vec![],
            schema_tokens: vec![vec![]],
            errors: vec![],
        };

        match vm.validate(schema, schema, None, instance) {
            Ok(()) | Err(VmValidateError::MaxErrorsReached) => Ok(vm.errors),
            Err(VmValidateError::MaxDepthExceeded) => Err(ValidateError::MaxDepthExceeded),
        }
    }
}

struct Vm {
    max_depth: usize,
    max_errors: usize,
    instance_tokens: Vec<String>,

    // One token vector per `ref` frame; the top vector is the current schema
    // path, relative to the schema the frame entered.
    schema_tokens: Vec<Vec<String>>,
    errors: Vec<ValidationError>,
}

enum VmValidateError {
    MaxErrorsReached,
    MaxDepthExceeded,
}

impl Vm {
    fn validate(
        &mut self,
        root: &Schema,
        schema: &Schema,
        parent_tag: Option<&str>,
        instance: &Value,
    ) -> Result<(), VmValidateError> {
        if let Some(definition) = &schema.ref_ {
            self.schema_tokens
                .push(vec!["definitions".to_owned(), definition.clone()]);
            if self.schema_tokens.len() == self.max_depth {
                return Err(VmValidateError::MaxDepthExceeded);
            }

            let refd_schema = &root
                .definitions
                .as_ref()
                .expect("unreachable: ref in schema without definitions")[definition];
            self.validate(root, refd_schema, None, instance)?;
            self.schema_tokens.pop();
        } else if let Some(type_value) = &schema.type_ {
            self.push_schema_token("type");

            match type_value.parse() {
                Ok(Type::Boolean) => {
                    if !instance.is_boolean() {
                        self.push_error()?;
                    }
                }
                Ok(Type::Float32) | Ok(Type::Float64) => {
                    if !instance.is_number() {
                        self.push_error()?;
                    }
                }
                Ok(Type::Int8) => self.validate_int(instance, -128.0, 127.0)?,
                Ok(Type::Uint8) => self.validate_int(instance, 0.0, 255.0)?,
                Ok(Type::Int16) => self.validate_int(instance, -32768.0, 32767.0)?,
                Ok(Type::Uint16) => self.validate_int(instance, 0.0, 65535.0)?,
                Ok(Type::Int32) => self.validate_int(instance, -2147483648.0, 2147483647.0)?,
                Ok(Type::Uint32) => self.validate_int(instance, 0.0, 4294967295.0)?,
                Ok(Type::String) => {
                    if !instance.is_string() {
                        self.push_error()?;
                    }
                }
                Ok(Type::Timestamp) => {
                    if let Some(s) = instance.as_str() {
                        if DateTime::parse_from_rfc3339(s).is_err() {
                            self.push_error()?;
                        }
                    } else {
                        self.push_error()?;
                    }
                }

                // Verification rejects unknown type values.
                Err(()) => {}
            };

            self.pop_schema_token();
        } else if let Some(values) = &schema.enum_ {
            self.push_schema_token("enum");
            if let Some(s) = instance.as_str() {
                if !values.iter().any(|value| value == s) {
                    self.push_error()?;
                }
            } else {
                self.push_error()?;
            }
            self.pop_schema_token();
        } else if let Some(sub_schema) = &schema.elements {
            self.push_schema_token("elements");

            if let Some(arr) = instance.as_array() {
                for (i, sub_instance) in arr.iter().enumerate() {
                    self.push_instance_token(&i.to_string());
                    self.validate(root, sub_schema, None, sub_instance)?;
                    self.pop_instance_token();
                }
            } else {
                self.push_error()?;
            }

            self.pop_schema_token();
        } else if schema.properties.is_some() || schema.optional_properties.is_some() {
            if let Some(obj) = instance.as_object() {
                self.push_schema_token("properties");
                if let Some(properties) = &schema.properties {
                    for (name, sub_schema) in properties {
                        self.push_schema_token(name);
                        if let Some(sub_instance) = obj.get(name) {
                            self.push_instance_token(name);
                            self.validate(root, sub_schema, None, sub_instance)?;
                            self.pop_instance_token();
                        } else {
                            self.push_error()?;
                        }
                        self.pop_schema_token();
                    }
                }
                self.pop_schema_token();

                self.push_schema_token("optionalProperties");
                if let Some(properties) = &schema.optional_properties {
                    for (name, sub_schema) in properties {
                        self.push_schema_token(name);
                        if let Some(sub_instance) = obj.get(name) {
                            self.push_instance_token(name);
                            self.validate(root, sub_schema, None, sub_instance)?;
                            self.pop_instance_token();
                        }
                        self.pop_schema_token();
                    }
                }
                self.pop_schema_token();

                // Undeclared keys are always errors, except for the tag of an
                // enclosing discriminator.
                for name in obj.keys() {
                    let tag_match = parent_tag.map_or(false, |tag| tag == name);
                    let declared = schema
                        .properties
                        .as_ref()
                        .map_or(false, |properties| properties.contains_key(name))
                        || schema
                            .optional_properties
                            .as_ref()
                            .map_or(false, |properties| properties.contains_key(name));

                    if !tag_match && !declared {
                        self.push_instance_token(name);
                        self.push_error()?;
                        self.pop_instance_token();
                    }
                }
            } else {
                self.push_schema_token(if schema.properties.is_some() {
                    "properties"
                } else {
                    "optionalProperties"
                });
                self.push_error()?;
                self.pop_schema_token();
            }
        } else if let Some(sub_schema) = &schema.values {
            self.push_schema_token("values");

            if let Some(obj) = instance.as_object() {
                for (name, sub_instance) in obj {
                    self.push_instance_token(name);
                    self.validate(root, sub_schema, None, sub_instance)?;
                    self.pop_instance_token();
                }
            } else {
                self.push_error()?;
            }

            self.pop_schema_token();
        } else if let Some(discriminator) = &schema.discriminator {
            self.push_schema_token("discriminator");

            if let Some(obj) = instance.as_object() {
                if let Some(instance_tag) = obj.get(&discriminator.tag) {
                    if let Some(instance_tag) = instance_tag.as_str() {
                        let mapping = discriminator
                            .mapping
                            .as_ref()
                            .expect("unreachable: discriminator without mapping");

                        if let Some(sub_schema) = mapping.get(instance_tag) {
                            self.push_schema_token("mapping");
                            self.push_schema_token(instance_tag);
                            self.validate(root, sub_schema, Some(&discriminator.tag), instance)?;
                            self.pop_schema_token();
                            self.pop_schema_token();
                        } else {
                            self.push_schema_token("mapping");
                            self.push_instance_token(&discriminator.tag);
                            self.push_error()?;
                            self.pop_instance_token();
                            self.pop_schema_token();
                        }
                    } else {
                        self.push_schema_token("tag");
                        self.push_instance_token(&discriminator.tag);
                        self.push_error()?;
                        self.pop_instance_token();
                        self.pop_schema_token();
                    }
                } else {
                    self.push_schema_token("tag");
                    self.push_error()?;
                    self.pop_schema_token();
                }
            } else {
                self.push_error()?;
            }

            self.pop_schema_token();
        }

        Ok(())
    }

    fn validate_int(
        &mut self,
        instance: &Value,
        min: f64,
        max: f64,
    ) -> Result<(), VmValidateError> {
        if let Some(val) = instance.as_f64() {
            if val.fract() != 0.0 || val < min || val > max {
                self.push_error()
            } else {
                Ok(())
            }
        } else {
            self.push_error()
        }
    }

    fn push_error(&mut self) -> Result<(), VmValidateError> {
        self.errors.push(ValidationError {
            instance_path: self.instance_tokens.clone(),
            schema_path: self
                .schema_tokens
                .last()
                .expect("unreachable: empty schema token stack")
                .clone(),
        });

        if self.errors.len() == self.max_errors {
            Err(VmValidateError::MaxErrorsReached)
        } else {
            Ok(())
        }
    }

    fn push_schema_token(&mut self, token: &str) {
        self.schema_tokens
            .last_mut()
            .expect("unreachable: empty schema token stack")
            .push(token.to_owned());
    }

    fn pop_schema_token(&mut self) {
        self.schema_tokens
            .last_mut()
            .expect("unreachable: empty schema token stack")
            .pop();
    }

    fn push_instance_token(&mut self, token: &str) {
        self.instance_tokens.push(token.to_owned());
    }

    fn pop_instance_token(&mut self) {
        self.instance_tokens.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Schema {
        let schema: Schema = serde_json::from_value(value).unwrap();
        schema.verify().unwrap();
        schema
    }

    fn error(instance_path: &[&str], schema_path: &[&str]) -> ValidationError {
        ValidationError {
            instance_path: instance_path.iter().map(|s| s.to_string()).collect(),
            schema_path: schema_path.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn empty_schema_accepts_anything() {
        let schema = parse(json!({}));
        let validator = Validator::new();

        for instance in vec![
            json!(null),
            json!(true),
            json!(3.14),
            json!("foo"),
            json!([null]),
            json!({ "foo": "bar" }),
        ] {
            assert!(validator.validate(&schema, &instance).unwrap().is_empty());
        }
    }

    #[test]
    fn type_mismatch() {
        let schema = parse(json!({ "type": "boolean" }));

        assert!(Validator::new()
            .validate(&schema, &json!(true))
            .unwrap()
            .is_empty());

        assert_eq!(
            vec![error(&[], &["type"])],
            Validator::new().validate(&schema, &json!(3)).unwrap()
        );
    }

    #[test]
    fn additional_properties() {
        let schema = parse(json!({
            "properties": { "a": { "type": "string" } },
            "optionalProperties": { "b": { "type": "string" } },
        }));

        assert_eq!(
            vec![error(&["c"], &[])],
            Validator::new()
                .validate(&schema, &json!({ "a": "x", "c": 1 }))
                .unwrap()
        );
    }

    #[test]
    fn discriminator_tag_exclusion() {
        let schema = parse(json!({
            "discriminator": {
                "tag": "t",
                "mapping": {
                    "x": { "properties": { "p": { "type": "string" } } },
                },
            },
        }));

        assert!(Validator::new()
            .validate(&schema, &json!({ "t": "x", "p": "ok" }))
            .unwrap()
            .is_empty());

        assert_eq!(
            vec![error(&["t"], &["discriminator", "mapping"])],
            Validator::new().validate(&schema, &json!({ "t": "y" })).unwrap()
        );
    }

    #[test]
    fn max_errors() {
        let schema = parse(json!({ "elements": { "type": "boolean" } }));

        assert_eq!(
            vec![
                error(&["0"], &["elements", "type"]),
                error(&["1"], &["elements", "type"]),
                error(&["2"], &["elements", "type"]),
            ],
            Validator::new()
                .with_max_errors(3)
                .validate(&schema, &json!([null, null, null, null, null]))
                .unwrap()
        );
    }

    #[test]
    fn max_depth() {
        let schema = parse(json!({
            "definitions": { "": { "ref": "" } },
            "ref": "",
        }));

        assert_eq!(
            ValidateError::MaxDepthExceeded,
            Validator::new()
                .with_max_depth(3)
                .validate(&schema, &json!(null))
                .unwrap_err()
        );
    }

    #[test]
    fn validation_spec() {
        #[derive(serde::Deserialize)]
        struct TestCase {
            name: String,
            schema: Schema,
            instances: Vec<TestInstance>,
        }

        #[derive(serde::Deserialize)]
        struct TestInstance {
            instance: serde_json::Value,
            errors: Vec<TestError>,
        }

        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct TestError {
            #[serde(rename = "instancePath")]
            instance_path: Vec<String>,

            #[serde(rename = "schemaPath")]
            schema_path: Vec<String>,
        }

        // The spec pins the set of errors, not their order.
        fn sort_errors(errors: &mut Vec<TestError>) {
            errors.sort_by(|a, b| {
                (&a.schema_path, &a.instance_path).cmp(&(&b.schema_path, &b.instance_path))
            });
        }

        let test_cases: Vec<TestCase> =
            serde_json::from_str(include_str!("../jddf-spec/tests/validation.json"))
                .expect("parse validation.json");

        let validator = Validator::new();
        for test_case in test_cases {
            test_case.schema.verify().expect(&test_case.name);

            for (i, test_instance) in test_case.instances.into_iter().enumerate() {
                let mut actual: Vec<_> = validator
                    .validate(&test_case.schema, &test_instance.instance)
                    .expect(&test_case.name)
                    .into_iter()
                    .map(|error| TestError {
                        instance_path: error.instance_path,
                        schema_path: error.schema_path,
                    })
                    .collect();

                let mut expected = test_instance.errors;
                sort_errors(&mut actual);
                sort_errors(&mut expected);

                assert_eq!(expected, actual, "{}/{}", test_case.name, i);
            }
        }
    }
}
