//! An implementation of [JSON Data Definition Format](https://jddf.io), a
//! schema language for JSON.
//!
//! `jddf` lets you parse and ensure the validity of JDDF schemas, and then
//! validate JSON data against those schemas.
//!
//! # Quick start
//!
//! Here's how you can parse a JDDF schema and then use it to validate data
//! against that schema.
//!
//! ```
//! use jddf::{Schema, Validator};
//! use serde_json::json;
//!
//! let schema: Schema = serde_json::from_value(json!({
//!     "properties": {
//!         "foo": { "type": "string" },
//!         "bar": { "type": "boolean" }
//!     }
//! }))
//! .expect("Parse schema");
//!
//! schema.verify().expect("Invalid schema");
//!
//! let validator = Validator::new();
//!
//! // This input is ok, so validate comes back empty.
//! let input_ok = json!({ "foo": "xxx", "bar": true });
//! assert!(validator.validate(&schema, &input_ok).unwrap().is_empty());
//!
//! // This input is bad (bar has type string, not boolean), so validate does
//! // not come back empty.
//! let input_bad = json!({ "foo": "xxx", "bar": "false" });
//! assert!(!validator.validate(&schema, &input_bad).unwrap().is_empty());
//! ```
//!
//! Or, at a high level:
//!
//! 1. Use `serde_json` to parse JSON data into a [`Schema`].
//! 2. Ensure that schema is well-formed using [`Schema::verify`].
//! 3. Check data against that schema using [`Validator::validate`].
//!
//! # Common usage
//!
//! The example above shows you how you can quickly use JDDF to check whether
//! data is valid. But in the real world, you usually want to know what the
//! validation errors were, rather than just flatly rejecting input as
//! "invalid" without any further details.
//!
//! One benefit of JDDF is that the exact data inside the validation errors is
//! part of the specification; that means validation errors are portable.
//! Here's an example of what those validation errors look like, and how you
//! can access them with this crate.
//!
//! ```
//! use jddf::{Schema, ValidationError, Validator};
//! use serde_json::json;
//!
//! let schema: Schema = serde_json::from_value(json!({
//!     "properties": {
//!         "name": { "type": "string" },
//!         "age": { "type": "uint32" },
//!         "phones": {
//!             "elements": {
//!                 "type": "string"
//!             }
//!         }
//!     }
//! }))
//! .expect("Parse schema");
//!
//! schema.verify().expect("Invalid schema");
//!
//! // Since this first example is valid, we'll get back an empty list of
//! // validation errors.
//! let input_ok = json!({
//!     "name": "John Doe",
//!     "age": 43,
//!     "phones": ["+44 1234567", "+44 2345678"]
//! });
//!
//! let validator = Validator::new();
//! assert_eq!(
//!     Vec::<ValidationError>::new(),
//!     validator.validate(&schema, &input_ok).unwrap(),
//! );
//!
//! // This example is invalid, so we'll get back three validation errors:
//! //
//! // 1. "name" is required but not present,
//! // 2. "age" has the wrong type
//! // 3. "phones[1]" has the wrong type
//! let input_bad = json!({
//!     "age": "43",
//!     "phones": ["+44 1234567", 442345678]
//! });
//!
//! // Each error has two pieces of information: the path to the part of the
//! // input that was rejected (the "instance path"), and the part of the
//! // schema that rejected it (the "schema path").
//! assert_eq!(
//!     vec![
//!         // "age" has the wrong type (rejected by "/properties/age/type")
//!         ValidationError {
//!             instance_path: vec!["age".into()],
//!             schema_path: vec!["properties".into(), "age".into(), "type".into()],
//!         },
//!
//!         // "name" is missing (rejected by "/properties/name")
//!         ValidationError {
//!             instance_path: vec![],
//!             schema_path: vec!["properties".into(), "name".into()],
//!         },
//!
//!         // "phones/1" has the wrong type (rejected by
//!         // "/properties/phones/elements/type")
//!         ValidationError {
//!             instance_path: vec!["phones".into(), "1".into()],
//!             schema_path: vec![
//!                 "properties".into(),
//!                 "phones".into(),
//!                 "elements".into(),
//!                 "type".into()
//!             ],
//!         },
//!     ],
//!     validator.validate(&schema, &input_bad).unwrap(),
//! );
//! ```
//!
//! # Security considerations
//!
//! If you're running [`Validator::validate`] with untrusted schemas
//! (untrusted inputs is fine), then be aware that a schema can refer to
//! itself through `definitions`, sending a naive evaluator into an infinite
//! loop. This crate detects and aborts such loops via
//! [`Validator::with_max_depth`], which bounds how many `ref`s may be
//! followed at once before validation fails with
//! [`ValidateError::MaxDepthExceeded`]. Relatedly,
//! [`Validator::with_max_errors`] caps how many errors a single validation
//! will produce. For both bounds, zero (the default) means unlimited.

mod form;
mod schema;
mod validator;

pub use form::*;
pub use schema::*;
pub use validator::*;
