/* 📖 # Why are endpoint descriptors `const` data?

Each domain module declares its endpoints as a constant table: method, logical
service name, a description and the parameters with sample values. The tables
are built by the compiler, never mutated, and read by both the documentation
page (to build forms) and the dispatcher (through the service name). The
`const fn` builders keep the tables readable:

```
use chessdesk_base::pal::http::HttpMethod;
use chessdesk_engine::{EndpointDescriptor, ParameterSpec, SampleValue};

const LOGIN: EndpointDescriptor = EndpointDescriptor::new(
    HttpMethod::Post,
    "login",
    "Log in with a staff account",
    &[ParameterSpec::string("username", "Login name")
        .required()
        .sample(SampleValue::Text("admin"))],
);
assert_eq!(LOGIN.parameter("username").unwrap().required, true);
```
*/

use chessdesk_base::pal::http::HttpMethod;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Declared type of an endpoint parameter; decides how form input is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }
}

/// Sample/default value of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Text(&'static str),
    Number(f64),
    Flag(bool),
    /// JSON source text, for `object` parameters.
    Json(&'static str),
}

impl SampleValue {
    /// The sample as a JSON value; JSON text that does not parse stays a string.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::from(*text),
            Self::Number(number) => number_value(*number),
            Self::Flag(flag) => Value::Bool(*flag),
            Self::Json(source) => {
                serde_json::from_str(source).unwrap_or_else(|_| Value::from(*source))
            }
        }
    }

    /// The sample as it would be typed into a text input.
    pub fn to_input(&self) -> String {
        match self {
            Self::Text(text) | Self::Json(text) => text.to_string(),
            Self::Number(_) => self.to_json().to_string(),
            Self::Flag(flag) => flag.to_string(),
        }
    }
}

impl Serialize for SampleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Whole numbers become JSON integers so `12` is not rendered as `12.0`.
pub(crate) fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::from(number as i64)
    } else {
        serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Metadata of one endpoint parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<SampleValue>,
}

impl ParameterSpec {
    pub const fn new(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            required: false,
            description,
            value: None,
        }
    }

    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::String, description)
    }

    pub const fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Number, description)
    }

    pub const fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Boolean, description)
    }

    pub const fn object(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Object, description)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn sample(mut self, value: SampleValue) -> Self {
        self.value = Some(value);
        self
    }
}

/// Declarative description of one logical backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EndpointDescriptor {
    #[serde(serialize_with = "serialize_method")]
    pub method: HttpMethod,
    /// Logical service name, unique within its module.
    pub service: &'static str,
    pub description: &'static str,
    /// Parameters in display order.
    pub parameters: &'static [ParameterSpec],
}

impl EndpointDescriptor {
    pub const fn new(
        method: HttpMethod,
        service: &'static str,
        description: &'static str,
        parameters: &'static [ParameterSpec],
    ) -> Self {
        Self {
            method,
            service,
            description,
            parameters,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&'static ParameterSpec> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    /// Parameters filled with their sample values, as a runnable example.
    pub fn sample_params(&self) -> crate::binding::Params {
        self.parameters
            .iter()
            .filter_map(|parameter| {
                parameter
                    .value
                    .map(|value| (parameter.name.to_string(), value.to_json()))
            })
            .collect()
    }
}

fn serialize_method<S: Serializer>(method: &HttpMethod, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}
