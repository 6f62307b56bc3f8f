/* 📖 # How does a form turn text inputs into call parameters?

Every endpoint on a documentation page gets an `EndpointForm`. Its inputs start
out as the sample values of the endpoint's parameters, so submitting an
untouched form runs the documented example. Inputs are kept as raw text (or a
toggle for booleans) and only coerced to the declared parameter type on
submit:

- `string`: passed through as typed
- `number`: integer if it parses as one, otherwise a finite float
- `boolean`: the toggle, or `true`/`false`/`on`/`off`/`1`/`0` typed in
- `object`: parsed as JSON

Each submission starts again from the sample values and applies only the
overrides it was given, so one bad submission never leaks into the next. The
inputs a submission used are kept for display until the next one.

An empty input is left out of the parameters, unless the parameter is
required. Only a truly empty `string` counts as empty; whitespace is text. Any coercion problem becomes a field error on the form and the
submission stops there; the executor is never called with half-coerced input.

A form accepts one submission at a time. The in-flight flag is taken before
anything else happens and released when the submission settles, whether it
ended in a result, in field errors, or by unwinding.
*/

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::binding::Params;
use crate::endpoint::{EndpointDescriptor, ParamType, ParameterSpec, SampleValue};
use crate::result::ExecutionResult;

const REQUIRED_MESSAGE: &str = "This field is required";

/// Raw state of one input control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    Text(String),
    Toggle(bool),
}

impl FieldInput {
    fn initial(spec: &ParameterSpec) -> Self {
        match (spec.param_type, spec.value) {
            (ParamType::Boolean, Some(SampleValue::Flag(flag))) => Self::Toggle(flag),
            (_, Some(value)) => Self::Text(value.to_input()),
            (_, None) => Self::Text(String::new()),
        }
    }

    /// Raw text typed into the field of `spec`; text that reads as a flag toggles a boolean.
    fn typed(spec: &ParameterSpec, raw: String) -> Self {
        match spec.param_type {
            ParamType::Boolean => match parse_flag(&raw) {
                Some(flag) => Self::Toggle(flag),
                None => Self::Text(raw),
            },
            _ => Self::Text(raw),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::from(text.as_str()),
            Self::Toggle(flag) => Value::Bool(*flag),
        }
    }
}

/// A coercion problem with one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// What the last submission of a form produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormOutcome {
    Result(ExecutionResult),
    FieldErrors(Vec<FieldError>),
}

/// A submission that was refused before it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    InFlight { service: String },
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InFlight { service } => {
                write!(f, "A call to '{}' is already in progress", service)
            }
        }
    }
}

impl std::error::Error for FormError {}

#[derive(Debug)]
struct FormState {
    inputs: Vec<FieldInput>,
    expanded: bool,
    last_outcome: Option<FormOutcome>,
}

/// Input state of one endpoint on a documentation page.
#[derive(Debug)]
pub struct EndpointForm {
    endpoint: EndpointDescriptor,
    state: Mutex<FormState>,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag when dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EndpointForm {
    /// A collapsed form with every input seeded from its sample value.
    pub fn new(endpoint: EndpointDescriptor) -> Self {
        let inputs = endpoint.parameters.iter().map(FieldInput::initial).collect();
        Self {
            endpoint,
            state: Mutex::new(FormState {
                inputs,
                expanded: false,
                last_outcome: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn endpoint(&self) -> &EndpointDescriptor {
        &self.endpoint
    }

    pub fn inputs(&self) -> Vec<(&'static ParameterSpec, FieldInput)> {
        self.endpoint
            .parameters
            .iter()
            .zip(self.state.lock().inputs.iter().cloned())
            .collect()
    }

    pub fn input(&self, name: &str) -> Option<FieldInput> {
        let index = self.index_of(name)?;
        Some(self.state.lock().inputs[index].clone())
    }

    /// Replace the raw input of `name`; returns false for an unknown parameter.
    ///
    /// Text typed into a boolean field becomes the toggle when it reads as one.
    pub fn set_input(&self, name: &str, raw: impl Into<String>) -> bool {
        let Some(index) = self.index_of(name) else {
            return false;
        };
        let input = FieldInput::typed(&self.endpoint.parameters[index], raw.into());
        self.state.lock().inputs[index] = input;
        true
    }

    /// Flip a boolean input; an unset one becomes `true`.
    pub fn toggle(&self, name: &str) -> bool {
        let Some(index) = self.index_of(name) else {
            return false;
        };
        let mut state = self.state.lock();
        let flipped = match &state.inputs[index] {
            FieldInput::Toggle(flag) => !flag,
            FieldInput::Text(text) => !parse_flag(text).unwrap_or(false),
        };
        state.inputs[index] = FieldInput::Toggle(flipped);
        true
    }

    pub fn is_expanded(&self) -> bool {
        self.state.lock().expanded
    }

    pub fn set_expanded(&self, expanded: bool) {
        self.state.lock().expanded = expanded;
    }

    pub fn toggle_expanded(&self) {
        let mut state = self.state.lock();
        state.expanded = !state.expanded;
    }

    /// True while a submission is running.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Outcome of the last settled submission, kept until the next one settles.
    pub fn last_outcome(&self) -> Option<FormOutcome> {
        self.state.lock().last_outcome.clone()
    }

    /// Coerce the current inputs to call parameters.
    pub fn coerce(&self) -> Result<Params, Vec<FieldError>> {
        let state = self.state.lock();
        coerce_inputs(self.endpoint.parameters, &state.inputs)
    }

    /// Seed the inputs from the sample values, apply `overrides`, coerce and, if
    /// that succeeds, run `on_execute`.
    ///
    /// Overrides naming unknown parameters are reported as field errors.
    pub fn submit<F>(
        &self,
        overrides: &BTreeMap<String, String>,
        on_execute: F,
    ) -> Result<FormOutcome, FormError>
    where
        F: FnOnce(&EndpointDescriptor, &Params) -> ExecutionResult,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FormError::InFlight {
                service: self.endpoint.service.to_string(),
            });
        }
        let _guard = InFlightGuard(&self.in_flight);

        let parameters = self.endpoint.parameters;
        let mut inputs: Vec<FieldInput> = parameters.iter().map(FieldInput::initial).collect();
        let mut unknown = vec![];
        for (name, raw) in overrides {
            match self.index_of(name) {
                Some(index) => inputs[index] = FieldInput::typed(&parameters[index], raw.clone()),
                None => unknown.push(FieldError::new(name.as_str(), "Unknown parameter")),
            }
        }
        let coerced = coerce_inputs(parameters, &inputs);
        self.state.lock().inputs = inputs;

        let outcome = match coerced {
            Ok(params) if unknown.is_empty() => {
                debug!(service = self.endpoint.service, "submitting form");
                FormOutcome::Result(on_execute(&self.endpoint, &params))
            }
            Ok(_) => FormOutcome::FieldErrors(unknown),
            Err(mut errors) => {
                errors.extend(unknown);
                FormOutcome::FieldErrors(errors)
            }
        };
        self.state.lock().last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Serializable view of the form for the HTTP shell.
    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.state.lock();
        FormSnapshot {
            service: self.endpoint.service,
            expanded: state.expanded,
            submitting: self.is_submitting(),
            inputs: self
                .endpoint
                .parameters
                .iter()
                .zip(&state.inputs)
                .map(|(spec, input)| (spec.name, input.to_json()))
                .collect(),
            last_outcome: state.last_outcome.clone(),
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.endpoint
            .parameters
            .iter()
            .position(|parameter| parameter.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub service: &'static str,
    pub expanded: bool,
    pub submitting: bool,
    pub inputs: BTreeMap<&'static str, Value>,
    pub last_outcome: Option<FormOutcome>,
}

fn coerce_inputs(specs: &[ParameterSpec], inputs: &[FieldInput]) -> Result<Params, Vec<FieldError>> {
    let mut params = Params::new();
    let mut errors = vec![];
    for (spec, input) in specs.iter().zip(inputs) {
        match coerce_input(spec, input) {
            Ok(Some(value)) => {
                params.insert(spec.name.to_string(), value);
            }
            Ok(None) => {}
            Err(message) => errors.push(FieldError::new(spec.name, message)),
        }
    }
    if errors.is_empty() {
        Ok(params)
    } else {
        Err(errors)
    }
}

/// `Ok(None)` means the optional input was left empty.
fn coerce_input(spec: &ParameterSpec, input: &FieldInput) -> Result<Option<Value>, String> {
    let raw = match input {
        FieldInput::Toggle(flag) => return Ok(Some(Value::Bool(*flag))),
        FieldInput::Text(raw) => raw,
    };
    let empty = match spec.param_type {
        ParamType::String => raw.is_empty(),
        _ => raw.trim().is_empty(),
    };
    if empty {
        return if spec.required {
            Err(REQUIRED_MESSAGE.to_string())
        } else {
            Ok(None)
        };
    }
    let trimmed = raw.trim();
    let value = match spec.param_type {
        ParamType::String => Value::from(raw.as_str()),
        ParamType::Number => parse_number(trimmed)
            .ok_or_else(|| format!("Expected a number, got '{}'", trimmed))?,
        ParamType::Boolean => parse_flag(trimmed)
            .map(Value::Bool)
            .ok_or_else(|| format!("Expected true or false, got '{}'", trimmed))?,
        ParamType::Object => {
            serde_json::from_str(trimmed).map_err(|e| format!("Invalid JSON: {}", e))?
        }
    };
    Ok(Some(value))
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Value::from(integer));
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}
