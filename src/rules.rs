//! Declarative response-match and response-redaction rules.
//!
//! Rules locate response fields through one of two mechanisms: a structural
//! JSON path (preferred; stable under field reordering, added fields, and
//! whitespace changes) or a textual pattern with a named capture group
//! (fallback for engines without structural support). Both mechanisms are
//! variants of one [`FieldLocator`] evaluated by a single resolver, so a
//! third mechanism would not touch call sites, and both express identical
//! extractions for the same field.

// crates.io
use regex::Regex;
// self
use crate::{_prelude::*, contract::ResponseFields, error::ConfigError};

/// Mechanism used to express rules for one proof call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMechanism {
	/// Structural JSON-path rules.
	Structural,
	/// Named-capture pattern rules.
	Pattern,
}

/// Locates one field inside a JSON response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLocator {
	/// Structural path expressed as a JSON pointer.
	Path {
		/// JSON pointer to the field (e.g. `/status`).
		pointer: String,
	},
	/// Fallback textual pattern with a named capture group.
	Pattern {
		/// Regular expression matched against the raw body.
		regex: String,
		/// Name of the capture group holding the field value.
		capture: String,
	},
}
impl FieldLocator {
	/// Builds the structural locator for a top-level field.
	pub fn structural(field: &str) -> Self {
		Self::Path { pointer: format!("/{field}") }
	}

	/// Builds the pattern locator for a top-level field.
	///
	/// The pattern tolerates quoted and unquoted values so string and
	/// numeric fields resolve to the same text the structural form yields.
	pub fn pattern(field: &str) -> Result<Self, ConfigError> {
		let capture = capture_name(field);
		let regex = format!(
			r#""{}"\s*:\s*"?(?P<{capture}>[^",}}\]]*)"?"#,
			regex::escape(field),
		);

		compile(&regex)?;

		Ok(Self::Pattern { regex, capture })
	}

	/// Builds the locator for a top-level field in the requested mechanism.
	pub fn for_field(field: &str, mechanism: RuleMechanism) -> Result<Self, ConfigError> {
		match mechanism {
			RuleMechanism::Structural => Ok(Self::structural(field)),
			RuleMechanism::Pattern => Self::pattern(field),
		}
	}

	/// Resolves the locator against a response body.
	///
	/// Returns `Ok(None)` when the field is absent (or, for the structural
	/// form, when the body is not JSON). Numeric values resolve to their
	/// exact source literal under either mechanism.
	pub fn resolve(&self, body: &str) -> Result<Option<String>, ConfigError> {
		match self {
			Self::Path { pointer } => {
				let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
					return Ok(None);
				};

				Ok(value.pointer(pointer).map(render_scalar))
			},
			Self::Pattern { regex, capture } => {
				let compiled = compile(regex)?;

				Ok(compiled
					.captures(body)
					.and_then(|captures| captures.name(capture))
					.map(|matched| matched.as_str().to_owned()))
			},
		}
	}
}

/// Assertion evaluated against a located field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchAssertion {
	/// The field must equal the provided value exactly.
	Equals(String),
	/// The field must be present with any value.
	Exists,
}

/// Response assertion enforced by the proof engine before proving.
///
/// A failing assertion makes the downstream proof call fail rather than
/// extract empty values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
	/// Field locator the assertion applies to.
	pub locator: FieldLocator,
	/// Assertion evaluated on the located value.
	pub assertion: MatchAssertion,
}
impl MatchRule {
	/// Builds an exact-equality assertion.
	pub fn equals(locator: FieldLocator, value: impl Into<String>) -> Self {
		Self { locator, assertion: MatchAssertion::Equals(value.into()) }
	}

	/// Builds an existence assertion.
	pub fn exists(locator: FieldLocator) -> Self {
		Self { locator, assertion: MatchAssertion::Exists }
	}

	/// Evaluates the assertion locally against a response body.
	pub fn holds_for(&self, body: &str) -> Result<bool, ConfigError> {
		let resolved = self.locator.resolve(body)?;

		Ok(match &self.assertion {
			MatchAssertion::Equals(expected) => resolved.as_deref() == Some(expected.as_str()),
			MatchAssertion::Exists => resolved.is_some(),
		})
	}
}

/// Response field kept provable (extracted) by the proof engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRule {
	/// Name under which the engine reports the extracted value.
	pub field: String,
	/// Field locator used for the extraction.
	pub locator: FieldLocator,
}
impl ExtractionRule {
	/// Builds a rule from an explicit locator.
	pub fn new(field: impl Into<String>, locator: FieldLocator) -> Self {
		Self { field: field.into(), locator }
	}

	/// Builds the rule for a top-level field in the requested mechanism.
	pub fn for_field(field: &str, mechanism: RuleMechanism) -> Result<Self, ConfigError> {
		Ok(Self { field: field.to_owned(), locator: FieldLocator::for_field(field, mechanism)? })
	}
}

/// Ordered rule sets for one proof operation.
///
/// Defaults are append-only: callers may add extra rules but never remove
/// or replace the defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionRuleSet {
	match_rules: Vec<MatchRule>,
	redactions: Vec<ExtractionRule>,
}
impl ExtractionRuleSet {
	/// Builds the rule set for a status check.
	///
	/// With an expected status the first match rule is an exact assertion on
	/// it, so the proof call fails upstream when the remote status differs;
	/// an existence assertion on the transfer identifier always follows.
	/// Default extractions cover transfer id, provider transfer id, status,
	/// and transfer amount.
	pub fn status_check(
		fields: &ResponseFields,
		expected_status: Option<&str>,
		mechanism: RuleMechanism,
	) -> Result<Self, ConfigError> {
		let mut match_rules = Vec::new();

		if let Some(expected) = expected_status {
			match_rules
				.push(MatchRule::equals(FieldLocator::for_field(&fields.status, mechanism)?, expected));
		}

		match_rules.push(MatchRule::exists(FieldLocator::for_field(&fields.transfer_id, mechanism)?));

		Ok(Self { match_rules, redactions: default_redactions(fields, mechanism, true)? })
	}

	/// Builds the rule set for a transfer creation.
	///
	/// Creation responses carry no settled amount, so default extractions
	/// cover transfer id, provider transfer id, and status.
	pub fn creation(fields: &ResponseFields, mechanism: RuleMechanism) -> Result<Self, ConfigError> {
		let match_rules =
			vec![MatchRule::exists(FieldLocator::for_field(&fields.transfer_id, mechanism)?)];

		Ok(Self { match_rules, redactions: default_redactions(fields, mechanism, false)? })
	}

	/// Appends caller-supplied extraction rules after the defaults.
	pub fn with_extra_redactions(
		mut self,
		extra: impl IntoIterator<Item = ExtractionRule>,
	) -> Self {
		self.redactions.extend(extra);

		self
	}

	/// Appends caller-supplied match rules after the defaults.
	pub fn with_extra_match_rules(mut self, extra: impl IntoIterator<Item = MatchRule>) -> Self {
		self.match_rules.extend(extra);

		self
	}

	/// Ordered response assertions.
	pub fn match_rules(&self) -> &[MatchRule] {
		&self.match_rules
	}

	/// Ordered response extractions.
	pub fn redactions(&self) -> &[ExtractionRule] {
		&self.redactions
	}

	/// Consumes the set into its match/redaction halves.
	pub fn into_parts(self) -> (Vec<MatchRule>, Vec<ExtractionRule>) {
		(self.match_rules, self.redactions)
	}
}

fn default_redactions(
	fields: &ResponseFields,
	mechanism: RuleMechanism,
	include_amount: bool,
) -> Result<Vec<ExtractionRule>, ConfigError> {
	let mut redactions = vec![
		ExtractionRule::for_field(&fields.transfer_id, mechanism)?,
		ExtractionRule::for_field(&fields.provider_transfer_id, mechanism)?,
		ExtractionRule::for_field(&fields.status, mechanism)?,
	];

	if include_amount {
		redactions.push(ExtractionRule::for_field(&fields.transfer_amount, mechanism)?);
	}

	Ok(redactions)
}

fn capture_name(field: &str) -> String {
	let mut name: String = field
		.chars()
		.map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
		.collect();

	if name.chars().next().is_none_or(|c| c.is_ascii_digit()) {
		name.insert(0, 'f');
	}

	name
}

fn compile(regex: &str) -> Result<Regex, ConfigError> {
	Regex::new(regex).map_err(|source| ConfigError::InvalidPattern { source: Box::new(source) })
}

fn render_scalar(value: &serde_json::Value) -> String {
	match value {
		serde_json::Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}
