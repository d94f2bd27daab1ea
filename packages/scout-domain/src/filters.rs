use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
	And,
	#[default]
	Or,
}
impl FilterOperator {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::And => "AND",
			Self::Or => "OR",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"AND" => Some(Self::And),
			"OR" => Some(Self::Or),
			_ => None,
		}
	}
}

/// One selected refinement value. `value` is always a backend token, never a display label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilter {
	pub filter_name: String,
	pub value: String,
	pub operator: FilterOperator,
}
impl ActiveFilter {
	pub fn new(
		filter_name: impl Into<String>,
		value: impl Into<String>,
		operator: FilterOperator,
	) -> Self {
		Self { filter_name: filter_name.into(), value: value.into(), operator }
	}

	pub fn same_selection(&self, other: &Self) -> bool {
		self.filter_name == other.filter_name && self.value == other.value
	}
}

/// Adds `filter` when its `(filter_name, value)` pair is absent and removes it otherwise.
pub fn toggle(filters: &[ActiveFilter], filter: ActiveFilter) -> Vec<ActiveFilter> {
	if filters.iter().any(|existing| existing.same_selection(&filter)) {
		return filters.iter().filter(|existing| !existing.same_selection(&filter)).cloned().collect();
	}

	let mut next = Vec::with_capacity(filters.len() + 1);

	next.extend_from_slice(filters);
	next.push(filter);

	next
}

/// Replaces every value of `filter_name`, keeping the field's first position when it had one.
pub fn replace_values(
	filters: &[ActiveFilter],
	filter_name: &str,
	values: &[String],
	operator: FilterOperator,
) -> Vec<ActiveFilter> {
	let position = filters.iter().position(|existing| existing.filter_name == filter_name);
	let mut next: Vec<ActiveFilter> =
		filters.iter().filter(|existing| existing.filter_name != filter_name).cloned().collect();
	let mut replacements: Vec<ActiveFilter> = Vec::with_capacity(values.len());

	for value in values {
		if replacements.iter().any(|filter| &filter.value == value) {
			continue;
		}

		replacements.push(ActiveFilter::new(filter_name, value.as_str(), operator));
	}

	let at = position.unwrap_or(next.len()).min(next.len());

	for (offset, filter) in replacements.into_iter().enumerate() {
		next.insert(at + offset, filter);
	}

	next
}

#[cfg(test)]
mod tests {
	use super::*;

	fn file_type(value: &str) -> ActiveFilter {
		ActiveFilter::new("FileType", value, FilterOperator::Or)
	}

	#[test]
	fn toggle_adds_then_removes_the_pair() {
		let start = vec![file_type("\"docx\"")];
		let once = toggle(&start, file_type("\"pptx\""));
		let twice = toggle(&once, file_type("\"pptx\""));

		assert_eq!(once.len(), 2);
		assert_eq!(twice, start);
	}

	#[test]
	fn toggle_matches_on_name_and_value_only() {
		let start = vec![file_type("\"docx\"")];
		let next = toggle(&start, ActiveFilter::new("FileType", "\"docx\"", FilterOperator::And));

		assert!(next.is_empty());
	}

	#[test]
	fn replace_values_keeps_field_position() {
		let start = vec![
			ActiveFilter::new("Author", "\"Ann\"", FilterOperator::Or),
			file_type("\"docx\""),
			ActiveFilter::new("Site", "\"hr\"", FilterOperator::Or),
		];
		let values = vec!["\"xlsx\"".to_string(), "\"pdf\"".to_string(), "\"xlsx\"".to_string()];
		let next = replace_values(&start, "FileType", &values, FilterOperator::Or);
		let names: Vec<_> =
			next.iter().map(|filter| (filter.filter_name.as_str(), filter.value.as_str())).collect();

		assert_eq!(
			names,
			vec![
				("Author", "\"Ann\""),
				("FileType", "\"xlsx\""),
				("FileType", "\"pdf\""),
				("Site", "\"hr\""),
			]
		);
	}
}
