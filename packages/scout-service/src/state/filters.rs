use std::sync::Arc;

use serde::{Deserialize, Serialize};

use scout_domain::{ActiveFilter, FilterOperator, filters};

#[derive(Clone, Debug, Default)]
pub struct FilterSlice {
	/// Replaced, never edited in place, so URL sync can compare by pointer.
	pub active: Arc<Vec<ActiveFilter>>,
	pub refiners: Arc<Vec<Refiner>>,
	pub configs: Arc<Vec<FilterConfig>>,
}
impl FilterSlice {
	pub fn config(&self, filter_name: &str) -> Option<&FilterConfig> {
		self.configs.iter().find(|config| config.filter_name.eq_ignore_ascii_case(filter_name))
	}

	/// The operator a new selection on `filter_name` carries.
	pub fn operator_for(&self, filter_name: &str) -> FilterOperator {
		self.config(filter_name).map(|config| config.operator).unwrap_or_default()
	}

	pub fn toggle(&mut self, filter: ActiveFilter) {
		self.active = Arc::new(filters::toggle(&self.active, filter));
	}

	pub fn set_values(&mut self, filter_name: &str, values: &[String]) {
		let operator = self.operator_for(filter_name);

		self.active = Arc::new(filters::replace_values(&self.active, filter_name, values, operator));
	}

	pub fn remove_field(&mut self, filter_name: &str) {
		self.set_values(filter_name, &[]);
	}

	pub fn clear(&mut self) {
		self.active = Arc::new(Vec::new());
	}

	pub fn replace_active(&mut self, active: Vec<ActiveFilter>) {
		self.active = Arc::new(active);
	}

	/// Refiners come back whole with every response and replace the previous set.
	pub fn set_refiners(&mut self, refiners: Vec<Refiner>) {
		let refiners = refiners
			.into_iter()
			.map(|mut refiner| {
				for value in &mut refiner.values {
					value.is_selected = self.active.iter().any(|filter| {
						filter.filter_name == refiner.filter_name && filter.value == value.value
					});
				}

				refiner
			})
			.collect();

		self.refiners = Arc::new(refiners);
	}

	pub fn set_configs(&mut self, configs: Vec<FilterConfig>) {
		self.configs = Arc::new(configs);
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refiner {
	pub filter_name: String,
	#[serde(default)]
	pub values: Vec<RefinerValue>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinerValue {
	/// Display text as returned by the backend.
	pub name: String,
	/// Backend token.
	pub value: String,
	#[serde(default)]
	pub count: u64,
	#[serde(default)]
	pub is_selected: bool,
}

/// Authoring metadata for one managed property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
	pub filter_name: String,
	#[serde(default)]
	pub display_name: String,
	/// Registry key of the formatter; unknown keys fall back to `default`.
	#[serde(default = "default_filter_type")]
	pub filter_type: String,
	#[serde(default)]
	pub operator: FilterOperator,
	#[serde(default)]
	pub sort_by: RefinerSort,
	#[serde(default = "default_true")]
	pub show_count: bool,
	#[serde(default = "default_max_buckets")]
	pub max_buckets: u32,
	#[serde(default)]
	pub number_format: NumberFormat,
	#[serde(default = "default_currency_symbol")]
	pub currency_symbol: String,
	#[serde(default = "default_true_label")]
	pub true_label: String,
	#[serde(default = "default_false_label")]
	pub false_label: String,
	/// Taxonomy labels render their ancestor path when set.
	#[serde(default = "default_true")]
	pub show_full_path: bool,
}
impl FilterConfig {
	pub fn new(filter_name: impl Into<String>, filter_type: impl Into<String>) -> Self {
		let filter_name = filter_name.into();

		Self {
			display_name: filter_name.clone(),
			filter_name,
			filter_type: filter_type.into(),
			operator: FilterOperator::Or,
			sort_by: RefinerSort::default(),
			show_count: true,
			max_buckets: default_max_buckets(),
			number_format: NumberFormat::default(),
			currency_symbol: default_currency_symbol(),
			true_label: default_true_label(),
			false_label: default_false_label(),
			show_full_path: true,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefinerSort {
	#[default]
	Count,
	Name,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
	#[default]
	Number,
	/// Binary units, 1 KB = 1024 B.
	Bytes,
	Currency,
}

fn default_filter_type() -> String {
	"default".to_string()
}

fn default_true() -> bool {
	true
}

fn default_max_buckets() -> u32 {
	20
}

fn default_currency_symbol() -> String {
	"$".to_string()
}

fn default_true_label() -> String {
	"Yes".to_string()
}

fn default_false_label() -> String {
	"No".to_string()
}
