use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: u32 = 500;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySlice {
	pub query_text: String,
	pub query_template: String,
	pub scope: Option<Scope>,
	/// `None` keeps the backend's relevance order.
	pub sort: Option<SortSpec>,
	/// One-based.
	pub current_page: u32,
	pub page_size: u32,
	pub result_source_id: Option<String>,
	pub trim_duplicates: bool,
	pub collapse_specification: Option<String>,
}
impl QuerySlice {
	/// Changing what is searched always returns to the first page.
	pub fn set_text(&mut self, text: &str) {
		self.query_text = text.to_string();
		self.current_page = 1;
	}

	pub fn set_scope(&mut self, scope: Option<Scope>) {
		self.scope = scope;
		self.current_page = 1;
	}

	pub fn set_sort(&mut self, sort: Option<SortSpec>) {
		self.sort = sort;
		self.current_page = 1;
	}

	pub fn set_page(&mut self, page: u32) {
		self.current_page = page.max(1);
	}

	pub fn set_page_size(&mut self, page_size: u32) {
		self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
		self.current_page = 1;
	}
}
impl Default for QuerySlice {
	fn default() -> Self {
		Self {
			query_text: String::new(),
			query_template: "{searchTerms}".to_string(),
			scope: None,
			sort: None,
			current_page: 1,
			page_size: 10,
			result_source_id: None,
			trim_duplicates: true,
			collapse_specification: None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
	pub id: String,
	#[serde(default)]
	pub label: String,
}
impl Scope {
	pub fn new(id: impl Into<String>) -> Self {
		let id = id.into();

		Self { label: id.clone(), id }
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
	pub property: String,
	pub direction: SortDirection,
}
impl SortSpec {
	pub fn new(property: impl Into<String>, direction: SortDirection) -> Self {
		Self { property: property.into(), direction }
	}

	/// Parses `property:direction`; the property itself may contain `:`.
	pub fn parse(raw: &str) -> Option<Self> {
		let (property, direction) = raw.rsplit_once(':')?;
		let property = property.trim();

		if property.is_empty() {
			return None;
		}

		Some(Self::new(property, SortDirection::parse(direction)?))
	}

	pub fn to_param(&self) -> String {
		format!("{}:{}", self.property, self.direction.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	#[serde(alias = "ascending")]
	Asc,
	#[serde(alias = "descending")]
	Desc,
}
impl SortDirection {
	/// The numeric direction the backend expects.
	pub fn ordinal(self) -> u8 {
		match self {
			Self::Asc => 0,
			Self::Desc => 1,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Asc => "asc",
			Self::Desc => "desc",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();

		if raw.eq_ignore_ascii_case("asc") || raw.eq_ignore_ascii_case("ascending") {
			Some(Self::Asc)
		} else if raw.eq_ignore_ascii_case("desc") || raw.eq_ignore_ascii_case("descending") {
			Some(Self::Desc)
		} else {
			None
		}
	}
}
