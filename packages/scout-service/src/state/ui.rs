#[derive(Clone, Debug)]
pub struct UiSlice {
	pub active_layout_key: String,
	/// Result keys in selection order.
	pub selected_keys: Vec<String>,
	pub is_filter_panel_open: bool,
}
impl UiSlice {
	pub fn toggle_selection(&mut self, key: &str) {
		if let Some(position) = self.selected_keys.iter().position(|selected| selected == key) {
			self.selected_keys.remove(position);
		} else {
			self.selected_keys.push(key.to_string());
		}
	}
}
impl Default for UiSlice {
	fn default() -> Self {
		Self { active_layout_key: "list".to_string(), selected_keys: Vec::new(), is_filter_panel_open: false }
	}
}
