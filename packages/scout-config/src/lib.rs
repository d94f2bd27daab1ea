mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Context, Promotions, ProviderConfig, Providers, Service, Session};

use std::{fs, path::Path};

const MAX_PAGE_SIZE: u32 = 500;
const MAX_URL_DEBOUNCE_MS: u64 = 10_000;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.session.page_size == 0 {
		return Err(Error::Validation {
			message: "session.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.session.page_size > MAX_PAGE_SIZE {
		return Err(Error::Validation {
			message: format!("session.page_size must be {MAX_PAGE_SIZE} or less."),
		});
	}
	if cfg.session.url_debounce_ms == 0 {
		return Err(Error::Validation {
			message: "session.url_debounce_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.session.url_debounce_ms > MAX_URL_DEBOUNCE_MS {
		return Err(Error::Validation {
			message: format!("session.url_debounce_ms must be {MAX_URL_DEBOUNCE_MS} or less."),
		});
	}

	if let Some(prefix) = cfg.session.url_prefix.as_deref()
		&& prefix.chars().any(|ch| matches!(ch, '.' | '&' | '=' | '#') || ch.is_whitespace())
	{
		return Err(Error::Validation {
			message: "session.url_prefix must not contain '.', '&', '=', '#', or whitespace."
				.to_string(),
		});
	}

	if cfg.session.default_layout.trim().is_empty() {
		return Err(Error::Validation {
			message: "session.default_layout must be non-empty.".to_string(),
		});
	}
	if cfg.session.default_data_provider.trim().is_empty() {
		return Err(Error::Validation {
			message: "session.default_data_provider must be non-empty.".to_string(),
		});
	}
	if cfg.session.selected_properties.iter().any(|property| property.trim().is_empty()) {
		return Err(Error::Validation {
			message: "session.selected_properties must not contain blank entries.".to_string(),
		});
	}
	if cfg.promotions.max_results == 0 {
		return Err(Error::Validation {
			message: "promotions.max_results must be greater than zero.".to_string(),
		});
	}

	for (label, provider) in [
		("search", &cfg.providers.search),
		("terms", &cfg.providers.terms),
		("profiles", &cfg.providers.profiles),
	] {
		if provider.provider_id.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.provider_id must be non-empty."),
			});
		}
		if provider.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_base must be non-empty."),
			});
		}
		if provider.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
		if provider.default_headers.values().any(|value| !value.is_string()) {
			return Err(Error::Validation {
				message: format!("providers.{label}.default_headers values must be strings."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.session.url_prefix.as_deref().map(|prefix| prefix.trim().is_empty()).unwrap_or(false) {
		cfg.session.url_prefix = None;
	}

	for value in [
		&mut cfg.context.site_id,
		&mut cfg.context.site_url,
		&mut cfg.context.web_id,
		&mut cfg.context.web_url,
		&mut cfg.context.hub_site_id,
		&mut cfg.context.list_id,
	] {
		if value.as_deref().map(|raw| raw.trim().is_empty()).unwrap_or(false) {
			*value = None;
		}
	}
}
