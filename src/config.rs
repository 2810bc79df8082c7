const DEFAULT_LOG_FILTER: &str = "info";

pub struct Config {
    pub(crate) log_filter: String,
    pub(crate) pretty: bool,
    #[cfg(feature = "extensions")]
    pub(crate) load_all_extensions: bool,
    #[cfg(feature = "extensions")]
    pub(crate) enabled_extensions: Vec<String>,
}

impl Config {
    pub fn from_args() -> Self {
        Config {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            pretty: true,
            #[cfg(feature = "extensions")]
            load_all_extensions: true,
            #[cfg(feature = "extensions")]
            enabled_extensions: Vec::new(),
        }
    }

    /// Defaults overridden by `TYPEOP_LOG`, `TYPEOP_PRETTY` and
    /// `TYPEOP_EXTENSIONS` (`all`, or a comma separated list of names)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::from_args();
        if let Some(filter) = lookup("TYPEOP_LOG").filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }
        if let Some(pretty) = lookup("TYPEOP_PRETTY") {
            config.pretty = !matches!(pretty.trim(), "0" | "false" | "no");
        }
        #[cfg(feature = "extensions")]
        if let Some(extensions) = lookup("TYPEOP_EXTENSIONS") {
            let extensions = extensions.trim();
            if extensions.eq_ignore_ascii_case("all") {
                config.load_all_extensions = true;
                config.enabled_extensions.clear();
            } else {
                config.load_all_extensions = false;
                config.enabled_extensions = extensions
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect();
            }
        }
        config
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    /// Extension filter for the loader; None loads everything
    #[cfg(feature = "extensions")]
    pub fn enabled_extensions(&self) -> Option<&[String]> {
        if self.load_all_extensions {
            None
        } else {
            Some(&self.enabled_extensions)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_args()
    }
}
