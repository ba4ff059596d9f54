//! `${VAR}` and `${VAR:-default}` expansion of configuration values.

use crate::ConfigError;

/// Expand environment references in `value`, in place.
///
/// Values without a `${` are left as they are. An unset variable without
/// default fails with [`ConfigError::EnvVar`] naming `field`.
pub(crate) fn expand_in_place(value: &mut String, field: &str) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }

    let expanded = shellexpand::env_with_context(value.as_str(), |name| {
        std::env::var(name).map(Some)
    })
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.var_name),
    })?
    .into_owned();

    *value = expanded;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn expand(value: &str, field: &str) -> Result<String, ConfigError> {
        let mut value = value.to_owned();
        expand_in_place(&mut value, field)?;
        Ok(value)
    }

    #[test]
    fn test_set_variable_is_substituted() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("DTSFLAT_EXPAND_HOST", "texts.example.org");
        }
        let result = expand("https://${DTSFLAT_EXPAND_HOST}/api/dts", "api.base_url").unwrap();
        assert_eq!(result, "https://texts.example.org/api/dts");
        unsafe {
            std::env::remove_var("DTSFLAT_EXPAND_HOST");
        }
    }

    #[test]
    fn test_default_applies_when_unset() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("DTSFLAT_EXPAND_UNSET");
        }
        let result = expand("${DTSFLAT_EXPAND_UNSET:-/api/dts}", "api.base_url").unwrap();
        assert_eq!(result, "/api/dts");
    }

    #[test]
    fn test_unset_without_default_names_field() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("DTSFLAT_EXPAND_MISSING");
        }
        let err = expand("${DTSFLAT_EXPAND_MISSING}/out", "output.dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in output.dir: ${DTSFLAT_EXPAND_MISSING} not set"
        );
    }

    #[test]
    fn test_literal_values_untouched() {
        assert_eq!(expand("/api/$dts", "api.base_url").unwrap(), "/api/$dts");
        assert_eq!(expand("build", "output.dir").unwrap(), "build");
    }
}
