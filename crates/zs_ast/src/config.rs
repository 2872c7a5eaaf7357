use serde::{Deserialize, Serialize};
use swc_ecma_ast::Ident;
use thiserror::Error;

/// Runtime generator the loop normalizer calls to enumerate `for-in` keys.
pub const DEFAULT_FOR_IN_HELPER: &str = "$forIn";

/// JavaScript source of the default `for-in` helper. Hosts running desugared
/// code must define it (or a function with the same contract under the
/// configured name) before the code runs.
pub const FOR_IN_HELPER_SOURCE: &str = "function* $forIn(o) { for (const k in o) yield k; }";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the loop pass needs the continue pass: a surviving `continue` would skip the `for` update")]
    LoopsRequireContinues,
    #[error("`{0}` is not a valid JavaScript identifier or is a reserved word; it cannot name the for-in helper")]
    InvalidHelperName(String),
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which desugaring passes run. Pass order is fixed; disabling a pass leaves
/// its construct in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DesugarConfig {
    pub var_decls: bool,
    pub continues: bool,
    pub loops: bool,
    pub switches: bool,
    pub finally: bool,
    pub for_in_helper: String,
    /// Append the helper's definition to source output that calls it.
    pub emit_for_in_helper: bool,
}

impl Default for DesugarConfig {
    fn default() -> Self {
        Self {
            var_decls: true,
            continues: true,
            loops: true,
            switches: true,
            finally: true,
            for_in_helper: DEFAULT_FOR_IN_HELPER.to_string(),
            emit_for_in_helper: false,
        }
    }
}

impl DesugarConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loops && !self.continues {
            return Err(ConfigError::LoopsRequireContinues);
        }
        if Ident::verify_symbol(&self.for_in_helper).is_err() {
            return Err(ConfigError::InvalidHelperName(self.for_in_helper.clone()));
        }
        Ok(())
    }

    /// JavaScript source of the `for-in` helper under the configured name.
    pub fn for_in_helper_source(&self) -> String {
        format!(
            "function* {}(o) {{ for (const k in o) yield k; }}",
            self.for_in_helper
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_every_pass() {
        let c = DesugarConfig::default();
        assert!(c.var_decls && c.continues && c.loops && c.switches && c.finally);
        assert_eq!(c.for_in_helper, "$forIn");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let c = DesugarConfig::from_json(r#"{ "switches": false, "forInHelper": "keysOf" }"#)
            .unwrap();
        assert!(!c.switches);
        assert!(c.loops);
        assert_eq!(c.for_in_helper, "keysOf");
    }

    #[test]
    fn loops_without_continues_is_rejected() {
        let err = DesugarConfig::from_json(r#"{ "continues": false }"#).unwrap_err();
        assert!(matches!(err, ConfigError::LoopsRequireContinues));

        let ok = DesugarConfig::from_json(r#"{ "continues": false, "loops": false }"#);
        assert!(ok.is_ok());
    }

    #[test]
    fn helper_name_must_be_an_identifier() {
        let err = DesugarConfig::from_json(r#"{ "forInHelper": "for in" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHelperName(name) if name == "for in"));
    }

    #[test]
    fn reserved_words_cannot_name_the_helper() {
        for name in ["class", "yield", "let", "await", "enum"] {
            let config = DesugarConfig {
                for_in_helper: name.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidHelperName(_))),
                "{name} was accepted"
            );
        }
        assert!(DesugarConfig::from_json(r#"{ "forInHelper": "_keys$1" }"#).is_ok());
    }

    #[test]
    fn helper_source_follows_the_configured_name() {
        assert_eq!(
            DesugarConfig::default().for_in_helper_source(),
            FOR_IN_HELPER_SOURCE
        );
        let config = DesugarConfig::from_json(
            r#"{ "forInHelper": "keysOf", "emitForInHelper": true }"#,
        )
        .unwrap();
        assert!(config.emit_for_in_helper);
        assert!(config
            .for_in_helper_source()
            .starts_with("function* keysOf(o)"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = DesugarConfig::from_json(r#"{ "hoisting": true }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
