//! Translator: the per-database entry point.
//!
//! Built once from a dialect's static tables plus configuration, then shared
//! read-only across threads. Every call to [`Translator::translate`] gets its
//! own renderer, so concurrent translations never touch shared mutable state.

use chrono::{FixedOffset, Offset, Utc};
use serde::Serialize;

use crate::ast::Command;
use crate::capabilities::{Capabilities, Version};
use crate::config::TranslatorConfig;
use crate::conversion::ConversionMatrix;
use crate::dialect::{Dialect, DialectKind};
use crate::error::{Result, SqlshimError};
use crate::modifiers::FunctionModifierRegistry;
use crate::render::{BindValue, SqlRenderer};

/// Output of one translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslatedCommand {
    pub sql: String,
    /// In placeholder order; empty unless bind variables are enabled.
    pub bind_values: Vec<BindValue>,
}

#[derive(Debug)]
pub struct Translator {
    dialect: Box<dyn Dialect>,
    capabilities: Capabilities,
    modifiers: FunctionModifierRegistry,
    conversions: ConversionMatrix,
    use_bind_variables: bool,
    database_time_zone: FixedOffset,
}

impl Translator {
    /// Builds a translator for `kind`. The `dialect` field of `config` is ignored.
    pub fn new(kind: DialectKind, config: &TranslatorConfig) -> Result<Self> {
        let version = config
            .database_version
            .as_deref()
            .map(str::parse::<Version>)
            .transpose()?;
        let database_time_zone = match config.database_time_zone.as_deref() {
            Some(zone) => parse_time_zone(zone)?,
            None => utc(),
        };
        let dialect = kind.create(version)?;

        let mut capabilities = dialect.capabilities();
        if let Some(max) = config.max_in_criteria_size {
            capabilities.max_in_criteria_size = Some(max);
        }
        let mut modifiers = FunctionModifierRegistry::new();
        dialect.register_modifiers(&mut modifiers);
        let mut conversions = ConversionMatrix::new();
        dialect.register_conversions(&mut conversions);

        tracing::debug!(
            dialect = %kind,
            version = %dialect.version(),
            paging = ?capabilities.paging,
            modifiers = modifiers.len(),
            conversions = conversions.len(),
            "built translator"
        );

        Ok(Self {
            dialect,
            capabilities,
            modifiers,
            conversions,
            use_bind_variables: config.use_bind_variables,
            database_time_zone,
        })
    }

    /// Uses the dialect named in `config`.
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        Self::new(config.dialect, config)
    }

    /// Default configuration: dialect default version, UTC, inline literals.
    pub fn for_dialect(kind: DialectKind) -> Result<Self> {
        Self::new(kind, &TranslatorConfig::default())
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn modifiers(&self) -> &FunctionModifierRegistry {
        &self.modifiers
    }

    pub fn conversions(&self) -> &ConversionMatrix {
        &self.conversions
    }

    pub fn use_bind_variables(&self) -> bool {
        self.use_bind_variables
    }

    pub fn database_time_zone(&self) -> FixedOffset {
        self.database_time_zone
    }

    pub fn translate(&self, command: &Command) -> Result<TranslatedCommand> {
        let mut renderer = SqlRenderer::new(self);
        let sql = renderer.render_command(command)?;
        let bind_values = renderer.into_bind_values();
        tracing::debug!(
            dialect = %self.dialect.kind(),
            sql_len = sql.len(),
            binds = bind_values.len(),
            "translated command"
        );
        Ok(TranslatedCommand { sql, bind_values })
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Accepts `UTC`, `GMT`, `Z` and fixed offsets such as `+05:30`, `-0800`,
/// `-5` or `GMT+01:00`. Offsets beyond 14 hours are rejected.
pub fn parse_time_zone(zone: &str) -> Result<FixedOffset> {
    let invalid =
        |reason: String| SqlshimError::Config(format!("invalid database time zone '{zone}': {reason}"));
    let upper = zone.trim().to_ascii_uppercase();
    if matches!(upper.as_str(), "UTC" | "GMT" | "Z") {
        return Ok(utc());
    }
    let offset = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);
    let signed = offset.starts_with(['+', '-']);
    if !signed || !offset[1..].bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return Err(invalid("expected an offset such as +05:30".to_string()));
    }
    // chrono needs minutes; `+5` and `-05` are whole hours
    let whole_hours =
        (2..=3).contains(&offset.len()) && offset[1..].bytes().all(|b| b.is_ascii_digit());
    let offset = if whole_hours {
        format!("{}{:0>2}:00", &offset[..1], &offset[1..])
    } else {
        offset.to_string()
    };
    let parsed = offset
        .parse::<FixedOffset>()
        .map_err(|e| invalid(e.to_string()))?;
    if parsed.local_minus_utc().abs() > 14 * 3600 {
        return Err(invalid("offset is more than 14 hours".to_string()));
    }
    Ok(parsed)
}
