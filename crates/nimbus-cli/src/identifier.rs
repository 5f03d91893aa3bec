//! Addressing an instance by id or by display name.
//!
//! Commands that act on one instance accept exactly one of `--instance-id`
//! and `--display-name`. The chosen flag decides the API path and the wait
//! handler, so it travels with the value as an [`Identifier`].

use clap::Args;
use serde::Serialize;

use nimbus_sdk::InstanceRef;
use nimbus_validation::{validate_display_name, validate_instance_id};

use crate::error::CliError;

/// Name of the instance-id flag.
pub const INSTANCE_ID_FLAG: &str = "instance-id";

/// Name of the display-name flag.
pub const DISPLAY_NAME_FLAG: &str = "display-name";

/// Exactly one of the two identifier flags.
#[derive(Args, Debug, Clone, Default)]
#[group(id = "instance", required = true, multiple = false)]
pub struct InstanceSelector {
    /// Instance identifier.
    #[arg(short = 'i', long)]
    pub instance_id: Option<String>,

    /// Instance display name.
    #[arg(short = 'n', long)]
    pub display_name: Option<String>,
}

impl InstanceSelector {
    /// The validated identifier, `None` when neither flag is set.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::FlagValidation`] naming the flag whose value is
    /// invalid.
    pub fn validated_identifier(&self) -> Result<Option<Identifier>, CliError> {
        if let Some(id) = &self.instance_id {
            validate_instance_id(id).map_err(|e| CliError::flag(&e))?;
            return Ok(Some(Identifier::new(INSTANCE_ID_FLAG, id.clone())));
        }
        if let Some(name) = &self.display_name {
            validate_display_name(name).map_err(|e| CliError::flag(&e))?;
            return Ok(Some(Identifier::new(DISPLAY_NAME_FLAG, name.clone())));
        }
        Ok(None)
    }
}

/// Which form an identifier takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierForm {
    /// Opaque instance id.
    Id,
    /// Display name.
    Name,
}

/// A validated identifier together with the flag it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    /// Flag name, `instance-id` or `display-name`.
    pub flag: String,
    /// Flag value.
    pub value: String,
}

impl Identifier {
    /// Pair a flag with its value.
    #[must_use]
    pub fn new(flag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: value.into(),
        }
    }

    /// The form named by the flag.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidIdentifier`] for any other flag.
    pub fn form(&self) -> Result<IdentifierForm, CliError> {
        match self.flag.as_str() {
            INSTANCE_ID_FLAG => Ok(IdentifierForm::Id),
            DISPLAY_NAME_FLAG => Ok(IdentifierForm::Name),
            other => Err(CliError::InvalidIdentifier(other.to_string())),
        }
    }

    /// The identifier as understood by the wait handlers.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidIdentifier`] for an unknown flag.
    pub fn instance_ref(&self) -> Result<InstanceRef, CliError> {
        Ok(match self.form()? {
            IdentifierForm::Id => InstanceRef::Id(self.value.clone()),
            IdentifierForm::Name => InstanceRef::Name(self.value.clone()),
        })
    }
}

/// Unwrap an optional identifier.
///
/// # Errors
///
/// Returns [`CliError::NoIdentifier`] when absent.
pub fn require(identifier: Option<&Identifier>) -> Result<&Identifier, CliError> {
    identifier.ok_or(CliError::NoIdentifier)
}
