//! Console records and the request shapes that create or change them.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{StoreError, StoreResult};

/// A stored console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Console {
    /// Identifier assigned by storage on creation.
    #[schema(example = "665f1c2ab4e0f3a1d2c3b4a5")]
    pub id: String,
    /// Unique console name.
    #[schema(example = "Dreamcast")]
    pub name: String,
    /// Manufacturer name.
    #[schema(example = "Sega")]
    pub manufacturer: String,
    /// Year of first release.
    #[schema(example = 1998)]
    pub release_year: i32,
}

/// Fields of a console that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConsole {
    /// Unique console name.
    pub name: String,
    /// Manufacturer name.
    pub manufacturer: String,
    /// Year of first release.
    pub release_year: i32,
}

impl NewConsole {
    /// Attach a storage-assigned id.
    pub fn with_id(self, id: impl Into<String>) -> Console {
        Console {
            id: id.into(),
            name: self.name,
            manufacturer: self.manufacturer,
            release_year: self.release_year,
        }
    }
}

/// JSON body accepted by create and update.
///
/// Every field is optional here; `into_new` enforces presence for creation and
/// `into_patch` keeps whatever was supplied for an update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleInput {
    /// Unique console name.
    pub name: Option<String>,
    /// Manufacturer name.
    pub manufacturer: Option<String>,
    /// Year of first release.
    pub release_year: Option<i32>,
}

impl ConsoleInput {
    /// Require every field and produce a creatable record.
    pub fn into_new(self) -> StoreResult<NewConsole> {
        let name = required_text("name", self.name)?;
        let manufacturer = required_text("manufacturer", self.manufacturer)?;
        let release_year = self
            .release_year
            .ok_or_else(|| StoreError::Invalid("releaseYear is required".to_string()))?;

        Ok(NewConsole {
            name,
            manufacturer,
            release_year,
        })
    }

    /// Keep only the supplied fields.
    pub fn into_patch(self) -> ConsolePatch {
        ConsolePatch {
            name: self.name,
            manufacturer: self.manufacturer,
            release_year: self.release_year,
        }
    }
}

fn required_text(field: &str, value: Option<String>) -> StoreResult<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(StoreError::Invalid(format!("{field} must not be blank"))),
        None => Err(StoreError::Invalid(format!("{field} is required"))),
    }
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolePatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement manufacturer.
    pub manufacturer: Option<String>,
    /// Replacement release year.
    pub release_year: Option<i32>,
}

impl ConsolePatch {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.manufacturer.is_none() && self.release_year.is_none()
    }

    /// Reject blanked-out required fields.
    pub fn validate(&self) -> StoreResult<()> {
        for (field, value) in [("name", &self.name), ("manufacturer", &self.manufacturer)] {
            if value.as_deref().is_some_and(|text| text.trim().is_empty()) {
                return Err(StoreError::Invalid(format!("{field} must not be blank")));
            }
        }
        Ok(())
    }

    /// Apply the supplied fields to a record in place.
    pub fn apply(self, console: &mut Console) {
        if let Some(name) = self.name {
            console.name = name;
        }
        if let Some(manufacturer) = self.manufacturer {
            console.manufacturer = manufacturer;
        }
        if let Some(release_year) = self.release_year {
            console.release_year = release_year;
        }
    }
}

/// Parse a console id. Anything that is not a 24-digit hex ObjectId is rejected.
pub fn parse_id(id: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}
