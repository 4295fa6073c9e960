//! Caller-supplied lookup keys and their required-parameter checks.

use crate::model::record::BusinessKey;
use crate::service::change_service::CatalogError;

/// Raw key fields as they arrive from a caller; any of them may be unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRequest {
    Organization {
        guid: Option<String>,
    },
    Company {
        business_id: Option<String>,
    },
    Member {
        x_road_instance: Option<String>,
        member_class: Option<String>,
        member_code: Option<String>,
    },
}

impl LookupRequest {
    pub fn organization(guid: Option<&str>) -> Self {
        Self::Organization {
            guid: guid.map(str::to_string),
        }
    }

    pub fn company(business_id: Option<&str>) -> Self {
        Self::Company {
            business_id: business_id.map(str::to_string),
        }
    }

    pub fn member(
        x_road_instance: Option<&str>,
        member_class: Option<&str>,
        member_code: Option<&str>,
    ) -> Self {
        Self::Member {
            x_road_instance: x_road_instance.map(str::to_string),
            member_class: member_class.map(str::to_string),
            member_code: member_code.map(str::to_string),
        }
    }

    /// Checks required fields in declaration order and builds the business key.
    ///
    /// # Errors
    /// - `CatalogError::Validation` naming the first unset or blank field.
    pub fn into_key(self) -> Result<BusinessKey, CatalogError> {
        match self {
            Self::Organization { guid } => {
                Ok(BusinessKey::OrganizationGuid(required("Guid", guid)?))
            }
            Self::Company { business_id } => Ok(BusinessKey::CompanyBusinessId(required(
                "BusinessId",
                business_id,
            )?)),
            Self::Member {
                x_road_instance,
                member_class,
                member_code,
            } => Ok(BusinessKey::Member {
                x_road_instance: required("XRoadInstance", x_road_instance)?,
                member_class: required("MemberClass", member_class)?,
                member_code: required("MemberCode", member_code)?,
            }),
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, CatalogError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CatalogError::Validation { field }),
    }
}

/// Not-found message naming every key component the caller supplied.
pub fn not_found_message(key: &BusinessKey) -> String {
    match key {
        BusinessKey::OrganizationGuid(guid) => format!("Organization with guid {guid} not found"),
        BusinessKey::CompanyBusinessId(business_id) => {
            format!("company with businessId {business_id} not found")
        }
        BusinessKey::Member {
            x_road_instance,
            member_class,
            member_code,
        } => format!(
            "Member with xRoadInstance \"{x_road_instance}\", memberClass \"{member_class}\" and memberCode \"{member_code}\" not found"
        ),
    }
}
